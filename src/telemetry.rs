//! Telemetry logic.
//! Structured logging for the whole service.
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global [`tracing`] subscriber.
///
/// The filter is taken from `RUST_LOG` when set. Otherwise requests,
/// SQL timings and service events are logged at a sensible default.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cfg!(debug_assertions) {
            "matina=trace,tower_http=debug,info"
        } else {
            "matina=info,tower_http=info,warn"
        })
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
