//! Matina is a breakfast scheduling and delivery API for small teams.

#[forbid(unsafe_code)]
#[deny(missing_docs, unused_mut)]
mod breakfast;
mod crypto;
mod database;
pub mod error;
mod item;
mod product;
mod router;
pub mod telemetry;
mod token;
mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
    bearer: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub token: token::TokenManager,
    pub users: user::UserService,
    pub products: product::ProductService,
    pub breakfasts: breakfast::BreakfastService,
    pub items: item::ItemService,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        .nest("/auth", router::auth::router())
        .nest("/users", router::users::router())
        .nest("/products", router::products::router())
        // Selections live under the breakfast they belong to.
        .nest(
            "/breakfasts",
            router::breakfasts::router()
                .merge(router::items::selection_router()),
        )
        .nest("/items", router::items::router(state.clone()))
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file.  let it in memory.
    let config = config::Configuration::default().read()?;

    let db = match config.postgres {
        Some(ref config) => {
            database::Database::new(
                &config.address,
                &config
                    .username
                    .clone()
                    .unwrap_or(database::DEFAULT_CREDENTIALS.into()),
                &config
                    .password
                    .clone()
                    .unwrap_or(database::DEFAULT_CREDENTIALS.into()),
                &config
                    .database
                    .clone()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME.into()),
                config.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            std::process::exit(0);
        },
    };

    // execute migrations scripts on start.
    sqlx::migrate!().run(&db.postgres).await?;

    // handle jwt.
    let Some(token) = &config.token else {
        tracing::warn!("missing `token` entry on `config.yaml` file");
        std::process::exit(0);
    };
    let token = token::TokenManager::new(&config.name, &token.secret, token.ttl_ms)?;

    let crypto = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);

    let pool = db.postgres;
    let users = user::UserService::new(
        Arc::new(user::PgUserStore::new(pool.clone())),
        crypto,
    );
    let products = product::ProductService::new(Arc::new(
        product::PgProductStore::new(pool.clone()),
    ));
    let breakfasts = breakfast::BreakfastService::new(Arc::new(
        breakfast::PgBreakfastStore::new(pool.clone()),
    ));
    let items =
        item::ItemService::new(Arc::new(item::PgItemStore::new(pool)));

    Ok(AppState {
        config,
        token,
        users,
        products,
        breakfasts,
        items,
    })
}
