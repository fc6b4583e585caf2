mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub(crate) const DATE_TAKEN: &str = "breakfast with this date already exists";
pub(crate) const BREAKFAST_NOT_FOUND: &str = "breakfast not found";

/// Breakfast as saved on database: one dated event. The date is its
/// natural key.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    sqlx::FromRow,
)]
pub struct Breakfast {
    pub id: i64,
    pub date: NaiveDate,
}
