mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

pub(crate) const ITEM_TAKEN: &str =
    "product already chosen for this breakfast";
pub(crate) const ITEM_NOT_FOUND: &str = "item not found";

/// One selection row: a user chose a product for a breakfast.
///
/// Storage enforces both declared unique constraints,
/// `(breakfast_id, product_id)` and `(breakfast_id, user_id, product_id)`,
/// exactly as the domain declares them.
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
pub struct Item {
    pub id: i64,
    pub breakfast_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub delivered: bool,
}
