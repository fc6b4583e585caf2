mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

pub(crate) const NAME_TAKEN: &str = "product with this name already exists";
pub(crate) const PRODUCT_NOT_FOUND: &str = "product not found";

/// Product as saved on database. The name is its natural key, stored
/// title-cased.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Product {
    pub id: i64,
    pub name: String,
}
