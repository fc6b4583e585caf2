use std::sync::Arc;

use crate::error::{Result, ServerError};
use crate::item::{Item, ItemStore};

/// Selection manager: records and withdraws product choices for a
/// breakfast, and flips the delivered flag.
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    /// Create a new [`ItemService`].
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Record that `user_id` chose `product_id` for `breakfast_id`.
    ///
    /// The pre-check targets the `(breakfast, product)` pair, the stricter
    /// of the two declared constraints; it implies the per-user triple.
    /// Concurrent inserts racing past the check are caught by the storage
    /// constraint and surface as the same conflict.
    pub async fn choose(
        &self,
        breakfast_id: i64,
        user_id: i64,
        product_id: i64,
    ) -> Result<Item> {
        if self
            .store
            .find_by_breakfast_and_product(breakfast_id, product_id)
            .await?
            .is_some()
        {
            return Err(ServerError::BadRequest(super::ITEM_TAKEN.to_owned()));
        }

        let id = self.store.insert(breakfast_id, user_id, product_id).await?;

        Ok(Item {
            id,
            breakfast_id,
            user_id,
            product_id,
            delivered: false,
        })
    }

    /// Withdraw a selection. Removing a selection that does not exist is
    /// a success no-op.
    pub async fn remove(
        &self,
        breakfast_id: i64,
        user_id: i64,
        product_id: i64,
    ) -> Result<()> {
        self.store.remove(breakfast_id, user_id, product_id).await
    }

    /// Set the delivered flag of a selection by its id.
    pub async fn confirm_delivered(
        &self,
        id: i64,
        delivered: bool,
    ) -> Result<()> {
        let affected = self.store.set_delivered(id, delivered).await?;
        if affected == 0 {
            return Err(ServerError::NotFound(super::ITEM_NOT_FOUND.to_owned()));
        }

        Ok(())
    }
}
