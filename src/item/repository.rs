//! Handle database requests.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::{self, Result};
use crate::item::Item;

/// Persistence port for selection rows.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a selection with `delivered = false`, returning its id.
    async fn insert(
        &self,
        breakfast_id: i64,
        user_id: i64,
        product_id: i64,
    ) -> Result<i64>;

    /// Find the selection of `product_id` for `breakfast_id`, whoever made
    /// it. This is the stricter of the two unique constraints.
    async fn find_by_breakfast_and_product(
        &self,
        breakfast_id: i64,
        product_id: i64,
    ) -> Result<Option<Item>>;

    /// Delete the matching selection. Deleting nothing is not an error.
    async fn remove(
        &self,
        breakfast_id: i64,
        user_id: i64,
        product_id: i64,
    ) -> Result<()>;

    /// Set the delivered flag by primary id, returning affected rows.
    async fn set_delivered(&self, id: i64, delivered: bool) -> Result<u64>;
}

/// PostgreSQL-backed [`ItemStore`].
#[derive(Clone)]
pub struct PgItemStore {
    pool: Pool<Postgres>,
}

impl PgItemStore {
    /// Create a new [`PgItemStore`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn insert(
        &self,
        breakfast_id: i64,
        user_id: i64,
        product_id: i64,
    ) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO breakfast_items (breakfast_id, user_id, product_id, delivered)
                VALUES ($1, $2, $3, FALSE)
                RETURNING id"#,
        )
        .bind(breakfast_id)
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(error::conflict_on_unique(super::ITEM_TAKEN))?;

        Ok(id)
    }

    async fn find_by_breakfast_and_product(
        &self,
        breakfast_id: i64,
        product_id: i64,
    ) -> Result<Option<Item>> {
        Ok(sqlx::query_as::<_, Item>(
            r#"SELECT id, breakfast_id, user_id, product_id, delivered
                FROM breakfast_items
                WHERE breakfast_id = $1 AND product_id = $2"#,
        )
        .bind(breakfast_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn remove(
        &self,
        breakfast_id: i64,
        user_id: i64,
        product_id: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"DELETE FROM breakfast_items
                WHERE breakfast_id = $1 AND user_id = $2 AND product_id = $3"#,
        )
        .bind(breakfast_id)
        .bind(user_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_delivered(&self, id: i64, delivered: bool) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE breakfast_items SET delivered = $1 WHERE id = $2"#,
        )
        .bind(delivered)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
