//! Handle database requests.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::{self, Result};
use crate::product::Product;

/// Persistence port for [`Product`] rows.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product, returning its generated id.
    async fn insert(&self, name: &str) -> Result<i64>;

    /// All products, ordered by id.
    async fn find_all(&self) -> Result<Vec<Product>>;

    /// Find a product by primary id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>>;

    /// Find a product by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>>;

    /// Rename an existing row.
    async fn update(&self, id: i64, name: &str) -> Result<()>;

    /// Delete a product by primary id.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// PostgreSQL-backed [`ProductStore`].
#[derive(Clone)]
pub struct PgProductStore {
    pool: Pool<Postgres>,
}

impl PgProductStore {
    /// Create a new [`PgProductStore`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, name: &str) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO products (name) VALUES ($1) RETURNING id"#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(error::conflict_on_unique(super::NAME_TAKEN))?;

        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>(
            r#"SELECT id, name FROM products ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>(
            r#"SELECT id, name FROM products WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>(
            r#"SELECT id, name FROM products WHERE name = $1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update(&self, id: i64, name: &str) -> Result<()> {
        sqlx::query(r#"UPDATE products SET name = $1 WHERE id = $2"#)
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(error::conflict_on_unique(super::NAME_TAKEN))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query(r#"DELETE FROM products WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
