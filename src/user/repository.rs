//! Handle database requests.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::{self, Result};
use crate::user::{Role, User};

/// Persistence port for [`User`] rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, returning its generated id.
    async fn insert(
        &self,
        name: &str,
        cpf: &str,
        password: &str,
        role: Role,
    ) -> Result<i64>;

    /// All users, ordered by id.
    async fn find_all(&self) -> Result<Vec<User>>;

    /// Find a user by primary id.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Find a user by CPF.
    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>>;

    /// Update mutable fields (`name`, `cpf`) of an existing row.
    async fn update(&self, id: i64, name: &str, cpf: &str) -> Result<()>;

    /// Delete a user by primary id.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// PostgreSQL-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: Pool<Postgres>,
}

impl PgUserStore {
    /// Create a new [`PgUserStore`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(
        &self,
        name: &str,
        cpf: &str,
        password: &str,
        role: Role,
    ) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO users (name, cpf, password, role)
                VALUES ($1, $2, $3, $4)
                RETURNING id"#,
        )
        .bind(name)
        .bind(cpf)
        .bind(password)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(error::conflict_on_unique(super::CPF_TAKEN))?;

        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(sqlx::query_as::<_, User>(
            r#"SELECT id, name, cpf, password, role FROM users ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            r#"SELECT id, name, cpf, password, role FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            r#"SELECT id, name, cpf, password, role FROM users WHERE cpf = $1"#,
        )
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update(&self, id: i64, name: &str, cpf: &str) -> Result<()> {
        sqlx::query(r#"UPDATE users SET name = $1, cpf = $2 WHERE id = $3"#)
            .bind(name)
            .bind(cpf)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(error::conflict_on_unique(super::CPF_TAKEN))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
