//! Handle database requests.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::breakfast::Breakfast;
use crate::error::{self, Result};

/// Persistence port for [`Breakfast`] rows.
#[async_trait]
pub trait BreakfastStore: Send + Sync {
    /// Insert a new breakfast, returning its generated id.
    async fn insert(&self, date: NaiveDate) -> Result<i64>;

    /// All breakfasts, ordered by date.
    async fn find_all(&self) -> Result<Vec<Breakfast>>;

    /// Find a breakfast by primary id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Breakfast>>;

    /// Find a breakfast by date.
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<Breakfast>>;

    /// Move an existing row to another date.
    async fn update(&self, id: i64, date: NaiveDate) -> Result<()>;

    /// Delete a breakfast by primary id.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// PostgreSQL-backed [`BreakfastStore`].
#[derive(Clone)]
pub struct PgBreakfastStore {
    pool: Pool<Postgres>,
}

impl PgBreakfastStore {
    /// Create a new [`PgBreakfastStore`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BreakfastStore for PgBreakfastStore {
    async fn insert(&self, date: NaiveDate) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO breakfasts (date) VALUES ($1) RETURNING id"#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(error::conflict_on_unique(super::DATE_TAKEN))?;

        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Breakfast>> {
        Ok(sqlx::query_as::<_, Breakfast>(
            r#"SELECT id, date FROM breakfasts ORDER BY date"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Breakfast>> {
        Ok(sqlx::query_as::<_, Breakfast>(
            r#"SELECT id, date FROM breakfasts WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<Breakfast>> {
        Ok(sqlx::query_as::<_, Breakfast>(
            r#"SELECT id, date FROM breakfasts WHERE date = $1"#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update(&self, id: i64, date: NaiveDate) -> Result<()> {
        sqlx::query(r#"UPDATE breakfasts SET date = $1 WHERE id = $2"#)
            .bind(date)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(error::conflict_on_unique(super::DATE_TAKEN))?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query(r#"DELETE FROM breakfasts WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory [`BreakfastStore`] with call counters.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::BreakfastStore;
    use crate::breakfast::Breakfast;
    use crate::error::Result;

    #[derive(Default)]
    pub struct MemoryBreakfastStore {
        rows: Mutex<Vec<Breakfast>>,
        next_id: AtomicI64,
        /// `insert` calls received.
        pub inserts: AtomicUsize,
        /// `find_by_date` calls received.
        pub date_reads: AtomicUsize,
        /// `update` calls received.
        pub updates: AtomicUsize,
    }

    impl MemoryBreakfastStore {
        /// Add a row without touching the counters.
        pub fn seed(&self, breakfast: Breakfast) {
            self.next_id.fetch_max(breakfast.id, Ordering::SeqCst);
            self.rows.lock().unwrap().push(breakfast);
        }
    }

    #[async_trait]
    impl BreakfastStore for MemoryBreakfastStore {
        async fn insert(&self, date: NaiveDate) -> Result<i64> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.rows.lock().unwrap().push(Breakfast { id, date });
            Ok(id)
        }

        async fn find_all(&self) -> Result<Vec<Breakfast>> {
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by_key(|breakfast| breakfast.date);
            Ok(rows)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Breakfast>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|breakfast| breakfast.id == id)
                .copied())
        }

        async fn find_by_date(
            &self,
            date: NaiveDate,
        ) -> Result<Option<Breakfast>> {
            self.date_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|breakfast| breakfast.date == date)
                .copied())
        }

        async fn update(&self, id: i64, date: NaiveDate) -> Result<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            if let Some(breakfast) = self
                .rows
                .lock()
                .unwrap()
                .iter_mut()
                .find(|breakfast| breakfast.id == id)
            {
                breakfast.date = date;
            }
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<()> {
            self.rows
                .lock()
                .unwrap()
                .retain(|breakfast| breakfast.id != id);
            Ok(())
        }
    }
}
