use std::sync::Arc;

use chrono::NaiveDate;

use crate::breakfast::{Breakfast, BreakfastStore};
use crate::error::{Result, ServerError};

/// Breakfast manager. One breakfast per date.
#[derive(Clone)]
pub struct BreakfastService {
    store: Arc<dyn BreakfastStore>,
}

impl BreakfastService {
    /// Create a new [`BreakfastService`].
    pub fn new(store: Arc<dyn BreakfastStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, date: NaiveDate) -> Result<Breakfast> {
        if self.store.find_by_date(date).await?.is_some() {
            return Err(ServerError::BadRequest(super::DATE_TAKEN.to_owned()));
        }

        self.store.insert(date).await?;

        // Answer with the persisted state, not the in-memory input.
        self.store.find_by_date(date).await?.ok_or_else(|| {
            ServerError::Internal {
                details: "breakfast row missing right after insert".to_owned(),
            }
        })
    }

    pub async fn find_all(&self) -> Result<Vec<Breakfast>> {
        self.store.find_all().await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Breakfast> {
        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::BREAKFAST_NOT_FOUND.to_owned())
        })
    }

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Breakfast> {
        self.store.find_by_date(date).await?.ok_or_else(|| {
            ServerError::NotFound(super::BREAKFAST_NOT_FOUND.to_owned())
        })
    }

    pub async fn update(&self, id: i64, date: NaiveDate) -> Result<Breakfast> {
        let current = self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::BREAKFAST_NOT_FOUND.to_owned())
        })?;

        if current.date != date && self.store.find_by_date(date).await?.is_some()
        {
            return Err(ServerError::BadRequest(super::DATE_TAKEN.to_owned()));
        }

        self.store.update(id, date).await?;

        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::BREAKFAST_NOT_FOUND.to_owned())
        })
    }

    /// Delete a breakfast by id. Absent ids are a [`ServerError::NotFound`].
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::BREAKFAST_NOT_FOUND.to_owned())
        })?;

        self.store.delete(id).await
    }
}
