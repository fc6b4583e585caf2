//! HTTP routes.

pub mod auth;
pub mod breakfasts;
pub mod items;
pub mod products;
pub mod users;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ServerError;

/// Bearer scheme prefix on the `Authorization` header.
pub const BEARER: &str = "Bearer ";

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Rejections share the error shape of every other failure, so malformed
/// JSON and failed field rules both answer `{"message", "status"}`.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Memory-backed stores kept next to the state they serve.
/// Tests seed rows and read call counters through these handles.
#[cfg(test)]
pub(crate) struct TestStores {
    pub users: std::sync::Arc<crate::user::memory::MemoryUserStore>,
    pub products: std::sync::Arc<crate::product::memory::MemoryProductStore>,
    pub breakfasts: std::sync::Arc<crate::breakfast::memory::MemoryBreakfastStore>,
    pub items: std::sync::Arc<crate::item::memory::MemoryItemStore>,
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub(crate) fn state() -> (crate::AppState, TestStores) {
    use std::sync::Arc;

    use crate::breakfast::{BreakfastService, memory::MemoryBreakfastStore};
    use crate::config::{Argon2, Configuration};
    use crate::crypto::PasswordManager;
    use crate::item::{ItemService, memory::MemoryItemStore};
    use crate::product::{ProductService, memory::MemoryProductStore};
    use crate::token::TokenManager;
    use crate::user::{UserService, memory::MemoryUserStore};

    const SECRET: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWYwMTIzNDU2Nzg5YWJjZGVmMDEyMzQ1Njc4OWFiY2RlZg==";

    // Cheap Argon2 parameters, tests hash a lot of throwaway passwords.
    let crypto = Arc::new(
        PasswordManager::new(Some(Argon2 {
            memory_cost: 1024,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        }))
        .unwrap(),
    );

    let stores = TestStores {
        users: Arc::new(MemoryUserStore::default()),
        products: Arc::new(MemoryProductStore::default()),
        breakfasts: Arc::new(MemoryBreakfastStore::default()),
        items: Arc::new(MemoryItemStore::default()),
    };

    let state = crate::AppState {
        config: Arc::new(Configuration::default()),
        token: TokenManager::new("matina", SECRET, None).unwrap(),
        users: UserService::new(stores.users.clone(), crypto),
        products: ProductService::new(stores.products.clone()),
        breakfasts: BreakfastService::new(stores.breakfasts.clone()),
        items: ItemService::new(stores.items.clone()),
    };

    (state, stores)
}
