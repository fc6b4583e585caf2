use std::sync::Arc;

use crate::error::{Result, ServerError};
use crate::product::{Product, ProductStore};

/// Title-case a product name: every whitespace-separated word gets an
/// upper first letter and a lower remainder, so "pão de queijo" is stored
/// as "Pão De Queijo". Runs of whitespace collapse to a single space.
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>()
                        + &chars.as_str().to_lowercase()
                },
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Product manager.
///
/// Names are normalized on the write paths (create, update); lookups use
/// the key exactly as given.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    /// Create a new [`ProductService`].
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, name: &str) -> Result<Product> {
        let name = title_case(name);

        if self.store.find_by_name(&name).await?.is_some() {
            return Err(ServerError::BadRequest(super::NAME_TAKEN.to_owned()));
        }

        self.store.insert(&name).await?;

        // Answer with the persisted state, not the in-memory input.
        self.store.find_by_name(&name).await?.ok_or_else(|| {
            ServerError::Internal {
                details: "product row missing right after insert".to_owned(),
            }
        })
    }

    pub async fn find_all(&self) -> Result<Vec<Product>> {
        self.store.find_all().await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Product> {
        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::PRODUCT_NOT_FOUND.to_owned())
        })
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Product> {
        self.store.find_by_name(name).await?.ok_or_else(|| {
            ServerError::NotFound(super::PRODUCT_NOT_FOUND.to_owned())
        })
    }

    pub async fn update(&self, id: i64, name: &str) -> Result<Product> {
        let name = title_case(name);

        let current = self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::PRODUCT_NOT_FOUND.to_owned())
        })?;

        if current.name != name && self.store.find_by_name(&name).await?.is_some()
        {
            return Err(ServerError::BadRequest(super::NAME_TAKEN.to_owned()));
        }

        self.store.update(id, &name).await?;

        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::PRODUCT_NOT_FOUND.to_owned())
        })
    }

    /// Delete a product by id. Absent ids are a [`ServerError::NotFound`].
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::PRODUCT_NOT_FOUND.to_owned())
        })?;

        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::product::memory::MemoryProductStore;

    fn service() -> (Arc<MemoryProductStore>, ProductService) {
        let store = Arc::new(MemoryProductStore::default());
        (Arc::clone(&store), ProductService::new(store))
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("queijo"), "Queijo");
        assert_eq!(title_case("pão de queijo"), "Pão De Queijo");
        assert_eq!(title_case("BOLO DE FUBÁ"), "Bolo De Fubá");
        assert_eq!(title_case("  suco   de\tlaranja "), "Suco De Laranja");
        assert_eq!(title_case(""), "");
    }

    #[tokio::test]
    async fn test_create_normalizes_name() {
        let (store, products) = service();

        let product = products.create("pão de queijo").await.unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Pão De Queijo");
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_conflict_never_inserts() {
        let (store, products) = service();

        products.create("queijo").await.unwrap();

        // Same name modulo casing collides after normalization.
        let err = products.create("QUEIJO").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookups_use_key_as_given() {
        let (_, products) = service();

        products.create("queijo").await.unwrap();

        // Reads are not normalized: only the stored form matches.
        assert!(products.find_by_name("Queijo").await.is_ok());
        let err = products.find_by_name("queijo").await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_unchanged_name_skips_conflict_read() {
        let (store, products) = service();

        let product = products.create("queijo").await.unwrap();
        store.name_reads.store(0, Ordering::SeqCst);

        let updated = products.update(product.id, "Queijo").await.unwrap();
        assert_eq!(updated.name, "Queijo");
        assert_eq!(store.name_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_to_taken_name() {
        let (store, products) = service();

        products.create("queijo").await.unwrap();
        let other = products.create("presunto").await.unwrap();

        let err = products.update(other.id, "queijo").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let (_, products) = service();

        // create "queijo", stored title-cased.
        let product = products.create("queijo").await.unwrap();
        assert_eq!(product.name, "Queijo");

        // creating "Queijo" again is a conflict.
        let err = products.create("Queijo").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));

        // find by the stored name succeeds.
        let found = products.find_by_name("Queijo").await.unwrap();
        assert_eq!(found.id, product.id);

        // delete by id, then the id is gone.
        products.delete(product.id).await.unwrap();
        let err = products.find_by_id(product.id).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }
}
