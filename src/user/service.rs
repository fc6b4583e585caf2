use std::sync::{Arc, LazyLock};

use regex_lite::Regex;

use crate::crypto::{CryptoError, PasswordManager};
use crate::error::{Result, ServerError};
use crate::user::{Role, User, UserStore};

static CPF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{11}$").unwrap());

/// Shape check for a CPF: exactly 11 digits, not one digit repeated
/// 11 times ("11111111111" is trivially invalid).
pub fn is_valid_cpf(cpf: &str) -> bool {
    if !CPF_PATTERN.is_match(cpf) {
        return false;
    }

    let first = cpf.as_bytes()[0];
    !cpf.bytes().all(|digit| digit == first)
}

/// User manager.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    crypto: Arc<PasswordManager>,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(store: Arc<dyn UserStore>, crypto: Arc<PasswordManager>) -> Self {
        Self { store, crypto }
    }

    /// Register a new user with the default `USER` role.
    ///
    /// The CPF is the natural key: an existing row with the same CPF is a
    /// conflict. The password is argon2-hashed before it reaches storage.
    pub async fn create(
        &self,
        name: &str,
        cpf: &str,
        password: &str,
    ) -> Result<User> {
        if !is_valid_cpf(cpf) {
            return Err(ServerError::BadRequest(super::INVALID_CPF.to_owned()));
        }
        if self.store.find_by_cpf(cpf).await?.is_some() {
            return Err(ServerError::BadRequest(super::CPF_TAKEN.to_owned()));
        }

        let hash = self.crypto.hash_password(password)?;
        self.store.insert(name, cpf, &hash, Role::User).await?;

        // Answer with the persisted state, not the in-memory input.
        self.store.find_by_cpf(cpf).await?.ok_or_else(|| {
            ServerError::Internal {
                details: "user row missing right after insert".to_owned(),
            }
        })
    }

    pub async fn find_all(&self) -> Result<Vec<User>> {
        self.store.find_all().await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServerError::NotFound(super::USER_NOT_FOUND.to_owned()))
    }

    pub async fn find_by_cpf(&self, cpf: &str) -> Result<User> {
        if !is_valid_cpf(cpf) {
            return Err(ServerError::BadRequest(super::INVALID_CPF.to_owned()));
        }

        self.store
            .find_by_cpf(cpf)
            .await?
            .ok_or_else(|| ServerError::NotFound(super::USER_NOT_FOUND.to_owned()))
    }

    /// Update `name` and `cpf` of an existing user.
    ///
    /// When the CPF changes, the new value must not belong to any row;
    /// an unchanged CPF skips that conflict read entirely.
    pub async fn update(&self, id: i64, name: &str, cpf: &str) -> Result<User> {
        if !is_valid_cpf(cpf) {
            return Err(ServerError::BadRequest(super::INVALID_CPF.to_owned()));
        }

        let current = self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::USER_NOT_FOUND.to_owned())
        })?;

        if current.cpf != cpf && self.store.find_by_cpf(cpf).await?.is_some() {
            return Err(ServerError::BadRequest(super::CPF_TAKEN.to_owned()));
        }

        self.store.update(id, name, cpf).await?;

        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServerError::NotFound(super::USER_NOT_FOUND.to_owned()))
    }

    /// Delete a user by id. Absent ids are a [`ServerError::NotFound`].
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.find_by_id(id).await?.ok_or_else(|| {
            ServerError::NotFound(super::USER_NOT_FOUND.to_owned())
        })?;

        self.store.delete(id).await
    }

    /// Check login credentials, yielding the matching user.
    ///
    /// Unknown CPF and wrong password both surface as
    /// [`ServerError::Unauthorized`]; nothing reveals which one failed.
    pub async fn verify_credentials(
        &self,
        cpf: &str,
        password: &str,
    ) -> Result<User> {
        let user = self
            .store
            .find_by_cpf(cpf)
            .await?
            .ok_or(ServerError::Unauthorized)?;

        match self.crypto.verify_password(password, &user.password) {
            Ok(()) => Ok(user),
            Err(CryptoError::Mismatch) => Err(ServerError::Unauthorized),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::config::Argon2 as ArgonConfig;
    use crate::user::memory::MemoryUserStore;

    fn service() -> (Arc<MemoryUserStore>, UserService) {
        let store = Arc::new(MemoryUserStore::default());
        let crypto = Arc::new(
            PasswordManager::new(Some(ArgonConfig {
                memory_cost: 1024,
                iterations: 1,
                parallelism: 1,
                hash_length: 32,
            }))
            .unwrap(),
        );

        (Arc::clone(&store), UserService::new(store, crypto))
    }

    #[test]
    fn test_cpf_shape() {
        assert!(is_valid_cpf("52998224725"));
        assert!(is_valid_cpf("00011122233"));

        assert!(!is_valid_cpf("11111111111")); // repeated digits.
        assert!(!is_valid_cpf("5299822472")); // 10 digits.
        assert!(!is_valid_cpf("529982247250")); // 12 digits.
        assert!(!is_valid_cpf("5299822472a"));
        assert!(!is_valid_cpf(""));
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let (store, users) = service();

        let user = users.create("Ana", "52998224725", "Test1234").await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.cpf, "52998224725");
        assert_eq!(user.role, Role::User);
        assert!(user.password.starts_with("$argon2id$"));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_conflict_never_inserts() {
        let (store, users) = service();

        users.create("Ana", "52998224725", "Test1234").await.unwrap();
        let err = users
            .create("Bia", "52998224725", "Test1234")
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::BadRequest(_)));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_cpf() {
        let (store, users) = service();

        let err = users.create("Ana", "11111111111", "Test1234").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));

        // Shape is checked before any storage call.
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
        assert_eq!(store.cpf_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_unchanged_cpf_skips_conflict_read() {
        let (store, users) = service();

        let user = users.create("Ana", "52998224725", "Test1234").await.unwrap();
        store.cpf_reads.store(0, Ordering::SeqCst);

        let updated = users
            .update(user.id, "Ana Clara", "52998224725")
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana Clara");
        assert_eq!(store.cpf_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_to_taken_cpf() {
        let (store, users) = service();

        users.create("Ana", "52998224725", "Test1234").await.unwrap();
        let other = users.create("Bia", "00011122233", "Test1234").await.unwrap();

        let err = users
            .update(other.id, "Bia", "52998224725")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));

        // The write was never issued.
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
        assert_eq!(
            users.find_by_id(other.id).await.unwrap().cpf,
            "00011122233"
        );
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (_, users) = service();

        let err = users.update(99, "Ana", "52998224725").await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_read_back() {
        let (_, users) = service();

        let user = users.create("Ana", "52998224725", "Test1234").await.unwrap();
        users.delete(user.id).await.unwrap();

        let err = users.find_by_id(user.id).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        let err = users.delete(user.id).await.unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_cpf_validates_shape() {
        let (store, users) = service();

        let err = users.find_by_cpf("not-a-cpf").await.unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert_eq!(store.cpf_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let (_, users) = service();

        users.create("Ana", "52998224725", "Test1234").await.unwrap();

        let user = users
            .verify_credentials("52998224725", "Test1234")
            .await
            .unwrap();
        assert_eq!(user.cpf, "52998224725");

        let err = users
            .verify_credentials("52998224725", "WrongPass1")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized));

        let err = users
            .verify_credentials("00011122233", "Test1234")
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Unauthorized));
    }
}
