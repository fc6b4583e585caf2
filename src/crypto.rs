//! Cryptographic logic.

use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Argon2, Params, Version};
use rand::rngs::OsRng;

use crate::config::Argon2 as ArgonConfig;

type Result<T> = std::result::Result<T, CryptoError>;

#[derive(thiserror::Error, Debug)]
pub enum CryptoError {
    #[error("argon2 error: {0}")]
    Argon2(String),
    #[error("password does not match")]
    Mismatch,
}

/// Password manager that uses Argon2id and PHC string format for hashing and
/// verification.
#[derive(Clone)]
pub struct PasswordManager {
    params: Params,
}

impl PasswordManager {
    /// Create a new [`PasswordManager`].
    pub fn new(config: Option<ArgonConfig>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            Some(config.hash_length),
        )
        .map_err(|err| CryptoError::Argon2(err.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2 {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            Version::V0x13,
            self.params.clone(),
        )
    }

    /// Hash password using Argon2id.
    pub fn hash_password(&self, password: impl AsRef<[u8]>) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_ref(), &salt)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify password against a PHC string.
    ///
    /// A wrong password yields [`CryptoError::Mismatch`]; a PHC string that
    /// cannot be parsed yields [`CryptoError::Argon2`].
    pub fn verify_password(
        &self,
        password: impl AsRef<[u8]>,
        phc_hash: &str,
    ) -> Result<()> {
        let parsed = PasswordHash::new(phc_hash)
            .map_err(|e| CryptoError::Argon2(e.to_string()))?;

        self.argon2()
            .verify_password(password.as_ref(), &parsed)
            .map_err(|_| CryptoError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PasswordManager {
        // Low-cost parameters to keep tests fast.
        PasswordManager::new(Some(ArgonConfig {
            memory_cost: 1024,
            iterations: 1,
            parallelism: 1,
            hash_length: 32,
        }))
        .unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let pwd = manager();
        let hash = pwd.hash_password("Test1234").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(pwd.verify_password("Test1234", &hash).is_ok());
        assert!(matches!(
            pwd.verify_password("Test1235", &hash),
            Err(CryptoError::Mismatch)
        ));
    }

    #[test]
    fn test_two_hashes_never_collide() {
        let pwd = manager();

        // Salts are random so the PHC strings must differ.
        let first = pwd.hash_password("Test1234").unwrap();
        let second = pwd.hash_password("Test1234").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_phc_string() {
        let pwd = manager();

        assert!(matches!(
            pwd.verify_password("Test1234", "not-a-phc-string"),
            Err(CryptoError::Argon2(_))
        ));
    }
}
