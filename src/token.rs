//! Manage json web tokens.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_TTL: u64 = 1000 * 60 * 60; // 1 hour, in milliseconds.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// Comma-separated roles granted to the subject.
    pub roles: String,
    /// CPF of the user.
    pub sub: String,
}

impl Claims {
    /// Whether `role` is asserted on the token.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.split(',').any(|granted| granted == role)
    }
}

/// Manage JWT tokens.
///
/// Tokens are signed with HMAC-SHA512. The configured secret is base64;
/// both signing and validation use the same decoded key.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    issuer: String,
    ttl: u64,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(
        issuer: &str,
        base64_secret: &str,
        ttl_ms: Option<u64>,
    ) -> Result<Self> {
        let encoding_key = EncodingKey::from_base64_secret(base64_secret)?;
        let decoding_key = DecodingKey::from_base64_secret(base64_secret)?;

        Ok(Self {
            algorithm: Algorithm::HS512,
            decoding_key,
            encoding_key,
            issuer: issuer.to_owned(),
            ttl: ttl_ms.unwrap_or(DEFAULT_TTL),
        })
    }

    /// Create a new token asserting `user_cpf` and its roles.
    pub fn create(&self, user_cpf: &str, roles: &str) -> Result<String> {
        let now = get_current_timestamp();
        let claims = Claims {
            exp: now + self.ttl / 1000,
            iat: now,
            iss: self.issuer.clone(),
            roles: roles.to_owned(),
            sub: user_cpf.to_owned(),
        };

        Ok(encode(
            &Header::new(self.algorithm),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);
        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }

    /// CPF asserted by a valid token.
    pub fn subject_of(&self, token: &str) -> Result<String> {
        Ok(self.decode(token)?.sub)
    }

    /// Whether a token is well-formed, signed with our key and not expired.
    ///
    /// Never fails: any decoding error means `false`.
    pub fn validate(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }
}
