mod repository;
mod service;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

pub(crate) const CPF_TAKEN: &str = "user with this CPF already exists";
pub(crate) const USER_NOT_FOUND: &str = "user not found";
pub(crate) const INVALID_CPF: &str =
    "CPF must be 11 digits and not a repeated sequence";

/// Access level of a [`User`].
///
/// Stored as the `user_role` enum on database and asserted on bearer
/// tokens through [`Role::as_str`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Upper-case label of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

/// User as saved on database.
///
/// `password` holds the argon2 PHC string and never leaves the server;
/// `role` is asserted on tokens instead of response bodies.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub cpf: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub role: Role,
}
