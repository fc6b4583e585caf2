//! Authentication routes: register, login and token validation.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{BEARER, Valid};
use crate::AppState;
use crate::error::Result;

/// Expected body for the [`login`] handler.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Login {
    #[validate(length(equal = 11, message = "CPF must be 11 digits."))]
    pub cpf: String,
    #[validate(length(min = 1, message = "Missing 'password' field."))]
    pub password: String,
}

/// Expected body for the [`register`] handler.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Register {
    #[validate(length(min = 1, max = 255, message = "Missing 'name' field."))]
    pub name: String,
    #[validate(length(equal = 11, message = "CPF must be 11 digits."))]
    pub cpf: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    pub password: String,
}

/// Handler to exchange credentials for a bearer token.
///
/// The raw token is the whole response body. Unknown CPF and wrong
/// password answer the same 401.
pub async fn login(
    State(state): State<AppState>,
    Valid(body): Valid<Login>,
) -> Result<String> {
    let user = state
        .users
        .verify_credentials(&body.cpf, &body.password)
        .await?;

    state.token.create(&user.cpf, user.role.as_str())
}

/// Handler to register a new user with the default role.
pub async fn register(
    State(state): State<AppState>,
    Valid(body): Valid<Register>,
) -> Result<(StatusCode, String)> {
    state
        .users
        .create(&body.name, &body.cpf, &body.password)
        .await?;

    Ok((StatusCode::CREATED, "User registered!".to_owned()))
}

/// Handler to check a bearer token without touching the database.
///
/// Always 200: the boolean body carries the verdict. A missing header or
/// a missing `Bearer ` prefix is simply `false`.
pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<bool> {
    let valid = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER))
        .is_some_and(|token| state.token.validate(token));

    Json(valid)
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /auth/login` goes to `login`.
        .route("/login", post(login))
        // `POST /auth/register` goes to `register`.
        .route("/register", post(register))
        // `POST /auth/validate` goes to `validate`.
        .route("/validate", post(validate))
}
