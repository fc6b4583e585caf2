//! Users HTTP API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Valid;
use crate::AppState;
use crate::error::Result;
use crate::user::User;

/// Expected body for the [`create`] handler.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
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

/// Expected body for the [`update`] handler.
///
/// No password here: updates touch name and CPF only. Clients that still
/// send a password field get it silently ignored.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Update {
    #[validate(length(min = 1, max = 255, message = "Missing 'name' field."))]
    pub name: String,
    #[validate(length(equal = 11, message = "CPF must be 11 digits."))]
    pub cpf: String,
}

/// Handler to create a new user.
pub async fn create(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .users
        .create(&body.name, &body.cpf, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler to list every user.
pub async fn find_all(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users.find_all().await?))
}

/// Handler to get one user by its identifier.
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>> {
    Ok(Json(state.users.find_by_id(id).await?))
}

/// Handler to get one user by its CPF.
pub async fn find_by_cpf(
    State(state): State<AppState>,
    Path(cpf): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users.find_by_cpf(&cpf).await?))
}

/// Handler to update a user's name and CPF.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Valid(body): Valid<Update>,
) -> Result<Json<User>> {
    Ok(Json(state.users.update(id, &body.name, &body.cpf).await?))
}

/// Handler to delete a user.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String> {
    state.users.delete(id).await?;
    Ok("Success!".to_owned())
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /users` goes to `create`, `GET /users` goes to `find_all`.
        .route("/", post(create).get(find_all))
        // `GET /users/:ID` goes to `find_by_id`.
        // `PUT /users/:ID` goes to `update`.
        // `DELETE /users/:ID` goes to `remove`.
        .route(
            "/{id}",
            get(find_by_id).put(update).delete(remove),
        )
        // `GET /users/cpf/:CPF` goes to `find_by_cpf`.
        .route("/cpf/{cpf}", get(find_by_cpf))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use crate::{app, make_request, router};

    const CPF: &str = "52998224725";

    fn body(name: &str, cpf: &str) -> String {
        json!({ "name": name, "cpf": cpf, "password": "strong-password" })
            .to_string()
    }

    async fn json_of(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let (state, _) = router::state();
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            body("Maria Souza", CPF),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = json_of(response).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["name"], "Maria Souza");
        assert_eq!(created["cpf"], CPF);
        // The hash never leaves the server, nor does the role.
        assert!(created.get("password").is_none());
        assert!(created.get("role").is_none());

        let response = make_request(
            app.clone(),
            Method::GET,
            "/users/1",
            String::new(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await, created);

        let response = make_request(
            app.clone(),
            Method::GET,
            &format!("/users/cpf/{CPF}"),
            String::new(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await, created);

        let response =
            make_request(app, Method::GET, "/users", String::new(), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_of(response).await, json!([created]));
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let (state, _) = router::state();
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            body("Maria Souza", CPF),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(
            app.clone(),
            Method::PUT,
            "/users/1",
            json!({ "name": "Maria Silva", "cpf": CPF }).to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let updated = json_of(response).await;
        assert_eq!(updated["name"], "Maria Silva");

        let response = make_request(
            app.clone(),
            Method::DELETE,
            "/users/1",
            String::new(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = make_request(
            app,
            Method::GET,
            "/users/1",
            String::new(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_of(response).await;
        assert_eq!(body["message"], "user not found");
        assert_eq!(body["status"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_duplicate_cpf() {
        let (state, stores) = router::state();
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            body("Maria Souza", CPF),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(
            app,
            Method::POST,
            "/users",
            body("Impostor", CPF),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_of(response).await;
        assert_eq!(body["message"], "user with this CPF already exists");

        // The conflicting insert never reached the store.
        assert_eq!(
            stores
                .users
                .inserts
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_create_rejects_short_body() {
        let (state, _) = router::state();
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/users",
            json!({ "name": "", "cpf": "123", "password": "x" }).to_string(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_of(response).await;
        assert_eq!(body["status"], "BAD_REQUEST");
        // Messages are sorted, one per failed rule.
        assert_eq!(
            body["message"],
            "CPF must be 11 digits. Missing 'name' field. \
             Password must contain at least 8 characters."
        );
    }

    #[tokio::test]
    async fn test_repeated_digit_cpf() {
        let (state, _) = router::state();
        let app = app(state);

        let response = make_request(
            app,
            Method::POST,
            "/users",
            body("Maria Souza", "11111111111"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_of(response).await;
        assert_eq!(
            body["message"],
            "CPF must be 11 digits and not a repeated sequence"
        );
    }
}
