//! Products HTTP API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Valid;
use crate::AppState;
use crate::error::Result;
use crate::product::Product;

/// Expected body for the [`create`] and [`update`] handlers.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 1, max = 255, message = "Missing 'name' field."))]
    pub name: String,
}

/// Handler to create a new product. The stored name is title-cased.
pub async fn create(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.products.create(&body.name).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Handler to list every product.
pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products.find_all().await?))
}

/// Handler to get one product by its identifier.
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    Ok(Json(state.products.find_by_id(id).await?))
}

/// Handler to get one product by its exact stored name.
pub async fn find_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.products.find_by_name(&name).await?))
}

/// Handler to rename a product. The new name is title-cased.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Valid(body): Valid<Body>,
) -> Result<Json<Product>> {
    Ok(Json(state.products.update(id, &body.name).await?))
}

/// Handler to delete a product.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String> {
    state.products.delete(id).await?;
    Ok("Success!".to_owned())
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /products` goes to `create`, `GET /products` goes to `find_all`.
        .route("/", post(create).get(find_all))
        // `GET /products/:ID` goes to `find_by_id`.
        // `PUT /products/:ID` goes to `update`.
        // `DELETE /products/:ID` goes to `remove`.
        .route("/{id}", get(find_by_id).put(update).delete(remove))
        // `GET /products/names/:NAME` goes to `find_by_name`.
        .route("/names/{name}", get(find_by_name))
}
