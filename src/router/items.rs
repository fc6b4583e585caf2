//! Selection HTTP API: choose a product, withdraw it, confirm delivery.

use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{BEARER, Valid};
use crate::AppState;
use crate::error::{Result, ServerError};
use crate::item::Item;
use crate::user::Role;

/// Expected body for the [`choose`] and [`remove`] handlers.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Selection {
    pub user_id: i64,
    pub product_id: i64,
}

/// Expected body for the [`delivered`] handler.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Delivered {
    pub delivered: bool,
}

/// Handler to record that a user chose a product for a breakfast.
pub async fn choose(
    State(state): State<AppState>,
    Path(breakfast_id): Path<i64>,
    Valid(body): Valid<Selection>,
) -> Result<(StatusCode, Json<Item>)> {
    let item = state
        .items
        .choose(breakfast_id, body.user_id, body.product_id)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler to withdraw a selection. Absent rows are still a 200.
pub async fn remove(
    State(state): State<AppState>,
    Path(breakfast_id): Path<i64>,
    Valid(body): Valid<Selection>,
) -> Result<String> {
    state
        .items
        .remove(breakfast_id, body.user_id, body.product_id)
        .await?;

    Ok("Success!".to_owned())
}

/// Handler to set the delivered flag of a selection.
pub async fn delivered(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Valid(body): Valid<Delivered>,
) -> Result<String> {
    state.items.confirm_delivered(id, body.delivered).await?;

    Ok("Success!".to_owned())
}

/// Let the request through only with a bearer token carrying ADMIN.
async fn admin_only(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ServerError::Unauthorized)?
        .replace(BEARER, "");

    let claims = state.token.decode(&token)?;
    if !claims.has_role(Role::Admin.as_str()) {
        return Err(ServerError::Unauthorized);
    }

    Ok(next.run(req).await)
}

/// Selection routes, nested under `/breakfasts`.
pub fn selection_router() -> Router<AppState> {
    Router::new()
        // `POST /breakfasts/:ID/items` goes to `choose`.
        // `DELETE /breakfasts/:ID/items` goes to `remove`.
        .route("/{id}/items", post(choose).delete(remove))
}

/// Delivery routes, nested under `/items`. ADMIN tokens only.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `PATCH /items/:ID/delivered` goes to `delivered`.
        .route("/{id}/delivered", patch(delivered))
        .route_layer(middleware::from_fn_with_state(state, admin_only))
}
