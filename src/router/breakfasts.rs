//! Breakfasts HTTP API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Valid;
use crate::AppState;
use crate::breakfast::Breakfast;
use crate::error::{Result, ServerError};

const INVALID_DATE: &str = "date must be in the YYYY-MM-DD format";

/// Expected body for the [`create`] and [`update`] handlers.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    pub date: NaiveDate,
}

/// Handler to schedule a breakfast on a new date.
pub async fn create(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Breakfast>)> {
    let breakfast = state.breakfasts.create(body.date).await?;

    Ok((StatusCode::CREATED, Json(breakfast)))
}

/// Handler to list every breakfast, oldest date first.
pub async fn find_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<Breakfast>>> {
    Ok(Json(state.breakfasts.find_all().await?))
}

/// Handler to get one breakfast by its identifier.
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Breakfast>> {
    Ok(Json(state.breakfasts.find_by_id(id).await?))
}

/// Handler to get one breakfast by its date.
///
/// The segment is parsed by hand so a malformed date answers with the
/// same `{"message", "status"}` body as every other bad input.
pub async fn find_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Breakfast>> {
    let date = date
        .parse::<NaiveDate>()
        .map_err(|_| ServerError::BadRequest(INVALID_DATE.to_owned()))?;

    Ok(Json(state.breakfasts.find_by_date(date).await?))
}

/// Handler to move a breakfast to another date.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Valid(body): Valid<Body>,
) -> Result<Json<Breakfast>> {
    Ok(Json(state.breakfasts.update(id, body.date).await?))
}

/// Handler to delete a breakfast.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<String> {
    state.breakfasts.delete(id).await?;
    Ok("Success!".to_owned())
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /breakfasts` goes to `create`, `GET /breakfasts` goes to `find_all`.
        .route("/", post(create).get(find_all))
        // `GET /breakfasts/:ID` goes to `find_by_id`.
        // `PUT /breakfasts/:ID` goes to `update`.
        // `DELETE /breakfasts/:ID` goes to `remove`.
        .route("/{id}", get(find_by_id).put(update).delete(remove))
        // `GET /breakfasts/dates/:DATE` goes to `find_by_date`.
        .route("/dates/{date}", get(find_by_date))
}
