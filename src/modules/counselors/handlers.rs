use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{hhmm, ymd, Counselor, NewCounselor, UpdateCounselor};
use crate::error::{AppError, AppResult, FieldError};
use crate::middleware::auth::AdminAuth;

#[derive(Debug, Deserialize)]
pub struct ListCounselorsParams {
    /// When true, only counselors currently accepting bookings.
    #[serde(default)]
    pub active: bool,
}

pub async fn list_counselors(
    State(state): State<AppState>,
    Query(params): Query<ListCounselorsParams>,
) -> AppResult<Json<Vec<Counselor>>> {
    let rows = state.scheduler.list_counselors(params.active).await?;
    Ok(Json(rows))
}

pub async fn get_counselor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Counselor>> {
    Ok(Json(state.scheduler.get_counselor(id).await?))
}

pub async fn create_counselor(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<NewCounselor>,
) -> AppResult<(StatusCode, Json<Counselor>)> {
    let row = state.scheduler.create_counselor(req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_counselor(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateCounselor>,
) -> AppResult<Json<Counselor>> {
    Ok(Json(state.scheduler.update_counselor(id, patch).await?))
}

pub async fn delete_counselor(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.scheduler.delete_counselor(id).await?;
    Ok(Json(json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct SlotsParams {
    pub date: String,
}

/// Available times for one counselor on one date, as `HH:MM` strings.
pub async fn available_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SlotsParams>,
) -> AppResult<Json<Vec<String>>> {
    let date = ymd::parse(&params.date).ok_or_else(|| {
        AppError::Validation(vec![FieldError::new(
            "date",
            "Date must be formatted YYYY-MM-DD",
        )])
    })?;
    let slots = state.scheduler.available_slots(id, date).await?;
    Ok(Json(slots.into_iter().map(hhmm::format).collect()))
}
