use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{
    Appointment, AppointmentFilter, AppointmentStatus, NewAppointment, UpdateAppointment,
};
use crate::error::AppResult;
use crate::middleware::auth::AdminAuth;
use crate::scheduling::proximity::Page;

/// Public booking endpoint; everything else on this surface is
/// administrative.
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<NewAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let row = state.scheduler.create_appointment(req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Deserialize)]
pub struct ListAppointmentsParams {
    pub status: Option<AppointmentStatus>,
    /// Case-insensitive substring over requester name and purpose.
    pub q: Option<String>,
    pub page: Option<usize>,
}

pub async fn list_appointments(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListAppointmentsParams>,
) -> AppResult<Json<Page<Appointment>>> {
    let filter = AppointmentFilter {
        status: params.status,
        search: params.q,
    };
    let page = state
        .scheduler
        .list_appointments(filter, params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

pub async fn update_appointment(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateAppointment>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.scheduler.update_appointment(id, patch).await?))
}

pub async fn delete_appointment(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    state.scheduler.delete_appointment(id).await?;
    Ok(Json(json!({ "deleted": true })))
}
