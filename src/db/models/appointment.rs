use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::hhmm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub counselor_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: Date,
    #[serde(with = "hhmm")]
    pub time: Time,
    pub purpose: String,
    pub status: AppointmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Public booking request. Date and time arrive as the wire strings
/// (`YYYY-MM-DD`, `HH:MM`) and are parsed by the lifecycle service so the
/// caller gets field-level messages instead of a body-level reject.
#[derive(Debug, Deserialize, Validate)]
pub struct NewAppointment {
    pub counselor_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(min = 6, max = 20, message = "Phone number is not valid"))]
    pub phone: String,
    pub date: String,
    pub time: String,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
}

/// Administrative update. A status-only body performs approve/reject; any
/// other present field makes this a (partial) record edit.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAppointment {
    pub status: Option<AppointmentStatus>,
    pub counselor_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Phone number is not valid"))]
    pub phone: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: Option<String>,
}

/// Filter for the administrative and public appointment listings.
#[derive(Debug, Default, Clone)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub search: Option<String>,
}
