use axum::{routing::get, Router};

use super::handlers::{
    create_appointment, delete_appointment, list_appointments, update_appointment,
};
use crate::app_state::AppState;

pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route(
            "/{id}",
            axum::routing::put(update_appointment).delete(delete_appointment),
        )
}
