use axum::{routing::get, Router};

use super::handlers::{
    available_slots, create_counselor, delete_counselor, get_counselor, list_counselors,
    update_counselor,
};
use crate::app_state::AppState;

pub fn counselor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_counselors).post(create_counselor))
        .route(
            "/{id}",
            get(get_counselor)
                .put(update_counselor)
                .delete(delete_counselor),
        )
        .route("/{id}/slots", get(available_slots))
}
