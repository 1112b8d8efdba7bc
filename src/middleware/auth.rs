use axum::{extract::FromRequestParts, http::request::Parts};

use crate::app_state::AppState;
use crate::error::AppError;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Marker extractor for operations reserved to administrators: status
/// transitions, record edits, deletes and counselor management.
///
/// Identity itself lives upstream; this only verifies the shared token the
/// auth layer attaches to forwarded requests.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        match presented {
            Some(token) if token == state.env.app.admin_token => Ok(AdminAuth),
            _ => Err(AppError::Unauthorized(
                "administrator token missing or invalid".into(),
            )),
        }
    }
}
