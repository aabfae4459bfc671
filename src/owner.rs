use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, state::AppState};

pub const OWNER_HEADER: &str = "x-user-id";

/// Owner of the data a request touches, taken from the `X-User-Id` header
/// or the configured default owner.
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(OWNER_HEADER) else {
            return Ok(Owner(state.config.default_owner_id));
        };

        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(Owner)
            .ok_or_else(|| AppError::BadRequest("invalid X-User-Id header".into()))
    }
}
