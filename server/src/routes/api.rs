use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use hexworld_shared::api::ErrorBody;

use crate::state::AppState;

/// Handler failure rendered as `{ "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "admin token required")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::message(self.message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Gate for mutating endpoints. Open when no admin token is configured.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(());
    };
    match bearer_token(headers) {
        Some(token) if token == expected => Ok(()),
        _ => {
            tracing::warn!("rejected mutation without a valid admin token");
            Err(ApiError::unauthorized())
        }
    }
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let world = state.world.read().await;
    Json(serde_json::json!({
        "status": "ok",
        "tiles": world.tiles.len(),
        "mapSize": world.map_size,
        "version": world.version,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use hexworld_shared::WorldMap;

    use super::*;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn open_when_no_token_configured() {
        let state = AppState::new(WorldMap::default(), None, None);
        assert_eq!(authorize(&state, &HeaderMap::new()), Ok(()));
        assert_eq!(authorize(&state, &headers_with("Bearer ")), Ok(()));
    }

    #[test]
    fn token_must_match_when_configured() {
        let state = AppState::new(WorldMap::default(), Some("s3cret".to_string()), None);
        assert_eq!(authorize(&state, &headers_with("Bearer s3cret")), Ok(()));
        assert_eq!(
            authorize(&state, &headers_with("Bearer nope")),
            Err(ApiError::unauthorized())
        );
        assert_eq!(
            authorize(&state, &headers_with("Bearer ")),
            Err(ApiError::unauthorized())
        );
        assert_eq!(
            authorize(&state, &HeaderMap::new()),
            Err(ApiError::unauthorized())
        );
        assert_eq!(
            authorize(&state, &headers_with("s3cret")),
            Err(ApiError::unauthorized())
        );
    }
}
