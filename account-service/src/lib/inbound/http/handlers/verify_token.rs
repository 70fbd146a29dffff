use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<VerifyTokenResponseData>, ApiError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    state
        .user_service
        .verify_token(authorization)
        .map_err(ApiError::from)
        .map(|decoded| ApiSuccess::new("Verify successfully!", VerifyTokenResponseData { decoded }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyTokenResponseData {
    pub decoded: auth::Claims,
}
