use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::json_or_default;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::LoginCommand;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let body = json_or_default(body);
    let command = LoginCommand::parse(body.username, body.password)?;

    state
        .user_service
        .login(command)
        .await
        .map_err(ApiError::from)
        .map(|token| ApiSuccess::new("Login successfully!", LoginResponseData { token }))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
}
