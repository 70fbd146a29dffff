use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::json_or_default;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    let body = json_or_default(body);
    let command = RegisterCommand::parse(body.name, body.username, body.password, body.email)?;

    state
        .user_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::new(
                "Register successfully!",
                RegisterResponseData {
                    result: user.into(),
                },
            )
        })
}

/// HTTP request body for registration (raw JSON, every field optional)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub result: RegisteredUserData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUserData {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub level: String,
}

impl From<&User> for RegisteredUserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            username: user.username.as_str().to_string(),
            name: user.name.clone(),
            email: user.email.as_str().to_string(),
            level: user.level.clone(),
        }
    }
}
