use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod get_user;
pub mod list_users;
pub mod login;
pub mod register;
pub mod verify_token;

/// Message sent in place of internal error details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error!";

/// Successful response: `{ "err": false, "msg": ..., <data fields> }`.
///
/// Every response is sent with status 200; the outcome travels in `err`.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(Json<ApiResponseBody<T>>);

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(msg: &str, data: T) -> Self {
        ApiSuccess(Json(ApiResponseBody {
            err: false,
            msg: msg.to_string(),
            data,
        }))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.0).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize> {
    err: bool,
    msg: String,
    #[serde(flatten)]
    data: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    Validation(String),
    Conflict(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::Validation(msg) | ApiError::Conflict(msg) | ApiError::Unauthorized(msg) => {
                msg
            }
        };

        (
            StatusCode::OK,
            Json(ApiErrorBody {
                err: true,
                msg: message,
            }),
        )
            .into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(_) | UserError::InvalidUserId(_) => {
                ApiError::Validation(err.to_string())
            }
            UserError::UsernameAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::InvalidCredentials | UserError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            UserError::DatabaseError(_) | UserError::Unknown(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub err: bool,
    pub msg: String,
}

/// Public view of a user as returned by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfileData {
    pub name: String,
    pub email: String,
    pub level: String,
}

impl From<&User> for UserProfileData {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.as_str().to_string(),
            level: user.level.clone(),
        }
    }
}

/// Unreadable bodies are treated as empty so that validation reports them.
pub(crate) fn json_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable request body");
            T::default()
        }
    }
}
