use axum::extract::State;
use axum::Json;

use super::ApiError;
use super::UserProfileData;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserProfileData>>, ApiError> {
    state
        .user_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| Json(users.iter().map(UserProfileData::from).collect()))
}
