use axum::extract::Path;
use axum::extract::State;
use axum::Json;

use super::ApiError;
use super::UserProfileData;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

/// Responds with an array holding the matching user, or an empty array.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserProfileData>>, ApiError> {
    let user_id = UserId::from_string(&user_id)?;

    state
        .user_service
        .find_users_by_id(user_id)
        .await
        .map_err(ApiError::from)
        .map(|users| Json(users.iter().map(UserProfileData::from).collect()))
}
