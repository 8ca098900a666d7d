use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::ValidJson;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{requests::UpdateProfileRequest, responses::AccountResponse};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(_caller): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(AccountResponse::from(&user)))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if caller.id != user_id && !caller.is_admin() {
        return Err(AppError::Forbidden("You can only update your own profile".into()));
    }

    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let name = match payload.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("name must not be empty".into())),
        other => other,
    };

    let mut profile = user.profile();
    if let Some(update) = payload.profile {
        profile.merge(update);
    }
    let profile_json = serde_json::to_string(&profile)
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to encode profile: {}", e)))?;

    let updated = state.user_repo.update_profile(&user_id, name, &profile_json).await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    info!(user_id = %user_id, caller = %caller.id, "Profile updated");

    Ok(Json(AccountResponse::from(&updated)))
}
