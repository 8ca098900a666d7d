use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::ValidJson;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CreateEventRequest, UpdateEventRequest},
    responses::MessageResponse,
};
use crate::error::AppError;
use std::sync::Arc;
use tracing::debug;

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    ValidJson(payload): ValidJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(claimed) = &payload.created_by {
        debug!(caller = %caller.id, claimed = %claimed, "Ignoring client-supplied createdBy");
    }

    let event = state.event_service.create_event(&caller, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_service.list_visible_events(&caller).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_service.get_event(&caller, &id).await?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_service.update_event(&caller, &id, payload.into()).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.event_service.delete_event(&caller, &id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

pub async fn toggle_interest(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_service.toggle_interest(&caller, &id).await?;
    Ok(Json(event))
}
