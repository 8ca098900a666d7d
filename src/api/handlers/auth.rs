use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::ValidJson;
use crate::error::AppError;
use crate::api::dtos::requests::LoginRequest;
use crate::api::extractors::auth::{ACCESS_COOKIE, REFRESH_COOKIE};
use crate::domain::models::{
    auth::{AuthResponse, IssuedTokens, SessionUser},
    user::{Role, User},
};
use crate::domain::services::auth_service::{verify_password, ACCESS_TOKEN_MINUTES, REFRESH_TOKEN_DAYS};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = authenticate(&state, &payload).await?;
    issue_session(&state, &cookies, &user).await
}

pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = authenticate(&state, &payload).await?;

    if user.role() != Some(Role::Admin) {
        warn!(user_id = %user.id, "Non-admin account attempted admin login");
        return Err(AppError::Unauthorized);
    }

    issue_session(&state, &cookies, &user).await
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    let refresh_cookie = cookies.get(REFRESH_COOKIE).ok_or(AppError::Unauthorized)?;
    let raw_token = refresh_cookie.value().to_string();

    let token_hash = state.auth_service.hash_token(&raw_token);
    let record = state.auth_repo.find_refresh_token(&token_hash).await?
        .ok_or(AppError::Unauthorized)?;

    let user = state.user_repo.find_by_id(&record.user_id).await?
        .ok_or(AppError::Unauthorized)?;

    let tokens = state.auth_service.refresh(&raw_token, &user).await?;
    set_cookies(&cookies, &tokens);

    info!("Token refreshed for user: {}", user.id);

    Ok(Json(AuthResponse {
        token: tokens.access_token,
        csrf_token: tokens.csrf_token,
        user: SessionUser::from(&user),
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get(REFRESH_COOKIE) {
        if let Err(e) = state.auth_service.logout(cookie.value()).await {
            warn!("Failed to revoke refresh token on logout: {}", e);
        }
    }

    cookies.remove(Cookie::build((ACCESS_COOKIE, "")).path("/").into());
    cookies.remove(Cookie::build((REFRESH_COOKIE, "")).path("/").into());

    info!("User logged out");

    Ok(StatusCode::OK)
}

async fn authenticate(state: &AppState, payload: &LoginRequest) -> Result<User, AppError> {
    let email = payload.login_email().ok_or(AppError::Unauthorized)?;

    let user = state.user_repo.find_by_email(&email).await?
        .ok_or(AppError::Unauthorized)?;

    verify_password(&payload.password, &user.password_hash)?;
    Ok(user)
}

async fn issue_session(state: &AppState, cookies: &Cookies, user: &User) -> Result<Json<AuthResponse>, AppError> {
    let tokens = state.auth_service.login(user).await?;
    set_cookies(cookies, &tokens);

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(AuthResponse {
        token: tokens.access_token,
        csrf_token: tokens.csrf_token,
        user: SessionUser::from(user),
    }))
}

fn set_cookies(cookies: &Cookies, tokens: &IssuedTokens) {
    let mut access_c = Cookie::new(ACCESS_COOKIE, tokens.access_token.clone());
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(ACCESS_TOKEN_MINUTES));
    cookies.add(access_c);

    let mut refresh_c = Cookie::new(REFRESH_COOKIE, tokens.refresh_token.clone());
    refresh_c.set_http_only(true);
    refresh_c.set_secure(true);
    refresh_c.set_same_site(SameSite::Strict);
    refresh_c.set_path("/");
    refresh_c.set_max_age(Duration::days(REFRESH_TOKEN_DAYS));
    cookies.add(refresh_c);
}
