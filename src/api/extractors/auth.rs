use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, Method},
};
use crate::state::AppState;
use crate::domain::models::{auth::Caller, user::Role};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{debug, Span};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Authenticated caller, taken from `Authorization: Bearer` or the access cookie.
pub struct AuthUser(pub Caller);

enum TokenSource {
    Bearer(String),
    Cookie(String),
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let source = match bearer_token(parts) {
            Some(token) => TokenSource::Bearer(token),
            None => {
                let cookies = parts.extensions.get::<Cookies>().ok_or(AppError::Internal)?;
                let token = cookies.get(ACCESS_COOKIE).ok_or(AppError::Unauthorized)?;
                TokenSource::Cookie(token.value().to_string())
            }
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let claims = match &source {
            TokenSource::Bearer(token) | TokenSource::Cookie(token) => app_state.auth_service.verify(token)?,
        };

        // Cookie-authenticated writes must echo the CSRF claim.
        if matches!(source, TokenSource::Cookie(_)) && !is_safe_method(&parts.method) {
            let csrf_header_val = parts.headers.get(CSRF_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?;

            if csrf_header_val != claims.csrf_token {
                return Err(AppError::Forbidden("Invalid CSRF token".into()));
            }
        }

        let role: Role = claims.role.parse().map_err(|_| {
            debug!(role = %claims.role, "Token carries an unknown role");
            AppError::Unauthorized
        })?;

        let caller = Caller::new(claims.sub, role);

        Span::current().record("user_id", caller.id.as_str());
        Span::current().record("role", role.as_str());

        Ok(AuthUser(caller))
    }
}
