use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::cors::create_cors_layer;
use crate::api::handlers::{admin, auth, event, health, user};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = create_cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/users/login", post(auth::login))
        .route("/api/admin/login", post(auth::admin_login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))

        // Profiles
        .route("/api/users/{id}/profile", get(user::get_profile).put(user::update_profile))

        // Events
        .route("/api/events", post(event::create_event).get(event::list_events))
        .route("/api/events/{id}", get(event::get_event).put(event::update_event).delete(event::delete_event))
        .route("/api/events/{id}/interest", put(event::toggle_interest))

        // Admin account management
        .route("/api/admin/add-faculty", post(admin::create_faculty))
        .route("/api/admin/add-alumni", post(admin::create_alumni))
        .route("/api/admin/remove-faculty/{id}", delete(admin::delete_faculty))
        .route("/api/admin/remove-alumni/{id}", delete(admin::delete_alumni))
        .route("/api/admin/faculty", get(admin::list_faculty))
        .route("/api/admin/alumni", get(admin::list_alumni))
        .route("/api/admin/send-mail", post(admin::send_mail))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .with_state(state)
}
