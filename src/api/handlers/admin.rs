use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::json::ValidJson;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CreateAlumniRequest, CreateFacultyRequest, SendMailRequest},
    responses::{AccountResponse, CreatedAccountResponse, MailQueuedResponse, MessageResponse},
};
use crate::domain::models::{
    profile::{Academic, UserProfile},
    user::{Role, User},
};
use crate::domain::services::auth_service::hash_password;
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, error};

pub async fn create_faculty(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    ValidJson(payload): ValidJson<CreateFacultyRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;

    let name = required(payload.name, "name")?;
    let email = normalize_email(payload.email)?;
    let password = required_password(payload.password)?;
    let department = required(payload.department, "department")?;

    let profile = UserProfile::with_department(Some(department));
    let created = create_account(&state, name, email, &password, Role::Faculty, &profile).await?;

    Ok((StatusCode::CREATED, Json(CreatedAccountResponse::from(&created))))
}

pub async fn create_alumni(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    ValidJson(payload): ValidJson<CreateAlumniRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;

    let name = required(payload.name, "name")?;
    let email = normalize_email(payload.email)?;
    let password = required_password(payload.password)?;
    let department = required(payload.department, "department")?;

    let mut profile = UserProfile::with_department(Some(department));
    profile.academic = Some(Academic {
        graduation_year: payload.graduation_year.map(|y| y.trim().to_string()).filter(|y| !y.is_empty()),
        ..Default::default()
    });

    let created = create_account(&state, name, email, &password, Role::Alumni, &profile).await?;

    Ok((StatusCode::CREATED, Json(CreatedAccountResponse::from(&created))))
}

pub async fn list_faculty(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;
    list_accounts(&state, Role::Faculty).await
}

pub async fn list_alumni(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;
    list_accounts(&state, Role::Alumni).await
}

pub async fn delete_faculty(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;
    delete_account(&state, &user_id, Role::Faculty).await?;
    Ok(Json(MessageResponse::new("Faculty deleted successfully")))
}

pub async fn delete_alumni(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;
    delete_account(&state, &user_id, Role::Alumni).await?;
    Ok(Json(MessageResponse::new("Alumni deleted successfully")))
}

pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    ValidJson(payload): ValidJson<SendMailRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require_admin()?;

    let subject = required(payload.subject, "subject")?;
    let message = required(payload.message, "message")?;
    let audience = match payload.recipients.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some("faculty") => Some(Role::Faculty),
        Some("alumni") => Some(Role::Alumni),
        Some(other) => {
            return Err(AppError::Validation(format!(
                "recipients must be one of all, faculty, alumni (got '{}')",
                other
            )))
        }
    };

    let emails = state.user_repo.list_emails(audience).await?;
    let queued = state.notification_service.broadcast(emails, &subject, &message)?;

    info!(admin = %admin.id, queued, "Broadcast mail queued");

    Ok(Json(MailQueuedResponse {
        message: "Emails queued for delivery".to_string(),
        recipients: queued,
    }))
}

async fn create_account(
    state: &AppState,
    name: String,
    email: String,
    password: &str,
    role: Role,
    profile: &UserProfile,
) -> Result<User, AppError> {
    if state.user_repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(format!("An account with email {} already exists", email)));
    }

    let password_hash = hash_password(password)?;
    let user = User::new(name, email, password_hash, role, profile);
    let created = state.user_repo.create(&user).await?;

    info!(user_id = %created.id, role = %role, "Created account");

    state.notification_service.send_welcome(&created, password);
    Ok(created)
}

async fn list_accounts(state: &AppState, role: Role) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = state.user_repo.list_by_role(role).await?;
    Ok(Json(accounts.iter().map(AccountResponse::from).collect()))
}

async fn delete_account(state: &AppState, user_id: &str, role: Role) -> Result<(), AppError> {
    match state.user_repo.delete_with_role(user_id, role).await {
        Ok(true) => {
            info!(user_id = %user_id, role = %role, "Deleted account");
            Ok(())
        }
        Ok(false) => Err(AppError::NotFound(format!("{} not found", capitalize(role.as_str())))),
        Err(e) => {
            error!("Failed to delete user {}: {:?}", user_id, e);
            Err(e)
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Unlike other fields the password is kept exactly as sent; only a blank value is rejected.
fn required_password(value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::Validation("password is required".into()))
}

fn normalize_email(value: Option<String>) -> Result<String, AppError> {
    let email = required(value, "email")?.to_ascii_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".into()));
    }
    Ok(email)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
