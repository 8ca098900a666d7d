use std::env;

use alumni_connect::domain::models::{profile::UserProfile, user::{Role, User}};
use alumni_connect::domain::services::auth_service::hash_password;
use alumni_connect::error::AppError;
use alumni_connect::infra::factory::connect_repositories;
use tracing::info;

fn required_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} must be set", name)))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database_url = required_var("DATABASE_URL")?;
    let name = env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
    let email = required_var("ADMIN_EMAIL")?.to_ascii_lowercase();
    let password = required_var("ADMIN_PASSWORD")?;

    let repos = connect_repositories(&database_url).await;

    if let Some(existing) = repos.user_repo.find_by_email(&email).await? {
        info!(user_id = %existing.id, role = %existing.role, "Account {} already exists, leaving it untouched", email);
        return Ok(());
    }

    let password_hash = hash_password(&password)?;
    let admin = User::new(name, email, password_hash, Role::Admin, &UserProfile::default());
    let created = repos.user_repo.create(&admin).await?;

    info!(user_id = %created.id, "Admin account {} created", created.email);
    Ok(())
}
