use crate::domain::models::{profile::UserProfile, user::User};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account as returned by admin endpoints. Never carries the password hash.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for AccountResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            profile: user.profile(),
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct CreatedAccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for CreatedAccountResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Serialize)]
pub struct MailQueuedResponse {
    pub message: String,
    pub recipients: usize,
}
