use crate::domain::models::{
    auth::RefreshTokenRecord,
    event::{Event, EventChanges},
    user::{Role, User},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Unknown ids are skipped, not reported.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>, AppError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, AppError>;
    async fn list_emails(&self, role: Option<Role>) -> Result<Vec<String>, AppError>;
    async fn update_profile(&self, id: &str, name: Option<&str>, profile_json: &str) -> Result<Option<User>, AppError>;
    /// Deletes only when the stored role matches.
    async fn delete_with_role(&self, id: &str, role: Role) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    /// All events by date ascending, ties in insertion order.
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    async fn update(&self, id: &str, changes: &EventChanges) -> Result<Option<Event>, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    /// Hard-deletes every event dated before `now`. Returns how many went.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
    /// Atomically adds `user_id` to the interested set, or removes it if already there.
    async fn toggle_interest(&self, event_id: &str, user_id: &str) -> Result<Option<Event>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}
