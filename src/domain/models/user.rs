use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use crate::domain::models::profile::UserProfile;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Alumni,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Alumni => "alumni",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            "alumni" => Ok(Role::Alumni),
            other => Err(AppError::Validation(format!("Unknown role '{}'", other))),
        }
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile_json: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role, profile: &UserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role: role.as_str().to_string(),
            profile_json: serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    pub fn profile(&self) -> UserProfile {
        serde_json::from_str(&self.profile_json).unwrap_or_else(|e| {
            warn!(user_id = %self.id, "Stored profile is not valid JSON, using empty profile: {}", e);
            UserProfile::default()
        })
    }
}
