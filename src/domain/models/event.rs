use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use crate::domain::models::user::User;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub created_by: String,
    /// Alumni ids in the order they first showed interest. Loaded from `event_interests`.
    #[sqlx(skip)]
    pub interested_users: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(title: String, description: String, date: DateTime<Utc>, venue: String, created_by: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            date,
            venue,
            created_by,
            interested_users: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_interested(&self, user_id: &str) -> bool {
        self.interested_users.iter().any(|id| id == user_id)
    }
}

/// Already validated field changes for an update. `None` keeps the stored value.
#[derive(Debug, Default, Clone)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub venue: Option<String>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.date.is_none() && self.venue.is_none()
    }
}

#[derive(Debug, FromRow)]
pub struct InterestRow {
    pub event_id: String,
    pub user_id: String,
}

/// Distributes interest rows (already in insertion order) onto their events.
pub fn attach_interests(events: &mut [Event], rows: Vec<InterestRow>) {
    let mut by_event: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        by_event.entry(row.event_id).or_default().push(row.user_id);
    }
    for event in events.iter_mut() {
        event.interested_users = by_event.remove(&event.id).unwrap_or_default();
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub role: String,
    pub avatar: Option<String>,
}

impl From<&User> for CreatorSummary {
    fn from(user: &User) -> Self {
        let profile = user.profile();
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            department: profile.department().map(String::from),
            role: user.role.clone(),
            avatar: profile.avatar().map(String::from),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub graduation_year: Option<String>,
    pub degree: Option<String>,
    pub avatar: Option<String>,
}

impl From<&User> for AttendeeSummary {
    fn from(user: &User) -> Self {
        let profile = user.profile();
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            department: profile.department().map(String::from),
            graduation_year: profile.graduation_year().map(String::from),
            degree: profile.degree().map(String::from),
            avatar: profile.avatar().map(String::from),
        }
    }
}

/// An event as shown in listings, with creator and attendees joined from the account store.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventListing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub created_by: Option<CreatorSummary>,
    pub interested_users: Vec<AttendeeSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventListing {
    pub fn join(event: Event, accounts: &HashMap<String, User>) -> Self {
        let created_by = accounts.get(&event.created_by).map(CreatorSummary::from);
        let interested_users = event.interested_users.iter()
            .filter_map(|id| accounts.get(id))
            .map(AttendeeSummary::from)
            .collect();

        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            date: event.date,
            venue: event.venue,
            created_by,
            interested_users,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}
