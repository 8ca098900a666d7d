use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    models::{
        auth::Caller,
        event::{Event, EventChanges, EventListing},
        user::User,
    },
    ports::{EventRepository, UserRepository},
    services::policy,
};
use crate::error::AppError;

/// Raw client input for create and update. Validation happens in the service.
#[derive(Debug, Default, Clone)]
pub struct EventFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
}

pub struct EventService {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    prune_on_list: bool,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>, users: Arc<dyn UserRepository>, prune_on_list: bool) -> Self {
        Self { events, users, prune_on_list }
    }

    pub async fn create_event(&self, caller: &Caller, fields: EventFields) -> Result<Event, AppError> {
        if !policy::can_create_event(caller) {
            return Err(AppError::Forbidden("Only faculty or admins can create events".into()));
        }

        let title = required_text(fields.title, "title")?;
        let description = required_text(fields.description, "description")?;
        let venue = required_text(fields.venue, "venue")?;
        let date = match fields.date {
            Some(raw) if !raw.trim().is_empty() => parse_event_date(&raw)?,
            _ => return Err(AppError::Validation("date is required".into())),
        };

        let event = Event::new(title, description, date, venue, caller.id.clone());
        let created = self.events.create(&event).await?;

        info!(event_id = %created.id, created_by = %created.created_by, "Event created");
        Ok(created)
    }

    pub async fn list_visible_events(&self, caller: &Caller) -> Result<Vec<EventListing>, AppError> {
        self.list_visible_events_at(caller, Utc::now()).await
    }

    pub async fn list_visible_events_at(&self, caller: &Caller, now: DateTime<Utc>) -> Result<Vec<EventListing>, AppError> {
        if self.prune_on_list {
            if let Err(e) = self.prune_expired(now).await {
                warn!("Expired event prune failed, continuing with listing: {}", e);
            }
        }

        let events = self.events.list().await?;

        let mut account_ids: Vec<String> = events.iter()
            .flat_map(|e| std::iter::once(&e.created_by).chain(e.interested_users.iter()))
            .cloned()
            .collect();
        account_ids.sort();
        account_ids.dedup();

        let accounts: HashMap<String, User> = self.users.find_by_ids(&account_ids).await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let mut visible: Vec<Event> = events.into_iter()
            .filter(|e| policy::is_visible(e, accounts.contains_key(&e.created_by), now))
            .collect();
        visible.sort_by_key(|e| e.date);

        debug!(caller = %caller.id, role = %caller.role, count = visible.len(), "Listing visible events");

        Ok(visible.into_iter()
            .map(|e| EventListing::join(e, &accounts))
            .collect())
    }

    /// Direct lookup. Not subject to the visibility rule.
    pub async fn get_event(&self, caller: &Caller, id: &str) -> Result<Event, AppError> {
        debug!(caller = %caller.id, event_id = %id, "Fetching event");
        self.events.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    pub async fn update_event(&self, caller: &Caller, id: &str, fields: EventFields) -> Result<Event, AppError> {
        let event = self.events.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        if !policy::can_modify_event(caller, &event) {
            return Err(AppError::Forbidden("Only the event creator or an admin can update this event".into()));
        }

        let changes = EventChanges {
            title: optional_text(fields.title, "title")?,
            description: optional_text(fields.description, "description")?,
            date: fields.date.as_deref().map(parse_event_date).transpose()?,
            venue: optional_text(fields.venue, "venue")?,
        };

        if changes.is_empty() {
            return Ok(event);
        }

        let updated = self.events.update(id, &changes).await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        info!(event_id = %id, caller = %caller.id, "Event updated");
        Ok(updated)
    }

    pub async fn delete_event(&self, caller: &Caller, id: &str) -> Result<(), AppError> {
        let event = self.events.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        if !policy::can_modify_event(caller, &event) {
            return Err(AppError::Forbidden("Only the event creator or an admin can delete this event".into()));
        }

        if !self.events.delete(id).await? {
            return Err(AppError::NotFound("Event not found".into()));
        }

        info!(event_id = %id, caller = %caller.id, "Event deleted");
        Ok(())
    }

    pub async fn toggle_interest(&self, caller: &Caller, id: &str) -> Result<Event, AppError> {
        if !policy::can_toggle_interest(caller) {
            return Err(AppError::Forbidden("Only alumni can register interest in events".into()));
        }

        let event = self.events.toggle_interest(id, &caller.id).await?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        info!(
            event_id = %id,
            alumni = %caller.id,
            interested = event.is_interested(&caller.id),
            "Interest toggled"
        );
        Ok(event)
    }

    /// Irreversibly deletes every event dated before `now`.
    pub async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let pruned = self.events.delete_expired(now).await?;
        if pruned > 0 {
            info!(count = pruned, "Pruned expired events");
        }
        Ok(pruned)
    }
}

/// Accepts RFC 3339, a `datetime-local` value (`YYYY-MM-DDTHH:MM[:SS]`) or a bare date.
/// Values without an offset are read as UTC.
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)) {
        return Ok(naive.and_utc());
    }

    Err(AppError::Validation(format!("Invalid date '{}'", raw)))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    optional_text(value, field)?
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Text fields are stored trimmed; a present but blank value is rejected.
fn optional_text(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(AppError::Validation(format!("{} must not be empty", field)))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}
