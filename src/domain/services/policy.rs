use chrono::{DateTime, Utc};
use crate::domain::models::{auth::Caller, event::Event, user::Role};

pub fn can_create_event(caller: &Caller) -> bool {
    matches!(caller.role, Role::Faculty | Role::Admin)
}

/// Update and delete: the creator, or any admin.
pub fn can_modify_event(caller: &Caller, event: &Event) -> bool {
    caller.role == Role::Admin || caller.id == event.created_by
}

pub fn can_toggle_interest(caller: &Caller) -> bool {
    caller.role == Role::Alumni
}

pub fn is_expired(event: &Event, now: DateTime<Utc>) -> bool {
    event.date < now
}

/// Listed only while the creator account still exists and the date has not passed.
pub fn is_visible(event: &Event, creator_exists: bool, now: DateTime<Utc>) -> bool {
    creator_exists && !is_expired(event, now)
}
