use crate::domain::models::profile::{lenient_text, UserProfile};
use crate::domain::services::event_service::EventFields;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    /// Accepted for compatibility with older clients; the server always uses the caller.
    pub created_by: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
}

impl From<CreateEventRequest> for EventFields {
    fn from(req: CreateEventRequest) -> Self {
        Self { title: req.title, description: req.description, date: req.date, venue: req.venue }
    }
}

impl From<UpdateEventRequest> for EventFields {
    fn from(req: UpdateEventRequest) -> Self {
        Self { title: req.title, description: req.description, date: req.date, venue: req.venue }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// The admin form labels the field `username`; either spelling carries the email.
    pub fn login_email(&self) -> Option<String> {
        self.email.as_deref()
            .or(self.username.as_deref())
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Deserialize)]
pub struct CreateFacultyRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub department: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlumniRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub graduation_year: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub profile: Option<UserProfile>,
}

#[derive(Deserialize)]
pub struct SendMailRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub recipients: Option<String>,
}
