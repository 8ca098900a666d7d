use std::sync::Arc;
use crate::domain::ports::{AuthRepository, EmailService, EventRepository, UserRepository};
use crate::domain::services::{
    auth_service::AuthService, event_service::EventService, notification_service::{load_templates, NotificationService},
};
use crate::config::Config;
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub auth_service: Arc<AuthService>,
    pub event_service: Arc<EventService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    /// Wires the services on top of already-connected repositories.
    pub fn new(
        config: Config,
        user_repo: Arc<dyn UserRepository>,
        event_repo: Arc<dyn EventRepository>,
        auth_repo: Arc<dyn AuthRepository>,
        email_service: Arc<dyn EmailService>,
    ) -> Result<Self, AppError> {
        let auth_service = Arc::new(AuthService::new(auth_repo.clone(), &config)?);
        let event_service = Arc::new(EventService::new(
            event_repo.clone(),
            user_repo.clone(),
            config.prune_expired_on_list,
        ));
        let templates = Arc::new(load_templates()?);
        let notification_service = Arc::new(NotificationService::new(email_service, templates));

        Ok(Self {
            config,
            user_repo,
            event_repo,
            auth_repo,
            auth_service,
            event_service,
            notification_service,
        })
    }
}
