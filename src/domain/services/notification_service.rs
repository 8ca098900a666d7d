use std::sync::Arc;

use tera::{Context, Tera};
use tracing::{error, info, info_span, Instrument};

use crate::domain::{models::user::User, ports::EmailService};
use crate::error::AppError;

pub const WELCOME_SUBJECT: &str = "Welcome to Alumni Connect";
pub const WELCOME_TEMPLATE: &str = "welcome.html";
pub const BROADCAST_TEMPLATE: &str = "broadcast.html";

/// Compiles the built-in email bodies. `.html` names keep tera's autoescaping on.
pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(WELCOME_TEMPLATE, include_str!("../../templates/welcome.html"))
        .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
    tera.add_raw_template(BROADCAST_TEMPLATE, include_str!("../../templates/broadcast.html"))
        .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
    Ok(tera)
}

/// Fire-and-forget email delivery. Sends run on the runtime; failures are only logged.
pub struct NotificationService {
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
}

impl NotificationService {
    pub fn new(email: Arc<dyn EmailService>, templates: Arc<Tera>) -> Self {
        Self { email, templates }
    }

    pub fn dispatch(&self, recipient: String, subject: String, html_body: String) {
        let email = self.email.clone();
        let span = info_span!("notification", recipient = %recipient, subject = %subject);

        tokio::spawn(
            async move {
                match email.send(&recipient, &subject, &html_body).await {
                    Ok(()) => info!("Notification delivered to relay"),
                    Err(e) => error!("Notification failed: {}", e),
                }
            }
            .instrument(span),
        );
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, AppError> {
        self.templates
            .render(template, context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))
    }

    /// The account already exists at this point, so a render failure is logged rather than returned.
    pub fn send_welcome(&self, user: &User, initial_password: &str) {
        let mut context = Context::new();
        context.insert("name", &user.name);
        context.insert("role", &user.role);
        context.insert("email", &user.email);
        context.insert("password", initial_password);

        match self.render(WELCOME_TEMPLATE, &context) {
            Ok(body) => self.dispatch(user.email.clone(), WELCOME_SUBJECT.to_string(), body),
            Err(e) => error!(user_id = %user.id, "Welcome email not sent: {}", e),
        }
    }

    /// Queues one email per recipient and returns how many were queued.
    pub fn broadcast(&self, recipients: Vec<String>, subject: &str, message: &str) -> Result<usize, AppError> {
        let mut context = Context::new();
        context.insert("message", message);
        let body = self.render(BROADCAST_TEMPLATE, &context)?;

        let count = recipients.len();
        for recipient in recipients {
            self.dispatch(recipient, subject.to_string(), body.clone());
        }
        Ok(count)
    }
}
