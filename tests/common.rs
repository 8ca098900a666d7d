#![allow(dead_code)]

use alumni_connect::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{profile::UserProfile, user::{Role, User}},
    domain::ports::EmailService,
    domain::services::auth_service::hash_password,
    infra::factory::connect_repositories,
    error::AppError,
};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::Value;

pub const TEST_PASSWORD: &str = "password123";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Default)]
pub struct RecordingEmailService {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailService {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Argon2 is slow in debug builds; every seeded account shares one hash.
fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(TEST_PASSWORD).unwrap()).clone()
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub emails: Arc<RecordingEmailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_prune_on_list(true).await
    }

    pub async fn with_prune_on_list(prune_expired_on_list: bool) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            prune_expired_on_list,
        };

        let repos = connect_repositories(&db_url).await;

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&db_url)
            .await
            .expect("Failed to open assertion pool on test db");

        let emails = Arc::new(RecordingEmailService::default());

        let state = Arc::new(
            AppState::new(config, repos.user_repo, repos.event_repo, repos.auth_repo, emails.clone())
                .expect("Failed to build test state"),
        );

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            emails,
        }
    }

    /// Inserts an account directly, bypassing the admin endpoints.
    pub async fn seed_user(&self, name: &str, role: Role, profile: UserProfile) -> User {
        let email = format!("{}-{}@alumni.test", name.to_lowercase().replace(' ', "."), &Uuid::new_v4().to_string()[..8]);
        let user = User::new(name.to_string(), email, test_password_hash(), role, &profile);
        self.state.user_repo.create(&user).await.unwrap()
    }

    pub async fn seed_admin(&self) -> User {
        self.seed_user("Admin", Role::Admin, UserProfile::default()).await
    }

    pub async fn seed_faculty(&self, name: &str) -> User {
        self.seed_user(name, Role::Faculty, UserProfile::with_department(Some("Computer Science".into()))).await
    }

    pub async fn seed_alumni(&self, name: &str) -> User {
        self.seed_user(name, Role::Alumni, UserProfile::with_department(Some("Mechanical".into()))).await
    }

    /// Issues an access token without going through password verification.
    pub async fn token_for(&self, user: &User) -> String {
        self.state.auth_service.login(user).await.unwrap().access_token
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    /// Same as `request`, asserting the status and decoding the JSON body.
    pub async fn request_json(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>, expected: StatusCode) -> Value {
        let response = self.request(method, uri, token, body).await;
        let status = response.status();
        let json = parse_body(response).await;
        assert_eq!(status, expected, "unexpected status for {} {}: {}", method, uri, json);
        json
    }

    /// Notifications are spawned; waits until `count` have reached the relay.
    pub async fn wait_for_emails(&self, count: usize) -> Vec<SentEmail> {
        for _ in 0..100 {
            let sent = self.emails.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.emails.sent()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
