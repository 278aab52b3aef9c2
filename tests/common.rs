use events_backend::{
    api::router::create_router,
    background::start_background_worker,
    config::Config,
    domain::models::user::{role, User},
    domain::ports::EmailService,
    error::AppError,
    infra::repositories::{
        sqlite_event_repo::SqliteEventRepo,
        sqlite_job_repo::SqliteJobRepo,
        sqlite_payment_repo::SqlitePaymentRepo,
        sqlite_registration_repo::SqliteRegistrationRepo,
        sqlite_survey_repo::SqliteSurveyRepo,
        sqlite_survey_response_repo::SqliteSurveyResponseRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use serde_json::Value;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tera::Tera;
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Email double that records every send instead of talking to the relay.
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
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

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub emails: Arc<RecordingEmailService>,
    pub manager_key: String,
    pub participant_key: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let mut tera = Tera::default();
        for name in [
            "registration_received.html",
            "registration_accepted.html",
            "registration_rejected.html",
            "payment_instructions.html",
            "event_reminder.html",
            "event_cancelled.html",
            "survey_invitation.html",
        ] {
            tera.add_raw_template(name, "<html>Mock mail for {{ full_name }}</html>").unwrap();
        }
        let templates = Arc::new(tera);

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            site_url: "http://localhost:3000".to_string(),
        };

        let emails = Arc::new(RecordingEmailService { sent: Mutex::new(Vec::new()) });

        let state = Arc::new(AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
            registration_repo: Arc::new(SqliteRegistrationRepo::new(pool.clone())),
            payment_repo: Arc::new(SqlitePaymentRepo::new(pool.clone())),
            survey_repo: Arc::new(SqliteSurveyRepo::new(pool.clone())),
            survey_response_repo: Arc::new(SqliteSurveyResponseRepo::new(pool.clone())),
            job_repo: Arc::new(SqliteJobRepo::new(pool.clone())),
            email_service: emails.clone(),
            templates,
        });

        let manager = User::new("admin".into(), "admin@example.com".into(), role::MANAGER.into());
        let manager_key = manager.api_key.clone();
        state.user_repo.create(&manager).await.expect("Failed to seed manager");

        let participant = User::new("guest".into(), "guest@example.com".into(), role::PARTICIPANT.into());
        let participant_key = participant.api_key.clone();
        state.user_repo.create(&participant).await.expect("Failed to seed participant");

        let worker_state = state.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            emails,
            manager_key,
            participant_key,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        api_key: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(key) = api_key {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }

        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
