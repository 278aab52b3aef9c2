use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub mod kind {
    pub const REGISTRATION_RECEIVED: &str = "REGISTRATION_RECEIVED";
    pub const REGISTRATION_ACCEPTED: &str = "REGISTRATION_ACCEPTED";
    pub const REGISTRATION_REJECTED: &str = "REGISTRATION_REJECTED";
    pub const PAYMENT_INSTRUCTIONS: &str = "PAYMENT_INSTRUCTIONS";
    pub const EVENT_REMINDER: &str = "EVENT_REMINDER";
    pub const EVENT_CANCELLED: &str = "EVENT_CANCELLED";
    /// Creates survey responses for an event's accepted registrations and
    /// enqueues the invitation emails. Idempotent.
    pub const SURVEY_ISSUE: &str = "SURVEY_ISSUE";
    pub const SURVEY_INVITATION: &str = "SURVEY_INVITATION";
}

pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const PROCESSING: &str = "PROCESSING";
    pub const COMPLETED: &str = "COMPLETED";
    pub const FAILED: &str = "FAILED";
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct JobPayload {
    pub registration_id: String,
    pub survey_response_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: String,
    pub job_type: String,
    pub payload: Json<JobPayload>,
    pub execute_at: DateTime<Utc>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_type: &str, registration_id: String, execute_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.to_string(),
            payload: Json(JobPayload { registration_id, survey_response_id: None }),
            execute_at,
            status: status::PENDING.to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn survey_invitation(registration_id: String, survey_response_id: String, execute_at: DateTime<Utc>) -> Self {
        let mut job = Self::new(kind::SURVEY_INVITATION, registration_id, execute_at);
        job.payload.0.survey_response_id = Some(survey_response_id);
        job
    }
}
