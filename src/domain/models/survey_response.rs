use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

/// Invitation links expire this long after issuance.
pub const EXPIRY_HOURS: i64 = 48;

pub mod status {
    pub const SENT: &str = "SENT";
    pub const OPENED: &str = "OPENED";
    pub const COMPLETED: &str = "COMPLETED";
    pub const EXPIRED: &str = "EXPIRED";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SurveyResponse {
    pub id: String,
    pub survey_id: String,
    pub event_id: String,
    pub registration_id: String,
    pub token: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SurveyResponse {
    pub fn new(survey_id: String, event_id: String, registration_id: String) -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            survey_id,
            event_id,
            registration_id,
            token,
            status: status::SENT.to_string(),
            expires_at: now + Duration::hours(EXPIRY_HOURS),
            opened_at: None,
            completed_at: None,
            created_at: now,
        }
    }

    /// Expiry is purely time-based; the stored status is irrelevant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SurveyQuestionResponse {
    pub id: String,
    pub survey_response_id: String,
    pub question_id: String,
    pub text_response: Option<String>,
    pub scale_response: Option<i32>,
    pub selected_option_id: Option<String>,
}

impl SurveyQuestionResponse {
    fn empty(survey_response_id: String, question_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            survey_response_id,
            question_id,
            text_response: None,
            scale_response: None,
            selected_option_id: None,
        }
    }

    pub fn text(survey_response_id: String, question_id: String, value: String) -> Self {
        Self { text_response: Some(value), ..Self::empty(survey_response_id, question_id) }
    }

    pub fn scale(survey_response_id: String, question_id: String, value: i32) -> Self {
        Self { scale_response: Some(value), ..Self::empty(survey_response_id, question_id) }
    }

    pub fn choice(survey_response_id: String, question_id: String, option_id: String) -> Self {
        Self { selected_option_id: Some(option_id), ..Self::empty(survey_response_id, question_id) }
    }
}
