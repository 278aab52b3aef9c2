use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const ACCEPTED: &str = "ACCEPTED";
    pub const REJECTED: &str = "REJECTED";
    pub const WAITLIST: &str = "WAITLIST";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub struct NewRegistrationParams {
    pub event_id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl Registration {
    /// The initial status is provisional; the submission transaction settles
    /// it against the live seat count.
    pub fn new(params: NewRegistrationParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            full_name: params.full_name,
            email: params.email,
            phone: params.phone,
            notes: params.notes,
            status: status::PENDING.to_string(),
            created_at: Utc::now(),
        }
    }
}
