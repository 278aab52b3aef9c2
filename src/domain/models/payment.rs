use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub mod status {
    pub const PENDING: &str = "PENDING";
    pub const VERIFIED: &str = "VERIFIED";
    pub const FAILED: &str = "FAILED";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: String,
    pub registration_id: String,
    pub payment_method: String,
    pub amount: f64,
    pub status: String,
    pub verification_date: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Amount is fixed at creation from the event's price.
    pub fn new(registration_id: String, payment_method: String, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            registration_id,
            payment_method,
            amount,
            status: status::PENDING.to_string(),
            verification_date: None,
            verified_by: None,
            created_at: Utc::now(),
        }
    }
}
