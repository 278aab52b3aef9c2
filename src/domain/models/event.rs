use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub mod status {
    pub const DRAFT: &str = "DRAFT";
    pub const PUBLISHED: &str = "PUBLISHED";
    pub const FINISHED: &str = "FINISHED";
    pub const CANCELLED: &str = "CANCELLED";
}

pub mod modality {
    pub const FREE: &str = "FREE";
    pub const PAID: &str = "PAID";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: Option<String>,
    pub event_link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub modality: String,
    pub price: Option<f64>,
    pub max_capacity: i32,
    pub status: String,
    pub survey_id: Option<String>,
    pub send_survey: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewEventParams {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: Option<String>,
    pub event_link: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub modality: String,
    pub price: Option<f64>,
    pub max_capacity: i32,
    pub survey_id: Option<String>,
    pub send_survey: bool,
    pub created_by: String,
}

impl Event {
    pub fn new(params: NewEventParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: params.title,
            slug: params.slug,
            description: params.description,
            location: params.location,
            event_link: params.event_link,
            start_date: params.start_date,
            end_date: params.end_date,
            modality: params.modality,
            price: params.price,
            max_capacity: params.max_capacity,
            status: status::DRAFT.to_string(),
            survey_id: params.survey_id,
            send_survey: params.send_survey,
            created_by: params.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }
}
