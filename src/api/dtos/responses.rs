use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::event::Event;
use crate::domain::models::survey::SurveyDefinition;
use crate::domain::services::capacity;

/// Event as shown to unauthenticated visitors. Never exposes who created it.
#[derive(Serialize)]
pub struct PublicEventResponse {
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
    pub available_spots: i64,
}

impl PublicEventResponse {
    pub fn from_event(event: Event, active_count: i64) -> Self {
        let available_spots = capacity::available_spots(event.max_capacity, active_count);
        Self {
            id: event.id,
            title: event.title,
            slug: event.slug,
            description: event.description,
            location: event.location,
            event_link: event.event_link,
            start_date: event.start_date,
            end_date: event.end_date,
            modality: event.modality,
            price: event.price,
            max_capacity: event.max_capacity,
            status: event.status,
            available_spots,
        }
    }
}

/// Survey as rendered behind an invitation token.
#[derive(Serialize)]
pub struct SurveyFormResponse {
    pub title: String,
    pub description: String,
    pub questions: Vec<SurveyFormQuestion>,
}

#[derive(Serialize)]
pub struct SurveyFormQuestion {
    pub id: String,
    pub text: String,
    pub question_type: String,
    pub required: bool,
    pub options: Vec<SurveyFormOption>,
}

#[derive(Serialize)]
pub struct SurveyFormOption {
    pub id: String,
    pub text: String,
}

impl SurveyFormResponse {
    pub fn from_definition(definition: &SurveyDefinition) -> Self {
        Self {
            title: definition.survey.title.clone(),
            description: definition.survey.description.clone(),
            questions: definition
                .questions
                .iter()
                .map(|q| SurveyFormQuestion {
                    id: q.question.id.clone(),
                    text: q.question.text.clone(),
                    question_type: q.question.question_type.clone(),
                    required: q.question.required,
                    options: q
                        .options
                        .iter()
                        .map(|o| SurveyFormOption { id: o.id.clone(), text: o.text.clone() })
                        .collect(),
                })
                .collect(),
        }
    }
}
