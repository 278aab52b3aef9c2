use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::services::survey_service::AnswerInput;

#[derive(Deserialize)]
pub struct CreateEventRequest {
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
    pub send_survey: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_link: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub modality: Option<String>,
    pub price: Option<f64>,
    pub max_capacity: Option<i32>,
    pub status: Option<String>,
    pub survey_id: Option<String>,
    pub send_survey: Option<bool>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSurveyRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSurveyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateQuestionRequest {
    pub text: String,
    pub question_type: String,
    pub position: i32,
    pub required: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateOptionRequest {
    pub text: String,
    pub position: i32,
}

#[derive(Deserialize)]
pub struct SubmitSurveyRequest {
    pub answers: Vec<AnswerInput>,
}
