use std::sync::Arc;
use crate::domain::ports::{
    EventRepository, RegistrationRepository, PaymentRepository, SurveyRepository,
    SurveyResponseRepository, JobRepository, UserRepository, EmailService,
};
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub survey_repo: Arc<dyn SurveyRepository>,
    pub survey_response_repo: Arc<dyn SurveyResponseRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub email_service: Arc<dyn EmailService>,
    pub templates: Arc<Tera>,
}
