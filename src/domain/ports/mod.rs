use crate::domain::models::{
    event::Event,
    registration::Registration,
    payment::Payment,
    survey::{Survey, SurveyQuestion, SurveyQuestionOption, SurveyDefinition},
    survey_response::{SurveyResponse, SurveyQuestionResponse},
    job::Job,
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self, status: Option<&str>) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    /// Flips the event status and enqueues the given notification jobs in one
    /// transaction (cancellation / finishing cascades).
    async fn set_status_with_jobs(&self, event_id: &str, status: &str, jobs: Vec<Job>) -> Result<(), AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Submission: settles the initial status (PENDING vs WAITLIST) against
    /// the live active-seat count, inserts the registration, the optional
    /// payment row and the notification jobs — all in one transaction. The
    /// Postgres implementation locks the event row before counting.
    async fn submit(
        &self,
        registration: &Registration,
        event: &Event,
        payment: Option<&Payment>,
        jobs: Vec<Job>,
    ) -> Result<Registration, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError>;
    async fn find_by_event_and_email(&self, event_id: &str, email: &str) -> Result<Option<Registration>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError>;
    async fn list_by_event_and_status(&self, event_id: &str, status: &str) -> Result<Vec<Registration>, AppError>;
    /// Count of registrations holding a seat (ACCEPTED or PENDING).
    async fn count_active(&self, event_id: &str) -> Result<i64, AppError>;
    /// Earliest waitlisted registration by creation order, if any.
    async fn find_first_waitlisted(&self, event_id: &str) -> Result<Option<Registration>, AppError>;
    /// Applies a status transition plus an optional waitlist promotion and the
    /// notification jobs atomically. The update is guarded by the expected
    /// prior status; `InvalidTransition` if the row moved on in the meantime.
    async fn transition(
        &self,
        registration_id: &str,
        expected_status: &str,
        new_status: &str,
        promoted: Option<(&str, &str)>,
        jobs: Vec<Job>,
    ) -> Result<Registration, AppError>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError>;
    async fn find_by_registration(&self, registration_id: &str) -> Result<Option<Payment>, AppError>;
    /// Marks the payment verified and the linked registration accepted in one
    /// transaction, together with the acceptance notification jobs.
    async fn verify(
        &self,
        payment_id: &str,
        verified_by: &str,
        verified_at: DateTime<Utc>,
        registration_id: &str,
        jobs: Vec<Job>,
    ) -> Result<Payment, AppError>;
}

#[async_trait]
pub trait SurveyRepository: Send + Sync {
    async fn create(&self, survey: &Survey) -> Result<Survey, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>, AppError>;
    async fn list(&self) -> Result<Vec<Survey>, AppError>;
    async fn update(&self, survey: &Survey) -> Result<Survey, AppError>;
    async fn create_question(&self, question: &SurveyQuestion) -> Result<SurveyQuestion, AppError>;
    async fn find_question(&self, id: &str) -> Result<Option<SurveyQuestion>, AppError>;
    async fn create_option(&self, option: &SurveyQuestionOption) -> Result<SurveyQuestionOption, AppError>;
    /// Survey plus ordered questions and options.
    async fn load_definition(&self, survey_id: &str) -> Result<Option<SurveyDefinition>, AppError>;
    /// Persists a whole definition (used by duplication) in one transaction.
    async fn insert_definition(&self, definition: &SurveyDefinition) -> Result<(), AppError>;
}

#[async_trait]
pub trait SurveyResponseRepository: Send + Sync {
    /// Inserts the freshly issued responses and their invitation jobs in one
    /// transaction.
    async fn create_batch(&self, responses: &[SurveyResponse], jobs: Vec<Job>) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SurveyResponse>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<SurveyResponse>, AppError>;
    async fn find_by_registration(&self, survey_id: &str, registration_id: &str) -> Result<Option<SurveyResponse>, AppError>;
    async fn list_by_survey(&self, survey_id: &str) -> Result<Vec<SurveyResponse>, AppError>;
    async fn mark_opened(&self, id: &str, opened_at: DateTime<Utc>) -> Result<(), AppError>;
    async fn mark_expired(&self, id: &str) -> Result<(), AppError>;
    /// Persists the typed answers and flips the response to COMPLETED
    /// atomically.
    async fn complete(
        &self,
        id: &str,
        completed_at: DateTime<Utc>,
        answers: &[SurveyQuestionResponse],
    ) -> Result<(), AppError>;
    /// All per-question answers whose parent response is COMPLETED.
    async fn list_completed_answers(&self, survey_id: &str) -> Result<Vec<SurveyQuestionResponse>, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    /// Claims due PENDING jobs by flipping them to PROCESSING.
    async fn find_pending(&self, limit: i32) -> Result<Vec<Job>, AppError>;
    async fn list(&self) -> Result<Vec<Job>, AppError>;
    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}
