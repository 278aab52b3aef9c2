pub mod sqlite_user_repo;
pub mod sqlite_event_repo;
pub mod sqlite_registration_repo;
pub mod sqlite_payment_repo;
pub mod sqlite_survey_repo;
pub mod sqlite_survey_response_repo;
pub mod sqlite_job_repo;

pub mod postgres_user_repo;
pub mod postgres_event_repo;
pub mod postgres_registration_repo;
pub mod postgres_payment_repo;
pub mod postgres_survey_repo;
pub mod postgres_survey_response_repo;
pub mod postgres_job_repo;
