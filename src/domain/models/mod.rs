pub mod event;
pub mod registration;
pub mod payment;
pub mod survey;
pub mod survey_response;
pub mod job;
pub mod user;
