pub mod health;
pub mod event;
pub mod registration;
pub mod payment;
pub mod survey;
pub mod survey_public;
pub mod job;
