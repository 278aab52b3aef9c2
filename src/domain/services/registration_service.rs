use std::sync::Arc;
use chrono::{Duration, Utc};
use tracing::info;

use crate::domain::models::event::{self, Event};
use crate::domain::models::job::{kind, Job};
use crate::domain::models::payment::Payment;
use crate::domain::models::registration::{status, NewRegistrationParams, Registration};
use crate::domain::models::user::User;
use crate::domain::ports::{EventRepository, RegistrationRepository};
use crate::domain::services::require_manager;
use crate::error::AppError;

/// Event reminders go out this many hours before the start.
pub const REMINDER_HOURS: i64 = 24;
/// Survey issuance runs this many hours after the event ends.
pub const SURVEY_ISSUE_DELAY_HOURS: i64 = 24;

pub struct SubmitParams {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

pub struct RegistrationService {
    event_repo: Arc<dyn EventRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
}

impl RegistrationService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        registration_repo: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self { event_repo, registration_repo }
    }

    /// Public submission. The initial PENDING/WAITLIST decision is settled
    /// inside the repository transaction against the live seat count; here we
    /// only validate preconditions and assemble the cascade.
    pub async fn submit(&self, event: &Event, params: SubmitParams) -> Result<Registration, AppError> {
        if event.status != event::status::PUBLISHED {
            return Err(AppError::Conflict("Event is not open for registration".into()));
        }
        if event.is_finished(Utc::now()) {
            return Err(AppError::Conflict("Event has already finished".into()));
        }

        if self
            .registration_repo
            .find_by_event_and_email(&event.id, &params.email)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateRegistration);
        }

        let registration = Registration::new(NewRegistrationParams {
            event_id: event.id.clone(),
            full_name: params.full_name,
            email: params.email,
            phone: params.phone,
            notes: params.notes,
        });

        let mut jobs = vec![Job::new(kind::REGISTRATION_RECEIVED, registration.id.clone(), Utc::now())];

        let payment = if event.modality == event::modality::PAID {
            let method = params
                .payment_method
                .ok_or(AppError::Validation("Payment method is required for paid events".into()))?;
            let amount = event
                .price
                .ok_or(AppError::Validation("Event has no price configured".into()))?;
            jobs.push(Job::new(kind::PAYMENT_INSTRUCTIONS, registration.id.clone(), Utc::now()));
            Some(Payment::new(registration.id.clone(), method, amount))
        } else {
            None
        };

        let created = self
            .registration_repo
            .submit(&registration, event, payment.as_ref(), jobs)
            .await?;

        info!("Registration {} submitted for event {} with status {}", created.id, event.slug, created.status);
        Ok(created)
    }

    /// Notification cascade shared by Approve and payment verification.
    pub fn acceptance_jobs(event: &Event, registration_id: &str) -> Vec<Job> {
        let now = Utc::now();
        let mut jobs = vec![Job::new(kind::REGISTRATION_ACCEPTED, registration_id.to_string(), now)];

        let remind_at = event.start_date - Duration::hours(REMINDER_HOURS);
        if remind_at > now {
            jobs.push(Job::new(kind::EVENT_REMINDER, registration_id.to_string(), remind_at));
        }

        if event.send_survey {
            let issue_at = event.end_date + Duration::hours(SURVEY_ISSUE_DELAY_HOURS);
            jobs.push(Job::new(kind::SURVEY_ISSUE, registration_id.to_string(), issue_at));
        }

        jobs
    }

    pub async fn approve(&self, actor: &User, registration: &Registration) -> Result<Registration, AppError> {
        require_manager(actor)?;

        if registration.status != status::PENDING {
            return Err(AppError::InvalidTransition(
                "Only pending registrations can be approved".into(),
            ));
        }

        let event = self
            .event_repo
            .find_by_id(&registration.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let jobs = Self::acceptance_jobs(&event, &registration.id);
        let updated = self
            .registration_repo
            .transition(&registration.id, status::PENDING, status::ACCEPTED, None, jobs)
            .await?;

        info!("Registration {} approved by {}", updated.id, actor.id);
        Ok(updated)
    }

    /// Rejection frees a seat: the earliest waitlisted registration (FIFO by
    /// creation time) is promoted to PENDING in the same transaction and gets
    /// its own "registration received" notification.
    pub async fn reject(&self, actor: &User, registration: &Registration) -> Result<Registration, AppError> {
        require_manager(actor)?;

        if registration.status != status::PENDING {
            return Err(AppError::InvalidTransition(
                "Only pending registrations can be rejected".into(),
            ));
        }

        let mut jobs = vec![Job::new(kind::REGISTRATION_REJECTED, registration.id.clone(), Utc::now())];

        let promoted = self
            .registration_repo
            .find_first_waitlisted(&registration.event_id)
            .await?;

        let promotion = promoted.as_ref().map(|next| {
            jobs.push(Job::new(kind::REGISTRATION_RECEIVED, next.id.clone(), Utc::now()));
            (next.id.as_str(), status::PENDING)
        });

        let updated = self
            .registration_repo
            .transition(&registration.id, status::PENDING, status::REJECTED, promotion, jobs)
            .await?;

        if let Some(next) = &promoted {
            info!("Registration {} promoted from waitlist for event {}", next.id, next.event_id);
        }
        info!("Registration {} rejected by {}", updated.id, actor.id);
        Ok(updated)
    }

    pub async fn cancel_event(&self, actor: &User, event: &Event) -> Result<(), AppError> {
        require_manager(actor)?;

        if event.status == event::status::CANCELLED {
            return Err(AppError::InvalidTransition("Event is already cancelled".into()));
        }

        let accepted = self
            .registration_repo
            .list_by_event_and_status(&event.id, status::ACCEPTED)
            .await?;

        let now = Utc::now();
        let jobs = accepted
            .iter()
            .map(|r| Job::new(kind::EVENT_CANCELLED, r.id.clone(), now))
            .collect();

        self.event_repo
            .set_status_with_jobs(&event.id, event::status::CANCELLED, jobs)
            .await?;

        info!("Event {} cancelled by {}, {} participants notified", event.id, actor.id, accepted.len());
        Ok(())
    }

    pub async fn finish_event(&self, actor: &User, event: &Event) -> Result<(), AppError> {
        require_manager(actor)?;

        if event.status != event::status::PUBLISHED {
            return Err(AppError::InvalidTransition("Only published events can be finished".into()));
        }

        let mut jobs = Vec::new();
        if event.send_survey {
            let accepted = self
                .registration_repo
                .list_by_event_and_status(&event.id, status::ACCEPTED)
                .await?;
            let now = Utc::now();
            jobs = accepted
                .iter()
                .map(|r| Job::new(kind::SURVEY_ISSUE, r.id.clone(), now))
                .collect();
        }

        self.event_repo
            .set_status_with_jobs(&event.id, event::status::FINISHED, jobs)
            .await?;

        info!("Event {} finished by {}", event.id, actor.id);
        Ok(())
    }
}
