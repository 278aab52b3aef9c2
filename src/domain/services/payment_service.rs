use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::domain::models::payment::{status, Payment};
use crate::domain::models::user::User;
use crate::domain::ports::{EventRepository, PaymentRepository, RegistrationRepository};
use crate::domain::services::registration_service::RegistrationService;
use crate::domain::services::require_manager;
use crate::error::AppError;

pub struct PaymentService {
    payment_repo: Arc<dyn PaymentRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
    event_repo: Arc<dyn EventRepository>,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository>,
        registration_repo: Arc<dyn RegistrationRepository>,
        event_repo: Arc<dyn EventRepository>,
    ) -> Self {
        Self { payment_repo, registration_repo, event_repo }
    }

    /// Verifies a pending payment and accepts its registration in the same
    /// transaction. A verified payment is its own authorization: acceptance
    /// here does not require the registration to still be PENDING.
    pub async fn verify(&self, actor: &User, payment: &Payment) -> Result<Payment, AppError> {
        require_manager(actor)?;

        if payment.status != status::PENDING {
            return Err(AppError::Precondition("Only pending payments can be verified".into()));
        }

        let registration = self
            .registration_repo
            .find_by_id(&payment.registration_id)
            .await?
            .ok_or(AppError::NotFound("Registration not found".into()))?;

        let event = self
            .event_repo
            .find_by_id(&registration.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let jobs = RegistrationService::acceptance_jobs(&event, &registration.id);

        let verified = self
            .payment_repo
            .verify(&payment.id, &actor.id, Utc::now(), &registration.id, jobs)
            .await?;

        info!("Payment {} verified by {}, registration {} accepted", verified.id, actor.id, registration.id);
        Ok(verified)
    }
}
