pub mod capacity;
pub mod registration_service;
pub mod payment_service;
pub mod survey_service;

use crate::domain::models::user::User;
use crate::error::AppError;

/// State-changing operations take the acting user explicitly and gate on the
/// MANAGER role before touching anything.
pub fn require_manager(actor: &User) -> Result<(), AppError> {
    if actor.is_manager() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Manager role required".into()))
    }
}
