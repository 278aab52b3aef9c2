use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::extractors::auth::AuthUser;
use crate::domain::services::payment_service::PaymentService;
use crate::error::AppError;
use crate::state::AppState;

pub async fn verify(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(payment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let payment = state
        .payment_repo
        .find_by_id(&payment_id)
        .await?
        .ok_or(AppError::NotFound("Payment not found".into()))?;

    let service = PaymentService::new(
        state.payment_repo.clone(),
        state.registration_repo.clone(),
        state.event_repo.clone(),
    );
    let verified = service.verify(&user, &payment).await?;

    Ok(Json(verified))
}
