use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::RegisterRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::services::registration_service::{RegistrationService, SubmitParams};
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.full_name.trim().is_empty() {
        return Err(AppError::Validation("Full name is required".into()));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }

    let event = state
        .event_repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", slug)))?;

    let service = RegistrationService::new(state.event_repo.clone(), state.registration_repo.clone());
    let created = service
        .submit(&event, SubmitParams {
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            notes: payload.notes,
            payment_method: payload.payment_method,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(registration_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state
        .registration_repo
        .find_by_id(&registration_id)
        .await?
        .ok_or(AppError::NotFound("Registration not found".into()))?;

    let service = RegistrationService::new(state.event_repo.clone(), state.registration_repo.clone());
    let updated = service.approve(&user, &registration).await?;

    Ok(Json(updated))
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(registration_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state
        .registration_repo
        .find_by_id(&registration_id)
        .await?
        .ok_or(AppError::NotFound("Registration not found".into()))?;

    let service = RegistrationService::new(state.event_repo.clone(), state.registration_repo.clone());
    let updated = service.reject(&user, &registration).await?;

    Ok(Json(updated))
}
