use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CreateEventRequest, UpdateEventRequest};
use crate::api::dtos::responses::PublicEventResponse;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::{self, Event, NewEventParams};
use crate::domain::services::registration_service::RegistrationService;
use crate::domain::services::survey_service::SurveyService;
use crate::domain::services::require_manager;
use crate::error::AppError;
use crate::state::AppState;

fn validate_modality(modality: &str, price: Option<f64>) -> Result<(), AppError> {
    match modality {
        event::modality::FREE => Ok(()),
        event::modality::PAID => {
            let price = price.ok_or(AppError::Validation("Paid events require a price".into()))?;
            if price <= 0.0 {
                return Err(AppError::Validation("Price must be positive".into()));
            }
            Ok(())
        }
        _ => Err(AppError::Validation("Invalid modality".into())),
    }
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    validate_modality(&payload.modality, payload.price)?;
    if payload.end_date < payload.start_date {
        return Err(AppError::Validation("End date must be after start date".into()));
    }
    if payload.max_capacity < 0 {
        return Err(AppError::Validation("Capacity must not be negative".into()));
    }
    if let Some(survey_id) = &payload.survey_id {
        state
            .survey_repo
            .find_by_id(survey_id)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;
    }

    let event = Event::new(NewEventParams {
        title: payload.title,
        slug: payload.slug,
        description: payload.description,
        location: payload.location,
        event_link: payload.event_link,
        start_date: payload.start_date,
        end_date: payload.end_date,
        modality: payload.modality,
        price: payload.price,
        max_capacity: payload.max_capacity,
        survey_id: payload.survey_id,
        send_survey: payload.send_survey.unwrap_or(false),
        created_by: user.id.clone(),
    });

    let created = state.event_repo.create(&event).await?;
    info!("Event created: {} by {}", created.slug, user.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let mut event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(val) = payload.title { event.title = val; }
    if let Some(val) = payload.slug { event.slug = val; }
    if let Some(val) = payload.description { event.description = val; }
    if let Some(val) = payload.location { event.location = Some(val); }
    if let Some(val) = payload.event_link { event.event_link = Some(val); }
    if let Some(val) = payload.start_date { event.start_date = val; }
    if let Some(val) = payload.end_date { event.end_date = val; }
    if let Some(val) = payload.modality { event.modality = val; }
    if let Some(val) = payload.price { event.price = Some(val); }
    if let Some(val) = payload.max_capacity {
        if val < 0 {
            return Err(AppError::Validation("Capacity must not be negative".into()));
        }
        event.max_capacity = val;
    }
    if let Some(val) = payload.status {
        // Cancellation and finishing run through their own endpoints so the
        // notification cascades fire.
        match val.as_str() {
            event::status::DRAFT | event::status::PUBLISHED => event.status = val,
            _ => return Err(AppError::Validation("Status must be DRAFT or PUBLISHED".into())),
        }
    }
    if let Some(val) = payload.survey_id {
        state
            .survey_repo
            .find_by_id(&val)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;
        event.survey_id = Some(val);
    }
    if let Some(val) = payload.send_survey { event.send_survey = val; }

    validate_modality(&event.modality, event.price)?;
    if event.end_date < event.start_date {
        return Err(AppError::Validation("End date must be after start date".into()));
    }

    event.updated_at = Utc::now();
    let updated = state.event_repo.update(&event).await?;
    info!("Event updated: {}", updated.slug);
    Ok(Json(updated))
}

pub async fn list_public_events(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let events = state.event_repo.list(Some(event::status::PUBLISHED)).await?;

    let mut out = Vec::with_capacity(events.len());
    for event in events {
        let active = state.registration_repo.count_active(&event.id).await?;
        out.push(PublicEventResponse::from_event(event, active));
    }

    Ok(Json(out))
}

pub async fn get_public_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_slug(&slug)
        .await?
        .filter(|e| e.status != event::status::DRAFT)
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' not found", slug)))?;

    let active = state.registration_repo.count_active(&event.id).await?;
    Ok(Json(PublicEventResponse::from_event(event, active)))
}

pub async fn cancel_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let service = RegistrationService::new(state.event_repo.clone(), state.registration_repo.clone());
    service.cancel_event(&user, &event).await?;

    Ok(Json(json!({ "status": "cancelled" })))
}

pub async fn finish_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let service = RegistrationService::new(state.event_repo.clone(), state.registration_repo.clone());
    service.finish_event(&user, &event).await?;

    Ok(Json(json!({ "status": "finished" })))
}

pub async fn send_surveys(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let service = SurveyService::new(
        state.survey_repo.clone(),
        state.survey_response_repo.clone(),
        state.registration_repo.clone(),
    );
    let issued = service.issue_invitations(&user, &event).await?;

    Ok(Json(json!({ "invitations_issued": issued })))
}

pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let registrations = state.registration_repo.list_by_event(&event_id).await?;
    Ok(Json(registrations))
}
