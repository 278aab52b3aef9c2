use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::api::dtos::requests::SubmitSurveyRequest;
use crate::api::dtos::responses::SurveyFormResponse;
use crate::domain::services::survey_service::SurveyService;
use crate::error::AppError;
use crate::state::AppState;

fn survey_service(state: &Arc<AppState>) -> SurveyService {
    SurveyService::new(
        state.survey_repo.clone(),
        state.survey_response_repo.clone(),
        state.registration_repo.clone(),
    )
}

pub async fn get_survey_form(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (_, definition) = survey_service(&state).resolve_token(&token).await?;
    Ok(Json(SurveyFormResponse::from_definition(&definition)))
}

pub async fn submit_survey_form(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitSurveyRequest>,
) -> Result<impl IntoResponse, AppError> {
    survey_service(&state).submit_answers(&token, payload.answers).await?;
    Ok(Json(json!({ "status": "completed" })))
}
