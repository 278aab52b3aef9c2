use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{
    CreateOptionRequest, CreateQuestionRequest, CreateSurveyRequest, UpdateSurveyRequest,
};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::survey::{self, Survey, SurveyQuestion, SurveyQuestionOption};
use crate::domain::services::require_manager;
use crate::domain::services::survey_service::{QuestionAnalysis, SurveyResults, SurveyService};
use crate::error::AppError;
use crate::state::AppState;

fn survey_service(state: &Arc<AppState>) -> SurveyService {
    SurveyService::new(
        state.survey_repo.clone(),
        state.survey_response_repo.clone(),
        state.registration_repo.clone(),
    )
}

pub async fn create_survey(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateSurveyRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }

    let survey = Survey::new(payload.title, payload.description.unwrap_or_default(), user.id.clone());
    let created = state.survey_repo.create(&survey).await?;

    info!("Survey created: {} by {}", created.id, user.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_surveys(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;
    let surveys = state.survey_repo.list().await?;
    Ok(Json(surveys))
}

pub async fn get_survey(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let definition = state
        .survey_repo
        .load_definition(&survey_id)
        .await?
        .ok_or(AppError::NotFound("Survey not found".into()))?;

    Ok(Json(definition))
}

pub async fn update_survey(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(survey_id): Path<String>,
    Json(payload): Json<UpdateSurveyRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let mut record = state
        .survey_repo
        .find_by_id(&survey_id)
        .await?
        .ok_or(AppError::NotFound("Survey not found".into()))?;

    if let Some(val) = payload.title { record.title = val; }
    if let Some(val) = payload.description { record.description = val; }
    if let Some(val) = payload.status {
        match val.as_str() {
            survey::status::DRAFT | survey::status::ACTIVE | survey::status::INACTIVE => {
                record.status = val;
            }
            _ => return Err(AppError::Validation("Invalid survey status".into())),
        }
    }

    let updated = state.survey_repo.update(&record).await?;
    Ok(Json(updated))
}

pub async fn duplicate_survey(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let copy = survey_service(&state).duplicate(&user, &survey_id).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn create_question(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(survey_id): Path<String>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    state
        .survey_repo
        .find_by_id(&survey_id)
        .await?
        .ok_or(AppError::NotFound("Survey not found".into()))?;

    match payload.question_type.as_str() {
        survey::question_type::TEXT
        | survey::question_type::SCALE
        | survey::question_type::MULTIPLE_CHOICE => {}
        _ => return Err(AppError::Validation("Invalid question type".into())),
    }
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("Question text is required".into()));
    }

    let question = SurveyQuestion::new(
        survey_id,
        payload.text,
        payload.question_type,
        payload.position,
        payload.required.unwrap_or(true),
    );
    let created = state.survey_repo.create_question(&question).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_option(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(question_id): Path<String>,
    Json(payload): Json<CreateOptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let question = state
        .survey_repo
        .find_question(&question_id)
        .await?
        .ok_or(AppError::NotFound("Question not found".into()))?;

    if question.question_type != survey::question_type::MULTIPLE_CHOICE {
        return Err(AppError::Validation("Only multiple choice questions take options".into()));
    }
    if payload.text.trim().is_empty() {
        return Err(AppError::Validation("Option text is required".into()));
    }

    let option = SurveyQuestionOption::new(question_id, payload.text, payload.position);
    let created = state.survey_repo.create_option(&option).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn results(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(survey_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;
    let results = survey_service(&state).results(&survey_id).await?;
    Ok(Json(results))
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(survey_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;

    let format = params.get("format").map(String::as_str).unwrap_or("csv");
    if format != "csv" {
        return Err(AppError::Validation("Only csv export is supported".into()));
    }

    let results = survey_service(&state).results(&survey_id).await?;
    let body = results_to_csv(&results);

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"survey-{}-results.csv\"", results.survey_id),
        ),
    ];

    Ok((headers, body))
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per question, aggregate folded into the detail column.
fn results_to_csv(results: &SurveyResults) -> String {
    let mut out = String::from("question,type,responses,detail\n");

    for question in &results.questions {
        let (text, kind, count, detail) = match question {
            QuestionAnalysis::Text { text, response_count, sample_responses, .. } => {
                (text, "TEXT", *response_count, sample_responses.join("; "))
            }
            QuestionAnalysis::Scale { text, response_count, average, distribution, .. } => {
                let buckets: Vec<String> =
                    distribution.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                (text, "SCALE", *response_count, format!("average={}; {}", average, buckets.join("; ")))
            }
            QuestionAnalysis::MultipleChoice { text, response_count, option_counts, .. } => {
                let counts: Vec<String> =
                    option_counts.iter().map(|o| format!("{}={}", o.text, o.count)).collect();
                (text, "MULTIPLE_CHOICE", *response_count, counts.join("; "))
            }
        };
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(text),
            kind,
            count,
            csv_field(&detail)
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn csv_fields_are_escaped() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn csv_has_one_row_per_question() {
        let results = SurveyResults {
            survey_id: "s1".into(),
            title: "Feedback".into(),
            total_completed: 3,
            questions: vec![
                QuestionAnalysis::Scale {
                    question_id: "q1".into(),
                    text: "Rating".into(),
                    response_count: 3,
                    average: 4.0,
                    distribution: BTreeMap::from([(1, 0), (2, 0), (3, 1), (4, 1), (5, 1)]),
                },
                QuestionAnalysis::Text {
                    question_id: "q2".into(),
                    text: "Comments, please".into(),
                    response_count: 1,
                    sample_responses: vec!["Great".into()],
                },
            ],
        };

        let csv = results_to_csv(&results);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "question,type,responses,detail");
        assert!(lines[1].contains("average=4"));
        assert!(lines[1].contains("3=1"));
        assert!(lines[2].starts_with("\"Comments, please\""));
    }
}
