use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::models::event::Event;
use crate::domain::models::job::Job;
use crate::domain::models::registration::status as reg_status;
use crate::domain::models::survey::{
    duplicate_definition, question_type, Survey, SurveyDefinition,
};
use crate::domain::models::survey_response::{
    status as resp_status, SurveyQuestionResponse, SurveyResponse,
};
use crate::domain::models::user::User;
use crate::domain::ports::{RegistrationRepository, SurveyRepository, SurveyResponseRepository};
use crate::domain::services::require_manager;
use crate::error::AppError;

/// One submitted answer; exactly one value field must match the question type.
#[derive(Debug, Deserialize, Clone)]
pub struct AnswerInput {
    pub question_id: String,
    pub text: Option<String>,
    pub scale: Option<i32>,
    pub option_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionCount {
    pub option_id: String,
    pub text: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionAnalysis {
    Text {
        question_id: String,
        text: String,
        response_count: i64,
        sample_responses: Vec<String>,
    },
    Scale {
        question_id: String,
        text: String,
        response_count: i64,
        average: f64,
        distribution: BTreeMap<i32, i64>,
    },
    MultipleChoice {
        question_id: String,
        text: String,
        response_count: i64,
        option_counts: Vec<OptionCount>,
    },
}

#[derive(Debug, Serialize)]
pub struct SurveyResults {
    pub survey_id: String,
    pub title: String,
    pub total_completed: i64,
    pub questions: Vec<QuestionAnalysis>,
}

/// Text questions report at most this many literal answers.
const TEXT_SAMPLE_LIMIT: usize = 5;

pub struct SurveyService {
    survey_repo: Arc<dyn SurveyRepository>,
    response_repo: Arc<dyn SurveyResponseRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
}

impl SurveyService {
    pub fn new(
        survey_repo: Arc<dyn SurveyRepository>,
        response_repo: Arc<dyn SurveyResponseRepository>,
        registration_repo: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self { survey_repo, response_repo, registration_repo }
    }

    pub async fn duplicate(&self, actor: &User, survey_id: &str) -> Result<Survey, AppError> {
        require_manager(actor)?;

        let source = self
            .survey_repo
            .load_definition(survey_id)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;

        let copy = duplicate_definition(&source, actor.id.clone());
        self.survey_repo.insert_definition(&copy).await?;

        info!("Survey {} duplicated as {} by {}", survey_id, copy.survey.id, actor.id);
        Ok(copy.survey)
    }

    pub async fn issue_invitations(&self, actor: &User, event: &Event) -> Result<usize, AppError> {
        require_manager(actor)?;
        self.issue_for_event(event).await
    }

    /// Creates one SENT response (fresh token, 48h expiry) per accepted
    /// registration that has none yet, plus the invitation job. Registrations
    /// that already have a response are skipped, so re-running only picks up
    /// newly accepted participants.
    pub async fn issue_for_event(&self, event: &Event) -> Result<usize, AppError> {
        let survey_id = event
            .survey_id
            .as_deref()
            .ok_or(AppError::Precondition("Event has no survey assigned".into()))?;
        if !event.send_survey {
            return Err(AppError::Precondition("Survey sending is not enabled for this event".into()));
        }

        let accepted = self
            .registration_repo
            .list_by_event_and_status(&event.id, reg_status::ACCEPTED)
            .await?;

        let mut responses = Vec::new();
        let mut jobs = Vec::new();
        let now = Utc::now();

        for registration in accepted {
            let existing = self
                .response_repo
                .find_by_registration(survey_id, &registration.id)
                .await?;
            if existing.is_some() {
                continue;
            }

            let response = SurveyResponse::new(
                survey_id.to_string(),
                event.id.clone(),
                registration.id.clone(),
            );
            jobs.push(Job::survey_invitation(registration.id.clone(), response.id.clone(), now));
            responses.push(response);
        }

        let created = responses.len();
        if created > 0 {
            self.response_repo.create_batch(&responses, jobs).await?;
        }

        info!("Issued {} survey invitations for event {}", created, event.id);
        Ok(created)
    }

    /// Resolves a public survey link. Expiry wins over any stored status;
    /// opening is recorded once.
    pub async fn resolve_token(&self, token: &str) -> Result<(SurveyResponse, SurveyDefinition), AppError> {
        let mut response = self
            .response_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;

        let now = Utc::now();
        if response.is_expired(now) {
            if response.status != resp_status::EXPIRED {
                self.response_repo.mark_expired(&response.id).await?;
            }
            return Err(AppError::ExpiredToken);
        }

        if response.status == resp_status::COMPLETED {
            return Err(AppError::AlreadyCompleted);
        }

        if response.opened_at.is_none() {
            self.response_repo.mark_opened(&response.id, now).await?;
            response.status = resp_status::OPENED.to_string();
            response.opened_at = Some(now);
        }

        let definition = self
            .survey_repo
            .load_definition(&response.survey_id)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;

        Ok((response, definition))
    }

    pub async fn submit_answers(&self, token: &str, answers: Vec<AnswerInput>) -> Result<(), AppError> {
        let response = self
            .response_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;

        let now = Utc::now();
        if response.is_expired(now) {
            if response.status != resp_status::EXPIRED {
                self.response_repo.mark_expired(&response.id).await?;
            }
            return Err(AppError::ExpiredToken);
        }
        if response.status == resp_status::COMPLETED {
            return Err(AppError::AlreadyCompleted);
        }

        let definition = self
            .survey_repo
            .load_definition(&response.survey_id)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;

        let rows = validate_answers(&definition, &response.id, &answers)?;
        self.response_repo.complete(&response.id, now, &rows).await?;

        info!("Survey response {} completed", response.id);
        Ok(())
    }

    /// Aggregates over COMPLETED responses only.
    pub async fn results(&self, survey_id: &str) -> Result<SurveyResults, AppError> {
        let definition = self
            .survey_repo
            .load_definition(survey_id)
            .await?
            .ok_or(AppError::NotFound("Survey not found".into()))?;

        let answers = self.response_repo.list_completed_answers(survey_id).await?;
        let responses = self.response_repo.list_by_survey(survey_id).await?;
        let total_completed = responses
            .iter()
            .filter(|r| r.status == resp_status::COMPLETED)
            .count() as i64;

        Ok(aggregate_answers(&definition, &answers, total_completed))
    }
}

/// Checks every answer against its question (required questions answered,
/// scale in range, option belongs to the question) and produces one typed row
/// per answered question.
pub fn validate_answers(
    definition: &SurveyDefinition,
    response_id: &str,
    answers: &[AnswerInput],
) -> Result<Vec<SurveyQuestionResponse>, AppError> {
    for answer in answers {
        if !definition.questions.iter().any(|q| q.question.id == answer.question_id) {
            return Err(AppError::Validation(format!(
                "Unknown question: {}", answer.question_id
            )));
        }
    }

    let mut rows = Vec::new();

    for entry in &definition.questions {
        let question = &entry.question;
        let answer = answers.iter().find(|a| a.question_id == question.id);

        let answer = match answer {
            Some(a) => a,
            None => {
                if question.required {
                    return Err(AppError::Validation(format!(
                        "Question \"{}\" requires an answer", question.text
                    )));
                }
                continue;
            }
        };

        match question.question_type.as_str() {
            question_type::TEXT => {
                let value = answer.text.as_deref().unwrap_or("").trim().to_string();
                if value.is_empty() {
                    if question.required {
                        return Err(AppError::Validation(format!(
                            "Question \"{}\" requires an answer", question.text
                        )));
                    }
                    continue;
                }
                rows.push(SurveyQuestionResponse::text(
                    response_id.to_string(),
                    question.id.clone(),
                    value,
                ));
            }
            question_type::SCALE => {
                let value = answer.scale.ok_or(AppError::Validation(format!(
                    "Question \"{}\" expects a scale value", question.text
                )))?;
                if !(1..=5).contains(&value) {
                    return Err(AppError::Validation("Scale answers must be between 1 and 5".into()));
                }
                rows.push(SurveyQuestionResponse::scale(
                    response_id.to_string(),
                    question.id.clone(),
                    value,
                ));
            }
            question_type::MULTIPLE_CHOICE => {
                let option_id = answer.option_id.as_deref().ok_or(AppError::Validation(format!(
                    "Question \"{}\" expects an option", question.text
                )))?;
                if !entry.options.iter().any(|o| o.id == option_id) {
                    return Err(AppError::Validation(format!(
                        "Option {} does not belong to question \"{}\"", option_id, question.text
                    )));
                }
                rows.push(SurveyQuestionResponse::choice(
                    response_id.to_string(),
                    question.id.clone(),
                    option_id.to_string(),
                ));
            }
            other => {
                return Err(AppError::InternalWithMsg(format!("Unknown question type {}", other)));
            }
        }
    }

    Ok(rows)
}

/// Pure aggregation over the answers of completed responses.
pub fn aggregate_answers(
    definition: &SurveyDefinition,
    answers: &[SurveyQuestionResponse],
    total_completed: i64,
) -> SurveyResults {
    let questions = definition
        .questions
        .iter()
        .map(|entry| {
            let question = &entry.question;
            let own: Vec<&SurveyQuestionResponse> = answers
                .iter()
                .filter(|a| a.question_id == question.id)
                .collect();

            match question.question_type.as_str() {
                question_type::SCALE => {
                    let values: Vec<i32> = own.iter().filter_map(|a| a.scale_response).collect();
                    let average = if values.is_empty() {
                        0.0
                    } else {
                        let mean = values.iter().sum::<i32>() as f64 / values.len() as f64;
                        (mean * 100.0).round() / 100.0
                    };
                    let mut distribution: BTreeMap<i32, i64> = (1..=5).map(|i| (i, 0)).collect();
                    for v in &values {
                        if let Some(slot) = distribution.get_mut(v) {
                            *slot += 1;
                        }
                    }
                    QuestionAnalysis::Scale {
                        question_id: question.id.clone(),
                        text: question.text.clone(),
                        response_count: values.len() as i64,
                        average,
                        distribution,
                    }
                }
                question_type::MULTIPLE_CHOICE => {
                    let option_counts = entry
                        .options
                        .iter()
                        .map(|option| OptionCount {
                            option_id: option.id.clone(),
                            text: option.text.clone(),
                            count: own
                                .iter()
                                .filter(|a| a.selected_option_id.as_deref() == Some(option.id.as_str()))
                                .count() as i64,
                        })
                        .collect();
                    QuestionAnalysis::MultipleChoice {
                        question_id: question.id.clone(),
                        text: question.text.clone(),
                        response_count: own
                            .iter()
                            .filter(|a| a.selected_option_id.is_some())
                            .count() as i64,
                        option_counts,
                    }
                }
                _ => {
                    let texts: Vec<String> = own
                        .iter()
                        .filter_map(|a| a.text_response.clone())
                        .filter(|t| !t.is_empty())
                        .collect();
                    QuestionAnalysis::Text {
                        question_id: question.id.clone(),
                        text: question.text.clone(),
                        response_count: texts.len() as i64,
                        sample_responses: texts.into_iter().take(TEXT_SAMPLE_LIMIT).collect(),
                    }
                }
            }
        })
        .collect();

    SurveyResults {
        survey_id: definition.survey.id.clone(),
        title: definition.survey.title.clone(),
        total_completed,
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::survey::{
        QuestionWithOptions, Survey, SurveyQuestion, SurveyQuestionOption,
    };

    fn definition() -> SurveyDefinition {
        let survey = Survey::new("Satisfacción".into(), "".into(), "m1".into());
        let text_q = SurveyQuestion::new(survey.id.clone(), "Comments".into(), question_type::TEXT.to_string(), 1, false);
        let scale_q = SurveyQuestion::new(survey.id.clone(), "Rating".into(), question_type::SCALE.to_string(), 2, true);
        let mc_q = SurveyQuestion::new(survey.id.clone(), "Best part".into(), question_type::MULTIPLE_CHOICE.to_string(), 3, true);
        let options = vec![
            SurveyQuestionOption::new(mc_q.id.clone(), "Talks".into(), 1),
            SurveyQuestionOption::new(mc_q.id.clone(), "Networking".into(), 2),
        ];
        SurveyDefinition {
            survey,
            questions: vec![
                QuestionWithOptions { question: text_q, options: vec![] },
                QuestionWithOptions { question: scale_q, options: vec![] },
                QuestionWithOptions { question: mc_q, options },
            ],
        }
    }

    fn scale_answers(def: &SurveyDefinition, values: &[i32]) -> Vec<SurveyQuestionResponse> {
        let q = &def.questions[1].question;
        values
            .iter()
            .map(|v| SurveyQuestionResponse::scale("r".into(), q.id.clone(), *v))
            .collect()
    }

    #[test]
    fn scale_mean_and_histogram() {
        let def = definition();
        let answers = scale_answers(&def, &[3, 4, 5]);
        let results = aggregate_answers(&def, &answers, 3);

        match &results.questions[1] {
            QuestionAnalysis::Scale { average, distribution, response_count, .. } => {
                assert_eq!(*average, 4.0);
                assert_eq!(*response_count, 3);
                assert_eq!(distribution[&1], 0);
                assert_eq!(distribution[&2], 0);
                assert_eq!(distribution[&3], 1);
                assert_eq!(distribution[&4], 1);
                assert_eq!(distribution[&5], 1);
            }
            other => panic!("expected scale analysis, got {:?}", other),
        }
    }

    #[test]
    fn scale_mean_is_zero_without_answers() {
        let def = definition();
        let results = aggregate_answers(&def, &[], 0);
        match &results.questions[1] {
            QuestionAnalysis::Scale { average, response_count, .. } => {
                assert_eq!(*average, 0.0);
                assert_eq!(*response_count, 0);
            }
            other => panic!("expected scale analysis, got {:?}", other),
        }
    }

    #[test]
    fn option_counts_include_unpicked_options() {
        let def = definition();
        let mc = &def.questions[2];
        let picked = &mc.options[0];
        let answers = vec![
            SurveyQuestionResponse::choice("r1".into(), mc.question.id.clone(), picked.id.clone()),
            SurveyQuestionResponse::choice("r2".into(), mc.question.id.clone(), picked.id.clone()),
        ];
        let results = aggregate_answers(&def, &answers, 2);

        match &results.questions[2] {
            QuestionAnalysis::MultipleChoice { option_counts, .. } => {
                assert_eq!(option_counts[0].count, 2);
                assert_eq!(option_counts[1].count, 0);
            }
            other => panic!("expected choice analysis, got {:?}", other),
        }
    }

    #[test]
    fn text_samples_are_bounded() {
        let def = definition();
        let q = &def.questions[0].question;
        let answers: Vec<SurveyQuestionResponse> = (0..8)
            .map(|i| SurveyQuestionResponse::text("r".into(), q.id.clone(), format!("answer {}", i)))
            .collect();
        let results = aggregate_answers(&def, &answers, 8);

        match &results.questions[0] {
            QuestionAnalysis::Text { sample_responses, response_count, .. } => {
                assert_eq!(*response_count, 8);
                assert_eq!(sample_responses.len(), TEXT_SAMPLE_LIMIT);
            }
            other => panic!("expected text analysis, got {:?}", other),
        }
    }

    #[test]
    fn missing_required_answer_is_rejected() {
        let def = definition();
        let err = validate_answers(&def, "resp", &[]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn foreign_option_is_rejected() {
        let def = definition();
        let answers = vec![
            AnswerInput {
                question_id: def.questions[1].question.id.clone(),
                text: None,
                scale: Some(4),
                option_id: None,
            },
            AnswerInput {
                question_id: def.questions[2].question.id.clone(),
                text: None,
                scale: None,
                option_id: Some("not-an-option".into()),
            },
        ];
        let err = validate_answers(&def, "resp", &answers).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn scale_out_of_range_is_rejected() {
        let def = definition();
        let answers = vec![
            AnswerInput {
                question_id: def.questions[1].question.id.clone(),
                text: None,
                scale: Some(6),
                option_id: None,
            },
            AnswerInput {
                question_id: def.questions[2].question.id.clone(),
                text: None,
                scale: None,
                option_id: Some(def.questions[2].options[0].id.clone()),
            },
        ];
        let err = validate_answers(&def, "resp", &answers).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn valid_answers_produce_one_typed_row_each() {
        let def = definition();
        let answers = vec![
            AnswerInput {
                question_id: def.questions[0].question.id.clone(),
                text: Some("Great event".into()),
                scale: None,
                option_id: None,
            },
            AnswerInput {
                question_id: def.questions[1].question.id.clone(),
                text: None,
                scale: Some(5),
                option_id: None,
            },
            AnswerInput {
                question_id: def.questions[2].question.id.clone(),
                text: None,
                scale: None,
                option_id: Some(def.questions[2].options[1].id.clone()),
            },
        ];
        let rows = validate_answers(&def, "resp", &answers).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text_response.as_deref(), Some("Great event"));
        assert_eq!(rows[1].scale_response, Some(5));
        assert_eq!(rows[2].selected_option_id.as_deref(), Some(def.questions[2].options[1].id.as_str()));
        for row in &rows {
            let populated = row.text_response.is_some() as u8
                + row.scale_response.is_some() as u8
                + row.selected_option_id.is_some() as u8;
            assert_eq!(populated, 1);
        }
    }
}
