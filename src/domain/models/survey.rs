use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub mod status {
    pub const DRAFT: &str = "DRAFT";
    pub const ACTIVE: &str = "ACTIVE";
    pub const INACTIVE: &str = "INACTIVE";
}

pub mod question_type {
    pub const TEXT: &str = "TEXT";
    pub const SCALE: &str = "SCALE";
    pub const MULTIPLE_CHOICE: &str = "MULTIPLE_CHOICE";
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Survey {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Survey {
    pub fn new(title: String, description: String, created_by: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            status: status::DRAFT.to_string(),
            created_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SurveyQuestion {
    pub id: String,
    pub survey_id: String,
    pub text: String,
    pub question_type: String,
    pub position: i32,
    pub required: bool,
}

impl SurveyQuestion {
    pub fn new(survey_id: String, text: String, question_type: String, position: i32, required: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            survey_id,
            text,
            question_type,
            position,
            required,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SurveyQuestionOption {
    pub id: String,
    pub question_id: String,
    pub text: String,
    pub position: i32,
}

impl SurveyQuestionOption {
    pub fn new(question_id: String, text: String, position: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question_id,
            text,
            position,
        }
    }
}

/// A survey with its ordered question tree, independent of the store.
/// Duplication and answer validation operate on this value type.
#[derive(Debug, Serialize, Clone)]
pub struct SurveyDefinition {
    pub survey: Survey,
    pub questions: Vec<QuestionWithOptions>,
}

#[derive(Debug, Serialize, Clone)]
pub struct QuestionWithOptions {
    pub question: SurveyQuestion,
    pub options: Vec<SurveyQuestionOption>,
}

/// Deep copy of a survey definition: fresh ids everywhere, status reset to
/// DRAFT, question and option order preserved. The source rows are never
/// referenced by the copy.
pub fn duplicate_definition(source: &SurveyDefinition, created_by: String) -> SurveyDefinition {
    let mut survey = Survey::new(
        format!("{} (Copia)", source.survey.title),
        source.survey.description.clone(),
        created_by,
    );
    survey.status = status::DRAFT.to_string();

    let questions = source
        .questions
        .iter()
        .map(|q| {
            let question = SurveyQuestion::new(
                survey.id.clone(),
                q.question.text.clone(),
                q.question.question_type.clone(),
                q.question.position,
                q.question.required,
            );
            let options = q
                .options
                .iter()
                .map(|o| SurveyQuestionOption::new(question.id.clone(), o.text.clone(), o.position))
                .collect();
            QuestionWithOptions { question, options }
        })
        .collect();

    SurveyDefinition { survey, questions }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definition() -> SurveyDefinition {
        let survey = Survey::new("Feedback".into(), "Post-event feedback".into(), "manager-1".into());
        let q1 = SurveyQuestion::new(survey.id.clone(), "Comments?".into(), question_type::TEXT.to_string(), 1, false);
        let q2 = SurveyQuestion::new(survey.id.clone(), "Rate us".into(), question_type::SCALE.to_string(), 2, true);
        let q3 = SurveyQuestion::new(survey.id.clone(), "Favourite part".into(), question_type::MULTIPLE_CHOICE.to_string(), 3, true);
        let opts = vec![
            SurveyQuestionOption::new(q3.id.clone(), "Talks".into(), 1),
            SurveyQuestionOption::new(q3.id.clone(), "Workshops".into(), 2),
        ];
        SurveyDefinition {
            survey,
            questions: vec![
                QuestionWithOptions { question: q1, options: vec![] },
                QuestionWithOptions { question: q2, options: vec![] },
                QuestionWithOptions { question: q3, options: opts },
            ],
        }
    }

    #[test]
    fn duplicate_copies_structure_with_fresh_ids() {
        let source = sample_definition();
        let copy = duplicate_definition(&source, "manager-2".into());

        assert_ne!(copy.survey.id, source.survey.id);
        assert_eq!(copy.survey.status, status::DRAFT);
        assert_eq!(copy.survey.title, "Feedback (Copia)");
        assert_eq!(copy.questions.len(), source.questions.len());

        for (c, s) in copy.questions.iter().zip(source.questions.iter()) {
            assert_ne!(c.question.id, s.question.id);
            assert_eq!(c.question.survey_id, copy.survey.id);
            assert_eq!(c.question.text, s.question.text);
            assert_eq!(c.question.position, s.question.position);
            assert_eq!(c.options.len(), s.options.len());
            for (co, so) in c.options.iter().zip(s.options.iter()) {
                assert_ne!(co.id, so.id);
                assert_eq!(co.question_id, c.question.id);
                assert_eq!(co.text, so.text);
            }
        }
    }

    #[test]
    fn duplicate_leaves_source_untouched() {
        let source = sample_definition();
        let before = serde_json::to_string(&source).unwrap();
        let _ = duplicate_definition(&source, "manager-2".into());
        assert_eq!(serde_json::to_string(&source).unwrap(), before);
    }
}
