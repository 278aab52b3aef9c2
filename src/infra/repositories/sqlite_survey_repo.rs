use crate::domain::{
    models::survey::{QuestionWithOptions, Survey, SurveyDefinition, SurveyQuestion, SurveyQuestionOption},
    ports::SurveyRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSurveyRepo {
    pool: SqlitePool,
}

impl SqliteSurveyRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl SurveyRepository for SqliteSurveyRepo {
    async fn create(&self, survey: &Survey) -> Result<Survey, AppError> {
        sqlx::query_as::<_, Survey>(
            "INSERT INTO surveys (id, title, description, status, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&survey.id).bind(&survey.title).bind(&survey.description)
            .bind(&survey.status).bind(&survey.created_by).bind(survey.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>, AppError> {
        sqlx::query_as::<_, Survey>("SELECT * FROM surveys WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Survey>, AppError> {
        sqlx::query_as::<_, Survey>("SELECT * FROM surveys ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, survey: &Survey) -> Result<Survey, AppError> {
        sqlx::query_as::<_, Survey>(
            "UPDATE surveys SET title = ?, description = ?, status = ? WHERE id = ? RETURNING *"
        )
            .bind(&survey.title).bind(&survey.description).bind(&survey.status).bind(&survey.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create_question(&self, question: &SurveyQuestion) -> Result<SurveyQuestion, AppError> {
        sqlx::query_as::<_, SurveyQuestion>(
            "INSERT INTO survey_questions (id, survey_id, text, question_type, position, required) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&question.id).bind(&question.survey_id).bind(&question.text)
            .bind(&question.question_type).bind(question.position).bind(question.required)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_question(&self, id: &str) -> Result<Option<SurveyQuestion>, AppError> {
        sqlx::query_as::<_, SurveyQuestion>("SELECT * FROM survey_questions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create_option(&self, option: &SurveyQuestionOption) -> Result<SurveyQuestionOption, AppError> {
        sqlx::query_as::<_, SurveyQuestionOption>(
            "INSERT INTO survey_question_options (id, question_id, text, position) VALUES (?, ?, ?, ?) RETURNING *"
        )
            .bind(&option.id).bind(&option.question_id).bind(&option.text).bind(option.position)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn load_definition(&self, survey_id: &str) -> Result<Option<SurveyDefinition>, AppError> {
        let survey = match self.find_by_id(survey_id).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        let question_rows = sqlx::query_as::<_, SurveyQuestion>(
            "SELECT * FROM survey_questions WHERE survey_id = ? ORDER BY position ASC"
        )
            .bind(survey_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for question in question_rows {
            let options = sqlx::query_as::<_, SurveyQuestionOption>(
                "SELECT * FROM survey_question_options WHERE question_id = ? ORDER BY position ASC"
            )
                .bind(&question.id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database)?;
            questions.push(QuestionWithOptions { question, options });
        }

        Ok(Some(SurveyDefinition { survey, questions }))
    }

    async fn insert_definition(&self, definition: &SurveyDefinition) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let survey = &definition.survey;
        sqlx::query("INSERT INTO surveys (id, title, description, status, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(&survey.id).bind(&survey.title).bind(&survey.description)
            .bind(&survey.status).bind(&survey.created_by).bind(survey.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for entry in &definition.questions {
            let question = &entry.question;
            sqlx::query("INSERT INTO survey_questions (id, survey_id, text, question_type, position, required) VALUES (?, ?, ?, ?, ?, ?)")
                .bind(&question.id).bind(&question.survey_id).bind(&question.text)
                .bind(&question.question_type).bind(question.position).bind(question.required)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

            for option in &entry.options {
                sqlx::query("INSERT INTO survey_question_options (id, question_id, text, position) VALUES (?, ?, ?, ?)")
                    .bind(&option.id).bind(&option.question_id).bind(&option.text).bind(option.position)
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::Database)?;
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
