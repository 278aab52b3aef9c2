use crate::domain::{
    models::job::Job,
    models::survey_response::{SurveyQuestionResponse, SurveyResponse},
    ports::SurveyResponseRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresSurveyResponseRepo {
    pool: PgPool,
}

impl PostgresSurveyResponseRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl SurveyResponseRepository for PostgresSurveyResponseRepo {
    async fn create_batch(&self, responses: &[SurveyResponse], jobs: Vec<Job>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        for response in responses {
            sqlx::query(
                "INSERT INTO survey_responses (id, survey_id, event_id, registration_id, token, status, expires_at, opened_at, completed_at, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
            )
                .bind(&response.id).bind(&response.survey_id).bind(&response.event_id)
                .bind(&response.registration_id).bind(&response.token).bind(&response.status)
                .bind(response.expires_at).bind(response.opened_at).bind(response.completed_at)
                .bind(response.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        for job in jobs {
            sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
                .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
                .bind(&job.status).bind(&job.error_message).bind(job.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SurveyResponse>, AppError> {
        sqlx::query_as::<_, SurveyResponse>("SELECT * FROM survey_responses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SurveyResponse>, AppError> {
        sqlx::query_as::<_, SurveyResponse>("SELECT * FROM survey_responses WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_registration(&self, survey_id: &str, registration_id: &str) -> Result<Option<SurveyResponse>, AppError> {
        sqlx::query_as::<_, SurveyResponse>(
            "SELECT * FROM survey_responses WHERE survey_id = $1 AND registration_id = $2"
        )
            .bind(survey_id)
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_survey(&self, survey_id: &str) -> Result<Vec<SurveyResponse>, AppError> {
        sqlx::query_as::<_, SurveyResponse>(
            "SELECT * FROM survey_responses WHERE survey_id = $1 ORDER BY created_at ASC"
        )
            .bind(survey_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_opened(&self, id: &str, opened_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE survey_responses SET status = 'OPENED', opened_at = $1 WHERE id = $2 AND status = 'SENT'"
        )
            .bind(opened_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn mark_expired(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE survey_responses SET status = 'EXPIRED' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn complete(
        &self,
        id: &str,
        completed_at: DateTime<Utc>,
        answers: &[SurveyQuestionResponse],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            "UPDATE survey_responses SET status = 'COMPLETED', completed_at = $1 WHERE id = $2 AND status != 'COMPLETED'"
        )
            .bind(completed_at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::AlreadyCompleted);
        }

        for answer in answers {
            sqlx::query(
                "INSERT INTO survey_question_responses (id, survey_response_id, question_id, text_response, scale_response, selected_option_id)
                 VALUES ($1, $2, $3, $4, $5, $6)"
            )
                .bind(&answer.id).bind(&answer.survey_response_id).bind(&answer.question_id)
                .bind(&answer.text_response).bind(answer.scale_response).bind(&answer.selected_option_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn list_completed_answers(&self, survey_id: &str) -> Result<Vec<SurveyQuestionResponse>, AppError> {
        sqlx::query_as::<_, SurveyQuestionResponse>(
            "SELECT sqr.* FROM survey_question_responses sqr
             JOIN survey_responses sr ON sr.id = sqr.survey_response_id
             WHERE sr.survey_id = $1 AND sr.status = 'COMPLETED'"
        )
            .bind(survey_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
