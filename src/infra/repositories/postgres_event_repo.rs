use crate::domain::{models::event::Event, models::job::Job, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, slug, description, location, event_link, start_date, end_date, modality, price, max_capacity, status, survey_id, send_survey, created_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING *"
        )
            .bind(&event.id).bind(&event.title).bind(&event.slug).bind(&event.description)
            .bind(&event.location).bind(&event.event_link).bind(event.start_date).bind(event.end_date)
            .bind(&event.modality).bind(event.price).bind(event.max_capacity).bind(&event.status)
            .bind(&event.survey_id).bind(event.send_survey).bind(&event.created_by)
            .bind(event.created_at).bind(event.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, status: Option<&str>) -> Result<Vec<Event>, AppError> {
        match status {
            Some(status) => sqlx::query_as::<_, Event>(
                "SELECT * FROM events WHERE status = $1 ORDER BY start_date ASC"
            )
                .bind(status)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
            None => sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY start_date ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::Database),
        }
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title=$1, slug=$2, description=$3, location=$4, event_link=$5, start_date=$6, end_date=$7, modality=$8, price=$9, max_capacity=$10, status=$11, survey_id=$12, send_survey=$13, updated_at=$14
             WHERE id=$15
             RETURNING *"
        )
            .bind(&event.title).bind(&event.slug).bind(&event.description)
            .bind(&event.location).bind(&event.event_link).bind(event.start_date).bind(event.end_date)
            .bind(&event.modality).bind(event.price).bind(event.max_capacity).bind(&event.status)
            .bind(&event.survey_id).bind(event.send_survey).bind(event.updated_at)
            .bind(&event.id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn set_status_with_jobs(&self, event_id: &str, status: &str, jobs: Vec<Job>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query("UPDATE events SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status)
            .bind(Utc::now())
            .bind(event_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
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
}
