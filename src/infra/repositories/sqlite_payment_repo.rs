use crate::domain::{models::job::Job, models::payment::Payment, ports::PaymentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqlitePaymentRepo {
    pool: SqlitePool,
}

impl SqlitePaymentRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_registration(&self, registration_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE registration_id = ?")
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn verify(
        &self,
        payment_id: &str,
        verified_by: &str,
        verified_at: DateTime<Utc>,
        registration_id: &str,
        jobs: Vec<Job>,
    ) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let verified = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = 'VERIFIED', verification_date = ?, verified_by = ? WHERE id = ? AND status = 'PENDING' RETURNING *"
        )
            .bind(verified_at)
            .bind(verified_by)
            .bind(payment_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::Precondition("Only pending payments can be verified".into()))?;

        sqlx::query("UPDATE registrations SET status = 'ACCEPTED' WHERE id = ?")
            .bind(registration_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for job in jobs {
            sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
                .bind(&job.id).bind(&job.job_type).bind(&job.payload).bind(job.execute_at)
                .bind(&job.status).bind(&job.error_message).bind(job.created_at)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(verified)
    }
}
