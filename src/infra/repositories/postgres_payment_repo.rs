use crate::domain::{models::job::Job, models::payment::Payment, ports::PaymentRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PostgresPaymentRepo {
    pool: PgPool,
}

impl PostgresPaymentRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_registration(&self, registration_id: &str) -> Result<Option<Payment>, AppError> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE registration_id = $1")
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
            "UPDATE payments SET status = 'VERIFIED', verification_date = $1, verified_by = $2 WHERE id = $3 AND status = 'PENDING' RETURNING *"
        )
            .bind(verified_at)
            .bind(verified_by)
            .bind(payment_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::Precondition("Only pending payments can be verified".into()))?;

        sqlx::query("UPDATE registrations SET status = 'ACCEPTED' WHERE id = $1")
            .bind(registration_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for job in jobs {
            sqlx::query("INSERT INTO jobs (id, job_type, payload, execute_at, status, error_message, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
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
