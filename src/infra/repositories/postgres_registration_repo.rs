use crate::domain::{
    models::event::Event,
    models::job::Job,
    models::payment::Payment,
    models::registration::{status, Registration},
    ports::RegistrationRepository,
    services::capacity,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresRegistrationRepo {
    pool: PgPool,
}

impl PostgresRegistrationRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepo {
    async fn submit(
        &self,
        registration: &Registration,
        event: &Event,
        payment: Option<&Payment>,
        jobs: Vec<Job>,
    ) -> Result<Registration, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Lock the event row so two concurrent submissions cannot both read a
        // count below capacity and land in PENDING.
        sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(&event.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status IN ('ACCEPTED', 'PENDING')"
        )
            .bind(&event.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let initial_status = capacity::initial_status(event.max_capacity, active);

        let created = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, event_id, full_name, email, phone, notes, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *"
        )
            .bind(&registration.id).bind(&registration.event_id).bind(&registration.full_name)
            .bind(&registration.email).bind(&registration.phone).bind(&registration.notes)
            .bind(initial_status).bind(registration.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if let Some(payment) = payment {
            sqlx::query(
                "INSERT INTO payments (id, registration_id, payment_method, amount, status, verification_date, verified_by, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
            )
                .bind(&payment.id).bind(&payment.registration_id).bind(&payment.payment_method)
                .bind(payment.amount).bind(&payment.status).bind(payment.verification_date)
                .bind(&payment.verified_by).bind(payment.created_at)
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
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_event_and_email(&self, event_id: &str, email: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE event_id = $1 AND email = $2")
            .bind(event_id)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE event_id = $1 ORDER BY created_at ASC")
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_event_and_status(&self, event_id: &str, status: &str) -> Result<Vec<Registration>, AppError> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 AND status = $2 ORDER BY created_at ASC"
        )
            .bind(event_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_active(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status IN ('ACCEPTED', 'PENDING')"
        )
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_first_waitlisted(&self, event_id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE event_id = $1 AND status = 'WAITLIST' ORDER BY created_at ASC LIMIT 1"
        )
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn transition(
        &self,
        registration_id: &str,
        expected_status: &str,
        new_status: &str,
        promoted: Option<(&str, &str)>,
        jobs: Vec<Job>,
    ) -> Result<Registration, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Compare-and-set: the transition only holds if the row still carries
        // the status the caller decided on.
        let updated = sqlx::query_as::<_, Registration>(
            "UPDATE registrations SET status = $1 WHERE id = $2 AND status = $3 RETURNING *"
        )
            .bind(new_status)
            .bind(registration_id)
            .bind(expected_status)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::InvalidTransition("Registration status changed concurrently".into()))?;

        if let Some((promoted_id, promoted_status)) = promoted {
            let result = sqlx::query(
                "UPDATE registrations SET status = $1 WHERE id = $2 AND status = $3"
            )
                .bind(promoted_status)
                .bind(promoted_id)
                .bind(status::WAITLIST)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            if result.rows_affected() == 0 {
                return Err(AppError::Conflict("Waitlisted registration changed concurrently".into()));
            }
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
        Ok(updated)
    }
}
