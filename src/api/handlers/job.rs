use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::extractors::auth::AuthUser;
use crate::domain::services::require_manager;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    require_manager(&user)?;
    let jobs = state.job_repo.list().await?;
    Ok(Json(jobs))
}
