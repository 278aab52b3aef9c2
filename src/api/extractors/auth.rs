use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::sync::Arc;
use tracing::Span;

use crate::domain::models::user::User;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, resolved from a `Authorization: Bearer <api-key>`
/// header against the users table. Role checks stay in the services.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .ok_or(AppError::Unauthorized)?
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let api_key = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
        if api_key.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let user = app_state
            .user_repo
            .find_by_api_key(api_key)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}
