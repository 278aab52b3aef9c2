use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::{event, health, job, payment, registration, survey, survey_public};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public survey link
        .route("/api/v1/survey/{token}", get(survey_public::get_survey_form).post(survey_public::submit_survey_form))

        // Events: public listing and registration, manager mutations.
        // Public routes address events by slug, manager routes by id; the
        // handlers take the raw path segment either way.
        .route("/api/v1/events", get(event::list_public_events).post(event::create_event))
        .route("/api/v1/events/{id}", get(event::get_public_event).put(event::update_event))
        .route("/api/v1/events/{id}/register", post(registration::register))
        .route("/api/v1/events/{id}/cancel", post(event::cancel_event))
        .route("/api/v1/events/{id}/finish", post(event::finish_event))
        .route("/api/v1/events/{id}/send-surveys", post(event::send_surveys))
        .route("/api/v1/events/{id}/registrations", get(event::list_registrations))

        // Registrations
        .route("/api/v1/registrations/{id}/approve", post(registration::approve))
        .route("/api/v1/registrations/{id}/reject", post(registration::reject))

        // Payments
        .route("/api/v1/payments/{id}/verify", post(payment::verify))

        // Surveys
        .route("/api/v1/surveys", get(survey::list_surveys).post(survey::create_survey))
        .route("/api/v1/surveys/{id}", get(survey::get_survey).put(survey::update_survey))
        .route("/api/v1/surveys/{id}/duplicate", post(survey::duplicate_survey))
        .route("/api/v1/surveys/{id}/questions", post(survey::create_question))
        .route("/api/v1/questions/{id}/options", post(survey::create_option))
        .route("/api/v1/surveys/{id}/results", get(survey::results))
        .route("/api/v1/surveys/{id}/export", get(survey::export))

        // Jobs
        .route("/api/v1/jobs", get(job::list_jobs))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
