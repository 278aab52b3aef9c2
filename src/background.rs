use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::models::event::{self, Event};
use crate::domain::models::job::{kind, status as job_status, Job};
use crate::domain::models::registration::{status as reg_status, Registration};
use crate::domain::models::survey_response::status as resp_status;
use crate::domain::services::survey_service::SurveyService;
use crate::error::AppError;
use crate::state::AppState;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");

    loop {
        match state.job_repo.find_pending(10).await {
            Ok(jobs) => {
                for job in jobs {
                    let span = info_span!(
                        "background_job",
                        job_id = %job.id,
                        job_type = %job.job_type,
                    );

                    let state = state.clone();

                    async move {
                        info!("Processing job: {}", job.job_type);
                        match process_job(&state, &job).await {
                            Ok(_) => {
                                info!("Job completed successfully");
                                if let Err(e) = state
                                    .job_repo
                                    .update_status(&job.id, job_status::COMPLETED, None)
                                    .await
                                {
                                    error!("Failed to mark job as completed: {:?}", e);
                                }
                            }
                            Err(e) => {
                                let err_msg = format!("{}", e);
                                error!("Job failed with error: {}", err_msg);
                                if let Err(up_err) = state
                                    .job_repo
                                    .update_status(&job.id, job_status::FAILED, Some(err_msg))
                                    .await
                                {
                                    error!("Failed to mark job as failed: {:?}", up_err);
                                }
                            }
                        }
                    }
                    .instrument(span)
                    .await;
                }
            }
            Err(e) => error!("Failed to fetch pending jobs: {:?}", e),
        }
        sleep(Duration::from_secs(5)).await;
    }
}

fn email_context(registration: &Registration, event: &Event, site_url: &str) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("full_name", &registration.full_name);
    context.insert("event_title", &event.title);
    context.insert("event_start", &event.start_date.format("%Y-%m-%d %H:%M UTC").to_string());
    context.insert("event_end", &event.end_date.format("%Y-%m-%d %H:%M UTC").to_string());
    context.insert("event_location", &event.location);
    context.insert("event_link", &event.event_link);
    context.insert("event_url", &format!("{}/events/{}", site_url, event.slug));
    context
}

async fn send_rendered(
    state: &Arc<AppState>,
    template: &str,
    recipient: &str,
    subject: &str,
    context: &tera::Context,
) -> Result<(), AppError> {
    let html = state
        .templates
        .render(template, context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;
    state.email_service.send(recipient, subject, &html).await
}

async fn process_job(state: &Arc<AppState>, job: &Job) -> Result<(), AppError> {
    let registration_id = &job.payload.registration_id;

    let registration = state
        .registration_repo
        .find_by_id(registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration {} not found", registration_id)))?;

    let event = state
        .event_repo
        .find_by_id(&registration.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", registration.event_id)))?;

    let site_url = &state.config.site_url;
    let context = email_context(&registration, &event, site_url);

    match job.job_type.as_str() {
        kind::REGISTRATION_RECEIVED => {
            let subject = format!("Registration received - {}", event.title);
            send_rendered(state, "registration_received.html", &registration.email, &subject, &context).await
        }
        kind::REGISTRATION_ACCEPTED => {
            let subject = format!("You're in! - {}", event.title);
            send_rendered(state, "registration_accepted.html", &registration.email, &subject, &context).await
        }
        kind::REGISTRATION_REJECTED => {
            let subject = format!("Registration update - {}", event.title);
            send_rendered(state, "registration_rejected.html", &registration.email, &subject, &context).await
        }
        kind::PAYMENT_INSTRUCTIONS => {
            let payment = state
                .payment_repo
                .find_by_registration(&registration.id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Payment for registration {} not found", registration.id)))?;

            let mut context = context;
            context.insert("amount", &payment.amount);
            context.insert("payment_method", &payment.payment_method);

            let subject = format!("Payment instructions - {}", event.title);
            send_rendered(state, "payment_instructions.html", &registration.email, &subject, &context).await
        }
        kind::EVENT_REMINDER => {
            // A reminder scheduled at acceptance time may outlive the state it
            // was scheduled under.
            if registration.status != reg_status::ACCEPTED || event.status != event::status::PUBLISHED {
                warn!("Skipping reminder: registration or event no longer active");
                return Ok(());
            }
            let subject = format!("Reminder: {} starts soon", event.title);
            send_rendered(state, "event_reminder.html", &registration.email, &subject, &context).await
        }
        kind::EVENT_CANCELLED => {
            let subject = format!("Event cancelled - {}", event.title);
            send_rendered(state, "event_cancelled.html", &registration.email, &subject, &context).await
        }
        kind::SURVEY_ISSUE => {
            if event.status == event::status::CANCELLED {
                warn!("Skipping survey issuance: event was cancelled");
                return Ok(());
            }
            let service = SurveyService::new(
                state.survey_repo.clone(),
                state.survey_response_repo.clone(),
                state.registration_repo.clone(),
            );
            service.issue_for_event(&event).await?;
            Ok(())
        }
        kind::SURVEY_INVITATION => {
            let response_id = job
                .payload
                .survey_response_id
                .as_deref()
                .ok_or(AppError::InternalWithMsg("Survey invitation job without response id".into()))?;

            let response = state
                .survey_response_repo
                .find_by_id(response_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Survey response {} not found", response_id)))?;

            if response.status == resp_status::COMPLETED || response.status == resp_status::EXPIRED {
                warn!("Skipping survey invitation: response already {}", response.status);
                return Ok(());
            }

            let mut context = context;
            context.insert("survey_url", &format!("{}/survey/{}", site_url, response.token));

            let subject = format!("How was {}? Share your feedback", event.title);
            send_rendered(state, "survey_invitation.html", &registration.email, &subject, &context).await
        }
        other => Err(AppError::InternalWithMsg(format!("Unknown job type: {}", other))),
    }
}
