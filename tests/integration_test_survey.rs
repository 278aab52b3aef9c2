mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Survey with one scale question, one multiple choice question (two options)
/// and one optional text question. Returns (survey_id, scale_q, mc_q, option_ids, text_q).
async fn create_survey(app: &TestApp) -> (String, String, String, Vec<String>, String) {
    let res = app
        .request(
            "POST",
            "/api/v1/surveys",
            Some(&app.manager_key),
            Some(json!({ "title": "Feedback", "description": "Post-event feedback" })),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let survey_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app
        .request(
            "POST",
            &format!("/api/v1/surveys/{}/questions", survey_id),
            Some(&app.manager_key),
            Some(json!({ "text": "Overall rating", "question_type": "SCALE", "position": 1 })),
        )
        .await;
    let scale_q = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app
        .request(
            "POST",
            &format!("/api/v1/surveys/{}/questions", survey_id),
            Some(&app.manager_key),
            Some(json!({ "text": "Best part", "question_type": "MULTIPLE_CHOICE", "position": 2 })),
        )
        .await;
    let mc_q = parse_body(res).await["id"].as_str().unwrap().to_string();

    let mut option_ids = Vec::new();
    for (i, text) in ["Talks", "Networking"].iter().enumerate() {
        let res = app
            .request(
                "POST",
                &format!("/api/v1/questions/{}/options", mc_q),
                Some(&app.manager_key),
                Some(json!({ "text": text, "position": i + 1 })),
            )
            .await;
        option_ids.push(parse_body(res).await["id"].as_str().unwrap().to_string());
    }

    let res = app
        .request(
            "POST",
            &format!("/api/v1/surveys/{}/questions", survey_id),
            Some(&app.manager_key),
            Some(json!({ "text": "Comments", "question_type": "TEXT", "position": 3, "required": false })),
        )
        .await;
    let text_q = parse_body(res).await["id"].as_str().unwrap().to_string();

    (survey_id, scale_q, mc_q, option_ids, text_q)
}

/// Published event wired to the survey, with `count` accepted registrations.
async fn create_event_with_accepted(app: &TestApp, survey_id: &str, slug: &str, count: usize) -> String {
    let payload = json!({
        "title": "Surveyed Event",
        "slug": slug,
        "description": "With feedback round",
        "start_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
        "end_date": (Utc::now() + Duration::days(1) + Duration::hours(2)).to_rfc3339(),
        "modality": "FREE",
        "max_capacity": 50,
        "survey_id": survey_id,
        "send_survey": true
    });
    let res = app.request("POST", "/api/v1/events", Some(&app.manager_key), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let event_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    app.request(
        "PUT",
        &format!("/api/v1/events/{}", event_id),
        Some(&app.manager_key),
        Some(json!({ "status": "PUBLISHED" })),
    )
    .await;

    for i in 0..count {
        let res = app
            .request(
                "POST",
                &format!("/api/v1/events/{}/register", slug),
                None,
                Some(json!({
                    "full_name": format!("Guest {}", i),
                    "email": format!("guest{}@example.com", i),
                    "phone": "123"
                })),
            )
            .await;
        let registration = parse_body(res).await;
        app.request(
            "POST",
            &format!("/api/v1/registrations/{}/approve", registration["id"].as_str().unwrap()),
            Some(&app.manager_key),
            None,
        )
        .await;
    }

    event_id
}

async fn tokens_for_survey(app: &TestApp, survey_id: &str) -> Vec<String> {
    sqlx::query_scalar("SELECT token FROM survey_responses WHERE survey_id = ? ORDER BY created_at ASC")
        .bind(survey_id)
        .fetch_all(&app.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn duplicating_a_survey_deep_copies_its_questions() {
    let app = TestApp::new().await;
    let (survey_id, ..) = create_survey(&app).await;

    let res = app
        .request("POST", &format!("/api/v1/surveys/{}/duplicate", survey_id), Some(&app.manager_key), None)
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let copy = parse_body(res).await;
    assert_eq!(copy["title"], "Feedback (Copia)");
    assert_eq!(copy["status"], "DRAFT");
    let copy_id = copy["id"].as_str().unwrap();
    assert_ne!(copy_id, survey_id);

    let res = app
        .request("GET", &format!("/api/v1/surveys/{}", copy_id), Some(&app.manager_key), None)
        .await;
    let definition = parse_body(res).await;
    let questions = definition["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[1]["options"].as_array().unwrap().len(), 2);

    // The original is untouched.
    let res = app
        .request("GET", &format!("/api/v1/surveys/{}", survey_id), Some(&app.manager_key), None)
        .await;
    let original = parse_body(res).await;
    assert_eq!(original["survey"]["title"], "Feedback");
    assert_eq!(original["questions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn issuing_invitations_is_idempotent() {
    let app = TestApp::new().await;
    let (survey_id, ..) = create_survey(&app).await;
    let event_id = create_event_with_accepted(&app, &survey_id, "feedback-night", 2).await;

    let res = app
        .request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["invitations_issued"], 2);

    let res = app
        .request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None)
        .await;
    assert_eq!(parse_body(res).await["invitations_issued"], 0);

    assert_eq!(tokens_for_survey(&app, &survey_id).await.len(), 2);

    let res = app.request("GET", "/api/v1/jobs", Some(&app.manager_key), None).await;
    let jobs = parse_body(res).await;
    let invitations = jobs
        .as_array()
        .unwrap()
        .iter()
        .filter(|j| j["job_type"] == "SURVEY_INVITATION")
        .count();
    assert_eq!(invitations, 2);
}

#[tokio::test]
async fn issuing_requires_a_linked_survey() {
    let app = TestApp::new().await;

    let payload = json!({
        "title": "No survey here",
        "slug": "plain",
        "description": "Plain event",
        "start_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
        "end_date": (Utc::now() + Duration::days(2)).to_rfc3339(),
        "modality": "FREE",
        "max_capacity": 10
    });
    let res = app.request("POST", "/api/v1/events", Some(&app.manager_key), Some(payload)).await;
    let event_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app
        .request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None)
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn opening_a_survey_link_marks_it_opened() {
    let app = TestApp::new().await;
    let (survey_id, ..) = create_survey(&app).await;
    let event_id = create_event_with_accepted(&app, &survey_id, "open-me", 1).await;
    app.request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None).await;

    let token = tokens_for_survey(&app, &survey_id).await.remove(0);

    let res = app.request("GET", &format!("/api/v1/survey/{}", token), None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let form = parse_body(res).await;
    assert_eq!(form["title"], "Feedback");
    assert_eq!(form["questions"].as_array().unwrap().len(), 3);

    let status: String = sqlx::query_scalar("SELECT status FROM survey_responses WHERE token = ?")
        .bind(&token)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(status, "OPENED");
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let app = TestApp::new().await;
    let res = app.request("GET", "/api/v1/survey/bogus-token", None, None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expired_links_return_gone() {
    let app = TestApp::new().await;
    let (survey_id, ..) = create_survey(&app).await;
    let event_id = create_event_with_accepted(&app, &survey_id, "too-late", 1).await;
    app.request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None).await;

    let token = tokens_for_survey(&app, &survey_id).await.remove(0);
    sqlx::query("UPDATE survey_responses SET expires_at = ? WHERE token = ?")
        .bind(Utc::now() - Duration::hours(1))
        .bind(&token)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app.request("GET", &format!("/api/v1/survey/{}", token), None, None).await;
    assert_eq!(res.status(), StatusCode::GONE);

    let status: String = sqlx::query_scalar("SELECT status FROM survey_responses WHERE token = ?")
        .bind(&token)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(status, "EXPIRED");

    // Submissions against an expired link are refused as well.
    let res = app
        .request("POST", &format!("/api/v1/survey/{}", token), None, Some(json!({ "answers": [] })))
        .await;
    assert_eq!(res.status(), StatusCode::GONE);
}

#[tokio::test]
async fn completed_surveys_cannot_be_resubmitted() {
    let app = TestApp::new().await;
    let (survey_id, scale_q, mc_q, option_ids, _) = create_survey(&app).await;
    let event_id = create_event_with_accepted(&app, &survey_id, "once-only", 1).await;
    app.request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None).await;

    let token = tokens_for_survey(&app, &survey_id).await.remove(0);
    let answers = json!({
        "answers": [
            { "question_id": scale_q, "scale": 5 },
            { "question_id": mc_q, "option_id": option_ids[0] }
        ]
    });

    let res = app
        .request("POST", &format!("/api/v1/survey/{}", token), None, Some(answers.clone()))
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .request("POST", &format!("/api/v1/survey/{}", token), None, Some(answers))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The form is no longer served either.
    let res = app.request("GET", &format!("/api/v1/survey/{}", token), None, None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn submissions_are_validated_against_the_questions() {
    let app = TestApp::new().await;
    let (survey_id, scale_q, mc_q, option_ids, _) = create_survey(&app).await;
    let event_id = create_event_with_accepted(&app, &survey_id, "strict-form", 1).await;
    app.request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None).await;

    let token = tokens_for_survey(&app, &survey_id).await.remove(0);
    let uri = format!("/api/v1/survey/{}", token);

    // Required questions must be answered.
    let res = app.request("POST", &uri, None, Some(json!({ "answers": [] }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Scale values are clamped to 1..=5.
    let res = app
        .request(
            "POST",
            &uri,
            None,
            Some(json!({ "answers": [
                { "question_id": scale_q, "scale": 6 },
                { "question_id": mc_q, "option_id": option_ids[0] }
            ]})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Options must belong to the question.
    let res = app
        .request(
            "POST",
            &uri,
            None,
            Some(json!({ "answers": [
                { "question_id": scale_q, "scale": 4 },
                { "question_id": mc_q, "option_id": "foreign-option" }
            ]})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A failed validation leaves the response open for another attempt.
    let res = app
        .request(
            "POST",
            &uri,
            None,
            Some(json!({ "answers": [
                { "question_id": scale_q, "scale": 4 },
                { "question_id": mc_q, "option_id": option_ids[1] }
            ]})),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}
