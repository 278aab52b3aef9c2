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

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

struct SurveySetup {
    survey_id: String,
    scale_q: String,
    mc_q: String,
    option_ids: Vec<String>,
    text_q: String,
    tokens: Vec<String>,
}

/// Survey with a required scale question, a required multiple choice question
/// and an optional text question, issued to `participants` accepted
/// registrations of a published event.
async fn setup(app: &TestApp, participants: usize) -> SurveySetup {
    let res = app
        .request(
            "POST",
            "/api/v1/surveys",
            Some(&app.manager_key),
            Some(json!({ "title": "Event feedback" })),
        )
        .await;
    let survey_id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app
        .request(
            "POST",
            &format!("/api/v1/surveys/{}/questions", survey_id),
            Some(&app.manager_key),
            Some(json!({ "text": "How was it?", "question_type": "SCALE", "position": 1 })),
        )
        .await;
    let scale_q = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app
        .request(
            "POST",
            &format!("/api/v1/surveys/{}/questions", survey_id),
            Some(&app.manager_key),
            Some(json!({ "text": "Highlight", "question_type": "MULTIPLE_CHOICE", "position": 2 })),
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
            Some(json!({ "text": "Anything else?", "question_type": "TEXT", "position": 3, "required": false })),
        )
        .await;
    let text_q = parse_body(res).await["id"].as_str().unwrap().to_string();

    let payload = json!({
        "title": "Measured Event",
        "slug": "measured",
        "description": "We read the numbers",
        "start_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
        "end_date": (Utc::now() + Duration::days(1) + Duration::hours(2)).to_rfc3339(),
        "modality": "FREE",
        "max_capacity": 50,
        "survey_id": survey_id,
        "send_survey": true
    });
    let res = app.request("POST", "/api/v1/events", Some(&app.manager_key), Some(payload)).await;
    let event_id = parse_body(res).await["id"].as_str().unwrap().to_string();
    app.request(
        "PUT",
        &format!("/api/v1/events/{}", event_id),
        Some(&app.manager_key),
        Some(json!({ "status": "PUBLISHED" })),
    )
    .await;

    for i in 0..participants {
        let res = app
            .request(
                "POST",
                "/api/v1/events/measured/register",
                None,
                Some(json!({
                    "full_name": format!("Attendee {}", i),
                    "email": format!("attendee{}@example.com", i),
                    "phone": "600"
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

    let res = app
        .request("POST", &format!("/api/v1/events/{}/send-surveys", event_id), Some(&app.manager_key), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let tokens: Vec<String> =
        sqlx::query_scalar("SELECT token FROM survey_responses WHERE survey_id = ? ORDER BY created_at ASC")
            .bind(&survey_id)
            .fetch_all(&app.pool)
            .await
            .unwrap();
    assert_eq!(tokens.len(), participants);

    SurveySetup { survey_id, scale_q, mc_q, option_ids, text_q, tokens }
}

async fn submit(app: &TestApp, setup: &SurveySetup, token: &str, scale: i32, option: usize, text: Option<&str>) {
    let mut answers = vec![
        json!({ "question_id": setup.scale_q, "scale": scale }),
        json!({ "question_id": setup.mc_q, "option_id": setup.option_ids[option] }),
    ];
    if let Some(t) = text {
        answers.push(json!({ "question_id": setup.text_q, "text": t }));
    }

    let res = app
        .request("POST", &format!("/api/v1/survey/{}", token), None, Some(json!({ "answers": answers })))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn results_aggregate_completed_responses() {
    let app = TestApp::new().await;
    let setup = setup(&app, 4).await;

    submit(&app, &setup, &setup.tokens[0], 3, 0, Some("Great talks")).await;
    submit(&app, &setup, &setup.tokens[1], 4, 0, None).await;
    submit(&app, &setup, &setup.tokens[2], 5, 0, Some("More pizza")).await;

    // The fourth invitation was opened but never submitted.
    let res = app
        .request("GET", &format!("/api/v1/survey/{}", setup.tokens[3]), None, None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .request("GET", &format!("/api/v1/surveys/{}/results", setup.survey_id), Some(&app.manager_key), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    let results = parse_body(res).await;

    assert_eq!(results["title"], "Event feedback");
    assert_eq!(results["total_completed"], 3);
    let questions = results["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);

    let scale = &questions[0];
    assert_eq!(scale["type"], "scale");
    assert_eq!(scale["response_count"], 3);
    assert_eq!(scale["average"], 4.0);
    assert_eq!(scale["distribution"]["3"], 1);
    assert_eq!(scale["distribution"]["4"], 1);
    assert_eq!(scale["distribution"]["5"], 1);
    assert_eq!(scale["distribution"]["1"], 0);
    assert_eq!(scale["distribution"]["2"], 0);

    let mc = &questions[1];
    assert_eq!(mc["type"], "multiple_choice");
    assert_eq!(mc["response_count"], 3);
    let counts = mc["option_counts"].as_array().unwrap();
    assert_eq!(counts[0]["text"], "Talks");
    assert_eq!(counts[0]["count"], 3);
    assert_eq!(counts[1]["text"], "Networking");
    assert_eq!(counts[1]["count"], 0);

    let text = &questions[2];
    assert_eq!(text["type"], "text");
    assert_eq!(text["response_count"], 2);
    let samples = text["sample_responses"].as_array().unwrap();
    assert_eq!(samples.len(), 2);
    assert!(samples.contains(&json!("Great talks")));
}

#[tokio::test]
async fn results_are_empty_before_any_completion() {
    let app = TestApp::new().await;
    let setup = setup(&app, 2).await;

    let res = app
        .request("GET", &format!("/api/v1/surveys/{}/results", setup.survey_id), Some(&app.manager_key), None)
        .await;
    let results = parse_body(res).await;

    assert_eq!(results["total_completed"], 0);
    let scale = &results["questions"][0];
    assert_eq!(scale["response_count"], 0);
    assert_eq!(scale["average"], 0.0);
}

#[tokio::test]
async fn results_require_manager_role() {
    let app = TestApp::new().await;
    let setup = setup(&app, 1).await;
    let uri = format!("/api/v1/surveys/{}/results", setup.survey_id);

    let res = app.request("GET", &uri, None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.request("GET", &uri, Some(&app.participant_key), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn export_streams_csv() {
    let app = TestApp::new().await;
    let setup = setup(&app, 2).await;
    submit(&app, &setup, &setup.tokens[0], 5, 1, Some("Loved it")).await;
    submit(&app, &setup, &setup.tokens[1], 4, 1, None).await;

    let res = app
        .request(
            "GET",
            &format!("/api/v1/surveys/{}/export?format=csv", setup.survey_id),
            Some(&app.manager_key),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let csv = body_string(res).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "question,type,responses,detail");
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("How was it?,SCALE,2,"));
    assert!(lines[2].contains("Networking=2"));
    assert!(lines[3].contains("Loved it"));
}

#[tokio::test]
async fn export_rejects_unknown_formats() {
    let app = TestApp::new().await;
    let setup = setup(&app, 1).await;

    let res = app
        .request(
            "GET",
            &format!("/api/v1/surveys/{}/export?format=xlsx", setup.survey_id),
            Some(&app.manager_key),
            None,
        )
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
