use axum::http::StatusCode;
use axum::Router;
use serde_json::json;

mod common;

struct Fixture {
    group_id: i64,
    activity_id: i64,
    word_id: i64,
}

async fn seed(app: &Router) -> Fixture {
    let (status, body) = common::post(
        app,
        "/api/words",
        json!({
            "kanji": "食べる",
            "romaji": "taberu",
            "english": "to eat",
            "parts": {"verb_type": "ru-verb"},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let word_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = common::post(app, "/api/groups", json!({"name": "Basics"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = common::post(
        app,
        "/api/study_activities",
        json!({"name": "Flashcards", "url": "https://example.com/flashcards"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let activity_id = body["data"]["id"].as_i64().unwrap();

    Fixture {
        group_id,
        activity_id,
        word_id,
    }
}

async fn create_session(app: &Router, fixture: &Fixture) -> i64 {
    let (status, body) = common::post(
        app,
        "/api/study_sessions",
        json!({"group_id": fixture.group_id, "study_activity_id": fixture.activity_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_session_requires_existing_group() {
    let (app, _dir) = common::create_test_app().await;
    let fixture = seed(&app).await;

    let (status, body) = common::post(
        &app,
        "/api/study_sessions",
        json!({"group_id": 999, "study_activity_id": fixture.activity_id}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    // No session row was created.
    let (_, body) = common::get(&app, "/api/dashboard/quick_stats").await;
    assert_eq!(body["data"]["total_sessions"], 0);
}

#[tokio::test]
async fn test_reviews_roll_up_into_stats() {
    let (app, _dir) = common::create_test_app().await;
    let fixture = seed(&app).await;
    let session_id = create_session(&app, &fixture).await;

    for correct in [true, false] {
        let (status, body) = common::post(
            &app,
            &format!("/api/study_sessions/{session_id}/review"),
            json!({"word_id": fixture.word_id, "correct": correct}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["study_session_id"], session_id);
        assert_eq!(body["data"]["correct"], correct);
    }

    let (status, body) = common::get(&app, &format!("/api/study_sessions/{session_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["total_reviews"], 2);
    assert_eq!(body["data"]["stats"]["correct_reviews"], 1);
    assert_eq!(body["data"]["stats"]["accuracy"], 50.0);
    assert_eq!(body["data"]["stats"]["duration_minutes"], 0);

    // The word's own stats agree.
    let (_, body) = common::get(&app, &format!("/api/words/{}", fixture.word_id)).await;
    assert_eq!(body["data"]["stats"]["correct_count"], 1);
    assert_eq!(body["data"]["stats"]["wrong_count"], 1);
    assert_eq!(body["data"]["stats"]["accuracy"], 50.0);

    let (_, body) = common::get(&app, &format!("/api/words/{}/stats", fixture.word_id)).await;
    assert_eq!(body["data"]["correct_count"], 1);
    assert_eq!(body["data"]["wrong_count"], 1);

    // The session words listing carries the reviewed word.
    let (_, body) = common::get(&app, &format!("/api/study_sessions/{session_id}/words")).await;
    let words = body["data"]["words"].as_array().unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0]["kanji"], "食べる");
    assert_eq!(body["data"]["pagination"]["total_items"], 1);
}

#[tokio::test]
async fn test_review_against_missing_session() {
    let (app, _dir) = common::create_test_app().await;
    let fixture = seed(&app).await;

    let (status, _) = common::post(
        &app,
        "/api/study_sessions/99/review",
        json!({"word_id": fixture.word_id, "correct": true}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_endpoints() {
    let (app, _dir) = common::create_test_app().await;

    // Empty store: last session is a null payload, not an error.
    let (status, body) = common::get(&app, "/api/dashboard/last_study_session").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let fixture = seed(&app).await;
    let session_id = create_session(&app, &fixture).await;
    common::post(
        &app,
        &format!("/api/study_sessions/{session_id}/review"),
        json!({"word_id": fixture.word_id, "correct": true}),
    )
    .await;

    let (status, body) = common::get(&app, "/api/dashboard/last_study_session").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], session_id);
    assert_eq!(body["data"]["study_activity"]["name"], "Flashcards");
    assert_eq!(body["data"]["stats"]["total_reviews"], 1);
    assert_eq!(body["data"]["stats"]["accuracy"], 100.0);

    let (status, body) = common::get(&app, "/api/dashboard/quick_stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_sessions"], 1);
    assert_eq!(body["data"]["total_reviews"], 1);
    assert_eq!(body["data"]["accuracy"], 100.0);

    let (status, body) = common::get(&app, "/api/dashboard/study_progress?days=7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_sessions"], 1);
    assert_eq!(body["data"]["total_reviews"], 1);
    assert_eq!(body["data"]["correct_reviews"], 1);
    let daily = body["data"]["daily_stats"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["total_sessions"], 1);
    assert_eq!(daily[0]["accuracy"], 100.0);
}

#[tokio::test]
async fn test_session_listings_by_group_and_activity() {
    let (app, _dir) = common::create_test_app().await;
    let fixture = seed(&app).await;
    let session_id = create_session(&app, &fixture).await;
    common::post(
        &app,
        &format!("/api/study_sessions/{session_id}/review"),
        json!({"word_id": fixture.word_id, "correct": true}),
    )
    .await;

    let (status, body) = common::get(
        &app,
        &format!("/api/groups/{}/study_sessions", fixture.group_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["data"]["study_sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["id"], session_id);
    assert_eq!(sessions[0]["study_activity"]["name"], "Flashcards");
    assert_eq!(sessions[0]["stats"]["total_reviews"], 1);

    // The group now carries a last-studied timestamp and review stats.
    let (_, body) = common::get(&app, &format!("/api/groups/{}", fixture.group_id)).await;
    assert!(body["data"]["last_studied_at"].is_string());
    assert_eq!(body["data"]["stats"]["total_reviews"], 1);
    assert_eq!(body["data"]["stats"]["correct_reviews"], 1);
    assert_eq!(body["data"]["stats"]["accuracy"], 100.0);

    let (status, body) = common::get(
        &app,
        &format!("/api/study_activities/{}/study_sessions", fixture.activity_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["data"]["study_sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);

    let (status, _) = common::get(&app, "/api/study_activities/99/study_sessions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_activity_validation() {
    let (app, _dir) = common::create_test_app().await;

    for body in [
        json!({"name": "", "url": "https://example.com"}),
        json!({"name": "Flashcards", "url": ""}),
        json!({"name": "Flashcards", "url": "not-a-url"}),
    ] {
        let (status, response) = common::post(&app, "/api/study_activities", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_full_reset_preserves_words_and_groups() {
    let (app, _dir) = common::create_test_app().await;
    let fixture = seed(&app).await;
    let session_id = create_session(&app, &fixture).await;
    common::post(
        &app,
        &format!("/api/study_sessions/{session_id}/review"),
        json!({"word_id": fixture.word_id, "correct": true}),
    )
    .await;
    common::post(
        &app,
        &format!("/api/groups/{}/words/{}", fixture.group_id, fixture.word_id),
        json!({}),
    )
    .await;

    let (status, _) = common::post(&app, "/api/settings/full_reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = common::get(&app, "/api/dashboard/quick_stats").await;
    assert_eq!(body["data"]["total_sessions"], 0);
    assert_eq!(body["data"]["total_reviews"], 0);
    assert_eq!(body["data"]["accuracy"], 0.0);

    // Words, groups and memberships are untouched; activities are gone.
    let (status, body) = common::get(&app, &format!("/api/words/{}", fixture.word_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["correct_count"], 0);

    let (status, body) = common::get(&app, &format!("/api/groups/{}", fixture.group_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["words_count"], 1);

    let (status, _) = common::get(
        &app,
        &format!("/api/study_activities/{}", fixture.activity_id),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
