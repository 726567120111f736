use axum::http::StatusCode;

mod common;

#[tokio::test]
async fn test_health() {
    let (app, _dir) = common::create_test_app().await;

    let (status, body) = common::get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _dir) = common::create_test_app().await;

    let (status, body) = common::get(&app, "/nonexistent/path").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_empty_listings() {
    let (app, _dir) = common::create_test_app().await;

    let (status, body) = common::get(&app, "/api/words").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["words"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["pagination"]["total_items"], 0);
    assert_eq!(body["data"]["pagination"]["total_pages"], 0);
    assert_eq!(body["data"]["pagination"]["current_page"], 1);

    let (status, body) = common::get(&app, "/api/groups").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["groups"].as_array().unwrap().len(), 0);

    let (status, body) = common::get(&app, "/api/study_activities").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
