use axum::http::StatusCode;
use serde_json::json;

mod common;

async fn app_with_seeds(files: &[(&str, &str)]) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = common::test_config(&dir);

    std::fs::create_dir_all(&config.seeds_dir).expect("create seeds dir");
    for (name, sql) in files {
        std::fs::write(config.seeds_dir.join(name), sql).expect("write seed file");
    }

    let app = tango_backend::create_app(&config)
        .await
        .expect("create test app");
    (app, dir)
}

#[tokio::test]
async fn test_seed_files_replay_in_order() {
    let (app, _dir) = app_with_seeds(&[
        (
            "001_words.sql",
            r#"
            INSERT INTO "words" ("kanji", "romaji", "english", "parts") VALUES
                ('食べる', 'taberu', 'to eat', '{"verb_type":"ru-verb"}'),
                ('飲む', 'nomu', 'to drink', '{"verb_type":"u-verb"}');
            "#,
        ),
        (
            "002_groups.sql",
            r#"
            INSERT INTO "groups" ("name", "words_count") VALUES ('Seeded', 2);
            INSERT INTO "words_groups" ("word_id", "group_id") VALUES (1, 1), (2, 1);
            "#,
        ),
    ])
    .await;

    let (status, body) = common::post(&app, "/api/settings/load_seed_data", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statements_executed"], 3);

    let (_, body) = common::get(&app, "/api/words").await;
    assert_eq!(body["data"]["pagination"]["total_items"], 2);
    let words = body["data"]["words"].as_array().unwrap();
    assert_eq!(words[0]["stats"]["correct_count"], 0);

    let (_, body) = common::get(&app, "/api/groups/1/words").await;
    assert_eq!(body["data"]["pagination"]["total_items"], 2);
}

#[tokio::test]
async fn test_seed_load_is_all_or_nothing() {
    let (app, _dir) = app_with_seeds(&[
        (
            "001_words.sql",
            r#"INSERT INTO "words" ("kanji", "romaji", "english", "parts")
               VALUES ('食べる', 'taberu', 'to eat', '{}');"#,
        ),
        (
            "002_broken.sql",
            r#"INSERT INTO "no_such_table" ("x") VALUES (1);"#,
        ),
    ])
    .await;

    let (status, body) = common::post(&app, "/api/settings/load_seed_data", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_ERROR");

    // The earlier file's rows were rolled back with the failing one.
    let (_, body) = common::get(&app, "/api/words").await;
    assert_eq!(body["data"]["pagination"]["total_items"], 0);
}

#[tokio::test]
async fn test_seed_load_without_directory_fails_cleanly() {
    let (app, _dir) = common::create_test_app().await;

    let (status, body) = common::post(&app, "/api/settings/load_seed_data", json!({})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_ERROR");
}
