mod activities;
mod groups;
mod sessions;
mod words;

pub use activities::SqliteStudyActivityRepository;
pub use groups::SqliteGroupRepository;
pub use sessions::SqliteStudySessionRepository;
pub use words::SqliteWordRepository;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::models::{
    Parts, SessionWithStats, StudyActivity, StudySessionStats, Word, WordStats, WordWithStats,
};
use crate::stats;

/// Column list shared by every word query that attaches review aggregates in
/// the same round trip. Callers append FROM/WHERE/ORDER BY clauses.
pub(crate) const WORD_WITH_STATS_COLUMNS: &str = r#"
    w."id", w."kanji", w."romaji", w."english", w."parts",
    COALESCE(SUM(CASE WHEN r."correct" = 1 THEN 1 ELSE 0 END), 0) AS "correct_count",
    COALESCE(SUM(CASE WHEN r."correct" = 0 THEN 1 ELSE 0 END), 0) AS "wrong_count"
"#;

pub(crate) fn word_with_stats_from_row(row: &SqliteRow) -> Result<WordWithStats, sqlx::Error> {
    let parts: sqlx::types::Json<Parts> = row.try_get("parts")?;
    let correct_count: i64 = row.try_get("correct_count")?;
    let wrong_count: i64 = row.try_get("wrong_count")?;

    Ok(WordWithStats {
        word: Word {
            id: row.try_get("id")?,
            kanji: row.try_get("kanji")?,
            romaji: row.try_get("romaji")?,
            english: row.try_get("english")?,
            parts: parts.0,
        },
        stats: WordStats::from_counts(correct_count, wrong_count),
    })
}

/// Overwrites the denormalized count from a fresh COUNT of the join rows,
/// inside the caller's transaction. Incremental arithmetic is deliberately
/// avoided.
pub(crate) async fn recompute_words_count(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    group_id: i64,
) -> Result<i64, crate::error::AppError> {
    use crate::error::AppError;

    sqlx::query(
        r#"
        UPDATE "groups"
        SET "words_count" = (SELECT COUNT(*) FROM "words_groups" WHERE "group_id" = $1)
        WHERE "id" = $1
        "#,
    )
    .bind(group_id)
    .execute(&mut **tx)
    .await
    .map_err(AppError::storage("recompute words count"))?;

    sqlx::query_scalar(r#"SELECT "words_count" FROM "groups" WHERE "id" = $1"#)
        .bind(group_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::storage("read words count"))
}

/// Session rows joined with their owning activity and review aggregates.
/// Callers append WHERE/ORDER BY/LIMIT clauses and must keep the GROUP BY.
pub(crate) const SESSION_WITH_STATS_SELECT: &str = r#"
    SELECT
        s."id", s."group_id", s."created_at",
        a."id" AS "activity_id", a."name" AS "activity_name", a."url" AS "activity_url",
        COUNT(r."id") AS "total_reviews",
        COALESCE(SUM(CASE WHEN r."correct" = 1 THEN 1 ELSE 0 END), 0) AS "correct_reviews",
        MIN(r."created_at") AS "first_review_at",
        MAX(r."created_at") AS "last_review_at"
    FROM "study_sessions" s
    JOIN "study_activities" a ON a."id" = s."study_activity_id"
    LEFT JOIN "word_review_items" r ON r."study_session_id" = s."id"
"#;

pub(crate) fn session_with_stats_from_row(row: &SqliteRow) -> Result<SessionWithStats, sqlx::Error> {
    let total_reviews: i64 = row.try_get("total_reviews")?;
    let correct_reviews: i64 = row.try_get("correct_reviews")?;
    let first_review_at: Option<DateTime<Utc>> = row.try_get("first_review_at")?;
    let last_review_at: Option<DateTime<Utc>> = row.try_get("last_review_at")?;

    Ok(SessionWithStats {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        created_at: row.try_get("created_at")?,
        study_activity: StudyActivity {
            id: row.try_get("activity_id")?,
            name: row.try_get("activity_name")?,
            url: row.try_get("activity_url")?,
        },
        stats: StudySessionStats {
            total_reviews,
            correct_reviews,
            accuracy: stats::accuracy(correct_reviews, total_reviews - correct_reviews),
            duration_minutes: stats::duration_minutes(first_review_at, last_review_at),
        },
    })
}
