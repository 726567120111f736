use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::listing::PageRequest;
use crate::models::{
    DailyStats, QuickStats, SessionWithStats, StudyProgress, StudySession, StudySessionStats,
    TimeRange, WordReviewItem, WordWithStats,
};
use crate::repos::{Listed, StudySessionRepository};
use crate::stats;

use super::{
    session_with_stats_from_row, word_with_stats_from_row, SESSION_WITH_STATS_SELECT,
    WORD_WITH_STATS_COLUMNS,
};

#[derive(Clone)]
pub struct SqliteStudySessionRepository {
    pool: SqlitePool,
}

impl SqliteStudySessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudySessionRepository for SqliteStudySessionRepository {
    async fn create(
        &self,
        group_id: i64,
        study_activity_id: i64,
    ) -> Result<StudySession, AppError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO "study_sessions" ("group_id", "study_activity_id", "created_at")
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(group_id)
        .bind(study_activity_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::storage("create study session"))?;

        Ok(StudySession {
            id: result.last_insert_rowid(),
            group_id,
            study_activity_id,
            created_at,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<StudySession>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT "id", "group_id", "study_activity_id", "created_at"
            FROM "study_sessions"
            WHERE "id" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::storage("get study session"))?;

        row.map(|row| {
            Ok(StudySession {
                id: row.try_get("id")?,
                group_id: row.try_get("group_id")?,
                study_activity_id: row.try_get("study_activity_id")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
        .map_err(AppError::storage("decode study session"))
    }

    async fn add_review(
        &self,
        session_id: i64,
        word_id: i64,
        correct: bool,
    ) -> Result<WordReviewItem, AppError> {
        let session: Option<i64> =
            sqlx::query_scalar(r#"SELECT "id" FROM "study_sessions" WHERE "id" = $1"#)
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::storage("check study session"))?;
        if session.is_none() {
            return Err(AppError::not_found("study session", session_id));
        }

        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO "word_review_items" ("word_id", "study_session_id", "correct", "created_at")
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(word_id)
        .bind(session_id)
        .bind(correct)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::storage("add review"))?;

        Ok(WordReviewItem {
            id: result.last_insert_rowid(),
            word_id,
            study_session_id: session_id,
            correct,
            created_at,
        })
    }

    async fn session_stats(&self, session_id: i64) -> Result<StudySessionStats, AppError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT("id") AS "total_reviews",
                COALESCE(SUM(CASE WHEN "correct" = 1 THEN 1 ELSE 0 END), 0) AS "correct_reviews",
                MIN("created_at") AS "first_review_at",
                MAX("created_at") AS "last_review_at"
            FROM "word_review_items"
            WHERE "study_session_id" = $1
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("get session stats"))?;

        session_stats_from_row(&row).map_err(AppError::storage("decode session stats"))
    }

    async fn list_session_words(
        &self,
        session_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<WordWithStats>, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(DISTINCT "word_id") FROM "word_review_items" WHERE "study_session_id" = $1"#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("count session words"))?;

        // Stats cover the word's whole review history, not just this session.
        let sql = format!(
            r#"
            SELECT {WORD_WITH_STATS_COLUMNS}
            FROM "words" w
            JOIN (
                SELECT DISTINCT "word_id" FROM "word_review_items" WHERE "study_session_id" = $1
            ) sw ON sw."word_id" = w."id"
            LEFT JOIN "word_review_items" r ON r."word_id" = w."id"
            GROUP BY w."id"
            ORDER BY w."kanji" ASC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(session_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list session words"))?;

        let words = rows
            .iter()
            .map(word_with_stats_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode word"))?;

        Ok((words, total))
    }

    async fn list_by_activity(
        &self,
        activity_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<SessionWithStats>, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM "study_sessions" WHERE "study_activity_id" = $1"#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("count activity sessions"))?;

        let sql = format!(
            r#"
            {SESSION_WITH_STATS_SELECT}
            WHERE s."study_activity_id" = $1
            GROUP BY s."id"
            ORDER BY s."created_at" DESC, s."id" DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(activity_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list activity sessions"))?;

        let sessions = rows
            .iter()
            .map(session_with_stats_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode study session"))?;

        Ok((sessions, total))
    }

    async fn last_session(&self) -> Result<Option<SessionWithStats>, AppError> {
        let sql = format!(
            r#"
            {SESSION_WITH_STATS_SELECT}
            GROUP BY s."id"
            ORDER BY s."created_at" DESC, s."id" DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::storage("get last session"))?;

        row.as_ref()
            .map(session_with_stats_from_row)
            .transpose()
            .map_err(AppError::storage("decode study session"))
    }

    async fn quick_stats(&self) -> Result<QuickStats, AppError> {
        let total_sessions: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "study_sessions""#)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::storage("count sessions"))?;

        let (total_reviews, correct_reviews): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT("id"),
                COALESCE(SUM(CASE WHEN "correct" = 1 THEN 1 ELSE 0 END), 0)
            FROM "word_review_items"
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("count reviews"))?;

        Ok(QuickStats {
            total_sessions,
            total_reviews,
            accuracy: stats::accuracy(correct_reviews, total_reviews - correct_reviews),
        })
    }

    async fn study_progress(&self, days: i64) -> Result<StudyProgress, AppError> {
        let end_date = Utc::now();
        let start_date = end_date - Duration::days(days);

        let (total_sessions, total_reviews, correct_reviews): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(DISTINCT s."id"),
                COUNT(r."id"),
                COALESCE(SUM(CASE WHEN r."correct" = 1 THEN 1 ELSE 0 END), 0)
            FROM "study_sessions" s
            LEFT JOIN "word_review_items" r ON r."study_session_id" = s."id"
            WHERE s."created_at" >= $1
            "#,
        )
        .bind(start_date)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("get study progress"))?;

        // The date is the first ten characters of the stored RFC 3339
        // timestamp, independent of the sub-day format.
        let rows = sqlx::query(
            r#"
            SELECT
                substr(s."created_at", 1, 10) AS "day",
                COUNT(DISTINCT s."id") AS "total_sessions",
                COUNT(r."id") AS "total_reviews",
                COALESCE(SUM(CASE WHEN r."correct" = 1 THEN 1 ELSE 0 END), 0) AS "correct_reviews"
            FROM "study_sessions" s
            LEFT JOIN "word_review_items" r ON r."study_session_id" = s."id"
            WHERE s."created_at" >= $1
            GROUP BY "day"
            ORDER BY "day"
            "#,
        )
        .bind(start_date)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::storage("get daily stats"))?;

        let daily_stats = rows
            .iter()
            .map(|row| {
                let total_reviews: i64 = row.try_get("total_reviews")?;
                let correct_reviews: i64 = row.try_get("correct_reviews")?;
                Ok(DailyStats {
                    date: row.try_get("day")?,
                    total_sessions: row.try_get("total_sessions")?,
                    total_reviews,
                    correct_reviews,
                    accuracy: stats::accuracy(correct_reviews, total_reviews - correct_reviews),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(AppError::storage("decode daily stats"))?;

        Ok(StudyProgress {
            total_sessions,
            total_reviews,
            correct_reviews,
            time_range: TimeRange {
                start_date,
                end_date,
            },
            daily_stats,
        })
    }

    async fn full_reset(&self) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(AppError::storage("begin full reset"))?;

        // Foreign-key-safe order: reviews first, activities last. Words,
        // groups and their memberships are left alone.
        let steps: [(&'static str, &str); 3] = [
            ("reset reviews", r#"DELETE FROM "word_review_items""#),
            ("reset sessions", r#"DELETE FROM "study_sessions""#),
            ("reset activities", r#"DELETE FROM "study_activities""#),
        ];

        for (op, sql) in steps {
            if let Err(err) = sqlx::query(sql).execute(&mut *tx).await {
                let _ = tx.rollback().await;
                return Err(AppError::Storage { op, source: err });
            }
        }

        tx.commit()
            .await
            .map_err(AppError::storage("commit full reset"))?;

        tracing::info!("full reset complete, session data cleared");
        Ok(())
    }

    async fn load_seed_data(&self, seeds_dir: &Path) -> Result<u64, AppError> {
        crate::seed::load_seed_files(&self.pool, seeds_dir).await
    }
}

fn session_stats_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StudySessionStats, sqlx::Error> {
    let total_reviews: i64 = row.try_get("total_reviews")?;
    let correct_reviews: i64 = row.try_get("correct_reviews")?;
    let first_review_at: Option<DateTime<Utc>> = row.try_get("first_review_at")?;
    let last_review_at: Option<DateTime<Utc>> = row.try_get("last_review_at")?;

    Ok(StudySessionStats {
        total_reviews,
        correct_reviews,
        accuracy: stats::accuracy(correct_reviews, total_reviews - correct_reviews),
        duration_minutes: stats::duration_minutes(first_review_at, last_review_at),
    })
}
