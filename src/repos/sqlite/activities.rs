use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::models::StudyActivity;
use crate::repos::StudyActivityRepository;

fn activity_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StudyActivity, sqlx::Error> {
    Ok(StudyActivity {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
    })
}

#[derive(Clone)]
pub struct SqliteStudyActivityRepository {
    pool: SqlitePool,
}

impl SqliteStudyActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudyActivityRepository for SqliteStudyActivityRepository {
    async fn create(&self, name: &str, url: &str) -> Result<StudyActivity, AppError> {
        let result =
            sqlx::query(r#"INSERT INTO "study_activities" ("name", "url") VALUES ($1, $2)"#)
                .bind(name)
                .bind(url)
                .execute(&self.pool)
                .await
                .map_err(AppError::storage("create study activity"))?;

        Ok(StudyActivity {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    async fn get(&self, id: i64) -> Result<Option<StudyActivity>, AppError> {
        let row = sqlx::query(
            r#"SELECT "id", "name", "url" FROM "study_activities" WHERE "id" = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::storage("get study activity"))?;

        row.as_ref()
            .map(activity_from_row)
            .transpose()
            .map_err(AppError::storage("decode study activity"))
    }

    async fn list(&self) -> Result<Vec<StudyActivity>, AppError> {
        let rows = sqlx::query(r#"SELECT "id", "name", "url" FROM "study_activities" ORDER BY "id""#)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list study activities"))?;

        rows.iter()
            .map(activity_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode study activity"))
    }

    async fn update(&self, id: i64, name: &str, url: &str) -> Result<StudyActivity, AppError> {
        let result = sqlx::query(
            r#"UPDATE "study_activities" SET "name" = $1, "url" = $2 WHERE "id" = $3"#,
        )
        .bind(name)
        .bind(url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::storage("update study activity"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("study activity", id));
        }

        Ok(StudyActivity {
            id,
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(r#"DELETE FROM "study_activities" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage("delete study activity"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("study activity", id));
        }

        Ok(())
    }
}
