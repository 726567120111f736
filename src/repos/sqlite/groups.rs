use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::listing::{GroupSort, PageRequest, SortOrder, WordSort};
use crate::models::{Group, GroupStats, SessionWithStats, WordWithStats};
use crate::repos::{GroupRepository, Listed};

use super::{
    recompute_words_count, session_with_stats_from_row, word_with_stats_from_row,
    SESSION_WITH_STATS_SELECT, WORD_WITH_STATS_COLUMNS,
};

/// Group columns plus the derived last-studied timestamp.
const GROUP_SELECT: &str = r#"
    SELECT
        g."id", g."name", g."words_count",
        (SELECT MAX(s."created_at") FROM "study_sessions" s WHERE s."group_id" = g."id")
            AS "last_studied_at"
    FROM "groups" g
"#;

fn group_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Group, sqlx::Error> {
    Ok(Group {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        words_count: row.try_get("words_count")?,
        last_studied_at: row.try_get("last_studied_at")?,
    })
}

#[derive(Clone)]
pub struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for SqliteGroupRepository {
    async fn create(&self, name: &str) -> Result<Group, AppError> {
        let result = sqlx::query(r#"INSERT INTO "groups" ("name", "words_count") VALUES ($1, 0)"#)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage("create group"))?;

        Ok(Group {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            words_count: 0,
            last_studied_at: None,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Group>, AppError> {
        let sql = format!(r#"{GROUP_SELECT} WHERE g."id" = $1"#);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::storage("get group"))?;

        row.as_ref()
            .map(group_from_row)
            .transpose()
            .map_err(AppError::storage("decode group"))
    }

    async fn list(
        &self,
        page: &PageRequest,
        sort: GroupSort,
        order: SortOrder,
    ) -> Result<Listed<Group>, AppError> {
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "groups""#)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::storage("count groups"))?;

        let sql = format!(
            r#"{GROUP_SELECT} ORDER BY "{column}" {order} LIMIT $1 OFFSET $2"#,
            column = sort.column(),
            order = order.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list groups"))?;

        let groups = rows
            .iter()
            .map(group_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode group"))?;

        Ok((groups, total))
    }

    async fn update(&self, id: i64, name: &str) -> Result<Group, AppError> {
        let result = sqlx::query(r#"UPDATE "groups" SET "name" = $1 WHERE "id" = $2"#)
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage("update group"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("group", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| AppError::not_found("group", id))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(r#"DELETE FROM "groups" WHERE "id" = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::storage("delete group"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("group", id));
        }

        Ok(())
    }

    async fn stats(&self, group_id: i64) -> Result<GroupStats, AppError> {
        let (total_reviews, correct_reviews): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(r."id"),
                COALESCE(SUM(CASE WHEN r."correct" = 1 THEN 1 ELSE 0 END), 0)
            FROM "word_review_items" r
            JOIN "study_sessions" s ON s."id" = r."study_session_id"
            WHERE s."group_id" = $1
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("get group stats"))?;

        Ok(GroupStats::from_counts(total_reviews, correct_reviews))
    }

    async fn add_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(AppError::storage("begin add word to group"))?;

        let group: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "groups" WHERE "id" = $1"#)
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::storage("check group"))?;
        if group.is_none() {
            return Err(AppError::not_found("group", group_id));
        }

        let word: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "words" WHERE "id" = $1"#)
            .bind(word_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::storage("check word"))?;
        if word.is_none() {
            return Err(AppError::not_found("word", word_id));
        }

        sqlx::query(
            r#"INSERT OR IGNORE INTO "words_groups" ("word_id", "group_id") VALUES ($1, $2)"#,
        )
        .bind(word_id)
        .bind(group_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage("add word to group"))?;

        let count = recompute_words_count(&mut tx, group_id).await?;

        tx.commit()
            .await
            .map_err(AppError::storage("commit add word to group"))?;

        Ok(count)
    }

    async fn remove_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(AppError::storage("begin remove word from group"))?;

        let group: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "groups" WHERE "id" = $1"#)
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::storage("check group"))?;
        if group.is_none() {
            return Err(AppError::not_found("group", group_id));
        }

        let result = sqlx::query(
            r#"DELETE FROM "words_groups" WHERE "group_id" = $1 AND "word_id" = $2"#,
        )
        .bind(group_id)
        .bind(word_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::storage("remove word from group"))?;

        // Rolls back on drop, leaving words_count untouched.
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("group word", word_id));
        }

        let count = recompute_words_count(&mut tx, group_id).await?;

        tx.commit()
            .await
            .map_err(AppError::storage("commit remove word from group"))?;

        Ok(count)
    }

    async fn list_words(
        &self,
        group_id: i64,
        page: &PageRequest,
        sort: WordSort,
        order: SortOrder,
    ) -> Result<Listed<WordWithStats>, AppError> {
        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words_groups" WHERE "group_id" = $1"#)
                .bind(group_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::storage("count group words"))?;

        // Same whitelist as the top-level word listing; the member listing
        // gets no special treatment.
        let sql = format!(
            r#"
            SELECT {WORD_WITH_STATS_COLUMNS}
            FROM "words" w
            JOIN "words_groups" wg ON wg."word_id" = w."id" AND wg."group_id" = $1
            LEFT JOIN "word_review_items" r ON r."word_id" = w."id"
            GROUP BY w."id"
            ORDER BY "{column}" {order} LIMIT $2 OFFSET $3
            "#,
            column = sort.column(),
            order = order.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(group_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list group words"))?;

        let words = rows
            .iter()
            .map(word_with_stats_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode word"))?;

        Ok((words, total))
    }

    async fn list_sessions(
        &self,
        group_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<SessionWithStats>, AppError> {
        let total: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM "study_sessions" WHERE "group_id" = $1"#)
                .bind(group_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::storage("count group sessions"))?;

        let sql = format!(
            r#"
            {SESSION_WITH_STATS_SELECT}
            WHERE s."group_id" = $1
            GROUP BY s."id"
            ORDER BY s."created_at" DESC, s."id" DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(group_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list group sessions"))?;

        let sessions = rows
            .iter()
            .map(session_with_stats_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode study session"))?;

        Ok((sessions, total))
    }
}
