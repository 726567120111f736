use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::listing::{PageRequest, SortOrder, WordSort};
use crate::models::{Word, WordFields, WordStats, WordWithStats};
use crate::repos::{Listed, WordRepository};

use super::{recompute_words_count, word_with_stats_from_row, WORD_WITH_STATS_COLUMNS};

#[derive(Clone)]
pub struct SqliteWordRepository {
    pool: SqlitePool,
}

impl SqliteWordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WordRepository for SqliteWordRepository {
    async fn create(&self, fields: &WordFields) -> Result<Word, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO "words" ("kanji", "romaji", "english", "parts") VALUES ($1, $2, $3, $4)"#,
        )
        .bind(&fields.kanji)
        .bind(&fields.romaji)
        .bind(&fields.english)
        .bind(sqlx::types::Json(&fields.parts))
        .execute(&self.pool)
        .await
        .map_err(AppError::storage("create word"))?;

        Ok(Word {
            id: result.last_insert_rowid(),
            kanji: fields.kanji.clone(),
            romaji: fields.romaji.clone(),
            english: fields.english.clone(),
            parts: fields.parts.clone(),
        })
    }

    async fn get(&self, id: i64) -> Result<Option<WordWithStats>, AppError> {
        let sql = format!(
            r#"
            SELECT {WORD_WITH_STATS_COLUMNS}
            FROM "words" w
            LEFT JOIN "word_review_items" r ON r."word_id" = w."id"
            WHERE w."id" = $1
            GROUP BY w."id"
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::storage("get word"))?;

        row.as_ref()
            .map(word_with_stats_from_row)
            .transpose()
            .map_err(AppError::storage("decode word"))
    }

    async fn list(
        &self,
        page: &PageRequest,
        sort: WordSort,
        order: SortOrder,
    ) -> Result<Listed<WordWithStats>, AppError> {
        // Total is counted in a separate round trip so the page query can
        // stay a plain aggregate.
        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "words""#)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::storage("count words"))?;

        // Sort column and direction come from the whitelist enums, never
        // from caller input.
        let sql = format!(
            r#"
            SELECT {WORD_WITH_STATS_COLUMNS}
            FROM "words" w
            LEFT JOIN "word_review_items" r ON r."word_id" = w."id"
            GROUP BY w."id"
            ORDER BY "{column}" {order} LIMIT $1 OFFSET $2
            "#,
            column = sort.column(),
            order = order.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::storage("list words"))?;

        let words = rows
            .iter()
            .map(word_with_stats_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::storage("decode word"))?;

        Ok((words, total))
    }

    async fn update(&self, id: i64, fields: &WordFields) -> Result<Word, AppError> {
        let result = sqlx::query(
            r#"UPDATE "words" SET "kanji" = $1, "romaji" = $2, "english" = $3, "parts" = $4 WHERE "id" = $5"#,
        )
        .bind(&fields.kanji)
        .bind(&fields.romaji)
        .bind(&fields.english)
        .bind(sqlx::types::Json(&fields.parts))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::storage("update word"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("word", id));
        }

        Ok(Word {
            id,
            kanji: fields.kanji.clone(),
            romaji: fields.romaji.clone(),
            english: fields.english.clone(),
            parts: fields.parts.clone(),
        })
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(AppError::storage("begin delete word"))?;

        // Deleting the word cascades into the membership rows, so every
        // affected group needs its words_count refreshed in the same
        // transaction.
        let group_ids: Vec<i64> =
            sqlx::query_scalar(r#"SELECT "group_id" FROM "words_groups" WHERE "word_id" = $1"#)
                .bind(id)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::storage("list word memberships"))?;

        let result = sqlx::query(r#"DELETE FROM "words" WHERE "id" = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::storage("delete word"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("word", id));
        }

        for group_id in group_ids {
            recompute_words_count(&mut tx, group_id).await?;
        }

        tx.commit()
            .await
            .map_err(AppError::storage("commit delete word"))?;

        Ok(())
    }

    async fn stats(&self, word_id: i64) -> Result<WordStats, AppError> {
        let (correct_count, wrong_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN "correct" = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN "correct" = 0 THEN 1 ELSE 0 END), 0)
            FROM "word_review_items"
            WHERE "word_id" = $1
            "#,
        )
        .bind(word_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::storage("get word stats"))?;

        Ok(WordStats::from_counts(correct_count, wrong_count))
    }
}
