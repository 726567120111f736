use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Schema files replayed by `run_migrations`, in order.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_init_schema",
    include_str!("../../sql/001_init_schema.sql"),
)];

pub async fn init_pool(config: &Config) -> Result<SqlitePool, InitError> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| InitError::Io(e.to_string()))?;
        }
    }

    let db_url = format!("sqlite:{}?mode=rwc", config.db_path.display());
    let options = SqliteConnectOptions::from_str(&db_url)
        .map_err(|e| InitError::Config(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), InitError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "_migrations" (
            "id" INTEGER PRIMARY KEY AUTOINCREMENT,
            "name" TEXT NOT NULL UNIQUE,
            "applied_at" TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> =
        sqlx::query_scalar(r#"SELECT "name" FROM "_migrations" ORDER BY "id""#)
            .fetch_all(pool)
            .await?;

    for (name, sql) in MIGRATIONS.iter().copied() {
        if applied.iter().any(|a| a == name) {
            continue;
        }

        tracing::info!(migration = name, "applying migration");

        let mut tx = pool.begin().await?;
        for statement in split_sql_statements(sql) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        sqlx::query(r#"INSERT INTO "_migrations" ("name") VALUES ($1)"#)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    Ok(())
}

/// Splits a batch of SQL text on semicolons, skipping delimiters inside
/// string literals and quoted identifiers. Comment-only and empty fragments
/// are dropped.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ';' if !in_single_quote && !in_double_quote => {
                push_statement(&mut statements, &current);
                current.clear();
                continue;
            }
            _ => {}
        }

        current.push(ch);
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let cleaned: String = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = cleaned.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_semicolons() {
        let statements = split_sql_statements("CREATE TABLE a (x);\nINSERT INTO a VALUES (1);");
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (x)", "INSERT INTO a VALUES (1)"]
        );
    }

    #[test]
    fn ignores_semicolons_inside_string_literals() {
        let statements = split_sql_statements("INSERT INTO a VALUES ('x;y');SELECT 1");
        assert_eq!(
            statements,
            vec!["INSERT INTO a VALUES ('x;y')", "SELECT 1"]
        );
    }

    #[test]
    fn ignores_semicolons_inside_quoted_identifiers() {
        let statements = split_sql_statements(r#"SELECT "a;b" FROM t;"#);
        assert_eq!(statements, vec![r#"SELECT "a;b" FROM t"#]);
    }

    #[test]
    fn drops_comment_lines_and_empty_fragments() {
        let statements = split_sql_statements("-- header\nSELECT 1;\n\n;-- tail\n");
        assert_eq!(statements, vec!["SELECT 1"]);
    }
}
