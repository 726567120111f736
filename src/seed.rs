use std::path::Path;

use sqlx::SqlitePool;

use crate::db::split_sql_statements;
use crate::error::AppError;

/// Replays every `.sql` file under `dir` (sorted by file name) inside one
/// transaction. Any failing statement rolls back the whole load. Returns the
/// number of statements executed.
pub async fn load_seed_files(pool: &SqlitePool, dir: &Path) -> Result<u64, AppError> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map_err(AppError::io("read seeds directory"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    let mut tx = pool
        .begin()
        .await
        .map_err(AppError::storage("begin seed load"))?;

    let mut executed = 0u64;
    for path in &files {
        let sql = std::fs::read_to_string(path).map_err(AppError::io("read seed file"))?;

        for statement in split_sql_statements(&sql) {
            if let Err(err) = sqlx::query(&statement).execute(&mut *tx).await {
                tracing::warn!(
                    error = %err,
                    file = %path.display(),
                    "seed statement failed, rolling back load"
                );
                let _ = tx.rollback().await;
                return Err(AppError::Storage {
                    op: "execute seed statement",
                    source: err,
                });
            }
            executed += 1;
        }
    }

    tx.commit().await.map_err(AppError::storage("commit seed load"))?;

    tracing::info!(files = files.len(), statements = executed, "seed data loaded");
    Ok(executed)
}
