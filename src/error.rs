/// Error taxonomy shared by repositories and services.
///
/// Lookups signal absence with `Ok(None)`; mutations that require prior
/// existence fail with `NotFound`. Validation runs before any storage call.
/// Storage and I/O failures keep the failing operation name for diagnosis.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn storage(op: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Storage { op, source }
    }

    pub fn io(op: &'static str) -> impl FnOnce(std::io::Error) -> AppError {
        move |source| AppError::Io { op, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}
