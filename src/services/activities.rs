use std::sync::Arc;

use url::Url;

use crate::error::AppError;
use crate::listing::{PageRequest, Pagination};
use crate::models::{SessionWithStats, StudyActivity};
use crate::repos::{StudyActivityRepository, StudySessionRepository};

#[derive(Clone)]
pub struct StudyActivityService {
    activities: Arc<dyn StudyActivityRepository>,
    sessions: Arc<dyn StudySessionRepository>,
}

impl StudyActivityService {
    pub fn new(
        activities: Arc<dyn StudyActivityRepository>,
        sessions: Arc<dyn StudySessionRepository>,
    ) -> Self {
        Self {
            activities,
            sessions,
        }
    }

    pub async fn list_activities(&self) -> Result<Vec<StudyActivity>, AppError> {
        self.activities.list().await
    }

    pub async fn get_activity(&self, id: i64) -> Result<StudyActivity, AppError> {
        self.activities
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("study activity", id))
    }

    pub async fn create_activity(&self, name: &str, url: &str) -> Result<StudyActivity, AppError> {
        validate_activity(name, url)?;
        self.activities.create(name.trim(), url.trim()).await
    }

    pub async fn update_activity(
        &self,
        id: i64,
        name: &str,
        url: &str,
    ) -> Result<StudyActivity, AppError> {
        validate_activity(name, url)?;
        self.activities.update(id, name.trim(), url.trim()).await
    }

    pub async fn delete_activity(&self, id: i64) -> Result<(), AppError> {
        self.activities.delete(id).await
    }

    pub async fn list_activity_sessions(
        &self,
        activity_id: i64,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<(Vec<SessionWithStats>, Pagination), AppError> {
        self.get_activity(activity_id).await?;

        let request = PageRequest::new(page, page_size);
        let (sessions, total) = self.sessions.list_by_activity(activity_id, &request).await?;
        Ok((sessions, Pagination::new(total, &request)))
    }
}

fn validate_activity(name: &str, url: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("activity name is required"));
    }
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::validation("activity url is required"));
    }
    // Absolute URI with a host; relative paths and bare words are rejected.
    let parsed =
        Url::parse(url).map_err(|_| AppError::validation("activity url is not a valid URL"))?;
    if !parsed.has_host() {
        return Err(AppError::validation("activity url is not a valid URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryStore;

    fn service() -> StudyActivityService {
        let store = Arc::new(MemoryStore::new());
        StudyActivityService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn create_accepts_valid_activity() {
        let activity = service()
            .create_activity("Flashcards", "https://example.com/flashcards")
            .await
            .unwrap();
        assert!(activity.id > 0);
    }

    #[tokio::test]
    async fn create_rejects_missing_fields_and_bad_urls() {
        let service = service();

        for (name, url) in [
            ("", "https://example.com/flashcards"),
            ("Flashcards", ""),
            ("Flashcards", "not-a-url"),
            ("Flashcards", "/relative/path"),
        ] {
            let err = service.create_activity(name, url).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{name:?} {url:?}");
        }

        assert!(service.list_activities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_of_missing_activity_is_not_found() {
        let err = service()
            .list_activity_sessions(7, None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
