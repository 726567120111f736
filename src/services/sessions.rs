use std::path::Path;
use std::sync::Arc;

use crate::error::AppError;
use crate::listing::{PageRequest, Pagination};
use crate::models::{
    QuickStats, SessionWithStats, StudyProgress, StudySession, StudySessionStats, WordReviewItem,
    WordWithStats,
};
use crate::repos::{GroupRepository, StudySessionRepository};

pub const DEFAULT_PROGRESS_DAYS: i64 = 7;
const MAX_PROGRESS_DAYS: i64 = 365;

#[derive(Clone)]
pub struct StudySessionService {
    sessions: Arc<dyn StudySessionRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl StudySessionService {
    pub fn new(
        sessions: Arc<dyn StudySessionRepository>,
        groups: Arc<dyn GroupRepository>,
    ) -> Self {
        Self { sessions, groups }
    }

    pub async fn create_session(
        &self,
        group_id: i64,
        study_activity_id: i64,
    ) -> Result<StudySession, AppError> {
        // The group reference is checked here, before the repository runs
        // any insert.
        if self.groups.get(group_id).await?.is_none() {
            return Err(AppError::not_found("group", group_id));
        }
        self.sessions.create(group_id, study_activity_id).await
    }

    pub async fn get_session(&self, id: i64) -> Result<StudySession, AppError> {
        self.sessions
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("study session", id))
    }

    pub async fn add_review(
        &self,
        session_id: i64,
        word_id: i64,
        correct: bool,
    ) -> Result<WordReviewItem, AppError> {
        self.sessions.add_review(session_id, word_id, correct).await
    }

    pub async fn session_stats(&self, session_id: i64) -> Result<StudySessionStats, AppError> {
        self.get_session(session_id).await?;
        self.sessions.session_stats(session_id).await
    }

    pub async fn list_session_words(
        &self,
        session_id: i64,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<(Vec<WordWithStats>, Pagination), AppError> {
        self.get_session(session_id).await?;

        let request = PageRequest::new(page, page_size);
        let (words, total) = self.sessions.list_session_words(session_id, &request).await?;
        Ok((words, Pagination::new(total, &request)))
    }

    /// The most recent session, or None when nothing has been studied yet.
    pub async fn last_session(&self) -> Result<Option<SessionWithStats>, AppError> {
        self.sessions.last_session().await
    }

    pub async fn quick_stats(&self) -> Result<QuickStats, AppError> {
        self.sessions.quick_stats().await
    }

    /// Aggregates over the trailing day window. The day count defaults to a
    /// week and is clamped to a year.
    pub async fn study_progress(&self, days: Option<i64>) -> Result<StudyProgress, AppError> {
        let days = days
            .unwrap_or(DEFAULT_PROGRESS_DAYS)
            .clamp(1, MAX_PROGRESS_DAYS);
        self.sessions.study_progress(days).await
    }

    pub async fn full_reset(&self) -> Result<(), AppError> {
        self.sessions.full_reset().await
    }

    pub async fn load_seed_data(&self, seeds_dir: &Path) -> Result<u64, AppError> {
        self.sessions.load_seed_data(seeds_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryStore;
    use crate::repos::{StudyActivityRepository, WordRepository};
    use crate::models::WordFields;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: StudySessionService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = StudySessionService::new(store.clone(), store.clone());
        Fixture { store, service }
    }

    fn word_fields() -> WordFields {
        let mut parts = crate::models::Parts::new();
        parts.insert("verb_type".into(), serde_json::json!("ru-verb"));
        WordFields {
            kanji: "食べる".to_string(),
            romaji: "taberu".to_string(),
            english: "to eat".to_string(),
            parts,
        }
    }

    async fn seed_session(fixture: &Fixture) -> (i64, i64) {
        let group = GroupRepository::create(fixture.store.as_ref(), "Basics")
            .await
            .unwrap();
        let activity = StudyActivityRepository::create(
            fixture.store.as_ref(),
            "Flashcards",
            "https://example.com/flashcards",
        )
        .await
        .unwrap();
        let word = WordRepository::create(fixture.store.as_ref(), &word_fields())
            .await
            .unwrap();
        let session = fixture
            .service
            .create_session(group.id, activity.id)
            .await
            .unwrap();
        (session.id, word.id)
    }

    #[tokio::test]
    async fn session_requires_existing_group() {
        let fixture = fixture();
        let err = fixture.service.create_session(42, 1).await.unwrap_err();
        assert!(err.is_not_found());

        let stats = fixture.service.quick_stats().await.unwrap();
        assert_eq!(stats.total_sessions, 0);
    }

    #[tokio::test]
    async fn reviews_drive_session_stats() {
        let fixture = fixture();
        let (session_id, word_id) = seed_session(&fixture).await;

        fixture
            .service
            .add_review(session_id, word_id, true)
            .await
            .unwrap();
        fixture
            .service
            .add_review(session_id, word_id, false)
            .await
            .unwrap();

        let stats = fixture.service.session_stats(session_id).await.unwrap();
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.correct_reviews, 1);
        assert_eq!(stats.accuracy, 50.0);
    }

    #[tokio::test]
    async fn review_against_missing_session_is_not_found() {
        let fixture = fixture();
        let err = fixture.service.add_review(9, 1, true).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn last_session_is_none_when_nothing_studied() {
        let fixture = fixture();
        assert!(fixture.service.last_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_reset_clears_session_data_only() {
        let fixture = fixture();
        let (session_id, word_id) = seed_session(&fixture).await;
        fixture
            .service
            .add_review(session_id, word_id, true)
            .await
            .unwrap();

        fixture.service.full_reset().await.unwrap();

        let stats = fixture.service.quick_stats().await.unwrap();
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.accuracy, 0.0);

        // Words and groups survive the reset.
        assert!(WordRepository::get(fixture.store.as_ref(), word_id)
            .await
            .unwrap()
            .is_some());
        assert!(GroupRepository::get(fixture.store.as_ref(), 1)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn progress_window_is_clamped() {
        let fixture = fixture();
        let (session_id, word_id) = seed_session(&fixture).await;
        fixture
            .service
            .add_review(session_id, word_id, true)
            .await
            .unwrap();

        let progress = fixture.service.study_progress(Some(0)).await.unwrap();
        assert_eq!(progress.total_sessions, 1);
        assert_eq!(progress.total_reviews, 1);
        assert_eq!(progress.daily_stats.len(), 1);
        assert_eq!(progress.daily_stats[0].accuracy, 100.0);

        let wide = fixture.service.study_progress(Some(40_000)).await.unwrap();
        assert_eq!(wide.total_sessions, 1);
    }
}
