pub mod memory;
pub mod sqlite;

use std::path::Path;

use async_trait::async_trait;

use crate::error::AppError;
use crate::listing::{GroupSort, PageRequest, SortOrder, WordSort};
use crate::models::{
    Group, GroupStats, QuickStats, SessionWithStats, StudyActivity, StudyProgress, StudySession,
    StudySessionStats, Word, WordFields, WordReviewItem, WordStats, WordWithStats,
};

/// Listing results carry the rows for the requested page plus the total row
/// count, measured by a separate count query.
pub type Listed<T> = (Vec<T>, i64);

#[async_trait]
pub trait WordRepository: Send + Sync {
    async fn create(&self, fields: &WordFields) -> Result<Word, AppError>;
    async fn get(&self, id: i64) -> Result<Option<WordWithStats>, AppError>;
    async fn list(
        &self,
        page: &PageRequest,
        sort: WordSort,
        order: SortOrder,
    ) -> Result<Listed<WordWithStats>, AppError>;
    async fn update(&self, id: i64, fields: &WordFields) -> Result<Word, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    /// Aggregated review outcomes; zeroed stats when the word has none.
    async fn stats(&self, word_id: i64) -> Result<WordStats, AppError>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, name: &str) -> Result<Group, AppError>;
    async fn get(&self, id: i64) -> Result<Option<Group>, AppError>;
    async fn list(
        &self,
        page: &PageRequest,
        sort: GroupSort,
        order: SortOrder,
    ) -> Result<Listed<Group>, AppError>;
    async fn update(&self, id: i64, name: &str) -> Result<Group, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
    async fn stats(&self, group_id: i64) -> Result<GroupStats, AppError>;

    /// Inserts the membership row and recomputes `words_count` from a fresh
    /// count inside one transaction. Returns the updated count.
    async fn add_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError>;
    /// Mirror of `add_word`; fails with NotFound when the word is not a
    /// member, leaving the count untouched.
    async fn remove_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError>;

    async fn list_words(
        &self,
        group_id: i64,
        page: &PageRequest,
        sort: WordSort,
        order: SortOrder,
    ) -> Result<Listed<WordWithStats>, AppError>;
    /// The group's sessions joined with activity and stats, newest first.
    async fn list_sessions(
        &self,
        group_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<SessionWithStats>, AppError>;
}

#[async_trait]
pub trait StudyActivityRepository: Send + Sync {
    async fn create(&self, name: &str, url: &str) -> Result<StudyActivity, AppError>;
    async fn get(&self, id: i64) -> Result<Option<StudyActivity>, AppError>;
    async fn list(&self) -> Result<Vec<StudyActivity>, AppError>;
    async fn update(&self, id: i64, name: &str, url: &str) -> Result<StudyActivity, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait StudySessionRepository: Send + Sync {
    async fn create(&self, group_id: i64, study_activity_id: i64)
        -> Result<StudySession, AppError>;
    async fn get(&self, id: i64) -> Result<Option<StudySession>, AppError>;
    /// Appends a review row with a server-assigned timestamp. Review rows
    /// are never updated afterwards.
    async fn add_review(
        &self,
        session_id: i64,
        word_id: i64,
        correct: bool,
    ) -> Result<WordReviewItem, AppError>;
    async fn session_stats(&self, session_id: i64) -> Result<StudySessionStats, AppError>;
    /// Words reviewed within the session, with their overall stats.
    async fn list_session_words(
        &self,
        session_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<WordWithStats>, AppError>;
    async fn list_by_activity(
        &self,
        activity_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<SessionWithStats>, AppError>;
    /// The most recent session, or None when nothing has been studied yet.
    async fn last_session(&self) -> Result<Option<SessionWithStats>, AppError>;
    async fn quick_stats(&self) -> Result<QuickStats, AppError>;
    async fn study_progress(&self, days: i64) -> Result<StudyProgress, AppError>;
    /// Deletes reviews, sessions and activities in one all-or-nothing
    /// transaction. Words, groups and memberships stay.
    async fn full_reset(&self) -> Result<(), AppError>;
    async fn load_seed_data(&self, seeds_dir: &Path) -> Result<u64, AppError>;
}
