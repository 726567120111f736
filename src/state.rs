use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::repos::sqlite::{
    SqliteGroupRepository, SqliteStudyActivityRepository, SqliteStudySessionRepository,
    SqliteWordRepository,
};
use crate::services::{GroupService, StudyActivityService, StudySessionService, WordService};

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
    words: WordService,
    groups: GroupService,
    activities: StudyActivityService,
    sessions: StudySessionService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let word_repo = Arc::new(SqliteWordRepository::new(pool.clone()));
        let group_repo = Arc::new(SqliteGroupRepository::new(pool.clone()));
        let activity_repo = Arc::new(SqliteStudyActivityRepository::new(pool.clone()));
        let session_repo = Arc::new(SqliteStudySessionRepository::new(pool.clone()));

        Self {
            config: Arc::new(config),
            pool,
            words: WordService::new(word_repo),
            groups: GroupService::new(group_repo.clone()),
            activities: StudyActivityService::new(activity_repo, session_repo.clone()),
            sessions: StudySessionService::new(session_repo, group_repo),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn words(&self) -> &WordService {
        &self.words
    }

    pub fn groups(&self) -> &GroupService {
        &self.groups
    }

    pub fn activities(&self) -> &StudyActivityService {
        &self.activities
    }

    pub fn sessions(&self) -> &StudySessionService {
        &self.sessions
    }
}
