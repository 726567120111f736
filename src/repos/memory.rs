//! In-memory implementations of the repository traits, used to exercise the
//! service layer without a live store. Semantics mirror the SQLite
//! implementations, including delete cascades and count recomputation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::listing::{GroupSort, PageRequest, SortOrder, WordSort};
use crate::models::{
    DailyStats, Group, GroupStats, QuickStats, SessionWithStats, StudyActivity, StudyProgress,
    StudySession, StudySessionStats, TimeRange, Word, WordFields, WordReviewItem, WordStats,
    WordWithStats,
};
use crate::repos::{
    GroupRepository, Listed, StudyActivityRepository, StudySessionRepository, WordRepository,
};
use crate::stats;

#[derive(Default)]
struct State {
    words: BTreeMap<i64, Word>,
    group_names: BTreeMap<i64, String>,
    memberships: BTreeSet<(i64, i64)>, // (group_id, word_id)
    activities: BTreeMap<i64, StudyActivity>,
    sessions: BTreeMap<i64, StudySession>,
    reviews: Vec<WordReviewItem>,
    next_word_id: i64,
    next_group_id: i64,
    next_activity_id: i64,
    next_session_id: i64,
    next_review_id: i64,
}

impl State {
    fn word_stats(&self, word_id: i64) -> WordStats {
        let correct = self
            .reviews
            .iter()
            .filter(|r| r.word_id == word_id && r.correct)
            .count() as i64;
        let wrong = self
            .reviews
            .iter()
            .filter(|r| r.word_id == word_id && !r.correct)
            .count() as i64;
        WordStats::from_counts(correct, wrong)
    }

    fn word_with_stats(&self, word: &Word) -> WordWithStats {
        WordWithStats {
            word: word.clone(),
            stats: self.word_stats(word.id),
        }
    }

    fn group(&self, id: i64) -> Option<Group> {
        let name = self.group_names.get(&id)?;
        let words_count = self.memberships.iter().filter(|(g, _)| *g == id).count() as i64;
        let last_studied_at = self
            .sessions
            .values()
            .filter(|s| s.group_id == id)
            .map(|s| s.created_at)
            .max();
        Some(Group {
            id,
            name: name.clone(),
            words_count,
            last_studied_at,
        })
    }

    fn session_stats(&self, session_id: i64) -> StudySessionStats {
        let reviews: Vec<_> = self
            .reviews
            .iter()
            .filter(|r| r.study_session_id == session_id)
            .collect();
        let total = reviews.len() as i64;
        let correct = reviews.iter().filter(|r| r.correct).count() as i64;
        let first = reviews.iter().map(|r| r.created_at).min();
        let last = reviews.iter().map(|r| r.created_at).max();
        StudySessionStats {
            total_reviews: total,
            correct_reviews: correct,
            accuracy: stats::accuracy(correct, total - correct),
            duration_minutes: stats::duration_minutes(first, last),
        }
    }

    fn session_with_stats(&self, session: &StudySession) -> Option<SessionWithStats> {
        let activity = self.activities.get(&session.study_activity_id)?;
        Some(SessionWithStats {
            id: session.id,
            group_id: session.group_id,
            created_at: session.created_at,
            study_activity: activity.clone(),
            stats: self.session_stats(session.id),
        })
    }

    fn sessions_newest_first(&self) -> Vec<&StudySession> {
        let mut sessions: Vec<_> = self.sessions.values().collect();
        sessions.sort_by_key(|s| (std::cmp::Reverse(s.created_at), std::cmp::Reverse(s.id)));
        sessions
    }
}

fn sort_words(words: &mut [WordWithStats], sort: WordSort, order: SortOrder) {
    words.sort_by(|a, b| {
        let ordering = match sort {
            WordSort::Kanji => a.word.kanji.cmp(&b.word.kanji),
            WordSort::Romaji => a.word.romaji.cmp(&b.word.romaji),
            WordSort::English => a.word.english.cmp(&b.word.english),
            WordSort::CorrectCount => a.stats.correct_count.cmp(&b.stats.correct_count),
            WordSort::WrongCount => a.stats.wrong_count.cmp(&b.stats.wrong_count),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn page_slice<T>(items: Vec<T>, page: &PageRequest) -> Listed<T> {
    let total = items.len() as i64;
    let rows = items
        .into_iter()
        .skip(page.offset().max(0) as usize)
        .take(page.limit() as usize)
        .collect();
    (rows, total)
}

/// One shared store implementing all four repository traits, the way the
/// SQLite repositories share one database.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WordRepository for MemoryStore {
    async fn create(&self, fields: &WordFields) -> Result<Word, AppError> {
        let mut state = self.state();
        state.next_word_id += 1;
        let word = Word {
            id: state.next_word_id,
            kanji: fields.kanji.clone(),
            romaji: fields.romaji.clone(),
            english: fields.english.clone(),
            parts: fields.parts.clone(),
        };
        state.words.insert(word.id, word.clone());
        Ok(word)
    }

    async fn get(&self, id: i64) -> Result<Option<WordWithStats>, AppError> {
        let state = self.state();
        Ok(state.words.get(&id).map(|word| state.word_with_stats(word)))
    }

    async fn list(
        &self,
        page: &PageRequest,
        sort: WordSort,
        order: SortOrder,
    ) -> Result<Listed<WordWithStats>, AppError> {
        let state = self.state();
        let mut words: Vec<_> = state
            .words
            .values()
            .map(|word| state.word_with_stats(word))
            .collect();
        sort_words(&mut words, sort, order);
        Ok(page_slice(words, page))
    }

    async fn update(&self, id: i64, fields: &WordFields) -> Result<Word, AppError> {
        let mut state = self.state();
        if !state.words.contains_key(&id) {
            return Err(AppError::not_found("word", id));
        }
        let word = Word {
            id,
            kanji: fields.kanji.clone(),
            romaji: fields.romaji.clone(),
            english: fields.english.clone(),
            parts: fields.parts.clone(),
        };
        state.words.insert(id, word.clone());
        Ok(word)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state();
        if state.words.remove(&id).is_none() {
            return Err(AppError::not_found("word", id));
        }
        state.memberships.retain(|(_, word_id)| *word_id != id);
        state.reviews.retain(|r| r.word_id != id);
        Ok(())
    }

    async fn stats(&self, word_id: i64) -> Result<WordStats, AppError> {
        Ok(self.state().word_stats(word_id))
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, name: &str) -> Result<Group, AppError> {
        let mut state = self.state();
        state.next_group_id += 1;
        let id = state.next_group_id;
        state.group_names.insert(id, name.to_string());
        Ok(Group {
            id,
            name: name.to_string(),
            words_count: 0,
            last_studied_at: None,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Group>, AppError> {
        Ok(self.state().group(id))
    }

    async fn list(
        &self,
        page: &PageRequest,
        sort: GroupSort,
        order: SortOrder,
    ) -> Result<Listed<Group>, AppError> {
        let state = self.state();
        let mut groups: Vec<_> = state
            .group_names
            .keys()
            .filter_map(|id| state.group(*id))
            .collect();
        groups.sort_by(|a, b| {
            let ordering = match sort {
                GroupSort::Name => a.name.cmp(&b.name),
                GroupSort::WordsCount => a.words_count.cmp(&b.words_count),
            };
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(page_slice(groups, page))
    }

    async fn update(&self, id: i64, name: &str) -> Result<Group, AppError> {
        let mut state = self.state();
        if !state.group_names.contains_key(&id) {
            return Err(AppError::not_found("group", id));
        }
        state.group_names.insert(id, name.to_string());
        state
            .group(id)
            .ok_or_else(|| AppError::not_found("group", id))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state();
        if state.group_names.remove(&id).is_none() {
            return Err(AppError::not_found("group", id));
        }
        state.memberships.retain(|(group_id, _)| *group_id != id);
        let removed_sessions: Vec<i64> = state
            .sessions
            .values()
            .filter(|s| s.group_id == id)
            .map(|s| s.id)
            .collect();
        state.sessions.retain(|_, s| s.group_id != id);
        state
            .reviews
            .retain(|r| !removed_sessions.contains(&r.study_session_id));
        Ok(())
    }

    async fn stats(&self, group_id: i64) -> Result<GroupStats, AppError> {
        let state = self.state();
        let session_ids: BTreeSet<i64> = state
            .sessions
            .values()
            .filter(|s| s.group_id == group_id)
            .map(|s| s.id)
            .collect();
        let reviews: Vec<_> = state
            .reviews
            .iter()
            .filter(|r| session_ids.contains(&r.study_session_id))
            .collect();
        let total = reviews.len() as i64;
        let correct = reviews.iter().filter(|r| r.correct).count() as i64;
        Ok(GroupStats::from_counts(total, correct))
    }

    async fn add_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError> {
        let mut state = self.state();
        if !state.group_names.contains_key(&group_id) {
            return Err(AppError::not_found("group", group_id));
        }
        if !state.words.contains_key(&word_id) {
            return Err(AppError::not_found("word", word_id));
        }
        state.memberships.insert((group_id, word_id));
        Ok(state.memberships.iter().filter(|(g, _)| *g == group_id).count() as i64)
    }

    async fn remove_word(&self, group_id: i64, word_id: i64) -> Result<i64, AppError> {
        let mut state = self.state();
        if !state.group_names.contains_key(&group_id) {
            return Err(AppError::not_found("group", group_id));
        }
        if !state.memberships.remove(&(group_id, word_id)) {
            return Err(AppError::not_found("group word", word_id));
        }
        Ok(state.memberships.iter().filter(|(g, _)| *g == group_id).count() as i64)
    }

    async fn list_words(
        &self,
        group_id: i64,
        page: &PageRequest,
        sort: WordSort,
        order: SortOrder,
    ) -> Result<Listed<WordWithStats>, AppError> {
        let state = self.state();
        let mut words: Vec<_> = state
            .memberships
            .iter()
            .filter(|(g, _)| *g == group_id)
            .filter_map(|(_, word_id)| state.words.get(word_id))
            .map(|word| state.word_with_stats(word))
            .collect();
        sort_words(&mut words, sort, order);
        Ok(page_slice(words, page))
    }

    async fn list_sessions(
        &self,
        group_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<SessionWithStats>, AppError> {
        let state = self.state();
        let sessions: Vec<_> = state
            .sessions_newest_first()
            .into_iter()
            .filter(|s| s.group_id == group_id)
            .filter_map(|s| state.session_with_stats(s))
            .collect();
        Ok(page_slice(sessions, page))
    }
}

#[async_trait]
impl StudyActivityRepository for MemoryStore {
    async fn create(&self, name: &str, url: &str) -> Result<StudyActivity, AppError> {
        let mut state = self.state();
        state.next_activity_id += 1;
        let activity = StudyActivity {
            id: state.next_activity_id,
            name: name.to_string(),
            url: url.to_string(),
        };
        state.activities.insert(activity.id, activity.clone());
        Ok(activity)
    }

    async fn get(&self, id: i64) -> Result<Option<StudyActivity>, AppError> {
        Ok(self.state().activities.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<StudyActivity>, AppError> {
        Ok(self.state().activities.values().cloned().collect())
    }

    async fn update(&self, id: i64, name: &str, url: &str) -> Result<StudyActivity, AppError> {
        let mut state = self.state();
        if !state.activities.contains_key(&id) {
            return Err(AppError::not_found("study activity", id));
        }
        let activity = StudyActivity {
            id,
            name: name.to_string(),
            url: url.to_string(),
        };
        state.activities.insert(id, activity.clone());
        Ok(activity)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut state = self.state();
        if state.activities.remove(&id).is_none() {
            return Err(AppError::not_found("study activity", id));
        }
        let removed_sessions: Vec<i64> = state
            .sessions
            .values()
            .filter(|s| s.study_activity_id == id)
            .map(|s| s.id)
            .collect();
        state.sessions.retain(|_, s| s.study_activity_id != id);
        state
            .reviews
            .retain(|r| !removed_sessions.contains(&r.study_session_id));
        Ok(())
    }
}

#[async_trait]
impl StudySessionRepository for MemoryStore {
    async fn create(
        &self,
        group_id: i64,
        study_activity_id: i64,
    ) -> Result<StudySession, AppError> {
        let mut state = self.state();
        state.next_session_id += 1;
        let session = StudySession {
            id: state.next_session_id,
            group_id,
            study_activity_id,
            created_at: Utc::now(),
        };
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get(&self, id: i64) -> Result<Option<StudySession>, AppError> {
        Ok(self.state().sessions.get(&id).cloned())
    }

    async fn add_review(
        &self,
        session_id: i64,
        word_id: i64,
        correct: bool,
    ) -> Result<WordReviewItem, AppError> {
        let mut state = self.state();
        if !state.sessions.contains_key(&session_id) {
            return Err(AppError::not_found("study session", session_id));
        }
        state.next_review_id += 1;
        let review = WordReviewItem {
            id: state.next_review_id,
            word_id,
            study_session_id: session_id,
            correct,
            created_at: Utc::now(),
        };
        state.reviews.push(review.clone());
        Ok(review)
    }

    async fn session_stats(&self, session_id: i64) -> Result<StudySessionStats, AppError> {
        Ok(self.state().session_stats(session_id))
    }

    async fn list_session_words(
        &self,
        session_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<WordWithStats>, AppError> {
        let state = self.state();
        let word_ids: BTreeSet<i64> = state
            .reviews
            .iter()
            .filter(|r| r.study_session_id == session_id)
            .map(|r| r.word_id)
            .collect();
        let mut words: Vec<_> = word_ids
            .iter()
            .filter_map(|id| state.words.get(id))
            .map(|word| state.word_with_stats(word))
            .collect();
        sort_words(&mut words, WordSort::Kanji, SortOrder::Asc);
        Ok(page_slice(words, page))
    }

    async fn list_by_activity(
        &self,
        activity_id: i64,
        page: &PageRequest,
    ) -> Result<Listed<SessionWithStats>, AppError> {
        let state = self.state();
        let sessions: Vec<_> = state
            .sessions_newest_first()
            .into_iter()
            .filter(|s| s.study_activity_id == activity_id)
            .filter_map(|s| state.session_with_stats(s))
            .collect();
        Ok(page_slice(sessions, page))
    }

    async fn last_session(&self) -> Result<Option<SessionWithStats>, AppError> {
        let state = self.state();
        Ok(state
            .sessions_newest_first()
            .first()
            .and_then(|s| state.session_with_stats(s)))
    }

    async fn quick_stats(&self) -> Result<QuickStats, AppError> {
        let state = self.state();
        let total_sessions = state.sessions.len() as i64;
        let total_reviews = state.reviews.len() as i64;
        let correct = state.reviews.iter().filter(|r| r.correct).count() as i64;
        Ok(QuickStats {
            total_sessions,
            total_reviews,
            accuracy: stats::accuracy(correct, total_reviews - correct),
        })
    }

    async fn study_progress(&self, days: i64) -> Result<StudyProgress, AppError> {
        let state = self.state();
        let end_date = Utc::now();
        let start_date = end_date - Duration::days(days);

        #[derive(Default)]
        struct Bucket {
            sessions: i64,
            reviews: i64,
            correct: i64,
        }
        let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

        let mut total_sessions = 0i64;
        let mut total_reviews = 0i64;
        let mut correct_reviews = 0i64;

        for session in state.sessions.values() {
            if session.created_at < start_date {
                continue;
            }
            total_sessions += 1;
            let day = session.created_at.format("%Y-%m-%d").to_string();
            let bucket = buckets.entry(day.clone()).or_default();
            bucket.sessions += 1;

            for review in state
                .reviews
                .iter()
                .filter(|r| r.study_session_id == session.id)
            {
                total_reviews += 1;
                let bucket = buckets.entry(day.clone()).or_default();
                bucket.reviews += 1;
                if review.correct {
                    correct_reviews += 1;
                    bucket.correct += 1;
                }
            }
        }

        let daily_stats = buckets
            .into_iter()
            .map(|(date, bucket)| DailyStats {
                date,
                total_sessions: bucket.sessions,
                total_reviews: bucket.reviews,
                correct_reviews: bucket.correct,
                accuracy: stats::accuracy(bucket.correct, bucket.reviews - bucket.correct),
            })
            .collect();

        Ok(StudyProgress {
            total_sessions,
            total_reviews,
            correct_reviews,
            time_range: TimeRange {
                start_date,
                end_date,
            },
            daily_stats,
        })
    }

    async fn full_reset(&self) -> Result<(), AppError> {
        let mut state = self.state();
        state.reviews.clear();
        state.sessions.clear();
        state.activities.clear();
        Ok(())
    }

    async fn load_seed_data(&self, _seeds_dir: &Path) -> Result<u64, AppError> {
        // Statement replay only makes sense against the SQL-backed store.
        Ok(0)
    }
}
