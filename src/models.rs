use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open-ended word metadata, persisted as a JSON column.
pub type Parts = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Word {
    pub id: i64,
    pub kanji: String,
    pub romaji: String,
    pub english: String,
    pub parts: Parts,
}

/// Payload for word create/update. All fields are required and validated
/// non-empty before any storage call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordFields {
    pub kanji: String,
    pub romaji: String,
    pub english: String,
    pub parts: Parts,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WordStats {
    pub correct_count: i64,
    pub wrong_count: i64,
    pub accuracy: f64,
}

impl WordStats {
    pub fn from_counts(correct_count: i64, wrong_count: i64) -> Self {
        Self {
            correct_count,
            wrong_count,
            accuracy: crate::stats::accuracy(correct_count, wrong_count),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordWithStats {
    #[serde(flatten)]
    pub word: Word,
    pub stats: WordStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub words_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_studied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupStats {
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub accuracy: f64,
}

impl GroupStats {
    pub fn from_counts(total_reviews: i64, correct_reviews: i64) -> Self {
        Self {
            total_reviews,
            correct_reviews,
            accuracy: crate::stats::accuracy(
                correct_reviews,
                total_reviews - correct_reviews,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupWithStats {
    #[serde(flatten)]
    pub group: Group,
    pub stats: GroupStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyActivity {
    pub id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudySession {
    pub id: i64,
    pub group_id: i64,
    pub study_activity_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordReviewItem {
    pub id: i64,
    pub word_id: i64,
    pub study_session_id: i64,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StudySessionStats {
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub accuracy: f64,
    pub duration_minutes: i64,
}

/// A session joined with its owning activity and aggregated review stats,
/// as returned by the group/activity/dashboard session listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWithStats {
    pub id: i64,
    pub group_id: i64,
    pub created_at: DateTime<Utc>,
    pub study_activity: StudyActivity,
    pub stats: StudySessionStats,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct QuickStats {
    pub total_sessions: i64,
    pub total_reviews: i64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStats {
    pub date: String,
    pub total_sessions: i64,
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyProgress {
    pub total_sessions: i64,
    pub total_reviews: i64,
    pub correct_reviews: i64,
    pub time_range: TimeRange,
    pub daily_stats: Vec<DailyStats>,
}
