use chrono::{DateTime, Utc};

/// Review accuracy as a percentage. Every stats surface (word, group,
/// session, dashboard) goes through this one function so rounding never
/// diverges between them.
pub fn accuracy(correct: i64, wrong: i64) -> f64 {
    let total = correct + wrong;
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Whole minutes between the first and last review of a session. Zero when
/// the session has no reviews.
pub fn duration_minutes(
    first_review: Option<DateTime<Utc>>,
    last_review: Option<DateTime<Utc>>,
) -> i64 {
    match (first_review, last_review) {
        (Some(first), Some(last)) => (last - first).num_minutes().max(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn accuracy_is_zero_without_attempts() {
        assert_eq!(accuracy(0, 0), 0.0);
    }

    #[test]
    fn accuracy_of_even_split_is_fifty() {
        assert_eq!(accuracy(1, 1), 50.0);
    }

    #[test]
    fn accuracy_of_all_correct_is_hundred() {
        assert_eq!(accuracy(7, 0), 100.0);
    }

    #[test]
    fn accuracy_keeps_fractional_precision() {
        let value = accuracy(1, 2);
        assert!((value - 33.333333333333336).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_truncates_to_whole_minutes() {
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2024, 3, 1, 9, 7, 59).unwrap();
        assert_eq!(duration_minutes(Some(first), Some(last)), 7);
    }

    #[test]
    fn duration_is_zero_without_reviews() {
        assert_eq!(duration_minutes(None, None), 0);
    }
}
