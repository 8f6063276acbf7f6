//! Statistics over a player's attempt history.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::attempt::StoredAttempt;

/// Aggregate over an attempt history. Field names match the API's
/// `/stats/overview` response, so remote and local figures share one type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    pub total_attempts: usize,
    pub total_solved: usize,
    /// Percentage of solved attempts, 0 to 100.
    pub accuracy: f64,
    pub average_time_seconds: u64,
    /// Consecutive solved attempts, counting back from the most recent.
    pub current_streak: usize,
    pub longest_streak: usize,
    pub solved_today: usize,
    pub solved_this_week: usize,
    /// Solved within the last 30 days (a rolling window, not the calendar month).
    pub solved_this_month: usize,
}

/// Statistics as of now, with day boundaries in the local time zone.
pub fn compute(attempts: &[StoredAttempt]) -> Statistics {
    compute_at(attempts, &Local::now())
}

/// Statistics as of `now`. Day boundaries are midnights in `now`'s time zone.
pub fn compute_at<Tz: TimeZone>(attempts: &[StoredAttempt], now: &DateTime<Tz>) -> Statistics {
    let total_attempts = attempts.len();
    if total_attempts == 0 {
        return Statistics::default();
    }

    let mut chronological: Vec<&StoredAttempt> = attempts.iter().collect();
    chronological.sort_by(|a, b| a.attempted_at.cmp(&b.attempted_at));

    let current_streak = chronological
        .iter()
        .rev()
        .take_while(|a| a.solved)
        .count();

    let mut longest_streak = 0;
    let mut run = 0;
    for attempt in &chronological {
        if attempt.solved {
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    let today = days_before_midnight(now, 0);
    let week_ago = days_before_midnight(now, 7);
    let month_ago = days_before_midnight(now, 30);

    let solved: Vec<&StoredAttempt> = attempts.iter().filter(|a| a.solved).collect();
    let solved_since = |since: DateTime<Utc>| solved.iter().filter(|a| a.attempted_at >= since).count();

    let total_time: u64 = attempts.iter().map(|a| a.time_spent_seconds).sum();

    Statistics {
        total_attempts,
        total_solved: solved.len(),
        accuracy: solved.len() as f64 / total_attempts as f64 * 100.0,
        average_time_seconds: (total_time as f64 / total_attempts as f64).round() as u64,
        current_streak,
        longest_streak,
        solved_today: solved_since(today),
        solved_this_week: solved_since(week_ago),
        solved_this_month: solved_since(month_ago),
    }
}

/// Midnight `days` days before `now`'s date, in `now`'s time zone.
fn days_before_midnight<Tz: TimeZone>(now: &DateTime<Tz>, days: i64) -> DateTime<Utc> {
    let midnight = (now.date_naive() - Duration::days(days)).and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // Midnight skipped by a DST change: fall back to the UTC reading.
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn attempt(id: &str, solved: bool, secs: u64, at: DateTime<Utc>) -> StoredAttempt {
        StoredAttempt {
            id: id.into(),
            puzzle_id: format!("puzzle-{id}"),
            solved,
            time_spent_seconds: secs,
            moves: vec![],
            attempted_at: at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let stats = compute_at(&[], &now());
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.average_time_seconds, 0);
    }

    #[test]
    fn test_streaks() {
        let base = now() - Duration::hours(3);
        let attempts = vec![
            attempt("1", true, 10, base),
            attempt("2", true, 20, base + Duration::minutes(1)),
            attempt("3", false, 30, base + Duration::minutes(2)),
        ];
        let stats = compute_at(&attempts, &now());
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.total_solved, 2);
        assert_eq!(stats.average_time_seconds, 20);
    }

    #[test]
    fn test_streak_ignores_storage_order() {
        let base = now() - Duration::hours(3);
        let attempts = vec![
            attempt("3", true, 1, base + Duration::minutes(2)),
            attempt("1", false, 1, base),
            attempt("2", true, 1, base + Duration::minutes(1)),
        ];
        let stats = compute_at(&attempts, &now());
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn test_accuracy_and_rounding() {
        let at = now() - Duration::hours(1);
        let attempts = vec![
            attempt("1", true, 10, at),
            attempt("2", false, 11, at),
            attempt("3", false, 11, at),
        ];
        let stats = compute_at(&attempts, &now());
        assert!((stats.accuracy - 33.333).abs() < 0.01);
        // 32 / 3 = 10.67
        assert_eq!(stats.average_time_seconds, 11);
    }

    #[test]
    fn test_time_windows() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let attempts = vec![
            attempt("today", true, 1, midnight),
            attempt("yesterday", true, 1, midnight - Duration::seconds(1)),
            attempt("week-edge", true, 1, midnight - Duration::days(7)),
            attempt("week-out", true, 1, midnight - Duration::days(7) - Duration::seconds(1)),
            attempt("month-edge", true, 1, midnight - Duration::days(30)),
            attempt("month-out", true, 1, midnight - Duration::days(31)),
            attempt("unsolved", false, 1, midnight + Duration::hours(1)),
        ];
        let stats = compute_at(&attempts, &now());
        assert_eq!(stats.solved_today, 1);
        assert_eq!(stats.solved_this_week, 3);
        assert_eq!(stats.solved_this_month, 5);
    }

    #[test]
    fn test_day_boundary_follows_time_zone() {
        // 01:00 on the 15th in UTC+2 is 23:00 on the 14th in UTC
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let at = tz
            .with_ymd_and_hms(2024, 3, 15, 1, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let stats = compute_at(&[attempt("1", true, 1, at)], &now);
        assert_eq!(stats.solved_today, 1);
    }

    #[test]
    fn test_remote_overview_shape() {
        let json = r#"{"totalSolved": 3, "totalAttempts": 4, "accuracy": 75, "averageTimeSeconds": 41}"#;
        let stats: Statistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.accuracy, 75.0);
        assert_eq!(stats.longest_streak, 0);
    }
}
