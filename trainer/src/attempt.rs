//! Turning a finished session into a persisted attempt record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{AttemptSink, PersistenceError};
use crate::session::SessionSnapshot;

/// The outcome of one session, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub puzzle_id: String,
    /// Completed without a single wrong move. Revealing the solution does not
    /// affect this.
    pub solved: bool,
    pub time_spent_seconds: u64,
    /// The player's SAN moves, in order.
    pub moves: Vec<String>,
    pub attempted_at: DateTime<Utc>,
}

/// An attempt as returned by a sink, with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAttempt {
    pub id: String,
    pub puzzle_id: String,
    pub solved: bool,
    pub time_spent_seconds: u64,
    #[serde(default)]
    pub moves: Vec<String>,
    pub attempted_at: DateTime<Utc>,
}

impl StoredAttempt {
    pub fn new(id: String, attempt: &Attempt) -> Self {
        Self {
            id,
            puzzle_id: attempt.puzzle_id.clone(),
            solved: attempt.solved,
            time_spent_seconds: attempt.time_spent_seconds,
            moves: attempt.moves.clone(),
            attempted_at: attempt.attempted_at,
        }
    }
}

pub fn join_moves(moves: &[String]) -> String {
    moves.join(" ")
}

/// Split a space-joined move list, dropping empty tokens.
pub fn split_moves(joined: &str) -> Vec<String> {
    joined.split_whitespace().map(str::to_string).collect()
}

/// Build the attempt for a session snapshot. Same snapshot, same attempt.
pub fn finalize(snapshot: &SessionSnapshot, puzzle_id: &str) -> Attempt {
    Attempt {
        puzzle_id: puzzle_id.to_string(),
        solved: snapshot.is_completed() && !snapshot.mistake,
        time_spent_seconds: snapshot.elapsed_seconds,
        moves: split_moves(&join_moves(&snapshot.move_history)),
        attempted_at: snapshot.recorded_at,
    }
}

/// Finalize `snapshot` and hand it to `sink` exactly once.
///
/// Failures are logged and returned; nothing is retried and no other sink is
/// tried.
pub async fn record_attempt<S: AttemptSink>(
    sink: &S,
    snapshot: &SessionSnapshot,
    puzzle_id: &str,
) -> Result<StoredAttempt, PersistenceError> {
    let attempt = finalize(snapshot, puzzle_id);
    match sink.submit(&attempt).await {
        Ok(stored) => {
            tracing::info!(
                attempt = %stored.id,
                puzzle = %stored.puzzle_id,
                solved = stored.solved,
                "Attempt saved"
            );
            Ok(stored)
        }
        Err(e) => {
            tracing::error!(puzzle = %puzzle_id, "Failed to save attempt: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CompletionKind, SessionStatus};
    use chess::Side;

    fn snapshot(mistake: bool, status: SessionStatus) -> SessionSnapshot {
        SessionSnapshot {
            session_id: "s".into(),
            puzzle_id: "p".into(),
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            side_to_move: Side::White,
            player_side: Side::Black,
            ply_index: 4,
            solution_len: 4,
            move_history: vec!["Nf6".into(), "".into(), "Qxh2#".into()],
            line: vec![],
            last_move: None,
            mistake,
            hint_revealed: false,
            solution_visible: false,
            wrong_move: false,
            awaiting_opponent: false,
            status,
            completion: Some(CompletionKind::Perfect),
            elapsed_seconds: 42,
            recorded_at: "2024-03-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let snap = snapshot(false, SessionStatus::Completed);
        let a = finalize(&snap, "p");
        let b = finalize(&snap, "p");
        assert_eq!(a, b);
        assert!(a.solved);
        assert_eq!(a.time_spent_seconds, 42);
        assert_eq!(a.moves, vec!["Nf6", "Qxh2#"]);
    }

    #[test]
    fn test_mistake_means_unsolved() {
        let attempt = finalize(&snapshot(true, SessionStatus::Completed), "p");
        assert!(!attempt.solved);
    }

    #[test]
    fn test_in_progress_is_unsolved() {
        let attempt = finalize(&snapshot(false, SessionStatus::InProgress), "p");
        assert!(!attempt.solved);
    }

    #[test]
    fn test_split_moves_filters_empty() {
        assert_eq!(split_moves("  e4  e5 "), vec!["e4", "e5"]);
        assert!(split_moves("").is_empty());
    }

    #[test]
    fn test_stored_attempt_wire_shape() {
        let json = r#"{
            "id": "a1",
            "puzzleId": "p",
            "solved": true,
            "timeSpentSeconds": 12,
            "moves": ["e5"],
            "attemptedAt": "2024-03-01T12:00:00.000Z"
        }"#;
        let stored: StoredAttempt = serde_json::from_str(json).unwrap();
        assert_eq!(stored.time_spent_seconds, 12);
        assert_eq!(stored.moves, vec!["e5"]);
    }
}
