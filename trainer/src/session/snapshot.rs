use std::fmt;

use chess::{MoveToken, Side};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// How a completed session is presented to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// No mistakes and the solution was never revealed.
    Perfect,
    /// No mistakes, but the solution was revealed along the way.
    WithHint,
    /// At least one wrong move, or the player gave up.
    WithMistakes,
}

impl fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompletionKind::Perfect => "perfect",
            CompletionKind::WithHint => "with hint",
            CompletionKind::WithMistakes => "with mistakes",
        };
        f.write_str(s)
    }
}

/// Complete, immutable snapshot of session state.
/// Sent to subscribers on every state change and on subscribe.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub puzzle_id: String,
    pub fen: String,
    pub side_to_move: Side,
    /// Side the player solves for; the board is oriented from this side.
    pub player_side: Side,
    pub ply_index: usize,
    pub solution_len: usize,
    /// SAN of the player's own correct moves.
    pub move_history: Vec<String>,
    /// SAN of every ply played so far, scripted replies included.
    pub line: Vec<String>,
    pub last_move: Option<MoveToken>,
    pub mistake: bool,
    pub hint_revealed: bool,
    pub solution_visible: bool,
    pub wrong_move: bool,
    pub awaiting_opponent: bool,
    pub status: SessionStatus,
    pub completion: Option<CompletionKind>,
    pub elapsed_seconds: u64,
    /// Completion time, or the time the snapshot was taken while in progress.
    pub recorded_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Whether the player is expected to move now.
    pub fn accepts_moves(&self) -> bool {
        self.status == SessionStatus::InProgress && !self.awaiting_opponent
    }
}

/// The revealed solution, as returned by a solution toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionView {
    pub visible: bool,
    pub moves: Vec<String>,
}
