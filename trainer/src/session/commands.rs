use chess::{MoveError, Square};
use tokio::sync::{broadcast, oneshot};

use super::events::SessionEvent;
use super::snapshot::{CompletionKind, SessionSnapshot, SolutionView};
use crate::solution::SolutionError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Solution(#[from] SolutionError),
    #[error("Puzzle {puzzle} is corrupt: {source}")]
    CorruptPuzzle { puzzle: String, source: MoveError },
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a player move was refused without touching the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not a legal move in the current position.
    Illegal,
    /// The scripted reply has not been played yet.
    AwaitingOpponent,
    /// The session is already completed.
    SessionOver,
}

/// Result of a player move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Rejected(Rejection),
    /// Legal, but not the solution move. The mistake flag is now set.
    Wrong,
    /// Solution move played; the scripted reply is pending.
    Correct,
    /// Solution move played and the puzzle is over.
    Completed(CompletionKind),
}

/// Result of playing the scripted opponent reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentOutcome {
    Played { san: String },
    Completed { san: String, kind: CompletionKind },
    /// The solution move could not be played; the session was completed.
    DataDefect(MoveError),
    NotPending,
}

#[derive(Debug, Clone)]
pub struct MoveReply {
    pub outcome: MoveOutcome,
    pub snapshot: SessionSnapshot,
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
/// Scripted opponent replies are scheduled by the actor itself.
pub enum SessionCommand {
    MakeMove {
        from: Square,
        to: Square,
        reply: oneshot::Sender<MoveReply>,
    },
    GiveUp {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    ToggleSolution {
        reply: oneshot::Sender<Result<SolutionView, SessionError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    GetLegalDestinations {
        square: Square,
        reply: oneshot::Sender<Vec<Square>>,
    },
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SessionEvent>)>,
    },
    Shutdown,
}
