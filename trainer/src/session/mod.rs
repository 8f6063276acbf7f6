pub mod actor;
pub mod commands;
pub mod events;
pub mod handle;
pub mod snapshot;
pub mod state;

use tokio::sync::{broadcast, mpsc, RwLock};

use crate::config::SessionTiming;
use crate::puzzle::Puzzle;
use actor::run_session_actor;
pub use commands::{MoveOutcome, MoveReply, OpponentOutcome, Rejection, SessionError};
pub use events::SessionEvent;
pub use handle::SessionHandle;
pub use snapshot::{CompletionKind, SessionSnapshot, SessionStatus, SolutionView};
pub use state::PuzzleSession;

/// Spawn an actor task owning `state` and return its handle.
pub fn spawn_session(state: PuzzleSession, timing: SessionTiming) -> SessionHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (event_tx, _) = broadcast::channel(100);

    let id = state.session_id().to_string();
    tokio::spawn(async move {
        run_session_actor(state, timing, cmd_rx, event_tx).await;
    });

    SessionHandle::new(id, cmd_tx)
}

/// Owns the single active puzzle session. Starting a new puzzle tears down
/// the previous actor, so its pending scripted reply never fires.
pub struct SessionManager {
    active: RwLock<Option<SessionHandle>>,
    timing: SessionTiming,
}

impl SessionManager {
    pub fn new(timing: SessionTiming) -> Self {
        Self {
            active: RwLock::new(None),
            timing,
        }
    }

    pub async fn start(
        &self,
        puzzle: &Puzzle,
    ) -> Result<(SessionHandle, SessionSnapshot), SessionError> {
        let state = PuzzleSession::start(puzzle)?;
        let snapshot = state.snapshot();
        let handle = spawn_session(state, self.timing);

        let previous = self.active.write().await.replace(handle.clone());
        if let Some(previous) = previous {
            tracing::debug!(session = %previous.id(), "Replacing active session");
            previous.shutdown().await;
        }

        Ok((handle, snapshot))
    }

    pub async fn active(&self) -> Option<SessionHandle> {
        self.active.read().await.clone()
    }

    /// Shut down the active session and return its final snapshot.
    pub async fn close(&self) -> Option<SessionSnapshot> {
        let handle = self.active.write().await.take()?;
        let snapshot = handle.get_snapshot().await.ok();
        handle.shutdown().await;
        snapshot
    }
}
