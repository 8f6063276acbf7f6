use super::snapshot::SessionSnapshot;

/// Events broadcast from the session actor to all subscribers.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum SessionEvent {
    /// Full state snapshot after any mutation.
    StateChanged(SessionSnapshot),
    /// The scripted opponent reply was played (SAN).
    OpponentMoved(String),
    /// Sent once, right after the snapshot that first reports completion.
    Completed(SessionSnapshot),
    /// Error notification.
    Error(String),
}
