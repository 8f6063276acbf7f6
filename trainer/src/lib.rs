//! Interactive chess puzzle solving.
//!
//! A [`session::PuzzleSession`] replays a puzzle's setup move, checks player
//! moves against the stored solution and plays the scripted replies. Finished
//! sessions become [`attempt::Attempt`]s, which go either to the remote API
//! or to a per-device store, depending on who is playing.

pub mod api;
pub mod attempt;
pub mod config;
pub mod identity;
pub mod persistence;
pub mod puzzle;
pub mod session;
pub mod solution;
pub mod stats;

pub use attempt::{finalize, record_attempt, Attempt, StoredAttempt};
pub use config::{ConfigError, SessionTiming, TrainerConfig};
pub use identity::{GuestIdentityStore, Identity, Provenance};
pub use persistence::{AttemptRouter, AttemptSink, LocalAttemptStore, PersistenceError};
pub use puzzle::Puzzle;
pub use session::{SessionError, SessionHandle, SessionManager, SessionSnapshot};
pub use solution::{Solution, SolutionError};
pub use stats::Statistics;
