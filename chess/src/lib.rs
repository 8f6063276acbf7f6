//! Board state adapter for the puzzle trainer.
//!
//! Wraps cozy-chess behind pure functions over immutable [`Position`] values:
//! move application with SAN and UCI token output, legal destinations for a
//! square, and the side to move.

pub mod board;
pub mod converters;
pub mod fen;
pub mod san;
pub mod types;
pub mod uci;

pub use board::{apply_move, apply_token, legal_destinations, turn, AppliedMove, MoveError, Position};
pub use converters::*;
pub use fen::FenError;
pub use types::{PieceKind, Side};
pub use uci::{MoveToken, TokenError};

pub use cozy_chess::Square;
