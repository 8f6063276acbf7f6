//! Immutable position values and pure move application over cozy-chess.

use cozy_chess::{Board, Move, Square};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::san::format_san;
use crate::uci::{convert_uci_castling_to_cozy, to_uci_token, MoveToken};
use crate::{PieceKind, Side};

/// A board position. Cheap to clone, never mutated in place by this crate.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
}

/// Result of playing one move on a position.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    pub position: Position,
    /// SAN of the move, relative to the position it was played from.
    pub san: String,
    /// The move as a standard UCI token (castling as king two-square move).
    pub token: MoveToken,
    /// The side to move in the resulting position has no legal move (mate or stalemate).
    pub is_terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("Illegal move {token} in {fen}")]
    IllegalMove { token: String, fen: String },
}

impl Position {
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self {
            board: parse_fen(fen)?,
        })
    }

    pub fn fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn turn(&self) -> Side {
        self.board.side_to_move().into()
    }

    /// Checkmate or stalemate. Draws by move count or repetition are not
    /// terminal here; puzzle lines never reach them.
    pub fn is_terminal(&self) -> bool {
        let has_move = self.board.generate_moves(|mvs| !mvs.is_empty());
        !has_move
    }

    fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: Board::default(),
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl Eq for Position {}

/// Play `from`-`to` on `position`.
///
/// A requested promotion is ignored when the move is not a promotion, so
/// callers may always pass their preferred promotion piece. A pawn reaching
/// the last rank without a promotion piece is illegal.
pub fn apply_move(
    position: &Position,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
) -> Result<AppliedMove, MoveError> {
    let legal = position.legal_moves();
    let requested = MoveToken {
        from,
        to,
        promotion,
    };

    let candidate = convert_uci_castling_to_cozy(requested.into(), &legal);
    let mv = if legal.contains(&candidate) {
        candidate
    } else {
        let plain = convert_uci_castling_to_cozy(
            Move {
                from,
                to,
                promotion: None,
            },
            &legal,
        );
        if promotion.is_some() && legal.contains(&plain) {
            plain
        } else {
            return Err(MoveError::IllegalMove {
                token: requested.to_string(),
                fen: position.fen(),
            });
        }
    };

    let san = format_san(&position.board, mv);
    let token = to_uci_token(&position.board, mv);
    let mut board = position.board.clone();
    board.play_unchecked(mv);
    let next = Position { board };

    Ok(AppliedMove {
        is_terminal: next.is_terminal(),
        position: next,
        san,
        token,
    })
}

/// Apply a move token as written (promotion taken from the token).
pub fn apply_token(position: &Position, token: &MoveToken) -> Result<AppliedMove, MoveError> {
    apply_move(position, token.from, token.to, token.promotion)
}

/// Destination squares reachable from `square` by the side to move.
///
/// Empty if the square is empty or holds a piece of the side not to move.
/// Each square appears once; castling reports the king's destination.
pub fn legal_destinations(position: &Position, square: Square) -> Vec<Square> {
    let side = position.board.side_to_move();
    if position.board.color_on(square) != Some(side) {
        return Vec::new();
    }

    let mut destinations = Vec::new();
    for mv in position.legal_moves().into_iter().filter(|mv| mv.from == square) {
        let to = to_uci_token(&position.board, mv).to;
        if !destinations.contains(&to) {
            destinations.push(to);
        }
    }
    destinations
}

pub fn turn(position: &Position) -> Side {
    position.turn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::{format_square, parse_square};

    fn sq(name: &str) -> Square {
        parse_square(name).unwrap()
    }

    #[test]
    fn test_apply_move_is_pure() {
        let start = Position::default();
        let applied = apply_move(&start, sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(applied.san, "e4");
        assert_eq!(applied.token.to_string(), "e2e4");
        assert!(!applied.is_terminal);
        assert_eq!(applied.position.turn(), Side::Black);
        assert_eq!(start, Position::default());
    }

    #[test]
    fn test_illegal_move_rejected() {
        let start = Position::default();
        let err = apply_move(&start, sq("e2"), sq("e5"), None).unwrap_err();
        assert!(matches!(err, MoveError::IllegalMove { ref token, .. } if token == "e2e5"));
    }

    #[test]
    fn test_requested_promotion_ignored_for_normal_move() {
        let start = Position::default();
        let applied = apply_move(&start, sq("g1"), sq("f3"), Some(PieceKind::Queen)).unwrap();
        assert_eq!(applied.token.promotion, None);
        assert_eq!(applied.san, "Nf3");
    }

    #[test]
    fn test_promotion_requires_piece() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert!(apply_move(&pos, sq("e7"), sq("e8"), None).is_err());
        let applied = apply_move(&pos, sq("e7"), sq("e8"), Some(PieceKind::Queen)).unwrap();
        assert_eq!(applied.token.to_string(), "e7e8q");
    }

    #[test]
    fn test_checkmate_is_terminal() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let applied = apply_move(&pos, sq("a1"), sq("a8"), None).unwrap();
        assert!(applied.is_terminal);
        assert!(applied.san.ends_with('#'));
    }

    #[test]
    fn test_stalemate_is_terminal() {
        let pos = Position::from_fen("k7/8/1Q6/8/8/8/8/K7 b - - 0 1").unwrap();
        assert!(pos.is_terminal());
    }

    #[test]
    fn test_fifty_move_count_is_not_terminal() {
        let pos = Position::from_fen("8/8/8/8/8/k7/8/K6R w - - 100 80").unwrap();
        assert!(!pos.is_terminal());
        assert!(!Position::default().is_terminal());
    }

    #[test]
    fn test_legal_destinations() {
        let start = Position::default();
        let mut knight: Vec<String> = legal_destinations(&start, sq("g1"))
            .into_iter()
            .map(format_square)
            .collect();
        knight.sort();
        assert_eq!(knight, vec!["f3", "h3"]);

        // wrong side to move, empty square
        assert!(legal_destinations(&start, sq("e7")).is_empty());
        assert!(legal_destinations(&start, sq("e4")).is_empty());
    }

    #[test]
    fn test_castling_destination_reported_as_king_square() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let dests: Vec<String> = legal_destinations(&pos, sq("e1"))
            .into_iter()
            .map(format_square)
            .collect();
        assert!(dests.contains(&"g1".to_string()));
        assert!(dests.contains(&"c1".to_string()));
        assert!(!dests.contains(&"h1".to_string()));
    }
}
