//! UCI move tokens (`e2e4`, `e7e8q`) and castling notation conversion.

use std::fmt;
use std::str::FromStr;

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::converters::{format_square, square_from_chars};
use crate::PieceKind;

/// A half-move in compact coordinate form: source, destination, optional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveToken {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token {0:?} must be 4 or 5 characters")]
    Length(String),
    #[error("token {0:?} does not name two board squares")]
    Square(String),
    #[error("token {0:?} has an invalid promotion piece")]
    Promotion(String),
}

impl MoveToken {
    /// Source and destination match, ignoring promotion.
    pub fn same_squares(&self, other: &MoveToken) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl FromStr for MoveToken {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(TokenError::Length(s.to_string()));
        }

        let from = square_from_chars(chars[0], chars[1])
            .ok_or_else(|| TokenError::Square(s.to_string()))?;
        let to = square_from_chars(chars[2], chars[3])
            .ok_or_else(|| TokenError::Square(s.to_string()))?;
        let promotion = match chars.get(4) {
            Some(&c) => Some(
                PieceKind::from_promotion_char(c)
                    .ok_or_else(|| TokenError::Promotion(s.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for MoveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_square(self.from), format_square(self.to))?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char_lower())?;
        }
        Ok(())
    }
}

impl From<MoveToken> for Move {
    fn from(token: MoveToken) -> Self {
        Move {
            from: token.from,
            to: token.to,
            promotion: token.promotion.map(Piece::from),
        }
    }
}

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// The converted move is only returned when it is among `legal_moves`;
/// otherwise the original move comes back untouched.
pub fn convert_uci_castling_to_cozy(mv: Move, legal_moves: &[Move]) -> Move {
    let is_rank_1_or_8 = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    let is_e_file = matches!(mv.from.file(), File::E);
    let is_g_or_c_file = matches!(mv.to.file(), File::G | File::C);

    if is_rank_1_or_8 && is_e_file && is_g_or_c_file && mv.promotion.is_none() {
        let target_square = match (mv.from.rank(), mv.to.file()) {
            (Rank::First, File::G) => Square::new(File::H, Rank::First),
            (Rank::First, File::C) => Square::new(File::A, Rank::First),
            (Rank::Eighth, File::G) => Square::new(File::H, Rank::Eighth),
            (Rank::Eighth, File::C) => Square::new(File::A, Rank::Eighth),
            _ => return mv,
        };

        let converted = Move {
            from: mv.from,
            to: target_square,
            promotion: None,
        };

        if legal_moves.contains(&converted) {
            return converted;
        }
    }

    mv
}

/// Convert a cozy_chess move played on `board` back to a standard UCI token.
///
/// Castling (king captures own rook) becomes the king's two-square move.
pub fn to_uci_token(board: &Board, mv: Move) -> MoveToken {
    let to = if is_castling(board, mv) {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    };

    MoveToken {
        from: mv.from,
        to,
        promotion: mv.promotion.map(PieceKind::from),
    }
}

pub(crate) fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to).is_some()
        && board.color_on(mv.to) == board.color_on(mv.from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parse_and_display() {
        let token: MoveToken = "e7e8n".parse().unwrap();
        assert_eq!(token.promotion, Some(PieceKind::Knight));
        assert_eq!(token.to_string(), "e7e8n");

        let plain: MoveToken = "g1f3".parse().unwrap();
        assert_eq!(plain.promotion, None);
        assert_eq!(plain.to_string(), "g1f3");
    }

    #[test]
    fn test_token_errors() {
        assert!(matches!("e2e".parse::<MoveToken>(), Err(TokenError::Length(_))));
        assert!(matches!("e2e4q1".parse::<MoveToken>(), Err(TokenError::Length(_))));
        assert!(matches!("z2e4".parse::<MoveToken>(), Err(TokenError::Square(_))));
        assert!(matches!("e2e9".parse::<MoveToken>(), Err(TokenError::Square(_))));
        assert!(matches!("e7e8k".parse::<MoveToken>(), Err(TokenError::Promotion(_))));
    }

    #[test]
    fn test_castling_conversion_roundtrip() {
        let board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        let mut legal = Vec::new();
        board.generate_moves(|mvs| {
            legal.extend(mvs);
            false
        });

        let uci: MoveToken = "e1g1".parse().unwrap();
        let cozy = convert_uci_castling_to_cozy(uci.into(), &legal);
        assert_eq!(cozy.to, Square::new(File::H, Rank::First));
        assert_eq!(to_uci_token(&board, cozy).to_string(), "e1g1");

        let long: MoveToken = "e1c1".parse().unwrap();
        let cozy = convert_uci_castling_to_cozy(long.into(), &legal);
        assert_eq!(to_uci_token(&board, cozy).to_string(), "e1c1");
    }
}
