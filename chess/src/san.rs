//! Standard Algebraic Notation for moves about to be played.

use cozy_chess::{Board, GameStatus, Move, Piece};

use crate::converters::{file_char, format_piece_upper, format_square, rank_char};
use crate::uci::is_castling;

/// Format `mv` as SAN relative to `board` (the position before the move).
///
/// `mv` must be legal on `board`.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = String::new();

    if is_castling(board, mv) {
        if (mv.to.file() as u8) > (mv.from.file() as u8) {
            san.push_str("O-O");
        } else {
            san.push_str("O-O-O");
        }
    } else {
        let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);

        if piece == Piece::Pawn {
            // diagonal pawn moves are always captures, en passant included
            if mv.from.file() != mv.to.file() {
                san.push(file_char(mv.from.file()));
                san.push('x');
            }
        } else {
            san.push(format_piece_upper(piece));
            san.push_str(&disambiguation(board, mv, piece));
            if board.piece_on(mv.to).is_some() {
                san.push('x');
            }
        }

        san.push_str(&format_square(mv.to));

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(format_piece_upper(promo));
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        if after.status() == GameStatus::Won {
            san.push('#');
        } else {
            san.push('+');
        }
    }

    san
}

/// File, rank or full square of the origin when another piece of the same
/// kind can also reach the destination.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let mut rivals = Vec::new();
    board.generate_moves(|mvs| {
        for other in mvs {
            if other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
            {
                rivals.push(other.from);
            }
        }
        false
    });

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

    if !shares_file {
        file_char(mv.from.file()).to_string()
    } else if !shares_rank {
        rank_char(mv.from.rank()).to_string()
    } else {
        format_square(mv.from)
    }
}
