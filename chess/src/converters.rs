//! String conversions for squares and pieces.

use cozy_chess::{File, Piece, Rank, Square};

pub fn format_square(sq: Square) -> String {
    format!("{}{}", file_char(sq.file()), rank_char(sq.rank()))
}

/// Parse a coordinate square like `e4`. Returns `None` for anything else.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    square_from_chars(file, rank)
}

pub(crate) fn square_from_chars(file: char, rank: char) -> Option<Square> {
    if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    let file = File::ALL[(file as u8 - b'a') as usize];
    let rank = Rank::ALL[(rank as u8 - b'1') as usize];
    Some(Square::new(file, rank))
}

pub fn file_char(file: File) -> char {
    (b'a' + file as u8) as char
}

pub fn rank_char(rank: Rank) -> char {
    (b'1' + rank as u8) as char
}

pub fn format_piece_upper(piece: Piece) -> char {
    crate::PieceKind::from(piece).to_char_upper()
}
