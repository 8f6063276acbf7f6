use cozy_chess::Board;

/// Shorthand accepted in place of the standard starting FEN.
pub const START_ALIAS: &str = "start";

/// Parse a FEN string into a Board.
///
/// The literal `"start"` stands for the standard starting position.
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    let fen = fen.trim();
    if fen.is_empty() {
        return Err(FenError::InvalidFormat(fen.to_string()));
    }
    if fen.eq_ignore_ascii_case(START_ALIAS) {
        return Ok(Board::default());
    }

    fen.parse()
        .map_err(|_| FenError::InvalidFormat(fen.to_string()))
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    board.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN: {0:?}")]
    InvalidFormat(String),
}
