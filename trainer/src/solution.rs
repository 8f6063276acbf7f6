//! Parsed solution line of a puzzle.

use std::sync::OnceLock;

use chess::{apply_token, FenError, MoveToken, Position};

use crate::puzzle::Puzzle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolutionError {
    #[error("Malformed solution: {0}")]
    MalformedSolution(String),
    #[error("Invalid starting position: {0}")]
    InvalidPosition(#[from] FenError),
    #[error("Solution move {token} (ply {ply}) cannot be played in {fen}")]
    InvalidSolutionMove {
        ply: usize,
        token: String,
        fen: String,
    },
}

/// The fixed half-move sequence of a puzzle, plus its SAN rendering.
///
/// Tokens are validated syntactically on parse. SAN is produced on first
/// request by replaying the tokens from the start position, and cached.
#[derive(Debug)]
pub struct Solution {
    start: Position,
    tokens: Vec<MoveToken>,
    san: OnceLock<Result<Vec<String>, SolutionError>>,
}

impl Solution {
    pub fn parse(start: Position, raw: &str) -> Result<Self, SolutionError> {
        let tokens = raw
            .split_whitespace()
            .map(|t| {
                t.parse::<MoveToken>()
                    .map_err(|e| SolutionError::MalformedSolution(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if tokens.is_empty() {
            return Err(SolutionError::MalformedSolution(
                "no move tokens".to_string(),
            ));
        }

        Ok(Self {
            start,
            tokens,
            san: OnceLock::new(),
        })
    }

    pub fn from_puzzle(puzzle: &Puzzle) -> Result<Self, SolutionError> {
        let start = Position::from_fen(&puzzle.fen)?;
        Self::parse(start, &puzzle.moves)
    }

    pub fn start(&self) -> &Position {
        &self.start
    }

    pub fn tokens(&self) -> &[MoveToken] {
        &self.tokens
    }

    pub fn token(&self, ply: usize) -> Option<&MoveToken> {
        self.tokens.get(ply)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for a parsed solution; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// SAN of every ply, in order.
    pub fn san_moves(&self) -> Result<&[String], SolutionError> {
        self.san
            .get_or_init(|| self.replay())
            .as_deref()
            .map_err(Clone::clone)
    }

    fn replay(&self) -> Result<Vec<String>, SolutionError> {
        let mut position = self.start.clone();
        let mut san = Vec::with_capacity(self.tokens.len());

        for (ply, token) in self.tokens.iter().enumerate() {
            let applied =
                apply_token(&position, token).map_err(|_| SolutionError::InvalidSolutionMove {
                    ply,
                    token: token.to_string(),
                    fen: position.fen(),
                })?;
            san.push(applied.san);
            position = applied.position;
        }

        Ok(san)
    }
}
