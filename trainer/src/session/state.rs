use std::time::{Duration, Instant};

use chess::{apply_move, apply_token, legal_destinations, MoveToken, PieceKind, Position, Side, Square};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::commands::{MoveOutcome, OpponentOutcome, Rejection, SessionError};
use super::snapshot::{CompletionKind, SessionSnapshot, SessionStatus, SolutionView};
use crate::puzzle::Puzzle;
use crate::solution::Solution;

/// Promotion piece used for every player move.
const PLAYER_PROMOTION: PieceKind = PieceKind::Queen;

/// State of one puzzle attempt. Owned by a single session actor, no locks.
///
/// The scripted side's moves are driven by [`PuzzleSession::play_opponent_reply`];
/// scheduling that call is left to the owner.
#[derive(Debug)]
pub struct PuzzleSession {
    session_id: String,
    puzzle_id: String,
    label: String,
    solution: Solution,
    position: Position,
    ply_index: usize,
    move_history: Vec<String>,
    line: Vec<String>,
    last_move: Option<MoveToken>,
    player_side: Side,
    mistake: bool,
    hint_revealed: bool,
    solution_visible: bool,
    wrong_move: bool,
    awaiting_opponent: bool,
    status: SessionStatus,
    started_at: Instant,
    elapsed: Option<Duration>,
    completed_at: Option<DateTime<Utc>>,
}

impl PuzzleSession {
    /// Parse the puzzle and play its setup move (ply 0).
    ///
    /// The rest of the solution is not replayed here; a later scripted move
    /// that cannot be played is handled when it comes up.
    pub fn start(puzzle: &Puzzle) -> Result<Self, SessionError> {
        let solution = Solution::from_puzzle(puzzle)?;
        let setup = solution
            .token(0)
            .copied()
            .ok_or_else(|| SessionError::Internal("solution has no setup move".into()))?;

        let applied = apply_token(solution.start(), &setup).map_err(|source| {
            SessionError::CorruptPuzzle {
                puzzle: puzzle.label().to_string(),
                source,
            }
        })?;

        let mut session = Self {
            session_id: Uuid::new_v4().to_string(),
            puzzle_id: puzzle.id.clone(),
            label: puzzle.label().to_string(),
            player_side: applied.position.turn(),
            position: applied.position,
            ply_index: 1,
            move_history: Vec::new(),
            line: vec![applied.san],
            last_move: Some(applied.token),
            mistake: false,
            hint_revealed: false,
            solution_visible: false,
            wrong_move: false,
            awaiting_opponent: false,
            status: SessionStatus::InProgress,
            started_at: Instant::now(),
            elapsed: None,
            completed_at: None,
            solution,
        };

        tracing::info!(
            puzzle = %session.label,
            player = %session.player_side,
            plies = session.solution.len(),
            "Puzzle session started"
        );

        if session.ply_index == session.solution.len() || applied.is_terminal {
            session.complete();
        }

        Ok(session)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn puzzle_id(&self) -> &str {
        &self.puzzle_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn ply_index(&self) -> usize {
        self.ply_index
    }

    pub fn move_history(&self) -> &[String] {
        &self.move_history
    }

    pub fn player_side(&self) -> Side {
        self.player_side
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn mistake(&self) -> bool {
        self.mistake
    }

    pub fn hint_revealed(&self) -> bool {
        self.hint_revealed
    }

    pub fn wrong_move(&self) -> bool {
        self.wrong_move
    }

    pub fn is_awaiting_opponent(&self) -> bool {
        self.awaiting_opponent
    }

    fn accepts_moves(&self) -> bool {
        self.status == SessionStatus::InProgress && !self.awaiting_opponent
    }

    /// Handle a player move. Rejections leave the session untouched.
    pub fn submit_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        if self.status == SessionStatus::Completed {
            return MoveOutcome::Rejected(Rejection::SessionOver);
        }
        if self.awaiting_opponent {
            return MoveOutcome::Rejected(Rejection::AwaitingOpponent);
        }

        let applied = match apply_move(&self.position, from, to, Some(PLAYER_PROMOTION)) {
            Ok(applied) => applied,
            Err(e) => {
                tracing::debug!("Rejected player move: {}", e);
                return MoveOutcome::Rejected(Rejection::Illegal);
            }
        };

        let Some(expected) = self.solution.token(self.ply_index).copied() else {
            self.complete();
            return MoveOutcome::Rejected(Rejection::SessionOver);
        };

        if !matches_solution(&expected, &applied.token) {
            tracing::debug!(
                ply = self.ply_index,
                played = %applied.token,
                "Wrong move"
            );
            self.mistake = true;
            self.wrong_move = true;
            return MoveOutcome::Wrong;
        }

        tracing::debug!(ply = self.ply_index, san = %applied.san, "Correct move");
        self.position = applied.position;
        self.move_history.push(applied.san.clone());
        self.line.push(applied.san);
        self.last_move = Some(applied.token);
        self.wrong_move = false;
        self.ply_index += 1;

        if self.ply_index == self.solution.len() || applied.is_terminal {
            self.complete();
            return MoveOutcome::Completed(self.completion_kind().unwrap_or(CompletionKind::Perfect));
        }

        self.awaiting_opponent = true;
        MoveOutcome::Correct
    }

    /// Play the pending scripted reply.
    ///
    /// A reply the rules engine refuses is a puzzle data defect: it is logged
    /// and the session completes with whatever credit the player has earned.
    pub fn play_opponent_reply(&mut self) -> OpponentOutcome {
        if !self.awaiting_opponent || self.status == SessionStatus::Completed {
            return OpponentOutcome::NotPending;
        }
        self.awaiting_opponent = false;

        let Some(token) = self.solution.token(self.ply_index).copied() else {
            self.complete();
            return OpponentOutcome::NotPending;
        };

        match apply_token(&self.position, &token) {
            Ok(applied) => {
                let san = applied.san.clone();
                self.position = applied.position;
                self.line.push(applied.san);
                self.last_move = Some(applied.token);
                self.ply_index += 1;

                if self.ply_index == self.solution.len() || applied.is_terminal {
                    self.complete();
                    let kind = self.completion_kind().unwrap_or(CompletionKind::Perfect);
                    OpponentOutcome::Completed { san, kind }
                } else {
                    OpponentOutcome::Played { san }
                }
            }
            Err(e) => {
                tracing::error!(
                    puzzle = %self.label,
                    ply = self.ply_index,
                    token = %token,
                    "Puzzle data defect, scripted reply cannot be played: {}",
                    e
                );
                self.complete();
                OpponentOutcome::DataDefect(e)
            }
        }
    }

    /// Abandon the puzzle. Returns false if the session was already over.
    pub fn give_up(&mut self) -> bool {
        if self.status == SessionStatus::Completed {
            return false;
        }
        tracing::info!(puzzle = %self.label, "Player gave up");
        self.mistake = true;
        self.wrong_move = false;
        self.complete();
        true
    }

    /// Show or hide the full solution.
    ///
    /// Revealing it while the puzzle is still open marks the hint as used.
    pub fn toggle_solution(&mut self) -> Result<SolutionView, SessionError> {
        let moves = self.solution.san_moves()?.to_vec();
        self.solution_visible = !self.solution_visible;
        if self.solution_visible && self.status == SessionStatus::InProgress {
            self.hint_revealed = true;
        }
        Ok(SolutionView {
            visible: self.solution_visible,
            moves,
        })
    }

    pub fn clear_wrong_move(&mut self) {
        self.wrong_move = false;
    }

    /// `None` while the puzzle is in progress.
    pub fn completion_kind(&self) -> Option<CompletionKind> {
        if self.status != SessionStatus::Completed {
            return None;
        }
        Some(match (self.mistake, self.hint_revealed) {
            (false, false) => CompletionKind::Perfect,
            (false, true) => CompletionKind::WithHint,
            (true, _) => CompletionKind::WithMistakes,
        })
    }

    /// Destinations the player may click for the piece on `square`.
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        if !self.accepts_moves() {
            return Vec::new();
        }
        legal_destinations(&self.position, square)
    }

    /// Seconds since the session started, frozen once completed.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed
            .unwrap_or_else(|| self.started_at.elapsed())
            .as_secs()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            puzzle_id: self.puzzle_id.clone(),
            fen: self.position.fen(),
            side_to_move: self.position.turn(),
            player_side: self.player_side,
            ply_index: self.ply_index,
            solution_len: self.solution.len(),
            move_history: self.move_history.clone(),
            line: self.line.clone(),
            last_move: self.last_move,
            mistake: self.mistake,
            hint_revealed: self.hint_revealed,
            solution_visible: self.solution_visible,
            wrong_move: self.wrong_move,
            awaiting_opponent: self.awaiting_opponent,
            status: self.status,
            completion: self.completion_kind(),
            elapsed_seconds: self.elapsed_seconds(),
            recorded_at: self.completed_at.unwrap_or_else(Utc::now),
        }
    }

    fn complete(&mut self) {
        if self.status == SessionStatus::Completed {
            return;
        }
        self.status = SessionStatus::Completed;
        self.awaiting_opponent = false;
        self.elapsed = Some(self.started_at.elapsed());
        self.completed_at = Some(Utc::now());
        tracing::info!(
            puzzle = %self.label,
            mistake = self.mistake,
            hint = self.hint_revealed,
            seconds = self.elapsed_seconds(),
            "Puzzle session completed"
        );
    }
}

/// Squares must match; promotion only counts when the solution names one.
fn matches_solution(expected: &MoveToken, played: &MoveToken) -> bool {
    expected.same_squares(played)
        && (expected.promotion.is_none() || expected.promotion == played.promotion)
}
