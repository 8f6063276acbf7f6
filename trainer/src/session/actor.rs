use std::ops::ControlFlow;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};
use tracing::Instrument;

use super::commands::*;
use super::events::SessionEvent;
use super::state::PuzzleSession;
use crate::config::SessionTiming;

/// Deadlines and bookkeeping that live next to the session state.
#[derive(Default)]
struct Schedule {
    opponent_at: Option<Instant>,
    clear_wrong_move_at: Option<Instant>,
    completion_announced: bool,
}

impl Schedule {
    fn cancel_all(&mut self) {
        self.opponent_at = None;
        self.clear_wrong_move_at = None;
    }
}

/// The main session actor loop.
/// Owns all mutable state. Processes commands and timed opponent replies sequentially.
pub(crate) async fn run_session_actor(
    state: PuzzleSession,
    timing: SessionTiming,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    let span = tracing::info_span!("session", id = %state.session_id(), puzzle = %state.label());
    run_session_actor_inner(state, timing, cmd_rx, event_tx)
        .instrument(span)
        .await;
}

async fn run_session_actor_inner(
    mut state: PuzzleSession,
    timing: SessionTiming,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
) {
    tracing::info!("Session actor started");

    let mut schedule = Schedule {
        completion_announced: state.completion_kind().is_some(),
        ..Schedule::default()
    };

    loop {
        let opponent_at = schedule.opponent_at;
        let clear_at = schedule.clear_wrong_move_at;

        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    tracing::info!("All handles dropped, session actor shutting down");
                    break;
                };
                // Pending deadlines die with the loop.
                if handle_command(&mut state, &mut schedule, timing, cmd, &event_tx).is_break() {
                    break;
                }
            }

            _ = time::sleep_until(opponent_at.unwrap_or_else(Instant::now)), if opponent_at.is_some() => {
                schedule.opponent_at = None;
                handle_opponent_reply(&mut state, &mut schedule, &event_tx);
            }

            _ = time::sleep_until(clear_at.unwrap_or_else(Instant::now)), if clear_at.is_some() => {
                schedule.clear_wrong_move_at = None;
                state.clear_wrong_move();
                let _ = event_tx.send(SessionEvent::StateChanged(state.snapshot()));
            }
        }
    }

    tracing::info!("Session actor exited");
}

fn handle_command(
    state: &mut PuzzleSession,
    schedule: &mut Schedule,
    timing: SessionTiming,
    cmd: SessionCommand,
    event_tx: &broadcast::Sender<SessionEvent>,
) -> ControlFlow<()> {
    match cmd {
        SessionCommand::MakeMove { from, to, reply } => {
            let outcome = state.submit_move(from, to);
            match outcome {
                MoveOutcome::Rejected(_) => {}
                MoveOutcome::Wrong => {
                    schedule.clear_wrong_move_at = Some(Instant::now() + timing.wrong_move_flash);
                }
                MoveOutcome::Correct => {
                    schedule.clear_wrong_move_at = None;
                    schedule.opponent_at = Some(Instant::now() + timing.opponent_delay);
                }
                MoveOutcome::Completed(_) => schedule.cancel_all(),
            }

            let snapshot = if matches!(outcome, MoveOutcome::Rejected(_)) {
                state.snapshot()
            } else {
                publish(state, schedule, event_tx)
            };
            let _ = reply.send(MoveReply { outcome, snapshot });
        }
        SessionCommand::GiveUp { reply } => {
            let snapshot = if state.give_up() {
                schedule.cancel_all();
                publish(state, schedule, event_tx)
            } else {
                state.snapshot()
            };
            let _ = reply.send(snapshot);
        }
        SessionCommand::ToggleSolution { reply } => {
            let result = state.toggle_solution();
            if result.is_ok() {
                publish(state, schedule, event_tx);
            }
            let _ = reply.send(result);
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(state.snapshot());
        }
        SessionCommand::GetLegalDestinations { square, reply } => {
            let _ = reply.send(state.legal_destinations(square));
        }
        SessionCommand::Subscribe { reply } => {
            let snapshot = state.snapshot();
            let rx = event_tx.subscribe();
            let _ = reply.send((snapshot, rx));
        }
        SessionCommand::Shutdown => {
            tracing::info!("Session actor shutting down");
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

fn handle_opponent_reply(
    state: &mut PuzzleSession,
    schedule: &mut Schedule,
    event_tx: &broadcast::Sender<SessionEvent>,
) {
    match state.play_opponent_reply() {
        OpponentOutcome::Played { san } | OpponentOutcome::Completed { san, .. } => {
            let _ = event_tx.send(SessionEvent::OpponentMoved(san));
        }
        OpponentOutcome::DataDefect(e) => {
            let _ = event_tx.send(SessionEvent::Error(e.to_string()));
        }
        OpponentOutcome::NotPending => return,
    }
    publish(state, schedule, event_tx);
}

/// Broadcast the new state, plus a one-time completion event.
fn publish(
    state: &PuzzleSession,
    schedule: &mut Schedule,
    event_tx: &broadcast::Sender<SessionEvent>,
) -> super::snapshot::SessionSnapshot {
    let snapshot = state.snapshot();
    let _ = event_tx.send(SessionEvent::StateChanged(snapshot.clone()));

    if snapshot.is_completed() && !schedule.completion_announced {
        schedule.completion_announced = true;
        let _ = event_tx.send(SessionEvent::Completed(snapshot.clone()));
    }
    snapshot
}
