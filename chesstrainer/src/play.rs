//! Interactive solving loop: stdin commands in, session events out.

use std::str::FromStr;

use anyhow::Context;
use chess::{format_square, parse_square, MoveToken, Square};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use trainer::session::{MoveOutcome, Rejection, SessionEvent, SessionHandle, SessionManager};
use trainer::{record_attempt, AttemptSink, Puzzle, SessionSnapshot, StoredAttempt};

use crate::output;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Move { from: Square, to: Square },
    Destinations(Square),
    Hint,
    GiveUp,
    Fen,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
enum InputError {
    #[error("unknown command {0:?}, type 'help'")]
    Unknown(String),
    #[error("{0:?} is not a square")]
    Square(String),
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let first = words.next().unwrap_or_default().to_ascii_lowercase();
        match first.as_str() {
            "hint" | "solution" => Ok(Input::Hint),
            "giveup" | "resign" => Ok(Input::GiveUp),
            "fen" => Ok(Input::Fen),
            "help" | "?" => Ok(Input::Help),
            "quit" | "exit" | "q" => Ok(Input::Quit),
            "moves" => {
                let name = words.next().unwrap_or_default();
                parse_square(name)
                    .map(Input::Destinations)
                    .ok_or_else(|| InputError::Square(name.to_string()))
            }
            // The promotion letter, if typed, is ignored: players always promote to a queen.
            token => token
                .parse::<MoveToken>()
                .map(|t| Input::Move {
                    from: t.from,
                    to: t.to,
                })
                .map_err(|_| InputError::Unknown(token.to_string())),
        }
    }
}

/// Play `puzzle` interactively. Returns the stored attempt when the puzzle was
/// finished and saved; quitting early saves nothing.
pub async fn run<S: AttemptSink>(
    manager: &SessionManager,
    puzzle: &Puzzle,
    sink: &S,
) -> anyhow::Result<Option<StoredAttempt>> {
    let (handle, _) = manager
        .start(puzzle)
        .await
        .with_context(|| format!("cannot start puzzle {}", puzzle.label()))?;
    let (snapshot, mut events) = handle.subscribe().await?;

    println!("{}", output::puzzle_header(puzzle, &snapshot));
    println!("{}", output::position(&snapshot));

    if snapshot.is_completed() {
        return finish(manager, sink, puzzle, &snapshot).await;
    }
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("Input closed, leaving puzzle");
                    manager.close().await;
                    return Ok(None);
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Quit) => {
                        manager.close().await;
                        println!("Left without saving.");
                        return Ok(None);
                    }
                    Ok(input) => handle_input(&handle, input).await?,
                    Err(e) => println!("{}", e),
                }
            }

            event = events.recv() => {
                match event {
                    Ok(SessionEvent::OpponentMoved(san)) => {
                        println!("Opponent plays {}", san);
                        let snapshot = handle.get_snapshot().await?;
                        if !snapshot.is_completed() {
                            println!("{}", output::position(&snapshot));
                        }
                    }
                    Ok(SessionEvent::Completed(snapshot)) => {
                        return finish(manager, sink, puzzle, &snapshot).await;
                    }
                    Ok(SessionEvent::Error(message)) => {
                        println!("Puzzle data problem: {}", message);
                    }
                    Ok(SessionEvent::StateChanged(_)) => {}
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("Missed {} session events", n);
                    }
                    Err(RecvError::Closed) => {
                        anyhow::bail!("session ended unexpectedly");
                    }
                }
            }
        }
    }
}

async fn handle_input(handle: &SessionHandle, input: Input) -> anyhow::Result<()> {
    match input {
        Input::Move { from, to } => {
            let reply = handle.make_move(from, to).await?;
            match reply.outcome {
                MoveOutcome::Rejected(Rejection::Illegal) => println!("Illegal move."),
                MoveOutcome::Rejected(Rejection::AwaitingOpponent) => {
                    println!("Wait for the opponent's reply.")
                }
                MoveOutcome::Rejected(Rejection::SessionOver) => println!("The puzzle is over."),
                MoveOutcome::Wrong => println!("Wrong move, try again."),
                MoveOutcome::Correct => {
                    if let Some(san) = reply.snapshot.move_history.last() {
                        println!("Correct: {}", san);
                    }
                }
                // The completion event carries the summary.
                MoveOutcome::Completed(_) => {}
            }
        }
        Input::Destinations(square) => {
            let destinations = handle.legal_destinations(square).await?;
            if destinations.is_empty() {
                println!("No moves from {}.", format_square(square));
            } else {
                let names: Vec<String> = destinations.into_iter().map(format_square).collect();
                println!("{}: {}", format_square(square), names.join(" "));
            }
        }
        Input::Hint => {
            let view = handle.toggle_solution().await?;
            if view.visible {
                println!("Solution: {}", view.moves.join(" "));
            } else {
                println!("Solution hidden.");
            }
        }
        Input::GiveUp => {
            handle.give_up().await?;
        }
        Input::Fen => {
            let snapshot = handle.get_snapshot().await?;
            println!("{}", output::position(&snapshot));
        }
        Input::Help => println!("{}", output::HELP),
        Input::Quit => {}
    }
    Ok(())
}

async fn finish<S: AttemptSink>(
    manager: &SessionManager,
    sink: &S,
    puzzle: &Puzzle,
    snapshot: &SessionSnapshot,
) -> anyhow::Result<Option<StoredAttempt>> {
    println!("{}", output::completion(snapshot));
    manager.close().await;

    match record_attempt(sink, snapshot, &puzzle.id).await {
        Ok(stored) => {
            println!("Attempt saved.");
            Ok(Some(stored))
        }
        Err(e) => {
            println!("Could not save the attempt: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("hint".parse::<Input>(), Ok(Input::Hint));
        assert_eq!(" GiveUp ".parse::<Input>(), Ok(Input::GiveUp));
        assert_eq!("q".parse::<Input>(), Ok(Input::Quit));
        assert_eq!(
            "moves g1".parse::<Input>(),
            Ok(Input::Destinations(parse_square("g1").unwrap()))
        );
        assert!(matches!("moves z9".parse::<Input>(), Err(InputError::Square(_))));
        assert!(matches!("dance".parse::<Input>(), Err(InputError::Unknown(_))));
    }

    #[test]
    fn test_parse_move_ignores_promotion_letter() {
        let expected = Input::Move {
            from: parse_square("e7").unwrap(),
            to: parse_square("e8").unwrap(),
        };
        assert_eq!("e7e8".parse::<Input>(), Ok(expected.clone()));
        assert_eq!("e7e8n".parse::<Input>(), Ok(expected));
    }
}
