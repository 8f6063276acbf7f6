//! Text rendering for the terminal front end.

use trainer::persistence::AttemptPage;
use trainer::session::{CompletionKind, SessionSnapshot};
use trainer::{Identity, Provenance, Puzzle, Statistics};

/// `m:ss`, minutes unbounded.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Headline and detail line shown when a puzzle ends.
pub fn completion_message(kind: CompletionKind) -> (&'static str, &'static str) {
    match kind {
        CompletionKind::Perfect => ("Perfect Solve!", "No mistakes"),
        CompletionKind::WithHint => ("Completed!", "With hint"),
        CompletionKind::WithMistakes => ("Puzzle Completed", "With mistakes"),
    }
}

pub fn puzzle_header(puzzle: &Puzzle, snapshot: &SessionSnapshot) -> String {
    let mut out = format!("Puzzle {} (rating {})", puzzle.label(), puzzle.rating);
    if !puzzle.themes.is_empty() {
        out.push_str(&format!("\nThemes: {}", puzzle.themes.join(", ")));
    }
    out.push_str(&format!("\nYou play {}.", snapshot.player_side));
    out
}

pub fn position(snapshot: &SessionSnapshot) -> String {
    let last = snapshot
        .line
        .last()
        .map(|san| format!("Last move: {}\n", san))
        .unwrap_or_default();
    format!(
        "{}FEN: {}\n{} to move, {} elapsed",
        last,
        snapshot.fen,
        snapshot.side_to_move,
        format_time(snapshot.elapsed_seconds)
    )
}

pub fn completion(snapshot: &SessionSnapshot) -> String {
    let kind = snapshot.completion.unwrap_or(CompletionKind::WithMistakes);
    let (headline, detail) = completion_message(kind);
    let moves = if snapshot.move_history.is_empty() {
        "-".to_string()
    } else {
        snapshot.move_history.join(" ")
    };
    format!(
        "{} {}\nYour moves: {}\nTime: {}",
        headline,
        detail,
        moves,
        format_time(snapshot.elapsed_seconds)
    )
}

pub fn identity(identity: &Identity) -> String {
    let kind = match identity.provenance() {
        Provenance::LocalGuest => "local guest, attempts stay on this device",
        Provenance::Account if identity.is_guest => "guest account",
        Provenance::Account => "account",
    };
    format!("{} ({}) [{}]", identity.display_name, identity.id, kind)
}

pub fn statistics(stats: &Statistics) -> String {
    [
        format!("Attempts:        {}", stats.total_attempts),
        format!("Solved:          {}", stats.total_solved),
        format!("Accuracy:        {:.1}%", stats.accuracy),
        format!("Average time:    {}", format_time(stats.average_time_seconds)),
        format!("Current streak:  {}", stats.current_streak),
        format!("Longest streak:  {}", stats.longest_streak),
        format!("Solved today:    {}", stats.solved_today),
        format!("Solved, 7 days:  {}", stats.solved_this_week),
        format!("Solved, 30 days: {}", stats.solved_this_month),
    ]
    .join("\n")
}

pub fn history(page: &AttemptPage) -> String {
    if page.data.is_empty() {
        return "No attempts yet.".to_string();
    }
    let mut lines: Vec<String> = page
        .data
        .iter()
        .map(|a| {
            format!(
                "{}  {:<12} {:<8} {:>6}  {}",
                a.attempted_at.format("%Y-%m-%d %H:%M"),
                a.puzzle_id,
                if a.solved { "solved" } else { "failed" },
                format_time(a.time_spent_seconds),
                a.moves.join(" ")
            )
        })
        .collect();
    lines.push(format!(
        "Page {} of {} ({} attempts)",
        page.page, page.total_pages, page.total
    ));
    lines.join("\n")
}

pub const HELP: &str = "\
Commands:
  <move>       play a move, e.g. e2e4 (promotion is always to a queen)
  moves <sq>   list destinations for the piece on <sq>
  hint         show or hide the solution
  fen          print the current position
  giveup       give up this puzzle
  quit         leave without saving";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(75), "1:15");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn test_completion_messages() {
        assert_eq!(completion_message(CompletionKind::Perfect).0, "Perfect Solve!");
        assert_eq!(completion_message(CompletionKind::WithHint).1, "With hint");
        assert_eq!(
            completion_message(CompletionKind::WithMistakes),
            ("Puzzle Completed", "With mistakes")
        );
    }

    #[test]
    fn test_empty_history() {
        let page = AttemptPage::paginate(vec![], 1, 20);
        assert_eq!(history(&page), "No attempts yet.");
    }
}
