use serde::{Deserialize, Serialize};

/// A puzzle record as served by the puzzle API. Read-only for the trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    #[serde(default)]
    pub lichess_puzzle_id: Option<String>,
    /// Starting position; `"start"` means the standard initial position.
    pub fen: String,
    /// Space-separated solution tokens. Ply 0 is the opponent's setup move.
    pub moves: String,
    pub rating: i32,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub opening_tags: Option<Vec<String>>,
    #[serde(default)]
    pub popularity: Option<i32>,
    #[serde(default)]
    pub game_url: Option<String>,
}

impl Puzzle {
    /// Human-facing identifier used in logs: the upstream id when known.
    pub fn label(&self) -> &str {
        self.lichess_puzzle_id.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_shape() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "lichessPuzzleId": "00sHx",
            "fen": "q3k1nr/1pp1nQpp/3p4/1P2p3/4P3/B1PP1b2/B5PP/5K2 b k - 0 17",
            "moves": "e8d7 a2e6 d7d8 f7f8",
            "rating": 1760,
            "themes": ["mate", "mateIn2"],
            "openingTags": null,
            "popularity": 95,
            "gameUrl": "https://lichess.org/yyznGmXs/black#34"
        }"#;
        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert_eq!(puzzle.label(), "00sHx");
        assert_eq!(puzzle.rating, 1760);
        assert_eq!(puzzle.opening_tags, None);
        assert_eq!(puzzle.themes.len(), 2);
    }

    #[test]
    fn test_minimal_shape() {
        let json = r#"{"id": "p1", "fen": "start", "moves": "e2e4 e7e5", "rating": 1200}"#;
        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert_eq!(puzzle.label(), "p1");
        assert!(puzzle.themes.is_empty());
        assert_eq!(puzzle.game_url, None);
    }
}
