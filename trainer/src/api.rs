//! HTTP client for the puzzle trainer API.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::attempt::{join_moves, Attempt, StoredAttempt};
use crate::config::TrainerConfig;
use crate::identity::Identity;
use crate::persistence::AttemptPage;
use crate::puzzle::Puzzle;
use crate::stats::Statistics;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Filters for `GET /puzzles/random`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleFilter {
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub themes: Vec<String>,
}

impl PuzzleFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(min) = self.min_rating {
            params.push(("minRating", min.to_string()));
        }
        if let Some(max) = self.max_rating {
            params.push(("maxRating", max.to_string()));
        }
        if !self.themes.is_empty() {
            params.push(("themes", self.themes.join(",")));
        }
        params
    }
}

/// Body of `POST /attempts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttemptRequest {
    pub puzzle_id: String,
    pub solved: bool,
    pub time_spent: u64,
    pub moves_made: String,
}

impl From<&Attempt> for CreateAttemptRequest {
    fn from(attempt: &Attempt) -> Self {
        Self {
            puzzle_id: attempt.puzzle_id.clone(),
            solved: attempt.solved,
            time_spent: attempt.time_spent_seconds,
            moves_made: join_moves(&attempt.moves),
        }
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &TrainerConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("chesstrainer/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    pub async fn random_puzzle(&self, filter: &PuzzleFilter) -> Result<Puzzle, ApiError> {
        let resp = self
            .request(Method::GET, "puzzles/random")
            .query(&filter.query())
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn daily_puzzle(&self) -> Result<Puzzle, ApiError> {
        let resp = self.request(Method::GET, "puzzles/daily").send().await?;
        Self::read(resp).await
    }

    pub async fn puzzle(&self, id: &str) -> Result<Puzzle, ApiError> {
        let resp = self
            .request(Method::GET, &format!("puzzles/{}", id))
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn current_user(&self) -> Result<Identity, ApiError> {
        let resp = self.request(Method::GET, "auth/me").send().await?;
        Self::read(resp).await
    }

    pub async fn submit_attempt(&self, attempt: &Attempt) -> Result<StoredAttempt, ApiError> {
        let body = CreateAttemptRequest::from(attempt);
        tracing::debug!(puzzle = %body.puzzle_id, solved = body.solved, "Submitting attempt");
        let resp = self
            .request(Method::POST, "attempts")
            .json(&body)
            .send()
            .await?;
        Self::read(resp).await
    }

    pub async fn stats_overview(&self) -> Result<Statistics, ApiError> {
        let resp = self.request(Method::GET, "stats/overview").send().await?;
        Self::read(resp).await
    }

    pub async fn history(&self, page: usize, limit: usize) -> Result<AttemptPage, ApiError> {
        let resp = self
            .request(Method::GET, "attempts/history")
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        let mut history: AttemptPage = Self::read(resp).await?;
        if history.limit == 0 {
            history.limit = limit;
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_filter_query() {
        assert!(PuzzleFilter::default().query().is_empty());

        let filter = PuzzleFilter {
            min_rating: Some(1200),
            max_rating: None,
            themes: vec!["fork".into(), "pin".into()],
        };
        assert_eq!(
            filter.query(),
            vec![
                ("minRating", "1200".to_string()),
                ("themes", "fork,pin".to_string())
            ]
        );
    }

    #[test]
    fn test_create_attempt_body() {
        let attempt = Attempt {
            puzzle_id: "p1".into(),
            solved: true,
            time_spent_seconds: 45,
            moves: vec!["Be6+".into(), "Qf8#".into()],
            attempted_at: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(CreateAttemptRequest::from(&attempt)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "puzzleId": "p1",
                "solved": true,
                "timeSpent": 45,
                "movesMade": "Be6+ Qf8#"
            })
        );
    }

    #[test]
    fn test_url_joining() {
        let config = TrainerConfig {
            api_url: "http://localhost:3009/api/".into(),
            ..TrainerConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3009/api");
        assert_eq!(client.url("/puzzles/daily"), "http://localhost:3009/api/puzzles/daily");
    }

    #[test]
    fn test_history_response_shape() {
        let json = r#"{
            "data": [{
                "id": "a1", "userId": "u1", "puzzleId": "p1", "solved": false,
                "timeSpentSeconds": 3, "moves": [], "attemptedAt": "2024-03-01T10:00:00.000Z"
            }],
            "total": 1, "page": 1, "totalPages": 1
        }"#;
        let page: AttemptPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.limit, 0);
    }
}
