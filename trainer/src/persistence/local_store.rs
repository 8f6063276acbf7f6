use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::json_store::{JsonStore, Storable};
use super::traits::AttemptSink;
use super::{generate_attempt_id, PersistenceError};
use crate::attempt::{split_moves, Attempt, StoredAttempt};
use crate::stats::{self, Statistics};

/// An attempt as stored on this device for a local guest.
///
/// Older records used `movesMade` (a space-joined string),
/// `timeSpentSeconds` and `timestamp`; they are read into this shape.
/// A `moves` string is split on whitespace, any other non-array value
/// reads as no moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawLocalAttempt")]
pub struct LocalAttemptRecord {
    pub id: String,
    pub puzzle_id: String,
    pub solved: bool,
    pub moves: Vec<String>,
    pub time_spent: u64,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocalAttempt {
    #[serde(default)]
    id: Option<String>,
    puzzle_id: String,
    #[serde(default)]
    solved: Option<bool>,
    #[serde(default)]
    moves: Option<Value>,
    #[serde(default)]
    moves_made: Option<Value>,
    #[serde(default)]
    time_spent: Option<u64>,
    #[serde(default)]
    time_spent_seconds: Option<u64>,
    #[serde(default)]
    attempted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl From<RawLocalAttempt> for LocalAttemptRecord {
    fn from(raw: RawLocalAttempt) -> Self {
        let moves = raw
            .moves
            .filter(|v| !v.is_null())
            .or(raw.moves_made)
            .map(moves_from_value)
            .unwrap_or_default();
        Self {
            id: raw
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(generate_attempt_id),
            puzzle_id: raw.puzzle_id,
            solved: raw.solved.unwrap_or(false),
            moves,
            time_spent: raw.time_spent.or(raw.time_spent_seconds).unwrap_or(0),
            attempted_at: raw
                .attempted_at
                .or(raw.timestamp)
                .unwrap_or_else(Utc::now),
        }
    }
}

fn moves_from_value(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(san) if !san.trim().is_empty() => Some(san),
                _ => None,
            })
            .collect(),
        Value::String(joined) => split_moves(&joined),
        _ => Vec::new(),
    }
}

impl Storable for LocalAttemptRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl From<LocalAttemptRecord> for StoredAttempt {
    fn from(record: LocalAttemptRecord) -> Self {
        Self {
            id: record.id,
            puzzle_id: record.puzzle_id,
            solved: record.solved,
            time_spent_seconds: record.time_spent,
            moves: record.moves,
            attempted_at: record.attempted_at,
        }
    }
}

/// One page of attempt history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptPage {
    pub data: Vec<StoredAttempt>,
    pub total: usize,
    pub page: usize,
    #[serde(default)]
    pub limit: usize,
    pub total_pages: usize,
}

impl AttemptPage {
    /// Slice `newest_first` into the requested 1-based page.
    pub fn paginate(newest_first: Vec<StoredAttempt>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total = newest_first.len();
        let data = newest_first
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect();
        Self {
            data,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Attempt history of one local guest, kept on this device.
///
/// One JSON file per attempt under `<data_dir>/guests/<guest id>/attempts`.
/// Records are only ever added, or removed all at once by [`clear`](Self::clear).
pub struct LocalAttemptStore {
    guest_id: String,
    inner: JsonStore<LocalAttemptRecord>,
}

impl LocalAttemptStore {
    pub fn new(data_dir: &Path, guest_id: &str) -> Self {
        let dir = data_dir.join("guests").join(guest_id).join("attempts");
        Self::new_in(guest_id, dir)
    }

    fn new_in(guest_id: &str, dir: PathBuf) -> Self {
        Self {
            guest_id: guest_id.to_string(),
            inner: JsonStore::new(dir),
        }
    }

    pub fn guest_id(&self) -> &str {
        &self.guest_id
    }

    /// Save an attempt under a freshly generated id.
    pub fn save_attempt(&self, attempt: &Attempt) -> Result<StoredAttempt, PersistenceError> {
        let record = LocalAttemptRecord {
            id: generate_attempt_id(),
            puzzle_id: attempt.puzzle_id.clone(),
            solved: attempt.solved,
            moves: attempt.moves.clone(),
            time_spent: attempt.time_spent_seconds,
            attempted_at: attempt.attempted_at,
        };
        self.inner.create(&record)?;
        tracing::debug!(guest = %self.guest_id, attempt = %record.id, "Stored local attempt");
        Ok(record.into())
    }

    /// All attempts, oldest first.
    pub fn attempts(&self) -> Result<Vec<StoredAttempt>, PersistenceError> {
        let mut records = self.inner.load_all()?;
        records.sort_by(|a, b| {
            a.attempted_at
                .cmp(&b.attempted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records.into_iter().map(StoredAttempt::from).collect())
    }

    pub fn attempts_for_puzzle(&self, puzzle_id: &str) -> Result<Vec<StoredAttempt>, PersistenceError> {
        Ok(self
            .attempts()?
            .into_iter()
            .filter(|a| a.puzzle_id == puzzle_id)
            .collect())
    }

    pub fn history(&self, page: usize, limit: usize) -> Result<AttemptPage, PersistenceError> {
        let mut attempts = self.attempts()?;
        attempts.reverse();
        Ok(AttemptPage::paginate(attempts, page, limit))
    }

    pub fn statistics(&self) -> Result<Statistics, PersistenceError> {
        Ok(stats::compute(&self.attempts()?))
    }

    /// Import a JSON array of attempt records, old shapes included.
    /// Records whose id is already present are skipped. Returns how many were added.
    pub fn import_legacy(&self, json: &str) -> Result<usize, PersistenceError> {
        let records: Vec<LocalAttemptRecord> = serde_json::from_str(json)?;
        let mut imported = 0;
        for record in &records {
            match self.inner.create(record) {
                Ok(_) => imported += 1,
                Err(PersistenceError::Duplicate(id)) => {
                    tracing::debug!(attempt = %id, "Skipping already imported attempt");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(guest = %self.guest_id, imported, "Imported legacy attempts");
        Ok(imported)
    }

    /// Remove every attempt of this guest. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, PersistenceError> {
        self.inner.clear()
    }
}

impl AttemptSink for LocalAttemptStore {
    async fn submit(&self, attempt: &Attempt) -> Result<StoredAttempt, PersistenceError> {
        self.save_attempt(attempt)
    }
}
