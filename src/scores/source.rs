//! Where score records come from.
//!
//! The backend is the normal source ([`crate::api::ApiClient`]); a JSON file
//! exported from it is an offline stand-in that answers the same queries.

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::ApiError;
use crate::api::types::Envelope;
use crate::filter::FilterConditions;

use super::{ScoreRecord, validate_all};

/// Anything that can answer "give me the records matching this filter".
pub trait RecordSource {
    /// Fetch the full record set for `filter`. Validation failures and
    /// transport errors are both reported through [`ApiError`].
    fn fetch_records(&self, filter: &FilterConditions) -> Result<Vec<ScoreRecord>, ApiError>;

    /// Human-readable origin, for status lines.
    fn describe(&self) -> String;
}

/// Records loaded from a local JSON file (bare array or `{"data": [...]}`).
#[derive(Debug, Clone)]
pub struct LocalRecords {
    path: PathBuf,
    records: Vec<ScoreRecord>,
}

impl LocalRecords {
    /// Read and validate a record file.
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let content = fs::read_to_string(path).map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let records = parse_records(&content, &path.display().to_string())?;
        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Wrap an in-memory record set.
    pub fn from_records(records: Vec<ScoreRecord>) -> Result<Self, ApiError> {
        validate_all(&records)?;
        Ok(Self {
            path: PathBuf::from("<memory>"),
            records,
        })
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }
}

impl RecordSource for LocalRecords {
    /// Plays the backend's part: applies the predicate and returns a new set
    /// in file order.
    fn fetch_records(&self, filter: &FilterConditions) -> Result<Vec<ScoreRecord>, ApiError> {
        filter.validate()?;
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Parse a record payload and reject out-of-range scores.
pub fn parse_records(content: &str, origin: &str) -> Result<Vec<ScoreRecord>, ApiError> {
    let envelope: Envelope<Vec<ScoreRecord>> =
        serde_json::from_str(content).map_err(|e| ApiError::Decode {
            endpoint: origin.to_string(),
            message: e.to_string(),
        })?;
    let records = envelope.into_inner();
    validate_all(&records)?;
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
