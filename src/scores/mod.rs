//! Score records and the five scoring dimensions.
//!
//! A [`ScoreRecord`] is one quality evaluation as delivered by the backend.
//! Records are never edited in place: every refetch replaces the whole set.

pub mod source;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Lowest valid score.
pub const SCORE_MIN: f64 = 0.0;
/// Highest valid score.
pub const SCORE_MAX: f64 = 100.0;

// ---------------------------------------------------------------------------
// Dimensions
// ---------------------------------------------------------------------------

/// One of the five score dimensions, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreDimension {
    Accuracy,
    Completeness,
    Relevance,
    Clarity,
    Total,
}

impl ScoreDimension {
    /// All dimensions in canonical order (the radar/heatmap X axis).
    pub const ALL: [ScoreDimension; 5] = [
        Self::Accuracy,
        Self::Completeness,
        Self::Relevance,
        Self::Clarity,
        Self::Total,
    ];

    /// Position of this dimension in [`ScoreDimension::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Accuracy => 0,
            Self::Completeness => 1,
            Self::Relevance => 2,
            Self::Clarity => 3,
            Self::Total => 4,
        }
    }

    /// Stable lowercase key, used in JSON and CSV output.
    pub fn key(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Completeness => "completeness",
            Self::Relevance => "relevance",
            Self::Clarity => "clarity",
            Self::Total => "total",
        }
    }

    /// Read this dimension's value from a record.
    pub fn value(self, record: &ScoreRecord) -> f64 {
        match self {
            Self::Accuracy => record.accuracy_score,
            Self::Completeness => record.completeness_score,
            Self::Relevance => record.relevance_score,
            Self::Clarity => record.clarity_score,
            Self::Total => record.total_score,
        }
    }
}

impl std::fmt::Display for ScoreDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Score record
// ---------------------------------------------------------------------------

/// A single quality evaluation result.
///
/// `created_at` is kept exactly as delivered so that date grouping works on
/// the literal date prefix (`2025-01-15 10:00:00` and `2025-01-15T10:00:00Z`
/// both group under `2025-01-15`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub created_at: String,
    pub accuracy_score: f64,
    pub completeness_score: f64,
    pub relevance_score: f64,
    pub clarity_score: f64,
    pub total_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// A record whose scores fall outside `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("score record {id}: {dimension} score {value} is outside [0, 100]")]
pub struct RecordError {
    pub id: String,
    pub dimension: ScoreDimension,
    pub value: f64,
}

impl ScoreRecord {
    /// Calendar date portion of `created_at` (everything before the first
    /// space or `T`).
    pub fn calendar_date(&self) -> &str {
        self.created_at
            .split([' ', 'T'])
            .next()
            .unwrap_or(&self.created_at)
    }

    /// Parse `created_at` into a naive timestamp.
    ///
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]`
    /// and a bare `YYYY-MM-DD` (midnight). Returns `None` for anything else.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.created_at.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }

        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Value of a single dimension.
    pub fn score(&self, dimension: ScoreDimension) -> f64 {
        dimension.value(self)
    }

    /// Check that every score is finite and within `[0, 100]`.
    ///
    /// `total_score` is not cross-checked against the sub-scores.
    pub fn validate(&self) -> Result<(), RecordError> {
        for dimension in ScoreDimension::ALL {
            let value = dimension.value(self);
            if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
                return Err(RecordError {
                    id: self.id.clone(),
                    dimension,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Validate a whole record set, failing on the first bad record.
pub fn validate_all(records: &[ScoreRecord]) -> Result<(), RecordError> {
    records.iter().try_for_each(ScoreRecord::validate)
}

/// Identifiers arrive as JSON integers or strings; both are kept as strings.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
