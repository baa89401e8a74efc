//! Filter conditions: optional predicates over score records.
//!
//! The backend applies filters; this module only builds, validates and
//! (de)serializes them. Serialization omits absent fields and
//! deserialization leaves missing fields absent, so a value survives a
//! round-trip field-for-field. Deserialization also accepts the encoding an
//! HTML form produces: empty strings mean "no constraint" and scores may
//! arrive as numeric strings.

pub mod saved;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::scores::{SCORE_MAX, SCORE_MIN, ScoreRecord};

pub use saved::{SaveFilterRequest, SavedFilter, SavedFilterList, SavedFilterWire};

/// Date format used on the wire and in query strings.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("{field} must be within [0, 100], got {value}")]
    ScoreOutOfRange { field: &'static str, value: f64 },

    #[error("min_total_score ({min}) is greater than max_total_score ({max})")]
    InvertedScoreRange { min: f64, max: f64 },

    #[error("start_date ({start}) is after end_date ({end})")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid filter value: {0}")]
    InvalidValue(String),

    #[error("saved filter '{name}' has malformed conditions: {reason}")]
    MalformedSaved { name: String, reason: String },

    #[error("no saved filter named '{0}'")]
    UnknownSaved(String),
}

// ---------------------------------------------------------------------------
// Filter conditions
// ---------------------------------------------------------------------------

/// A set of optional predicates. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConditions {
    /// Never blank: parsing and the CLI flags turn blank text into `None`,
    /// and [`FilterConditions::validate`] rejects a blank value.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_text")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_score")]
    pub min_total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_score")]
    pub max_total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_score")]
    pub min_accuracy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_score")]
    pub min_completeness_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_score")]
    pub min_relevance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_score")]
    pub min_clarity_score: Option<f64>,
}

impl FilterConditions {
    /// True when no field constrains anything.
    pub fn is_empty(&self) -> bool {
        self.to_query_pairs().is_empty()
    }

    /// Score fields that are set, with their wire names.
    fn score_fields(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("min_total_score", self.min_total_score),
            ("max_total_score", self.max_total_score),
            ("min_accuracy_score", self.min_accuracy_score),
            ("min_completeness_score", self.min_completeness_score),
            ("min_relevance_score", self.min_relevance_score),
            ("min_clarity_score", self.min_clarity_score),
        ]
    }

    /// Check ranges and orderings before the filter is sent anywhere.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.keyword.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(FilterError::InvalidValue(
                "keyword is blank; leave it unset instead".to_string(),
            ));
        }

        for (field, value) in self.score_fields() {
            if let Some(value) = value {
                if !value.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&value) {
                    return Err(FilterError::ScoreOutOfRange { field, value });
                }
            }
        }

        if let (Some(min), Some(max)) = (self.min_total_score, self.max_total_score) {
            if min > max {
                return Err(FilterError::InvertedScoreRange { min, max });
            }
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(FilterError::InvertedDateRange { start, end });
            }
        }

        Ok(())
    }

    /// Query-string pairs for the backend. Only present fields are emitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            pairs.push(("keyword", keyword.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format(DATE_FORMAT).to_string()));
        }
        for (field, value) in self.score_fields() {
            if let Some(value) = value {
                pairs.push((field, value.to_string()));
            }
        }

        pairs
    }

    /// Build conditions from query-string pairs. Unknown keys are ignored.
    pub fn from_query_pairs<'a, I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| FilterError::InvalidValue(e.to_string()))
    }

    /// Serialize to the JSON string form saved filters are stored in.
    ///
    /// Invalid conditions are refused: JSON has no non-finite numbers, so
    /// they would not read back as written.
    pub fn to_json(&self) -> Result<String, FilterError> {
        self.validate()?;
        serde_json::to_string(self).map_err(|e| FilterError::InvalidValue(e.to_string()))
    }

    /// Parse the JSON string form.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        serde_json::from_str(json).map_err(|e| FilterError::InvalidValue(e.to_string()))
    }

    /// Evaluate the predicate against one record.
    ///
    /// Only offline record sources use this; against the backend, filtering
    /// is the backend's job. The keyword matches the record id or feedback,
    /// case-insensitively. Date bounds are inclusive and exclude records
    /// whose date cannot be parsed.
    pub fn matches(&self, record: &ScoreRecord) -> bool {
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            let needle = keyword.to_lowercase();
            let in_feedback = record
                .feedback
                .as_deref()
                .is_some_and(|f| f.to_lowercase().contains(&needle));
            if !in_feedback && !record.id.to_lowercase().contains(&needle) {
                return false;
            }
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            let Ok(date) = NaiveDate::parse_from_str(record.calendar_date(), DATE_FORMAT) else {
                return false;
            };
            if self.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }

        let at_least = |min: Option<f64>, value: f64| min.is_none_or(|m| value >= m);

        at_least(self.min_total_score, record.total_score)
            && self.max_total_score.is_none_or(|m| record.total_score <= m)
            && at_least(self.min_accuracy_score, record.accuracy_score)
            && at_least(self.min_completeness_score, record.completeness_score)
            && at_least(self.min_relevance_score, record.relevance_score)
            && at_least(self.min_clarity_score, record.clarity_score)
    }
}

// ---------------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------------

fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid date '{s}': {e}"))),
    }
}

fn de_opt_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Num(f64),
        Text(String),
    }

    match Option::<RawScore>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawScore::Num(n)) => Ok(Some(n)),
        Some(RawScore::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawScore::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid score '{s}'"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::tests::record;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn absent_fields_are_omitted_on_the_wire() {
        let filter = FilterConditions {
            min_accuracy_score: Some(60.0),
            ..Default::default()
        };
        let json = filter.to_json().unwrap();
        assert_eq!(json, r#"{"min_accuracy_score":60.0}"#);
    }

    #[test]
    fn accepts_html_form_encoding() {
        let json = r#"{"keyword": "", "start_date": "2025-01-01", "end_date": "",
            "min_total_score": "55.5", "max_total_score": null,
            "min_accuracy_score": 70}"#;
        let filter = FilterConditions::from_json(json).unwrap();

        assert_eq!(filter.keyword, None);
        assert_eq!(filter.start_date, Some(date("2025-01-01")));
        assert_eq!(filter.end_date, None);
        assert_eq!(filter.min_total_score, Some(55.5));
        assert_eq!(filter.max_total_score, None);
        assert_eq!(filter.min_accuracy_score, Some(70.0));
    }

    #[test]
    fn rejects_non_numeric_scores() {
        let err = FilterConditions::from_json(r#"{"min_total_score": "high"}"#).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue(_)));
    }

    #[test]
    fn validate_checks_ranges_and_order() {
        let mut filter = FilterConditions {
            min_total_score: Some(80.0),
            max_total_score: Some(20.0),
            ..Default::default()
        };
        assert!(matches!(
            filter.validate(),
            Err(FilterError::InvertedScoreRange { .. })
        ));

        filter.max_total_score = Some(101.0);
        assert_eq!(
            filter.validate(),
            Err(FilterError::ScoreOutOfRange {
                field: "max_total_score",
                value: 101.0
            })
        );

        let filter = FilterConditions {
            start_date: Some(date("2025-02-01")),
            end_date: Some(date("2025-01-01")),
            ..Default::default()
        };
        assert!(matches!(
            filter.validate(),
            Err(FilterError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn query_pairs_only_include_present_fields() {
        let filter = FilterConditions {
            keyword: Some("python".to_string()),
            end_date: Some(date("2025-03-01")),
            min_clarity_score: Some(50.0),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query_pairs(),
            vec![
                ("keyword", "python".to_string()),
                ("end_date", "2025-03-01".to_string()),
                ("min_clarity_score", "50".to_string()),
            ]
        );
        assert!(FilterConditions::default().to_query_pairs().is_empty());
    }

    #[test]
    fn query_pairs_parse_back() {
        let filter = FilterConditions {
            start_date: Some(date("2025-01-01")),
            min_total_score: Some(42.5),
            ..Default::default()
        };
        let pairs = filter.to_query_pairs();
        let parsed =
            FilterConditions::from_query_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str()))).unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn from_query_pairs_ignores_unknown_keys() {
        let parsed =
            FilterConditions::from_query_pairs([("lang", "en"), ("min_total_score", "10")]).unwrap();
        assert_eq!(parsed.min_total_score, Some(10.0));
    }

    #[test]
    fn matches_applies_every_constraint() {
        let mut r = record("qa-17", "2025-01-15 10:00:00", 70.0);
        r.feedback = Some("Clear and Accurate".to_string());

        assert!(FilterConditions::default().matches(&r));

        let by_keyword = FilterConditions {
            keyword: Some("accurate".to_string()),
            ..Default::default()
        };
        assert!(by_keyword.matches(&r));

        let by_date = FilterConditions {
            start_date: Some(date("2025-01-15")),
            end_date: Some(date("2025-01-15")),
            ..Default::default()
        };
        assert!(by_date.matches(&r));

        let too_strict = FilterConditions {
            min_relevance_score: Some(71.0),
            ..Default::default()
        };
        assert!(!too_strict.matches(&r));

        let capped = FilterConditions {
            max_total_score: Some(69.9),
            ..Default::default()
        };
        assert!(!capped.matches(&r));
    }

    #[test]
    fn is_empty_ignores_blank_keyword() {
        let filter = FilterConditions {
            keyword: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(filter.is_empty());
    }
}
