//! Named filters persisted by the backend.
//!
//! On the wire a saved filter's conditions are a JSON *string*
//! (`filter_conditions: "{\"min_total_score\":60}"`). Parsing that string is
//! explicit and a bad entry produces a [`FilterError::MalformedSaved`] naming
//! the filter instead of being silently dropped.

use serde::{Deserialize, Serialize};

use crate::scores::deserialize_id;

use super::{FilterConditions, FilterError};

/// A saved filter exactly as the backend lists it.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedFilterWire {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    /// Usually a JSON string; some backends return the object inline.
    #[serde(default)]
    pub filter_conditions: serde_json::Value,
}

/// A saved filter whose conditions have been parsed and validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFilter {
    pub id: String,
    pub name: String,
    pub conditions: FilterConditions,
}

impl TryFrom<SavedFilterWire> for SavedFilter {
    type Error = FilterError;

    fn try_from(wire: SavedFilterWire) -> Result<Self, Self::Error> {
        let malformed = |reason: String| FilterError::MalformedSaved {
            name: wire.name.clone(),
            reason,
        };

        let conditions = match &wire.filter_conditions {
            serde_json::Value::String(json) => {
                serde_json::from_str::<FilterConditions>(json).map_err(|e| malformed(e.to_string()))?
            }
            serde_json::Value::Object(_) => {
                serde_json::from_value::<FilterConditions>(wire.filter_conditions.clone())
                    .map_err(|e| malformed(e.to_string()))?
            }
            serde_json::Value::Null => return Err(malformed("conditions are missing".to_string())),
            other => return Err(malformed(format!("expected a JSON string, got {other}"))),
        };
        conditions.validate().map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            id: wire.id,
            name: wire.name,
            conditions,
        })
    }
}

/// Result of parsing a listing: the usable filters plus one error per
/// rejected entry.
#[derive(Debug, Clone, Default)]
pub struct SavedFilterList {
    pub filters: Vec<SavedFilter>,
    pub rejected: Vec<FilterError>,
}

impl SavedFilterList {
    pub fn from_wire(entries: Vec<SavedFilterWire>) -> Self {
        let mut list = Self::default();
        for entry in entries {
            match SavedFilter::try_from(entry) {
                Ok(filter) => list.filters.push(filter),
                Err(e) => list.rejected.push(e),
            }
        }
        list
    }

    /// Look up a filter by exact name, then case-insensitively.
    pub fn find_by_name(&self, name: &str) -> Option<&SavedFilter> {
        self.filters
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.filters.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
    }

    /// Like [`find_by_name`](Self::find_by_name), but a miss is an error.
    pub fn resolve(&self, name: &str) -> Result<&SavedFilter, FilterError> {
        self.find_by_name(name)
            .ok_or_else(|| FilterError::UnknownSaved(name.to_string()))
    }
}

/// Body of `POST /api/filters`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveFilterRequest {
    pub name: String,
    pub filter_conditions: String,
}

impl SaveFilterRequest {
    /// Validate the conditions and encode them as the backend expects.
    pub fn new(name: &str, conditions: &FilterConditions) -> Result<Self, FilterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FilterError::InvalidValue("filter name is empty".to_string()));
        }
        conditions.validate()?;
        Ok(Self {
            name: name.to_string(),
            filter_conditions: conditions.to_json()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(json: &str) -> SavedFilterWire {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_string_encoded_conditions() {
        let filter = SavedFilter::try_from(wire(
            r#"{"id": 3, "name": "high", "filter_conditions": "{\"min_total_score\": \"80\"}"}"#,
        ))
        .unwrap();
        assert_eq!(filter.id, "3");
        assert_eq!(filter.conditions.min_total_score, Some(80.0));
    }

    #[test]
    fn malformed_entry_names_the_filter() {
        let err = SavedFilter::try_from(wire(
            r#"{"id": 4, "name": "broken", "filter_conditions": "{not json"}"#,
        ))
        .unwrap_err();
        match err {
            FilterError::MalformedSaved { name, .. } => assert_eq!(name, "broken"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let err = SavedFilter::try_from(wire(
            r#"{"id": 5, "name": "upside-down",
                "filter_conditions": "{\"min_total_score\": 90, \"max_total_score\": 10}"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, FilterError::MalformedSaved { .. }));
    }

    #[test]
    fn listing_keeps_good_entries_and_reports_bad_ones() {
        let entries = vec![
            wire(r#"{"id": 1, "name": "Good", "filter_conditions": "{}"}"#),
            wire(r#"{"id": 2, "name": "bad", "filter_conditions": 17}"#),
        ];
        let list = SavedFilterList::from_wire(entries);
        assert_eq!(list.filters.len(), 1);
        assert_eq!(list.rejected.len(), 1);
        assert_eq!(list.find_by_name("good").map(|f| f.id.as_str()), Some("1"));
        assert!(matches!(
            list.resolve("missing"),
            Err(FilterError::UnknownSaved(_))
        ));
    }

    #[test]
    fn save_request_encodes_conditions_as_string() {
        let conditions = FilterConditions {
            min_clarity_score: Some(40.0),
            ..Default::default()
        };
        let req = SaveFilterRequest::new(" clear ", &conditions).unwrap();
        assert_eq!(req.name, "clear");
        assert_eq!(req.filter_conditions, r#"{"min_clarity_score":40.0}"#);

        let parsed = FilterConditions::from_json(&req.filter_conditions).unwrap();
        assert_eq!(parsed, conditions);
    }

    #[test]
    fn save_request_rejects_empty_name() {
        assert!(SaveFilterRequest::new("  ", &FilterConditions::default()).is_err());
    }
}
