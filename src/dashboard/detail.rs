//! Score detail: one record's current scores plus its history.

use serde::Serialize;

use crate::i18n::Labels;
use crate::scores::{ScoreDimension, ScoreRecord};

/// One labelled score, formatted to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreLine {
    pub dimension: ScoreDimension,
    pub label: String,
    pub value: String,
}

/// One earlier evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub date: String,
    pub total: String,
    pub scores: Vec<ScoreLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Everything the detail panel shows, already translated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDetail {
    pub title: String,
    pub id: String,
    pub created_at: String,
    pub current_title: String,
    pub current: Vec<ScoreLine>,
    /// Reviewer comment on the current evaluation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub history_title: String,
    pub history: Vec<HistoryEntry>,
    /// Set when `history` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_history: Option<String>,
}

/// Sub-scores first, total last, like the panel lists them.
const SUB_SCORES: [ScoreDimension; 4] = [
    ScoreDimension::Accuracy,
    ScoreDimension::Completeness,
    ScoreDimension::Relevance,
    ScoreDimension::Clarity,
];

fn line(record: &ScoreRecord, dimension: ScoreDimension, labels: &Labels) -> ScoreLine {
    ScoreLine {
        dimension,
        label: labels.dimension(dimension).to_string(),
        value: format!("{:.2}", record.score(dimension)),
    }
}

/// Blank feedback is not worth a line.
fn feedback(record: &ScoreRecord) -> Option<String> {
    record
        .feedback
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

/// Build the detail view for `record`. `history` is shown newest first.
pub fn build_detail(record: &ScoreRecord, history: &[ScoreRecord], labels: &Labels) -> ScoreDetail {
    let current = SUB_SCORES
        .iter()
        .chain(std::iter::once(&ScoreDimension::Total))
        .map(|&d| line(record, d, labels))
        .collect();

    let mut ordered: Vec<&ScoreRecord> = history.iter().collect();
    ordered.sort_by(|a, b| (b.timestamp(), &b.created_at).cmp(&(a.timestamp(), &a.created_at)));

    let history: Vec<HistoryEntry> = ordered
        .into_iter()
        .map(|h| HistoryEntry {
            id: h.id.clone(),
            date: h.calendar_date().to_string(),
            total: format!("{:.2}", h.total_score),
            scores: SUB_SCORES.iter().map(|&d| line(h, d, labels)).collect(),
            feedback: feedback(h),
        })
        .collect();

    ScoreDetail {
        title: labels.detail_title.to_string(),
        id: record.id.clone(),
        created_at: record.created_at.clone(),
        current_title: labels.current.to_string(),
        current,
        feedback: feedback(record),
        history_title: labels.history.to_string(),
        empty_history: history.is_empty().then(|| labels.no_history.to_string()),
        history,
    }
}

/// Find `id` in a record set and build its detail, treating the other
/// records as its history.
pub fn detail_for(id: &str, records: &[ScoreRecord], labels: &Labels) -> Option<ScoreDetail> {
    let record = records.iter().find(|r| r.id == id)?;
    let history: Vec<ScoreRecord> = records.iter().filter(|r| r.id != id).cloned().collect();
    Some(build_detail(record, &history, labels))
}
