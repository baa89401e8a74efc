//! Request and response bodies of the backend REST surface.
//!
//! The backend is not consistent about wrapping: some endpoints answer
//! `{"status": "success", "data": ...}`, others the bare object, and older
//! ones use different field names. The types here accept every variant seen
//! in practice.

use serde::{Deserialize, Serialize};

use crate::scores::deserialize_id;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A payload that may or may not be wrapped in `{data: ...}` (or the older
/// `{files: ...}`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        #[serde(alias = "files")]
        data: T,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// The status fields that any response may carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl StatusBody {
    /// A body is a success unless it says otherwise.
    pub fn is_success(&self) -> bool {
        if self.success == Some(false) {
            return false;
        }
        !matches!(
            self.status.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("error" | "failed" | "failure")
        )
    }

    /// Best message the body offers.
    pub fn reason(&self) -> Option<&str> {
        self.detail.as_deref().or(self.message.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// An uploaded source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(alias = "file_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(alias = "file_name")]
    pub filename: String,
    #[serde(default, alias = "file_type")]
    pub filetype: Option<String>,
    #[serde(default, alias = "file_size")]
    pub filesize: Option<u64>,
    #[serde(default, alias = "created_at")]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `POST /api/split`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub segments_count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /api/process/progress/{task_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessProgress {
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessProgress {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "error")
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Body of `POST /api/export`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub format: String,
    pub include_metadata: bool,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: "alpaca".to_string(),
            include_metadata: true,
        }
    }
}

/// Where the backend wrote an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub export_path: String,
    #[serde(default)]
    pub total_qa_pairs: Option<u64>,
}
