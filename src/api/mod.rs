//! Blocking client for the dataset backend's REST surface.
//!
//! One call per user action: no retry, no backoff. Every failure comes back
//! as an [`ApiError`] whose display text is what the user should see.

pub mod error;
pub mod multipart;
pub mod types;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::filter::{FilterConditions, SaveFilterRequest, SavedFilterList, SavedFilterWire};
use crate::scores::ScoreRecord;
use crate::scores::source::{RecordSource, parse_records};

pub use error::{ApiError, DEFAULT_DETAIL, extract_detail};
use multipart::MultipartBody;
use types::{
    Envelope, ExportArtifact, ExportRequest, FileRecord, ProcessProgress, ProcessResult, StatusBody,
};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client. Cheap to clone; clones share the connection
/// pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Build a client for `base_url` with a per-request timeout.
    ///
    /// `localhost` is rewritten to `127.0.0.1` so an IPv4-only backend does
    /// not stall on an IPv6 attempt first.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let base_url = base_url
            .trim()
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { base_url, agent }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- Scores ------------------------------------------------------------

    /// `GET /api/scores` with the filter's query pairs.
    ///
    /// The filter is validated before anything is sent, and every returned
    /// record is range-checked.
    pub fn list_scores(&self, filter: &FilterConditions) -> Result<Vec<ScoreRecord>, ApiError> {
        filter.validate()?;
        let endpoint = "/api/scores";
        let pairs = filter.to_query_pairs();
        let body = self.send(self.agent.get(&self.url(endpoint)), &pairs, endpoint, |req| {
            req.call()
        })?;
        check_status(&body, "list scores")?;
        parse_records(&body, endpoint)
    }

    // -- Files ---------------------------------------------------------------

    /// `GET /api/files`.
    pub fn list_files(&self) -> Result<Vec<FileRecord>, ApiError> {
        let endpoint = "/api/files";
        let body = self.send(self.agent.get(&self.url(endpoint)), &[], endpoint, |req| req.call())?;
        check_status(&body, "list files")?;
        decode::<Envelope<Vec<FileRecord>>>(&body, endpoint).map(Envelope::into_inner)
    }

    /// `POST /api/upload` with the file as a multipart `file` field.
    pub fn upload_file(&self, path: &Path) -> Result<FileRecord, ApiError> {
        let endpoint = "/api/upload";
        let content = fs::read(path).map_err(|source| ApiError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let form = MultipartBody::single_file("file", &filename, &content);

        let request = self
            .agent
            .post(&self.url(endpoint))
            .set("Content-Type", &form.content_type());
        let body = self.send(request, &[], endpoint, |req| req.send_bytes(form.body()))?;
        check_status(&body, "upload")?;
        decode::<Envelope<FileRecord>>(&body, endpoint).map(Envelope::into_inner)
    }

    /// `POST /api/split?file_id=ID`, which starts segmenting an uploaded file.
    pub fn process_file(&self, file_id: &str) -> Result<ProcessResult, ApiError> {
        let endpoint = "/api/split";
        let pairs = [("file_id", file_id.to_string())];
        let body = self.send(self.agent.post(&self.url(endpoint)), &pairs, endpoint, |req| {
            req.call()
        })?;
        check_status(&body, "process file")?;
        decode::<Envelope<ProcessResult>>(&body, endpoint).map(Envelope::into_inner)
    }

    /// `GET /api/process/progress/{task_id}`.
    pub fn process_progress(&self, task_id: &str) -> Result<ProcessProgress, ApiError> {
        let endpoint = format!("/api/process/progress/{task_id}");
        let body = self.send(self.agent.get(&self.url(&endpoint)), &[], &endpoint, |req| {
            req.call()
        })?;
        decode::<Envelope<ProcessProgress>>(&body, &endpoint).map(Envelope::into_inner)
    }

    /// `DELETE /api/files/{id}`.
    pub fn delete_file(&self, file_id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/api/files/{file_id}");
        let body = self.send(self.agent.delete(&self.url(&endpoint)), &[], &endpoint, |req| {
            req.call()
        })?;
        check_status(&body, "delete file")
    }

    // -- Export ------------------------------------------------------------

    /// `POST /api/export`.
    pub fn export_dataset(&self, request: &ExportRequest) -> Result<ExportArtifact, ApiError> {
        let endpoint = "/api/export";
        let body = self.send_json(self.agent.post(&self.url(endpoint)), endpoint, request)?;
        check_status(&body, "export")?;
        decode::<Envelope<ExportArtifact>>(&body, endpoint).map(Envelope::into_inner)
    }

    // -- Saved filters ---------------------------------------------------------

    /// `GET /api/filters`. Entries with malformed conditions are reported in
    /// [`SavedFilterList::rejected`] rather than failing the whole listing.
    pub fn list_filters(&self) -> Result<SavedFilterList, ApiError> {
        let endpoint = "/api/filters";
        let body = self.send(self.agent.get(&self.url(endpoint)), &[], endpoint, |req| req.call())?;
        check_status(&body, "list filters")?;
        let entries = decode::<Envelope<Vec<SavedFilterWire>>>(&body, endpoint)?.into_inner();

        let list = SavedFilterList::from_wire(entries);
        for err in &list.rejected {
            warn!(error = %err, "skipping saved filter");
        }
        Ok(list)
    }

    /// `POST /api/filters`.
    pub fn save_filter(&self, name: &str, conditions: &FilterConditions) -> Result<(), ApiError> {
        let endpoint = "/api/filters";
        let request = SaveFilterRequest::new(name, conditions)?;
        let body = self.send_json(self.agent.post(&self.url(endpoint)), endpoint, &request)?;
        check_status(&body, "save filter")
    }

    /// `DELETE /api/filters/{id}`.
    pub fn delete_filter(&self, filter_id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/api/filters/{filter_id}");
        let body = self.send(self.agent.delete(&self.url(&endpoint)), &[], &endpoint, |req| {
            req.call()
        })?;
        check_status(&body, "delete filter")
    }

    // -- Plumbing ----------------------------------------------------------

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Attach query pairs, perform the request and read the body.
    fn send<F>(
        &self,
        mut request: ureq::Request,
        query: &[(&str, String)],
        endpoint: &str,
        perform: F,
    ) -> Result<String, ApiError>
    where
        F: FnOnce(ureq::Request) -> Result<ureq::Response, ureq::Error>,
    {
        for (key, value) in query {
            request = request.query(key, value);
        }
        debug!(method = request.method(), url = request.url(), "backend request");

        let url = self.url(endpoint);
        let response = perform(request).map_err(|e| ApiError::from_ureq(e, &url))?;
        debug!(status = response.status(), endpoint, "backend response");

        response.into_string().map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    fn send_json<B: Serialize>(
        &self,
        request: ureq::Request,
        endpoint: &str,
        payload: &B,
    ) -> Result<String, ApiError> {
        self.send(request, &[], endpoint, |req| req.send_json(payload))
    }
}

impl RecordSource for ApiClient {
    fn fetch_records(&self, filter: &FilterConditions) -> Result<Vec<ScoreRecord>, ApiError> {
        self.list_scores(filter)
    }

    fn describe(&self) -> String {
        format!("backend {}", self.base_url)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Turn a 2xx body that reports failure into [`ApiError::Rejected`].
fn check_status(body: &str, operation: &str) -> Result<(), ApiError> {
    let Ok(status) = serde_json::from_str::<StatusBody>(body) else {
        return Ok(());
    };
    if status.is_success() {
        return Ok(());
    }
    Err(ApiError::Rejected {
        operation: operation.to_string(),
        detail: status.reason().unwrap_or(DEFAULT_DETAIL).to_string(),
    })
}

fn decode<T: DeserializeOwned>(body: &str, endpoint: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}
