use thiserror::Error;

use crate::filter::FilterError;
use crate::scores::RecordError;

/// Fallback message when a failed response carries no usable `detail`.
pub const DEFAULT_DETAIL: &str = "request failed";

/// Everything that can go wrong between the dashboard and its record source.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. Displays the backend's `detail` verbatim.
    #[error("{detail}")]
    Backend { status: u16, detail: String },

    /// Connection refused, DNS failure, timeout, ...
    #[error("cannot reach {url}: {message}")]
    Transport { url: String, message: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// A 2xx response reporting failure in its body (`status: "error"`,
    /// `success: false`).
    #[error("{operation} rejected: {detail}")]
    Rejected { operation: String, detail: String },

    #[error(transparent)]
    InvalidRecord(#[from] RecordError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// HTTP status of a backend error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Translate a `ureq` failure.
    pub(crate) fn from_ureq(err: ureq::Error, url: &str) -> Self {
        match err {
            ureq::Error::Status(status, resp) => {
                let body = resp.into_string().unwrap_or_default();
                Self::Backend {
                    status,
                    detail: extract_detail(&body).unwrap_or_else(|| DEFAULT_DETAIL.to_string()),
                }
            }
            ureq::Error::Transport(t) => Self::Transport {
                url: url.to_string(),
                message: t.to_string(),
            },
        }
    }
}

/// Pull the human-readable message out of an error body.
///
/// `{"detail": "..."}` yields the string as is. FastAPI validation errors
/// carry a list of `{msg, ...}` objects; their messages are joined. Any other
/// non-string `detail` is rendered as compact JSON. A `message` field is used
/// when `detail` is absent.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail").or_else(|| value.get("message"))?;

    match detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                Some(detail.to_string())
            } else {
                Some(msgs.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}
