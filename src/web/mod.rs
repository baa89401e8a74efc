//! Embedded web dashboard for scorelens.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The single-page quality dashboard (charts, filters, score detail)
//! - JSON endpoints that render dashboard views and proxy the backend
//!
//! Launched via `scorelens web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::config::ScorelensConfig;
use crate::filter::FilterError;
use crate::scores::source::RecordSource;

pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

/// What the handlers read from: effective config, the record source and a
/// backend client for files and saved filters.
pub struct WebContext {
    config: ScorelensConfig,
    source: Box<dyn RecordSource>,
    client: ApiClient,
    /// Whether records come from the backend (saved filters only make sense
    /// then).
    remote: bool,
}

impl WebContext {
    /// Serve records from the backend configured in `config`.
    pub fn remote(config: ScorelensConfig) -> Self {
        let client = ApiClient::from_config(&config.backend);
        Self {
            source: Box::new(client.clone()),
            client,
            config,
            remote: true,
        }
    }

    /// Serve records from `source` (for example a local file).
    pub fn with_source(config: ScorelensConfig, source: Box<dyn RecordSource>) -> Self {
        let client = ApiClient::from_config(&config.backend);
        Self {
            config,
            source,
            client,
            remote: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Requests are handled one at a time; a failing
/// handler produces a `{detail}` error response and the loop carries on.
pub fn serve(ctx: &WebContext, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("scorelens dashboard running at http://{addr}");
    println!("Records from {}", ctx.source.describe());
    println!("Press Ctrl+C to stop.\n");

    if ctx.config.web.open_browser {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            if let Err(e) = request.as_reader().read_to_string(&mut buf) {
                warn!(error = %e, "failed to read request body");
            }
            Some(buf)
        } else {
            None
        };

        let resp = dispatch(ctx, &method, &url, body.as_deref()).unwrap_or_else(|e| error_response(&e));
        if let Err(e) = request.respond(resp) {
            warn!(error = %e, "failed to send response");
        }

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub(crate) fn dispatch(
    ctx: &WebContext,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<HttpResponse> {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API: dashboard
        (&Method::Get, "/api/view") => api::get_view(ctx, url),
        (&Method::Get, p) if p.starts_with("/api/detail/") => {
            api::get_detail(ctx, &p["/api/detail/".len()..], url)
        }

        // API: saved filters
        (&Method::Get, "/api/filters") => api::get_filters(ctx),
        (&Method::Post, "/api/filters") => api::post_filter(ctx, body.unwrap_or("{}")),
        (&Method::Delete, p) if p.starts_with("/api/filters/") => {
            api::delete_filter(ctx, &p["/api/filters/".len()..])
        }

        // API: files
        (&Method::Get, "/api/files") => api::get_files(ctx),

        // API: configuration
        (&Method::Get, "/api/config") => api::get_config(ctx),

        _ => Ok(detail_response(404, "not found")),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> HttpResponse {
    bytes_response(frontend::INDEX_HTML.as_bytes().to_vec(), "text/html; charset=utf-8", 200)
}

pub(crate) fn bytes_response(body: Vec<u8>, content_type: &str, status: u16) -> HttpResponse {
    let mut resp = Response::from_data(body).with_status_code(StatusCode(status));
    if let Ok(header) = Header::from_bytes("Content-Type", content_type) {
        resp.add_header(header);
    }
    resp
}

/// `{"detail": message}` with the given status.
pub(crate) fn detail_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "detail": message }).to_string();
    bytes_response(body.into_bytes(), "application/json; charset=utf-8", status)
}

/// Status for a failed handler: validation is the caller's fault, backend
/// statuses pass through, anything else from the backend is a bad gateway.
fn status_for(err: &anyhow::Error) -> u16 {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return match api {
            ApiError::Filter(_) => 400,
            ApiError::Backend { status, .. } => *status,
            ApiError::Transport { .. }
            | ApiError::Decode { .. }
            | ApiError::Rejected { .. }
            | ApiError::InvalidRecord(_) => 502,
            ApiError::Io { .. } => 500,
        };
    }
    if err.downcast_ref::<FilterError>().is_some() {
        return 400;
    }
    500
}

/// Turn a handler error into a `{detail}` response. Backend details are
/// passed through unchanged.
fn error_response(err: &anyhow::Error) -> HttpResponse {
    detail_response(status_for(err), &error_detail(err))
}

fn error_detail(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) => api.to_string(),
        None => format!("{err:#}"),
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
