//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::charts::parse_chart;
use crate::config;
use crate::dashboard::{Dashboard, DashboardState, FetchOutcome, NoticeLevel, ScoreDetail, detail_for};
use crate::filter::FilterConditions;
use crate::i18n::parse_lang;
use crate::theme::parse_theme;

use super::{HttpResponse, WebContext, bytes_response, detail_response};

// ---------------------------------------------------------------------------
// Request and response types
// ---------------------------------------------------------------------------

/// Body of `POST /api/filters`. The page sends the conditions as an object;
/// the backend's own string form is accepted too.
#[derive(Deserialize)]
struct SaveFilterBody {
    name: String,
    #[serde(default)]
    filter_conditions: serde_json::Value,
}

impl SaveFilterBody {
    fn conditions(&self) -> Result<FilterConditions> {
        let conditions = match &self.filter_conditions {
            serde_json::Value::String(json) => FilterConditions::from_json(json)?,
            serde_json::Value::Null => FilterConditions::default(),
            value => serde_json::from_value(value.clone()).context("invalid filter conditions")?,
        };
        Ok(conditions)
    }
}

#[derive(Serialize)]
struct FiltersResponse {
    filters: Vec<crate::filter::SavedFilter>,
    rejected: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(bytes_response(body.into_bytes(), "application/json; charset=utf-8", 200))
}

/// Decode one percent-encoded path segment, such as the id in
/// `/api/detail/{id}`. Malformed input is kept as sent.
fn decode_segment(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Decoded `key=value` pairs of a URL's query string.
fn query_pairs(url: &str) -> Vec<(String, String)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn filter_from(pairs: &[(String, String)]) -> Result<FilterConditions> {
    let conditions =
        FilterConditions::from_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    Ok(conditions)
}

/// Dashboard state for a request: display settings from the query string,
/// falling back to the configured defaults.
fn state_from(ctx: &WebContext, pairs: &[(String, String)]) -> DashboardState {
    let display = &ctx.config.display;
    let lang = param(pairs, "lang").and_then(parse_lang).unwrap_or(display.lang);
    let theme = param(pairs, "theme").and_then(parse_theme).unwrap_or(display.theme);
    let chart = param(pairs, "chart").and_then(parse_chart).unwrap_or(display.default_chart);
    DashboardState::new(lang, theme, chart)
}

// ---------------------------------------------------------------------------
// API handlers
// ---------------------------------------------------------------------------

/// `GET /api/view?lang=&theme=&chart=&<filter pairs>`: the rendered
/// dashboard.
///
/// A failed record fetch is not an HTTP error; the view carries the error
/// notice and the previous (empty) filter, as the page shows it.
pub fn get_view(ctx: &WebContext, url: &str) -> Result<HttpResponse> {
    json_response(&render_view(ctx, url)?)
}

fn render_view(ctx: &WebContext, url: &str) -> Result<serde_json::Value> {
    let pairs = query_pairs(url);
    let now = Instant::now();
    let mut dashboard = Dashboard::new(state_from(ctx, &pairs));
    dashboard.mount();

    match filter_from(&pairs) {
        Ok(filter) => {
            if dashboard.fetch_with(ctx.source.as_ref(), filter, now) == FetchOutcome::Stale {
                anyhow::bail!("records request was superseded");
            }
        }
        Err(e) => {
            dashboard.notify(NoticeLevel::Error, e.to_string(), now);
        }
    }

    if ctx.remote {
        let ticket = dashboard.request_saved_filters();
        let result = ctx.client.list_filters().map(|list| list.filters);
        dashboard.complete_saved_filters(ticket, result, now);
    }

    let view = dashboard.view(now).context("dashboard is not mounted")?;
    serde_json::to_value(view).context("failed to serialize dashboard view")
}

/// `GET /api/detail/{id}?lang=&<filter pairs>`: one record's detail, with
/// the other records matching the filter as its history.
pub fn get_detail(ctx: &WebContext, id: &str, url: &str) -> Result<HttpResponse> {
    let id = decode_segment(id);
    match find_detail(ctx, &id, url)? {
        Some(detail) => json_response(&detail),
        None => Ok(detail_response(404, &format!("no score record with id '{id}'"))),
    }
}

fn find_detail(ctx: &WebContext, id: &str, url: &str) -> Result<Option<ScoreDetail>> {
    let pairs = query_pairs(url);
    let state = state_from(ctx, &pairs);
    let filter = filter_from(&pairs)?;

    let records = ctx
        .source
        .fetch_records(&filter)
        .with_context(|| format!("failed to fetch records from {}", ctx.source.describe()))?;

    Ok(detail_for(id, &records, state.lang.labels()))
}

/// `GET /api/filters`: saved filters, plus a message per entry whose
/// conditions could not be read.
pub fn get_filters(ctx: &WebContext) -> Result<HttpResponse> {
    let list = ctx.client.list_filters()?;
    json_response(&FiltersResponse {
        filters: list.filters,
        rejected: list.rejected.iter().map(ToString::to_string).collect(),
    })
}

/// `POST /api/filters`: save the current conditions under a name.
///
/// Expects JSON body: `{ "name": "high", "filter_conditions": { "min_total_score": 80 } }`
pub fn post_filter(ctx: &WebContext, body: &str) -> Result<HttpResponse> {
    let req: SaveFilterBody =
        serde_json::from_str(body).context("invalid JSON in save filter request")?;
    let conditions = req.conditions()?;
    ctx.client.save_filter(&req.name, &conditions)?;

    let labels = ctx.config.display.lang.labels();
    json_response(&serde_json::json!({
        "success": true,
        "message": labels.save_success,
    }))
}

/// `DELETE /api/filters/{id}`.
pub fn delete_filter(ctx: &WebContext, id: &str) -> Result<HttpResponse> {
    ctx.client.delete_filter(&decode_segment(id))?;
    json_response(&serde_json::json!({ "success": true }))
}

/// `GET /api/files`: uploaded files as the backend lists them.
pub fn get_files(ctx: &WebContext) -> Result<HttpResponse> {
    let files = ctx.client.list_files()?;
    json_response(&files)
}

/// `GET /api/config`: effective configuration and where records come from.
pub fn get_config(ctx: &WebContext) -> Result<HttpResponse> {
    json_response(&serde_json::json!({
        "config": ctx.config,
        "toml_text": toml::to_string_pretty(&ctx.config).unwrap_or_default(),
        "source": ctx.source.describe(),
        "config_exists": config::global_config_file().map(|p| p.exists()).unwrap_or(false),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorelensConfig;
    use crate::i18n::Lang;
    use crate::scores::source::LocalRecords;

    fn local_ctx() -> (tempfile::TempDir, WebContext) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(
            &path,
            r#"{"data": [
                {"id": 1, "created_at": "2025-01-01 09:00:00", "accuracy_score": 80,
                 "completeness_score": 70, "relevance_score": 90, "clarity_score": 60,
                 "total_score": 75, "feedback": "solid answer"},
                {"id": 2, "created_at": "2025-01-02 09:00:00", "accuracy_score": 40,
                 "completeness_score": 30, "relevance_score": 50, "clarity_score": 20,
                 "total_score": 35, "feedback": "missing steps"}
            ]}"#,
        )
        .unwrap();
        let source = LocalRecords::load(&path).unwrap();
        let ctx = WebContext::with_source(ScorelensConfig::default(), Box::new(source));
        (dir, ctx)
    }

    #[test]
    fn query_pairs_are_decoded() {
        let pairs = query_pairs("/api/view?keyword=step+by%20step&lang=en&empty=");
        assert_eq!(pairs[0], ("keyword".to_string(), "step by step".to_string()));
        assert_eq!(param(&pairs, "lang"), Some("en"));
        assert_eq!(param(&pairs, "empty"), Some(""));
        assert!(query_pairs("/api/view").is_empty());
    }

    #[test]
    fn query_pairs_handle_utf8_and_stray_percent() {
        let pairs = query_pairs("/api/view?keyword=%E8%AF%84%E5%88%86&note=100%&bad=a%2&x=%zz");
        assert_eq!(param(&pairs, "keyword"), Some("评分"));
        assert_eq!(param(&pairs, "note"), Some("100%"));
        assert_eq!(param(&pairs, "bad"), Some("a%2"));
        assert_eq!(param(&pairs, "x"), Some("%zz"));
    }

    #[test]
    fn path_segments_are_decoded() {
        assert_eq!(decode_segment("qa%201"), "qa 1");
        assert_eq!(decode_segment("a+b"), "a+b");
        assert_eq!(decode_segment("42"), "42");
    }

    #[test]
    fn form_filter_ignores_display_params() {
        let pairs = query_pairs("/api/view?lang=en&chart=trend&min_total_score=60&start_date=");
        let filter = filter_from(&pairs).unwrap();
        assert_eq!(filter.min_total_score, Some(60.0));
        assert_eq!(filter.start_date, None);
    }

    #[test]
    fn state_falls_back_to_config() {
        let (_dir, ctx) = local_ctx();
        let state = state_from(&ctx, &query_pairs("/api/view?lang=klingon"));
        assert_eq!(state.lang, Lang::Zh);
        let state = state_from(&ctx, &query_pairs("/api/view?lang=en&theme=dark"));
        assert_eq!(state.lang, Lang::En);
        assert_eq!(state.theme, crate::theme::Theme::Dark);
    }

    #[test]
    fn view_renders_filtered_records() {
        let (_dir, ctx) = local_ctx();
        let view = render_view(&ctx, "/api/view?lang=en&min_total_score=50").unwrap();
        assert_eq!(view["summary"]["count"], 1);
        assert_eq!(view["filter"]["min_total_score"], 50.0);
        assert_eq!(view["charts"]["radar"]["state"], "ready");
        assert_eq!(view["title"], "QA Pair Scoring System");
    }

    #[test]
    fn invalid_filter_becomes_a_notice() {
        let (_dir, ctx) = local_ctx();
        let view = render_view(&ctx, "/api/view?min_total_score=90&max_total_score=10").unwrap();
        assert_eq!(view["notices"][0]["level"], "error");
        assert_eq!(view["summary"]["count"], 0);
    }

    #[test]
    fn detail_lists_other_records_as_history() {
        let (_dir, ctx) = local_ctx();
        assert!(find_detail(&ctx, "99", "/api/detail/99").unwrap().is_none());

        let detail = find_detail(&ctx, "1", "/api/detail/1?lang=en").unwrap().unwrap();
        assert_eq!(detail.id, "1");
        assert_eq!(detail.history[0].id, "2");
        assert_eq!(detail.title, "Score Details");
    }

    #[test]
    fn save_body_accepts_object_or_string() {
        let body: SaveFilterBody =
            serde_json::from_str(r#"{"name": "a", "filter_conditions": {"min_total_score": "70"}}"#)
                .unwrap();
        assert_eq!(body.conditions().unwrap().min_total_score, Some(70.0));

        let body: SaveFilterBody = serde_json::from_str(
            r#"{"name": "b", "filter_conditions": "{\"keyword\":\"faq\"}"}"#,
        )
        .unwrap();
        assert_eq!(body.conditions().unwrap().keyword.as_deref(), Some("faq"));
    }
}
