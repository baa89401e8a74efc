/// Dashboard session tests.
///
/// Drives a mounted dashboard through interleaved requests, failures and
/// language/theme switches using an in-memory record source.
use std::time::{Duration, Instant};

use scorelens::api::ApiError;
use scorelens::charts::{ChartId, ChartView};
use scorelens::dashboard::{Dashboard, DashboardState, FetchOutcome, NoticeLevel, render};
use scorelens::filter::FilterConditions;
use scorelens::i18n::Lang;
use scorelens::scores::ScoreRecord;
use scorelens::scores::source::RecordSource;
use scorelens::theme::Theme;

fn record(id: &str, created_at: &str, total: f64) -> ScoreRecord {
    ScoreRecord {
        id: id.to_string(),
        created_at: created_at.to_string(),
        accuracy_score: total,
        completeness_score: total,
        relevance_score: total,
        clarity_score: total,
        total_score: total,
        feedback: None,
    }
}

/// Answers every fetch with the records that pass the filter.
struct Memory(Vec<ScoreRecord>);

impl RecordSource for Memory {
    fn fetch_records(&self, filter: &FilterConditions) -> Result<Vec<ScoreRecord>, ApiError> {
        filter.validate()?;
        Ok(self.0.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Always fails with a backend detail.
struct Down;

impl RecordSource for Down {
    fn fetch_records(&self, _filter: &FilterConditions) -> Result<Vec<ScoreRecord>, ApiError> {
        Err(ApiError::Backend {
            status: 503,
            detail: "评分服务暂不可用".to_string(),
        })
    }

    fn describe(&self) -> String {
        "down".to_string()
    }
}

fn sample() -> Memory {
    Memory(vec![
        record("1", "2025-01-01 09:00:00", 30.0),
        record("2", "2025-01-02 09:00:00", 70.0),
        record("3", "2025-01-03 09:00:00", 90.0),
    ])
}

fn mounted() -> Dashboard {
    let mut dashboard = Dashboard::new(DashboardState::new(Lang::En, Theme::Light, ChartId::Radar));
    dashboard.mount();
    dashboard
}

fn min_total(value: f64) -> FilterConditions {
    FilterConditions {
        min_total_score: Some(value),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Request ordering
// ---------------------------------------------------------------------------

#[test]
fn stale_response_never_overwrites_newer_state() {
    let source = sample();
    let now = Instant::now();
    let mut dashboard = mounted();

    let first = dashboard.request_records(min_total(0.0), now).unwrap();
    let second = dashboard.request_records(min_total(80.0), now).unwrap();

    let newer = source.fetch_records(second.filter());
    assert_eq!(dashboard.complete_records(second, newer, now), FetchOutcome::Applied);

    let older = source.fetch_records(first.filter());
    assert_eq!(dashboard.complete_records(first, older, now), FetchOutcome::Stale);

    assert_eq!(dashboard.state().records.len(), 1);
    assert_eq!(dashboard.state().filter, min_total(80.0));
}

#[test]
fn responses_after_unmount_are_ignored() {
    let source = sample();
    let now = Instant::now();
    let mut dashboard = mounted();

    let pending = dashboard.request_records(FilterConditions::default(), now).unwrap();
    dashboard.unmount();
    let result = source.fetch_records(pending.filter());
    assert_eq!(dashboard.complete_records(pending, result, now), FetchOutcome::Stale);
    assert!(dashboard.state().records.is_empty());
    assert!(!dashboard.is_mounted());
}

// ---------------------------------------------------------------------------
// Failures and notices
// ---------------------------------------------------------------------------

#[test]
fn failure_keeps_previous_filter_and_posts_detail() {
    let now = Instant::now();
    let mut dashboard = mounted();
    assert_eq!(dashboard.fetch_with(&sample(), min_total(50.0), now), FetchOutcome::Applied);

    assert_eq!(dashboard.fetch_with(&Down, min_total(95.0), now), FetchOutcome::Failed);
    assert_eq!(dashboard.state().filter, min_total(50.0));
    assert_eq!(dashboard.state().records.len(), 2);

    let view = dashboard.view(now).unwrap();
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].level, NoticeLevel::Error);
    assert_eq!(view.notices[0].message, "评分服务暂不可用");
}

#[test]
fn notices_expire_after_five_seconds() {
    let now = Instant::now();
    let mut dashboard = mounted();
    dashboard.fetch_with(&Down, FilterConditions::default(), now);

    assert_eq!(dashboard.view(now + Duration::from_secs(4)).unwrap().notices.len(), 1);
    assert!(dashboard.view(now + Duration::from_secs(6)).unwrap().notices.is_empty());
}

#[test]
fn invalid_filter_is_reported_without_a_request() {
    let now = Instant::now();
    let mut dashboard = mounted();
    let inverted = FilterConditions {
        min_total_score: Some(90.0),
        max_total_score: Some(10.0),
        ..Default::default()
    };
    assert!(dashboard.request_records(inverted, now).is_err());
    assert_eq!(dashboard.state().notices.active().len(), 1);
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn render_is_pure_and_follows_language_and_theme() {
    let now = Instant::now();
    let mut dashboard = mounted();
    dashboard.fetch_with(&sample(), FilterConditions::default(), now);

    let a = serde_json::to_value(render(dashboard.state())).unwrap();
    let b = serde_json::to_value(render(dashboard.state())).unwrap();
    assert_eq!(a, b);

    dashboard.set_lang(Lang::Zh);
    dashboard.set_theme(Theme::Dark);
    let view = dashboard.view(now).unwrap();
    assert_eq!(view.title, "问答对评分系统");
    assert_eq!(view.theme, Theme::Dark);
    match view.charts.get(ChartId::Radar) {
        Some(ChartView::Ready { title, .. }) => assert_ne!(title, "Radar Chart"),
        other => panic!("radar not ready: {other:?}"),
    }
}

#[test]
fn empty_result_renders_no_data() {
    let now = Instant::now();
    let mut dashboard = mounted();
    assert_eq!(dashboard.fetch_with(&sample(), min_total(99.0), now), FetchOutcome::Applied);

    let view = dashboard.view(now).unwrap();
    assert!(!view.has_data);
    assert_eq!(view.summary.count, 0);
    assert!(view.charts.iter().all(|(_, chart)| !chart.is_ready()));
}

#[test]
fn detail_uses_loaded_records() {
    let now = Instant::now();
    let mut dashboard = mounted();
    let Memory(mut records) = sample();
    records[1].feedback = Some("covers every step".to_string());
    records[2].feedback = Some("too terse".to_string());
    dashboard.fetch_with(&Memory(records), FilterConditions::default(), now);

    let detail = dashboard.detail("2").unwrap();
    assert_eq!(detail.current[4].value, "70.00");
    assert_eq!(detail.feedback.as_deref(), Some("covers every step"));
    let ids: Vec<&str> = detail.history.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, ["3", "1"]);
    assert_eq!(detail.history[0].feedback.as_deref(), Some("too terse"));
    assert!(detail.history[1].feedback.is_none());
    assert!(dashboard.detail("42").is_none());
}
