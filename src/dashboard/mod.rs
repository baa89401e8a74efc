//! Dashboard state, its pure rendering, and the session that drives it.
//!
//! [`render`] turns a [`DashboardState`] into a [`DashboardView`] and touches
//! nothing else, so switching language or theme is a state change followed
//! by another call. [`Dashboard`] wraps the state with the parts that are
//! not pure: request tickets, the clock for notices, and the mounted view.

pub mod detail;
pub mod notify;
pub mod requests;

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregate::{self, Summary};
use crate::api::ApiError;
use crate::charts::{ChartId, ChartSet, RenderContext, build_chart_set};
use crate::filter::{FilterConditions, SavedFilter};
use crate::i18n::{Labels, Lang};
use crate::scores::ScoreRecord;
use crate::scores::source::RecordSource;
use crate::theme::{Palette, Theme};

pub use detail::{ScoreDetail, build_detail, detail_for};
pub use notify::{NOTICE_TTL, Notice, NoticeLevel, Notices};
pub use requests::{RequestKind, RequestTracker, Ticket};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Everything the dashboard shows, and nothing derived from it.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub lang: Lang,
    pub theme: Theme,
    pub active_chart: ChartId,
    /// The filter the current `records` were fetched with.
    pub filter: FilterConditions,
    pub records: Vec<ScoreRecord>,
    pub saved_filters: Vec<SavedFilter>,
    pub notices: Notices,
}

impl DashboardState {
    pub fn new(lang: Lang, theme: Theme, active_chart: ChartId) -> Self {
        Self {
            lang,
            theme,
            active_chart,
            ..Default::default()
        }
    }

    pub fn context(&self) -> RenderContext {
        RenderContext::new(self.lang, self.theme)
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub id: ChartId,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatRow {
    pub label: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub title: String,
    pub count: usize,
    pub rows: Vec<StatRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFilterEntry {
    pub id: String,
    pub name: String,
}

/// The rendered dashboard. Owns its chart collection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub lang: Lang,
    pub theme: Theme,
    pub labels: &'static Labels,
    pub palette: &'static Palette,
    pub tabs: Vec<Tab>,
    pub active_chart: ChartId,
    pub charts: ChartSet,
    pub summary: SummaryView,
    pub filter: FilterConditions,
    pub saved_filters: Vec<SavedFilterEntry>,
    pub notices: Vec<Notice>,
    pub has_data: bool,
}

/// Render a state into a view. Pure: same state, same view.
pub fn render(state: &DashboardState) -> DashboardView {
    let ctx = state.context();
    let labels = ctx.labels();
    let palette = ctx.palette();

    let tabs = ChartId::ALL
        .iter()
        .map(|&id| Tab {
            id,
            title: id.title(labels).to_string(),
            active: id == state.active_chart,
        })
        .collect();

    let aggregates = aggregate::aggregate(&state.records);
    let summary = summary_view(&aggregates.summary, labels, palette);

    DashboardView {
        title: labels.page_title.to_string(),
        lang: state.lang,
        theme: state.theme,
        labels,
        palette,
        tabs,
        active_chart: state.active_chart,
        charts: build_chart_set(&state.records, &aggregates, ctx),
        summary,
        filter: state.filter.clone(),
        saved_filters: state
            .saved_filters
            .iter()
            .map(|f| SavedFilterEntry {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect(),
        notices: state.notices.active().to_vec(),
        has_data: !state.records.is_empty(),
    }
}

fn summary_view(summary: &Summary, labels: &Labels, palette: &Palette) -> SummaryView {
    SummaryView {
        title: labels.stats_title.to_string(),
        count: summary.count,
        rows: summary
            .dimensions
            .iter()
            .enumerate()
            .map(|(i, stats)| StatRow {
                label: labels.dimension(stats.dimension).to_string(),
                mean: stats.mean,
                min: stats.min,
                max: stats.max,
                color: palette.stats_colors[i % palette.stats_colors.len()],
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What happened to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was current and is now the dashboard's state.
    Applied,
    /// A newer request of the same kind was issued; the response was dropped.
    Stale,
    /// The request failed; state is unchanged and an error notice was posted.
    Failed,
}

/// A record fetch that has been issued but not completed.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    ticket: Ticket,
    filter: FilterConditions,
}

impl PendingFetch {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn filter(&self) -> &FilterConditions {
        &self.filter
    }
}

/// A dashboard instance: state plus request ordering plus the mounted view.
#[derive(Debug, Default)]
pub struct Dashboard {
    state: DashboardState,
    requests: RequestTracker,
    view: Option<DashboardView>,
}

impl Dashboard {
    pub fn new(state: DashboardState) -> Self {
        Self {
            state,
            requests: RequestTracker::default(),
            view: None,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    // -- Lifecycle ---------------------------------------------------------

    /// Build the view (and its charts).
    pub fn mount(&mut self) -> &DashboardView {
        self.view.insert(render(&self.state))
    }

    /// Drop the view and its charts. Responses to requests issued before
    /// this point are ignored.
    pub fn unmount(&mut self) {
        self.view = None;
        self.requests.cancel_all();
        self.state.notices.clear();
    }

    pub fn is_mounted(&self) -> bool {
        self.view.is_some()
    }

    /// The current view with expired notices pruned, or `None` when
    /// unmounted.
    pub fn view(&mut self, now: Instant) -> Option<&DashboardView> {
        if self.state.notices.prune(now) > 0 {
            self.rerender();
        }
        self.view.as_ref()
    }

    fn rerender(&mut self) {
        if self.view.is_some() {
            self.view = Some(render(&self.state));
        }
    }

    // -- Display state -----------------------------------------------------

    pub fn set_lang(&mut self, lang: Lang) {
        self.state.lang = lang;
        self.rerender();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.rerender();
    }

    pub fn select_chart(&mut self, chart: ChartId) {
        self.state.active_chart = chart;
        self.rerender();
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>, now: Instant) -> u64 {
        let id = self.state.notices.push(level, message, now);
        self.rerender();
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        if self.state.notices.dismiss(id) {
            self.rerender();
        }
    }

    // -- Records -----------------------------------------------------------

    /// Start a record fetch. The filter is validated first; an invalid one
    /// posts an error notice and nothing is issued.
    pub fn request_records(
        &mut self,
        filter: FilterConditions,
        now: Instant,
    ) -> Result<PendingFetch, ApiError> {
        if let Err(e) = filter.validate() {
            self.notify(NoticeLevel::Error, e.to_string(), now);
            return Err(e.into());
        }
        let ticket = self.requests.issue(RequestKind::Records);
        debug!(seq = ticket.seq(), "records requested");
        Ok(PendingFetch { ticket, filter })
    }

    /// Apply a record response, unless a newer fetch has been issued since.
    ///
    /// The filter is committed together with the records and only on
    /// success, so a failed fetch leaves the previous filter in place.
    pub fn complete_records(
        &mut self,
        pending: PendingFetch,
        result: Result<Vec<ScoreRecord>, ApiError>,
        now: Instant,
    ) -> FetchOutcome {
        if !self.requests.is_current(pending.ticket) {
            warn!(seq = pending.ticket.seq(), "discarding stale records response");
            return FetchOutcome::Stale;
        }

        match result {
            Ok(records) => {
                debug!(count = records.len(), "records applied");
                self.state.records = records;
                self.state.filter = pending.filter;
                self.rerender();
                FetchOutcome::Applied
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, e.to_string(), now);
                FetchOutcome::Failed
            }
        }
    }

    /// Request, fetch and complete in one step.
    pub fn fetch_with(
        &mut self,
        source: &dyn RecordSource,
        filter: FilterConditions,
        now: Instant,
    ) -> FetchOutcome {
        let Ok(pending) = self.request_records(filter, now) else {
            return FetchOutcome::Failed;
        };
        let result = source.fetch_records(pending.filter());
        self.complete_records(pending, result, now)
    }

    /// Refetch with the empty filter.
    pub fn reset_filter(&mut self, source: &dyn RecordSource, now: Instant) -> FetchOutcome {
        self.fetch_with(source, FilterConditions::default(), now)
    }

    /// Apply a saved filter and confirm with a notice.
    pub fn load_saved(
        &mut self,
        source: &dyn RecordSource,
        saved: &SavedFilter,
        now: Instant,
    ) -> FetchOutcome {
        let outcome = self.fetch_with(source, saved.conditions.clone(), now);
        if outcome == FetchOutcome::Applied {
            let message = self.state.context().labels().load_success;
            self.notify(NoticeLevel::Success, message, now);
        }
        outcome
    }

    // -- Saved filters -----------------------------------------------------

    pub fn request_saved_filters(&mut self) -> Ticket {
        self.requests.issue(RequestKind::SavedFilters)
    }

    pub fn complete_saved_filters(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<SavedFilter>, ApiError>,
        now: Instant,
    ) -> FetchOutcome {
        if !self.requests.is_current(ticket) {
            warn!(seq = ticket.seq(), "discarding stale saved-filter response");
            return FetchOutcome::Stale;
        }
        match result {
            Ok(filters) => {
                self.state.saved_filters = filters;
                self.rerender();
                FetchOutcome::Applied
            }
            Err(e) => {
                let labels = self.state.context().labels();
                self.notify(NoticeLevel::Error, format!("{}: {e}", labels.load_failed), now);
                FetchOutcome::Failed
            }
        }
    }

    // -- Detail ------------------------------------------------------------

    /// Detail view for a loaded record.
    pub fn detail(&self, id: &str) -> Option<ScoreDetail> {
        detail_for(id, &self.state.records, self.state.context().labels())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
