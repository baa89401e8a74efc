//! scorelens: quality-score dashboard core for a QA-dataset pipeline.
//!
//! Aggregates per-record quality scores into trend, distribution and heatmap
//! series, adapts them into Chart.js configurations, manages filter
//! conditions, and talks to the dataset backend's REST API.

pub mod aggregate;
pub mod api;
pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod i18n;
pub mod logging;
pub mod scores;
pub mod theme;
pub mod web;
