/// Configuration schema and defaults.
///
/// Sections: `[backend]`, `[display]`, `[web]` and `[logging]`. Every field
/// has a built-in default, so a config file only needs the keys it changes.
use serde::{Deserialize, Serialize};

use crate::charts::ChartId;
use crate::i18n::Lang;
use crate::theme::Theme;

/// Default backend endpoint.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default listen address for `scorelens web`.
pub const DEFAULT_WEB_ADDR: &str = "127.0.0.1:9747";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Maps directly to `~/.scorelens/config.toml` and `.scorelens.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorelensConfig {
    pub backend: BackendConfig,
    pub display: DisplayConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the dataset backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub lang: Lang,
    pub theme: Theme,
    /// Chart selected when the dashboard opens.
    pub default_chart: ChartId,
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_WEB_ADDR.to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when neither `SCORELENS_LOG` nor
    /// `RUST_LOG` is set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Annotated default file
// ---------------------------------------------------------------------------

impl ScorelensConfig {
    /// The annotated file written by `scorelens config init`.
    pub fn default_toml() -> String {
        r#"# scorelens configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (SCORELENS_*)
#   2. Project config (.scorelens.toml in current directory)
#   3. User global config (~/.scorelens/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://127.0.0.1:8000"
timeout_ms = 30000

[display]
lang = "zh"              # zh | en
theme = "light"          # light | dark
default_chart = "radar"  # radar | scatter | heatmap | trend | distribution

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
level = "warn"           # overridden by SCORELENS_LOG or RUST_LOG
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
