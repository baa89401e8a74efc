/// Configuration system for scorelens.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::ScorelensConfig::default()`]
/// 2. **User global config**: `~/.scorelens/config.toml`
/// 3. **Project local config**: `.scorelens.toml` in the current working directory
/// 4. **Environment variables**: `SCORELENS_*` overrides (highest precedence)
///
/// Later layers override earlier ones key by key: a project file that only
/// sets `display.lang` keeps every other value from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use scorelens::config;
///
/// let cfg = config::load().config;
/// let client = scorelens::api::ApiClient::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::charts::parse_chart;
use crate::i18n::parse_lang;
use crate::theme::parse_theme;

pub use schema::{BackendConfig, DisplayConfig, LoggingConfig, ScorelensConfig, WebConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// A config file that was found but not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLayer {
    pub path: PathBuf,
    pub reason: String,
}

/// The resolved configuration, plus the layers dropped on the way.
///
/// Loading happens before the log subscriber exists (its level comes from
/// this config), so skipped layers are collected here and reported with
/// [`LoadedConfig::report`] once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: ScorelensConfig,
    pub skipped: Vec<SkippedLayer>,
}

impl LoadedConfig {
    /// Emit one warning per skipped layer.
    pub fn report(&self) {
        for layer in &self.skipped {
            warn!(path = %layer.path.display(), error = %layer.reason, "ignoring config file");
        }
    }
}

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the entry point for everything that needs configuration.
pub fn load() -> LoadedConfig {
    let mut loaded = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut loaded.config);
    loaded
}

/// Merge the given TOML files over the defaults, in order.
///
/// Missing files are skipped silently. A file that cannot be read, is
/// malformed, or whose values do not fit the schema is recorded in
/// [`LoadedConfig::skipped`]; the layers before it still apply.
pub fn load_layers(paths: &[Option<PathBuf>]) -> LoadedConfig {
    let mut skipped = Vec::new();
    let mut merged = match toml::Value::try_from(ScorelensConfig::default()) {
        Ok(value) => value,
        Err(_) => {
            return LoadedConfig {
                config: ScorelensConfig::default(),
                skipped,
            };
        }
    };

    for path in paths.iter().flatten() {
        let layer = match load_toml_file(path) {
            Ok(Some(layer)) => layer,
            Ok(None) => continue,
            Err(reason) => {
                skipped.push(SkippedLayer {
                    path: path.clone(),
                    reason,
                });
                continue;
            }
        };

        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        match candidate.clone().try_into::<ScorelensConfig>() {
            Ok(_) => merged = candidate,
            Err(e) => skipped.push(SkippedLayer {
                path: path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    LoadedConfig {
        config: merged.try_into().unwrap_or_default(),
        skipped,
    }
}

/// Read a TOML file as an untyped value.
///
/// `Ok(None)` when the file doesn't exist; `Err` with the reason when it
/// can't be read or isn't valid TOML.
fn load_toml_file(path: &Path) -> std::result::Result<Option<toml::Value>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map(Some).map_err(|e| e.to_string())
}

/// Recursively overlay `overlay` onto `base`. Tables merge key by key;
/// every other value replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.scorelens/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".scorelens").join("config.toml"))
}

/// Path to the project local config: `.scorelens.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".scorelens.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SCORELENS_BACKEND_URL`: backend base URL
/// - `SCORELENS_TIMEOUT_MS`: request timeout
/// - `SCORELENS_LANG`: `zh` or `en`
/// - `SCORELENS_THEME`: `light` or `dark`
/// - `SCORELENS_CHART`: chart shown first
/// - `SCORELENS_WEB_ADDR`: dashboard listen address
/// - `SCORELENS_LOG`: log filter directive
fn apply_env_overrides(config: &mut ScorelensConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from any key lookup. Unparseable values are ignored.
fn apply_overrides<F>(config: &mut ScorelensConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("SCORELENS_BACKEND_URL").filter(|v| !v.is_empty()) {
        config.backend.base_url = val;
    }
    if let Some(ms) = lookup("SCORELENS_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.backend.timeout_ms = ms;
    }
    if let Some(lang) = lookup("SCORELENS_LANG").and_then(|v| parse_lang(&v)) {
        config.display.lang = lang;
    }
    if let Some(theme) = lookup("SCORELENS_THEME").and_then(|v| parse_theme(&v)) {
        config.display.theme = theme;
    }
    if let Some(chart) = lookup("SCORELENS_CHART").and_then(|v| parse_chart(&v)) {
        config.display.default_chart = chart;
    }
    if let Some(val) = lookup("SCORELENS_WEB_ADDR").filter(|v| !v.is_empty()) {
        config.web.addr = val;
    }
    if let Some(val) = lookup("SCORELENS_LOG").filter(|v| !v.is_empty()) {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.scorelens/config.toml`.
///
/// Creates the `~/.scorelens/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    init_config_at(&path, force)?;
    Ok(path)
}

fn init_config_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, ScorelensConfig::default_toml()).context("failed to write config file")
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `display.lang`. The value is parsed according
/// to the type of the key's current value, and the result must still be a
/// valid config or nothing is written.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_config_value_at(&path, key, value)
}

fn set_config_value_at(path: &Path, key: &str, value: &str) -> Result<()> {
    // Start from defaults so keys absent from the file can still be set.
    let mut root =
        toml::Value::try_from(ScorelensConfig::default()).context("failed to serialize defaults")?;
    if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        let current: toml::Value =
            toml::from_str(&content).context("failed to parse config as TOML value")?;
        merge_values(&mut root, current);
    }

    set_toml_value(&mut root, key, value)?;

    root.clone()
        .try_into::<ScorelensConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    // Navigate to the parent table
    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // The type of the existing value decides how to parse the new one
    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("'{key}' is a section, not a value"),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load().config;
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::charts::ChartId;
    use crate::i18n::Lang;
    use crate::theme::Theme;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn layers_merge_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[backend]\nbase_url = \"http://data:9000\"\n[display]\ntheme = \"dark\"\n",
        );
        let project = write(&dir, "project.toml", "[display]\nlang = \"en\"\n");

        let config = load_layers(&[Some(global), Some(project)]).config;
        assert_eq!(config.backend.base_url, "http://data:9000");
        assert_eq!(config.display.theme, Theme::Dark);
        assert_eq!(config.display.lang, Lang::En);
        assert_eq!(config.backend.timeout_ms, 30_000);
    }

    #[test]
    fn invalid_layer_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(&dir, "global.toml", "[display]\ntheme = \"dark\"\n");
        let broken = write(&dir, "project.toml", "[display]\nlang = \"klingon\"\n");
        let missing = dir.path().join("missing.toml");

        let loaded = load_layers(&[Some(global), Some(broken.clone()), Some(missing), None]);
        assert_eq!(loaded.config.display.theme, Theme::Dark);
        assert_eq!(loaded.config.display.lang, Lang::Zh);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].path, broken);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn malformed_layer_is_reported_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(&dir, "project.toml", "[display\nlang = ");
        let loaded = load_layers(&[Some(broken)]);
        assert_eq!(loaded.config, ScorelensConfig::default());
        assert_eq!(loaded.skipped.len(), 1);

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || loaded.report());

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("ignoring config file"));
        assert!(output.contains("project.toml"));
    }

    #[test]
    fn env_overrides_win_and_ignore_garbage() {
        let mut config = ScorelensConfig::default();
        apply_overrides(&mut config, |key| match key {
            "SCORELENS_BACKEND_URL" => Some("http://api:1".to_string()),
            "SCORELENS_TIMEOUT_MS" => Some("soon".to_string()),
            "SCORELENS_LANG" => Some("en-US".to_string()),
            "SCORELENS_CHART" => Some("trend".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.base_url, "http://api:1");
        assert_eq!(config.backend.timeout_ms, 30_000);
        assert_eq!(config.display.lang, Lang::En);
        assert_eq!(config.display.default_chart, ChartId::Trend);
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_parses_by_existing_type() {
        let mut root = toml::Value::try_from(ScorelensConfig::default()).unwrap();
        set_toml_value(&mut root, "web.open_browser", "no").unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "500").unwrap();
        set_toml_value(&mut root, "display.lang", "en").unwrap();

        let config: ScorelensConfig = root.try_into().unwrap();
        assert!(!config.web.open_browser);
        assert_eq!(config.backend.timeout_ms, 500);
        assert_eq!(config.display.lang, Lang::En);
    }

    #[test]
    fn set_toml_value_rejects_bad_keys() {
        let mut root = toml::Value::try_from(ScorelensConfig::default()).unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.nope", "x").is_err());
        assert!(set_toml_value(&mut root, "backend", "x").is_err());
        assert!(set_toml_value(&mut root, "backend.timeout_ms", "fast").is_err());
    }

    #[test]
    fn set_config_value_writes_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        set_config_value_at(&path, "display.theme", "dark").unwrap();
        let config = load_layers(&[Some(path.clone())]).config;
        assert_eq!(config.display.theme, Theme::Dark);

        assert!(set_config_value_at(&path, "display.theme", "neon").is_err());
        let config = load_layers(&[Some(path)]).config;
        assert_eq!(config.display.theme, Theme::Dark);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_config_at(&path, false).unwrap();
        assert!(init_config_at(&path, false).is_err());
        init_config_at(&path, true).unwrap();

        assert_eq!(load_layers(&[Some(path)]).config, ScorelensConfig::default());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: ScorelensConfig = toml::from_str(&toml_str).unwrap();
    }
}
