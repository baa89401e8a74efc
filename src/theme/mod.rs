//! Light and dark color palettes.

use serde::{Deserialize, Serialize};

/// Display theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn palette(self) -> &'static Palette {
        match self {
            Self::Light => &LIGHT,
            Self::Dark => &DARK,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Parse a theme name.
pub fn parse_theme(val: &str) -> Option<Theme> {
    match val.trim().to_ascii_lowercase().as_str() {
        "light" => Some(Theme::Light),
        "dark" => Some(Theme::Dark),
        _ => None,
    }
}

/// Colors for one theme. All colors are `#rrggbb` so an alpha byte can be
/// appended.
#[derive(Debug, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub grid: &'static str,
    /// Radar / scatter / heatmap series colors, one per dimension.
    pub chart_colors: [&'static str; 5],
    /// Trend / distribution series colors.
    pub stats_colors: [&'static str; 5],
}

impl Palette {
    /// Chart color for series `index`, cycling.
    pub fn chart_color(&self, index: usize) -> &'static str {
        self.chart_colors[index % self.chart_colors.len()]
    }
}

pub static LIGHT: Palette = Palette {
    background: "#ffffff",
    text: "#333333",
    border: "#dddddd",
    grid: "#eeeeee",
    chart_colors: ["#4a90e2", "#50e3c2", "#f5a623", "#d0021b", "#9013fe"],
    stats_colors: ["#4a90e2", "#28a745", "#ffc107", "#dc3545", "#6c757d"],
};

pub static DARK: Palette = Palette {
    background: "#2d2d2d",
    text: "#ffffff",
    border: "#3d3d3d",
    grid: "#3d3d3d",
    chart_colors: ["#4a90e2", "#50e3c2", "#f5a623", "#d0021b", "#9013fe"],
    stats_colors: ["#4a90e2", "#28a745", "#ffc107", "#dc3545", "#6c757d"],
};

/// Append a two-hex-digit alpha byte to a `#rrggbb` color.
pub fn with_alpha(color: &str, alpha: f64) -> String {
    let byte = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("{color}{byte:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_theme_handles_variants() {
        assert_eq!(parse_theme("light"), Some(Theme::Light));
        assert_eq!(parse_theme("DARK"), Some(Theme::Dark));
        assert_eq!(parse_theme("solarized"), None);
    }

    #[test]
    fn with_alpha_appends_hex_byte() {
        assert_eq!(with_alpha("#4a90e2", 1.0), "#4a90e2ff");
        assert_eq!(with_alpha("#4a90e2", 0.0), "#4a90e200");
        assert_eq!(with_alpha("#4a90e2", 0.5), "#4a90e280");
        assert_eq!(with_alpha("#4a90e2", 2.0), "#4a90e2ff");
    }

    #[test]
    fn chart_color_cycles() {
        assert_eq!(LIGHT.chart_color(0), LIGHT.chart_color(5));
    }
}
