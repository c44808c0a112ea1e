//! Book settings, loadable from TOML.

use std::path::Path;

use pagecurl_core::{Color, CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use crate::layout::ViewMode;

/// Page margins as fractions of the view rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margins {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Bend subdivisions per curl mesh.
    pub max_curl_splits: usize,
    /// Release animation length in milliseconds.
    pub animation_ms: u64,
    pub view_mode: ViewMode,
    pub margins: Margins,
    /// Whether the last page may be turned away, leaving an empty right side.
    pub allow_last_page_curl: bool,
    pub render_left_page: bool,
    /// Use reported touch pressure for the curl radius instead of a constant.
    pub touch_pressure: bool,
    /// Clear color, packed ARGB.
    pub background: u32,
    pub view_top: f64,
    pub view_bottom: f64,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            max_curl_splits: 10,
            animation_ms: 100,
            view_mode: ViewMode::One,
            margins: Margins::default(),
            allow_last_page_curl: true,
            render_left_page: true,
            touch_pressure: false,
            background: 0xFFFF_FFFF,
            view_top: 1.0,
            view_bottom: -1.0,
        }
    }
}

impl BookConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&contents)?;
        log::info!("Loaded book config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> CoreResult<Self> {
        let cfg: Self = toml::from_str(contents).map_err(|e| CoreError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.view_top <= self.view_bottom {
            return Err(CoreError::Config(format!(
                "view_top ({}) must be above view_bottom ({})",
                self.view_top, self.view_bottom
            )));
        }
        let m = &self.margins;
        let all = [m.left, m.top, m.right, m.bottom];
        if all.iter().any(|v| !(0.0..1.0).contains(v)) {
            return Err(CoreError::Config(format!("margins out of range: {m:?}")));
        }
        if m.left + m.right >= 1.0 || m.top + m.bottom >= 1.0 {
            return Err(CoreError::Config(format!("margins leave no page area: {m:?}")));
        }
        Ok(())
    }

    #[inline]
    pub fn background_color(&self) -> Color {
        Color(self.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_view() {
        let c = BookConfig::default();
        assert_eq!(c.max_curl_splits, 10);
        assert_eq!(c.animation_ms, 100);
        assert_eq!(c.view_mode, ViewMode::One);
        assert!(c.allow_last_page_curl);
        assert!(!c.touch_pressure);
        assert_eq!(c.background_color(), Color::WHITE);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = BookConfig::from_toml_str(
            r#"
            view_mode = "two"
            animation_ms = 250

            [margins]
            left = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(c.view_mode, ViewMode::Two);
        assert_eq!(c.animation_ms, 250);
        assert_eq!(c.margins, Margins::new(0.1, 0.0, 0.0, 0.0));
        assert_eq!(c.max_curl_splits, 10);
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = BookConfig::from_toml_str("view_top = -2.0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        let err = BookConfig::from_toml_str("view_mode = \"three\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        let err = BookConfig::from_toml_str("[margins]\nleft = 0.6\nright = 0.5").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let mut c = BookConfig::default();
        c.margins = Margins::new(0.05, 0.1, 0.05, 0.1);
        let text = c.to_toml_string().unwrap();
        assert_eq!(BookConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BookConfig::load_from_file("/nonexistent/book.toml").unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
