//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Stock
//! defaults are overridden by the root `config.toml`, which is in turn
//! overridden by a project's own `config.toml`:
//!
//! ```text
//! content/
//! ├── config.toml                 # Root config (overrides stock defaults)
//! ├── 010-Brand-Identity/
//! │   ├── config.toml             # Project config (overrides root)
//! │   └── ...
//! └── 020-Motion/
//!     └── ...
//! ```
//!
//! Only `[gallery]` is meaningful at project level; everything else is
//! site-wide and read from the root.
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! title = "Portfolio"
//! description = ""
//! author = ""
//! base_url = ""             # Absolute URL; enables canonical links and sitemap.xml
//! language = "en"
//!
//! [gallery]
//! eager_count = 2           # Items loaded on mount; the rest wait for visibility
//! root_margin_px = 50       # Start loading this far before the viewport
//! threshold = 0.1           # Intersection ratio that counts as visible
//! columns = 3
//!
//! [[gallery.breakpoints]]
//! max_width = 1024
//! columns = 2
//!
//! [[gallery.breakpoints]]
//! max_width = 640
//! columns = 1
//!
//! [theme]
//! grid_gap = "1.5rem"
//! content_width = "72rem"
//! fade_ms = 400
//!
//! [theme.page_padding]
//! size = "4vw"
//! min = "1rem"
//! max = "3rem"
//!
//! [colors.light] / [colors.dark]
//! background, text, text_muted, border, link, link_hover
//!
//! [processing]
//! max_processes = 4         # Dimension-probe workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::media::{Breakpoint, GridLayout, ObserverOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity and SEO metadata.
    pub site: SiteMeta,
    /// Lazy-loading and grid settings.
    pub gallery: GalleryConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Layout settings.
    pub theme: ThemeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gallery = &self.gallery;
        if !(0.0..=1.0).contains(&gallery.threshold) {
            return Err(ConfigError::Validation(
                "gallery.threshold must be between 0 and 1".into(),
            ));
        }
        if gallery.columns == 0 {
            return Err(ConfigError::Validation(
                "gallery.columns must be non-zero".into(),
            ));
        }
        if let Some(bp) = gallery
            .breakpoints
            .iter()
            .find(|bp| bp.columns == 0 || bp.max_width == 0)
        {
            return Err(ConfigError::Validation(format!(
                "gallery.breakpoints entry at {}px must have non-zero width and columns",
                bp.max_width
            )));
        }
        let base = &self.site.base_url;
        if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".into(),
            ));
        }
        Ok(())
    }
}

/// Site identity used in `<head>` metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub author: String,
    /// Absolute site URL. Empty disables canonical links and the sitemap.
    pub base_url: String,
    pub language: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            author: String::new(),
            base_url: String::new(),
            language: "en".to_string(),
        }
    }
}

impl SiteMeta {
    /// Absolute URL for a site-relative path, if a base URL is configured.
    pub fn absolute_url(&self, path: &str) -> Option<String> {
        if self.base_url.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

/// Gallery loading and layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Number of leading items loaded on mount, bypassing visibility.
    pub eager_count: usize,
    /// Proximity margin in pixels for the visibility detector.
    pub root_margin_px: u32,
    /// Intersection ratio that counts as visible.
    pub threshold: f32,
    /// Default grid column count.
    pub columns: u32,
    /// Narrower column counts at or below a viewport width.
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        let layout = GridLayout::default();
        let options = ObserverOptions::default();
        Self {
            eager_count: 2,
            root_margin_px: options.root_margin_px,
            threshold: options.threshold,
            columns: layout.columns,
            breakpoints: layout.breakpoints,
        }
    }
}

impl GalleryConfig {
    pub fn observer_options(&self) -> ObserverOptions {
        ObserverOptions {
            root_margin_px: self.root_margin_px,
            threshold: self.threshold,
        }
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout {
            columns: self.columns,
            breakpoints: self.breakpoints.clone(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers reading media dimensions.
    /// When absent, defaults to the number of CPU cores.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// A responsive CSS size expressed as `clamp(min, size, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClampSize {
    /// Preferred/fluid value, typically viewport-relative (e.g. `"4vw"`).
    pub size: String,
    pub min: String,
    pub max: String,
}

impl ClampSize {
    pub fn to_css(&self) -> String {
        format!("clamp({}, {}, {})", self.min, self.size, self.max)
    }
}

/// Layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Padding around page content.
    pub page_padding: ClampSize,
    /// Gap between gallery and project-grid cells (CSS value).
    pub grid_gap: String,
    /// Maximum width of the content column (CSS value).
    pub content_width: String,
    /// Duration of the fade-in on load, in milliseconds.
    pub fade_ms: u32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            page_padding: ClampSize {
                size: "4vw".to_string(),
                min: "1rem".to_string(),
                max: "3rem".to_string(),
            },
            grid_gap: "1.5rem".to_string(),
            content_width: "72rem".to_string(),
            fade_ms: 400,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Nav, captions, project metadata.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#fbfbf9".to_string(),
            text: "#1a1a1a".to_string(),
            text_muted: "#6b6b6b".to_string(),
            border: "#e4e4e0".to_string(),
            link: "#1a1a1a".to_string(),
            link_hover: "#5b3df5".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111111".to_string(),
            text: "#ededed".to_string(),
            text_muted: "#9a9a9a".to_string(),
            border: "#2a2a2a".to_string(),
            link: "#ededed".to_string(),
            link_hover: "#a996ff".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values, arrays included, replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the root config: user values on top of stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Resolve a project's gallery settings on top of the root config.
pub fn load_project_gallery(
    root_config: &SiteConfig,
    project_dir: &Path,
) -> Result<GalleryConfig, ConfigError> {
    let Some(overlay) = load_raw_config(project_dir)? else {
        return Ok(root_config.gallery.clone());
    };
    if let Some(table) = overlay.as_table()
        && let Some(key) = table.keys().find(|k| k.as_str() != "gallery")
    {
        return Err(ConfigError::Validation(format!(
            "{}: only [gallery] may be set per project, found `{}`",
            project_dir.display(),
            key
        )));
    }
    let base = toml::Value::try_from(root_config)?;
    Ok(resolve_config(base, Some(overlay))?.gallery)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio configuration
# ===================
# All settings are optional. Values shown below are the defaults.
#
# content/config.toml              -> site-wide (overrides stock defaults)
# content/010-Project/config.toml  -> per project, [gallery] only
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity and SEO
# ---------------------------------------------------------------------------
[site]
title = "Portfolio"
description = ""
author = ""
# Absolute URL of the published site, e.g. "https://example.com".
# Enables canonical links, absolute og:image URLs and sitemap.xml.
base_url = ""
language = "en"

# ---------------------------------------------------------------------------
# Galleries
# ---------------------------------------------------------------------------
[gallery]
# Leading items that load immediately (above the fold).
# Everything after them waits until it scrolls near the viewport.
eager_count = 2

# Begin loading this many pixels before an item enters the viewport.
root_margin_px = 50

# Fraction of an item that must be visible (0.0 - 1.0).
threshold = 0.1

# Grid columns on wide screens.
columns = 3

# Narrower column counts, applied at or below max_width (px).
[[gallery.breakpoints]]
max_width = 1024
columns = 2

[[gallery.breakpoints]]
max_width = 640
columns = 1

# ---------------------------------------------------------------------------
# Theme / layout
# ---------------------------------------------------------------------------
[theme]
# Gap between grid cells (CSS value).
grid_gap = "1.5rem"

# Maximum width of the content column (CSS value).
content_width = "72rem"

# Fade-in duration for loaded media, in milliseconds.
fade_ms = 400

# Padding around page content, as CSS clamp(min, size, max).
[theme.page_padding]
size = "4vw"
min = "1rem"
max = "3rem"

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#fbfbf9"
text = "#1a1a1a"
text_muted = "#6b6b6b"
border = "#e4e4e0"
link = "#1a1a1a"
link_hover = "#5b3df5"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111111"
text = "#ededed"
text_muted = "#9a9a9a"
border = "#2a2a2a"
link = "#ededed"
link_hover = "#a996ff"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Parallel workers for reading media dimensions.
# Omit to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

impl ColorScheme {
    /// `--color-*` custom property names paired with this scheme's values.
    fn properties(&self) -> [(&'static str, &str); 6] {
        [
            ("bg", self.background.as_str()),
            ("text", self.text.as_str()),
            ("text-muted", self.text_muted.as_str()),
            ("border", self.border.as_str()),
            ("link", self.link.as_str()),
            ("link-hover", self.link_hover.as_str()),
        ]
    }

    fn css_block(&self, indent: &str) -> String {
        self.properties()
            .into_iter()
            .map(|(name, value)| format!("{indent}--color-{name}: {value};\n"))
            .collect()
    }
}

/// Light scheme on `:root`, dark scheme under `prefers-color-scheme: dark`.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        ":root {{\n{}}}\n\n@media (prefers-color-scheme: dark) {{\n    :root {{\n{}    }}\n}}",
        colors.light.css_block("    "),
        colors.dark.css_block("        "),
    )
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --page-padding: {page_padding};
    --grid-gap: {grid_gap};
    --content-width: {content_width};
    --fade-duration: {fade_ms}ms;
}}"#,
        page_padding = theme.page_padding.to_css(),
        grid_gap = theme.grid_gap,
        content_width = theme.content_width,
        fade_ms = theme.fade_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_gallery_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.gallery.eager_count, 2);
        assert_eq!(config.gallery.root_margin_px, 50);
        assert_eq!(config.gallery.columns, 3);
        assert_eq!(config.gallery.breakpoints.len(), 2);
    }

    #[test]
    fn default_config_has_site_meta() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "Portfolio");
        assert_eq!(config.site.language, "en");
        assert!(config.site.base_url.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, "#1a1a1a");
        assert_eq!(config.gallery.eager_count, 2);
    }

    #[test]
    fn parse_gallery_breakpoints() {
        let toml = r#"
[gallery]
eager_count = 4
columns = 4

[[gallery.breakpoints]]
max_width = 800
columns = 1
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.gallery.eager_count, 4);
        let layout = config.gallery.layout();
        assert_eq!(layout.columns_for(1200), 4);
        assert_eq!(layout.columns_for(700), 1);
    }

    #[test]
    fn observer_options_from_gallery() {
        let mut gallery = GalleryConfig::default();
        gallery.root_margin_px = 200;
        gallery.threshold = 0.5;
        let options = gallery.observer_options();
        assert_eq!(options.root_margin_px, 200);
        assert_eq!(options.threshold, 0.5);
    }

    #[test]
    fn absolute_url_requires_base() {
        let mut site = SiteMeta::default();
        assert_eq!(site.absolute_url("about.html"), None);
        site.base_url = "https://example.com/".to_string();
        assert_eq!(
            site.absolute_url("/about.html").as_deref(),
            Some("https://example.com/about.html")
        );
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    #[test]
    fn generate_color_css_sets_every_property_in_both_schemes() {
        let css = generate_color_css(&ColorConfig::default());
        for name in ["bg", "text", "text-muted", "border", "link", "link-hover"] {
            assert_eq!(css.matches(&format!("--color-{name}:")).count(), 2, "{name}");
        }
        assert!(css.ends_with("    }\n}"));
    }

    #[test]
    fn generate_theme_css_includes_variables() {
        let css = generate_theme_css(&ThemeConfig::default());
        assert!(css.contains("--page-padding: clamp(1rem, 4vw, 3rem)"));
        assert!(css.contains("--grid-gap: 1.5rem"));
        assert!(css.contains("--fade-duration: 400ms"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Portfolio");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
title = "Ada Studio"
base_url = "https://ada.studio"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Ada Studio");
        assert_eq!(config.site.base_url, "https://ada.studio");
        assert_eq!(config.gallery.columns, 3);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[gallery]
eagre_count = 3
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[analytics]\nid = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_threshold_range() {
        let mut config = SiteConfig::default();
        config.gallery.threshold = 1.0;
        assert!(config.validate().is_ok());
        config.gallery.threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn validate_zero_columns() {
        let mut config = SiteConfig::default();
        config.gallery.columns = 0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.gallery.breakpoints[0].columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_base_url_scheme() {
        let mut config = SiteConfig::default();
        config.site.base_url = "example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[gallery]\nthreshold = 2.0\n",
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[gallery]\neager_count = 2\ncolumns = 3\n").unwrap();
        let overlay: toml::Value = toml::from_str("[gallery]\neager_count = 6\n").unwrap();
        let merged = merge_toml(base, overlay);
        let gallery = merged.get("gallery").unwrap();
        assert_eq!(gallery.get("eager_count").unwrap().as_integer(), Some(6));
        assert_eq!(gallery.get("columns").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base = stock_defaults_value();
        let overlay: toml::Value =
            toml::from_str("[[gallery.breakpoints]]\nmax_width = 500\ncolumns = 1\n").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.gallery.breakpoints.len(), 1);
        assert_eq!(config.gallery.breakpoints[0].max_width, 500);
    }

    // =========================================================================
    // Project config tests
    // =========================================================================

    #[test]
    fn project_gallery_inherits_root() {
        let tmp = TempDir::new().unwrap();
        let mut root = SiteConfig::default();
        root.gallery.eager_count = 5;
        let gallery = load_project_gallery(&root, tmp.path()).unwrap();
        assert_eq!(gallery.eager_count, 5);
    }

    #[test]
    fn project_gallery_overrides_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[gallery]\neager_count = 1\n").unwrap();
        let mut root = SiteConfig::default();
        root.gallery.columns = 4;
        let gallery = load_project_gallery(&root, tmp.path()).unwrap();
        assert_eq!(gallery.eager_count, 1);
        assert_eq!(gallery.columns, 4);
    }

    #[test]
    fn project_config_rejects_site_sections() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[site]\ntitle = \"x\"\n").unwrap();
        let result = load_project_gallery(&SiteConfig::default(), tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.gallery, defaults.gallery);
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.colors.light.background, defaults.colors.light.background);
        assert_eq!(config.colors.dark.link_hover, defaults.colors.dark.link_hover);
        assert_eq!(config.theme.fade_ms, defaults.theme.fade_ms);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["site", "gallery", "colors", "theme", "processing"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
