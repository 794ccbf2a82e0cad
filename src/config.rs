//! Engine configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Stock
//! defaults are overridden by the `config.toml` in the manuscript root; in
//! batch mode each manuscript carries its own.
//!
//! ## Config File Location
//!
//! ```text
//! manuscript/
//! ├── config.toml        # Overrides stock defaults
//! ├── front/
//! ├── main/
//! └── back/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [metadata]
//! title = ""                    # Falls back to the manuscript directory name
//! author = ""
//! # subtitle = ""
//! # isbn = ""
//!
//! [book]
//! language = "en"               # Localized section names and TOC title
//! trim_size = "6x9"             # Named size or any "WxH" in inches
//! include_toc = true
//! toc_depth = 1                 # 0-3
//! numbered_headings = true
//! chapter_label_format = "number"  # "number", "text" or "none"
//! use_auto_chapter_numbers = false
//! page_numbers = true
//!
//! [bibliography]
//! threshold = 0.5               # Detection score in [0, 1]
//! url_wrap_length = 30          # Wrap URLs longer than this in bibliographies
//!
//! [urls]
//! wrap_document = false         # Also wrap long URLs everywhere else
//! document_wrap_length = 50
//!
//! [geometry]
//! enforce_margin_floor = false  # Reject exports whose margins are too small
//! # inside_margin = 0.5          # Inches; overrides computed margins
//! # outside_margin = 0.6
//! # top_margin = 0.75
//! # bottom_margin = 0.75
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [book]
//! trim_size = "5x8"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::bibliography::{DEFAULT_DOCUMENT_WRAP_LENGTH, DEFAULT_THRESHOLD, DEFAULT_WRAP_LENGTH};
use crate::layout::MarginOverrides;
use crate::types::{BookMetadata, BookOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Deepest heading level a table of contents may list.
pub const MAX_TOC_DEPTH: u8 = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Title, author and identifiers of the book.
    pub metadata: BookMetadata,
    /// Layout and numbering options.
    pub book: BookOptions,
    /// Bibliography detection and URL wrapping inside bibliographies.
    pub bibliography: BibliographyConfig,
    /// Document-wide URL wrapping.
    pub urls: UrlConfig,
    /// Margin overrides and floor enforcement.
    pub geometry: GeometryConfig,
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.bibliography.threshold) {
            return Err(ConfigError::Validation(
                "bibliography.threshold must be between 0 and 1".into(),
            ));
        }
        if self.bibliography.url_wrap_length == 0 {
            return Err(ConfigError::Validation(
                "bibliography.url_wrap_length must be greater than 0".into(),
            ));
        }
        if self.urls.document_wrap_length == 0 {
            return Err(ConfigError::Validation(
                "urls.document_wrap_length must be greater than 0".into(),
            ));
        }
        if self.book.toc_depth > MAX_TOC_DEPTH {
            return Err(ConfigError::Validation(format!(
                "book.toc_depth must be 0-{}",
                MAX_TOC_DEPTH
            )));
        }
        // Names resolve against the trim table the export is given.
        if self.book.trim_size.trim().is_empty() {
            return Err(ConfigError::Validation("book.trim_size must not be empty".into()));
        }
        let margins = [
            ("inside_margin", self.geometry.inside_margin),
            ("outside_margin", self.geometry.outside_margin),
            ("top_margin", self.geometry.top_margin),
            ("bottom_margin", self.geometry.bottom_margin),
        ];
        for (name, value) in margins {
            if let Some(v) = value
                && (v <= 0.0 || v.is_nan())
            {
                return Err(ConfigError::Validation(format!(
                    "geometry.{} must be greater than 0",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Bibliography detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BibliographyConfig {
    /// Minimum score for a segment to count as a bibliography.
    pub threshold: f64,
    /// URLs longer than this (in characters) get break opportunities.
    pub url_wrap_length: usize,
}

impl Default for BibliographyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            url_wrap_length: DEFAULT_WRAP_LENGTH,
        }
    }
}

/// Document-wide URL wrapping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlConfig {
    /// Run the wrapping pass over the whole document, not just bibliographies.
    pub wrap_document: bool,
    pub document_wrap_length: usize,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            wrap_document: false,
            document_wrap_length: DEFAULT_DOCUMENT_WRAP_LENGTH,
        }
    }
}

/// Page geometry settings.
///
/// Margins are in inches. When absent, they are computed from the trim size
/// and page estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Fail the export when a margin is below the print-binding floor.
    /// When false the violation is logged and reported as a warning.
    pub enforce_margin_floor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outside_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_margin: Option<f64>,
}

impl GeometryConfig {
    pub fn overrides(&self) -> MarginOverrides {
        MarginOverrides {
            inside_margin: self.inside_margin,
            outside_margin: self.outside_margin,
            top_margin: self.top_margin,
            bottom_margin: self.bottom_margin,
        }
    }
}

/// Resolve the effective thread count for batch exports.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(jobs: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    jobs.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(EngineConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
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
/// Returns `Err` if the file exists but contains invalid TOML.
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
) -> Result<EngineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the manuscript root, next to front/, main/ and back/.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Book metadata
# ---------------------------------------------------------------------------
[metadata]
# Book title. Empty means: use the manuscript directory name.
title = ""
author = ""
# subtitle = ""
# isbn = ""

# ---------------------------------------------------------------------------
# Book options
# ---------------------------------------------------------------------------
[book]
# Language code for localized section names and the table-of-contents title.
# Built in: en, de, fr, es, it, pt, nl. Others fall back to English.
language = "en"

# Trim size: a named size (5x8, 5.5x8.5, 6x9, 7x10, 8.5x11, ...)
# or any "WxH" in inches.
trim_size = "6x9"

# Table of contents and the deepest heading level it lists (0-3).
include_toc = true
toc_depth = 1

# Number main-matter chapters. Front and back matter are never numbered.
numbered_headings = true

# Chapter labels: "number" (Chapter 1), "text" (Chapter One) or "none".
chapter_label_format = "number"

# Let the typesetter number chapters instead of writing numbers into headings.
use_auto_chapter_numbers = false

# Reserve room below the text block for page numbers.
page_numbers = true

# ---------------------------------------------------------------------------
# Bibliography detection
# ---------------------------------------------------------------------------
[bibliography]
# Score (0-1) at which a section counts as a bibliography. Sections titled
# "References", "Bibliography" etc. always count.
threshold = 0.5

# URLs longer than this many characters get invisible break points.
url_wrap_length = 30

# ---------------------------------------------------------------------------
# Document-wide URL wrapping
# ---------------------------------------------------------------------------
[urls]
wrap_document = false
document_wrap_length = 50

# ---------------------------------------------------------------------------
# Page geometry
# ---------------------------------------------------------------------------
[geometry]
# Reject the export when a margin falls below the print-binding minimum.
# When false, the violation is only reported as a warning.
enforce_margin_floor = false

# Margin overrides in inches. Omit to compute from trim size and page count.
# inside_margin = 0.5
# outside_margin = 0.6
# top_margin = 0.75
# bottom_margin = 0.75
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChapterLabelFormat;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_book_options() {
        let config = EngineConfig::default();
        assert_eq!(config.book.language, "en");
        assert_eq!(config.book.trim_size, "6x9");
        assert!(config.book.include_toc);
        assert_eq!(config.book.toc_depth, 1);
        assert_eq!(config.book.chapter_label_format, ChapterLabelFormat::Number);
    }

    #[test]
    fn default_config_has_bibliography_settings() {
        let config = EngineConfig::default();
        assert_eq!(config.bibliography.threshold, 0.5);
        assert_eq!(config.bibliography.url_wrap_length, 30);
        assert!(!config.urls.wrap_document);
        assert_eq!(config.urls.document_wrap_length, 50);
        assert!(!config.geometry.enforce_margin_floor);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[book]
trim_size = "5x8"
"#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        // Overridden value
        assert_eq!(config.book.trim_size, "5x8");
        // Default values preserved
        assert_eq!(config.book.language, "en");
        assert_eq!(config.bibliography.threshold, 0.5);
    }

    #[test]
    fn parse_chapter_label_format() {
        let toml = r#"
[book]
chapter_label_format = "text"
"#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.book.chapter_label_format, ChapterLabelFormat::Text);

        let bad: Result<EngineConfig, _> = toml::from_str("[book]\nchapter_label_format = \"roman\"");
        assert!(bad.is_err());
    }

    #[test]
    fn geometry_overrides_pass_through() {
        let toml = r#"
[geometry]
inside_margin = 0.8
"#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        let overrides = config.geometry.overrides();
        assert_eq!(overrides.inside_margin, Some(0.8));
        assert_eq!(overrides.top_margin, None);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[metadata]
title = "The Quiet Sea"
author = "R. Okafor"

[book]
language = "de"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.metadata.title, "The Quiet Sea");
        assert_eq!(config.metadata.author, "R. Okafor");
        assert_eq!(config.book.language, "de");
        // Unspecified values should be defaults
        assert_eq!(config.book.trim_size, "6x9");
        assert_eq!(config.metadata.isbn, None);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Thread count
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(None), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(Some(99999)), cores);
        assert_eq!(effective_threads(Some(0)), 1);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        assert_eq!(effective_threads(Some(1)), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"threshold = 0.5"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"threshold = 0.7"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("threshold").unwrap().as_float(), Some(0.7));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[book]
trim_size = "6x9"
toc_depth = 1
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[book]
toc_depth = 2
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let book = merged.get("book").unwrap();
        assert_eq!(book.get("toc_depth").unwrap().as_integer(), Some(2));
        // trim_size preserved from base
        assert_eq!(book.get("trim_size").unwrap().as_str(), Some("6x9"));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
a = 1
b = 2
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(r#"a = 10"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(10));
        assert_eq!(merged.get("b").unwrap().as_integer(), Some(2));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[book]
trim = "6x9"
"#;
        let result: Result<EngineConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[bibliographie]
threshold = 0.5
"#;
        let result: Result<EngineConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[geometry]
gutter = 0.5
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_threshold_boundaries() {
        let mut config = EngineConfig::default();
        config.bibliography.threshold = 1.0;
        assert!(config.validate().is_ok());
        config.bibliography.threshold = 0.0;
        assert!(config.validate().is_ok());
        config.bibliography.threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_toc_depth_too_deep() {
        let mut config = EngineConfig::default();
        config.book.toc_depth = 4;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_wrap_lengths() {
        let mut config = EngineConfig::default();
        config.bibliography.url_wrap_length = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.urls.document_wrap_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_leaves_trim_names_to_the_trim_table() {
        let mut config = EngineConfig::default();
        config.book.trim_size = "pocket".to_string();
        assert!(config.validate().is_ok());

        config.book.trim_size = "  ".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("trim_size"));
    }

    #[test]
    fn validate_non_positive_margin_override() {
        let mut config = EngineConfig::default();
        config.geometry.top_margin = Some(0.0);
        assert!(config.validate().is_err());
        config.geometry.top_margin = Some(-0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str(
            r#"
[book]
toc_depth = 9
"#,
        )
        .unwrap();
        let result = resolve_config(base, Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: EngineConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[metadata]", "[book]", "[bibliography]", "[urls]", "[geometry]"] {
            assert!(content.contains(section), "missing {}", section);
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["metadata", "book", "bibliography", "urls", "geometry"] {
            assert!(val.get(key).is_some(), "missing {}", key);
        }
    }
}
