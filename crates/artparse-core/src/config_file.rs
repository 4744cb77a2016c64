use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub layout: Option<LayoutConfig>,
    pub section: Option<SectionConfig>,
    pub segmentation: Option<SegmentationConfig>,
    pub style: Option<StyleConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// `strict`, `numbers` or `text`.
    pub margin_tolerance: Option<String>,
    pub header_similarity: Option<f64>,
    pub min_pages_for_headers: Option<usize>,
    /// `even` or `odd`.
    pub page_parity: Option<String>,
    pub column_ratio: Option<f64>,
    pub column_window: Option<usize>,
    pub column_min_line: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Replaces the built-in heading patterns.
    pub heading_patterns: Option<Vec<String>>,
    /// Added to the built-in heading patterns.
    pub extra_heading_patterns: Option<Vec<String>>,
    pub year_window: Option<usize>,
    pub layout_window: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Replaces the built-in end-of-references phrases.
    pub end_phrases: Option<Vec<String>>,
    /// Added to the built-in end-of-references phrases.
    pub extra_end_phrases: Option<Vec<String>>,
    pub max_unindented_lines: Option<usize>,
    pub final_slice_limit: Option<usize>,
    pub repair_hyphenation: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleConfig {
    pub trailing_year_threshold: Option<f64>,
    pub parenthesis_ratio: Option<f64>,
    pub semicolon_ratio: Option<f64>,
}

/// Platform config directory path: `<config_dir>/artparse/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("artparse").join("config.toml"))
}

/// Load config by cascading CWD `.artparse.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".artparse.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        layout: merge_layout(base.layout, overlay.layout),
        section: merge_section(base.section, overlay.section),
        segmentation: merge_segmentation(base.segmentation, overlay.segmentation),
        style: merge_style(base.style, overlay.style),
    }
}

fn merge_layout(base: Option<LayoutConfig>, overlay: Option<LayoutConfig>) -> Option<LayoutConfig> {
    match (base, overlay) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(LayoutConfig {
                margin_tolerance: o.margin_tolerance.or(b.margin_tolerance),
                header_similarity: o.header_similarity.or(b.header_similarity),
                min_pages_for_headers: o.min_pages_for_headers.or(b.min_pages_for_headers),
                page_parity: o.page_parity.or(b.page_parity),
                column_ratio: o.column_ratio.or(b.column_ratio),
                column_window: o.column_window.or(b.column_window),
                column_min_line: o.column_min_line.or(b.column_min_line),
            })
        }
    }
}

fn merge_section(
    base: Option<SectionConfig>,
    overlay: Option<SectionConfig>,
) -> Option<SectionConfig> {
    match (base, overlay) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(SectionConfig {
                heading_patterns: o.heading_patterns.or(b.heading_patterns),
                extra_heading_patterns: o.extra_heading_patterns.or(b.extra_heading_patterns),
                year_window: o.year_window.or(b.year_window),
                layout_window: o.layout_window.or(b.layout_window),
            })
        }
    }
}

fn merge_segmentation(
    base: Option<SegmentationConfig>,
    overlay: Option<SegmentationConfig>,
) -> Option<SegmentationConfig> {
    match (base, overlay) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(SegmentationConfig {
                end_phrases: o.end_phrases.or(b.end_phrases),
                extra_end_phrases: o.extra_end_phrases.or(b.extra_end_phrases),
                max_unindented_lines: o.max_unindented_lines.or(b.max_unindented_lines),
                final_slice_limit: o.final_slice_limit.or(b.final_slice_limit),
                repair_hyphenation: o.repair_hyphenation.or(b.repair_hyphenation),
            })
        }
    }
}

fn merge_style(base: Option<StyleConfig>, overlay: Option<StyleConfig>) -> Option<StyleConfig> {
    match (base, overlay) {
        (None, None) => None,
        (b, o) => {
            let b = b.unwrap_or_default();
            let o = o.unwrap_or_default();
            Some(StyleConfig {
                trailing_year_threshold: o.trailing_year_threshold.or(b.trailing_year_threshold),
                parenthesis_ratio: o.parenthesis_ratio.or(b.parenthesis_ratio),
                semicolon_ratio: o.semicolon_ratio.or(b.semicolon_ratio),
            })
        }
    }
}
