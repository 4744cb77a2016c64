use std::str::FromStr;

use artparse_core::config_file::ConfigFile;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// How much non-whitespace a column may contain and still count as margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarginTolerance {
    /// Margin columns must be entirely whitespace.
    Strict,
    /// Margin columns may hold isolated numbers and punctuation (page/line numbers).
    Numbers,
    /// The left margin may also hold short text fragments (running keywords,
    /// author names in the gutter). The right margin stays conservative.
    #[default]
    Text,
}

impl FromStr for MarginTolerance {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "0" => Ok(MarginTolerance::Strict),
            "numbers" | "1" => Ok(MarginTolerance::Numbers),
            "text" | "2" => Ok(MarginTolerance::Text),
            _ => Err(ConfigError::InvalidValue {
                key: "margin_tolerance",
                value: s.to_string(),
            }),
        }
    }
}

/// Which pages are sampled when looking for repeating headers/footers.
/// Running heads often differ between even and odd pages, so only every
/// second page is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageParity {
    #[default]
    Even,
    Odd,
}

impl PageParity {
    pub fn first_page(&self) -> usize {
        match self {
            PageParity::Even => 0,
            PageParity::Odd => 1,
        }
    }
}

impl FromStr for PageParity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "even" => Ok(PageParity::Even),
            "odd" => Ok(PageParity::Odd),
            _ => Err(ConfigError::InvalidValue {
                key: "page_parity",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

pub(crate) static DEFAULT_HEADING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\breferences\b").unwrap(),
        Regex::new(r"(?i)\bliterature cited\b").unwrap(),
    ]
});

/// Phrases that only show up once segmentation has run past the
/// bibliography into acknowledgments, notes or article boilerplate.
pub(crate) const DEFAULT_END_PHRASES: &[&str] = &[
    "suggested citation",
    "would like to thank",
    "this article is",
    "further reading",
    "this article has been",
    "by the authors",
];

/// Configuration for the reference recovery pipeline.
///
/// Every threshold defaults to the value the heuristics were tuned with.
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── layout ──
    pub(crate) margin_tolerance: MarginTolerance,
    /// Mean similarity above which a line position is a running header/footer.
    pub(crate) header_similarity: f64,
    /// Fewer pages than this and no header/footer is assumed.
    pub(crate) min_pages_for_headers: usize,
    pub(crate) page_parity: PageParity,
    /// Share of rows the tallest gutter bar must cover for a two-column page.
    pub(crate) column_ratio: f64,
    /// Half-width of the window around the line midpoint searched for a gutter.
    pub(crate) column_window: usize,
    /// Lines at most this long never contribute to the gutter histogram.
    pub(crate) column_min_line: usize,

    // ── section ──
    pub(crate) heading_patterns: ListOverride<Regex>,
    /// Characters after a heading candidate scanned for year tokens.
    pub(crate) section_year_window: usize,
    /// Characters after the section start inspected by the layout classifier.
    pub(crate) layout_window: usize,

    // ── segmentation ──
    pub(crate) end_phrases: ListOverride<String>,
    pub(crate) max_unindented_lines: usize,
    pub(crate) final_slice_limit: usize,
    pub(crate) repair_hyphenation: bool,

    // ── style ──
    /// Mean relative year position above which the style is ISO 690-like.
    pub(crate) trailing_year_threshold: f64,
    pub(crate) parenthesis_ratio: f64,
    pub(crate) semicolon_ratio: f64,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            margin_tolerance: MarginTolerance::Text,
            header_similarity: 0.7,
            min_pages_for_headers: 4,
            page_parity: PageParity::Even,
            column_ratio: 0.61,
            column_window: 20,
            column_min_line: 40,
            heading_patterns: ListOverride::Default,
            section_year_window: 1000,
            layout_window: 2000,
            end_phrases: ListOverride::Default,
            max_unindented_lines: 6,
            final_slice_limit: 500,
            repair_hyphenation: true,
            trailing_year_threshold: 0.6,
            parenthesis_ratio: 0.5,
            semicolon_ratio: 0.25,
        }
    }
}

impl ParsingConfig {
    pub(crate) fn heading_patterns(&self) -> Vec<Regex> {
        self.heading_patterns.resolve(&DEFAULT_HEADING_PATTERNS)
    }

    /// End-of-references phrases, lowercased for case-insensitive matching.
    pub(crate) fn end_phrases(&self) -> Vec<String> {
        let defaults: Vec<String> = DEFAULT_END_PHRASES.iter().map(|s| s.to_string()).collect();
        self.end_phrases
            .resolve(&defaults)
            .into_iter()
            .map(|p| p.to_lowercase())
            .collect()
    }

    pub fn margin_tolerance(&self) -> MarginTolerance {
        self.margin_tolerance
    }

    pub fn page_parity(&self) -> PageParity {
        self.page_parity
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    margin_tolerance: Option<MarginTolerance>,
    header_similarity: Option<f64>,
    min_pages_for_headers: Option<usize>,
    page_parity: Option<PageParity>,
    column_ratio: Option<f64>,
    column_window: Option<usize>,
    column_min_line: Option<usize>,
    heading_patterns: ListOverride<String>,
    section_year_window: Option<usize>,
    layout_window: Option<usize>,
    end_phrases: ListOverride<String>,
    max_unindented_lines: Option<usize>,
    final_slice_limit: Option<usize>,
    repair_hyphenation: Option<bool>,
    trailing_year_threshold: Option<f64>,
    parenthesis_ratio: Option<f64>,
    semicolon_ratio: Option<f64>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Layout ──

    pub fn margin_tolerance(mut self, tolerance: MarginTolerance) -> Self {
        self.margin_tolerance = Some(tolerance);
        self
    }

    pub fn header_similarity(mut self, threshold: f64) -> Self {
        self.header_similarity = Some(threshold);
        self
    }

    pub fn min_pages_for_headers(mut self, n: usize) -> Self {
        self.min_pages_for_headers = Some(n);
        self
    }

    pub fn page_parity(mut self, parity: PageParity) -> Self {
        self.page_parity = Some(parity);
        self
    }

    pub fn column_ratio(mut self, ratio: f64) -> Self {
        self.column_ratio = Some(ratio);
        self
    }

    pub fn column_window(mut self, half_width: usize) -> Self {
        self.column_window = Some(half_width);
        self
    }

    pub fn column_min_line(mut self, len: usize) -> Self {
        self.column_min_line = Some(len);
        self
    }

    // ── Section ──

    pub fn set_heading_patterns(mut self, patterns: Vec<String>) -> Self {
        self.heading_patterns = ListOverride::Replace(patterns);
        self
    }

    pub fn add_heading_pattern(mut self, pattern: String) -> Self {
        match &mut self.heading_patterns {
            ListOverride::Extend(v) => v.push(pattern),
            _ => self.heading_patterns = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    pub fn section_year_window(mut self, chars: usize) -> Self {
        self.section_year_window = Some(chars);
        self
    }

    pub fn layout_window(mut self, chars: usize) -> Self {
        self.layout_window = Some(chars);
        self
    }

    // ── Segmentation ──

    pub fn set_end_phrases(mut self, phrases: Vec<String>) -> Self {
        self.end_phrases = ListOverride::Replace(phrases);
        self
    }

    pub fn add_end_phrase(mut self, phrase: String) -> Self {
        match &mut self.end_phrases {
            ListOverride::Extend(v) => v.push(phrase),
            _ => self.end_phrases = ListOverride::Extend(vec![phrase]),
        }
        self
    }

    pub fn max_unindented_lines(mut self, n: usize) -> Self {
        self.max_unindented_lines = Some(n);
        self
    }

    pub fn final_slice_limit(mut self, chars: usize) -> Self {
        self.final_slice_limit = Some(chars);
        self
    }

    pub fn repair_hyphenation(mut self, enabled: bool) -> Self {
        self.repair_hyphenation = Some(enabled);
        self
    }

    // ── Style ──

    pub fn trailing_year_threshold(mut self, threshold: f64) -> Self {
        self.trailing_year_threshold = Some(threshold);
        self
    }

    pub fn parenthesis_ratio(mut self, ratio: f64) -> Self {
        self.parenthesis_ratio = Some(ratio);
        self
    }

    pub fn semicolon_ratio(mut self, ratio: f64) -> Self {
        self.semicolon_ratio = Some(ratio);
        self
    }

    /// Apply every value set in an on-disk config file. Values already set
    /// on the builder are overwritten.
    pub fn apply_file(mut self, file: &ConfigFile) -> Result<Self, ConfigError> {
        if let Some(layout) = &file.layout {
            if let Some(t) = &layout.margin_tolerance {
                self.margin_tolerance = Some(t.parse()?);
            }
            if let Some(p) = &layout.page_parity {
                self.page_parity = Some(p.parse()?);
            }
            self.header_similarity = layout.header_similarity.or(self.header_similarity);
            self.min_pages_for_headers = layout.min_pages_for_headers.or(self.min_pages_for_headers);
            self.column_ratio = layout.column_ratio.or(self.column_ratio);
            self.column_window = layout.column_window.or(self.column_window);
            self.column_min_line = layout.column_min_line.or(self.column_min_line);
        }
        if let Some(section) = &file.section {
            if let Some(patterns) = &section.heading_patterns {
                self = self.set_heading_patterns(patterns.clone());
            }
            for pattern in section.extra_heading_patterns.iter().flatten() {
                self = self.add_heading_pattern(pattern.clone());
            }
            self.section_year_window = section.year_window.or(self.section_year_window);
            self.layout_window = section.layout_window.or(self.layout_window);
        }
        if let Some(seg) = &file.segmentation {
            if let Some(phrases) = &seg.end_phrases {
                self = self.set_end_phrases(phrases.clone());
            }
            for phrase in seg.extra_end_phrases.iter().flatten() {
                self = self.add_end_phrase(phrase.clone());
            }
            self.max_unindented_lines = seg.max_unindented_lines.or(self.max_unindented_lines);
            self.final_slice_limit = seg.final_slice_limit.or(self.final_slice_limit);
            self.repair_hyphenation = seg.repair_hyphenation.or(self.repair_hyphenation);
        }
        if let Some(style) = &file.style {
            self.trailing_year_threshold = style
                .trailing_year_threshold
                .or(self.trailing_year_threshold);
            self.parenthesis_ratio = style.parenthesis_ratio.or(self.parenthesis_ratio);
            self.semicolon_ratio = style.semicolon_ratio.or(self.semicolon_ratio);
        }
        Ok(self)
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile_list =
            |list: ListOverride<String>| -> Result<ListOverride<Regex>, regex::Error> {
                let compile_all = |patterns: Vec<String>| -> Result<Vec<Regex>, regex::Error> {
                    patterns.iter().map(|p| Regex::new(p)).collect()
                };
                match list {
                    ListOverride::Default => Ok(ListOverride::Default),
                    ListOverride::Replace(patterns) => {
                        Ok(ListOverride::Replace(compile_all(patterns)?))
                    }
                    ListOverride::Extend(patterns) => {
                        Ok(ListOverride::Extend(compile_all(patterns)?))
                    }
                }
            };

        let defaults = ParsingConfig::default();
        Ok(ParsingConfig {
            margin_tolerance: self.margin_tolerance.unwrap_or(defaults.margin_tolerance),
            header_similarity: self.header_similarity.unwrap_or(defaults.header_similarity),
            min_pages_for_headers: self
                .min_pages_for_headers
                .unwrap_or(defaults.min_pages_for_headers),
            page_parity: self.page_parity.unwrap_or(defaults.page_parity),
            column_ratio: self.column_ratio.unwrap_or(defaults.column_ratio),
            column_window: self.column_window.unwrap_or(defaults.column_window),
            column_min_line: self.column_min_line.unwrap_or(defaults.column_min_line),
            heading_patterns: compile_list(self.heading_patterns)?,
            section_year_window: self
                .section_year_window
                .unwrap_or(defaults.section_year_window),
            layout_window: self.layout_window.unwrap_or(defaults.layout_window),
            end_phrases: self.end_phrases,
            max_unindented_lines: self
                .max_unindented_lines
                .unwrap_or(defaults.max_unindented_lines),
            final_slice_limit: self.final_slice_limit.unwrap_or(defaults.final_slice_limit),
            repair_hyphenation: self.repair_hyphenation.unwrap_or(defaults.repair_hyphenation),
            trailing_year_threshold: self
                .trailing_year_threshold
                .unwrap_or(defaults.trailing_year_threshold),
            parenthesis_ratio: self.parenthesis_ratio.unwrap_or(defaults.parenthesis_ratio),
            semicolon_ratio: self.semicolon_ratio.unwrap_or(defaults.semicolon_ratio),
        })
    }
}
