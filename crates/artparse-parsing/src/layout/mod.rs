//! Page layout normalization: margins, running headers/footers and column
//! reflow, producing the single text over which references are located.

mod columns;
mod headers;
mod margins;

pub use columns::{detect_columns, reflow, trim_left_margin};
pub use headers::{HeaderFooter, detect_headers_footers, strip_headers_footers};
pub use margins::{detect_margins, strip_margins};

use crate::config::ParsingConfig;
use crate::text_processing::expand_ligatures;

/// Separator placed after every normalized page in the full text.
pub const PAGE_BREAK: &str = "\n\n";

pub(crate) fn page_rows(page: &str) -> Vec<Vec<char>> {
    page.lines().map(|line| line.chars().collect()).collect()
}

/// Pages after normalization, plus what was detected along the way.
#[derive(Debug, Clone, Default)]
pub struct NormalizedDocument {
    pub pages: Vec<String>,
    pub header_footer: HeaderFooter,
    /// Second-column offset per page; `None` for single-column pages.
    pub columns: Vec<Option<usize>>,
    pub full_text: String,
}

impl NormalizedDocument {
    pub fn two_column_pages(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}

/// Run every layout stage over the raw pages in order: margin trimming,
/// header/footer stripping, then column reflow.
pub fn normalize_pages(pages: &[String], config: &ParsingConfig) -> NormalizedDocument {
    let trimmed: Vec<String> = pages
        .iter()
        .map(|page| {
            let page = expand_ligatures(page);
            match detect_margins(&page, config.margin_tolerance) {
                Some(margins) => strip_margins(&page, margins),
                None => page,
            }
        })
        .collect();

    let header_footer = detect_headers_footers(&trimmed, config);

    let mut columns = Vec::with_capacity(trimmed.len());
    let mut normalized = Vec::with_capacity(trimmed.len());
    for page in &trimmed {
        let page = strip_headers_footers(page, header_footer);
        let start = detect_columns(&page, config);
        normalized.push(reflow(&page, start));
        columns.push(start);
    }

    let full_text: String = normalized
        .iter()
        .map(|page| format!("{}{}", page, PAGE_BREAK))
        .collect();

    let doc = NormalizedDocument {
        pages: normalized,
        header_footer,
        columns,
        full_text,
    };
    tracing::debug!(
        pages = doc.pages.len(),
        two_column = doc.two_column_pages(),
        chars = doc.full_text.len(),
        "normalized page layout"
    );
    doc
}
