use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod fields;
pub mod layout;
pub mod section;
pub mod segment;
pub mod style;
pub mod text_processing;

pub use config::{ConfigError, ListOverride, MarginTolerance, PageParity, ParsingConfig, ParsingConfigBuilder};
pub use extractor::ReferenceExtractor;
pub use layout::{HeaderFooter, NormalizedDocument};
pub use segment::{AuthorYearSegmenter, FixReport, IndentationSegmenter, Segmenter};
// Re-export domain types from core (canonical definitions live there)
pub use artparse_core::{
    Author, ExtractionResult, ExtractionStats, FieldGap, Reference, ReferenceLayout,
    ReferenceStyle, YearPlacement,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error(transparent)]
    PageSource(#[from] artparse_core::PageSourceError),
}

/// Extract references from a document using the given page source.
///
/// Pipeline:
/// 1. Read per-page text via `source`
/// 2. Normalize layout (margins, running headers/footers, columns)
/// 3. Locate the bibliography heading
/// 4. Classify the layout and segment individual references
/// 5. Expand repeated-author marks and drop trailing non-references
/// 6. Infer the citation style from the whole list
/// 7. Extract year, authors and title of each reference
pub fn extract_references(
    path: &Path,
    source: &dyn artparse_core::PageSource,
) -> Result<ExtractionResult, ParsingError> {
    ReferenceExtractor::new().extract_references(path, source)
}
