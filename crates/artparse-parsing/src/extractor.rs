use std::path::Path;

use artparse_core::{
    ExtractionResult, ExtractionStats, FieldGap, PageSource, Reference, ReferenceLayout,
    ReferenceStyle, check_pages,
};

use crate::config::ParsingConfig;
use crate::layout::{self, NormalizedDocument};
use crate::segment::{self, FixReport};
use crate::text_processing::fix_hyphenation;
use crate::{ParsingError, fields, section, style};

/// The reference recovery pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each stage as a method. The
/// extractor keeps no per-document state, so one instance can process any
/// number of documents, including concurrently.
pub struct ReferenceExtractor {
    config: ParsingConfig,
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParsingConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Margins, running headers/footers and columns (step 1).
    pub fn normalize(&self, pages: &[String]) -> NormalizedDocument {
        layout::normalize_pages(pages, &self.config)
    }

    /// Offset in the full text where the bibliography begins (step 2).
    pub fn locate_references(&self, full_text: &str) -> Option<usize> {
        section::locate_references_with_config(full_text, &self.config)
    }

    /// Indentation vs. author-year boundaries (step 3).
    pub fn classify_layout(&self, section: &str) -> ReferenceLayout {
        segment::classify_layout(section, &self.config)
    }

    /// Split the bibliography into raw references (step 4).
    pub fn segment_references(&self, section: &str, layout: ReferenceLayout) -> Vec<Reference> {
        segment::segment_references(section, layout, &self.config)
    }

    /// Repair line-break hyphenation, expand repeated-author marks and drop
    /// trailing non-references (step 5).
    pub fn fix_references(&self, refs: &mut Vec<Reference>) -> FixReport {
        if self.config.repair_hyphenation {
            for reference in refs.iter_mut() {
                let repaired = fix_hyphenation(&reference.raw_text);
                if repaired != reference.raw_text {
                    reference.set_raw_text(repaired);
                }
            }
        }
        segment::fix_references(refs)
    }

    /// Infer the citation style of the whole list (step 6).
    pub fn detect_style(&self, refs: &[Reference]) -> Option<ReferenceStyle> {
        style::detect_style(refs, &self.config)
    }

    /// Fill year, authors and title of one reference (step 7).
    pub fn extract_fields(&self, reference: &mut Reference, style: &ReferenceStyle) {
        fields::extract_fields(reference, style)
    }

    /// Run the pipeline over pages already read from a document.
    ///
    /// Not finding a bibliography is not an error: the result then has no
    /// `section_start` and no references.
    pub fn extract_references_from_pages(&self, pages: &[String]) -> ExtractionResult {
        let doc = self.normalize(pages);
        let mut stats = ExtractionStats {
            pages: pages.len(),
            header_lines: doc.header_footer.header_lines,
            footer_lines: doc.header_footer.footer_lines,
            two_column_pages: doc.two_column_pages(),
            ..Default::default()
        };

        let Some(start) = self.locate_references(&doc.full_text) else {
            tracing::warn!("could not locate bibliography");
            return ExtractionResult {
                stats,
                ..Default::default()
            };
        };

        let section = &doc.full_text[start..];
        let layout = self.classify_layout(section);
        let mut references = self.segment_references(section, layout);
        stats.segmented = references.len();

        let fix = self.fix_references(&mut references);
        stats.trailing_dropped = fix.trailing_dropped;
        stats.repetition_marks_expanded = fix.repetition_marks_expanded;

        let style = self.detect_style(&references);
        if let Some(style) = &style {
            for reference in references.iter_mut() {
                self.extract_fields(reference, style);
            }
        }

        for reference in &references {
            if reference.gaps.contains(&FieldGap::MissingYear) {
                stats.missing_year += 1;
            }
            if reference.title.is_none() {
                stats.missing_title += 1;
            }
            if reference.has_institutional_author() {
                stats.institutional += 1;
            }
        }

        tracing::info!(
            references = references.len(),
            layout = ?layout,
            missing_year = stats.missing_year,
            missing_title = stats.missing_title,
            "extracted references"
        );

        ExtractionResult {
            references,
            section_start: Some(start),
            layout: Some(layout),
            style,
            stats,
        }
    }

    /// Read a document through `source` and run the full pipeline.
    pub fn extract_references(
        &self,
        path: &Path,
        source: &dyn PageSource,
    ) -> Result<ExtractionResult, ParsingError> {
        let pages = source.read_pages(path)?;
        check_pages(path, &pages)?;
        tracing::debug!(path = %path.display(), pages = pages.len(), "read document");
        Ok(self.extract_references_from_pages(&pages))
    }
}
