use std::fmt;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod config_file;

// Re-export for convenience
pub use backend::{PageSource, PageSourceError, TextFilePageSource, check_pages, ocr_sibling_path};

/// A cited entity: either an individual or a non-person author
/// (organization, software project, anonymous report).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Author {
    Person {
        first_name: String,
        last_name: String,
    },
    Institution {
        name: String,
    },
}

impl Author {
    pub fn person(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Author::Person {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn institution(name: impl Into<String>) -> Self {
        Author::Institution { name: name.into() }
    }

    pub fn is_person(&self) -> bool {
        matches!(self, Author::Person { .. })
    }

    /// Surname of a person, or the full name of an institution.
    pub fn sort_name(&self) -> &str {
        match self {
            Author::Person { last_name, .. } => last_name,
            Author::Institution { name } => name,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::Person {
                first_name,
                last_name,
            } if first_name.is_empty() => write!(f, "{}", last_name),
            Author::Person {
                first_name,
                last_name,
            } => write!(f, "{}, {}", last_name, first_name),
            Author::Institution { name } => write!(f, "{}", name),
        }
    }
}

/// Where the publication year sits in a citation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum YearPlacement {
    /// APA-like: `Authors (Year). Title. Venue.`
    #[serde(rename = "apa")]
    AfterAuthors,
    /// ISO 690-like: `AUTHORS. Title. Venue, Year.`
    #[serde(rename = "iso690")]
    Trailing,
}

impl fmt::Display for YearPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearPlacement::AfterAuthors => write!(f, "apa"),
            YearPlacement::Trailing => write!(f, "iso690"),
        }
    }
}

/// Citation style inferred once per document from the full list of
/// segmented references. Read-only input to field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceStyle {
    pub year_placement: YearPlacement,
    pub year_parenthesized: bool,
    pub semicolon_separated: bool,
    pub comma_inside_name: bool,
}

impl ReferenceStyle {
    /// Character that terminates the title field.
    pub fn title_separator(&self) -> char {
        if self.semicolon_separated { ';' } else { '.' }
    }
}

/// How reference boundaries are signalled in the bibliography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceLayout {
    /// Each reference starts at column 0 and wraps with indented continuation lines.
    Indentation,
    /// No usable indentation; boundaries come from a leading author/year pattern.
    AuthorYear,
}

/// Byte offsets into [`Reference::raw_text`]. Always on `char` boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSpans {
    pub authors_end: Option<usize>,
    pub title_start: Option<usize>,
    pub year: Option<Range<usize>>,
}

/// A field that could not be recovered from a reference. The reference
/// itself is always kept with whatever fields were found.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGap {
    #[error("no publication year found")]
    MissingYear,
    #[error("no author matched")]
    NoAuthors,
    #[error("title start offset is unknown")]
    TitleStartUnknown,
    #[error("title has no terminating separator")]
    TitleUnterminated,
}

/// A bibliographic reference recovered from the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reference {
    pub raw_text: String,
    pub year: Option<u16>,
    pub authors: Vec<Author>,
    pub title: Option<String>,
    pub spans: ReferenceSpans,
    pub gaps: Vec<FieldGap>,
}

impl Reference {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Default::default()
        }
    }

    /// Replace the raw text and drop every field derived from the old text,
    /// since spans would no longer point at the right characters.
    pub fn set_raw_text(&mut self, raw_text: impl Into<String>) {
        *self = Reference::new(raw_text);
    }

    pub fn len(&self) -> usize {
        self.raw_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_text.is_empty()
    }

    /// True when the only author is an institution (the zero-person fallback).
    pub fn has_institutional_author(&self) -> bool {
        self.authors.len() == 1 && !self.authors[0].is_person()
    }
}

/// Deterministic one-line rendering: `authors | year | title`.
impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.authors.is_empty() {
            write!(f, "-")?;
        } else {
            let names: Vec<String> = self.authors.iter().map(|a| a.to_string()).collect();
            write!(f, "{}", names.join("; "))?;
        }
        match self.year {
            Some(year) => write!(f, " | {}", year)?,
            None => write!(f, " | -")?,
        }
        match &self.title {
            Some(title) => write!(f, " | {}", title),
            None => write!(f, " | -"),
        }
    }
}

/// Counters collected while a document runs through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub pages: usize,
    pub header_lines: usize,
    pub footer_lines: usize,
    pub two_column_pages: usize,
    pub segmented: usize,
    pub trailing_dropped: usize,
    pub repetition_marks_expanded: usize,
    pub missing_year: usize,
    pub missing_title: usize,
    pub institutional: usize,
}

/// Result of running the pipeline over one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    pub references: Vec<Reference>,
    /// Offset in the normalized full text where the bibliography begins.
    /// `None` means no bibliography heading could be located.
    pub section_start: Option<usize>,
    pub layout: Option<ReferenceLayout>,
    pub style: Option<ReferenceStyle>,
    pub stats: ExtractionStats,
}

impl ExtractionResult {
    pub fn found_bibliography(&self) -> bool {
        self.section_start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_display() {
        assert_eq!(Author::person("A.", "Smith").to_string(), "Smith, A.");
        assert_eq!(Author::person("", "Smith").to_string(), "Smith");
        assert_eq!(
            Author::institution("World Health Organization").to_string(),
            "World Health Organization"
        );
    }

    #[test]
    fn test_author_equality_requires_same_variant() {
        let person = Author::person("", "UNESCO");
        let institution = Author::institution("UNESCO");
        assert_ne!(person, institution);
        assert_eq!(person.sort_name(), institution.sort_name());
    }

    #[test]
    fn test_reference_display() {
        let mut r = Reference::new("Smith, A., & Jones, B. (2020). Title one. Journal.");
        r.authors = vec![Author::person("A.", "Smith"), Author::person("B.", "Jones")];
        r.year = Some(2020);
        r.title = Some("Title one".to_string());
        assert_eq!(r.to_string(), "Smith, A.; Jones, B. | 2020 | Title one");
    }

    #[test]
    fn test_reference_display_missing_fields() {
        let r = Reference::new("Something without fields");
        assert_eq!(r.to_string(), "- | - | -");
    }

    #[test]
    fn test_set_raw_text_resets_derived_fields() {
        let mut r = Reference::new("Smith, A. 2019. Foo.");
        r.year = Some(2019);
        r.spans.authors_end = Some(10);
        r.gaps.push(FieldGap::TitleUnterminated);
        r.set_raw_text("Smith, A. 2020. Bar.");
        assert_eq!(r.raw_text, "Smith, A. 2020. Bar.");
        assert_eq!(r.year, None);
        assert_eq!(r.spans, ReferenceSpans::default());
        assert!(r.gaps.is_empty());
    }

    #[test]
    fn test_title_separator() {
        let mut style = ReferenceStyle {
            year_placement: YearPlacement::AfterAuthors,
            year_parenthesized: true,
            semicolon_separated: false,
            comma_inside_name: true,
        };
        assert_eq!(style.title_separator(), '.');
        style.semicolon_separated = true;
        assert_eq!(style.title_separator(), ';');
    }

    #[test]
    fn test_style_serializes_placement_names() {
        let style = ReferenceStyle {
            year_placement: YearPlacement::Trailing,
            year_parenthesized: false,
            semicolon_separated: false,
            comma_inside_name: true,
        };
        let json = serde_json::to_string(&style).unwrap();
        assert!(json.contains("\"iso690\""));
        assert_eq!(YearPlacement::AfterAuthors.to_string(), "apa");
    }
}
