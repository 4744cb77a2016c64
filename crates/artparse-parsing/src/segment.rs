use once_cell::sync::Lazy;
use regex::Regex;

use artparse_core::{Reference, ReferenceLayout};

use crate::config::ParsingConfig;
use crate::section::char_window;
use crate::text_processing::collapse_whitespace;

pub(crate) static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:19|20)[0-9]{2}").unwrap());

/// Decide how reference boundaries are marked in the bibliography.
///
/// Looks at the first `layout_window` characters of the section. Lines that
/// start with whitespace count as indented, other non-blank lines as
/// starting. More indented lines than half the starting lines means hanging
/// indentation.
pub fn classify_layout(section: &str, config: &ParsingConfig) -> ReferenceLayout {
    let window = char_window(section, 0, config.layout_window);
    let mut indented = 0usize;
    let mut starting = 0usize;
    for line in window.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            indented += 1;
        } else {
            starting += 1;
        }
    }

    let layout = if indented as f64 > starting as f64 / 2.0 {
        ReferenceLayout::Indentation
    } else {
        ReferenceLayout::AuthorYear
    };
    tracing::debug!(indented, starting, ?layout, "classified reference layout");
    layout
}

/// True once segmentation has run into acknowledgments, notes or article
/// boilerplate. `phrases` must be lowercase.
pub fn is_beyond_references(text: &str, phrases: &[String]) -> bool {
    let lower = text.to_lowercase();
    phrases.iter().any(|p| lower.contains(p.as_str()))
}

/// Strip citation numbering: leading digits, then a period, then one
/// whitespace character.
pub fn trim_numbering(text: &str) -> &str {
    let text = text.trim_start_matches(|c: char| c.is_ascii_digit());
    let text = text.strip_prefix('.').unwrap_or(text);
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => text,
    }
}

/// A strategy that splits the bibliography text into raw references.
pub trait Segmenter {
    fn segment(&self, section: &str, config: &ParsingConfig) -> Vec<Reference>;
}

/// References start at column 0 and wrap onto indented continuation lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentationSegmenter;

impl IndentationSegmenter {
    fn finish(current: &str) -> String {
        collapse_whitespace(trim_numbering(current))
    }
}

impl Segmenter for IndentationSegmenter {
    fn segment(&self, section: &str, config: &ParsingConfig) -> Vec<Reference> {
        let phrases = config.end_phrases();
        let mut refs = Vec::new();
        let mut current = String::new();
        let mut unindented = 0usize;

        for line in section.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if line.starts_with(char::is_whitespace) {
                current.push(' ');
                current.push_str(line);
                unindented = 0;
                continue;
            }

            if !current.is_empty() {
                let text = Self::finish(&current);
                if is_beyond_references(&text, &phrases) {
                    tracing::debug!(reference = %text, "reached end of bibliography");
                    return refs;
                }
                refs.push(Reference::new(text));
            }
            current = line.to_string();
            unindented += 1;
            if unindented > config.max_unindented_lines {
                tracing::debug!(unindented, "too many unindented lines, bibliography ended");
                break;
            }
        }

        let text = Self::finish(&current);
        if !text.is_empty() && !is_beyond_references(&text, &phrases) {
            refs.push(Reference::new(text));
        }
        refs
    }
}

/// Boundaries come from a capitalized run reaching a delimited year on the
/// same line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorYearSegmenter;

impl Segmenter for AuthorYearSegmenter {
    fn segment(&self, section: &str, config: &ParsingConfig) -> Vec<Reference> {
        static START_RE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\s*(\p{Lu}.+[\s\(\.,;]((?:19|20)[0-9]{2})[\s\)\.,;abcdef])").unwrap()
        });

        let phrases = config.end_phrases();
        let starts: Vec<usize> = START_RE.find_iter(section).map(|m| m.start()).collect();
        let Some(&first) = starts.first() else {
            tracing::debug!("no author-year boundaries found");
            return Vec::new();
        };

        let mut refs = Vec::new();
        for pair in starts.windows(2) {
            let text = collapse_whitespace(&section[pair[0]..pair[1]]);
            if text.is_empty() {
                continue;
            }
            if is_beyond_references(&text, &phrases) {
                tracing::debug!(reference = %text, "reached end of bibliography");
                return refs;
            }
            refs.push(Reference::new(text));
        }

        let last_start = starts.last().copied().unwrap_or(first);
        let last = &section[last_start..];
        let last = match last.find("\n\n") {
            Some(pos) if pos < config.final_slice_limit => {
                char_window(last, 0, config.final_slice_limit)
            }
            _ => last,
        };
        let text = collapse_whitespace(last);
        if !text.is_empty() && !is_beyond_references(&text, &phrases) {
            refs.push(Reference::new(text));
        }
        refs
    }
}

/// Split the bibliography with the strategy matching its layout.
pub fn segment_references(
    section: &str,
    layout: ReferenceLayout,
    config: &ParsingConfig,
) -> Vec<Reference> {
    let segmenter: &dyn Segmenter = match layout {
        ReferenceLayout::Indentation => &IndentationSegmenter,
        ReferenceLayout::AuthorYear => &AuthorYearSegmenter,
    };
    segmenter.segment(section, config)
}

/// What the post-segmentation cleanup changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixReport {
    pub repetition_marks_expanded: usize,
    pub trailing_dropped: usize,
}

/// Clean up a freshly segmented list.
///
/// A reference opening with a repeated-author mark (`--`, `––`, `——`) gets
/// the mark replaced by the previous reference's text up to its first
/// period. Then trailing references without any year are dropped, since the
/// boundary heuristics tend to capture text that follows the bibliography.
pub fn fix_references(refs: &mut Vec<Reference>) -> FixReport {
    static DASHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-–—]+").unwrap());

    let mut report = FixReport::default();
    for i in 1..refs.len() {
        let raw = &refs[i].raw_text;
        if !(raw.starts_with("--") || raw.starts_with("––") || raw.starts_with("——")) {
            continue;
        }
        let previous = &refs[i - 1].raw_text;
        let authors = previous.find('.').map_or(previous.as_str(), |end| &previous[..end]);
        let expanded = DASHES_RE
            .replace(raw, regex::NoExpand(&format!("{}.", authors)))
            .into_owned();
        refs[i].set_raw_text(expanded);
        report.repetition_marks_expanded += 1;
    }

    while refs.last().is_some_and(|r| !YEAR_RE.is_match(&r.raw_text)) {
        if let Some(dropped) = refs.pop() {
            tracing::debug!(reference = %dropped.raw_text, "dropping trailing text without a year");
        }
        report.trailing_dropped += 1;
    }
    report
}
