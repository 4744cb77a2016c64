use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;

/// A 1900–2099 year delimited by whitespace or citation punctuation.
pub(crate) static DELIMITED_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\(\.,;]((?:19|20)[0-9]{2})[\s\)\.,;]").unwrap());

/// Slice of at most `max_chars` characters starting at byte offset `start`.
pub(crate) fn char_window(text: &str, start: usize, max_chars: usize) -> &str {
    let rest = &text[start..];
    match rest.char_indices().nth(max_chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

/// Locate the offset right after the bibliography heading.
///
/// Every case-insensitive whole-word match of "References" or "Literature
/// Cited" is a candidate. With several candidates, each is weighted by its
/// position in the document (later is better) times the number of year
/// tokens in the text that follows it, so in-text uses of the word lose to
/// the heading that actually precedes a list of citations.
///
/// Returns `None` when no heading is found or no candidate is followed by
/// any year.
pub fn locate_references(text: &str) -> Option<usize> {
    locate_references_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`locate_references`].
pub fn locate_references_with_config(text: &str, config: &ParsingConfig) -> Option<usize> {
    let mut candidates: Vec<usize> = config
        .heading_patterns()
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.end()).collect::<Vec<_>>())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    match candidates.as_slice() {
        [] => {
            tracing::debug!("no bibliography heading found");
            None
        }
        [only] => Some(*only),
        _ => {
            let mut best: Option<(usize, usize)> = None;
            for (i, &offset) in candidates.iter().enumerate() {
                let window = char_window(text, offset, config.section_year_window);
                let weight = (i + 1) * DELIMITED_YEAR_RE.find_iter(window).count();
                if weight > 0 && best.is_none_or(|(_, top)| weight > top) {
                    best = Some((offset, weight));
                }
            }
            tracing::debug!(
                candidates = candidates.len(),
                chosen = ?best.map(|(offset, _)| offset),
                "weighed bibliography headings"
            );
            best.map(|(offset, _)| offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_heading() {
        assert_eq!(locate_references("Nothing to see here (2020)."), None);
    }

    #[test]
    fn test_single_heading() {
        let text = "Body.\n\nREFERENCES\nSmith, A. (2020). Title.";
        let offset = locate_references(text).unwrap();
        assert_eq!(&text[..offset], "Body.\n\nREFERENCES");
    }

    #[test]
    fn test_whole_word_only() {
        let text = "The referenced work and cross-referencesX list.";
        assert_eq!(locate_references(text), None);
    }

    #[test]
    fn test_heading_followed_by_years_wins() {
        let text = "As the references in section 2 show, closure matters. More body text \
                    follows here.\n\nLiterature Cited\nBurt, R. 1992. Structural Holes.\n\
                    Coleman, J. 1988. Social Capital.\nGranovetter, M. 1973. Weak Ties.\n";
        let offset = locate_references(text).unwrap();
        assert!(text[..offset].ends_with("Literature Cited"));
    }

    #[test]
    fn test_later_heading_weighted_higher() {
        // first candidate sees three years, second sees two but counts double
        let text = "See references (1999). Then REFERENCES (2001). (2002).";
        let offset = locate_references(text).unwrap();
        assert!(text[..offset].ends_with("REFERENCES"));
    }

    #[test]
    fn test_multiple_headings_without_years() {
        let text = "references here and references there";
        assert_eq!(locate_references(text), None);
    }

    #[test]
    fn test_char_window_respects_boundaries() {
        assert_eq!(char_window("héllo wörld", 0, 4), "héll");
        assert_eq!(char_window("abc", 1, 10), "bc");
    }
}
