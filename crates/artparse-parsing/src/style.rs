use artparse_core::{Reference, ReferenceStyle, YearPlacement};

use crate::config::ParsingConfig;
use crate::fields::count_authors;
use crate::segment::YEAR_RE;

/// Infer the citation style from every segmented reference at once.
///
/// Returns `None` for an empty list. The comma-inside-name decision runs the
/// author grammar under both hypotheses and keeps the one that finds more
/// people, so it becomes unreliable on very short lists.
pub fn detect_style(refs: &[Reference], config: &ParsingConfig) -> Option<ReferenceStyle> {
    if refs.is_empty() {
        return None;
    }

    let mut positions = Vec::new();
    let mut parenthesized = 0usize;
    for reference in refs {
        let raw = reference.raw_text.as_str();
        let len = raw.chars().count().max(1);
        for m in YEAR_RE.find_iter(raw) {
            positions.push(raw[..m.end()].chars().count() as f64 / len as f64);
            if raw[m.end()..].starts_with(')') {
                parenthesized += 1;
            }
        }
    }

    let year_placement = if positions.is_empty() {
        YearPlacement::AfterAuthors
    } else {
        let mean = positions.iter().sum::<f64>() / positions.len() as f64;
        if mean > config.trailing_year_threshold {
            YearPlacement::Trailing
        } else {
            YearPlacement::AfterAuthors
        }
    };

    let year_parenthesized = !positions.is_empty()
        && parenthesized as f64 / positions.len() as f64 > config.parenthesis_ratio;

    let semicolons: usize = refs.iter().map(|r| r.raw_text.matches(';').count()).sum();
    let semicolon_separated = semicolons as f64 > refs.len() as f64 * config.semicolon_ratio;

    let mut style = ReferenceStyle {
        year_placement,
        year_parenthesized,
        semicolon_separated,
        comma_inside_name: true,
    };
    let with_comma: usize = refs.iter().map(|r| count_authors(&r.raw_text, &style)).sum();
    style.comma_inside_name = false;
    let without_comma: usize = refs.iter().map(|r| count_authors(&r.raw_text, &style)).sum();
    style.comma_inside_name = with_comma >= without_comma;

    tracing::debug!(
        placement = %style.year_placement,
        parenthesized = style.year_parenthesized,
        semicolons = style.semicolon_separated,
        with_comma,
        without_comma,
        "detected reference style"
    );
    Some(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(raw: &[&str]) -> Vec<Reference> {
        raw.iter().map(|r| Reference::new(*r)).collect()
    }

    #[test]
    fn test_empty_list_has_no_style() {
        assert_eq!(detect_style(&[], &ParsingConfig::default()), None);
    }

    #[test]
    fn test_apa_parenthesized_comma() {
        let corpus = refs(&[
            "Burt, R. S. (1992). Structural holes. Harvard University Press.",
            "Coleman, J. S. (1988). Social capital in the creation of human capital. American Journal of Sociology, 94, 95-120.",
            "Granovetter, M. (1973). The strength of weak ties. American Journal of Sociology, 78, 1360-1380.",
        ]);
        let style = detect_style(&corpus, &ParsingConfig::default()).unwrap();
        assert_eq!(style.year_placement, YearPlacement::AfterAuthors);
        assert!(style.year_parenthesized);
        assert!(!style.semicolon_separated);
        assert!(style.comma_inside_name);
    }

    #[test]
    fn test_unparenthesized_years() {
        let corpus = refs(&[
            "Smith, A. 2019. Foo. Journal.",
            "Jones, B. 2020. Bar. Journal.",
            "Brown, C. 2021. Baz. Journal.",
        ]);
        let style = detect_style(&corpus, &ParsingConfig::default()).unwrap();
        assert!(!style.year_parenthesized);
    }

    #[test]
    fn test_iso690_trailing_year() {
        let corpus = refs(&[
            "BURT, R. S. Structural holes. Cambridge: Harvard University Press, 1992.",
            "COLEMAN, J. S. Social capital in the creation of human capital. American Journal of Sociology. 1988.",
        ]);
        let style = detect_style(&corpus, &ParsingConfig::default()).unwrap();
        assert_eq!(style.year_placement, YearPlacement::Trailing);
    }

    #[test]
    fn test_semicolons_and_plain_names() {
        let corpus = refs(&[
            "Burt RS, Merluzzi J (2016) Network oversight; Soc Netw 45: 12-20.",
            "Coleman JS, Katz E (1957) Diffusion of an innovation; Sociometry 20: 253-270.",
        ]);
        let style = detect_style(&corpus, &ParsingConfig::default()).unwrap();
        assert!(style.semicolon_separated);
        assert!(!style.comma_inside_name);
    }
}
