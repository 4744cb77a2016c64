//! Year, author and title recovery from a single reference string.
//!
//! Every step writes into the [`Reference`] it is given and reports a
//! [`FieldGap`] instead of failing the batch. Offsets stored in
//! [`ReferenceSpans`](artparse_core::ReferenceSpans) are byte offsets into
//! `raw_text`.

use once_cell::sync::Lazy;
use regex::Regex;

use artparse_core::{Author, FieldGap, Reference, ReferenceStyle, YearPlacement};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:19|20)[0-9]{2}[abcdef]?").unwrap());

/// `Lastname, F. N.` followed by one of `; , . &`.
static COMMA_AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{Lu}.{0,25}?,(?:\s*[\p{Lu}-]?\.*)+\s*[;,.&])").unwrap());

/// `Lastname FN`: one to three capitalized words, then an initials block.
static PLAIN_AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:\p{Lu}[\w-]+\s){1,3}[\p{Lu}-]{1,3})[\s,.(]").unwrap());

static NAME_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\s").unwrap());

fn strip_trailers(s: &str) -> &str {
    s.trim()
        .trim_end_matches(|c: char| matches!(c, '&' | ',' | '(' | ';') || c.is_whitespace())
}

/// `JA` -> `J.A.`, `J-P` -> `J.-P.`. Anything else is kept as written.
fn initials(block: &str) -> String {
    match block.split_once('-') {
        None => block.chars().map(|c| format!("{}.", c)).collect(),
        Some((first, second)) if !first.is_empty() && !second.is_empty() && !second.contains('-') => {
            format!("{}-{}", initials(first), initials(second))
        }
        Some(_) => block.to_string(),
    }
}

fn parse_person(name: &str, comma_inside_name: bool) -> Author {
    if comma_inside_name {
        let (last, first) = name.split_once(',').unwrap_or((name, ""));
        Author::person(strip_trailers(first), strip_trailers(last))
    } else {
        let words: Vec<&str> = name.split_whitespace().collect();
        match words.split_last() {
            Some((block, surname)) => {
                Author::person(initials(strip_trailers(block)), surname.join(" "))
            }
            None => Author::person("", strip_trailers(name)),
        }
    }
}

/// Advance past whitespace and one leading `and` / `&` token.
fn skip_conjunction(text: &str, pos: usize) -> usize {
    let skip_ws = |pos: usize| pos + (text[pos..].len() - text[pos..].trim_start().len());
    let pos = skip_ws(pos);
    match text[pos..].split_whitespace().next() {
        Some("and") => skip_ws(pos + 3),
        Some("&") => skip_ws(pos + 1),
        _ => pos,
    }
}

/// Person authors matched one after another at the front of `text`, each
/// with the offset right after its match.
fn match_people(text: &str, comma_inside_name: bool) -> Vec<(Author, usize)> {
    let re: &Regex = if comma_inside_name {
        &COMMA_AUTHOR_RE
    } else {
        &PLAIN_AUTHOR_RE
    };

    let mut people = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let Some(caps) = re.captures(&text[pos..]) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let name = caps.get(1).map_or(whole.as_str(), |m| m.as_str());
        let end = pos + whole.end();
        people.push((parse_person(name, comma_inside_name), end));
        pos = skip_conjunction(text, end);
    }
    people
}

/// The part of a reference searched for author names, and where it starts
/// in `raw_text`.
struct AuthorSplice {
    text: String,
    base: usize,
}

fn author_splice(raw: &str, placement: YearPlacement, authors_end: Option<usize>) -> AuthorSplice {
    match placement {
        YearPlacement::AfterAuthors => {
            let head = &raw[..authors_end.unwrap_or(raw.len()).min(raw.len())];
            let trimmed = head.trim_start();
            AuthorSplice {
                // the plain grammar needs a terminator after the last name
                text: format!("{} ", trimmed),
                base: head.len() - trimmed.len(),
            }
        }
        YearPlacement::Trailing => {
            let trimmed = raw.trim_start();
            AuthorSplice {
                text: trimmed.to_string(),
                base: raw.len() - trimmed.len(),
            }
        }
    }
}

/// Find the publication year. The first year token is used when the year
/// follows the authors, the last one when it trails the citation.
///
/// With [`YearPlacement::AfterAuthors`] the year also marks where the
/// authors end and the title begins.
pub fn extract_year(reference: &mut Reference, style: &ReferenceStyle) -> Result<u16, FieldGap> {
    let raw = reference.raw_text.as_str();
    let found = match style.year_placement {
        YearPlacement::AfterAuthors => YEAR_RE.find(raw),
        YearPlacement::Trailing => YEAR_RE.find_iter(raw).last(),
    };
    let m = found.ok_or(FieldGap::MissingYear)?;
    let digits: String = m.as_str().chars().take(4).collect();
    let year: u16 = digits.parse().map_err(|_| FieldGap::MissingYear)?;
    let range = m.range();
    let title_start = raw[range.end..].chars().next().map(|c| range.end + c.len_utf8());

    reference.year = Some(year);
    reference.spans.year = Some(range.clone());
    if style.year_placement == YearPlacement::AfterAuthors {
        reference.spans.authors_end = Some(range.start);
        reference.spans.title_start = title_start;
    }
    Ok(year)
}

/// Number of person authors the style's name grammar finds in `raw`.
/// Nothing is stored; used to compare name grammars during style detection.
pub fn count_authors(raw: &str, style: &ReferenceStyle) -> usize {
    let authors_end = match style.year_placement {
        YearPlacement::AfterAuthors => YEAR_RE.find(raw).map(|m| m.start()),
        YearPlacement::Trailing => None,
    };
    let splice = author_splice(raw, style.year_placement, authors_end);
    match_people(&splice.text, style.comma_inside_name).len()
}

/// Parse the author list. Returns the number of person authors found.
///
/// When no person matches, the leading segment becomes one institutional
/// author: up to the first period when the year follows the authors, up to
/// the first `". "` when it trails. For trailing-year styles the author/title
/// boundary is taken from the author match.
pub fn extract_authors(reference: &mut Reference, style: &ReferenceStyle) -> Result<usize, FieldGap> {
    let splice = author_splice(
        &reference.raw_text,
        style.year_placement,
        reference.spans.authors_end,
    );
    let people = match_people(&splice.text, style.comma_inside_name);

    if let Some(&(_, last_end)) = people.last() {
        if style.year_placement == YearPlacement::Trailing {
            let authors_end = (splice.base + last_end).min(reference.raw_text.len());
            reference.spans.authors_end = Some(authors_end);
            reference.spans.title_start = Some(authors_end);
        }
        let count = people.len();
        reference.authors = people.into_iter().map(|(author, _)| author).collect();
        return Ok(count);
    }

    let name = match style.year_placement {
        YearPlacement::AfterAuthors => splice.text.split('.').next().unwrap_or_default(),
        YearPlacement::Trailing => match NAME_END_RE.find(&splice.text) {
            Some(m) => {
                reference.spans.authors_end = Some(splice.base + m.start());
                reference.spans.title_start = Some(splice.base + m.end());
                &splice.text[..m.start()]
            }
            None => splice.text.as_str(),
        },
    };
    let name = strip_trailers(name);
    if name.is_empty() {
        return Err(FieldGap::NoAuthors);
    }
    tracing::debug!(name, "no person authors, using institutional author");
    reference.authors = vec![Author::institution(name)];
    Ok(0)
}

/// Take the title: from the first alphanumeric character at or after the
/// title start up to the style's separator.
pub fn extract_title(reference: &mut Reference, style: &ReferenceStyle) -> Result<(), FieldGap> {
    let start = reference.spans.title_start.ok_or(FieldGap::TitleStartUnknown)?;
    let rest = reference
        .raw_text
        .get(start..)
        .ok_or(FieldGap::TitleStartUnknown)?;
    let begin = rest
        .find(char::is_alphanumeric)
        .ok_or(FieldGap::TitleUnterminated)?;
    let rest = &rest[begin..];
    let end = rest
        .find(style.title_separator())
        .ok_or(FieldGap::TitleUnterminated)?;
    let title = rest[..end].trim_end().to_string();
    reference.title = Some(title);
    Ok(())
}

/// Run year, author and title extraction in order, recording every gap on
/// the reference. Fields from an earlier run are discarded first.
pub fn extract_fields(reference: &mut Reference, style: &ReferenceStyle) {
    let raw = std::mem::take(&mut reference.raw_text);
    reference.set_raw_text(raw);

    if let Err(gap) = extract_year(reference, style) {
        reference.gaps.push(gap);
    }
    if let Err(gap) = extract_authors(reference, style) {
        reference.gaps.push(gap);
    }
    if let Err(gap) = extract_title(reference, style) {
        reference.gaps.push(gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(placement: YearPlacement, comma_inside_name: bool) -> ReferenceStyle {
        ReferenceStyle {
            year_placement: placement,
            year_parenthesized: placement == YearPlacement::AfterAuthors,
            semicolon_separated: false,
            comma_inside_name,
        }
    }

    fn extracted(raw: &str, style: &ReferenceStyle) -> Reference {
        let mut reference = Reference::new(raw);
        extract_fields(&mut reference, style);
        reference
    }

    const TITLE: &str = "Network oversight and brokerage";

    #[test]
    fn test_apa_comma_inside_name() {
        let r = extracted(
            "Burt, R. S., & Merluzzi, J. (2016). Network oversight and brokerage. Social Networks, 45, 12-20.",
            &style(YearPlacement::AfterAuthors, true),
        );
        assert_eq!(r.year, Some(2016));
        assert_eq!(r.title.as_deref(), Some(TITLE));
        assert_eq!(
            r.authors,
            vec![Author::person("R. S.", "Burt"), Author::person("J.", "Merluzzi")]
        );
        assert!(r.gaps.is_empty());
    }

    #[test]
    fn test_apa_no_comma() {
        let r = extracted(
            "Burt RS, Merluzzi J (2016) Network oversight and brokerage. Social Networks 45: 12-20.",
            &style(YearPlacement::AfterAuthors, false),
        );
        assert_eq!(r.year, Some(2016));
        assert_eq!(r.title.as_deref(), Some(TITLE));
        assert_eq!(
            r.authors,
            vec![Author::person("R.S.", "Burt"), Author::person("J.", "Merluzzi")]
        );
    }

    #[test]
    fn test_iso690_comma_inside_name() {
        let raw = "BURT, R. S. and MERLUZZI, J. Network oversight and brokerage. Social Networks. 2016, vol. 45, pp. 12-20.";
        let r = extracted(raw, &style(YearPlacement::Trailing, true));
        assert_eq!(r.year, Some(2016));
        assert_eq!(r.title.as_deref(), Some(TITLE));
        assert_eq!(r.authors.len(), 2);
        assert_eq!(r.authors[1], Author::person("J.", "MERLUZZI"));
        assert_eq!(&raw[..r.spans.authors_end.unwrap()], "BURT, R. S. and MERLUZZI, J.");
    }

    #[test]
    fn test_iso690_no_comma() {
        let r = extracted(
            "Burt RS, Merluzzi J. Network oversight and brokerage. Social Networks 2016, 45: 12-20.",
            &style(YearPlacement::Trailing, false),
        );
        assert_eq!(r.year, Some(2016));
        assert_eq!(r.title.as_deref(), Some(TITLE));
        assert_eq!(r.authors.len(), 2);
    }

    #[test]
    fn test_iso690_takes_last_year() {
        let mut r = Reference::new("SMITH, A. Reprint of the 1999 study. Publisher, 2005.");
        let year = extract_year(&mut r, &style(YearPlacement::Trailing, true)).unwrap();
        assert_eq!(year, 2005);
        assert_eq!(r.spans.authors_end, None);
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_year() {
        let r = extracted(
            "Sharma, A. (19\u{096B}\u{0966}). Hindi title. Journal.",
            &style(YearPlacement::AfterAuthors, true),
        );
        assert_eq!(r.year, None);
        assert!(r.gaps.contains(&FieldGap::MissingYear));
        assert_eq!(r.authors, vec![Author::person("A.", "Sharma")]);
    }

    #[test]
    fn test_year_suffix_letter() {
        let mut r = Reference::new("Smith, A. (2020a). Title.");
        extract_year(&mut r, &style(YearPlacement::AfterAuthors, true)).unwrap();
        let span = r.spans.year.clone().unwrap();
        assert_eq!(&r.raw_text[span], "2020a");
        assert_eq!(r.year, Some(2020));
    }

    #[test]
    fn test_hyphenated_initials() {
        let r = extracted(
            "Dupont J-P, Martin C (2018) Reseaux sociaux. Revue 3: 1-9.",
            &style(YearPlacement::AfterAuthors, false),
        );
        assert_eq!(r.authors[0], Author::person("J.-P.", "Dupont"));
        assert_eq!(r.authors[1], Author::person("C.", "Martin"));
    }

    #[test]
    fn test_apa_institutional_author() {
        let r = extracted(
            "World Health Organization (2019). Global report on health. Geneva.",
            &style(YearPlacement::AfterAuthors, true),
        );
        assert_eq!(r.authors, vec![Author::institution("World Health Organization")]);
        assert!(r.has_institutional_author());
        assert_eq!(r.title.as_deref(), Some("Global report on health"));
    }

    #[test]
    fn test_iso690_institutional_author() {
        let r = extracted(
            "WORLD BANK. Annual development report. Washington: World Bank, 2019.",
            &style(YearPlacement::Trailing, true),
        );
        assert_eq!(r.authors, vec![Author::institution("WORLD BANK")]);
        assert_eq!(r.title.as_deref(), Some("Annual development report"));
    }

    #[test]
    fn test_missing_year_keeps_reference() {
        let r = extracted(
            "Smith, A. Undated manuscript. Unpublished.",
            &style(YearPlacement::AfterAuthors, true),
        );
        assert_eq!(r.year, None);
        assert!(r.gaps.contains(&FieldGap::MissingYear));
        assert!(r.gaps.contains(&FieldGap::TitleStartUnknown));
        assert_eq!(r.authors, vec![Author::person("A.", "Smith")]);
    }

    #[test]
    fn test_unterminated_title() {
        let r = extracted(
            "Smith, A. (2020). A title with no end",
            &style(YearPlacement::AfterAuthors, true),
        );
        assert_eq!(r.title, None);
        assert_eq!(r.gaps, vec![FieldGap::TitleUnterminated]);
    }

    #[test]
    fn test_semicolon_separator() {
        let mut s = style(YearPlacement::AfterAuthors, true);
        s.semicolon_separated = true;
        let r = extracted("Smith, A. (2020). Title, part one; Journal 4.", &s);
        assert_eq!(r.title.as_deref(), Some("Title, part one"));
    }

    #[test]
    fn test_title_without_start_is_reported() {
        let mut r = Reference::new("Smith, A. (2020). Title.");
        assert_eq!(
            extract_title(&mut r, &style(YearPlacement::AfterAuthors, true)),
            Err(FieldGap::TitleStartUnknown)
        );
    }

    #[test]
    fn test_count_authors_prefers_matching_grammar() {
        let raw = "Burt RS, Merluzzi J (2016) Network oversight and brokerage.";
        let comma = style(YearPlacement::AfterAuthors, true);
        let plain = style(YearPlacement::AfterAuthors, false);
        assert_eq!(count_authors(raw, &comma), 0);
        assert_eq!(count_authors(raw, &plain), 2);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("JA"), "J.A.");
        assert_eq!(initials("J-P"), "J.-P.");
        assert_eq!(initials("-"), "-");
    }
}
