use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Second halves of hyphenated compounds that should keep their hyphen
/// when a line break splits them.
static COMPOUND_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "based",
        "driven",
        "oriented",
        "specific",
        "related",
        "dependent",
        "independent",
        "like",
        "free",
        "scale",
        "level",
        "term",
        "time",
        "wide",
        "making",
        "economic",
        "political",
        "american",
        "european",
    ]
    .into_iter()
    .collect()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Expand common typographic ligatures found in PDF text layers.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Replace every whitespace run with a single space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Rejoin words split across lines by a hyphen.
///
/// - `"Sociol- ogy"` → `"Sociology"` (syllable break)
/// - `"evidence- based"` → `"evidence-based"` (compound word)
/// - `"1990- 2000"` is left alone (the regex requires letters)
pub fn fix_hyphenation(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L})-\s+(\p{Ll})(\w*)").unwrap());

    RE.replace_all(text, |caps: &regex::Captures| {
        let before = &caps[1];
        let after_word = format!("{}{}", &caps[2], &caps[3]);
        let after_lower = after_word.to_lowercase();

        if COMPOUND_SUFFIXES.contains(after_lower.as_str()) {
            format!("{}-{}", before, after_word)
        } else {
            format!("{}{}", before, after_word)
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_ligatures() {
        assert_eq!(expand_ligatures("ﬁnding ﬂow"), "finding flow");
        assert_eq!(expand_ligatures("eﬃcient oﬄine"), "efficient offline");
        assert_eq!(expand_ligatures("no ligatures here"), "no ligatures here");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Smith,\n A.   2020.\t"), "Smith, A. 2020.");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_fix_hyphenation_syllable_break() {
        assert_eq!(fix_hyphenation("Sociol- ogy"), "Sociology");
        assert_eq!(fix_hyphenation("organi-\nzation"), "organization");
    }

    #[test]
    fn test_fix_hyphenation_compound_word() {
        assert_eq!(fix_hyphenation("evidence- based"), "evidence-based");
        assert_eq!(fix_hyphenation("long- term care"), "long-term care");
    }

    #[test]
    fn test_fix_hyphenation_leaves_ranges_and_names() {
        assert_eq!(fix_hyphenation("pp. 12- 34"), "pp. 12- 34");
        // capitalized second half is a double-barrelled name, not a break
        assert_eq!(fix_hyphenation("Lévi- Strauss"), "Lévi- Strauss");
    }
}
