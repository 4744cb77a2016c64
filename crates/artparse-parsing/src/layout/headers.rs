use crate::config::ParsingConfig;
use crate::text_processing::collapse_whitespace;

/// Number of running-header and running-footer lines shared by every page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderFooter {
    pub header_lines: usize,
    pub footer_lines: usize,
}

impl HeaderFooter {
    pub fn is_empty(&self) -> bool {
        self.header_lines == 0 && self.footer_lines == 0
    }
}

/// Mean similarity between consecutive sampled pages' versions of one line.
fn mean_similarity(lines: &[&str]) -> f64 {
    if lines.len() < 2 {
        return 0.0;
    }
    let total: f64 = lines
        .windows(2)
        .map(|pair| {
            if pair[0].is_empty() && pair[1].is_empty() {
                1.0
            } else {
                rapidfuzz::fuzz::ratio(pair[0].chars(), pair[1].chars())
            }
        })
        .sum();
    total / (lines.len() - 1) as f64
}

/// Count leading and trailing lines that repeat across pages.
///
/// Every second page is sampled (even or odd per config) because running
/// heads usually alternate between recto and verso. A line position counts
/// as header/footer when the mean similarity of consecutive samples exceeds
/// the configured threshold; scanning stops in a direction at the first
/// position that does not. Header and footer never overlap.
pub fn detect_headers_footers(pages: &[String], config: &ParsingConfig) -> HeaderFooter {
    if pages.len() < config.min_pages_for_headers {
        return HeaderFooter::default();
    }

    let sampled: Vec<Vec<String>> = pages
        .iter()
        .skip(config.page_parity.first_page())
        .step_by(2)
        .map(|page| page.lines().map(collapse_whitespace).collect())
        .collect();
    if sampled.len() < 2 {
        return HeaderFooter::default();
    }

    let shortest = pages.iter().map(|p| p.lines().count()).min().unwrap_or(0);
    let repeats = |pick: &dyn Fn(&Vec<String>) -> Option<usize>| -> bool {
        let lines: Option<Vec<&str>> = sampled
            .iter()
            .map(|page| pick(page).and_then(|i| page.get(i)).map(String::as_str))
            .collect();
        lines.is_some_and(|lines| mean_similarity(&lines) > config.header_similarity)
    };

    let mut header_lines = 0;
    while header_lines < shortest && repeats(&|_| Some(header_lines)) {
        header_lines += 1;
    }

    let mut footer_lines = 0;
    while header_lines + footer_lines < shortest
        && repeats(&|page| page.len().checked_sub(footer_lines + 1))
    {
        footer_lines += 1;
    }

    if header_lines > 0 || footer_lines > 0 {
        tracing::debug!(header_lines, footer_lines, "detected running headers/footers");
    }
    HeaderFooter {
        header_lines,
        footer_lines,
    }
}

/// Drop the leading header and trailing footer lines of a page.
pub fn strip_headers_footers(page: &str, header_footer: HeaderFooter) -> String {
    let lines: Vec<&str> = page.lines().collect();
    let end = lines.len().saturating_sub(header_footer.footer_lines);
    let start = header_footer.header_lines.min(end);
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PageParity, ParsingConfigBuilder};

    fn page(header: &str, body: &str, footer: &str) -> String {
        format!("{}\n{}\n{}", header, body, footer)
    }

    #[test]
    fn test_shared_first_line_is_header() {
        let pages: Vec<String> = (0..6)
            .map(|i| {
                page(
                    "Journal of Network Studies",
                    &format!("Body text number {} discussing topic {}", i, i * 7),
                    &format!("Closing remark {} with different wording entirely {}", i, i * i),
                )
            })
            .collect();
        let hf = detect_headers_footers(&pages, &ParsingConfig::default());
        assert!(hf.header_lines >= 1);
    }

    #[test]
    fn test_page_numbers_in_footer() {
        let bodies = [
            "Qualitative interviews were coded twice",
            "Regression tables follow in the appendix",
            "Table 3: 0.42 0.17 (n=118)",
            "We now turn to the limitations of scope",
        ];
        let pages: Vec<String> = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| page("", b, &format!("Sociology Quarterly   page {}", i + 1)))
            .collect();
        let hf = detect_headers_footers(&pages, &ParsingConfig::default());
        assert_eq!(hf.footer_lines, 1);
        assert_eq!(hf.header_lines, 1);
    }

    #[test]
    fn test_too_few_pages() {
        let pages: Vec<String> = (0..3).map(|_| page("Same", "Same", "Same")).collect();
        assert!(detect_headers_footers(&pages, &ParsingConfig::default()).is_empty());
    }

    #[test]
    fn test_odd_parity_samples_other_pages() {
        let pages: Vec<String> = (0..4)
            .map(|i| {
                let header = if i % 2 == 1 {
                    "Running title".to_string()
                } else {
                    format!("Author {} et al. {}", i, "x".repeat(i * 5))
                };
                page(&header, &format!("Unrelated body {}", i), &format!("{}", i * 1000))
            })
            .collect();
        let config = ParsingConfigBuilder::new()
            .page_parity(PageParity::Odd)
            .build()
            .unwrap();
        assert!(detect_headers_footers(&pages, &config).header_lines >= 1);
    }

    #[test]
    fn test_strip_headers_footers() {
        let hf = HeaderFooter {
            header_lines: 1,
            footer_lines: 2,
        };
        assert_eq!(strip_headers_footers("h\nbody\nf1\nf2", hf), "body");
        assert_eq!(strip_headers_footers("h\nf", hf), "");
    }
}
