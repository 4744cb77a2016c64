use crate::config::MarginTolerance;

use super::page_rows;

/// Per-column character-class counts over every row of a page.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnCounts {
    space: usize,
    digit: usize,
    punct: usize,
    alpha: usize,
}

impl ColumnCounts {
    fn add(&mut self, c: char) {
        if c.is_whitespace() {
            self.space += 1;
        } else if c.is_numeric() {
            self.digit += 1;
        } else if matches!(c, ',' | ';' | '(' | ')' | '.' | '{' | '}' | '[' | ']') {
            self.punct += 1;
        } else if c.is_alphabetic() {
            self.alpha += 1;
        }
    }

    /// Every row holds whitespace, a digit or light punctuation here.
    fn blankish(&self, rows: usize) -> bool {
        self.space + self.digit + self.punct == rows
    }
}

/// Find the text block of a page as an inclusive `(start, end)` column range.
///
/// Rows are padded to the longest row. The left edge may contain up to five
/// letters and five digits per column under [`MarginTolerance::Text`] (line
/// numbers, gutter keywords). The ragged right edge only loses columns that
/// are nearly certain to be blank. Returns `None` when the page has no usable
/// rows or every column classifies as margin.
pub fn detect_margins(page: &str, tolerance: MarginTolerance) -> Option<(usize, usize)> {
    let rows = page_rows(page);
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return None;
    }
    let n = rows.len();

    let mut histogram = vec![ColumnCounts::default(); width];
    for row in &rows {
        for (col, counts) in histogram.iter_mut().enumerate() {
            counts.add(row.get(col).copied().unwrap_or(' '));
        }
    }

    let left_margin = |c: &&ColumnCounts| match tolerance {
        MarginTolerance::Strict => c.space == n,
        MarginTolerance::Numbers => c.blankish(n) && c.digit < 6,
        MarginTolerance::Text => c.alpha < 6 && c.digit < 6,
    };
    let right_margin = |c: &&ColumnCounts| match tolerance {
        MarginTolerance::Strict => c.space == n,
        _ => c.blankish(n) && c.digit < 2,
    };

    let start = histogram.iter().take_while(left_margin).count();
    let trailing = histogram.iter().rev().take_while(right_margin).count();
    if start + trailing >= width {
        return None;
    }
    Some((start, width - 1 - trailing))
}

/// Keep only columns `start..=end` of every row.
pub fn strip_margins(page: &str, (start, end): (usize, usize)) -> String {
    let keep = (end + 1).saturating_sub(start);
    page.lines()
        .map(|line| {
            let kept: String = line.chars().skip(start).take(keep).collect();
            kept.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
