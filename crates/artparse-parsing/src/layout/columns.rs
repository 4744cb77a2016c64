use std::collections::BTreeMap;

use crate::config::ParsingConfig;

use super::page_rows;

/// Find where the second column of a two-column page starts.
///
/// Every row is padded with spaces to the page width, so rows where the
/// right column has already ended still show the gutter. Pages no wider
/// than `column_min_line` are single-column. A row votes for a position
/// within `column_window` of the page midpoint when that position and the
/// one before it are blank; a single space between words is not a gutter.
/// If the tallest bar covers at least `column_ratio` of all rows, the
/// position right after it is the second column's offset. Ties go to the
/// rightmost position.
pub fn detect_columns(page: &str, config: &ParsingConfig) -> Option<usize> {
    let rows = page_rows(page);
    let width = rows.iter().map(Vec::len).max()?;
    if width <= config.column_min_line {
        return None;
    }

    let middle = width / 2;
    let blank = |row: &[char], pos: usize| row.get(pos).is_none_or(|c| c.is_whitespace());
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for row in &rows {
        let row = row.as_slice();
        for pos in 1..width {
            if pos.abs_diff(middle) < config.column_window && blank(row, pos) && blank(row, pos - 1)
            {
                *histogram.entry(pos).or_default() += 1;
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for (&pos, &count) in &histogram {
        if best.is_none_or(|(_, top)| count >= top) {
            best = Some((pos, count));
        }
    }

    let (pos, count) = best?;
    tracing::debug!(width, gutter = pos, rows = count, of = rows.len(), "column histogram peak");
    if count as f64 / rows.len() as f64 >= config.column_ratio {
        Some(pos + 1)
    } else {
        None
    }
}

/// Remove the indentation shared by every row. The first and last rows are
/// ignored when measuring (stray running heads and page numbers), as are
/// blank rows.
pub fn trim_left_margin(rows: &[String]) -> Vec<String> {
    let inner = if rows.len() > 2 {
        &rows[1..rows.len() - 1]
    } else {
        &[][..]
    };
    let indent = inner
        .iter()
        .filter(|row| !row.trim().is_empty())
        .map(|row| row.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            let skip = row
                .char_indices()
                .take(indent)
                .take_while(|(_, c)| c.is_whitespace())
                .last()
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            row[skip..].trim_end().to_string()
        })
        .collect()
}

/// Turn a page into single-column text. With a second-column offset, each
/// row is cut there and all left halves are emitted before all right halves.
pub fn reflow(page: &str, column_start: Option<usize>) -> String {
    let rows: Vec<String> = page.lines().map(str::to_string).collect();
    match column_start {
        None => trim_left_margin(&rows).join("\n"),
        Some(start) => {
            let (left, right): (Vec<String>, Vec<String>) = rows
                .iter()
                .map(|row| {
                    let left: String = row.chars().take(start).collect();
                    let right: String = row.chars().skip(start).collect();
                    (left, right)
                })
                .unzip();
            let mut out = trim_left_margin(&left);
            out.extend(trim_left_margin(&right));
            out.join("\n")
        }
    }
}
