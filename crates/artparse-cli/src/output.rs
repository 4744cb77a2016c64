use std::io::Write;

use artparse_core::{ExtractionResult, Reference, ReferenceStyle};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn describe_style(style: &ReferenceStyle) -> String {
    let mut parts = vec![style.year_placement.to_string()];
    if style.year_parenthesized {
        parts.push("parenthesized years".to_string());
    }
    if style.semicolon_separated {
        parts.push("semicolon separated".to_string());
    }
    parts.push(if style.comma_inside_name {
        "Lastname, F.".to_string()
    } else {
        "Lastname F".to_string()
    });
    parts.join(", ")
}

/// Print the header block: file name, layout and style, counts.
pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let stats = &result.stats;
    if color.enabled() {
        writeln!(w, "{} {}", "Parsed".bold().cyan(), file_name.bold())?;
    } else {
        writeln!(w, "Parsed {}", file_name)?;
    }
    writeln!(
        w,
        "{} pages ({} two-column), {} header / {} footer lines removed",
        stats.pages, stats.two_column_pages, stats.header_lines, stats.footer_lines
    )?;

    if !result.found_bibliography() {
        if color.enabled() {
            writeln!(w, "{}", "could not locate bibliography".red())?;
        } else {
            writeln!(w, "could not locate bibliography")?;
        }
        return Ok(());
    }

    if let Some(layout) = result.layout {
        writeln!(w, "Layout: {:?}", layout)?;
    }
    match &result.style {
        Some(style) => writeln!(w, "Style:  {}", describe_style(style))?,
        None => writeln!(w, "Style:  (undetermined)")?,
    }

    let notes = format!(
        "({} segmented, {} trailing dropped, {} repetition marks expanded)",
        stats.segmented, stats.trailing_dropped, stats.repetition_marks_expanded
    );
    if color.enabled() {
        writeln!(w, "{}", notes.dimmed())?;
    } else {
        writeln!(w, "{}", notes)?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print one reference in its `authors | year | title` rendering.
pub fn print_reference(
    w: &mut dyn Write,
    index: usize,
    reference: &Reference,
    raw: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        write!(w, "{} ", format!("[{}]", index + 1).bold().yellow())?;
    } else {
        write!(w, "[{}] ", index + 1)?;
    }
    writeln!(w, "{}", reference)?;

    if !reference.gaps.is_empty() {
        let gaps: Vec<String> = reference.gaps.iter().map(|g| g.to_string()).collect();
        let line = format!("    ({})", gaps.join("; "));
        if color.enabled() {
            writeln!(w, "{}", line.red())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }

    if raw {
        let display = if reference.raw_text.chars().count() > 200 {
            let cut: String = reference.raw_text.chars().take(200).collect();
            format!("{}...", cut)
        } else {
            reference.raw_text.clone()
        };
        if color.enabled() {
            writeln!(w, "    {}", display.dimmed())?;
        } else {
            writeln!(w, "    {}", display)?;
        }
    }
    Ok(())
}

/// Print the whole extraction result.
pub fn print_result(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    raw: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    print_summary(w, file_name, result, color)?;
    if !result.found_bibliography() {
        return Ok(());
    }
    for (i, reference) in result.references.iter().enumerate() {
        print_reference(w, i, reference, raw, color)?;
    }

    let stats = &result.stats;
    writeln!(w)?;
    writeln!(
        w,
        "Total: {} references ({} without year, {} without title, {} institutional)",
        result.references.len(),
        stats.missing_year,
        stats.missing_title,
        stats.institutional
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use artparse_core::{Author, ExtractionStats, FieldGap, ReferenceLayout, YearPlacement};

    fn sample() -> ExtractionResult {
        let mut found = Reference::new("Burt, R. S. (1992). Structural holes. Harvard.");
        found.authors = vec![Author::person("R. S.", "Burt")];
        found.year = Some(1992);
        found.title = Some("Structural holes".to_string());
        let mut gap = Reference::new("Anonymous notes");
        gap.gaps.push(FieldGap::MissingYear);

        ExtractionResult {
            references: vec![found, gap],
            section_start: Some(10),
            layout: Some(ReferenceLayout::AuthorYear),
            style: Some(ReferenceStyle {
                year_placement: YearPlacement::AfterAuthors,
                year_parenthesized: true,
                semicolon_separated: false,
                comma_inside_name: true,
            }),
            stats: ExtractionStats {
                pages: 3,
                missing_year: 1,
                missing_title: 1,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_print_result_plain() {
        let mut out = Vec::new();
        print_result(&mut out, "paper.pdf", &sample(), false, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Parsed paper.pdf\n"));
        assert!(text.contains("Style:  apa, parenthesized years, Lastname, F."));
        assert!(text.contains("[1] Burt, R. S. | 1992 | Structural holes\n"));
        assert!(text.contains("[2] - | - | -\n    (no publication year found)\n"));
        assert!(text.contains("Total: 2 references (1 without year, 1 without title, 0 institutional)"));
    }

    #[test]
    fn test_print_result_without_bibliography() {
        let result = ExtractionResult {
            stats: ExtractionStats {
                pages: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut out = Vec::new();
        print_result(&mut out, "essay.pdf", &result, false, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("could not locate bibliography"));
        assert!(!text.contains("Total:"));
    }

    #[test]
    fn test_raw_text_is_shown_on_request() {
        let mut out = Vec::new();
        print_reference(&mut out, 0, &sample().references[0], true, ColorMode(false)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("    Burt, R. S. (1992). Structural holes. Harvard.\n"));
    }
}
