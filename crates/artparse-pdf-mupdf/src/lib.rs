use std::path::Path;

use mupdf::{Document, TextPageFlags};

use artparse_core::{PageSource, PageSourceError};

/// MuPDF-based implementation of [`PageSource`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that plain-text inputs do not transitively
/// depend on it.
///
/// Pages are rendered the way `pdftotext -layout` renders them: glyphs are
/// grouped into rows by baseline and placed on a monospace grid, so
/// indentation and column gutters survive as runs of spaces. Nothing is
/// filtered out here; running headers, footers and margins are removed by
/// layout normalization downstream.
pub struct MupdfPageSource {
    /// Width of one grid cell as a fraction of the median glyph size.
    cell_ratio: f32,
}

impl Default for MupdfPageSource {
    fn default() -> Self {
        Self { cell_ratio: 0.5 }
    }
}

/// One glyph with its position on the page.
struct Glyph {
    c: char,
    x: f32,
    y: f32,
    size: f32,
}

impl MupdfPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid cell width relative to the median font size. Smaller
    /// values preserve more whitespace.
    pub fn with_cell_ratio(mut self, ratio: f32) -> Self {
        if ratio > 0.0 {
            self.cell_ratio = ratio;
        }
        self
    }

    fn layout_page(&self, mut glyphs: Vec<Glyph>, left: f32) -> String {
        if glyphs.is_empty() {
            return String::new();
        }

        let mut sizes: Vec<f32> = glyphs.iter().map(|g| g.size).collect();
        sizes.sort_by(f32::total_cmp);
        let cell = (sizes[sizes.len() / 2] * self.cell_ratio).max(1.0);

        glyphs.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        // Rows: consecutive glyphs whose baselines lie within half a glyph.
        let mut rows: Vec<Vec<Glyph>> = Vec::new();
        for glyph in glyphs {
            match rows.last_mut() {
                Some(row) if (glyph.y - row[0].y).abs() <= row[0].size.max(glyph.size) * 0.5 => {
                    row.push(glyph)
                }
                _ => rows.push(vec![glyph]),
            }
        }

        let mut lines = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            let mut line = String::new();
            let mut cursor = 0usize;
            for glyph in row {
                let col = ((glyph.x - left).max(0.0) / cell).round() as usize;
                let col = col.max(cursor);
                line.extend(std::iter::repeat_n(' ', col - cursor));
                line.push(glyph.c);
                cursor = col + 1;
            }
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

impl PageSource for MupdfPageSource {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, PageSourceError> {
        if !path.exists() {
            return Err(PageSourceError::Unavailable(path.to_path_buf()));
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| PageSourceError::NotReadable("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| PageSourceError::NotReadable(e.to_string()))?;

        let mut pages = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| PageSourceError::NotReadable(e.to_string()))?
        {
            let page = page_result.map_err(|e| PageSourceError::NotReadable(e.to_string()))?;
            let bounds = page
                .bounds()
                .map_err(|e| PageSourceError::NotReadable(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| PageSourceError::NotReadable(e.to_string()))?;

            let mut glyphs = Vec::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    for ch in line.chars() {
                        let origin = ch.origin();
                        glyphs.push(Glyph {
                            c: ch.char().unwrap_or('\u{FFFD}'),
                            x: origin.x,
                            y: origin.y,
                            size: ch.size(),
                        });
                    }
                }
            }
            pages.push(self.layout_page(glyphs, bounds.x0));
        }

        tracing::debug!(path = %path.display(), pages = pages.len(), "read pdf pages");
        Ok(pages)
    }
}
