use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageSourceError {
    #[error("page source unavailable: {}", .0.display())]
    Unavailable(PathBuf),
    #[error("failed to read pages: {0}")]
    NotReadable(String),
    #[error("document has no extractable text (image-only pages need OCR)")]
    NoText,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for page text sources.
///
/// Implementors turn a document on disk into an ordered, finite list of
/// per-page text renderings; layout normalization and reference parsing
/// live in `artparse_parsing::ReferenceExtractor`.
pub trait PageSource: Send + Sync {
    /// Read every page of the document at `path`, in order.
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, PageSourceError>;
}

/// Validate what a page source produced: zero pages means the source is
/// unavailable, and a document whose pages are all blank needs OCR first.
pub fn check_pages(path: &Path, pages: &[String]) -> Result<(), PageSourceError> {
    if pages.is_empty() {
        return Err(PageSourceError::Unavailable(path.to_path_buf()));
    }
    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(PageSourceError::NoText);
    }
    Ok(())
}

/// Path where an OCR'd copy of `path` is expected: `paper.pdf` -> `paper-ocr.pdf`.
pub fn ocr_sibling_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-ocr.{}", stem, ext.to_string_lossy()),
        None => format!("{}-ocr", stem),
    };
    path.with_file_name(name)
}

/// Reads pre-extracted text where pages are separated by form feeds
/// (the `pdftotext -layout` output convention).
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFilePageSource;

impl TextFilePageSource {
    pub fn new() -> Self {
        Self
    }

    /// Split already-loaded text into pages.
    pub fn split_pages(text: &str) -> Vec<String> {
        let mut pages: Vec<String> = text.split('\x0c').map(|p| p.to_string()).collect();
        // pdftotext terminates the last page with a form feed too
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        pages
    }
}

impl PageSource for TextFilePageSource {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, PageSourceError> {
        if !path.exists() {
            return Err(PageSourceError::Unavailable(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => PageSourceError::NotReadable(e.to_string()),
            _ => PageSourceError::Io(e),
        })?;
        let pages = Self::split_pages(&text);
        tracing::debug!(path = %path.display(), pages = pages.len(), "read text pages");
        Ok(pages)
    }
}
