use std::path::Path;

use mupdf::{Document, TextPageFlags};

use attendex_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so that the parsing
/// and storage crates do not transitively depend on it.
///
/// Text is read block by block and line by line, one output line per
/// MuPDF line, which keeps a subject code and its percentage on separate
/// lines the way the report tables are laid out.
#[derive(Debug, Default, Clone)]
pub struct MupdfBackend {
    /// Skip pages whose extracted text is only whitespace.
    skip_blank_pages: bool,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop pages that contain no text at all (scanned cover pages etc.).
    pub fn skip_blank_pages(mut self, skip: bool) -> Self {
        self.skip_blank_pages = skip;
        self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages = Vec::new();
        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    page_text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                    page_text.push('\n');
                }
            }

            if self.skip_blank_pages && page_text.trim().is_empty() {
                continue;
            }
            pages.push(page_text);
        }

        Ok(pages)
    }
}
