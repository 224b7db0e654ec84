//! Document viewer dispatch and PDF paging/zoom state.
//!
//! Dispatch happens once, preferring the kind carried on the record and
//! falling back to the URL extension for legacy rows. PDF renders inline
//! with prev/next and a clamped zoom; Word kinds hand off to the HTML
//! converter; anything else degrades to a download affordance.

use crate::db::models::DocumentKind;

/// How a document gets presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    Pdf,
    Docx,
    Doc,
    /// Fall back to a download/open-externally affordance.
    Unknown,
}

impl ViewerKind {
    pub fn dispatch(kind: Option<DocumentKind>, file_url: &str) -> Self {
        match kind {
            Some(DocumentKind::Pdf) => ViewerKind::Pdf,
            Some(DocumentKind::Docx) => ViewerKind::Docx,
            Some(DocumentKind::Doc) => ViewerKind::Doc,
            None => Self::from_url(file_url),
        }
    }

    fn from_url(file_url: &str) -> Self {
        let path = file_url.split(['?', '#']).next().unwrap_or(file_url);
        match path.rsplit('.').next().map(str::to_lowercase).as_deref() {
            Some("pdf") => ViewerKind::Pdf,
            Some("docx") => ViewerKind::Docx,
            Some("doc") => ViewerKind::Doc,
            _ => ViewerKind::Unknown,
        }
    }

    /// Word kinds go through the HTML converter; unknown kinds are download
    /// only.
    pub fn renders_inline(self) -> bool {
        !matches!(self, ViewerKind::Unknown)
    }
}

pub const PDF_MIN_SCALE: f32 = 0.5;
pub const PDF_MAX_SCALE: f32 = 2.5;
const PDF_SCALE_STEP: f32 = 0.25;

/// Page-by-page PDF viewer state. The page count arrives asynchronously
/// from the renderer; until then navigation stays pinned to page 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfViewer {
    page: u32,
    num_pages: Option<u32>,
    scale: f32,
}

impl Default for PdfViewer {
    fn default() -> Self {
        Self {
            page: 1,
            num_pages: None,
            scale: 1.0,
        }
    }
}

impl PdfViewer {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn num_pages(&self) -> Option<u32> {
        self.num_pages
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Renderer reported the page count. A shrunken count pulls the current
    /// page back into range.
    pub fn document_loaded(&mut self, num_pages: u32) {
        let num_pages = num_pages.max(1);
        self.num_pages = Some(num_pages);
        self.page = self.page.min(num_pages);
    }

    pub fn next_page(&mut self) {
        let last = self.num_pages.unwrap_or(1);
        self.page = (self.page + 1).min(last);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + PDF_SCALE_STEP).min(PDF_MAX_SCALE);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - PDF_SCALE_STEP).max(PDF_MIN_SCALE);
    }
}
