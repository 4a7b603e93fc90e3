pub mod poppler;
pub mod style;

use crate::error::BiometryError;
use serde::{Deserialize, Serialize};
pub use style::BoldMarker;

/// A point in page space. Origin is top-left, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One run of text on a page, positioned by its origin point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub origin: Point,
    pub font: String,
    /// Style bitmask; see [`style`] for the bit layout used by the poppler backend.
    pub flags: u32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        TextSpan {
            text: text.into(),
            origin: Point { x, y },
            font: String::new(),
            flags: 0,
        }
    }

    pub fn with_style(mut self, font: impl Into<String>, flags: u32) -> Self {
        self.font = font.into();
        self.flags = flags;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub number: usize,
    pub width: f64,
    pub height: f64,
    pub spans: Vec<TextSpan>,
}

/// Everything the parsers need from one PDF file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Document metadata title, e.g. "IOL-Haigis" or "MMT-Full".
    pub title: String,
    pub pages: Vec<Page>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract the title and positioned text spans from PDF bytes.
    fn extract(&self, pdf_bytes: &[u8]) -> Result<Document, BiometryError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;

    /// How this backend marks bold text in [`TextSpan::flags`].
    fn bold_marker(&self) -> BoldMarker {
        BoldMarker::default()
    }
}
