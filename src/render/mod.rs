//! Format adapters turning a resolved document into file bytes.

use std::path::PathBuf;

use crate::config::ReportFormat;
use crate::error::ReportError;
use crate::resolve::{DocumentFrame, PageStream};

pub mod pdf;
pub mod xlsx;

pub use pdf::PdfRenderer;
pub use xlsx::XlsxRenderer;

/// Renders a resolved document into the bytes of one output file.
///
/// Pages are pulled from `pages` in order; an error yielded by the stream
/// aborts the render and is returned unchanged.
pub trait DocumentRenderer {
    fn render(&self, frame: &DocumentFrame, pages: &mut PageStream<'_>)
        -> Result<Vec<u8>, ReportError>;
}

/// Returns the adapter for `format`. `font_dir` is only used for PDF output.
pub fn renderer_for(format: ReportFormat, font_dir: Option<PathBuf>) -> Box<dyn DocumentRenderer> {
    match format {
        ReportFormat::Pdf => Box::new(PdfRenderer::new().with_font_dir(font_dir)),
        ReportFormat::Excel => Box::new(XlsxRenderer::new()),
    }
}
