//! PDF adapter built on `genpdf`.
//!
//! Header and footer are drawn by the page decorator and therefore repeat on
//! every physical page. Each data page becomes one bordered table; data pages
//! are separated by explicit page breaks.

use std::path::PathBuf;

use genpdf::elements::{Break, LinearLayout, PageBreak, Paragraph, TableLayout};
use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element, Size};
use log::debug;

use crate::builder::DocumentBuilder;
use crate::config::PAGE_MARGIN_MM;
use crate::elements::{
    decode_image_from_path, field_lines, field_table, grid_table, logo_element, mm_from_f64,
};
use crate::error::ReportError;
use crate::fonts;
use crate::render::DocumentRenderer;
use crate::resolve::{DocumentFrame, PageStream, ResolvedField};

/// Body font size in points.
pub const DEFAULT_FONT_SIZE: u8 = 9;
const TITLE_FONT_SIZE: u8 = 14;
const FOOTER_FONT_SIZE: u8 = 8;
/// Rendered width of the header logo.
pub const LOGO_WIDTH_MM: f64 = 30.0;
const FOOTER_LINE_HEIGHT_MM: f64 = 5.0;
const FOOTER_TOP_PADDING_MM: f64 = 2.0;

/// Renders grid reports as PDF documents.
#[derive(Clone, Debug)]
pub struct PdfRenderer {
    font_dir: Option<PathBuf>,
    font_size: u8,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            font_dir: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches this directory first when loading fonts.
    pub fn with_font_dir(mut self, font_dir: impl Into<Option<PathBuf>>) -> Self {
        self.font_dir = font_dir.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u8) -> Self {
        self.font_size = font_size;
        self
    }

    fn document(&self, frame: &DocumentFrame) -> Result<genpdf::Document, ReportError> {
        let logo = match &frame.logo {
            Some(path) => Some(decode_image_from_path(path).map_err(|err| {
                ReportError::render(format!("logo {}", path.display()), err)
            })?),
            None => None,
        };

        let title = frame.title.clone();
        let header_fields = frame.header_fields.clone();
        let body_style = Style::new().with_font_size(self.font_size);
        let header = move |_page: usize| -> Result<Box<dyn Element>, Error> {
            let mut layout = LinearLayout::vertical();
            let title_line = Paragraph::new(StyledString::new(
                title.clone(),
                Style::new().bold().with_font_size(TITLE_FONT_SIZE),
            ));

            match &logo {
                Some(image) => {
                    let mut banner = TableLayout::new(vec![3, 1]);
                    let cells: Vec<Box<dyn Element>> = vec![
                        Box::new(title_line),
                        Box::new(logo_element(image.clone(), LOGO_WIDTH_MM)?),
                    ];
                    banner.push_row(cells)?;
                    layout.push(banner);
                }
                None => layout.push(title_line),
            }

            if !header_fields.is_empty() {
                layout.push(field_table(&header_fields, body_style)?);
            }
            layout.push(Break::new(1));
            Ok(Box::new(layout))
        };

        let (width, height) = frame.page_format.size_mm();
        let mut builder = DocumentBuilder::new()
            .with_title(frame.title.clone())
            .with_paper_size(Size::new(mm_from_f64(width), mm_from_f64(height)))
            .with_margins(mm_from_f64(PAGE_MARGIN_MM))
            .with_font_dir(self.font_dir.clone())
            .with_font_size(self.font_size)
            .with_header(header);

        let footer_lines = footer_line_count(frame);
        if footer_lines > 0 {
            let footer_fields = frame.footer_fields.clone();
            let show_page_numbers = frame.show_page_numbers;
            let height = FOOTER_TOP_PADDING_MM + FOOTER_LINE_HEIGHT_MM * footer_lines as f64;
            builder = builder.with_footer(mm_from_f64(height), move |page| {
                let footer: Box<dyn Element> =
                    Box::new(footer_element(&footer_fields, show_page_numbers, page));
                Ok(footer)
            });
        }

        builder.build().map_err(|err| {
            let context = if fonts::is_missing_fonts(&err) {
                "fonts"
            } else {
                "PDF document setup"
            };
            ReportError::render(context, err)
        })
    }
}

fn footer_line_count(frame: &DocumentFrame) -> usize {
    frame.footer_fields.len() + usize::from(frame.show_page_numbers)
}

fn footer_element(fields: &[ResolvedField], show_page_numbers: bool, page: usize) -> LinearLayout {
    let style = Style::new().with_font_size(FOOTER_FONT_SIZE);
    let mut layout = LinearLayout::vertical();
    layout.push(Break::new(0.5));
    layout.push(field_lines(fields, style));
    if show_page_numbers {
        let mut page_line = Paragraph::new(StyledString::new(format!("Page {page}"), style));
        page_line.set_alignment(Alignment::Right);
        layout.push(page_line);
    }
    layout
}

impl DocumentRenderer for PdfRenderer {
    fn render(
        &self,
        frame: &DocumentFrame,
        pages: &mut PageStream<'_>,
    ) -> Result<Vec<u8>, ReportError> {
        let mut document = self.document(frame)?;
        let weights: Vec<usize> = frame.columns.iter().map(|column| column.weight).collect();
        let labels: Vec<&str> = frame.labels().collect();
        let body_style = Style::new().with_font_size(self.font_size);

        let mut page_count = 0usize;
        for page in pages {
            let page = page?;
            if page_count > 0 {
                document.push(PageBreak::new());
            }
            let table = grid_table(weights.clone(), &labels, &page.rows, body_style)
                .map_err(|err| ReportError::render(format!("data page {}", page.index), err))?;
            document.push(table);
            debug!("laid out data page {} ({} rows)", page.index, page.rows.len());
            page_count += 1;
        }

        let mut bytes = Vec::new();
        document
            .render(&mut bytes)
            .map_err(|err| ReportError::render("PDF document", err))?;
        debug!("encoded {} data pages into {} PDF bytes", page_count, bytes.len());
        Ok(bytes)
    }
}
