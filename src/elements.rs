//! `genpdf` element helpers used by the PDF renderer.
//!
//! This module covers the logo image (decoded with the [`image`] crate and
//! scaled to a fixed width), label/value lines for the header and footer
//! blocks, and the bordered grid table.

use std::path::Path;

use image::GenericImageView;

use genpdf::elements::{FrameCellDecorator, Image, LinearLayout, Paragraph, TableLayout};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element, Mm, Scale, Size};

use crate::resolve::ResolvedField;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

/// Cell padding inside the grid table.
const CELL_PADDING_MM: i32 = 1;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open logo file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine logo image format")?
        .decode()
        .with_context(|| format!("Failed to decode logo file {}", path.display()))
}

/// Builds a right-aligned logo element scaled to `width_mm` while keeping
/// the aspect ratio.
pub fn logo_element(image: image::DynamicImage, width_mm: f64) -> Result<Image, Error> {
    let natural = mm_to_f64(estimated_image_size(&image, DEFAULT_IMAGE_DPI).width);
    let mut logo = Image::from_dynamic_image(image)?;
    logo.set_alignment(Alignment::Right);
    if natural > f64::EPSILON {
        let scale = width_mm / natural;
        logo.set_scale(Scale::new(scale, scale));
    }
    Ok(logo)
}

/// A single `label: value` line with a bold label.
pub fn field_line(field: &ResolvedField, style: Style) -> Paragraph {
    let mut paragraph = Paragraph::new(StyledString::new(
        format!("{}: ", field.label),
        style.bold(),
    ));
    paragraph.push(StyledString::new(field.value.clone(), style));
    paragraph
}

/// Lays out fields in two columns, filling rows left to right.
pub fn field_table(fields: &[ResolvedField], style: Style) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(vec![1, 1]);
    for pair in fields.chunks(2) {
        let mut cells: Vec<Box<dyn Element>> = pair
            .iter()
            .map(|field| Box::new(field_line(field, style)) as Box<dyn Element>)
            .collect();
        if cells.len() < 2 {
            cells.push(Box::new(Paragraph::new("")));
        }
        table.push_row(cells)?;
    }
    Ok(table)
}

/// Stacks fields vertically, one line each.
pub fn field_lines(fields: &[ResolvedField], style: Style) -> LinearLayout {
    let mut layout = LinearLayout::vertical();
    for field in fields {
        layout.push(field_line(field, style));
    }
    layout
}

/// Bordered table with a bold label row followed by the data rows.
pub fn grid_table(
    weights: Vec<usize>,
    labels: &[&str],
    rows: &[Vec<String>],
    style: Style,
) -> Result<TableLayout, Error> {
    let mut table = TableLayout::new(weights);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let label_style = style.bold();
    let header: Vec<Box<dyn Element>> = labels
        .iter()
        .map(|label| {
            Box::new(Paragraph::new(StyledString::new(*label, label_style)).padded(CELL_PADDING_MM))
                as Box<dyn Element>
        })
        .collect();
    table.push_row(header)?;

    for row in rows {
        let cells: Vec<Box<dyn Element>> = row
            .iter()
            .map(|value| {
                Box::new(Paragraph::new(StyledString::new(value.clone(), style)).padded(CELL_PADDING_MM))
                    as Box<dyn Element>
            })
            .collect();
        table.push_row(cells)?;
    }

    Ok(table)
}
