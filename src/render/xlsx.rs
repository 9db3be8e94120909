//! XLSX adapter built on `rust_xlsxwriter`.
//!
//! The workbook holds one worksheet. The header block is written once above
//! the grid and the footer block once below it. Data page boundaries become
//! manual row breaks so a printout follows the same pagination as the PDF.

use log::{debug, warn};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet, XlsxError};

use crate::config::PageFormat;
use crate::error::ReportError;
use crate::render::DocumentRenderer;
use crate::resolve::{DocumentFrame, PageStream, ResolvedField};

/// Maximum length of a worksheet name.
pub const SHEET_NAME_MAX_LEN: usize = 31;
/// Characters Excel rejects in worksheet names.
pub const SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];
const DEFAULT_SHEET_NAME: &str = "Report";

/// Excel worksheet maximum row count.
pub const MAX_ROWS: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const MAX_COLUMNS: usize = 16_384;
const MAX_COLUMN_WIDTH: f64 = 255.0;
/// Excel keeps at most this many manual breaks per worksheet.
pub const MAX_PAGE_BREAKS: usize = 1023;

/// Printed width of one character of the default font.
const MM_PER_CHARACTER: f64 = 2.0;

/// Print footer used when page numbers are enabled.
pub const PAGE_NUMBER_FOOTER: &str = "&C&P / &N";

struct Formats {
    title: Format,
    label: Format,
    column_label: Format,
    cell: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(14),
            label: Format::new().set_bold(),
            column_label: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color("#D9D9D9")
                .set_border(FormatBorder::Thin),
            cell: Format::new().set_text_wrap().set_border(FormatBorder::Thin),
        }
    }
}

/// Renders grid reports as single-sheet XLSX workbooks.
#[derive(Clone, Debug, Default)]
pub struct XlsxRenderer;

impl XlsxRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// Replaces characters Excel rejects and trims to the maximum length.
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if SHEET_NAME_ILLEGAL.contains(&c) { '_' } else { c })
        .collect();
    let truncated: String = cleaned.chars().take(SHEET_NAME_MAX_LEN).collect();
    let trimmed = truncated.trim().trim_matches('\'').trim();
    if trimmed.is_empty() {
        return DEFAULT_SHEET_NAME.to_string();
    }
    trimmed.to_string()
}

/// Paper size code understood by Excel.
fn paper_code(page_format: PageFormat) -> u8 {
    match page_format {
        PageFormat::A4 | PageFormat::A4Landscape => 9,
        PageFormat::Letter => 1,
        PageFormat::Legal => 5,
    }
}

fn row_num(index: usize) -> Result<u32, XlsxError> {
    if index >= MAX_ROWS {
        return Err(XlsxError::RowColumnLimitError);
    }
    // MAX_ROWS fits into u32.
    Ok(index as u32)
}

fn col_num(index: usize) -> Result<u16, XlsxError> {
    if index >= MAX_COLUMNS {
        return Err(XlsxError::RowColumnLimitError);
    }
    Ok(index as u16)
}

fn xlsx_error(context: impl Into<String>) -> impl FnOnce(XlsxError) -> ReportError {
    let context = context.into();
    move |err| ReportError::render(context, err)
}

fn write_fields(
    worksheet: &mut Worksheet,
    fields: &[ResolvedField],
    first_row: usize,
    formats: &Formats,
    block: &str,
) -> Result<usize, ReportError> {
    let mut row = first_row;
    for field in fields {
        let context = format!("{block} field `{}`", field.label);
        row_num(row)
            .and_then(|worksheet_row| {
                worksheet.write_string_with_format(
                    worksheet_row,
                    0,
                    field.label.as_str(),
                    &formats.label,
                )?;
                worksheet.write_string(worksheet_row, 1, field.value.as_str())?;
                Ok(())
            })
            .map_err(xlsx_error(context))?;
        row += 1;
    }
    Ok(row)
}

fn configure_print(worksheet: &mut Worksheet, frame: &DocumentFrame) {
    worksheet.set_paper_size(paper_code(frame.page_format));
    if frame.page_format.is_landscape() {
        worksheet.set_landscape();
    }
    if frame.show_page_numbers {
        worksheet.set_footer(PAGE_NUMBER_FOOTER);
    }
}

impl DocumentRenderer for XlsxRenderer {
    fn render(
        &self,
        frame: &DocumentFrame,
        pages: &mut PageStream<'_>,
    ) -> Result<Vec<u8>, ReportError> {
        let formats = Formats::new();
        let column_count = frame.columns.len();
        let last_col = col_num(column_count.saturating_sub(1)).map_err(xlsx_error("columns"))?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sanitize_sheet_name(&frame.title))
            .map_err(xlsx_error("worksheet name"))?;
        configure_print(worksheet, frame);

        if column_count > 1 {
            worksheet
                .merge_range(0, 0, 0, last_col, &frame.title, &formats.title)
                .map_err(xlsx_error("title"))?;
        } else {
            worksheet
                .write_string_with_format(0, 0, frame.title.as_str(), &formats.title)
                .map_err(xlsx_error("title"))?;
        }

        if let Some(path) = &frame.logo {
            let context = format!("logo {}", path.display());
            let image = Image::new(path).map_err(xlsx_error(context.clone()))?;
            col_num(column_count)
                .and_then(|logo_col| {
                    worksheet.insert_image_fit_to_cell(0, logo_col, &image, true)?;
                    Ok(())
                })
                .map_err(xlsx_error(context))?;
        }

        let mut row = write_fields(worksheet, &frame.header_fields, 1, &formats, "header")?;
        row += 1;

        let label_row = row_num(row).map_err(xlsx_error("column labels"))?;
        for (index, column) in frame.columns.iter().enumerate() {
            col_num(index)
                .and_then(|label_col| {
                    worksheet.write_string_with_format(
                        label_row,
                        label_col,
                        column.label.as_str(),
                        &formats.column_label,
                    )?;
                    Ok(())
                })
                .map_err(xlsx_error(format!("label of column `{}`", column.name)))?;
        }
        worksheet
            .set_repeat_rows(label_row, label_row)
            .map_err(xlsx_error("column labels"))?;
        row += 1;

        let mut breaks = Vec::new();
        let mut page_count = 0usize;
        for page in pages {
            let page = page?;
            let page_context = || format!("data page {}", page.index);
            if page_count > 0 {
                breaks.push(row_num(row).map_err(xlsx_error(page_context()))?);
            }
            for cells in &page.rows {
                let worksheet_row = row_num(row).map_err(xlsx_error(page_context()))?;
                for (index, value) in cells.iter().enumerate() {
                    col_num(index)
                        .and_then(|cell_col| {
                            worksheet.write_string_with_format(
                                worksheet_row,
                                cell_col,
                                value.as_str(),
                                &formats.cell,
                            )?;
                            Ok(())
                        })
                        .map_err(|err| {
                            let column = frame
                                .columns
                                .get(index)
                                .map_or("", |column| column.name.as_str());
                            ReportError::render(
                                format!("{}, column `{column}`", page_context()),
                                err,
                            )
                        })?;
                }
                row += 1;
            }
            debug!("wrote data page {} ({} rows)", page.index, page.rows.len());
            page_count += 1;
        }
        if breaks.len() > MAX_PAGE_BREAKS {
            warn!(
                "{} page breaks requested, XLSX keeps the first {MAX_PAGE_BREAKS}",
                breaks.len()
            );
            breaks.truncate(MAX_PAGE_BREAKS);
        }
        if !breaks.is_empty() {
            worksheet
                .set_page_breaks(&breaks)
                .map_err(xlsx_error("page breaks"))?;
        }

        write_fields(worksheet, &frame.footer_fields, row + 1, &formats, "footer")?;

        for (index, column) in frame.columns.iter().enumerate() {
            let width = (column.width_mm / MM_PER_CHARACTER).clamp(1.0, MAX_COLUMN_WIDTH);
            col_num(index)
                .and_then(|width_col| {
                    worksheet.set_column_width(width_col, width)?;
                    Ok(())
                })
                .map_err(xlsx_error(format!("width of column `{}`", column.name)))?;
        }

        let bytes = workbook
            .save_to_buffer()
            .map_err(xlsx_error("XLSX workbook"))?;
        debug!("encoded {} data pages into {} XLSX bytes", page_count, bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::config::{ColumnConfiguration, ColumnWidth, GridReportConfiguration};
    use crate::error::RenderFailure;
    use crate::resolve::ResolvedPage;

    fn frame() -> DocumentFrame {
        let configuration = GridReportConfiguration::builder()
            .output_file_path("report")
            .column(ColumnConfiguration::new("col1", ColumnWidth::Width3, "col2"))
            .column(ColumnConfiguration::new("other", ColumnWidth::Width1, "Other"))
            .build()
            .unwrap();
        DocumentFrame::resolve(&configuration, PageFormat::A4).unwrap()
    }

    fn archive_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut text = String::new();
        entry.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sanitize_sheet_name("Q1/Q2 [draft]"), "Q1_Q2 _draft_");
        assert_eq!(sanitize_sheet_name("   "), DEFAULT_SHEET_NAME);
        assert_eq!(sanitize_sheet_name("'quoted'"), "quoted");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).chars().count(), SHEET_NAME_MAX_LEN);
    }

    #[test]
    fn truncation_never_leaves_an_edge_apostrophe() {
        let title = format!("{}'s quarterly report", "a".repeat(30));
        let name = sanitize_sheet_name(&title);
        assert_eq!(name, "a".repeat(30));

        let mut stream = std::iter::empty::<Result<ResolvedPage, ReportError>>();
        let mut frame = frame();
        frame.title = title;
        assert!(XlsxRenderer::new().render(&frame, &mut stream).is_ok());
    }

    #[test]
    fn worksheet_limits_are_render_errors() {
        assert!(row_num(MAX_ROWS - 1).is_ok());
        assert!(matches!(row_num(MAX_ROWS), Err(XlsxError::RowColumnLimitError)));
        assert!(matches!(col_num(MAX_COLUMNS), Err(XlsxError::RowColumnLimitError)));

        let err = row_num(MAX_ROWS).map_err(xlsx_error("data page 7")).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Render { ref context, source: RenderFailure::Xlsx(_) } if context == "data page 7"
        ));
    }

    #[test]
    fn paper_codes_match_excel() {
        assert_eq!(paper_code(PageFormat::A4), 9);
        assert_eq!(paper_code(PageFormat::A4Landscape), 9);
        assert_eq!(paper_code(PageFormat::Letter), 1);
        assert_eq!(paper_code(PageFormat::Legal), 5);
    }

    #[test]
    fn writes_labels_values_and_breaks() {
        let pages = vec![
            ResolvedPage {
                index: 0,
                rows: vec![vec!["val1".to_string(), "-".to_string()]],
            },
            ResolvedPage {
                index: 1,
                rows: vec![vec!["val2".to_string(), "x".to_string()]],
            },
        ];
        let mut stream = pages.into_iter().map(Ok);
        let bytes = XlsxRenderer::new().render(&frame(), &mut stream).unwrap();

        let strings = archive_entry(&bytes, "xl/sharedStrings.xml");
        for expected in ["val1", "val2", "col2", "Other"] {
            assert!(strings.contains(expected), "missing {expected}");
        }
        let sheet = archive_entry(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("<rowBreaks count=\"1\""));
    }

    #[test]
    fn stream_errors_abort_the_workbook() {
        let mut stream = std::iter::once(Err::<ResolvedPage, _>(ReportError::configuration("boom")));
        let err = XlsxRenderer::new().render(&frame(), &mut stream).unwrap_err();
        assert!(matches!(err, ReportError::Configuration(_)));
    }
}
