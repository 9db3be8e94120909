mod common;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use grid_report::{
    GridReportConfiguration, GridReportService, PageFormat, PagedDataSource, ReportFormat, Row,
};

struct Workbook {
    strings: String,
    sheet: String,
}

fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

fn build_xlsx(configuration: &GridReportConfiguration, rows: Vec<Row>, page_size: usize) -> Workbook {
    let mut source = PagedDataSource::from_rows(page_size, rows).unwrap();
    let path = GridReportService::new()
        .build(configuration, &mut source, ReportFormat::Excel, PageFormat::A4)
        .unwrap();
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("xlsx"));
    Workbook {
        strings: read_entry(&path, "xl/sharedStrings.xml"),
        sheet: read_entry(&path, "xl/worksheets/sheet1.xml"),
    }
}

#[test]
fn single_row_report_contains_header_grid_and_footer() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = build_xlsx(
        &common::single_column(&dir.path().join("grid_report")),
        common::single_row(),
        10,
    );

    for expected in ["Grid report", "Lab name", "Last one", "col2", "val1", "Created at", common::CREATED_AT, "My self"] {
        assert!(workbook.strings.contains(expected), "missing `{expected}`");
    }
    assert!(!workbook.sheet.contains("<rowBreaks"));
}

#[test]
fn data_pages_become_row_breaks() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = build_xlsx(
        &common::wide(&dir.path().join("wide"), 12, None),
        common::wide_rows(50, 12),
        10,
    );

    assert!(workbook.sheet.contains("<rowBreaks count=\"4\""));
    assert!(workbook.strings.contains("<t>N/A</t>"));
    assert!(workbook.strings.contains("<t>-</t>"));
    assert!(workbook.strings.contains("<t>49.10</t>"));
}

#[test]
fn null_string_only_changes_missing_cells() {
    let dir = tempfile::tempdir().unwrap();
    let dashes = build_xlsx(
        &common::wide(&dir.path().join("dashes"), 4, Some("-")),
        common::wide_rows(6, 4),
        4,
    );
    let nops = build_xlsx(
        &common::wide(&dir.path().join("nops"), 4, Some("Nop")),
        common::wide_rows(6, 4),
        4,
    );

    assert!(dashes.strings.contains("<t>-</t>"));
    assert!(!dashes.strings.contains("<t>Nop</t>"));
    assert!(nops.strings.contains("<t>Nop</t>"));
    assert!(!nops.strings.contains("<t>-</t>"));
    assert_eq!(dashes.strings.replace("<t>-</t>", "<t>Nop</t>"), nops.strings);
}

#[test]
fn empty_report_keeps_header_and_footer() {
    let dir = tempfile::tempdir().unwrap();
    let workbook = build_xlsx(&common::single_column(&dir.path().join("empty")), Vec::new(), 10);

    assert!(workbook.strings.contains("Grid report"));
    assert!(workbook.strings.contains("col2"));
    assert!(workbook.strings.contains("My self"));
    assert!(!workbook.strings.contains("val1"));
}
