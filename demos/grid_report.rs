//! Renders the sample grid report to `grid_report.pdf` and `grid_report.xlsx`.
//!
//! Run with `cargo run --example grid_report`. PDF output needs fonts, see
//! `grid_report::fonts`.

use std::error::Error;

use chrono::{Local, TimeZone};
use grid_report::{
    ColumnConfiguration, ColumnWidth, Field, FooterConfiguration, GridReportConfiguration,
    GridReportService, HeaderConfiguration, PageFormat, PagedDataSource, ReportFormat, Row,
};

fn configuration() -> Result<GridReportConfiguration, Box<dyn Error>> {
    let header = HeaderConfiguration::builder("Grid report")
        .field(Field::new("Lab name", "Name"))
        .field(Field::new("Second", "Another"))
        .field(Field::new("Third", "Another one"))
        .field(Field::new("Fourth", "Last one"))
        .build()?;

    let created_at = Local
        .with_ymd_and_hms(2021, 12, 1, 10, 1, 1)
        .single()
        .ok_or("ambiguous local timestamp")?;
    let footer = FooterConfiguration::builder()
        .created_at(&created_at)
        .field(Field::new("User", "My self"))
        .field(Field::new("Second", "Another"))
        .build();

    let configuration = GridReportConfiguration::builder()
        .output_file_path("grid_report")
        .header(header)
        .footer(footer)
        .column(ColumnConfiguration::new("col1", ColumnWidth::Width3, "col2"))
        .build()?;
    Ok(configuration)
}

fn main() -> Result<(), Box<dyn Error>> {
    let configuration = configuration()?;
    let service = GridReportService::new();

    for format in [ReportFormat::Pdf, ReportFormat::Excel] {
        let rows = vec![Row::new(vec![Field::new("col1", "val1")])];
        let mut source = PagedDataSource::from_rows(10, rows)?;
        let path = service.build(&configuration, &mut source, format, PageFormat::A4)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
