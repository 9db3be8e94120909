#![allow(dead_code)]

use std::path::Path;

use grid_report::{
    ColumnConfiguration, ColumnWidth, Field, FooterConfiguration, GridReportConfiguration,
    HeaderConfiguration, Row,
};

pub const CREATED_AT: &str = "2021-12-01 10:01:01";

fn header() -> HeaderConfiguration {
    HeaderConfiguration::builder("Grid report")
        .field(Field::new("Lab name", "Name"))
        .field(Field::new("Second", "Another"))
        .field(Field::new("Third", "Another one"))
        .field(Field::new("Fourth", "Last one"))
        .build()
        .expect("four header fields are allowed")
}

fn footer(show_page_numbers: bool) -> FooterConfiguration {
    FooterConfiguration::builder()
        .created_at_text(Some(CREATED_AT.to_string()))
        .field(Field::new("User", "My self"))
        .field(Field::new("Second", "Another"))
        .show_page_numbers(show_page_numbers)
        .build()
}

/// One column `col1` labelled `col2`.
pub fn single_column(output: &Path) -> GridReportConfiguration {
    GridReportConfiguration::builder()
        .output_file_path(output)
        .header(header())
        .footer(footer(false))
        .column(ColumnConfiguration::new("col1", ColumnWidth::Width3, "col2"))
        .build()
        .expect("valid configuration")
}

pub fn single_row() -> Vec<Row> {
    vec![Row::new(vec![Field::new("col1", "val1")])]
}

/// `columns` columns named `c1..cN`.
pub fn wide(output: &Path, columns: usize, null_string: Option<&str>) -> GridReportConfiguration {
    GridReportConfiguration::builder()
        .output_file_path(output)
        .header(header())
        .footer(footer(true))
        .columns((1..=columns).map(|index| {
            ColumnConfiguration::new(format!("c{index}"), ColumnWidth::Width1, format!("L{index}"))
        }))
        .null_string(null_string.map(str::to_string))
        .build()
        .expect("valid configuration")
}

/// Rows for [`wide`]: the last column is missing and the one before it has
/// the fallback `N/A`.
pub fn wide_rows(rows: usize, columns: usize) -> Vec<Row> {
    (0..rows)
        .map(|row| {
            (1..=columns)
                .map(|column| {
                    let name = format!("c{column}");
                    if column == columns {
                        Field::missing(name)
                    } else if column + 1 == columns {
                        Field::missing(name).with_fallback(Some("N/A".to_string()))
                    } else {
                        Field::new(name, format!("{row}.{column}"))
                    }
                })
                .collect()
        })
        .collect()
}
