//! Row sources for the CLI: CSV files and the synthetic demo data set.

use std::path::Path;

use grid_report::{
    ColumnConfiguration, ColumnWidth, DataSourceError, Field, FooterConfiguration,
    GridReportConfiguration, HeaderConfiguration, ReportError, Row,
};

/// Fallback shown in the second-to-last demo column.
pub const DEMO_FALLBACK: &str = "N/A";

/// Streams the records of a CSV file as rows.
///
/// The header line names the fields. Empty cells become missing values so the
/// report's null policy applies to them. Records may be shorter or longer than
/// the header line; extra cells are dropped and absent ones stay missing.
pub fn csv_rows(
    path: &Path,
) -> Result<impl Iterator<Item = Result<Row, DataSourceError>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    Ok(reader.into_records().map(move |record| -> Result<Row, DataSourceError> {
        let record = record.map_err(DataSourceError::provider)?;
        Ok(headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| {
                if value.is_empty() {
                    Field::missing(name)
                } else {
                    Field::new(name, value)
                }
            })
            .collect())
    }))
}

fn column_name(index: usize) -> String {
    format!("col{}", index + 1)
}

/// Columns `col1..colN` with labels `Column 1..Column N`.
pub fn demo_columns(count: usize) -> Vec<ColumnConfiguration> {
    (0..count)
        .map(|index| {
            let width = if index == 0 {
                ColumnWidth::Width2
            } else {
                ColumnWidth::Width1
            };
            ColumnConfiguration::new(column_name(index), width, format!("Column {}", index + 1))
        })
        .collect()
}

/// Rows for the demo columns. The last column is always missing and the one
/// before it carries an explicit fallback.
pub fn demo_rows(rows: usize, columns: usize) -> Vec<Row> {
    (0..rows)
        .map(|row| {
            (0..columns)
                .map(|column| {
                    let name = column_name(column);
                    if column + 1 == columns {
                        Field::missing(name)
                    } else if column + 2 == columns {
                        Field::missing(name).with_fallback(Some(DEMO_FALLBACK.to_string()))
                    } else {
                        Field::new(name, format!("r{}c{}", row + 1, column + 1))
                    }
                })
                .collect()
        })
        .collect()
}

pub fn demo_configuration(
    output: &Path,
    columns: usize,
    null_string: Option<String>,
    show_page_numbers: bool,
) -> Result<GridReportConfiguration, ReportError> {
    let header = HeaderConfiguration::builder("Grid report")
        .field(Field::new("Lab name", "Name"))
        .field(Field::new("Second", "Another"))
        .field(Field::new("Third", "Another one"))
        .field(Field::new("Fourth", "Last one"))
        .build()?;

    let footer = FooterConfiguration::builder()
        .created_at(&chrono::Local::now())
        .field(Field::new("User", "My self"))
        .field(Field::new("Second", "Another"))
        .show_page_numbers(show_page_numbers)
        .build();

    GridReportConfiguration::builder()
        .output_file_path(output)
        .header(header)
        .footer(footer)
        .columns(demo_columns(columns))
        .null_string(null_string)
        .build()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn demo_rows_end_with_fallback_and_missing_columns() {
        let rows = demo_rows(3, 4);
        assert_eq!(rows.len(), 3);
        let last = &rows[2];
        assert_eq!(last.field("col1").and_then(Field::value), Some("r3c1"));
        assert_eq!(last.field("col3").and_then(Field::display_value), Some(DEMO_FALLBACK));
        assert_eq!(last.field("col4").and_then(Field::display_value), None);
    }

    #[test]
    fn demo_configuration_is_valid() {
        let config = demo_configuration(Path::new("demo"), 12, None, true).unwrap();
        assert_eq!(config.columns().len(), 12);
        assert!(config.footer().created_at().is_some());
    }

    #[test]
    fn empty_csv_cells_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "col1,col2\nval1,\n,val2\n").unwrap();

        let rows: Vec<Row> = csv_rows(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field("col1").and_then(Field::value), Some("val1"));
        assert_eq!(rows[0].field("col2").and_then(Field::value), None);
        assert_eq!(rows[1].field("col2").and_then(Field::value), Some("val2"));
    }

    #[test]
    fn uneven_csv_records_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "col1,col2,col3\nval1,val2,val3\nval4\nval5,val6,val7,extra\n").unwrap();

        let rows: Vec<Row> = csv_rows(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[1].field("col1").and_then(Field::value), Some("val4"));
        assert!(rows[1].field("col3").is_none());
        assert_eq!(rows[2].len(), 3);
        assert_eq!(rows[2].field("col3").and_then(Field::value), Some("val7"));
    }
}
