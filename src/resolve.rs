//! Resolution of configuration and rows into the logical document model.
//!
//! The renderers never look at [`Field`]s or width classes directly. They
//! receive a [`DocumentFrame`] holding everything that is fixed for the whole
//! document, and a stream of [`ResolvedPage`]s whose cells are already final
//! display strings in column order.

use std::path::PathBuf;

use log::debug;

use crate::config::{GridReportConfiguration, PageFormat};
use crate::datasource::{Page, Pages, RowProvider};
use crate::error::ReportError;
use crate::model::{Field, Row};

/// Text rendered for missing values when neither the field nor the
/// configuration supplies one.
pub const FALLBACK_NULL_STRING: &str = "-";

/// Label used for the creation timestamp in the footer.
pub const CREATED_AT_LABEL: &str = "Created at";

/// Substitution rules for missing values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NullPolicy {
    null_string: Option<String>,
}

impl NullPolicy {
    pub fn new(null_string: impl Into<Option<String>>) -> Self {
        Self {
            null_string: null_string.into(),
        }
    }

    /// Text used when a field has nothing of its own to show.
    pub fn null_string(&self) -> &str {
        self.null_string.as_deref().unwrap_or(FALLBACK_NULL_STRING)
    }

    /// Display text for an optional field: override, value, field fallback,
    /// configured null string, then [`FALLBACK_NULL_STRING`].
    pub fn resolve(&self, field: Option<&Field>) -> String {
        field
            .and_then(Field::display_value)
            .unwrap_or_else(|| self.null_string())
            .to_string()
    }
}

/// A column with its label and concrete width.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedColumn {
    pub name: String,
    pub label: String,
    /// Proportional weight derived from the width class.
    pub weight: usize,
    /// Share of the printable page width, in millimetres.
    pub width_mm: f64,
}

/// A label/value pair of the header or footer block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    pub label: String,
    pub value: String,
}

impl ResolvedField {
    fn from_field(field: &Field, policy: &NullPolicy) -> Self {
        Self {
            label: field.name().to_string(),
            value: policy.resolve(Some(field)),
        }
    }
}

/// Parts of the document that do not depend on the row data.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentFrame {
    pub title: String,
    pub logo: Option<PathBuf>,
    pub header_fields: Vec<ResolvedField>,
    pub footer_fields: Vec<ResolvedField>,
    pub show_page_numbers: bool,
    pub columns: Vec<ResolvedColumn>,
    pub page_format: PageFormat,
    null_policy: NullPolicy,
}

impl DocumentFrame {
    /// Resolves a configuration for the given page format.
    pub fn resolve(
        configuration: &GridReportConfiguration,
        page_format: PageFormat,
    ) -> Result<Self, ReportError> {
        let columns = resolve_columns(configuration, page_format.printable_width_mm())?;
        let null_policy = NullPolicy::new(configuration.null_string().map(str::to_string));

        let header = configuration.header();
        let header_fields = header
            .fields()
            .iter()
            .map(|field| ResolvedField::from_field(field, &null_policy))
            .collect();

        let footer = configuration.footer();
        let mut footer_fields = Vec::with_capacity(footer.fields().len() + 1);
        if let Some(created_at) = footer.created_at() {
            footer_fields.push(ResolvedField {
                label: CREATED_AT_LABEL.to_string(),
                value: created_at.to_string(),
            });
        }
        footer_fields.extend(
            footer
                .fields()
                .iter()
                .map(|field| ResolvedField::from_field(field, &null_policy)),
        );

        Ok(Self {
            title: header.title().to_string(),
            logo: header.logo_path().map(|path| path.to_path_buf()),
            header_fields,
            footer_fields,
            show_page_numbers: footer.show_page_numbers(),
            columns,
            page_format,
            null_policy,
        })
    }

    pub fn null_policy(&self) -> &NullPolicy {
        &self.null_policy
    }

    /// Column labels in output order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|column| column.label.as_str())
    }

    /// Maps a row onto the configured columns. Fields that match no column
    /// are ignored; columns without a matching field use the null policy.
    pub fn resolve_row(&self, row: &Row) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| self.null_policy.resolve(row.field(&column.name)))
            .collect()
    }

    pub fn resolve_page(&self, page: &Page) -> ResolvedPage {
        ResolvedPage {
            index: page.index(),
            rows: page.rows().iter().map(|row| self.resolve_row(row)).collect(),
        }
    }
}

/// Splits the printable width among the configured columns.
pub fn resolve_columns(
    configuration: &GridReportConfiguration,
    printable_width_mm: f64,
) -> Result<Vec<ResolvedColumn>, ReportError> {
    let total_weight: usize = configuration
        .columns()
        .iter()
        .map(|column| column.width().weight())
        .sum();
    if total_weight == 0 {
        return Err(ReportError::configuration(
            "at least one column must be configured",
        ));
    }

    let columns = configuration
        .columns()
        .iter()
        .map(|column| {
            let weight = column.width().weight();
            let width_mm = printable_width_mm * weight as f64 / total_weight as f64;
            debug!(
                "column `{}` resolved to {:.1}mm ({})",
                column.name(),
                width_mm,
                column.width()
            );
            ResolvedColumn {
                name: column.name().to_string(),
                label: column.label().to_string(),
                weight,
                width_mm,
            }
        })
        .collect();
    Ok(columns)
}

/// One data page with cells in column order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedPage {
    pub index: usize,
    pub rows: Vec<Vec<String>>,
}

/// Stream of resolved pages handed to a renderer.
pub type PageStream<'a> = dyn Iterator<Item = Result<ResolvedPage, ReportError>> + 'a;

/// Lazily resolves the pages of a data source against a frame.
pub struct ResolvedPages<'a, P> {
    frame: &'a DocumentFrame,
    pages: Pages<'a, P>,
}

impl<'a, P: RowProvider> ResolvedPages<'a, P> {
    pub fn new(frame: &'a DocumentFrame, pages: Pages<'a, P>) -> Self {
        Self { frame, pages }
    }
}

impl<P: RowProvider> Iterator for ResolvedPages<'_, P> {
    type Item = Result<ResolvedPage, ReportError>;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.pages.next()?;
        Some(
            page.map(|page| self.frame.resolve_page(&page))
                .map_err(ReportError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ColumnConfiguration, ColumnWidth, FooterConfiguration, HeaderConfiguration,
    };
    use crate::datasource::PagedDataSource;

    fn configuration(null_string: Option<&str>) -> GridReportConfiguration {
        GridReportConfiguration::builder()
            .output_file_path("grid_report")
            .header(
                HeaderConfiguration::builder("Grid report")
                    .field(Field::new("Lab name", "Name"))
                    .field(Field::missing("Second"))
                    .build()
                    .unwrap(),
            )
            .footer(
                FooterConfiguration::builder()
                    .created_at_text(Some("2021-12-01 10:01:01".to_string()))
                    .field(Field::new("User", "My self"))
                    .build(),
            )
            .column(ColumnConfiguration::new("a", ColumnWidth::Width1, "A"))
            .column(ColumnConfiguration::new("b", ColumnWidth::Width3, "B"))
            .column(ColumnConfiguration::new("c", ColumnWidth::Width4, ""))
            .null_string(null_string.map(str::to_string))
            .build()
            .unwrap()
    }

    #[test]
    fn null_precedence_is_field_then_configuration_then_constant() {
        let configured = NullPolicy::new(Some("Nop".to_string()));
        let unconfigured = NullPolicy::default();
        let with_fallback = Field::missing("x").with_fallback(Some("N/A".to_string()));
        let bare = Field::missing("x");

        assert_eq!(configured.resolve(Some(&with_fallback)), "N/A");
        assert_eq!(configured.resolve(Some(&bare)), "Nop");
        assert_eq!(configured.resolve(None), "Nop");
        assert_eq!(unconfigured.resolve(Some(&bare)), FALLBACK_NULL_STRING);
        assert_eq!(unconfigured.resolve(None), FALLBACK_NULL_STRING);
    }

    #[test]
    fn columns_split_the_printable_width_by_weight() {
        let frame = DocumentFrame::resolve(&configuration(None), PageFormat::A4).unwrap();
        let widths: Vec<f64> = frame.columns.iter().map(|c| c.width_mm).collect();
        assert!((widths[0] - 23.75).abs() < 1e-9);
        assert!((widths[1] - 71.25).abs() < 1e-9);
        assert!((widths[2] - 95.0).abs() < 1e-9);
        let total: f64 = widths.iter().sum();
        assert!((total - PageFormat::A4.printable_width_mm()).abs() < 1e-9);
        assert_eq!(frame.labels().collect::<Vec<_>>(), vec!["A", "B", "c"]);
    }

    #[test]
    fn rows_follow_column_order_not_field_order() {
        let frame = DocumentFrame::resolve(&configuration(None), PageFormat::A4).unwrap();
        let row = Row::new(vec![
            Field::new("c", "3"),
            Field::new("unused", "x"),
            Field::new("a", "1"),
            Field::new("b", "2"),
        ]);
        assert_eq!(frame.resolve_row(&row), vec!["1", "2", "3"]);
    }

    #[test]
    fn short_and_empty_rows_use_the_null_policy() {
        let frame = DocumentFrame::resolve(&configuration(Some("Nop")), PageFormat::A4).unwrap();
        assert_eq!(
            frame.resolve_row(&Row::new(vec![Field::new("b", "2")])),
            vec!["Nop", "2", "Nop"]
        );
        assert_eq!(frame.resolve_row(&Row::default()), vec!["Nop", "Nop", "Nop"]);
    }

    #[test]
    fn header_and_footer_fields_are_resolved() {
        let frame = DocumentFrame::resolve(&configuration(Some("?")), PageFormat::A4).unwrap();
        assert_eq!(frame.title, "Grid report");
        assert_eq!(frame.header_fields[0].value, "Name");
        assert_eq!(frame.header_fields[1].value, "?");
        assert_eq!(frame.footer_fields[0].label, CREATED_AT_LABEL);
        assert_eq!(frame.footer_fields[0].value, "2021-12-01 10:01:01");
        assert_eq!(frame.footer_fields[1].label, "User");
        assert!(!frame.show_page_numbers);
    }

    #[test]
    fn changing_the_null_string_only_changes_missing_cells() {
        let rows: Vec<Row> = (0..6)
            .map(|index| {
                Row::new(vec![
                    Field::new("a", format!("a{index}")),
                    Field::missing("b"),
                    Field::missing("c").with_fallback(Some("N/A".to_string())),
                ])
            })
            .collect();

        let render = |null_string: &str| -> Vec<ResolvedPage> {
            let frame =
                DocumentFrame::resolve(&configuration(Some(null_string)), PageFormat::A4).unwrap();
            let mut source = PagedDataSource::from_rows(4, rows.clone()).unwrap();
            ResolvedPages::new(&frame, source.pages())
                .collect::<Result<_, _>>()
                .unwrap()
        };

        let dashes = render("-");
        let nops = render("Nop");
        assert_eq!(dashes.len(), 2);
        assert_eq!(nops.len(), 2);

        for (left, right) in dashes.iter().zip(&nops) {
            for (left_row, right_row) in left.rows.iter().zip(&right.rows) {
                assert_eq!(left_row[0], right_row[0]);
                assert_eq!(left_row[1], "-");
                assert_eq!(right_row[1], "Nop");
                assert_eq!(left_row[2], "N/A");
                assert_eq!(right_row[2], "N/A");
            }
        }
    }
}
