//! Declarative configuration of a grid report.
//!
//! Configuration values are assembled through builders whose `build` method
//! validates the input and returns an immutable value. Everything that can be
//! rejected is rejected here, before any rendering work starts.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, TimeZone};

use crate::error::ReportError;
use crate::model::Field;

/// Format used for the footer creation timestamp.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum number of descriptive fields in the header block.
pub const MAX_HEADER_FIELDS: usize = 4;

/// Number of discrete width classes.
pub const WIDTH_CLASS_COUNT: u8 = 7;

/// Discrete column width classes.
///
/// Each class maps to a proportional weight equal to its number, so a
/// `Width4` column is twice as wide as a `Width2` column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnWidth {
    #[default]
    Width1,
    Width2,
    Width3,
    Width4,
    Width5,
    Width6,
    Width7,
}

impl ColumnWidth {
    /// All width classes, narrowest first.
    pub const ALL: [ColumnWidth; WIDTH_CLASS_COUNT as usize] = [
        ColumnWidth::Width1,
        ColumnWidth::Width2,
        ColumnWidth::Width3,
        ColumnWidth::Width4,
        ColumnWidth::Width5,
        ColumnWidth::Width6,
        ColumnWidth::Width7,
    ];

    /// Looks up a width class by its number (1 to 7).
    pub fn from_class(class: u8) -> Result<Self, ReportError> {
        match class {
            1..=WIDTH_CLASS_COUNT => Ok(Self::ALL[usize::from(class - 1)]),
            _ => Err(ReportError::configuration(format!(
                "unknown column width class {class}; expected 1 to {WIDTH_CLASS_COUNT}"
            ))),
        }
    }

    /// Returns the class number.
    pub fn class(self) -> u8 {
        self as u8 + 1
    }

    /// Returns the proportional weight used to split the page width.
    pub fn weight(self) -> usize {
        usize::from(self.class())
    }
}

impl fmt::Display for ColumnWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COLUMN_WIDTH_{}", self.class())
    }
}

impl FromStr for ColumnWidth {
    type Err = ReportError;

    /// Accepts `"3"`, `"COLUMN_WIDTH_3"` and `"width3"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let digits = upper
            .strip_prefix("COLUMN_WIDTH_")
            .or_else(|| upper.strip_prefix("WIDTH"))
            .unwrap_or(&upper);

        let class = digits
            .parse::<u8>()
            .map_err(|_| ReportError::configuration(format!("unknown column width `{trimmed}`")))?;
        Self::from_class(class)
    }
}

/// Definition of one output column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnConfiguration {
    name: String,
    width: ColumnWidth,
    translation: String,
}

impl ColumnConfiguration {
    /// Creates a column bound to the field `name`, labelled with `translation`.
    pub fn new(name: impl Into<String>, width: ColumnWidth, translation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width,
            translation: translation.into(),
        }
    }

    /// Returns the field name the column reads from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the width class.
    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    /// Returns the configured translation, which may be empty.
    pub fn translation(&self) -> &str {
        &self.translation
    }

    /// Returns the column label: the translation, or the name when no
    /// translation was given.
    pub fn label(&self) -> &str {
        if self.translation.trim().is_empty() {
            &self.name
        } else {
            &self.translation
        }
    }
}

/// Header block: title, optional logo and up to four descriptive fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderConfiguration {
    title: String,
    logo_path: Option<PathBuf>,
    fields: Vec<Field>,
}

impl HeaderConfiguration {
    /// Starts a header with the given title.
    pub fn builder(title: impl Into<String>) -> HeaderConfigurationBuilder {
        HeaderConfigurationBuilder::new(title)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn logo_path(&self) -> Option<&Path> {
        self.logo_path.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Builder for [`HeaderConfiguration`].
#[derive(Clone, Debug, Default)]
pub struct HeaderConfigurationBuilder {
    title: String,
    logo_path: Option<PathBuf>,
    fields: Vec<Field>,
}

impl HeaderConfigurationBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the logo image shown next to the title.
    pub fn logo_path(mut self, path: impl Into<Option<PathBuf>>) -> Self {
        self.logo_path = path.into();
        self
    }

    /// Appends a descriptive field. The field name is used as label.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Extends the header with multiple fields.
    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        self.fields.extend(fields);
        self
    }

    pub fn build(self) -> Result<HeaderConfiguration, ReportError> {
        if self.fields.len() > MAX_HEADER_FIELDS {
            return Err(ReportError::configuration(format!(
                "header accepts at most {MAX_HEADER_FIELDS} fields, got {}",
                self.fields.len()
            )));
        }

        Ok(HeaderConfiguration {
            title: self.title,
            logo_path: self.logo_path,
            fields: self.fields,
        })
    }
}

/// Footer block: creation timestamp, descriptive fields and page numbering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FooterConfiguration {
    created_at: Option<String>,
    fields: Vec<Field>,
    show_page_numbers: bool,
}

impl FooterConfiguration {
    pub fn builder() -> FooterConfigurationBuilder {
        FooterConfigurationBuilder::default()
    }

    /// Returns the formatted creation timestamp, if any.
    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn show_page_numbers(&self) -> bool {
        self.show_page_numbers
    }
}

/// Builder for [`FooterConfiguration`].
#[derive(Clone, Debug, Default)]
pub struct FooterConfigurationBuilder {
    created_at: Option<String>,
    fields: Vec<Field>,
    show_page_numbers: bool,
}

impl FooterConfigurationBuilder {
    /// Sets the creation timestamp, formatted with [`DATE_FORMAT`].
    pub fn created_at<Tz>(mut self, created_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.created_at = Some(created_at.format(DATE_FORMAT).to_string());
        self
    }

    /// Sets an already formatted creation timestamp.
    pub fn created_at_text(mut self, created_at: impl Into<Option<String>>) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        self.fields.extend(fields);
        self
    }

    /// Toggles the page number line. Off unless requested.
    pub fn show_page_numbers(mut self, show: bool) -> Self {
        self.show_page_numbers = show;
        self
    }

    pub fn build(self) -> FooterConfiguration {
        FooterConfiguration {
            created_at: self.created_at,
            fields: self.fields,
            show_page_numbers: self.show_page_numbers,
        }
    }
}

/// Complete, validated description of a grid report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridReportConfiguration {
    output_file_path: PathBuf,
    header: HeaderConfiguration,
    footer: FooterConfiguration,
    columns: Vec<ColumnConfiguration>,
    null_string: Option<String>,
}

impl GridReportConfiguration {
    pub fn builder() -> GridReportConfigurationBuilder {
        GridReportConfigurationBuilder::default()
    }

    /// Returns the output path as configured, before any extension is added.
    pub fn output_file_path(&self) -> &Path {
        &self.output_file_path
    }

    pub fn header(&self) -> &HeaderConfiguration {
        &self.header
    }

    pub fn footer(&self) -> &FooterConfiguration {
        &self.footer
    }

    /// Returns the columns in left-to-right order.
    pub fn columns(&self) -> &[ColumnConfiguration] {
        &self.columns
    }

    /// Returns the text used for missing values without a field fallback.
    pub fn null_string(&self) -> Option<&str> {
        self.null_string.as_deref()
    }
}

/// Builder for [`GridReportConfiguration`].
#[derive(Clone, Debug, Default)]
pub struct GridReportConfigurationBuilder {
    output_file_path: Option<PathBuf>,
    header: HeaderConfiguration,
    footer: FooterConfiguration,
    columns: Vec<ColumnConfiguration>,
    null_string: Option<String>,
}

impl GridReportConfigurationBuilder {
    pub fn output_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file_path = Some(path.into());
        self
    }

    pub fn header(mut self, header: HeaderConfiguration) -> Self {
        self.header = header;
        self
    }

    pub fn footer(mut self, footer: FooterConfiguration) -> Self {
        self.footer = footer;
        self
    }

    /// Appends a column to the right of the existing ones.
    pub fn column(mut self, column: ColumnConfiguration) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = ColumnConfiguration>,
    {
        self.columns.extend(columns);
        self
    }

    /// Sets the text rendered for missing values that carry no fallback.
    pub fn null_string(mut self, null_string: impl Into<Option<String>>) -> Self {
        self.null_string = null_string.into();
        self
    }

    pub fn build(self) -> Result<GridReportConfiguration, ReportError> {
        let output_file_path = self
            .output_file_path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| ReportError::configuration("output file path must not be empty"))?;

        if self.columns.is_empty() {
            return Err(ReportError::configuration(
                "at least one column must be configured",
            ));
        }

        let mut seen = BTreeSet::new();
        for (index, column) in self.columns.iter().enumerate() {
            if column.name().trim().is_empty() {
                return Err(ReportError::configuration(format!(
                    "column {index} has an empty name"
                )));
            }
            if !seen.insert(column.name()) {
                return Err(ReportError::configuration(format!(
                    "column `{}` is configured more than once",
                    column.name()
                )));
            }
        }

        Ok(GridReportConfiguration {
            output_file_path,
            header: self.header,
            footer: self.footer,
            columns: self.columns,
            null_string: self.null_string,
        })
    }
}

/// Output document format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Pdf,
    Excel,
}

impl ReportFormat {
    /// File extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Pdf => f.write_str("PDF"),
            ReportFormat::Excel => f.write_str("EXCEL"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            other => Err(ReportError::configuration(format!(
                "unknown report format `{other}`"
            ))),
        }
    }
}

/// Margin applied on every side of a page, in millimetres.
pub const PAGE_MARGIN_MM: f64 = 10.0;

/// Physical page layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageFormat {
    #[default]
    A4,
    A4Landscape,
    Letter,
    Legal,
}

impl PageFormat {
    /// Page width and height in millimetres.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A4Landscape => (297.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
        }
    }

    pub fn is_landscape(self) -> bool {
        let (width, height) = self.size_mm();
        width > height
    }

    /// Width available to the grid once the margins are removed.
    pub fn printable_width_mm(self) -> f64 {
        self.size_mm().0 - 2.0 * PAGE_MARGIN_MM
    }
}

impl FromStr for PageFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "a4" => Ok(PageFormat::A4),
            "a4-landscape" => Ok(PageFormat::A4Landscape),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(ReportError::configuration(format!(
                "unknown page format `{other}`"
            ))),
        }
    }
}
