//! JSON report definitions.
//!
//! A definition is the serialized form of a [`GridReportConfiguration`]:
//!
//! ```json
//! {
//!   "outputFilePath": "grid_report",
//!   "nullString": "-",
//!   "header": { "title": "Grid report", "fields": [{ "name": "Lab name", "value": "Name" }] },
//!   "footer": { "createdAt": "2021-12-01 10:01:01", "showPageNumbers": true },
//!   "columns": [{ "name": "col1", "width": 3, "translation": "col2" }]
//! }
//! ```
//!
//! Column widths are class numbers (`3`) or names (`"COLUMN_WIDTH_3"`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{
    ColumnConfiguration, ColumnWidth, FooterConfiguration, GridReportConfiguration,
    HeaderConfiguration,
};
use crate::error::ReportError;
use crate::model::Field;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDefinition {
    #[serde(default)]
    pub output_file_path: Option<PathBuf>,
    #[serde(default)]
    pub null_string: Option<String>,
    pub header: HeaderDefinition,
    #[serde(default)]
    pub footer: FooterDefinition,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDefinition {
    pub title: String,
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterDefinition {
    /// Already formatted timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub show_page_numbers: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub width: WidthDefinition,
    #[serde(default)]
    pub translation: String,
}

/// Width class given as a number or as a name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidthDefinition {
    Class(u8),
    Name(String),
}

impl Default for WidthDefinition {
    fn default() -> Self {
        WidthDefinition::Class(ColumnWidth::default().class())
    }
}

impl WidthDefinition {
    pub fn to_width(&self) -> Result<ColumnWidth, ReportError> {
        match self {
            WidthDefinition::Class(class) => ColumnWidth::from_class(*class),
            WidthDefinition::Name(name) => name.parse(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub fallback: Option<String>,
}

impl FieldDefinition {
    pub fn to_field(&self) -> Field {
        Field::missing(self.name.clone())
            .with_value(self.value.clone())
            .with_display_override(self.display.clone())
            .with_fallback(self.fallback.clone())
    }
}

impl ReportDefinition {
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json)
            .map_err(|err| ReportError::configuration(format!("invalid report definition: {err}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            ReportError::configuration(format!(
                "cannot read report definition {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Validates the definition and turns it into a configuration.
    pub fn into_configuration(self) -> Result<GridReportConfiguration, ReportError> {
        let output_file_path = self.output_file_path.ok_or_else(|| {
            ReportError::configuration("report definition has no outputFilePath")
        })?;

        let header = HeaderConfiguration::builder(self.header.title)
            .logo_path(self.header.logo_path)
            .fields(self.header.fields.iter().map(FieldDefinition::to_field))
            .build()?;

        let footer = FooterConfiguration::builder()
            .created_at_text(self.footer.created_at)
            .fields(self.footer.fields.iter().map(FieldDefinition::to_field))
            .show_page_numbers(self.footer.show_page_numbers)
            .build();

        let columns = self
            .columns
            .into_iter()
            .map(|column| {
                let width = column.width.to_width()?;
                Ok(ColumnConfiguration::new(column.name, width, column.translation))
            })
            .collect::<Result<Vec<_>, ReportError>>()?;

        GridReportConfiguration::builder()
            .output_file_path(output_file_path)
            .header(header)
            .footer(footer)
            .columns(columns)
            .null_string(self.null_string)
            .build()
    }
}
