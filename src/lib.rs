//! Core entry point for the grid_report crate.
//!
//! Grid reports are tables with a fixed header, a body of rows arranged into
//! configured columns, and a footer. The crate resolves a
//! [`config::GridReportConfiguration`] and a [`datasource::PagedDataSource`]
//! into a logical document and hands it to a PDF or XLSX renderer.

pub mod builder;
pub mod config;
pub mod datasource;
pub mod definition;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod render;
pub mod resolve;
pub mod service;

pub use config::{
    ColumnConfiguration, ColumnWidth, FooterConfiguration, GridReportConfiguration,
    HeaderConfiguration, PageFormat, ReportFormat,
};
pub use datasource::{Page, PagedDataSource, PullProvider, RowProvider, StreamProvider};
pub use error::{DataSourceError, RenderFailure, ReportError};
pub use model::{Field, Row};
pub use service::GridReportService;
