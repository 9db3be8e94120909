use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by a report build.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid report configuration: {0}")]
    Configuration(String),

    #[error("failed to render {context}")]
    Render {
        /// Page, column or element that was being rendered.
        context: String,
        #[source]
        source: RenderFailure,
    },

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

impl ReportError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        ReportError::Configuration(message.into())
    }

    pub(crate) fn render(context: impl Into<String>, source: impl Into<RenderFailure>) -> Self {
        ReportError::Render {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure reported by one of the document libraries.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] genpdf::error::Error),

    #[error("XLSX generation failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Errors raised while pulling rows out of a row provider.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("row stream cannot be restarted: requested offset {requested}, stream is at {position}")]
    RestartUnsupported { requested: usize, position: usize },

    #[error("row provider failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DataSourceError {
    /// Wraps an arbitrary provider failure.
    pub fn provider(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        DataSourceError::Provider(err.into())
    }
}
