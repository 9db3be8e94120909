//! Entry point that turns a configuration and a data source into a file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::config::{GridReportConfiguration, PageFormat, ReportFormat};
use crate::datasource::{PagedDataSource, RowProvider};
use crate::error::ReportError;
use crate::render::{renderer_for, DocumentRenderer};
use crate::resolve::{DocumentFrame, ResolvedPages};

/// Builds grid reports.
///
/// The service holds no per-report state; one instance can build any number
/// of reports, one at a time.
#[derive(Clone, Debug, Default)]
pub struct GridReportService {
    font_dir: Option<PathBuf>,
}

impl GridReportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory searched first for PDF fonts.
    pub fn with_font_dir(mut self, font_dir: impl Into<Option<PathBuf>>) -> Self {
        self.font_dir = font_dir.into();
        self
    }

    /// Renders the report in `format` and returns the path of the written
    /// file.
    pub fn build<P: RowProvider>(
        &self,
        configuration: &GridReportConfiguration,
        data_source: &mut PagedDataSource<P>,
        format: ReportFormat,
        page_format: PageFormat,
    ) -> Result<PathBuf, ReportError> {
        let renderer = renderer_for(format, self.font_dir.clone());
        self.build_with(renderer.as_ref(), configuration, data_source, format, page_format)
    }

    /// Like [`GridReportService::build`], with a caller supplied renderer.
    /// `format` only decides the file extension.
    pub fn build_with<P: RowProvider>(
        &self,
        renderer: &dyn DocumentRenderer,
        configuration: &GridReportConfiguration,
        data_source: &mut PagedDataSource<P>,
        format: ReportFormat,
        page_format: PageFormat,
    ) -> Result<PathBuf, ReportError> {
        let path = output_path_for(configuration.output_file_path(), format);
        info!(
            "building {} report `{}` into {}",
            format,
            configuration.header().title(),
            path.display()
        );

        let frame = DocumentFrame::resolve(configuration, page_format)?;
        let mut pages = ResolvedPages::new(&frame, data_source.pages());
        let bytes = renderer.render(&frame, &mut pages)?;

        write_atomically(&path, &bytes)?;
        info!("wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Appends the extension of `format` unless `path` already ends with it.
pub fn output_path_for(path: &Path, format: ReportFormat) -> PathBuf {
    let extension = format.extension();
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
    if has_extension {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory).map_err(|err| ReportError::io(directory, err))?;

    let mut file = NamedTempFile::new_in(directory).map_err(|err| ReportError::io(path, err))?;
    debug!("staging output in {}", file.path().display());
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| ReportError::io(path, err))?;
    file.persist(path)
        .map_err(|err| ReportError::io(path, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::{ColumnConfiguration, ColumnWidth};
    use crate::datasource::StreamProvider;
    use crate::error::DataSourceError;
    use crate::model::{Field, Row};
    use crate::resolve::{PageStream, ResolvedPage};

    /// Serializes every cell so tests can compare the logical content.
    #[derive(Default)]
    struct RecordingRenderer {
        pages: RefCell<Vec<ResolvedPage>>,
    }

    impl DocumentRenderer for RecordingRenderer {
        fn render(
            &self,
            frame: &DocumentFrame,
            pages: &mut PageStream<'_>,
        ) -> Result<Vec<u8>, ReportError> {
            let mut text = frame.labels().collect::<Vec<_>>().join("|");
            for page in pages {
                let page = page?;
                for row in &page.rows {
                    text.push('\n');
                    text.push_str(&row.join("|"));
                }
                self.pages.borrow_mut().push(page);
            }
            Ok(text.into_bytes())
        }
    }

    struct FailingRenderer;

    impl DocumentRenderer for FailingRenderer {
        fn render(
            &self,
            _frame: &DocumentFrame,
            _pages: &mut PageStream<'_>,
        ) -> Result<Vec<u8>, ReportError> {
            Err(ReportError::configuration("renderer refused"))
        }
    }

    fn configuration(path: &Path) -> GridReportConfiguration {
        GridReportConfiguration::builder()
            .output_file_path(path)
            .column(ColumnConfiguration::new("col1", ColumnWidth::Width3, "col2"))
            .column(ColumnConfiguration::new("col2", ColumnWidth::Width1, ""))
            .build()
            .unwrap()
    }

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|index| Row::new(vec![Field::new("col1", format!("val{index}"))]))
            .collect()
    }

    #[test]
    fn extension_is_appended_when_missing() {
        assert_eq!(
            output_path_for(Path::new("grid_report"), ReportFormat::Pdf),
            PathBuf::from("grid_report.pdf")
        );
        assert_eq!(
            output_path_for(Path::new("out/report.v1"), ReportFormat::Excel),
            PathBuf::from("out/report.v1.xlsx")
        );
        assert_eq!(
            output_path_for(Path::new("report.PDF"), ReportFormat::Pdf),
            PathBuf::from("report.PDF")
        );
    }

    #[test]
    fn pages_reach_the_renderer_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(&dir.path().join("nested/report"));
        let mut source = PagedDataSource::from_rows(2, rows(5)).unwrap();
        let renderer = RecordingRenderer::default();

        let path = GridReportService::new()
            .build_with(&renderer, &config, &mut source, ReportFormat::Pdf, PageFormat::A4)
            .unwrap();

        assert_eq!(path, dir.path().join("nested/report.pdf"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("col2|col2\nval0|-"));
        let pages = renderer.pages.borrow();
        assert_eq!(pages.iter().map(|p| p.rows.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert_eq!(pages.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(&dir.path().join("report"));
        let service = GridReportService::new();

        let build = || {
            let mut source = PagedDataSource::from_rows(3, rows(7)).unwrap();
            let path = service
                .build_with(
                    &RecordingRenderer::default(),
                    &config,
                    &mut source,
                    ReportFormat::Excel,
                    PageFormat::A4,
                )
                .unwrap();
            fs::read(path).unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn failed_render_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(&dir.path().join("report"));
        let mut source = PagedDataSource::from_rows(2, rows(3)).unwrap();

        let err = GridReportService::new()
            .build_with(&FailingRenderer, &config, &mut source, ReportFormat::Pdf, PageFormat::A4)
            .unwrap_err();

        assert!(matches!(err, ReportError::Configuration(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn one_shot_streams_cannot_be_built_twice() {
        let dir = tempfile::tempdir().unwrap();
        let config = configuration(&dir.path().join("report"));
        let stream = rows(4).into_iter().map(Ok::<_, DataSourceError>);
        let mut source = PagedDataSource::new(2, StreamProvider::new(stream)).unwrap();
        let service = GridReportService::new();
        let renderer = RecordingRenderer::default();

        service
            .build_with(&renderer, &config, &mut source, ReportFormat::Pdf, PageFormat::A4)
            .unwrap();
        let err = service
            .build_with(&renderer, &config, &mut source, ReportFormat::Pdf, PageFormat::A4)
            .unwrap_err();

        assert!(matches!(
            err,
            ReportError::DataSource(DataSourceError::RestartUnsupported { requested: 0, .. })
        ));
    }
}
