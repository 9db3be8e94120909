//! Paginated access to report rows.
//!
//! A [`RowProvider`] knows how to fetch rows by offset; a [`PagedDataSource`]
//! slices those rows into fixed-size pages. Pages are pulled lazily, one at a
//! time, so the memory held by the core is bounded by the page size rather than
//! by the total row count.
//!
//! Providers addressed by offset ([`Vec<Row>`], [`PullProvider`]) can be
//! paged any number of times. A [`StreamProvider`] wraps a one-shot iterator:
//! it can only move forward and fails with
//! [`DataSourceError::RestartUnsupported`] when an earlier offset is requested.

use std::num::NonZeroUsize;

use log::debug;

use crate::error::{DataSourceError, ReportError};
use crate::model::Row;

/// Source of rows addressed by offset.
pub trait RowProvider {
    /// Total number of rows when it is known up front.
    fn total_rows(&self) -> Option<usize>;

    /// Returns up to `limit` rows starting at `offset`. Returning fewer rows
    /// than requested signals the end of the data.
    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Row>, DataSourceError>;
}

impl RowProvider for Vec<Row> {
    fn total_rows(&self) -> Option<usize> {
        Some(self.len())
    }

    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Row>, DataSourceError> {
        let start = offset.min(self.len());
        let end = offset.saturating_add(limit).min(self.len());
        Ok(self[start..end].to_vec())
    }
}

/// Pull-based provider backed by a closure `(offset, limit) -> rows`.
///
/// The closure is expected to return the same rows for the same offset, which
/// keeps the provider restartable.
pub struct PullProvider<F> {
    fetch: F,
    total: Option<usize>,
}

impl<F> PullProvider<F>
where
    F: FnMut(usize, usize) -> Result<Vec<Row>, DataSourceError>,
{
    /// Creates a provider with an unknown row count.
    pub fn new(fetch: F) -> Self {
        Self { fetch, total: None }
    }

    /// Declares the total row count, which lets the data source compute the
    /// page count without probing.
    pub fn with_total(mut self, total: impl Into<Option<usize>>) -> Self {
        self.total = total.into();
        self
    }
}

impl<F> RowProvider for PullProvider<F>
where
    F: FnMut(usize, usize) -> Result<Vec<Row>, DataSourceError>,
{
    fn total_rows(&self) -> Option<usize> {
        self.total
    }

    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Row>, DataSourceError> {
        if let Some(total) = self.total {
            if offset >= total {
                return Ok(Vec::new());
            }
        }
        let mut rows = (self.fetch)(offset, limit)?;
        rows.truncate(limit);
        Ok(rows)
    }
}

/// One-shot provider over an iterator of rows.
pub struct StreamProvider<I> {
    rows: I,
    position: usize,
    exhausted: bool,
}

impl<I> StreamProvider<I>
where
    I: Iterator<Item = Result<Row, DataSourceError>>,
{
    pub fn new(rows: I) -> Self {
        Self {
            rows,
            position: 0,
            exhausted: false,
        }
    }

    /// Number of rows consumed from the underlying iterator so far.
    pub fn position(&self) -> usize {
        self.position
    }

    fn next_row(&mut self) -> Result<Option<Row>, DataSourceError> {
        if self.exhausted {
            return Ok(None);
        }
        match self.rows.next() {
            Some(row) => {
                let row = row?;
                self.position += 1;
                Ok(Some(row))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

impl<I> RowProvider for StreamProvider<I>
where
    I: Iterator<Item = Result<Row, DataSourceError>>,
{
    fn total_rows(&self) -> Option<usize> {
        None
    }

    fn fetch(&mut self, offset: usize, limit: usize) -> Result<Vec<Row>, DataSourceError> {
        if offset < self.position {
            return Err(DataSourceError::RestartUnsupported {
                requested: offset,
                position: self.position,
            });
        }

        while self.position < offset {
            if self.next_row()?.is_none() {
                return Ok(Vec::new());
            }
        }

        let mut rows = Vec::with_capacity(limit);
        while rows.len() < limit {
            match self.next_row()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }
}

/// Bounded slice of rows for one rendering pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    index: usize,
    rows: Vec<Row>,
}

impl Page {
    /// Zero-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// Splits the rows of a provider into pages of a fixed size.
pub struct PagedDataSource<P> {
    provider: P,
    page_size: NonZeroUsize,
}

impl PagedDataSource<Vec<Row>> {
    /// Convenience constructor for in-memory rows.
    pub fn from_rows(page_size: usize, rows: impl Into<Vec<Row>>) -> Result<Self, ReportError> {
        Self::new(page_size, rows.into())
    }
}

impl<P: RowProvider> PagedDataSource<P> {
    /// Creates a data source. The page size must be at least one row.
    pub fn new(page_size: usize, provider: P) -> Result<Self, ReportError> {
        let page_size = NonZeroUsize::new(page_size)
            .ok_or_else(|| ReportError::configuration("page size must be at least 1 row"))?;
        Ok(Self {
            provider,
            page_size,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Total row count, if the provider knows it.
    pub fn row_count(&self) -> Option<usize> {
        self.provider.total_rows()
    }

    /// Number of pages, if the row count is known.
    pub fn page_count(&self) -> Option<usize> {
        self.row_count()
            .map(|rows| rows.div_ceil(self.page_size.get()))
    }

    /// Returns the page at `index`, or `None` past the last page.
    pub fn page(&mut self, index: usize) -> Result<Option<Page>, DataSourceError> {
        if let Some(count) = self.page_count() {
            if index >= count {
                return Ok(None);
            }
        }

        let page_size = self.page_size.get();
        let offset = index.saturating_mul(page_size);
        let rows = self.provider.fetch(offset, page_size)?;
        if rows.is_empty() {
            return Ok(None);
        }

        debug!("fetched page {} with {} rows", index, rows.len());
        Ok(Some(Page { index, rows }))
    }

    /// Iterates over all pages, starting from the first one.
    pub fn pages(&mut self) -> Pages<'_, P> {
        Pages {
            source: self,
            next_index: 0,
            finished: false,
        }
    }

    /// Returns the wrapped provider.
    pub fn into_provider(self) -> P {
        self.provider
    }
}

/// Lazy iterator over the pages of a [`PagedDataSource`].
pub struct Pages<'a, P> {
    source: &'a mut PagedDataSource<P>,
    next_index: usize,
    finished: bool,
}

impl<P: RowProvider> Iterator for Pages<'_, P> {
    type Item = Result<Page, DataSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.source.page(self.next_index) {
            Ok(Some(page)) => {
                self.next_index += 1;
                // A short page is the last one; probing further would cost a
                // fetch on one-shot streams.
                if page.len() < self.source.page_size() {
                    self.finished = true;
                }
                Some(Ok(page))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
