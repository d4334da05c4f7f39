//! Mutex-guarded searcher for concurrent callers.

use parking_lot::Mutex;

use crate::binary::ByteSource;
use crate::{Region, Result, Searcher};

/// A searcher that can be shared between threads.
///
/// File-backed strategies keep a single seek cursor, so each search runs
/// under the lock from start to finish. For buffer-backed searchers prefer
/// cloning one `Searcher` per thread instead.
pub struct SharedSearcher<S: ByteSource> {
    inner: Mutex<Searcher<S>>,
}

/// Result of a search made through a [`SharedSearcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Raw region payload, `None` if no segment matched
    pub payload: Option<Vec<u8>>,
    /// File I/O operations performed by this search
    pub io_count: usize,
}

impl SearchResult {
    /// Split the payload into named fields.
    pub fn region(&self) -> Option<Region> {
        self.payload.as_deref().map(Region::from_payload)
    }
}

impl<S: ByteSource> SharedSearcher<S> {
    /// Wrap a searcher.
    pub fn new(searcher: Searcher<S>) -> Self {
        Self {
            inner: Mutex::new(searcher),
        }
    }

    /// Search a dotted-decimal address under the lock.
    pub fn search(&self, ip: &str) -> Result<SearchResult> {
        let mut searcher = self.inner.lock();
        let payload = searcher.search(ip)?;
        Ok(SearchResult {
            payload,
            io_count: searcher.io_count(),
        })
    }

    /// Search a numeric address under the lock.
    pub fn search_ip(&self, ip: u32) -> Result<SearchResult> {
        let mut searcher = self.inner.lock();
        let payload = searcher.search_ip(ip)?;
        Ok(SearchResult {
            payload,
            io_count: searcher.io_count(),
        })
    }

    /// Unwrap the inner searcher.
    pub fn into_inner(self) -> Searcher<S> {
        self.inner.into_inner()
    }
}

impl<S: ByteSource> From<Searcher<S>> for SharedSearcher<S> {
    fn from(searcher: Searcher<S>) -> Self {
        Self::new(searcher)
    }
}
