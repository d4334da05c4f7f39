//! xdb lookup engine.

use std::fs::File;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::Arc;

use super::format::*;
use super::source::{BufferSource, ByteSource, Content, FileSource, VectorIndexSource};
use crate::{Region, Result};

/// IPv4 region searcher over an xdb file.
///
/// The search algorithm is the same for every strategy: locate the bucket
/// for the top two octets in the vector index, binary search the segment
/// records it points at, then fetch the matched payload. Where the bytes
/// come from is decided by the [`ByteSource`].
///
/// `search` takes `&mut self`. A file-backed searcher owns a handle with a
/// seek cursor, so concurrent use needs one searcher per thread or a lock
/// (see [`SharedSearcher`](crate::SharedSearcher)). A buffer-backed searcher
/// is `Clone` and its clones share one immutable buffer.
///
/// # Example
///
/// ```ignore
/// use ipxdb::{load_vector_index_from_file, Searcher};
///
/// let vector_index = load_vector_index_from_file("ip2region.xdb")?;
/// let mut searcher = Searcher::with_vector_index("ip2region.xdb", vector_index)?;
///
/// if let Some(payload) = searcher.search("1.2.3.4")? {
///     println!("{} ({} io)", String::from_utf8_lossy(&payload), searcher.io_count());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Searcher<S = FileSource> {
    source: S,
}

impl Searcher<FileSource<File>> {
    /// Search entirely from the file.
    pub fn with_file_only(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileSource::open(path)?))
    }
}

impl Searcher<VectorIndexSource<File>> {
    /// Search with the vector index cached in memory.
    pub fn with_vector_index(
        path: impl AsRef<Path>,
        vector_index: impl Into<Arc<[u8]>>,
    ) -> Result<Self> {
        Ok(Self::new(VectorIndexSource::open(path, vector_index)?))
    }
}

impl Searcher<BufferSource> {
    /// Search entirely from memory.
    pub fn with_buffer(content: impl Into<Content>) -> Self {
        let source = BufferSource::new(content);
        log::debug!("Created buffer searcher over {} bytes", source.content().len());
        Self::new(source)
    }
}

impl<S: ByteSource> Searcher<S> {
    /// Create a searcher over any byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Search the region payload for a dotted-decimal IPv4 address.
    ///
    /// Returns `Ok(None)` if no segment contains the address, which on a
    /// correctly built file means the index is damaged.
    pub fn search(&mut self, ip: &str) -> Result<Option<Vec<u8>>> {
        let ip = parse_ip(ip)?;
        self.search_ip(ip)
    }

    /// Search the region payload for a typed address.
    pub fn search_addr(&mut self, ip: Ipv4Addr) -> Result<Option<Vec<u8>>> {
        self.search_ip(u32::from(ip))
    }

    /// Search and split the payload into named fields.
    pub fn search_region(&mut self, ip: &str) -> Result<Option<Region>> {
        Ok(self
            .search(ip)?
            .map(|payload| Region::from_payload(&payload)))
    }

    /// Search the region payload for a numeric address.
    pub fn search_ip(&mut self, ip: u32) -> Result<Option<Vec<u8>>> {
        self.source.reset_io_count();

        let bucket = {
            let buf = self
                .source
                .read(VectorIndexEntry::file_offset(ip), VECTOR_INDEX_ENTRY_SIZE as u32)?;
            VectorIndexEntry::decode(&buf)
        };

        let segment = match self.find_segment(ip, bucket)? {
            Some(segment) => segment,
            None => {
                log::warn!(
                    "No segment for {} in bucket [{}, {}]",
                    format_ip(ip),
                    bucket.start_ptr,
                    bucket.end_ptr
                );
                return Ok(None);
            }
        };

        let payload = self
            .source
            .read(segment.data_ptr as u64, segment.data_len as u32)?
            .into_owned();

        log::trace!(
            "Found {} in [{}, {}] with {} io",
            format_ip(ip),
            format_ip(segment.start_ip),
            format_ip(segment.end_ip),
            self.source.io_count()
        );

        Ok(Some(payload))
    }

    /// Binary search the bucket's segment records for `ip`.
    fn find_segment(&mut self, ip: u32, bucket: VectorIndexEntry) -> Result<Option<SegmentIndexEntry>> {
        let mut high = match bucket.last_record() {
            Some(last) => last,
            None => {
                log::warn!(
                    "Inverted bucket pointers [{}, {}] for {}",
                    bucket.start_ptr,
                    bucket.end_ptr,
                    format_ip(ip)
                );
                return Ok(None);
            }
        };
        let mut low = 0usize;

        while low <= high {
            let mid = (low + high) / 2;
            let offset = bucket.start_ptr as u64 + (mid * SEGMENT_INDEX_SIZE) as u64;
            let entry = {
                let buf = self.source.read(offset, SEGMENT_INDEX_SIZE as u32)?;
                SegmentIndexEntry::decode(&buf)
            };

            if ip < entry.start_ip {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            } else if ip > entry.end_ip {
                low = mid + 1;
            } else {
                return Ok(Some(entry));
            }
        }

        Ok(None)
    }

    /// Number of file I/O operations performed by the most recent search.
    pub fn io_count(&self) -> usize {
        self.source.io_count()
    }

    /// Get a reference to the underlying byte source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Release the byte source, closing any open file.
    pub fn close(self) {
        drop(self.source);
    }
}
