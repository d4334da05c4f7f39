//! Byte sources backing a searcher.
//!
//! A [`ByteSource`] hands out exactly `len` bytes at an absolute file offset.
//! The search algorithm is written once against this trait; the three
//! implementations differ only in where the bytes live and how I/O is counted:
//!
//! - [`FileSource`]: seek + read on an open file, one I/O per read.
//! - [`VectorIndexSource`]: vector index in memory, everything else from the file.
//! - [`BufferSource`]: the whole file in memory, zero I/O.

use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use super::format::{VECTOR_INDEX_LENGTH, VECTOR_INDEX_OFFSET};
use crate::{Error, Result};

/// Random access to the bytes of an xdb file.
pub trait ByteSource {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Never returns fewer bytes than requested; a truncated read is
    /// reported as [`Error::ShortRead`].
    fn read(&mut self, offset: u64, len: u32) -> Result<Cow<'_, [u8]>>;

    /// Number of file I/O operations since the last reset.
    fn io_count(&self) -> usize {
        0
    }

    /// Reset the I/O counter.
    fn reset_io_count(&mut self) {}
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(&mut self, offset: u64, len: u32) -> Result<Cow<'_, [u8]>> {
        (**self).read(offset, len)
    }

    fn io_count(&self) -> usize {
        (**self).io_count()
    }

    fn reset_io_count(&mut self) {
        (**self).reset_io_count()
    }
}

/// Seek to `offset` and read exactly `len` bytes.
pub(crate) fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    reader
        .seek(SeekFrom::Start(offset))
        .map_err(|source| Error::Seek { offset, source })?;

    let mut buf = Vec::with_capacity(len);
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|source| Error::Read {
            offset,
            len: len as u32,
            source,
        })?;

    if buf.len() != len {
        return Err(Error::ShortRead {
            offset,
            expected: len,
            actual: buf.len(),
        });
    }

    Ok(buf)
}

/// Bounds-checked slice of `len` bytes at `offset`.
fn slice_at(data: &[u8], offset: u64, len: u32) -> Result<&[u8]> {
    let short = || Error::ShortRead {
        offset,
        expected: len as usize,
        actual: (data.len() as u64).saturating_sub(offset) as usize,
    };

    let start = usize::try_from(offset).map_err(|_| short())?;
    let end = start.checked_add(len as usize).ok_or_else(short)?;
    data.get(start..end).ok_or_else(short)
}

/// File-backed byte source.
///
/// Holds one stateful handle with an implicit seek cursor, so it must not be
/// shared between concurrent searches.
pub struct FileSource<R = File> {
    reader: R,
    io_count: usize,
}

impl FileSource<File> {
    /// Open an xdb file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Opened xdb file {:?}", path);
        Ok(Self::new(file))
    }
}

impl<R: Read + Seek> FileSource<R> {
    /// Wrap an already opened reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            io_count: 0,
        }
    }

    /// Release the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ByteSource for FileSource<R> {
    fn read(&mut self, offset: u64, len: u32) -> Result<Cow<'_, [u8]>> {
        self.io_count += 1;
        read_at(&mut self.reader, offset, len as usize).map(Cow::Owned)
    }

    fn io_count(&self) -> usize {
        self.io_count
    }

    fn reset_io_count(&mut self) {
        self.io_count = 0;
    }
}

/// Byte source with the vector index resident in memory.
///
/// Reads that fall entirely inside the vector index block are served from
/// the cache without touching the file; all other reads go to the file.
pub struct VectorIndexSource<R = File> {
    vector_index: Arc<[u8]>,
    file: FileSource<R>,
}

impl VectorIndexSource<File> {
    /// Open an xdb file with a pre-loaded vector index.
    pub fn open(path: impl AsRef<Path>, vector_index: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::new(FileSource::open(path)?, vector_index)
    }
}

impl<R: Read + Seek> VectorIndexSource<R> {
    /// Combine a file source with a pre-loaded vector index.
    pub fn new(file: FileSource<R>, vector_index: impl Into<Arc<[u8]>>) -> Result<Self> {
        let vector_index = vector_index.into();
        if vector_index.len() != VECTOR_INDEX_LENGTH {
            return Err(Error::InvalidVectorIndex {
                expected: VECTOR_INDEX_LENGTH,
                actual: vector_index.len(),
            });
        }
        Ok(Self { vector_index, file })
    }

    /// The cached vector index block.
    pub fn vector_index(&self) -> &Arc<[u8]> {
        &self.vector_index
    }
}

impl<R: Read + Seek> ByteSource for VectorIndexSource<R> {
    fn read(&mut self, offset: u64, len: u32) -> Result<Cow<'_, [u8]>> {
        let cached_end = VECTOR_INDEX_OFFSET + VECTOR_INDEX_LENGTH as u64;
        let in_cache = offset >= VECTOR_INDEX_OFFSET
            && offset
                .checked_add(len as u64)
                .map_or(false, |end| end <= cached_end);
        if in_cache {
            let relative = offset - VECTOR_INDEX_OFFSET;
            return slice_at(&self.vector_index, relative, len).map(Cow::Borrowed);
        }
        self.file.read(offset, len)
    }

    fn io_count(&self) -> usize {
        self.file.io_count()
    }

    fn reset_io_count(&mut self) {
        self.file.reset_io_count()
    }
}

#[derive(Clone)]
enum ContentInner {
    Heap(Arc<[u8]>),
    Mapped(Arc<Mmap>),
}

/// Immutable, cheaply clonable xdb content, either on the heap or memory-mapped.
#[derive(Clone)]
pub struct Content {
    inner: ContentInner,
}

impl Content {
    /// Memory-map an xdb file.
    pub fn map(file: &File) -> Result<Self> {
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self {
            inner: ContentInner::Mapped(Arc::new(mmap)),
        })
    }

    /// Whether the content is backed by a memory map.
    pub fn is_mapped(&self) -> bool {
        matches!(self.inner, ContentInner::Mapped(_))
    }
}

impl Deref for Content {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.inner {
            ContentInner::Heap(data) => &data[..],
            ContentInner::Mapped(mmap) => &mmap[..],
        }
    }
}

impl AsRef<[u8]> for Content {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl From<Vec<u8>> for Content {
    fn from(data: Vec<u8>) -> Self {
        Self {
            inner: ContentInner::Heap(data.into()),
        }
    }
}

impl From<Arc<[u8]>> for Content {
    fn from(data: Arc<[u8]>) -> Self {
        Self {
            inner: ContentInner::Heap(data),
        }
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Content")
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

/// Byte source over fully resident content. Never performs file I/O.
///
/// Cloning shares the underlying buffer, so one loaded file can back any
/// number of searchers on different threads.
#[derive(Clone, Debug)]
pub struct BufferSource {
    content: Content,
}

impl BufferSource {
    /// Create a source over loaded content.
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// The resident content.
    pub fn content(&self) -> &Content {
        &self.content
    }
}

impl ByteSource for BufferSource {
    fn read(&mut self, offset: u64, len: u32) -> Result<Cow<'_, [u8]>> {
        slice_at(&self.content, offset, len).map(Cow::Borrowed)
    }
}
