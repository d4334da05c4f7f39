//! One-shot loaders for the header, the vector index and the whole file.
//!
//! These are independent of any searcher. The vector index and content
//! loaders feed the cached strategies.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use super::format::{Header, HEADER_SIZE, VECTOR_INDEX_LENGTH, VECTOR_INDEX_OFFSET};
use super::source::{read_at, Content};
use crate::{Error, Result};

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the header from an open reader.
pub fn load_header<R: Read + Seek>(reader: &mut R) -> Result<Header> {
    let buf = read_at(reader, 0, HEADER_SIZE)?;
    Header::decode(&buf)
}

/// Load the header from an xdb file.
pub fn load_header_from_file(path: impl AsRef<Path>) -> Result<Header> {
    let mut file = open(path.as_ref())?;
    load_header(&mut file)
}

/// Load the 512 KiB vector index block from an open reader.
pub fn load_vector_index<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
    read_at(reader, VECTOR_INDEX_OFFSET, VECTOR_INDEX_LENGTH)
}

/// Load the vector index block from an xdb file.
pub fn load_vector_index_from_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let mut file = open(path.as_ref())?;
    load_vector_index(&mut file)
}

/// Load the entire content from an open reader.
pub fn load_content<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
    let size = reader
        .seek(SeekFrom::End(0))
        .map_err(|source| Error::Seek { offset: 0, source })?;
    // Every offset in the format is a u32, so the size fits in usize.
    read_at(reader, 0, size as usize)
}

/// Load the entire content of an xdb file.
pub fn load_content_from_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded {} bytes of xdb content from {:?}", data.len(), path);
    Ok(data)
}

/// Memory-map an xdb file as resident content.
pub fn map_content_from_file(path: impl AsRef<Path>) -> Result<Content> {
    let path = path.as_ref();
    let file = open(path)?;
    let content = Content::map(&file)?;
    log::debug!("Mapped {} bytes of xdb content from {:?}", content.len(), path);
    Ok(content)
}
