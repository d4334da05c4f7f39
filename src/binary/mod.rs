//! xdb binary file format and lookup engine.
//!
//! An xdb file is built once by an external tool and never modified.
//! All integers are little-endian.
//!
//! # File Structure
//!
//! ```text
//! +------------------+
//! |     HEADER       |  256 bytes (16 used, rest reserved)
//! +------------------+
//! |   VECTOR INDEX   |  256 x 256 x 8 bytes = 512 KiB
//! +------------------+
//! |  SEGMENT INDEX   |  14-byte records, interleaved with
//! |   + PAYLOADS     |  variable-length region strings
//! +------------------+
//! ```
//!
//! The vector index maps the first two octets of an address to a run of
//! segment records sorted by start address. A search reads one bucket entry,
//! binary searches its run and then fetches the payload of the match.

mod format;
mod loader;
mod searcher;
mod source;


pub use format::*;
pub use loader::{
    load_content, load_content_from_file, load_header, load_header_from_file, load_vector_index,
    load_vector_index_from_file, map_content_from_file,
};
pub use searcher::Searcher;
pub use source::{BufferSource, ByteSource, Content, FileSource, VectorIndexSource};
