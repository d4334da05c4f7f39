//! ipxdb - IPv4 region lookup over xdb index files.
//!
//! This crate resolves an IPv4 address to a region string such as
//! `中国|0|浙江省|杭州市|电信` by searching a read-only, purpose-built
//! binary index (an "xdb" file).
//!
//! # Features
//!
//! - **Two-level index**: a 256x256 vector index narrows every lookup to a
//!   small bucket, which is then binary searched
//! - **Three storage strategies**: file only, cached vector index, or the
//!   whole file in memory (heap or memory-mapped)
//! - **I/O accounting**: every searcher reports the file reads of its last search
//! - **Explicit ownership**: no global state; share buffers by cloning,
//!   share file handles through [`SharedSearcher`]
//!
//! # Quick Start
//!
//! ```ignore
//! use ipxdb::{load_content_from_file, Searcher};
//!
//! // Whole file in memory: zero I/O per search, safe to clone across threads
//! let content = load_content_from_file("ip2region.xdb")?;
//! let mut searcher = Searcher::with_buffer(content);
//!
//! match searcher.search_region("1.2.3.4")? {
//!     Some(region) => println!("{} {}", region.country, region.city),
//!     None => println!("not found"),
//! }
//! ```
//!
//! # Strategies
//!
//! | Constructor | Memory | I/O per search |
//! |---|---|---|
//! | [`Searcher::with_file_only`] | none | vector entry + probes + payload |
//! | [`Searcher::with_vector_index`] | 512 KiB | probes + payload |
//! | [`Searcher::with_buffer`] | whole file | 0 |
//!
//! [`CachePolicy`] picks one of them at runtime.

mod error;
mod policy;
mod region;
mod shared;

pub mod binary;

// Re-export core types
pub use error::{Error, Result};
pub use region::Region;

// Re-export the lookup engine
pub use binary::{
    format_ip, load_content, load_content_from_file, load_header, load_header_from_file,
    load_vector_index, load_vector_index_from_file, map_content_from_file, parse_ip,
    BufferSource, ByteSource, Content, FileSource, Header, IndexPolicy, Searcher,
    VectorIndexSource,
};

// Re-export configuration and concurrency helpers
pub use policy::{CachePolicy, DynSearcher};
pub use shared::{SearchResult, SharedSearcher};
