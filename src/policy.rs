//! Cache policy selection.

use std::fmt;
use std::path::Path;

use crate::binary::{
    load_content_from_file, load_vector_index_from_file, ByteSource, FileSource,
    VectorIndexSource,
};
use crate::{BufferSource, Error, Result, Searcher};

/// Searcher over a byte source chosen at runtime.
pub type DynSearcher = Searcher<Box<dyn ByteSource + Send>>;

/// Storage strategy for a searcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePolicy {
    /// Every read goes to the file
    File,
    /// Vector index cached, segment records and payloads from the file
    #[default]
    VectorIndex,
    /// Whole file resident in memory
    Content,
}

impl CachePolicy {
    /// Get the internal name of this policy.
    pub fn name(&self) -> &'static str {
        match self {
            CachePolicy::File => "file",
            CachePolicy::VectorIndex => "vectorIndex",
            CachePolicy::Content => "content",
        }
    }

    /// Open a searcher over `path` using this policy.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<DynSearcher> {
        let path = path.as_ref();
        let source: Box<dyn ByteSource + Send> = match self {
            CachePolicy::File => Box::new(FileSource::open(path)?),
            CachePolicy::VectorIndex => {
                let vector_index = load_vector_index_from_file(path)?;
                Box::new(VectorIndexSource::open(path, vector_index)?)
            }
            CachePolicy::Content => Box::new(BufferSource::new(load_content_from_file(path)?)),
        };

        log::debug!("Opened {:?} with {} policy", path, self.name());
        Ok(Searcher::new(source))
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CachePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "file" => Ok(CachePolicy::File),
            "vectorindex" | "vector_index" | "vector" => Ok(CachePolicy::VectorIndex),
            "content" | "buffer" => Ok(CachePolicy::Content),
            _ => Err(Error::InvalidPolicy(s.to_string())),
        }
    }
}
