mod jsonl;
pub mod memory;
pub mod traits;

pub use jsonl::JsonLinesStore;
pub use memory::InMemoryStore;
pub use traits::{MessageStore, StoreHandle};

use folio_base::{FilePath, FolioResult, PalHandle};

/// Store used when `STORE_URL` is not set.
pub const DEFAULT_STORE_URL: &str = "file://data/messages.jsonl";

/// A parsed store connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// `memory://`
    Memory,
    /// `file://<relative path>`
    File(FilePath),
}

impl StoreUrl {
    /// Parse a store connection string.
    ///
    /// ```
    /// use folio_base::FilePath;
    /// use folio_engine::store::StoreUrl;
    ///
    /// assert_eq!(StoreUrl::parse("memory://").unwrap(), StoreUrl::Memory);
    /// assert_eq!(
    ///     StoreUrl::parse("file://data/messages.jsonl").unwrap(),
    ///     StoreUrl::File(FilePath::from("data/messages.jsonl"))
    /// );
    /// assert!(StoreUrl::parse("mongodb://localhost/portfolio").is_err());
    /// ```
    pub fn parse(url: &str) -> FolioResult<Self> {
        if url == "memory://" {
            return Ok(Self::Memory);
        }
        match url.strip_prefix("file://") {
            Some(path) if !path.is_empty() => Ok(Self::File(FilePath::from(path))),
            _ => folio_base::bail!(
                "Unsupported store URL '{}': expected memory:// or file://<relative path>",
                url
            ),
        }
    }
}

/// Open the store named by a connection string.
pub fn open_store(pal: &PalHandle, url: &str) -> FolioResult<StoreHandle> {
    Ok(match StoreUrl::parse(url)? {
        StoreUrl::Memory => StoreHandle::new(InMemoryStore::new()),
        StoreUrl::File(path) => StoreHandle::new(JsonLinesStore::open(pal.clone(), path)?),
    })
}
