use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::FolioResult;

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/// Platform operations used by folio.
///
/// Implementations:
/// - `RealPal`: filesystem, process environment, system clock and a tiny_http listener
/// - `MockPal`: in-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> FolioResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> FolioResult<Box<dyn Read + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> FolioResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| {
            Box::new(crate::FolioError::new(crate::error::ErrorKind::FileError {
                path: path.as_path().to_path_buf(),
                source: e,
            }))
        })?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Append bytes to a file, creating it if it does not exist.
    fn append_to_file(&self, path: &FilePath, content: &[u8]) -> FolioResult<()>;

    /// Create a directory and all parent directories.
    fn create_directory_all(&self, path: &FilePath) -> FolioResult<()>;

    /// Look up an environment variable. Unset and non-unicode values are `None`.
    fn env_var(&self, key: &str) -> Option<String>;

    /// Current wall clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Start an HTTP server with the given service.
    ///
    /// The server starts listening immediately. It stops accepting connections
    /// once the returned handle is shut down or dropped.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> FolioResult<HttpServerHandle>;
}

/// Handle to a PAL implementation, enabling shared ownership.
///
/// ```
/// use folio_base::{MockPal, PalHandle};
///
/// let pal = PalHandle::new(MockPal::new());
/// let pal_clone = pal.clone(); // shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
