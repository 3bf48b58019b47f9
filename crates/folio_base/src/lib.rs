/* 📖 # Why have folio_base as a core library?
folio_base provides the error type, tracing setup and the platform abstraction layer
shared by the engine and the CLI. Keeping them here prevents circular dependencies
and keeps every crate on the same error handling.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{FolioError, FolioResult, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
