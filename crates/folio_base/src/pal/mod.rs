/* 📖 # What is the Platform Abstraction Layer?

The PAL is the single seam between folio and the outside world: files, process
environment, the wall clock and the HTTP listener.
- RealPal talks to the operating system
- MockPal keeps everything in memory, with a deterministic clock and simulated requests

Services receive a PalHandle when they are constructed and never reach for
std::fs, std::env or the system clock directly.
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle};
