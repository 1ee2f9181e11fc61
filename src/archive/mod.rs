mod handle;
mod loader;

pub use handle::Archive;
pub use loader::{AbsentReason, BatchError, LoadResult};
