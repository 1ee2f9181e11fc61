//! Reliquary: read-only, integrity-verified asset archive reader
//!
//! An archive is a single SQLite file mapping logical asset names to
//! zstd-compressed payloads. Loading a name verifies a SHA-256 digest
//! over the compressed bytes, follows at most one alias indirection, and
//! decompresses under a hard 256 MiB ceiling:
//! - Batch loads with per-entry results (corrupt entries never block
//!   their siblings)
//! - Aggregate stat queries for diagnostics
//! - Standalone digest verification, exposed for independent testing
//!
//! # Example
//!
//! ```no_run
//! use reliquary::Archive;
//!
//! let archive = Archive::open("assets.db")?;
//! if let Some(data) = archive.load_one("textures/hero.png")?.into_data() {
//!     println!("loaded {} bytes", data.len());
//! }
//! # Ok::<(), reliquary::ReliquaryError>(())
//! ```

// Core modules
pub mod archive;
pub mod codec;
pub mod digest;
pub mod error;

// Re-export commonly used types
pub use archive::{AbsentReason, Archive, BatchError, LoadResult};
pub use codec::{decompress, MAX_DECOMPRESSED_SIZE};
pub use digest::{sha256, verify, DIGEST_LEN};
pub use error::{ReliquaryError, Result};
