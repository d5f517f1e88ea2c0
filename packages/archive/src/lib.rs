//! Module package reader.
//!
//! This is the leaf layer of modpack. It opens a module package (a zip
//! archive), walks its entries, and hands back the raw bytes of every
//! executable-code entry together with its qualified name. Nothing is
//! compiled or validated here - resolution belongs to `modpack-loader`.
//!
//! ```text
//! archive.zip                     RawEntry
//! ├ META-INF/manifest.json   ->   (skipped)
//! ├ foo/Impl.wasm            ->   ("foo.Impl",   <bytes>)
//! └ foo/bar/Helper.wasm      ->   ("foo.bar.Helper", <bytes>)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use modpack_archive::ArchiveReader;
//!
//! let entries = ArchiveReader::default().open("plugins/greeter.zip")?;
//! for entry in entries {
//!     println!("{} ({} bytes)", entry.name, entry.bytecode.len());
//! }
//! # Ok::<(), modpack_archive::ArchiveError>(())
//! ```

mod config;
mod error;
mod reader;

pub use bytes::Bytes;
pub use config::{ArchiveConfig, DEFAULT_MAX_ENTRY_BYTES};
pub use error::{ArchiveError, Result};
pub use reader::{open, qualified_name, ArchiveReader, RawEntries, RawEntry};
