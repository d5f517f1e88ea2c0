//! Extraction of executable entries from a module package.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};

/// One executable-code entry pulled out of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Qualified name, e.g. `foo.bar.Impl` for `foo/bar/Impl.wasm`.
    pub name: String,

    /// The entry's full, uncompressed content.
    pub bytecode: Bytes,
}

/// The executable entries of one archive, in archive order.
///
/// This is consumed once: it owns the extracted bytes and cannot be
/// rewound or cloned.
#[derive(Debug)]
pub struct RawEntries {
    inner: std::vec::IntoIter<RawEntry>,
}

impl Iterator for RawEntries {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for RawEntries {}

/// Reads module packages according to an [`ArchiveConfig`].
#[derive(Debug, Clone, Default)]
pub struct ArchiveReader {
    config: ArchiveConfig,
}

impl ArchiveReader {
    /// Create a reader with the given configuration.
    pub fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// The configuration this reader applies.
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Open the archive at `path` and extract every executable entry.
    ///
    /// The archive is read completely and its file handle is released
    /// before this returns. Entries without the code suffix and
    /// directory entries are skipped without being reported.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<RawEntries> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ArchiveError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ArchiveError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let corrupt = |source: ZipError| ArchiveError::Corrupt {
            path: path.to_path_buf(),
            source,
        };

        let mut archive = ZipArchive::new(file).map_err(corrupt)?;
        let mut entries = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(corrupt)?;
            debug!(archive = %path.display(), entry = entry.name(), "found entry");

            if entry.is_dir() {
                continue;
            }
            let Some(name) = qualified_name(entry.name(), &self.config) else {
                continue;
            };

            let limit = self.config.max_entry_bytes;
            let entry_name = entry.name().to_string();
            let too_large = || ArchiveError::EntryTooLarge {
                path: path.to_path_buf(),
                entry: entry_name.clone(),
                limit,
            };
            if entry.size() > limit {
                return Err(too_large());
            }

            // The declared size can disagree with the stream, so it only
            // gates the read and never sizes the buffer.
            let mut buffer = Vec::new();
            entry
                .by_ref()
                .take(limit.saturating_add(1))
                .read_to_end(&mut buffer)
                .map_err(|e| corrupt(ZipError::Io(e)))?;
            if buffer.len() as u64 > limit {
                return Err(too_large());
            }

            debug!(entry = %name, bytes = buffer.len(), "extracted entry");
            entries.push(RawEntry {
                name,
                bytecode: Bytes::from(buffer),
            });
        }

        drop(archive);
        Ok(RawEntries {
            inner: dedup(entries).into_iter(),
        })
    }
}

/// Open `path` with the default [`ArchiveConfig`].
pub fn open(path: impl AsRef<Path>) -> Result<RawEntries> {
    ArchiveReader::default().open(path)
}

/// Derive the qualified name for an archive entry.
///
/// Returns `None` when the entry does not carry the code suffix or has
/// an empty name once the suffix is removed.
pub fn qualified_name(entry_name: &str, config: &ArchiveConfig) -> Option<String> {
    let stem = entry_name.strip_suffix(config.code_suffix.as_str())?;
    let stem = stem.trim_start_matches(config.path_separator);
    if stem.is_empty() || stem.ends_with(config.path_separator) {
        return None;
    }
    Some(stem.replace(config.path_separator, &config.namespace_separator.to_string()))
}

/// Keep the first entry for each qualified name, preserving archive order.
fn dedup(entries: Vec<RawEntry>) -> Vec<RawEntry> {
    let mut seen = BTreeSet::new();
    let mut unique = Vec::with_capacity(entries.len());
    for entry in entries {
        if seen.insert(entry.name.clone()) {
            unique.push(entry);
        } else {
            warn!(entry = %entry.name, "duplicate qualified name in archive, keeping first");
        }
    }
    unique
}
