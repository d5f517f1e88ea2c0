//! Loader configuration.

use modpack_archive::ArchiveConfig;
use serde::Deserialize;

/// Configuration for [`ModuleLoader`](crate::ModuleLoader).
///
/// ```
/// use modpack_loader::LoaderConfig;
///
/// let config: LoaderConfig =
///     serde_json::from_str(r#"{"archive": {"code_suffix": ".unit"}}"#).unwrap();
/// assert_eq!(config.archive.code_suffix, ".unit");
/// assert_eq!(config.archive.path_separator, '/');
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// How archives are read.
    pub archive: ArchiveConfig,
}
