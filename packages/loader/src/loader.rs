//! The isolated per-archive loader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use modpack_archive::ArchiveReader;
use tracing::{debug, info};

use crate::capability::ModuleContract;
use crate::config::LoaderConfig;
use crate::environment::ParentEnvironment;
use crate::error::{InvalidModuleError, ResolutionFailure, Result};
use crate::module_set::ModuleSet;
use crate::namespace::Namespace;
use crate::resolved::{NamespaceId, ResolvedType};

/// Owns the namespace of one module package.
///
/// Construction reads the whole archive, resolves every executable entry,
/// and collects the units satisfying the [`ModuleContract`]. A loader is
/// only ever returned if at least one such unit exists.
///
/// Each loader has its own namespace: units from two loaders never see
/// each other, even when their qualified names match. Imports that the
/// archive cannot satisfy fall back to the shared [`ParentEnvironment`].
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use modpack_loader::{HostEnvironment, ModuleContract, ModuleLoader, Signature, ValKind};
///
/// let contract = Arc::new(
///     ModuleContract::new("handler")
///         .with_func("handle", Signature::new([ValKind::I32], [ValKind::I32])),
/// );
/// let env = Arc::new(HostEnvironment::new());
///
/// let loader = ModuleLoader::open("plugins/greeter.zip", contract, env)?;
/// for module in loader.modules() {
///     println!("found module {}", module.name());
/// }
/// # Ok::<(), modpack_loader::InvalidModuleError>(())
/// ```
pub struct ModuleLoader {
    path: PathBuf,
    contract: Arc<ModuleContract>,
    namespace: Namespace,
    modules: ModuleSet,
}

impl ModuleLoader {
    /// Load the archive at `path` with the default configuration.
    pub fn open(
        path: impl AsRef<Path>,
        contract: Arc<ModuleContract>,
        parent: Arc<dyn ParentEnvironment>,
    ) -> Result<Self> {
        Self::open_with_config(path, contract, parent, &LoaderConfig::default())
    }

    /// Load the archive at `path`.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        contract: Arc<ModuleContract>,
        parent: Arc<dyn ParentEnvironment>,
        config: &LoaderConfig,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = ArchiveReader::new(config.archive.clone())
            .open(&path)
            .map_err(|source| InvalidModuleError::Archive {
                path: path.clone(),
                source,
            })?;
        let namespace = Namespace::new(parent, entries);

        let mut modules = ModuleSet::default();
        let mut resolved = 0usize;
        for name in namespace.entry_names() {
            let Some(ty) = namespace.resolve(name) else {
                continue;
            };
            resolved += 1;
            if ty.satisfies(&contract) {
                debug!(entry = name, contract = contract.name(), "entry is a module");
                modules.insert(ty);
            }
        }

        if modules.is_empty() {
            return Err(InvalidModuleError::NoModuleFound {
                path,
                contract: contract.name().to_string(),
            });
        }

        info!(
            path = %path.display(),
            namespace = %namespace.id(),
            entries = namespace.len(),
            resolved,
            modules = modules.len(),
            "loaded module package"
        );

        Ok(Self {
            path,
            contract,
            namespace,
            modules,
        })
    }

    /// The units of this archive that satisfy the contract.
    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    /// Resolve a qualified name within this archive's namespace.
    ///
    /// Returns the cached type when `name` was already resolved. Returns
    /// `None` when the archive has no entry called `name`, or when that
    /// entry cannot be resolved; looking further afield is up to the
    /// caller.
    ///
    /// Calls for different names may run concurrently. Concurrent first
    /// resolution of the same name should be serialized by the caller.
    pub fn resolve(&self, name: &str) -> Option<Arc<ResolvedType>> {
        self.namespace.resolve(name)
    }

    /// Entries that failed to resolve so far, ordered by qualified name.
    pub fn failures(&self) -> Vec<ResolutionFailure> {
        self.namespace.failures()
    }

    /// Qualified names of every executable entry in the archive.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.namespace.entry_names()
    }

    pub fn namespace(&self) -> NamespaceId {
        self.namespace.id()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contract(&self) -> &ModuleContract {
        &self.contract
    }
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("path", &self.path)
            .field("namespace", &self.namespace.id())
            .field("contract", &self.contract.name())
            .field("modules", &self.modules.names().collect::<Vec<_>>())
            .finish()
    }
}
