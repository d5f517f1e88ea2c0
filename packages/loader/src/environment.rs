//! The shared parent environment.
//!
//! Every loader falls back to one parent environment for imports its own
//! archive cannot satisfy. The parent also owns the engine that compiles
//! units, so all loaders attached to it produce modules the host can
//! instantiate in the same stores.

use std::collections::BTreeMap;

use wasmtime::Engine;

use crate::capability::{CapabilityKind, Signature, ValKind};

/// Fallback resolution shared by all loaders.
///
/// Implementations are consulted during resolution and never mutated by
/// it, so one environment can be shared across threads.
pub trait ParentEnvironment: Send + Sync {
    /// The engine used to compile units.
    fn engine(&self) -> &Engine;

    /// What the environment provides for the import `module::item`, if
    /// anything.
    fn lookup(&self, module: &str, item: &str) -> Option<CapabilityKind>;
}

/// A [`ParentEnvironment`] backed by an explicit table of host items.
///
/// # Example
///
/// ```
/// use modpack_loader::{HostEnvironment, ParentEnvironment, Signature, ValKind};
///
/// let env = HostEnvironment::new()
///     .with_func("host", "log", Signature::new([ValKind::I32], None))
///     .with_memory("host", "memory");
///
/// assert!(env.lookup("host", "log").is_some());
/// assert!(env.lookup("host", "exit").is_none());
/// ```
#[derive(Clone)]
pub struct HostEnvironment {
    engine: Engine,
    provided: BTreeMap<(String, String), CapabilityKind>,
}

impl HostEnvironment {
    /// Create an environment with a default engine and no host items.
    pub fn new() -> Self {
        Self::with_engine(Engine::default())
    }

    /// Create an environment around a host-configured engine.
    pub fn with_engine(engine: Engine) -> Self {
        Self {
            engine,
            provided: BTreeMap::new(),
        }
    }

    /// Provide an item of the given kind.
    pub fn provide(
        mut self,
        module: impl Into<String>,
        item: impl Into<String>,
        kind: CapabilityKind,
    ) -> Self {
        self.provided.insert((module.into(), item.into()), kind);
        self
    }

    /// Provide a host function.
    pub fn with_func(
        self,
        module: impl Into<String>,
        item: impl Into<String>,
        signature: Signature,
    ) -> Self {
        self.provide(module, item, CapabilityKind::Func(signature))
    }

    /// Provide a global.
    pub fn with_global(
        self,
        module: impl Into<String>,
        item: impl Into<String>,
        content: ValKind,
        mutable: bool,
    ) -> Self {
        self.provide(module, item, CapabilityKind::Global { content, mutable })
    }

    /// Provide a linear memory.
    pub fn with_memory(self, module: impl Into<String>, item: impl Into<String>) -> Self {
        self.provide(module, item, CapabilityKind::Memory)
    }

    /// Provide a table.
    pub fn with_table(self, module: impl Into<String>, item: impl Into<String>) -> Self {
        self.provide(module, item, CapabilityKind::Table)
    }

    /// Number of provided items.
    pub fn len(&self) -> usize {
        self.provided.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provided.is_empty()
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEnvironment")
            .field("provided", &self.provided)
            .finish_non_exhaustive()
    }
}

impl ParentEnvironment for HostEnvironment {
    fn engine(&self) -> &Engine {
        &self.engine
    }

    fn lookup(&self, module: &str, item: &str) -> Option<CapabilityKind> {
        self.provided
            .get(&(module.to_string(), item.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment() {
        let env = HostEnvironment::new();
        assert!(env.is_empty());
        assert_eq!(env.lookup("host", "log"), None);
    }

    #[test]
    fn provided_items_are_found() {
        let env = HostEnvironment::new()
            .with_func("host", "log", Signature::new([ValKind::I32], None))
            .with_global("host", "limit", ValKind::I64, false)
            .with_table("host", "table");

        assert_eq!(env.len(), 3);
        assert_eq!(
            env.lookup("host", "log"),
            Some(CapabilityKind::Func(Signature::new([ValKind::I32], None)))
        );
        assert_eq!(
            env.lookup("host", "limit"),
            Some(CapabilityKind::Global {
                content: ValKind::I64,
                mutable: false,
            })
        );
        assert_eq!(env.lookup("host", "table"), Some(CapabilityKind::Table));
    }

    #[test]
    fn lookup_is_keyed_by_module_and_item() {
        let env = HostEnvironment::new().with_memory("host", "memory");
        assert_eq!(env.lookup("host", "memory"), Some(CapabilityKind::Memory));
        assert_eq!(env.lookup("other", "memory"), None);
    }

    #[test]
    fn later_provision_replaces_earlier() {
        let env = HostEnvironment::new()
            .with_memory("host", "slot")
            .with_table("host", "slot");
        assert_eq!(env.len(), 1);
        assert_eq!(env.lookup("host", "slot"), Some(CapabilityKind::Table));
    }

    #[test]
    fn debug_lists_items() {
        let env = HostEnvironment::new().with_memory("host", "memory");
        assert!(format!("{:?}", env).contains("memory"));
    }
}
