//! Resolved units and the namespaces that own them.

use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;
use wasmtime::Module;

use crate::capability::{Capability, CapabilityKind, ModuleContract};

/// Identifies the namespace of one loaded archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespaceId(Uuid);

impl NamespaceId {
    /// Create a new random NamespaceId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NamespaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit compiled within one namespace.
///
/// A resolved type is created at most once per qualified name in a
/// namespace and always handed out behind an `Arc`, so identity is
/// pointer identity. Two archives defining the same qualified name
/// produce distinct resolved types with different [`NamespaceId`]s.
pub struct ResolvedType {
    name: String,
    namespace: NamespaceId,
    module: Module,
    capabilities: BTreeSet<Capability>,
    dependencies: Vec<Arc<ResolvedType>>,
}

impl ResolvedType {
    pub(crate) fn new(
        name: String,
        namespace: NamespaceId,
        module: Module,
        capabilities: BTreeSet<Capability>,
        dependencies: Vec<Arc<ResolvedType>>,
    ) -> Self {
        Self {
            name,
            namespace,
            module,
            capabilities,
            dependencies,
        }
    }

    /// Qualified name within the owning namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace that defined this type.
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    /// The compiled module, ready for the host to instantiate.
    pub fn module(&self) -> &Module {
        &self.module
    }

    /// The typed exports of this unit.
    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    /// The kind of the export named `item`, if this unit exports it.
    pub fn capability(&self, item: &str) -> Option<&CapabilityKind> {
        self.capabilities
            .iter()
            .find(|c| c.name == item)
            .map(|c| &c.kind)
    }

    /// Units from the same namespace whose exports this unit imports.
    pub fn dependencies(&self) -> &[Arc<ResolvedType>] {
        &self.dependencies
    }

    /// Whether this unit satisfies `contract`.
    pub fn satisfies(&self, contract: &ModuleContract) -> bool {
        contract.is_satisfied_by(&self.capabilities)
    }
}

// Long import chains would otherwise drop one nested frame per link.
impl Drop for ResolvedType {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.dependencies);
        while let Some(dependency) = pending.pop() {
            if let Some(mut ty) = Arc::into_inner(dependency) {
                pending.append(&mut ty.dependencies);
            }
        }
    }
}

impl std::fmt::Debug for ResolvedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedType")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("capabilities", &self.capabilities)
            .field(
                "dependencies",
                &self.dependencies.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{capabilities_of, Signature, ValKind};

    const HANDLER: &str =
        r#"(module (func (export "handle") (param i32) (result i32) local.get 0))"#;

    fn resolved(name: &str, wat: &str) -> ResolvedType {
        let engine = wasmtime::Engine::default();
        let module = Module::new(&engine, wat).unwrap();
        let caps = capabilities_of(&module);
        ResolvedType::new(name.to_string(), NamespaceId::new(), module, caps, vec![])
    }

    #[test]
    fn namespace_ids_are_unique() {
        assert_ne!(NamespaceId::new(), NamespaceId::new());
    }

    #[test]
    fn namespace_id_display() {
        let id = NamespaceId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn capability_lookup_by_name() {
        let ty = resolved("foo.Impl", HANDLER);

        assert_eq!(
            ty.capability("handle"),
            Some(&CapabilityKind::Func(Signature::new(
                [ValKind::I32],
                [ValKind::I32]
            )))
        );
        assert_eq!(ty.capability("missing"), None);
        assert!(ty.dependencies().is_empty());
    }

    #[test]
    fn satisfies_contract() {
        let ty = resolved("foo.Impl", HANDLER);

        let handler = ModuleContract::new("handler")
            .with_func("handle", Signature::new([ValKind::I32], [ValKind::I32]));
        let other = ModuleContract::new("other").with_func("run", Signature::default());
        assert!(ty.satisfies(&handler));
        assert!(!ty.satisfies(&other));
    }

    #[test]
    fn long_dependency_chain_drops() {
        let engine = wasmtime::Engine::default();
        let module = Module::new(&engine, "(module)").unwrap();
        let namespace = NamespaceId::new();

        let mut head: Option<Arc<ResolvedType>> = None;
        for i in 0..100_000 {
            let dependencies = head.take().into_iter().collect();
            head = Some(Arc::new(ResolvedType::new(
                format!("c.U{}", i),
                namespace,
                module.clone(),
                BTreeSet::new(),
                dependencies,
            )));
        }
        let head = head.unwrap();
        assert_eq!(head.dependencies()[0].name(), "c.U99998");
        drop(head);
    }

    #[test]
    fn debug_shows_name() {
        let ty = resolved("foo.Empty", "(module)");
        assert!(format!("{:?}", ty).contains("foo.Empty"));
    }
}
