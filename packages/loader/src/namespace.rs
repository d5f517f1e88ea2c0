//! Per-archive namespace and the resolve-once algorithm.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use bytes::Bytes;
use modpack_archive::RawEntry;
use tracing::{debug, warn};
use wasmtime::{ImportType, Module};

use crate::capability::{capabilities_of, CapabilityKind};
use crate::environment::ParentEnvironment;
use crate::error::{DependencyIssue, ResolutionFailure};
use crate::resolved::{NamespaceId, ResolvedType};

/// One archive's raw entries plus the caches of what they resolved to.
///
/// The raw entry table is fixed at construction. Both caches only ever
/// grow, and every qualified name maps to at most one resolved type.
pub(crate) struct Namespace {
    id: NamespaceId,
    parent: Arc<dyn ParentEnvironment>,
    entries: BTreeMap<String, Bytes>,
    resolved: RwLock<BTreeMap<String, Arc<ResolvedType>>>,
    failures: RwLock<BTreeMap<String, ResolutionFailure>>,
}

/// A compiled unit on the walk stack, with the sibling entries it still
/// has to visit.
struct Visit {
    name: String,
    module: Module,
    siblings: std::vec::IntoIter<String>,
}

impl Namespace {
    /// Build a namespace over `raw`, whose qualified names are unique
    /// (the archive reader already drops duplicates).
    pub(crate) fn new(
        parent: Arc<dyn ParentEnvironment>,
        raw: impl IntoIterator<Item = RawEntry>,
    ) -> Self {
        Self {
            id: NamespaceId::new(),
            parent,
            entries: raw
                .into_iter()
                .map(|entry| (entry.name, entry.bytecode))
                .collect(),
            resolved: RwLock::new(BTreeMap::new()),
            failures: RwLock::new(BTreeMap::new()),
        }
    }

    pub(crate) fn id(&self) -> NamespaceId {
        self.id
    }

    pub(crate) fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn failures(&self) -> Vec<ResolutionFailure> {
        self.failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Resolve `name` if this namespace holds an entry for it.
    ///
    /// Returns `None` both for names outside this namespace and for
    /// entries that failed to resolve.
    ///
    /// Every unsettled sibling reachable from `name` is compiled first,
    /// then defined dependencies first, so import chains of any length
    /// resolve without recursion.
    pub(crate) fn resolve(&self, name: &str) -> Option<Arc<ResolvedType>> {
        if !self.entries.contains_key(name) {
            return None;
        }
        if let Some(ty) = self.cached(name) {
            return Some(ty);
        }
        for (entry, module) in self.compile_reachable(name) {
            let outcome = self.define(&entry, module);
            self.settle(&entry, outcome);
        }
        self.cached(name)
    }

    fn cached(&self, name: &str) -> Option<Arc<ResolvedType>> {
        self.resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn has_failed(&self, name: &str) -> bool {
        self.failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    // Entries and the parent are immutable, so a failure is final.
    fn is_settled(&self, name: &str) -> bool {
        self.cached(name).is_some() || self.has_failed(name)
    }

    /// Compile `root` and every unsettled sibling it imports, directly or
    /// transitively, and return them in post-order: each unit comes after
    /// everything it imports, except along a cycle.
    fn compile_reachable(&self, root: &str) -> Vec<(String, Module)> {
        let mut order = Vec::new();
        let mut seen = BTreeSet::from([root.to_string()]);
        let mut stack: Vec<Visit> = self.visit(root).into_iter().collect();

        while let Some(mut visit) = stack.pop() {
            match visit.siblings.next() {
                Some(sibling) => {
                    stack.push(visit);
                    if seen.insert(sibling.clone()) {
                        stack.extend(self.visit(&sibling));
                    }
                }
                None => order.push((visit.name, visit.module)),
            }
        }
        order
    }

    /// Compile an unsettled entry for the walk. A compile failure is
    /// settled on the spot.
    fn visit(&self, name: &str) -> Option<Visit> {
        if self.is_settled(name) {
            return None;
        }
        let bytecode = self.entries.get(name)?;

        match Module::new(self.parent.engine(), bytecode) {
            Ok(module) => {
                let siblings: Vec<String> = module
                    .imports()
                    .map(|import| import.module())
                    .filter(|provider| self.entries.contains_key(*provider))
                    .map(str::to_string)
                    .collect();
                Some(Visit {
                    name: name.to_string(),
                    module,
                    siblings: siblings.into_iter(),
                })
            }
            Err(e) => {
                self.settle(
                    name,
                    Err(ResolutionFailure::Malformed {
                        name: name.to_string(),
                        reason: format!("{:#}", e),
                    }),
                );
                None
            }
        }
    }

    /// Satisfy each import of a compiled unit.
    ///
    /// Sibling providers are already settled unless they sit on a cycle
    /// through this unit, so an unsettled sibling is a circular import.
    fn define(&self, name: &str, module: Module) -> Result<ResolvedType, ResolutionFailure> {
        let mut dependencies: Vec<Arc<ResolvedType>> = Vec::new();
        for import in module.imports() {
            let expected = CapabilityKind::from(&import.ty());
            let fail = |issue| unresolved(name, &import, issue);

            let found = if self.entries.contains_key(import.module()) {
                let Some(provider) = self.cached(import.module()) else {
                    return Err(if self.has_failed(import.module()) {
                        fail(DependencyIssue::DependencyFailed)
                    } else {
                        fail(DependencyIssue::Circular)
                    });
                };
                let found = provider.capability(import.name()).cloned();
                if !dependencies.iter().any(|d| Arc::ptr_eq(d, &provider)) {
                    dependencies.push(provider);
                }
                found
            } else {
                self.parent.lookup(import.module(), import.name())
            };

            match found {
                None => return Err(fail(DependencyIssue::Missing)),
                Some(found) if found != expected => {
                    return Err(fail(DependencyIssue::TypeMismatch { expected, found }));
                }
                Some(_) => {}
            }
        }

        let capabilities = capabilities_of(&module);
        Ok(ResolvedType::new(
            name.to_string(),
            self.id,
            module,
            capabilities,
            dependencies,
        ))
    }

    /// Record the outcome for `name`. The first outcome recorded wins.
    fn settle(&self, name: &str, outcome: Result<ResolvedType, ResolutionFailure>) {
        match outcome {
            Ok(ty) => {
                self.resolved
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(ty));
                debug!(namespace = %self.id, entry = name, "resolved entry");
            }
            Err(failure) => {
                warn!(
                    namespace = %self.id,
                    entry = name,
                    error = %failure,
                    "entry failed to resolve"
                );
                self.failures
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(name.to_string())
                    .or_insert(failure);
            }
        }
    }
}

fn unresolved(name: &str, import: &ImportType<'_>, issue: DependencyIssue) -> ResolutionFailure {
    ResolutionFailure::UnresolvedDependency {
        name: name.to_string(),
        module: import.module().to_string(),
        item: import.name().to_string(),
        issue,
    }
}
