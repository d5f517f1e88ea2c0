//! The contract-satisfying units of one archive.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::resolved::ResolvedType;

/// The resolved types of one archive that satisfy the module contract.
///
/// Computed once when the loader is constructed and never changed
/// afterwards. Iteration is ordered by qualified name.
#[derive(Debug, Clone, Default)]
pub struct ModuleSet {
    modules: BTreeMap<String, Arc<ResolvedType>>,
}

impl ModuleSet {
    pub(crate) fn insert(&mut self, ty: Arc<ResolvedType>) {
        self.modules.insert(ty.name().to_string(), ty);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Whether a module with this qualified name is in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// The module with this qualified name.
    pub fn get(&self, name: &str) -> Option<&Arc<ResolvedType>> {
        self.modules.get(name)
    }

    /// Qualified names of all modules.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResolvedType>> {
        self.modules.values()
    }
}

impl<'a> IntoIterator for &'a ModuleSet {
    type Item = &'a Arc<ResolvedType>;
    type IntoIter = std::collections::btree_map::Values<'a, String, Arc<ResolvedType>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.values()
    }
}
