//! Capability descriptors and module contracts.
//!
//! A resolved unit is described by the typed items it exports. A
//! [`ModuleContract`] names the exports a unit must provide to count as a
//! module; satisfying it is a plain set-inclusion test.

use std::collections::BTreeSet;
use std::fmt;

use wasmtime::{ExternType, Module, Mutability, ValType};

/// The value types a capability signature can mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValKind {
    I32,
    I64,
    F32,
    F64,
    V128,
    FuncRef,
    ExternRef,
    AnyRef,
    /// Any other reference type, e.g. non-nullable or concrete references.
    Ref,
}

impl From<&ValType> for ValKind {
    fn from(ty: &ValType) -> Self {
        match ty {
            ValType::I32 => ValKind::I32,
            ValType::I64 => ValKind::I64,
            ValType::F32 => ValKind::F32,
            ValType::F64 => ValKind::F64,
            ValType::V128 => ValKind::V128,
            ty if ty.is_funcref() => ValKind::FuncRef,
            ty if ty.is_externref() => ValKind::ExternRef,
            ty if ty.is_anyref() => ValKind::AnyRef,
            ValType::Ref(_) => ValKind::Ref,
        }
    }
}

impl fmt::Display for ValKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValKind::I32 => "i32",
            ValKind::I64 => "i64",
            ValKind::F32 => "f32",
            ValKind::F64 => "f64",
            ValKind::V128 => "v128",
            ValKind::FuncRef => "funcref",
            ValKind::ExternRef => "externref",
            ValKind::AnyRef => "anyref",
            ValKind::Ref => "ref",
        };
        f.write_str(name)
    }
}

/// A function signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub params: Vec<ValKind>,
    pub results: Vec<ValKind>,
}

impl Signature {
    /// Create a signature from parameter and result types.
    pub fn new(
        params: impl IntoIterator<Item = ValKind>,
        results: impl IntoIterator<Item = ValKind>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, kinds: &[ValKind]) -> fmt::Result {
            f.write_str("(")?;
            for (i, kind) in kinds.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", kind)?;
            }
            f.write_str(")")
        }
        list(f, &self.params)?;
        f.write_str(" -> ")?;
        list(f, &self.results)
    }
}

/// What kind of item a capability is, with enough type information to
/// check that an import and an export agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    Func(Signature),
    Global { content: ValKind, mutable: bool },
    Memory,
    Table,
    /// Item kinds with no structural description here (e.g. tags).
    Other,
}

impl From<&ExternType> for CapabilityKind {
    fn from(ty: &ExternType) -> Self {
        match ty {
            ExternType::Func(func) => CapabilityKind::Func(Signature {
                params: func.params().map(|p| ValKind::from(&p)).collect(),
                results: func.results().map(|r| ValKind::from(&r)).collect(),
            }),
            ExternType::Global(global) => CapabilityKind::Global {
                content: ValKind::from(global.content()),
                mutable: global.mutability() == Mutability::Var,
            },
            ExternType::Memory(_) => CapabilityKind::Memory,
            ExternType::Table(_) => CapabilityKind::Table,
            #[allow(unreachable_patterns)]
            _ => CapabilityKind::Other,
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Func(sig) => write!(f, "func {}", sig),
            CapabilityKind::Global { content, mutable } => {
                if *mutable {
                    write!(f, "global mut {}", content)
                } else {
                    write!(f, "global {}", content)
                }
            }
            CapabilityKind::Memory => f.write_str("memory"),
            CapabilityKind::Table => f.write_str("table"),
            CapabilityKind::Other => f.write_str("other"),
        }
    }
}

/// A named, typed export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability {
    pub name: String,
    pub kind: CapabilityKind,
}

impl Capability {
    pub fn new(name: impl Into<String>, kind: CapabilityKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A function export.
    pub fn func(name: impl Into<String>, signature: Signature) -> Self {
        Self::new(name, CapabilityKind::Func(signature))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.kind)
    }
}

/// The export set of a compiled module.
pub(crate) fn capabilities_of(module: &Module) -> BTreeSet<Capability> {
    module
        .exports()
        .map(|export| Capability::new(export.name(), CapabilityKind::from(&export.ty())))
        .collect()
}

/// The capability interface a unit must provide to be a usable module.
///
/// A contract is built once by the host and shared by every loader, so
/// all archives are classified against the same definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleContract {
    name: String,
    required: BTreeSet<Capability>,
}

impl ModuleContract {
    /// Create an empty contract. An empty contract is satisfied by every
    /// resolved unit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: BTreeSet::new(),
        }
    }

    /// Require a capability.
    pub fn with(mut self, capability: Capability) -> Self {
        self.required.insert(capability);
        self
    }

    /// Require a function export with the given signature.
    pub fn with_func(self, name: impl Into<String>, signature: Signature) -> Self {
        self.with(Capability::func(name, signature))
    }

    /// The contract's name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capabilities a module must export.
    pub fn required(&self) -> &BTreeSet<Capability> {
        &self.required
    }

    /// Whether `capabilities` provides everything this contract requires.
    pub fn is_satisfied_by(&self, capabilities: &BTreeSet<Capability>) -> bool {
        self.required.is_subset(capabilities)
    }
}
