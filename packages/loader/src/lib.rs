//! Isolated loading of WebAssembly module packages.
//!
//! A module package is a zip archive of WebAssembly units. The loader
//! reads one package, compiles every unit in a namespace private to that
//! package, and picks out the units that satisfy a host-defined
//! [`ModuleContract`].
//!
//! ## Resolution
//!
//! Each unit is compiled with the engine of the shared
//! [`ParentEnvironment`], then its imports are checked:
//!
//! - An import whose module name is the qualified name of another unit in
//!   the same package is satisfied by that unit's export, resolving it
//!   first if needed.
//! - Any other import is looked up in the parent environment.
//!
//! A unit that fails to compile or whose imports cannot be satisfied is
//! recorded as a [`ResolutionFailure`] and skipped; the rest of the
//! package still loads.
//!
//! ## Classification
//!
//! Every resolved unit carries the set of its typed exports. A unit is a
//! module when that set contains everything the contract requires. A
//! package without a single module is rejected with
//! [`InvalidModuleError::NoModuleFound`].
//!
//! ## Isolation
//!
//! Nothing is shared between loaders except the read-only parent
//! environment and contract. Two packages may both contain `foo.Impl`;
//! each loader resolves its own, and the two [`ResolvedType`]s carry
//! different [`NamespaceId`]s.
//!
//! ```text
//!             ┌─────────────────────────┐
//!             │    ParentEnvironment    │   engine + host items
//!             └────────────▲────────────┘
//!                   ┌──────┴───────┐
//!      ┌────────────┴──┐       ┌───┴───────────┐
//!      │ ModuleLoader  │       │ ModuleLoader  │
//!      │  a.zip        │       │  b.zip        │
//!      │   foo.Impl    │       │   foo.Impl    │
//!      │   foo.Helper  │       │   bar.Other   │
//!      └───────────────┘       └───────────────┘
//! ```

mod capability;
mod config;
mod environment;
mod error;
mod loader;
mod module_set;
mod namespace;
mod resolved;

pub use capability::{Capability, CapabilityKind, ModuleContract, Signature, ValKind};
pub use config::LoaderConfig;
pub use environment::{HostEnvironment, ParentEnvironment};
pub use error::{DependencyIssue, InvalidModuleError, ResolutionFailure, Result};
pub use loader::ModuleLoader;
pub use module_set::ModuleSet;
pub use resolved::{NamespaceId, ResolvedType};

pub use modpack_archive::{ArchiveConfig, ArchiveError};
