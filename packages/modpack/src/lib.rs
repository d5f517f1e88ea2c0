//! modpack: load WebAssembly module packages into isolated namespaces.
//!
//! A host extends itself by dropping module packages (zip archives of
//! WebAssembly units) next to it. modpack opens each package, resolves its
//! units in a namespace of their own, and hands back the units that satisfy
//! the host's [`ModuleContract`]:
//!
//! - [`archive`] reads packages and extracts their executable entries.
//! - [`ModuleLoader`] resolves and classifies the entries of one package.
//!
//! ```no_run
//! use std::sync::Arc;
//! use modpack::{HostEnvironment, ModuleContract, ModuleLoader, Signature, ValKind};
//!
//! let env = Arc::new(
//!     HostEnvironment::new().with_func("host", "log", Signature::new([ValKind::I32], None)),
//! );
//! let contract = Arc::new(
//!     ModuleContract::new("handler")
//!         .with_func("handle", Signature::new([ValKind::I32], [ValKind::I32])),
//! );
//!
//! for path in ["plugins/a.zip", "plugins/b.zip"] {
//!     match ModuleLoader::open(path, contract.clone(), env.clone()) {
//!         Ok(loader) => println!("{}: {} modules", path, loader.modules().len()),
//!         Err(e) => eprintln!("skipping {}: {}", path, e),
//!     }
//! }
//! ```

pub use modpack_archive as archive;
pub use modpack_loader::*;
