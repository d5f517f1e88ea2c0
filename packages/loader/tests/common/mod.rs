#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modpack_loader::{HostEnvironment, ModuleContract, Signature, ValKind};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Implements the handler contract.
pub const IMPL: &str = r#"(module
    (func (export "handle") (param i32) (result i32)
        local.get 0
        i32.const 1
        i32.add))"#;

/// Exports something, but not the handler contract.
pub const HELPER: &str = r#"(module
    (func (export "assist") (result i32)
        i32.const 7))"#;

/// A binary header followed by a section that ends early.
pub const TRUNCATED: &[u8] = &[0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, 0x01, 0x05];

pub fn handler_contract() -> Arc<ModuleContract> {
    Arc::new(
        ModuleContract::new("handler")
            .with_func("handle", Signature::new([ValKind::I32], [ValKind::I32])),
    )
}

pub fn host() -> Arc<HostEnvironment> {
    Arc::new(HostEnvironment::new().with_func(
        "host",
        "log",
        Signature::new([ValKind::I32], None),
    ))
}

/// Write a zip archive with the given entries into `dir`.
pub fn write_archive(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    for (entry, content) in files {
        zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
    path
}
