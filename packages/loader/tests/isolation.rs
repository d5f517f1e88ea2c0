mod common;

use std::sync::Arc;
use std::thread;

use modpack_loader::{DependencyIssue, ModuleLoader, ResolutionFailure};

use common::{handler_contract, host, write_archive, HELPER, IMPL};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn loader_is_send_and_sync() {
    assert_send_sync::<ModuleLoader>();
}

#[test]
fn same_name_in_two_archives_resolves_separately() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_archive(
        dir.path(),
        "first.zip",
        &[("foo/Impl.wasm", IMPL.as_bytes())],
    );
    let second = write_archive(
        dir.path(),
        "second.zip",
        &[("foo/Impl.wasm", IMPL.as_bytes())],
    );
    let env = host();
    let contract = handler_contract();

    let a = ModuleLoader::open(&first, contract.clone(), env.clone()).unwrap();
    let b = ModuleLoader::open(&second, contract, env).unwrap();

    let from_a = a.resolve("foo.Impl").unwrap();
    let from_b = b.resolve("foo.Impl").unwrap();
    assert!(!Arc::ptr_eq(&from_a, &from_b));
    assert_ne!(a.namespace(), b.namespace());
    assert_eq!(from_a.namespace(), a.namespace());
    assert_eq!(from_b.namespace(), b.namespace());
    assert_eq!(from_a.name(), from_b.name());
}

#[test]
fn names_from_another_archive_are_never_visible() {
    let importer = r#"(module
        (import "foo.Helper" "assist" (func (result i32)))
        (func (export "handle") (param i32) (result i32) local.get 0))"#;

    let dir = tempfile::tempdir().unwrap();
    let provider = write_archive(
        dir.path(),
        "provider.zip",
        &[
            ("foo/Impl.wasm", IMPL.as_bytes()),
            ("foo/Helper.wasm", HELPER.as_bytes()),
        ],
    );
    let consumer = write_archive(
        dir.path(),
        "consumer.zip",
        &[
            ("foo/Impl.wasm", IMPL.as_bytes()),
            ("foo/Importer.wasm", importer.as_bytes()),
        ],
    );
    let env = host();
    let contract = handler_contract();

    let provider = ModuleLoader::open(&provider, contract.clone(), env.clone()).unwrap();
    let consumer = ModuleLoader::open(&consumer, contract, env).unwrap();

    assert!(provider.resolve("foo.Helper").is_some());
    assert!(consumer.resolve("foo.Helper").is_none());
    assert!(consumer.resolve("foo.Importer").is_none());
    assert!(!consumer.modules().contains("foo.Importer"));
    assert!(matches!(
        &consumer.failures()[0],
        ResolutionFailure::UnresolvedDependency {
            module,
            issue: DependencyIssue::Missing,
            ..
        } if module == "foo.Helper"
    ));
}

#[test]
fn loaders_build_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..4)
        .map(|i| {
            write_archive(
                dir.path(),
                &format!("pkg{}.zip", i),
                &[
                    ("foo/Impl.wasm", IMPL.as_bytes()),
                    ("foo/Helper.wasm", HELPER.as_bytes()),
                ],
            )
        })
        .collect();
    let env = host();
    let contract = handler_contract();

    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let env = env.clone();
            let contract = contract.clone();
            thread::spawn(move || ModuleLoader::open(path, contract, env).unwrap())
        })
        .collect();
    let loaders: Vec<ModuleLoader> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (i, loader) in loaders.iter().enumerate() {
        assert_eq!(loader.modules().len(), 1);
        for other in &loaders[i + 1..] {
            assert_ne!(loader.namespace(), other.namespace());
        }
    }
}

#[test]
fn modules_readable_from_other_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(
        dir.path(),
        "shared.zip",
        &[("foo/Impl.wasm", IMPL.as_bytes())],
    );
    let loader = Arc::new(ModuleLoader::open(&path, handler_contract(), host()).unwrap());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let loader = loader.clone();
            thread::spawn(move || {
                loader
                    .modules()
                    .names()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for reader in readers {
        assert_eq!(reader.join().unwrap(), vec!["foo.Impl".to_string()]);
    }
}

#[test]
fn resolve_from_many_threads_yields_one_type_per_name() {
    let consumer = |export: &str| {
        format!(
            r#"(module
                (import "foo.Helper" "assist" (func (result i32)))
                (func (export "{}")))"#,
            export
        )
    };
    let left = consumer("left");
    let right = consumer("right");

    let dir = tempfile::tempdir().unwrap();
    let path = write_archive(
        dir.path(),
        "shared_dependency.zip",
        &[
            ("foo/Impl.wasm", IMPL.as_bytes()),
            ("foo/Helper.wasm", HELPER.as_bytes()),
            ("foo/Left.wasm", left.as_bytes()),
            ("foo/Right.wasm", right.as_bytes()),
        ],
    );
    let loader = Arc::new(ModuleLoader::open(&path, handler_contract(), host()).unwrap());
    let names = ["foo.Impl", "foo.Helper", "foo.Left", "foo.Right"];

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let loader = loader.clone();
            thread::spawn(move || {
                names
                    .iter()
                    .map(|name| loader.resolve(name).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for resolved in &results {
        for (ty, name) in resolved.iter().zip(names) {
            assert!(Arc::ptr_eq(ty, &loader.resolve(name).unwrap()));
        }
    }

    let helper = loader.resolve("foo.Helper").unwrap();
    for name in ["foo.Left", "foo.Right"] {
        let ty = loader.resolve(name).unwrap();
        assert!(Arc::ptr_eq(&ty.dependencies()[0], &helper));
    }
    assert!(loader.failures().is_empty());
}
