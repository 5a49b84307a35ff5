//! End-to-end generation with the real renderer and built-in units.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use kiln_adapters::{LocalFilesystem, MemoryFilesystem, MiniJinjaRenderer, units};
use kiln_core::prelude::*;
use kiln_core::application::Blueprint;
use kiln_core::domain::DomainError;
use tempfile::TempDir;
use walkdir::WalkDir;

fn record() -> ConfigRecord {
    ConfigRecord::builder()
        .app_name("shop")
        .module_path("example.com/shop")
        .description("<script>alert(1)</script> & friends")
        .author("Ada")
        .database(Database::Postgres)
        .ui(UiFramework::Htmx)
        .docker(true)
        .events(true)
        .fingerprint("kiln-test")
        .year(2026)
        .timestamp("20260102030405")
        .build()
        .unwrap()
}

fn manager(base: &Path, record: ConfigRecord, fs: Arc<dyn Filesystem>) -> PluginManager {
    let record = Arc::new(record);
    let materializer = FileMaterializer::new(base, &record, fs);
    let mut manager = PluginManager::new(
        Arc::clone(&record),
        Box::new(MiniJinjaRenderer::new()),
        materializer,
    );
    manager.register_all(units::select(&record)).unwrap();
    manager
}

fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap();
            let rel = rel.to_string_lossy().replace('\\', "/");
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}

fn import_block(source: &str) -> Option<Vec<&str>> {
    let mut lines = source.lines().skip_while(|l| l.trim() != "import (");
    lines.next()?;
    Some(lines.take_while(|l| !l.trim_start().starts_with(')')).collect())
}

#[test]
fn generates_a_complete_project_on_disk() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(temp.path(), record(), Arc::new(LocalFilesystem::new()));

    let report = manager.run().unwrap();
    assert_eq!(manager.phase(), Phase::ShutDown);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let root = temp.path().join("shop");
    assert_eq!(report.root, root);
    for path in [
        "go.mod",
        "cmd/server/main.go",
        "internal/config/config.go",
        "internal/database/database.go",
        "migrations/20260102030405_init.up.sql",
        "internal/server/routes.go",
        "internal/middleware/middleware.go",
        "internal/events/bus.go",
        "web/templates/index.html",
        "Dockerfile",
    ] {
        assert!(root.join(path).is_file(), "missing {path}");
    }

    let files = snapshot(&root);
    assert_eq!(files.len(), report.files.len());
}

#[test]
fn regeneration_is_byte_identical() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("shop");

    manager(temp.path(), record(), Arc::new(LocalFilesystem::new()))
        .run()
        .unwrap();
    let first = snapshot(&root);

    manager(temp.path(), record(), Arc::new(LocalFilesystem::new()))
        .run()
        .unwrap();
    let second = snapshot(&root);

    assert_eq!(first, second);
}

#[test]
fn markup_is_escaped_and_plain_text_is_not() {
    let temp = TempDir::new().unwrap();
    manager(temp.path(), record(), Arc::new(LocalFilesystem::new()))
        .run()
        .unwrap();
    let root = temp.path().join("shop");

    let index = fs::read_to_string(root.join("web/templates/index.html")).unwrap();
    assert!(index.contains("&lt;script&gt;alert(1)"));
    assert!(index.contains("&amp; friends"));
    assert!(!index.contains("<script>alert"));
    // Go template actions survive untouched.
    assert!(index.contains(r#"{{ define "content" }}"#));

    let readme = fs::read_to_string(root.join("README.md")).unwrap();
    assert!(readme.contains("<script>alert(1)</script> & friends"));
}

#[test]
fn go_imports_are_sorted_on_disk() {
    let temp = TempDir::new().unwrap();
    let report = manager(temp.path(), record(), Arc::new(LocalFilesystem::new()))
        .run()
        .unwrap();

    let mut checked = 0;
    for file in report.files.iter().filter(|f| f.path.as_str().ends_with(".go")) {
        let source = fs::read_to_string(report.root.join(file.path.as_str())).unwrap();
        if let Some(entries) = import_block(&source) {
            let mut sorted = entries.clone();
            sorted.sort_unstable();
            assert_eq!(entries, sorted, "unsorted imports in {}", file.path);
            assert!(entries.iter().all(|e| e.starts_with('\t') && !e.trim().is_empty()));
            checked += 1;
        }
    }
    assert!(checked > 5);
}

#[test]
fn builtin_units_never_claim_the_same_path() {
    let fs = MemoryFilesystem::new();
    let mut manager = manager(Path::new("/out"), record(), Arc::new(fs.clone()));

    let plan = manager.plan().unwrap();
    let mut seen = HashSet::new();
    for unit in &plan {
        for path in &unit.files {
            assert!(seen.insert(path.clone()), "{path} claimed twice (by {})", unit.name);
        }
    }
    assert!(fs.list_files().is_empty(), "plan must not write");
}

#[test]
fn every_option_combination_renders() {
    for backend in Backend::ALL {
        for database in Database::ALL {
            for ui in UiFramework::ALL {
                let record = ConfigRecord::builder()
                    .app_name("combo")
                    .backend(backend)
                    .database(database)
                    .ui(ui)
                    .docker(true)
                    .events(true)
                    .build()
                    .unwrap();
                let fs = MemoryFilesystem::new();
                let report = manager(Path::new("/out"), record, Arc::new(fs.clone()))
                    .run()
                    .unwrap_or_else(|e| panic!("{backend}/{database}/{ui}: {e}"));

                assert!(report.warnings.is_empty(), "{backend}/{database}/{ui}");
                let routes = fs.contents("/out/combo/internal/server/routes.go").unwrap();
                assert!(routes.contains("func (s *Server) routes("));
            }
        }
    }
}

#[test]
fn framework_choice_reaches_go_mod() {
    let record = ConfigRecord::builder()
        .app_name("api")
        .backend(Backend::Gin)
        .database(Database::Sqlite)
        .build()
        .unwrap();
    let fs = MemoryFilesystem::new();
    manager(Path::new("/out"), record, Arc::new(fs.clone()))
        .run()
        .unwrap();

    let go_mod = fs.contents("/out/api/go.mod").unwrap();
    assert!(go_mod.contains("github.com/gin-gonic/gin"));
    assert!(go_mod.contains("modernc.org/sqlite"));
    assert!(!go_mod.contains("chi"));
}

fn broken_blueprint(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("internal/broken/broken.go", || "package broken\n\nvar x = {{ no_such_field }}\n")
}

#[test]
fn a_failing_unit_keeps_earlier_output() {
    let temp = TempDir::new().unwrap();
    let mut manager = manager(temp.path(), record(), Arc::new(LocalFilesystem::new()));
    let broken = TemplateUnit::builder("broken", broken_blueprint)
        .depends_on(["docker", "ui", "events", "middleware", "database"])
        .build(Arc::new(record()));
    manager.register(Box::new(broken)).unwrap();

    let err = manager.run().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("broken"), "{message}");
    assert!(message.contains("internal/broken/broken.go"), "{message}");
    assert_eq!(manager.phase(), Phase::ShutDown);

    let root = temp.path().join("shop");
    assert!(root.join("go.mod").is_file());
    assert!(root.join("Dockerfile").is_file());
    assert!(!root.join("internal/broken/broken.go").exists());
}

fn step_one(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("steps/one.txt", || "one: {{ app_name }}\n")
}

fn step_two(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("steps/two.txt", || "two: {{ port }}\n")
}

fn step_three(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("steps/three.txt", || "three: {{ no_such_field }}\n")
}

fn step_four(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("steps/four.txt", || "four\n")
}

fn step_five(_: &ConfigRecord, files: &mut FileSet) -> Result<(), DomainError> {
    files.add("steps/five.txt", || "five\n")
}

#[test]
fn failure_in_the_middle_of_a_chain_keeps_only_earlier_files() {
    let record = Arc::new(record());
    let fs = MemoryFilesystem::new();
    let materializer = FileMaterializer::new("/out", &record, Arc::new(fs.clone()));
    let mut manager = PluginManager::new(
        Arc::clone(&record),
        Box::new(MiniJinjaRenderer::new()),
        materializer,
    );

    let chain: [(&str, Option<&str>, Blueprint); 5] = [
        ("u1", None, step_one),
        ("u2", Some("u1"), step_two),
        ("u3", Some("u2"), step_three),
        ("u4", Some("u3"), step_four),
        ("u5", Some("u4"), step_five),
    ];
    // Registered in reverse so only the dependencies dictate the order.
    for (name, dependency, blueprint) in chain.into_iter().rev() {
        let unit = TemplateUnit::builder(name, blueprint)
            .depends_on(dependency)
            .build(Arc::clone(&record));
        manager.register(Box::new(unit)).unwrap();
    }

    let message = manager.run().unwrap_err().to_string();
    assert!(message.contains("u3"), "{message}");
    assert!(message.contains("steps/three.txt"), "{message}");
    assert_eq!(manager.phase(), Phase::ShutDown);

    assert_eq!(fs.contents("/out/shop/steps/one.txt").as_deref(), Some("one: shop\n"));
    assert_eq!(fs.contents("/out/shop/steps/two.txt").as_deref(), Some("two: 8080\n"));
    for missing in ["three", "four", "five"] {
        assert!(
            fs.contents(format!("/out/shop/steps/{missing}.txt")).is_none(),
            "{missing}.txt was written"
        );
    }
}
