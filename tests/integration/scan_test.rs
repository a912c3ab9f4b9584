//! End-to-end scan tests over jars synthesized into temp directories.

mod fixtures;

use fixtures::{class_with_field_of, op, ClassFileBuilder, INVOKEVIRTUAL, INVOKESTATIC, RETURN};
use jardeps::scan::{CancelToken, DiagnosticKind, ScanOptions};
use jardeps::{Config, QualifiedName, Scanner};
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn name(s: &str) -> QualifiedName {
    QualifiedName::new(s)
}

/// pkg.A extends pkg.B and holds a pkg.C field; pkg.B holds a pkg.A field.
fn mutual_jar(dir: &std::path::Path) -> std::path::PathBuf {
    let mut a = ClassFileBuilder::with_super("pkg/A", "pkg/B");
    a.field("c", "Lpkg/C;");
    let b = class_with_field_of("pkg/B", "pkg/A");
    let c = ClassFileBuilder::new("pkg/C").build();
    fixtures::write_jar(
        dir,
        "app.jar",
        &[
            ("pkg/A.class", a.build()),
            ("pkg/B.class", b),
            ("pkg/C.class", c),
        ],
    )
}

#[test]
fn dependencies_and_mutual_pairs_are_detected() {
    let dir = tempfile::tempdir().unwrap();
    let jar = mutual_jar(dir.path());

    let report = Scanner::new(Config::default()).scan(&jar).unwrap();

    assert_eq!(report.parsed_units, 3);
    assert_eq!(report.universe.len(), 3);

    let deps_of_a = report.graph.dependencies_of(&name("pkg.A"));
    let deps_of_a: Vec<&str> = deps_of_a.iter().map(|n| n.as_str()).collect();
    assert_eq!(deps_of_a, vec!["pkg.B", "pkg.C"]);

    assert_eq!(report.mutual.len(), 1);
    assert_eq!(report.mutual[0].to_string(), "pkg.A <-> pkg.B");
}

#[test]
fn usage_index_with_full_universe_matches_inverse_adjacency() {
    let dir = tempfile::tempdir().unwrap();
    let jar = mutual_jar(dir.path());

    let report = Scanner::new(Config::default()).scan(&jar).unwrap();

    // adjoint property: usage entries with T = universe equal the forward
    // adjacency, and users_of equals the graph's dependents
    assert_eq!(*report.usage.entries(), report.graph.adjacency());
    for unit in &report.universe {
        assert_eq!(
            report.usage.users_of(unit),
            report.graph.dependents_of(unit),
            "users/dependents disagree for {}",
            unit
        );
    }
}

#[test]
fn malformed_unit_among_good_ones_degrades_to_a_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries: Vec<(String, Vec<u8>)> = (0..9)
        .map(|i| {
            let internal = format!("pkg/Good{}", i);
            (
                format!("{}.class", internal),
                ClassFileBuilder::new(&internal).build(),
            )
        })
        .collect();
    entries.push(("pkg/Broken.class".to_string(), vec![0xCA, 0xFE]));

    let borrowed: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.clone()))
        .collect();
    let jar = fixtures::write_jar(dir.path(), "mixed.jar", &borrowed);

    let report = Scanner::new(Config::default()).scan(&jar).unwrap();

    assert_eq!(report.total_entries, 10);
    assert_eq!(report.parsed_units, 9);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::MalformedUnit);
    assert_eq!(report.diagnostics[0].entry, "pkg/Broken.class");
}

#[test]
fn reflection_yields_flags_but_no_static_edges() {
    let dir = tempfile::tempdir().unwrap();

    let mut d = ClassFileBuilder::new("pkg/D");
    let for_name = d.method_ref(
        "java/lang/Class",
        "forName",
        "(Ljava/lang/String;)Ljava/lang/Class;",
    );
    let invoke = d.method_ref(
        "java/lang/reflect/Method",
        "invoke",
        "(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;",
    );
    let mut code = Vec::new();
    code.extend_from_slice(&op(INVOKESTATIC, for_name));
    code.extend_from_slice(&op(INVOKEVIRTUAL, invoke));
    code.push(RETURN);
    d.method_with_code("dynamic", "()V", &code);

    let e = ClassFileBuilder::new("pkg/E").build();
    let jar = fixtures::write_jar(
        dir.path(),
        "reflective.jar",
        &[("pkg/D.class", d.build()), ("pkg/E.class", e)],
    );

    let report = Scanner::new(Config::default()).scan(&jar).unwrap();

    // statically, D references nothing in the universe
    assert!(report.graph.dependencies_of(&name("pkg.D")).is_empty());
    // E has no static users, but the verdict is flagged unsound
    assert!(report.usage.unused_targets().contains("pkg.E"));
    assert!(!report.usage.is_sound());
    assert_eq!(report.reflection.len(), 2);
    assert_eq!(report.reflection[0].unit.as_str(), "pkg.D");
    assert_eq!(report.reflection[0].method, "dynamic");
}

#[test]
fn spring_boot_layout_is_enumerated_with_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let a = class_with_field_of("com/example/A", "com/example/B");
    let b = ClassFileBuilder::new("com/example/B").build();
    let other = ClassFileBuilder::new("org/vendor/Lib").build();
    let jar = fixtures::write_jar(
        dir.path(),
        "boot.jar",
        &[
            ("BOOT-INF/classes/com/example/A.class", a),
            ("BOOT-INF/classes/com/example/B.class", b),
            ("BOOT-INF/classes/org/vendor/Lib.class", other),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        ],
    );

    let config = Config {
        package_prefix: Some("com.example".to_string()),
        ..Config::default()
    };
    let report = Scanner::new(config).scan(&jar).unwrap();

    let universe: Vec<&str> = report.universe.iter().map(|n| n.as_str()).collect();
    assert_eq!(universe, vec!["com.example.A", "com.example.B"]);
    assert!(report
        .graph
        .contains_edge(&name("com.example.A"), &name("com.example.B")));
}

#[test]
fn explicit_targets_restrict_the_usage_index() {
    let dir = tempfile::tempdir().unwrap();
    let jar = mutual_jar(dir.path());

    let options = ScanOptions {
        targets: Some([name("pkg.C")].into_iter().collect::<BTreeSet<_>>()),
        ..ScanOptions::default()
    };
    let report = Scanner::new(Config::default())
        .scan_with(&jar, &options)
        .unwrap();

    // only A touches C; B's reference to A is outside the target set
    assert_eq!(report.usage.entries().len(), 1);
    assert!(report.usage.entries()[&name("pkg.A")].contains("pkg.C"));
    assert!(report.usage.unused_targets().is_empty());
}

#[test]
fn sequential_and_parallel_scans_agree() {
    let dir = tempfile::tempdir().unwrap();
    let jar = mutual_jar(dir.path());
    let scanner = Scanner::new(Config::default());

    let parallel = scanner.scan(&jar).unwrap();
    let sequential = scanner
        .scan_with(
            &jar,
            &ScanOptions {
                sequential: true,
                ..ScanOptions::default()
            },
        )
        .unwrap();

    assert_eq!(parallel.graph.adjacency(), sequential.graph.adjacency());
    assert_eq!(parallel.mutual, sequential.mutual);
    assert_eq!(parallel.usage.entries(), sequential.usage.entries());
    assert_eq!(parallel.diagnostics, sequential.diagnostics);
}

#[test]
fn rescanning_unchanged_bytes_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let jar = mutual_jar(dir.path());
    let scanner = Scanner::new(Config::default());

    let first = scanner.scan(&jar).unwrap();
    let second = scanner.scan(&jar).unwrap();

    assert_eq!(first.universe, second.universe);
    assert_eq!(first.graph.adjacency(), second.graph.adjacency());
    assert_eq!(first.mutual, second.mutual);
    assert_eq!(first.usage.entries(), second.usage.entries());
    assert_eq!(first.usage.unused_targets(), second.usage.unused_targets());
    assert_eq!(first.reflection, second.reflection);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn cancelled_scan_returns_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let jar = mutual_jar(dir.path());

    let flag = Arc::new(AtomicBool::new(true));
    let options = ScanOptions {
        cancel: CancelToken::with_flag(flag),
        ..ScanOptions::default()
    };

    let report = Scanner::new(Config::default())
        .scan_with(&jar, &options)
        .unwrap();

    // nothing parsed, but the scan completed and reported its coverage
    assert_eq!(report.parsed_units, 0);
    assert_eq!(report.total_entries, 3);
    assert!(report.mutual.is_empty());
}

#[test]
fn excluded_entries_are_never_read() {
    let dir = tempfile::tempdir().unwrap();
    let a = ClassFileBuilder::new("pkg/A").build();
    let generated = ClassFileBuilder::new("pkg/generated/Stub").build();
    let jar = fixtures::write_jar(
        dir.path(),
        "excl.jar",
        &[
            ("pkg/A.class", a),
            ("pkg/generated/Stub.class", generated),
        ],
    );

    let config = Config {
        exclude: vec!["generated/".to_string()],
        ..Config::default()
    };
    let report = Scanner::new(config).scan(&jar).unwrap();

    assert_eq!(report.parsed_units, 1);
    assert!(!report.graph.contains(&name("pkg.generated.Stub")));
}
