//! Integration tests for resolving source files to their owning targets

use goto_build_core::{BuildResolver, NotFoundReason, Resolution, ResolverConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn resolver_in(root: &Path) -> BuildResolver {
    BuildResolver::with_config_in(ResolverConfig::default(), root).unwrap()
}

/// `proj/MODULE.bazel` and `proj/pkg/BUILD` with the target on line 3
fn sample_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let proj = temp_dir.path().join("proj");
    let pkg = proj.join("pkg");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(proj.join("MODULE.bazel"), "module(name = \"proj\")\n").unwrap();
    fs::write(
        pkg.join("BUILD"),
        "# Package pkg\n\ntarget(name=\"x\", srcs=[\"main.go\"])\n",
    )
    .unwrap();
    fs::write(pkg.join("main.go"), "package main\n").unwrap();
    temp_dir
}

#[test]
fn test_end_to_end_resolution() {
    let temp_dir = sample_project();
    let pkg = temp_dir.path().join("proj/pkg");
    let mut resolver = resolver_in(&pkg);

    let resolution = resolver.resolve(&pkg.join("main.go")).unwrap();
    let location = resolution.location().expect("main.go should resolve");
    assert_eq!(location.to_string(), format!("{}:3", pkg.join("BUILD").display()));

    let resolution = resolver.resolve(&pkg.join("missing.go")).unwrap();
    assert_eq!(resolution, Resolution::NotFound(NotFoundReason::NoOwningTarget));
}

#[test]
fn test_deeply_nested_source_with_recursive_glob() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("WORKSPACE"), "").unwrap();
    let lib = root.join("services/api");
    let nested = lib.join("handlers/v1/internal");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("users.go"), "").unwrap();
    fs::write(nested.join("users_test.go"), "").unwrap();

    let build_content = r#"
load("@io_bazel_rules_go//go:def.bzl", "go_library", "go_test")

go_library(
    name = "api",
    srcs = glob(
        ["**/*.go"],
        exclude = ["**/*_test.go"],
    ),
    visibility = ["//visibility:public"],
)

go_test(
    name = "api_test",
    srcs = glob(["**/*_test.go"]),
    embed = [":api"],
)
"#;
    fs::write(lib.join("BUILD.bazel"), build_content).unwrap();

    let mut resolver = resolver_in(root);

    let location = resolver.resolve(&nested.join("users.go")).unwrap();
    let location = location.location().unwrap();
    assert_eq!(location.build_file, lib.join("BUILD.bazel"));
    assert_eq!(location.line, 4);
    assert_eq!(location.target.as_deref(), Some("api"));

    let location = resolver.resolve(&nested.join("users_test.go")).unwrap();
    let location = location.location().unwrap();
    assert_eq!(location.line, 13);
    assert_eq!(location.target.as_deref(), Some("api_test"));
}

#[test]
fn test_nested_package_shadows_outer_glob() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("MODULE.bazel"), "").unwrap();
    fs::write(
        root.join("BUILD"),
        "filegroup(\n    name = \"everything\",\n    srcs = glob([\"**/*.txt\"]),\n)\n",
    )
    .unwrap();
    let inner = root.join("inner");
    fs::create_dir(&inner).unwrap();
    fs::write(inner.join("BUILD"), "exports_files([\"notes.txt\"])\n").unwrap();
    fs::write(inner.join("notes.txt"), "").unwrap();
    fs::write(root.join("top.txt"), "").unwrap();

    let mut resolver = resolver_in(root);

    // The nearest BUILD file decides, even though it declares no target for the file
    assert_eq!(
        resolver.resolve(&inner.join("notes.txt")).unwrap(),
        Resolution::NotFound(NotFoundReason::NoOwningTarget)
    );
    assert_eq!(
        resolver
            .resolve(&root.join("top.txt"))
            .unwrap()
            .location()
            .map(|l| l.line),
        Some(1)
    );
}

#[test]
fn test_resolve_all_lists_every_owner_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("MODULE.bazel"), "").unwrap();
    fs::write(root.join("util.cc"), "").unwrap();
    fs::write(
        root.join("BUILD.bazel"),
        r#"cc_library(
    name = "util",
    srcs = ["util.cc"],
)

cc_library(
    name = "util_all",
    srcs = glob(["*.cc"]),
)

cc_test(
    name = "util_test",
    srcs = ["util_test.cc"],
)
"#,
    )
    .unwrap();

    let mut resolver = resolver_in(root);
    let locations = resolver.resolve_all(&root.join("util.cc")).unwrap();
    let summary: Vec<_> = locations
        .iter()
        .map(|l| (l.target.clone().unwrap(), l.line))
        .collect();
    assert_eq!(
        summary,
        vec![("util".to_string(), 1), ("util_all".to_string(), 6)]
    );
}

#[test]
fn test_custom_build_file_names_and_attributes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("MODULE.bazel"), "").unwrap();
    fs::write(
        root.join("BUCK"),
        "\nexport_file(\n    name = \"cfg\",\n    src = \"config.json\",\n)\n",
    )
    .unwrap();

    let config = ResolverConfig::default()
        .with_build_file_names(["BUCK"])
        .with_source_attributes(["src", "srcs"]);
    let mut resolver = BuildResolver::with_config_in(config, root).unwrap();

    let resolution = resolver.resolve(&root.join("config.json")).unwrap();
    assert_eq!(resolution.location().map(|l| l.line), Some(2));
}
