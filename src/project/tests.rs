use super::id::dependency_id;
use super::*;
use crate::core::OdmError;
use crate::test_utils::{ProjectFixture, RegoPackageRewriter};
use std::fs;

const NO_DEPS: &str = "file:/../no-dependencies";

fn fixture(files: &[(&str, &str)]) -> ProjectFixture {
    ProjectFixture::new().unwrap().files(files).unwrap()
}

fn has_error(err: &anyhow::Error, matches: impl Fn(&OdmError) -> bool) -> bool {
    err.chain().filter_map(|cause| cause.downcast_ref::<OdmError>()).any(matches)
}

fn no_dependencies_lib() -> Vec<(&'static str, &'static str)> {
    vec![
        ("no-dependencies/opa.project", "name: no-dependencies\n"),
        ("no-dependencies/policy.rego", "package example\n\nallow := true\n"),
    ]
}

#[test]
fn test_data_locations_default_to_project_dir() {
    let fixture = fixture(&[("project/opa.project", "name: empty\n")]);
    let project_dir = fixture.path("project");

    let mut project = Project::read(&project_dir, false).unwrap();
    project.load().unwrap();

    assert_eq!(project.data_locations().unwrap(), vec![project_dir]);
}

#[test]
fn test_data_locations_drop_missing_source_dirs() {
    let fixture = fixture(&[
        ("project/opa.project", "source:\n- src\n- other\n"),
        ("project/src/main.rego", "package main\n"),
    ]);
    let project_dir = fixture.path("project");

    let project = Project::read(&project_dir, false).unwrap();

    assert_eq!(project.data_locations().unwrap(), vec![project_dir.join("src")]);
}

#[tokio::test]
async fn test_update_namespaces_direct_dependency() {
    let mut files = no_dependencies_lib();
    files.push(("project/opa.project", "dependencies:\n  no_deps: file:/../no-dependencies\n"));
    let fixture = fixture(&files);
    let project_dir = fixture.path("project");

    let rewriter = RegoPackageRewriter::default();
    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();

    let target = dependencies_dir(&project_dir).join(dependency_id("no_deps", NO_DEPS));
    assert_eq!(
        project.dependencies["no_deps"].materialized_path(),
        Some(target.as_path())
    );
    assert_eq!(
        fs::read_to_string(target.join("policy.rego")).unwrap(),
        "package no_deps.example\n\nallow := true\n"
    );
    // the source tree is untouched
    assert_eq!(
        fixture.read("no-dependencies/policy.rego").unwrap(),
        "package example\n\nallow := true\n"
    );

    let calls = rewriter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from, "data");
    assert_eq!(calls[0].to, "data.no_deps");
    assert_eq!(calls[0].dirs, vec![target.join("policy.rego")]);
}

#[tokio::test]
async fn test_update_transitive_dependency() {
    let mut files = no_dependencies_lib();
    files.extend([
        ("project/opa.project", "dependencies:\n  foo: file:/../foo\n"),
        ("foo/opa.project", "name: foo\ndependencies:\n  no_deps: file:/../no-dependencies\n"),
        ("foo/foo.rego", "package foo_lib\n\nimport data.no_deps.example\n"),
    ]);
    let fixture = fixture(&files);
    let project_dir = fixture.path("project");

    let rewriter = RegoPackageRewriter::default();
    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();

    let foo_dir = dependencies_dir(&project_dir).join(dependency_id("foo", "file:/../foo"));
    let inner_dir = dependencies_dir(&foo_dir).join(dependency_id("foo.no_deps", NO_DEPS));

    assert_eq!(
        fs::read_to_string(inner_dir.join("policy.rego")).unwrap(),
        "package foo.no_deps.example\n\nallow := true\n"
    );
    assert_eq!(
        fs::read_to_string(foo_dir.join("foo.rego")).unwrap(),
        "package foo.foo_lib\n\nimport data.foo.no_deps.example\n"
    );

    let inner = &project.dependencies["foo"].project.as_ref().unwrap().dependencies["no_deps"];
    assert_eq!(inner.full_namespace(), "foo.no_deps");
    assert_eq!(inner.ancestry(), ["foo".to_string()]);
    assert_eq!(inner.materialized_path(), Some(inner_dir.as_path()));

    // inner first, then foo's own content without its .opa directory
    let calls = rewriter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].to, "data.foo.no_deps");
    assert_eq!(calls[1].to, "data.foo");
    assert_eq!(calls[1].dirs, vec![foo_dir.join("foo.rego")]);
}

#[tokio::test]
async fn test_update_rewrites_declared_source_and_test_dirs() {
    let fixture = fixture(&[
        ("project/opa.project", "dependencies:\n  acme: file:/../lib\n"),
        ("lib/opa.project", "name: lib\nsource: policy\ntest: tests\n"),
        ("lib/policy/lib.rego", "package lib\n\nallow := true\n"),
        ("lib/tests/lib_test.rego", "package lib_test\n\nimport data.lib\n"),
        ("lib/scripts/helper.rego", "package helper\n"),
    ]);
    let project_dir = fixture.path("project");

    let rewriter = RegoPackageRewriter::default();
    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();

    let target = dependencies_dir(&project_dir).join(dependency_id("acme", "file:/../lib"));
    let calls = rewriter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, "data.acme");
    assert_eq!(calls[0].dirs, vec![target.join("policy"), target.join("tests")]);

    assert_eq!(
        fs::read_to_string(target.join("policy/lib.rego")).unwrap(),
        "package acme.lib\n\nallow := true\n"
    );
    assert_eq!(
        fs::read_to_string(target.join("tests/lib_test.rego")).unwrap(),
        "package acme.lib_test\n\nimport data.acme.lib\n"
    );
    // copied, but outside the declared dirs
    assert_eq!(
        fs::read_to_string(target.join("scripts/helper.rego")).unwrap(),
        "package helper\n"
    );
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let mut files = no_dependencies_lib();
    files.extend([
        ("project/opa.project", "dependencies:\n  foo: file:/../foo\n"),
        ("foo/opa.project", "dependencies:\n  no_deps: file:/../no-dependencies\n"),
        ("foo/foo.rego", "package foo_lib\n"),
    ]);
    let fixture = fixture(&files);
    let project_dir = fixture.path("project");
    let rewriter = RegoPackageRewriter::default();

    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();
    let first = project.data_locations().unwrap();
    let snapshot: Vec<String> =
        first.iter().skip(1).map(|dir| read_rego_files(dir)).collect();

    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();
    let second = project.data_locations().unwrap();
    let again: Vec<String> = second.iter().skip(1).map(|dir| read_rego_files(dir)).collect();

    assert_eq!(first, second);
    assert_eq!(snapshot, again);
    assert!(again.iter().any(|content| content.contains("package foo.no_deps.example")));
    assert!(!again.iter().any(|content| content.contains("foo.foo.")));
}

fn read_rego_files(dir: &Path) -> String {
    let mut content = String::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.unwrap();
        if entry.path().extension().is_some_and(|ext| ext == "rego") {
            content.push_str(&fs::read_to_string(entry.path()).unwrap());
        }
    }
    content
}

#[tokio::test]
async fn test_update_without_namespace_skips_rewrite() {
    let mut files = no_dependencies_lib();
    files.push((
        "project/opa.project",
        "dependencies:\n  no_deps:\n    location: file:/../no-dependencies\n    namespace: false\n",
    ));
    let fixture = fixture(&files);
    let project_dir = fixture.path("project");

    let rewriter = RegoPackageRewriter::default();
    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();

    let target = dependencies_dir(&project_dir).join(dependency_id("", NO_DEPS));
    assert_eq!(
        fs::read_to_string(target.join("policy.rego")).unwrap(),
        "package example\n\nallow := true\n"
    );
    assert!(rewriter.calls().is_empty());
}

#[tokio::test]
async fn test_unnamespaced_parent_resets_chain() {
    let fixture = fixture(&[
        (
            "project/opa.project",
            "dependencies:\n  mid:\n    location: file:/../mid\n    namespace: false\n  named:\n    location: file:/../named\n    namespace: x\n",
        ),
        ("mid/opa.project", "dependencies:\n  leaf: file:/../leaf\n"),
        ("named/opa.project", "dependencies:\n  leaf: file:/../leaf\n"),
        ("leaf/leaf.rego", "package leaf\n"),
    ]);
    let project_dir = fixture.path("project");

    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&RegoPackageRewriter::default()).await.unwrap();

    let namespaces: Vec<(usize, String, String)> = project
        .walk()
        .map(|(depth, dep)| (depth, dep.name.clone(), dep.full_namespace()))
        .collect();
    assert_eq!(
        namespaces,
        vec![
            (0, "mid".to_string(), String::new()),
            (1, "leaf".to_string(), "leaf".to_string()),
            (0, "named".to_string(), "x".to_string()),
            (1, "leaf".to_string(), "x.leaf".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_empty_files_are_not_copied() {
    let fixture = fixture(&[
        ("project/opa.project", "dependencies:\n  hollow: file:/../hollow\n"),
        ("hollow/empty.rego", ""),
    ]);
    let project_dir = fixture.path("project");

    let rewriter = RegoPackageRewriter::default();
    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&rewriter).await.unwrap();

    let target = dependencies_dir(&project_dir).join(dependency_id("hollow", "file:/../hollow"));
    assert!(target.is_dir());
    assert!(!target.join("empty.rego").exists());
    assert!(rewriter.calls().is_empty());
}

#[tokio::test]
async fn test_update_wipes_stale_content() {
    let mut files = no_dependencies_lib();
    files.push(("project/opa.project", "dependencies:\n  no_deps: file:/../no-dependencies\n"));
    let fixture = fixture(&files);
    let project_dir = fixture.path("project");
    let target = dependencies_dir(&project_dir).join(dependency_id("no_deps", NO_DEPS));
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("stale.rego"), "package stale\n").unwrap();

    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&RegoPackageRewriter::default()).await.unwrap();

    assert!(!target.join("stale.rego").exists());
    assert!(target.join("policy.rego").exists());
}

#[tokio::test]
async fn test_library_resolved_through_repository() {
    let fixture = fixture(&[
        (
            "project/opa.project",
            "repositories:\n- file:/../repo\ndependencies:\n  acme: acme-lib\n",
        ),
        ("repo/repository.yaml", "libraries:\n  acme-lib: file:/../libs/acme\n"),
        ("libs/acme/acme.rego", "package acme\n"),
    ]);
    let project_dir = fixture.path("project");

    let mut project = Project::read(&project_dir, false).unwrap();
    project.update(&RegoPackageRewriter::default()).await.unwrap();

    let repository = &project.repositories[0];
    assert_eq!(
        repository.materialized_path(),
        Some(repositories_dir(&project_dir).join(repository.id()).as_path())
    );
    assert_eq!(repository.find("acme-lib").map(Location::raw), Some("file:/../libs/acme"));

    let target = dependencies_dir(&project_dir).join(dependency_id("acme", "acme-lib"));
    assert_eq!(fs::read_to_string(target.join("acme.rego")).unwrap(), "package acme.acme\n");

    // a later load sees the same library table without fetching
    let mut loaded = Project::read(&project_dir, false).unwrap();
    loaded.load().unwrap();
    assert_eq!(loaded.repositories[0].libraries(), repository.libraries());
}

#[tokio::test]
async fn test_repository_without_manifest_fails() {
    let fixture = fixture(&[
        ("project/opa.project", "repositories:\n- file:/../repo\n"),
        ("repo/README.md", "nothing here\n"),
    ]);

    let mut project = Project::read(&fixture.path("project"), false).unwrap();
    let err = project.update(&RegoPackageRewriter::default()).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to update repository 'file:/../repo'");
    assert!(has_error(&err, |e| matches!(e, OdmError::MissingRepositoryManifest { .. })));
}

#[tokio::test]
async fn test_unresolvable_location_names_the_dependency() {
    let fixture = fixture(&[("project/opa.project", "dependencies:\n  x: nowhere\n")]);

    let mut project = Project::read(&fixture.path("project"), false).unwrap();
    let err = project.update(&RegoPackageRewriter::default()).await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to update dependency 'x'");
    assert!(format!("{err:#}").contains("Unsupported dependency location: nowhere"));
}

#[tokio::test]
async fn test_nested_failure_keeps_full_chain() {
    let fixture = fixture(&[
        ("project/opa.project", "dependencies:\n  outer: file:/../outer\n"),
        ("outer/opa.project", "dependencies:\n  inner: file:/../missing\n"),
    ]);

    let mut project = Project::read(&fixture.path("project"), false).unwrap();
    let err = project.update(&RegoPackageRewriter::default()).await.unwrap_err();

    let rendered = format!("{err:#}");
    assert!(rendered.starts_with(
        "Failed to update dependency 'outer': Failed to update dependency 'inner'"
    ));
    assert!(has_error(&err, |e| matches!(e, OdmError::SourceNotFound { .. })));
}

/// Builds a materialized tree by hand and loads it.
fn materialized_tree() -> (ProjectFixture, PathBuf, PathBuf, PathBuf, PathBuf) {
    let fixture = fixture(&[
        (
            "project/opa.project",
            "name: root\nsource: src\ntest: test\ndependencies:\n  dep_a: file:/../dep_a\n  dep_b: file:/../dep_b\n",
        ),
        ("project/src/main.rego", "package main\n"),
    ]);
    let project_dir = fixture.path("project");

    let dep_a = dependencies_dir(&project_dir).join(dependency_id("dep_a", "file:/../dep_a"));
    let dep_b = dependencies_dir(&project_dir).join(dependency_id("dep_b", "file:/../dep_b"));
    let dep_b1 =
        dependencies_dir(&dep_b).join(dependency_id("dep_b.dep_b1", "file:/../dep_b1"));

    fixture.write_path(&dep_a.join("a.rego"), "package dep_a.a\n");
    fixture.write_path(
        &dep_b.join(crate::location::PROJECT_MANIFEST),
        "name: dep_b\nsource: policy\ntest: tests\ndependencies:\n  dep_b1: file:/../dep_b1\n",
    );
    fixture.write_path(&dep_b.join("policy").join("b.rego"), "package dep_b.b\n");
    fixture.write_path(&dep_b.join("tests").join("b_test.rego"), "package dep_b.b_test\n");
    fixture.write_path(&dep_b1.join("b1.rego"), "package dep_b.dep_b1.b1\n");

    (fixture, project_dir, dep_a, dep_b, dep_b1)
}

trait WritePath {
    fn write_path(&self, path: &Path, content: &str);
}

impl WritePath for ProjectFixture {
    fn write_path(&self, path: &Path, content: &str) {
        let relative = path.strip_prefix(self.root()).unwrap();
        self.write(relative.to_str().unwrap(), content).unwrap();
    }
}

#[test]
fn test_load_rebuilds_tree_from_disk() {
    let (_fixture, project_dir, dep_a, dep_b, dep_b1) = materialized_tree();

    let mut project = Project::read(&project_dir, false).unwrap();
    project.load().unwrap();

    assert_eq!(
        project.data_locations().unwrap(),
        vec![project_dir.join("src"), dep_a, dep_b.join("policy"), dep_b1]
    );

    let dep_b_project = project.dependencies["dep_b"].project.as_ref().unwrap();
    assert_eq!(dep_b_project.name, "dep_b");
    assert_eq!(dep_b_project.dependencies["dep_b1"].full_namespace(), "dep_b.dep_b1");
}

#[test]
fn test_test_locations() {
    let (_fixture, project_dir, _dep_a, dep_b, _dep_b1) = materialized_tree();

    let mut project = Project::read(&project_dir, false).unwrap();
    project.load().unwrap();

    // own test dirs are reported even though they do not exist
    assert_eq!(project.test_locations(false).unwrap(), vec![project_dir.join("test")]);
    assert_eq!(
        project.test_locations(true).unwrap(),
        vec![project_dir.join("test"), dep_b.join("tests")]
    );
}

#[test]
fn test_write_tree() {
    let (_fixture, project_dir, ..) = materialized_tree();

    let mut project = Project::read(&project_dir, false).unwrap();
    project.load().unwrap();

    let mut out = Vec::new();
    write_tree(&project, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "root\n\
         ├── dep_a -> data.dep_a\n\
         └── dep_b (dep_b) -> data.dep_b\n    \
         └── dep_b1 -> data.dep_b.dep_b1\n"
    );
}

#[test]
fn test_directories_require_materialization() {
    let fixture = fixture(&[("project/opa.project", "dependencies:\n  a: file:/../a\n")]);

    let project = Project::read(&fixture.path("project"), false).unwrap();
    let err = project.data_locations().unwrap_err();

    assert!(has_error(&err, |e| matches!(e, OdmError::DependencyNotMaterialized { name } if name == "a")));
}

#[test]
fn test_load_tolerates_missing_materialization() {
    let fixture = fixture(&[("project/opa.project", "dependencies:\n  a: file:/../a\n")]);
    let project_dir = fixture.path("project");

    let mut project = Project::read(&project_dir, false).unwrap();
    project.load().unwrap();

    let dependency = &project.dependencies["a"];
    assert!(dependency.project.is_none());
    assert_eq!(project.data_locations().unwrap(), vec![project_dir]);
}

#[test]
fn test_malformed_location_rejected_on_read() {
    let fixture = fixture(&[(
        "project/opa.project",
        "dependencies:\n  bad: git+https://example.com/p.git#a#b\n",
    )]);

    let err = Project::read(&fixture.path("project"), false).unwrap_err();
    assert!(has_error(&err, |e| matches!(e, OdmError::MalformedLocation { .. })));
}

#[test]
fn test_read_missing_manifest() {
    let fixture = fixture(&[]);
    let dir = fixture.path("nothing");

    let err = Project::read(&dir, false).unwrap_err();
    assert!(has_error(&err, |e| matches!(e, OdmError::ManifestNotFound { .. })));

    let project = Project::read(&dir, true).unwrap();
    assert!(project.dependencies.is_empty());
    assert_eq!(project.manifest_dir(), dir.as_path());
}

#[test]
fn test_write_and_read_back() {
    let fixture = ProjectFixture::new().unwrap().dir("project").unwrap();
    let project_dir = fixture.path("project");

    let mut project = Project::new(&project_dir);
    project.name = "acme".to_string();
    project.source_dirs = vec!["src".to_string()];
    project.set_dependency("lib", Location::parse("file:/../lib").unwrap(), "lib");
    project.set_dependency("raw", Location::parse("git+https://example.com/r.git#v1").unwrap(), "");
    project.write(false).unwrap();

    let err = project.write(false).unwrap_err();
    assert!(has_error(&err, |e| matches!(e, OdmError::ManifestAlreadyExists { .. })));
    project.write(true).unwrap();

    let read = Project::read(&project_dir, false).unwrap();
    assert_eq!(read.name, "acme");
    assert_eq!(read.source_dirs, vec!["src"]);
    assert_eq!(read.dependencies["lib"].namespace, "lib");
    assert_eq!(read.dependencies["raw"].namespace, "");
    assert_eq!(read.dependencies["raw"].location.raw(), "git+https://example.com/r.git#v1");
    assert_eq!(read.to_manifest(), project.to_manifest());
}
