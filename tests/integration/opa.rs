//! Tests that need a real `opa` binary.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::{TestProject, opa_available};

const NO_DEPS: &str = "file:/../no-dependencies";

fn project_with_no_deps() -> Result<TestProject> {
    let project = TestProject::new()?;
    project.write_file("no-dependencies/policy.rego", "package example\n\nallow := true\n")?;
    Ok(project)
}

#[test]
fn test_update_rewrites_namespace() -> Result<()> {
    if !opa_available() {
        return Ok(());
    }
    let project = project_with_no_deps()?;
    project.write_manifest("dependencies:\n  no_deps: file:/../no-dependencies\n")?;

    project.odm().arg("update").assert().success();

    let policy = project.dependency_dir("no_deps", NO_DEPS).join("policy.rego");
    assert!(std::fs::read_to_string(policy)?.contains("package no_deps.example"));
    Ok(())
}

#[test]
fn test_eval_sees_namespaced_dependencies() -> Result<()> {
    if !opa_available() {
        return Ok(());
    }
    let project = project_with_no_deps()?;
    project.write_manifest("dependencies:\n  foo: file:/../foo\n")?;
    project.write_file("foo/opa.project", "dependencies:\n  no_deps: file:/../no-dependencies\n")?;
    project.write_file("foo/foo.rego", "package foo_lib\n\nallow := data.no_deps.example.allow\n")?;

    project
        .odm()
        .args(["eval", "--", "-f", "raw", "data.foo.foo_lib.allow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    project
        .odm()
        .args(["eval", "--no-update", "--", "-f", "raw", "data.foo.no_deps.example.allow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));
    Ok(())
}

#[test]
fn test_test_command_runs_project_tests() -> Result<()> {
    if !opa_available() {
        return Ok(());
    }
    let project = project_with_no_deps()?;
    project.write_manifest(
        "source: src\ntest: test\ndependencies:\n  no_deps: file:/../no-dependencies\n",
    )?;
    project.write_file("project/src/main.rego", "package main\n\nallow := data.no_deps.example.allow\n")?;
    project.write_file("project/test/main_test.rego", "package main_test\n\nimport rego.v1\n\ntest_allow if data.main.allow\n")?;

    project.odm().arg("test").assert().success().stdout(predicate::str::contains("PASS"));
    Ok(())
}

#[test]
fn test_build_writes_bundle() -> Result<()> {
    if !opa_available() {
        return Ok(());
    }
    let project = project_with_no_deps()?;
    project.write_manifest("source: src\nbuild:\n  output: dist/\n")?;
    project.write_file("project/src/main.rego", "package main\n\nallow := true\n")?;

    project.odm().arg("build").assert().success();

    assert!(project.path("project/dist/bundle.tar.gz").exists());
    Ok(())
}

#[test]
fn test_missing_opa_binary() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("name: app\n")?;

    project
        .odm()
        .args(["--opa-path", "/nonexistent/opa", "eval", "--no-update", "--", "data"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPA executable '/nonexistent/opa' not found"));
    Ok(())
}
