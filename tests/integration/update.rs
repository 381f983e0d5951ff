use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_update_materializes_local_dependency() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "dependencies:\n  lib:\n    location: file:/../lib\n    namespace: false\n",
    )?;
    project.write_file("lib/lib.rego", "package lib\n")?;
    project.write_file("lib/empty.rego", "")?;
    project.write_file("lib/.opa/dependencies/stale/x.rego", "package x\n")?;

    project.odm().arg("update").assert().success().stdout(predicate::str::contains("Updated 1"));

    let target = project.dependency_dir("", "file:/../lib");
    assert_eq!(std::fs::read_to_string(target.join("lib.rego"))?, "package lib\n");
    assert!(!target.join("empty.rego").exists());
    assert!(!target.join(".opa").exists());
    Ok(())
}

#[test]
fn test_update_removes_dependencies_no_longer_declared() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("name: app\n")?;
    project.write_file("project/.opa/dependencies/gone/gone.rego", "package gone\n")?;

    project.odm().arg("update").assert().success();

    assert!(project.path("project/.opa/dependencies").is_dir());
    assert!(!project.path("project/.opa/dependencies/gone").exists());
    Ok(())
}

#[test]
fn test_update_reports_failing_dependency() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("dependencies:\n  outer:\n    location: file:/../outer\n    namespace: false\n")?;
    project.write_file(
        "outer/opa.project",
        "dependencies:\n  inner:\n    location: file:/../missing\n    namespace: false\n",
    )?;

    project.odm().arg("update").assert().failure().code(1).stderr(
        predicate::str::contains(
            "Failed to update dependency 'outer': Failed to update dependency 'inner'",
        )
        .and(predicate::str::contains("Dependency source does not exist")),
    );
    Ok(())
}

#[test]
fn test_update_unknown_library() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("dependencies:\n  acme: acme-lib\n")?;

    project
        .odm()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported dependency location: acme-lib"));
    Ok(())
}

#[test]
fn test_update_resolves_repository_library() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(
        "repositories:\n- file:/../repo\ndependencies:\n  acme:\n    location: acme-lib\n    namespace: false\n",
    )?;
    project.write_file("repo/repository.yaml", "libraries:\n  acme-lib: file:/../libs/acme\n")?;
    project.write_file("libs/acme/acme.rego", "package acme\n")?;

    project.odm().arg("update").assert().success();

    assert!(project.dependency_dir("", "acme-lib").join("acme.rego").exists());
    Ok(())
}

#[test]
fn test_update_without_manifest_fails() -> Result<()> {
    let project = TestProject::new()?;

    project
        .odm()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project manifest not found"))
        .stderr(predicate::str::contains("odm init"));
    Ok(())
}

#[test]
fn test_update_rejects_malformed_git_location() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("dependencies:\n  bad: git+https://example.com/p.git#a#b\n")?;

    project
        .odm()
        .arg("update")
        .assert()
        .failure()
        .stderr(predicate::str::contains("only one tag separator"));
    Ok(())
}
