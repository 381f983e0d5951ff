use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

fn project_with_dependency() -> Result<TestProject> {
    let project = TestProject::new()?;
    project.write_manifest(
        "name: app\nsource:\n- src\n- missing\ntest: test\ndependencies:\n  lib:\n    location: file:/../lib\n    namespace: false\n",
    )?;
    project.write_file("project/src/main.rego", "package main\n")?;
    project.write_file("lib/opa.project", "name: library\nsource: policy\ntest: tests\n")?;
    project.write_file("lib/policy/lib.rego", "package lib\n")?;
    project.write_file("lib/tests/lib_test.rego", "package lib_test\n")?;
    Ok(project)
}

#[test]
fn test_list_source() -> Result<()> {
    let project = project_with_dependency()?;
    let lib = project.dependency_dir("", "file:/../lib");
    let src = project.project_path().join("src");

    project
        .odm_at_project()
        .args(["list", "source"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n{}\n", src.display(), lib.join("policy").display())));

    project
        .odm_at_project()
        .args(["list", "source", "--no-update", "-t", "--include-dep-tests"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n{}\n{}\n{}\n",
            src.display(),
            lib.join("policy").display(),
            project.project_path().join("test").display(),
            lib.join("tests").display()
        )));
    Ok(())
}

#[test]
fn test_list_source_without_update_or_manifest() -> Result<()> {
    let project = TestProject::new()?;

    project
        .odm_at_project()
        .args(["list", "source", "--no-update"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", project.project_path().display())));
    Ok(())
}

#[test]
fn test_list_tree() -> Result<()> {
    let project = project_with_dependency()?;

    project.odm().args(["list", "tree"]).assert().success().stdout("app\n└── lib (library)\n");
    Ok(())
}
