use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_init_creates_manifest_and_odm_dir() -> Result<()> {
    let project = TestProject::new()?;

    project.odm().arg("init").assert().success().stdout(predicate::str::contains("Initialized"));

    assert_eq!(project.read_file("project/opa.project")?, "source: src\n");
    assert!(project.path("project/.opa").is_dir());
    Ok(())
}

#[test]
fn test_init_named_project_creates_directory() -> Result<()> {
    let project = TestProject::new()?;

    project.odm().args(["init", "acme", "--no-source"]).assert().success();

    assert_eq!(project.read_file("project/acme/opa.project")?, "name: acme\n");
    assert!(project.path("project/acme/.opa").is_dir());
    Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("name: mine\n")?;

    project
        .odm()
        .arg("init")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Project manifest already exists"));

    assert_eq!(project.read_file("project/opa.project")?, "name: mine\n");
    Ok(())
}
