use anyhow::Result;

use crate::common::TestProject;

#[test]
fn test_depend_without_namespace() -> Result<()> {
    let project = TestProject::new()?;

    project.odm().args(["depend", "lib", "file:/../lib"]).assert().success();

    assert_eq!(
        project.read_file("project/opa.project")?,
        "dependencies:\n  lib:\n    location: file:/../lib\n    namespace: false\n"
    );
    Ok(())
}

#[test]
fn test_depend_namespaced_and_explicit_namespace() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest("name: app\n")?;

    project.odm().args(["depend", "lib", "file:/../lib", "-n"]).assert().success();
    project
        .odm()
        .args(["depend", "other", "git+https://example.com/other.git#v1", "-N", "ext"])
        .assert()
        .success();

    assert_eq!(
        project.read_file("project/opa.project")?,
        "name: app\ndependencies:\n  lib: file:/../lib\n  other:\n    location: git+https://example.com/other.git#v1\n    namespace: ext\n"
    );
    Ok(())
}

#[test]
fn test_depend_requires_location() -> Result<()> {
    let project = TestProject::new()?;
    project.odm().args(["depend", "lib"]).assert().failure();
    assert!(!project.path("project/opa.project").exists());
    Ok(())
}
