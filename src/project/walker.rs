//! Depth-first traversal of a resolved dependency tree.

use std::io::{self, Write};

use super::{Dependency, Project};

/// Pre-order walk over every dependency below a project.
///
/// Siblings are visited in name order. Each item carries its depth, with
/// the project's direct dependencies at depth 0.
pub struct DependencyWalk<'a> {
    stack: Vec<(usize, &'a Dependency)>,
}

impl<'a> DependencyWalk<'a> {
    pub fn new(project: &'a Project) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
        };
        walk.push_children(project, 0);
        walk
    }

    fn push_children(&mut self, project: &'a Project, depth: usize) {
        // Reversed so the first name is popped first
        for dependency in project.dependencies.values().rev() {
            self.stack.push((depth, dependency));
        }
    }
}

impl<'a> Iterator for DependencyWalk<'a> {
    type Item = (usize, &'a Dependency);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, dependency) = self.stack.pop()?;
        if let Some(project) = dependency.project.as_deref() {
            self.push_children(project, depth + 1);
        }
        Some((depth, dependency))
    }
}

/// Writes the dependency tree of `project` as box-drawing text.
///
/// ```text
/// acme
/// ├── common (acme-common) -> data.common
/// │   └── util -> data.common.util
/// └── raw
/// ```
pub fn write_tree(project: &Project, out: &mut impl Write) -> io::Result<()> {
    let root = if project.name.is_empty() {
        "root"
    } else {
        project.name.as_str()
    };
    writeln!(out, "{root}")?;
    write_children(project, "", out)
}

fn write_children(project: &Project, prefix: &str, out: &mut impl Write) -> io::Result<()> {
    let count = project.dependencies.len();
    for (i, dependency) in project.dependencies.values().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        writeln!(out, "{prefix}{connector}{}", describe(dependency))?;

        if let Some(nested) = dependency.project.as_deref() {
            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            write_children(nested, &child_prefix, out)?;
        }
    }
    Ok(())
}

fn describe(dependency: &Dependency) -> String {
    let mut line = dependency.name.clone();
    if let Some(project) = dependency.project.as_deref()
        && !project.name.is_empty()
    {
        line.push_str(&format!(" ({})", project.name));
    }
    let namespace = dependency.full_namespace();
    if !namespace.is_empty() {
        line.push_str(&format!(" -> data.{namespace}"));
    }
    line
}
