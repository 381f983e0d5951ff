//! An in-process stand-in for the policy engine's package refactoring.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

use crate::project::NamespaceRewriter;

/// Moves `package` and `import data.` paths in `.rego` files.
///
/// Behaves like `opa refactor move -p <from>:<to>` for the subset of Rego
/// the tests use: a package `p` lives at `data.p`, and when that path
/// starts with `from` the prefix is swapped for `to`. Every invocation is
/// recorded for later inspection.
#[derive(Debug, Default)]
pub struct RegoPackageRewriter {
    calls: Mutex<Vec<RewriteCall>>,
}

/// One recorded [`NamespaceRewriter::rewrite`] invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteCall {
    pub dirs: Vec<PathBuf>,
    pub from: String,
    pub to: String,
}

impl RegoPackageRewriter {
    pub fn calls(&self) -> Vec<RewriteCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn rewrite_file(path: &Path, from: &str, to: &str) -> Result<()> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

        let rewritten = content
            .lines()
            .map(|line| rewrite_line(line, from, to))
            .collect::<Vec<_>>()
            .join("\n");
        let rewritten = if content.ends_with('\n') {
            format!("{rewritten}\n")
        } else {
            rewritten
        };

        fs::write(path, rewritten).with_context(|| format!("Failed to write {}", path.display()))
    }
}

fn move_ref(reference: &str, from: &str, to: &str) -> String {
    match reference.strip_prefix(from) {
        Some(rest) if rest.is_empty() || rest.starts_with('.') => format!("{to}{rest}"),
        _ => reference.to_string(),
    }
}

fn rewrite_line(line: &str, from: &str, to: &str) -> String {
    if let Some(package) = line.strip_prefix("package ") {
        let moved = move_ref(&format!("data.{}", package.trim()), from, to);
        let package = moved.strip_prefix("data.").unwrap_or(&moved);
        return format!("package {package}");
    }

    if let Some(import) = line.strip_prefix("import ")
        && import.starts_with("data.")
    {
        let mut parts = import.splitn(2, ' ');
        let reference = parts.next().unwrap_or_default();
        let alias = parts.next().map(|a| format!(" {a}")).unwrap_or_default();
        return format!("import {}{alias}", move_ref(reference, from, to));
    }

    line.to_string()
}

impl NamespaceRewriter for RegoPackageRewriter {
    async fn rewrite(&self, dirs: &[PathBuf], from: &str, to: &str) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RewriteCall {
                dirs: dirs.to_vec(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        for dir in dirs {
            for entry in WalkDir::new(dir) {
                let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "rego")
                {
                    Self::rewrite_file(entry.path(), from, to)?;
                }
            }
        }
        Ok(())
    }
}
