//! Deterministic discovery of declaration files and graph assembly.
//!
//! The walk is sorted by file name so the assembled graph (and everything
//! rendered from it) is identical across runs, whatever order the
//! filesystem enumerates entries in. Excluded directories are pruned with
//! `WalkDir::filter_entry` so their subtrees are never visited.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::DepgraphConfig;
use crate::error::{DepgraphError, DepgraphResult};
use crate::graph::{DependencyGraph, Module};
use crate::parse::parse_declaration_file;

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Finds the declaration files of all subdirectories below `root`.
///
/// The root's own declaration file is not included. Paths come back in
/// sorted walk order. Any walk error aborts the search.
pub fn gather_declaration_files(
    root: &Path,
    config: &DepgraphConfig,
) -> DepgraphResult<Vec<PathBuf>> {
    let excludes: HashSet<&str> = config.scan.exclude.iter().map(String::as_str).collect();
    let file_name = config.naming.declaration_file.as_str();
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
    {
        let entry = entry.map_err(|e| DepgraphError::walk(root, e))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let candidate = entry.path().join(file_name);
        if candidate.is_file() {
            files.push(candidate);
        }
    }

    Ok(files)
}

/// Builds the dependency graph for the project rooted at `root`.
///
/// The root declaration file, when present and linking at least one
/// dependency, produces the aggregate module. Every subdirectory
/// declaration that names a target adds (or replaces) one module.
pub fn assemble(root: &Path, config: &DepgraphConfig) -> DepgraphResult<DependencyGraph> {
    if !root.is_dir() {
        return Err(DepgraphError::io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source directory not found"),
        ));
    }

    let naming = &config.naming;
    let mut graph = DependencyGraph::new();

    let root_file = root.join(&naming.declaration_file);
    if root_file.is_file() {
        match parse_declaration_file(&root_file, true, naming)? {
            Some(decl) if !decl.dependencies.is_empty() => {
                debug!(
                    module = %decl.module,
                    dependencies = decl.dependencies.len(),
                    "found root target"
                );
                graph.insert(Module::from_declaration(decl, root_file));
            }
            _ => debug!(path = %root_file.display(), "root declaration links nothing"),
        }
    } else {
        debug!(path = %root_file.display(), "no root declaration file");
    }

    for path in gather_declaration_files(root, config)? {
        let Some(decl) = parse_declaration_file(&path, false, naming)? else {
            debug!(path = %path.display(), "no target declaration, skipping");
            continue;
        };

        debug!(
            module = %decl.module,
            dependencies = decl.dependencies.len(),
            path = %path.display(),
            "found module"
        );
        for dep in &decl.dependencies {
            debug!(module = %decl.module, dependency = %dep.name, visibility = %dep.visibility);
        }

        if let Some(previous) = graph.insert(Module::from_declaration(decl, &path)) {
            warn!(
                module = %previous.name,
                previous = %previous.source.display(),
                replacement = %path.display(),
                "module declared twice, keeping the later declaration"
            );
        }
    }

    Ok(graph)
}
