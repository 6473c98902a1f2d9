//! Ordered module graph.
//!
//! Modules keep the order in which they were first inserted, which is the
//! assembly order (root file first, then directories sorted by name). Every
//! consumer iterates in that order, so output never depends on hash order.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::parse::{Declaration, Dependency, Visibility};

/// A named build target and its outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub is_root: bool,
    /// Declaration file the module was parsed from.
    pub source: PathBuf,
    pub dependencies: Vec<Dependency>,
}

impl Module {
    pub fn new(name: impl Into<String>, is_root: bool, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            is_root,
            source: source.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn from_declaration(decl: Declaration, source: impl Into<PathBuf>) -> Self {
        Self {
            name: decl.module,
            is_root: decl.is_root,
            source: source.into(),
            dependencies: decl.dependencies,
        }
    }

    pub fn with_dependency(mut self, name: impl Into<String>, visibility: Visibility) -> Self {
        self.dependencies.push(Dependency::new(name, visibility));
        self
    }

    /// Names of PUBLIC dependencies, in declaration order, without repeats.
    pub fn public_dependencies(&self) -> impl Iterator<Item = &str> {
        let mut seen = HashSet::new();
        self.dependencies
            .iter()
            .filter(|d| d.visibility.is_public())
            .map(|d| d.name.as_str())
            .filter(move |name| seen.insert(*name))
    }

    /// Whether `name` is a direct dependency with any visibility.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.name == name)
    }
}

/// Mapping from module name to its ordered edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a module, replacing the edges of an existing module with the
    /// same name (last write wins). A replaced module keeps its position.
    ///
    /// Returns the replaced module, if any.
    pub fn insert(&mut self, module: Module) -> Option<Module> {
        match self.index.get(&module.name) {
            Some(&i) => Some(std::mem::replace(&mut self.modules[i], module)),
            None => {
                self.index.insert(module.name.clone(), self.modules.len());
                self.modules.push(module);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.index.get(name).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Modules in assembly order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    /// All `(from, dependency)` occurrences in assembly order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &Dependency)> {
        self.modules
            .iter()
            .flat_map(|m| m.dependencies.iter().map(move |d| (m.name.as_str(), d)))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Total number of edge occurrences, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.modules.iter().map(|m| m.dependencies.len()).sum()
    }

    /// Dependency names that are not modules of this graph.
    pub fn external_nodes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.edges()
            .map(|(_, d)| d.name.as_str())
            .filter(|name| !self.contains(name))
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn stats(&self) -> GraphStats {
        let count = |vis: Visibility| self.edges().filter(|(_, d)| d.visibility == vis).count();
        GraphStats {
            modules: self.len(),
            edges: self.edge_count(),
            public_edges: count(Visibility::Public),
            private_edges: count(Visibility::Private),
            interface_edges: count(Visibility::Interface),
            external_nodes: self.external_nodes().len(),
        }
    }
}

/// Summary counts over a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub modules: usize,
    pub edges: usize,
    pub public_edges: usize,
    pub private_edges: usize,
    pub interface_edges: usize,
    pub external_nodes: usize,
}
