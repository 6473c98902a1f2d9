//! Redundant dependency detection.
//!
//! If `S` links `A` and `B` publicly and `A` links `B` publicly, every
//! consumer of `S` already sees `B` through `A`, so `S -> B` is redundant.
//! The check is one level deep: only public dependencies of direct public
//! dependencies are considered, not the full transitive closure.
//!
//! Two `DiGraphMap` views are built over the ordered graph:
//! - `public`: PUBLIC edges only
//! - `direct`: every edge, regardless of visibility
//!
//! Both collapse duplicate edges, so repeated declarations never produce
//! repeated findings.

use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::graph::DependencyGraph;

/// `module`'s direct edge to `redundant` is unnecessary because `module`
/// publicly depends on `through`, which publicly depends on `redundant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RedundantDependency {
    pub module: String,
    pub through: String,
    pub redundant: String,
}

impl RedundantDependency {
    pub fn new(
        module: impl Into<String>,
        through: impl Into<String>,
        redundant: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            through: through.into(),
            redundant: redundant.into(),
        }
    }
}

impl fmt::Display for RedundantDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} is redundant (already accessible through {})",
            self.module, self.redundant, self.through
        )
    }
}

fn build_views(graph: &DependencyGraph) -> (DiGraphMap<&str, ()>, DiGraphMap<&str, ()>) {
    let mut public = DiGraphMap::new();
    let mut direct = DiGraphMap::new();

    for (from, dep) in graph.edges() {
        direct.add_edge(from, dep.name.as_str(), ());
        if dep.visibility.is_public() {
            public.add_edge(from, dep.name.as_str(), ());
        }
    }

    (public, direct)
}

/// Finds all redundant direct dependencies in `graph`.
///
/// Results follow graph order: module, then its public edges in declaration
/// order, then the intermediate module's public edges. No triple repeats,
/// and no module is reported as redundant for itself. A module that
/// publicly links itself acts as its own intermediate.
pub fn find_redundant(graph: &DependencyGraph) -> Vec<RedundantDependency> {
    let (public, direct) = build_views(graph);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for module in graph.modules() {
        let m = module.name.as_str();

        for through in module.public_dependencies() {
            if !public.contains_node(through) {
                continue;
            }

            for target in public.neighbors(through) {
                if target == through || target == m {
                    continue;
                }
                if direct.contains_edge(m, target) && seen.insert((m, through, target)) {
                    out.push(RedundantDependency::new(m, through, target));
                }
            }
        }
    }

    out
}

/// Fast membership check used by the renderer: `(module, redundant)` pairs.
pub fn redundant_edges(redundant: &[RedundantDependency]) -> HashSet<(&str, &str)> {
    redundant
        .iter()
        .map(|r| (r.module.as_str(), r.redundant.as_str()))
        .collect()
}
