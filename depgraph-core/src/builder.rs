//! Builder pattern API for dependency graph analysis.
//!
//! ```rust,ignore
//! use depgraph_core::prelude::*;
//!
//! let result = Depgraph::new("/path/to/project/src")
//!     .check_redundancy(true)
//!     .show_visibility(true)
//!     .analyze()?;
//!
//! std::fs::write("deps.dot", result.to_dot())?;
//! ```

use std::path::PathBuf;
use tracing::info;

use crate::config::{load_config, DepgraphConfig};
use crate::error::DepgraphResult;
use crate::graph::{DependencyGraph, GraphStats};
use crate::redundancy::{find_redundant, RedundantDependency};
use crate::scan::assemble;
use crate::visualize::{generate_dot, DotOptions};

/// Builder for configuring a dependency graph analysis.
#[derive(Debug, Clone)]
pub struct Depgraph {
    /// Root of the declaration tree
    root: PathBuf,

    /// Explicit configuration; `depgraph.toml` in `root` is used otherwise
    config: Option<DepgraphConfig>,

    /// Whether to run the redundancy detector
    check_redundancy: bool,

    /// Whether to colour edges by visibility/redundancy
    show_visibility: bool,
}

impl Depgraph {
    /// Create a new analysis builder for the given source directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
            check_redundancy: true,
            show_visibility: true,
        }
    }

    /// Use this configuration instead of looking for `depgraph.toml`.
    pub fn with_config(mut self, config: DepgraphConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Enable or disable redundant dependency detection.
    pub fn check_redundancy(mut self, enabled: bool) -> Self {
        self.check_redundancy = enabled;
        self
    }

    /// Enable or disable visibility colouring in the DOT output.
    pub fn show_visibility(mut self, enabled: bool) -> Self {
        self.show_visibility = enabled;
        self
    }

    /// Run the pipeline: walk, parse, assemble, detect.
    pub fn analyze(&self) -> DepgraphResult<AnalysisResult> {
        let config = match &self.config {
            Some(config) => config.clone(),
            None => load_config(&self.root)?.unwrap_or_default(),
        };

        let graph = assemble(&self.root, &config)?;
        let redundant = self.check_redundancy.then(|| find_redundant(&graph));

        info!(
            modules = graph.len(),
            dependencies = graph.edge_count(),
            redundant = redundant.as_ref().map_or(0, Vec::len),
            "analysis complete"
        );

        Ok(AnalysisResult {
            graph,
            redundant,
            options: DotOptions {
                show_visibility: self.show_visibility,
            },
            config,
        })
    }
}

/// Results of an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Assembled module graph
    pub graph: DependencyGraph,

    /// Redundant dependencies; `None` when detection was disabled
    pub redundant: Option<Vec<RedundantDependency>>,

    /// Rendering options
    pub options: DotOptions,

    /// Configuration the run used
    pub config: DepgraphConfig,
}

impl AnalysisResult {
    /// Render the graph as DOT text.
    pub fn to_dot(&self) -> String {
        generate_dot(&self.graph, self.redundant.as_deref(), self.options)
    }

    /// Redundant dependencies found (empty when detection was disabled).
    pub fn redundant(&self) -> &[RedundantDependency] {
        self.redundant.as_deref().unwrap_or_default()
    }

    pub fn stats(&self) -> AnalysisStats {
        AnalysisStats {
            graph: self.graph.stats(),
            redundant: self.redundant().len(),
        }
    }
}

/// Counts reported in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisStats {
    #[serde(flatten)]
    pub graph: GraphStats,
    pub redundant: usize,
}
