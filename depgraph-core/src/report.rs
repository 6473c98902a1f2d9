//! Output formatting - plaintext and JSON.

use serde::Serialize;

use crate::builder::{AnalysisResult, AnalysisStats};
use crate::graph::{DependencyGraph, Module};
use crate::redundancy::RedundantDependency;

/// Lines describing every module and its dependencies (verbose mode).
pub fn module_listing(graph: &DependencyGraph) -> Vec<String> {
    let mut lines = Vec::new();
    for module in graph.modules() {
        let kind = if module.is_root { "main target" } else { "module" };
        lines.push(format!(
            "Found {}: {} with {} dependencies",
            kind,
            module.name,
            module.dependencies.len()
        ));
        for dep in &module.dependencies {
            lines.push(format!("  {}: {}", dep.visibility, dep.name));
        }
    }
    lines
}

/// Plain text block for redundant dependencies; empty when there are none.
pub fn redundancy_lines(redundant: &[RedundantDependency]) -> Vec<String> {
    if redundant.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Redundant dependencies found:".to_string()];
    lines.extend(redundant.iter().map(|r| format!("  {}", r)));
    lines
}

/// `Found N modules with M dependencies`
pub fn summary_line(graph: &DependencyGraph) -> String {
    format!(
        "Found {} modules with {} dependencies",
        graph.len(),
        graph.edge_count()
    )
}

/// Prints redundant dependencies in plain text format.
pub fn print_plain(redundant: &[RedundantDependency]) {
    let lines = redundancy_lines(redundant);
    if lines.is_empty() {
        return;
    }
    println!();
    for line in lines {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    modules: Vec<&'a Module>,
    redundant: Option<&'a [RedundantDependency]>,
    stats: AnalysisStats,
}

impl<'a> JsonReport<'a> {
    fn new(result: &'a AnalysisResult) -> Self {
        Self {
            modules: result.graph.modules().collect(),
            redundant: result.redundant.as_deref(),
            stats: result.stats(),
        }
    }
}

/// Machine-readable analysis summary.
pub fn to_json(result: &AnalysisResult) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(JsonReport::new(result))
}

/// Prints the analysis in JSON format.
///
/// Falls back to a minimal document if serialization fails.
pub fn print_json(result: &AnalysisResult) {
    match serde_json::to_string_pretty(&JsonReport::new(result)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            println!("{{\"modules\": {}}}", result.graph.len());
        }
    }
}
