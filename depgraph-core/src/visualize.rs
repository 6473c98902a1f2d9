//! Graphviz DOT rendering for target dependency graphs.
//!
//! Output is a pure function of the graph, the redundancy findings and the
//! options: nodes and edges are written in graph order, so two runs over the
//! same tree produce byte-identical text.

use std::collections::HashSet;
use std::fmt::Write;

use crate::graph::DependencyGraph;
use crate::parse::Visibility;
use crate::redundancy::{redundant_edges, RedundantDependency};

const FONT_LIST: &str = "Helvetica,Arial,sans-serif";
const BG_COLOR: &str = "transparent";

const ROOT_NODE_COLOR: &str = "#f1efec";
const NODE_COLOR: &str = "#d4c9be";
const NODE_FONT_COLOR: &str = "#222831";

const PUBLIC_COLOR: &str = "#ff6500";
const PRIVATE_COLOR: &str = "#1e3e62";
const REDUNDANT_COLOR: &str = "#e9363c";
const INTERFACE_COLOR: &str = "#1f7d53";

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotOptions {
    /// Colour edges by visibility and redundancy. When off, edges carry no
    /// attributes at all.
    pub show_visibility: bool,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            show_visibility: true,
        }
    }
}

/// Edge colour for a visibility.
pub fn visibility_color(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => PUBLIC_COLOR,
        Visibility::Private => PRIVATE_COLOR,
        Visibility::Interface => INTERFACE_COLOR,
    }
}

/// Quotes a DOT identifier.
fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Generate a Graphviz DOT representation of the dependency graph.
///
/// - the aggregate module is drawn with a lighter fill and a double border
/// - edges are coloured by visibility; redundant edges override that colour
/// - a legend subgraph explains the colours
pub fn generate_dot(
    graph: &DependencyGraph,
    redundant: Option<&[RedundantDependency]>,
    options: DotOptions,
) -> String {
    // ~60 bytes/node + ~60 bytes/edge + ~1.5 KB preamble and legend
    let estimated_capacity = graph.len() * 60 + graph.edge_count() * 60 + 1536;
    let mut dot = String::with_capacity(estimated_capacity);

    let redundant_set = redundant.map(redundant_edges).unwrap_or_default();

    // Writing into a String cannot fail
    let _ = write_dot_content(&mut dot, graph, &redundant_set, options);
    dot
}

fn write_dot_content(
    dot: &mut String,
    graph: &DependencyGraph,
    redundant: &HashSet<(&str, &str)>,
    options: DotOptions,
) -> std::fmt::Result {
    writeln!(dot, "digraph CMakeDependencyGraph {{")?;
    writeln!(
        dot,
        "  graph [rankdir=LR, fontname=\"{FONT_LIST}\", nodesep=0.3, ranksep=0.8, splines=true, overlap=false, bgcolor=\"{BG_COLOR}\"];"
    )?;
    writeln!(
        dot,
        "  node [shape=Mrecord, style=\"filled, bold\", fontname=\"{FONT_LIST}\", fontsize=15, fontcolor=\"{NODE_FONT_COLOR}\", penwidth=1.5];"
    )?;
    writeln!(dot, "  edge [fontname=\"{FONT_LIST}\", fontsize=8, arrowhead=vee];")?;
    writeln!(dot)?;

    write_legend(dot)?;
    writeln!(dot)?;

    // 1. NODES
    for module in graph.modules() {
        if module.is_root {
            writeln!(
                dot,
                "  {} [fillcolor=\"{ROOT_NODE_COLOR}\", style=\"filled,bold\", peripheries=2];",
                quote(&module.name)
            )?;
        } else {
            writeln!(dot, "  {} [fillcolor=\"{NODE_COLOR}\"];", quote(&module.name))?;
        }
    }

    writeln!(dot)?;

    // 2. EDGES: one per declared occurrence
    for (from, dep) in graph.edges() {
        if !options.show_visibility {
            writeln!(dot, "  {} -> {};", quote(from), quote(&dep.name))?;
            continue;
        }

        let color = if redundant.contains(&(from, dep.name.as_str())) {
            REDUNDANT_COLOR
        } else {
            visibility_color(dep.visibility)
        };
        writeln!(
            dot,
            "  {} -> {} [color=\"{}\"];",
            quote(from),
            quote(&dep.name),
            color
        )?;
    }

    writeln!(dot, "}}")?;
    Ok(())
}

fn write_legend(dot: &mut String) -> std::fmt::Result {
    writeln!(dot, "  subgraph cluster_legend {{")?;
    writeln!(dot, "    style=filled;")?;
    writeln!(dot, "    fillcolor=\"{BG_COLOR}\";")?;
    writeln!(dot, "    color=\"{BG_COLOR}\";")?;
    writeln!(dot, "    penwidth=0;")?;
    writeln!(dot)?;
    writeln!(dot, "    key [shape=plaintext, margin=0, label=<")?;
    writeln!(
        dot,
        "      <TABLE BORDER=\"0\" BGCOLOR=\"{BG_COLOR}\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"4\">"
    )?;
    for (color, label) in [
        (PUBLIC_COLOR, "Public"),
        (PRIVATE_COLOR, "Private"),
        (INTERFACE_COLOR, "Interface"),
        (REDUNDANT_COLOR, "Redundant"),
    ] {
        writeln!(
            dot,
            "        <TR><TD><FONT COLOR=\"{color}\">&#10132;</FONT></TD><TD>{label}</TD></TR>"
        )?;
    }
    writeln!(dot, "      </TABLE>")?;
    writeln!(dot, "    >];")?;
    writeln!(dot, "  }}")?;
    Ok(())
}
