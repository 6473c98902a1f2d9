//! depgraph-core: CMake target dependency graph extraction and analysis
//!
//! Reads a tree of `CMakeLists.txt` declaration files, reconstructs the
//! graph of linked targets with their PUBLIC/PRIVATE/INTERFACE visibility,
//! flags dependencies that are redundant because they are already visible
//! through another public dependency, and renders everything as Graphviz DOT.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use depgraph_core::prelude::*;
//!
//! let result = Depgraph::new("/path/to/project/src").analyze()?;
//! for r in result.redundant() {
//!     println!("{}", r);
//! }
//! std::fs::write("deps.dot", result.to_dot())?;
//! ```
//!
//! # Module Organization
//!
//! - [`lexer`]: flat tokenizer and command grouping
//! - [`parse`]: per-file declaration parsing and the visibility state machine
//! - [`scan`]: sorted directory walk and graph assembly
//! - [`graph`]: ordered module graph
//! - [`redundancy`]: redundant dependency detection
//! - [`visualize`]: DOT rendering
//! - [`builder`]: fluent pipeline API
//! - [`error`]: typed error handling
//!
//! # Cargo Features
//!
//! - `image` (default): render DOT output to png/svg/pdf through Graphviz

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod lexer;
pub mod logging;
pub mod parse;
pub mod prelude;
pub mod redundancy;
pub mod report;
pub mod scan;
pub mod visualize;

#[cfg(feature = "image")]
pub mod image;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{DepgraphError, DepgraphResult, IoResultExt};

// Builder API
pub use builder::{AnalysisResult, AnalysisStats, Depgraph};

// Configuration
pub use config::{
    load_config, load_config_file, DepgraphConfig, ImageFormat, NamingConvention, OutputConfig,
    ScanConfig, CONFIG_FILE_NAME,
};

// Graph model
pub use graph::{DependencyGraph, GraphStats, Module};

// Logging
pub use logging::{init_structured_logging, log_info, log_warn};

// Parsing
pub use parse::{
    parse_declaration, parse_declaration_file, Declaration, Dependency, LineKind, ScanState,
    Visibility,
};

// Analysis
pub use redundancy::{find_redundant, RedundantDependency};

// Reporting
pub use report::{module_listing, print_json, print_plain, redundancy_lines, summary_line, to_json};

// Discovery
pub use scan::{assemble, gather_declaration_files};

// Rendering
pub use visualize::{generate_dot, DotOptions};

#[cfg(feature = "image")]
pub use image::{render_image, DEFAULT_GRAPHVIZ};
