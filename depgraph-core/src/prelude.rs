//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use depgraph_core::prelude::*;
//! ```

// Core types
pub use crate::error::{DepgraphError, DepgraphResult};
pub use crate::graph::{DependencyGraph, Module};
pub use crate::parse::{Dependency, Visibility};

// Pipeline stages
pub use crate::parse::parse_declaration;
pub use crate::redundancy::{find_redundant, RedundantDependency};
pub use crate::scan::assemble;
pub use crate::visualize::{generate_dot, DotOptions};

// Configuration
pub use crate::config::{load_config, DepgraphConfig, ImageFormat, NamingConvention};

// Builder API
pub use crate::builder::{AnalysisResult, Depgraph};
