//! depgraph CLI - CMake target dependency graph generator.
//!
//! Features:
//! - Sorted, deterministic scan of every `CMakeLists.txt` below a source root
//! - PUBLIC/PRIVATE/INTERFACE edge colouring
//! - Redundant dependency detection
//! - Optional image rendering through Graphviz

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use depgraph_core::{
    init_structured_logging, load_config, load_config_file, log_info, log_warn, module_listing,
    print_json, print_plain, render_image, summary_line, Depgraph, DepgraphConfig, ImageFormat,
    DEFAULT_GRAPHVIZ,
};

/// Default DOT output path.
const DEFAULT_OUTPUT: &str = "cmake_dependency_graph.dot";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate a CMake dependency graph from CMakeLists.txt files"
)]
pub struct Cli {
    /// Source directory containing CMakeLists.txt files
    #[arg(default_value = ".")]
    source_dir: PathBuf,

    /// Output DOT file [default: cmake_dependency_graph.dot]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output image file (requires Graphviz)
    #[arg(short, long, value_name = "FILE")]
    image: Option<PathBuf>,

    /// Output image format: png, svg or pdf [default: png]
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<ImageFormat>,

    /// Don't show visibility (PUBLIC/PRIVATE/INTERFACE) in the graph
    #[arg(long)]
    no_visibility: bool,

    /// Disable redundant dependency checking
    #[arg(long)]
    no_redundancy_check: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the analysis as JSON instead of plain text
    #[arg(long)]
    json: bool,

    /// Configuration file [default: <SOURCE_DIR>/depgraph.toml]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Explicit `--config` file, else `depgraph.toml` in the source dir.
    fn load_config(&self, source_dir: &Path) -> Result<DepgraphConfig> {
        match &self.config {
            Some(path) => load_config_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(load_config(source_dir)?.unwrap_or_default()),
        }
    }

    /// CLI flag, then config file, then default.
    fn output_path(&self, config: &DepgraphConfig) -> PathBuf {
        self.output
            .clone()
            .or_else(|| config.output.dot.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    fn image_format(&self, config: &DepgraphConfig) -> ImageFormat {
        self.format.or(config.output.format).unwrap_or_default()
    }
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] depgraph internal error: {}", info);
    }));

    let cli = Cli::parse();
    init_structured_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Runs the pipeline; returns the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    let source_dir = cli
        .source_dir
        .canonicalize()
        .with_context(|| format!("Cannot read source directory {}", cli.source_dir.display()))?;

    let config = cli.load_config(&source_dir)?;
    let output = cli.output_path(&config);
    let format = cli.image_format(&config);
    let graphviz = config
        .output
        .graphviz
        .clone()
        .unwrap_or_else(|| DEFAULT_GRAPHVIZ.to_string());

    let result = Depgraph::new(&source_dir)
        .with_config(config)
        .check_redundancy(!cli.no_redundancy_check)
        .show_visibility(!cli.no_visibility)
        .analyze()
        .with_context(|| format!("Failed to analyze {}", source_dir.display()))?;

    if cli.verbose && !cli.json {
        for line in module_listing(&result.graph) {
            println!("{}", line);
        }
    }

    // Redundant dependencies are always reported when found
    if !cli.json {
        print_plain(result.redundant());
    }

    let dot = result.to_dot();
    fs::write(&output, &dot)
        .with_context(|| format!("Failed to write DOT output to {}", output.display()))?;

    if cli.json {
        print_json(&result);
    } else {
        println!("CMake dependency graph written to {}", output.display());
        println!("{}", summary_line(&result.graph));
    }

    let Some(image) = &cli.image else {
        return Ok(0);
    };

    match render_image(&graphviz, &output, image, format) {
        Ok(()) => {
            log_info(&format!("image generated: {}", image.display()));
            if !cli.json {
                println!("Image generated: {}", image.display());
            }
            Ok(0)
        }
        Err(e) => {
            // The DOT file is already written; only the image step failed
            log_warn(&e.to_string());
            eprintln!("[WARN] Failed to generate image: {}", e);
            Ok(1)
        }
    }
}
