//! Image rendering through the external Graphviz `dot` program.
//!
//! Failures here never invalidate the DOT file that was already written;
//! callers report them as warnings.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::config::ImageFormat;
use crate::error::{DepgraphError, DepgraphResult};

/// Default Graphviz program.
pub const DEFAULT_GRAPHVIZ: &str = "dot";

/// Runs `<program> -T<format> <dot_file> -o <image>`.
pub fn render_image(
    program: &str,
    dot_file: &Path,
    image: &Path,
    format: ImageFormat,
) -> DepgraphResult<()> {
    debug!(
        program = %program,
        dot = %dot_file.display(),
        image = %image.display(),
        format = %format,
        "rendering image"
    );

    let output = Command::new(program)
        .arg(format!("-T{}", format))
        .arg(dot_file)
        .arg("-o")
        .arg(image)
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => DepgraphError::render(format!(
                "Graphviz '{}' command not found. Please install Graphviz.",
                program
            )),
            _ => DepgraphError::render(format!("failed to run '{}': {}", program, e)),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DepgraphError::render(format!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_reports_not_found() {
        let err = render_image(
            "depgraph-no-such-graphviz-binary",
            Path::new("graph.dot"),
            Path::new("graph.png"),
            ImageFormat::Png,
        )
        .unwrap_err();

        assert!(err.is_recoverable());
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_reports_status() {
        // `false` ignores its arguments and exits with status 1
        let err = render_image(
            "false",
            Path::new("graph.dot"),
            Path::new("graph.svg"),
            ImageFormat::Svg,
        )
        .unwrap_err();

        assert!(matches!(err, DepgraphError::Render { .. }));
        assert!(err.to_string().contains("exited with"));
    }
}
