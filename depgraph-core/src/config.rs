//! Configuration loading from depgraph.toml.
//!
//! Every setting has a default matching the aphrodite project layout, so a
//! missing file is not an error. The loaded value is passed explicitly
//! through the pipeline.
//!
//! ```toml
//! [naming]
//! namespace = "aphrodite"
//! internal_prefix = "aph-"
//! setup_command = "aph_setup_target"
//! root_target = "aphrodite"
//! aggregate = "all"
//! declaration_file = "CMakeLists.txt"
//!
//! [scan]
//! exclude = [".git", "external"]
//!
//! [output]
//! dot = "docs/deps.dot"
//! format = "svg"
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DepgraphError, DepgraphResult, IoResultExt};

/// File name looked up in the source directory.
pub const CONFIG_FILE_NAME: &str = "depgraph.toml";

/// Main configuration structure for depgraph.toml.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DepgraphConfig {
    /// Project naming convention used to recognise targets.
    pub naming: NamingConvention,
    /// Directory walk settings.
    pub scan: ScanConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// How the project names its targets and declaration files.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConvention {
    /// Public namespace, e.g. `aphrodite` in `aphrodite::core`.
    pub namespace: String,
    /// Prefix of internal target names, e.g. `aph-` in `aph-core`.
    pub internal_prefix: String,
    /// Command declaring a module target, e.g. `aph_setup_target(core)`.
    pub setup_command: String,
    /// Target linked by the root declaration file.
    pub root_target: String,
    /// Suffix of the aggregate module name (`<namespace>::<aggregate>`).
    pub aggregate: String,
    /// Name of the declaration file looked up in each directory.
    pub declaration_file: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            namespace: "aphrodite".to_string(),
            internal_prefix: "aph-".to_string(),
            setup_command: "aph_setup_target".to_string(),
            root_target: "aphrodite".to_string(),
            aggregate: "all".to_string(),
            declaration_file: "CMakeLists.txt".to_string(),
        }
    }
}

impl NamingConvention {
    /// Name of the module representing the whole project.
    pub fn aggregate_name(&self) -> String {
        self.public_name(&self.aggregate)
    }

    /// `core` -> `aphrodite::core`
    pub fn public_name(&self, short: &str) -> String {
        format!("{}::{}", self.namespace, short)
    }

    /// `core` -> `aph-core`
    pub fn internal_name(&self, short: &str) -> String {
        format!("{}{}", self.internal_prefix, short)
    }

    /// Maps a link token to its public module name.
    ///
    /// Returns `None` for anything outside the project (system libraries,
    /// third-party targets, variables, keywords).
    pub fn normalize(&self, token: &str) -> Option<String> {
        if let Some(short) = token.strip_prefix(self.internal_prefix.as_str()) {
            if !short.is_empty() {
                return Some(self.public_name(short));
            }
            return None;
        }

        let public = token
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix("::"))?;
        (!public.is_empty()).then(|| token.to_string())
    }
}

/// Directory walk settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory names pruned from the walk.
    pub exclude: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: vec![".git".to_string()],
        }
    }
}

/// Output settings. CLI flags take precedence.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Path of the DOT file.
    pub dot: Option<PathBuf>,
    /// Image format passed to Graphviz.
    pub format: Option<ImageFormat>,
    /// Graphviz program used for image rendering (defaults to `dot`).
    pub graphviz: Option<String>,
}

/// Image formats supported by the external renderer.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
    Pdf,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = DepgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            other => Err(DepgraphError::invalid_argument(format!(
                "unsupported image format '{}' (expected png, svg or pdf)",
                other
            ))),
        }
    }
}

/// Loads configuration from `depgraph.toml` in `root` if it exists.
pub fn load_config(root: &Path) -> DepgraphResult<Option<DepgraphConfig>> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads configuration from an explicit file.
pub fn load_config_file(path: &Path) -> DepgraphResult<DepgraphConfig> {
    let content = fs::read_to_string(path).with_path(path)?;
    toml::from_str(&content).map_err(|e| DepgraphError::config(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_naming() {
        let naming = NamingConvention::default();
        assert_eq!(naming.aggregate_name(), "aphrodite::all");
        assert_eq!(naming.internal_name("core"), "aph-core");
        assert_eq!(naming.public_name("core"), "aphrodite::core");
    }

    #[test]
    fn test_normalize_internal_and_public() {
        let naming = NamingConvention::default();
        assert_eq!(naming.normalize("aph-util").as_deref(), Some("aphrodite::util"));
        assert_eq!(
            naming.normalize("aphrodite::util").as_deref(),
            Some("aphrodite::util")
        );
    }

    #[test]
    fn test_normalize_rejects_foreign_tokens() {
        let naming = NamingConvention::default();
        for token in [
            "pthread",
            "glfw",
            "Vulkan::Vulkan",
            "${LIBS}",
            "aph-",
            "aphrodite::",
            "aphroditex::a",
            "PUBLIC",
        ] {
            assert_eq!(naming.normalize(token), None, "token {token} should be dropped");
        }
    }

    #[test]
    fn test_parse_partial_config() {
        let cfg: DepgraphConfig = toml::from_str(
            r#"
            [naming]
            namespace = "hazel"
            internal_prefix = "hz-"

            [output]
            format = "svg"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.naming.namespace, "hazel");
        assert_eq!(cfg.naming.setup_command, "aph_setup_target");
        assert_eq!(cfg.naming.aggregate_name(), "hazel::all");
        assert_eq!(cfg.output.format, Some(ImageFormat::Svg));
        assert_eq!(cfg.scan.exclude, vec![".git".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parsed: Result<DepgraphConfig, _> = toml::from_str("[naming]\nprefix = \"x\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_image_format_from_str() {
        assert_eq!("SVG".parse::<ImageFormat>().unwrap(), ImageFormat::Svg);
        assert_eq!(ImageFormat::Pdf.to_string(), "pdf");
        assert!("gif".parse::<ImageFormat>().is_err());
    }
}
