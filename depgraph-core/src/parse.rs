//! Declaration parsing - extracts one module and its linked dependencies
//! from a single `CMakeLists.txt`.
//!
//! Parsing is permissive: anything that is not understood is skipped, and a
//! file without a target declaration simply yields no module. Only I/O is
//! able to fail.
//!
//! Visibility inside a `target_link_libraries` block is tracked by
//! [`ScanState`]:
//!
//! ```text
//! target_link_libraries(aph-core
//!     aph-log                 # no context yet -> default (PRIVATE)
//!     PUBLIC                  # standalone keyword -> InPublicBlock
//!     aph-util                # PUBLIC
//!     PRIVATE aph-gfx         # inline keyword -> PRIVATE for this line only
//!     aph-math                # still PUBLIC
//! )
//! ```

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::NamingConvention;
use crate::error::{DepgraphResult, IoResultExt};
use crate::lexer::{commands, tokenize, Command};

/// Command whose blocks carry the link dependencies.
const LINK_COMMAND: &str = "target_link_libraries";

/// Visibility qualifier of a link dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    Public,
    Private,
    Interface,
}

impl Visibility {
    /// Parses an exact, upper-case visibility keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "PUBLIC" => Some(Self::Public),
            "PRIVATE" => Some(Self::Private),
            "INTERFACE" => Some(Self::Interface),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::Interface => "INTERFACE",
        }
    }

    /// Whether consumers of the depending module also see the dependency.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing edge of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    pub visibility: Visibility,
}

impl Dependency {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            visibility,
        }
    }
}

/// Result of parsing one declaration unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Public module name, e.g. `aphrodite::core`.
    pub module: String,
    /// True for the aggregate module parsed from the root file.
    pub is_root: bool,
    /// Dependencies in declaration order, duplicates included.
    pub dependencies: Vec<Dependency>,
}

/// Visibility context while scanning the lines of one link block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    NoContext,
    InPublicBlock,
    InPrivateBlock,
    InInterfaceBlock,
}

/// Classification of one argument line inside a link block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A visibility keyword alone on its line.
    Keyword(Visibility),
    /// A visibility keyword followed by tokens on the same line.
    Inline(Visibility, Vec<&'a str>),
    /// Tokens with no leading keyword.
    Items(Vec<&'a str>),
}

impl<'a> LineKind<'a> {
    pub fn classify(words: &[&'a str]) -> Option<Self> {
        let (first, rest) = words.split_first()?;
        Some(match Visibility::from_keyword(first) {
            Some(vis) if rest.is_empty() => Self::Keyword(vis),
            Some(vis) => Self::Inline(vis, rest.to_vec()),
            None => Self::Items(words.to_vec()),
        })
    }
}

impl ScanState {
    fn entered(vis: Visibility) -> Self {
        match vis {
            Visibility::Public => Self::InPublicBlock,
            Visibility::Private => Self::InPrivateBlock,
            Visibility::Interface => Self::InInterfaceBlock,
        }
    }

    /// Visibility of the current context, if any.
    pub fn visibility(self) -> Option<Visibility> {
        match self {
            Self::NoContext => None,
            Self::InPublicBlock => Some(Visibility::Public),
            Self::InPrivateBlock => Some(Visibility::Private),
            Self::InInterfaceBlock => Some(Visibility::Interface),
        }
    }

    /// Next state after consuming `line`.
    ///
    /// Only a standalone keyword line changes the context. An inline keyword
    /// applies to its own line and leaves the context untouched.
    pub fn transition(self, line: &LineKind<'_>) -> Self {
        match line {
            LineKind::Keyword(vis) => Self::entered(*vis),
            LineKind::Inline(..) | LineKind::Items(_) => self,
        }
    }

    /// Visibility given to the tokens of `line` while in this state.
    pub fn line_visibility(self, line: &LineKind<'_>, default: Visibility) -> Visibility {
        match line {
            LineKind::Inline(vis, _) => *vis,
            _ => self.visibility().unwrap_or(default),
        }
    }
}

/// Runs the state machine over one link block.
fn scan_block(
    cmd: &Command<'_>,
    default: Visibility,
    naming: &NamingConvention,
    out: &mut Vec<Dependency>,
) {
    let mut state = ScanState::NoContext;

    for words in cmd.lines_after_first() {
        let Some(line) = LineKind::classify(&words) else {
            continue;
        };

        let visibility = state.line_visibility(&line, default);
        let tokens: &[&str] = match &line {
            LineKind::Keyword(_) => &[],
            LineKind::Inline(_, tokens) | LineKind::Items(tokens) => tokens.as_slice(),
        };
        out.extend(
            tokens
                .iter()
                .filter_map(|t| naming.normalize(t))
                .map(|name| Dependency::new(name, visibility)),
        );

        state = state.transition(&line);
    }
}

/// Leading identifier characters of a setup argument (`\w+`).
fn short_name(arg: &str) -> Option<&str> {
    let end = arg
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(arg.len());
    (end > 0).then(|| &arg[..end])
}

/// Parses one declaration unit.
///
/// Returns `None` when a non-root unit declares no target.
pub fn parse_declaration(
    text: &str,
    is_root: bool,
    naming: &NamingConvention,
) -> Option<Declaration> {
    let tokens = tokenize(text);
    let cmds = commands(&tokens);
    let mut dependencies = Vec::new();

    if is_root {
        if let Some(block) = cmds
            .iter()
            .find(|c| c.is(LINK_COMMAND) && c.first_word() == Some(naming.root_target.as_str()))
        {
            scan_block(block, Visibility::Public, naming, &mut dependencies);
        }

        return Some(Declaration {
            module: naming.aggregate_name(),
            is_root: true,
            dependencies,
        });
    }

    let short = cmds
        .iter()
        .find(|c| c.is(&naming.setup_command))
        .and_then(|c| c.first_word())
        .and_then(short_name)?;
    let internal = naming.internal_name(short);

    for block in cmds
        .iter()
        .filter(|c| c.is(LINK_COMMAND) && c.first_word() == Some(internal.as_str()))
    {
        scan_block(block, Visibility::Private, naming, &mut dependencies);
    }

    Some(Declaration {
        module: naming.public_name(short),
        is_root: false,
        dependencies,
    })
}

/// Reads and parses a declaration file.
///
/// Invalid UTF-8 is replaced rather than rejected; only a failed read is an
/// error.
pub fn parse_declaration_file(
    path: &Path,
    is_root: bool,
    naming: &NamingConvention,
) -> DepgraphResult<Option<Declaration>> {
    let bytes = fs::read(path).with_path(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_declaration(&text, is_root, naming))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> NamingConvention {
        NamingConvention::default()
    }

    fn deps(decl: &Declaration) -> Vec<(&str, Visibility)> {
        decl.dependencies
            .iter()
            .map(|d| (d.name.as_str(), d.visibility))
            .collect()
    }

    #[test]
    fn test_state_transitions() {
        let keyword = LineKind::Keyword(Visibility::Interface);
        let inline = LineKind::Inline(Visibility::Public, vec!["aph-a"]);
        let items = LineKind::Items(vec!["aph-a"]);

        assert_eq!(ScanState::NoContext.transition(&keyword), ScanState::InInterfaceBlock);
        assert_eq!(ScanState::NoContext.transition(&inline), ScanState::NoContext);
        assert_eq!(ScanState::InPrivateBlock.transition(&inline), ScanState::InPrivateBlock);
        assert_eq!(ScanState::InPublicBlock.transition(&items), ScanState::InPublicBlock);
    }

    #[test]
    fn test_line_visibility() {
        let inline = LineKind::Inline(Visibility::Interface, vec!["aph-a"]);
        let items = LineKind::Items(vec!["aph-a"]);

        assert_eq!(
            ScanState::InPublicBlock.line_visibility(&inline, Visibility::Private),
            Visibility::Interface
        );
        assert_eq!(
            ScanState::NoContext.line_visibility(&items, Visibility::Private),
            Visibility::Private
        );
        assert_eq!(
            ScanState::InPublicBlock.line_visibility(&items, Visibility::Private),
            Visibility::Public
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(LineKind::classify(&[]), None);
        assert_eq!(
            LineKind::classify(&["PUBLIC"]),
            Some(LineKind::Keyword(Visibility::Public))
        );
        assert_eq!(
            LineKind::classify(&["PRIVATE", "aph-a", "aph-b"]),
            Some(LineKind::Inline(Visibility::Private, vec!["aph-a", "aph-b"]))
        );
        // Keywords are case-sensitive
        assert_eq!(
            LineKind::classify(&["public", "aph-a"]),
            Some(LineKind::Items(vec!["public", "aph-a"]))
        );
    }

    #[test]
    fn test_non_root_module_name() {
        let decl = parse_declaration("aph_setup_target(core)\n", false, &naming()).unwrap();
        assert_eq!(decl.module, "aphrodite::core");
        assert!(!decl.is_root);
        assert!(decl.dependencies.is_empty());
    }

    #[test]
    fn test_missing_setup_yields_none() {
        let text = "target_link_libraries(aph-core PUBLIC aph-util)\n";
        assert_eq!(parse_declaration(text, false, &naming()), None);
    }

    #[test]
    fn test_setup_name_takes_word_prefix() {
        let decl = parse_declaration("aph_setup_target(core-extra SHARED)", false, &naming()).unwrap();
        assert_eq!(decl.module, "aphrodite::core");
    }

    #[test]
    fn test_default_private_for_non_root() {
        let text = "aph_setup_target(core)\ntarget_link_libraries(aph-core\n    aph-util\n)\n";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(deps(&decl), vec![("aphrodite::util", Visibility::Private)]);
    }

    #[test]
    fn test_block_and_inline_visibility() {
        let text = r#"
aph_setup_target(core)

target_link_libraries(aph-core
    aph-log
    PUBLIC
        aph-util
    PRIVATE aph-gfx
        aph-math
    INTERFACE
        aphrodite::headers
)
"#;
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(
            deps(&decl),
            vec![
                ("aphrodite::log", Visibility::Private),
                ("aphrodite::util", Visibility::Public),
                ("aphrodite::gfx", Visibility::Private),
                ("aphrodite::math", Visibility::Public),
                ("aphrodite::headers", Visibility::Interface),
            ]
        );
    }

    #[test]
    fn test_inline_does_not_set_context() {
        let text = "aph_setup_target(core)\ntarget_link_libraries(aph-core\n  PUBLIC aph-a\n  aph-b\n)";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(
            deps(&decl),
            vec![
                ("aphrodite::a", Visibility::Public),
                ("aphrodite::b", Visibility::Private),
            ]
        );
    }

    #[test]
    fn test_single_line_block() {
        let text = "aph_setup_target(core)\ntarget_link_libraries(aph-core PUBLIC aph-a, aph-b)";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(
            deps(&decl),
            vec![
                ("aphrodite::a", Visibility::Public),
                ("aphrodite::b", Visibility::Public),
            ]
        );
    }

    #[test]
    fn test_foreign_tokens_dropped() {
        let text = "aph_setup_target(core)\ntarget_link_libraries(aph-core\n PUBLIC\n  glfw Vulkan::Vulkan ${EXTRA_LIBS} aph-util\n  pthread dl\n)";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(deps(&decl), vec![("aphrodite::util", Visibility::Public)]);
    }

    #[test]
    fn test_multiple_blocks_reset_context() {
        let text = "aph_setup_target(core)\n\
                    target_link_libraries(aph-core\n PUBLIC\n aph-a\n)\n\
                    target_link_libraries(aph-core\n aph-b\n)\n";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(
            deps(&decl),
            vec![
                ("aphrodite::a", Visibility::Public),
                ("aphrodite::b", Visibility::Private),
            ]
        );
    }

    #[test]
    fn test_blocks_for_other_targets_ignored() {
        let text = "aph_setup_target(core)\n\
                    target_link_libraries(aph-core-tests PUBLIC aph-a)\n\
                    target_link_libraries(aph-other PUBLIC aph-b)\n\
                    target_link_libraries(aph-core PRIVATE aph-c)\n";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(deps(&decl), vec![("aphrodite::c", Visibility::Private)]);
    }

    #[test]
    fn test_comments_ignored() {
        let text = "# aph_setup_target(fake)\naph_setup_target(core)\n\
                    target_link_libraries(aph-core\n  # PUBLIC\n  aph-a # aph-b\n)\n";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(decl.module, "aphrodite::core");
        assert_eq!(deps(&decl), vec![("aphrodite::a", Visibility::Private)]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let text = "aph_setup_target(core)\ntarget_link_libraries(aph-core PUBLIC aph-a aph-a)";
        let decl = parse_declaration(text, false, &naming()).unwrap();
        assert_eq!(decl.dependencies.len(), 2);
    }

    #[test]
    fn test_root_defaults_public() {
        let text = "add_library(aphrodite INTERFACE)\n\
                    target_link_libraries(aphrodite\n    aphrodite::core\n    aphrodite::util\n)\n";
        let decl = parse_declaration(text, true, &naming()).unwrap();
        assert_eq!(decl.module, "aphrodite::all");
        assert!(decl.is_root);
        assert_eq!(
            deps(&decl),
            vec![
                ("aphrodite::core", Visibility::Public),
                ("aphrodite::util", Visibility::Public),
            ]
        );
    }

    #[test]
    fn test_root_uses_first_block_only() {
        let text = "target_link_libraries(aphrodite INTERFACE aphrodite::core)\n\
                    target_link_libraries(aphrodite PUBLIC aphrodite::util)\n";
        let decl = parse_declaration(text, true, &naming()).unwrap();
        assert_eq!(deps(&decl), vec![("aphrodite::core", Visibility::Interface)]);
    }

    #[test]
    fn test_root_without_block_has_no_dependencies() {
        let decl = parse_declaration("project(aphrodite)\n", true, &naming()).unwrap();
        assert!(decl.dependencies.is_empty());
    }

    #[test]
    fn test_custom_naming() {
        let naming = NamingConvention {
            namespace: "hazel".to_string(),
            internal_prefix: "hz-".to_string(),
            setup_command: "hz_target".to_string(),
            ..NamingConvention::default()
        };
        let text = "hz_target(render)\ntarget_link_libraries(hz-render PUBLIC hz-core aph-core)";
        let decl = parse_declaration(text, false, &naming).unwrap();
        assert_eq!(decl.module, "hazel::render");
        assert_eq!(deps(&decl), vec![("hazel::core", Visibility::Public)]);
    }

    #[test]
    fn test_parse_file_tolerates_invalid_utf8() {
        let dir = std::env::temp_dir()
            .join("depgraph_parse_test")
            .join(format!("latin1_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("CMakeLists.txt");
        let mut content = b"# Copyright \xa9 2024\n".to_vec();
        content.extend_from_slice(b"aph_setup_target(gfx)\n");
        content.extend_from_slice(b"target_link_libraries(aph-gfx PUBLIC aph-core)\n");
        fs::write(&file, content).unwrap();

        let decl = parse_declaration_file(&file, false, &naming()).unwrap().unwrap();
        assert_eq!(decl.module, "aphrodite::gfx");
        assert_eq!(deps(&decl), vec![("aphrodite::core", Visibility::Public)]);
    }

    #[test]
    fn test_parse_file_read_failure_is_io_error() {
        // A directory cannot be read as a file, even with elevated privileges
        let dir = std::env::temp_dir()
            .join("depgraph_parse_test")
            .join(format!("dir_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let err = parse_declaration_file(&dir, false, &naming()).unwrap_err();
        assert!(matches!(err, crate::error::DepgraphError::Io { .. }));
        assert_eq!(err.path(), Some(&dir));
    }
}
