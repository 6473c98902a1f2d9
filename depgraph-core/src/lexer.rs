//! Flat tokenizer for CMake declaration files.
//!
//! The declaration parser never looks at raw text: it consumes the token
//! stream produced here, grouped into [`Command`]s. Only the subset of the
//! CMake grammar needed to find commands and their argument lines is
//! understood:
//!
//! - `# line comments` and `#[[ bracket comments ]]` are dropped
//! - `"quoted arguments"` become a single word (without quotes)
//! - whitespace and commas separate words
//! - newlines are kept, since visibility rules are line-oriented

/// A single lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    OpenParen,
    CloseParen,
    Newline,
}

/// Splits declaration text into a flat token stream.
///
/// Never fails: unterminated quotes or bracket comments run to the end of
/// the input.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                tokens.push(Token::Newline);
                i += 1;
            }
            b'(' => {
                tokens.push(Token::OpenParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::CloseParen);
                i += 1;
            }
            b'#' => {
                i = skip_comment(text, i);
            }
            b'"' => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'"' {
                    // Skip escaped characters, including escaped quotes
                    end += if bytes[end] == b'\\' { 2 } else { 1 };
                }
                let end = end.min(bytes.len());
                tokens.push(Token::Word(&text[start..end]));
                i = end + 1;
            }
            b if is_separator(b) => {
                i += 1;
            }
            _ => {
                let start = i;
                while i < bytes.len() && !is_word_boundary(bytes[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(&text[start..i]));
            }
        }
    }

    tokens
}

#[inline]
fn is_separator(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b',')
}

#[inline]
fn is_word_boundary(b: u8) -> bool {
    is_separator(b) || matches!(b, b'\n' | b'(' | b')' | b'"' | b'#')
}

/// Returns the index just past a comment starting at `start` (a `#`).
///
/// Line comments stop before the newline so the line structure survives.
fn skip_comment(text: &str, start: usize) -> usize {
    let rest = &text[start + 1..];

    // Bracket comment: #[[ ... ]] or #[=[ ... ]=]
    if let Some(open) = rest.strip_prefix('[') {
        let equals = open.bytes().take_while(|&b| b == b'=').count();
        if open[equals..].starts_with('[') {
            let close = format!("]{}]", "=".repeat(equals));
            let body_start = start + 1 + 1 + equals + 1;
            return match text[body_start..].find(&close) {
                Some(offset) => body_start + offset + close.len(),
                None => text.len(),
            };
        }
    }

    match rest.find('\n') {
        Some(offset) => start + 1 + offset,
        None => text.len(),
    }
}

/// A command invocation: `name(args...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    /// Tokens between the outer parentheses. Nested parentheses are kept.
    pub args: Vec<Token<'a>>,
}

impl<'a> Command<'a> {
    /// Case-insensitive command name comparison (CMake semantics).
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First word argument, if any.
    pub fn first_word(&self) -> Option<&'a str> {
        self.args.iter().find_map(|t| match t {
            Token::Word(w) => Some(*w),
            _ => None,
        })
    }

    /// Argument lines after the first word argument.
    ///
    /// Words following the first argument on its own line form the first
    /// line. Nested parentheses are dropped; empty lines are skipped.
    pub fn lines_after_first(&self) -> Vec<Vec<&'a str>> {
        let mut lines = Vec::new();
        let mut current = Vec::new();
        let mut seen_first = false;

        for token in &self.args {
            match token {
                Token::Word(_) if !seen_first => seen_first = true,
                Token::Word(w) => current.push(*w),
                Token::Newline => {
                    if !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                    }
                }
                Token::OpenParen | Token::CloseParen => {}
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }

        lines
    }
}

/// Groups a token stream into commands.
///
/// A command is a word followed (possibly after newlines) by `(`. Stray
/// tokens outside any command are ignored. An unterminated command takes
/// the rest of the stream.
pub fn commands<'a>(tokens: &[Token<'a>]) -> Vec<Command<'a>> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let Token::Word(name) = tokens[i] else {
            i += 1;
            continue;
        };

        let mut j = i + 1;
        while j < tokens.len() && tokens[j] == Token::Newline {
            j += 1;
        }
        if j >= tokens.len() || tokens[j] != Token::OpenParen {
            i += 1;
            continue;
        }

        let mut depth = 1usize;
        let mut k = j + 1;
        let mut args = Vec::new();
        while k < tokens.len() {
            match tokens[k] {
                Token::OpenParen => depth += 1,
                Token::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            args.push(tokens[k]);
            k += 1;
        }

        out.push(Command { name, args });
        i = k + 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use Token::*;

    #[test]
    fn test_tokenize_simple_command() {
        let tokens = tokenize("project(aphrodite)\n");
        assert_eq!(
            tokens,
            vec![Word("project"), OpenParen, Word("aphrodite"), CloseParen, Newline]
        );
    }

    #[test]
    fn test_tokenize_commas_and_tabs() {
        let tokens = tokenize("aph-a,aph-b\taph-c");
        assert_eq!(tokens, vec![Word("aph-a"), Word("aph-b"), Word("aph-c")]);
    }

    #[test]
    fn test_tokenize_drops_line_comment_keeps_newline() {
        let tokens = tokenize("aph-a # aph-b (\naph-c");
        assert_eq!(tokens, vec![Word("aph-a"), Newline, Word("aph-c")]);
    }

    #[test]
    fn test_tokenize_bracket_comment() {
        let tokens = tokenize("a #[[ b )\n c ]] d #[==[ e ]==] f");
        assert_eq!(tokens, vec![Word("a"), Word("d"), Word("f")]);
    }

    #[test]
    fn test_tokenize_quoted_word() {
        let tokens = tokenize(r#"set(X "a b" "c\"d")"#);
        assert_eq!(
            tokens,
            vec![Word("set"), OpenParen, Word("X"), Word("a b"), Word(r#"c\"d"#), CloseParen]
        );
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        let tokens = tokenize("x \"open");
        assert_eq!(tokens, vec![Word("x"), Word("open")]);
    }

    #[test]
    fn test_commands_with_nested_parens_and_space() {
        let tokens = tokenize("if (A)\nendif()\nfoo (bar (baz) qux)\n");
        let cmds = commands(&tokens);
        let names: Vec<_> = cmds.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["if", "endif", "foo"]);
        assert_eq!(cmds[2].args.len(), 5);
    }

    #[test]
    fn test_command_is_case_insensitive() {
        let tokens = tokenize("TARGET_LINK_LIBRARIES(aph-core)");
        let cmds = commands(&tokens);
        assert!(cmds[0].is("target_link_libraries"));
        assert_eq!(cmds[0].first_word(), Some("aph-core"));
    }

    #[test]
    fn test_lines_after_first() {
        let tokens = tokenize("target_link_libraries(aph-core PUBLIC aph-a\n\n  PRIVATE\n  aph-b aph-c\n)");
        let cmds = commands(&tokens);
        assert_eq!(
            cmds[0].lines_after_first(),
            vec![vec!["PUBLIC", "aph-a"], vec!["PRIVATE"], vec!["aph-b", "aph-c"]]
        );
    }

    #[test]
    fn test_unterminated_command_takes_rest() {
        let tokens = tokenize("target_link_libraries(aph-core\n aph-a\n");
        let cmds = commands(&tokens);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].lines_after_first(), vec![vec!["aph-a"]]);
    }
}
