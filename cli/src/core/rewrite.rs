//! # Dunder File Rewrite Pass
//!
//! File: cli/src/core/rewrite.rs
//!
//! Applies header rewriting and plain token substitution to the lines of one
//! file. The number and order of lines never change, and every line keeps its
//! original terminator (`\n`, `\r\n`, or none for a final unterminated line).
//!
use crate::core::header::HeaderRules;
use crate::core::tokens::TokenMap;

/// Which stages of the pass are enabled for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteScope {
    pub headers: bool,
    pub text: bool,
}

impl RewriteScope {
    pub const ALL: Self = Self {
        headers: true,
        text: true,
    };

    pub fn is_noop(&self) -> bool {
        !self.headers && !self.text
    }
}

impl Default for RewriteScope {
    fn default() -> Self {
        Self::ALL
    }
}

/// Rewrites one line body (no terminator).
pub fn rewrite_line(
    line: &str,
    tokens: &TokenMap,
    rules: &HeaderRules,
    scope: RewriteScope,
) -> String {
    if scope.headers {
        if let Some(rewritten) = rules.rewrite_line(line, tokens) {
            return rewritten;
        }
    }
    if scope.text {
        tokens.substitute(line)
    } else {
        line.to_string()
    }
}

/// Rewrites a sequence of line bodies. The output has the same length and order.
pub fn rewrite_lines<S: AsRef<str>>(
    lines: &[S],
    tokens: &TokenMap,
    rules: &HeaderRules,
    scope: RewriteScope,
) -> Vec<String> {
    lines
        .iter()
        .map(|line| rewrite_line(line.as_ref(), tokens, rules, scope))
        .collect()
}

/// Splits a line into its body and terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrites whole file contents, preserving every line terminator.
pub fn rewrite_text(
    content: &str,
    tokens: &TokenMap,
    rules: &HeaderRules,
    scope: RewriteScope,
) -> String {
    let (bodies, terminators): (Vec<&str>, Vec<&str>) =
        content.split_inclusive('\n').map(split_terminator).unzip();
    let mut out = String::with_capacity(content.len());
    for (body, terminator) in rewrite_lines(&bodies, tokens, rules, scope)
        .iter()
        .zip(terminators)
    {
        out.push_str(body);
        out.push_str(terminator);
    }
    out
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::header::HeaderDescriptor;

    fn setup() -> (TokenMap, HeaderRules) {
        let tokens =
            TokenMap::from_pairs([("__NAME__", "Foo"), ("__VERSION__", "0.1.0")]).unwrap();
        let rules = HeaderRules::new(&[
            HeaderDescriptor::new("Project :", "__NAME__", "/    \\"),
            HeaderDescriptor::new("Version :", "__VERSION__", "|    |"),
        ])
        .unwrap();
        (tokens, rules)
    }

    const SOURCE: &str = "\
# Project : __NAME__              /    \\
# Version : __VERSION__           |    |

import __NAME__\r
print(__NAME__.__version__)";

    #[test]
    fn test_rewrite_text_headers_and_body() {
        let (tokens, rules) = setup();
        let out = rewrite_text(SOURCE, &tokens, &rules, RewriteScope::ALL);
        let expected = "\
# Project : Foo                   /    \\
# Version : 0.1.0                 |    |

import Foo\r
print(Foo.__version__)";
        assert_eq!(out, expected);
        assert_eq!(out.lines().count(), SOURCE.lines().count());
    }

    #[test]
    fn test_rewrite_is_idempotent_without_tokens() {
        let (tokens, rules) = setup();
        let once = rewrite_text(SOURCE, &tokens, &rules, RewriteScope::ALL);
        let twice = rewrite_text(&once, &tokens, &rules, RewriteScope::ALL);
        assert_eq!(once, twice);

        let plain = "no tokens\r\nat all\n\n";
        assert_eq!(
            rewrite_text(plain, &tokens, &rules, RewriteScope::ALL),
            plain
        );
    }

    #[test]
    fn test_headers_only_scope() {
        let (tokens, rules) = setup();
        let scope = RewriteScope {
            headers: true,
            text: false,
        };
        let out = rewrite_text(SOURCE, &tokens, &rules, scope);
        assert!(out.starts_with("# Project : Foo "));
        assert!(out.contains("import __NAME__\r\n"));
    }

    #[test]
    fn test_text_only_scope_substitutes_header_plainly() {
        let (tokens, rules) = setup();
        let scope = RewriteScope {
            headers: false,
            text: true,
        };
        let out = rewrite_text(SOURCE, &tokens, &rules, scope);
        // Plain substitution does not realign the decoration.
        assert!(out.starts_with("# Project : Foo              /    \\\n"));
        assert!(out.contains("import Foo\r\n"));
    }

    #[test]
    fn test_rewrite_lines_keeps_count_and_order() {
        let (tokens, rules) = setup();
        let lines = vec!["a __NAME__", "b", "c __VERSION__"];
        let out = rewrite_lines(&lines, &tokens, &rules, RewriteScope::ALL);
        assert_eq!(out, vec!["a Foo", "b", "c 0.1.0"]);
    }

    #[test]
    fn test_noop_scope() {
        let (tokens, rules) = setup();
        let scope = RewriteScope {
            headers: false,
            text: false,
        };
        assert!(scope.is_noop());
        assert_eq!(rewrite_text(SOURCE, &tokens, &rules, scope), SOURCE);
    }
}
