//! Structured error types for grammar construction, lexing, and parsing.
use itertools::Itertools as _;
use thiserror::Error;

/// Raised at table-construction time; always a developer error, never
/// retried (§7).
#[derive(Error, Debug, Clone)]
pub enum GrammarError {
    #[error("unknown symbol `{0}`: no rule declares it")]
    UnknownSymbol(String),

    #[error("a rule named `{0}` is already declared")]
    DuplicateRuleName(String),

    #[error("no start symbol was set; call `Grammar::start(..)` before parsing")]
    MissingStart,

    #[error(
        "reduce/reduce conflict: both {a} and {b} are complete at the same state; \
         rewrite the grammar to disambiguate"
    )]
    ReduceReduceConflict { a: String, b: String },

    #[error("invalid regex pattern for terminal `{name}`: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Raised by the lexer when no terminal matches at the cursor and input
/// remains (§7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unconsumed input at line {line}: `{}`", excerpt(remaining))]
pub struct UnconsumedInputError {
    pub line: usize,
    pub offset: usize,
    pub remaining: String,
}

fn excerpt(s: &str) -> String {
    const MAX: usize = 40;
    if s.len() <= MAX {
        s.to_owned()
    } else {
        format!("{}...", &s[..MAX])
    }
}

/// Raised by the driver on a missing table action, a missing post-reduce
/// GOTO, or a NONASSOC guard firing (§7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub expected: Vec<String>,
    pub received: String,
}

impl ParseError {
    /// Builds the human-readable message: a one-line summary followed by a
    /// source excerpt with a caret under the offending character (§4.6).
    pub fn new(
        source: &str,
        offset: usize,
        line: usize,
        expected: Vec<String>,
        received: String,
    ) -> Self {
        let summary = if expected.is_empty() {
            format!("unexpected `{received}` at line {line}")
        } else {
            format!(
                "unexpected `{received}` at line {line}, expected one of: {}",
                expected.iter().join(", ")
            )
        };
        let message = format!("{summary}\n{}", render_excerpt(source, offset));
        Self {
            message,
            line,
            expected,
            received,
        }
    }

    pub fn non_associative(
        source: &str,
        offset: usize,
        line: usize,
        symbol: String,
    ) -> Self {
        let message = format!(
            "`{symbol}` is non-associative and cannot be chained at line {line}\n{}",
            render_excerpt(source, offset)
        );
        Self {
            message,
            line,
            expected: vec![],
            received: symbol,
        }
    }
}

/// Renders the line containing `offset`, with a caret under the offending
/// column, eliding far-away context on either side (§4.6).
fn render_excerpt(source: &str, offset: usize) -> String {
    let offset = offset.min(source.len());
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len());
    let line = &source[line_start..line_end];
    let col = offset - line_start;

    const CONTEXT: usize = 5;
    let (visible_start, lead_elided) = if col > CONTEXT {
        (col - CONTEXT, true)
    } else {
        (0, false)
    };
    let tail_len = line.len().saturating_sub(col);
    let (visible_end, tail_elided) = if tail_len > CONTEXT {
        (col + CONTEXT, true)
    } else {
        (line.len(), false)
    };

    let mut rendered = String::new();
    if lead_elided {
        rendered.push_str("... ");
    }
    rendered.push_str(&line[visible_start..visible_end]);
    if tail_elided {
        rendered.push_str(" ...");
    }

    let caret_pos = (col - visible_start) + if lead_elided { 4 } else { 0 };
    let caret_line = format!("{}^", " ".repeat(caret_pos));
    format!("{rendered}\n{caret_line}")
}

/// The crate-wide error type: any failure a grammar build or a parse can
/// produce.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    UnconsumedInput(#[from] UnconsumedInputError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("internal error: {0} (this indicates a malformed parse table)")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_offending_column() {
        let err = ParseError::new("a + b", 2, 1, vec!["term".into()], "+".into());
        let caret_line = err.message.lines().last().unwrap();
        assert_eq!(caret_line.find('^'), Some(2));
    }

    #[test]
    fn long_lines_get_elided_context() {
        let source = format!("{}X{}", "a".repeat(20), "b".repeat(20));
        let err = ParseError::new(&source, 20, 1, vec![], "X".into());
        assert!(err.message.contains("..."));
    }
}
