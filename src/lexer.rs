//! Longest-match scanning over a grammar's terminal RuleSets.
//!
//! Unlike a precompiled DFA, the lexer rescans every declared terminal at
//! the cursor on each call. This trades throughput for the ability to add
//! terminals to a grammar without recompiling a transition table — a fair
//! trade for a library whose whole point is building the table at runtime.
use crate::error::UnconsumedInputError;
use crate::grammar::Grammar;
use crate::rule::{Component, RuleId};
use crate::symbol::Symbol;

/// One lexical unit handed to the parser driver.
#[derive(Debug, Clone)]
pub struct Token {
    pub symbol: Symbol,
    pub text: String,
    pub offset: usize,
    pub line: usize,
    /// The terminal rule that produced this token, so the driver can run
    /// its reduction action on the matched text. `None` for the `<end>`
    /// sentinel, which has no backing rule.
    pub(crate) rule_id: Option<RuleId>,
}

impl Token {
    /// Builds a token for an `on_error` hook to hand back as a substitute.
    /// It carries no backing rule, so the driver pushes its text verbatim
    /// as a `Value::Str` rather than running a reduction action on it.
    pub fn new(symbol: Symbol, text: impl Into<String>, offset: usize, line: usize) -> Self {
        Self {
            symbol,
            text: text.into(),
            offset,
            line,
            rule_id: None,
        }
    }
}

/// Scans `source` against a grammar's terminal RuleSets, in declaration
/// order, yielding the longest match at each position and breaking ties
/// in favor of whichever terminal was declared first.
pub struct Lexer<'g> {
    grammar: &'g Grammar,
    source: &'g str,
    cursor: usize,
    line: usize,
}

impl<'g> Lexer<'g> {
    pub fn new(grammar: &'g Grammar, source: &'g str) -> Self {
        Self {
            grammar,
            source,
            cursor: 0,
            line: 1,
        }
    }

    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the next non-discarded token, or the `<end>` sentinel once
    /// the cursor reaches the end of input. Idempotent at end-of-input:
    /// calling it again keeps returning `<end>`.
    pub fn next_token(&mut self) -> Result<Token, UnconsumedInputError> {
        loop {
            if self.cursor >= self.source.len() {
                return Ok(Token {
                    symbol: Symbol::end(),
                    text: String::new(),
                    offset: self.cursor,
                    line: self.line,
                    rule_id: None,
                });
            }

            let start_offset = self.cursor;
            let start_line = self.line;
            let remaining = &self.source[self.cursor..];

            let mut best: Option<(usize, usize)> = None; // (match_len, rule_id)
            for rule_id in self.grammar.terminal_order() {
                let rule = &self.grammar.rules()[*rule_id];
                let matched_len = match &rule.components[0] {
                    Component::Literal(lit) => {
                        if remaining.starts_with(lit.as_str()) {
                            Some(lit.len())
                        } else {
                            None
                        }
                    }
                    Component::Pattern(re) => re.find(remaining).filter(|m| m.start() == 0).map(|m| m.end()),
                    Component::Symbol(_) => None,
                };
                if let Some(len) = matched_len {
                    // zero-length matches would spin forever; a pattern
                    // that can match empty input is a grammar bug.
                    if len == 0 {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((best_len, _)) => len > best_len,
                    };
                    if better {
                        best = Some((len, *rule_id));
                    }
                }
            }

            let Some((len, rule_id)) = best else {
                return Err(UnconsumedInputError {
                    line: self.line,
                    offset: self.cursor,
                    remaining: remaining.to_string(),
                });
            };

            let text = &remaining[..len];
            let newlines = text.matches('\n').count();
            self.line += newlines;
            self.cursor += len;

            let rule = &self.grammar.rules()[rule_id];
            if rule.action.is_discard() {
                continue;
            }

            return Ok(Token {
                symbol: rule.name.clone(),
                text: text.to_string(),
                offset: start_offset,
                line: start_line,
                rule_id: Some(rule_id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn arithmetic() -> Grammar {
        let mut g = Grammar::new();
        g.literal("+").unwrap();
        g.terminal("int", r"[0-9]+").unwrap();
        g.terminal("ws", r"[ \t]+").unwrap().discard();
        g.rule("sum").add(&["int", "+", "int"]);
        g.start("sum");
        g
    }

    #[test]
    fn longest_match_wins_over_shorter_prefix() {
        let g = arithmetic();
        let mut lexer = Lexer::new(&g, "12 + 3");
        let t1 = lexer.next_token().unwrap();
        assert_eq!(t1.text, "12");
        assert_eq!(t1.symbol.name(), "int");
        let t2 = lexer.next_token().unwrap();
        assert_eq!(t2.symbol.name(), "+");
        let t3 = lexer.next_token().unwrap();
        assert_eq!(t3.text, "3");
    }

    #[test]
    fn whitespace_is_discarded_silently() {
        let g = arithmetic();
        let mut lexer = Lexer::new(&g, "  12");
        let t = lexer.next_token().unwrap();
        assert_eq!(t.text, "12");
        assert_eq!(t.offset, 2);
    }

    #[test]
    fn unmatched_input_is_an_error() {
        let g = arithmetic();
        let mut lexer = Lexer::new(&g, "12 @ 3");
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.remaining, "@ 3");
    }

    #[test]
    fn end_sentinel_is_idempotent() {
        let g = arithmetic();
        let mut lexer = Lexer::new(&g, "1");
        lexer.next_token().unwrap();
        assert!(lexer.next_token().unwrap().symbol.is_end());
        assert!(lexer.next_token().unwrap().symbol.is_end());
    }
}
