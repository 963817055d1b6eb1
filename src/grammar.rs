//! The grammar builder and its two parse entry points.
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, GrammarError};
use crate::lexer::Token;
use crate::rule::{Associativity, Component, ReduceAction, Rule, RuleId};
use crate::ruleset::RuleSet;
use crate::symbol::Symbol;
use crate::table::{self, StateId, Table};
use crate::value::Value;

type ErrorHook = dyn Fn(StateId, &Token, &str) -> Option<Token>;

/// A grammar under construction, and, once `start` is set and `parse` has
/// run once, a cache of the table it compiles to.
///
/// RuleSets and Rules are meant to be declared once, up front; mutating a
/// `Grammar` after the first `parse`/`parse_from` call will not be seen by
/// the cached table for the default start symbol (§5, §9).
pub struct Grammar {
    rules: Vec<Rule>,
    rulesets: HashMap<Symbol, RuleSet>,
    terminal_order: Vec<RuleId>,
    start: Option<Symbol>,
    on_error: Option<Rc<ErrorHook>>,
    table: OnceLock<Result<Rc<Table>, GrammarError>>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            rulesets: HashMap::new(),
            terminal_order: Vec::new(),
            start: None,
            on_error: None,
            table: OnceLock::new(),
        }
    }

    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn terminal_order(&self) -> &[RuleId] {
        &self.terminal_order
    }

    pub(crate) fn on_error_hook(&self) -> Option<&Rc<ErrorHook>> {
        self.on_error.as_ref()
    }

    /// Declares a literal-text terminal, e.g. `"+"` or `"while"`.
    pub fn literal(&mut self, text: &str) -> Result<TerminalHandle<'_>, GrammarError> {
        self.declare_terminal(Symbol::new(text), Component::Literal(text.to_owned()))
    }

    /// Declares a regex-backed terminal. The pattern is implicitly
    /// anchored at the match position; it is never matched mid-string.
    pub fn terminal(&mut self, name: &str, pattern: &str) -> Result<TerminalHandle<'_>, GrammarError> {
        let anchored = format!("^(?:{pattern})");
        let re = Regex::new(&anchored).map_err(|source| GrammarError::InvalidPattern {
            name: name.to_owned(),
            source,
        })?;
        self.declare_terminal(Symbol::new(name), Component::Pattern(Rc::new(re)))
    }

    fn declare_terminal(
        &mut self,
        name: Symbol,
        component: Component,
    ) -> Result<TerminalHandle<'_>, GrammarError> {
        if self.rulesets.contains_key(&name) {
            return Err(GrammarError::DuplicateRuleName(name.name().to_owned()));
        }
        let rule_id = self.rules.len();
        self.rules.push(Rule {
            id: rule_id,
            name: name.clone(),
            components: vec![component],
            action: ReduceAction::Identity,
            precedence: 0,
            associativity: Associativity::default(),
        });
        let mut rs = RuleSet::new(name.clone());
        rs.rule_ids.push(rule_id);
        self.rulesets.insert(name, rs);
        self.terminal_order.push(rule_id);
        Ok(TerminalHandle {
            grammar: self,
            rule_id,
        })
    }

    /// Begins (or resumes) declaring alternatives for the nonterminal
    /// named `name`. Calling this more than once for the same name
    /// accumulates alternatives into the same RuleSet.
    pub fn rule(&mut self, name: &str) -> NonTerminalBuilder<'_> {
        let sym = Symbol::new(name);
        self.rulesets
            .entry(sym.clone())
            .or_insert_with(|| RuleSet::new(sym.clone()));
        NonTerminalBuilder {
            grammar: self,
            name: sym,
        }
    }

    /// Sets the symbol `parse` builds its table against.
    pub fn start(&mut self, name: &str) -> &mut Self {
        self.start = Some(Symbol::new(name));
        self
    }

    /// Registers an error-recovery hook invoked when the driver has no
    /// table action for the current token: given the state the driver was
    /// in, the offending token, and the full source, it may return a
    /// substitute token to retry with once, or `None` to let the
    /// `ParseError` propagate unchanged.
    pub fn on_error<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(StateId, &Token, &str) -> Option<Token> + 'static,
    {
        self.on_error = Some(Rc::new(f));
        self
    }

    /// Parses `input` against the symbol set by `start`, building and
    /// memoizing the table on first call.
    pub fn parse(&self, input: &str) -> Result<Value, Error> {
        let start = self.start.clone().ok_or(GrammarError::MissingStart)?;
        let cached = self
            .table
            .get_or_init(|| table::build(&self.rules, &self.rulesets, &start).map(Rc::new));
        let table = cached.clone().map_err(Error::Grammar)?;
        crate::parser::run(self, &table, input)
    }

    /// Parses `input` against an explicitly named start symbol, building a
    /// fresh table every call. Intended as a development aid for probing a
    /// grammar's sub-rules, not the hot path (§6).
    pub fn parse_from(&self, input: &str, start: &str) -> Result<Value, Error> {
        let start = Symbol::new(start);
        let table = table::build(&self.rules, &self.rulesets, &start).map_err(Error::Grammar)?;
        crate::parser::run(self, &table, input)
    }

    /// Renders the synthesized parse table for `start`, for debugging a
    /// grammar that rejects input you didn't expect it to. Builds a fresh
    /// table rather than touching the memoized one.
    #[cfg(feature = "debug-table")]
    pub fn debug_table(&self, start: &str) -> Result<String, GrammarError> {
        let start = Symbol::new(start);
        let table = table::build(&self.rules, &self.rulesets, &start)?;
        Ok(table.to_string())
    }
}

/// A handle to a just-declared terminal rule, for chaining `.action`,
/// `.discard`, `.precedence`, `.associativity`.
pub struct TerminalHandle<'g> {
    grammar: &'g mut Grammar,
    rule_id: RuleId,
}

impl<'g> TerminalHandle<'g> {
    pub fn action<F>(self, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + 'static,
    {
        self.grammar.rules[self.rule_id].action = ReduceAction::Custom(Rc::new(f));
        self
    }

    /// Marks this terminal as skipped by the lexer (never reaches the
    /// parser's value stack). Typical for whitespace and comments.
    pub fn discard(self) -> Self {
        self.grammar.rules[self.rule_id].action = ReduceAction::Discard;
        self
    }

    pub fn precedence(self, p: u32) -> Self {
        self.grammar.rules[self.rule_id].precedence = p;
        self
    }

    pub fn associativity(self, a: Associativity) -> Self {
        self.grammar.rules[self.rule_id].associativity = a;
        self
    }
}

/// Accumulates alternatives for one nonterminal name.
pub struct NonTerminalBuilder<'g> {
    grammar: &'g mut Grammar,
    name: Symbol,
}

impl<'g> NonTerminalBuilder<'g> {
    /// Adds one alternative production. Each element of `components` must
    /// name an already-declared RuleSet (terminal or nonterminal) — this
    /// isn't checked here since forward references across `.rule` calls
    /// are legal; an unresolved name surfaces as `GrammarError::UnknownSymbol`
    /// the first time the table is built.
    pub fn add(self, components: &[&str]) -> AlternativeHandle<'g> {
        let comps: Vec<Component> = components
            .iter()
            .map(|c| Component::Symbol(Symbol::new(*c)))
            .collect();
        let rule_id = self.grammar.rules.len();
        self.grammar.rules.push(Rule {
            id: rule_id,
            name: self.name.clone(),
            components: comps,
            action: ReduceAction::Identity,
            precedence: 0,
            associativity: Associativity::default(),
        });
        self.grammar
            .rulesets
            .get_mut(&self.name)
            .expect("ruleset was inserted by Grammar::rule")
            .rule_ids
            .push(rule_id);
        AlternativeHandle {
            grammar: self.grammar,
            rule_id,
        }
    }
}

/// A handle to a just-added nonterminal alternative, for chaining
/// `.action`.
pub struct AlternativeHandle<'g> {
    grammar: &'g mut Grammar,
    rule_id: RuleId,
}

impl<'g> AlternativeHandle<'g> {
    pub fn action<F>(self, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + 'static,
    {
        self.grammar.rules[self.rule_id].action = ReduceAction::Custom(Rc::new(f));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_start_is_a_grammar_error() {
        let g = Grammar::new();
        let err = g.parse("anything").unwrap_err();
        assert!(matches!(err, Error::Grammar(GrammarError::MissingStart)));
    }

    #[test]
    fn duplicate_terminal_name_is_rejected() {
        let mut g = Grammar::new();
        g.literal("+").unwrap();
        let err = g.literal("+").unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateRuleName(_)));
    }

    #[test]
    fn unresolved_reference_surfaces_at_table_build() {
        let mut g = Grammar::new();
        g.rule("sum").add(&["nope"]);
        g.start("sum");
        let err = g.parse("x").unwrap_err();
        assert!(matches!(err, Error::Grammar(GrammarError::UnknownSymbol(_))));
    }
}
