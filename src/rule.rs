//! Productions: components, precedence/associativity, and reduction actions.
use std::rc::Rc;

use regex::Regex;

use crate::symbol::Symbol;
use crate::value::Value;

/// The rule's identifier within a grammar; stable for the grammar's lifetime.
pub type RuleId = usize;

/// Associativity of a terminal rule, used by the table builder to resolve
/// shift/reduce conflicts between two occurrences of the same precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    NonAssoc,
}

impl Default for Associativity {
    /// Right-associative is the data model's default.
    fn default() -> Self {
        Associativity::Right
    }
}

/// One element of a rule's right-hand side.
///
/// Nonterminal rules only ever hold `Symbol` components (a literal string
/// used inline in a nonterminal production, e.g. `sum = int "+" int`, is
/// just a name reference: it must already be declared as its own terminal
/// via `Grammar::literal` before the nonterminal referencing it is added,
/// since `NonTerminalBuilder::add` turns every component straight into a
/// `Symbol` with no lookup — an undeclared name surfaces as
/// `GrammarError::UnknownSymbol` when the table is built, not at `.add()`
/// time). `Pattern` and a bare `Literal` only ever appear as the sole
/// component of a terminal rule.
#[derive(Clone)]
pub enum Component {
    Symbol(Symbol),
    Literal(String),
    Pattern(Rc<Regex>),
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Component::Symbol(s) => write!(f, "{s}"),
            Component::Literal(s) => write!(f, "{s:?}"),
            Component::Pattern(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

/// The reduction action attached to a rule.
#[derive(Clone)]
pub enum ReduceAction {
    /// Return the sole argument unchanged (terminals), or `Value::List` when
    /// arity != 1 — the fallback default for nonterminal rules that never
    /// called `.action(..)`.
    Identity,
    /// The lexer skips this terminal; it never reaches the driver's value
    /// stack. Only meaningful on terminal rules.
    Discard,
    Custom(Rc<dyn Fn(Vec<Value>) -> Value>),
}

impl ReduceAction {
    pub fn apply(&self, args: Vec<Value>) -> Value {
        match self {
            ReduceAction::Identity => {
                if args.len() == 1 {
                    args.into_iter().next().unwrap()
                } else {
                    Value::List(args)
                }
            }
            ReduceAction::Discard => Value::Unit,
            ReduceAction::Custom(f) => f(args),
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, ReduceAction::Discard)
    }
}

impl std::fmt::Debug for ReduceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReduceAction::Identity => write!(f, "identity"),
            ReduceAction::Discard => write!(f, "discard"),
            ReduceAction::Custom(_) => write!(f, "custom"),
        }
    }
}

/// A single production: `name := components`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub name: Symbol,
    pub components: Vec<Component>,
    pub action: ReduceAction,
    pub precedence: u32,
    pub associativity: Associativity,
}

impl Rule {
    /// A rule is terminal iff it has exactly one component and that
    /// component is a literal or a regex pattern (not a symbol reference).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.components.as_slice(),
            [Component::Literal(_)] | [Component::Pattern(_)]
        )
    }

    pub fn arity(&self) -> usize {
        self.components.len()
    }

    /// Rendered as `<name> := [<components…>]`, used in reduce/reduce
    /// grammar error messages (§4.5).
    pub fn signature(&self) -> String {
        let comps = self
            .components
            .iter()
            .map(|c| format!("{c:?}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} := [{}]", self.name, comps)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(components: Vec<Component>) -> Rule {
        Rule {
            id: 0,
            name: Symbol::new("x"),
            components,
            action: ReduceAction::Identity,
            precedence: 0,
            associativity: Associativity::default(),
        }
    }

    #[test]
    fn single_literal_component_is_terminal() {
        assert!(rule(vec![Component::Literal("+".into())]).is_terminal());
    }

    #[test]
    fn symbol_sequence_is_nonterminal() {
        let r = rule(vec![
            Component::Symbol(Symbol::new("expr")),
            Component::Symbol(Symbol::new("expr")),
        ]);
        assert!(!r.is_terminal());
    }

    #[test]
    fn epsilon_rule_is_nonterminal_with_zero_arity() {
        assert_eq!(rule(vec![]).arity(), 0);
        assert!(!rule(vec![]).is_terminal());
    }

    #[test]
    fn identity_wraps_multiple_args_in_a_list() {
        let action = ReduceAction::Identity;
        let result = action.apply(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(result.as_list().map(|l| l.len()), Some(2));
    }
}
