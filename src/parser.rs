//! The shift/reduce/goto driver loop.
use log::{debug, trace};

use crate::error::{Error, ParseError};
use crate::grammar::Grammar;
use crate::lexer::Lexer;
use crate::table::{Action, Table};
use crate::value::Value;

/// Drives `table` over `input`, maintaining a state stack and a parallel
/// value stack, until an `Accept` action is reached (§4.4).
pub fn run(grammar: &Grammar, table: &Table, input: &str) -> Result<Value, Error> {
    let mut lexer = Lexer::new(grammar, input);
    let mut states: Vec<usize> = vec![0];
    let mut values: Vec<Value> = Vec::new();
    let mut lookahead = lexer.next_token()?;

    loop {
        let state = *states.last().expect("state stack is never empty");
        let action = table.action(state, &lookahead.symbol).cloned();

        let action = match action {
            Some(action) => action,
            None => {
                if let Some(hook) = grammar.on_error_hook() {
                    if let Some(substitute) = hook(state, &lookahead, input) {
                        debug!(
                            "on_error substituted `{}` for `{}` at line {}",
                            substitute.symbol, lookahead.symbol, lookahead.line
                        );
                        lookahead = substitute;
                        continue;
                    }
                }
                return Err(Error::Parse(ParseError::new(
                    input,
                    lookahead.offset,
                    lookahead.line,
                    table.expected(state),
                    lookahead.symbol.display_name(),
                )));
            }
        };

        trace!("state {state}, lookahead `{}` -> {action:?}", lookahead.symbol);

        match action {
            Action::Shift { next, .. } => {
                let value = match lookahead.rule_id {
                    Some(rule_id) => grammar.rules()[rule_id]
                        .action
                        .apply(vec![Value::Str(lookahead.text.clone())]),
                    None => Value::Str(lookahead.text.clone()),
                };
                values.push(value);
                states.push(next);
                lookahead = lexer.next_token()?;
            }
            Action::Reduce { rule, .. } => {
                let rule_ref = &grammar.rules()[rule];
                let arity = rule_ref.arity();
                let split_at = values.len() - arity;
                let args = values.split_off(split_at);
                states.truncate(states.len() - arity);
                let result = rule_ref.action.apply(args);
                values.push(result);
                let goto_from = *states.last().expect("state stack is never empty");
                match table.goto(goto_from, &rule_ref.name) {
                    Some(next) => states.push(next),
                    None => {
                        // The default-reduce mechanism has no follow-set
                        // awareness (§9): it can fire on a reduce that
                        // turns out not to lead anywhere. Report it as the
                        // shift/accept decision it should have failed at,
                        // not as an internal error (§4.4).
                        return Err(Error::Parse(ParseError::new(
                            input,
                            lookahead.offset,
                            lookahead.line,
                            table.expected(state),
                            lookahead.symbol.display_name(),
                        )));
                    }
                }
            }
            Action::Accept { rule } => {
                // Accept fires on the same complete item a Reduce would;
                // run the rule's action so a multi-component start
                // production (no synthetic <start> wrapper) still
                // combines its arguments instead of returning a stack top
                // that was never folded.
                let rule_ref = &grammar.rules()[rule];
                let arity = rule_ref.arity();
                let split_at = values.len() - arity;
                let args = values.split_off(split_at);
                return Ok(rule_ref.action.apply(args));
            }
            Action::Goto { .. } => {
                return Err(Error::Internal(
                    "GOTO action returned as a lookahead action; this is a table-builder bug".into(),
                ));
            }
            Action::NonAssocError => {
                return Err(Error::Parse(ParseError::non_associative(
                    input,
                    lookahead.offset,
                    lookahead.line,
                    lookahead.symbol.display_name(),
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::Grammar;
    use crate::rule::Associativity;
    use crate::value::Value;

    fn sum_grammar() -> Grammar {
        let mut g = Grammar::new();
        g.literal("+").unwrap().precedence(1).associativity(Associativity::Left);
        g.terminal("int", r"[0-9]+")
            .unwrap()
            .action(|args| Value::Int(args[0].as_str().unwrap().parse().unwrap()));
        g.terminal("ws", r"\s+").unwrap().discard();
        g.rule("sum")
            .add(&["sum", "+", "int"])
            .action(|args| Value::Int(args[0].as_int().unwrap() + args[2].as_int().unwrap()));
        g.rule("sum").add(&["int"]);
        g.start("sum");
        g
    }

    #[test]
    fn left_recursive_sum_folds_left_to_right() {
        let g = sum_grammar();
        let result = g.parse("1 + 2 + 3").unwrap();
        assert_eq!(result.as_int(), Some(6));
    }

    #[test]
    fn unexpected_token_is_a_parse_error() {
        let g = sum_grammar();
        let err = g.parse("1 +").unwrap_err();
        assert!(matches!(err, crate::error::Error::Parse(_)));
    }

    #[test]
    fn parse_from_probes_an_alternate_start_symbol() {
        let g = sum_grammar();
        let result = g.parse_from("42", "int").unwrap();
        assert_eq!(result.as_int(), Some(42));
    }
}
