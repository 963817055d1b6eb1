//! LR(0) shift/reduce/goto table construction.
//!
//! This builds the classical item-set automaton (closure + goto, states
//! deduplicated by canonical item-set content) but stops short of LALR(1)
//! lookahead: every state gets at most one "default reduce" applied under
//! any lookahead the state has no more specific action for. That is a
//! narrower automaton than a textbook LALR(1) table — two rules that would
//! be disambiguated by a real follow-set computation collide here as a
//! reduce/reduce conflict instead. Deliberate; see the design notes on the
//! table-memoization contract.
use std::collections::{BTreeSet, HashMap, VecDeque};

use itertools::Itertools as _;
use log::{debug, trace};

use crate::error::GrammarError;
use crate::rule::{Associativity, Component, Rule, RuleId};
use crate::ruleset::RuleSet;
use crate::symbol::Symbol;

pub type StateId = usize;

/// One entry in a state's action row.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Shift {
        next: StateId,
        precedence: u32,
        associativity: Associativity,
    },
    Reduce {
        rule: RuleId,
        precedence: u32,
    },
    Goto {
        next: StateId,
    },
    Accept {
        rule: RuleId,
    },
    /// A shift that collided with a NonAssoc reduce at equal precedence;
    /// chaining the operator at this point is a parse error (§4.5).
    NonAssocError,
}

#[derive(Debug, Default)]
pub struct Row {
    pub actions: HashMap<Symbol, Action>,
    pub default_reduce: Option<Action>,
}

/// The synthesized automaton: one row per state, state 0 is always the
/// start state.
#[derive(Debug)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    /// Looks up the action for `state` under `lookahead`, falling back to
    /// the state's default reduce when no specific entry exists.
    pub fn action(&self, state: StateId, lookahead: &Symbol) -> Option<&Action> {
        let row = self.rows.get(state)?;
        row.actions
            .get(lookahead)
            .or(row.default_reduce.as_ref())
    }

    pub fn goto(&self, state: StateId, nonterminal: &Symbol) -> Option<StateId> {
        match self.rows.get(state)?.actions.get(nonterminal)? {
            Action::Goto { next } => Some(*next),
            _ => None,
        }
    }

    /// Names of the symbols this state can shift on or accept, for
    /// `ParseError`'s "expected one of" list. Sorted for deterministic
    /// messages.
    pub fn expected(&self, state: StateId) -> Vec<String> {
        let Some(row) = self.rows.get(state) else {
            return vec![];
        };
        row.actions
            .iter()
            .filter(|(_, a)| matches!(a, Action::Shift { .. } | Action::Accept { .. }))
            .map(|(s, _)| s.display_name())
            .sorted()
            .collect()
    }
}

type Item = (RuleId, usize);

/// Builds the table for `start` against `rules`/`rulesets`. `start` must
/// already be known to correspond to a declared RuleSet.
pub fn build(
    rules: &[Rule],
    rulesets: &HashMap<Symbol, RuleSet>,
    start: &Symbol,
) -> Result<Table, GrammarError> {
    let start_ruleset = rulesets
        .get(start)
        .ok_or_else(|| GrammarError::UnknownSymbol(start.name().to_owned()))?;

    // If the start RuleSet is itself terminal, wrap it: <start> := start.
    // Otherwise every one of the start RuleSet's own alternatives is a
    // start production in its own right (§4.3).
    let (rules, start_rule_ids): (Vec<Rule>, Vec<RuleId>) = if start_ruleset.is_terminal(rules) {
        let mut owned = rules.to_vec();
        let synthetic_id = owned.len();
        owned.push(Rule {
            id: synthetic_id,
            name: Symbol::start(),
            components: vec![Component::Symbol(start.clone())],
            action: crate::rule::ReduceAction::Identity,
            precedence: 0,
            associativity: Associativity::default(),
        });
        (owned, vec![synthetic_id])
    } else {
        (rules.to_vec(), start_ruleset.rule_ids.clone())
    };

    let start_items: BTreeSet<Item> = start_rule_ids.iter().map(|&r| (r, 0)).collect();
    let start_set = closure(start_items, &rules, rulesets)?;

    let mut states: Vec<BTreeSet<Item>> = vec![start_set.clone()];
    let mut index: HashMap<BTreeSet<Item>, StateId> = HashMap::new();
    index.insert(start_set, 0);
    let mut queue: VecDeque<StateId> = VecDeque::from([0]);
    let mut rows: Vec<Row> = vec![Row::default()];

    debug!("building table: start state 0 has {} item(s)", states[0].len());

    while let Some(state_id) = queue.pop_front() {
        let item_set = states[state_id].clone();
        trace!("expanding state {state_id}: {} item(s)", item_set.len());

        let mut by_symbol: HashMap<Symbol, BTreeSet<Item>> = HashMap::new();
        let mut complete: Vec<RuleId> = Vec::new();

        for &(rule_id, dot) in &item_set {
            let rule = &rules[rule_id];
            if dot == rule.components.len() {
                complete.push(rule_id);
                continue;
            }
            if let Component::Symbol(sym) = &rule.components[dot] {
                by_symbol.entry(sym.clone()).or_default().insert((rule_id, dot + 1));
            }
        }

        let mut row = Row::default();

        // Reduce/reduce: more than one distinct rule complete in the same
        // state is a grammar error, never a runtime ambiguity to paper
        // over (§4.5).
        let distinct_complete: Vec<RuleId> = complete.iter().copied().unique().collect();
        if distinct_complete.len() > 1 {
            let a = rules[distinct_complete[0]].signature();
            let b = rules[distinct_complete[1]].signature();
            debug!("state {state_id}: reduce/reduce conflict between `{a}` and `{b}`");
            return Err(GrammarError::ReduceReduceConflict { a, b });
        }
        if let Some(&rule_id) = distinct_complete.first() {
            let precedence = effective_precedence(&rules[rule_id], &rules, rulesets);
            row.default_reduce = Some(Action::Reduce { rule: rule_id, precedence });
            if start_rule_ids.contains(&rule_id) {
                row.actions.insert(Symbol::end(), Action::Accept { rule: rule_id });
            }
        }

        for (sym, advanced) in by_symbol {
            let target_set = closure(advanced, &rules, rulesets)?;
            let target_id = match index.get(&target_set) {
                Some(&id) => id,
                None => {
                    let id = states.len();
                    trace!("state {state_id} --{sym}--> new state {id}");
                    index.insert(target_set.clone(), id);
                    states.push(target_set);
                    rows.push(Row::default());
                    queue.push_back(id);
                    id
                }
            };

            let terminal_ruleset = rulesets.get(&sym).map(|rs| rs.is_terminal(&rules)).unwrap_or(false);
            let action = if terminal_ruleset {
                let rs = &rulesets[&sym];
                Action::Shift {
                    next: target_id,
                    precedence: rs.precedence(&rules),
                    associativity: rs.associativity(&rules),
                }
            } else {
                Action::Goto { next: target_id }
            };
            row.actions.insert(sym, action);
        }

        resolve_conflicts(&mut row);
        rows[state_id] = row;
    }

    Ok(Table { rows })
}

/// A rule's reduce precedence is the max precedence among its terminal
/// components; 0 if it has none (§4.5).
fn effective_precedence(rule: &Rule, rules: &[Rule], rulesets: &HashMap<Symbol, RuleSet>) -> u32 {
    rule.components
        .iter()
        .filter_map(|c| match c {
            Component::Symbol(sym) => rulesets.get(sym),
            _ => None,
        })
        .filter(|rs| rs.is_terminal(rules))
        .map(|rs| rs.precedence(rules))
        .max()
        .unwrap_or(0)
}

/// Applies §4.5's shift/reduce resolution in place: higher reduce
/// precedence wins over a lower-precedence shift; equal precedence
/// defers to the shifted terminal's associativity; NonAssoc at equal
/// precedence becomes a parse-time error instead of a silent pick.
fn resolve_conflicts(row: &mut Row) {
    let Some(Action::Reduce { precedence: reduce_prec, .. }) = &row.default_reduce else {
        return;
    };
    let reduce_prec = *reduce_prec;
    let default = row.default_reduce.clone();
    for (sym, action) in row.actions.iter_mut() {
        let Action::Shift { precedence: shift_prec, associativity, .. } = *action else {
            continue;
        };
        if reduce_prec > shift_prec {
            trace!("shift/reduce on `{sym}`: reduce wins ({reduce_prec} > {shift_prec})");
            *action = default.clone().unwrap();
        } else if reduce_prec == shift_prec {
            match associativity {
                Associativity::Left => {
                    trace!("shift/reduce on `{sym}`: left-assoc, reduce wins");
                    *action = default.clone().unwrap();
                }
                Associativity::Right => {}
                Associativity::NonAssoc => {
                    debug!("shift/reduce on `{sym}`: non-associative at equal precedence, marking an error");
                    *action = Action::NonAssocError;
                }
            }
        }
    }
}

fn closure(
    mut items: BTreeSet<Item>,
    rules: &[Rule],
    rulesets: &HashMap<Symbol, RuleSet>,
) -> Result<BTreeSet<Item>, GrammarError> {
    let mut stack: Vec<Item> = items.iter().copied().collect();
    while let Some((rule_id, dot)) = stack.pop() {
        let rule = &rules[rule_id];
        if dot >= rule.components.len() {
            continue;
        }
        if let Component::Symbol(sym) = &rule.components[dot] {
            let rs = rulesets
                .get(sym)
                .ok_or_else(|| GrammarError::UnknownSymbol(sym.name().to_owned()))?;
            if !rs.is_terminal(rules) {
                for &next_rule in &rs.rule_ids {
                    if items.insert((next_rule, 0)) {
                        stack.push((next_rule, 0));
                    }
                }
            }
        }
    }
    Ok(items)
}

#[cfg(feature = "debug-table")]
impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use prettytable::{row, Table as PrettyTable};
        let mut t = PrettyTable::new();
        t.add_row(row!["state", "actions"]);
        for (id, r) in self.rows.iter().enumerate() {
            let mut cells: Vec<String> = r
                .actions
                .iter()
                .map(|(sym, action)| format!("{sym}: {action:?}"))
                .sorted()
                .collect();
            if let Some(default) = &r.default_reduce {
                cells.push(format!("*: {default:?}"));
            }
            t.add_row(row![id.to_string(), cells.join("\n")]);
        }
        write!(f, "{t}")
    }
}
