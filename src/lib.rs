//! A small runtime grammar library: describe a grammar as data, and get a
//! shift/reduce parser back. The parse table is an LR(0) automaton with
//! default-reduce lookaheads (no full LALR(1) follow-set computation) and
//! is synthesized lazily, on first parse, then cached for the grammar's
//! lifetime.
//!
//! ```
//! use yalp::{Associativity, Grammar, Value};
//!
//! let mut g = Grammar::new();
//! g.literal("+").unwrap().precedence(1).associativity(Associativity::Left);
//! g.terminal("int", r"[0-9]+")
//!     .unwrap()
//!     .action(|args| Value::Int(args[0].as_str().unwrap().parse().unwrap()));
//! g.terminal("ws", r"\s+").unwrap().discard();
//! g.rule("sum")
//!     .add(&["sum", "+", "int"])
//!     .action(|args| Value::Int(args[0].as_int().unwrap() + args[2].as_int().unwrap()));
//! g.rule("sum").add(&["int"]);
//! g.start("sum");
//!
//! let result = g.parse("1 + 2 + 3").unwrap();
//! assert_eq!(result.as_int(), Some(6));
//! ```

mod error;
mod grammar;
mod lexer;
mod parser;
mod rule;
mod ruleset;
mod symbol;
mod table;
mod value;

pub use error::{Error, GrammarError, ParseError, UnconsumedInputError};
pub use grammar::{AlternativeHandle, Grammar, NonTerminalBuilder, TerminalHandle};
pub use lexer::Token;
pub use rule::Associativity;
pub use symbol::Symbol;
pub use table::StateId;
pub use value::Value;
