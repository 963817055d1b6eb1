//! A small arithmetic calculator built on top of `yalp`, demonstrating
//! precedence, associativity, and custom reduction actions. Takes one
//! positional argument: a source file path, or `-` to read expressions
//! from stdin, one per line.
use std::io::{self, BufRead};

use yalp::{Associativity, Grammar, Value};

fn arithmetic_grammar() -> Grammar {
    let mut g = Grammar::new();

    g.terminal("num", r"[0-9]+(\.[0-9]+)?")
        .unwrap()
        .action(|args| Value::Float(args[0].as_str().unwrap().parse().unwrap()));
    g.terminal("ws", r"[ \t]+").unwrap().discard();
    g.literal("+").unwrap().precedence(1).associativity(Associativity::Left);
    g.literal("-").unwrap().precedence(1).associativity(Associativity::Left);
    g.literal("*").unwrap().precedence(2).associativity(Associativity::Left);
    g.literal("/").unwrap().precedence(2).associativity(Associativity::Left);
    g.literal("(").unwrap();
    g.literal(")").unwrap();

    g.rule("expr")
        .add(&["expr", "+", "expr"])
        .action(|a| Value::Float(a[0].as_float().unwrap() + a[2].as_float().unwrap()));
    g.rule("expr")
        .add(&["expr", "-", "expr"])
        .action(|a| Value::Float(a[0].as_float().unwrap() - a[2].as_float().unwrap()));
    g.rule("expr")
        .add(&["expr", "*", "expr"])
        .action(|a| Value::Float(a[0].as_float().unwrap() * a[2].as_float().unwrap()));
    g.rule("expr")
        .add(&["expr", "/", "expr"])
        .action(|a| Value::Float(a[0].as_float().unwrap() / a[2].as_float().unwrap()));
    g.rule("expr")
        .add(&["(", "expr", ")"])
        .action(|mut a| a.remove(1));
    g.rule("expr").add(&["num"]);

    g.start("expr");
    g
}

fn evaluate(grammar: &Grammar, line: &str) {
    match grammar.parse(line) {
        Ok(value) => println!("{} = {:?}", line.trim(), value),
        Err(err) => eprintln!("error parsing `{}`: {err}", line.trim()),
    }
}

fn main() {
    env_logger::init();
    let grammar = arithmetic_grammar();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: yalp-calc <path | ->");
        std::process::exit(2);
    };

    if path == "-" {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line.expect("failed to read stdin");
            if line.trim().is_empty() {
                continue;
            }
            evaluate(&grammar, &line);
        }
    } else {
        let contents = std::fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read {path}: {err}"));
        for line in contents.lines() {
            if line.trim().is_empty() {
                continue;
            }
            evaluate(&grammar, line);
        }
    }
}
