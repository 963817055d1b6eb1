use yalp::{Associativity, Error, Grammar, Value};

#[test]
fn scenario_1_cast_sum_of_two_ints() {
    let mut g = Grammar::new();
    g.terminal("int", r"[0-9]+")
        .unwrap()
        .action(|args| Value::Int(args[0].as_str().unwrap().parse().unwrap()));
    g.literal("+").unwrap();
    g.rule("sum")
        .add(&["int", "+", "int"])
        .action(|args| Value::Int(args[0].as_int().unwrap() + args[2].as_int().unwrap()));
    g.start("sum");

    let result = g.parse("10+20").unwrap();
    assert_eq!(result.as_int(), Some(30));
}

fn expr_grammar(with_minus: bool, with_parens: bool, skip_ws: bool) -> Grammar {
    let mut g = Grammar::new();
    g.terminal("int", r"[0-9]+")
        .unwrap()
        .action(|args| Value::Int(args[0].as_str().unwrap().parse().unwrap()));
    if skip_ws {
        g.terminal("ws", r"[ \t]+").unwrap().discard();
    }
    g.literal("+").unwrap().precedence(1).associativity(Associativity::Left);
    g.literal("*").unwrap().precedence(2).associativity(Associativity::Left);
    if with_minus {
        g.literal("-").unwrap().precedence(1).associativity(Associativity::Left);
    }
    if with_parens {
        g.literal("(").unwrap();
        g.literal(")").unwrap();
        g.rule("expr").add(&["(", "expr", ")"]).action(|mut a| a.remove(1));
    }

    g.rule("expr")
        .add(&["expr", "+", "expr"])
        .action(|a| Value::Int(a[0].as_int().unwrap() + a[2].as_int().unwrap()));
    g.rule("expr")
        .add(&["expr", "*", "expr"])
        .action(|a| Value::Int(a[0].as_int().unwrap() * a[2].as_int().unwrap()));
    if with_minus {
        g.rule("expr")
            .add(&["expr", "-", "expr"])
            .action(|a| Value::Int(a[0].as_int().unwrap() - a[2].as_int().unwrap()));
    }
    g.rule("expr").add(&["int"]);
    g.start("expr");
    g
}

#[test]
fn scenario_2_precedence_climbs_over_plain_left_associativity() {
    let g = expr_grammar(false, false, false);
    let result = g.parse("1+2*3").unwrap();
    assert_eq!(result.as_int(), Some(7));
}

#[test]
fn scenario_3_left_associative_minus_chains_left_to_right() {
    let g = expr_grammar(true, false, false);
    let result = g.parse("6-3-1").unwrap();
    assert_eq!(result.as_int(), Some(2));
}

#[test]
fn scenario_4_parens_override_associativity() {
    let g = expr_grammar(true, true, false);
    let result = g.parse("2-(3-1)-1").unwrap();
    assert_eq!(result.as_int(), Some(-1));
}

#[test]
fn scenario_5_whitespace_is_skipped_between_operators() {
    let g = expr_grammar(true, false, true);
    let result = g.parse("6 - 3 - 1").unwrap();
    assert_eq!(result.as_int(), Some(2));
}

#[test]
fn scenario_6_unexpected_token_reports_line_and_expected_comma() {
    let mut g = Grammar::new();
    g.terminal("id", r"[a-zA-Z]+").unwrap();
    g.literal(",").unwrap();
    g.literal("-").unwrap();
    g.terminal("ws", r"[ \t]+").unwrap().discard();
    g.terminal("nl", r"\n").unwrap().discard();
    g.rule("list").add(&["list", ",", "id"]);
    g.rule("list").add(&["id"]);
    g.start("list");

    let err = g.parse("a, \nb, \nc- \nd").unwrap_err();
    let Error::Parse(parse_err) = err else {
        panic!("expected a ParseError, got {err:?}");
    };
    assert_eq!(parse_err.line, 3);
    assert_eq!(parse_err.expected, vec![",".to_string()]);
    assert_eq!(parse_err.received, "-");
}

#[test]
fn scenario_7_trailing_input_after_a_complete_parse_is_rejected() {
    let mut g = Grammar::new();
    g.literal("a").unwrap();
    g.literal("b").unwrap();
    g.literal("c").unwrap();
    g.rule("prog").add(&["a", "b", "c"]);
    g.start("prog");

    let err = g.parse("abcabc").unwrap_err();
    let Error::Parse(parse_err) = err else {
        panic!("expected a ParseError, got {err:?}");
    };
    assert_eq!(parse_err.expected, vec!["END".to_string()]);
    assert_eq!(parse_err.received, "a");
}

#[test]
fn scenario_8_missing_terminator_reports_end_as_received() {
    let mut g = Grammar::new();
    g.literal("a").unwrap();
    g.literal("b").unwrap();
    g.literal("c").unwrap();
    g.literal(";").unwrap();
    g.rule("abc").add(&["a", "b", "c"]);
    g.rule("prog").add(&["abc", ";"]);
    g.start("prog");

    let err = g.parse("abc").unwrap_err();
    let Error::Parse(parse_err) = err else {
        panic!("expected a ParseError, got {err:?}");
    };
    assert_eq!(parse_err.expected, vec![";".to_string()]);
    assert_eq!(parse_err.received, "END");
}

#[test]
fn scenario_9_competing_reductions_are_a_grammar_error_at_build_time() {
    let mut g = Grammar::new();
    g.terminal("id", r"[a-zA-Z]+").unwrap();
    g.rule("list").add(&["list", "id"]);
    g.rule("list").add(&["id"]);
    g.rule("prog").add(&["list"]);
    g.rule("prog").add(&["id"]);
    g.start("prog");

    let err = g.parse("x").unwrap_err();
    let Error::Grammar(yalp::GrammarError::ReduceReduceConflict { a, b }) = err else {
        panic!("expected a reduce/reduce GrammarError, got {err:?}");
    };
    let both = format!("{a} {b}");
    assert!(both.contains("prog := [id]"), "message was: {both}");
    assert!(both.contains("list := [id]"), "message was: {both}");
}

#[test]
fn scenario_10_epsilon_production_matches_balanced_empty_parens() {
    let mut g = Grammar::new();
    g.literal("(").unwrap();
    g.literal(")").unwrap();
    g.rule("parens")
        .add(&["(", "parens", ")"])
        .action(|mut a| a.remove(1));
    g.rule("parens").add(&[]).action(|args| {
        assert!(args.is_empty());
        Value::Str("epsilon".to_string())
    });
    g.start("parens");

    let result = g.parse("((()))").unwrap();
    assert_eq!(result.as_str(), Some("epsilon"));
}

#[test]
fn scenario_11_longest_match_wins_over_a_declared_prefix_keyword() {
    let mut g = Grammar::new();
    g.literal("def").unwrap();
    g.literal("define").unwrap();
    g.terminal("id", r"[a-z_]+").unwrap();
    g.start("id");

    let result = g.parse("define_method").unwrap();
    assert_eq!(result.as_str(), Some("define_method"));
}

#[test]
fn discarded_terminal_advances_the_line_counter_across_its_span() {
    let mut g = Grammar::new();
    g.terminal("id", r"[a-zA-Z]+").unwrap();
    g.terminal("blank", r"[ \t\n]+").unwrap().discard();
    g.literal(",").unwrap();
    g.literal("-").unwrap();
    g.rule("list").add(&["list", ",", "id"]);
    g.rule("list").add(&["id"]);
    g.start("list");

    let err = g.parse("a,\n\nb,-").unwrap_err();
    let Error::Parse(parse_err) = err else {
        panic!("expected a ParseError, got {err:?}");
    };
    assert_eq!(parse_err.line, 3);
}
