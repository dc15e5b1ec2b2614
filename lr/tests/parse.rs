//! Driving the LALR(1) tables over a precedence-heavy expression grammar,
//! including a `%prec`-tagged unary operator.

use grammar::actions::Semantics;
use grammar::grammar::{Assoc, Grammar, GrammarDef, ParserMode, Production, RuleAlt};
use grammar::lexer::{LexRule, LexSpec, Loc, Token};

struct Eval;

impl Semantics for Eval {
  type Value = i64;

  fn token(&mut self, token: &Token) -> i64 {
    token.text.parse().unwrap_or(0)
  }

  fn reduce(&mut self, prod: &Production, args: Vec<i64>, _loc: &Loc) -> i64 {
    match prod.action.as_deref() {
      Some("add") => args[0] + args[2],
      Some("sub") => args[0] - args[2],
      Some("mul") => args[0] * args[2],
      Some("div") => args[0] / args[2],
      Some("pow") => args[0].pow(args[2] as u32),
      Some("neg") => -args[1],
      Some("paren") => args[1],
      _ => args[0],
    }
  }
}

fn expr_grammar() -> Grammar {
  let def = GrammarDef::default()
    .lex(
      LexSpec::default()
        .rule(LexRule::skip(r"[ \t\n]+"))
        .rule(LexRule::token(r"[0-9]+", "NUM")),
    )
    .operator(Assoc::LeftAssoc, &["'+'", "'-'"])
    .operator(Assoc::LeftAssoc, &["'*'", "'/'"])
    .operator(Assoc::RightAssoc, &["'^'"])
    .operator(Assoc::RightAssoc, &["NEG"])
    .rule(
      "E",
      [
        RuleAlt::new("E '+' E").action("add"),
        RuleAlt::new("E '-' E").action("sub"),
        RuleAlt::new("E '*' E").action("mul"),
        RuleAlt::new("E '/' E").action("div"),
        RuleAlt::new("E '^' E").action("pow"),
        RuleAlt::new("'-' E").action("neg").prec("NEG"),
        RuleAlt::new("'(' E ')'").action("paren"),
        RuleAlt::new("NUM"),
      ],
    );
  Grammar::build(def, ParserMode::Lalr1, false).unwrap()
}

fn eval(grammar: &Grammar, tables: &lr::Tables, input: &str) -> i64 {
  lr::Parser::new(grammar, tables)
    .parse(input, &mut Eval)
    .unwrap()
    .value
}

#[test]
fn precedence_layers_nest_correctly() {
  let grammar = expr_grammar();
  let (_, tables) = lr::build(&grammar, false).unwrap();

  assert_eq!(eval(&grammar, &tables, "12 + 3 * 4 - 6 / 2"), 21);
  assert_eq!(eval(&grammar, &tables, "(12 + 3) * 2"), 30);
  assert_eq!(eval(&grammar, &tables, "2 ^ 3 ^ 2"), 512);
}

#[test]
fn unary_minus_binds_tighter_than_addition() {
  let grammar = expr_grammar();
  let (_, tables) = lr::build(&grammar, false).unwrap();

  // NEG outranks +, so this is (-2) + 3, not -(2 + 3)
  assert_eq!(eval(&grammar, &tables, "- 2 + 3"), 1);
  assert_eq!(eval(&grammar, &tables, "- 3 ^ 2"), 9);
  assert_eq!(eval(&grammar, &tables, "- (2 + 3)"), -5);
}

#[test]
fn one_table_drives_many_parses() {
  let grammar = expr_grammar();
  let (_, tables) = lr::build(&grammar, false).unwrap();
  let parser = lr::Parser::new(&grammar, &tables);

  for (input, value) in [("1 + 1", 2), ("6 / 3", 2), ("2 * 2", 4)] {
    assert_eq!(parser.parse(input, &mut Eval).unwrap().value, value);
  }
}

#[test]
fn errors_carry_the_state_and_expectations() {
  let grammar = expr_grammar();
  let (_, tables) = lr::build(&grammar, false).unwrap();

  let err = lr::Parser::new(&grammar, &tables)
    .parse("1 + * 2", &mut Eval)
    .unwrap_err();

  match err {
    grammar::ParseFailure::Token(err) => {
      assert_eq!(err.token, "*");
      assert!(err.state.is_some());
      assert!(err.expected.contains(&"NUM".to_owned()));
      assert!(err.expected.contains(&"(".to_owned()));
    }
    other => panic!("expected a token error, got {:?}", other),
  }
}
