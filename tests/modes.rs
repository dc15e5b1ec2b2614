//! Cross-mode properties on an unambiguous arithmetic grammar: state
//! counts, acceptance agreement, and the LL(1) pipeline on its left-factored
//! cousin.

use parsekit::{
  Grammar, GrammarDef, LexRule, LexSpec, Loc, ParserMode, Production, RuleAlt,
  Semantics, TextSemantics, Token,
};

struct Eval;

impl Semantics for Eval {
  type Value = i64;

  fn token(&mut self, token: &Token) -> i64 {
    token.text.parse().unwrap_or(0)
  }

  fn reduce(&mut self, prod: &Production, args: Vec<i64>, _loc: &Loc) -> i64 {
    match prod.action.as_deref() {
      Some("add") => args[0] + args[2],
      Some("mul") => args[0] * args[2],
      Some("paren") => args[1],
      _ => args[0],
    }
  }
}

/// E = E + T | T ; T = T * F | F ; F = ( E ) | NUM
fn layered(mode: ParserMode) -> Grammar {
  let def = GrammarDef::default()
    .lex(
      LexSpec::default()
        .rule(LexRule::skip(r"[ ]+"))
        .rule(LexRule::token(r"[0-9]+", "NUM")),
    )
    .rule("E", [RuleAlt::new("E '+' T").action("add"), RuleAlt::new("T")])
    .rule("T", [RuleAlt::new("T '*' F").action("mul"), RuleAlt::new("F")])
    .rule("F", [RuleAlt::new("'(' E ')'").action("paren"), RuleAlt::new("NUM")]);
  Grammar::build(def, mode, false).unwrap()
}

fn states(mode: ParserMode) -> usize {
  let grammar = layered(mode);
  parsekit::build_collection(&grammar).states.len()
}

#[test]
fn lalr_has_exactly_the_lr0_states_and_clr_has_more() {
  let lr0 = states(ParserMode::Lr0);
  let lalr = states(ParserMode::Lalr1);
  let clr = states(ParserMode::Clr1);

  assert_eq!(lalr, lr0);
  assert!(clr > lalr, "CLR(1) {} states vs LALR(1) {}", clr, lalr);
}

#[test]
fn every_lr_mode_accepts_the_same_inputs_with_the_same_value() {
  let modes = [ParserMode::Slr1, ParserMode::Lalr1, ParserMode::Clr1];
  let inputs = [("1 + 2 * 3", 7), ("(1 + 2) * 3", 9), ("1 * 2 + 3", 5), ("7", 7)];

  for mode in modes {
    let grammar = layered(mode);
    for (input, value) in inputs {
      let parsed = parsekit::parse_lr(&grammar, input, &mut Eval).unwrap();
      assert_eq!(parsed.value, value, "{:?} on {:?}", mode, input);
    }
  }
}

#[test]
fn every_lr_mode_rejects_the_same_garbage() {
  for mode in [ParserMode::Slr1, ParserMode::Lalr1, ParserMode::Clr1] {
    let grammar = layered(mode);
    for input in ["1 + * 2", "(1", "1 2"] {
      assert!(
        parsekit::parse_lr(&grammar, input, &mut Eval).is_err(),
        "{:?} accepted {:?}",
        mode,
        input
      );
    }
  }
}

/// The left-factored, non-left-recursive rendition for LL(1).
fn layered_ll() -> Grammar {
  let def = GrammarDef::default()
    .lex(
      LexSpec::default()
        .rule(LexRule::skip(r"[ ]+"))
        .rule(LexRule::token(r"[0-9]+", "NUM")),
    )
    .rule("E", [RuleAlt::new("T Etail")])
    .rule("Etail", [RuleAlt::new("'+' T Etail"), RuleAlt::new("")])
    .rule("T", [RuleAlt::new("F Ttail")])
    .rule("Ttail", [RuleAlt::new("'*' F Ttail"), RuleAlt::new("")])
    .rule("F", [RuleAlt::new("'(' E ')'"), RuleAlt::new("NUM")]);
  Grammar::build(def, ParserMode::Ll1, false).unwrap()
}

#[test]
fn the_ll_pipeline_accepts_the_same_language() {
  let grammar = layered_ll();

  for input in ["1 + 2 * 3", "(1 + 2) * 3", "7"] {
    assert!(parsekit::parse_ll(&grammar, input, &mut TextSemantics).is_ok());
  }
  for input in ["1 + * 2", "(1", "1 2"] {
    assert!(parsekit::parse_ll(&grammar, input, &mut TextSemantics).is_err());
  }
}
