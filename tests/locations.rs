//! Location capture: token ranges, reduction spans, and the epsilon case.

use parsekit::{
  Grammar, GrammarDef, LexRule, LexSpec, Loc, ParserMode, Production, RuleAlt,
  Semantics, TextSemantics, Token,
};

fn sum_grammar(capture: bool) -> Grammar {
  let def = GrammarDef::default()
    .lex(
      LexSpec::default()
        .rule(LexRule::skip(r"[ \n]+"))
        .rule(LexRule::token(r"[0-9]+", "NUM")),
    )
    .rule("E", [RuleAlt::new("NUM '+' NUM")]);
  Grammar::build(def, ParserMode::Slr1, capture).unwrap()
}

#[test]
fn the_result_location_spans_the_whole_reduction() {
  let grammar = sum_grammar(true);
  let parsed = parsekit::parse_lr(&grammar, "12 + 345", &mut TextSemantics).unwrap();

  assert_eq!(
    parsed.loc,
    Some(Loc {
      start_offset: 0,
      end_offset: 8,
      start_line: 1,
      end_line: 1,
      start_column: 1,
      end_column: 9,
    })
  );
}

#[test]
fn newlines_advance_lines_and_reset_columns() {
  let grammar = sum_grammar(true);
  let parsed = parsekit::parse_lr(&grammar, "12 +\n345", &mut TextSemantics).unwrap();

  assert_eq!(
    parsed.loc,
    Some(Loc {
      start_offset: 0,
      end_offset: 8,
      start_line: 1,
      end_line: 2,
      start_column: 1,
      end_column: 4,
    })
  );
}

#[test]
fn token_locations_follow_the_same_convention() {
  let grammar = sum_grammar(true);
  let tokens = parsekit::tokenize(&grammar, "12 + 345")
    .collect::<Result<Vec<_>, _>>()
    .unwrap();

  let num = &tokens[2];
  assert_eq!(grammar.token_name(num.kind), "NUM");
  assert_eq!(
    num.loc,
    Some(Loc {
      start_offset: 5,
      end_offset: 8,
      start_line: 1,
      end_line: 1,
      start_column: 6,
      end_column: 9,
    })
  );
}

#[test]
fn locations_are_absent_when_capture_is_off() {
  let grammar = sum_grammar(false);

  let parsed = parsekit::parse_lr(&grammar, "12 + 345", &mut TextSemantics).unwrap();
  assert_eq!(parsed.loc, None);

  let tokens = parsekit::tokenize(&grammar, "12 + 345")
    .collect::<Result<Vec<_>, _>>()
    .unwrap();
  assert!(tokens.iter().all(|t| t.loc.is_none()));
}

/// records the location every reduction sees.
struct Spans(Vec<Loc>);

impl Semantics for Spans {
  type Value = ();

  fn token(&mut self, _token: &Token) {}

  fn reduce(&mut self, _prod: &Production, _args: Vec<()>, loc: &Loc) {
    self.0.push(*loc);
  }
}

#[test]
fn epsilon_reductions_are_zero_width_at_the_cursor() {
  // S = 'a' B 'c' ; B = eps
  let def = GrammarDef::default()
    .rule("S", [RuleAlt::new("'a' B 'c'")])
    .rule("B", [RuleAlt::new("")]);
  let grammar = Grammar::build(def, ParserMode::Lalr1, true).unwrap();

  let mut spans = Spans(vec![]);
  parsekit::parse_lr(&grammar, "ac", &mut spans).unwrap();

  // first reduction is B -> eps, zero-width where `c` starts
  let eps = spans.0[0];
  assert_eq!(eps.start_offset, 1);
  assert_eq!(eps.end_offset, 1);
  assert_eq!(eps.start_line, 1);
  assert_eq!(eps.start_column, 2);
}
