//! The predictive driver: a symbol stack expanded top-down, with semantic
//! values synthesized bottom-up through reduce markers.

use grammar::actions::{Parsed, Semantics};
use grammar::grammar::{Grammar, Symbol};
use grammar::lexer::{Loc, Token};
use grammar::{ParseFailure, UnexpectedToken, EOF_TOKEN};
use crate::build::LlTable;

/// Expanding `A -> alpha` pushes a marker carrying the production after
/// alpha (reversed, so the leftmost symbol surfaces first); once the whole
/// RHS has been matched the marker surfaces and the reduction runs.
enum Entry {
  Sym(Symbol),
  Reduce(u32),
}

pub struct Parser<'g> {
  grammar: &'g Grammar,
  table: &'g LlTable,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar, table: &'g LlTable) -> Self {
    Self { grammar, table }
  }

  pub fn parse<S: Semantics>(
    &self,
    input: &str,
    semantics: &mut S,
  ) -> Result<Parsed<S::Value>, ParseFailure> {
    let eof = self.grammar.eof();
    let mut tokens = self.grammar.tokenizer(input);
    let mut token = tokens.next_token()?;

    let mut symbols = vec![
      Entry::Sym(Symbol::Token(eof)),
      Entry::Sym(Symbol::Nonterminal(self.grammar.start_nt)),
    ];
    let mut values: Vec<S::Value> = vec![];
    let mut locs: Vec<Loc> = vec![];

    while let Some(entry) = symbols.pop() {
      match entry {
        Entry::Sym(Symbol::Token(expected)) if expected == eof => {
          if token.kind != eof {
            return Err(self.unexpected(&token, vec![EOF_TOKEN.to_owned()]));
          }
          let value = match values.pop() {
            Some(value) => value,
            None => unreachable!("accepted without a synthesized value"),
          };
          let loc = locs.pop();
          return Ok(Parsed {
            value,
            loc: if self.grammar.capture_locations { loc } else { None },
          });
        }
        Entry::Sym(Symbol::Token(expected)) => {
          if token.kind != expected {
            return Err(self.unexpected(
              &token,
              vec![self.grammar.token_name(expected).to_owned()],
            ));
          }
          values.push(semantics.token(&token));
          locs.push(token_loc(&token));
          token = tokens.next_token()?;
        }
        Entry::Sym(Symbol::Nonterminal(nt)) => {
          match self.table.production(nt.index(), token.kind.index()) {
            Some(num) => {
              let prod = self.grammar.production(num);
              symbols.push(Entry::Reduce(num));
              for &sym in prod.symbols.iter().rev() {
                symbols.push(Entry::Sym(sym));
              }
            }
            None => {
              return Err(self.unexpected(
                &token,
                self.table.expected_tokens(self.grammar, nt.index()),
              ));
            }
          }
        }
        Entry::Reduce(num) => {
          let prod = self.grammar.production(num);
          let len = prod.rhs_len();

          let loc = if len == 0 {
            let at = token_loc(&token);
            Loc::empty_at(at.start_offset, at.start_line, at.start_column)
          } else {
            Loc::span(&locs[locs.len() - len], &locs[locs.len() - 1])
          };

          let args = values.split_off(values.len() - len);
          let value = semantics.reduce(prod, args, &loc);
          locs.truncate(locs.len() - len);
          locs.push(loc);
          values.push(value);
        }
      }
    }

    unreachable!("the symbol stack always bottoms out at end of input")
  }

  fn unexpected(&self, token: &Token, expected: Vec<String>) -> ParseFailure {
    UnexpectedToken {
      token: self.grammar.token_name(token.kind).to_owned(),
      text: token.text.to_owned(),
      start: token.start,
      end: token.end,
      loc: token.loc,
      state: None,
      expected,
      nonassoc: false,
    }
    .into()
  }
}

fn token_loc(token: &Token) -> Loc {
  token.loc.unwrap_or(Loc {
    start_offset: token.start,
    end_offset: token.end,
    ..Loc::default()
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::actions::TextSemantics;
  use grammar::grammar::{GrammarDef, ParserMode, Production, RuleAlt};
  use crate::build::build_table;
  use pretty_assertions::assert_eq;

  fn matched() -> Grammar {
    let def = GrammarDef::default().rule("S", [RuleAlt::new("'a' S 'b'"), RuleAlt::new("")]);
    Grammar::build(def, ParserMode::Ll1, false).unwrap()
  }

  /// counts nesting depth of the matched pairs.
  struct Depth;

  impl Semantics for Depth {
    type Value = usize;

    fn token(&mut self, _token: &Token) -> usize {
      0
    }

    fn reduce(&mut self, prod: &Production, args: Vec<usize>, _loc: &Loc) -> usize {
      match prod.num {
        1 => args[1] + 1,
        _ => 0,
      }
    }
  }

  #[test]
  fn accepts_matched_pairs() {
    let grammar = matched();
    let table = build_table(&grammar).unwrap();
    let parser = Parser::new(&grammar, &table);

    assert_eq!(parser.parse("aabb", &mut Depth).unwrap().value, 2);
    assert_eq!(parser.parse("", &mut Depth).unwrap().value, 0);
    assert_eq!(parser.parse("aaabbb", &mut Depth).unwrap().value, 3);
  }

  #[test]
  fn rejects_unbalanced_input() {
    let grammar = matched();
    let table = build_table(&grammar).unwrap();
    let parser = Parser::new(&grammar, &table);

    let err = parser.parse("aab", &mut Depth).unwrap_err();
    match err {
      ParseFailure::Token(err) => {
        assert_eq!(err.token, "$");
        assert_eq!(err.expected, vec!["b"]);
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn rejects_trailing_input() {
    let grammar = matched();
    let table = build_table(&grammar).unwrap();
    let parser = Parser::new(&grammar, &table);

    let err = parser.parse("abb", &mut TextSemantics).unwrap_err();
    match err {
      ParseFailure::Token(err) => {
        assert_eq!(err.token, "b");
        assert_eq!(err.expected, vec!["$"]);
      }
      _ => unreachable!(),
    }
  }
}
