//! The table-driven shift/reduce automaton.

use grammar::actions::{Parsed, Semantics};
use grammar::grammar::Grammar;
use grammar::lexer::{Loc, Token};
use grammar::{ParseFailure, UnexpectedToken};
use crate::tables::{Action, Tables};

/// One parse over one input. Borrows the grammar and tables, owns the
/// value, location, and state stacks.
pub struct Parser<'g> {
  grammar: &'g Grammar,
  tables: &'g Tables,
}

/// Frames remember the state the automaton was in *before* the symbol was
/// pushed, so a reduction of length k returns to `stack[len - k].state`.
struct Frame<V> {
  state: u32,
  value: V,
  loc: Loc,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar, tables: &'g Tables) -> Self {
    Self { grammar, tables }
  }

  pub fn parse<S: Semantics>(
    &self,
    input: &str,
    semantics: &mut S,
  ) -> Result<Parsed<S::Value>, ParseFailure> {
    let mut tokens = self.grammar.tokenizer(input);
    let mut stack: Vec<Frame<S::Value>> = vec![];
    let mut state: u32 = 0;
    let mut token = tokens.next_token()?;

    loop {
      match self.tables.action(state, token.kind.index()) {
        Action::Shift(next) => {
          stack.push(Frame {
            state,
            value: semantics.token(&token),
            loc: token_loc(&token),
          });
          state = next;
          token = tokens.next_token()?;
        }
        Action::Reduce(num) => {
          let prod = self.grammar.production(num);
          let len = prod.rhs_len();

          let loc = if len == 0 {
            // an epsilon reduction is zero-width at the lookahead
            let at = token_loc(&token);
            Loc::empty_at(at.start_offset, at.start_line, at.start_column)
          } else {
            Loc::span(&stack[stack.len() - len].loc, &stack[stack.len() - 1].loc)
          };

          let return_state = if len == 0 {
            state
          } else {
            stack[stack.len() - len].state
          };

          let args = stack
            .drain(stack.len() - len..)
            .map(|frame| frame.value)
            .collect();
          let value = semantics.reduce(prod, args, &loc);

          let next = match self.tables.goto(return_state, prod.nt.index()) {
            Some(next) => next,
            None => unreachable!("missing GOTO entry after reduction"),
          };
          stack.push(Frame {
            state: return_state,
            value,
            loc,
          });
          state = next;
        }
        Action::Accept => {
          let top = match stack.pop() {
            Some(top) => top,
            None => unreachable!("accept with an empty stack"),
          };
          return Ok(Parsed {
            value: top.value,
            loc: self.grammar.capture_locations.then_some(top.loc),
          });
        }
        Action::NonAssoc | Action::Error => {
          let nonassoc = matches!(
            self.tables.action(state, token.kind.index()),
            Action::NonAssoc
          );
          return Err(
            UnexpectedToken {
              token: self.grammar.token_name(token.kind).to_owned(),
              text: token.text.to_owned(),
              start: token.start,
              end: token.end,
              loc: token.loc,
              state: Some(state),
              expected: self.tables.expected_tokens(self.grammar, state),
              nonassoc,
            }
            .into(),
          );
        }
      }
    }
  }
}

/// A frame location always carries the token's offsets; lines and columns
/// are meaningful only under location capture.
fn token_loc(token: &Token) -> Loc {
  token.loc.unwrap_or(Loc {
    start_offset: token.start,
    end_offset: token.end,
    ..Loc::default()
  })
}
