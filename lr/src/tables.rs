//! ACTION and GOTO table assembly with precedence arbitration and conflict
//! reporting.

use grammar::grammar::{Assoc, Grammar, ParserMode, Symbol, TokenId};
use crate::builder::Collection;
use crate::{Error, ReduceReduceConflictError, ShiftReduceConflictError};

/// explicit error entry from non-associativity arbitration.
const NONASSOC: i32 = i32::MIN + 1;
const ACCEPT: i32 = i32::MIN;

/// A decoded ACTION cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Shift(u32),
  /// reduce by production number.
  Reduce(u32),
  Accept,
  /// hard error from `%nonassoc` arbitration.
  NonAssoc,
  Error,
}

/// A conflict that was settled by the default policy rather than by
/// precedence, reported so callers can warn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConflict {
  pub state: u32,
  pub token: String,
  pub policy: ResolutionPolicy,
  pub kept: String,
  pub dropped: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
  /// shift/reduce without full precedence information: shift wins.
  PreferShift,
  /// reduce/reduce: the production declared first wins.
  LowerProduction,
}

/// The assembled parsing tables.
///
/// `action` entry encoding: positive is a shift (the destination state is
/// never 0), `-(n + 1)` is a reduce by production `n`, two large negative
/// sentinels mark accept and non-assoc error cells, zero is error. `goto`
/// entry 0 is error, anything else the destination state.
#[derive(Debug)]
pub struct Tables {
  pub action: Vec<Vec<i32>>,
  pub goto: Vec<Vec<u32>>,
  pub resolved: Vec<ResolvedConflict>,
}

impl Tables {
  pub fn action(&self, state: u32, token_index: usize) -> Action {
    match self.action[state as usize][token_index] {
      0 => Action::Error,
      ACCEPT => Action::Accept,
      NONASSOC => Action::NonAssoc,
      v if v > 0 => Action::Shift(v as u32),
      v => Action::Reduce((-v - 1) as u32),
    }
  }

  pub fn goto(&self, state: u32, nt_index: usize) -> Option<u32> {
    match self.goto[state as usize][nt_index] {
      0 => None,
      v => Some(v),
    }
  }

  /// token names with a non-error entry in the state's ACTION row.
  pub fn expected_tokens(&self, grammar: &Grammar, state: u32) -> Vec<String> {
    self.action[state as usize]
      .iter()
      .enumerate()
      .filter(|(_, &v)| v != 0 && v != NONASSOC)
      .map(|(i, _)| grammar.token_name(TokenId::from_index(i)).to_owned())
      .collect()
  }
}

/// Fills ACTION and GOTO from the collection. The reduction lookahead is
/// every token under LR(0), FOLLOW of the LHS under SLR(1), and the item
/// lookahead set under LALR(1)/CLR(1). Unless `resolve_conflicts` is set,
/// any conflict the operator table cannot settle fails the build.
pub fn build_tables(
  grammar: &Grammar,
  collection: &Collection,
  resolve_conflicts: bool,
) -> Result<Tables, Vec<Error>> {
  let num_tokens = grammar.num_tokens();
  let eof = grammar.eof().index();
  let mut action = vec![vec![0i32; num_tokens]; collection.states.len()];
  let mut goto = vec![vec![0u32; grammar.num_nts()]; collection.states.len()];
  let mut resolved = vec![];
  let mut errors = vec![];

  for (from_state, state) in collection.states.iter().enumerate() {
    for (&sym, &to_state) in &state.transitions {
      match sym {
        Symbol::Token(token) => action[from_state][token.index()] = to_state as i32,
        Symbol::Nonterminal(nt) => goto[from_state][nt.index()] = to_state,
      }
    }
  }

  for (from_state, state) in collection.states.iter().enumerate() {
    for item in &state.items {
      let (prod_ix, dot) = collection.decode_item(item.key);
      if dot < grammar.prods[prod_ix].symbols.len() {
        continue;
      }

      // the augmented item `$accept -> start .` accepts on end of input
      if prod_ix == 0 && grammar.augmented().is_some() {
        action[from_state][eof] = ACCEPT;
        continue;
      }

      let lookaheads: Vec<usize> = match grammar.mode {
        ParserMode::Lr0 => (0..num_tokens).collect(),
        ParserMode::Slr1 => grammar.sets.follow[&grammar.prods[prod_ix].nt]
          .iter()
          .collect(),
        _ => item.lookaheads.iter().map(|t| t as usize).collect(),
      };

      for lookahead in lookaheads {
        write_reduce(
          grammar,
          collection,
          resolve_conflicts,
          &mut action[from_state],
          from_state as u32,
          lookahead,
          prod_ix,
          &mut resolved,
          &mut errors,
        );
      }
    }
  }

  if errors.is_empty() {
    Ok(Tables {
      action,
      goto,
      resolved,
    })
  } else {
    Err(errors)
  }
}

fn write_reduce(
  grammar: &Grammar,
  collection: &Collection,
  resolve_conflicts: bool,
  row: &mut [i32],
  state: u32,
  lookahead: usize,
  prod_ix: usize,
  resolved: &mut Vec<ResolvedConflict>,
  errors: &mut Vec<Error>,
) {
  let reduce = -(prod_ix as i32) - 1;

  match row[lookahead] {
    0 => row[lookahead] = reduce,
    // an earlier arbitration decided this cell errors at runtime
    NONASSOC => {}
    // reduce by the augmented production is the accept; it is production 0
    // and wins any reduce/reduce arbitration
    ACCEPT => {
      if resolve_conflicts {
        resolved.push(ResolvedConflict {
          state,
          token: grammar.token_name(TokenId::from_index(lookahead)).to_owned(),
          policy: ResolutionPolicy::LowerProduction,
          kept: grammar.prods[0].to_string(grammar),
          dropped: grammar.prods[prod_ix].to_string(grammar),
        });
      } else {
        errors.push(rr_conflict(grammar, collection, state, lookahead, 0, prod_ix));
      }
    }
    shift if shift > 0 => {
      match resolve_sr_conflict(grammar, prod_ix, lookahead) {
        SrResolution::Shift => {}
        SrResolution::Reduce => row[lookahead] = reduce,
        SrResolution::Error => row[lookahead] = NONASSOC,
        SrResolution::Undecided => {
          if resolve_conflicts {
            // default policy: prefer the shift
            resolved.push(ResolvedConflict {
              state,
              token: grammar.token_name(TokenId::from_index(lookahead)).to_owned(),
              policy: ResolutionPolicy::PreferShift,
              kept: format!("shift to state {}", shift),
              dropped: grammar.prods[prod_ix].to_string(grammar),
            });
          } else {
            errors.push(sr_conflict(grammar, collection, state, lookahead, prod_ix));
          }
        }
      }
    }
    other => {
      let other_prod = (-other - 1) as usize;
      if resolve_conflicts {
        // default policy: the production declared first wins
        let (kept, dropped) = if prod_ix < other_prod {
          row[lookahead] = reduce;
          (prod_ix, other_prod)
        } else {
          (other_prod, prod_ix)
        };
        resolved.push(ResolvedConflict {
          state,
          token: grammar.token_name(TokenId::from_index(lookahead)).to_owned(),
          policy: ResolutionPolicy::LowerProduction,
          kept: grammar.prods[kept].to_string(grammar),
          dropped: grammar.prods[dropped].to_string(grammar),
        });
      } else {
        errors.push(rr_conflict(
          grammar, collection, state, lookahead, other_prod, prod_ix,
        ));
      }
    }
  }
}

enum SrResolution {
  Shift,
  Reduce,
  /// equal precedence, non-associative: hard error at parse time.
  Error,
  Undecided,
}

fn resolve_sr_conflict(grammar: &Grammar, prod_ix: usize, lookahead: usize) -> SrResolution {
  let token_prec = grammar.operator(TokenId::from_index(lookahead));
  match (grammar.prods[prod_ix].prec, token_prec) {
    (Some(prec1), Some((assoc, prec2))) => {
      if prec1 == prec2 {
        match assoc {
          Assoc::LeftAssoc => SrResolution::Reduce,
          Assoc::RightAssoc => SrResolution::Shift,
          Assoc::NonAssoc => SrResolution::Error,
        }
      } else if prec1 < prec2 {
        SrResolution::Shift
      } else {
        SrResolution::Reduce
      }
    }
    _ => SrResolution::Undecided,
  }
}

fn sr_conflict(
  grammar: &Grammar,
  collection: &Collection,
  state: u32,
  lookahead: usize,
  reduce_prod: usize,
) -> Error {
  Error::ShiftReduceConflict(ShiftReduceConflictError {
    state,
    state_items: collection.item_strings(grammar, state as usize),
    shift: grammar.token_name(TokenId::from_index(lookahead)).to_owned(),
    reduce: grammar.prods[reduce_prod].to_string(grammar),
  })
}

fn rr_conflict(
  grammar: &Grammar,
  collection: &Collection,
  state: u32,
  lookahead: usize,
  reduce1: usize,
  reduce2: usize,
) -> Error {
  Error::ReduceReduceConflict(ReduceReduceConflictError {
    state,
    state_items: collection.item_strings(grammar, state as usize),
    lookahead: grammar.token_name(TokenId::from_index(lookahead)).to_owned(),
    reduce1: grammar.prods[reduce1].to_string(grammar),
    reduce2: grammar.prods[reduce2].to_string(grammar),
  })
}
