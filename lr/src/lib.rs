//! LR table construction and parsing: canonical item sets for the
//! LR(0)/SLR(1)/LALR(1)/CLR(1) disciplines, ACTION/GOTO assembly with
//! precedence arbitration, and the table-driven shift/reduce automaton.

use grammar::grammar::Grammar;

pub mod builder;
pub mod parser;
pub mod tables;
pub mod token_set;

mod first;

pub use builder::{build_collection, Collection};
pub use parser::Parser;
pub use tables::{build_tables, Action, ResolutionPolicy, ResolvedConflict, Tables};
pub use token_set::TokenSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  ShiftReduceConflict(ShiftReduceConflictError),
  ReduceReduceConflict(ReduceReduceConflictError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftReduceConflictError {
  pub state: u32,
  pub state_items: Vec<String>,
  /// the token that could be shifted.
  pub shift: String,
  /// the production that could be reduced.
  pub reduce: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceReduceConflictError {
  pub state: u32,
  pub state_items: Vec<String>,
  pub lookahead: String,
  pub reduce1: String,
  pub reduce2: String,
}

/// Builds the canonical collection and the parsing tables in one step.
pub fn build(grammar: &Grammar, resolve_conflicts: bool) -> Result<(Collection, Tables), Vec<Error>> {
  let collection = build_collection(grammar);
  let tables = build_tables(grammar, &collection, resolve_conflicts)?;
  Ok((collection, tables))
}
