//! TABLE[nonterminal][token] assembly from PREDICT sets.

use grammar::grammar::{Grammar, TokenId};
use crate::{Error, PredictConflictError};

/// The LL(1) parsing table. `table[nt][token]` holds a production number,
/// 0 for error; LL production numbering starts at 1, so 0 is free.
#[derive(Debug)]
pub struct LlTable {
  pub table: Vec<Vec<u32>>,
}

impl LlTable {
  pub fn production(&self, nt_index: usize, token_index: usize) -> Option<u32> {
    match self.table[nt_index][token_index] {
      0 => None,
      num => Some(num),
    }
  }

  /// token names predicting any production of the non-terminal.
  pub fn expected_tokens(&self, grammar: &Grammar, nt_index: usize) -> Vec<String> {
    self.table[nt_index]
      .iter()
      .enumerate()
      .filter(|(_, &num)| num != 0)
      .map(|(i, _)| grammar.token_name(TokenId::from_index(i)).to_owned())
      .collect()
  }
}

/// Every production lands in one cell per PREDICT token; a doubly-claimed
/// cell is a FIRST/FIRST (or FIRST/FOLLOW) conflict. All conflicts are
/// collected before failing.
pub fn build_table(grammar: &Grammar) -> Result<LlTable, Vec<Error>> {
  let mut table = vec![vec![0u32; grammar.num_tokens()]; grammar.num_nts()];
  let mut errors = vec![];

  for (i, prod) in grammar.prods.iter().enumerate() {
    for token in grammar.sets.predict[i].iter() {
      let cell = &mut table[prod.nt.index()][token];
      if *cell == 0 {
        *cell = prod.num;
      } else {
        errors.push(Error::PredictConflict(PredictConflictError {
          nonterminal: grammar.nt_name(prod.nt).to_owned(),
          token: grammar.token_name(TokenId::from_index(token)).to_owned(),
          prod1: grammar.production(*cell).to_string(grammar),
          prod2: prod.to_string(grammar),
        }));
      }
    }
  }

  if errors.is_empty() {
    Ok(LlTable { table })
  } else {
    Err(errors)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::grammar::{GrammarDef, ParserMode, RuleAlt};
  use pretty_assertions::assert_eq;

  fn matched() -> Grammar {
    let def = GrammarDef::default().rule("S", [RuleAlt::new("'a' S 'b'"), RuleAlt::new("")]);
    Grammar::build(def, ParserMode::Ll1, false).unwrap()
  }

  #[test]
  fn cells_hold_production_numbers() {
    let grammar = matched();
    let table = build_table(&grammar).unwrap();

    let s = grammar.start_nt.index();
    let a = grammar.tokens.get_by_right("a").unwrap().index();
    let b = grammar.tokens.get_by_right("b").unwrap().index();

    // a predicts the recursive production, b and $ the epsilon one
    assert_eq!(table.production(s, a), Some(1));
    assert_eq!(table.production(s, b), Some(2));
    assert_eq!(table.production(s, grammar.eof().index()), Some(2));
  }

  #[test]
  fn expected_tokens_reads_the_row() {
    let grammar = matched();
    let table = build_table(&grammar).unwrap();

    assert_eq!(
      table.expected_tokens(&grammar, grammar.start_nt.index()),
      vec!["a", "b", "$"]
    );
  }

  #[test]
  fn first_first_overlap_is_a_conflict() {
    // S = a X | a Y is not left-factored
    let def = GrammarDef::default()
      .rule("S", [RuleAlt::new("'a' X"), RuleAlt::new("'a' Y")])
      .rule("X", [RuleAlt::new("'x'")])
      .rule("Y", [RuleAlt::new("'y'")]);
    let grammar = Grammar::build(def, ParserMode::Ll1, false).unwrap();

    let errors = build_table(&grammar).unwrap_err();
    assert_eq!(errors.len(), 1);
    let Error::PredictConflict(err) = &errors[0];
    assert_eq!(err.nonterminal, "S");
    assert_eq!(err.token, "a");
    assert_eq!(err.prod1, "S -> a X");
    assert_eq!(err.prod2, "S -> a Y");
  }

  #[test]
  fn left_recursion_shows_up_as_a_conflict() {
    let def = GrammarDef::default().rule("E", [RuleAlt::new("E '+' E"), RuleAlt::new("'n'")]);
    let grammar = Grammar::build(def, ParserMode::Ll1, false).unwrap();

    assert!(build_table(&grammar).is_err());
  }
}
