//! Per-non-terminal FIRST/nullable in the dense representation the closure
//! loop wants, converted once from the grammar's analysis sets.

use grammar::grammar::{Grammar, NonterminalId, Symbol};
use crate::token_set::TokenSet;

#[derive(Debug, Clone)]
pub struct NonterminalFirst {
  pub first: TokenSet,
  pub nullable: bool,
}

pub(crate) fn from_sets(grammar: &Grammar) -> Vec<NonterminalFirst> {
  let universe = grammar.num_tokens();

  (0..grammar.num_nts())
    .map(|i| {
      let nt = NonterminalId::from_index(i);
      let mut first = TokenSet::new(universe);
      for token in grammar.sets.first[&nt].iter() {
        first.insert(token as u32);
      }
      NonterminalFirst {
        first,
        nullable: grammar.sets.nullable.contains(i),
      }
    })
    .collect()
}

/// FIRST of a symbol string into `result`; when the whole string is
/// nullable, `last` (the lookahead of the triggering item) is added too.
pub(crate) fn compute_symbols_first(
  result: &mut TokenSet,
  nt_firsts: &[NonterminalFirst],
  symbols: &[Symbol],
  last: Option<&TokenSet>,
) {
  for sym in symbols {
    match sym {
      Symbol::Token(token) => {
        result.insert(token.id());
        return;
      }
      Symbol::Nonterminal(nt) => {
        result.union_with(&nt_firsts[nt.index()].first);
        if !nt_firsts[nt.index()].nullable {
          return;
        }
      }
    }
  }

  if let Some(last) = last {
    result.union_with(last);
  }
}
