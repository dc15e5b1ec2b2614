//! nullable, FIRST, FOLLOW, and PREDICT set computation.

use bit_set::BitSet;
use bitvec::prelude::*;
use crate::grammar::{Grammar, NonterminalId, Symbol};
use crate::Map;

/// The analysis sets of a grammar, computed once at the end of
/// normalization. FIRST and FOLLOW are sets of token indices (EOF is
/// `Grammar::eof().index()`); epsilon membership in FIRST is represented by
/// `nullable`.
#[derive(Debug, Default)]
pub struct Sets {
  /// indices of nullable non-terminals.
  pub nullable: BitSet,
  /// per-production flag: the whole RHS derives epsilon.
  pub prod_nullable: BitVec,
  pub first: Map<NonterminalId, BitSet>,
  /// FOLLOW, EOF included.
  pub follow: Map<NonterminalId, BitSet>,
  /// PREDICT per production, indexed like `Grammar::prods`.
  pub predict: Vec<BitSet>,
}

impl Sets {
  /// FIRST of a symbol string: the token set plus whether the whole string
  /// is nullable.
  pub fn first_of(&self, symbols: &[Symbol]) -> (BitSet, bool) {
    let mut set = BitSet::new();
    for sym in symbols {
      match sym {
        Symbol::Token(token) => {
          set.insert(token.index());
          return (set, false);
        }
        Symbol::Nonterminal(nt) => {
          set.union_with(&self.first[nt]);
          if !self.nullable.contains(nt.index()) {
            return (set, false);
          }
        }
      }
    }
    (set, true)
  }
}

pub fn compute(grammar: &Grammar) -> Sets {
  let (nullable, prod_nullable) = compute_nullable(grammar);
  let first = compute_first(grammar, &nullable);
  let follow = compute_follow(grammar, &nullable, &first);
  let predict = compute_predict(grammar, &nullable, &prod_nullable, &first, &follow);

  Sets {
    nullable,
    prod_nullable,
    first: index_by_nt(first),
    follow: index_by_nt(follow),
    predict,
  }
}

fn compute_nullable(grammar: &Grammar) -> (BitSet, BitVec) {
  let mut nullable = BitSet::new();
  let mut prod_nullable = bitvec![0; grammar.prods.len()];

  loop {
    let mut changed = false;

    for (i, prod) in grammar.prods.iter().enumerate() {
      if prod_nullable[i] {
        continue;
      }

      let rhs_nullable = prod.symbols.iter().all(|sym| match sym {
        Symbol::Token(_) => false,
        Symbol::Nonterminal(nt) => nullable.contains(nt.index()),
      });

      if rhs_nullable {
        prod_nullable.set(i, true);
        changed |= nullable.insert(prod.nt.index());
      }
    }

    if !changed {
      break;
    }
  }

  (nullable, prod_nullable)
}

fn compute_first(grammar: &Grammar, nullable: &BitSet) -> Vec<BitSet> {
  let mut first = vec![BitSet::new(); grammar.num_nts()];

  loop {
    let mut changed = false;

    for prod in &grammar.prods {
      let mut add = BitSet::new();
      for sym in &prod.symbols {
        match sym {
          Symbol::Token(token) => {
            add.insert(token.index());
            break;
          }
          Symbol::Nonterminal(nt) => {
            add.union_with(&first[nt.index()]);
            if !nullable.contains(nt.index()) {
              break;
            }
          }
        }
      }

      let nt_first = &mut first[prod.nt.index()];
      if !add.is_subset(nt_first) {
        nt_first.union_with(&add);
        changed = true;
      }
    }

    if !changed {
      break;
    }
  }

  first
}

fn compute_follow(grammar: &Grammar, nullable: &BitSet, first: &[BitSet]) -> Vec<BitSet> {
  let mut follow = vec![BitSet::new(); grammar.num_nts()];

  // $ follows the grammar entry point
  let entry = grammar.accept_nt.unwrap_or(grammar.start_nt);
  follow[entry.index()].insert(grammar.eof().index());

  loop {
    let mut changed = false;

    for prod in &grammar.prods {
      // walk right to left carrying the token set that can follow the
      // current symbol
      let mut tail = follow[prod.nt.index()].clone();

      for sym in prod.symbols.iter().rev() {
        match sym {
          Symbol::Token(token) => {
            tail = BitSet::new();
            tail.insert(token.index());
          }
          Symbol::Nonterminal(nt) => {
            let nt_follow = &mut follow[nt.index()];
            if !tail.is_subset(nt_follow) {
              nt_follow.union_with(&tail);
              changed = true;
            }

            if nullable.contains(nt.index()) {
              tail.union_with(&first[nt.index()]);
            } else {
              tail = first[nt.index()].clone();
            }
          }
        }
      }
    }

    if !changed {
      break;
    }
  }

  follow
}

fn compute_predict(
  grammar: &Grammar,
  nullable: &BitSet,
  prod_nullable: &BitVec,
  first: &[BitSet],
  follow: &[BitSet],
) -> Vec<BitSet> {
  grammar
    .prods
    .iter()
    .enumerate()
    .map(|(i, prod)| {
      let mut set = BitSet::new();
      for sym in &prod.symbols {
        match sym {
          Symbol::Token(token) => {
            set.insert(token.index());
            break;
          }
          Symbol::Nonterminal(nt) => {
            set.union_with(&first[nt.index()]);
            if !nullable.contains(nt.index()) {
              break;
            }
          }
        }
      }
      if prod_nullable[i] {
        set.union_with(&follow[prod.nt.index()]);
      }
      set
    })
    .collect()
}

fn index_by_nt(sets: Vec<BitSet>) -> Map<NonterminalId, BitSet> {
  sets
    .into_iter()
    .enumerate()
    .map(|(i, set)| (NonterminalId::from_index(i), set))
    .collect()
}
