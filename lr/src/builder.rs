//! Canonical item-set construction: closures, GOTO transitions, and the
//! per-mode state-identity policy.

use std::collections::VecDeque;
use std::fmt::{self, Write};
use std::hash::Hash;
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use grammar::grammar::{Grammar, ParserMode, Symbol, TokenId};
use grammar::Map;
use crate::first::{self, NonterminalFirst};
use crate::token_set::TokenSet;

pub struct Builder<'a, T: LrComputation> {
  pub grammar: &'a Grammar,
  pub states: StateStore<T::StateKey>,
  /// eof is the token with the greatest id
  pub eof: usize,
  /// max number of RHS symbols in productions, plus one.
  pub max_nsym_p1: usize,
}

pub type StateStore<Key> = IndexMap<Key, State, FnvBuildHasher>;

/// sorted by item key.
pub type KernelItemSet = Vec<Item>;

#[derive(Debug)]
pub struct State {
  /// Starts with the sorted `kernel_len` kernel items, followed by closure
  /// items.
  pub items: Vec<Item>,
  pub kernel_len: usize,
  /// symbol -> index of destination state
  pub transitions: Map<Symbol, u32>,
}

impl State {
  pub fn new(items: KernelItemSet) -> Self {
    State {
      kernel_len: items.len(),
      items,
      transitions: Map::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
  /// production and dot, encoded as `prod_ix * max_nsym_p1 + dot`.
  pub key: u32,
  pub lookaheads: TokenSet,
}

/// State identity and merge policy of one LR discipline.
pub trait LrComputation {
  type StateKey: Eq + Hash;

  /// Returns the index of the state and whether the state has changed.
  fn store_state(
    states: &mut StateStore<Self::StateKey>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool);
}

/// Kernel identity ignoring lookaheads, no merging. LR(0) and SLR(1),
/// which never consult item lookaheads.
pub struct Lr0Computation;

impl LrComputation for Lr0Computation {
  type StateKey = Vec<u32>;

  fn store_state(
    states: &mut StateStore<Vec<u32>>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool) {
    let key = kernel_item_set.iter().map(|item| item.key).collect::<Vec<_>>();
    if let Some(ix) = states.get_index_of(&key) {
      (ix as u32, false)
    } else {
      let ix = states.insert_full(key, State::new(kernel_item_set)).0;
      (ix as u32, true)
    }
  }
}

/// Kernel identity ignoring lookaheads; lookaheads of an existing state are
/// unioned in, and growth requeues the state so the change propagates
/// through its transitions. LALR(1).
pub struct LalrComputation;

impl LrComputation for LalrComputation {
  type StateKey = Vec<u32>;

  fn store_state(
    states: &mut StateStore<Vec<u32>>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool) {
    let key = kernel_item_set.iter().map(|item| item.key).collect::<Vec<_>>();
    if let Some(ix) = states.get_index_of(&key) {
      let state = &mut states[ix];
      let mut changed = false;
      // both kernels are sorted by key, so they align one to one
      for (old, new) in state.items.iter_mut().zip(&kernel_item_set) {
        changed |= old.lookaheads.union_with(&new.lookaheads);
      }
      (ix as u32, changed)
    } else {
      let ix = states.insert_full(key, State::new(kernel_item_set)).0;
      (ix as u32, true)
    }
  }
}

/// Full kernel identity, lookahead sets included. Canonical LR(1): states
/// whose kernels differ only in lookaheads stay distinct.
pub struct ClrComputation;

impl LrComputation for ClrComputation {
  type StateKey = Vec<Item>;

  fn store_state(
    states: &mut StateStore<Vec<Item>>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool) {
    if let Some(ix) = states.get_index_of(&kernel_item_set) {
      (ix as u32, false)
    } else {
      let ix = states
        .insert_full(kernel_item_set.clone(), State::new(kernel_item_set))
        .0;
      (ix as u32, true)
    }
  }
}

impl<'a, T: LrComputation> Builder<'a, T> {
  pub fn new(grammar: &'a Grammar) -> Self {
    Self {
      grammar,
      states: StateStore::default(),
      eof: grammar.eof().index(),
      max_nsym_p1: grammar
        .prods
        .iter()
        .map(|prod| prod.symbols.len())
        .max()
        .unwrap()
        + 1,
    }
  }
}

/// The finished canonical collection, mode-erased. State 0 is the start
/// state, holding the closure of `$accept -> . start` with `$` lookahead.
#[derive(Debug)]
pub struct Collection {
  pub states: Vec<State>,
  pub start_state: u32,
  pub max_nsym_p1: usize,
}

/// BFS over GOTO kernels from the start item.
pub fn build_collection(grammar: &Grammar) -> Collection {
  match grammar.mode {
    ParserMode::Lr0 | ParserMode::Slr1 => run::<Lr0Computation>(grammar),
    ParserMode::Lalr1 => run::<LalrComputation>(grammar),
    ParserMode::Clr1 => run::<ClrComputation>(grammar),
    ParserMode::Ll1 => panic!("LL(1) grammars have no canonical collection"),
  }
}

fn run<T: LrComputation>(grammar: &Grammar) -> Collection {
  let mut builder = Builder::<T>::new(grammar);
  let start_state = gen_states(&mut builder);

  Collection {
    states: builder.states.into_values().collect(),
    start_state,
    max_nsym_p1: builder.max_nsym_p1,
  }
}

pub fn gen_states<T: LrComputation>(builder: &mut Builder<T>) -> u32 {
  let nt_firsts = first::from_sets(builder.grammar);

  let start_item_set = vec![Item {
    key: encode_item(builder.max_nsym_p1, 0, 0),
    lookaheads: TokenSet::from_token(builder.eof + 1, builder.eof as u32),
  }];
  let (start_state, _) = T::store_state(&mut builder.states, start_item_set);

  let mut queue = VecDeque::new();
  queue.push_back(start_state);

  while let Some(state_ix) = queue.pop_front() {
    let state = &mut builder.states[state_ix as usize];
    compute_closure(builder.grammar, &nt_firsts, builder.max_nsym_p1, state);

    let transitions = compute_transitions(builder.grammar, builder.max_nsym_p1, state);
    for (sym, mut kernel_item_set) in transitions {
      kernel_item_set.sort_by_key(|item| item.key);

      let (next_state, changed) = T::store_state(&mut builder.states, kernel_item_set);
      if changed {
        queue.push_back(next_state);
      }
      builder.states[state_ix as usize].transitions.insert(sym, next_state);
    }
  }

  start_state
}

fn compute_closure(
  grammar: &Grammar,
  nt_firsts: &[NonterminalFirst],
  max_nsym_p1: usize,
  state: &mut State,
) {
  let items = &mut state.items;
  // nt -> start index of its productions' items
  let mut nt_starts = Map::new();
  let mut first = TokenSet::new(grammar.num_tokens());

  for (i, item) in items.iter().enumerate() {
    if let (prod, 0) = decode_item(max_nsym_p1, item.key) {
      let nt = grammar.prods[prod].nt;
      if !nt_starts.contains_key(&nt) {
        nt_starts.insert(nt, i);
      }
    }
  }

  let mut i = 0;
  while i < items.len() {
    let (prod, dot) = decode_item(max_nsym_p1, items[i].key);
    let prod = &grammar.prods[prod];
    if dot == prod.symbols.len() {
      i += 1;
      continue;
    }

    if let Symbol::Nonterminal(nt) = &prod.symbols[dot] {
      first.clear();
      first::compute_symbols_first(
        &mut first,
        nt_firsts,
        &prod.symbols[dot + 1..],
        Some(&items[i].lookaheads),
      );

      if let Some(&nt_start) = nt_starts.get(nt) {
        let mut changed = false;
        for j in nt_start..nt_start + grammar.nt_prods[nt].len() {
          changed |= items[j].lookaheads.union_with(&first);
        }

        if changed {
          // earlier items may depend on the grown sets; rescan
          if i > nt_start {
            i = nt_start;
          }
        } else {
          i += 1;
        }
      } else {
        nt_starts.insert(*nt, items.len());

        for prod_ix in grammar.nt_prods[nt].clone() {
          items.push(Item {
            key: encode_item(max_nsym_p1, prod_ix, 0),
            lookaheads: first.clone(),
          });
        }

        i += 1;
      }
    } else {
      i += 1;
    }
  }
}

fn compute_transitions(
  grammar: &Grammar,
  max_nsym_p1: usize,
  state: &State,
) -> Map<Symbol, Vec<Item>> {
  let mut transitions = Map::<_, Vec<Item>>::new();

  for item in &state.items {
    let (prod_ix, dot) = decode_item(max_nsym_p1, item.key);
    let prod = &grammar.prods[prod_ix];
    if dot == prod.symbols.len() {
      continue;
    }

    let next_item = encode_item(max_nsym_p1, prod_ix, dot + 1);
    transitions
      .entry(prod.symbols[dot])
      .or_default()
      .push(Item {
        key: next_item,
        lookaheads: item.lookaheads.clone(),
      });
  }

  transitions
}

pub(crate) fn encode_item(max_nsym_p1: usize, prod_ix: usize, dot: usize) -> u32 {
  (prod_ix * max_nsym_p1 + dot) as u32
}

pub(crate) fn decode_item(max_nsym_p1: usize, key: u32) -> (usize, usize) {
  let prod = key as usize / max_nsym_p1;
  let dot = key as usize % max_nsym_p1;
  (prod, dot)
}

impl Collection {
  pub fn decode_item(&self, key: u32) -> (usize, usize) {
    decode_item(self.max_nsym_p1, key)
  }

  /// items of a state as display strings, for conflict reports.
  pub fn item_strings(&self, grammar: &Grammar, state_ix: usize) -> Vec<String> {
    self.states[state_ix]
      .items
      .iter()
      .map(|item| {
        let mut buf = String::new();
        self.fmt_item(grammar, item, &mut buf).unwrap();
        buf
      })
      .collect()
  }

  pub fn fmt_item(&self, grammar: &Grammar, item: &Item, fmt: &mut impl Write) -> fmt::Result {
    let (prod, dot) = self.decode_item(item.key);
    let nt = grammar.prods[prod].nt;
    let symbols = &grammar.prods[prod].symbols;

    write!(fmt, "{} ->", grammar.nt_name(nt))?;

    for (i, sym) in symbols.iter().enumerate() {
      if i == dot {
        write!(fmt, " .")?;
      }
      write!(fmt, " {}", grammar.symbol_name(*sym))?;
    }

    if dot == symbols.len() {
      write!(fmt, " .")?;
    }

    // LR(0) and SLR(1) never consult item lookaheads, so they are noise
    if matches!(grammar.mode, ParserMode::Lalr1 | ParserMode::Clr1) {
      write!(fmt, "      ")?;

      let mut slash = false;
      for lookahead in item.lookaheads.iter() {
        if slash {
          write!(fmt, " / ")?;
        }
        slash = true;

        let name = grammar.token_name(TokenId::from_index(lookahead as usize));
        write!(fmt, "{}", name)?;
      }
    }

    Ok(())
  }

  pub fn dump(&self, grammar: &Grammar) -> String {
    let mut output = String::new();
    self.fmt_states(grammar, &mut output).unwrap();
    output
  }

  fn fmt_states(&self, grammar: &Grammar, fmt: &mut impl Write) -> fmt::Result {
    for i in 0..self.states.len() {
      self.fmt_state(grammar, i, fmt)?;
    }
    Ok(())
  }

  fn fmt_state(&self, grammar: &Grammar, state_ix: usize, fmt: &mut impl Write) -> fmt::Result {
    write!(fmt, "State {}", state_ix)?;
    if state_ix as u32 == self.start_state {
      write!(fmt, " (start)")?;
    }
    writeln!(fmt)?;

    for item in &self.states[state_ix].items {
      self.fmt_item(grammar, item, fmt)?;
      writeln!(fmt)?;
    }

    writeln!(fmt)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::grammar::{GrammarDef, RuleAlt};
  use insta::assert_snapshot;

  fn simple(mode: ParserMode) -> Grammar {
    // S = C C ; C = c C | d
    let def = GrammarDef::default()
      .rule("S", [RuleAlt::new("C C")])
      .rule("C", [RuleAlt::new("'c' C"), RuleAlt::new("'d'")]);
    Grammar::build(def, mode, false).unwrap()
  }

  #[test]
  fn lalr_simple_states() {
    let grammar = simple(ParserMode::Lalr1);
    let collection = build_collection(&grammar);

    assert_snapshot!(collection.dump(&grammar).trim_end(), @r"
    State 0 (start)
    $accept -> . S      $
    S -> . C C      $
    C -> . c C      c / d
    C -> . d      c / d

    State 1
    $accept -> S .      $

    State 2
    S -> C . C      $
    C -> . c C      $
    C -> . d      $

    State 3
    C -> c . C      c / d / $
    C -> . c C      c / d / $
    C -> . d      c / d / $

    State 4
    C -> d .      c / d / $

    State 5
    S -> C C .      $

    State 6
    C -> c C .      c / d / $
    ");
  }

  #[test]
  fn lalr_merges_states_that_clr_keeps_apart() {
    let lalr = build_collection(&simple(ParserMode::Lalr1));
    let lr0 = build_collection(&simple(ParserMode::Lr0));
    let clr = build_collection(&simple(ParserMode::Clr1));

    assert_eq!(lr0.states.len(), 7);
    assert_eq!(lalr.states.len(), 7);
    assert_eq!(clr.states.len(), 10);
  }

  #[test]
  fn kernels_are_sorted_and_first() {
    let grammar = simple(ParserMode::Lalr1);
    let collection = build_collection(&grammar);

    for state in &collection.states {
      assert!(state.kernel_len >= 1);
      let kernel = &state.items[..state.kernel_len];
      for pair in kernel.windows(2) {
        assert!(pair[0].key < pair[1].key);
      }
    }
  }

  #[test]
  fn transitions_point_at_matching_kernels() {
    let grammar = simple(ParserMode::Clr1);
    let collection = build_collection(&grammar);

    for state in &collection.states {
      for (&sym, &to) in &state.transitions {
        let target = &collection.states[to as usize];
        // every kernel item of the target must be an advance over `sym`
        for item in &target.items[..target.kernel_len] {
          let (prod, dot) = collection.decode_item(item.key);
          assert!(dot >= 1);
          assert_eq!(grammar.prods[prod].symbols[dot - 1], sym);
        }
      }
    }
  }
}
