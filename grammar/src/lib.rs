//! Grammar model, normalization, set analysis, and the regex tokenizer.

pub mod actions;
pub mod grammar;
pub mod lexer;
pub mod sets;

mod build;

pub use crate::actions::{Parsed, Semantics, TextSemantics};
pub use crate::grammar::*;
pub use crate::lexer::{
  LexAction, LexConditionKind, LexEmit, LexGrammar, LexRule, LexSpec,
  Loc, RuleScope, Token, Tokenizer, INITIAL_CONDITION,
};
pub use crate::sets::Sets;

#[cfg(not(debug_assertions))]
pub type Map<K, V> = std::collections::HashMap<K, V>;

#[cfg(debug_assertions)]
pub type Map<K, V> = indexmap::IndexMap<K, V>;

#[cfg(not(debug_assertions))]
pub type BiMap<K, V> = bimap::BiHashMap<K, V>;

#[cfg(debug_assertions)]
pub type BiMap<K, V> = bimap::BiBTreeMap<K, V>;

#[cfg(not(debug_assertions))]
pub type Set<K> = std::collections::HashSet<K>;

#[cfg(debug_assertions)]
pub type Set<K> = indexmap::IndexSet<K>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
  pub kind: GrammarErrorKind,
  pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarErrorKind {
  EmptyGrammar,
  UndefinedStart,
  NameConflict,
  NameNotFound,
  UnknownPrecedence,
  MissingLexRule,
  BadPattern,
}

impl GrammarError {
  pub(crate) fn new(kind: GrammarErrorKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
    }
  }
}

/// No lex rule matched at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedInput {
  pub offset: usize,
  pub line: u32,
  pub column: u32,
  pub found: Option<char>,
}

/// No ACTION or TABLE entry for the current (state, token) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedToken {
  /// token kind name, `$` for end of input.
  pub token: String,
  pub text: String,
  pub start: usize,
  pub end: usize,
  pub loc: Option<Loc>,
  /// LR state the parser was in, absent for the predictive driver.
  pub state: Option<u32>,
  pub expected: Vec<String>,
  /// the cell was an explicit non-associativity error, not a missing entry.
  pub nonassoc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
  Input(UnexpectedInput),
  Token(UnexpectedToken),
}

impl From<UnexpectedInput> for ParseFailure {
  fn from(err: UnexpectedInput) -> Self {
    ParseFailure::Input(err)
  }
}

impl From<UnexpectedToken> for ParseFailure {
  fn from(err: UnexpectedToken) -> Self {
    ParseFailure::Token(err)
  }
}
