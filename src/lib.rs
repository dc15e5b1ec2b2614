//! Grammar analysis and table-driven parsing.
//!
//! The pipeline: a [`GrammarDef`] is normalized into a [`Grammar`] for one
//! parser mode; the analysis sets come with it; LR modes build a canonical
//! collection and ACTION/GOTO tables, LL(1) builds a predict table; either
//! table drives a parse over a tokenized input, dispatching semantic
//! values through a caller-supplied [`Semantics`].
//!
//! The one-shot helpers below rebuild tables on every call; for repeated
//! parses build the tables once with [`lr::build`] or [`ll::build_table`]
//! and drive [`lr::Parser`] / [`ll::Parser`] directly.

pub use grammar;
pub use ll;
pub use lr;

pub use grammar::actions::{Parsed, Semantics, TextSemantics};
pub use grammar::grammar::{
  Assoc, Grammar, GrammarDef, NonterminalId, ParserMode, Production, RuleAlt,
  Symbol, TokenId, ACCEPT_NT, EOF_TOKEN,
};
pub use grammar::lexer::{
  LexAction, LexConditionKind, LexEmit, LexGrammar, LexRule, LexSpec, Loc,
  RuleScope, Token, Tokenizer, INITIAL_CONDITION,
};
pub use grammar::sets::Sets;
pub use grammar::{
  GrammarError, GrammarErrorKind, ParseFailure, UnexpectedInput, UnexpectedToken,
};
pub use lr::{build_collection, build_tables, Action, Collection, Tables};
pub use ll::LlTable;

pub mod report;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  Grammar(GrammarError),
  LrConflicts(Vec<lr::Error>),
  LlConflicts(Vec<ll::Error>),
  Parse(ParseFailure),
}

impl From<GrammarError> for Error {
  fn from(err: GrammarError) -> Self {
    Error::Grammar(err)
  }
}

impl From<ParseFailure> for Error {
  fn from(err: ParseFailure) -> Self {
    Error::Parse(err)
  }
}

/// The analysis sets of a grammar; computed during normalization, exposed
/// here as the stable query surface.
pub fn compute_sets(grammar: &Grammar) -> &Sets {
  &grammar.sets
}

/// Tokenizes without parsing: a lazy stream of tokens ending with EOF.
pub fn tokenize<'g, 'i>(grammar: &'g Grammar, input: &'i str) -> Tokenizer<'g, 'i> {
  grammar.tokenizer(input)
}

/// Builds the LR tables for the grammar's mode and runs one parse.
pub fn parse_lr<S: Semantics>(
  grammar: &Grammar,
  input: &str,
  semantics: &mut S,
) -> Result<Parsed<S::Value>, Error> {
  let (_, tables) = lr::build(grammar, false).map_err(Error::LrConflicts)?;
  lr::Parser::new(grammar, &tables)
    .parse(input, semantics)
    .map_err(Error::Parse)
}

/// Builds the LL(1) table and runs one predictive parse.
pub fn parse_ll<S: Semantics>(
  grammar: &Grammar,
  input: &str,
  semantics: &mut S,
) -> Result<Parsed<S::Value>, Error> {
  let table = ll::build_table(grammar).map_err(Error::LlConflicts)?;
  ll::Parser::new(grammar, &table)
    .parse(input, semantics)
    .map_err(Error::Parse)
}
