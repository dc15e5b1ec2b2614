//! Pluggable semantic-action evaluation.
//!
//! Production actions are opaque strings the core never executes; an
//! in-process parse instead dispatches every shift and reduction through a
//! [`Semantics`] implementation supplied by the caller.

use crate::grammar::Production;
use crate::lexer::{Loc, Token};

pub trait Semantics {
  type Value;

  /// value of a shifted token.
  fn token(&mut self, token: &Token) -> Self::Value;

  /// value of a reduction; `args` holds one value per RHS symbol, in
  /// grammar order. `loc` spans the reduced symbols (offsets are always
  /// filled in, lines and columns only under location capture).
  fn reduce(&mut self, prod: &Production, args: Vec<Self::Value>, loc: &Loc) -> Self::Value;
}

/// The default evaluation: a token is its matched text and a reduction is
/// its first argument.
#[derive(Debug, Default)]
pub struct TextSemantics;

impl Semantics for TextSemantics {
  type Value = String;

  fn token(&mut self, token: &Token) -> String {
    token.text.to_owned()
  }

  fn reduce(&mut self, _prod: &Production, args: Vec<String>, _loc: &Loc) -> String {
    args.into_iter().next().unwrap_or_default()
  }
}

/// A successful parse: the start symbol's semantic value and, when the
/// grammar captures locations, its source range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<V> {
  pub value: V,
  pub loc: Option<Loc>,
}
