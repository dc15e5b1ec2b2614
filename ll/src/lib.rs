//! LL(1): the PREDICT-set-driven parsing table and the predictive driver.
//! The grammar must already be left-factored and free of left recursion;
//! no transformation is attempted here.

pub mod build;
pub mod parser;

pub use build::{build_table, LlTable};
pub use parser::Parser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
  PredictConflict(PredictConflictError),
}

/// Two productions of one non-terminal predict the same token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictConflictError {
  pub nonterminal: String,
  pub token: String,
  pub prod1: String,
  pub prod2: String,
}
