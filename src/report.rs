//! Human-readable rendering of build and parse errors. Table-construction
//! conflicts are rendered as plain text listing the state's items; runtime
//! errors carry offsets into the parsed input and are rendered as labeled
//! source snippets.

use std::fmt::Write as _;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::NoColor;
use itertools::Itertools;
use grammar::{GrammarError, ParseFailure, UnexpectedInput, UnexpectedToken};
use crate::Error;

/// Renders any error of the crate; `input` is the string that was being
/// parsed and is only consulted for runtime errors.
pub fn render(error: &Error, input: &str) -> String {
  match error {
    Error::Grammar(err) => render_grammar_error(err),
    Error::LrConflicts(errors) => errors.iter().map(render_lr_conflict).join("\n"),
    Error::LlConflicts(errors) => errors.iter().map(render_ll_conflict).join("\n"),
    Error::Parse(failure) => render_parse_failure(failure, input),
  }
}

fn render_grammar_error(err: &GrammarError) -> String {
  format!("grammar error: {}", err.message)
}

fn render_lr_conflict(err: &lr::Error) -> String {
  let mut buf = String::new();

  match err {
    lr::Error::ShiftReduceConflict(err) => {
      writeln!(&mut buf, "shift-reduce conflict in state {}:\n", err.state).unwrap();
      for item in &err.state_items {
        writeln!(&mut buf, "  {}", item).unwrap();
      }
      writeln!(
        &mut buf,
        "\nwhich can shift {}\nor reduce by:\n\n  {}",
        err.shift, err.reduce,
      )
      .unwrap();
    }
    lr::Error::ReduceReduceConflict(err) => {
      writeln!(&mut buf, "reduce-reduce conflict in state {}:\n", err.state).unwrap();
      for item in &err.state_items {
        writeln!(&mut buf, "  {}", item).unwrap();
      }
      writeln!(
        &mut buf,
        "\nwhich can be reduced by:\n\n  {}\n\nor:\n\n  {}\n\nwhen the lookahead is {}",
        err.reduce1, err.reduce2, err.lookahead,
      )
      .unwrap();
    }
  }

  buf
}

fn render_ll_conflict(err: &ll::Error) -> String {
  let ll::Error::PredictConflict(err) = err;
  format!(
    "predict conflict: `{}` on {} can expand by:\n\n  {}\n\nor:\n\n  {}\n",
    err.nonterminal, err.token, err.prod1, err.prod2,
  )
}

fn render_parse_failure(failure: &ParseFailure, input: &str) -> String {
  let diagnostic = match failure {
    ParseFailure::Input(err) => input_diagnostic(err, input),
    ParseFailure::Token(err) => token_diagnostic(err),
  };

  let file = SimpleFile::new("<input>", input);
  let config = term::Config::default();
  let mut writer = NoColor::new(Vec::new());
  term::emit(&mut writer, &config, &file, &diagnostic).unwrap();

  String::from_utf8(writer.into_inner()).unwrap()
}

fn input_diagnostic(err: &UnexpectedInput, input: &str) -> Diagnostic<()> {
  let end = err.offset
    + err
      .found
      .map(char::len_utf8)
      .unwrap_or(0)
      .min(input.len() - err.offset);

  let found = match err.found {
    Some(c) => format!("`{}`", c),
    None => "end of input".to_owned(),
  };

  Diagnostic::error()
    .with_message(format!("no rule matches {}", found))
    .with_labels(vec![Label::primary((), err.offset..end)
      .with_message(format!("line {}, column {}", err.line, err.column))])
}

fn token_diagnostic(err: &UnexpectedToken) -> Diagnostic<()> {
  let message = if err.nonassoc {
    format!("`{}` is non-associative", err.token)
  } else {
    format!("unexpected {}", describe_token(err))
  };

  let mut label = format!("expected {}", err.expected.iter().join(", "));
  if let Some(state) = err.state {
    write!(&mut label, " (in state {})", state).unwrap();
  }

  Diagnostic::error()
    .with_message(message)
    .with_labels(vec![Label::primary((), err.start..err.end).with_message(label)])
}

fn describe_token(err: &UnexpectedToken) -> String {
  if err.token == grammar::EOF_TOKEN {
    "end of input".to_owned()
  } else if err.text == err.token {
    format!("`{}`", err.text)
  } else {
    format!("{} `{}`", err.token, err.text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Grammar, GrammarDef, ParserMode, RuleAlt, TextSemantics};
  use insta::assert_snapshot;

  #[test]
  fn shift_reduce_conflict_text() {
    let def = GrammarDef::default().rule("E", [RuleAlt::new("E E"), RuleAlt::new("'x'")]);
    let grammar = Grammar::build(def, ParserMode::Slr1, false).unwrap();
    let errors = lr::build(&grammar, false).unwrap_err();

    let text = render(&Error::LrConflicts(errors), "");
    assert!(text.contains("shift-reduce conflict in state"));
    assert!(text.contains("or reduce by:"));
    assert!(text.contains("E -> E E ."));
  }

  #[test]
  fn unexpected_token_snippet_points_at_the_lexeme() {
    let def = GrammarDef::default().rule("S", [RuleAlt::new("'a' 'b'")]);
    let grammar = Grammar::build(def, ParserMode::Lalr1, false).unwrap();
    let input = "aa";
    let err = crate::parse_lr(&grammar, input, &mut TextSemantics).unwrap_err();

    let text = render(&err, input);
    assert!(text.contains("unexpected `a`"), "got: {}", text);
    assert!(text.contains("expected b"), "got: {}", text);
  }

  #[test]
  fn unmatched_input_reports_line_and_column() {
    let def = GrammarDef::default().rule("S", [RuleAlt::new("'a'")]);
    let grammar = Grammar::build(def, ParserMode::Lalr1, false).unwrap();
    let input = "!";
    let err = crate::parse_lr(&grammar, input, &mut TextSemantics).unwrap_err();

    let text = render(&err, input);
    assert!(text.contains("no rule matches `!`"), "got: {}", text);
    assert!(text.contains("line 1, column 1"), "got: {}", text);
  }

  #[test]
  fn predict_conflict_text() {
    let err = ll::Error::PredictConflict(ll::PredictConflictError {
      nonterminal: "S".to_owned(),
      token: "a".to_owned(),
      prod1: "S -> a X".to_owned(),
      prod2: "S -> a Y".to_owned(),
    });

    let text = render(&Error::LlConflicts(vec![err]), "");
    assert_snapshot!(text.trim_end(), @r"
    predict conflict: `S` on a can expand by:

      S -> a X

    or:

      S -> a Y
    ");
  }
}
