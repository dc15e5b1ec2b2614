//! Lexical grammar: rule specifications, macro expansion, start conditions,
//! and the compiled matchers driving the tokenizer.

use regex::Regex;
use crate::{GrammarError, GrammarErrorKind, Map};

mod tokens;

pub use tokens::{Loc, Token, Tokenizer};

/// The start condition every tokenizer begins in. Implicitly declared and
/// inclusive.
pub const INITIAL_CONDITION: &str = "INITIAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexConditionKind {
  /// rules without an explicit condition stay active.
  Inclusive,
  /// only rules tagged with the condition are active.
  Exclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
  /// active in every inclusive condition.
  Default,
  /// active exactly in the named conditions.
  Conditions(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexEmit {
  /// produce a token of the named kind.
  Token(String),
  /// consume the match without emitting.
  Skip,
  /// prepend the match to the next emitted token.
  More,
}

/// What a rule does once it has matched. The condition-stack operations are
/// applied first, then `emit` is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexAction {
  /// push a start condition.
  pub enter: Option<String>,
  /// pop the current start condition.
  pub leave: bool,
  pub emit: LexEmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexRule {
  pub conditions: RuleScope,
  pub pattern: String,
  pub action: LexAction,
}

impl LexRule {
  pub fn token(pattern: &str, token: &str) -> Self {
    Self::with_emit(pattern, LexEmit::Token(token.to_owned()))
  }

  pub fn skip(pattern: &str) -> Self {
    Self::with_emit(pattern, LexEmit::Skip)
  }

  pub fn more(pattern: &str) -> Self {
    Self::with_emit(pattern, LexEmit::More)
  }

  fn with_emit(pattern: &str, emit: LexEmit) -> Self {
    Self {
      conditions: RuleScope::Default,
      pattern: pattern.to_owned(),
      action: LexAction {
        enter: None,
        leave: false,
        emit,
      },
    }
  }

  /// restrict the rule to the named start conditions.
  pub fn within(mut self, conditions: &[&str]) -> Self {
    self.conditions = RuleScope::Conditions(conditions.iter().map(|s| (*s).to_owned()).collect());
    self
  }

  pub fn enter(mut self, condition: &str) -> Self {
    self.action.enter = Some(condition.to_owned());
    self
  }

  pub fn leave(mut self) -> Self {
    self.action.leave = true;
    self
  }
}

/// A lexical specification: ordered rules plus macro and start-condition
/// declarations. Compiled into a [`LexGrammar`] during grammar
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexSpec {
  /// name -> pattern fragment, referenced as `{name}` in rule patterns.
  pub macros: Vec<(String, String)>,
  pub conditions: Vec<(String, LexConditionKind)>,
  pub rules: Vec<LexRule>,
}

impl LexSpec {
  pub fn rule(mut self, rule: LexRule) -> Self {
    self.rules.push(rule);
    self
  }

  pub fn macro_def(mut self, name: &str, pattern: &str) -> Self {
    self.macros.push((name.to_owned(), pattern.to_owned()));
    self
  }

  pub fn condition(mut self, name: &str, kind: LexConditionKind) -> Self {
    self.conditions.push((name.to_owned(), kind));
    self
  }
}

#[derive(Debug)]
pub(crate) struct CompiledRule {
  pub(crate) re: Regex,
  pub(crate) action: LexAction,
}

/// The compiled lexical grammar: one anchored regex per rule and, per start
/// condition, the precomputed list of active rule indices.
#[derive(Debug)]
pub struct LexGrammar {
  rules: Vec<CompiledRule>,
  active: Map<String, Vec<usize>>,
}

impl LexGrammar {
  pub(crate) fn compile(spec: &LexSpec) -> Result<Self, GrammarError> {
    let mut macros = Map::new();
    for (name, pattern) in &spec.macros {
      if macros.insert(name.as_str(), pattern.as_str()).is_some() {
        return Err(GrammarError::new(
          GrammarErrorKind::NameConflict,
          format!("lex macro `{}` is defined twice", name),
        ));
      }
    }

    let mut conditions = Map::new();
    conditions.insert(INITIAL_CONDITION.to_owned(), LexConditionKind::Inclusive);
    for (name, kind) in &spec.conditions {
      if conditions.insert(name.clone(), *kind).is_some() {
        return Err(GrammarError::new(
          GrammarErrorKind::NameConflict,
          format!("start condition `{}` is declared twice", name),
        ));
      }
    }

    let mut rules = Vec::with_capacity(spec.rules.len());
    for rule in &spec.rules {
      if let RuleScope::Conditions(names) = &rule.conditions {
        for name in names {
          if !conditions.contains_key(name) {
            return Err(GrammarError::new(
              GrammarErrorKind::NameNotFound,
              format!(
                "lex rule /{}/ names undeclared start condition `{}`",
                rule.pattern, name
              ),
            ));
          }
        }
      }
      if let Some(name) = &rule.action.enter {
        if !conditions.contains_key(name) {
          return Err(GrammarError::new(
            GrammarErrorKind::NameNotFound,
            format!(
              "lex rule /{}/ enters undeclared start condition `{}`",
              rule.pattern, name
            ),
          ));
        }
      }

      let expanded = expand_macros(&rule.pattern, &macros)?;
      let re = Regex::new(&format!("^(?:{})", expanded)).map_err(|err| {
        GrammarError::new(
          GrammarErrorKind::BadPattern,
          format!("lex rule /{}/ does not compile: {}", rule.pattern, err),
        )
      })?;
      rules.push(CompiledRule {
        re,
        action: rule.action.clone(),
      });
    }

    let mut active = Map::new();
    for (name, kind) in &conditions {
      let indices = spec
        .rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| match &rule.conditions {
          RuleScope::Default => *kind == LexConditionKind::Inclusive,
          RuleScope::Conditions(names) => names.iter().any(|c| c == name),
        })
        .map(|(i, _)| i)
        .collect();
      active.insert(name.clone(), indices);
    }

    Ok(Self { rules, active })
  }

  pub(crate) fn rule(&self, ix: usize) -> &CompiledRule {
    &self.rules[ix]
  }

  /// rule indices active under a start condition, in declaration order.
  pub fn active_rules(&self, condition: &str) -> &[usize] {
    self
      .active
      .get(condition)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn num_rules(&self) -> usize {
    self.rules.len()
  }
}

/// Expands `{name}` references textually, innermost first. Repetition
/// counts like `{2,3}` are left alone since they do not look like
/// identifiers.
fn expand_macros(pattern: &str, macros: &Map<&str, &str>) -> Result<String, GrammarError> {
  let mut current = pattern.to_owned();

  for _ in 0..64 {
    let mut output = String::with_capacity(current.len());
    let mut replaced = false;
    let mut rest = current.as_str();

    while let Some(open) = rest.find('{') {
      output.push_str(&rest[..open]);
      let tail = &rest[open + 1..];
      match tail.find('}') {
        Some(close) if is_macro_name(&tail[..close]) => {
          let name = &tail[..close];
          match macros.get(name) {
            Some(body) => {
              output.push_str("(?:");
              output.push_str(body);
              output.push(')');
              replaced = true;
            }
            None => {
              return Err(GrammarError::new(
                GrammarErrorKind::BadPattern,
                format!("pattern /{}/ references unknown lex macro `{}`", pattern, name),
              ));
            }
          }
          rest = &tail[close + 1..];
        }
        _ => {
          output.push('{');
          rest = tail;
        }
      }
    }
    output.push_str(rest);

    if !replaced {
      return Ok(output);
    }
    current = output;
  }

  Err(GrammarError::new(
    GrammarErrorKind::BadPattern,
    format!("macro expansion of /{}/ does not terminate", pattern),
  ))
}

fn is_macro_name(s: &str) -> bool {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
