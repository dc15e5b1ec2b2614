use crate::grammar::{Grammar, TokenId};
use crate::UnexpectedInput;
use super::{LexEmit, INITIAL_CONDITION};

/// Source range of a token or a reduction. Offsets are byte positions,
/// `start_offset` inclusive and `end_offset` exclusive; lines and columns
/// are 1-based and columns count characters, resetting after `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loc {
  pub start_offset: usize,
  pub end_offset: usize,
  pub start_line: u32,
  pub end_line: u32,
  pub start_column: u32,
  pub end_column: u32,
}

impl Loc {
  /// the range covering `first` through `last`.
  pub fn span(first: &Loc, last: &Loc) -> Loc {
    Loc {
      start_offset: first.start_offset,
      end_offset: last.end_offset,
      start_line: first.start_line,
      end_line: last.end_line,
      start_column: first.start_column,
      end_column: last.end_column,
    }
  }

  /// a zero-width range at a point.
  pub fn empty_at(offset: usize, line: u32, column: u32) -> Loc {
    Loc {
      start_offset: offset,
      end_offset: offset,
      start_line: line,
      end_line: line,
      start_column: column,
      end_column: column,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'i> {
  pub kind: TokenId,
  pub text: &'i str,
  pub start: usize,
  pub end: usize,
  /// populated only when the grammar captures locations.
  pub loc: Option<Loc>,
}

/// Streams tokens off an input string, longest match first. Holds the
/// cursor, the start-condition stack, and the line/column counters of one
/// parse; not reusable across inputs.
pub struct Tokenizer<'g, 'i> {
  grammar: &'g Grammar,
  input: &'i str,
  pos: usize,
  line: u32,
  col: u32,
  conditions: Vec<&'g str>,
  /// start of a token accumulated by `more` actions.
  pending: Option<(usize, u32, u32)>,
  finished: bool,
}

impl<'g, 'i> Tokenizer<'g, 'i> {
  pub fn new(grammar: &'g Grammar, input: &'i str) -> Self {
    Self {
      grammar,
      input,
      pos: 0,
      line: 1,
      col: 1,
      conditions: vec![INITIAL_CONDITION],
      pending: None,
      finished: false,
    }
  }

  /// the start condition the next match will be attempted under.
  pub fn condition(&self) -> &str {
    self.conditions.last().unwrap()
  }

  pub fn next_token(&mut self) -> Result<Token<'i>, UnexpectedInput> {
    loop {
      if self.pos >= self.input.len() {
        return Ok(self.eof_token());
      }

      let rest = &self.input[self.pos..];
      let mut best: Option<(usize, usize)> = None;
      for &ix in self.grammar.lex.active_rules(self.conditions.last().unwrap()) {
        if let Some(m) = self.grammar.lex.rule(ix).re.find(rest) {
          // zero-width matches would stall the cursor
          if m.end() > 0 && best.map_or(true, |(len, _)| m.end() > len) {
            best = Some((m.end(), ix));
          }
        }
      }

      let (len, rule_ix) = match best {
        Some(found) => found,
        None => {
          return Err(UnexpectedInput {
            offset: self.pos,
            line: self.line,
            column: self.col,
            found: rest.chars().next(),
          });
        }
      };

      let (start, start_line, start_col) = (self.pos, self.line, self.col);
      for ch in rest[..len].chars() {
        if ch == '\n' {
          self.line += 1;
          self.col = 1;
        } else {
          self.col += 1;
        }
      }
      self.pos += len;

      let action = &self.grammar.lex.rule(rule_ix).action;
      if let Some(condition) = &action.enter {
        self.conditions.push(condition.as_str());
      }
      if action.leave && self.conditions.len() > 1 {
        self.conditions.pop();
      }

      match &action.emit {
        LexEmit::Skip => continue,
        LexEmit::More => {
          if self.pending.is_none() {
            self.pending = Some((start, start_line, start_col));
          }
          continue;
        }
        LexEmit::Token(name) => {
          let kind = match self.grammar.tokens.get_by_right(name.as_str()) {
            Some(&kind) => kind,
            None => unreachable!("lex rule emits unregistered token `{}`", name),
          };
          let (start, start_line, start_col) =
            self.pending.take().unwrap_or((start, start_line, start_col));

          let loc = self.grammar.capture_locations.then(|| Loc {
            start_offset: start,
            end_offset: self.pos,
            start_line,
            end_line: self.line,
            start_column: start_col,
            end_column: self.col,
          });

          return Ok(Token {
            kind,
            text: &self.input[start..self.pos],
            start,
            end: self.pos,
            loc,
          });
        }
      }
    }
  }

  fn eof_token(&self) -> Token<'i> {
    let end = self.input.len();
    Token {
      kind: self.grammar.eof(),
      text: "",
      start: end,
      end,
      loc: self
        .grammar
        .capture_locations
        .then(|| Loc::empty_at(end, self.line, self.col)),
    }
  }

}

impl<'g, 'i> Iterator for Tokenizer<'g, 'i> {
  type Item = Result<Token<'i>, UnexpectedInput>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }

    let result = self.next_token();
    match &result {
      Ok(token) if token.kind == self.grammar.eof() => self.finished = true,
      Err(_) => self.finished = true,
      _ => {}
    }
    Some(result)
  }
}
