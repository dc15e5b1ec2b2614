use std::fmt;
use std::ops::Range;
use crate::lexer::{LexGrammar, LexSpec};
use crate::sets::Sets;
use crate::{BiMap, Map};

/// Name of the synthetic start non-terminal of augmented LR grammars.
pub const ACCEPT_NT: &str = "$accept";

/// Name of the end-of-input token.
pub const EOF_TOKEN: &str = "$";

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct TokenId(u32);

impl TokenId {
  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }

  pub fn from_index(i: usize) -> Self {
    Self(i as u32)
  }
}

#[derive(Default)]
pub struct TokenIdGen(u32);

impl TokenIdGen {
  pub fn gen(&mut self) -> TokenId {
    let i = self.0;
    self.0 += 1;
    TokenId(i)
  }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NonterminalId(u32);

impl NonterminalId {
  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }

  pub fn from_index(i: usize) -> Self {
    Self(i as u32)
  }
}

#[derive(Default)]
pub struct NonterminalIdGen(u32);

impl NonterminalIdGen {
  pub fn gen(&mut self) -> NonterminalId {
    let i = self.0;
    self.0 += 1;
    NonterminalId(i)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  Token(TokenId),
  Nonterminal(NonterminalId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Assoc {
  LeftAssoc,
  RightAssoc,
  NonAssoc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserMode {
  Lr0,
  Slr1,
  Lalr1,
  Clr1,
  Ll1,
}

impl ParserMode {
  pub fn is_lr(self) -> bool {
    !matches!(self, ParserMode::Ll1)
  }
}

/// One alternative of a BNF rule, as written in the grammar description.
///
/// Right-hand-side entries are symbol names; quoted entries like `'+'` are
/// terminal literals, bare names resolve to declared tokens or rules. An
/// empty RHS is an epsilon alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleAlt {
  pub rhs: Vec<String>,
  pub action: Option<String>,
  pub prec: Option<String>,
}

impl RuleAlt {
  /// Splits `rhs` on whitespace; `RuleAlt::new("E '+' E")` has three symbols.
  pub fn new(rhs: &str) -> Self {
    Self {
      rhs: rhs.split_whitespace().map(str::to_owned).collect(),
      action: None,
      prec: None,
    }
  }

  pub fn action(mut self, code: impl Into<String>) -> Self {
    self.action = Some(code.into());
    self
  }

  pub fn prec(mut self, tag: impl Into<String>) -> Self {
    self.prec = Some(tag.into());
    self
  }
}

/// The structured grammar description accepted by [`Grammar::build`].
#[derive(Debug, Clone, Default)]
pub struct GrammarDef {
  pub lex: Option<LexSpec>,
  /// non-terminal name -> alternatives, in declaration order.
  pub bnf: Vec<(String, Vec<RuleAlt>)>,
  /// declared token names that are not quoted literals.
  pub tokens: Vec<String>,
  /// precedence levels, loosest first; level index (1-based) is the
  /// precedence, the names are terminals or `%prec`-only tags.
  pub operators: Vec<(Assoc, Vec<String>)>,
  pub start: Option<String>,
}

impl GrammarDef {
  pub fn rule(mut self, name: &str, alts: impl IntoIterator<Item = RuleAlt>) -> Self {
    self.bnf.push((name.to_owned(), alts.into_iter().collect()));
    self
  }

  pub fn tokens(mut self, names: &[&str]) -> Self {
    self.tokens.extend(names.iter().map(|s| (*s).to_owned()));
    self
  }

  pub fn operator(mut self, assoc: Assoc, names: &[&str]) -> Self {
    self
      .operators
      .push((assoc, names.iter().map(|s| (*s).to_owned()).collect()));
    self
  }

  pub fn start(mut self, name: &str) -> Self {
    self.start = Some(name.to_owned());
    self
  }

  pub fn lex(mut self, spec: LexSpec) -> Self {
    self.lex = Some(spec);
    self
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
  /// stable production number: dense from 0 for LR grammars (0 is the
  /// augmented production), dense from 1 for LL grammars.
  pub num: u32,
  pub nt: NonterminalId,
  pub symbols: Vec<Symbol>,
  /// opaque semantic-action body, interpreted by an action evaluator or a
  /// code generator, never by the core.
  pub action: Option<String>,
  /// precedence level, from an explicit tag or the last terminal of the RHS.
  pub prec: Option<u32>,
}

impl Production {
  pub fn rhs_len(&self) -> usize {
    self.symbols.len()
  }

  pub fn fmt(&self, grammar: &Grammar, f: &mut impl fmt::Write) -> fmt::Result {
    write!(f, "{} ->", grammar.nt_name(self.nt))?;
    if self.symbols.is_empty() {
      write!(f, " %empty")?;
    }
    for sym in &self.symbols {
      write!(f, " {}", grammar.symbol_name(*sym))?;
    }
    Ok(())
  }

  pub fn to_string(&self, grammar: &Grammar) -> String {
    let mut s = String::new();
    self.fmt(grammar, &mut s).unwrap();
    s
  }
}

/// A normalized grammar. Built once by [`Grammar::build`], immutable
/// afterwards; all derived tables (production indexes, analysis sets, the
/// compiled lex grammar) are computed during construction.
#[derive(Debug)]
pub struct Grammar {
  pub mode: ParserMode,
  pub capture_locations: bool,
  /// productions in numbering order; for LR grammars index 0 is the
  /// augmented production and index equals number.
  pub prods: Vec<Production>,
  pub start_nt: NonterminalId,
  /// the `$accept` non-terminal, present for LR modes only.
  pub accept_nt: Option<NonterminalId>,
  pub nts: BiMap<NonterminalId, String>,
  /// productions of each non-terminal, as a contiguous index range.
  pub nt_prods: Map<NonterminalId, Range<usize>>,
  /// user terminals; EOF is the token with the greatest id and lives
  /// outside this map.
  pub tokens: BiMap<TokenId, String>,
  pub token_precs: Map<TokenId, (Assoc, u32)>,
  pub operators: Vec<(Assoc, Vec<TokenId>)>,
  /// production indices whose RHS contains the symbol.
  pub rhs_index: Map<Symbol, Vec<u32>>,
  pub lex: LexGrammar,
  pub sets: Sets,
  pub(crate) first_prod_num: u32,
}

impl Grammar {
  pub fn eof(&self) -> TokenId {
    TokenId(self.tokens.len() as u32)
  }

  /// number of token columns in parsing tables, EOF included.
  pub fn num_tokens(&self) -> usize {
    self.tokens.len() + 1
  }

  pub fn num_nts(&self) -> usize {
    self.nts.len()
  }

  pub fn token_name(&self, token: TokenId) -> &str {
    self
      .tokens
      .get_by_left(&token)
      .map(|s| s.as_str())
      .unwrap_or(EOF_TOKEN)
  }

  pub fn nt_name(&self, nt: NonterminalId) -> &str {
    self.nts.get_by_left(&nt).map(|s| s.as_str()).unwrap_or("?")
  }

  pub fn symbol_name(&self, sym: Symbol) -> &str {
    match sym {
      Symbol::Token(token) => self.token_name(token),
      Symbol::Nonterminal(nt) => self.nt_name(nt),
    }
  }

  pub fn start_symbol(&self) -> &str {
    self.nt_name(self.start_nt)
  }

  /// the production with the given stable number.
  pub fn production(&self, num: u32) -> &Production {
    &self.prods[(num - self.first_prod_num) as usize]
  }

  /// the augmented production `$accept -> start`, LR grammars only.
  pub fn augmented(&self) -> Option<&Production> {
    self.accept_nt.map(|_| &self.prods[0])
  }

  pub fn prods_for(&self, nt: NonterminalId) -> &[Production] {
    &self.prods[self.nt_prods[&nt].clone()]
  }

  /// indices into `prods` of productions whose RHS mentions `sym`.
  pub fn prods_containing(&self, sym: Symbol) -> &[u32] {
    self
      .rhs_index
      .get(&sym)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// precedence and associativity of a terminal, if the operator table
  /// defines one.
  pub fn operator(&self, token: TokenId) -> Option<(Assoc, u32)> {
    self.token_precs.get(&token).copied()
  }

  pub fn tokenizer<'g, 'i>(&'g self, input: &'i str) -> crate::lexer::Tokenizer<'g, 'i> {
    crate::lexer::Tokenizer::new(self, input)
  }
}
