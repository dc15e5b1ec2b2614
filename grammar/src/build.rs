//! Grammar normalization: symbol interning, production numbering,
//! augmentation, operator-table lowering, and lex-grammar synthesis.

use crate::grammar::{
  Assoc, Grammar, GrammarDef, NonterminalIdGen, ParserMode, Production, Symbol,
  TokenId, TokenIdGen, ACCEPT_NT,
};
use crate::lexer::{LexEmit, LexGrammar, LexRule, LexSpec};
use crate::sets;
use crate::{BiMap, GrammarError, GrammarErrorKind, Map, Set};

impl Grammar {
  /// Normalizes a grammar description for the given parser mode. The result
  /// is immutable; every derived table (production indexes, operator
  /// precedences, analysis sets, the compiled lex grammar) is computed here.
  pub fn build(
    def: GrammarDef,
    mode: ParserMode,
    capture_locations: bool,
  ) -> Result<Grammar, GrammarError> {
    if def.bnf.is_empty() {
      return Err(GrammarError::new(
        GrammarErrorKind::EmptyGrammar,
        "the grammar has no rules",
      ));
    }

    let mut nt_id_gen = NonterminalIdGen::default();
    let mut nts = BiMap::new();
    for (name, _) in &def.bnf {
      if nts.get_by_right(name).is_some() {
        return Err(GrammarError::new(
          GrammarErrorKind::NameConflict,
          format!("rule `{}` is declared twice", name),
        ));
      }
      nts.insert(nt_id_gen.gen(), name.clone());
    }

    let mut token_id_gen = TokenIdGen::default();
    let mut tokens = BiMap::<TokenId, String>::new();
    let mut intern_token = |tokens: &mut BiMap<TokenId, String>, name: &str| {
      if let Some(&id) = tokens.get_by_right(name) {
        id
      } else {
        let id = token_id_gen.gen();
        tokens.insert(id, name.to_owned());
        id
      }
    };

    for name in &def.tokens {
      let name = unquote(name);
      if nts.get_by_right(name).is_some() {
        return Err(GrammarError::new(
          GrammarErrorKind::NameConflict,
          format!("declared token `{}` also has productions", name),
        ));
      }
      intern_token(&mut tokens, name);
    }

    // terminal literals, in order of first appearance
    let mut literals = Vec::new();
    for (_, alts) in &def.bnf {
      for alt in alts {
        for entry in &alt.rhs {
          if is_quoted(entry) {
            let name = unquote(entry);
            if tokens.get_by_right(name).is_none() {
              intern_token(&mut tokens, name);
              literals.push(name.to_owned());
            }
          }
        }
      }
    }

    // token kinds produced by user lex rules
    let lex_spec = def.lex.clone().unwrap_or_default();
    for rule in &lex_spec.rules {
      if let LexEmit::Token(name) = &rule.action.emit {
        if nts.get_by_right(name).is_some() {
          return Err(GrammarError::new(
            GrammarErrorKind::NameConflict,
            format!("lex rule token `{}` collides with a rule name", name),
          ));
        }
        intern_token(&mut tokens, name);
      }
    }

    let start_nt = match &def.start {
      Some(name) => match nts.get_by_right(name) {
        Some(&nt) => nt,
        None => {
          return Err(GrammarError::new(
            GrammarErrorKind::UndefinedStart,
            format!("start symbol `{}` has no productions", name),
          ));
        }
      },
      None => *nts.get_by_right(&def.bnf[0].0).unwrap(),
    };

    // operator table: level index, 1-based, is the precedence
    let mut op_levels = Map::<String, (Assoc, u32)>::new();
    let mut token_precs = Map::new();
    let mut operators = Vec::with_capacity(def.operators.len());
    for (level0, (assoc, names)) in def.operators.iter().enumerate() {
      let level = level0 as u32 + 1;
      let mut level_tokens = Vec::new();
      for name in names {
        let name = unquote(name);
        if op_levels.insert(name.to_owned(), (*assoc, level)).is_some() {
          return Err(GrammarError::new(
            GrammarErrorKind::NameConflict,
            format!("operator `{}` is declared twice", name),
          ));
        }
        if let Some(&token) = tokens.get_by_right(name) {
          token_precs.insert(token, (*assoc, level));
          level_tokens.push(token);
        }
      }
      operators.push((*assoc, level_tokens));
    }

    let mut prods = Vec::new();
    let mut nt_prods = Map::new();
    let first_prod_num = if mode.is_lr() { 0 } else { 1 };

    let accept_nt = if mode.is_lr() {
      let accept = nt_id_gen.gen();
      if nts.insert_no_overwrite(accept, ACCEPT_NT.to_owned()).is_err() {
        return Err(GrammarError::new(
          GrammarErrorKind::NameConflict,
          format!("`{}` is a reserved rule name", ACCEPT_NT),
        ));
      }
      prods.push(Production {
        num: 0,
        nt: accept,
        symbols: vec![Symbol::Nonterminal(start_nt)],
        action: None,
        prec: None,
      });
      nt_prods.insert(accept, 0..1);
      Some(accept)
    } else {
      None
    };

    for (name, alts) in &def.bnf {
      let nt = *nts.get_by_right(name).unwrap();
      let start_ix = prods.len();

      if alts.is_empty() {
        return Err(GrammarError::new(
          GrammarErrorKind::EmptyGrammar,
          format!("rule `{}` has no alternatives", name),
        ));
      }

      for alt in alts {
        let mut symbols = Vec::with_capacity(alt.rhs.len());
        for entry in &alt.rhs {
          let sym = if is_quoted(entry) {
            Symbol::Token(*tokens.get_by_right(unquote(entry)).unwrap())
          } else if let Some(&token) = tokens.get_by_right(entry.as_str()) {
            Symbol::Token(token)
          } else if let Some(&nt) = nts.get_by_right(entry.as_str()) {
            Symbol::Nonterminal(nt)
          } else {
            return Err(GrammarError::new(
              GrammarErrorKind::NameNotFound,
              format!("unknown symbol `{}` in rule `{}`", entry, name),
            ));
          };
          symbols.push(sym);
        }

        let prec = match &alt.prec {
          Some(tag) => match op_levels.get(unquote(tag)) {
            Some(&(_, level)) => Some(level),
            None => {
              return Err(GrammarError::new(
                GrammarErrorKind::UnknownPrecedence,
                format!("rule `{}` names unknown precedence `{}`", name, tag),
              ));
            }
          },
          // inherit from the last terminal of the RHS
          None => symbols
            .iter()
            .rev()
            .find_map(|sym| match sym {
              Symbol::Token(token) => token_precs.get(token).map(|&(_, level)| level),
              Symbol::Nonterminal(_) => None,
            }),
        };

        prods.push(Production {
          num: prods.len() as u32 + first_prod_num,
          nt,
          symbols,
          action: alt.action.clone(),
          prec,
        });
      }

      nt_prods.insert(nt, start_ix..prods.len());
    }

    let mut rhs_index = Map::<Symbol, Vec<u32>>::new();
    for (i, prod) in prods.iter().enumerate() {
      for &sym in &prod.symbols {
        let index = rhs_index.entry(sym).or_default();
        if index.last() != Some(&(i as u32)) {
          index.push(i as u32);
        }
      }
    }

    let lex = build_lex(lex_spec, &literals, &tokens, &rhs_index)?;

    let mut grammar = Grammar {
      mode,
      capture_locations,
      prods,
      start_nt,
      accept_nt,
      nts,
      nt_prods,
      tokens,
      token_precs,
      operators,
      rhs_index,
      lex,
      sets: sets::Sets::default(),
      first_prod_num,
    };
    grammar.sets = sets::compute(&grammar);

    Ok(grammar)
  }
}

/// Appends one literal-matching rule per terminal literal no user rule
/// produces, then compiles the whole specification. Fails if a terminal
/// used on some RHS has no producing rule at all.
fn build_lex(
  mut spec: LexSpec,
  literals: &[String],
  tokens: &BiMap<TokenId, String>,
  rhs_index: &Map<Symbol, Vec<u32>>,
) -> Result<LexGrammar, GrammarError> {
  let mut emitted = Set::new();
  for rule in &spec.rules {
    if let LexEmit::Token(name) = &rule.action.emit {
      emitted.insert(name.clone());
    }
  }

  for literal in literals {
    if !emitted.contains(literal) {
      spec.rules.push(LexRule::token(&regex::escape(literal), literal));
      emitted.insert(literal.clone());
    }
  }

  for (&token, name) in tokens {
    if rhs_index.contains_key(&Symbol::Token(token)) && !emitted.contains(name) {
      return Err(GrammarError::new(
        GrammarErrorKind::MissingLexRule,
        format!("terminal `{}` has no lex rule", name),
      ));
    }
  }

  LexGrammar::compile(&spec)
}

fn is_quoted(s: &str) -> bool {
  (s.len() >= 2 && s.starts_with('\'') && s.ends_with('\''))
    || (s.len() >= 2 && s.starts_with('"') && s.ends_with('"'))
}

fn unquote(s: &str) -> &str {
  if is_quoted(s) {
    &s[1..s.len() - 1]
  } else {
    s
  }
}
