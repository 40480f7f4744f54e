//! Grammar storage: productions, derived terminal/nonterminal sets.
//!
//! FIRST/FOLLOW computation itself lives in [`crate::first_follow`], kept
//! as its own module as in the teacher crate; `Grammar` only owns the data
//! those functions consume.

use crate::symbol::Symbol;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// A production rule `lhs -> rhs`. `rhs` may be empty (an epsilon
/// production).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: Symbol, rhs: Vec<Symbol>) -> Self {
        Self { lhs, rhs }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} -> ε", self.lhs)
        } else {
            let rhs: Vec<String> = self.rhs.iter().map(|s| s.to_string()).collect();
            write!(f, "{} -> {}", self.lhs, rhs.join(" "))
        }
    }
}

/// A context-free grammar accumulated via [`Grammar::add_production`].
///
/// Symbols are classified lazily: a symbol is a nonterminal iff it has
/// appeared as some production's LHS. This means a symbol first seen on an
/// RHS and only later used as an LHS is reclassified the moment that later
/// call happens, per spec §4.1.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    start_symbol: Option<Symbol>,
    lhs_symbols: HashSet<Symbol>,
    all_symbols: BTreeSet<Symbol>,
    production_indices: HashMap<Symbol, Vec<usize>>,
    max_fixpoint_iterations: usize,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    /// Creates an empty grammar with the default fixed-point iteration
    /// ceiling (256, comfortably above spec's required minimum of 100).
    pub fn new() -> Self {
        Self::with_max_iterations(256)
    }

    pub fn with_max_iterations(max_fixpoint_iterations: usize) -> Self {
        Self {
            productions: Vec::new(),
            start_symbol: None,
            lhs_symbols: HashSet::new(),
            all_symbols: BTreeSet::new(),
            production_indices: HashMap::new(),
            max_fixpoint_iterations,
        }
    }

    /// Appends a production. The first call fixes the grammar's start
    /// symbol. `lhs` is (re)classified as a nonterminal immediately,
    /// regardless of whether it was previously seen only on some RHS.
    pub fn add_production<L, S, R>(&mut self, lhs: L, rhs: R)
    where
        L: Into<Symbol>,
        S: Into<Symbol>,
        R: IntoIterator<Item = S>,
    {
        let lhs = lhs.into();
        if self.start_symbol.is_none() {
            self.start_symbol = Some(lhs.clone());
        }
        self.lhs_symbols.insert(lhs.clone());
        self.all_symbols.insert(lhs.clone());

        let rhs: Vec<Symbol> = rhs.into_iter().map(Into::into).collect();
        for symbol in &rhs {
            self.all_symbols.insert(symbol.clone());
        }

        let index = self.productions.len();
        self.productions.push(Production::new(lhs.clone(), rhs));
        self.production_indices.entry(lhs).or_default().push(index);
    }

    /// True iff `symbol` has been used as some production's LHS.
    pub fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.lhs_symbols.contains(symbol)
    }

    /// True iff `symbol` is neither a nonterminal nor one of the two
    /// reserved markers (`$`, ε).
    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        !self.is_nonterminal(symbol) && !symbol.is_end_marker() && !symbol.is_epsilon()
    }

    /// All symbols classified as terminals (derived view).
    pub fn terminals(&self) -> impl Iterator<Item = &Symbol> {
        self.all_symbols.iter().filter(|s| self.is_terminal(s))
    }

    /// All symbols classified as nonterminals (derived view).
    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> {
        self.lhs_symbols.iter()
    }

    pub fn start_symbol(&self) -> Option<&Symbol> {
        self.start_symbol.as_ref()
    }

    /// Productions with the given LHS, in insertion order.
    pub fn productions_for(&self, lhs: &Symbol) -> impl Iterator<Item = &Production> {
        self.production_indices
            .get(lhs)
            .into_iter()
            .flatten()
            .map(move |&i| &self.productions[i])
    }

    pub fn all_productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn max_fixpoint_iterations(&self) -> usize {
        self.max_fixpoint_iterations
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}
