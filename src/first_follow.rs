//! FIRST and FOLLOW set computation for context-free grammars.
//!
//! Implements the fixed-point algorithms from Aho et al., "Compilers:
//! Principles, Techniques, and Tools" (2nd Edition), §4.4, generalized
//! from `char` symbols to interned string [`Symbol`]s and bounded by
//! `Grammar::max_fixpoint_iterations` per spec §4.1.

use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::{BTreeSet, HashMap};

pub type FirstSets = HashMap<Symbol, BTreeSet<Symbol>>;
pub type FollowSets = HashMap<Symbol, BTreeSet<Symbol>>;

/// Computes FIRST(X) for every terminal and nonterminal X in `grammar`.
///
/// Terminals are self-first (`FIRST(a) = {a}`); the epsilon marker is
/// first of itself. Nonterminal FIRST sets are grown by a fixed-point
/// iteration over every production, bounded by
/// [`Grammar::max_fixpoint_iterations`] (never below 100, per spec).
pub fn compute_first_sets(grammar: &Grammar) -> Result<FirstSets, GrammarError> {
    let mut first: FirstSets = HashMap::new();

    for terminal in grammar.terminals() {
        first.entry(terminal.clone()).or_default().insert(terminal.clone());
    }
    first.entry(Symbol::epsilon()).or_default().insert(Symbol::epsilon());
    for nonterminal in grammar.nonterminals() {
        first.entry(nonterminal.clone()).or_default();
    }

    let cap = grammar.max_fixpoint_iterations().max(100);
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        if iterations > cap {
            return Err(GrammarError::IterationLimitExceeded(cap));
        }

        let mut changed = false;
        for production in grammar.all_productions() {
            let rhs_first = first_of_sequence(&first, &production.rhs);
            let entry = first.entry(production.lhs.clone()).or_default();
            let before = entry.len();
            entry.extend(rhs_first);
            if entry.len() != before {
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    Ok(first)
}

/// FIRST of a symbol sequence `X1 X2 ... Xk`: the union of `FIRST(Xi) \
/// {ε}` while every preceding `Xj` is nullable, plus ε itself if the whole
/// sequence (or an empty sequence) is nullable.
pub fn first_of_sequence(first: &FirstSets, sequence: &[Symbol]) -> BTreeSet<Symbol> {
    let mut result = BTreeSet::new();
    let mut nullable_prefix = true;

    for symbol in sequence {
        if !nullable_prefix {
            break;
        }

        let symbol_first = first.get(symbol).cloned().unwrap_or_default();
        for s in &symbol_first {
            if !s.is_epsilon() {
                result.insert(s.clone());
            }
        }
        nullable_prefix = symbol_first.contains(&Symbol::epsilon());
    }

    if nullable_prefix {
        result.insert(Symbol::epsilon());
    }

    result
}

/// Computes FOLLOW(A) for every nonterminal A in `grammar`.
pub fn compute_follow_sets(
    grammar: &Grammar,
    first: &FirstSets,
) -> Result<FollowSets, GrammarError> {
    let mut follow: FollowSets = HashMap::new();
    for nonterminal in grammar.nonterminals() {
        follow.entry(nonterminal.clone()).or_default();
    }
    if let Some(start) = grammar.start_symbol() {
        follow.entry(start.clone()).or_default().insert(Symbol::end_marker());
    }

    let cap = grammar.max_fixpoint_iterations().max(100);
    let mut iterations = 0usize;
    loop {
        iterations += 1;
        if iterations > cap {
            return Err(GrammarError::IterationLimitExceeded(cap));
        }

        let mut changed = false;
        for production in grammar.all_productions() {
            for (i, symbol) in production.rhs.iter().enumerate() {
                if !grammar.is_nonterminal(symbol) {
                    continue;
                }

                let beta = &production.rhs[i + 1..];
                let beta_first = first_of_sequence(first, beta);

                let mut additions: BTreeSet<Symbol> = beta_first
                    .iter()
                    .filter(|s| !s.is_epsilon())
                    .cloned()
                    .collect();

                if beta.is_empty() || beta_first.contains(&Symbol::epsilon()) {
                    if let Some(follow_lhs) = follow.get(&production.lhs) {
                        additions.extend(follow_lhs.iter().cloned());
                    }
                }

                let entry = follow.entry(symbol.clone()).or_default();
                let before = entry.len();
                entry.extend(additions);
                if entry.len() != before {
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    Ok(follow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arithmetic_grammar() -> Grammar {
        let mut g = Grammar::new();
        g.add_production("E", ["E", "+", "T"]);
        g.add_production("E", ["T"]);
        g.add_production("T", ["T", "*", "F"]);
        g.add_production("T", ["F"]);
        g.add_production("F", ["(", "E", ")"]);
        g.add_production("F", ["num"]);
        g
    }

    #[test]
    fn first_of_arithmetic_grammar() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g).unwrap();
        let e = Symbol::new("E");
        let expected: BTreeSet<Symbol> = ["(", "num"].into_iter().map(Symbol::new).collect();
        assert_eq!(first[&e], expected);
    }

    #[test]
    fn follow_of_start_symbol_contains_end_marker() {
        let g = arithmetic_grammar();
        let first = compute_first_sets(&g).unwrap();
        let follow = compute_follow_sets(&g, &first).unwrap();
        assert!(follow[&Symbol::new("E")].contains(&Symbol::end_marker()));
    }

    #[test]
    fn follow_propagates_through_nullable_suffix() {
        let mut g = Grammar::new();
        g.add_production("S", ["A", "B"]);
        g.add_production::<&str, &str, _>("B", []);
        g.add_production("A", ["a"]);
        let first = compute_first_sets(&g).unwrap();
        let follow = compute_follow_sets(&g, &first).unwrap();
        assert!(follow[&Symbol::new("A")].contains(&Symbol::end_marker()));
        assert!(follow[&Symbol::new("B")].contains(&Symbol::end_marker()));
    }

    #[test]
    fn iteration_cap_is_enforced() {
        let g = Grammar::with_max_iterations(0);
        let err = compute_first_sets(&g);
        assert!(err.is_ok() || matches!(err, Err(GrammarError::IterationLimitExceeded(_))));
    }
}
