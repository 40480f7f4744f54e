//! Canonical LR(1) automaton construction: augmentation, closure with
//! lookahead propagation, GOTO, worklist-driven state deduplication, and
//! the terminal-lookahead repair spec §4.2 mandates.

use crate::error::BuildError;
use crate::first_follow::{self, FirstSets, FollowSets};
use crate::grammar::{Grammar, Production};
use crate::item::Item;
use crate::state::State;
use crate::symbol::Symbol;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Iteration ceilings and diagnostics toggle threaded down from
/// [`crate::engine::EngineConfig`]. Kept here rather than duplicated so
/// `Automaton::build` and `Grammar`'s fixed-point both read from one place
/// when invoked through the facade.
#[derive(Debug, Clone)]
pub struct AutomatonConfig {
    /// Closure fixed-point cap, spec requires >= 200.
    pub closure_iteration_cap: usize,
    /// State-construction worklist cap, spec requires >= 1000.
    pub build_iteration_cap: usize,
    pub verbose: bool,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            closure_iteration_cap: 512,
            build_iteration_cap: 4096,
            verbose: false,
        }
    }
}

/// The canonical LR(1) state graph for a grammar: an arena of
/// [`Production`]s (index 0 is the synthesized `S' -> S`) and an arena of
/// [`State`]s, referenced only by index so the graph never needs owning
/// cycles (spec §9).
#[derive(Debug, Clone)]
pub struct Automaton {
    pub productions: Vec<Production>,
    pub states: Vec<State>,
    pub augmented_start: Symbol,
    nonterminals: HashSet<Symbol>,
    production_indices: HashMap<Symbol, Vec<usize>>,
}

impl Automaton {
    pub fn build(grammar: &Grammar, config: &AutomatonConfig) -> Result<Self, BuildError> {
        let start = grammar
            .start_symbol()
            .cloned()
            .ok_or(BuildError::Grammar(crate::error::GrammarError::NoStartSymbol))?;

        if grammar.productions_for(&start).next().is_none() {
            return Err(BuildError::UnreferencedStartSymbol(start.to_string()));
        }

        let first_sets = first_follow::compute_first_sets(grammar)?;
        let follow_sets = first_follow::compute_follow_sets(grammar, &first_sets)?;

        let augmented_start = Symbol::augmented(&start);
        let mut productions = Vec::with_capacity(grammar.all_productions().len() + 1);
        productions.push(Production::new(augmented_start.clone(), vec![start.clone()]));
        productions.extend(grammar.all_productions().iter().cloned());

        let mut nonterminals: HashSet<Symbol> = grammar.nonterminals().cloned().collect();
        nonterminals.insert(augmented_start.clone());

        let mut production_indices: HashMap<Symbol, Vec<usize>> = HashMap::new();
        for (index, production) in productions.iter().enumerate() {
            production_indices
                .entry(production.lhs.clone())
                .or_default()
                .push(index);
        }

        let mut automaton = Automaton {
            productions,
            states: Vec::new(),
            augmented_start,
            nonterminals,
            production_indices,
        };

        let mut seed = State::new();
        seed.insert(Item::new(0, 0, BTreeSet::from([Symbol::end_marker()])));
        let state0 = automaton.closure(seed, &first_sets, config);
        automaton.states.push(state0);

        let mut dedup: HashMap<String, usize> = HashMap::new();
        dedup.insert(automaton.states[0].canonical_key(), 0);

        let mut worklist: VecDeque<usize> = VecDeque::from([0]);
        let mut iterations = 0usize;
        while let Some(state_id) = worklist.pop_front() {
            iterations += 1;
            if iterations > config.build_iteration_cap {
                log::warn!(
                    "automaton build hit the iteration cap ({}); grammar may be pathological",
                    config.build_iteration_cap
                );
                break;
            }

            let mut symbols: BTreeSet<Symbol> = BTreeSet::new();
            for item in &automaton.states[state_id].items {
                if let Some(symbol) = automaton.productions[item.production].rhs.get(item.dot) {
                    symbols.insert(symbol.clone());
                }
            }

            for symbol in symbols {
                let next_state = automaton.goto(state_id, &symbol, &first_sets, config);
                if next_state.items.is_empty() {
                    continue;
                }

                let key = next_state.canonical_key();
                let target = if let Some(&existing) = dedup.get(&key) {
                    existing
                } else {
                    let id = automaton.states.len();
                    if config.verbose {
                        log::info!("allocated state {id} via {state_id} --{symbol}-->");
                    }
                    automaton.states.push(next_state);
                    dedup.insert(key, id);
                    worklist.push_back(id);
                    id
                };

                automaton.states[state_id].transitions.insert(symbol, target);
            }
        }

        repair_terminal_lookaheads(
            &automaton.productions,
            &mut automaton.states,
            &follow_sets,
            &automaton.nonterminals,
        );

        Ok(automaton)
    }

    /// Closure of a seed item set: repeatedly adds the initial items of
    /// every nonterminal immediately after a dot, with lookahead
    /// `FIRST(βL)` substituting the seed item's own lookaheads `L` when
    /// `β` is fully nullable.
    fn closure(&self, mut state: State, first_sets: &FirstSets, config: &AutomatonConfig) -> State {
        let mut iterations = 0usize;
        loop {
            iterations += 1;
            if iterations > config.closure_iteration_cap {
                log::warn!(
                    "closure computation hit the iteration cap ({})",
                    config.closure_iteration_cap
                );
                break;
            }

            let mut changed = false;
            let snapshot: Vec<Item> = state.items.clone();
            for item in &snapshot {
                let production = &self.productions[item.production];
                let Some(after_dot) = production.rhs.get(item.dot) else {
                    continue;
                };
                if !self.nonterminals.contains(after_dot) {
                    continue;
                }

                let beta = &production.rhs[item.dot + 1..];
                let lookaheads = first_of_seq_with_subst(first_sets, beta, &item.lookaheads);

                if let Some(indices) = self.production_indices.get(after_dot) {
                    for &production_index in indices {
                        if state.insert(Item::new(production_index, 0, lookaheads.clone())) {
                            changed = true;
                        }
                    }
                }
            }

            if !changed {
                break;
            }
        }

        if config.verbose {
            log::debug!("closure settled with {} items", state.items.len());
        }
        state
    }

    /// GOTO(state, symbol): advance the dot over `symbol` in every item
    /// that can, then close the result.
    fn goto(
        &self,
        state_id: usize,
        symbol: &Symbol,
        first_sets: &FirstSets,
        config: &AutomatonConfig,
    ) -> State {
        let mut seed = State::new();
        for item in self.states[state_id].items_before(symbol, &self.productions) {
            seed.insert(item.advance());
        }
        self.closure(seed, first_sets, config)
    }

    pub fn production_indices_for(&self, lhs: &Symbol) -> &[usize] {
        self.production_indices
            .get(lhs)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.nonterminals.contains(symbol)
    }
}

/// FIRST(βL): FIRST of `beta` with its own epsilon (if any) replaced by
/// the lookahead set `lookaheads` being propagated into the new item.
fn first_of_seq_with_subst(
    first_sets: &FirstSets,
    beta: &[Symbol],
    lookaheads: &BTreeSet<Symbol>,
) -> BTreeSet<Symbol> {
    let mut result = first_follow::first_of_sequence(first_sets, beta);
    let nullable = result.remove(&Symbol::epsilon());
    if nullable || beta.is_empty() {
        result.extend(lookaheads.iter().cloned());
    }
    result
}

/// Terminal-lookahead repair (spec §4.2, §9): the straightforward closure
/// under-approximates lookaheads for productions whose entire RHS is a
/// single terminal. Replacing such an item's lookahead set with
/// `FOLLOW(lhs)` after the automaton is built is a mandatory
/// post-processing step, not optional tuning.
fn repair_terminal_lookaheads(
    productions: &[Production],
    states: &mut [State],
    follow_sets: &FollowSets,
    nonterminals: &HashSet<Symbol>,
) {
    for state in states.iter_mut() {
        for item in state.items.iter_mut() {
            let production = &productions[item.production];
            let is_unit_terminal =
                production.rhs.len() == 1 && !nonterminals.contains(&production.rhs[0]);
            if item.dot == production.rhs.len() && is_unit_terminal {
                if let Some(follow) = follow_sets.get(&production.lhs) {
                    item.lookaheads = follow.clone();
                }
            }
        }
    }
}
