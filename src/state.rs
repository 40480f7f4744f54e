//! Automaton states: item sets with dedup-by-core lookahead merging, and
//! outgoing transitions.

use crate::grammar::Production;
use crate::item::Item;
use crate::symbol::Symbol;
use std::collections::HashMap;

/// A set of LR(1) items plus the transitions leading out of it.
///
/// Items are stored as an insertion-ordered `Vec` (so iteration order is
/// deterministic across runs) with a side index from item *core* to
/// position, used to merge lookaheads into an existing item rather than
/// inserting a duplicate.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub items: Vec<Item>,
    core_index: HashMap<(usize, usize), usize>,
    pub transitions: HashMap<Symbol, usize>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item`, merging its lookaheads into an existing item with
    /// the same core if one is already present. Returns `true` if the
    /// item set changed (a new item was added, or lookaheads grew) — used
    /// by the closure fixed-point to detect convergence.
    pub fn insert(&mut self, item: Item) -> bool {
        if let Some(&idx) = self.core_index.get(&item.core()) {
            let before = self.items[idx].lookaheads.len();
            self.items[idx].lookaheads.extend(item.lookaheads);
            self.items[idx].lookaheads.len() != before
        } else {
            self.core_index.insert(item.core(), self.items.len());
            self.items.push(item);
            true
        }
    }

    /// Items whose dot immediately precedes `symbol`.
    pub fn items_before<'a>(
        &'a self,
        symbol: &'a Symbol,
        productions: &'a [Production],
    ) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| productions[item.production].rhs.get(item.dot) == Some(symbol))
    }

    /// Complete items (dot at the end of their production's RHS).
    pub fn complete_items<'a>(
        &'a self,
        productions: &'a [Production],
    ) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.dot == productions[item.production].rhs.len())
    }

    /// A canonical string key for this item set (sorted concatenation of
    /// per-item keys), used by the automaton's state-dedup table. Two
    /// states are equal iff their canonical keys are equal, per spec §4.3.
    pub fn canonical_key(&self) -> String {
        let mut parts: Vec<String> = self
            .items
            .iter()
            .map(|item| {
                let lookaheads: Vec<&str> =
                    item.lookaheads.iter().map(Symbol::as_str).collect();
                format!("{}.{}[{}]", item.production, item.dot, lookaheads.join(","))
            })
            .collect();
        parts.sort_unstable();
        parts.join("|")
    }
}
