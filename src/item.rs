//! LR(1) items.

use crate::symbol::Symbol;
use std::collections::BTreeSet;

/// An LR(1) item `A -> α • β, {lookaheads}`.
///
/// `production` indexes into an [`crate::automaton::Automaton`]'s
/// production arena rather than owning a [`crate::grammar::Production`]
/// directly — the arena-by-index discipline spec §9 requires so items and
/// states never form owning cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub production: usize,
    pub dot: usize,
    pub lookaheads: BTreeSet<Symbol>,
}

impl Item {
    pub fn new(production: usize, dot: usize, lookaheads: BTreeSet<Symbol>) -> Self {
        Self {
            production,
            dot,
            lookaheads,
        }
    }

    /// The `(production, dot)` pair that identifies this item's *core*,
    /// ignoring lookaheads — two items with equal cores are merged by
    /// [`crate::state::State::insert`] rather than kept as duplicates.
    pub fn core(&self) -> (usize, usize) {
        (self.production, self.dot)
    }

    /// The item with the dot advanced by one position, lookaheads carried
    /// over unchanged.
    pub fn advance(&self) -> Item {
        Item::new(self.production, self.dot + 1, self.lookaheads.clone())
    }
}
