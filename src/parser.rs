//! The GLR runtime: per-token reduction phase (with cascading reductions),
//! shift phase, merge, lookahead relaxation, acceptance detection, and
//! panic-mode error recovery.
//!
//! Grounded on the teacher's `SLR1Parser::parse` (`src/slr1.rs`): same
//! stack-machine shape, same `state at top of stack -> goto` split, but
//! generalized from one deterministic `Vec<usize>` stack to the
//! [`crate::stack::GraphStack`] fork/merge model spec §4.4 requires.
//! Reduction-before-shift ordering and lookahead relaxation have no single-
//! stack analogue and are implemented directly from spec §4.4's numbered
//! procedure.

use crate::automaton::Automaton;
use crate::error::ParseError;
use crate::stack::{Frame, GraphStack, ParseStack};
use crate::symbol::Symbol;
use crate::token::Token;
use crate::tree::ParseTreeNode;
use std::collections::HashSet;
use std::rc::Rc;

/// Synchronizing tokens panic-mode recovery scans for (spec §4.5): the
/// configurable minimum set plus whatever the caller adds via
/// [`ParserConfig::with_sync_token`].
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub sync_tokens: HashSet<Symbol>,
    pub verbose: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let sync_tokens = [";", "end", "else", "elseif", "until", "$", ")", "}", "]"]
            .into_iter()
            .map(Symbol::new)
            .collect();
        Self {
            sync_tokens,
            verbose: false,
        }
    }
}

impl ParserConfig {
    pub fn with_sync_token(mut self, symbol: impl Into<Symbol>) -> Self {
        self.sync_tokens.insert(symbol.into());
        self
    }
}

/// The GLR driver. Holds no mutable state of its own between calls — all
/// per-parse bookkeeping lives in the [`GraphStack`] threaded through
/// [`Parser::parse`], so one `Parser` may be reused across inputs freely
/// (spec §5).
pub struct Parser<'a> {
    automaton: &'a Automaton,
    config: ParserConfig,
}

impl<'a> Parser<'a> {
    pub fn new(automaton: &'a Automaton, config: ParserConfig) -> Self {
        Self { automaton, config }
    }

    /// Runs the GLR main loop over a pre-tokenized input (spec §4.4). The
    /// caller must have appended the trailing `$` token.
    pub fn parse(&self, tokens: &[Token]) -> Result<Vec<Rc<ParseTreeNode>>, ParseError> {
        if tokens.last().map(|t| t.symbol.is_end_marker()) != Some(true) {
            return Err(ParseError::MissingEndMarker);
        }

        let mut active = GraphStack::new();
        active.push_if_new(ParseStack::new(0));

        let mut i = 0usize;
        while i < tokens.len() {
            let token = &tokens[i];
            active = self.apply_reductions(active, token);

            if token.symbol.is_end_marker() {
                return self.collect_results(&active, i, token);
            }

            let mut next_active = self.apply_shifts(&active, token);

            if next_active.stacks.is_empty() {
                match self.recover(&active, tokens, i) {
                    Some((recovered, new_cursor)) => {
                        active = recovered;
                        i = new_cursor;
                    }
                    None => {
                        i += 1;
                    }
                }
                continue;
            }

            active = next_active;
            i += 1;
        }

        Err(ParseError::NoViableParse {
            token_index: i,
            symbol: tokens.last().map(|t| t.symbol.to_string()).unwrap_or_default(),
        })
    }

    /// Reduction phase (spec §4.4 step 2): repeatedly reduces every stack
    /// whose top state has a complete item consistent with `token`,
    /// appending newly-produced stacks back into `active` so cascading
    /// reductions against the same token settle before the loop moves on.
    fn apply_reductions(&self, mut active: GraphStack, token: &Token) -> GraphStack {
        let mut cursor = 0;
        while cursor < active.stacks.len() {
            let reductions = self.reductions_for(&active.stacks[cursor], token);
            for (popped, lhs, goto_target) in reductions {
                let mut clone = active.stacks[cursor].clone();
                let Some(frames) = clone.pop_frames(popped) else {
                    continue;
                };
                let node = build_nonterminal(lhs, frames);
                clone.push(goto_target, Some(Rc::new(node)));
                let forked = active.push_if_new(clone);
                if self.config.verbose {
                    if forked {
                        log::debug!("fork: new stack at goto {goto_target} for '{lhs}'");
                    } else {
                        log::trace!("merge: stack at goto {goto_target} for '{lhs}' already active");
                    }
                }
            }
            cursor += 1;
        }
        active
    }

    /// Computes the set of reductions applicable to one stack's top state
    /// for the current token, without mutating anything. Returns
    /// `(rhs_len, lhs, goto_target)` triples. Lookahead relaxation (spec
    /// §4.4) means a mismatched lookahead is never itself a veto — every
    /// complete item is tried regardless — so the only reasons a reduction
    /// is discarded are a stack too shallow to pop, or a missing GOTO.
    fn reductions_for(&self, stack: &ParseStack, token: &Token) -> Vec<(usize, Symbol, usize)> {
        let top_state_id = stack.top().state;
        let state = &self.automaton.states[top_state_id];

        let mut out = Vec::new();
        for item in state.complete_items(&self.automaton.productions) {
            let production = &self.automaton.productions[item.production];
            let rhs_len = production.rhs.len();
            if stack.frames.len() <= rhs_len {
                if self.config.verbose {
                    log::trace!(
                        "discard reduce: state {top_state_id} via {production} on '{}' \
                         — stack depth {} too shallow to pop {rhs_len}",
                        token.symbol,
                        stack.frames.len()
                    );
                }
                continue;
            }
            let state_after_pop = stack.frames[stack.frames.len() - 1 - rhs_len].state;
            let Some(&goto_target) = self.automaton.states[state_after_pop]
                .transitions
                .get(&production.lhs)
            else {
                if self.config.verbose {
                    log::trace!(
                        "discard reduce: state {top_state_id} via {production} on '{}' \
                         — no GOTO[{state_after_pop}, {}]",
                        token.symbol,
                        production.lhs
                    );
                }
                continue;
            };
            if self.config.verbose {
                log::debug!(
                    "reduce: state {top_state_id} via {production} -> goto {goto_target}"
                );
            }
            out.push((rhs_len, production.lhs.clone(), goto_target));
        }
        out
    }

    /// Shift phase (spec §4.4 step 3): for each stack whose top state has a
    /// transition on `token.symbol`, clone and push.
    fn apply_shifts(&self, active: &GraphStack, token: &Token) -> GraphStack {
        let mut next_active = GraphStack::new();
        for stack in &active.stacks {
            let top_state_id = stack.top().state;
            let state = &self.automaton.states[top_state_id];
            if let Some(&target) = state.transitions.get(&token.symbol) {
                let mut clone = stack.clone();
                let node = ParseTreeNode::Terminal {
                    value: token.value.clone(),
                    line: token.line,
                    column: token.column,
                };
                clone.push(target, Some(Rc::new(node)));
                let forked = next_active.push_if_new(clone);
                if self.config.verbose {
                    log::debug!("shift: state {top_state_id} --{}--> {target}", token.symbol);
                    if !forked {
                        log::trace!("merge: stack at {target} already shifted this token");
                    }
                }
            }
        }
        next_active
    }

    /// Acceptance and result collection (spec §4.4 "Acceptance and result
    /// collection"). `active` here is the post-reduction set at the `$`
    /// token.
    fn collect_results(
        &self,
        active: &GraphStack,
        token_index: usize,
        token: &Token,
    ) -> Result<Vec<Rc<ParseTreeNode>>, ParseError> {
        let mut primary = Vec::new();
        let mut fallback = Vec::new();

        for stack in &active.stacks {
            let top = stack.top();
            let state = &self.automaton.states[top.state];
            let accepts = state.items.iter().any(|item| {
                self.automaton.productions[item.production].lhs == self.automaton.augmented_start
                    && item.dot == self.automaton.productions[item.production].rhs.len()
            });

            if accepts {
                if let Some(node) = &top.node {
                    primary.push(node.clone());
                }
            } else if stack.frames.len() >= 2 {
                if let Some(node) = &top.node {
                    fallback.push(node.clone());
                }
            }
        }

        if !primary.is_empty() {
            Ok(primary)
        } else if !fallback.is_empty() {
            Ok(fallback)
        } else {
            Err(ParseError::NoViableParse {
                token_index,
                symbol: token.symbol.to_string(),
            })
        }
    }

    /// Panic-mode recovery (spec §4.5). Returns the reseeded active set and
    /// the cursor to resume at, or `None` if the offending token should
    /// simply be dropped and the caller should advance by one without
    /// changing `active`.
    fn recover(
        &self,
        active: &GraphStack,
        tokens: &[Token],
        cursor: usize,
    ) -> Option<(GraphStack, usize)> {
        let sync_position = (cursor..tokens.len())
            .find(|&k| self.config.sync_tokens.contains(&tokens[k].symbol))?;
        let sync_symbol = &tokens[sync_position].symbol;

        let mut best: Option<ParseStack> = None;
        for stack in &active.stacks {
            let mut candidate = stack.clone();
            loop {
                let top_state = &self.automaton.states[candidate.top().state];
                if top_state.transitions.contains_key(sync_symbol) {
                    let better = match &best {
                        None => true,
                        Some(current_best) => candidate.frames.len() > current_best.frames.len(),
                    };
                    if better {
                        if self.config.verbose {
                            log::warn!(
                                "recovery: synchronizing on '{sync_symbol}' at token {sync_position}, stack depth {}",
                                candidate.frames.len()
                            );
                        }
                        best = Some(candidate);
                    }
                    break;
                }
                if candidate.frames.len() <= 1 {
                    break;
                }
                candidate.pop_frames(1);
            }
        }

        best.map(|stack| {
            let mut next_active = GraphStack::new();
            next_active.push_if_new(stack);
            (next_active, sync_position)
        })
    }
}

/// Builds the `Nonterminal` node for a reduction, substituting `Error`
/// placeholders for frames that carry no node (epsilon productions never
/// pop any frame, so in practice this only arises from recovery frames).
fn build_nonterminal(symbol: Symbol, frames: Vec<Frame>) -> ParseTreeNode {
    let children = frames
        .into_iter()
        .map(|frame| {
            frame.node.unwrap_or_else(|| {
                Rc::new(ParseTreeNode::Error {
                    value: String::new(),
                })
            })
        })
        .collect();
    ParseTreeNode::Nonterminal { symbol, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Automaton, AutomatonConfig};
    use crate::grammar::Grammar;
    use crate::token::Token;

    fn tokens(symbols: &[&str]) -> Vec<Token> {
        let mut out: Vec<Token> = symbols.iter().map(|s| Token::new(*s, *s)).collect();
        out.push(Token::end_marker());
        out
    }

    #[test]
    fn right_recursive_a_star_parses_unambiguously() {
        let mut g = Grammar::new();
        g.add_production("S", ["a", "S"]);
        g.add_production("S", ["a"]);
        let automaton = Automaton::build(&g, &AutomatonConfig::default()).unwrap();
        let parser = Parser::new(&automaton, ParserConfig::default());

        let trees = parser.parse(&tokens(&["a", "a", "a"])).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].leaves(), vec!["a", "a", "a"]);
    }

    #[test]
    fn ambiguous_grammar_yields_multiple_trees() {
        let mut g = Grammar::new();
        g.add_production("E", ["E", "+", "E"]);
        g.add_production("E", ["E", "*", "E"]);
        g.add_production("E", ["id"]);
        let automaton = Automaton::build(&g, &AutomatonConfig::default()).unwrap();
        let parser = Parser::new(&automaton, ParserConfig::default());

        let trees = parser
            .parse(&tokens(&["id", "+", "id", "*", "id"]))
            .unwrap();
        assert!(trees.len() >= 2, "expected ambiguity, got {} trees", trees.len());
    }

    #[test]
    fn left_recursive_arithmetic_is_left_associative() {
        let mut g = Grammar::new();
        g.add_production("E", ["E", "+", "T"]);
        g.add_production("E", ["T"]);
        g.add_production("T", ["id"]);
        let automaton = Automaton::build(&g, &AutomatonConfig::default()).unwrap();
        let parser = Parser::new(&automaton, ParserConfig::default());

        let trees = parser
            .parse(&tokens(&["id", "+", "id", "+", "id"]))
            .unwrap();
        assert_eq!(trees.len(), 1);
        // ((T+T)+T): the outermost E's first child is itself an E.
        let ParseTreeNode::Nonterminal { children, .. } = trees[0].as_ref() else {
            panic!("expected a nonterminal root");
        };
        let ParseTreeNode::Nonterminal { symbol, .. } = children[0].as_ref() else {
            panic!("expected a nonterminal first child");
        };
        assert_eq!(symbol.as_str(), "E");
    }

    #[test]
    fn leaf_concatenation_matches_input() {
        let mut g = Grammar::new();
        g.add_production("E", ["E", "+", "T"]);
        g.add_production("E", ["T"]);
        g.add_production("T", ["T", "*", "F"]);
        g.add_production("T", ["F"]);
        g.add_production("F", ["(", "E", ")"]);
        g.add_production("F", ["id"]);
        let automaton = Automaton::build(&g, &AutomatonConfig::default()).unwrap();
        let parser = Parser::new(&automaton, ParserConfig::default());

        let input = ["id", "+", "id", "*", "id"];
        let trees = parser.parse(&tokens(&input)).unwrap();
        assert_eq!(trees[0].leaves(), input.to_vec());
    }

    #[test]
    fn truncated_input_is_a_parse_error() {
        let mut g = Grammar::new();
        g.add_production("E", ["E", "+", "T"]);
        g.add_production("E", ["T"]);
        g.add_production("T", ["id"]);
        let automaton = Automaton::build(&g, &AutomatonConfig::default()).unwrap();
        let parser = Parser::new(&automaton, ParserConfig::default());

        let err = parser.parse(&tokens(&["id", "+"]));
        assert!(err.is_err());
    }

    #[test]
    fn missing_end_marker_is_rejected_up_front() {
        let mut g = Grammar::new();
        g.add_production("S", ["a"]);
        let automaton = Automaton::build(&g, &AutomatonConfig::default()).unwrap();
        let parser = Parser::new(&automaton, ParserConfig::default());

        let err = parser.parse(&[Token::new("a", "a")]);
        assert!(matches!(err, Err(ParseError::MissingEndMarker)));
    }
}
