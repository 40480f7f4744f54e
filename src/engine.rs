//! The facade: assembles [`Grammar`] + [`Automaton`] + [`Parser`] behind a
//! single `add_production` / `build` / `parse` surface (spec §6).
//!
//! Grounded on the teacher's `cli::run` orchestration (`src/cli.rs`), which
//! builds a grammar, computes FIRST/FOLLOW, then hands the result to
//! whichever parser applies — collapsed here into one type since the GLR
//! engine's external API is narrower than the teacher's LL(1)/SLR(1) dual
//! surface.

use crate::automaton::{Automaton, AutomatonConfig};
use crate::error::EngineError;
use crate::grammar::Grammar;
use crate::parser::{Parser, ParserConfig};
use crate::symbol::Symbol;
use crate::token::Tokenizer;
use crate::tree::ParseTreeNode;
use std::rc::Rc;

/// Iteration ceilings and the verbose flag, threaded down into the
/// `Grammar`, `Automaton`, and `Parser` layers so one knob controls all of
/// them (spec §4.1, §4.2, §5).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_fixpoint_iterations: usize,
    pub automaton: AutomatonConfig,
    pub parser: ParserConfig,
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fixpoint_iterations: 256,
            automaton: AutomatonConfig::default(),
            parser: ParserConfig::default(),
            verbose: false,
        }
    }
}

impl EngineConfig {
    fn propagate_verbose(&mut self) {
        self.automaton.verbose = self.verbose;
        self.parser.verbose = self.verbose;
    }
}

/// Assembles a grammar, its canonical LR(1) automaton, and a GLR runtime
/// behind one type. `build()` is idempotent: once `self.automaton` is
/// `Some`, later calls are no-ops, matching spec §6's "Build API".
pub struct Engine<T: Tokenizer> {
    grammar: Grammar,
    tokenizer: T,
    config: EngineConfig,
    automaton: Option<Automaton>,
}

impl<T: Tokenizer> Engine<T> {
    pub fn new(tokenizer: T) -> Self {
        Self::with_config(tokenizer, EngineConfig::default())
    }

    pub fn with_config(tokenizer: T, mut config: EngineConfig) -> Self {
        config.propagate_verbose();
        Self {
            grammar: Grammar::with_max_iterations(config.max_fixpoint_iterations),
            tokenizer,
            config,
            automaton: None,
        }
    }

    /// Enables or disables verbose diagnostics (spec §6 "Verbose mode").
    /// Only affects what is logged via the `log` facade; no other
    /// observable behavior depends on it. Must be called before `build()`
    /// to affect automaton construction.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
        self.config.propagate_verbose();
    }

    /// Appends a production. The first call fixes the grammar's start
    /// symbol (spec §6 "Grammar definition API"). Calling this after
    /// `build()` has succeeded has no effect on the already-frozen
    /// automaton until `build()` is invoked on a fresh `Engine`.
    pub fn add_production<L, S, R>(&mut self, lhs: L, rhs: R)
    where
        L: Into<Symbol>,
        S: Into<Symbol>,
        R: IntoIterator<Item = S>,
    {
        self.grammar.add_production(lhs, rhs);
    }

    /// Computes FIRST/FOLLOW and the canonical LR(1) automaton. Idempotent:
    /// a second call on an already-built engine is a no-op (spec §6).
    /// Errors from this call are fatal to the instance (spec §7): the
    /// automaton is never left half-built.
    pub fn build(&mut self) -> Result<(), EngineError> {
        if self.automaton.is_some() {
            return Ok(());
        }
        let automaton = Automaton::build(&self.grammar, &self.config.automaton)?;
        self.automaton = Some(automaton);
        Ok(())
    }

    /// Tokenizes `input` via the configured [`Tokenizer`] and runs the GLR
    /// engine over the resulting token stream, returning every accepted
    /// parse tree (spec §6 "Parse API"). A failed parse does not poison the
    /// instance: further calls to `parse` are unaffected (spec §7).
    pub fn parse(&self, input: &str) -> Result<Vec<Rc<ParseTreeNode>>, EngineError> {
        let Some(automaton) = &self.automaton else {
            return Err(EngineError::Parse(crate::error::ParseError::NotBuilt));
        };
        let tokens = self.tokenizer.tokenize(input)?;
        let parser = Parser::new(automaton, self.config.parser.clone());
        Ok(parser.parse(&tokens)?)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn automaton(&self) -> Option<&Automaton> {
        self.automaton.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::{ArithmeticTokenizer, arithmetic_grammar};

    fn arithmetic_engine() -> Engine<ArithmeticTokenizer> {
        let mut engine = Engine::new(ArithmeticTokenizer);
        for production in arithmetic_grammar().all_productions() {
            engine.add_production(
                production.lhs.clone(),
                production.rhs.iter().cloned().collect::<Vec<_>>(),
            );
        }
        engine
    }

    #[test]
    fn parse_before_build_is_not_built_error() {
        let engine = arithmetic_engine();
        let err = engine.parse("1 + 2");
        assert!(matches!(
            err,
            Err(EngineError::Parse(crate::error::ParseError::NotBuilt))
        ));
    }

    #[test]
    fn build_is_idempotent() {
        let mut engine = arithmetic_engine();
        engine.build().unwrap();
        let states_after_first = engine.automaton().unwrap().states.len();
        engine.build().unwrap();
        assert_eq!(engine.automaton().unwrap().states.len(), states_after_first);
    }

    #[test]
    fn end_to_end_arithmetic_parse_produces_one_tree() {
        let mut engine = arithmetic_engine();
        engine.build().unwrap();
        let trees = engine.parse("1 + 2 * 3").unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(crate::render::render(&trees[0]), "1 + 2 * 3");
    }

    #[test]
    fn grouped_expression_preserves_parentheses_on_render() {
        let mut engine = arithmetic_engine();
        engine.build().unwrap();
        let trees = engine.parse("(1 + 2) * 3").unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(crate::render::render(&trees[0]), "(1 + 2) * 3");
    }
}
