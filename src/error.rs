//! Crate-wide error taxonomy.
//!
//! Mirrors spec §7: `GrammarError` and `BuildError` are fatal to the
//! `Engine` instance that raised them (the automaton must not be
//! half-built); `ParseError` and `TokenizerError` are not — the same
//! engine may parse further inputs afterward.

use thiserror::Error;

/// Errors raised while computing FIRST/FOLLOW sets.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("no start symbol: add_production was never called")]
    NoStartSymbol,

    #[error("FIRST/FOLLOW fixed-point did not converge within {0} iterations")]
    IterationLimitExceeded(usize),
}

/// Errors raised while building the LR(1) automaton.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("start symbol '{0}' has no productions")]
    UnreferencedStartSymbol(String),
}

/// Errors raised while parsing a token stream.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("engine has not been built; call build() before parse()")]
    NotBuilt,

    #[error("tokenizer must append a trailing '$' end-of-input token")]
    MissingEndMarker,

    #[error("no viable parse: stuck at token {token_index} ('{symbol}')")]
    NoViableParse { token_index: usize, symbol: String },
}

/// Errors raised by a [`crate::token::Tokenizer`] on unmatched input.
#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("unmatched input at line {line}, column {column}: {snippet:?}")]
    UnmatchedInput {
        line: usize,
        column: usize,
        snippet: String,
    },
}

/// Umbrella error returned by [`crate::engine::Engine`] operations that may
/// fail at more than one stage (tokenize → build → parse).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
