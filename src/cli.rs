//! CLI surface (spec §6, an external collaborator of the core): argument
//! parsing, file I/O, tree printing / render dispatch, exit codes.
//!
//! Grounded on the teacher's `src/cli.rs` (stdin/file-driven runner,
//! `process::exit(1)` on error), restructured around `clap`'s derive API
//! following the flag surface `azazo1-auto_canonical_lr1` and `radlr`'s
//! `crates/cli` use for their own grammar-driving binaries.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::grammars::GrammarKind;
use crate::render;
use crate::token::Tokenizer;
use crate::tree::ParseTreeNode;
use clap::Parser as ClapParser;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, ClapParser)]
#[command(name = "glr", about = "Generalized LR (GLR) parsing engine")]
pub struct Cli {
    /// Render the accepted tree back into source text instead of printing
    /// its shape.
    #[arg(short, long)]
    pub render: bool,

    /// Which predefined grammar to parse with.
    #[arg(value_enum)]
    pub grammar_type: GrammarTypeArg,

    /// Path to the input file to parse.
    pub input_file: PathBuf,

    /// Optional path to write output to; stdout if omitted.
    pub output_file: Option<PathBuf>,

    /// Enable verbose diagnostics (closure iterations, shift/reduce
    /// decisions, recovery events).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum GrammarTypeArg {
    Lua,
    Math,
    Simple,
    Programming,
}

impl From<GrammarTypeArg> for GrammarKind {
    fn from(value: GrammarTypeArg) -> Self {
        match value {
            GrammarTypeArg::Lua => GrammarKind::Lua,
            GrammarTypeArg::Math => GrammarKind::Math,
            GrammarTypeArg::Simple => GrammarKind::Simple,
            GrammarTypeArg::Programming => GrammarKind::Programming,
        }
    }
}

/// Runs the CLI end to end. Returns the process exit code: `0` on success,
/// `1` on parse failure or missing input (spec §6).
pub fn run(cli: Cli) -> i32 {
    let input = match fs::read_to_string(&cli.input_file) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("error: could not read {}: {e}", cli.input_file.display());
            return 1;
        }
    };

    let kind: GrammarKind = cli.grammar_type.into();
    let (grammar, tokenizer) = kind.build();

    match drive(grammar, tokenizer, &input, cli.verbose) {
        Ok(trees) => {
            let rendered = render_output(&trees, cli.render);
            match &cli.output_file {
                Some(path) => {
                    if let Err(e) = fs::write(path, rendered) {
                        eprintln!("error: could not write {}: {e}", path.display());
                        return 1;
                    }
                }
                None => println!("{rendered}"),
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn drive(
    grammar: crate::grammar::Grammar,
    tokenizer: Box<dyn Tokenizer>,
    input: &str,
    verbose: bool,
) -> Result<Vec<Rc<ParseTreeNode>>, EngineError> {
    let mut engine = Engine::new(BoxedTokenizer(tokenizer));
    engine.set_verbose(verbose);
    for production in grammar.all_productions() {
        engine.add_production(
            production.lhs.clone(),
            production.rhs.iter().cloned().collect::<Vec<_>>(),
        );
    }
    engine.build()?;
    engine.parse(input)
}

/// Adapts a `Box<dyn Tokenizer>` (what [`GrammarKind::build`] returns) into
/// a concrete `Tokenizer` impl so it can be handed to `Engine<T>` directly.
struct BoxedTokenizer(Box<dyn Tokenizer>);

impl Tokenizer for BoxedTokenizer {
    fn tokenize(
        &self,
        input: &str,
    ) -> Result<Vec<crate::token::Token>, crate::error::TokenizerError> {
        self.0.tokenize(input)
    }
}

fn render_output(trees: &[Rc<ParseTreeNode>], render_source: bool) -> String {
    trees
        .iter()
        .map(|tree| {
            if render_source {
                render::render(tree)
            } else {
                print_tree(tree, 0)
            }
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Indented symbol-per-line tree printing (spec §6's non-`--render` output).
fn print_tree(node: &ParseTreeNode, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    match node {
        ParseTreeNode::Terminal { value, .. } => format!("{indent}{value}"),
        ParseTreeNode::Error { value } => format!("{indent}<error:{value}>"),
        ParseTreeNode::Nonterminal { symbol, children } => {
            let mut lines = vec![format!("{indent}{symbol}")];
            for child in children {
                lines.push(print_tree(child, depth + 1));
            }
            lines.join("\n")
        }
    }
}
