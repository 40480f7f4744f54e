//! Predefined grammars and their tokenizers.
//!
//! Out of scope for the core per spec §1 ("specified only by the interface
//! the core consumes"), but spec §6 names concrete `grammar_type` values
//! (`lua`, `math`, `simple`, `programming`) and spec §8 exercises concrete
//! grammars by name, so these builders give the CLI something real to
//! drive. The Lua-subset token set is grounded on the keyword/punctuation
//! coverage of `andrewbaxter-fork_rustemo`'s example grammars.

use crate::error::TokenizerError;
use crate::grammar::Grammar;
use crate::token::{Token, Tokenizer};

/// The four grammar families the CLI surface names (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    Math,
    Simple,
    Lua,
    Programming,
}

impl std::str::FromStr for GrammarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "math" => Ok(GrammarKind::Math),
            "simple" => Ok(GrammarKind::Simple),
            "lua" => Ok(GrammarKind::Lua),
            "programming" => Ok(GrammarKind::Programming),
            other => Err(format!("unknown grammar type '{other}'")),
        }
    }
}

impl GrammarKind {
    pub fn build(self) -> (Grammar, Box<dyn Tokenizer>) {
        match self {
            GrammarKind::Math => (arithmetic_grammar(), Box::new(ArithmeticTokenizer)),
            GrammarKind::Simple => (simple_grammar(), Box::new(SimpleTokenizer)),
            GrammarKind::Lua => (lua_subset_grammar(), Box::new(LuaTokenizer)),
            // SPEC_FULL.md §6: "programming" reuses the Lua-subset grammar
            // and tokenizer rather than naming a distinct grammar family.
            GrammarKind::Programming => (lua_subset_grammar(), Box::new(LuaTokenizer)),
        }
    }
}

/// `E -> E + T | T`, `T -> T * F | F`, `F -> ( E ) | num`. Left-recursive,
/// unambiguous; used throughout spec §8's round-trip and boundary tests.
pub fn arithmetic_grammar() -> Grammar {
    let mut g = Grammar::new();
    g.add_production("E", ["E", "+", "T"]);
    g.add_production("E", ["T"]);
    g.add_production("T", ["T", "*", "F"]);
    g.add_production("T", ["F"]);
    g.add_production("F", ["(", "E", ")"]);
    g.add_production("F", ["num"]);
    g
}

/// `S -> a S | a`. The simplest right-recursive unambiguous grammar, used
/// for spec §8's scenario 1 (`a a a $` parses to exactly one tree).
pub fn simple_grammar() -> Grammar {
    let mut g = Grammar::new();
    g.add_production("S", ["a", "S"]);
    g.add_production("S", ["a"]);
    g
}

/// `E -> E + E | E * E | id`. Genuinely ambiguous — a GLR engine is
/// required to recover more than one parse for `id + id * id` (spec §8
/// scenario 6), which a deterministic LR(1) table could not build at all.
pub fn ambiguous_expression_grammar() -> Grammar {
    let mut g = Grammar::new();
    g.add_production("E", ["E", "+", "E"]);
    g.add_production("E", ["E", "*", "E"]);
    g.add_production("E", ["id"]);
    g
}

/// A small Lua-like statement/expression grammar: local declarations,
/// assignment, if/while, return, calls, and arithmetic expressions with the
/// usual precedence split into `expr`/`term`/`factor`.
pub fn lua_subset_grammar() -> Grammar {
    let mut g = Grammar::new();

    g.add_production("chunk", ["block"]);

    g.add_production("block", ["statlist"]);
    g.add_production("statlist", ["statlist", "stat"]);
    g.add_production::<&str, &str, _>("statlist", []);

    g.add_production("stat", ["localstat"]);
    g.add_production("stat", ["assignstat"]);
    g.add_production("stat", ["ifstat"]);
    g.add_production("stat", ["whilestat"]);
    g.add_production("stat", ["retstat"]);
    g.add_production("stat", ["callstat"]);

    g.add_production("localstat", ["local", "name", "=", "expr"]);
    g.add_production("assignstat", ["name", "=", "expr"]);

    g.add_production("ifstat", ["if", "expr", "then", "block", "end"]);
    g.add_production("ifstat", ["if", "expr", "then", "block", "else", "block", "end"]);

    g.add_production("whilestat", ["while", "expr", "do", "block", "end"]);
    g.add_production("retstat", ["return", "expr"]);
    g.add_production("callstat", ["name", "(", "arglist", ")"]);

    g.add_production("arglist", ["expr"]);
    g.add_production::<&str, &str, _>("arglist", []);

    g.add_production("expr", ["expr", "+", "term"]);
    g.add_production("expr", ["expr", "-", "term"]);
    g.add_production("expr", ["term"]);

    g.add_production("term", ["term", "*", "factor"]);
    g.add_production("term", ["term", "/", "factor"]);
    g.add_production("term", ["factor"]);

    g.add_production("factor", ["(", "expr", ")"]);
    g.add_production("factor", ["name"]);
    g.add_production("factor", ["number"]);
    g.add_production("factor", ["string"]);

    g
}

const LUA_KEYWORDS: &[&str] = &[
    "local", "if", "then", "else", "elseif", "end", "while", "do", "return", "until",
    "for", "function", "and", "or", "not", "nil", "true", "false",
];

/// Splits source on whitespace, treating every other word as its own
/// terminal (`+`/`*`/`id`). Suits grammars whose only terminals are word-
/// shaped, such as [`ambiguous_expression_grammar`].
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        for (line_no, line) in input.lines().enumerate() {
            for (col, word) in line.split_whitespace().enumerate() {
                let symbol = if word == "+" || word == "*" { word } else { "id" };
                tokens.push(Token::new(symbol, word).with_position(line_no + 1, col + 1));
            }
        }
        tokens.push(Token::end_marker());
        Ok(tokens)
    }
}

/// Splits source on whitespace, every word becomes a terminal equal to
/// itself (so `S -> a S | a` matches literal `a` words).
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        for (line_no, line) in input.lines().enumerate() {
            for (col, word) in line.split_whitespace().enumerate() {
                tokens.push(Token::new(word, word).with_position(line_no + 1, col + 1));
            }
        }
        tokens.push(Token::end_marker());
        Ok(tokens)
    }
}

/// Recognizes numbers as `num`, and passes `+ * ( )` through literally;
/// anything else is unmatched input.
pub struct ArithmeticTokenizer;

impl Tokenizer for ArithmeticTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        let mut chars = input.char_indices().peekable();
        let mut line = 1usize;
        let mut column = 1usize;

        while let Some(&(_, ch)) = chars.peek() {
            if ch == '\n' {
                chars.next();
                line += 1;
                column = 1;
                continue;
            }
            if ch.is_whitespace() {
                chars.next();
                column += 1;
                continue;
            }
            if ch.is_ascii_digit() {
                let start_col = column;
                let mut value = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        value.push(d);
                        chars.next();
                        column += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::new("num", value).with_position(line, start_col));
                continue;
            }
            if matches!(ch, '+' | '*' | '(' | ')') {
                tokens.push(Token::new(ch.to_string(), ch.to_string()).with_position(line, column));
                chars.next();
                column += 1;
                continue;
            }
            return Err(TokenizerError::UnmatchedInput {
                line,
                column,
                snippet: ch.to_string(),
            });
        }

        tokens.push(Token::end_marker());
        Ok(tokens)
    }
}

/// Scans Lua-subset source: `--` line comments, quoted strings, numbers,
/// identifiers (reclassified to their keyword symbol when they match
/// [`LUA_KEYWORDS`]), and single-character punctuation/operators.
pub struct LuaTokenizer;

impl Tokenizer for LuaTokenizer {
    fn tokenize(&self, input: &str) -> Result<Vec<Token>, TokenizerError> {
        let bytes: Vec<char> = input.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0usize;
        let mut line = 1usize;
        let mut column = 1usize;

        while i < bytes.len() {
            let ch = bytes[i];

            if ch == '\n' {
                i += 1;
                line += 1;
                column = 1;
                continue;
            }
            if ch.is_whitespace() {
                i += 1;
                column += 1;
                continue;
            }
            if ch == '-' && bytes.get(i + 1) == Some(&'-') {
                while i < bytes.len() && bytes[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            if ch == '"' || ch == '\'' {
                let quote = ch;
                let start_col = column;
                let mut value = String::new();
                i += 1;
                column += 1;
                while i < bytes.len() && bytes[i] != quote {
                    value.push(bytes[i]);
                    i += 1;
                    column += 1;
                }
                if i >= bytes.len() {
                    return Err(TokenizerError::UnmatchedInput {
                        line,
                        column: start_col,
                        snippet: format!("{quote}{value}"),
                    });
                }
                i += 1;
                column += 1;
                tokens.push(Token::new("string", value).with_position(line, start_col));
                continue;
            }
            if ch.is_ascii_digit() {
                let start_col = column;
                let mut value = String::new();
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == '.') {
                    value.push(bytes[i]);
                    i += 1;
                    column += 1;
                }
                tokens.push(Token::new("number", value).with_position(line, start_col));
                continue;
            }
            if ch.is_alphabetic() || ch == '_' {
                let start_col = column;
                let mut value = String::new();
                while i < bytes.len() && (bytes[i].is_alphanumeric() || bytes[i] == '_') {
                    value.push(bytes[i]);
                    i += 1;
                    column += 1;
                }
                let symbol = if LUA_KEYWORDS.contains(&value.as_str()) {
                    value.as_str()
                } else {
                    "name"
                };
                tokens.push(Token::new(symbol, value).with_position(line, start_col));
                continue;
            }
            if matches!(ch, '+' | '-' | '*' | '/' | '=' | '(' | ')' | ',' | ';') {
                tokens
                    .push(Token::new(ch.to_string(), ch.to_string()).with_position(line, column));
                i += 1;
                column += 1;
                continue;
            }

            return Err(TokenizerError::UnmatchedInput {
                line,
                column,
                snippet: ch.to_string(),
            });
        }

        tokens.push(Token::end_marker());
        Ok(tokens)
    }
}
