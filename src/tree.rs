//! Parse-tree node variants produced by the GLR runtime.

use crate::symbol::Symbol;
use std::rc::Rc;

/// A node in a parse tree. `Error` is a placeholder inserted when a
/// reduction pops a frame with no attached node — in practice only
/// arising from epsilon productions (whose popped count is zero, so no
/// `Error` node is ever needed there) or from panic-mode recovery frames
/// that never received a shifted/reduced node.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTreeNode {
    Terminal {
        value: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    Nonterminal {
        symbol: Symbol,
        children: Vec<Rc<ParseTreeNode>>,
    },
    Error {
        value: String,
    },
}

impl ParseTreeNode {
    /// Collects this tree's terminal leaves, in left-to-right order, as
    /// their raw lexeme values. Used both by `render` and by the
    /// leaf-concatenation invariant in spec §8.4.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ParseTreeNode::Terminal { value, .. } => out.push(value.as_str()),
            ParseTreeNode::Error { value } => {
                if !value.is_empty() {
                    out.push(value.as_str());
                }
            }
            ParseTreeNode::Nonterminal { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}
