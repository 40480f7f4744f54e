//! Source reconstruction: concatenates a parse tree's terminal leaves back
//! into a string using the spacing heuristics spec §6 names. No teacher
//! analogue exists (the teacher's CLI only prints accept/reject booleans);
//! implemented fresh from the spec's rule table.

use crate::tree::ParseTreeNode;

const NO_SPACE_BEFORE: &[&str] = &[",", ";", ")", "}", "]"];
const NO_SPACE_AROUND: &[&str] = &[".", ":"];
const OPENING_BRACKETS: &[&str] = &["(", "{", "["];
const CLOSING_BRACKETS: &[&str] = &[")", "}", "]"];

fn is_alphanumeric_token(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Reconstructs a source string from `node`'s leaves, applying:
/// - no space before `,` `;` or a closing bracket,
/// - no space around `.` or `:`,
/// - no space after an opening bracket, or before one that follows an
///   identifier/number (call and index syntax),
/// - a space between two alphanumeric tokens,
/// - a space at the alphanumeric/operator boundary, treating a closing
///   bracket as the end of an operand and an opening bracket that isn't
///   call/index syntax as the start of one.
pub fn render(node: &ParseTreeNode) -> String {
    let leaves = node.leaves();
    let mut out = String::new();

    for (i, leaf) in leaves.iter().enumerate() {
        if i == 0 {
            out.push_str(leaf);
            continue;
        }
        let prev = leaves[i - 1];
        if needs_space(prev, leaf) {
            out.push(' ');
        }
        out.push_str(leaf);
    }

    out
}

fn needs_space(prev: &str, next: &str) -> bool {
    if NO_SPACE_BEFORE.contains(&next) {
        return false;
    }
    if NO_SPACE_AROUND.contains(&next) || NO_SPACE_AROUND.contains(&prev) {
        return false;
    }
    if OPENING_BRACKETS.contains(&prev) {
        return false;
    }
    // `f(...)`, `a[...]`: no space between an identifier/number and the
    // opening bracket of a call or index that follows it.
    if OPENING_BRACKETS.contains(&next) && is_alphanumeric_token(prev) {
        return false;
    }

    // A closing bracket ends an operand just like an alphanumeric token
    // does (`) *` needs a space); an opening bracket that wasn't caught by
    // the call/index rule above starts one (`* (`).
    let prev_alnum = is_alphanumeric_token(prev) || CLOSING_BRACKETS.contains(&prev);
    let next_alnum = is_alphanumeric_token(next) || OPENING_BRACKETS.contains(&next);

    // Alphanumeric/alphanumeric, or the alphanumeric/operator boundary in
    // either direction, both get a space; operator/operator runs (e.g. two
    // adjacent punctuation tokens not covered above) do not.
    prev_alnum || next_alnum
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn terminal(value: &str) -> Rc<ParseTreeNode> {
        Rc::new(ParseTreeNode::Terminal {
            value: value.to_string(),
            line: None,
            column: None,
        })
    }

    fn nonterminal(children: Vec<Rc<ParseTreeNode>>) -> ParseTreeNode {
        ParseTreeNode::Nonterminal {
            symbol: crate::symbol::Symbol::new("E"),
            children,
        }
    }

    #[test]
    fn renders_arithmetic_expression_with_spaces() {
        let tree = nonterminal(vec![
            terminal("1"),
            terminal("+"),
            terminal("2"),
            terminal("*"),
            terminal("3"),
        ]);
        assert_eq!(render(&tree), "1 + 2 * 3");
    }

    #[test]
    fn no_space_before_comma_or_closing_bracket() {
        let tree = nonterminal(vec![
            terminal("f"),
            terminal("("),
            terminal("a"),
            terminal(","),
            terminal("b"),
            terminal(")"),
        ]);
        assert_eq!(render(&tree), "f(a, b)");
    }

    #[test]
    fn no_space_around_dot_or_colon() {
        let tree = nonterminal(vec![
            terminal("obj"),
            terminal("."),
            terminal("field"),
            terminal(":"),
            terminal("Type"),
        ]);
        assert_eq!(render(&tree), "obj.field:Type");
    }

    #[test]
    fn preserves_grouping_parens() {
        let tree = nonterminal(vec![
            terminal("("),
            terminal("1"),
            terminal("+"),
            terminal("2"),
            terminal(")"),
            terminal("*"),
            terminal("3"),
        ]);
        assert_eq!(render(&tree), "(1 + 2) * 3");
    }
}
