//! Scope collection
//!
//! Lexical scopes are reconstructed from tree shape alone: every Block on
//! the path from the cursor to the root is a scope, and the Program root is
//! the global scope.

use ib_syntax::{Side, SyntaxKind, SyntaxNode, SyntaxTree};

/// Enclosing scopes at `offset`, innermost first, always ending with the
/// Program root.
///
/// The cursor resolves to the node before it, so a cursor sitting right
/// after the last character of a body still belongs to that body. A Block
/// under the cursor counts as a scope itself.
pub fn collect_scopes(tree: &SyntaxTree, offset: usize) -> Vec<SyntaxNode<'_>> {
    let start = tree.resolve_inner(offset, Side::Before);
    let mut scopes: Vec<_> = start
        .ancestors()
        .filter(|node| node.kind() == SyntaxKind::Block)
        .collect();
    scopes.push(tree.root());
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_syntax::parse;
    use pretty_assertions::assert_eq;

    fn scope_kinds(source: &str, offset: usize) -> Vec<SyntaxKind> {
        let tree = parse(source);
        collect_scopes(&tree, offset)
            .into_iter()
            .map(|n| n.kind())
            .collect()
    }

    #[test]
    fn test_top_level_is_global_only() {
        let source = "x = 1\nif x then\n  y = 2\nend\n";
        assert_eq!(scope_kinds(source, 3), vec![SyntaxKind::Program]);
        assert_eq!(scope_kinds(source, 0), vec![SyntaxKind::Program]);
        assert_eq!(scope_kinds(source, source.len()), vec![SyntaxKind::Program]);
        assert_eq!(scope_kinds(source, 1000), vec![SyntaxKind::Program]);
    }

    #[test]
    fn test_nested_blocks() {
        let source = "function f(a)\n  loop while a > 0\n    b = a\n  end\nend";
        let offset = source.find("b = a").unwrap() + 1;
        assert_eq!(
            scope_kinds(source, offset),
            vec![SyntaxKind::Block, SyntaxKind::Block, SyntaxKind::Program]
        );
    }

    #[test]
    fn test_whitespace_inside_body() {
        let source = "function f(a)\n    \nend";
        let offset = source.find("    ").unwrap() + 2;
        assert_eq!(
            scope_kinds(source, offset),
            vec![SyntaxKind::Block, SyntaxKind::Program]
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(scope_kinds("", 0), vec![SyntaxKind::Program]);
    }
}
