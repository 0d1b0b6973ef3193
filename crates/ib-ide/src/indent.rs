//! Indentation from structural nesting.

use ib_syntax::{Side, SyntaxTree};

/// Default width of one indentation level, in columns.
pub const DEFAULT_INDENT_UNIT: usize = 4;

/// Indentation width at `offset`: one `unit` per enclosing if, function or
/// loop, counting the node at the offset itself. The source's actual
/// whitespace is ignored.
pub fn indentation(tree: &SyntaxTree, offset: usize, unit: usize) -> usize {
    let depth = tree
        .resolve_inner(offset, Side::After)
        .ancestors()
        .filter(|node| node.kind().introduces_block())
        .count();
    depth * unit
}

/// `width` columns of spaces.
pub fn pad(width: usize) -> String {
    " ".repeat(width)
}
