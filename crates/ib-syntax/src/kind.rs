//! Node kinds of the concrete syntax tree.

use std::fmt;

/// Tag of a [`SyntaxNode`](crate::SyntaxNode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // ========== Containers ==========
    Program,
    Atom,
    Block,

    // ========== Statements ==========
    IfStatement,
    FunctionDeclaration,
    ParameterList,
    Parameter,
    ReturnType,
    ForStatement,
    WhileStatement,
    VariableAssignment,
    OutputStatement,
    ReturnStatement,
    ExpressionStatement,

    // ========== Expressions ==========
    Expression,
    BinaryExpression,
    UnaryExpression,
    ParenthesizedExpression,
    CallExpression,
    ArgumentList,
    MemberExpression,
    ReferenceExpression,
    ObjectInstantiationExpression,

    // ========== Leaves ==========
    Identifier,
    TypeAnnotation,
    Number,
    String,
    Boolean,

    IfKeyword,
    ThenKeyword,
    ElseKeyword,
    EndKeyword,
    FunctionKeyword,
    ReturnKeyword,
    OutputKeyword,
    NotKeyword,
    NewKeyword,
    LoopKeyword,
    ForKeyword,
    WhileKeyword,
    FromKeyword,
    ToKeyword,

    Operator,
    AssignmentOperator,
    LParen,
    RParen,
    Comma,
    Colon,
    Dot,
    Arrow,

    LineComment,
    Error,
}

impl SyntaxKind {
    /// Statements whose body is indented one level.
    pub fn introduces_block(self) -> bool {
        matches!(
            self,
            SyntaxKind::IfStatement
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::ForStatement
                | SyntaxKind::WhileStatement
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::IfStatement
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::ForStatement
                | SyntaxKind::WhileStatement
                | SyntaxKind::VariableAssignment
                | SyntaxKind::OutputStatement
                | SyntaxKind::ReturnStatement
                | SyntaxKind::ExpressionStatement
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_introducers() {
        assert!(SyntaxKind::IfStatement.introduces_block());
        assert!(SyntaxKind::WhileStatement.introduces_block());
        assert!(!SyntaxKind::Block.introduces_block());
        assert!(!SyntaxKind::VariableAssignment.introduces_block());
    }
}
