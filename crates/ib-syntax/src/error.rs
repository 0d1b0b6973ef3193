use thiserror::Error;

use crate::lexer::Span;

/// A problem found while lexing or parsing.
///
/// Errors are recorded on the [`SyntaxTree`](crate::SyntaxTree) rather than
/// returned; the tree is always complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of file - expected {expected}")]
    UnexpectedEof { expected: String, offset: usize },

    #[error("Missing 'end' keyword for {construct} opened at position {opened:?}")]
    MissingEnd { construct: String, opened: Span },

    #[error("Unexpected character {ch:?} at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },
}

impl SyntaxError {
    /// Source range the error points at.
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnexpectedToken { span, .. } => *span,
            SyntaxError::UnexpectedEof { offset, .. } => Span::empty(*offset),
            SyntaxError::MissingEnd { opened, .. } => *opened,
            SyntaxError::UnexpectedCharacter { ch, offset } => {
                Span::new(*offset, offset + ch.len_utf8())
            }
        }
    }
}
