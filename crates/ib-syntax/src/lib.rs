//! IB Pseudocode Syntax
//!
//! Lexer, concrete syntax tree and error-tolerant parser for the IB
//! pseudocode dialect accepted by the `ibc` compiler.
//!
//! # Architecture
//!
//! ```text
//! source ──▶ Lexer (logos) ──▶ Parser ──▶ SyntaxTree
//!                                            │
//!                       SyntaxNode handles ◀─┘  resolve_inner / ancestors / children
//! ```
//!
//! Every edit produces a fresh [`SyntaxTree`]; nothing is updated in place.
//!
//! ```
//! use ib_syntax::{parse, Side, SyntaxKind};
//!
//! let tree = parse("x = 1\n");
//! let node = tree.resolve_inner(1, Side::Before);
//! assert_eq!(node.kind(), SyntaxKind::Identifier);
//! assert_eq!(node.text(), "x");
//! ```

mod error;
mod kind;
mod lexer;
mod parser;
mod tree;

pub use error::SyntaxError;
pub use kind::SyntaxKind;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::parse;
pub use tree::{Side, SyntaxNode, SyntaxTree};
