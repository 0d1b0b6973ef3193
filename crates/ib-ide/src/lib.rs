//! IB Pseudocode Editor Analysis
//!
//! Scope-aware completion and structural indentation over an
//! [`ib_syntax::SyntaxTree`]. Every entry point is synchronous and pure: it
//! reads the tree snapshot it is given and keeps nothing between calls.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!                 │  completion  │  keywords + types + symbols
//!                 └──────┬───────┘
//!           ┌────────────┼────────────┐
//!           ▼            ▼            ▼
//!       ┌───────┐   ┌─────────┐   ┌────────┐
//!       │ scope │──▶│ symbols │   │ indent │
//!       └───────┘   └─────────┘   └────────┘
//! ```

pub mod completion;
pub mod indent;
pub mod scope;
pub mod symbols;

pub use completion::{
    complete, match_word_before, CompletionAction, CompletionCategory, CompletionItem,
    CompletionList,
};
pub use indent::{indentation, DEFAULT_INDENT_UNIT};
pub use scope::collect_scopes;
pub use symbols::{collect_symbols, Symbol, SymbolKind};
