//! Completion assembly
//!
//! Merges the fixed vocabulary of the language with the symbols visible at
//! the cursor into one ordered list.
//!
//! # Architecture
//!
//! ```text
//! (tree, offset) ──▶ match_word_before ──▶ collect_scopes ──▶ collect_symbols
//!                                                                  │
//!   structural keywords ─┐                                         │
//!   plain keywords ──────┼──────────────▶ CompletionList ◀─────────┘
//!   built-in types ──────┘
//! ```
//!
//! The list is not ranked or filtered; the editor filters by the word
//! already typed.

use ib_syntax::SyntaxTree;
use tracing::trace;

use crate::indent::{indentation, pad};
use crate::scope::collect_scopes;
use crate::symbols::{collect_symbols, SymbolKind};

/// Keywords completed as plain text.
pub const PLAIN_KEYWORDS: &[&str] = &["then", "end", "else", "output", "return", "not", "new"];

/// Built-in type names.
pub const BUILTIN_TYPES: &[&str] = &["Void", "Int", "String", "Boolean"];

/// Group a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionCategory {
    Keyword,
    Type,
    Variable,
    Function,
}

impl From<SymbolKind> for CompletionCategory {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Variable => CompletionCategory::Variable,
            SymbolKind::Function => CompletionCategory::Function,
        }
    }
}

/// What accepting a completion does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionAction {
    /// Insert the label.
    PlainText,
    /// Insert `text` and move the cursor `cursor_offset` bytes past the
    /// start of the insertion.
    Template { text: String, cursor_offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub category: CompletionCategory,
    pub action: CompletionAction,
}

impl CompletionItem {
    pub fn plain(label: impl Into<String>, category: CompletionCategory) -> Self {
        Self {
            label: label.into(),
            category,
            action: CompletionAction::PlainText,
        }
    }

    pub fn template(label: impl Into<String>, text: String, cursor_offset: usize) -> Self {
        Self {
            label: label.into(),
            category: CompletionCategory::Keyword,
            action: CompletionAction::Template {
                text,
                cursor_offset,
            },
        }
    }

    /// Text inserted when the item is accepted.
    pub fn insert_text(&self) -> &str {
        match &self.action {
            CompletionAction::PlainText => &self.label,
            CompletionAction::Template { text, .. } => text,
        }
    }
}

/// Completions anchored at `from`, the start of the word being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionList {
    pub from: usize,
    pub items: Vec<CompletionItem>,
}

/// The run of `[A-Za-z0-9_]` ending at `offset`, with its start.
pub fn match_word_before(text: &str, offset: usize) -> (usize, &str) {
    let mut end = offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let start = text[..end]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(end);
    (start, &text[start..end])
}

/// Completions at `offset`, or `None` when nothing is being typed and the
/// request was not explicit.
pub fn complete(
    tree: &SyntaxTree,
    offset: usize,
    explicit: bool,
    indent_unit: usize,
) -> Option<CompletionList> {
    let (from, word) = match_word_before(tree.text(), offset);
    if word.is_empty() && !explicit {
        return None;
    }

    let mut items = structural_templates(tree, from, indent_unit);
    items.extend(
        PLAIN_KEYWORDS
            .iter()
            .map(|kw| CompletionItem::plain(*kw, CompletionCategory::Keyword)),
    );
    items.extend(
        BUILTIN_TYPES
            .iter()
            .map(|ty| CompletionItem::plain(*ty, CompletionCategory::Type)),
    );

    let scopes = collect_scopes(tree, offset);
    let symbols = collect_symbols(&scopes, word);
    trace!(
        scopes = scopes.len(),
        symbols = symbols.len(),
        word,
        "resolved completion symbols"
    );
    items.extend(
        symbols
            .into_iter()
            .map(|symbol| CompletionItem::plain(symbol.name.as_str(), symbol.kind.into())),
    );

    Some(CompletionList { from, items })
}

/// Skeletons for the block statements, indented for insertion at `at`.
fn structural_templates(tree: &SyntaxTree, at: usize, unit: usize) -> Vec<CompletionItem> {
    let level = indentation(tree, at, unit);
    let closing = pad(level);
    vec![
        CompletionItem::template(
            "if ... then",
            format!("if  then\n\n{}end", pad(level.saturating_sub(unit))),
            3,
        ),
        CompletionItem::template("function ...()", format!("function ()\n\n{closing}end"), 9),
        CompletionItem::template(
            "loop for",
            format!("loop for  from  to\n\n{closing}end"),
            9,
        ),
        CompletionItem::template("loop while", format!("loop while \n\n{closing}end"), 11),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ib_syntax::parse;
    use pretty_assertions::assert_eq;

    fn labels(list: &CompletionList) -> Vec<&str> {
        list.items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_match_word_before() {
        assert_eq!(match_word_before("x = co", 6), (4, "co"));
        assert_eq!(match_word_before("x = ", 4), (4, ""));
        assert_eq!(match_word_before("a_1", 3), (0, "a_1"));
        assert_eq!(match_word_before("abc", 99), (0, "abc"));
        assert_eq!(match_word_before("é", 1), (0, ""));
    }

    #[test]
    fn test_no_word_no_completion() {
        let tree = parse("x = 1\n");
        assert_eq!(complete(&tree, 6, false, 4), None);
        assert!(complete(&tree, 6, true, 4).is_some());
    }

    #[test]
    fn test_composition_order() {
        let tree = parse("total = 0\nt");
        let list = complete(&tree, 11, false, 4).unwrap();
        assert_eq!(list.from, 10);
        assert_eq!(
            labels(&list),
            vec![
                "if ... then",
                "function ...()",
                "loop for",
                "loop while",
                "then",
                "end",
                "else",
                "output",
                "return",
                "not",
                "new",
                "Void",
                "Int",
                "String",
                "Boolean",
                "total",
            ]
        );
        let last = list.items.last().unwrap();
        assert_eq!(last.category, CompletionCategory::Variable);
    }

    #[test]
    fn test_function_symbol_category() {
        let tree = parse("function area()\nend\na");
        let list = complete(&tree, 21, false, 4).unwrap();
        let area = list.items.iter().find(|i| i.label == "area").unwrap();
        assert_eq!(area.category, CompletionCategory::Function);
    }

    #[test]
    fn test_typed_variable_is_plain_item() {
        let tree = parse("s = new Shape()\nx");
        let list = complete(&tree, 17, false, 4).unwrap();
        let s = list.items.iter().find(|i| i.label == "s").unwrap();
        assert_eq!(s, &CompletionItem::plain("s", CompletionCategory::Variable));
    }

    #[test]
    fn test_if_template_inside_function() {
        let source = "function f()\n    if\nend";
        let offset = source.find("if").unwrap() + 2;
        let tree = parse(source);
        let list = complete(&tree, offset, false, 4).unwrap();
        assert_eq!(list.from, offset - 2);

        // The half-typed `if` counts as a level of its own.
        assert_eq!(indentation(&tree, list.from, 4), 8);
        assert_eq!(
            list.items[0].action,
            CompletionAction::Template {
                text: "if  then\n\n    end".to_string(),
                cursor_offset: 3,
            }
        );
        assert_eq!(
            list.items[3].action,
            CompletionAction::Template {
                text: "loop while \n\n        end".to_string(),
                cursor_offset: 11,
            }
        );
    }

    #[test]
    fn test_if_template_at_top_level_saturates() {
        let tree = parse("i");
        let list = complete(&tree, 1, false, 4).unwrap();
        assert_eq!(list.items[0].insert_text(), "if  then\n\nend");
        assert_eq!(list.items[1].insert_text(), "function ()\n\nend");
        assert_eq!(list.items[2].insert_text(), "loop for  from  to\n\nend");
    }
}
