//! Symbol table construction
//!
//! Symbols are read off the scopes returned by
//! [`collect_scopes`](crate::scope::collect_scopes). Nothing is cached; each
//! call walks the tree again.
//!
//! Per scope, innermost first:
//!
//! 1. parameters, when the scope is a function body;
//! 2. the counter of a counting loop, when the scope is its body;
//! 3. assignments and function declarations among the scope's statements,
//!    in document order.
//!
//! Shadowed names are kept. The word under the cursor is removed last.

use ib_syntax::{SyntaxKind, SyntaxNode};
use smol_str::SmolStr;

/// What a symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// A name visible at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Type of the instantiated object for `x = new T(...)`.
    pub declared_type: Option<SmolStr>,
}

impl Symbol {
    pub fn variable(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            declared_type: None,
        }
    }

    pub fn function(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
            declared_type: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<SmolStr>) -> Self {
        self.declared_type = Some(ty.into());
        self
    }
}

/// Symbols declared in `scopes`, excluding any named `current_word`.
pub fn collect_symbols(scopes: &[SyntaxNode<'_>], current_word: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    for scope in scopes {
        parameters(*scope, &mut symbols);
        loop_counter(*scope, &mut symbols);
        declarations(*scope, &mut symbols);
    }
    symbols.retain(|symbol| symbol.name.as_str() != current_word);
    symbols
}

fn parameters(scope: SyntaxNode<'_>, out: &mut Vec<Symbol>) {
    let Some(list) = scope
        .prev_sibling()
        .filter(|n| n.kind() == SyntaxKind::ParameterList)
    else {
        return;
    };
    out.extend(
        list.children()
            .filter(|n| n.kind() == SyntaxKind::Parameter)
            .filter_map(|param| param.child(SyntaxKind::Identifier))
            .map(|ident| Symbol::variable(ident.text())),
    );
}

fn loop_counter(scope: SyntaxNode<'_>, out: &mut Vec<Symbol>) {
    let counter = scope
        .parent()
        .filter(|n| n.kind() == SyntaxKind::ForStatement)
        .and_then(|stmt| stmt.child(SyntaxKind::Identifier));
    if let Some(ident) = counter {
        out.push(Symbol::variable(ident.text()));
    }
}

fn declarations(scope: SyntaxNode<'_>, out: &mut Vec<Symbol>) {
    let statements = scope
        .children()
        .filter(|n| n.kind() == SyntaxKind::Atom)
        .filter_map(|atom| atom.children().find(|n| n.kind().is_statement()));

    for stmt in statements {
        let Some(ident) = stmt.child(SyntaxKind::Identifier) else {
            continue;
        };
        match stmt.kind() {
            SyntaxKind::VariableAssignment => {
                let symbol = Symbol::variable(ident.text());
                out.push(match declared_type(stmt) {
                    Some(ty) => symbol.with_type(ty),
                    None => symbol,
                });
            }
            SyntaxKind::FunctionDeclaration => out.push(Symbol::function(ident.text())),
            _ => {}
        }
    }
}

/// `x = new T(...)` declares `x` as a `T`.
fn declared_type<'t>(assignment: SyntaxNode<'t>) -> Option<&'t str> {
    assignment
        .child(SyntaxKind::Expression)?
        .first_child()
        .filter(|n| n.kind() == SyntaxKind::ObjectInstantiationExpression)?
        .child(SyntaxKind::TypeAnnotation)
        .map(|ty| ty.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::collect_scopes;
    use ib_syntax::parse;
    use pretty_assertions::assert_eq;

    fn symbols_at(source: &str, marker: &str, word: &str) -> Vec<Symbol> {
        let tree = parse(source);
        let offset = source.find(marker).expect("marker") + marker.len();
        let scopes = collect_scopes(&tree, offset);
        collect_symbols(&scopes, word)
    }

    #[test]
    fn test_parameters_then_body() {
        let source = "function f(x, y)\n  z = x + y\n  \nend";
        assert_eq!(
            symbols_at(source, "y\n  ", ""),
            vec![
                Symbol::variable("x"),
                Symbol::variable("y"),
                Symbol::variable("z"),
                Symbol::function("f"),
            ]
        );
    }

    #[test]
    fn test_declared_type() {
        let source = "obj = new Shape(1)\nn = 5\nlist = new List<Int>()\n";
        assert_eq!(
            symbols_at(source, "\n", ""),
            vec![
                Symbol::variable("obj").with_type("Shape"),
                Symbol::variable("n"),
                Symbol::variable("list").with_type("List"),
            ]
        );
    }

    #[test]
    fn test_member_on_instantiation_has_no_type() {
        let source = "area = new Shape(1).area()\n";
        assert_eq!(symbols_at(source, "\n", ""), vec![Symbol::variable("area")]);
    }

    #[test]
    fn test_self_exclusion() {
        let source = "count = 0\nco";
        assert_eq!(
            symbols_at(source, "co", "co"),
            vec![Symbol::variable("count")]
        );
        let source = "count = 0\ncount";
        assert_eq!(symbols_at(source, "\ncount", "count"), Vec::<Symbol>::new());
    }

    #[test]
    fn test_loop_counter_in_body() {
        let source = "loop I from 1 to 10\n  total = I\nend\n";
        assert_eq!(
            symbols_at(source, "total = I", ""),
            vec![Symbol::variable("I"), Symbol::variable("total")]
        );
    }

    #[test]
    fn test_other_statements_do_not_stop_the_scan() {
        let source = "output 1\na = 1\nif a then\nend\nb = 2\n";
        let names: Vec<_> = symbols_at(source, "b = 2\n", "")
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_inner_scope_comes_first_and_shadows_are_kept() {
        let source = "x = 1\nfunction f(x)\n  x = 2\n  \nend";
        let names: Vec<_> = symbols_at(source, "x = 2\n  ", "")
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, vec!["x", "x", "x", "f"]);
    }
}
