//! Concrete syntax tree
//!
//! Nodes live in a flat arena owned by [`SyntaxTree`] and link to each other
//! by index: parent, first and last child, previous and next sibling. The
//! tree is immutable once built; [`SyntaxNode`] is a cheap `Copy` handle that
//! borrows it.
//!
//! # Architecture
//!
//! ```text
//! parse(text) ──▶ TreeBuilder ──▶ SyntaxTree { text, nodes[], errors[] }
//!                                      │
//!                                      ▼
//!                              SyntaxNode<'t> (tree, id)
//! ```

use std::fmt;

use crate::kind::SyntaxKind;
use crate::lexer::Span;
use crate::SyntaxError;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    span: Span,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: SyntaxKind, span: Span) -> Self {
        Self {
            kind,
            span,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Which neighbour wins when an offset sits exactly on a node boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Prefer the node ending at the offset (`from < offset <= to`).
    Before,
    /// Prefer the node starting at the offset (`from <= offset < to`).
    After,
}

/// An immutable parse of one document snapshot.
#[derive(Clone)]
pub struct SyntaxTree {
    text: Box<str>,
    nodes: Vec<NodeData>,
    errors: Vec<SyntaxError>,
}

impl SyntaxTree {
    const ROOT: NodeId = NodeId(0);

    /// The Program node covering the whole text.
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: Self::ROOT,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Syntax errors recorded while parsing.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Innermost node covering `offset`.
    ///
    /// Offsets past the end are clamped to the text length. Empty nodes are
    /// never entered, so the result is the root when nothing else matches.
    /// From the `After` side, a node whose trailing Block was left open at the
    /// end of input also covers the final offset.
    pub fn resolve_inner(&self, offset: usize, side: Side) -> SyntaxNode<'_> {
        let len = self.text.len();
        let offset = offset.min(len);
        let mut node = self.root();
        'descend: loop {
            for child in node.children() {
                let span = child.span();
                let covers = match side {
                    Side::Before => span.start < offset && offset <= span.end,
                    Side::After => {
                        (span.start <= offset && offset < span.end)
                            || (offset == len && span.start < len && self.open_at_end(child))
                    }
                };
                if covers {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    /// True if `node` ends in a Block that runs to the end of input.
    fn open_at_end(&self, node: SyntaxNode<'_>) -> bool {
        let len = self.text.len();
        std::iter::successors(Some(node), |n| n.last_child())
            .take_while(|n| n.span().end == len)
            .any(|n| n.kind() == SyntaxKind::Block)
    }

    /// Indented outline of the tree, one node per line.
    ///
    /// Leaves print their source text after the span.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root(), 0, &mut out);
        out
    }

    fn dump_node(&self, node: SyntaxNode<'_>, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let span = node.span();
        let _ = write!(
            out,
            "{:indent$}{:?}@{}..{}",
            "",
            node.kind(),
            span.start,
            span.end,
            indent = depth * 2
        );
        if node.first_child().is_none() {
            let _ = write!(out, " {:?}", node.text());
        }
        out.push('\n');
        for child in node.children() {
            self.dump_node(child, depth + 1, out);
        }
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .field("errors", &self.errors)
            .finish()
    }
}

/// Borrowed handle to a node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    pub fn kind(&self) -> SyntaxKind {
        self.tree.data(self.id).kind
    }

    pub fn span(&self) -> Span {
        self.tree.data(self.id).span
    }

    /// Source text covered by the node.
    pub fn text(&self) -> &'t str {
        let span = self.span();
        self.tree.text.get(span.start..span.end).unwrap_or("")
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.link(self.tree.data(self.id).parent)
    }

    pub fn first_child(&self) -> Option<SyntaxNode<'t>> {
        self.link(self.tree.data(self.id).first_child)
    }

    pub fn last_child(&self) -> Option<SyntaxNode<'t>> {
        self.link(self.tree.data(self.id).last_child)
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode<'t>> {
        self.link(self.tree.data(self.id).next_sibling)
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode<'t>> {
        self.link(self.tree.data(self.id).prev_sibling)
    }

    /// Direct children in document order.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> {
        std::iter::successors(self.first_child(), |node| node.next_sibling())
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|child| child.kind() == kind)
    }

    /// This node followed by every ancestor up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> {
        std::iter::successors(Some(*self), |node| node.parent())
    }

    fn link(&self, id: Option<NodeId>) -> Option<SyntaxNode<'t>> {
        id.map(|id| SyntaxNode {
            tree: self.tree,
            id,
        })
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(f, "{:?}@{}..{}", self.kind(), span.start, span.end)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Appends nodes to the arena while the parser walks the token stream.
///
/// Nodes are opened with [`start_node`](Self::start_node) and closed with
/// [`finish_node`](Self::finish_node); every node is linked as the last child
/// of the innermost open node.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind, start: usize) -> NodeId {
        let id = self.push(NodeData::new(kind, Span::empty(start)));
        self.attach(id);
        self.open.push(id);
        id
    }

    /// Closes the innermost open node at the end of its last child.
    pub(crate) fn finish_node(&mut self) -> Option<NodeId> {
        let id = *self.open.last()?;
        let data = &self.nodes[id.index()];
        let end = data
            .last_child
            .map(|child| self.nodes[child.index()].span.end)
            .unwrap_or(data.span.start);
        self.finish_node_at(end)
    }

    /// Closes the innermost open node at an explicit end offset.
    pub(crate) fn finish_node_at(&mut self, end: usize) -> Option<NodeId> {
        let id = self.open.pop()?;
        let span = &mut self.nodes[id.index()].span;
        span.end = end.max(span.start);
        Some(id)
    }

    pub(crate) fn leaf(&mut self, kind: SyntaxKind, span: Span) -> NodeId {
        let id = self.push(NodeData::new(kind, span));
        self.attach(id);
        id
    }

    /// Opens a new node of `kind` in place of the already finished `child`,
    /// which becomes its first child.
    pub(crate) fn precede(&mut self, child: NodeId, kind: SyntaxKind) -> NodeId {
        let old = self.nodes[child.index()].clone();
        let mut wrapper = NodeData::new(kind, Span::empty(old.span.start));
        wrapper.parent = old.parent;
        wrapper.prev_sibling = old.prev_sibling;
        wrapper.next_sibling = old.next_sibling;
        wrapper.first_child = Some(child);
        wrapper.last_child = Some(child);
        let id = self.push(wrapper);

        if let Some(prev) = old.prev_sibling {
            self.nodes[prev.index()].next_sibling = Some(id);
        }
        if let Some(next) = old.next_sibling {
            self.nodes[next.index()].prev_sibling = Some(id);
        }
        if let Some(parent) = old.parent {
            let parent = &mut self.nodes[parent.index()];
            if parent.first_child == Some(child) {
                parent.first_child = Some(id);
            }
            if parent.last_child == Some(child) {
                parent.last_child = Some(id);
            }
        }

        let moved = &mut self.nodes[child.index()];
        moved.parent = Some(id);
        moved.prev_sibling = None;
        moved.next_sibling = None;

        self.open.push(id);
        id
    }

    /// Closes any nodes left open and produces the tree.
    pub(crate) fn finish(mut self, text: &str, errors: Vec<SyntaxError>) -> SyntaxTree {
        while !self.open.is_empty() {
            self.finish_node();
        }
        if self.nodes.is_empty() {
            self.nodes
                .push(NodeData::new(SyntaxKind::Program, Span::new(0, text.len())));
        }
        SyntaxTree {
            text: Box::from(text),
            nodes: self.nodes,
            errors,
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    fn attach(&mut self, id: NodeId) {
        let Some(&parent) = self.open.last() else {
            return;
        };
        let last = self.nodes[parent.index()].last_child;
        {
            let data = &mut self.nodes[id.index()];
            data.parent = Some(parent);
            data.prev_sibling = last;
        }
        match last {
            Some(last) => self.nodes[last.index()].next_sibling = Some(id),
            None => self.nodes[parent.index()].first_child = Some(id),
        }
        self.nodes[parent.index()].last_child = Some(id);
    }
}
