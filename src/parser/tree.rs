//! Arena syntax tree over the lossless token stream
//!
//! Nodes only exist for statements; everything below statement level stays
//! in the token stream and is read by the reference scanner. A node covers
//! the half-open token range `first_token..end_token`.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::errors::SyntaxError;
use super::syntax_kind::SyntaxKind;
use crate::base::{LineIndex, SymbolKind};

/// A token as stored in the tree: kind plus byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub(super) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Enum => "enum",
        }
    }
}

/// One imported name of a `use` statement, group prefixes already expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseItem {
    pub kind: SymbolKind,
    /// Fully qualified target without the leading `\`
    pub name: SmolStr,
    pub alias: Option<SmolStr>,
    /// Token holding the written name (relative to the group prefix if grouped)
    pub name_token: usize,
    /// Group prefix, when the item comes from `use A\{...}`
    pub group_prefix: Option<SmolStr>,
}

impl UseItem {
    /// The short name this import binds
    pub fn effective_alias(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => last_segment(&self.name),
        }
    }
}

/// `key=value` pair of a `declare(...)` statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Directive {
    pub key: SmolStr,
    pub value: SmolStr,
}

/// Statement payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    SourceFile,
    Namespace {
        name: Option<SmolStr>,
        name_token: Option<usize>,
        braced: bool,
    },
    Use {
        items: Vec<UseItem>,
    },
    Declare {
        directives: Vec<Directive>,
        block: bool,
    },
    ClassLike {
        kind: ClassKind,
        name: SmolStr,
        name_token: usize,
    },
    Function {
        name: SmolStr,
        name_token: usize,
    },
    Const {
        names: Vec<(SmolStr, usize)>,
    },
    If,
    /// `define('NAME', ...)`; the name is `None` unless it is a plain literal
    Define {
        name: Option<SmolStr>,
    },
    Return,
    Exit,
    Nop,
    InlineHtml {
        blank: bool,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub first_token: usize,
    pub end_token: usize,
    /// Leading doc comment token
    pub doc: Option<usize>,
}

/// A namespace scope: a namespace statement, or the whole file when the
/// file declares no namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub node: Option<NodeId>,
    pub namespace: Option<SmolStr>,
    pub first_token: usize,
    pub end_token: usize,
}

impl Scope {
    pub fn contains_token(&self, token: usize) -> bool {
        token >= self.first_token && token < self.end_token
    }
}

/// Parsed file: text, tokens, statement arena and collected errors
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    text: String,
    tokens: Vec<RawToken>,
    nodes: Vec<Node>,
    errors: Vec<SyntaxError>,
    line_index: LineIndex,
}

impl SyntaxTree {
    pub(super) fn new(text: String, tokens: Vec<RawToken>, nodes: Vec<Node>, errors: Vec<SyntaxError>) -> Self {
        let line_index = LineIndex::new(&text);
        Self {
            text,
            tokens,
            nodes,
            errors,
            line_index,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Concatenate every token text
    pub fn print(&self) -> String {
        self.tokens.iter().map(|token| &self.text[token.range]).collect()
    }

    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    // =========================================================================
    // TOKENS
    // =========================================================================

    pub fn tokens(&self) -> &[RawToken] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token_kind(&self, index: usize) -> Option<SyntaxKind> {
        self.tokens.get(index).map(|token| token.kind)
    }

    pub fn token_text(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |token| &self.text[token.range])
    }

    pub fn token_range(&self, index: usize) -> TextRange {
        self.tokens
            .get(index)
            .map_or_else(|| TextRange::empty(TextSize::of(self.text.as_str())), |token| token.range)
    }

    /// Nearest non-trivia token before `index`
    pub fn prev_significant(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| !self.tokens[i].kind.is_trivia())
    }

    /// Nearest non-trivia token after `index`
    pub fn next_significant(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_trivia())
    }

    /// Any `include`/`require` anywhere in the file
    pub fn has_include(&self) -> bool {
        self.tokens.iter().any(|token| token.kind == SyntaxKind::INCLUDE_KW)
    }

    // =========================================================================
    // NODES
    // =========================================================================

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i as u32), node))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Preorder walk below `id`, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Byte range from the first to the last token of the node
    pub fn node_range(&self, id: NodeId) -> TextRange {
        let node = self.node(id);
        if node.end_token <= node.first_token {
            return TextRange::empty(self.token_range(node.first_token).start());
        }
        let start = self.token_range(node.first_token).start();
        let end = self.token_range(node.end_token - 1).end();
        TextRange::new(start, end)
    }

    /// Node range widened to include the leading doc comment
    pub fn node_range_with_doc(&self, id: NodeId) -> TextRange {
        let range = self.node_range(id);
        match self.node(id).doc {
            Some(doc) => TextRange::new(self.token_range(doc).start(), range.end()),
            None => range,
        }
    }

    pub fn node_text(&self, id: NodeId) -> &str {
        &self.text[self.node_range(id)]
    }

    pub fn doc_text(&self, id: NodeId) -> Option<&str> {
        self.node(id).doc.map(|doc| self.token_text(doc))
    }

    /// 1-based (start, end) lines of the node, doc comment excluded
    pub fn node_lines(&self, id: NodeId) -> (usize, usize) {
        let range = self.node_range(id);
        let end = if range.is_empty() { range.end() } else { range.end() - TextSize::new(1) };
        (self.line_index.line(range.start()), self.line_index.line(end))
    }

    /// Node whose token span is exactly `first..end`
    pub fn find_by_tokens(&self, first: usize, end: usize) -> Option<NodeId> {
        self.nodes()
            .skip(1)
            .find(|(_, node)| node.first_token == first && node.end_token == end)
            .map(|(id, _)| id)
    }

    /// Enclosing namespace statement of `id`
    pub fn namespace_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            if matches!(self.node(parent).kind, NodeKind::Namespace { .. }) {
                return Some(parent);
            }
            current = self.node(parent).parent;
        }
        None
    }

    /// Namespace name in effect at `id`
    pub fn namespace_name(&self, id: NodeId) -> Option<SmolStr> {
        let ns = self.namespace_of(id)?;
        match &self.node(ns).kind {
            NodeKind::Namespace { name, .. } => name.clone(),
            _ => None,
        }
    }

    /// Namespace scopes of the file, in source order
    pub fn scopes(&self) -> Vec<Scope> {
        let scopes: Vec<Scope> = self
            .children(self.root())
            .iter()
            .filter_map(|&child| match &self.node(child).kind {
                NodeKind::Namespace { name, .. } => Some(Scope {
                    node: Some(child),
                    namespace: name.clone(),
                    first_token: self.node(child).first_token,
                    end_token: self.node(child).end_token,
                }),
                _ => None,
            })
            .collect();
        if scopes.is_empty() {
            vec![Scope {
                node: None,
                namespace: None,
                first_token: 0,
                end_token: self.tokens.len(),
            }]
        } else {
            scopes
        }
    }

    /// Scope containing `token`
    pub fn scope_at(&self, token: usize) -> Option<Scope> {
        self.scopes().into_iter().find(|scope| scope.contains_token(token))
    }

    /// `use` statements that are direct children of a scope
    pub fn scope_uses(&self, scope: &Scope) -> Vec<NodeId> {
        let parent = scope.node.unwrap_or(self.root());
        self.children(parent)
            .iter()
            .copied()
            .filter(|&child| matches!(self.node(child).kind, NodeKind::Use { .. }))
            .collect()
    }

    /// Compiler directives in effect at `id`: enclosing `declare` blocks and
    /// preceding `declare` statements on every level, later keys overriding.
    pub fn effective_directives(&self, id: NodeId) -> Vec<Directive> {
        let mut path = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.node(parent).parent;
        }
        path.reverse();

        let mut directives: Vec<Directive> = Vec::new();
        let mut merge = |found: &[Directive]| {
            for directive in found {
                match directives.iter_mut().find(|d| d.key.eq_ignore_ascii_case(&directive.key)) {
                    Some(existing) => existing.value = directive.value.clone(),
                    None => directives.push(directive.clone()),
                }
            }
        };
        for pair in path.windows(2) {
            let (parent, child) = (pair[0], pair[1]);
            if let NodeKind::Declare { directives: found, block: true } = &self.node(parent).kind {
                merge(found);
            }
            for &sibling in self.children(parent) {
                if sibling == child {
                    break;
                }
                if let NodeKind::Declare { directives: found, block: false } = &self.node(sibling).kind {
                    merge(found);
                }
            }
        }
        directives
    }
}

/// Last `\`-separated segment of a name
pub fn last_segment(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}
