//! Top-level declaration discovery
//!
//! Walks the statement tree of one file and yields every relocatable unit.
//! Statements that cannot be classified are returned as errors instead.

use smol_str::SmolStr;

use super::decision::{DeclarationKind, PlanError, PlanErrorKind, SourceSpan, TokenSpan};
use crate::naming::QualifiedName;
use crate::parser::{ClassKind, NodeId, NodeKind, SyntaxTree};

/// A declaration as found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub node: NodeId,
    pub kind: DeclarationKind,
    pub namespace: Option<SmolStr>,
    /// Component kind with its original fully qualified name
    pub names: Vec<(DeclarationKind, QualifiedName)>,
    /// `define()` names inside conditionals; never renamed
    pub runtime_names: Vec<QualifiedName>,
}

/// Collect declarations. Any unclassifiable statement fails the whole file.
pub fn collect_declarations(tree: &SyntaxTree) -> Result<Vec<Declaration>, Vec<PlanError>> {
    let mut collector = Collector {
        tree,
        declarations: Vec::new(),
        errors: Vec::new(),
    };
    collector.walk(tree.root(), None);
    if collector.errors.is_empty() {
        Ok(collector.declarations)
    } else {
        Err(collector.errors)
    }
}

pub fn node_span(tree: &SyntaxTree, id: NodeId) -> SourceSpan {
    let (start_line, end_line) = tree.node_lines(id);
    let range = tree.node_range(id);
    SourceSpan {
        start_line,
        end_line,
        start_offset: range.start().into(),
        end_offset: range.end().into(),
    }
}

pub fn token_span(tree: &SyntaxTree, id: NodeId) -> TokenSpan {
    let node = tree.node(id);
    TokenSpan {
        first: node.first_token,
        end: node.end_token,
    }
}

fn class_kind(kind: ClassKind) -> DeclarationKind {
    match kind {
        ClassKind::Class => DeclarationKind::Class,
        ClassKind::Interface => DeclarationKind::Interface,
        ClassKind::Trait => DeclarationKind::Trait,
        ClassKind::Enum => DeclarationKind::Enum,
    }
}

struct Collector<'t> {
    tree: &'t SyntaxTree,
    declarations: Vec<Declaration>,
    errors: Vec<PlanError>,
}

impl Collector<'_> {
    fn walk(&mut self, parent: NodeId, namespace: Option<&SmolStr>) {
        for &child in self.tree.children(parent) {
            match &self.tree.node(child).kind {
                NodeKind::Namespace { name, .. } => self.walk(child, name.as_ref()),
                NodeKind::Declare { block: true, .. } => self.walk(child, namespace),
                NodeKind::Declare { block: false, .. } | NodeKind::Use { .. } | NodeKind::Nop => {}
                NodeKind::InlineHtml { blank: true } => {}
                NodeKind::If => self.conditional(child, namespace),
                _ => match self.direct_names(child, namespace) {
                    Some((kind, names)) => self.declarations.push(Declaration {
                        node: child,
                        kind,
                        namespace: namespace.cloned(),
                        names,
                        runtime_names: Vec::new(),
                    }),
                    None => self.unexpected(child),
                },
            }
        }
    }

    fn direct_names(
        &self,
        id: NodeId,
        namespace: Option<&SmolStr>,
    ) -> Option<(DeclarationKind, Vec<(DeclarationKind, QualifiedName)>)> {
        let ns = namespace.map(SmolStr::as_str);
        match &self.tree.node(id).kind {
            NodeKind::ClassLike { kind, name, .. } => {
                let kind = class_kind(*kind);
                Some((kind, vec![(kind, QualifiedName::join(ns, name))]))
            }
            NodeKind::Function { name, .. } => Some((
                DeclarationKind::Function,
                vec![(DeclarationKind::Function, QualifiedName::join(ns, name))],
            )),
            NodeKind::Const { names } => Some((
                DeclarationKind::Constant,
                names
                    .iter()
                    .map(|(name, _)| (DeclarationKind::Constant, QualifiedName::join(ns, name)))
                    .collect(),
            )),
            _ => None,
        }
    }

    fn conditional(&mut self, id: NodeId, namespace: Option<&SmolStr>) {
        let mut names = Vec::new();
        let mut runtime_names = Vec::new();
        let before = self.errors.len();
        self.conditional_branch(id, namespace, &mut names, &mut runtime_names);
        if self.errors.len() == before {
            self.declarations.push(Declaration {
                node: id,
                kind: DeclarationKind::Conditional,
                namespace: namespace.cloned(),
                names,
                runtime_names,
            });
        }
    }

    fn conditional_branch(
        &mut self,
        id: NodeId,
        namespace: Option<&SmolStr>,
        names: &mut Vec<(DeclarationKind, QualifiedName)>,
        runtime_names: &mut Vec<QualifiedName>,
    ) {
        for &child in self.tree.children(id) {
            match &self.tree.node(child).kind {
                NodeKind::If => self.conditional_branch(child, namespace, names, runtime_names),
                NodeKind::Define { name: Some(name) } => runtime_names.push(QualifiedName::new(name)),
                NodeKind::Return | NodeKind::Exit | NodeKind::Nop | NodeKind::Use { .. } => {}
                NodeKind::Declare { block: false, .. } | NodeKind::InlineHtml { blank: true } => {}
                _ => match self.direct_names(child, namespace) {
                    Some((_, found)) => names.extend(found),
                    None => self.unexpected(child),
                },
            }
        }
    }

    fn unexpected(&mut self, id: NodeId) {
        let span = node_span(self.tree, id);
        let what = match &self.tree.node(id).kind {
            NodeKind::Define { .. } => "define()".to_string(),
            NodeKind::InlineHtml { .. } => "inline HTML".to_string(),
            NodeKind::Return => "return".to_string(),
            NodeKind::Exit => "exit".to_string(),
            _ => {
                let first = self.tree.node(id).first_token;
                let text = self.tree.token_text(first);
                format!("'{}'", text.trim())
            }
        };
        self.errors.push(PlanError::new(
            PlanErrorKind::InvalidStatement,
            format!("Map error, unexpected {what} on line {}", span.start_line),
            Some(span),
        ));
    }
}
