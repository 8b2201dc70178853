//! Scope helpers shared by the rewrite stages

use crate::base::SymbolKind;
use crate::naming::{NameContext, QualifiedName};
use crate::parser::{NodeId, NodeKind, Scope, SyntaxKind, SyntaxTree, UseItem};

/// Name context of a scope: its imports as aliases and its declarations as
/// definitions
pub fn scope_context(tree: &SyntaxTree, scope: &Scope) -> NameContext {
    let mut ctx = NameContext::new(scope.namespace.as_deref());
    for item in scope_imports(tree, scope) {
        ctx.add_alias(QualifiedName::new(&item.name), item.effective_alias(), item.kind);
    }
    let parent = scope.node.unwrap_or(tree.root());
    for id in tree.descendants(parent) {
        if !scope.contains_token(tree.node(id).first_token) {
            continue;
        }
        match &tree.node(id).kind {
            NodeKind::ClassLike { name, .. } => ctx.add_definition(name, SymbolKind::Type),
            NodeKind::Function { name, .. } => ctx.add_definition(name, SymbolKind::Function),
            NodeKind::Const { names } => {
                for (name, _) in names {
                    ctx.add_definition(name, SymbolKind::Constant);
                }
            }
            _ => {}
        }
    }
    ctx
}

/// Import items of a scope, group prefixes expanded
pub fn scope_imports(tree: &SyntaxTree, scope: &Scope) -> Vec<UseItem> {
    tree.scope_uses(scope)
        .into_iter()
        .flat_map(|id| match &tree.node(id).kind {
            NodeKind::Use { items } => items.clone(),
            _ => Vec::new(),
        })
        .collect()
}

/// Doc comment tokens inside a scope
pub fn doc_tokens(tree: &SyntaxTree, scope: &Scope) -> Vec<usize> {
    (scope.first_token..scope.end_token.min(tree.token_count()))
        .filter(|&i| tree.token_kind(i) == Some(SyntaxKind::DOC_COMMENT))
        .collect()
}

/// Resolve a name written in a doc comment the way a type in code
/// resolves. Builtin and pseudo types never reach here.
pub fn resolve_doc_name(ctx: &NameContext, written: &str) -> Option<QualifiedName> {
    ctx.resolve(written, SymbolKind::Type).resolved().cloned()
}

/// Statements of a scope that carry code, in order
pub fn body_statements(tree: &SyntaxTree, scope: &Scope) -> Vec<NodeId> {
    let parent = scope.node.unwrap_or(tree.root());
    tree.children(parent)
        .iter()
        .copied()
        .filter(|&id| {
            !matches!(
                tree.node(id).kind,
                NodeKind::Use { .. }
                    | NodeKind::Nop
                    | NodeKind::InlineHtml { blank: true }
                    | NodeKind::Declare { block: false, .. }
                    | NodeKind::Namespace { .. }
            )
        })
        .collect()
}

/// Token after which new imports go when a scope has none: the namespace
/// header terminator, else the last leading `declare`, else the open tag
pub fn import_anchor(tree: &SyntaxTree, scope: &Scope) -> Option<usize> {
    if let Some(id) = scope.node {
        let node = tree.node(id);
        let start = match &node.kind {
            NodeKind::Namespace { name_token: Some(token), .. } => *token,
            _ => node.first_token,
        };
        return (start..node.end_token).find(|&i| {
            matches!(tree.token_kind(i), Some(SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE))
        });
    }
    let leading_declare = tree
        .children(tree.root())
        .iter()
        .take_while(|&&id| {
            matches!(
                tree.node(id).kind,
                NodeKind::Declare { block: false, .. } | NodeKind::Nop | NodeKind::InlineHtml { blank: true }
            )
        })
        .filter(|&&id| matches!(tree.node(id).kind, NodeKind::Declare { .. }))
        .last()
        .map(|&id| tree.node(id).end_token - 1);
    leading_declare.or_else(|| (0..tree.token_count()).find(|&i| tree.token_kind(i) == Some(SyntaxKind::OPEN_TAG)))
}
