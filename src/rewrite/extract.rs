//! Lift one planned declaration out of its source file
//!
//! The declaration is copied together with the compiler directives and
//! imports in effect at its position, under its original namespace. Stages
//! 1 and 2 then make every name explicit and point it at the new identities,
//! after which moving the code into its new namespace cannot change what
//! any name means.

use super::edit::{TextEdit, apply_edits};
use super::error::RewriteError;
use super::fragment::Fragment;
use super::pipeline::qualify_and_substitute;
use super::scope::body_statements;
use super::substitute::ReviewItem;
use crate::parser::{NodeId, NodeKind, SyntaxTree, parse};
use crate::planner::MappingDecision;
use crate::project::IdentityIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub fragment: Fragment,
    pub review: Vec<ReviewItem>,
}

pub fn extract(
    tree: &SyntaxTree,
    path: &str,
    decision: &MappingDecision,
    index: &IdentityIndex,
    create_aliases: bool,
) -> Result<Extracted, RewriteError> {
    let missing = || RewriteError::MissingDeclaration {
        path: path.to_string(),
        summary: decision.summary.clone(),
    };
    let node = tree
        .find_by_tokens(decision.tokens.first, decision.tokens.end)
        .ok_or_else(missing)?;
    let scope = tree.scope_at(tree.node(node).first_token).ok_or_else(missing)?;

    let mut text = String::from("<?php\n");
    if !decision.directives.is_empty() {
        let pairs: Vec<String> = decision
            .directives
            .iter()
            .map(|d| format!("{}={}", d.key, d.value))
            .collect();
        text.push_str(&format!("\ndeclare({});\n", pairs.join(", ")));
    }
    if let Some(namespace) = &decision.original_namespace {
        text.push_str(&format!("\nnamespace {namespace};\n"));
    }
    for id in tree.scope_uses(&scope) {
        text.push_str(tree.node_text(id));
        text.push('\n');
    }
    text.push('\n');
    let fragment_line = text.matches('\n').count() + 1;
    let declaration = tree.node_range_with_doc(node);
    text.push_str(&tree.text()[declaration]);
    text.push('\n');

    let output = qualify_and_substitute(&text, index);
    let source_line = tree.line_index().line(declaration.start());
    let review = output
        .review
        .into_iter()
        .filter(|item| item.line >= fragment_line)
        .map(|item| ReviewItem {
            path: Some(path.to_string()),
            line: item.line - fragment_line + source_line,
            ..item
        })
        .collect();

    let renamed = rename_declaration(&output.text, decision);
    let tree = parse(&renamed);
    let mut fragment = Fragment::from_tree(&tree, &decision.target)?;
    fragment.namespace = decision.new_namespace.clone();

    if create_aliases {
        if let Some(primary) = decision.primary().filter(|c| c.kind.is_type() && c.is_renamed()) {
            fragment.body.push(format!(
                "\\class_alias('{}', '{}', false);",
                primary.new, primary.original
            ));
        }
    }
    Ok(Extracted { fragment, review })
}

/// Give an exclusive declaration its new short name
fn rename_declaration(text: &str, decision: &MappingDecision) -> String {
    let Some(primary) = decision.primary() else {
        return text.to_string();
    };
    let new_name = primary.new.short_name();
    if primary.original.short_name() == new_name {
        return text.to_string();
    }
    let tree = parse(text);
    let Some(id) = tree.scopes().first().and_then(|scope| body_statements(&tree, scope).first().copied()) else {
        return text.to_string();
    };
    match name_token(&tree, id) {
        Some(token) => apply_edits(text, vec![TextEdit::replace(tree.token_range(token), new_name)]),
        None => text.to_string(),
    }
}

fn name_token(tree: &SyntaxTree, id: NodeId) -> Option<usize> {
    match &tree.node(id).kind {
        NodeKind::ClassLike { name_token, .. } | NodeKind::Function { name_token, .. } => Some(*name_token),
        _ => None,
    }
}
