//! Stage 1: write every resolvable reference fully qualified
//!
//! Unqualified functions and constants inside a namespace that are neither
//! imported nor declared locally keep their spelling: PHP resolves them at
//! runtime, first in the namespace and then globally.

use tracing::trace;

use super::edit::{TextEdit, apply_edits};
use super::scope::{doc_tokens, resolve_doc_name, scope_context};
use crate::naming::Resolution;
use crate::parser::{SyntaxTree, doc_references, scan_references};

pub fn qualify(tree: &SyntaxTree) -> Vec<TextEdit> {
    let mut edits = Vec::new();
    for scope in tree.scopes() {
        let ctx = scope_context(tree, &scope);
        for reference in scan_references(tree, scope.first_token, scope.end_token) {
            if reference.text.starts_with('\\') {
                continue;
            }
            if let Resolution::Resolved(name) = ctx.resolve(&reference.text, reference.kind) {
                edits.push(TextEdit::replace(tree.token_range(reference.token), name.fully_qualified()));
            }
        }

        for token in doc_tokens(tree, &scope) {
            let comment = tree.token_text(token);
            let inner: Vec<TextEdit> = doc_references(comment)
                .into_iter()
                .filter(|doc| !doc.name.starts_with('\\'))
                .filter_map(|doc| {
                    resolve_doc_name(&ctx, &doc.name).map(|name| TextEdit::replace(doc.range, name.fully_qualified()))
                })
                .collect();
            if !inner.is_empty() {
                edits.push(TextEdit::replace(tree.token_range(token), apply_edits(comment, inner)));
            }
        }
    }
    trace!(edits = edits.len(), "references qualified");
    edits
}
