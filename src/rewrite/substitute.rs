//! Stage 2: replace references to migrated symbols with their new identity
//!
//! Runs on qualified text. Names absent from the identity index belong to
//! code outside the project and stay as they are. String literals that spell
//! a migrated class name cannot be rewritten safely and are reported instead.

use tracing::trace;

use super::edit::{TextEdit, apply_edits};
use super::scope::{doc_tokens, scope_context};
use crate::base::SymbolKind;
use crate::naming::{QualifiedName, Resolution};
use crate::parser::{NodeKind, SyntaxKind, SyntaxTree, doc_references, last_segment, scan_references};
use crate::project::IdentityIndex;

/// A spot that may need a manual edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    /// Source path, filled in by the caller
    pub path: Option<String>,
    pub line: usize,
    pub text: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pub edits: Vec<TextEdit>,
    /// References and imports pointed at a new identity
    pub substituted: usize,
    pub review: Vec<ReviewItem>,
}

pub fn substitute(tree: &SyntaxTree, index: &IdentityIndex) -> Substitution {
    let mut out = Substitution::default();
    let replacement = |written: &str, kind: SymbolKind| -> Option<QualifiedName> {
        let entry = index.lookup(written, kind)?;
        (entry.original != entry.new && entry.new.as_str() != written.trim_start_matches('\\'))
            .then(|| entry.new.clone())
    };

    for scope in tree.scopes() {
        let ctx = scope_context(tree, &scope);
        for reference in scan_references(tree, scope.first_token, scope.end_token) {
            let new = if reference.text.starts_with('\\') {
                replacement(&reference.text, reference.kind)
            } else {
                match ctx.resolve(&reference.text, reference.kind) {
                    Resolution::GlobalFallback { namespaced, global } => index
                        .lookup(namespaced.as_str(), reference.kind)
                        .or_else(|| index.lookup(global.as_str(), reference.kind))
                        .filter(|entry| entry.original != entry.new)
                        .map(|entry| entry.new.clone()),
                    Resolution::Resolved(_) => None,
                }
            };
            if let Some(new) = new {
                out.edits
                    .push(TextEdit::replace(tree.token_range(reference.token), new.fully_qualified()));
                out.substituted += 1;
            }
        }

        for id in tree.scope_uses(&scope) {
            let NodeKind::Use { items } = &tree.node(id).kind else {
                continue;
            };
            for item in items.iter().filter(|item| item.group_prefix.is_none()) {
                let Some(new) = replacement(&item.name, item.kind) else {
                    continue;
                };
                let range = tree.token_range(item.name_token);
                let mut text = new.to_string();
                if item.alias.is_none() && new.short_name() != last_segment(&item.name) {
                    text.push_str(&format!(" as {}", last_segment(&item.name)));
                }
                out.edits.push(TextEdit::replace(range, text));
                out.substituted += 1;
            }
        }

        for token in doc_tokens(tree, &scope) {
            let comment = tree.token_text(token);
            let inner: Vec<TextEdit> = doc_references(comment)
                .into_iter()
                .filter(|doc| doc.name.starts_with('\\'))
                .filter_map(|doc| {
                    replacement(&doc.name, SymbolKind::Type).map(|new| TextEdit::replace(doc.range, new.fully_qualified()))
                })
                .collect();
            if !inner.is_empty() {
                out.substituted += inner.len();
                out.edits
                    .push(TextEdit::replace(tree.token_range(token), apply_edits(comment, inner)));
            }
        }
    }

    out.review = review_literals(tree, index);
    trace!(substituted = out.substituted, review = out.review.len(), "references substituted");
    out
}

/// String literals spelling a renamed class
fn review_literals(tree: &SyntaxTree, index: &IdentityIndex) -> Vec<ReviewItem> {
    (0..tree.token_count())
        .filter(|&i| tree.token_kind(i) == Some(SyntaxKind::STRING))
        .filter_map(|i| {
            let text = tree.token_text(i);
            let name = literal_class_name(text)?;
            let entry = index.lookup(&name, SymbolKind::Type)?;
            (entry.original != entry.new).then(|| ReviewItem {
                path: None,
                line: tree.line_index().line(tree.token_range(i).start()),
                text: text.to_string(),
                suggestion: entry.new.fully_qualified(),
            })
        })
        .collect()
}

/// `'Foo_Bar'`, `"\\Foo\\Bar"` → the class name they spell
fn literal_class_name(text: &str) -> Option<String> {
    let quote = text.chars().next()?;
    if !matches!(quote, '\'' | '"') || text.len() < 3 || !text.ends_with(quote) {
        return None;
    }
    let name = text[1..text.len() - 1].replace("\\\\", "\\");
    let name = name.trim_start_matches('\\');
    let valid = !name.is_empty()
        && name.split('\\').all(|segment| {
            segment
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    valid.then(|| name.to_string())
}
