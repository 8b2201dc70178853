//! Stage 3: shorten qualified references through imports
//!
//! Every fully qualified reference either reuses an alias that already
//! points at it, becomes a bare name inside its own namespace, or gets a
//! freshly allocated alias. The import list of the scope is rebuilt from the
//! aliases actually in use, types first, then functions, then constants.

use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};
use tracing::trace;

use super::edit::{TextEdit, apply_edits};
use super::scope::{doc_tokens, import_anchor, scope_context};
use crate::base::SymbolKind;
use crate::naming::{AliasEntry, NameContext, QualifiedName, alias_key, same_namespace};
use crate::parser::{NodeId, Scope, SyntaxKind, SyntaxTree, doc_references, last_segment, scan_references};

pub fn reimport(tree: &SyntaxTree) -> Vec<TextEdit> {
    let mut edits = Vec::new();
    for scope in tree.scopes() {
        ScopeImports::new(tree, &scope).run(&mut edits);
    }
    trace!(edits = edits.len(), "imports rebuilt");
    edits
}

struct ScopeImports<'t> {
    tree: &'t SyntaxTree,
    scope: &'t Scope,
    ctx: NameContext,
    used: FxHashSet<(SymbolKind, String)>,
}

impl<'t> ScopeImports<'t> {
    fn new(tree: &'t SyntaxTree, scope: &'t Scope) -> Self {
        Self {
            tree,
            scope,
            ctx: scope_context(tree, scope),
            used: FxHashSet::default(),
        }
    }

    fn mark_used(&mut self, alias: &str, kind: SymbolKind) {
        self.used.insert((kind, alias_key(alias, kind)));
    }

    fn run(mut self, edits: &mut Vec<TextEdit>) {
        let before = self.ctx.snapshot();
        let refs = scan_references(self.tree, self.scope.first_token, self.scope.end_token);

        // names still written relative keep the aliases they go through
        for reference in refs.iter().filter(|r| !r.text.starts_with('\\')) {
            match reference.text.split_once('\\') {
                Some((first, _)) if !first.eq_ignore_ascii_case("namespace") => {
                    self.mark_used(first, SymbolKind::Type);
                }
                Some(_) => {}
                None if self.ctx.alias_exists(&reference.text, reference.kind) => {
                    self.mark_used(&reference.text, reference.kind);
                }
                None => {
                    let target = QualifiedName::join(self.ctx.namespace(), &reference.text);
                    self.ctx.add_reference(&reference.text, target, reference.kind);
                }
            }
        }

        for reference in refs.iter().filter(|r| r.text.starts_with('\\')) {
            let name = QualifiedName::new(&reference.text);
            if let Some(short) = self.shorten(&name, reference.kind) {
                edits.push(TextEdit::replace(self.tree.token_range(reference.token), short));
            }
        }

        for token in doc_tokens(self.tree, self.scope) {
            let comment = self.tree.token_text(token);
            let mut inner = Vec::new();
            for doc in doc_references(comment).into_iter().filter(|doc| doc.name.starts_with('\\')) {
                let Some(short) = self.existing_short(&QualifiedName::new(&doc.name), SymbolKind::Type) else {
                    continue;
                };
                if self.ctx.alias_exists(&short, SymbolKind::Type) {
                    self.mark_used(&short, SymbolKind::Type);
                }
                inner.push(TextEdit::replace(doc.range, short));
            }
            if !inner.is_empty() {
                edits.push(TextEdit::replace(self.tree.token_range(token), apply_edits(comment, inner)));
            }
        }

        let after = self.ctx.snapshot();
        let diff = NameContext::diff(&before, &after);
        let unused = SymbolKind::ALL.iter().any(|&kind| {
            self.ctx
                .aliases(kind)
                .any(|entry| !self.used.contains(&(kind, alias_key(&entry.alias, kind))))
        });
        if diff.is_empty() && !unused {
            return;
        }
        self.rewrite_use_statements(edits);
    }

    /// Short spelling of a qualified reference, importing it when needed.
    /// `None` keeps the reference fully qualified.
    fn shorten(&mut self, name: &QualifiedName, kind: SymbolKind) -> Option<String> {
        if let Some(short) = self.existing_short(name, kind) {
            if self.ctx.alias_exists(&short, kind) {
                self.mark_used(&short, kind);
            } else {
                self.ctx.add_reference(&short, name.clone(), kind);
            }
            return Some(short);
        }
        if name.namespace().is_none() && kind != SymbolKind::Type {
            // global functions and constants stay explicit inside a namespace
            return None;
        }
        let alias = self.ctx.allocate_alias(name, kind);
        self.ctx.add_alias(name.clone(), &alias, kind);
        self.mark_used(&alias, kind);
        Some(alias.to_string())
    }

    /// Spelling that already means `name` here, without adding an import
    fn existing_short(&self, name: &QualifiedName, kind: SymbolKind) -> Option<String> {
        if let Some(alias) = self.ctx.alias_for(name, kind) {
            return Some(alias.to_string());
        }
        let short = name.short_name();
        let free = match self.ctx.alias_target(short, kind) {
            Some(target) => target.lookup_key(kind) == name.lookup_key(kind),
            None => true,
        };
        let in_scope_namespace = same_namespace(self.ctx.namespace(), name.namespace());
        let resolves_here = match kind {
            SymbolKind::Type => in_scope_namespace,
            // a bare function or constant falls back to the global one
            _ => in_scope_namespace && (self.ctx.namespace().is_none() || self.ctx.definition_exists(short, kind)),
        };
        (free && resolves_here).then(|| short.to_string())
    }

    fn rewrite_use_statements(&self, edits: &mut Vec<TextEdit>) {
        let block = self.render_imports();
        let uses = self.tree.scope_uses(self.scope);
        if let Some((&first, rest)) = uses.split_first() {
            edits.push(TextEdit::replace(self.tree.node_range(first), block));
            for &id in rest {
                edits.push(TextEdit::delete(self.statement_line(id)));
            }
            return;
        }
        if block.is_empty() {
            return;
        }
        let Some(anchor) = import_anchor(self.tree, self.scope) else {
            return;
        };
        let range = self.tree.token_range(anchor);
        let text = if self.tree.token_kind(anchor) == Some(SyntaxKind::OPEN_TAG) {
            if self.tree.token_text(anchor).ends_with('\n') {
                format!("\n{block}\n\n")
            } else {
                format!("\n\n{block}\n\n")
            }
        } else {
            format!("\n\n{block}")
        };
        edits.push(TextEdit::insert(range.end(), text));
    }

    /// Node range plus the line break that follows it
    fn statement_line(&self, id: NodeId) -> TextRange {
        let range = self.tree.node_range(id);
        let node = self.tree.node(id);
        match self.tree.token_kind(node.end_token) {
            Some(SyntaxKind::WHITESPACE) => {
                let ws = self.tree.token_text(node.end_token);
                match ws.find('\n') {
                    Some(nl) => TextRange::new(range.start(), range.end() + TextSize::new(nl as u32 + 1)),
                    None => range,
                }
            }
            _ => range,
        }
    }

    fn render_imports(&self) -> String {
        let mut lines = Vec::new();
        for kind in SymbolKind::ALL {
            let mut entries: Vec<&AliasEntry> = self
                .ctx
                .aliases(kind)
                .filter(|entry| self.used.contains(&(kind, alias_key(&entry.alias, kind))))
                .collect();
            entries.sort_by_key(|entry| entry.target.as_str().to_lowercase());
            for entry in entries {
                let keyword = kind.use_keyword().map(|k| format!("{k} ")).unwrap_or_default();
                let alias = if last_segment(entry.target.as_str()) == entry.alias.as_str() {
                    String::new()
                } else {
                    format!(" as {}", entry.alias)
                };
                lines.push(format!("use {keyword}{}{alias};", entry.target));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(source: &str) -> String {
        let tree = parse(source);
        apply_edits(source, reimport(&tree))
    }

    #[test]
    fn test_reimport_adds_imports_after_namespace() {
        let source = "<?php\nnamespace Acme\\Foo;\n\nclass Bar extends \\Acme\\Base\\Model implements \\Acme\\Foo\\Contract {\n    public function f(): \\Vendor\\Model { return \\strlen('x'); }\n}\n";
        let expected = "<?php\nnamespace Acme\\Foo;\n\nuse Acme\\Base\\Model;\nuse Vendor\\Model as VendorModel;\n\nclass Bar extends Model implements Contract {\n    public function f(): VendorModel { return \\strlen('x'); }\n}\n";
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_reimport_reuses_existing_alias_and_drops_unused() {
        let source = "<?php\nnamespace App;\nuse Acme\\Foo\\Bar as Foo_Bar;\nuse Unused\\Thing;\n\nnew \\Acme\\Foo\\Bar();\n";
        let expected = "<?php\nnamespace App;\nuse Acme\\Foo\\Bar as Foo_Bar;\n\nnew Foo_Bar();\n";
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_reimport_keeps_untouched_imports() {
        let source = "<?php\nnamespace App;\nuse Vendor\\{A, B};\n\nnew A(); new B();\n";
        assert_eq!(run(source), source);
    }

    #[test]
    fn test_reimport_global_scope() {
        let source = "<?php\nclass Foo_Bar extends \\Foo_Base {\n    public function f() { return new \\Acme\\X(\\PHP_EOL); }\n}\n";
        let expected = "<?php\n\nuse Acme\\X;\n\nclass Foo_Bar extends Foo_Base {\n    public function f() { return new X(PHP_EOL); }\n}\n";
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_reimport_avoids_local_definition_clash() {
        let source = "<?php\nnamespace App;\n\nclass Model {}\nclass User extends \\Orm\\Model {}\n";
        let expected = "<?php\nnamespace App;\n\nuse Orm\\Model as OrmModel;\n\nclass Model {}\nclass User extends OrmModel {}\n";
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_reimport_functions_and_constants() {
        let source = "<?php\nnamespace App;\n\n\\Lib\\helper(\\Lib\\LIMIT, \\App\\local());\nfunction local() {}\n";
        let expected = "<?php\nnamespace App;\n\nuse function Lib\\helper;\nuse const Lib\\LIMIT;\n\nhelper(LIMIT, local());\nfunction local() {}\n";
        assert_eq!(run(source), expected);
    }

    #[test]
    fn test_reimport_doc_uses_known_aliases_only() {
        let source = "<?php\nnamespace App;\n\n/**\n * @param \\Vendor\\X $x\n * @return \\App\\Y\n */\nfunction f(\\Vendor\\X $x) {}\n";
        let out = run(source);
        assert!(out.contains("use Vendor\\X;"));
        assert!(out.contains("@param X $x"));
        assert!(out.contains("@return Y"));
        assert!(out.contains("function f(X $x)"));
    }
}
