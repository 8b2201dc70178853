//! Structural merge of code headed for one target file
//!
//! A [`Fragment`] is a single-namespace file taken apart: its compiler
//! directives, namespace, imports and body statements. Fragments bound for
//! the same target are merged and rendered back into one file.

use smol_str::SmolStr;

use super::error::RewriteError;
use super::scope::{body_statements, scope_imports};
use crate::naming::{alias_key, lookup_key};
use crate::parser::{Directive, NodeKind, SyntaxTree, UseItem, last_segment, parse};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub directives: Vec<Directive>,
    pub namespace: Option<SmolStr>,
    /// Imports with group prefixes expanded
    pub imports: Vec<UseItem>,
    /// Statement texts, doc comments included
    pub body: Vec<String>,
}

impl Fragment {
    /// Take apart a parsed file. `target` names the file in errors.
    pub fn from_tree(tree: &SyntaxTree, target: &str) -> Result<Self, RewriteError> {
        let scopes = tree.scopes();
        let [scope] = scopes.as_slice() else {
            return Err(RewriteError::incompatible(target, "file declares several namespaces"));
        };

        let mut fragment = Self {
            namespace: scope.namespace.clone(),
            ..Self::default()
        };
        for &id in tree.children(tree.root()) {
            if let NodeKind::Declare { directives, block: false } = &tree.node(id).kind {
                fragment.add_directives(directives, target)?;
            }
        }
        fragment.imports = scope_imports(tree, scope)
            .into_iter()
            .map(|mut item| {
                item.group_prefix = None;
                item
            })
            .collect();
        fragment.body = body_statements(tree, scope)
            .into_iter()
            .map(|id| tree.text()[tree.node_range_with_doc(id)].to_string())
            .collect();
        Ok(fragment)
    }

    pub fn parse(text: &str, target: &str) -> Result<Self, RewriteError> {
        Self::from_tree(&parse(text), target)
    }

    fn add_directives(&mut self, incoming: &[Directive], target: &str) -> Result<(), RewriteError> {
        for directive in incoming {
            match self.directives.iter().find(|d| d.key.eq_ignore_ascii_case(&directive.key)) {
                Some(existing) if !existing.value.eq_ignore_ascii_case(&directive.value) => {
                    return Err(RewriteError::incompatible(
                        target,
                        format!(
                            "declare({}) is {} in one part and {} in another",
                            directive.key, existing.value, directive.value
                        ),
                    ));
                }
                Some(_) => {}
                None => self.directives.push(directive.clone()),
            }
        }
        Ok(())
    }

    /// Bodies are fully qualified, so an import that would rebind a taken
    /// alias or repeat a target is dropped
    fn add_import(&mut self, item: UseItem) {
        let alias = alias_key(item.effective_alias(), item.kind);
        let name = lookup_key(&item.name, item.kind);
        let taken = self.imports.iter().filter(|existing| existing.kind == item.kind).any(|existing| {
            alias_key(existing.effective_alias(), existing.kind) == alias || lookup_key(&existing.name, existing.kind) == name
        });
        if !taken {
            self.imports.push(item);
        }
    }

    /// Append `other` to this fragment
    pub fn merge(&mut self, other: Fragment, target: &str) -> Result<(), RewriteError> {
        let same_namespace = match (&self.namespace, &other.namespace) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        if !same_namespace {
            return Err(RewriteError::incompatible(
                target,
                format!(
                    "namespace {} does not match {}",
                    other.namespace.as_deref().unwrap_or("(global)"),
                    self.namespace.as_deref().unwrap_or("(global)")
                ),
            ));
        }
        self.add_directives(&other.directives, target)?;
        for item in other.imports {
            self.add_import(item);
        }
        self.body.extend(other.body);
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<?php\n");
        if !self.directives.is_empty() {
            let pairs: Vec<String> = self.directives.iter().map(|d| format!("{}={}", d.key, d.value)).collect();
            out.push_str(&format!("\ndeclare({});\n", pairs.join(", ")));
        }
        if let Some(namespace) = &self.namespace {
            out.push_str(&format!("\nnamespace {namespace};\n"));
        }
        if !self.imports.is_empty() {
            out.push('\n');
            for item in &self.imports {
                let keyword = item.kind.use_keyword().map(|k| format!("{k} ")).unwrap_or_default();
                let alias = match &item.alias {
                    Some(alias) if alias.as_str() != last_segment(&item.name) => format!(" as {alias}"),
                    _ => String::new(),
                };
                out.push_str(&format!("use {keyword}{}{alias};\n", item.name));
            }
        }
        for statement in &self.body {
            out.push('\n');
            out.push_str(statement.trim_end());
            out.push('\n');
        }
        out
    }
}
