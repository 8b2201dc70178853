//! Per-file mapping: new identity, target, exclusivity and risk of every
//! top-level declaration.

use sha2::{Digest, Sha256};
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::config::PlannerConfig;
use super::declaration::{Declaration, collect_declarations, node_span, token_span};
use super::decision::{Component, DeclarationKind, FilePlan, MappingDecision, PlanError, PlanErrorKind, SourceSpan};
use crate::base::LineIndex;
use crate::base::constants::{BUCKET_DIGEST_LEN, PHP_EXTENSION};
use crate::naming::QualifiedName;
use crate::naming::reserved::{sanitize_namespace, sanitize_with_prefix, sanitize_with_suffix, ucfirst};
use crate::parser::{Directive, SyntaxError, SyntaxTree, parse};
use crate::project::integrity::content_hash;

/// Plan one file. `path` is relative to the source root.
pub fn plan_file(path: &str, text: &str, config: &PlannerConfig) -> FilePlan {
    let tree = parse(text);
    let mut plan = FilePlan {
        path: path.to_string(),
        hash: content_hash(text.as_bytes()),
        has_include: tree.has_include(),
        decisions: Vec::new(),
        errors: Vec::new(),
    };

    if !tree.errors().is_empty() {
        plan.errors = tree
            .errors()
            .iter()
            .map(|error| syntax_error(tree.line_index(), error))
            .collect();
        debug!(path, errors = plan.errors.len(), "syntax errors, file not mapped");
        return plan;
    }

    match collect_declarations(&tree) {
        Ok(declarations) => {
            plan.decisions = declarations
                .iter()
                .map(|declaration| Mapper { config, tree: &tree }.decide(declaration))
                .collect();
            trace!(path, decisions = plan.decisions.len(), "file mapped");
        }
        Err(errors) => {
            debug!(path, errors = errors.len(), "invalid statements, file not mapped");
            plan.errors = errors;
        }
    }
    plan
}

/// Plan one file from its raw content. Content that is not UTF-8 is left
/// unmapped with an encoding error, hashed as read.
pub fn plan_bytes(path: &str, bytes: &[u8], config: &PlannerConfig) -> FilePlan {
    match std::str::from_utf8(bytes) {
        Ok(text) => plan_file(path, text, config),
        Err(err) => {
            let valid = err.valid_up_to();
            let line = bytes[..valid].iter().filter(|&&b| b == b'\n').count() + 1;
            let span = SourceSpan {
                start_line: line,
                end_line: line,
                start_offset: u32::try_from(valid).unwrap_or(u32::MAX),
                end_offset: u32::try_from(valid + err.error_len().unwrap_or(0)).unwrap_or(u32::MAX),
            };
            debug!(path, line, "invalid UTF-8, file not mapped");
            FilePlan {
                path: path.to_string(),
                hash: content_hash(bytes),
                has_include: false,
                decisions: Vec::new(),
                errors: vec![PlanError::new(
                    PlanErrorKind::Encoding,
                    format!("Encoding error on line {line}, content is not valid UTF-8"),
                    Some(span),
                )],
            }
        }
    }
}

fn syntax_error(lines: &LineIndex, error: &SyntaxError) -> PlanError {
    let span = SourceSpan {
        start_line: lines.line(error.range.start()),
        end_line: lines.line(error.range.end()),
        start_offset: error.range.start().into(),
        end_offset: error.range.end().into(),
    };
    PlanError::new(
        PlanErrorKind::Syntax,
        format!("Syntax error on line {}, {}", span.start_line, error.format()),
        Some(span),
    )
}

struct Mapper<'a> {
    config: &'a PlannerConfig,
    tree: &'a SyntaxTree,
}

impl Mapper<'_> {
    fn decide(&self, declaration: &Declaration) -> MappingDecision {
        let original_ns = declaration.namespace.as_deref();
        let ignored = self.config.is_ignored(original_ns);
        let conditional = declaration.kind == DeclarationKind::Conditional;

        let mut components: Vec<Component> = declaration
            .names
            .iter()
            .map(|(kind, original)| {
                let new = if ignored {
                    original.clone()
                } else {
                    self.new_identity(*kind, original, conditional)
                };
                Component {
                    kind: *kind,
                    original: original.clone(),
                    new,
                }
            })
            .collect();
        components.extend(declaration.runtime_names.iter().map(|name| Component {
            kind: DeclarationKind::Constant,
            original: name.clone(),
            new: name.clone(),
        }));

        let new_namespace = if ignored {
            declaration.namespace.clone()
        } else if declaration.kind.is_type() {
            components[0].new.namespace().map(SmolStr::new)
        } else {
            self.new_namespace(original_ns)
        };

        let directives = self.tree.effective_directives(declaration.node);
        let exclusive = declaration.kind.is_type();
        let target = if exclusive {
            type_target(&components[0].new)
        } else {
            self.bucket_target(new_namespace.as_deref(), &directives, conditional)
        };
        let risky = conditional || (!ignored && self.splits_namespaced_type(declaration));

        MappingDecision {
            kind: declaration.kind,
            span: node_span(self.tree, declaration.node),
            tokens: token_span(self.tree, declaration.node),
            namespace_tokens: self.tree.namespace_of(declaration.node).map(|ns| token_span(self.tree, ns)),
            original_namespace: declaration.namespace.clone(),
            new_namespace,
            summary: MappingDecision::summarize(declaration.kind, &components),
            components,
            directives,
            target,
            exclusive,
            risky,
            ignored,
        }
    }

    /// Prefix plus the original namespace, prefix stripped first unless appending
    fn new_namespace(&self, original: Option<&str>) -> Option<SmolStr> {
        let original = original?;
        let prefix = self.config.prefix.as_str();
        let rest = if self.config.append_namespace {
            Some(original)
        } else {
            strip_namespace_prefix(original, prefix)
        };
        let joined = match rest {
            Some(rest) if !rest.is_empty() => QualifiedName::join(Some(prefix), rest),
            _ => QualifiedName::new(prefix),
        };
        if joined.as_str().is_empty() {
            return None;
        }
        Some(SmolStr::new(sanitize_namespace(joined.as_str())))
    }

    fn converts_underscores(&self, namespace: Option<&str>) -> bool {
        self.config.underscore_conversion && (namespace.is_none() || !self.config.ignore_namespaced_underscore)
    }

    fn new_identity(&self, kind: DeclarationKind, original: &QualifiedName, conditional: bool) -> QualifiedName {
        let original_ns = original.namespace();
        let short = original.short_name();
        if !kind.is_type() || conditional {
            // functions, constants and conditional members keep their name
            let namespace = self.new_namespace(original_ns);
            return QualifiedName::join(namespace.as_deref(), short);
        }

        let base = original_ns.and_then(|ns| self.new_namespace(Some(ns)));
        let mut namespace = base
            .map(|ns| ns.to_string())
            .unwrap_or_else(|| self.config.prefix.clone());
        let mut name = short.to_string();

        if self.converts_underscores(original_ns) {
            if let Some((head, tail)) = short.rsplit_once('_').filter(|(_, tail)| !tail.is_empty()) {
                let extra: Vec<&str> = head.split('_').filter(|s| !s.is_empty()).collect();
                if !extra.is_empty() {
                    let extra = sanitize_namespace(&extra.iter().map(|s| ucfirst(s)).collect::<Vec<_>>().join("\\"));
                    namespace = QualifiedName::join(Some(&namespace), &extra).to_string();
                }
                name = tail.to_string();
            }
        }

        let name = ucfirst(&name);
        let name = match namespace.rsplit('\\').next().filter(|s| !s.is_empty()) {
            Some(last) => sanitize_with_prefix(&name, last),
            None => sanitize_with_suffix(&name, "_"),
        };
        let namespace = (!namespace.is_empty()).then_some(namespace);
        QualifiedName::join(namespace.as_deref(), &name)
    }

    /// Underscore conversion on a namespaced type whose name has an `_`
    fn splits_namespaced_type(&self, declaration: &Declaration) -> bool {
        declaration.kind.is_type()
            && declaration.namespace.is_some()
            && self.converts_underscores(declaration.namespace.as_deref())
            && declaration.names.iter().any(|(_, name)| name.short_name().contains('_'))
    }

    fn bucket_target(&self, namespace: Option<&str>, directives: &[Directive], conditional: bool) -> String {
        let mut sorted: Vec<&Directive> = directives.iter().collect();
        sorted.sort();
        let directives: Vec<String> = sorted.iter().map(|d| format!("{}={}", d.key, d.value)).collect();

        let mut hasher = Sha256::new();
        hasher.update(namespace.unwrap_or("").as_bytes());
        hasher.update(b"\n");
        hasher.update(directives.join(",").as_bytes());
        hasher.update(b"\n");
        hasher.update(if conditional { b"conditional".as_slice() } else { b"plain".as_slice() });
        let digest = format!("{:x}", hasher.finalize());

        format!(
            "{}/include.{}.{PHP_EXTENSION}",
            self.config.includes_dir_str(),
            &digest[..BUCKET_DIGEST_LEN]
        )
    }
}

/// `Acme\Foo\Bar` -> `Acme/Foo/Bar.php`
fn type_target(name: &QualifiedName) -> String {
    format!("{}.{PHP_EXTENSION}", name.segments().collect::<Vec<_>>().join("/"))
}

/// Remove `prefix` from the front of `namespace` on a segment boundary
fn strip_namespace_prefix<'n>(namespace: &'n str, prefix: &str) -> Option<&'n str> {
    if prefix.is_empty() {
        return Some(namespace);
    }
    match namespace.strip_prefix(prefix) {
        Some("") => None,
        Some(rest) if rest.starts_with('\\') => Some(&rest[1..]),
        _ => Some(namespace),
    }
}
