//! Name context of one namespace scope
//!
//! Tracks what a scope defines, which short names it refers to, and its
//! live alias table. The rewrite stages use it to resolve partial names and
//! to choose collision-free aliases; alias changes are derived afterwards by
//! diffing two snapshots.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::name::{QualifiedName, alias_key, lookup_key, same_namespace};
use crate::base::{KindBuckets, SymbolKind};

/// An alias bound by a `use` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    /// Alias as written
    pub alias: SmolStr,
    pub target: QualifiedName,
}

/// Outcome of resolving a partial name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(QualifiedName),
    /// Unqualified function or constant in a namespace: PHP tries the
    /// namespaced name first and falls back to the global one at runtime
    GlobalFallback {
        namespaced: QualifiedName,
        global: QualifiedName,
    },
}

impl Resolution {
    /// The statically known name, if there is one
    pub fn resolved(&self) -> Option<&QualifiedName> {
        match self {
            Self::Resolved(name) => Some(name),
            Self::GlobalFallback { .. } => None,
        }
    }
}

/// Alias tables at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasSnapshot {
    aliases: KindBuckets<Vec<AliasEntry>>,
}

/// Aliases added and removed between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDiff {
    pub added: KindBuckets<Vec<AliasEntry>>,
    pub removed: KindBuckets<Vec<AliasEntry>>,
}

impl AliasDiff {
    pub fn is_empty(&self) -> bool {
        self.added.iter().all(|(_, v)| v.is_empty()) && self.removed.iter().all(|(_, v)| v.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameContext {
    namespace: Option<SmolStr>,
    definitions: KindBuckets<Vec<SmolStr>>,
    /// Short-name key → fully qualified names it was seen resolving to
    references: KindBuckets<FxHashMap<String, Vec<QualifiedName>>>,
    aliases: KindBuckets<IndexMap<String, AliasEntry>>,
}

impl NameContext {
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(SmolStr::new),
            ..Self::default()
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    /// Resolve a name as written in this scope.
    ///
    /// Precedence: fully qualified, `namespace\` relative, import alias,
    /// namespace-relative, then the runtime global fallback for unqualified
    /// functions and constants.
    pub fn resolve(&self, written: &str, kind: SymbolKind) -> Resolution {
        if let Some(fq) = written.strip_prefix('\\') {
            return Resolution::Resolved(QualifiedName::new(fq));
        }
        if let Some((first, rest)) = written.split_once('\\') {
            if first.eq_ignore_ascii_case("namespace") {
                return Resolution::Resolved(QualifiedName::join(self.namespace(), rest));
            }
            if let Some(entry) = self.aliases[SymbolKind::Type].get(&alias_key(first, SymbolKind::Type)) {
                return Resolution::Resolved(QualifiedName::join(Some(entry.target.as_str()), rest));
            }
            return Resolution::Resolved(QualifiedName::join(self.namespace(), written));
        }

        if let Some(entry) = self.aliases[kind].get(&alias_key(written, kind)) {
            return Resolution::Resolved(entry.target.clone());
        }
        let local = QualifiedName::join(self.namespace(), written);
        if kind == SymbolKind::Type || self.namespace.is_none() || self.definition_exists(written, kind) {
            return Resolution::Resolved(local);
        }
        Resolution::GlobalFallback {
            namespaced: local,
            global: QualifiedName::new(written),
        }
    }

    // =========================================================================
    // DEFINITIONS AND REFERENCES
    // =========================================================================

    pub fn add_definition(&mut self, name: &str, kind: SymbolKind) {
        self.definitions[kind].push(SmolStr::new(name));
    }

    pub fn definition_exists(&self, name: &str, kind: SymbolKind) -> bool {
        let key = alias_key(name, kind);
        self.definitions[kind].iter().any(|d| alias_key(d, kind) == key)
    }

    /// Record that `short` was written unqualified and means `target`
    pub fn add_reference(&mut self, short: &str, target: QualifiedName, kind: SymbolKind) {
        self.references[kind]
            .entry(alias_key(short, kind))
            .or_default()
            .push(target);
    }

    pub fn reference_exists(&self, short: &str, kind: SymbolKind) -> bool {
        self.references[kind].contains_key(&alias_key(short, kind))
    }

    // =========================================================================
    // ALIASES
    // =========================================================================

    /// Bind `alias` to `target`. Returns false when the alias is taken.
    pub fn add_alias(&mut self, target: QualifiedName, alias: &str, kind: SymbolKind) -> bool {
        let key = alias_key(alias, kind);
        if self.aliases[kind].contains_key(&key) {
            return false;
        }
        self.aliases[kind].insert(
            key,
            AliasEntry {
                alias: SmolStr::new(alias),
                target,
            },
        );
        true
    }

    pub fn remove_alias(&mut self, alias: &str, kind: SymbolKind) -> Option<AliasEntry> {
        self.aliases[kind].shift_remove(&alias_key(alias, kind))
    }

    /// Point an existing alias at a new target, keeping its spelling
    pub fn update_alias(&mut self, alias: &str, kind: SymbolKind, target: QualifiedName) -> bool {
        match self.aliases[kind].get_mut(&alias_key(alias, kind)) {
            Some(entry) => {
                entry.target = target;
                true
            }
            None => false,
        }
    }

    pub fn alias_exists(&self, alias: &str, kind: SymbolKind) -> bool {
        self.aliases[kind].contains_key(&alias_key(alias, kind))
    }

    pub fn alias_target(&self, alias: &str, kind: SymbolKind) -> Option<&QualifiedName> {
        self.aliases[kind].get(&alias_key(alias, kind)).map(|entry| &entry.target)
    }

    pub fn aliases(&self, kind: SymbolKind) -> impl Iterator<Item = &AliasEntry> {
        self.aliases[kind].values()
    }

    /// Short name that already refers to `name` in this scope: a local
    /// definition of the same namespace, or an existing alias
    pub fn alias_for(&self, name: &QualifiedName, kind: SymbolKind) -> Option<SmolStr> {
        if same_namespace(self.namespace(), name.namespace()) && self.definition_exists(name.short_name(), kind) {
            return Some(SmolStr::new(name.short_name()));
        }
        let key = name.lookup_key(kind);
        self.aliases[kind]
            .values()
            .find(|entry| lookup_key(entry.target.as_str(), kind) == key)
            .map(|entry| entry.alias.clone())
    }

    pub fn can_use_alias(&self, alias: &str, kind: SymbolKind) -> bool {
        !self.alias_exists(alias, kind) && !self.definition_exists(alias, kind) && !self.reference_exists(alias, kind)
    }

    /// Choose a free alias for `name`: its short name, then (types only) the
    /// last two segments concatenated, then the short name with a counter.
    pub fn allocate_alias(&self, name: &QualifiedName, kind: SymbolKind) -> SmolStr {
        let default = name.short_name();
        if self.can_use_alias(default, kind) {
            return SmolStr::new(default);
        }
        if kind == SymbolKind::Type {
            let segments: Vec<&str> = name.segments().collect();
            if segments.len() >= 2 {
                let joined = segments[segments.len() - 2..].concat();
                if self.can_use_alias(&joined, kind) {
                    return SmolStr::new(joined);
                }
            }
        }
        let mut counter = 1usize;
        loop {
            let candidate = format!("{default}{counter}");
            if self.can_use_alias(&candidate, kind) {
                return SmolStr::new(candidate);
            }
            counter += 1;
        }
    }

    // =========================================================================
    // CHANGE TRACKING
    // =========================================================================

    pub fn snapshot(&self) -> AliasSnapshot {
        AliasSnapshot {
            aliases: self.aliases.map(|_, table| table.values().cloned().collect()),
        }
    }

    /// Aliases present only in `after` (added) or only in `before` (removed).
    /// An alias whose target changed counts as both.
    pub fn diff(before: &AliasSnapshot, after: &AliasSnapshot) -> AliasDiff {
        let mut diff = AliasDiff::default();
        for kind in SymbolKind::ALL {
            let contains = |list: &[AliasEntry], entry: &AliasEntry| {
                list.iter().any(|other| {
                    alias_key(&other.alias, kind) == alias_key(&entry.alias, kind)
                        && other.target.lookup_key(kind) == entry.target.lookup_key(kind)
                })
            };
            diff.added[kind] = after.aliases[kind]
                .iter()
                .filter(|entry| !contains(&before.aliases[kind], entry))
                .cloned()
                .collect();
            diff.removed[kind] = before.aliases[kind]
                .iter()
                .filter(|entry| !contains(&after.aliases[kind], entry))
                .cloned()
                .collect();
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(name: &str) -> QualifiedName {
        QualifiedName::new(name)
    }

    #[test]
    fn test_resolve_precedence() {
        let mut ctx = NameContext::new(Some("App"));
        ctx.add_alias(qn("Vendor\\Lib"), "Lib", SymbolKind::Type);
        ctx.add_alias(qn("Vendor\\fn\\helper"), "helper", SymbolKind::Function);
        ctx.add_definition("local", SymbolKind::Function);

        let resolved = |written: &str, kind| ctx.resolve(written, kind);
        assert_eq!(resolved("\\X\\Y", SymbolKind::Type), Resolution::Resolved(qn("X\\Y")));
        assert_eq!(resolved("namespace\\Y", SymbolKind::Type), Resolution::Resolved(qn("App\\Y")));
        assert_eq!(resolved("Lib\\Sub", SymbolKind::Type), Resolution::Resolved(qn("Vendor\\Lib\\Sub")));
        assert_eq!(resolved("lib", SymbolKind::Type), Resolution::Resolved(qn("Vendor\\Lib")));
        assert_eq!(resolved("Other", SymbolKind::Type), Resolution::Resolved(qn("App\\Other")));
        assert_eq!(resolved("helper", SymbolKind::Function), Resolution::Resolved(qn("Vendor\\fn\\helper")));
        assert_eq!(resolved("local", SymbolKind::Function), Resolution::Resolved(qn("App\\local")));
        assert_eq!(
            resolved("strlen", SymbolKind::Function),
            Resolution::GlobalFallback {
                namespaced: qn("App\\strlen"),
                global: qn("strlen")
            }
        );
    }

    #[test]
    fn test_global_scope_resolves_everything_locally() {
        let ctx = NameContext::new(None);
        assert_eq!(ctx.resolve("strlen", SymbolKind::Function), Resolution::Resolved(qn("strlen")));
        assert_eq!(ctx.resolve("A\\B", SymbolKind::Constant), Resolution::Resolved(qn("A\\B")));
    }

    #[test]
    fn test_allocate_alias_avoids_collisions() {
        let mut ctx = NameContext::new(Some("App"));
        ctx.add_definition("Logger", SymbolKind::Type);
        assert_eq!(ctx.allocate_alias(&qn("Vendor\\Log\\Logger"), SymbolKind::Type), "LogLogger");

        ctx.add_alias(qn("Other\\LogLogger"), "LogLogger", SymbolKind::Type);
        assert_eq!(ctx.allocate_alias(&qn("Vendor\\Log\\Logger"), SymbolKind::Type), "Logger1");

        ctx.add_reference("helper", qn("helper"), SymbolKind::Function);
        assert_eq!(ctx.allocate_alias(&qn("Vendor\\helper"), SymbolKind::Function), "helper1");
    }

    #[test]
    fn test_constant_aliases_are_case_sensitive() {
        let mut ctx = NameContext::new(Some("App"));
        assert!(ctx.add_alias(qn("Lib\\MAX"), "MAX", SymbolKind::Constant));
        assert!(ctx.can_use_alias("max", SymbolKind::Constant));
        assert!(!ctx.can_use_alias("MAX", SymbolKind::Constant));
        assert!(ctx.add_alias(qn("Lib\\Foo"), "Foo", SymbolKind::Type));
        assert!(!ctx.can_use_alias("FOO", SymbolKind::Type));
    }

    #[test]
    fn test_alias_for_prefers_local_definition() {
        let mut ctx = NameContext::new(Some("App"));
        ctx.add_definition("Thing", SymbolKind::Type);
        ctx.add_alias(qn("Vendor\\Other"), "Other", SymbolKind::Type);
        assert_eq!(ctx.alias_for(&qn("app\\Thing"), SymbolKind::Type).as_deref(), Some("Thing"));
        assert_eq!(ctx.alias_for(&qn("vendor\\other"), SymbolKind::Type).as_deref(), Some("Other"));
        assert_eq!(ctx.alias_for(&qn("Vendor\\Missing"), SymbolKind::Type), None);
    }

    #[test]
    fn test_snapshot_diff() {
        let mut ctx = NameContext::new(None);
        ctx.add_alias(qn("A\\Old"), "Old", SymbolKind::Type);
        ctx.add_alias(qn("A\\Kept"), "Kept", SymbolKind::Type);
        let before = ctx.snapshot();

        ctx.remove_alias("old", SymbolKind::Type);
        ctx.add_alias(qn("B\\New"), "New", SymbolKind::Type);
        let after = ctx.snapshot();

        let diff = NameContext::diff(&before, &after);
        assert_eq!(diff.added[SymbolKind::Type].len(), 1);
        assert_eq!(diff.added[SymbolKind::Type][0].alias, "New");
        assert_eq!(diff.removed[SymbolKind::Type][0].alias, "Old");
        assert!(NameContext::diff(&after, &after).is_empty());

        ctx.update_alias("Kept", SymbolKind::Type, qn("C\\Kept"));
        let retargeted = NameContext::diff(&after, &ctx.snapshot());
        assert_eq!(retargeted.added[SymbolKind::Type][0].target, qn("C\\Kept"));
        assert_eq!(retargeted.removed[SymbolKind::Type][0].target, qn("A\\Kept"));
    }
}
