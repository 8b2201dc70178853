//! Qualified PHP names and their identity lookup keys

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::SymbolKind;

/// A fully qualified name, stored without the leading `\`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedName(SmolStr);

impl QualifiedName {
    pub fn new(name: &str) -> Self {
        Self(SmolStr::new(name.trim_start_matches('\\')))
    }

    /// `namespace\name`, or just `name` in the global namespace
    pub fn join(namespace: Option<&str>, name: &str) -> Self {
        match namespace.filter(|ns| !ns.is_empty()) {
            Some(ns) => Self::new(&format!("{}\\{}", ns.trim_matches('\\'), name.trim_start_matches('\\'))),
            None => Self::new(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace part, `None` for global names
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once('\\').map(|(ns, _)| ns)
    }

    pub fn short_name(&self) -> &str {
        self.0.rsplit_once('\\').map_or(self.0.as_str(), |(_, name)| name)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('\\')
    }

    /// Written form with the leading `\`
    pub fn fully_qualified(&self) -> String {
        format!("\\{}", self.0)
    }

    /// Identity key used for collision checks and index lookups
    pub fn lookup_key(&self, kind: SymbolKind) -> String {
        lookup_key(self.as_str(), kind)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Types and functions compare case-insensitively; constants compare the
/// namespace part case-insensitively and the short name exactly.
pub fn lookup_key(name: &str, kind: SymbolKind) -> String {
    let name = name.trim_start_matches('\\');
    if !kind.is_case_sensitive() {
        return name.to_lowercase();
    }
    match name.rsplit_once('\\') {
        Some((ns, short)) => format!("{}\\{}", ns.to_lowercase(), short),
        None => name.to_string(),
    }
}

/// Key for a short alias within one kind bucket
pub fn alias_key(alias: &str, kind: SymbolKind) -> String {
    if kind.is_case_sensitive() {
        alias.to_string()
    } else {
        alias.to_lowercase()
    }
}

/// True when two optional namespaces name the same namespace
pub fn same_namespace(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}
