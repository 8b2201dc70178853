use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// The three identity namespaces of PHP symbols.
///
/// A class and a function may share a name; they never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// Classes, interfaces, traits, enums (and namespace prefixes)
    Type,
    Function,
    Constant,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 3] = [SymbolKind::Type, SymbolKind::Function, SymbolKind::Constant];

    pub fn index(self) -> usize {
        match self {
            Self::Type => 0,
            Self::Function => 1,
            Self::Constant => 2,
        }
    }

    /// Keyword placed after `use` when importing this kind
    pub fn use_keyword(self) -> Option<&'static str> {
        match self {
            Self::Type => None,
            Self::Function => Some("function"),
            Self::Constant => Some("const"),
        }
    }

    /// Constants compare their short name case-sensitively
    pub fn is_case_sensitive(self) -> bool {
        matches!(self, Self::Constant)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Function => "function",
            Self::Constant => "constant",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per [`SymbolKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindBuckets<T> {
    buckets: [T; 3],
}

impl<T> KindBuckets<T> {
    pub fn new(type_bucket: T, function_bucket: T, constant_bucket: T) -> Self {
        Self {
            buckets: [type_bucket, function_bucket, constant_bucket],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolKind, &T)> {
        SymbolKind::ALL.into_iter().zip(self.buckets.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(SymbolKind, &T) -> U) -> KindBuckets<U> {
        KindBuckets::new(
            f(SymbolKind::Type, &self.buckets[0]),
            f(SymbolKind::Function, &self.buckets[1]),
            f(SymbolKind::Constant, &self.buckets[2]),
        )
    }
}

impl<T> Index<SymbolKind> for KindBuckets<T> {
    type Output = T;

    fn index(&self, kind: SymbolKind) -> &T {
        &self.buckets[kind.index()]
    }
}

impl<T> IndexMut<SymbolKind> for KindBuckets<T> {
    fn index_mut(&mut self, kind: SymbolKind) -> &mut T {
        &mut self.buckets[kind.index()]
    }
}
