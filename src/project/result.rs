//! Project result and the identity index derived from it

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::base::constants::DIALECT;
use crate::base::{KindBuckets, SymbolKind};
use crate::naming::QualifiedName;
use crate::planner::{FilePlan, MappingDecision, PlannerConfig};

/// Where an accepted identity was declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub original: QualifiedName,
    pub new: QualifiedName,
    pub file: usize,
    pub decision: usize,
}

/// Old identity → new identity and back, one bucket per symbol kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityIndex {
    by_original: KindBuckets<FxHashMap<String, IndexEntry>>,
    by_new: KindBuckets<FxHashMap<String, IndexEntry>>,
}

impl IdentityIndex {
    pub fn from_files(files: &[FilePlan]) -> Self {
        let mut index = Self::default();
        for (file_index, file) in files.iter().enumerate() {
            for (decision_index, decision) in file.decisions.iter().enumerate() {
                index.insert_decision(decision, file_index, decision_index);
            }
        }
        index
    }

    /// Index every component of `decision`. The first decision seen for a
    /// name keeps it.
    pub fn insert_decision(&mut self, decision: &MappingDecision, file: usize, decision_index: usize) {
        for component in &decision.components {
            let kind = component.symbol_kind();
            let entry = IndexEntry {
                original: component.original.clone(),
                new: component.new.clone(),
                file,
                decision: decision_index,
            };
            self.by_new[kind]
                .entry(component.new.lookup_key(kind))
                .or_insert_with(|| entry.clone());
            self.by_original[kind]
                .entry(component.original.lookup_key(kind))
                .or_insert(entry);
        }
    }

    /// New identity of an original name
    pub fn lookup(&self, name: &str, kind: SymbolKind) -> Option<&IndexEntry> {
        self.by_original[kind].get(&crate::naming::lookup_key(name, kind))
    }

    /// Entry owning a new identity
    pub fn reverse(&self, name: &str, kind: SymbolKind) -> Option<&IndexEntry> {
        self.by_new[kind].get(&crate::naming::lookup_key(name, kind))
    }

    pub fn contains_new(&self, name: &QualifiedName, kind: SymbolKind) -> bool {
        self.by_new[kind].contains_key(&name.lookup_key(kind))
    }

    /// Fold another index in; entries already present win
    pub fn merge(&mut self, other: &IdentityIndex) {
        for kind in SymbolKind::ALL {
            for (key, entry) in &other.by_original[kind] {
                self.by_original[kind].entry(key.clone()).or_insert_with(|| entry.clone());
            }
            for (key, entry) in &other.by_new[kind] {
                self.by_new[kind].entry(key.clone()).or_insert_with(|| entry.clone());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_original.iter().map(|(_, bucket)| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of planning a whole source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectResult {
    pub dialect: String,
    pub source_root: String,
    /// Shared include buckets, relative to the destination
    pub includes_dir: String,
    pub prefix: String,
    /// Ordered by relative path
    pub files: Vec<FilePlan>,
    #[serde(skip)]
    index: IdentityIndex,
}

impl ProjectResult {
    pub fn new(source_root: impl Into<String>, config: &PlannerConfig, files: Vec<FilePlan>) -> Self {
        let index = IdentityIndex::from_files(&files);
        Self {
            dialect: DIALECT.to_string(),
            source_root: source_root.into(),
            includes_dir: config.includes_dir_str(),
            prefix: config.prefix.clone(),
            files,
            index,
        }
    }

    pub fn index(&self) -> &IdentityIndex {
        &self.index
    }

    /// Rebuild the derived index, needed after deserializing
    pub fn reindex(&mut self) {
        self.index = IdentityIndex::from_files(&self.files);
    }

    pub fn decisions(&self) -> impl Iterator<Item = (&FilePlan, &MappingDecision)> {
        self.files
            .iter()
            .flat_map(|file| file.decisions.iter().map(move |decision| (file, decision)))
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|file| file.errors.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.files.iter().any(FilePlan::has_errors)
    }

    pub fn risky_files(&self) -> impl Iterator<Item = &FilePlan> {
        self.files.iter().filter(|file| file.is_risky())
    }

    /// Number of declarations that change identity
    pub fn renamed_count(&self) -> usize {
        self.decisions().filter(|(_, decision)| decision.is_renamed()).count()
    }
}
