//! Planner configuration

use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::constants::DEFAULT_INCLUDES_DIR;
use crate::naming::reserved::is_valid_namespace;

/// Invalid configuration, reported before any file is read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid prefix namespace '{0}'")]
    InvalidPrefix(String),
    #[error("invalid ignored namespace '{0}'")]
    InvalidIgnoreNamespace(String),
    #[error("includes directory must be a relative path inside the destination: {0}")]
    InvalidIncludesDir(PathBuf),
}

/// Namespaces whose declarations keep their identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreRule {
    Namespace(SmolStr),
    /// `*`: every declaration inside a namespace
    AllNamespaced,
    /// `?`: every declaration in the global namespace
    Global,
}

impl IgnoreRule {
    pub fn matches(&self, namespace: Option<&str>) -> bool {
        match (self, namespace) {
            (Self::Namespace(ignored), Some(ns)) => ignored == ns,
            (Self::AllNamespaced, Some(_)) => true,
            (Self::Global, None) => true,
            _ => false,
        }
    }
}

impl FromStr for IgnoreRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(Self::AllNamespaced),
            "?" => Ok(Self::Global),
            ns if is_valid_namespace(ns.trim_matches('\\')) => Ok(Self::Namespace(SmolStr::new(ns.trim_matches('\\')))),
            other => Err(ConfigError::InvalidIgnoreNamespace(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Namespace prepended to every migrated identity
    pub prefix: String,
    /// Prepend the prefix even when a namespace already starts with it
    pub append_namespace: bool,
    /// Treat `_` in legacy type names as a namespace separator
    pub underscore_conversion: bool,
    /// Only convert underscores of types declared in the global namespace
    pub ignore_namespaced_underscore: bool,
    pub ignore_namespaces: Vec<IgnoreRule>,
    /// Shared include buckets, relative to the destination root
    pub includes_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            append_namespace: false,
            underscore_conversion: false,
            ignore_namespaced_underscore: false,
            ignore_namespaces: Vec::new(),
            includes_dir: PathBuf::from(DEFAULT_INCLUDES_DIR),
        }
    }
}

impl PlannerConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_matches('\\').to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_namespace(&self.prefix) {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        if let Some(IgnoreRule::Namespace(ns)) = self
            .ignore_namespaces
            .iter()
            .find(|rule| matches!(rule, IgnoreRule::Namespace(ns) if !is_valid_namespace(ns)))
        {
            return Err(ConfigError::InvalidIgnoreNamespace(ns.to_string()));
        }
        if !is_relative_inside(&self.includes_dir) {
            return Err(ConfigError::InvalidIncludesDir(self.includes_dir.clone()));
        }
        Ok(())
    }

    pub fn is_ignored(&self, namespace: Option<&str>) -> bool {
        self.ignore_namespaces.iter().any(|rule| rule.matches(namespace))
    }

    /// Includes directory as a `/`-separated relative path
    pub fn includes_dir_str(&self) -> String {
        self.includes_dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn is_relative_inside(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_prefix() {
        assert!(PlannerConfig::new("Acme\\Legacy").validate().is_ok());
        assert_eq!(
            PlannerConfig::new("Acme\\Class").validate(),
            Err(ConfigError::InvalidPrefix("Acme\\Class".into()))
        );
        assert!(PlannerConfig::new("").validate().is_err());
    }

    #[test]
    fn test_validate_includes_dir() {
        let mut config = PlannerConfig::new("Acme");
        config.includes_dir = PathBuf::from("/abs/includes");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidIncludesDir(_))));
        config.includes_dir = PathBuf::from("../outside");
        assert!(config.validate().is_err());
        config.includes_dir = PathBuf::from("lib/includes");
        assert!(config.validate().is_ok());
        assert_eq!(config.includes_dir_str(), "lib/includes");
    }

    #[test]
    fn test_ignore_rules() {
        let rules: Vec<IgnoreRule> = ["*", "?", "Vendor\\Lib"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert!(rules[0].matches(Some("Any")));
        assert!(!rules[0].matches(None));
        assert!(rules[1].matches(None));
        assert!(rules[2].matches(Some("Vendor\\Lib")));
        assert!(!rules[2].matches(Some("Vendor\\Lib\\Sub")));
        assert!("Bad\\Echo".parse::<IgnoreRule>().is_err());
    }
}
