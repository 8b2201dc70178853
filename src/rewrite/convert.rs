//! Convert: write the planned layout into a destination directory
//!
//! Fragments are extracted per source file on the rayon pool, grouped by
//! target in plan order, and every target is written once, merging into
//! whatever already sits at that path.

use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info};

use super::error::RewriteError;
use super::extract::extract;
use super::fragment::Fragment;
use super::output::{PathLocks, write_atomic};
use super::pipeline::{qualify_source, reimport_source};
use super::substitute::ReviewItem;
use crate::base::constants::AUTOLOAD_FILE;
use crate::parser::parse;
use crate::planner::FilePlan;
use crate::project::integrity::verify_content_hashes;
use crate::project::{IdentityIndex, ProjectResult, load_file};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Convert even when the plan holds risky decisions
    pub allow_risky: bool,
    /// Emit `class_alias` lines and an old-name autoloader
    pub create_aliases: bool,
    /// Leave the prefix directories out of class file paths
    pub strip_prefix_path: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertReport {
    /// Targets written, relative to the destination
    pub written: Vec<String>,
    pub review: Vec<ReviewItem>,
    /// Entries in the generated autoload map
    pub aliases: usize,
}

struct Job {
    target: String,
    fragment: Fragment,
    review: Vec<ReviewItem>,
}

pub fn convert(result: &ProjectResult, dest: &Path, options: &ConvertOptions) -> Result<ConvertReport, RewriteError> {
    verify_content_hashes(result)?;
    if !options.allow_risky {
        let files: Vec<String> = result.risky_files().map(|file| file.path.clone()).collect();
        if !files.is_empty() {
            return Err(RewriteError::Risky { files });
        }
    }

    let jobs: Vec<Vec<Job>> = result
        .files
        .par_iter()
        .filter(|file| !file.decisions.is_empty())
        .map(|file| extract_file(result, file, options))
        .collect::<Result<_, _>>()?;

    let mut report = ConvertReport::default();
    let mut targets: IndexMap<String, Vec<Fragment>> = IndexMap::new();
    for job in jobs.into_iter().flatten() {
        report.review.extend(job.review);
        targets.entry(job.target).or_default().push(job.fragment);
    }

    let locks = PathLocks::default();
    let targets: Vec<(String, Vec<Fragment>)> = targets.into_iter().collect();
    report.written = targets
        .into_par_iter()
        .map(|(target, fragments)| write_target(dest, &target, fragments, &locks).map(|()| target))
        .collect::<Result<_, _>>()?;

    if options.create_aliases {
        report.aliases = write_autoload(result, dest)?;
    }
    info!(
        targets = report.written.len(),
        review = report.review.len(),
        aliases = report.aliases,
        "convert finished"
    );
    Ok(report)
}

fn extract_file(result: &ProjectResult, file: &FilePlan, options: &ConvertOptions) -> Result<Vec<Job>, RewriteError> {
    let text = load_file(&Path::new(&result.source_root).join(&file.path))?;
    let tree = parse(&text);
    let index: &IdentityIndex = result.index();
    file.decisions
        .iter()
        .map(|decision| {
            let extracted = extract(&tree, &file.path, decision, index, options.create_aliases)?;
            let target = if options.strip_prefix_path && decision.exclusive {
                strip_prefix_dirs(&decision.target, &result.prefix)
            } else {
                decision.target.clone()
            };
            Ok(Job {
                target,
                fragment: extracted.fragment,
                review: extracted.review,
            })
        })
        .collect()
}

/// `Acme/Foo/Bar.php` with prefix `Acme` → `Foo/Bar.php`
fn strip_prefix_dirs(target: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return target.to_string();
    }
    let dirs = format!("{}/", prefix.replace('\\', "/"));
    target.strip_prefix(&dirs).unwrap_or(target).to_string()
}

fn write_target(dest: &Path, target: &str, fragments: Vec<Fragment>, locks: &PathLocks) -> Result<(), RewriteError> {
    let path = dest.join(target);
    let lock = locks.lock_for(&path);
    let _guard = lock.lock();

    let mut fragments = fragments.into_iter();
    let mut merged = if path.is_file() {
        let existing = std::fs::read_to_string(&path).map_err(|e| RewriteError::io(&path, e))?;
        Fragment::parse(&qualify_source(&existing), target)?
    } else {
        match fragments.next() {
            Some(first) => first,
            None => return Ok(()),
        }
    };
    for fragment in fragments {
        merged.merge(fragment, target)?;
    }
    write_atomic(&path, &reimport_source(&merged.render()))?;
    debug!(target, "target written");
    Ok(())
}

/// Autoloader resolving old class names to their new classes. Loading the
/// new class runs its `class_alias` line, which defines the old name.
fn autoload_source(entries: &[(String, String)]) -> String {
    let mut out = String::from("<?php\n\n\\spl_autoload_register(static function (string $class): void {\n    static $map = [\n");
    for (old, new) in entries {
        out.push_str(&format!("        '{old}' => '{new}',\n"));
    }
    out.push_str(
        "    ];\n\n    $key = \\strtolower(\\ltrim($class, '\\\\'));\n    if (isset($map[$key])) {\n        \\class_exists($map[$key]);\n    }\n});\n",
    );
    out
}

fn write_autoload(result: &ProjectResult, dest: &Path) -> Result<usize, RewriteError> {
    let mut entries: Vec<(String, String)> = result
        .decisions()
        .filter_map(|(_, decision)| decision.primary())
        .filter(|component| component.kind.is_type() && component.is_renamed())
        .map(|component| (component.original.as_str().to_lowercase(), component.new.to_string()))
        .collect();
    if entries.is_empty() {
        return Ok(0);
    }
    entries.sort();
    let path = dest.join(&result.includes_dir).join(AUTOLOAD_FILE);
    write_atomic(&path, &autoload_source(&entries))?;
    debug!(path = %path.display(), entries = entries.len(), "autoload map written");
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix_dirs() {
        assert_eq!(strip_prefix_dirs("Acme/Foo/Bar.php", "Acme"), "Foo/Bar.php");
        assert_eq!(strip_prefix_dirs("Acme/Sub/Foo.php", "Acme\\Sub"), "Foo.php");
        assert_eq!(strip_prefix_dirs("AcmeX/Foo.php", "Acme"), "AcmeX/Foo.php");
        assert_eq!(strip_prefix_dirs("Foo.php", ""), "Foo.php");
    }

    #[test]
    fn test_autoload_source() {
        let source = autoload_source(&[("foo_bar".to_string(), "Acme\\Foo\\Bar".to_string())]);
        assert!(source.starts_with("<?php\n\n\\spl_autoload_register("));
        assert!(source.contains("        'foo_bar' => 'Acme\\Foo\\Bar',\n"));
        assert!(source.contains("\\ltrim($class, '\\\\')"));
    }
}
