//! psr4-migrate CLI
//!
//! Plan a PSR-4 migration of a legacy PHP tree, inspect the plan, convert
//! into a destination, rename references elsewhere, and clear the sources.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use psr4::base::constants::{DEFAULT_INCLUDES_DIR, DEFAULT_SIGNING_KEY};
use psr4::planner::IgnoreRule;
use psr4::project::{IdentityIndex, resolve_plan_path};
use psr4::report::{names_changed, render_plan, render_table, review_rows};
use psr4::{ConvertOptions, PlannerConfig, WalkOptions};

/// Environment variable holding the plan signing key
const KEY_VAR: &str = "PSR4_MIGRATE_KEY";

#[derive(Parser)]
#[command(name = "psr4-migrate")]
#[command(about = "Migrate legacy PHP code to PSR-4 namespaces", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the migration of a source tree
    Plan {
        /// Namespace prefix for every migrated name
        prefix: String,

        /// Source root
        src: PathBuf,

        /// Directory for shared include files, relative to the destination
        #[arg(long, default_value = DEFAULT_INCLUDES_DIR)]
        includes_dir: PathBuf,

        /// Plan file (defaults to the source root)
        #[arg(long)]
        map_file: Option<PathBuf>,

        /// Prepend the prefix even to namespaces that already start with it
        #[arg(long)]
        append_namespace: bool,

        /// Turn `Foo_Bar` into `Foo\Bar`
        #[arg(long)]
        underscore_conversion: bool,

        /// Do not split underscores of names that already live in a namespace
        #[arg(long)]
        ignore_namespaced_underscore: bool,

        /// Namespace to keep as is; `*` for every namespace, `?` for the global one
        #[arg(long = "ignore-namespace")]
        ignore_namespaces: Vec<String>,

        /// Path, relative to the source root, left out of the walk
        #[arg(long = "ignore-path")]
        ignore_paths: Vec<PathBuf>,

        #[arg(long)]
        follow_symlinks: bool,

        #[arg(long)]
        ignore_dot_files: bool,

        /// Save the plan even when some files could not be planned
        #[arg(long)]
        allow_errors: bool,

        /// Print the plan without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the planned layout into a destination directory
    Convert {
        plan_file: PathBuf,

        dest: PathBuf,

        /// Convert even when the plan holds risky decisions
        #[arg(long)]
        allow_risky: bool,

        /// Keep old class names working through class_alias and an autoloader
        #[arg(long)]
        create_aliases: bool,

        /// Leave the prefix directories out of class file paths
        #[arg(long)]
        strip_prefix_path: bool,
    },

    /// Point references in other directories at the new names
    Rename {
        plan_file: PathBuf,

        /// Directories to rewrite in place
        #[arg(required = true)]
        dest_dirs: Vec<PathBuf>,

        /// Further plans whose renames apply as well
        #[arg(long = "with-plan")]
        with_plans: Vec<PathBuf>,
    },

    /// Show the decisions and errors of a plan
    Inspect {
        plan_file: PathBuf,

        /// Print old → new names as JSON instead
        #[arg(long)]
        names_changed: bool,
    },

    /// Remove source files whose declarations were migrated
    Clear {
        plan_file: PathBuf,

        /// List the files without removing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn signing_key() -> Vec<u8> {
    std::env::var(KEY_VAR)
        .map(String::into_bytes)
        .unwrap_or_else(|_| DEFAULT_SIGNING_KEY.to_vec())
}

fn load(plan_file: &Path) -> Result<psr4::ProjectResult> {
    let path = resolve_plan_path(plan_file);
    psr4::load_plan(&path, &signing_key()).with_context(|| format!("cannot load plan {}", path.display()))
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            prefix,
            src,
            includes_dir,
            map_file,
            append_namespace,
            underscore_conversion,
            ignore_namespaced_underscore,
            ignore_namespaces,
            ignore_paths,
            follow_symlinks,
            ignore_dot_files,
            allow_errors,
            dry_run,
        } => {
            let config = PlannerConfig {
                append_namespace,
                underscore_conversion,
                ignore_namespaced_underscore,
                ignore_namespaces: ignore_namespaces
                    .iter()
                    .map(|ns| ns.parse::<IgnoreRule>())
                    .collect::<Result<_, _>>()
                    .map_err(psr4::Error::from)?,
                includes_dir,
                ..PlannerConfig::new(prefix)
            };
            let walk = WalkOptions {
                follow_symlinks,
                ignore_dot_files,
                ignore_paths,
            };
            let result = psr4::plan_project(&src, &config, &walk)
                .map_err(psr4::Error::from)
                .with_context(|| format!("cannot plan {}", src.display()))?;
            print!("{}", render_plan(&result));

            if result.has_errors() && !allow_errors {
                eprintln!(
                    "{} error(s) found, plan not saved (use --allow-errors to save anyway)",
                    result.error_count()
                );
                return Ok(ExitCode::FAILURE);
            }
            if !dry_run {
                let target = map_file.unwrap_or_else(|| src.clone());
                let written = psr4::save_plan(&result, &target, &signing_key()).map_err(psr4::Error::from)?;
                println!("Plan saved to {}", written.display());
            }
        }
        Commands::Convert {
            plan_file,
            dest,
            allow_risky,
            create_aliases,
            strip_prefix_path,
        } => {
            let result = load(&plan_file)?;
            let options = ConvertOptions {
                allow_risky,
                create_aliases,
                strip_prefix_path,
            };
            let report = psr4::convert(&result, &dest, &options)
                .map_err(psr4::Error::from)
                .with_context(|| format!("cannot convert into {}", dest.display()))?;
            println!("{} file(s) written to {}", report.written.len(), dest.display());
            if report.aliases > 0 {
                println!("{} old name(s) kept loadable through aliases", report.aliases);
            }
            if !report.review.is_empty() {
                println!("Review these string literals");
                print!("{}", render_table(&review_rows(&report.review)));
            }
        }
        Commands::Rename {
            plan_file,
            dest_dirs,
            with_plans,
        } => {
            let mut index: IdentityIndex = load(&plan_file)?.index().clone();
            for extra in &with_plans {
                index.merge(load(extra)?.index());
            }
            let report = psr4::rename(&index, &dest_dirs, &WalkOptions::default()).map_err(psr4::Error::from)?;
            println!(
                "{} reference(s) renamed in {} file(s)",
                report.substituted,
                report.rewritten.len()
            );
            if !report.review.is_empty() {
                println!("Review these string literals");
                print!("{}", render_table(&review_rows(&report.review)));
            }
        }
        Commands::Inspect {
            plan_file,
            names_changed: as_json,
        } => {
            let result = load(&plan_file)?;
            if as_json {
                println!("{}", names_changed(&result));
            } else {
                print!("{}", render_plan(&result));
            }
        }
        Commands::Clear { plan_file, dry_run } => {
            let result = load(&plan_file)?;
            let removed = psr4::clear(&result, dry_run).map_err(psr4::Error::from)?;
            for path in &removed {
                println!("{}", path.display());
            }
            let verb = if dry_run { "would be removed" } else { "removed" };
            println!("{} file(s) {verb}", removed.len());
        }
    }

    Ok(ExitCode::SUCCESS)
}
