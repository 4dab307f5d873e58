use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use pymutant::config::{load_from_path, MutateConfig};
use pymutant::discovery::{guess_package_roots, walk_modules, ModuleFile, ModulePattern};
use pymutant::ops::parse_operators;
use pymutant::ts::{introduces_errors, validate_syntax};
use pymutant::{mutate_with, Language, Mutation, OperatorTag};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "pymutant.toml";

#[derive(Parser)]
#[command(name = "pymutant")]
#[command(about = "Generate mutants of Python source code for mutation testing", long_about = None)]
#[command(version)]
struct Cli {
    /// Module pattern (`pkg.*.mod`, `pkg.**`) or a path to a file or directory
    #[arg(short, long, required_unless_present = "list_ops")]
    target: Option<String>,

    /// Only report mutants whose qualified scope matches this pattern
    #[arg(short, long)]
    scope: Option<String>,

    /// Comma-separated operator mnemonics (default: the standard set)
    #[arg(short, long, value_delimiter = ',')]
    ops: Vec<String>,

    /// Path to a config file (default: ./pymutant.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Context lines around each diff hunk
    #[arg(short = 'U', long)]
    context: Option<usize>,

    /// Emit one JSON object per mutant instead of diffs
    #[arg(long)]
    json: bool,

    /// Drop mutants whose patched source no longer parses
    #[arg(long)]
    skip_invalid: bool,

    /// List the operator catalog and exit
    #[arg(long)]
    list_ops: bool,
}

/// One mutant as emitted by `--json`.
#[derive(Serialize)]
struct MutantRecord<'a> {
    index: usize,
    id: String,
    module: String,
    file: &'a Path,
    #[serde(flatten)]
    mutation: &'a Mutation,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_ops {
        return cmd_list_ops();
    }
    cmd_mutate(cli)
}

fn cmd_list_ops() -> Result<()> {
    let standard = pymutant::standard_operators(Language::Python);
    for tag in OperatorTag::ALL {
        let marker = if standard.contains(tag) {
            "*".green()
        } else {
            " ".normal()
        };
        println!("{} {}  {}", marker, tag.as_str().bold(), tag.description());
    }
    println!();
    println!("{}", "* part of the standard set".dimmed());
    Ok(())
}

/// Load the explicit config, or `./pymutant.toml` when it exists.
fn resolve_config(explicit: Option<&Path>) -> Result<MutateConfig> {
    if let Some(path) = explicit {
        return Ok(load_from_path(path)?);
    }
    let implicit = PathBuf::from(DEFAULT_CONFIG);
    if implicit.is_file() {
        return Ok(load_from_path(&implicit)?);
    }
    Ok(MutateConfig::default())
}

/// Resolve `--target` into module files.
///
/// An existing path is walked directly and every module under it is kept.
/// Anything else is treated as a module pattern over the guessed package
/// roots of the current directory.
fn collect_modules(target: &str) -> Result<Vec<ModuleFile>> {
    let path = Path::new(target);
    if path.exists() {
        return Ok(walk_modules(path)?);
    }

    let pattern = ModulePattern::parse(target)?;
    let cwd = env::current_dir().context("failed to read current directory")?;
    let mut modules = Vec::new();
    for root in guess_package_roots(&cwd)? {
        modules.extend(
            walk_modules(&root)?
                .into_iter()
                .filter(|module| pattern.matches(&module.module)),
        );
    }
    Ok(modules)
}

fn cmd_mutate(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;
    let language = config.language()?;
    let ops = if cli.ops.is_empty() {
        config.operators()?
    } else {
        parse_operators(&cli.ops)?
    };
    let context = cli.context.unwrap_or(config.mutate.context);
    let scope = cli.scope.as_deref().map(ModulePattern::parse).transpose()?;
    let excluded = config.exclude_patterns();

    let target = cli
        .target
        .as_deref()
        .context("--target is required")?;
    let modules: Vec<ModuleFile> = collect_modules(target)?
        .into_iter()
        .filter(|module| !excluded.iter().any(|p| p.matches(&module.module)))
        .collect();

    if modules.is_empty() {
        anyhow::bail!("no Python modules matched `{target}`");
    }
    tracing::debug!(modules = modules.len(), operators = ops.len(), "starting");

    let mut index = 0usize;
    for module in &modules {
        let source = match fs::read_to_string(&module.path) {
            Ok(source) => source,
            Err(error) => {
                tracing::warn!(file = %module.path.display(), %error, "skipping unreadable file");
                continue;
            }
        };
        if let Err(error) = validate_syntax(&source) {
            tracing::warn!(file = %module.path.display(), %error, "skipping module with syntax errors");
            continue;
        }
        let mutations = match mutate_with(&source, &ops, language) {
            Ok(mutations) => mutations,
            Err(error) if error.is_configuration() => return Err(error.into()),
            Err(error) => {
                tracing::warn!(file = %module.path.display(), %error, "skipping module");
                continue;
            }
        };

        for mutation in &mutations {
            let qualified = mutation.scope().qualified(&module.module);
            if scope.as_ref().is_some_and(|p| !p.matches(&qualified)) {
                continue;
            }
            let patched = match mutation.patched(&source) {
                Ok(patched) => patched,
                Err(error) => {
                    tracing::warn!(%mutation, %error, "skipping unpatchable mutant");
                    continue;
                }
            };
            if cli.skip_invalid && introduces_errors(&source, &patched)? {
                tracing::debug!(%mutation, "dropping mutant that does not parse");
                continue;
            }

            if cli.json {
                let record = MutantRecord {
                    index,
                    id: format!("{:016x}", mutation.id()),
                    module: qualified,
                    file: &module.path,
                    mutation,
                };
                println!("{}", serde_json::to_string(&record)?);
            } else {
                print_mutant(index, mutation, &qualified, &module.path, &source, context)?;
            }
            index += 1;
        }
    }

    if !cli.json {
        println!("{}", format!("{index} mutants").bold());
    }
    Ok(())
}

fn print_mutant(
    index: usize,
    mutation: &Mutation,
    module: &str,
    file: &Path,
    source: &str,
    context: usize,
) -> Result<()> {
    let label = file.display().to_string();
    let diff = mutation.unified_diff(source, &label, &label, context)?;

    println!("{}", format!("[#{index}] Mutation").bold());
    println!("- [{}] {}", mutation.operator().cyan(), module);
    println!("{}", "-".repeat(80).dimmed());
    display_diff(&diff);
    println!("{}", "-".repeat(80).dimmed());
    println!();
    Ok(())
}

/// Print a unified diff, colored by line prefix.
fn display_diff(diff: &str) {
    for line in diff.lines() {
        let styled = if line.starts_with("---") || line.starts_with("+++") {
            line.dimmed()
        } else if line.starts_with("@@") {
            line.cyan()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with('+') {
            line.green()
        } else {
            line.normal()
        };
        println!("{styled}");
    }
}
