//! Python module discovery and dotted-name patterns.
//!
//! Files are found by walking package roots for `*.py`. A module's dotted
//! name is its path relative to the root, with `__init__.py` naming the
//! package directory itself; roots that are packages themselves contribute
//! their own directory name as the first segment.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("could not find package roots in {}", .0.display())]
    NoPackageRoots(PathBuf),

    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("invalid module pattern `{pattern}`: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
}

/// A Python source file and the dotted module name it is imported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    pub module: String,
    pub path: PathBuf,
}

/// Candidate package roots for a project checked out at `dir`.
///
/// Looks for `lib/`, `src/`, a directory named like the project (also with
/// `-`/`_` swapped) and a single-file module `<project>.py`.
pub fn guess_package_roots(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let project = dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();

    let mut candidates = vec![dir.join("lib"), dir.join("src")];
    if !project.is_empty() {
        candidates.push(dir.join(project));
        candidates.push(dir.join(project.replace('-', "_")));
        candidates.push(dir.join(project.replace('_', "-")));
    }

    let mut roots: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        if candidate.is_dir() && !roots.contains(&candidate) {
            roots.push(candidate);
        }
    }
    let single_file = dir.join(format!("{project}.py"));
    if !project.is_empty() && single_file.is_file() {
        roots.push(single_file);
    }

    if roots.is_empty() {
        return Err(DiscoveryError::NoPackageRoots(dir.to_path_buf()));
    }
    tracing::debug!(roots = ?roots, "guessed package roots");
    Ok(roots)
}

/// Every Python module under `root`, sorted by path.
///
/// `root` may also be a single `.py` file. Hidden directories and
/// `__pycache__` are skipped.
pub fn walk_modules(root: &Path) -> Result<Vec<ModuleFile>, DiscoveryError> {
    if root.is_file() {
        return Ok(module_name(root, root)
            .map(|module| ModuleFile {
                module,
                path: root.to_path_buf(),
            })
            .into_iter()
            .collect());
    }

    let mut modules = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_ignored_dir(entry));
    for entry in walker {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file()
            || entry.path().extension().and_then(|ext| ext.to_str()) != Some("py")
        {
            continue;
        }
        if let Some(module) = module_name(root, entry.path()) {
            modules.push(ModuleFile {
                module,
                path: entry.path().to_path_buf(),
            });
        }
    }
    Ok(modules)
}

fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name == "__pycache__")
}

/// Dotted module name of `file` found under `root`.
pub fn module_name(root: &Path, file: &Path) -> Option<String> {
    if root == file {
        return file.file_stem()?.to_str().map(str::to_string);
    }

    let relative = file.strip_prefix(root).ok()?;
    let mut segments: Vec<&str> = Vec::new();
    if root.join("__init__.py").is_file() {
        segments.push(root.file_name()?.to_str()?);
    }
    for component in relative.iter() {
        segments.push(component.to_str()?);
    }

    let last = segments.pop()?;
    let stem = last.strip_suffix(".py").unwrap_or(last);
    if stem != "__init__" {
        segments.push(stem);
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("."))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`: exactly one segment.
    Any,
    /// `**`: one or more segments.
    AnyMany,
}

/// Dotted module pattern such as `pkg.*.models` or `pkg.**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePattern {
    source: String,
    segments: Vec<Segment>,
}

impl ModulePattern {
    pub fn parse(pattern: &str) -> Result<Self, DiscoveryError> {
        let invalid = |reason: &'static str| DiscoveryError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        let segments = trimmed
            .split('.')
            .map(|segment| match segment {
                "" => Err(invalid("empty segment")),
                "*" => Ok(Segment::Any),
                "**" => Ok(Segment::AnyMany),
                literal if literal.contains('*') => {
                    Err(invalid("wildcards must span a whole segment"))
                }
                literal => Ok(Segment::Literal(literal.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: trimmed.to_string(),
            segments,
        })
    }

    /// Whether the dotted name `module` matches the whole pattern.
    pub fn matches(&self, module: &str) -> bool {
        let names: Vec<&str> = module.split('.').collect();
        let mut pending = vec![(0usize, 0usize)];
        let mut seen = std::collections::HashSet::new();

        while let Some((pi, mi)) = pending.pop() {
            if !seen.insert((pi, mi)) {
                continue;
            }
            if pi == self.segments.len() && mi == names.len() {
                return true;
            }
            if pi >= self.segments.len() || mi >= names.len() {
                continue;
            }
            match &self.segments[pi] {
                Segment::Literal(literal) if literal == names[mi] => pending.push((pi + 1, mi + 1)),
                Segment::Literal(_) => {}
                Segment::Any => pending.push((pi + 1, mi + 1)),
                Segment::AnyMany => {
                    pending.push((pi + 1, mi + 1));
                    pending.push((pi, mi + 1));
                }
            }
        }
        false
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for ModulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for ModulePattern {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
