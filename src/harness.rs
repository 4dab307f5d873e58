//! Seam between mutant generation and a test-execution harness.
//!
//! A harness that reloads modules and runs a test suite asks a
//! [`VariantSupplier`] for the source of every module it (re)loads. The
//! supplier either hands out a patched variant or declines, in which case
//! the harness loads the module from disk as usual.

use crate::discovery::ModuleFile;
use crate::mutation::{Mutation, PatchError};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("failed to read module `{module}` from {}: {source}", path.display())]
    Io {
        module: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to patch module `{module}`: {source}")]
    Patch {
        module: String,
        #[source]
        source: PatchError,
    },
}

/// Supplies replacement source text for modules by dotted name.
pub trait VariantSupplier {
    /// Patched source for `module`, or `None` to load the original.
    fn source_for(&self, module: &str) -> Result<Option<String>, HarnessError>;

    /// Loaded modules a harness must evict before running against this
    /// supplier, so that stale originals are not reused.
    fn evictions<'a>(&self, loaded: &'a [String]) -> Vec<&'a str>;
}

/// Serves one mutation applied to every known module under a prefix.
#[derive(Debug, Clone)]
pub struct MutantSupplier {
    prefix: String,
    mutation: Mutation,
    origins: HashMap<String, PathBuf>,
}

impl MutantSupplier {
    pub fn new(prefix: impl Into<String>, mutation: Mutation) -> Self {
        Self {
            prefix: prefix.into(),
            mutation,
            origins: HashMap::new(),
        }
    }

    /// Register the file a module is loaded from.
    pub fn with_module(mut self, module: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.origins.insert(module.into(), path.into());
        self
    }

    /// Register discovered modules in bulk.
    pub fn with_modules<'a>(mut self, modules: impl IntoIterator<Item = &'a ModuleFile>) -> Self {
        for module in modules {
            self.origins
                .insert(module.module.clone(), module.path.clone());
        }
        self
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Whether `module` is the prefix module or lies inside it.
    ///
    /// Matching is segment-aware: prefix `pkg` covers `pkg.mod` but not
    /// `pkgutil`. An empty prefix covers nothing.
    pub fn covers(&self, module: &str) -> bool {
        if self.prefix.is_empty() {
            return false;
        }
        module == self.prefix
            || module
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl VariantSupplier for MutantSupplier {
    fn source_for(&self, module: &str) -> Result<Option<String>, HarnessError> {
        if !self.covers(module) {
            return Ok(None);
        }
        let Some(path) = self.origins.get(module) else {
            tracing::trace!(module, "no origin registered, loading original");
            return Ok(None);
        };

        let source = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            module: module.to_string(),
            path: path.clone(),
            source,
        })?;
        let patched = self
            .mutation
            .patched(&source)
            .map_err(|source| HarnessError::Patch {
                module: module.to_string(),
                source,
            })?;
        tracing::debug!(module, mutation = %self.mutation, "serving mutant");
        Ok(Some(patched))
    }

    fn evictions<'a>(&self, loaded: &'a [String]) -> Vec<&'a str> {
        loaded
            .iter()
            .map(String::as_str)
            .filter(|module| self.covers(module))
            .collect()
    }
}
