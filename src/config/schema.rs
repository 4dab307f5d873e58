use crate::discovery::ModulePattern;
use crate::diff::DEFAULT_CONTEXT;
use crate::error::MutateError;
use crate::ops::{standard_operators, OperatorTag};
use crate::ts::Language;
use serde::Deserialize;
use std::fmt;

/// Contents of a `pymutant.toml` file.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct MutateConfig {
    #[serde(default)]
    pub mutate: MutateSettings,
}

/// The `[mutate]` table.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct MutateSettings {
    /// Source language tag.
    pub language: String,
    /// Operator mnemonics; the language's standard set when absent.
    pub operators: Option<Vec<String>>,
    /// Context lines around each diff hunk.
    pub context: usize,
    /// Module patterns skipped during discovery.
    pub exclude: Vec<String>,
}

impl Default for MutateSettings {
    fn default() -> Self {
        Self {
            language: Language::Python.tag().to_string(),
            operators: None,
            context: DEFAULT_CONTEXT,
            exclude: Vec::new(),
        }
    }
}

impl MutateConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let settings = &self.mutate;

        if Language::from_tag(&settings.language).is_none() {
            issues.push(ValidationIssue::UnsupportedLanguage {
                tag: settings.language.clone(),
            });
        }

        match &settings.operators {
            Some(operators) if operators.is_empty() => {
                issues.push(ValidationIssue::EmptyOperatorList);
            }
            Some(operators) => {
                for name in operators {
                    if let Err(error) = name.parse::<OperatorTag>() {
                        issues.push(ValidationIssue::UnknownOperator {
                            message: error.to_string(),
                        });
                    }
                }
            }
            None => {}
        }

        if settings.context == 0 {
            issues.push(ValidationIssue::ZeroContext);
        }

        for pattern in &settings.exclude {
            if let Err(error) = ModulePattern::parse(pattern) {
                issues.push(ValidationIssue::InvalidPattern {
                    message: error.to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn language(&self) -> Result<Language, MutateError> {
        Language::from_tag(&self.mutate.language).ok_or_else(|| MutateError::UnsupportedLanguage {
            tag: self.mutate.language.clone(),
        })
    }

    /// Configured operators, or the standard set for the configured language.
    pub fn operators(&self) -> Result<Vec<OperatorTag>, MutateError> {
        match &self.mutate.operators {
            Some(names) => names.iter().map(|name| name.parse()).collect(),
            None => Ok(standard_operators(self.language()?)),
        }
    }

    pub fn exclude_patterns(&self) -> Vec<ModulePattern> {
        self.mutate
            .exclude
            .iter()
            .filter_map(|pattern| ModulePattern::parse(pattern).ok())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    UnsupportedLanguage { tag: String },
    EmptyOperatorList,
    UnknownOperator { message: String },
    ZeroContext,
    InvalidPattern { message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::UnsupportedLanguage { tag } => {
                write!(f, "language '{tag}' is not supported")
            }
            ValidationIssue::EmptyOperatorList => {
                write!(f, "operator list is empty (omit it to use the standard set)")
            }
            ValidationIssue::UnknownOperator { message } => write!(f, "{message}"),
            ValidationIssue::ZeroContext => write!(f, "diff context must be at least one line"),
            ValidationIssue::InvalidPattern { message } => write!(f, "{message}"),
        }
    }
}
