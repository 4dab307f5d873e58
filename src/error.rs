use crate::mutation::PatchError;
use crate::span::Point;
use crate::ts::TreeSitterError;
use thiserror::Error;

/// Errors that abort a mutation run.
///
/// Operators that merely find a node of the wrong shape abstain silently;
/// only configuration problems and operators that cannot handle a site they
/// recognized end up here.
#[derive(Error, Debug)]
pub enum MutateError {
    #[error("unknown mutation operator `{name}`{}", did_you_mean(.suggestion))]
    UnknownOperator {
        name: String,
        suggestion: Option<&'static str>,
    },

    #[error("language `{tag}` is not supported for mutation")]
    UnsupportedLanguage { tag: String },

    #[error("operator {operator} recognized a site at {at} but cannot mutate it")]
    Unimplemented { operator: &'static str, at: Point },

    #[error("tree-sitter error: {0}")]
    TreeSitter(#[from] TreeSitterError),

    #[error("patch error: {0}")]
    Patch(#[from] PatchError),
}

impl MutateError {
    /// Configuration errors are raised before any traversal starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MutateError::UnknownOperator { .. } | MutateError::UnsupportedLanguage { .. }
        )
    }
}

fn did_you_mean(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{name}`?)"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operator_message() {
        let err = MutateError::UnknownOperator {
            name: "AOX".to_string(),
            suggestion: Some("AOR"),
        };
        assert_eq!(
            err.to_string(),
            "unknown mutation operator `AOX` (did you mean `AOR`?)"
        );
        assert!(err.is_configuration());

        let err = MutateError::UnknownOperator {
            name: "NOPE".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown mutation operator `NOPE`");
    }

    #[test]
    fn unimplemented_is_not_configuration() {
        let err = MutateError::Unimplemented {
            operator: "XYZ",
            at: Point::new(3, 4),
        };
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("3:4"));
    }
}
