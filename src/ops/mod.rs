//! Mutation operator catalog.
//!
//! Each operator is a small rule set mapping node shapes to replacement
//! texts. Operators are identified by a three-letter mnemonic and bound to a
//! single tree for one pass; see [`dispatch`] for how they are driven.

pub mod arithmetic;
pub mod dispatch;
pub mod exception;
pub mod inheritance;
pub mod logical;
pub mod misc;

use crate::error::MutateError;
use crate::mutation::Mutation;
use crate::ts::{Language, NodeRef, SyntaxTree};
use dispatch::{HandlerResult, NodeVisitor, Operator};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! operator_tags {
    ($($variant:ident => $mnemonic:literal, $description:literal;)*) => {
        /// Mnemonic of a built-in mutation operator.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum OperatorTag {
            $($variant,)*
        }

        impl OperatorTag {
            /// Every built-in operator, sorted by mnemonic.
            pub const ALL: &'static [OperatorTag] = &[$(OperatorTag::$variant,)*];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(OperatorTag::$variant => $mnemonic,)*
                }
            }

            /// One-line human description for `--list-ops`.
            pub const fn description(self) -> &'static str {
                match self {
                    $(OperatorTag::$variant => $description,)*
                }
            }

            /// Case-insensitive mnemonic lookup.
            pub fn from_mnemonic(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($mnemonic) {
                        return Some(OperatorTag::$variant);
                    }
                )*
                None
            }
        }
    };
}

operator_tags! {
    Aod => "AOD", "arithmetic operator deletion";
    Aor => "AOR", "arithmetic operator replacement";
    Asr => "ASR", "assignment operator replacement";
    Bcr => "BCR", "break/continue replacement";
    Cod => "COD", "conditional operator deletion";
    Coi => "COI", "conditional operator insertion";
    Crp => "CRP", "constant replacement";
    Ddl => "DDL", "decorator deletion";
    Ehd => "EHD", "exception handler deletion";
    Exs => "EXS", "exception swallowing";
    Ihd => "IHD", "hiding variable deletion";
    Iod => "IOD", "overriding method deletion";
    Iop => "IOP", "overridden method calling position change";
    Lcr => "LCR", "logical connector replacement";
    Lod => "LOD", "logical operator deletion";
    Lor => "LOR", "logical operator replacement";
    Ror => "ROR", "relational operator replacement";
    Scd => "SCD", "super calling deletion";
    Sci => "SCI", "super calling insertion";
    Sir => "SIR", "slice index remove";
}

impl OperatorTag {
    /// Mutation replacing `node` with `replacement`, tagged with `self`.
    pub fn mutation(self, node: NodeRef<'_>, replacement: impl Into<String>) -> Option<Mutation> {
        Mutation::at_node(node, replacement, self.as_str())
    }

    /// One mutation per candidate replacement of the operator token `token`.
    ///
    /// `table` maps an operator spelling to its replacements; tokens that are
    /// not listed produce nothing.
    pub fn replace_token(self, token: NodeRef<'_>, table: &[(&str, &[&str])]) -> Vec<Mutation> {
        let spelling = token.grammar_kind();
        table
            .iter()
            .filter(|(from, _)| *from == spelling)
            .flat_map(|(_, candidates)| candidates.iter())
            .filter_map(|candidate| self.mutation(token, *candidate))
            .collect()
    }

    /// Bind this operator to `tree`.
    pub fn bind<'t>(self, tree: &'t SyntaxTree) -> Box<dyn NodeVisitor<'t> + 't> {
        use OperatorTag::*;
        match self {
            Aod => arithmetic::ArithmeticOperatorDeletion.into_visitor(),
            Aor => arithmetic::ArithmeticOperatorReplacement.into_visitor(),
            Asr => misc::AssignmentOperatorReplacement.into_visitor(),
            Bcr => misc::BreakContinueReplacement.into_visitor(),
            Cod => logical::ConditionalOperatorDeletion.into_visitor(),
            Coi => logical::ConditionalOperatorInsertion.into_visitor(),
            Crp => misc::ConstantReplacement.into_visitor(),
            Ddl => misc::DecoratorDeletion.into_visitor(),
            Ehd => exception::ExceptionHandlerDeletion.into_visitor(),
            Exs => exception::ExceptionSwallowing.into_visitor(),
            Ihd => inheritance::HidingVariableDeletion::new(tree).into_visitor(),
            Iod => inheritance::OverridingMethodDeletion::new(tree).into_visitor(),
            Iop => inheritance::CallPositionChange.into_visitor(),
            Lcr => logical::LogicalConnectorReplacement.into_visitor(),
            Lod => logical::LogicalOperatorDeletion.into_visitor(),
            Lor => logical::LogicalOperatorReplacement.into_visitor(),
            Ror => logical::RelationalOperatorReplacement.into_visitor(),
            Scd => inheritance::SuperCallDeletion.into_visitor(),
            Sci => inheritance::SuperCallInsertion::new(tree).into_visitor(),
            Sir => misc::SliceIndexRemove.into_visitor(),
        }
    }
}

impl fmt::Display for OperatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorTag {
    type Err = MutateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        OperatorTag::from_mnemonic(name).ok_or_else(|| MutateError::UnknownOperator {
            name: name.to_string(),
            suggestion: suggest(name),
        })
    }
}

/// Closest known mnemonic, if any is reasonably close.
fn suggest(name: &str) -> Option<&'static str> {
    let upper = name.to_ascii_uppercase();
    OperatorTag::ALL
        .iter()
        .map(|tag| (tag.as_str(), strsim::levenshtein(&upper, tag.as_str())))
        .filter(|(_, distance)| *distance <= 1)
        .min_by_key(|(_, distance)| *distance)
        .map(|(mnemonic, _)| mnemonic)
}

/// Parse a list of mnemonics, failing on the first unknown one.
pub fn parse_operators<S: AsRef<str>>(names: &[S]) -> Result<Vec<OperatorTag>, MutateError> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

/// Default operator set applied when none is requested explicitly.
///
/// The exception and inheritance families are opt-in.
pub fn standard_operators(language: Language) -> Vec<OperatorTag> {
    use OperatorTag::*;
    match language {
        Language::Python => vec![Aod, Aor, Asr, Bcr, Cod, Coi, Crp, Ddl, Lcr, Lod, Lor, Ror, Sir],
    }
}

/// Wrap a single optional mutation into a handler result.
pub(crate) fn single(mutation: Option<Mutation>) -> HandlerResult {
    Ok(mutation.into_iter().collect())
}
