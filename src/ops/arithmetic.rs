//! Arithmetic operator deletion and replacement.

use super::dispatch::{DispatchTable, HandlerResult, Operator};
use super::{single, OperatorTag};
use crate::ts::{NodeKind, NodeRef};

const REPLACEMENTS: &[(&str, &[&str])] = &[
    ("+", &["-"]),
    ("-", &["+"]),
    ("*", &["/", "//", "**"]),
    ("/", &["*", "//"]),
    ("//", &["/", "*"]),
    ("%", &["*"]),
];

fn is_sign(token: NodeRef<'_>) -> bool {
    matches!(token.grammar_kind(), "+" | "-")
}

/// AOD: drop the sign of `+x` / `-x`.
pub struct ArithmeticOperatorDeletion;

impl<'t> Operator<'t> for ArithmeticOperatorDeletion {
    const TAG: OperatorTag = OperatorTag::Aod;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::UnaryOperator, Self::unary)
    }
}

impl ArithmeticOperatorDeletion {
    fn unary(&self, node: NodeRef<'_>) -> HandlerResult {
        match node.child_by_field_name("operator") {
            Some(sign) if is_sign(sign) => single(Self::TAG.mutation(sign, "")),
            _ => Ok(Vec::new()),
        }
    }
}

/// AOR: swap an arithmetic operator for each of its candidates.
pub struct ArithmeticOperatorReplacement;

impl<'t> Operator<'t> for ArithmeticOperatorReplacement {
    const TAG: OperatorTag = OperatorTag::Aor;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table
            .on(NodeKind::BinaryOperator, Self::replace)
            .on(NodeKind::UnaryOperator, Self::replace)
    }
}

impl ArithmeticOperatorReplacement {
    fn replace(&self, node: NodeRef<'_>) -> HandlerResult {
        Ok(node
            .child_by_field_name("operator")
            .map(|token| Self::TAG.replace_token(token, REPLACEMENTS))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::{mutants, run};

    #[test]
    fn deletes_unary_sign() {
        assert_eq!(mutants(OperatorTag::Aod, "y = -x\n"), vec!["y = x\n"]);
        assert_eq!(mutants(OperatorTag::Aod, "y = +x\n"), vec!["y = x\n"]);
    }

    #[test]
    fn deletion_ignores_bitwise_negation() {
        assert!(run(OperatorTag::Aod, "y = ~x\n").is_empty());
    }

    #[test]
    fn replaces_binary_operators() {
        assert_eq!(mutants(OperatorTag::Aor, "z = a + b\n"), vec!["z = a - b\n"]);
        assert_eq!(
            mutants(OperatorTag::Aor, "z = a * b\n"),
            vec!["z = a / b\n", "z = a // b\n", "z = a ** b\n"]
        );
        assert_eq!(
            mutants(OperatorTag::Aor, "z = a // b\n"),
            vec!["z = a / b\n", "z = a * b\n"]
        );
        assert_eq!(mutants(OperatorTag::Aor, "z = a % b\n"), vec!["z = a * b\n"]);
    }

    #[test]
    fn replaces_unary_sign() {
        assert_eq!(mutants(OperatorTag::Aor, "y = -x\n"), vec!["y = +x\n"]);
    }

    #[test]
    fn never_emits_identity() {
        let source = "r = a + b - c * d / e // f % g ** h\n";
        let mutations = run(OperatorTag::Aor, source);
        assert!(!mutations.is_empty());
        for mutation in &mutations {
            assert_ne!(mutation.patched(source).unwrap(), source);
        }
    }

    #[test]
    fn ignores_bitwise_binary_operators() {
        assert!(run(OperatorTag::Aor, "z = a & b | c\n").is_empty());
    }

    #[test]
    fn nested_expressions_each_mutated() {
        let mutations = run(OperatorTag::Aor, "z = (a + b) - c\n");
        let spans: Vec<_> = mutations.iter().map(|m| m.replacement()).collect();
        // outer `-` is visited before the inner `+`
        assert_eq!(spans, vec!["+", "-"]);
    }
}
