//! Conditional, logical and relational operators.

use super::dispatch::{DispatchTable, HandlerResult, Operator};
use super::{single, OperatorTag};
use crate::ts::{NodeKind, NodeRef};

const RELATIONAL: &[(&str, &[&str])] = &[
    ("<", &[">", "<="]),
    (">", &["<", ">="]),
    ("<=", &[">=", "<"]),
    (">=", &["<=", ">"]),
    ("==", &["!="]),
    ("!=", &["=="]),
];

const BITWISE: &[(&str, &[&str])] = &[
    ("&", &["|"]),
    ("|", &["&"]),
    ("^", &["&"]),
    ("<<", &[">>"]),
    (">>", &["<<"]),
];

/// Negated comparison tokens and their positive forms.
const NEGATIONS: &[(&str, &[&str])] = &[("not in", &["in"]), ("is not", &["is"])];

const COMPARISON_TOKENS: &[&str] = &[
    "<", "<=", "==", "!=", ">=", ">", "<>", "in", "not in", "is", "is not",
];

/// Operator tokens between the operands of a comparison.
fn comparison_tokens<'t>(node: NodeRef<'t>) -> impl Iterator<Item = NodeRef<'t>> {
    node.children()
        .filter(|c| c.kind() == NodeKind::Other && COMPARISON_TOKENS.contains(&c.grammar_kind()))
}

fn is_membership(node: NodeRef<'_>) -> bool {
    node.kind() == NodeKind::ComparisonOperator
        && comparison_tokens(node).any(|t| matches!(t.grammar_kind(), "in" | "not in"))
}

/// COD: drop the negation of `not in` / `is not`.
pub struct ConditionalOperatorDeletion;

impl<'t> Operator<'t> for ConditionalOperatorDeletion {
    const TAG: OperatorTag = OperatorTag::Cod;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::ComparisonOperator, Self::comparison)
    }
}

impl ConditionalOperatorDeletion {
    fn comparison(&self, node: NodeRef<'_>) -> HandlerResult {
        Ok(comparison_tokens(node)
            .flat_map(|token| Self::TAG.replace_token(token, NEGATIONS))
            .collect())
    }
}

/// COI: negate `if`/`while` conditions and flip `in` to `not in`.
pub struct ConditionalOperatorInsertion;

impl<'t> Operator<'t> for ConditionalOperatorInsertion {
    const TAG: OperatorTag = OperatorTag::Coi;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table
            .on(NodeKind::IfStatement, Self::condition)
            .on(NodeKind::WhileStatement, Self::condition)
            .on(NodeKind::ComparisonOperator, Self::membership)
    }
}

impl ConditionalOperatorInsertion {
    fn condition(&self, node: NodeRef<'_>) -> HandlerResult {
        match node.child_by_field_name("condition") {
            // Membership tests are negated by `membership` instead.
            Some(condition) if !is_membership(condition) => {
                single(Self::TAG.mutation(condition, format!("not ({})", condition.text())))
            }
            _ => Ok(Vec::new()),
        }
    }

    fn membership(&self, node: NodeRef<'_>) -> HandlerResult {
        if node.child_count() != 3 {
            return Ok(Vec::new());
        }
        match node.child(1) {
            Some(token) if token.grammar_kind() == "in" => single(Self::TAG.mutation(token, "not in")),
            _ => Ok(Vec::new()),
        }
    }
}

/// LCR: swap `and` and `or`.
pub struct LogicalConnectorReplacement;

impl<'t> Operator<'t> for LogicalConnectorReplacement {
    const TAG: OperatorTag = OperatorTag::Lcr;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table
            .on(NodeKind::And, |_, node| single(Self::TAG.mutation(node, "or")))
            .on(NodeKind::Or, |_, node| single(Self::TAG.mutation(node, "and")))
    }
}

/// LOD: drop the `~` of a bitwise negation.
pub struct LogicalOperatorDeletion;

impl<'t> Operator<'t> for LogicalOperatorDeletion {
    const TAG: OperatorTag = OperatorTag::Lod;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::UnaryOperator, Self::unary)
    }
}

impl LogicalOperatorDeletion {
    fn unary(&self, node: NodeRef<'_>) -> HandlerResult {
        match node.child_by_field_name("operator") {
            Some(token) if token.grammar_kind() == "~" => single(Self::TAG.mutation(token, "")),
            _ => Ok(Vec::new()),
        }
    }
}

/// LOR: swap bitwise and shift operators.
pub struct LogicalOperatorReplacement;

impl<'t> Operator<'t> for LogicalOperatorReplacement {
    const TAG: OperatorTag = OperatorTag::Lor;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::BinaryOperator, Self::binary)
    }
}

impl LogicalOperatorReplacement {
    fn binary(&self, node: NodeRef<'_>) -> HandlerResult {
        Ok(node
            .child_by_field_name("operator")
            .map(|token| Self::TAG.replace_token(token, BITWISE))
            .unwrap_or_default())
    }
}

/// ROR: swap relational operators, every link of a chained comparison.
pub struct RelationalOperatorReplacement;

impl<'t> Operator<'t> for RelationalOperatorReplacement {
    const TAG: OperatorTag = OperatorTag::Ror;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::ComparisonOperator, Self::comparison)
    }
}

impl RelationalOperatorReplacement {
    fn comparison(&self, node: NodeRef<'_>) -> HandlerResult {
        Ok(comparison_tokens(node)
            .flat_map(|token| Self::TAG.replace_token(token, RELATIONAL))
            .collect())
    }
}
