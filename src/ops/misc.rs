//! Assignment, control-flow, literal, decorator and slice operators.

use super::dispatch::{DispatchTable, HandlerResult, Operator};
use super::{single, OperatorTag};
use crate::ts::{NodeKind, NodeRef};

const AUGMENTED: &[(&str, &[&str])] = &[
    ("+=", &["-="]),
    ("-=", &["+="]),
    ("*=", &["/=", "//=", "**="]),
    ("/=", &["*=", "//="]),
    ("//=", &["/=", "*="]),
    ("%=", &["*="]),
];

/// Replacement text for string literals.
pub const PLACEHOLDER: &str = "pymutant";

/// Used instead of [`PLACEHOLDER`] when the literal already spells it.
pub const ALTERNATE_PLACEHOLDER: &str = "python";

/// ASR: swap compound-assignment operators.
pub struct AssignmentOperatorReplacement;

impl<'t> Operator<'t> for AssignmentOperatorReplacement {
    const TAG: OperatorTag = OperatorTag::Asr;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::AugmentedAssignment, Self::augmented)
    }
}

impl AssignmentOperatorReplacement {
    fn augmented(&self, node: NodeRef<'_>) -> HandlerResult {
        Ok(node
            .child_by_field_name("operator")
            .map(|token| Self::TAG.replace_token(token, AUGMENTED))
            .unwrap_or_default())
    }
}

/// BCR: `break` becomes `continue` and vice versa.
pub struct BreakContinueReplacement;

impl<'t> Operator<'t> for BreakContinueReplacement {
    const TAG: OperatorTag = OperatorTag::Bcr;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table
            .on(NodeKind::BreakStatement, |_, node| {
                single(Self::TAG.mutation(node, "continue"))
            })
            .on(NodeKind::ContinueStatement, |_, node| {
                single(Self::TAG.mutation(node, "break"))
            })
    }
}

/// CRP: bump numeric literals by one and blank or replace strings.
pub struct ConstantReplacement;

impl<'t> Operator<'t> for ConstantReplacement {
    const TAG: OperatorTag = OperatorTag::Crp;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table
            .on(NodeKind::Integer, Self::integer)
            .on(NodeKind::Float, Self::float)
            .on(NodeKind::String, Self::string)
    }
}

impl ConstantReplacement {
    fn integer(&self, node: NodeRef<'_>) -> HandlerResult {
        if is_docstring(node) {
            return Ok(Vec::new());
        }
        match increment_integer(node.text()) {
            Some(bumped) => single(Self::TAG.mutation(node, bumped)),
            None => {
                tracing::trace!(literal = node.text(), "unparsable integer literal");
                Ok(Vec::new())
            }
        }
    }

    fn float(&self, node: NodeRef<'_>) -> HandlerResult {
        if is_docstring(node) {
            return Ok(Vec::new());
        }
        match increment_float(node.text()) {
            Some(bumped) => single(Self::TAG.mutation(node, bumped)),
            None => {
                tracing::trace!(literal = node.text(), "unparsable float literal");
                Ok(Vec::new())
            }
        }
    }

    fn string(&self, node: NodeRef<'_>) -> HandlerResult {
        if is_docstring(node) {
            return Ok(Vec::new());
        }
        let placeholder = if string_content(node.text()) == PLACEHOLDER {
            ALTERNATE_PLACEHOLDER
        } else {
            PLACEHOLDER
        };
        Ok([
            Self::TAG.mutation(node, ""),
            Self::TAG.mutation(node, format!("'{placeholder}'")),
        ]
        .into_iter()
        .flatten()
        .collect())
    }
}

/// Whether `literal` is the lead statement of a function body.
fn is_docstring(literal: NodeRef<'_>) -> bool {
    let Some(statement) = literal.parent() else {
        return false;
    };
    if statement.kind() != NodeKind::ExpressionStatement {
        return false;
    }
    let Some(block) = statement.parent() else {
        return false;
    };
    block.kind() == NodeKind::Block
        && block.parent().map(|p| p.kind()) == Some(NodeKind::FunctionDefinition)
        && block.children().find(|c| c.kind() != NodeKind::Comment) == Some(statement)
}

/// `value + 1` in decimal, or `None` for literals that are not plain integers
/// (imaginary, legacy long suffixes, overflow).
fn increment_integer(literal: &str) -> Option<String> {
    let digits = literal.replace('_', "");
    let lower = digits.to_ascii_lowercase();
    let value = if let Some(hex) = lower.strip_prefix("0x") {
        u128::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u128::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u128::from_str_radix(bin, 2).ok()?
    } else {
        lower.parse::<u128>().ok()?
    };
    value.checked_add(1).map(|v| v.to_string())
}

fn increment_float(literal: &str) -> Option<String> {
    let value: f64 = literal.replace('_', "").parse().ok()?;
    let bumped = value + 1.0;
    bumped.is_finite().then(|| format!("{bumped:?}"))
}

/// Literal text with any prefix (`r`, `b`, `f`, ...) and quotes removed.
fn string_content(literal: &str) -> &str {
    let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = body
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    body
}

/// DDL: delete a decorator.
pub struct DecoratorDeletion;

impl<'t> Operator<'t> for DecoratorDeletion {
    const TAG: OperatorTag = OperatorTag::Ddl;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::Decorator, |_, node| single(Self::TAG.mutation(node, "")))
    }
}

/// SIR: omit one populated bound of a slice at a time.
pub struct SliceIndexRemove;

impl<'t> Operator<'t> for SliceIndexRemove {
    const TAG: OperatorTag = OperatorTag::Sir;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::Slice, Self::slice)
    }
}

impl SliceIndexRemove {
    fn slice(&self, node: NodeRef<'_>) -> HandlerResult {
        let mut bounds = [""; 3];
        let mut position = 0;
        for child in node.children() {
            match child.grammar_kind() {
                ":" => position += 1,
                "comment" => {}
                _ if position < bounds.len() => bounds[position] = child.text(),
                _ => {}
            }
        }
        let [lower, upper, step] = bounds;

        let mut variants = Vec::with_capacity(3);
        if !lower.is_empty() {
            variants.push(if step.is_empty() {
                format!(":{upper}")
            } else {
                format!(":{upper}:{step}")
            });
        }
        if !upper.is_empty() {
            variants.push(if step.is_empty() {
                format!("{lower}:")
            } else {
                format!("{lower}::{step}")
            });
        }
        if !step.is_empty() {
            variants.push(format!("{lower}:{upper}"));
        }

        Ok(variants
            .into_iter()
            .filter_map(|text| Self::TAG.mutation(node, text))
            .collect())
    }
}
