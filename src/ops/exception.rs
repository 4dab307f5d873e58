//! Exception handler mutations.
//!
//! Both operators rewrite the body block of an `except` clause as a whole.

use super::dispatch::{DispatchTable, HandlerResult, Operator};
use super::{single, OperatorTag};
use crate::ts::{NodeKind, NodeRef};

/// Body block of an `except` clause (its last block child).
fn handler_body(clause: NodeRef<'_>) -> Option<NodeRef<'_>> {
    clause
        .children()
        .rev()
        .find(|c| c.kind() == NodeKind::Block)
}

fn statements<'t>(body: NodeRef<'t>) -> impl Iterator<Item = NodeRef<'t>> {
    body.children().filter(|c| c.kind() != NodeKind::Comment)
}

/// EHD: turn a handler into a bare re-raise.
pub struct ExceptionHandlerDeletion;

impl<'t> Operator<'t> for ExceptionHandlerDeletion {
    const TAG: OperatorTag = OperatorTag::Ehd;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::ExceptClause, Self::clause)
    }
}

impl ExceptionHandlerDeletion {
    fn clause(&self, node: NodeRef<'_>) -> HandlerResult {
        let Some(body) = handler_body(node) else {
            return Ok(Vec::new());
        };
        let reraises = statements(body)
            .next()
            .is_some_and(|first| first.kind() == NodeKind::RaiseStatement);
        if reraises {
            return Ok(Vec::new());
        }
        single(Self::TAG.mutation(body, "raise"))
    }
}

/// EXS: silence a handler with `pass`.
pub struct ExceptionSwallowing;

impl<'t> Operator<'t> for ExceptionSwallowing {
    const TAG: OperatorTag = OperatorTag::Exs;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::ExceptClause, Self::clause)
    }
}

impl ExceptionSwallowing {
    fn clause(&self, node: NodeRef<'_>) -> HandlerResult {
        let Some(body) = handler_body(node) else {
            return Ok(Vec::new());
        };
        let mut body_statements = statements(body);
        let swallowed = matches!(
            (body_statements.next(), body_statements.next()),
            (Some(only), None) if only.kind() == NodeKind::PassStatement
        );
        if swallowed {
            return Ok(Vec::new());
        }
        single(Self::TAG.mutation(body, "pass"))
    }
}
