//! Single-pass node dispatch.
//!
//! One pre-order traversal drives every composed visitor. Built-in operators
//! map node kinds to handlers through a [`DispatchTable`] built once when the
//! operator is bound to a tree; kinds without an entry are a no-op. Callable
//! visitors see every node. Each visitor appends to its own result list, and
//! declining a node never prunes its subtree.

use crate::error::MutateError;
use crate::mutation::Mutation;
use crate::ops::OperatorTag;
use crate::ts::{NodeId, NodeKind, NodeRef, SyntaxTree};

/// Mutations produced for a single node: none, one, or alternatives.
pub type HandlerResult = Result<Vec<Mutation>, MutateError>;

/// Handler of a built-in operator for one node kind.
pub type Handler<'t, O> = fn(&O, NodeRef<'t>) -> HandlerResult;

/// Anything that can be visited at every node of a tree.
pub trait NodeVisitor<'t> {
    /// Mnemonic used in logs.
    fn name(&self) -> &'static str;

    fn visit(&mut self, node: NodeRef<'t>) -> HandlerResult;
}

/// Node kind → handler lookup for one operator.
pub struct DispatchTable<'t, O> {
    handlers: [Option<Handler<'t, O>>; NodeKind::COUNT],
}

impl<'t, O> DispatchTable<'t, O> {
    pub fn new() -> Self {
        Self {
            handlers: [None; NodeKind::COUNT],
        }
    }

    /// Register `handler` for `kind`, replacing any earlier entry.
    pub fn on(mut self, kind: NodeKind, handler: Handler<'t, O>) -> Self {
        self.handlers[kind.index()] = Some(handler);
        self
    }

    pub fn get(&self, kind: NodeKind) -> Option<Handler<'t, O>> {
        self.handlers[kind.index()]
    }
}

impl<O> Default for DispatchTable<'_, O> {
    fn default() -> Self {
        Self::new()
    }
}

/// A built-in mutation operator bound to one tree.
pub trait Operator<'t>: Sized + 't {
    const TAG: OperatorTag;

    /// Register this operator's handlers.
    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self>;

    /// Wrap into a visitor with its dispatch table.
    fn into_visitor(self) -> Box<dyn NodeVisitor<'t> + 't> {
        Box::new(Dispatched {
            table: Self::handlers(DispatchTable::new()),
            operator: self,
        })
    }
}

struct Dispatched<'t, O> {
    operator: O,
    table: DispatchTable<'t, O>,
}

impl<'t, O: Operator<'t>> NodeVisitor<'t> for Dispatched<'t, O> {
    fn name(&self) -> &'static str {
        O::TAG.as_str()
    }

    fn visit(&mut self, node: NodeRef<'t>) -> HandlerResult {
        match self.table.get(node.kind()) {
            Some(handler) => handler(&self.operator, node),
            None => Ok(Vec::new()),
        }
    }
}

/// Visitor wrapping a closure that is invoked at every node.
pub struct CallableOperator<F> {
    name: &'static str,
    callable: F,
}

impl<F> CallableOperator<F> {
    pub fn new(name: &'static str, callable: F) -> Self {
        Self { name, callable }
    }
}

impl<'t, F> NodeVisitor<'t> for CallableOperator<F>
where
    F: FnMut(NodeRef<'t>) -> HandlerResult,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn visit(&mut self, node: NodeRef<'t>) -> HandlerResult {
        (self.callable)(node)
    }
}

/// Ordered visitors sharing one traversal.
#[derive(Default)]
pub struct VisitorComposition<'t> {
    visitors: Vec<Box<dyn NodeVisitor<'t> + 't>>,
}

impl<'t> VisitorComposition<'t> {
    pub fn new() -> Self {
        Self {
            visitors: Vec::new(),
        }
    }

    pub fn push(&mut self, visitor: Box<dyn NodeVisitor<'t> + 't>) {
        self.visitors.push(visitor);
    }

    pub fn with(mut self, visitor: Box<dyn NodeVisitor<'t> + 't>) -> Self {
        self.push(visitor);
        self
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Walk `tree` once and collect every visitor's mutations.
    ///
    /// Results keep visitor order, then traversal order within a visitor.
    /// The first handler error aborts the pass and discards all results.
    pub fn run(mut self, tree: &'t SyntaxTree) -> Result<Vec<Mutation>, MutateError> {
        let mut results: Vec<Vec<Mutation>> = vec![Vec::new(); self.visitors.len()];

        for node in tree.descendants(NodeId::ROOT) {
            for (visitor, out) in self.visitors.iter_mut().zip(results.iter_mut()) {
                out.extend(visitor.visit(node)?);
            }
        }

        for (visitor, out) in self.visitors.iter().zip(&results) {
            tracing::debug!(operator = visitor.name(), mutations = out.len(), "operator finished");
        }
        Ok(results.into_iter().flatten().collect())
    }
}
