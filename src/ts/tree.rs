//! Index arena over a tree-sitter parse.
//!
//! Nodes are stored once in pre-order and addressed by [`NodeId`]. Each node
//! keeps an explicit parent index, so ancestor walks never need owning
//! back-pointers and the whole tree is immutable for a mutation pass.

use crate::span::{Point, Span};
use std::ops::Range;
use tree_sitter::Tree;

/// Index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

macro_rules! node_kinds {
    ($($variant:ident => $grammar:literal,)*) => {
        /// Grammar node kinds the mutation engine dispatches on.
        ///
        /// Everything else maps to [`NodeKind::Other`]; the raw grammar kind
        /// is still available through [`NodeRef::grammar_kind`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)*
            /// Anonymous `and` keyword of a boolean operator.
            And,
            /// Anonymous `or` keyword of a boolean operator.
            Or,
            Other,
        }

        impl NodeKind {
            pub const COUNT: usize = [$(NodeKind::$variant,)* NodeKind::And, NodeKind::Or, NodeKind::Other].len();

            /// Classify a grammar kind. Anonymous tokens only map to
            /// `And`/`Or`, so keywords never alias statement kinds.
            pub fn from_grammar(kind: &str, named: bool) -> Self {
                if !named {
                    return match kind {
                        "and" => NodeKind::And,
                        "or" => NodeKind::Or,
                        _ => NodeKind::Other,
                    };
                }
                match kind {
                    $($grammar => NodeKind::$variant,)*
                    _ => NodeKind::Other,
                }
            }

            pub(crate) fn index(self) -> usize {
                self as usize
            }
        }
    };
}

node_kinds! {
    Module => "module",
    ClassDefinition => "class_definition",
    FunctionDefinition => "function_definition",
    DecoratedDefinition => "decorated_definition",
    Decorator => "decorator",
    Block => "block",
    ExpressionStatement => "expression_statement",
    Assignment => "assignment",
    AugmentedAssignment => "augmented_assignment",
    PatternList => "pattern_list",
    ExpressionList => "expression_list",
    BinaryOperator => "binary_operator",
    UnaryOperator => "unary_operator",
    BooleanOperator => "boolean_operator",
    NotOperator => "not_operator",
    ComparisonOperator => "comparison_operator",
    IfStatement => "if_statement",
    WhileStatement => "while_statement",
    BreakStatement => "break_statement",
    ContinueStatement => "continue_statement",
    RaiseStatement => "raise_statement",
    PassStatement => "pass_statement",
    ExceptClause => "except_clause",
    Integer => "integer",
    Float => "float",
    String => "string",
    Slice => "slice",
    Call => "call",
    Attribute => "attribute",
    Identifier => "identifier",
    ArgumentList => "argument_list",
    Parameters => "parameters",
    DefaultParameter => "default_parameter",
    TypedParameter => "typed_parameter",
    TypedDefaultParameter => "typed_default_parameter",
    ListSplatPattern => "list_splat_pattern",
    DictionarySplatPattern => "dictionary_splat_pattern",
    KeywordSeparator => "keyword_separator",
    Comment => "comment",
}

impl NodeKind {
    /// Function or class definition: the boundaries of a scope.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDefinition | NodeKind::ClassDefinition
        )
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    grammar_kind: &'static str,
    field: Option<&'static str>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    start: Point,
    end: Point,
    bytes: Range<usize>,
}

/// Immutable arena of all nodes of one parse, plus the parsed source.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Flatten a tree-sitter tree into the arena, assigning ids in pre-order.
    pub fn from_tree(source: &str, tree: &Tree) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut ancestors: Vec<NodeId> = Vec::new();
        let mut cursor = tree.walk();

        loop {
            let node = cursor.node();
            let id = NodeId(nodes.len() as u32);
            let parent = ancestors.last().copied();

            nodes.push(Node {
                kind: NodeKind::from_grammar(node.kind(), node.is_named()),
                grammar_kind: node.kind(),
                field: cursor.field_name(),
                parent,
                children: Vec::new(),
                start: node.start_position().into(),
                end: node.end_position().into(),
                bytes: node.byte_range(),
            });
            if let Some(parent) = parent {
                nodes[parent.index()].children.push(id);
            }

            if cursor.goto_first_child() {
                ancestors.push(id);
                continue;
            }

            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Self {
                        source: source.to_string(),
                        nodes,
                    };
                }
                ancestors.pop();
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId::ROOT)
    }

    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Pre-order walk over `root` and all of its descendants.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![root],
            prune: None,
        }
    }

    /// Pre-order walk that yields, but does not descend into, nodes matching
    /// `prune` (the root itself is always descended into).
    pub fn descendants_pruned(
        &self,
        root: NodeId,
        prune: fn(NodeRef<'_>) -> bool,
    ) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![root],
            prune: Some((root, prune)),
        }
    }

    fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// Iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
    prune: Option<(NodeId, fn(NodeRef<'_>) -> bool)>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = NodeRef<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);

        let pruned = match self.prune {
            Some((root, prune)) => id != root && prune(node),
            None => false,
        };
        if !pruned {
            self.stack
                .extend(self.tree.get(id).children.iter().rev().copied());
        }

        Some(node)
    }
}

/// Borrowed handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> NodeKind {
        self.tree.get(self.id).kind
    }

    /// Raw grammar kind, e.g. `"+"` for an operator token.
    pub fn grammar_kind(&self) -> &'static str {
        self.tree.get(self.id).grammar_kind
    }

    /// Field name under which the parent holds this node.
    pub fn field(&self) -> Option<&'static str> {
        self.tree.get(self.id).field
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree.get(self.id).parent.map(|id| self.tree.node(id))
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'t>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'t>> + ExactSizeIterator {
        let tree = self.tree;
        tree.get(self.id).children.iter().map(move |&id| tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.tree.get(self.id).children.len()
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'t>> {
        self.tree
            .get(self.id)
            .children
            .get(index)
            .map(|&id| self.tree.node(id))
    }

    pub fn first_child(&self) -> Option<NodeRef<'t>> {
        self.child(0)
    }

    pub fn last_child(&self) -> Option<NodeRef<'t>> {
        self.children().next_back()
    }

    /// First child held under `name`.
    pub fn child_by_field_name(&self, name: &str) -> Option<NodeRef<'t>> {
        self.children().find(|c| c.field() == Some(name))
    }

    pub fn start(&self) -> Point {
        self.tree.get(self.id).start
    }

    pub fn end(&self) -> Point {
        self.tree.get(self.id).end
    }

    /// Source span, `None` for zero-width (missing) nodes.
    pub fn span(&self) -> Option<Span> {
        Span::new(self.start(), self.end()).ok()
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.tree.get(self.id).bytes.clone()
    }

    /// Exact source text of this node.
    pub fn text(&self) -> &'t str {
        &self.tree.source[self.byte_range()]
    }

    /// Name of a function or class definition.
    pub fn definition_name(&self) -> Option<&'t str> {
        if !self.kind().is_definition() {
            return None;
        }
        self.child_by_field_name("name").map(|n| n.text())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}..{}",
            self.grammar_kind(),
            self.start(),
            self.end()
        )
    }
}
