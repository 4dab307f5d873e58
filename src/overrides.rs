//! Static override detection within a single compilation unit.
//!
//! A name at a site "overrides" when the enclosing class lists a base class
//! that is defined in the same unit and that base directly declares the same
//! name, either as an assignment target or as a method. Resolution is one
//! level deep: bases of bases are not consulted, and bases defined elsewhere
//! are never resolved.

use crate::ts::{NodeId, NodeKind, NodeRef, SyntaxTree};
use std::collections::HashMap;

/// Override analyzer bound to one tree.
///
/// Class definitions are indexed by name once at construction.
pub struct OverrideAnalyzer<'t> {
    classes: HashMap<&'t str, Vec<NodeRef<'t>>>,
}

impl<'t> OverrideAnalyzer<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        let mut classes: HashMap<&'t str, Vec<NodeRef<'t>>> = HashMap::new();
        for node in tree.descendants(NodeId::ROOT) {
            if node.kind() != NodeKind::ClassDefinition {
                continue;
            }
            if let Some(name) = node.definition_name() {
                classes.entry(name).or_default().push(node);
            }
        }
        Self { classes }
    }

    /// Whether the identifier at `site` overrides a base member of the same name.
    pub fn is_overridden(&self, site: NodeRef<'t>) -> bool {
        self.overrides(site, site.text())
    }

    /// Whether `name`, declared at `site`, overrides a base member.
    pub fn overrides(&self, site: NodeRef<'t>, name: &str) -> bool {
        let Some(class) = enclosing_class(site) else {
            return false;
        };

        let overridden = base_names(class)
            .filter_map(|base| self.classes.get(base))
            .flatten()
            .any(|base| declares_member(*base, name));

        tracing::trace!(
            member = name,
            class = class.definition_name().unwrap_or_default(),
            overridden,
            "override lookup"
        );
        overridden
    }
}

/// Class whose body directly contains `site`.
///
/// Walking up from the site, reaching a function or class definition other
/// than the enclosing class means the site is nested and has no direct
/// class. Decorated definitions are transparent.
pub fn enclosing_class(site: NodeRef<'_>) -> Option<NodeRef<'_>> {
    for ancestor in site.ancestors() {
        match ancestor.kind() {
            NodeKind::ClassDefinition => return Some(ancestor),
            NodeKind::FunctionDefinition => return None,
            _ => {}
        }
    }
    None
}

/// Identifiers listed as base classes of `class`.
pub fn base_names<'t>(class: NodeRef<'t>) -> impl Iterator<Item = &'t str> {
    let superclasses = class.child_by_field_name("superclasses");
    let direct = superclasses
        .filter(|s| s.kind() == NodeKind::Identifier)
        .map(|s| s.text());
    let listed = superclasses
        .filter(|s| s.kind() == NodeKind::ArgumentList)
        .into_iter()
        .flat_map(|list| list.children())
        .filter(|n| n.kind() == NodeKind::Identifier)
        .map(|n| n.text());
    direct.into_iter().chain(listed)
}

/// Whether `class` declares `name` at its own level.
fn declares_member(class: NodeRef<'_>, name: &str) -> bool {
    class
        .tree()
        .descendants_pruned(class.id(), |n| n.kind().is_definition())
        .any(|n| declares(n, name))
}

fn declares(node: NodeRef<'_>, name: &str) -> bool {
    match node.kind() {
        NodeKind::Assignment => node
            .child_by_field_name("left")
            .is_some_and(|target| assignment_targets(target).any(|t| t.text() == name)),
        NodeKind::FunctionDefinition => node.definition_name() == Some(name),
        _ => false,
    }
}

/// Identifiers bound by an assignment target (`x` or `x, y`).
pub fn assignment_targets<'t>(target: NodeRef<'t>) -> impl Iterator<Item = NodeRef<'t>> {
    let single = (target.kind() == NodeKind::Identifier).then_some(target);
    let multi = is_target_list(target)
        .then_some(target)
        .into_iter()
        .flat_map(|list| list.children())
        .filter(|n| n.kind() == NodeKind::Identifier);
    single.into_iter().chain(multi)
}

pub(crate) fn is_target_list(node: NodeRef<'_>) -> bool {
    node.kind() == NodeKind::PatternList || node.grammar_kind() == "tuple_pattern"
}
