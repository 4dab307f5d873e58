//! Enclosing-scope resolution for mutation sites.

use crate::ts::NodeRef;
use serde::{Serialize, Serializer};
use std::fmt;

/// Outer-to-inner names of the functions and classes enclosing a site.
///
/// Displays dot-joined (`Outer.method`); empty at module top level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopePath(Vec<String>);

impl ScopePath {
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefix with a dotted module name, e.g. `pkg.mod` + `C.f`.
    pub fn qualified(&self, module: &str) -> String {
        if self.is_empty() {
            module.to_string()
        } else if module.is_empty() {
            self.to_string()
        } else {
            format!("{module}.{self}")
        }
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl Serialize for ScopePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Scope of `node`: every function/class definition from the node itself up
/// to the root, ordered outer to inner.
pub fn scope_path(node: NodeRef<'_>) -> ScopePath {
    let mut names: Vec<String> = std::iter::once(node)
        .chain(node.ancestors())
        .filter_map(|n| n.definition_name())
        .map(str::to_string)
        .collect();
    names.reverse();
    ScopePath(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::{NodeId, NodeKind, PythonParser, SyntaxTree};

    fn parse(source: &str) -> SyntaxTree {
        PythonParser::new().unwrap().parse_tree(source).unwrap()
    }

    fn find<'t>(tree: &'t SyntaxTree, kind: NodeKind, text: &str) -> NodeRef<'t> {
        tree.descendants(NodeId::ROOT)
            .find(|n| n.kind() == kind && n.text() == text)
            .unwrap()
    }

    #[test]
    fn method_scope() {
        let tree = parse("class C:\n    def f(self):\n        return 1 + 2\n");
        let site = find(&tree, NodeKind::BinaryOperator, "1 + 2");
        assert_eq!(scope_path(site).to_string(), "C.f");
    }

    #[test]
    fn module_scope_is_empty() {
        let tree = parse("x = 1 + 2\n");
        let site = find(&tree, NodeKind::BinaryOperator, "1 + 2");
        let scope = scope_path(site);
        assert!(scope.is_empty());
        assert_eq!(scope.to_string(), "");
    }

    #[test]
    fn nested_functions_and_decorators() {
        let source = "class A:\n    @property\n    def g(self):\n        def inner():\n            return -1\n        return inner\n";
        let tree = parse(source);
        let site = find(&tree, NodeKind::UnaryOperator, "-1");
        assert_eq!(
            scope_path(site).segments(),
            &["A".to_string(), "g".to_string(), "inner".to_string()]
        );
    }

    #[test]
    fn definition_includes_itself() {
        let tree = parse("class C:\n    def f(self):\n        pass\n");
        let func = tree
            .descendants(NodeId::ROOT)
            .find(|n| n.kind() == NodeKind::FunctionDefinition)
            .unwrap();
        assert_eq!(scope_path(func).to_string(), "C.f");
    }

    #[test]
    fn qualified_names() {
        let scope = ScopePath::from_segments(["C", "f"]);
        assert_eq!(scope.qualified("pkg.mod"), "pkg.mod.C.f");
        assert_eq!(ScopePath::default().qualified("pkg.mod"), "pkg.mod");
        assert_eq!(scope.qualified(""), "C.f");
    }
}
