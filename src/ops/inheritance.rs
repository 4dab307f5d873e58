//! Inheritance mutations: hiding variables, overriding methods and calls to
//! the overridden parent method.

use super::dispatch::{DispatchTable, HandlerResult, Operator};
use super::{single, OperatorTag};
use crate::mutation::Mutation;
use crate::overrides::{enclosing_class, is_target_list, OverrideAnalyzer};
use crate::scope::scope_path;
use crate::ts::{NodeKind, NodeRef, SyntaxTree};

/// IHD: delete class-level assignments that hide a base member.
pub struct HidingVariableDeletion<'t> {
    analyzer: OverrideAnalyzer<'t>,
}

impl<'t> HidingVariableDeletion<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            analyzer: OverrideAnalyzer::new(tree),
        }
    }

    fn assignment(&self, node: NodeRef<'t>) -> HandlerResult {
        let Some(left) = node.child_by_field_name("left") else {
            return Ok(Vec::new());
        };
        if left.kind() == NodeKind::Identifier {
            if self.analyzer.is_overridden(left) {
                return single(Self::TAG.mutation(node, "pass"));
            }
            return Ok(Vec::new());
        }
        if is_target_list(left) {
            return single(self.unpack(node, left));
        }
        Ok(Vec::new())
    }

    /// `a, b = 1, 2`: keep only the pairs that hide nothing.
    fn unpack(&self, node: NodeRef<'t>, left: NodeRef<'t>) -> Option<Mutation> {
        let right = node.child_by_field_name("right")?;
        if right.kind() != NodeKind::ExpressionList {
            return None;
        }
        let targets: Vec<_> = elements(left).collect();
        let values: Vec<_> = elements(right).collect();
        if targets.len() != values.len()
            || targets.iter().any(|t| t.kind() != NodeKind::Identifier)
        {
            tracing::trace!(assignment = node.text(), "unpack shape not supported");
            return None;
        }

        let (kept_targets, kept_values): (Vec<&str>, Vec<&str>) = targets
            .iter()
            .zip(&values)
            .filter(|(target, _)| !self.analyzer.is_overridden(**target))
            .map(|(target, value)| (target.text(), value.text()))
            .unzip();

        if kept_targets.len() == targets.len() {
            return None;
        }
        if kept_targets.is_empty() {
            return Self::TAG.mutation(node, "pass");
        }
        Self::TAG.mutation(
            node,
            format!("{} = {}", kept_targets.join(", "), kept_values.join(", ")),
        )
    }
}

impl<'t> Operator<'t> for HidingVariableDeletion<'t> {
    const TAG: OperatorTag = OperatorTag::Ihd;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::Assignment, Self::assignment)
    }
}

/// Comma-separated elements of a target or expression list.
fn elements<'t>(list: NodeRef<'t>) -> impl Iterator<Item = NodeRef<'t>> {
    list.children()
        .filter(|c| c.grammar_kind() != "," && c.kind() != NodeKind::Comment)
}

/// IOD: delete a method that overrides a base method.
pub struct OverridingMethodDeletion<'t> {
    analyzer: OverrideAnalyzer<'t>,
}

impl<'t> OverridingMethodDeletion<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            analyzer: OverrideAnalyzer::new(tree),
        }
    }

    fn function(&self, node: NodeRef<'t>) -> HandlerResult {
        let Some(name) = node.definition_name() else {
            return Ok(Vec::new());
        };
        if !self.analyzer.overrides(node, name) {
            return Ok(Vec::new());
        }
        // Decorators go together with the method they decorate.
        let target = node
            .parent()
            .filter(|p| p.kind() == NodeKind::DecoratedDefinition)
            .unwrap_or(node);
        Ok(target
            .span()
            .map(|span| Mutation::new(span, "pass", Self::TAG.as_str(), scope_path(node)))
            .into_iter()
            .collect())
    }
}

impl<'t> Operator<'t> for OverridingMethodDeletion<'t> {
    const TAG: OperatorTag = OperatorTag::Iod;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::FunctionDefinition, Self::function)
    }
}

/// First `name = super().<method>(...)` statement in the body of `method`,
/// where `<method>` is the method's own name.
///
/// Only methods defined directly in a class body qualify.
fn parent_call<'t>(method: NodeRef<'t>) -> Option<NodeRef<'t>> {
    enclosing_class(method)?;
    let name = method.definition_name()?;
    let body = method.child_by_field_name("body")?;
    body.children()
        .find(|statement| is_parent_call(*statement, name))
}

fn is_parent_call(statement: NodeRef<'_>, method: &str) -> bool {
    let call = statement
        .first_child()
        .filter(|_| statement.kind() == NodeKind::ExpressionStatement)
        .filter(|assignment| assignment.kind() == NodeKind::Assignment)
        .and_then(|assignment| assignment.child_by_field_name("right"))
        .filter(|value| value.kind() == NodeKind::Call);
    let Some(function) = call
        .and_then(|c| c.child_by_field_name("function"))
        .filter(|f| f.kind() == NodeKind::Attribute)
    else {
        return false;
    };
    let calls_super = function
        .child_by_field_name("object")
        .filter(|object| object.kind() == NodeKind::Call)
        .and_then(|object| object.child_by_field_name("function"))
        .is_some_and(|callee| callee.text() == "super");
    calls_super
        && function
            .child_by_field_name("attribute")
            .is_some_and(|attribute| attribute.text() == method)
}

/// SCD: replace the call to the overridden parent method with `pass`.
pub struct SuperCallDeletion;

impl<'t> Operator<'t> for SuperCallDeletion {
    const TAG: OperatorTag = OperatorTag::Scd;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::FunctionDefinition, |_, node| match parent_call(node) {
            Some(statement) => single(Self::TAG.mutation(statement, "pass")),
            None => Ok(Vec::new()),
        })
    }
}

/// IOP: move the parent-method call to the other end of the method body.
///
/// A call that comes first moves to the end; anywhere else it moves to the
/// front. Comments and the whitespace between statements stay in place.
pub struct CallPositionChange;

impl<'t> Operator<'t> for CallPositionChange {
    const TAG: OperatorTag = OperatorTag::Iop;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::FunctionDefinition, Self::function)
    }
}

impl CallPositionChange {
    fn function(&self, node: NodeRef<'_>) -> HandlerResult {
        let Some(call) = parent_call(node) else {
            return Ok(Vec::new());
        };
        let Some(body) = node.child_by_field_name("body") else {
            return Ok(Vec::new());
        };
        let items: Vec<_> = body.children().filter(|c| c.span().is_some()).collect();
        let statements = items
            .iter()
            .filter(|c| c.kind() != NodeKind::Comment)
            .count();
        if statements < 2 {
            return Ok(Vec::new());
        }
        let Some(position) = items.iter().position(|c| *c == call) else {
            return Ok(Vec::new());
        };

        let first_statement = items.iter().position(|c| c.kind() != NodeKind::Comment);
        let mut order: Vec<usize> = (0..items.len()).collect();
        let moved = order.remove(position);
        if Some(position) == first_statement {
            order.push(moved);
        } else {
            order.insert(0, moved);
        }

        single(Self::TAG.mutation(body, reassemble(body, &items, &order)))
    }
}

/// Text of `body` with `items` laid out in `order`, keeping every gap
/// between items where it was.
fn reassemble(body: NodeRef<'_>, items: &[NodeRef<'_>], order: &[usize]) -> String {
    let source = body.tree().source();
    let range = body.byte_range();
    let mut text = String::with_capacity(range.len());
    let mut cursor = range.start;
    for (slot, &item) in items.iter().zip(order) {
        let slot_range = slot.byte_range();
        text.push_str(&source[cursor..slot_range.start]);
        text.push_str(items[item].text());
        cursor = slot_range.end;
    }
    text.push_str(&source[cursor..range.end]);
    text
}

/// SCI: call the overridden parent method before the first statement.
pub struct SuperCallInsertion<'t> {
    analyzer: OverrideAnalyzer<'t>,
}

impl<'t> SuperCallInsertion<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        Self {
            analyzer: OverrideAnalyzer::new(tree),
        }
    }

    fn function(&self, node: NodeRef<'t>) -> HandlerResult {
        let Some(name) = node.definition_name() else {
            return Ok(Vec::new());
        };
        if !self.analyzer.overrides(node, name) || parent_call(node).is_some() {
            return Ok(Vec::new());
        }
        let Some(first) = node
            .child_by_field_name("body")
            .and_then(|body| body.children().find(|c| c.kind() != NodeKind::Comment))
        else {
            return Ok(Vec::new());
        };

        let call = format!("super().{name}({})", forwarded_arguments(node).join(", "));
        let source = node.tree().source();
        let start = first.byte_range().start;
        let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
        let indent = &source[line_start..start];

        let replacement = if indent.chars().all(char::is_whitespace) {
            format!("{call}\n{indent}{}", first.text())
        } else {
            // `def f(self): return 1` keeps the body on one line.
            format!("{call}; {}", first.text())
        };
        single(Self::TAG.mutation(first, replacement))
    }
}

impl<'t> Operator<'t> for SuperCallInsertion<'t> {
    const TAG: OperatorTag = OperatorTag::Sci;

    fn handlers(table: DispatchTable<'t, Self>) -> DispatchTable<'t, Self> {
        table.on(NodeKind::FunctionDefinition, Self::function)
    }
}

/// Arguments forwarding every parameter of `method` to its parent.
fn forwarded_arguments(method: NodeRef<'_>) -> Vec<String> {
    let Some(parameters) = method.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut receiver_pending = !is_static(method);
    let mut keyword_only = false;
    let mut arguments = Vec::new();

    for parameter in parameters.children() {
        let parameter = match parameter.kind() {
            NodeKind::TypedParameter => match parameter.first_child() {
                Some(inner) => inner,
                None => continue,
            },
            _ => parameter,
        };
        let name = match parameter.kind() {
            NodeKind::Identifier => parameter.text(),
            NodeKind::DefaultParameter | NodeKind::TypedDefaultParameter => {
                match parameter.child_by_field_name("name") {
                    Some(name) => name.text(),
                    None => continue,
                }
            }
            NodeKind::ListSplatPattern => {
                receiver_pending = false;
                keyword_only = true;
                arguments.push(parameter.text().to_string());
                continue;
            }
            NodeKind::DictionarySplatPattern => {
                receiver_pending = false;
                arguments.push(parameter.text().to_string());
                continue;
            }
            NodeKind::KeywordSeparator => {
                receiver_pending = false;
                keyword_only = true;
                continue;
            }
            _ => continue,
        };

        if receiver_pending {
            receiver_pending = false;
            continue;
        }
        arguments.push(if keyword_only {
            format!("{name}={name}")
        } else {
            name.to_string()
        });
    }
    arguments
}

fn is_static(method: NodeRef<'_>) -> bool {
    method
        .parent()
        .filter(|p| p.kind() == NodeKind::DecoratedDefinition)
        .is_some_and(|decorated| {
            decorated
                .children()
                .filter(|c| c.kind() == NodeKind::Decorator)
                .any(|d| d.text().trim_start_matches('@').trim() == "staticmethod")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::{mutants, parse, run};
    use crate::ts::NodeId;

    const HIDING: &str = "\
class A:
    x = 1
    a, b = 1, 2

class B(A):
    x = 2
    y = 3
";

    #[test]
    fn ihd_deletes_hiding_assignment() {
        let mutations = run(OperatorTag::Ihd, HIDING);
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].replacement(), "pass");
        assert_eq!(mutations[0].span().start().line, 5);
        assert_eq!(mutations[0].scope().to_string(), "B");
    }

    #[test]
    fn ihd_rewrites_unpacking() {
        let source = "class A:\n    a = 1\nclass B(A):\n    a, c = 1, 2\n";
        assert_eq!(
            mutants(OperatorTag::Ihd, source),
            vec!["class A:\n    a = 1\nclass B(A):\n    c = 2\n"]
        );

        let source = "class A:\n    a, c = 0, 0\nclass B(A):\n    a, c = 1, 2\n";
        assert_eq!(
            mutants(OperatorTag::Ihd, source),
            vec!["class A:\n    a, c = 0, 0\nclass B(A):\n    pass\n"]
        );

        let source = "class A:\n    a = 1\nclass B(A):\n    a, c, d = 1, 2, 3\n";
        assert_eq!(
            mutants(OperatorTag::Ihd, source),
            vec!["class A:\n    a = 1\nclass B(A):\n    c, d = 2, 3\n"]
        );
    }

    #[test]
    fn ihd_abstains_on_unsupported_unpacking() {
        let source = "class A:\n    a = 1\nclass B(A):\n    a, c = pair\n";
        assert!(run(OperatorTag::Ihd, source).is_empty());

        let source = "class A:\n    q = 1\nclass B(A):\n    a, c = 1, 2\n";
        assert!(run(OperatorTag::Ihd, source).is_empty());
    }

    #[test]
    fn iod_deletes_overriding_method() {
        let source = "class A:\n    def f(self):\n        return 1\nclass B(A):\n    def f(self):\n        return 2\n    def g(self):\n        return 3\n";
        let mutations = run(OperatorTag::Iod, source);
        assert_eq!(mutations.len(), 1);
        assert_eq!(mutations[0].scope().to_string(), "B.f");
        assert_eq!(
            mutations[0].patched(source).unwrap(),
            "class A:\n    def f(self):\n        return 1\nclass B(A):\n    pass\n    def g(self):\n        return 3\n"
        );
    }

    #[test]
    fn iod_takes_decorators_along() {
        let source = "class A:\n    def f(self):\n        pass\nclass B(A):\n    @wrap\n    def f(self):\n        pass\n";
        assert_eq!(
            mutants(OperatorTag::Iod, source),
            vec!["class A:\n    def f(self):\n        pass\nclass B(A):\n    pass\n"]
        );
    }

    const PARENT_CALL: &str = "\
class B(A):
    def setup(self, x):
        result = super().setup(x)
        self.x = x
        return result
";

    #[test]
    fn scd_deletes_parent_call() {
        assert_eq!(
            mutants(OperatorTag::Scd, PARENT_CALL),
            vec!["class B(A):\n    def setup(self, x):\n        pass\n        self.x = x\n        return result\n"]
        );
    }

    #[test]
    fn scd_ignores_calls_to_other_methods() {
        let source = "class B(A):\n    def setup(self):\n        r = super().other()\n        return r\n";
        assert!(run(OperatorTag::Scd, source).is_empty());
    }

    #[test]
    fn scd_ignores_free_functions() {
        let source = "def setup(self):\n    r = super().setup()\n    return r\n";
        assert!(run(OperatorTag::Scd, source).is_empty());
    }

    #[test]
    fn iop_moves_leading_call_to_end() {
        assert_eq!(
            mutants(OperatorTag::Iop, PARENT_CALL),
            vec!["class B(A):\n    def setup(self, x):\n        self.x = x\n        return result\n        result = super().setup(x)\n"]
        );
    }

    #[test]
    fn iop_moves_later_call_to_front() {
        let source = "class B(A):\n    def setup(self, x):\n        self.x = x\n        # parent\n        r = super().setup(x)\n";
        assert_eq!(
            mutants(OperatorTag::Iop, source),
            vec!["class B(A):\n    def setup(self, x):\n        r = super().setup(x)\n        self.x = x\n        # parent\n"]
        );
    }

    #[test]
    fn iop_needs_another_statement() {
        let source = "class B(A):\n    def setup(self):\n        r = super().setup()\n";
        assert!(run(OperatorTag::Iop, source).is_empty());
    }

    const OVERRIDE: &str = "\
class A:
    def run(self, a, b=1, *rest, flag, **extra):
        pass

class B(A):
    def run(self, a, b=1, *rest, flag, **extra):
        return a
";

    #[test]
    fn sci_inserts_parent_call() {
        assert_eq!(
            mutants(OperatorTag::Sci, OVERRIDE),
            vec![OVERRIDE.replace(
                "        return a",
                "        super().run(a, b, *rest, flag=flag, **extra)\n        return a"
            )]
        );
    }

    #[test]
    fn sci_skips_methods_with_parent_call() {
        let source = "class A:\n    def f(self):\n        return 1\nclass B(A):\n    def f(self):\n        r = super().f()\n        return r\n";
        assert!(run(OperatorTag::Sci, source).is_empty());
    }

    #[test]
    fn sci_skips_non_overriding_methods() {
        let source = "class A:\n    pass\nclass B(A):\n    def f(self):\n        return 1\n";
        assert!(run(OperatorTag::Sci, source).is_empty());
    }

    #[test]
    fn sci_inline_body() {
        let source = "class A:\n    def f(self): return 0\nclass B(A):\n    def f(self): return 1\n";
        assert_eq!(
            mutants(OperatorTag::Sci, source),
            vec!["class A:\n    def f(self): return 0\nclass B(A):\n    def f(self): super().f(); return 1\n"]
        );
    }

    #[test]
    fn forwarding_rules() {
        let source = "\
class C:
    @staticmethod
    def s(a, *, key, other=2):
        pass

    def t(self, a: int, b: str = '', *args: int):
        pass

    def u(*args, key):
        pass
";
        let tree = parse(source);
        let methods: Vec<_> = tree
            .descendants(NodeId::ROOT)
            .filter(|n| n.kind() == NodeKind::FunctionDefinition)
            .collect();
        assert_eq!(
            forwarded_arguments(methods[0]),
            vec!["a", "key=key", "other=other"]
        );
        assert_eq!(forwarded_arguments(methods[1]), vec!["a", "b", "*args"]);
        // A leading splat takes the receiver's place.
        assert_eq!(forwarded_arguments(methods[2]), vec!["*args", "key=key"]);
    }
}
