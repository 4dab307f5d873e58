//! End-to-end tests for the mutation engine
//!
//! Exercises the public entry points over realistic Python modules.

use pymutant::{mutate, mutate_tree, Mutation, MutateError, OperatorTag, SyntaxTree};
use pymutant::ts::PythonParser;

fn patched(source: &str, mutations: &[Mutation]) -> Vec<String> {
    mutations
        .iter()
        .map(|m| m.patched(source).unwrap())
        .collect()
}

const MODULE: &str = r#"import math


class Shape:
    sides = 0

    def area(self):
        """Area of the shape."""
        return 0

    def describe(self, prefix=""):
        return prefix + "shape"


class Square(Shape):
    sides = 4

    def area(self):
        value = super().area()
        return self.width ** 2 + value

    def grow(self, by):
        self.width += by
        if by > 0 and self.width in LIMITS:
            return self.width[1:2:3]
        return -self.width
"#;

#[test]
fn sir_on_three_part_slice() {
    let source = "y = x[1:2:3]\n";
    let mutations = mutate(source, &["SIR"], "python").unwrap();
    assert_eq!(
        patched(source, &mutations),
        vec!["y = x[:2:3]\n", "y = x[1::3]\n", "y = x[1:2]\n"]
    );
}

#[test]
fn crp_literals() {
    let mutations = mutate("x = 5\n", &["CRP"], "python").unwrap();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].replacement(), "6");

    let mutations = mutate("s = \"hello\"\n", &["CRP"], "python").unwrap();
    assert_eq!(mutations.len(), 2);
    assert_eq!(mutations[0].replacement(), "");
    assert_ne!(mutations[1].replacement(), "\"hello\"");
    assert!(!mutations[1].replacement().is_empty());
}

#[test]
fn coi_conditions() {
    let source = "if x > 0:\n    pass\n";
    let mutations = mutate(source, &["COI"], "python").unwrap();
    assert_eq!(patched(source, &mutations), vec!["if not (x > 0):\n    pass\n"]);

    let source = "if x in y:\n    pass\n";
    let mutations = mutate(source, &["COI"], "python").unwrap();
    assert_eq!(patched(source, &mutations), vec!["if x not in y:\n    pass\n"]);
}

#[test]
fn ihd_hiding_variables() {
    let source = "class A:\n    x = 1\n\nclass B(A):\n    x = 2\n    y = 3\n";
    let mutations = mutate(source, &["IHD"], "python").unwrap();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].replacement(), "pass");
    assert_eq!(
        mutations[0].patched(source).unwrap(),
        "class A:\n    x = 1\n\nclass B(A):\n    pass\n    y = 3\n"
    );
}

#[test]
fn scopes_of_mutations() {
    let source = "class C:\n    def f(self):\n        return 1 + 2\n\nz = 3 + 4\n";
    let mutations = mutate(source, &["AOR"], "python").unwrap();
    let scopes: Vec<String> = mutations.iter().map(|m| m.scope().to_string()).collect();
    assert_eq!(scopes, vec!["C.f", ""]);
}

#[test]
fn aor_never_emits_identity() {
    let mutations = mutate(MODULE, &["AOR"], "python").unwrap();
    assert!(!mutations.is_empty());
    for mutation in &mutations {
        assert_ne!(mutation.patched(MODULE).unwrap(), MODULE);
    }
}

#[test]
fn standard_set_over_module() {
    let none: &[&str] = &[];
    let mutations = mutate(MODULE, none, "python").unwrap();

    let tags: std::collections::BTreeSet<&str> =
        mutations.iter().map(|m| m.operator()).collect();
    for expected in ["AOD", "AOR", "ASR", "COI", "CRP", "LCR", "ROR", "SIR"] {
        assert!(tags.contains(expected), "missing {expected} in {tags:?}");
    }
    // The docstring on line 7 is never touched.
    assert!(mutations
        .iter()
        .filter(|m| m.operator() == "CRP")
        .all(|m| m.span().start().line != 7));
}

#[test]
fn inheritance_family_over_module() {
    let mutations = mutate(MODULE, &["IHD", "IOD", "SCD", "SCI", "IOP"], "python").unwrap();
    let summary: Vec<(String, String)> = mutations
        .iter()
        .map(|m| (m.operator().to_string(), m.scope().to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("IHD".to_string(), "Square".to_string()),
            ("IOD".to_string(), "Square.area".to_string()),
            ("SCD".to_string(), "Square.area".to_string()),
            ("IOP".to_string(), "Square.area".to_string()),
        ]
    );
}

#[test]
fn every_mutant_undoes_cleanly() {
    let all: Vec<&str> = OperatorTag::ALL.iter().map(|t| t.as_str()).collect();
    let mutations = mutate(MODULE, &all, "python").unwrap();
    for mutation in &mutations {
        let (mutant, undo) = mutation.apply(MODULE).unwrap();
        assert_eq!(undo.apply(&mutant).unwrap().0, MODULE, "{mutation}");
    }
}

#[test]
fn diff_of_a_mutant() {
    let source = "def f(a, b):\n    return a + b\n";
    let mutations = mutate(source, &["AOR"], "python").unwrap();
    let diff = mutations[0]
        .unified_diff(source, "f.py", "f.py", 3)
        .unwrap();
    assert!(diff.starts_with("--- f.py\n+++ f.py\n"));
    assert!(diff.contains("-    return a + b\n"));
    assert!(diff.contains("+    return a - b\n"));
}

#[test]
fn unknown_operator_is_rejected() {
    let err = mutate("x = 1\n", &["AOR", "RORR"], "python").unwrap_err();
    assert!(matches!(
        err,
        MutateError::UnknownOperator { ref name, suggestion: Some("ROR") } if name == "RORR"
    ));
}

#[test]
fn tree_can_be_reused_across_runs() {
    let tree: SyntaxTree = PythonParser::new()
        .unwrap()
        .parse_tree("x = a - b\n")
        .unwrap();
    let first = mutate_tree(&tree, &[OperatorTag::Aor]).unwrap();
    let second = mutate_tree(&tree, &[OperatorTag::Aor]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].replacement(), "+");
}

#[test]
fn module_docstring_without_trailing_newline() {
    let source = "\"\"\"Package docs.\"\"\"";
    let mutations = mutate(source, &["CRP"], "python").unwrap();
    assert_eq!(
        patched(source, &mutations),
        vec!["", "'pymutant'"]
    );

    let diff = mutations[0]
        .unified_diff(source, "pkg/__init__.py", "pkg/__init__.py", 3)
        .unwrap();
    assert!(diff.contains("@@ -1 "), "{diff}");
    assert!(diff.contains("-\"\"\"Package docs.\"\"\""), "{diff}");
}
