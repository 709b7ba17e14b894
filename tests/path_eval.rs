//! End-to-end path-expression coverage (spec.md §4.8/§4.9) against a loaded
//! document, exercising chains, slices, and the filter suffixes.

use fy_safer::{DiagnosticSink, Document, Input, NodeData, Parser, Path, WalkResult};

fn load(yaml: &str) -> Document {
    let mut parser = Parser::new(Input::from_str("t", yaml));
    let mut sink = DiagnosticSink::new();
    fy_safer::load(&mut parser, &mut sink).unwrap()
}

fn scalar_text(doc: &Document, item: fy_safer::NodeItem) -> String {
    match &doc.get_node(item).unwrap().data {
        NodeData::Scalar { value, .. } => value.clone(),
        _ => panic!("expected scalar"),
    }
}

#[test]
fn map_key_chain_and_sequence_index() {
    let doc = load("people:\n  - name: ada\n  - name: grace\n");
    let path = Path::compile("people[1]/name").unwrap();
    let result = path.eval(&doc).unwrap();
    let WalkResult::Node(n) = result else {
        panic!("expected a single node");
    };
    assert_eq!(scalar_text(&doc, n), "grace");
}

#[test]
fn negative_slice_bounds_clamp_to_sequence_length() {
    let doc = load("[10, 20, 30, 40]\n");
    let path = Path::compile("[-2:100]").unwrap();
    let WalkResult::Refs(items) = path.eval(&doc).unwrap() else {
        panic!("expected refs");
    };
    let values: Vec<_> = items.iter().map(|&n| scalar_text(&doc, n)).collect();
    assert_eq!(values, vec!["30", "40"]);
}

#[test]
fn comparison_filters_sequence_entries() {
    let doc = load("[1, 2, 3, 4, 5]\n");
    let path = Path::compile("*{. > 3}").unwrap();
    let WalkResult::Refs(items) = path.eval(&doc).unwrap() else {
        panic!("expected refs");
    };
    let values: Vec<_> = items.iter().map(|&n| scalar_text(&doc, n)).collect();
    assert_eq!(values, vec!["4", "5"]);
}

#[test]
fn filter_collection_suffix_drops_scalar_children() {
    let doc = load("[1, [2, 3], four, {k: v}]\n");
    let path = Path::compile("*%").unwrap();
    let WalkResult::Refs(items) = path.eval(&doc).unwrap() else {
        panic!("expected refs");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn unknown_key_evaluates_to_empty() {
    let doc = load("a: 1\n");
    let path = Path::compile("missing").unwrap();
    assert_eq!(path.eval(&doc).unwrap(), WalkResult::Empty);
}

#[test]
fn alias_path_operand_resolves_to_the_anchored_node() {
    let doc = load("base: &b\n  x: 1\nderived: *b\n");
    let path = Path::compile("*b/x").unwrap();
    let WalkResult::Node(n) = path.eval(&doc).unwrap() else {
        panic!("expected a single node");
    };
    assert_eq!(scalar_text(&doc, n), "1");
}

#[test]
fn alias_path_operand_for_unknown_anchor_evaluates_to_empty() {
    let doc = load("a: 1\n");
    let path = Path::compile("*missing").unwrap();
    assert_eq!(path.eval(&doc).unwrap(), WalkResult::Empty);
}
