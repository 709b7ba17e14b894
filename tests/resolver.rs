//! Alias resolution and duplicate-key/anchor behavior (spec.md §4.5/§4.6).

use fy_safer::{DiagnosticSink, Document, Input, Level, NodeData, Parser};

fn load(yaml: &str) -> (Document, DiagnosticSink) {
    let mut parser = Parser::new(Input::from_str("t", yaml));
    let mut sink = DiagnosticSink::new();
    let doc = fy_safer::load(&mut parser, &mut sink).unwrap();
    (doc, sink)
}

#[test]
fn alias_resolves_to_the_anchored_node() {
    let (doc, sink) = load("base: &b [1, 2, 3]\nderived: *b\n");
    assert!(!sink.had_error());

    let root = doc.get_root_node().unwrap();
    let NodeData::Mapping { pairs, .. } = &root.data else {
        panic!("expected mapping");
    };
    let derived = pairs.iter().find(|p| matches!(&doc.get_node(p.key).unwrap().data, NodeData::Scalar { value, .. } if value == "derived")).unwrap();
    let base = pairs.iter().find(|p| matches!(&doc.get_node(p.key).unwrap().data, NodeData::Scalar { value, .. } if value == "base")).unwrap();
    assert_eq!(derived.value, base.value);
}

#[test]
fn undefined_alias_is_a_composer_error() {
    let mut parser = Parser::new(Input::from_str("t", "x: *missing\n"));
    let mut sink = DiagnosticSink::new();
    assert!(fy_safer::load(&mut parser, &mut sink).is_err());
}

#[test]
fn later_anchor_definition_wins_but_earlier_alias_keeps_its_target() {
    let (doc, sink) = load("- &a first\n- *a\n- &a second\n- *a\n");
    assert!(!sink.had_error());

    let root = doc.get_root_node().unwrap();
    let NodeData::Sequence { items, .. } = &root.data else {
        panic!("expected sequence");
    };
    let text = |n: fy_safer::NodeItem| match &doc.get_node(n).unwrap().data {
        NodeData::Scalar { value, .. } => value.clone(),
        _ => panic!("expected scalar"),
    };
    assert_eq!(text(items[0]), "first");
    assert_eq!(text(items[1]), "first");
    assert_eq!(text(items[2]), "second");
    assert_eq!(text(items[3]), "second");
}

#[test]
fn duplicate_mapping_key_reports_a_warning_with_first_occurrence_winning() {
    let (doc, sink) = load("a: 1\na: 2\n");
    assert!(!sink.had_error());
    assert!(sink.records().iter().any(|d| d.level == Level::Warning));

    let resolved = doc.mapping_lookup(1, "a").unwrap();
    let NodeData::Scalar { value, .. } = &doc.get_node(resolved).unwrap().data else {
        panic!("expected scalar");
    };
    assert_eq!(value, "1");
}
