//! Round-trip coverage across the emitter's mode table (spec.md §4.7): a
//! block-style document re-emitted as flow, and a JSON document parsed back
//! in as YAML.

use fy_safer::{DiagnosticSink, Document, Emitter, EmitterMode, Input, Parser};

fn load(yaml: &str) -> Document {
    let mut parser = Parser::new(Input::from_str("t", yaml));
    let mut sink = DiagnosticSink::new();
    let doc = fy_safer::load(&mut parser, &mut sink).unwrap();
    assert!(!sink.had_error(), "unexpected diagnostics: {:?}", sink.records());
    doc
}

fn dump(doc: &Document, mode: EmitterMode) -> String {
    let mut buffer = Vec::new();
    let mut emitter = Emitter::new().with_output_string(&mut buffer).with_mode(mode);
    doc.dump(&mut emitter).unwrap();
    drop(emitter);
    String::from_utf8(buffer).unwrap()
}

#[test]
fn block_document_reflows_as_oneline_flow() {
    let doc = load("a: 1\nb:\n  - 2\n  - 3\n");
    let flow = dump(&doc, EmitterMode::FlowOneline);
    assert_eq!(flow.lines().count(), 1, "flow-oneline should emit a single line, got {flow:?}");

    let reloaded = load(&flow);
    let root = reloaded.get_root_node().unwrap();
    let fy_safer::NodeData::Mapping { pairs, .. } = &root.data else {
        panic!("expected mapping");
    };
    assert_eq!(pairs.len(), 2);
}

#[test]
fn json_output_round_trips_back_through_the_yaml_parser() {
    let doc = load("name: trilby\ncount: 3\ntags: [a, b]\n");
    let json = dump(&doc, EmitterMode::Json);

    let reloaded = load(&json);
    let root = reloaded.get_root_node().unwrap();
    let fy_safer::NodeData::Mapping { pairs, .. } = &root.data else {
        panic!("expected mapping");
    };
    assert_eq!(pairs.len(), 3);
}

#[test]
fn anchors_and_aliases_round_trip_through_dump() {
    let doc = load("base: &b\n  x: 1\nderived: *b\n");
    let yaml = dump(&doc, EmitterMode::Block);
    let reloaded = load(&yaml);
    let root = reloaded.get_root_node().unwrap();
    let fy_safer::NodeData::Mapping { pairs, .. } = &root.data else {
        panic!("expected mapping");
    };
    assert_eq!(pairs.len(), 2);
}
