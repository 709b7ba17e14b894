//! Scalar decoding coverage (spec.md §4.4): double-quote escapes and
//! folded-scalar chomp/fold behavior.

use fy_safer::{DiagnosticSink, Document, Input, NodeData, Parser};

fn load(yaml: &str) -> Document {
    let mut parser = Parser::new(Input::from_str("t", yaml));
    let mut sink = DiagnosticSink::new();
    let doc = fy_safer::load(&mut parser, &mut sink).unwrap();
    assert!(!sink.had_error(), "unexpected diagnostics: {:?}", sink.records());
    doc
}

fn scalar_at(doc: &Document, key: &str) -> String {
    let root = doc.get_root_node().unwrap();
    let NodeData::Mapping { pairs, .. } = &root.data else {
        panic!("expected mapping");
    };
    for pair in pairs {
        let NodeData::Scalar { value: k, .. } = &doc.get_node(pair.key).unwrap().data else {
            continue;
        };
        if k == key {
            let NodeData::Scalar { value, .. } = &doc.get_node(pair.value).unwrap().data else {
                panic!("expected scalar value for {key}");
            };
            return value.clone();
        }
    }
    panic!("no such key {key}");
}

#[test]
fn double_quoted_escapes_decode_control_and_hex() {
    let doc = load("control: \"\\b1998\\t1999\\t2000\\n\"\nhex: \"\\x0d\\x0a\"\n");
    assert_eq!(scalar_at(&doc, "control"), "\u{8}1998\t1999\t2000\n");
    assert_eq!(scalar_at(&doc, "hex"), "\r\n");
}

#[test]
fn single_quoted_scalar_keeps_doubled_quote_as_escape() {
    let doc = load("quoted: ' # Not a ''comment''.'\n");
    assert_eq!(scalar_at(&doc, "quoted"), " # Not a 'comment'.");
}

#[test]
fn folded_scalar_keeps_blank_line_as_literal_break() {
    let doc = load("folded: >\n  1st non-empty\n\n  2nd non-empty\n  3rd non-empty\n");
    assert_eq!(scalar_at(&doc, "folded"), "1st non-empty\n2nd non-empty 3rd non-empty\n");
}

#[test]
fn literal_scalar_with_strip_chomp_drops_trailing_newline() {
    let doc = load("lit: |-\n  line one\n  line two\n");
    assert_eq!(scalar_at(&doc, "lit"), "line one\nline two");
}

#[test]
fn literal_scalar_with_keep_chomp_preserves_trailing_blank_lines() {
    let doc = load("lit: |+\n  line one\n\n\n");
    assert_eq!(scalar_at(&doc, "lit"), "line one\n\n\n");
}
