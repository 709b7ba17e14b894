//! Thin convenience wrapper tying `Parser`/`Document::load`/`Document::resolve`
//! together into the single call most callers want (spec §4.5/§4.6):
//! parse one document off the stream and immediately run the resolve pass
//! over it, reporting any resolve-time diagnostics (duplicate keys, etc.)
//! through the caller's sink.
//!
//! Grounded on the teacher's old-generation `yaml_parser_load`, which
//! combined parsing a whole document in one call; the resolve step is new
//! here since the teacher's generation had no separate resolver pass to
//! chain in.

use crate::diag::DiagnosticSink;
use crate::document::Document;
use crate::error::ComposerError;
use crate::parser::Parser;

/// Parse the next document off `parser` and resolve it, reporting
/// diagnostics into `sink`.
///
/// An application is responsible for calling this repeatedly to consume a
/// multi-document stream; a document with no root node signals the end of
/// the stream (spec §4.5).
pub fn load(parser: &mut Parser, sink: &mut DiagnosticSink) -> Result<Document, ComposerError> {
    let document = Document::load(parser)?;
    document.resolve(sink);
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeData;
    use crate::input::Input;

    #[test]
    fn loads_and_resolves_in_one_call() {
        let mut parser = Parser::new(Input::from_str("t", "a: 1\na: 2\n"));
        let mut sink = DiagnosticSink::new();
        let doc = load(&mut parser, &mut sink).unwrap();
        assert_eq!(sink.records().len(), 1);
        let NodeData::Mapping { pairs, .. } = &doc.get_root_node().unwrap().data else {
            panic!("expected mapping");
        };
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn empty_document_signals_stream_end() {
        let mut parser = Parser::new(Input::from_str("t", ""));
        let mut sink = DiagnosticSink::new();
        let doc = load(&mut parser, &mut sink).unwrap();
        assert!(doc.get_root_node().is_none());
    }
}
