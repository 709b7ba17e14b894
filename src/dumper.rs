//! The tree-based emitter entry point (spec.md §4.7): `Document::dump` walks
//! a whole [`Document`] and feeds the equivalent event stream to an
//! [`Emitter`], so `emit_document` is implemented in terms of `emit_event`
//! rather than duplicating the state machine.
//!
//! Grounded on the teacher's old-generation `dumper.rs`
//! (`yaml_emitter_dump`/`yaml_emitter_anchor_node`/`yaml_emitter_dump_node`),
//! kept for its anchor-assignment algorithm but rewritten against the
//! current `Document`/`Node`/`NodeData`/`Event` types with no `unsafe`: a
//! first pass counts how many times each node index is reached (a node
//! reachable only once needs no anchor at all); a second pass walks again,
//! this time emitting events, and a node that has already been serialized
//! once is emitted as an `Alias` on every subsequent visit instead of
//! re-serializing its content — which is what makes shared and cyclic
//! structures round-trip instead of looping forever or duplicating data.

use crate::document::{Document, NodeData, NodeItem};
use crate::emitter::{AnchorState, Emitter};
use crate::error::EmitterError;
use crate::event::Event;

impl Document {
    /// Emit this document's nodes as a full event stream: STREAM-START,
    /// DOCUMENT-START, the node tree, DOCUMENT-END, STREAM-END.
    pub fn dump(&self, emitter: &mut Emitter) -> Result<(), EmitterError> {
        emitter.emit(Event::stream_start(emitter.encoding))?;
        emitter.emit(Event::document_start(
            self.version_directive,
            &self.tag_directives,
            self.start_implicit,
        ))?;

        emitter.anchors.clear();
        emitter.anchors.resize(self.nodes.len(), AnchorState::default());
        emitter.last_anchor_id = 0;

        if self.get_root_node().is_some() {
            self.anchor_node(1, emitter);
            self.dump_node(1, emitter)?;
        }

        emitter.emit(Event::document_end(self.end_implicit))?;
        emitter.emit(Event::stream_end())?;
        Ok(())
    }

    fn anchor_node(&self, index: NodeItem, emitter: &mut Emitter) {
        let slot = &mut emitter.anchors[index as usize - 1];
        slot.references += 1;
        if slot.references > 1 {
            return;
        }
        let Some(node) = self.get_node(index) else {
            return;
        };
        match &node.data {
            NodeData::Sequence { items, .. } => {
                for &item in items {
                    self.anchor_node(item, emitter);
                }
            }
            NodeData::Mapping { pairs, .. } => {
                let mut pairs = pairs.clone();
                if emitter.sort_keys() {
                    pairs.sort_by(|a, b| self.scalar_key_text(a.key).cmp(&self.scalar_key_text(b.key)));
                }
                for pair in &pairs {
                    self.anchor_node(pair.key, emitter);
                    self.anchor_node(pair.value, emitter);
                }
            }
            NodeData::Scalar { .. } | NodeData::NoNode => {}
        }
    }

    fn scalar_key_text(&self, index: NodeItem) -> String {
        match self.get_node(index).map(|n| &n.data) {
            Some(NodeData::Scalar { value, .. }) => value.clone(),
            _ => String::new(),
        }
    }

    fn dump_node(&self, index: NodeItem, emitter: &mut Emitter) -> Result<(), EmitterError> {
        let slot = emitter.anchors[index as usize - 1];
        let anchor = (slot.references > 1).then(|| generate_anchor(slot_anchor_id(emitter, index)));

        if slot.serialized {
            emitter.emit(Event::alias(&anchor.unwrap_or_default()))?;
            return Ok(());
        }
        emitter.anchors[index as usize - 1].serialized = true;

        let Some(node) = self.get_node(index) else {
            return Ok(());
        };

        match &node.data {
            NodeData::Scalar { value, style } => {
                let (plain_implicit, quoted_implicit) = implicit_flags(node.tag.as_deref());
                emitter.emit(Event::scalar(
                    anchor.as_deref(),
                    node.tag.as_deref(),
                    value,
                    plain_implicit,
                    quoted_implicit,
                    *style,
                ))?;
            }
            NodeData::Sequence { items, style } => {
                let (_, implicit) = implicit_flags(node.tag.as_deref());
                emitter.emit(Event::sequence_start(
                    anchor.as_deref(),
                    node.tag.as_deref(),
                    implicit,
                    *style,
                ))?;
                let items = items.clone();
                for item in items {
                    self.dump_node(item, emitter)?;
                }
                emitter.emit(Event::sequence_end())?;
            }
            NodeData::Mapping { pairs, style } => {
                let (_, implicit) = implicit_flags(node.tag.as_deref());
                emitter.emit(Event::mapping_start(
                    anchor.as_deref(),
                    node.tag.as_deref(),
                    implicit,
                    *style,
                ))?;
                let mut pairs = pairs.clone();
                if emitter.sort_keys() {
                    pairs.sort_by(|a, b| self.scalar_key_text(a.key).cmp(&self.scalar_key_text(b.key)));
                }
                for pair in &pairs {
                    self.dump_node(pair.key, emitter)?;
                    self.dump_node(pair.value, emitter)?;
                }
                emitter.emit(Event::mapping_end())?;
            }
            NodeData::NoNode => {}
        }

        Ok(())
    }
}

fn slot_anchor_id(emitter: &mut Emitter, index: NodeItem) -> i32 {
    let slot = &mut emitter.anchors[index as usize - 1];
    if slot.anchor == 0 {
        emitter.last_anchor_id += 1;
        emitter.anchors[index as usize - 1].anchor = emitter.last_anchor_id;
    }
    emitter.anchors[index as usize - 1].anchor
}

fn generate_anchor(anchor_id: i32) -> String {
    format!("id{anchor_id:03}")
}

/// A node built without an explicit tag uses the document's default tag for
/// its kind, so its content decides whether that tag counted as "plain
/// implicit" (untyped scalar) or just "implicit" (untyped collection).
fn implicit_flags(tag: Option<&str>) -> (bool, bool) {
    let untagged = tag.is_none();
    (untagged, untagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MappingStyle, ScalarStyle, SequenceStyle};

    fn dump_to_string(doc: &Document) -> String {
        let mut output = Vec::new();
        let mut emitter = Emitter::new().with_output_string(&mut output);
        doc.dump(&mut emitter).unwrap();
        drop(emitter);
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn dumps_flat_mapping() {
        let mut doc = Document::new(None, &[], true, true);
        let mapping = doc.add_mapping(None, MappingStyle::Block);
        let key = doc.add_scalar(None, "a", ScalarStyle::Plain);
        let value = doc.add_scalar(None, "1", ScalarStyle::Plain);
        doc.append_mapping_pair(mapping, key, value);
        assert_eq!(dump_to_string(&doc), "a: 1\n");
    }

    #[test]
    fn shared_node_becomes_alias_on_second_reference() {
        let mut doc = Document::new(None, &[], true, true);
        let seq = doc.add_sequence(None, SequenceStyle::Flow);
        let shared = doc.add_scalar(None, "x", ScalarStyle::Plain);
        doc.append_sequence_item(seq, shared);
        doc.append_sequence_item(seq, shared);
        let text = dump_to_string(&doc);
        assert!(text.contains('&'), "expected an anchor in {text:?}");
        assert!(text.contains('*'), "expected an alias in {text:?}");
    }

    #[test]
    fn sort_keys_orders_mapping_pairs() {
        let mut doc = Document::new(None, &[], true, true);
        let mapping = doc.add_mapping(None, MappingStyle::Flow);
        for (k, v) in [("b", "2"), ("a", "1")] {
            let key = doc.add_scalar(None, k, ScalarStyle::Plain);
            let value = doc.add_scalar(None, v, ScalarStyle::Plain);
            doc.append_mapping_pair(mapping, key, value);
        }
        let mut output = Vec::new();
        let mut emitter = Emitter::new().with_output_string(&mut output).with_sort_keys(true);
        doc.dump(&mut emitter).unwrap();
        drop(emitter);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "{a: 1, b: 2}\n");
    }
}
