//! The document model: an in-memory node graph built from a parse (spec §4.5).
//!
//! Adapted from the teacher's `load_*` family almost verbatim. The anchor
//! table moves from a `Vec<AliasData>` scan on the parser to a
//! `HashMap<String, i32>` owned by the document being built — anchors are
//! scoped to a single document, not the whole stream. Composition still
//! uses a local table keyed by mark (to report where a name was last
//! defined); the name-to-node mapping it settles on is copied onto the
//! finished `Document` so later lookups (path `*name` references) don't
//! need a live parse in progress.

use std::collections::HashMap;

use crate::error::{ComposerError, Mark};
use crate::event::{Event, EventData};
use crate::parser::Parser;
use crate::{
    MappingStyle, ScalarStyle, SequenceStyle, TagDirective, VersionDirective, DEFAULT_MAPPING_TAG,
    DEFAULT_SCALAR_TAG, DEFAULT_SEQUENCE_TAG,
};

/// The document structure.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Document {
    /// The document nodes, 1-indexed via [`NodeItem`]/[`NodePair`].
    pub nodes: Vec<Node>,
    pub version_directive: Option<VersionDirective>,
    pub tag_directives: Vec<TagDirective>,
    pub start_implicit: bool,
    pub end_implicit: bool,
    pub start_mark: Mark,
    pub end_mark: Mark,
    /// Anchor name to node index, as last registered during `load` (spec
    /// §4.5: "later wins"). Kept on the document so `*name` path references
    /// (spec §4.8/§4.9) can resolve after the parse completes, not just
    /// during composition.
    anchors: HashMap<String, i32>,
}

/// The node structure.
#[derive(Clone, Default, Debug)]
#[non_exhaustive]
pub struct Node {
    pub data: NodeData,
    pub tag: Option<String>,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

/// Node types.
#[derive(Clone, Default, Debug)]
pub enum NodeData {
    #[default]
    NoNode,
    Scalar {
        value: String,
        style: ScalarStyle,
    },
    Sequence {
        items: Vec<NodeItem>,
        style: SequenceStyle,
    },
    Mapping {
        pairs: Vec<NodePair>,
        style: MappingStyle,
    },
}

/// A 1-based index into [`Document::nodes`].
pub type NodeItem = i32;

/// An element of a mapping node.
#[derive(Copy, Clone, Default, Debug)]
#[non_exhaustive]
pub struct NodePair {
    pub key: i32,
    pub value: i32,
}

impl Document {
    pub fn new(
        version_directive: Option<VersionDirective>,
        tag_directives_in: &[TagDirective],
        start_implicit: bool,
        end_implicit: bool,
    ) -> Document {
        Document {
            nodes: Vec::with_capacity(16),
            version_directive,
            tag_directives: tag_directives_in.to_vec(),
            start_implicit,
            end_implicit,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
            anchors: HashMap::new(),
        }
    }

    /// Look up an anchor by name (spec §4.8/§4.9 `*name` path operand).
    /// `None` if no node in this document ever defined that anchor.
    pub fn anchor(&self, name: &str) -> Option<NodeItem> {
        self.anchors.get(name).copied()
    }

    pub fn get_node(&self, index: i32) -> Option<&Node> {
        self.nodes.get(index as usize - 1)
    }

    pub fn get_node_mut(&mut self, index: i32) -> Option<&mut Node> {
        self.nodes.get_mut(index as usize - 1)
    }

    /// The root object: the first node added to the document. `None` for an
    /// empty document, which per spec §4.5 signals the end of the stream.
    pub fn get_root_node(&self) -> Option<&Node> {
        self.nodes.first()
    }

    #[must_use]
    pub fn add_scalar(&mut self, tag: Option<&str>, value: &str, style: ScalarStyle) -> i32 {
        let tag = Some(String::from(tag.unwrap_or(DEFAULT_SCALAR_TAG)));
        self.nodes.push(Node {
            data: NodeData::Scalar {
                value: String::from(value),
                style,
            },
            tag,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        });
        self.nodes.len() as i32
    }

    #[must_use]
    pub fn add_sequence(&mut self, tag: Option<&str>, style: SequenceStyle) -> i32 {
        let tag = Some(String::from(tag.unwrap_or(DEFAULT_SEQUENCE_TAG)));
        self.nodes.push(Node {
            data: NodeData::Sequence {
                items: Vec::with_capacity(16),
                style,
            },
            tag,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        });
        self.nodes.len() as i32
    }

    #[must_use]
    pub fn add_mapping(&mut self, tag: Option<&str>, style: MappingStyle) -> i32 {
        let tag = Some(String::from(tag.unwrap_or(DEFAULT_MAPPING_TAG)));
        self.nodes.push(Node {
            data: NodeData::Mapping {
                pairs: Vec::with_capacity(16),
                style,
            },
            tag,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        });
        self.nodes.len() as i32
    }

    pub fn append_sequence_item(&mut self, sequence: i32, item: i32) {
        assert!(sequence > 0 && sequence as usize - 1 < self.nodes.len());
        assert!(item > 0 && item as usize - 1 < self.nodes.len());
        if let NodeData::Sequence { items, .. } = &mut self.nodes[sequence as usize - 1].data {
            items.push(item);
        } else {
            panic!("node is not a sequence");
        }
    }

    pub fn append_mapping_pair(&mut self, mapping: i32, key: i32, value: i32) {
        assert!(mapping > 0 && mapping as usize - 1 < self.nodes.len());
        assert!(key > 0 && key as usize - 1 < self.nodes.len());
        assert!(value > 0 && value as usize - 1 < self.nodes.len());
        if let NodeData::Mapping { pairs, .. } = &mut self.nodes[mapping as usize - 1].data {
            pairs.push(NodePair { key, value });
        } else {
            panic!("node is not a mapping");
        }
    }

    /// Parse the input stream and produce the next document.
    ///
    /// An empty document with no root node signals the end of the stream
    /// (spec §4.5).
    pub fn load(parser: &mut Parser) -> Result<Document, ComposerError> {
        let mut document = Document::new(None, &[], false, false);

        if !parser.stream_start_produced() {
            match parser.parse()? {
                Event {
                    data: EventData::StreamStart { .. },
                    ..
                } => (),
                _ => panic!("expected <stream-start>"),
            }
        }
        if parser.stream_end_produced() {
            return Ok(document);
        }

        let event = parser.parse()?;
        if matches!(event.data, EventData::StreamEnd) {
            return Ok(document);
        }

        let mut anchors = HashMap::new();
        document.load_document(parser, event, &mut anchors)?;
        document.anchors = anchors.into_iter().map(|(name, (index, _))| (name, index)).collect();
        Ok(document)
    }

    fn load_document(
        &mut self,
        parser: &mut Parser,
        event: Event,
        anchors: &mut HashMap<String, (i32, Mark)>,
    ) -> Result<(), ComposerError> {
        let EventData::DocumentStart {
            version_directive,
            tag_directives,
            implicit,
        } = event.data
        else {
            panic!("expected <document-start>")
        };
        self.version_directive = version_directive;
        self.tag_directives = tag_directives;
        self.start_implicit = implicit;
        self.start_mark = event.start_mark;

        let mut ctx = Vec::with_capacity(16);
        self.load_nodes(parser, &mut ctx, anchors)
    }

    fn load_nodes(
        &mut self,
        parser: &mut Parser,
        ctx: &mut Vec<i32>,
        anchors: &mut HashMap<String, (i32, Mark)>,
    ) -> Result<(), ComposerError> {
        loop {
            let event = parser.parse()?;
            match event.data {
                EventData::DocumentEnd { implicit } => {
                    self.end_implicit = implicit;
                    self.end_mark = event.end_mark;
                    return Ok(());
                }
                EventData::Alias { .. } => self.load_alias(event, ctx, anchors)?,
                EventData::Scalar { .. } => self.load_scalar(event, ctx, anchors)?,
                EventData::SequenceStart { .. } => self.load_sequence(event, ctx, anchors)?,
                EventData::SequenceEnd => self.load_sequence_end(event, ctx)?,
                EventData::MappingStart { .. } => self.load_mapping(event, ctx, anchors)?,
                EventData::MappingEnd => self.load_mapping_end(event, ctx)?,
                EventData::StreamStart { .. } | EventData::StreamEnd | EventData::DocumentStart { .. } => {
                    panic!("unexpected event while loading document body")
                }
            }
        }
    }

    /// Associate `anchor` with `index`. A later definition of the same
    /// anchor name simply overwrites the table entry (spec.md §4.5: "later
    /// wins"); aliases already resolved against the earlier definition keep
    /// pointing at the earlier node, since resolution happens at the point
    /// an alias event is encountered, not retroactively.
    fn register_anchor(
        &self,
        index: i32,
        anchor: Option<String>,
        anchors: &mut HashMap<String, (i32, Mark)>,
    ) {
        let Some(anchor) = anchor else {
            return;
        };
        let mark = self.nodes[index as usize - 1].start_mark;
        anchors.insert(anchor, (index, mark));
    }

    fn load_node_add(&mut self, ctx: &[i32], index: i32) -> Result<(), ComposerError> {
        let Some(&parent_index) = ctx.last() else {
            return Ok(());
        };
        match &mut self.nodes[parent_index as usize - 1].data {
            NodeData::Sequence { items, .. } => items.push(index),
            NodeData::Mapping { pairs, .. } => {
                if let Some(pair) = pairs.last_mut() {
                    if pair.value == 0 {
                        pair.value = index;
                        return Ok(());
                    }
                }
                pairs.push(NodePair { key: index, value: 0 });
            }
            _ => panic!("document parent node is not a sequence or a mapping"),
        }
        Ok(())
    }

    fn load_alias(
        &mut self,
        event: Event,
        ctx: &[i32],
        anchors: &HashMap<String, (i32, Mark)>,
    ) -> Result<(), ComposerError> {
        let EventData::Alias { anchor } = &event.data else {
            unreachable!()
        };
        match anchors.get(anchor) {
            Some(&(index, _)) => self.load_node_add(ctx, index),
            None => Err(ComposerError::UndefinedAlias {
                anchor: anchor.clone(),
                mark: event.start_mark,
            }),
        }
    }

    fn load_scalar(
        &mut self,
        event: Event,
        ctx: &[i32],
        anchors: &mut HashMap<String, (i32, Mark)>,
    ) -> Result<(), ComposerError> {
        let EventData::Scalar {
            mut tag,
            value,
            style,
            anchor,
            ..
        } = event.data
        else {
            unreachable!()
        };
        if tag.is_none() || tag.as_deref() == Some("!") {
            tag = Some(String::from(DEFAULT_SCALAR_TAG));
        }
        self.nodes.push(Node {
            data: NodeData::Scalar { value, style },
            tag,
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        let index = self.nodes.len() as i32;
        self.register_anchor(index, anchor, anchors);
        self.load_node_add(ctx, index)
    }

    fn load_sequence(
        &mut self,
        event: Event,
        ctx: &mut Vec<i32>,
        anchors: &mut HashMap<String, (i32, Mark)>,
    ) -> Result<(), ComposerError> {
        let EventData::SequenceStart {
            anchor, mut tag, style, ..
        } = event.data
        else {
            unreachable!()
        };
        if tag.is_none() || tag.as_deref() == Some("!") {
            tag = Some(String::from(DEFAULT_SEQUENCE_TAG));
        }
        self.nodes.push(Node {
            data: NodeData::Sequence {
                items: Vec::with_capacity(16),
                style,
            },
            tag,
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        let index = self.nodes.len() as i32;
        self.register_anchor(index, anchor, anchors);
        self.load_node_add(ctx, index)?;
        ctx.push(index);
        Ok(())
    }

    fn load_sequence_end(&mut self, event: Event, ctx: &mut Vec<i32>) -> Result<(), ComposerError> {
        let index = ctx.pop().expect("sequence end without matching start");
        assert!(matches!(self.nodes[index as usize - 1].data, NodeData::Sequence { .. }));
        self.nodes[index as usize - 1].end_mark = event.end_mark;
        Ok(())
    }

    fn load_mapping(
        &mut self,
        event: Event,
        ctx: &mut Vec<i32>,
        anchors: &mut HashMap<String, (i32, Mark)>,
    ) -> Result<(), ComposerError> {
        let EventData::MappingStart {
            anchor, mut tag, style, ..
        } = event.data
        else {
            unreachable!()
        };
        if tag.is_none() || tag.as_deref() == Some("!") {
            tag = Some(String::from(DEFAULT_MAPPING_TAG));
        }
        self.nodes.push(Node {
            data: NodeData::Mapping {
                pairs: Vec::with_capacity(16),
                style,
            },
            tag,
            start_mark: event.start_mark,
            end_mark: event.end_mark,
        });
        let index = self.nodes.len() as i32;
        self.register_anchor(index, anchor, anchors);
        self.load_node_add(ctx, index)?;
        ctx.push(index);
        Ok(())
    }

    fn load_mapping_end(&mut self, event: Event, ctx: &mut Vec<i32>) -> Result<(), ComposerError> {
        let index = ctx.pop().expect("mapping end without matching start");
        assert!(matches!(self.nodes[index as usize - 1].data, NodeData::Mapping { .. }));
        self.nodes[index as usize - 1].end_mark = event.end_mark;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;

    fn load_one(src: &str) -> Document {
        let mut parser = Parser::new(Input::from_str("t", src));
        Document::load(&mut parser).unwrap()
    }

    #[test]
    fn loads_scalar_document() {
        let doc = load_one("hello\n");
        let root = doc.get_root_node().unwrap();
        assert!(matches!(&root.data, NodeData::Scalar { value, .. } if value == "hello"));
    }

    #[test]
    fn loads_mapping_with_anchor_and_alias() {
        let doc = load_one("a: &x 1\nb: *x\n");
        let root = doc.get_root_node().unwrap();
        let NodeData::Mapping { pairs, .. } = &root.data else {
            panic!("expected mapping");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].value, pairs[1].value);
    }

    #[test]
    fn duplicate_anchor_lets_later_definition_win() {
        let mut parser = Parser::new(Input::from_str("t", "[&x 1, &x 2, *x]\n"));
        let doc = Document::load(&mut parser).unwrap();
        let root = doc.get_root_node().unwrap();
        let NodeData::Sequence { items, .. } = &root.data else {
            panic!("expected sequence");
        };
        // The alias resolves to the second (later) anchor definition.
        assert_eq!(items[2], items[1]);
    }

    #[test]
    fn anchor_lookup_survives_after_load() {
        let doc = load_one("a: &x 1\nb: *x\n");
        let root = doc.get_root_node().unwrap();
        let NodeData::Mapping { pairs, .. } = &root.data else {
            panic!("expected mapping");
        };
        assert_eq!(doc.anchor("x"), Some(pairs[0].value));
        assert_eq!(doc.anchor("missing"), None);
    }

    #[test]
    fn undefined_alias_is_an_error() {
        let mut parser = Parser::new(Input::from_str("t", "*missing\n"));
        assert!(Document::load(&mut parser).is_err());
    }
}
