//! The emitter: turns an event stream (or a whole [`Document`](crate::Document))
//! back into YAML or JSON text (spec.md §4.7).
//!
//! `Emitter::emit` is the low-level entry point; it buffers just enough
//! lookahead to know whether a sequence/mapping needs to be empty-collapsed
//! before committing to block or flow layout, then drives a state machine
//! shaped the same way `Parser`'s is (`states`/`state`, push/pop on
//! container boundaries). `Document::dump` (see `dumper.rs`) feeds this from
//! a whole tree, re-deriving anchors for nodes that are referenced more than
//! once.

use std::collections::VecDeque;
use std::io::Write;

use crate::error::{EmitterError, WriterError};
use crate::event::{Event, EventData};
use crate::{Break, Encoding, MappingStyle, ScalarStyle, SequenceStyle, TagDirective, VersionDirective};

pub(crate) const OUTPUT_BUFFER_SIZE: usize = 16384;

use crate::macros::{is_alpha, is_blank, is_blankz, is_break, is_breakz, is_printable, is_space};

fn is_bom(ch: char) -> bool {
    ch == '\u{feff}'
}

/// Output container-style mode (spec.md §4.7's `Mode` column).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum EmitterMode {
    /// Block style by default, flow only where an event demands it.
    #[default]
    Block,
    /// Flow style throughout, still wrapped across multiple lines.
    Flow,
    /// Flow style, never wrapped onto more than one line.
    FlowOneline,
    /// JSON: double-quoted strings, bare `null`/`true`/`false`/numbers, flow-only.
    Json,
    /// JSON with non-core tags preserved where `output_comments` allows it.
    ///
    /// Open decision (not pinned by spec.md's Mode table): treated identically
    /// to `Json` for style selection; see DESIGN.md.
    JsonTp,
    /// JSON, never wrapped onto more than one line.
    JsonOneline,
}

impl EmitterMode {
    fn is_json(self) -> bool {
        matches!(
            self,
            EmitterMode::Json | EmitterMode::JsonTp | EmitterMode::JsonOneline
        )
    }

    fn is_flow(self) -> bool {
        matches!(
            self,
            EmitterMode::Flow | EmitterMode::FlowOneline | EmitterMode::Json | EmitterMode::JsonTp | EmitterMode::JsonOneline
        )
    }

    fn is_oneline(self) -> bool {
        matches!(self, EmitterMode::FlowOneline | EmitterMode::JsonOneline)
    }
}

/// auto/on/off tri-state for the directive-emission options in spec.md §4.7's table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum DirectiveEmit {
    /// Emit the directive/marker only when the event says it is not implicit.
    #[default]
    Auto,
    /// Always emit it.
    On,
    /// Never emit it.
    Off,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum EmitterState {
    #[default]
    StreamStart,
    FirstDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    FlowSequenceFirstItem,
    FlowSequenceItem,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingSimpleValue,
    FlowMappingValue,
    BlockSequenceFirstItem,
    BlockSequenceItem,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingSimpleValue,
    BlockMappingValue,
    End,
}

#[derive(Default)]
struct Analysis<'a> {
    anchor: Option<AnchorAnalysis<'a>>,
    tag: Option<TagAnalysis<'a>>,
    scalar: Option<ScalarAnalysis<'a>>,
}

struct AnchorAnalysis<'a> {
    anchor: &'a str,
    alias: bool,
}

struct TagAnalysis<'a> {
    handle: &'a str,
    suffix: &'a str,
}

struct ScalarAnalysis<'a> {
    value: &'a str,
    multiline: bool,
    flow_plain_allowed: bool,
    block_plain_allowed: bool,
    single_quoted_allowed: bool,
    block_allowed: bool,
    style: ScalarStyle,
}

/// Converts an event stream, or a whole document, into text.
///
/// Construct with [`Emitter::new`], point it at a sink with
/// [`Emitter::with_output`]/[`Emitter::with_output_string`], then feed it
/// events with [`Emitter::emit`] (or use [`crate::Document::dump`] for the
/// tree-based entry point).
pub struct Emitter<'w> {
    pub(crate) write_handler: Option<&'w mut dyn Write>,
    pub(crate) buffer: String,
    pub(crate) raw_buffer: Vec<u8>,
    pub(crate) encoding: Encoding,

    canonical: bool,
    mode: EmitterMode,
    best_indent: i32,
    best_width: i32,
    unicode: bool,
    pub(crate) line_break: Break,
    sort_keys: bool,
    strip_tags: bool,
    strip_labels: bool,
    #[allow(dead_code)]
    strip_comments: bool,
    #[allow(dead_code)]
    output_comments: bool,
    version_directive_emit: DirectiveEmit,
    tag_directives_emit: DirectiveEmit,
    document_marks_emit: DirectiveEmit,

    states: Vec<EmitterState>,
    state: EmitterState,
    events: VecDeque<Event>,
    indents: Vec<i32>,
    tag_directives: Vec<TagDirective>,
    indent: i32,
    flow_level: i32,

    root_context: bool,
    sequence_context: bool,
    mapping_context: bool,
    simple_key_context: bool,

    pub(crate) line: i32,
    pub(crate) column: i32,
    whitespace: bool,
    indention: bool,
    open_ended: i32,

    opened: bool,
    closed: bool,

    pub(crate) anchors: Vec<AnchorState>,
    pub(crate) last_anchor_id: i32,
}

/// Per-node bookkeeping `Document::dump` uses to decide whether a node needs
/// a generated anchor (referenced more than once) and whether it has already
/// been serialized (so later references become an alias).
#[derive(Default, Clone, Copy)]
pub(crate) struct AnchorState {
    pub(crate) references: i32,
    pub(crate) anchor: i32,
    pub(crate) serialized: bool,
}

impl<'w> Emitter<'w> {
    pub fn new() -> Self {
        Emitter {
            write_handler: None,
            buffer: String::with_capacity(OUTPUT_BUFFER_SIZE),
            raw_buffer: Vec::with_capacity(OUTPUT_BUFFER_SIZE),
            encoding: Encoding::Any,
            canonical: false,
            mode: EmitterMode::default(),
            best_indent: 0,
            best_width: 0,
            unicode: false,
            line_break: Break::default(),
            sort_keys: false,
            strip_tags: false,
            strip_labels: false,
            strip_comments: false,
            output_comments: false,
            version_directive_emit: DirectiveEmit::default(),
            tag_directives_emit: DirectiveEmit::default(),
            document_marks_emit: DirectiveEmit::default(),
            states: Vec::with_capacity(16),
            state: EmitterState::default(),
            events: VecDeque::with_capacity(16),
            indents: Vec::with_capacity(16),
            tag_directives: Vec::with_capacity(16),
            indent: 0,
            flow_level: 0,
            root_context: false,
            sequence_context: false,
            mapping_context: false,
            simple_key_context: false,
            line: 0,
            column: 0,
            whitespace: false,
            indention: false,
            open_ended: 0,
            opened: false,
            closed: false,
            anchors: Vec::new(),
            last_anchor_id: 0,
        }
    }

    /// Write the output to `output`, appending UTF-8 bytes (the only
    /// encoding a `Vec<u8>`/`String`-backed sink supports).
    pub fn with_output_string(mut self, output: &'w mut Vec<u8>) -> Self {
        assert!(self.write_handler.is_none());
        if self.encoding == Encoding::Any {
            self.encoding = Encoding::Utf8;
        } else if self.encoding != Encoding::Utf8 {
            panic!("cannot output UTF-16 to a byte buffer");
        }
        output.clear();
        self.write_handler = Some(output);
        self
    }

    pub fn with_output(mut self, handler: &'w mut dyn Write) -> Self {
        assert!(self.write_handler.is_none());
        self.write_handler = Some(handler);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        assert_eq!(self.encoding, Encoding::Any);
        self.encoding = encoding;
        self
    }

    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    pub fn with_mode(mut self, mode: EmitterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_indent(mut self, indent: i32) -> Self {
        self.best_indent = if indent > 1 && indent < 10 { indent } else { 2 };
        self
    }

    /// `width < 0` means unlimited.
    pub fn with_width(mut self, width: i32) -> Self {
        self.best_width = if width >= 0 { width } else { -1 };
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    pub fn with_break(mut self, line_break: Break) -> Self {
        self.line_break = line_break;
        self
    }

    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_strip_tags(mut self, strip_tags: bool) -> Self {
        self.strip_tags = strip_tags;
        self
    }

    pub fn with_strip_labels(mut self, strip_labels: bool) -> Self {
        self.strip_labels = strip_labels;
        self
    }

    pub fn with_strip_comments(mut self, strip_comments: bool) -> Self {
        self.strip_comments = strip_comments;
        self
    }

    pub fn with_output_comments(mut self, output_comments: bool) -> Self {
        self.output_comments = output_comments;
        self
    }

    pub fn with_version_directive_emit(mut self, setting: DirectiveEmit) -> Self {
        self.version_directive_emit = setting;
        self
    }

    pub fn with_tag_directives_emit(mut self, setting: DirectiveEmit) -> Self {
        self.tag_directives_emit = setting;
        self
    }

    pub fn with_document_marks_emit(mut self, setting: DirectiveEmit) -> Self {
        self.document_marks_emit = setting;
        self
    }

    pub(crate) fn sort_keys(&self) -> bool {
        self.sort_keys
    }

    fn set_emitter_error<T>(&self, problem: &'static str) -> Result<T, EmitterError> {
        Err(EmitterError::Problem(problem))
    }

    // ---- low-level output -------------------------------------------------

    fn flush_if_full(&mut self) -> Result<(), WriterError> {
        if self.buffer.len() < OUTPUT_BUFFER_SIZE - 5 {
            Ok(())
        } else {
            self.flush()
        }
    }

    fn put(&mut self, value: u8) -> Result<(), WriterError> {
        self.flush_if_full()?;
        self.buffer.push(char::from(value));
        self.column += 1;
        Ok(())
    }

    fn put_break(&mut self) -> Result<(), WriterError> {
        self.flush_if_full()?;
        match self.line_break {
            Break::Cr => self.buffer.push('\r'),
            Break::CrLn => self.buffer.push_str("\r\n"),
            Break::Any | Break::Ln => self.buffer.push('\n'),
        }
        self.column = 0;
        self.line += 1;
        Ok(())
    }

    fn write_str(&mut self, string: &str) -> Result<(), WriterError> {
        for ch in string.chars() {
            self.write_char(ch)?;
        }
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> Result<(), WriterError> {
        self.flush_if_full()?;
        self.buffer.push(ch);
        self.column += 1;
        Ok(())
    }

    fn write_break_char(&mut self, ch: char) -> Result<(), WriterError> {
        self.flush_if_full()?;
        if ch == '\n' {
            self.put_break()?;
        } else {
            self.write_char(ch)?;
            self.column = 0;
            self.line += 1;
        }
        Ok(())
    }

    // ---- public entry point ------------------------------------------------

    /// Queue `event` and drive the state machine as far as the buffered
    /// lookahead allows (spec.md §4.7's event-based entry point).
    pub fn emit(&mut self, event: Event) -> Result<(), EmitterError> {
        self.events.push_back(event);
        while let Some(event) = self.needs_more_events() {
            let tag_directives = std::mem::take(&mut self.tag_directives);

            let mut analysis = self.analyze_event(&event, &tag_directives)?;
            self.state_machine(&event, &mut analysis)?;

            // DOCUMENT-START populates the tag directives once; don't clobber
            // them with the stale pre-event snapshot.
            if self.tag_directives.is_empty() {
                self.tag_directives = tag_directives;
            }
        }
        Ok(())
    }

    fn needs_more_events(&mut self) -> Option<Event> {
        let first = self.events.front()?;

        let accumulate = match &first.data {
            EventData::DocumentStart { .. } => 1,
            EventData::SequenceStart { .. } => 2,
            EventData::MappingStart { .. } => 3,
            _ => return self.events.pop_front(),
        };

        if self.events.len() > accumulate {
            return self.events.pop_front();
        }

        let mut level = 0;
        for event in &self.events {
            match event.data {
                EventData::StreamStart { .. }
                | EventData::DocumentStart { .. }
                | EventData::SequenceStart { .. }
                | EventData::MappingStart { .. } => {
                    level += 1;
                }
                EventData::StreamEnd
                | EventData::DocumentEnd { .. }
                | EventData::SequenceEnd
                | EventData::MappingEnd => {
                    level -= 1;
                }
                _ => {}
            }
            if level == 0 {
                return self.events.pop_front();
            }
        }

        None
    }

    fn append_tag_directive(
        &mut self,
        value: TagDirective,
        allow_duplicates: bool,
    ) -> Result<(), EmitterError> {
        for tag_directive in &self.tag_directives {
            if value.handle == tag_directive.handle {
                if allow_duplicates {
                    return Ok(());
                }
                return self.set_emitter_error("duplicate %TAG directive");
            }
        }
        self.tag_directives.push(value);
        Ok(())
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        if self.indent < 0 {
            self.indent = if flow { self.best_indent } else { 0 };
        } else if !indentless {
            self.indent += self.best_indent;
        }
    }

    fn state_machine<'a>(
        &mut self,
        event: &'a Event,
        analysis: &mut Analysis<'a>,
    ) -> Result<(), EmitterError> {
        match self.state {
            EmitterState::StreamStart => self.emit_stream_start(event),
            EmitterState::FirstDocumentStart => self.emit_document_start(event, true),
            EmitterState::DocumentStart => self.emit_document_start(event, false),
            EmitterState::DocumentContent => self.emit_document_content(event, analysis),
            EmitterState::DocumentEnd => self.emit_document_end(event),
            EmitterState::FlowSequenceFirstItem => self.emit_flow_sequence_item(event, true, analysis),
            EmitterState::FlowSequenceItem => self.emit_flow_sequence_item(event, false, analysis),
            EmitterState::FlowMappingFirstKey => self.emit_flow_mapping_key(event, true, analysis),
            EmitterState::FlowMappingKey => self.emit_flow_mapping_key(event, false, analysis),
            EmitterState::FlowMappingSimpleValue => self.emit_flow_mapping_value(event, true, analysis),
            EmitterState::FlowMappingValue => self.emit_flow_mapping_value(event, false, analysis),
            EmitterState::BlockSequenceFirstItem => self.emit_block_sequence_item(event, true, analysis),
            EmitterState::BlockSequenceItem => self.emit_block_sequence_item(event, false, analysis),
            EmitterState::BlockMappingFirstKey => self.emit_block_mapping_key(event, true, analysis),
            EmitterState::BlockMappingKey => self.emit_block_mapping_key(event, false, analysis),
            EmitterState::BlockMappingSimpleValue => self.emit_block_mapping_value(event, true, analysis),
            EmitterState::BlockMappingValue => self.emit_block_mapping_value(event, false, analysis),
            EmitterState::End => self.set_emitter_error("expected nothing after STREAM-END"),
        }
    }

    fn emit_stream_start(&mut self, event: &Event) -> Result<(), EmitterError> {
        self.open_ended = 0;
        if let EventData::StreamStart { encoding } = &event.data {
            if self.encoding == Encoding::Any {
                self.encoding = *encoding;
            }
            if self.encoding == Encoding::Any {
                self.encoding = Encoding::Utf8;
            }
            if self.best_indent < 2 || self.best_indent > 9 {
                self.best_indent = 2;
            }
            if self.best_width >= 0 && self.best_width <= self.best_indent * 2 {
                self.best_width = 80;
            }
            if self.best_width < 0 {
                self.best_width = i32::MAX;
            }
            if self.line_break == Break::Any {
                self.line_break = Break::Ln;
            }
            self.indent = -1;
            self.line = 0;
            self.column = 0;
            self.whitespace = true;
            self.indention = true;
            if self.encoding != Encoding::Utf8 {
                self.write_bom()?;
            }
            self.state = EmitterState::FirstDocumentStart;
            return Ok(());
        }
        self.set_emitter_error("expected STREAM-START")
    }

    fn emit_document_start(&mut self, event: &Event, first: bool) -> Result<(), EmitterError> {
        if let EventData::DocumentStart {
            version_directive,
            tag_directives,
            implicit,
        } = &event.data
        {
            let default_tag_directives: [TagDirective; 2] = [
                TagDirective {
                    handle: String::from("!"),
                    prefix: String::from("!"),
                },
                TagDirective {
                    handle: String::from("!!"),
                    prefix: String::from("tag:yaml.org,2002:"),
                },
            ];
            let mut implicit = *implicit && self.document_marks_emit != DirectiveEmit::On;
            if self.document_marks_emit == DirectiveEmit::Off {
                implicit = true;
            }
            if let Some(version_directive) = version_directive {
                self.analyze_version_directive(*version_directive)?;
            }
            for tag_directive in tag_directives {
                self.analyze_tag_directive(tag_directive)?;
                self.append_tag_directive(tag_directive.clone(), false)?;
            }
            for tag_directive in default_tag_directives {
                self.append_tag_directive(tag_directive, true)?;
            }
            if !first || self.canonical {
                implicit = false;
            }
            if (version_directive.is_some() || !tag_directives.is_empty()) && self.open_ended != 0 {
                self.write_indicator("...", true, false, false)?;
                self.write_indent()?;
            }
            self.open_ended = 0;
            let emit_version = version_directive.is_some() && self.version_directive_emit != DirectiveEmit::Off
                || self.version_directive_emit == DirectiveEmit::On;
            if let Some(version_directive) = version_directive.filter(|_| emit_version) {
                implicit = false;
                self.write_indicator("%YAML", true, false, false)?;
                if version_directive.minor == 1 {
                    self.write_indicator("1.1", true, false, false)?;
                } else {
                    self.write_indicator("1.2", true, false, false)?;
                }
                self.write_indent()?;
            }
            let emit_tags = !tag_directives.is_empty() && self.tag_directives_emit != DirectiveEmit::Off
                || self.tag_directives_emit == DirectiveEmit::On;
            if emit_tags && !tag_directives.is_empty() {
                implicit = false;
                for tag_directive in tag_directives {
                    self.write_indicator("%TAG", true, false, false)?;
                    self.write_tag_handle(&tag_directive.handle)?;
                    self.write_tag_content(&tag_directive.prefix, true)?;
                    self.write_indent()?;
                }
            }
            if self.check_empty_document() {
                implicit = false;
            }
            if !implicit {
                self.write_indent()?;
                self.write_indicator("---", true, false, false)?;
                if self.canonical {
                    self.write_indent()?;
                }
            }
            self.state = EmitterState::DocumentContent;
            self.open_ended = 0;
            return Ok(());
        } else if let EventData::StreamEnd = &event.data {
            if self.open_ended == 2 {
                self.write_indicator("...", true, false, false)?;
                self.open_ended = 0;
                self.write_indent()?;
            }
            self.flush()?;
            self.state = EmitterState::End;
            return Ok(());
        }

        self.set_emitter_error("expected DOCUMENT-START or STREAM-END")
    }

    fn emit_document_content(
        &mut self,
        event: &Event,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        self.states.push(EmitterState::DocumentEnd);
        self.emit_node(event, true, false, false, false, analysis)
    }

    fn emit_document_end(&mut self, event: &Event) -> Result<(), EmitterError> {
        if let EventData::DocumentEnd { implicit } = &event.data {
            let mut implicit = *implicit;
            if self.document_marks_emit == DirectiveEmit::On {
                implicit = false;
            } else if self.document_marks_emit == DirectiveEmit::Off {
                implicit = true;
            }
            self.write_indent()?;
            if !implicit {
                self.write_indicator("...", true, false, false)?;
                self.open_ended = 0;
                self.write_indent()?;
            } else if self.open_ended == 0 {
                self.open_ended = 1;
            }
            self.flush()?;
            self.state = EmitterState::DocumentStart;
            self.tag_directives.clear();
            return Ok(());
        }

        self.set_emitter_error("expected DOCUMENT-END")
    }

    fn emit_flow_sequence_item(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.write_indicator("[", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if let EventData::SequenceEnd = &event.data {
            self.flow_level -= 1;
            self.indent = self.indents.pop().unwrap();
            if self.canonical && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("]", false, false, false)?;
            self.state = self.states.pop().unwrap();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if !self.mode.is_oneline() && (self.canonical || self.column > self.best_width) {
            self.write_indent()?;
        }
        self.states.push(EmitterState::FlowSequenceItem);
        self.emit_node(event, false, true, false, false, analysis)
    }

    fn emit_flow_mapping_key(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.write_indicator("{", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if let EventData::MappingEnd = &event.data {
            assert!(!self.indents.is_empty(), "indents should not be empty");
            self.flow_level -= 1;
            self.indent = self.indents.pop().unwrap();
            if self.canonical && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("}", false, false, false)?;
            self.state = self.states.pop().unwrap();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if !self.mode.is_oneline() && (self.canonical || self.column > self.best_width) {
            self.write_indent()?;
        }
        if !self.canonical && !self.mode.is_json() && self.check_simple_key(event, analysis) {
            self.states.push(EmitterState::FlowMappingSimpleValue);
            self.emit_node(event, false, false, true, true, analysis)
        } else {
            self.write_indicator("?", true, false, false)?;
            self.states.push(EmitterState::FlowMappingValue);
            self.emit_node(event, false, false, true, false, analysis)
        }
    }

    fn emit_flow_mapping_value(
        &mut self,
        event: &Event,
        simple: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            if !self.mode.is_oneline() && (self.canonical || self.column > self.best_width) {
                self.write_indent()?;
            }
            self.write_indicator(":", true, false, false)?;
        }
        self.states.push(EmitterState::FlowMappingKey);
        self.emit_node(event, false, false, true, false, analysis)
    }

    fn emit_block_sequence_item(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.increase_indent(false, self.mapping_context && !self.indention);
        }
        if let EventData::SequenceEnd = &event.data {
            self.indent = self.indents.pop().unwrap();
            self.state = self.states.pop().unwrap();
            return Ok(());
        }
        self.write_indent()?;
        self.write_indicator("-", true, false, true)?;
        self.states.push(EmitterState::BlockSequenceItem);
        self.emit_node(event, false, true, false, false, analysis)
    }

    fn emit_block_mapping_key(
        &mut self,
        event: &Event,
        first: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if first {
            self.increase_indent(false, false);
        }
        if let EventData::MappingEnd = &event.data {
            self.indent = self.indents.pop().unwrap();
            self.state = self.states.pop().unwrap();
            return Ok(());
        }
        self.write_indent()?;
        if self.check_simple_key(event, analysis) {
            self.states.push(EmitterState::BlockMappingSimpleValue);
            self.emit_node(event, false, false, true, true, analysis)
        } else {
            self.write_indicator("?", true, false, true)?;
            self.states.push(EmitterState::BlockMappingValue);
            self.emit_node(event, false, false, true, false, analysis)
        }
    }

    fn emit_block_mapping_value(
        &mut self,
        event: &Event,
        simple: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        if simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            self.write_indent()?;
            self.write_indicator(":", true, false, true)?;
        }
        self.states.push(EmitterState::BlockMappingKey);
        self.emit_node(event, false, false, true, false, analysis)
    }

    fn emit_node(
        &mut self,
        event: &Event,
        root: bool,
        sequence: bool,
        mapping: bool,
        simple_key: bool,
        analysis: &mut Analysis,
    ) -> Result<(), EmitterError> {
        self.root_context = root;
        self.sequence_context = sequence;
        self.mapping_context = mapping;
        self.simple_key_context = simple_key;

        match event.data {
            EventData::Alias { .. } => self.emit_alias(&analysis.anchor),
            EventData::Scalar { .. } => self.emit_scalar(event, analysis),
            EventData::SequenceStart { .. } => self.emit_sequence_start(event, analysis),
            EventData::MappingStart { .. } => self.emit_mapping_start(event, analysis),
            _ => self.set_emitter_error("expected SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS"),
        }
    }

    fn emit_alias(&mut self, analysis: &Option<AnchorAnalysis>) -> Result<(), EmitterError> {
        self.process_anchor(analysis)?;
        if self.simple_key_context {
            self.put(b' ')?;
        }
        self.state = self.states.pop().unwrap();
        Ok(())
    }

    fn emit_scalar(&mut self, event: &Event, analysis: &mut Analysis) -> Result<(), EmitterError> {
        let Analysis {
            anchor,
            tag,
            scalar: Some(scalar),
        } = analysis
        else {
            unreachable!("no scalar analysis");
        };

        self.select_scalar_style(event, scalar, tag)?;
        self.process_anchor(anchor)?;
        self.process_tag(tag)?;
        self.increase_indent(true, false);
        self.process_scalar(scalar)?;
        self.indent = self.indents.pop().unwrap();
        self.state = self.states.pop().unwrap();
        Ok(())
    }

    fn emit_sequence_start(&mut self, event: &Event, analysis: &Analysis) -> Result<(), EmitterError> {
        let Analysis { anchor, tag, .. } = analysis;
        self.process_anchor(anchor)?;
        self.process_tag(tag)?;

        let style = if let EventData::SequenceStart { style, .. } = &event.data {
            *style
        } else {
            unreachable!()
        };

        if self.flow_level != 0
            || self.canonical
            || self.mode.is_flow()
            || style == SequenceStyle::Flow
            || self.check_empty_sequence(event)
        {
            self.state = EmitterState::FlowSequenceFirstItem;
        } else {
            self.state = EmitterState::BlockSequenceFirstItem;
        };
        Ok(())
    }

    fn emit_mapping_start(&mut self, event: &Event, analysis: &Analysis) -> Result<(), EmitterError> {
        let Analysis { anchor, tag, .. } = analysis;
        self.process_anchor(anchor)?;
        self.process_tag(tag)?;

        let style = if let EventData::MappingStart { style, .. } = &event.data {
            *style
        } else {
            unreachable!()
        };

        if self.flow_level != 0
            || self.canonical
            || self.mode.is_flow()
            || style == MappingStyle::Flow
            || self.check_empty_mapping(event)
        {
            self.state = EmitterState::FlowMappingFirstKey;
        } else {
            self.state = EmitterState::BlockMappingFirstKey;
        }
        Ok(())
    }

    fn check_empty_document(&self) -> bool {
        false
    }

    fn check_empty_sequence(&self, event: &Event) -> bool {
        if self.events.is_empty() {
            return false;
        }
        let start = matches!(event.data, EventData::SequenceStart { .. });
        let end = matches!(self.events[0].data, EventData::SequenceEnd);
        start && end
    }

    fn check_empty_mapping(&self, event: &Event) -> bool {
        if self.events.is_empty() {
            return false;
        }
        let start = matches!(event.data, EventData::MappingStart { .. });
        let end = matches!(self.events[0].data, EventData::MappingEnd);
        start && end
    }

    fn check_simple_key(&self, event: &Event, analysis: &Analysis) -> bool {
        let Analysis { tag, anchor, scalar } = analysis;

        let mut length = anchor.as_ref().map_or(0, |a| a.anchor.len())
            + tag.as_ref().map_or(0, |t| t.handle.len() + t.suffix.len());

        match event.data {
            EventData::Alias { .. } => {
                length = analysis.anchor.as_ref().map_or(0, |a| a.anchor.len());
            }
            EventData::Scalar { .. } => {
                let Some(scalar) = scalar else {
                    panic!("no analysis for scalar")
                };
                if scalar.multiline {
                    return false;
                }
                length += scalar.value.len();
            }
            EventData::SequenceStart { .. } => {
                if !self.check_empty_sequence(event) {
                    return false;
                }
            }
            EventData::MappingStart { .. } => {
                if !self.check_empty_mapping(event) {
                    return false;
                }
            }
            _ => return false,
        }

        length <= 128
    }

    fn select_scalar_style(
        &mut self,
        event: &Event,
        scalar_analysis: &mut ScalarAnalysis,
        tag_analysis: &mut Option<TagAnalysis>,
    ) -> Result<(), EmitterError> {
        if let EventData::Scalar {
            plain_implicit,
            quoted_implicit,
            style,
            ..
        } = &event.data
        {
            let mut style: ScalarStyle = *style;
            let no_tag = tag_analysis.is_none();
            if no_tag && !*plain_implicit && !*quoted_implicit {
                self.set_emitter_error("neither tag nor implicit flags are specified")?;
            }
            if style == ScalarStyle::Any {
                style = ScalarStyle::Plain;
            }
            if self.canonical {
                style = ScalarStyle::DoubleQuoted;
            }
            if self.simple_key_context && scalar_analysis.multiline {
                style = ScalarStyle::DoubleQuoted;
            }
            if self.mode.is_json() {
                if style == ScalarStyle::Plain && !is_json_bare_value(scalar_analysis.value) {
                    style = ScalarStyle::DoubleQuoted;
                } else if style != ScalarStyle::Plain {
                    style = ScalarStyle::DoubleQuoted;
                }
                if self.strip_tags {
                    *tag_analysis = None;
                }
                scalar_analysis.style = style;
                return Ok(());
            }
            if style == ScalarStyle::Plain {
                if self.flow_level != 0 && !scalar_analysis.flow_plain_allowed
                    || self.flow_level == 0 && !scalar_analysis.block_plain_allowed
                {
                    style = ScalarStyle::SingleQuoted;
                }
                if scalar_analysis.value.is_empty()
                    && (self.flow_level != 0 || self.simple_key_context)
                {
                    style = ScalarStyle::SingleQuoted;
                }
                if no_tag && !*plain_implicit {
                    style = ScalarStyle::SingleQuoted;
                }
            }
            if style == ScalarStyle::SingleQuoted && !scalar_analysis.single_quoted_allowed {
                style = ScalarStyle::DoubleQuoted;
            }
            if (style == ScalarStyle::Literal || style == ScalarStyle::Folded)
                && (!scalar_analysis.block_allowed || self.flow_level != 0 || self.simple_key_context)
            {
                style = ScalarStyle::DoubleQuoted;
            }
            if no_tag && !*quoted_implicit && style != ScalarStyle::Plain {
                *tag_analysis = Some(TagAnalysis { handle: "!", suffix: "" });
            }
            if self.strip_tags {
                *tag_analysis = None;
            }
            scalar_analysis.style = style;
            Ok(())
        } else {
            unreachable!()
        }
    }

    fn process_anchor(&mut self, analysis: &Option<AnchorAnalysis>) -> Result<(), EmitterError> {
        if self.strip_labels {
            return Ok(());
        }
        let Some(analysis) = analysis.as_ref() else {
            return Ok(());
        };
        self.write_indicator(if analysis.alias { "*" } else { "&" }, true, false, false)?;
        self.write_anchor(analysis.anchor)
    }

    fn process_tag(&mut self, analysis: &Option<TagAnalysis>) -> Result<(), EmitterError> {
        let Some(analysis) = analysis.as_ref() else {
            return Ok(());
        };
        if analysis.handle.is_empty() && analysis.suffix.is_empty() {
            return Ok(());
        }
        if analysis.handle.is_empty() {
            self.write_indicator("!<", true, false, false)?;
            self.write_tag_content(analysis.suffix, false)?;
            self.write_indicator(">", false, false, false)?;
        } else {
            self.write_tag_handle(analysis.handle)?;
            if !analysis.suffix.is_empty() {
                self.write_tag_content(analysis.suffix, false)?;
            }
        }
        Ok(())
    }

    fn process_scalar(&mut self, analysis: &ScalarAnalysis) -> Result<(), EmitterError> {
        match analysis.style {
            ScalarStyle::Plain => self.write_plain_scalar(analysis.value, !self.simple_key_context),
            ScalarStyle::SingleQuoted => {
                self.write_single_quoted_scalar(analysis.value, !self.simple_key_context)
            }
            ScalarStyle::DoubleQuoted => {
                self.write_double_quoted_scalar(analysis.value, !self.simple_key_context)
            }
            ScalarStyle::Literal => self.write_literal_scalar(analysis.value),
            ScalarStyle::Folded => self.write_folded_scalar(analysis.value),
            ScalarStyle::Any => unreachable!("no scalar style chosen"),
        }
    }

    fn analyze_version_directive(
        &mut self,
        version_directive: VersionDirective,
    ) -> Result<(), EmitterError> {
        if version_directive.major != 1 || (version_directive.minor != 1 && version_directive.minor != 2) {
            return self.set_emitter_error("incompatible %YAML directive");
        }
        Ok(())
    }

    fn analyze_tag_directive(&mut self, tag_directive: &TagDirective) -> Result<(), EmitterError> {
        if tag_directive.handle.is_empty() {
            return self.set_emitter_error("tag handle must not be empty");
        }
        if !tag_directive.handle.starts_with('!') {
            return self.set_emitter_error("tag handle must start with '!'");
        }
        if !tag_directive.handle.ends_with('!') {
            return self.set_emitter_error("tag handle must end with '!'");
        }
        if tag_directive.handle.len() > 2 {
            let tag_content = &tag_directive.handle[1..tag_directive.handle.len() - 1];
            for ch in tag_content.chars() {
                if !is_alpha(ch) {
                    return self.set_emitter_error("tag handle must contain alphanumerical characters only");
                }
            }
        }
        if tag_directive.prefix.is_empty() {
            return self.set_emitter_error("tag prefix must not be empty");
        }
        Ok(())
    }

    fn analyze_anchor<'a>(&mut self, anchor: &'a str, alias: bool) -> Result<AnchorAnalysis<'a>, EmitterError> {
        if anchor.is_empty() {
            self.set_emitter_error(if alias {
                "alias value must not be empty"
            } else {
                "anchor value must not be empty"
            })?;
        }
        for ch in anchor.chars() {
            if !is_alpha(ch) {
                self.set_emitter_error(if alias {
                    "alias value must contain alphanumerical characters only"
                } else {
                    "anchor value must contain alphanumerical characters only"
                })?;
            }
        }
        Ok(AnchorAnalysis { anchor, alias })
    }

    fn analyze_tag<'a>(
        &mut self,
        tag: &'a str,
        tag_directives: &'a [TagDirective],
    ) -> Result<TagAnalysis<'a>, EmitterError> {
        if tag.is_empty() {
            self.set_emitter_error("tag value must not be empty")?;
        }
        let mut handle = "";
        let mut suffix = tag;
        for tag_directive in tag_directives {
            let prefix_len = tag_directive.prefix.len();
            if prefix_len < tag.len() && tag_directive.prefix == tag[0..prefix_len] {
                handle = &tag_directive.handle;
                suffix = &tag[prefix_len..];
                break;
            }
        }
        Ok(TagAnalysis { handle, suffix })
    }

    fn analyze_scalar<'a>(&mut self, value: &'a str) -> Result<ScalarAnalysis<'a>, EmitterError> {
        let mut block_indicators = false;
        let mut flow_indicators = false;
        let mut line_breaks = false;
        let mut special_characters = false;
        let mut leading_space = false;
        let mut leading_break = false;
        let mut trailing_space = false;
        let mut trailing_break = false;
        let mut break_space = false;
        let mut space_break = false;
        let mut preceded_by_whitespace;
        let mut previous_space = false;
        let mut previous_break = false;

        if value.is_empty() {
            return Ok(ScalarAnalysis {
                value: "",
                multiline: false,
                flow_plain_allowed: false,
                block_plain_allowed: true,
                single_quoted_allowed: true,
                block_allowed: false,
                style: ScalarStyle::Any,
            });
        }

        if value.starts_with("---") || value.starts_with("...") {
            block_indicators = true;
            flow_indicators = true;
        }
        preceded_by_whitespace = true;

        let mut chars = value.chars();
        let mut first = true;

        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            let followed_by_whitespace = is_blankz(next);
            if first {
                match ch {
                    '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
                    | '@' | '`' => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    '?' | ':' => {
                        flow_indicators = true;
                        if followed_by_whitespace {
                            block_indicators = true;
                        }
                    }
                    '-' if followed_by_whitespace => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    _ => {}
                }
            } else {
                match ch {
                    ',' | '?' | '[' | ']' | '{' | '}' => {
                        flow_indicators = true;
                    }
                    ':' => {
                        flow_indicators = true;
                        if followed_by_whitespace {
                            block_indicators = true;
                        }
                    }
                    '#' if preceded_by_whitespace => {
                        flow_indicators = true;
                        block_indicators = true;
                    }
                    _ => {}
                }
            }

            if !is_printable(ch) || !ch.is_ascii() && !self.unicode {
                special_characters = true;
            }
            if is_break(ch) {
                line_breaks = true;
            }

            if is_space(ch) {
                if first {
                    leading_space = true;
                }
                if next.is_none() {
                    trailing_space = true;
                }
                if previous_break {
                    break_space = true;
                }
                previous_space = true;
                previous_break = false;
            } else if is_break(ch) {
                if first {
                    leading_break = true;
                }
                if next.is_none() {
                    trailing_break = true;
                }
                if previous_space {
                    space_break = true;
                }
                previous_space = false;
                previous_break = true;
            } else {
                previous_space = false;
                previous_break = false;
            }

            preceded_by_whitespace = is_blankz(ch);
            first = false;
        }

        let mut analysis = ScalarAnalysis {
            value,
            multiline: line_breaks,
            flow_plain_allowed: true,
            block_plain_allowed: true,
            single_quoted_allowed: true,
            block_allowed: true,
            style: ScalarStyle::Any,
        };

        if leading_space || leading_break || trailing_space || trailing_break {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
        }
        if trailing_space {
            analysis.block_allowed = false;
        }
        if break_space {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
            analysis.single_quoted_allowed = false;
        }
        if space_break || special_characters {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
            analysis.single_quoted_allowed = false;
            analysis.block_allowed = false;
        }
        if line_breaks {
            analysis.flow_plain_allowed = false;
            analysis.block_plain_allowed = false;
        }
        if flow_indicators {
            analysis.flow_plain_allowed = false;
        }
        if block_indicators {
            analysis.block_plain_allowed = false;
        }
        Ok(analysis)
    }

    fn analyze_event<'a>(
        &mut self,
        event: &'a Event,
        tag_directives: &'a [TagDirective],
    ) -> Result<Analysis<'a>, EmitterError> {
        let mut analysis = Analysis::default();

        match &event.data {
            EventData::Alias { anchor } => {
                analysis.anchor = Some(self.analyze_anchor(anchor, true)?);
            }
            EventData::Scalar {
                anchor,
                tag,
                value,
                plain_implicit,
                quoted_implicit,
                ..
            } => {
                let (plain_implicit, quoted_implicit) = (*plain_implicit, *quoted_implicit);
                if let Some(anchor) = anchor {
                    analysis.anchor = Some(self.analyze_anchor(anchor, false)?);
                }
                if tag.is_some() && (self.canonical || !plain_implicit && !quoted_implicit) {
                    analysis.tag = Some(self.analyze_tag(tag.as_deref().unwrap(), tag_directives)?);
                }
                analysis.scalar = Some(self.analyze_scalar(value)?);
            }
            EventData::SequenceStart { anchor, tag, implicit, .. } => {
                if let Some(anchor) = anchor {
                    analysis.anchor = Some(self.analyze_anchor(anchor, false)?);
                }
                if tag.is_some() && (self.canonical || !*implicit) {
                    analysis.tag = Some(self.analyze_tag(tag.as_deref().unwrap(), tag_directives)?);
                }
            }
            EventData::MappingStart { anchor, tag, implicit, .. } => {
                if let Some(anchor) = anchor {
                    analysis.anchor = Some(self.analyze_anchor(anchor, false)?);
                }
                if tag.is_some() && (self.canonical || !*implicit) {
                    analysis.tag = Some(self.analyze_tag(tag.as_deref().unwrap(), tag_directives)?);
                }
            }
            _ => {}
        }

        if self.strip_tags {
            analysis.tag = None;
        }
        if self.strip_labels {
            analysis.anchor = None;
        }

        Ok(analysis)
    }

    fn write_bom(&mut self) -> Result<(), EmitterError> {
        self.flush()?;
        self.buffer.push('\u{feff}');
        Ok(())
    }

    fn write_indent(&mut self) -> Result<(), EmitterError> {
        let indent = if self.indent >= 0 { self.indent } else { 0 };
        if !self.indention || self.column > indent || self.column == indent && !self.whitespace {
            self.put_break()?;
        }
        while self.column < indent {
            self.put(b' ')?;
        }
        self.whitespace = true;
        self.indention = true;
        Ok(())
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) -> Result<(), EmitterError> {
        if need_whitespace && !self.whitespace {
            self.put(b' ')?;
        }
        self.write_str(indicator)?;
        self.whitespace = is_whitespace;
        self.indention = self.indention && is_indention;
        Ok(())
    }

    fn write_anchor(&mut self, value: &str) -> Result<(), EmitterError> {
        self.write_str(value)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_tag_handle(&mut self, value: &str) -> Result<(), EmitterError> {
        if !self.whitespace {
            self.put(b' ')?;
        }
        self.write_str(value)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_tag_content(&mut self, value: &str, need_whitespace: bool) -> Result<(), EmitterError> {
        if need_whitespace && !self.whitespace {
            self.put(b' ')?;
        }

        for ch in value.chars() {
            if is_alpha(ch) {
                self.write_char(ch)?;
                continue;
            }
            match ch {
                ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | ',' | '_' | '.' | '~' | '*' | '\''
                | '(' | ')' | '[' | ']' => {
                    self.write_char(ch)?;
                    continue;
                }
                _ => {}
            }

            let mut encode_buffer = [0u8; 4];
            let encoded_char = ch.encode_utf8(&mut encode_buffer);
            for value in encoded_char.bytes() {
                let upper = (value >> 4) + if (value >> 4) < 10 { b'0' } else { b'A' - 10 };
                let lower = (value & 0x0F) + if (value & 0x0F) < 10 { b'0' } else { b'A' - 10 };
                self.put(b'%')?;
                self.put(upper)?;
                self.put(lower)?;
            }
        }

        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_plain_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<(), EmitterError> {
        let mut spaces = false;
        let mut breaks = false;
        if !self.whitespace && (!value.is_empty() || self.flow_level != 0) {
            self.put(b' ')?;
        }

        let mut chars = value.chars();
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            if is_space(ch) {
                if allow_breaks && !spaces && self.column > self.best_width && !is_space(next) {
                    self.write_indent()?;
                } else {
                    self.write_char(ch)?;
                }
                spaces = true;
            } else if is_break(ch) {
                if !breaks && ch == '\n' {
                    self.put_break()?;
                }
                self.write_break_char(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                self.write_char(ch)?;
                self.indention = false;
                spaces = false;
                breaks = false;
            }
        }
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_single_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<(), EmitterError> {
        let mut spaces = false;
        let mut breaks = false;
        self.write_indicator("'", true, false, false)?;
        let mut chars = value.chars();
        let mut is_first = true;
        while let Some(ch) = chars.next() {
            let next = chars.clone().next();
            let is_last = next.is_none();

            if is_space(ch) {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !is_first
                    && !is_last
                    && !is_space(next)
                {
                    self.write_indent()?;
                } else {
                    self.write_char(ch)?;
                }
                spaces = true;
            } else if is_break(ch) {
                if !breaks && ch == '\n' {
                    self.put_break()?;
                }
                self.write_break_char(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                if ch == '\'' {
                    self.put(b'\'')?;
                }
                self.write_char(ch)?;
                self.indention = false;
                spaces = false;
                breaks = false;
            }

            is_first = false;
        }
        if breaks {
            self.write_indent()?;
        }
        self.write_indicator("'", false, false, false)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_double_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> Result<(), EmitterError> {
        let mut spaces = false;
        self.write_indicator("\"", true, false, false)?;
        let mut chars = value.chars();
        let mut first = true;
        while let Some(ch) = chars.next() {
            if !is_printable(ch) || !self.unicode && !ch.is_ascii() || is_bom(ch) || is_break(ch) || ch == '"' || ch == '\\' {
                self.put(b'\\')?;
                match ch {
                    '\0' => {
                        self.put(b'0')?;
                    }
                    '\x07' => {
                        self.put(b'a')?;
                    }
                    '\x08' => {
                        self.put(b'b')?;
                    }
                    '\x09' => {
                        self.put(b't')?;
                    }
                    '\x0A' => {
                        self.put(b'n')?;
                    }
                    '\x0B' => {
                        self.put(b'v')?;
                    }
                    '\x0C' => {
                        self.put(b'f')?;
                    }
                    '\x0D' => {
                        self.put(b'r')?;
                    }
                    '\x1B' => {
                        self.put(b'e')?;
                    }
                    '\x22' => {
                        self.put(b'"')?;
                    }
                    '\x5C' => {
                        self.put(b'\\')?;
                    }
                    '\u{0085}' => {
                        self.put(b'N')?;
                    }
                    '\u{00A0}' => {
                        self.put(b'_')?;
                    }
                    '\u{2028}' => {
                        self.put(b'L')?;
                    }
                    '\u{2029}' => {
                        self.put(b'P')?;
                    }
                    _ => {
                        let (prefix, width) = if ch <= '\u{00ff}' {
                            (b'x', 2)
                        } else if ch <= '\u{ffff}' {
                            (b'u', 4)
                        } else {
                            (b'U', 8)
                        };
                        self.put(prefix)?;
                        let mut k = (width - 1) * 4;
                        let value_0 = ch as u32;
                        while k >= 0 {
                            let digit = (value_0 >> k) & 0x0F;
                            let Some(digit_char) = char::from_digit(digit, 16) else {
                                unreachable!("digit out of range")
                            };
                            let digit_char = digit_char.to_ascii_uppercase();
                            self.put(digit_char as u8)?;
                            k -= 4;
                        }
                    }
                }
                spaces = false;
            } else if is_space(ch) {
                if allow_breaks
                    && !spaces
                    && self.column > self.best_width
                    && !first
                    && chars.clone().next().is_some()
                {
                    self.write_indent()?;
                    if is_space(chars.clone().next()) {
                        self.put(b'\\')?;
                    }
                } else {
                    self.write_char(ch)?;
                }
                spaces = true;
            } else {
                self.write_char(ch)?;
                spaces = false;
            }

            first = false;
        }
        self.write_indicator("\"", false, false, false)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_block_scalar_hints(&mut self, string: &str) -> Result<(), EmitterError> {
        let mut chomp_hint: Option<&str> = None;

        let first = string.chars().next();
        if is_space(first) || is_break(first) {
            let Some(indent_hint) = char::from_digit(self.best_indent as u32, 10) else {
                unreachable!("best_indent out of range")
            };
            let mut indent_hint_buffer = [0u8; 1];
            let indent_hint = indent_hint.encode_utf8(&mut indent_hint_buffer);
            self.write_indicator(indent_hint, false, false, false)?;
        }
        self.open_ended = 0;

        if string.is_empty() {
            chomp_hint = Some("-");
        } else {
            let mut chars_rev = string.chars().rev();
            let ch = chars_rev.next();
            let next = chars_rev.next();

            if !is_break(ch) {
                chomp_hint = Some("-");
            } else if is_breakz(next) {
                chomp_hint = Some("+");
                self.open_ended = 2;
            }
        }

        if let Some(chomp_hint) = chomp_hint {
            self.write_indicator(chomp_hint, false, false, false)?;
        }
        Ok(())
    }

    fn write_literal_scalar(&mut self, value: &str) -> Result<(), EmitterError> {
        let mut breaks = true;
        self.write_indicator("|", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.put_break()?;
        self.indention = true;
        self.whitespace = true;
        for ch in value.chars() {
            if is_break(ch) {
                self.write_break_char(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                self.write_char(ch)?;
                self.indention = false;
                breaks = false;
            }
        }
        Ok(())
    }

    fn write_folded_scalar(&mut self, value: &str) -> Result<(), EmitterError> {
        let mut breaks = true;
        let mut leading_spaces = true;
        self.write_indicator(">", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.put_break()?;
        self.indention = true;
        self.whitespace = true;

        let mut chars = value.chars();
        while let Some(ch) = chars.next() {
            if is_break(ch) {
                if !breaks && !leading_spaces && ch == '\n' {
                    let mut skip_breaks = chars.clone();
                    while is_break(skip_breaks.next()) {}
                    if !is_blankz(skip_breaks.next()) {
                        self.put_break()?;
                    }
                }
                self.write_break_char(ch)?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                    leading_spaces = is_blank(ch);
                }
                if !breaks && is_space(ch) && !is_space(chars.clone().next()) && self.column > self.best_width {
                    self.write_indent()?;
                } else {
                    self.write_char(ch)?;
                }
                self.indention = false;
                breaks = false;
            }
        }
        Ok(())
    }
}

impl<'w> Default for Emitter<'w> {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `value` is one of the JSON bare literal forms (`null`, `true`,
/// `false`, or a JSON number) that JSON mode is allowed to leave unquoted.
fn is_json_bare_value(value: &str) -> bool {
    matches!(value, "null" | "true" | "false") || is_json_number(value)
}

fn is_json_number(value: &str) -> bool {
    let mut chars = value.chars().peekable();
    if chars.peek() == Some(&'-') {
        chars.next();
    }
    let mut saw_digit = false;
    while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
        chars.next();
        saw_digit = true;
    }
    if !saw_digit {
        return false;
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        let mut saw_frac = false;
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            chars.next();
            saw_frac = true;
        }
        if !saw_frac {
            return false;
        }
    }
    if matches!(chars.peek(), Some('e' | 'E')) {
        chars.next();
        if matches!(chars.peek(), Some('+' | '-')) {
            chars.next();
        }
        let mut saw_exp = false;
        while matches!(chars.peek(), Some(c) if c.is_ascii_digit()) {
            chars.next();
            saw_exp = true;
        }
        if !saw_exp {
            return false;
        }
    }
    chars.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_all(events: Vec<Event>) -> String {
        let mut output = Vec::new();
        let mut emitter = Emitter::new().with_output_string(&mut output);
        for event in events {
            emitter.emit(event).unwrap();
        }
        drop(emitter);
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn emits_simple_block_mapping() {
        let out = emit_all(vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::mapping_start(None, None, true, MappingStyle::Block),
            Event::scalar(None, None, "a", true, false, ScalarStyle::Plain),
            Event::scalar(None, None, "1", true, false, ScalarStyle::Plain),
            Event::mapping_end(),
            Event::document_end(true),
            Event::stream_end(),
        ]);
        assert_eq!(out, "a: 1\n");
    }

    #[test]
    fn json_mode_quotes_strings_and_bares_numbers() {
        let mut output = Vec::new();
        let mut emitter = Emitter::new()
            .with_output_string(&mut output)
            .with_mode(EmitterMode::Json);
        for event in [
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::sequence_start(None, None, true, SequenceStyle::Any),
            Event::scalar(None, None, "hi", true, false, ScalarStyle::Plain),
            Event::scalar(None, None, "42", true, false, ScalarStyle::Plain),
            Event::sequence_end(),
            Event::document_end(true),
            Event::stream_end(),
        ] {
            emitter.emit(event).unwrap();
        }
        drop(emitter);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "[\"hi\", 42]\n");
    }

    #[test]
    fn strip_labels_drops_anchor_indicator() {
        let out = emit_all(vec![
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::scalar(Some("x"), None, "1", true, false, ScalarStyle::Plain),
            Event::document_end(true),
            Event::stream_end(),
        ]);
        assert!(out.contains('&'));

        let mut output = Vec::new();
        let mut emitter = Emitter::new().with_output_string(&mut output).with_strip_labels(true);
        for event in [
            Event::stream_start(Encoding::Utf8),
            Event::document_start(None, &[], true),
            Event::scalar(Some("x"), None, "1", true, false, ScalarStyle::Plain),
            Event::document_end(true),
            Event::stream_end(),
        ] {
            emitter.emit(event).unwrap();
        }
        drop(emitter);
        let text = String::from_utf8(output).unwrap();
        assert!(!text.contains('&'));
    }
}
