//! The parser: consumes tokens, produces events (spec §4.3).
//!
//! Adapted from the teacher's idiomatic `Parser`/`ParserState` state machine.
//! The main structural change is that tokens are now owned the moment
//! they're popped from the scanner, so there is no more need for the
//! teacher's `mem::take`-through-a-mutable-peek dance — `advance()` returns
//! an owned [`Token`] whose fields can simply be moved into the event.

use std::collections::VecDeque;

use crate::atom::AtomStyle;
use crate::error::{Mark, ParserError};
use crate::event::{Event, EventData};
use crate::input::InputRef;
use crate::scanner::Scanner;
use crate::token::{Token, TokenData};
use crate::{MappingStyle, ScalarStyle, SequenceStyle, TagDirective, VersionDirective};

#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[non_exhaustive]
pub enum ParserState {
    #[default]
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockNodeOrIndentlessSequence,
    FlowNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

pub struct Parser {
    scanner: Scanner,
    states: Vec<ParserState>,
    state: ParserState,
    marks: Vec<Mark>,
    tag_directives: Vec<TagDirective>,
    stream_start_produced: bool,
    stream_end_produced: bool,
}

fn scalar_style_of(atom_style: AtomStyle) -> ScalarStyle {
    match atom_style {
        AtomStyle::Plain => ScalarStyle::Plain,
        AtomStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        AtomStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        AtomStyle::Literal => ScalarStyle::Literal,
        AtomStyle::Folded => ScalarStyle::Folded,
        AtomStyle::Uri | AtomStyle::Comment => ScalarStyle::Any,
    }
}

impl Parser {
    pub fn new(input: InputRef) -> Self {
        Parser {
            scanner: Scanner::new(input),
            states: Vec::with_capacity(16),
            state: ParserState::default(),
            marks: Vec::with_capacity(16),
            tag_directives: Vec::with_capacity(16),
            stream_start_produced: false,
            stream_end_produced: false,
        }
    }

    /// Whether the STREAM-START event has already been produced.
    pub fn stream_start_produced(&self) -> bool {
        self.stream_start_produced
    }

    /// Whether the STREAM-END event has already been produced.
    pub fn stream_end_produced(&self) -> bool {
        self.stream_end_produced
    }

    fn peek(&mut self) -> Result<&Token, ParserError> {
        Ok(self.scanner.peek_token(0)?)
    }

    fn advance(&mut self) -> Result<Token, ParserError> {
        let token = self.scanner.next_token()?;
        if matches!(token.data, TokenData::StreamEnd) {
            self.stream_end_produced = true;
        }
        Ok(token)
    }

    fn err<T>(problem: &'static str, mark: Mark) -> Result<T, ParserError> {
        Err(ParserError::Problem { problem, mark })
    }

    fn err_ctx<T>(
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    ) -> Result<T, ParserError> {
        Err(ParserError::ProblemWithContext {
            context,
            context_mark,
            problem,
            mark,
        })
    }

    /// Parse the input stream and produce the next event.
    pub fn parse(&mut self) -> Result<Event, ParserError> {
        if self.stream_end_produced || self.state == ParserState::End {
            return Ok(Event::new(EventData::StreamEnd));
        }
        self.state_machine()
    }

    fn state_machine(&mut self) -> Result<Event, ParserError> {
        match self.state {
            ParserState::StreamStart => self.parse_stream_start(),
            ParserState::ImplicitDocumentStart => self.parse_document_start(true),
            ParserState::DocumentStart => self.parse_document_start(false),
            ParserState::DocumentContent => self.parse_document_content(),
            ParserState::DocumentEnd => self.parse_document_end(),
            ParserState::BlockNode => self.parse_node(true, false),
            ParserState::BlockNodeOrIndentlessSequence => self.parse_node(true, true),
            ParserState::FlowNode => self.parse_node(false, false),
            ParserState::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            ParserState::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            ParserState::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            ParserState::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            ParserState::BlockMappingKey => self.parse_block_mapping_key(false),
            ParserState::BlockMappingValue => self.parse_block_mapping_value(),
            ParserState::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            ParserState::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            ParserState::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            ParserState::FlowSequenceEntryMappingValue => self.parse_flow_sequence_entry_mapping_value(),
            ParserState::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            ParserState::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            ParserState::FlowMappingKey => self.parse_flow_mapping_key(false),
            ParserState::FlowMappingValue => self.parse_flow_mapping_value(false),
            ParserState::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            ParserState::End => panic!("parser end state reached unexpectedly"),
        }
    }

    fn parse_stream_start(&mut self) -> Result<Event, ParserError> {
        let token = self.advance()?;
        if let TokenData::StreamStart { encoding } = token.data {
            self.stream_start_produced = true;
            self.state = ParserState::ImplicitDocumentStart;
            Ok(Event {
                data: EventData::StreamStart { encoding },
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            })
        } else {
            Self::err("did not find expected <stream-start>", token.start_mark)
        }
    }

    fn parse_document_start(&mut self, implicit: bool) -> Result<Event, ParserError> {
        if !implicit {
            while matches!(self.peek()?.data, TokenData::DocumentEnd) {
                self.advance()?;
            }
        }

        let start = self.peek()?.start_mark;
        let end = self.peek()?.end_mark;

        if implicit
            && !matches!(
                self.peek()?.data,
                TokenData::VersionDirective { .. }
                    | TokenData::TagDirective { .. }
                    | TokenData::DocumentStart
                    | TokenData::StreamEnd
            )
        {
            self.process_directives(None, None)?;
            self.states.push(ParserState::DocumentEnd);
            self.state = ParserState::BlockNode;
            return Ok(Event {
                data: EventData::DocumentStart {
                    version_directive: None,
                    tag_directives: Vec::new(),
                    implicit: true,
                },
                start_mark: start,
                end_mark: end,
            });
        }

        if matches!(self.peek()?.data, TokenData::StreamEnd) {
            let token = self.advance()?;
            self.state = ParserState::End;
            return Ok(Event {
                data: EventData::StreamEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            });
        }

        let start_mark = self.peek()?.start_mark;
        let mut version_directive = None;
        let mut tag_directives = Vec::new();
        self.process_directives(Some(&mut version_directive), Some(&mut tag_directives))?;

        if matches!(self.peek()?.data, TokenData::DocumentStart) {
            let token = self.advance()?;
            self.states.push(ParserState::DocumentEnd);
            self.state = ParserState::DocumentContent;
            Ok(Event {
                data: EventData::DocumentStart {
                    version_directive,
                    tag_directives,
                    implicit: false,
                },
                start_mark,
                end_mark: token.end_mark,
            })
        } else {
            Self::err("did not find expected <document start>", self.peek()?.start_mark)
        }
    }

    fn parse_document_content(&mut self) -> Result<Event, ParserError> {
        if matches!(
            self.peek()?.data,
            TokenData::VersionDirective { .. }
                | TokenData::TagDirective { .. }
                | TokenData::DocumentStart
                | TokenData::DocumentEnd
                | TokenData::StreamEnd
        ) {
            let mark = self.peek()?.start_mark;
            self.state = self.states.pop().unwrap();
            Ok(Self::empty_scalar(mark))
        } else {
            self.parse_node(true, false)
        }
    }

    fn parse_document_end(&mut self) -> Result<Event, ParserError> {
        let mut implicit = true;
        let start_mark = self.peek()?.start_mark;
        let mut end_mark = start_mark;
        if matches!(self.peek()?.data, TokenData::DocumentEnd) {
            let token = self.advance()?;
            end_mark = token.end_mark;
            implicit = false;
        }
        self.tag_directives.clear();
        self.state = ParserState::DocumentStart;
        Ok(Event {
            data: EventData::DocumentEnd { implicit },
            start_mark,
            end_mark,
        })
    }

    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> Result<Event, ParserError> {
        if matches!(self.peek()?.data, TokenData::Alias { .. }) {
            let token = self.advance()?;
            let TokenData::Alias { value } = token.data else {
                unreachable!()
            };
            self.state = self.states.pop().unwrap();
            return Ok(Event {
                data: EventData::Alias { anchor: value },
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            });
        }

        let mut anchor: Option<String> = None;
        let mut tag_handle: Option<String> = None;
        let mut tag_suffix: Option<String> = None;
        let mut start_mark = self.peek()?.start_mark;
        let mut end_mark = start_mark;
        let mut tag_mark = start_mark;

        if matches!(self.peek()?.data, TokenData::Anchor { .. }) {
            let token = self.advance()?;
            let TokenData::Anchor { value } = token.data else {
                unreachable!()
            };
            anchor = Some(value);
            start_mark = token.start_mark;
            end_mark = token.end_mark;
            if matches!(self.peek()?.data, TokenData::Tag { .. }) {
                let token = self.advance()?;
                let TokenData::Tag { handle, suffix } = token.data else {
                    unreachable!()
                };
                tag_mark = token.start_mark;
                end_mark = token.end_mark;
                tag_handle = Some(handle);
                tag_suffix = Some(suffix.format());
            }
        } else if matches!(self.peek()?.data, TokenData::Tag { .. }) {
            let token = self.advance()?;
            let TokenData::Tag { handle, suffix } = token.data else {
                unreachable!()
            };
            tag_mark = token.start_mark;
            start_mark = tag_mark;
            end_mark = token.end_mark;
            tag_handle = Some(handle);
            tag_suffix = Some(suffix.format());
            if matches!(self.peek()?.data, TokenData::Anchor { .. }) {
                let token = self.advance()?;
                let TokenData::Anchor { value } = token.data else {
                    unreachable!()
                };
                anchor = Some(value);
                end_mark = token.end_mark;
            }
        }

        let mut tag: Option<String> = None;
        if let Some(handle) = &tag_handle {
            if handle.is_empty() {
                tag = tag_suffix;
            } else {
                for directive in &self.tag_directives {
                    if &directive.handle == handle {
                        tag = Some(format!("{}{}", directive.prefix, tag_suffix.as_deref().unwrap_or("")));
                        break;
                    }
                }
                if tag.is_none() {
                    return Self::err_ctx(
                        "while parsing a node",
                        start_mark,
                        "found undefined tag handle",
                        tag_mark,
                    );
                }
            }
        }
        let implicit = tag.is_none() || tag.as_deref() == Some("");

        if indentless_sequence && matches!(self.peek()?.data, TokenData::BlockEntry) {
            end_mark = self.peek()?.end_mark;
            self.state = ParserState::IndentlessSequenceEntry;
            return Ok(Event {
                data: EventData::SequenceStart {
                    anchor,
                    tag,
                    implicit,
                    style: SequenceStyle::Block,
                },
                start_mark,
                end_mark,
            });
        }

        match &self.peek()?.data {
            TokenData::Scalar { .. } => {
                let token = self.advance()?;
                let TokenData::Scalar { value } = token.data else {
                    unreachable!()
                };
                let style = scalar_style_of(value.style);
                let mut plain_implicit = false;
                let mut quoted_implicit = false;
                if (style == ScalarStyle::Plain && tag.is_none()) || tag.as_deref() == Some("!") {
                    plain_implicit = true;
                } else if tag.is_none() {
                    quoted_implicit = true;
                }
                self.state = self.states.pop().unwrap();
                Ok(Event {
                    data: EventData::Scalar {
                        anchor,
                        tag,
                        value: value.format(),
                        plain_implicit,
                        quoted_implicit,
                        style,
                    },
                    start_mark,
                    end_mark: token.end_mark,
                })
            }
            TokenData::FlowSequenceStart => {
                end_mark = self.peek()?.end_mark;
                self.state = ParserState::FlowSequenceFirstEntry;
                Ok(Event {
                    data: EventData::SequenceStart {
                        anchor,
                        tag,
                        implicit,
                        style: SequenceStyle::Flow,
                    },
                    start_mark,
                    end_mark,
                })
            }
            TokenData::FlowMappingStart => {
                end_mark = self.peek()?.end_mark;
                self.state = ParserState::FlowMappingFirstKey;
                Ok(Event {
                    data: EventData::MappingStart {
                        anchor,
                        tag,
                        implicit,
                        style: MappingStyle::Flow,
                    },
                    start_mark,
                    end_mark,
                })
            }
            TokenData::BlockSequenceStart if block => {
                end_mark = self.peek()?.end_mark;
                self.state = ParserState::BlockSequenceFirstEntry;
                Ok(Event {
                    data: EventData::SequenceStart {
                        anchor,
                        tag,
                        implicit,
                        style: SequenceStyle::Block,
                    },
                    start_mark,
                    end_mark,
                })
            }
            TokenData::BlockMappingStart if block => {
                end_mark = self.peek()?.end_mark;
                self.state = ParserState::BlockMappingFirstKey;
                Ok(Event {
                    data: EventData::MappingStart {
                        anchor,
                        tag,
                        implicit,
                        style: MappingStyle::Block,
                    },
                    start_mark,
                    end_mark,
                })
            }
            _ if anchor.is_some() || tag.is_some() => {
                self.state = self.states.pop().unwrap();
                Ok(Event {
                    data: EventData::Scalar {
                        anchor,
                        tag,
                        value: String::new(),
                        plain_implicit: implicit,
                        quoted_implicit: false,
                        style: ScalarStyle::Plain,
                    },
                    start_mark,
                    end_mark,
                })
            }
            _ => Self::err_ctx(
                if block {
                    "while parsing a block node"
                } else {
                    "while parsing a flow node"
                },
                start_mark,
                "did not find expected node content",
                self.peek()?.start_mark,
            ),
        }
    }

    fn parse_block_sequence_entry(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek()?.start_mark;
            self.marks.push(mark);
            self.advance()?;
        }
        if matches!(self.peek()?.data, TokenData::BlockEntry) {
            let mark = self.advance()?.end_mark;
            if matches!(self.peek()?.data, TokenData::BlockEntry | TokenData::BlockEnd) {
                self.state = ParserState::BlockSequenceEntry;
                Ok(Self::empty_scalar(mark))
            } else {
                self.states.push(ParserState::BlockSequenceEntry);
                self.parse_node(true, false)
            }
        } else if matches!(self.peek()?.data, TokenData::BlockEnd) {
            let token = self.advance()?;
            self.state = self.states.pop().unwrap();
            self.marks.pop();
            Ok(Event {
                data: EventData::SequenceEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            })
        } else {
            let token_mark = self.peek()?.start_mark;
            let mark = self.marks.pop().unwrap();
            Self::err_ctx(
                "while parsing a block collection",
                mark,
                "did not find expected '-' indicator",
                token_mark,
            )
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> Result<Event, ParserError> {
        if matches!(self.peek()?.data, TokenData::BlockEntry) {
            let mark = self.advance()?.end_mark;
            if matches!(
                self.peek()?.data,
                TokenData::BlockEntry | TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::IndentlessSequenceEntry;
                Ok(Self::empty_scalar(mark))
            } else {
                self.states.push(ParserState::IndentlessSequenceEntry);
                self.parse_node(true, false)
            }
        } else {
            let token = self.peek()?;
            let event = Event {
                data: EventData::SequenceEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            };
            self.state = self.states.pop().unwrap();
            Ok(event)
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek()?.start_mark;
            self.marks.push(mark);
            self.advance()?;
        }
        if matches!(self.peek()?.data, TokenData::Key) {
            let mark = self.advance()?.end_mark;
            if matches!(
                self.peek()?.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::BlockMappingValue;
                Ok(Self::empty_scalar(mark))
            } else {
                self.states.push(ParserState::BlockMappingValue);
                self.parse_node(true, true)
            }
        } else if matches!(self.peek()?.data, TokenData::BlockEnd) {
            let token = self.advance()?;
            self.state = self.states.pop().unwrap();
            self.marks.pop();
            Ok(Event {
                data: EventData::MappingEnd,
                start_mark: token.start_mark,
                end_mark: token.end_mark,
            })
        } else {
            let token_mark = self.peek()?.start_mark;
            let mark = self.marks.pop().unwrap();
            Self::err_ctx(
                "while parsing a block mapping",
                mark,
                "did not find expected key",
                token_mark,
            )
        }
    }

    fn parse_block_mapping_value(&mut self) -> Result<Event, ParserError> {
        if matches!(self.peek()?.data, TokenData::Value) {
            let mark = self.advance()?.end_mark;
            if matches!(
                self.peek()?.data,
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = ParserState::BlockMappingKey;
                Ok(Self::empty_scalar(mark))
            } else {
                self.states.push(ParserState::BlockMappingKey);
                self.parse_node(true, true)
            }
        } else {
            let mark = self.peek()?.start_mark;
            self.state = ParserState::BlockMappingKey;
            Ok(Self::empty_scalar(mark))
        }
    }

    fn parse_flow_sequence_entry(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek()?.start_mark;
            self.marks.push(mark);
            self.advance()?;
        }
        if !matches!(self.peek()?.data, TokenData::FlowSequenceEnd) {
            if !first {
                if matches!(self.peek()?.data, TokenData::FlowEntry) {
                    self.advance()?;
                } else {
                    let token_mark = self.peek()?.start_mark;
                    let mark = self.marks.pop().unwrap();
                    return Self::err_ctx(
                        "while parsing a flow sequence",
                        mark,
                        "did not find expected ',' or ']'",
                        token_mark,
                    );
                }
            }
            if matches!(self.peek()?.data, TokenData::Key) {
                let token = self.peek()?;
                let event = Event {
                    data: EventData::MappingStart {
                        anchor: None,
                        tag: None,
                        implicit: true,
                        style: MappingStyle::Flow,
                    },
                    start_mark: token.start_mark,
                    end_mark: token.end_mark,
                };
                self.state = ParserState::FlowSequenceEntryMappingKey;
                self.advance()?;
                return Ok(event);
            } else if !matches!(self.peek()?.data, TokenData::FlowSequenceEnd) {
                self.states.push(ParserState::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        let token = self.advance()?;
        self.state = self.states.pop().unwrap();
        self.marks.pop();
        Ok(Event {
            data: EventData::SequenceEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        })
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> Result<Event, ParserError> {
        if matches!(
            self.peek()?.data,
            TokenData::Value | TokenData::FlowEntry | TokenData::FlowSequenceEnd
        ) {
            let mark = self.advance()?.end_mark;
            self.state = ParserState::FlowSequenceEntryMappingValue;
            Ok(Self::empty_scalar(mark))
        } else {
            self.states.push(ParserState::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> Result<Event, ParserError> {
        if matches!(self.peek()?.data, TokenData::Value) {
            self.advance()?;
            if !matches!(
                self.peek()?.data,
                TokenData::FlowEntry | TokenData::FlowSequenceEnd
            ) {
                self.states.push(ParserState::FlowSequenceEntryMappingEnd);
                return self.parse_node(false, false);
            }
        }
        let mark = self.peek()?.start_mark;
        self.state = ParserState::FlowSequenceEntryMappingEnd;
        Ok(Self::empty_scalar(mark))
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> Result<Event, ParserError> {
        let token = self.peek()?;
        let event = Event {
            data: EventData::MappingEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        };
        self.state = ParserState::FlowSequenceEntry;
        Ok(event)
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> Result<Event, ParserError> {
        if first {
            let mark = self.peek()?.start_mark;
            self.marks.push(mark);
            self.advance()?;
        }
        if !matches!(self.peek()?.data, TokenData::FlowMappingEnd) {
            if !first {
                if matches!(self.peek()?.data, TokenData::FlowEntry) {
                    self.advance()?;
                } else {
                    let token_mark = self.peek()?.start_mark;
                    let mark = self.marks.pop().unwrap();
                    return Self::err_ctx(
                        "while parsing a flow mapping",
                        mark,
                        "did not find expected ',' or '}'",
                        token_mark,
                    );
                }
            }
            if matches!(self.peek()?.data, TokenData::Key) {
                self.advance()?;
                if !matches!(
                    self.peek()?.data,
                    TokenData::Value | TokenData::FlowEntry | TokenData::FlowMappingEnd
                ) {
                    self.states.push(ParserState::FlowMappingValue);
                    return self.parse_node(false, false);
                }
                let mark = self.peek()?.start_mark;
                self.state = ParserState::FlowMappingValue;
                return Ok(Self::empty_scalar(mark));
            } else if !matches!(self.peek()?.data, TokenData::FlowMappingEnd) {
                self.states.push(ParserState::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        let token = self.advance()?;
        self.state = self.states.pop().unwrap();
        self.marks.pop();
        Ok(Event {
            data: EventData::MappingEnd,
            start_mark: token.start_mark,
            end_mark: token.end_mark,
        })
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> Result<Event, ParserError> {
        if empty {
            let mark = self.peek()?.start_mark;
            self.state = ParserState::FlowMappingKey;
            return Ok(Self::empty_scalar(mark));
        }
        if matches!(self.peek()?.data, TokenData::Value) {
            self.advance()?;
            if !matches!(self.peek()?.data, TokenData::FlowEntry | TokenData::FlowMappingEnd) {
                self.states.push(ParserState::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }
        let mark = self.peek()?.start_mark;
        self.state = ParserState::FlowMappingKey;
        Ok(Self::empty_scalar(mark))
    }

    fn empty_scalar(mark: Mark) -> Event {
        Event {
            data: EventData::Scalar {
                anchor: None,
                tag: None,
                value: String::new(),
                plain_implicit: true,
                quoted_implicit: false,
                style: ScalarStyle::Plain,
            },
            start_mark: mark,
            end_mark: mark,
        }
    }

    fn process_directives(
        &mut self,
        mut version_directive_out: Option<&mut Option<VersionDirective>>,
        mut tag_directives_out: Option<&mut Vec<TagDirective>>,
    ) -> Result<(), ParserError> {
        let default_tag_directives = [
            TagDirective {
                handle: String::from("!"),
                prefix: String::from("!"),
            },
            TagDirective {
                handle: String::from("!!"),
                prefix: String::from("tag:yaml.org,2002:"),
            },
        ];
        let mut version_directive: Option<VersionDirective> = None;
        let mut tag_directives = Vec::new();

        loop {
            if !matches!(
                self.peek()?.data,
                TokenData::VersionDirective { .. } | TokenData::TagDirective { .. }
            ) {
                break;
            }
            let token = self.advance()?;
            match token.data {
                TokenData::VersionDirective { major, minor } => {
                    if version_directive.is_some() {
                        return Self::err("found duplicate %YAML directive", token.start_mark);
                    }
                    if major != 1 || (minor != 1 && minor != 2) {
                        return Self::err("found incompatible YAML document", token.start_mark);
                    }
                    version_directive = Some(VersionDirective { major, minor });
                }
                TokenData::TagDirective { handle, prefix } => {
                    let value = TagDirective { handle, prefix };
                    self.append_tag_directive(value.clone(), false, token.start_mark)?;
                    tag_directives.push(value);
                }
                _ => unreachable!(),
            }
        }

        let start_mark = self.peek()?.start_mark;
        for default_directive in default_tag_directives {
            self.append_tag_directive(default_directive, true, start_mark)?;
        }

        if let Some(out) = version_directive_out.as_deref_mut() {
            *out = version_directive;
        }
        if let Some(out) = tag_directives_out.as_deref_mut() {
            *out = tag_directives;
        }
        Ok(())
    }

    fn append_tag_directive(
        &mut self,
        value: TagDirective,
        allow_duplicates: bool,
        mark: Mark,
    ) -> Result<(), ParserError> {
        for existing in &self.tag_directives {
            if existing.handle == value.handle {
                if allow_duplicates {
                    return Ok(());
                }
                return Self::err("found duplicate %TAG directive", mark);
            }
        }
        self.tag_directives.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;

    fn parse_all(src: &str) -> Vec<EventData> {
        let mut parser = Parser::new(Input::from_str("t", src));
        let mut out = Vec::new();
        loop {
            let ev = parser.parse().unwrap();
            let done = matches!(ev.data, EventData::StreamEnd);
            out.push(ev.data);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn parses_flow_sequence() {
        let events = parse_all("[1, 2, 3]\n");
        assert!(matches!(events[0], EventData::StreamStart { .. }));
        assert!(events.iter().any(|e| matches!(e, EventData::SequenceStart { .. })));
        assert!(events.iter().any(|e| matches!(e, EventData::SequenceEnd)));
    }

    #[test]
    fn parses_block_mapping_with_scalar_values() {
        let events = parse_all("a: 1\nb: 2\n");
        let scalars: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                EventData::Scalar { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(scalars, vec!["a", "1", "b", "2"]);
    }

    #[test]
    fn undefined_tag_handle_is_an_error() {
        let mut parser = Parser::new(Input::from_str("t", "!x!foo bar\n"));
        let err = loop {
            match parser.parse() {
                Ok(ev) if matches!(ev.data, EventData::StreamEnd) => panic!("expected error"),
                Ok(_) => continue,
                Err(e) => break e,
            }
        };
        assert!(matches!(err, ParserError::Problem { .. } | ParserError::ProblemWithContext { .. }));
    }
}
