//! Scanner output tokens (spec §4.2, §4.3).
//!
//! Unlike a line-oriented lexer, [`TokenData::Scalar`] and the tag suffix of
//! [`TokenData::Tag`] carry an [`Atom`] rather than an owned `String` — the
//! scanner never decodes scalar content itself; that happens lazily via
//! [`Atom::format`] the first time a consumer asks for the value.

use crate::atom::Atom;
use crate::error::Mark;
use crate::Encoding;

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub struct Token {
    pub data: TokenData,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

impl Token {
    pub fn new(data: TokenData, start_mark: Mark, end_mark: Mark) -> Self {
        Token {
            data,
            start_mark,
            end_mark,
        }
    }
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum TokenData {
    StreamStart { encoding: Encoding },
    StreamEnd,
    VersionDirective { major: i32, minor: i32 },
    TagDirective { handle: String, prefix: String },
    DocumentStart,
    DocumentEnd,
    BlockSequenceStart,
    BlockMappingStart,
    BlockEnd,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    BlockEntry,
    FlowEntry,
    Key,
    Value,
    Alias { value: String },
    Anchor { value: String },
    Tag { handle: String, suffix: Atom },
    Scalar { value: Atom },
    /// A standalone comment, kept only when the scanner is configured to
    /// retain them (spec §4.4 "Comment" atom style, §9 `strip_comments`).
    Comment { value: Atom },
}
