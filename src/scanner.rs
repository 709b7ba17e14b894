//! The scanner: turns a code-point stream into [`Token`]s (spec §4.2).
//!
//! Grounded on the teacher's scanning algorithm (indentation stack,
//! per-flow-level simple-key stack, flow-level counter, token queue) but
//! rebuilt around [`Reader`] and the atom-carrying [`Token`] rather than the
//! legacy byte-buffer/`yaml_parser_t` plumbing.

use std::collections::VecDeque;

use crate::atom::{Atom, AtomStyle, Chomp};
use crate::error::{Mark, ScannerError};
use crate::input::InputRef;
use crate::macros::{is_alpha, is_blank, is_blankz, is_break, is_breakz, is_digit};
use crate::reader::Reader;
use crate::token::{Token, TokenData};

#[derive(Debug, Clone, Copy)]
struct SimpleKey {
    possible: bool,
    required: bool,
    token_number: usize,
    mark: Mark,
}

impl SimpleKey {
    const fn none() -> Self {
        SimpleKey {
            possible: false,
            required: false,
            token_number: 0,
            mark: Mark {
                index: 0,
                line: 0,
                column: 0,
            },
        }
    }
}

/// Which start-of-container token a queued indentation change produces.
#[derive(Clone, Copy)]
enum ContainerKind {
    BlockSequence,
    BlockMapping,
}

impl ContainerKind {
    fn start_token(self) -> TokenData {
        match self {
            ContainerKind::BlockSequence => TokenData::BlockSequenceStart,
            ContainerKind::BlockMapping => TokenData::BlockMappingStart,
        }
    }
}

/// Produces tokens on demand from a [`Reader`].
pub struct Scanner {
    reader: Reader,
    tokens: VecDeque<Token>,
    tokens_parsed: usize,
    stream_start_produced: bool,
    stream_end_produced: bool,
    indents: Vec<i64>,
    indent: i64,
    flow_level: u32,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
    last_comment: Option<Atom>,
    /// Retained comments are surfaced as [`TokenData::Comment`] tokens
    /// rather than silently dropped (spec §9 `strip_comments`).
    keep_comments: bool,
}

impl Scanner {
    pub fn new(input: InputRef) -> Self {
        Scanner {
            reader: Reader::new(input),
            tokens: VecDeque::new(),
            tokens_parsed: 0,
            stream_start_produced: false,
            stream_end_produced: false,
            indents: Vec::new(),
            indent: -1,
            flow_level: 0,
            simple_key_allowed: true,
            simple_keys: vec![SimpleKey::none()],
            last_comment: None,
            keep_comments: false,
        }
    }

    #[must_use]
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    pub fn input(&self) -> &InputRef {
        self.reader.input()
    }

    pub fn take_last_comment(&mut self) -> Option<Atom> {
        self.last_comment.take()
    }

    /// Fetch and return the next token, consuming it.
    pub fn next_token(&mut self) -> Result<Token, ScannerError> {
        if self.tokens.is_empty() {
            self.fetch_more_tokens()?;
        }
        let token = self.tokens.pop_front().expect("fetch_more_tokens populated the queue");
        self.tokens_parsed += 1;
        Ok(token)
    }

    /// Look at the token `offset` positions ahead without consuming it.
    pub fn peek_token(&mut self, offset: usize) -> Result<&Token, ScannerError> {
        while self.tokens.len() <= offset {
            self.fetch_more_tokens()?;
        }
        Ok(&self.tokens[offset])
    }

    fn peek(&self) -> Result<Option<char>, ScannerError> {
        Ok(self.reader.peek(0)?)
    }

    fn peek_at(&self, offset: usize) -> Result<Option<char>, ScannerError> {
        Ok(self.reader.peek(offset)?)
    }

    fn skip(&mut self) -> Result<(), ScannerError> {
        let c = self.reader.peek(0)?.expect("skip on non-EOF cursor");
        self.reader.advance(c);
        Ok(())
    }

    fn mark(&self) -> Mark {
        self.reader.mark()
    }

    fn atom(&self, start: Mark, style: AtomStyle) -> Atom {
        Atom::new(self.reader.input().clone(), start, self.mark(), style)
    }

    fn problem(&self, problem: &'static str) -> ScannerError {
        ScannerError::Simple {
            problem,
            mark: self.mark(),
        }
    }

    // ---- top-level dispatch -------------------------------------------------

    fn fetch_more_tokens(&mut self) -> Result<(), ScannerError> {
        if !self.stream_start_produced {
            self.fetch_stream_start()?;
            return Ok(());
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        let column = self.mark().column as i64;
        self.unroll_indent(column)?;

        if self.reader.is_eof()? {
            self.fetch_stream_end()?;
            return Ok(());
        }

        let mark = self.mark();
        if mark.column == 0 && self.check_document_indicator("---")? {
            self.fetch_document_indicator(TokenData::DocumentStart)?;
            return Ok(());
        }
        if mark.column == 0 && self.check_document_indicator("...")? {
            self.fetch_document_indicator(TokenData::DocumentEnd)?;
            return Ok(());
        }

        match self.peek()? {
            Some('%') if mark.column == 0 => self.fetch_directive(),
            Some('[') => self.fetch_flow_collection_start(TokenData::FlowSequenceStart),
            Some('{') => self.fetch_flow_collection_start(TokenData::FlowMappingStart),
            Some(']') => self.fetch_flow_collection_end(TokenData::FlowSequenceEnd),
            Some('}') => self.fetch_flow_collection_end(TokenData::FlowMappingEnd),
            Some(',') => self.fetch_flow_entry(),
            Some('-') if self.flow_level > 0 || is_blankz(self.peek_at(1)?) => self.fetch_block_entry(),
            Some('?') if self.flow_level > 0 || is_blankz(self.peek_at(1)?) => self.fetch_key(),
            Some(':') if self.flow_level > 0 || is_blankz(self.peek_at(1)?) => self.fetch_value(),
            Some('*') => self.fetch_anchor_or_alias(false),
            Some('&') => self.fetch_anchor_or_alias(true),
            Some('!') => self.fetch_tag(),
            Some('|') if self.flow_level == 0 => self.fetch_block_scalar(false),
            Some('>') if self.flow_level == 0 => self.fetch_block_scalar(true),
            Some('\'') => self.fetch_flow_scalar(true),
            Some('"') => self.fetch_flow_scalar(false),
            Some(c) if !(self.flow_level > 0 && is_flow_indicator(Some(c))) => self.fetch_plain_scalar(),
            Some(_) => Err(self.problem("found character that cannot start any token")),
            None => self.fetch_stream_end(),
        }
    }

    // ---- whitespace/comments ------------------------------------------------

    fn scan_to_next_token(&mut self) -> Result<(), ScannerError> {
        loop {
            while self.peek()? == Some(' ') {
                self.skip()?;
            }
            if self.peek()? == Some('#') {
                self.scan_comment()?;
            }
            if is_break(self.peek()?) {
                self.skip_line_break()?;
                if self.flow_level == 0 {
                    self.simple_key_allowed = true;
                }
                continue;
            }
            break;
        }
        Ok(())
    }

    fn scan_comment(&mut self) -> Result<(), ScannerError> {
        let start = self.mark();
        while !is_breakz(self.peek()?) {
            self.skip()?;
        }
        if self.keep_comments {
            self.last_comment = Some(self.atom(start, AtomStyle::Comment));
        }
        Ok(())
    }

    fn skip_line_break(&mut self) -> Result<(), ScannerError> {
        if self.peek()? == Some('\r') && self.peek_at(1)? == Some('\n') {
            self.skip()?;
            self.skip()?;
        } else {
            self.skip()?;
        }
        Ok(())
    }

    // ---- indentation ---------------------------------------------------------

    fn roll_indent(&mut self, column: i64, token_number: Option<usize>, kind: ContainerKind, mark: Mark) {
        if self.flow_level > 0 {
            return;
        }
        if self.indent < column {
            self.indents.push(self.indent);
            self.indent = column;
            let relative = token_number.map(|n| n.saturating_sub(self.tokens_parsed));
            let token = Token::new(kind.start_token(), mark, mark);
            match relative {
                Some(at) if at < self.tokens.len() => self.tokens.insert(at, token),
                _ => self.tokens.push_back(token),
            }
        }
    }

    fn unroll_indent(&mut self, column: i64) -> Result<(), ScannerError> {
        if self.flow_level > 0 {
            return Ok(());
        }
        while self.indent > column {
            let mark = self.mark();
            self.indent = self.indents.pop().unwrap_or(-1);
            self.tokens.push_back(Token::new(TokenData::BlockEnd, mark, mark));
        }
        Ok(())
    }

    // ---- simple keys ----------------------------------------------------------

    fn save_simple_key(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        if self.simple_key_allowed {
            let required = self.flow_level == 0 && self.indent == self.mark().column as i64;
            let level = self.flow_level as usize;
            if level >= self.simple_keys.len() {
                self.simple_keys.resize(level + 1, SimpleKey::none());
            }
            self.simple_keys[level] = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark(),
            };
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> Result<(), ScannerError> {
        let level = self.flow_level as usize;
        if let Some(key) = self.simple_keys.get_mut(level) {
            if key.possible && key.required {
                return Err(ScannerError::Simple {
                    problem: "could not find expected ':'",
                    mark: key.mark,
                });
            }
            key.possible = false;
        }
        Ok(())
    }

    fn stale_simple_keys(&mut self) -> Result<(), ScannerError> {
        let mark = self.mark();
        for key in &mut self.simple_keys {
            if key.possible && key.mark.line < mark.line {
                if key.required {
                    return Err(ScannerError::Simple {
                        problem: "could not find expected ':'",
                        mark: key.mark,
                    });
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    // ---- stream boundaries ------------------------------------------------------

    fn fetch_stream_start(&mut self) -> Result<(), ScannerError> {
        let mark = self.mark();
        self.indent = -1;
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        let encoding = self.reader.input().encoding();
        self.tokens
            .push_back(Token::new(TokenData::StreamStart { encoding }, mark, mark));
        Ok(())
    }

    fn fetch_stream_end(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1)?;
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let mark = self.mark();
        self.stream_end_produced = true;
        self.tokens.push_back(Token::new(TokenData::StreamEnd, mark, mark));
        Ok(())
    }

    // ---- document indicators ---------------------------------------------------

    fn check_document_indicator(&self, indicator: &str) -> Result<bool, ScannerError> {
        for (i, want) in indicator.chars().enumerate() {
            if self.peek_at(i)? != Some(want) {
                return Ok(false);
            }
        }
        Ok(is_blankz(self.peek_at(indicator.chars().count())?))
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.unroll_indent(-1)?;
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        for _ in 0..3 {
            self.skip()?;
        }
        self.tokens.push_back(Token::new(data, start, self.mark()));
        Ok(())
    }

    // ---- directives -------------------------------------------------------------

    fn fetch_directive(&mut self) -> Result<(), ScannerError> {
        self.unroll_indent(-1)?;
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip()?; // '%'
        let name = self.scan_directive_name()?;
        let data = if name == "YAML" {
            self.skip_blanks()?;
            let major = self.scan_directive_number()?;
            if self.peek()? != Some('.') {
                return Err(self.problem("expected '.' in YAML directive"));
            }
            self.skip()?;
            let minor = self.scan_directive_number()?;
            TokenData::VersionDirective { major, minor }
        } else if name == "TAG" {
            self.skip_blanks()?;
            let handle = self.scan_tag_handle()?;
            self.skip_blanks()?;
            let prefix = self.scan_tag_directive_prefix()?;
            TokenData::TagDirective { handle, prefix }
        } else {
            return Err(ScannerError::Simple {
                problem: "found unknown directive name",
                mark: start,
            });
        };
        self.skip_blanks()?;
        if self.peek()? == Some('#') {
            self.scan_comment()?;
        }
        if !is_breakz(self.peek()?) {
            return Err(self.problem("did not find expected comment or line break"));
        }
        self.tokens.push_back(Token::new(data, start, self.mark()));
        Ok(())
    }

    fn scan_directive_name(&mut self) -> Result<String, ScannerError> {
        let mut name = String::new();
        while is_alpha(self.peek()?) {
            name.push(self.peek()?.unwrap());
            self.skip()?;
        }
        if name.is_empty() {
            return Err(self.problem("could not find expected directive name"));
        }
        Ok(name)
    }

    fn skip_blanks(&mut self) -> Result<(), ScannerError> {
        while is_blank(self.peek()?) {
            self.skip()?;
        }
        Ok(())
    }

    fn scan_directive_number(&mut self) -> Result<i32, ScannerError> {
        let mut value = String::new();
        while is_digit(self.peek()?) {
            value.push(self.peek()?.unwrap());
            self.skip()?;
        }
        value.parse().map_err(|_| self.problem("expected a digit"))
    }

    fn scan_tag_handle(&mut self) -> Result<String, ScannerError> {
        if self.peek()? != Some('!') {
            return Err(self.problem("expected '!'"));
        }
        let mut handle = String::from("!");
        self.skip()?;
        while is_alpha(self.peek()?) {
            handle.push(self.peek()?.unwrap());
            self.skip()?;
        }
        if self.peek()? == Some('!') {
            handle.push('!');
            self.skip()?;
        }
        Ok(handle)
    }

    fn scan_tag_directive_prefix(&mut self) -> Result<String, ScannerError> {
        let mut prefix = String::new();
        while !is_blankz(self.peek()?) {
            prefix.push(self.peek()?.unwrap());
            self.skip()?;
        }
        Ok(prefix)
    }

    // ---- flow indicators -------------------------------------------------------

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.flow_level += 1;
        self.simple_keys.push(SimpleKey::none());
        self.simple_key_allowed = true;
        let start = self.mark();
        self.skip()?;
        self.tokens.push_back(Token::new(data, start, self.mark()));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip()?;
        self.tokens.push_back(Token::new(data, start, self.mark()));
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark();
        self.skip()?;
        self.tokens.push_back(Token::new(TokenData::FlowEntry, start, self.mark()));
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(self.problem("block sequence entries are not allowed in this context"));
            }
            let mark = self.mark();
            self.roll_indent(mark.column as i64, None, ContainerKind::BlockSequence, mark);
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark();
        self.skip()?;
        self.tokens.push_back(Token::new(TokenData::BlockEntry, start, self.mark()));
        Ok(())
    }

    fn fetch_key(&mut self) -> Result<(), ScannerError> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(self.problem("mapping keys are not allowed in this context"));
            }
            let mark = self.mark();
            self.roll_indent(mark.column as i64, None, ContainerKind::BlockMapping, mark);
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start = self.mark();
        self.skip()?;
        self.tokens.push_back(Token::new(TokenData::Key, start, self.mark()));
        Ok(())
    }

    fn fetch_value(&mut self) -> Result<(), ScannerError> {
        let level = self.flow_level as usize;
        let simple_key = self.simple_keys.get(level).copied().unwrap_or(SimpleKey::none());
        if simple_key.possible {
            let mark = simple_key.mark;
            self.roll_indent(mark.column as i64, Some(simple_key.token_number), ContainerKind::BlockMapping, mark);
            if let Some(k) = self.simple_keys.get_mut(level) {
                k.possible = false;
            }
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 && !self.simple_key_allowed {
                return Err(self.problem("mapping values are not allowed in this context"));
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start = self.mark();
        self.skip()?;
        self.tokens.push_back(Token::new(TokenData::Value, start, self.mark()));
        Ok(())
    }

    // ---- anchors/aliases/tags -------------------------------------------------

    fn fetch_anchor_or_alias(&mut self, is_anchor: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip()?;
        let mut value = String::new();
        while is_alpha(self.peek()?) {
            value.push(self.peek()?.unwrap());
            self.skip()?;
        }
        if value.is_empty() {
            return Err(self.problem("expected alphabetic or numeric character"));
        }
        let data = if is_anchor {
            TokenData::Anchor { value }
        } else {
            TokenData::Alias { value }
        };
        self.tokens.push_back(Token::new(data, start, self.mark()));
        Ok(())
    }

    fn fetch_tag(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        self.skip()?; // '!'

        if self.peek()? == Some('<') {
            self.skip()?;
            let suffix_start = self.mark();
            while self.peek()? != Some('>') {
                if is_breakz(self.peek()?) {
                    return Err(self.problem("did not find expected '>'"));
                }
                self.skip()?;
            }
            let suffix = self.atom(suffix_start, AtomStyle::Uri);
            self.skip()?;
            self.tokens.push_back(Token::new(
                TokenData::Tag {
                    handle: String::new(),
                    suffix,
                },
                start,
                self.mark(),
            ));
            return Ok(());
        }

        let mut handle = String::from("!");
        let mut scanned = String::new();
        while is_alpha(self.peek()?) {
            scanned.push(self.peek()?.unwrap());
            self.skip()?;
        }
        if self.peek()? == Some('!') {
            handle.push_str(&scanned);
            handle.push('!');
            self.skip()?;
        } else {
            // No closing bang: the bare `!` is the primary handle and
            // everything scanned is actually the tag suffix.
            handle = String::from("!");
            let suffix_start_byte = start.index + 1;
            let suffix_start = Mark {
                index: suffix_start_byte,
                line: start.line,
                column: start.column + 1,
            };
            let suffix = self.continue_tag_suffix(suffix_start)?;
            self.tokens.push_back(Token::new(
                TokenData::Tag { handle, suffix },
                start,
                self.mark(),
            ));
            return Ok(());
        }
        let suffix = self.continue_tag_suffix(self.mark())?;
        self.tokens.push_back(Token::new(
            TokenData::Tag { handle, suffix },
            start,
            self.mark(),
        ));
        Ok(())
    }

    fn continue_tag_suffix(&mut self, suffix_start: Mark) -> Result<Atom, ScannerError> {
        while !is_blankz(self.peek()?) && !(self.flow_level > 0 && is_flow_indicator(self.peek()?)) {
            self.skip()?;
        }
        Ok(self.atom(suffix_start, AtomStyle::Uri))
    }

    // ---- block scalars ----------------------------------------------------------

    fn fetch_block_scalar(&mut self, folded: bool) -> Result<(), ScannerError> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let indicator_mark = self.mark();
        self.skip()?; // '|' or '>'

        let mut chomp = Chomp::Clip;
        let mut explicit_indent: Option<u32> = None;
        for _ in 0..2 {
            match self.peek()? {
                Some('-') => {
                    chomp = Chomp::Strip;
                    self.skip()?;
                }
                Some('+') => {
                    chomp = Chomp::Keep;
                    self.skip()?;
                }
                Some(c) if c.is_ascii_digit() && c != '0' => {
                    explicit_indent = c.to_digit(10);
                    self.skip()?;
                }
                _ => break,
            }
        }
        self.skip_blanks()?;
        if self.peek()? == Some('#') {
            self.scan_comment()?;
        }
        if !is_breakz(self.peek()?) {
            return Err(self.problem("did not find expected comment or line break"));
        }
        if is_break(self.peek()?) {
            self.skip_line_break()?;
        }

        let block_base = (self.indent.max(0)) as u32;
        let block_indent = match explicit_indent {
            Some(n) => block_base + n,
            None => self.detect_block_scalar_indent(block_base)?,
        };

        let content_start = self.mark();
        let mut saw_content = false;
        loop {
            if self.reader.is_eof()? {
                break;
            }
            let col = self.mark().column;
            if !is_breakz(self.peek()?) && col < block_indent as u64 {
                break;
            }
            while is_blank(self.peek()?) && self.mark().column < block_indent as u64 {
                self.skip()?;
            }
            if self.mark().column < block_indent as u64 && !is_breakz(self.peek()?) {
                break;
            }
            while !is_breakz(self.peek()?) {
                saw_content = true;
                self.skip()?;
            }
            if is_break(self.peek()?) {
                self.skip_line_break()?;
            } else {
                break;
            }
        }
        let _ = saw_content;
        let atom = Atom::new(self.reader.input().clone(), content_start, self.mark(), if folded { AtomStyle::Folded } else { AtomStyle::Literal })
            .with_chomp(chomp)
            .with_indent(explicit_indent)
            .with_block_indent(Some(block_indent));
        self.tokens.push_back(Token::new(
            TokenData::Scalar { value: atom },
            indicator_mark,
            self.mark(),
        ));
        Ok(())
    }

    /// Peek ahead through any leading blank lines to find the first content
    /// line's column, which becomes the implicit block indentation.
    fn detect_block_scalar_indent(&mut self, block_base: u32) -> Result<u32, ScannerError> {
        let mut max_blank_column = 0u64;
        loop {
            while self.peek()? == Some(' ') {
                self.skip()?;
            }
            max_blank_column = max_blank_column.max(self.mark().column);
            if is_break(self.peek()?) {
                self.skip_line_break()?;
                continue;
            }
            break;
        }
        Ok((max_blank_column as u32).max(block_base + 1))
    }

    // ---- quoted scalars -----------------------------------------------------------

    fn fetch_flow_scalar(&mut self, single: bool) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        let quote = if single { '\'' } else { '"' };
        self.skip()?;
        loop {
            match self.peek()? {
                None => return Err(self.problem("unexpected end of stream while scanning a quoted scalar")),
                Some(c) if c == quote => {
                    if single && self.peek_at(1)? == Some('\'') {
                        self.skip()?;
                        self.skip()?;
                        continue;
                    }
                    self.skip()?;
                    break;
                }
                Some('\\') if !single => {
                    self.skip()?;
                    if is_breakz(self.peek()?) {
                        self.skip_line_break()?;
                    } else {
                        self.skip()?;
                    }
                }
                Some(c) if is_break(Some(c)) => {
                    self.skip_line_break()?;
                }
                _ => {
                    self.skip()?;
                }
            }
        }
        let style = if single {
            AtomStyle::SingleQuoted
        } else {
            AtomStyle::DoubleQuoted
        };
        let atom = self.atom(start, style);
        self.tokens.push_back(Token::new(TokenData::Scalar { value: atom }, start, self.mark()));
        Ok(())
    }

    // ---- plain scalars --------------------------------------------------------------

    fn fetch_plain_scalar(&mut self) -> Result<(), ScannerError> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark();
        loop {
            if is_break(self.peek()?) {
                break;
            }
            match self.peek()? {
                None => break,
                Some('#') if is_blank(self.prev_char()) => break,
                Some(':') if is_blankz(self.peek_at(1)?) => break,
                Some(':') if self.flow_level > 0 && is_flow_indicator(self.peek_at(1)?) => break,
                Some(c) if self.flow_level > 0 && is_flow_indicator(Some(c)) => break,
                _ => {
                    self.skip()?;
                }
            }
        }
        let atom = self.atom(start, AtomStyle::Plain);
        self.tokens.push_back(Token::new(TokenData::Scalar { value: atom }, start, self.mark()));
        Ok(())
    }

    fn prev_char(&self) -> Option<char> {
        let pos = self.reader.byte_pos();
        if pos == 0 {
            return None;
        }
        self.reader.input().text()[..pos].chars().next_back()
    }
}

fn is_flow_indicator(c: Option<char>) -> bool {
    matches!(c, Some(',') | Some('[') | Some(']') | Some('{') | Some('}'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;

    fn scan_all(src: &str) -> Vec<TokenData> {
        let mut scanner = Scanner::new(Input::from_str("t", src));
        let mut out = Vec::new();
        loop {
            let tok = scanner.next_token().unwrap();
            let is_end = matches!(tok.data, TokenData::StreamEnd);
            out.push(tok.data);
            if is_end {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_flow_sequence_of_plain_scalars() {
        let tokens = scan_all("[a, b, c]\n");
        assert!(matches!(tokens[0], TokenData::StreamStart { .. }));
        assert!(matches!(tokens[1], TokenData::FlowSequenceStart));
        assert!(matches!(tokens[2], TokenData::Scalar { .. }));
        assert!(matches!(tokens.last().unwrap(), TokenData::StreamEnd));
    }

    #[test]
    fn scans_block_mapping() {
        let tokens = scan_all("a: 1\nb: 2\n");
        let has_block_mapping_start = tokens.iter().any(|t| matches!(t, TokenData::BlockMappingStart));
        let has_block_end = tokens.iter().any(|t| matches!(t, TokenData::BlockEnd));
        assert!(has_block_mapping_start);
        assert!(has_block_end);
    }

    #[test]
    fn scans_single_quoted_scalar_with_escaped_quote() {
        let tokens = scan_all("'it''s'\n");
        let scalar = tokens
            .iter()
            .find_map(|t| match t {
                TokenData::Scalar { value } => Some(value),
                _ => None,
            })
            .unwrap();
        assert_eq!(scalar.format(), "it's");
    }

    #[test]
    fn scans_literal_block_scalar() {
        let tokens = scan_all("v: |\n  one\n  two\n");
        let scalar = tokens
            .iter()
            .find_map(|t| match t {
                TokenData::Scalar { value } if value.style == AtomStyle::Literal => Some(value),
                _ => None,
            })
            .unwrap();
        assert_eq!(scalar.format(), "one\ntwo\n");
    }
}
