//! The path-expression lexer (spec.md §4.8).
//!
//! Runs a two-mode scan the same way the main scanner switches between
//! block and flow context: a `Path` mode, where `*`/`/` mean every-child and
//! chain, and a `Scalar` mode, entered right after a comparison operator and
//! restored once a scalar literal or a closing `)` is lexed, where the same
//! characters mean multiply and divide. Doing the disambiguation here
//! (rather than in the compiler) means every downstream token already knows
//! which grammar it belongs to.

use crate::error::{Mark, PathCompileError};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokKind {
    Caret,
    Dot,
    DotDot,
    EveryChild,
    EveryChildRecursive,
    Alias(String),
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    ChainSlash,
    Comma,
    OrOr,
    AndAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Multiply,
    Divide,
    Dollar,
    Percent,
    Bang,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Colon,
    Eof,
}

#[derive(Clone, Debug)]
pub(crate) struct Tok {
    pub(crate) kind: TokKind,
    pub(crate) mark: Mark,
}

#[derive(Copy, Clone, PartialEq)]
enum Mode {
    Path,
    Scalar,
}

pub(crate) struct Lexer<'s> {
    source: &'s str,
    index: usize,
    line: u64,
    column: u64,
    mode: Mode,
}

impl<'s> Lexer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Lexer {
            source,
            index: 0,
            line: 0,
            column: 0,
            mode: Mode::Path,
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            index: self.index as u64,
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.source[self.index..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Tok>, PathCompileError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.kind == TokKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Tok, PathCompileError> {
        self.skip_whitespace();
        let start = self.mark();
        let Some(ch) = self.peek() else {
            return Ok(Tok {
                kind: TokKind::Eof,
                mark: start,
            });
        };

        let kind = match ch {
            '^' => {
                self.bump();
                TokKind::Caret
            }
            '.' => {
                self.bump();
                if self.peek() == Some('.') {
                    self.bump();
                    TokKind::DotDot
                } else {
                    TokKind::Dot
                }
            }
            '*' => {
                self.bump();
                match self.mode {
                    Mode::Scalar => TokKind::Multiply,
                    Mode::Path => {
                        if self.peek() == Some('*') {
                            self.bump();
                            TokKind::EveryChildRecursive
                        } else if is_ident_start(self.peek()) {
                            let name = self.scan_ident();
                            TokKind::Alias(name)
                        } else {
                            TokKind::EveryChild
                        }
                    }
                }
            }
            '/' => {
                self.bump();
                match self.mode {
                    Mode::Scalar => TokKind::Divide,
                    Mode::Path => TokKind::ChainSlash,
                }
            }
            ',' => {
                self.bump();
                TokKind::Comma
            }
            '|' => {
                self.bump();
                if self.peek() == Some('|') {
                    self.bump();
                    TokKind::OrOr
                } else {
                    return Err(PathCompileError::UnexpectedChar('|'));
                }
            }
            '&' => {
                self.bump();
                if self.peek() == Some('&') {
                    self.bump();
                    TokKind::AndAnd
                } else {
                    return Err(PathCompileError::UnexpectedChar('&'));
                }
            }
            '=' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                } else {
                    return Err(PathCompileError::UnexpectedChar('='));
                }
                self.mode = Mode::Scalar;
                TokKind::Eq
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    self.mode = Mode::Scalar;
                    TokKind::Ne
                } else {
                    TokKind::Bang
                }
            }
            '<' => {
                self.bump();
                self.mode = Mode::Scalar;
                if self.peek() == Some('=') {
                    self.bump();
                    TokKind::Le
                } else {
                    TokKind::Lt
                }
            }
            '>' => {
                self.bump();
                self.mode = Mode::Scalar;
                if self.peek() == Some('=') {
                    self.bump();
                    TokKind::Ge
                } else {
                    TokKind::Gt
                }
            }
            '+' => {
                self.bump();
                TokKind::Plus
            }
            '-' => {
                self.bump();
                TokKind::Minus
            }
            '$' => {
                self.bump();
                TokKind::Dollar
            }
            '%' => {
                self.bump();
                TokKind::Percent
            }
            '[' => {
                self.bump();
                TokKind::LBracket
            }
            ']' => {
                self.bump();
                TokKind::RBracket
            }
            '{' => {
                self.bump();
                TokKind::LBrace
            }
            '}' => {
                self.bump();
                TokKind::RBrace
            }
            '(' => {
                self.bump();
                TokKind::LParen
            }
            ')' => {
                self.bump();
                self.mode = Mode::Path;
                TokKind::RParen
            }
            ':' => {
                self.bump();
                TokKind::Colon
            }
            '\'' | '"' => {
                let value = self.scan_quoted(ch)?;
                self.mode = Mode::Path;
                TokKind::Str(value)
            }
            c if c.is_ascii_digit() => {
                let (kind, is_float) = self.scan_number();
                let _ = is_float;
                self.mode = Mode::Path;
                kind
            }
            c if is_ident_start(Some(c)) => {
                let name = self.scan_ident();
                TokKind::Ident(name)
            }
            c => return Err(PathCompileError::UnexpectedChar(c)),
        };

        Ok(Tok { kind, mark: start })
    }

    fn scan_ident(&mut self) -> String {
        let mut s = String::new();
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            s.push(self.bump().unwrap());
        }
        s
    }

    fn scan_number(&mut self) -> (TokKind, bool) {
        let start = self.index;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek2(), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.source[start..self.index];
        if is_float {
            (TokKind::Float(text.parse().unwrap_or(0.0)), true)
        } else {
            (TokKind::Int(text.parse().unwrap_or(0)), false)
        }
    }

    fn scan_quoted(&mut self, quote: char) -> Result<String, PathCompileError> {
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                None => return Err(PathCompileError::UnterminatedLiteral),
                Some(c) if c == quote => break,
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('\\') => s.push('\\'),
                    Some(c) if c == quote => s.push(quote),
                    Some(c) => s.push(c),
                    None => return Err(PathCompileError::UnterminatedLiteral),
                },
                Some(c) => s.push(c),
            }
        }
        Ok(s)
    }
}

fn is_ident_start(ch: Option<char>) -> bool {
    matches!(ch, Some(c) if c.is_alphabetic() || c == '_')
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}
