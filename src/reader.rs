//! The reader: buffered code-point lookahead over an [`Input`] (spec §4.1).
//!
//! The reader never re-decodes; it walks the append-only decoded text an
//! [`Input`] accumulates, so bytes already seen remain addressable for as
//! long as the underlying `Rc<Input>` lives — which is also what lets an
//! `Atom` outlive the reader's own cursor.

use crate::error::{Mark, ReaderError};
use crate::input::InputRef;

/// Decoded-text cursor feeding the scanner.
pub struct Reader {
    input: InputRef,
    /// Byte offset into `input.text()` of the next code point to peek.
    pos: usize,
    mark: Mark,
    /// The last code point consumed by `advance`, used to collapse a
    /// CR-LF pair into a single line break.
    last: Option<char>,
}

impl Reader {
    pub fn new(input: InputRef) -> Self {
        Reader {
            input,
            pos: 0,
            mark: Mark::default(),
            last: None,
        }
    }

    /// Guarantee that at least `n` code points starting at the cursor are
    /// decoded, pulling more raw bytes as needed. Returns the number of code
    /// points actually available, which is less than `n` only at true EOF.
    pub fn ensure_lookahead(&self, n: usize) -> Result<usize, ReaderError> {
        loop {
            let available = self.input.text()[self.pos..].chars().count();
            if available >= n {
                return Ok(available);
            }
            // Worst case four raw bytes per remaining code point, plus a
            // margin so a single extra pull can satisfy deep lookahead.
            let want = self.pos + (n - available) * 4 + 4;
            let got = self.input.ensure_text_len(want)?;
            let now_available = self.input.text()[self.pos..].chars().count();
            if got < want && now_available == available {
                // No more raw bytes will ever arrive.
                return Ok(now_available);
            }
        }
    }

    /// The code point `offset` code points ahead of the cursor, or `None`
    /// at end of input.
    pub fn peek(&self, offset: usize) -> Result<Option<char>, ReaderError> {
        self.ensure_lookahead(offset + 1)?;
        Ok(self.input.text()[self.pos..].chars().nth(offset))
    }

    /// Consume one code point (which must be the result of `peek(0)`),
    /// advancing the cursor and updating line/column. A CR immediately
    /// followed by an LF counts as a single line break (spec §4.1).
    pub fn advance(&mut self, c: char) {
        self.pos += c.len_utf8();
        self.mark.index += c.len_utf8() as u64;
        match c {
            '\n' if self.last == Some('\r') => {
                // Already counted when the preceding '\r' was consumed.
            }
            '\n' | '\r' => {
                self.mark.line += 1;
                self.mark.column = 0;
            }
            _ => {
                self.mark.column += 1;
            }
        }
        self.last = Some(c);
    }

    /// The mark at the current cursor position.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// The byte offset into the input's decoded text at the current cursor.
    /// Used by callers building an [`Atom`](crate::atom::Atom) that needs a
    /// [`Mark`] whose `index` matches a byte position rather than a
    /// code-point count.
    pub fn byte_pos(&self) -> usize {
        self.pos
    }

    pub fn input(&self) -> &InputRef {
        &self.input
    }

    /// True once the cursor cannot advance any further.
    pub fn is_eof(&self) -> Result<bool, ReaderError> {
        Ok(self.peek(0)?.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Input;

    #[test]
    fn peek_does_not_consume() {
        let r = Reader::new(Input::from_str("t", "ab"));
        assert_eq!(r.peek(0).unwrap(), Some('a'));
        assert_eq!(r.peek(0).unwrap(), Some('a'));
        assert_eq!(r.peek(1).unwrap(), Some('b'));
    }

    #[test]
    fn advance_tracks_line_and_column() {
        let mut r = Reader::new(Input::from_str("t", "ab\ncd"));
        for _ in 0..3 {
            let c = r.peek(0).unwrap().unwrap();
            r.advance(c);
        }
        assert_eq!(r.mark().line, 1);
        assert_eq!(r.mark().column, 0);
    }

    #[test]
    fn crlf_counts_as_one_line_break() {
        let mut r = Reader::new(Input::from_str("t", "a\r\nb"));
        let c = r.peek(0).unwrap().unwrap();
        r.advance(c);
        let c = r.peek(0).unwrap().unwrap();
        r.advance(c);
        let c = r.peek(0).unwrap().unwrap();
        r.advance(c);
        assert_eq!(r.mark().line, 1);
    }

    #[test]
    fn eof_returns_none() {
        let r = Reader::new(Input::from_str("t", ""));
        assert_eq!(r.peek(0).unwrap(), None);
        assert!(r.is_eof().unwrap());
    }
}
