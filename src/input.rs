//! Named byte sources feeding the [`crate::reader::Reader`] (spec §3 "Input").
//!
//! An `Input` is file-backed, stream-backed, or memory-backed. Regardless
//! of backing, it exposes one thing to the reader: a monotonically growing
//! decoded-text buffer that atoms can borrow byte ranges from. Bytes already
//! decoded are never discarded, so atoms created earlier in the stream
//! remain valid for as long as the `Rc<Input>` is alive — the "old bytes
//! remain accessible" requirement in spec §4.1, simplified from a sliding
//! window to an append-only buffer.

use std::cell::{Ref, RefCell};
use std::collections::VecDeque;
use std::io::Read;
use std::rc::Rc;

use crate::error::ReaderError;
use crate::Encoding;

const RAW_CHUNK_SIZE: usize = 16384;

enum Source {
    /// Already fully staged (memory-backed, or a whole file read eagerly).
    Complete,
    /// Pulled incrementally; `eof` latches once the reader returns 0.
    Stream { reader: Box<dyn Read>, eof: bool },
}

/// A named byte source.
pub struct Input {
    name: String,
    source: RefCell<Source>,
    /// Raw bytes staged but not yet decoded into `text`.
    pending: RefCell<VecDeque<u8>>,
    /// Decoded text accumulated so far. Always valid UTF-8.
    text: RefCell<String>,
    encoding: RefCell<Option<Encoding>>,
}

/// A reference-counted handle to an [`Input`].
///
/// Every atom that borrows from an input holds a clone of this handle,
/// which is how the "input must outlive its atoms" invariant (spec §5) is
/// enforced in safe Rust: the input cannot be dropped while a live `Rc`
/// remains.
pub type InputRef = Rc<Input>;

impl Input {
    /// A memory-backed input borrowing from an owned byte buffer.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> InputRef {
        Rc::new(Input {
            name: name.into(),
            source: RefCell::new(Source::Complete),
            pending: RefCell::new(VecDeque::from(bytes)),
            text: RefCell::new(String::new()),
            encoding: RefCell::new(None),
        })
    }

    /// A memory-backed input borrowing a string directly (already known to
    /// be valid UTF-8, so encoding detection is skipped).
    pub fn from_str(name: impl Into<String>, data: &str) -> InputRef {
        Rc::new(Input {
            name: name.into(),
            source: RefCell::new(Source::Complete),
            pending: RefCell::new(VecDeque::new()),
            text: RefCell::new(data.to_string()),
            encoding: RefCell::new(Some(Encoding::Utf8)),
        })
    }

    /// A stream-backed input. Bytes are pulled in chunks as
    /// `ensure_text_len` requires them; nothing is read eagerly.
    pub fn from_reader(name: impl Into<String>, reader: impl Read + 'static) -> InputRef {
        Rc::new(Input {
            name: name.into(),
            source: RefCell::new(Source::Stream {
                reader: Box::new(reader),
                eof: false,
            }),
            pending: RefCell::new(VecDeque::new()),
            text: RefCell::new(String::new()),
            encoding: RefCell::new(None),
        })
    }

    /// A file-backed input. The file is read to completion eagerly; a true
    /// memory-mapped variant is out of scope (spec §1 names the pluggable
    /// allocator / mmap plumbing as an external collaborator).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> std::io::Result<InputRef> {
        let name = path.as_ref().display().to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pull one more raw chunk from a streaming source into `pending`.
    /// No-op (returns `false`) for complete sources and at true EOF.
    fn pull_more_raw(&self) -> Result<bool, ReaderError> {
        let mut source = self.source.borrow_mut();
        match &mut *source {
            Source::Complete => Ok(false),
            Source::Stream { reader, eof } => {
                if *eof {
                    return Ok(false);
                }
                let mut chunk = vec![0u8; RAW_CHUNK_SIZE];
                let n = reader.read(&mut chunk)?;
                if n == 0 {
                    *eof = true;
                    return Ok(false);
                }
                chunk.truncate(n);
                self.pending.borrow_mut().extend(chunk);
                Ok(true)
            }
        }
    }

    fn is_at_eof(&self) -> bool {
        matches!(&*self.source.borrow(), Source::Complete)
            || matches!(&*self.source.borrow(), Source::Stream { eof: true, .. })
    }

    fn detect_encoding_if_needed(&self) -> Result<(), ReaderError> {
        if self.encoding.borrow().is_some() {
            return Ok(());
        }
        while self.pending.borrow().len() < 4 && !self.is_at_eof() {
            if !self.pull_more_raw()? {
                break;
            }
        }
        let enc = sniff_bom(&mut self.pending.borrow_mut());
        *self.encoding.borrow_mut() = Some(enc);
        Ok(())
    }

    /// Ensure at least `len` bytes of decoded text are available, pulling
    /// and decoding more raw bytes as needed. Returns the number of bytes
    /// actually available (may be less than `len` at true EOF).
    pub(crate) fn ensure_text_len(&self, len: usize) -> Result<usize, ReaderError> {
        self.detect_encoding_if_needed()?;
        loop {
            if self.text.borrow().len() >= len {
                return Ok(self.text.borrow().len());
            }
            if self.pending.borrow().is_empty() && !self.pull_more_raw()? && self.is_at_eof() {
                return Ok(self.text.borrow().len());
            }
            let encoding = self.encoding.borrow().unwrap_or(Encoding::Utf8);
            let eof = self.is_at_eof();
            let progressed = decode_one(
                &mut self.pending.borrow_mut(),
                encoding,
                &mut self.text.borrow_mut(),
                eof,
            )?;
            if !progressed && !self.pull_more_raw()? && self.is_at_eof() {
                return Ok(self.text.borrow().len());
            }
        }
    }

    /// Borrow the decoded text accumulated so far.
    pub fn text(&self) -> Ref<'_, String> {
        self.text.borrow()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding.borrow().unwrap_or(Encoding::Utf8)
    }
}

fn sniff_bom(pending: &mut VecDeque<u8>) -> Encoding {
    const BOM_UTF8: [u8; 3] = [0xEF, 0xBB, 0xBF];
    const BOM_UTF16LE: [u8; 2] = [0xFF, 0xFE];
    const BOM_UTF16BE: [u8; 2] = [0xFE, 0xFF];

    if starts_with(pending, &BOM_UTF16LE) {
        pending.drain(0..2);
        Encoding::Utf16Le
    } else if starts_with(pending, &BOM_UTF16BE) {
        pending.drain(0..2);
        Encoding::Utf16Be
    } else if starts_with(pending, &BOM_UTF8) {
        pending.drain(0..3);
        Encoding::Utf8
    } else {
        Encoding::Utf8
    }
}

fn starts_with(deque: &VecDeque<u8>, needle: &[u8]) -> bool {
    deque.len() >= needle.len() && deque.iter().zip(needle).all(|(a, b)| a == b)
}

/// Decode one code point (UTF-8 or UTF-16, per `encoding`) from the front of
/// `pending` and append it to `text`. Returns `true` if a code point was
/// decoded, `false` if `pending` held an incomplete trailing sequence (more
/// raw bytes are needed, unless `eof` is set, in which case that is an
/// error).
fn decode_one(
    pending: &mut VecDeque<u8>,
    encoding: Encoding,
    text: &mut String,
    eof: bool,
) -> Result<bool, ReaderError> {
    if pending.is_empty() {
        return Ok(false);
    }
    let ch = match encoding {
        Encoding::Utf16Le => read_char_utf16(pending, false, eof)?,
        Encoding::Utf16Be => read_char_utf16(pending, true, eof)?,
        Encoding::Utf8 | Encoding::Any => read_char_utf8(pending, eof)?,
    };
    match ch {
        Some(c) => {
            if !is_printable(c) {
                return Err(ReaderError::Problem {
                    problem: "control characters are not allowed",
                    offset: text.len() as u64,
                    value: c as i32,
                });
            }
            text.push(c);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn is_printable(ch: char) -> bool {
    matches!(ch, '\u{09}' | '\u{0A}' | '\u{0D}')
        || ('\u{20}'..='\u{7E}').contains(&ch)
        || ch == '\u{85}'
        || ('\u{A0}'..='\u{D7FF}').contains(&ch)
        || ('\u{E000}'..='\u{FFFD}').contains(&ch)
        || ('\u{10000}'..='\u{10FFFF}').contains(&ch)
}

fn utf8_width_and_initial(initial: u8) -> (usize, u32) {
    let initial = initial as u32;
    if initial & 0x80 == 0 {
        (1, initial & 0x7f)
    } else if initial & 0xE0 == 0xC0 {
        (2, initial & 0x1f)
    } else if initial & 0xF0 == 0xE0 {
        (3, initial & 0x0f)
    } else if initial & 0xF8 == 0xF0 {
        (4, initial & 0x07)
    } else {
        (0, 0)
    }
}

fn read_char_utf8(pending: &mut VecDeque<u8>, eof: bool) -> Result<Option<char>, ReaderError> {
    let first = *pending.front().expect("checked non-empty");
    let (width, mut value) = utf8_width_and_initial(first);
    if width == 0 {
        return Err(ReaderError::InvalidUtf8 {
            offset: 0,
            value: first,
        });
    }
    if pending.len() < width {
        if eof {
            return Err(ReaderError::Problem {
                problem: "incomplete UTF-8 octet sequence",
                offset: 0,
                value: -1,
            });
        }
        return Ok(None);
    }
    for (i, trailing) in pending.iter().enumerate().take(width).skip(1) {
        if trailing & 0xc0 != 0x80 {
            return Err(ReaderError::InvalidUtf8 {
                offset: i as u64,
                value: *trailing,
            });
        }
        value <<= 6;
        value += *trailing as u32 & 0x3f;
    }
    let valid_len = width == 1
        || (width == 2 && value >= 0x80)
        || (width == 3 && value >= 0x800)
        || (width == 4 && value >= 0x10000);
    if !valid_len {
        return Err(ReaderError::Problem {
            problem: "invalid length of a UTF-8 sequence",
            offset: 0,
            value: -1,
        });
    }
    let ch = char::from_u32(value).ok_or(ReaderError::Problem {
        problem: "invalid Unicode character",
        offset: 0,
        value: value as i32,
    })?;
    pending.drain(..width);
    Ok(Some(ch))
}

fn read_char_utf16(
    pending: &mut VecDeque<u8>,
    big_endian: bool,
    eof: bool,
) -> Result<Option<char>, ReaderError> {
    if pending.len() < 2 {
        return if eof {
            Err(ReaderError::Problem {
                problem: "incomplete UTF-16 character",
                offset: 0,
                value: -1,
            })
        } else {
            Ok(None)
        };
    }
    let unit = |a: u8, b: u8| -> u32 {
        if big_endian {
            u16::from_be_bytes([a, b]) as u32
        } else {
            u16::from_le_bytes([a, b]) as u32
        }
    };
    let mut value = unit(pending[0], pending[1]);
    if (0xdc00..=0xdfff).contains(&value) {
        return Err(ReaderError::InvalidUtf16 { value: value as u16 });
    }
    let width;
    if (0xd800..=0xdbff).contains(&value) {
        width = 4;
        if pending.len() < width {
            return if eof {
                Err(ReaderError::Problem {
                    problem: "incomplete UTF-16 surrogate pair",
                    offset: 0,
                    value: -1,
                })
            } else {
                Ok(None)
            };
        }
        let low = unit(pending[2], pending[3]);
        if !(0xdc00..=0xdfff).contains(&low) {
            return Err(ReaderError::InvalidUtf16 { value: low as u16 });
        }
        value = 0x10000 + ((value - 0xd800) << 10) + (low - 0xdc00);
    } else {
        width = 2;
    }
    let ch = char::from_u32(value).ok_or(ReaderError::Problem {
        problem: "invalid Unicode character",
        offset: 0,
        value: value as i32,
    })?;
    pending.drain(..width);
    Ok(Some(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_memory_input_decodes_fully() {
        let input = Input::from_bytes("mem", b"hello".to_vec());
        let n = input.ensure_text_len(5).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&*input.text(), "hello");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"abc");
        let input = Input::from_bytes("mem", bytes);
        input.ensure_text_len(3).unwrap();
        assert_eq!(&*input.text(), "abc");
        assert_eq!(input.encoding(), Encoding::Utf8);
    }

    #[test]
    fn streaming_input_pulls_incrementally() {
        let data = b"streamed text".to_vec();
        let input = Input::from_reader("stream", std::io::Cursor::new(data));
        let n = input.ensure_text_len(100).unwrap();
        assert_eq!(n, "streamed text".len());
        assert_eq!(&*input.text(), "streamed text");
    }
}
