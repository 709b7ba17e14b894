//! Flushes the emitter's internal text buffer to its sink, re-encoding to
//! UTF-16 on the way out when that is the configured output encoding.

use std::io::Write;

use crate::emitter::Emitter;
use crate::error::WriterError;
use crate::Encoding;

impl<'w> Emitter<'w> {
    /// Flush the accumulated characters to the output.
    pub(crate) fn flush(&mut self) -> Result<(), WriterError> {
        assert!(self.write_handler.is_some(), "no output sink configured");
        assert_ne!(self.encoding, Encoding::Any);

        if self.buffer.is_empty() {
            return Ok(());
        }

        // TODO: Support partial writes. These calls fail unless the writer is
        // able to write absolutely everything in the buffer.

        if self.encoding == Encoding::Utf8 {
            let to_emit = self.buffer.as_bytes();
            self.write_handler
                .as_mut()
                .expect("non-null writer")
                .write_all(to_emit)?;
            self.buffer.clear();
            return Ok(());
        }

        let big_endian = match self.encoding {
            Encoding::Any | Encoding::Utf8 => unreachable!("unhandled encoding"),
            Encoding::Utf16Le => false,
            Encoding::Utf16Be => true,
        };

        for ch in self.buffer.encode_utf16() {
            let bytes = if big_endian { ch.to_be_bytes() } else { ch.to_le_bytes() };
            self.raw_buffer.extend(bytes);
        }

        let to_emit = self.raw_buffer.as_slice();
        self.write_handler
            .as_mut()
            .expect("non-null writer")
            .write_all(to_emit)?;
        self.buffer.clear();
        self.raw_buffer.clear();
        Ok(())
    }
}
