use crate::protocol::{LineLength, MultipartError, PayloadItem};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Streaming quoted-printable encoder (RFC 2045 section 6.7).
///
/// Line breaks of the input (`\r\n` or a lone `\n`) become hard CRLF breaks;
/// every other line is soft-broken with `=\r\n` before it exceeds the line
/// length. Whitespace is held back until the next octet is known, because
/// whitespace right before a line break must be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedPrintableEncoder {
    line_length: LineLength,
    column: usize,
    pending_space: Option<u8>,
    pending_cr: bool,
    eof: bool,
}

impl QuotedPrintableEncoder {
    pub fn new(line_length: LineLength) -> Self {
        Self { line_length, column: 0, pending_space: None, pending_cr: false, eof: false }
    }

    fn push_octet(&mut self, b: u8, dst: &mut BytesMut) {
        if self.pending_cr {
            if b == b'\n' {
                self.pending_cr = false;
                self.hard_break(dst);
                return;
            }
            self.pending_cr = false;
            self.flush_space(false, dst);
            self.emit_escaped(b'\r', dst);
        }

        match b {
            b'\r' => self.pending_cr = true,
            b'\n' => self.hard_break(dst),
            b' ' | b'\t' => {
                self.flush_space(false, dst);
                self.pending_space = Some(b);
            }
            _ => {
                self.flush_space(false, dst);
                if (33..=126).contains(&b) && b != b'=' {
                    self.emit(&[b], dst);
                } else {
                    self.emit_escaped(b, dst);
                }
            }
        }
    }

    fn hard_break(&mut self, dst: &mut BytesMut) {
        self.flush_space(true, dst);
        dst.put_slice(b"\r\n");
        self.column = 0;
    }

    fn flush_space(&mut self, line_end: bool, dst: &mut BytesMut) {
        if let Some(space) = self.pending_space.take() {
            if line_end {
                self.emit_escaped(space, dst);
            } else {
                self.emit(&[space], dst);
            }
        }
    }

    fn emit_escaped(&mut self, b: u8, dst: &mut BytesMut) {
        self.emit(&[b'=', HEX[usize::from(b >> 4)], HEX[usize::from(b & 0x0F)]], dst);
    }

    fn emit(&mut self, token: &[u8], dst: &mut BytesMut) {
        if let Some(limit) = self.line_length.limit() {
            // one column stays reserved for the soft break marker
            if self.column > 0 && self.column + token.len() > limit.saturating_sub(1) {
                dst.put_slice(b"=\r\n");
                self.column = 0;
            }
        }
        dst.put_slice(token);
        self.column += token.len();
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for QuotedPrintableEncoder {
    type Error = MultipartError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                dst.reserve(bytes.remaining());
                while bytes.has_remaining() {
                    let b = bytes.get_u8();
                    self.push_octet(b, dst);
                }
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                if self.pending_cr {
                    self.pending_cr = false;
                    self.flush_space(false, dst);
                    self.emit_escaped(b'\r', dst);
                } else {
                    self.flush_space(true, dst);
                }
                Ok(())
            }
        }
    }
}
