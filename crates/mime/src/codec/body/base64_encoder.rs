use crate::codec::body::write_folded;
use crate::protocol::{LineLength, MultipartError, PayloadItem};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

/// Streaming base64 encoder.
///
/// Input is consumed in groups of three octets; up to two trailing octets of a
/// chunk are carried into the next one, so splitting the body at arbitrary
/// positions yields the same output as encoding it at once. Padding is only
/// written on `Eof`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Encoder {
    line_length: LineLength,
    column: usize,
    pending: Vec<u8>,
    eof: bool,
}

impl Base64Encoder {
    pub fn new(line_length: LineLength) -> Self {
        Self { line_length, column: 0, pending: Vec::with_capacity(3), eof: false }
    }

    fn write(&mut self, raw: &[u8], dst: &mut BytesMut) {
        if raw.is_empty() {
            return;
        }
        let encoded = STANDARD.encode(raw);
        self.column = write_folded(encoded.as_bytes(), self.line_length, self.column, dst);
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for Base64Encoder {
    type Error = MultipartError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                let mut input = std::mem::take(&mut self.pending);
                input.reserve(bytes.remaining());
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    input.extend_from_slice(chunk);
                    let len = chunk.len();
                    bytes.advance(len);
                }

                let whole = input.len() - input.len() % 3;
                self.write(&input[..whole], dst);
                self.pending = input.split_off(whole);
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                let rest = std::mem::take(&mut self.pending);
                self.write(&rest, dst);
                Ok(())
            }
        }
    }
}
