use crate::protocol::{MultipartError, PayloadItem};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

/// Passes body bytes through unchanged.
///
/// In `seven_bit` mode every octet is checked to be non-NUL US-ASCII, since a
/// part declared `7bit` must not carry anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEncoder {
    seven_bit: bool,
}

impl IdentityEncoder {
    pub fn new(seven_bit: bool) -> Self {
        Self { seven_bit }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for IdentityEncoder {
    type Error = MultipartError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                dst.reserve(bytes.remaining());
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    if self.seven_bit {
                        if let Some(b) = chunk.iter().find(|b| **b == 0 || !b.is_ascii()) {
                            return Err(MultipartError::encoding(format!("octet 0x{b:02X} is not allowed in a 7bit body")));
                        }
                    }
                    dst.extend_from_slice(chunk);
                    let len = chunk.len();
                    bytes.advance(len);
                }
                Ok(())
            }
            PayloadItem::Eof => Ok(()),
        }
    }
}
