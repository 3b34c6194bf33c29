//! Part header encoder.
//!
//! Serializes a [`HeaderSet`] into raw bytes: every header folded at the set's
//! line length and terminated by CRLF, followed by the blank line that
//! separates headers from the body.

use crate::protocol::{HeaderSet, MultipartError};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 256;

/// Encoder for part headers implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<&HeaderSet> for HeaderEncoder {
    type Error = MultipartError;

    fn encode(&mut self, headers: &HeaderSet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        for line in headers.to_lines() {
            dst.put_slice(line.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
