//! Part body encoding.
//!
//! Every encoder implements [`tokio_util::codec::Encoder`] over
//! [`PayloadItem`](crate::protocol::PayloadItem): the body is fed chunk by
//! chunk and terminated with `Eof`, so a file-backed part never needs to be
//! held in memory as a whole.
//!
//! - [`IdentityEncoder`]: `7bit` / `8bit`
//! - [`Base64Encoder`]: `base64`, carries partial triplets between chunks
//! - [`QuotedPrintableEncoder`]: `quoted-printable`, soft line breaks
//! - [`TransferEncoder`]: dispatches on the part's [`TransferEncoding`](crate::protocol::TransferEncoding)

mod base64_encoder;
mod identity_encoder;
mod quoted_printable_encoder;
mod transfer_encoder;

pub use base64_encoder::Base64Encoder;
pub use identity_encoder::IdentityEncoder;
pub use quoted_printable_encoder::QuotedPrintableEncoder;
pub use transfer_encoder::TransferEncoder;

use crate::protocol::LineLength;
use bytes::BytesMut;

/// Writes already-encoded output, inserting CRLF whenever `column` reaches the limit.
///
/// Returns the column after the last written byte. A break is only written
/// before more data follows, never after the final byte.
pub(crate) fn write_folded(encoded: &[u8], line_length: LineLength, mut column: usize, dst: &mut BytesMut) -> usize {
    let Some(limit) = line_length.limit() else {
        dst.extend_from_slice(encoded);
        return column + encoded.len();
    };

    let limit = limit.max(1);
    let mut rest = encoded;
    while !rest.is_empty() {
        if column >= limit {
            dst.extend_from_slice(b"\r\n");
            column = 0;
        }
        let take = (limit - column).min(rest.len());
        dst.extend_from_slice(&rest[..take]);
        column += take;
        rest = &rest[take..];
    }
    column
}
