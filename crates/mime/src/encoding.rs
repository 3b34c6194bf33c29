//! Per-part transfer encoding selection.
//!
//! Inside `multipart/form-data` every part is sent as `8bit`, since HTTP is
//! 8-bit clean.
//! Elsewhere an explicitly requested encoding wins, binary data becomes
//! `base64`, and text stays `7bit` when it already satisfies the 7bit rules
//! or falls back to `quoted-printable`.

use crate::part::{BodyPart, Content, PartKind};
use crate::protocol::{Container, TransferEncoding};

/// Longest line a `7bit` body may carry, in octets (RFC 5322 section 2.1.1)
const MAX_7BIT_LINE: usize = 998;

pub fn select_encoding(part: &BodyPart, container: Container) -> TransferEncoding {
    if container == Container::FormData {
        return TransferEncoding::EightBit;
    }

    if let Some(encoding) = part.requested_encoding() {
        return encoding;
    }

    match (part.kind(), part.content()) {
        (PartKind::Data, _) => TransferEncoding::Base64,
        (PartKind::Text, Content::Bytes(bytes)) if is_seven_bit_safe(bytes) => TransferEncoding::SevenBit,
        (PartKind::Text, _) => TransferEncoding::QuotedPrintable,
    }
}

/// Returns true if `content` is non-NUL US-ASCII whose lines fit in 998 octets
/// and whose line breaks are all CRLF pairs.
pub fn is_seven_bit_safe(content: &[u8]) -> bool {
    let mut line = 0;
    let mut prev = 0u8;
    for &b in content {
        match b {
            0 | 0x80..=0xFF => return false,
            b'\n' if prev != b'\r' => return false,
            b'\n' => line = 0,
            b'\r' if prev == b'\r' => return false,
            b'\r' => {}
            _ => {
                if prev == b'\r' {
                    return false;
                }
                line += 1;
                if line > MAX_7BIT_LINE {
                    return false;
                }
            }
        }
        prev = b;
    }
    prev != b'\r'
}
