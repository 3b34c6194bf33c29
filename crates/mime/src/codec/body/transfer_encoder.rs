use crate::codec::body::base64_encoder::Base64Encoder;
use crate::codec::body::identity_encoder::IdentityEncoder;
use crate::codec::body::quoted_printable_encoder::QuotedPrintableEncoder;
use crate::protocol::{LineLength, MultipartError, PayloadItem, TransferEncoding};
use bytes::{Buf, BytesMut};

use tokio_util::codec::Encoder;

/// encode part body according to its content-transfer-encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// 7bit and 8bit bodies
    Identity(IdentityEncoder),

    /// base64 bodies
    Base64(Base64Encoder),

    /// quoted-printable bodies
    QuotedPrintable(QuotedPrintableEncoder),
}

impl TransferEncoder {
    /// create the `TransferEncoder` for `encoding`, folding encoded lines at `line_length`
    pub fn new(encoding: TransferEncoding, line_length: LineLength) -> Self {
        let kind = match encoding {
            TransferEncoding::SevenBit => Kind::Identity(IdentityEncoder::new(true)),
            TransferEncoding::EightBit => Kind::Identity(IdentityEncoder::new(false)),
            TransferEncoding::Base64 => Kind::Base64(Base64Encoder::new(line_length)),
            TransferEncoding::QuotedPrintable => Kind::QuotedPrintable(QuotedPrintableEncoder::new(line_length)),
        };
        Self { kind }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.kind, Kind::Identity(_))
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for TransferEncoder {
    type Error = MultipartError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Identity(encoder) => encoder.encode(item, dst),
            Kind::Base64(encoder) => encoder.encode(item, dst),
            Kind::QuotedPrintable(encoder) => encoder.encode(item, dst),
        }
    }
}
