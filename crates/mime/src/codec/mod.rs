//! Wire encoding of multipart bodies.
//!
//! This module turns parts into bytes. It follows the same split the
//! multipart framing does:
//!
//! - Header encoding via the `header` module
//! - Body (content-transfer-encoding) via the `body` module
//!
//! Both sides implement [`tokio_util::codec::Encoder`], so they can be driven
//! directly by the body stream or plugged into a `FramedWrite`.
//!
//! # Example
//!
//! ```
//! use bytes::{Bytes, BytesMut};
//! use micro_mime::codec::TransferEncoder;
//! use micro_mime::protocol::{LineLength, PayloadItem, TransferEncoding};
//! use tokio_util::codec::Encoder;
//!
//! let mut encoder = TransferEncoder::new(TransferEncoding::Base64, LineLength::default());
//! let mut dst = BytesMut::new();
//! encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"foo")), &mut dst).unwrap();
//! encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
//! assert_eq!(&dst[..], b"Zm9v");
//! ```

mod body;
mod header;

pub use body::{Base64Encoder, IdentityEncoder, QuotedPrintableEncoder, TransferEncoder};
pub use header::HeaderEncoder;
