//! MIME header encoding.
//!
//! - [`HeaderEncoder`]: writes a [`HeaderSet`](crate::protocol::HeaderSet) as
//!   CRLF-terminated, folded lines followed by the header/body separator

mod header_encoder;

pub use header_encoder::HeaderEncoder;
