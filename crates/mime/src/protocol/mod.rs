//! Core protocol types shared by the parts, the codec and the multipart body.
//!
//! - **Message Handling** ([`message`]): [`PayloadItem`] chunks fed to body encoders
//! - **Transfer Rules** ([`transfer`]): [`TransferEncoding`], [`LineLength`] and the
//!   [`Container`] a part is rendered in
//! - **Headers** ([`header`]): the ordered, folding [`HeaderSet`]
//! - **Error Handling** ([`error`]): [`MultipartError`]

mod message;
pub use message::PayloadItem;

mod transfer;
pub use transfer::Container;
pub use transfer::DEFAULT_MAX_LINE_LENGTH;
pub use transfer::LineLength;
pub use transfer::TransferEncoding;

mod header;
pub use header::Header;
pub use header::HeaderSet;

mod error;
pub use error::MultipartError;
