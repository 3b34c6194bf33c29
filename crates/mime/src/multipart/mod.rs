//! Multipart bodies and their lazy serialization.
//!
//! A [`MultipartBody`] owns its parts in wire order and fixes one boundary the
//! first time it is needed. [`BodyStream`] walks the parts and produces the
//! body chunk by chunk:
//!
//! ```text
//! --<boundary>\r\n
//! <part headers>\r\n
//! \r\n
//! <encoded part body>\r\n
//! ...
//! --<boundary>--\r\n
//! ```

mod body;
mod stream;

pub use body::{MultipartBody, MultipartSubtype};
pub use stream::{BodyStream, READ_BLOCK_SIZE};
