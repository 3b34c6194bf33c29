//! Single MIME parts and the sources their content is read from.
//!
//! - [`BodyPart`]: content, media type, name/filename, disposition and the
//!   resolved transfer encoding of one part
//! - [`ContentSource`]: the narrow interface to whatever loads file contents;
//!   [`PathSource`] is the file system implementation

mod body_part;
mod source;

pub use body_part::{BodyPart, Content, Disposition, PartKind};
pub use source::{ContentSource, PathSource};

#[cfg(test)]
pub(crate) use source::MockContentSource;
