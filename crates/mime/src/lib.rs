//! A multipart MIME body assembler
//!
//! This crate builds `multipart/*` bodies, most notably `multipart/form-data`
//! for HTTP requests, from nested form field trees. It takes care of naming
//! nested fields, choosing a transfer encoding per part, generating a boundary,
//! folding header lines and streaming the finished body without loading
//! file-backed parts into memory.
//!
//! # Features
//!
//! - Field trees with bracketed names (`bar[baz][0]`), built by hand or from `serde_json` values
//! - Text and data parts, in memory or read lazily from a [`part::ContentSource`]
//! - `7bit`, `8bit`, `base64` and `quoted-printable` transfer encodings
//! - RFC 7578 compliant `form-data` headers
//! - Lazy serialization through an iterator that also implements `http_body::Body`
//!
//! # Example
//!
//! ```
//! use micro_mime::field::Fields;
//! use micro_mime::multipart::MultipartBody;
//! use micro_mime::part::BodyPart;
//!
//! let fields = Fields::new()
//!     .with("title", "hello")
//!     .with("tags", Fields::new().with_item("a").with_item("b"))
//!     .with("file", BodyPart::data("x,y\n1,2\n").with_filename("data.csv").with_media_type(mime::TEXT_CSV));
//!
//! let body = MultipartBody::form_data(fields).unwrap();
//! let content_type = body.content_type().unwrap();
//! assert!(content_type.to_str().unwrap().starts_with("multipart/form-data; boundary="));
//!
//! let bytes = body.to_bytes().unwrap();
//! assert!(bytes.ends_with(format!("--{}--\r\n", body.boundary()).as_bytes()));
//! ```
//!
//! # Architecture
//!
//! - [`field`]: field trees and their flattening into names
//! - [`part`]: single parts and their content sources
//! - [`encoding`]: transfer encoding selection
//! - [`boundary`]: boundary generation and validation
//! - [`multipart`]: the body and its lazy stream
//! - [`codec`]: header and body encoders
//! - [`protocol`]: shared types, headers and [`protocol::MultipartError`]
//!
//! # Limitations
//!
//! - Assembly only, parsing multipart bodies is not supported
//! - Media types of file-backed parts are not sniffed
//! - Boundary uniqueness against lazily read content is probabilistic

pub mod boundary;
pub mod codec;
pub mod encoding;
pub mod field;
pub mod multipart;
pub mod part;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
