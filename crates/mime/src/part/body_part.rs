use crate::codec::TransferEncoder;
use crate::encoding::select_encoding;
use crate::part::source::{ContentSource, PathSource};
use crate::protocol::{Container, HeaderSet, LineLength, MultipartError, PayloadItem, TransferEncoding};
use bytes::{Bytes, BytesMut};
use mime::Mime;
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use tokio_util::codec::Encoder;

/// Body content of a part: either owned bytes or a lazily readable source.
#[derive(Clone)]
pub enum Content {
    Bytes(Bytes),
    Source(Arc<dyn ContentSource>),
}

impl Content {
    /// Returns the in-memory bytes, or `None` for a lazy source
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Content::Bytes(bytes) => Some(bytes),
            Content::Source(_) => None,
        }
    }

    #[inline]
    pub fn is_lazy(&self) -> bool {
        matches!(self, Content::Source(_))
    }

    /// Reads the whole content into memory
    pub(crate) fn load(&self) -> Result<Bytes, MultipartError> {
        match self {
            Content::Bytes(bytes) => Ok(bytes.clone()),
            Content::Source(source) => {
                let mut buf = Vec::new();
                source
                    .open()
                    .and_then(|mut reader| reader.read_to_end(&mut buf))
                    .map_err(|e| MultipartError::source_unreadable(source.describe(), e))?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Content::Source(_) => f.write_str("Source(..)"),
        }
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Content::Bytes(a), Content::Bytes(b)) => a == b,
            (Content::Source(a), Content::Source(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Whether a part holds text or opaque data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PartKind {
    Text,
    Data,
}

/// Value of the `Content-Disposition` header.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Disposition {
    Inline,
    Attachment,
    FormData,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
            Disposition::FormData => "form-data",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single leaf of a MIME message.
///
/// The transfer encoding is resolved when the part is built and resolved
/// once more when a multipart body adopts the part; after that the part is
/// only reachable through shared references and never changes again.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPart {
    content: Content,
    kind: PartKind,
    media_type: Mime,
    name: Option<String>,
    filename: Option<String>,
    disposition: Option<Disposition>,
    requested_encoding: Option<TransferEncoding>,
    encoding: TransferEncoding,
    max_line_length: LineLength,
    container: Container,
}

impl BodyPart {
    fn new(content: Content, kind: PartKind, media_type: Mime) -> Self {
        let mut part = Self {
            content,
            kind,
            media_type,
            name: None,
            filename: None,
            disposition: None,
            requested_encoding: None,
            encoding: TransferEncoding::EightBit,
            max_line_length: LineLength::default(),
            container: Container::Standalone,
        };
        part.encoding = select_encoding(&part, Container::Standalone);
        part
    }

    /// A `text/plain; charset=utf-8` part
    pub fn text(content: impl Into<Bytes>) -> Self {
        Self::new(Content::Bytes(content.into()), PartKind::Text, mime::TEXT_PLAIN_UTF_8)
    }

    /// An in-memory data part; the media type defaults to `application/octet-stream`
    pub fn data(content: impl Into<Bytes>) -> Self {
        Self::new(Content::Bytes(content.into()), PartKind::Data, mime::APPLICATION_OCTET_STREAM)
    }

    /// A data part whose content is read from `source` only when rendered
    pub fn from_source(source: impl ContentSource + 'static) -> Self {
        Self::new(Content::Source(Arc::new(source)), PartKind::Data, mime::APPLICATION_OCTET_STREAM)
    }

    /// A `text/plain; charset=utf-8` part whose content is read from `source` only when rendered
    pub fn text_from_source(source: impl ContentSource + 'static) -> Self {
        Self::new(Content::Source(Arc::new(source)), PartKind::Text, mime::TEXT_PLAIN_UTF_8)
    }

    /// A data part backed by the file at `path`, named after its last path component.
    ///
    /// Fails with [`MultipartError::SourceUnreadable`] if the path is not a
    /// readable file. The media type is not sniffed; set it with
    /// [`with_media_type`](Self::with_media_type).
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, MultipartError> {
        let source = PathSource::new(path)?;
        let filename = source.file_name();
        let mut part = Self::from_source(source);
        part.filename = filename;
        Ok(part)
    }

    pub fn with_media_type(mut self, media_type: Mime) -> Self {
        self.media_type = media_type;
        self.encoding = select_encoding(&self, self.container);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = Some(disposition);
        self
    }

    /// Requests a specific transfer encoding; a form-data container still forces `8bit`
    pub fn with_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.requested_encoding = Some(encoding);
        self.encoding = select_encoding(&self, self.container);
        self
    }

    pub fn with_max_line_length(mut self, line_length: LineLength) -> Self {
        self.max_line_length = line_length;
        self
    }

    /// Adopts the part into a multipart container: the one-time preparation pass.
    pub(crate) fn attach(mut self, container: Container) -> Self {
        self.container = container;
        if container == Container::FormData {
            self.disposition = Some(Disposition::FormData);
            self.max_line_length = LineLength::Unbounded;
        }
        self.encoding = select_encoding(&self, container);
        self
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn media_type(&self) -> &Mime {
        &self.media_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn disposition(&self) -> Option<Disposition> {
        self.disposition
    }

    pub fn requested_encoding(&self) -> Option<TransferEncoding> {
        self.requested_encoding
    }

    pub fn encoding(&self) -> TransferEncoding {
        self.encoding
    }

    pub fn max_line_length(&self) -> LineLength {
        self.max_line_length
    }

    pub fn container(&self) -> Container {
        self.container
    }

    /// Builds the part headers in wire order: `Content-Type`,
    /// `Content-Transfer-Encoding`, then `Content-Disposition` when set.
    ///
    /// Inside `multipart/form-data` the filename is only carried by the
    /// disposition, never as a `name` parameter of the content type.
    pub fn prepared_headers(&self) -> HeaderSet {
        let mut headers = HeaderSet::with_max_line_length(self.max_line_length);

        let mut params: Vec<(String, String)> =
            self.media_type.params().map(|(k, v)| (k.as_str().to_owned(), v.as_str().to_owned())).collect();
        if self.kind == PartKind::Text && self.media_type.get_param(mime::CHARSET).is_none() {
            params.push(("charset".to_owned(), "utf-8".to_owned()));
        }
        if self.kind == PartKind::Data && self.container != Container::FormData {
            if let Some(filename) = &self.filename {
                params.push(("name".to_owned(), filename.clone()));
            }
        }
        headers.add_parameterized("Content-Type", self.media_type.essence_str(), params);
        headers.add_text("Content-Transfer-Encoding", self.encoding.as_str());

        if let Some(disposition) = self.disposition {
            let params = self
                .name
                .iter()
                .map(|name| ("name", name.clone()))
                .chain(self.filename.iter().map(|filename| ("filename", filename.clone())));
            headers.add_parameterized("Content-Disposition", disposition.as_str(), params);
        }

        headers
    }

    /// Line length applied to the encoded body when the part is serialized
    pub(crate) fn body_line_length(&self) -> LineLength {
        self.max_line_length
    }

    /// Renders the body under its transfer encoding.
    ///
    /// Base64 output is the plain, unfolded encoding of the content;
    /// quoted-printable output carries its soft line breaks. The content is
    /// read again on every call.
    pub fn body_to_bytes(&self) -> Result<Bytes, MultipartError> {
        let raw = self.content.load()?;
        if self.encoding == TransferEncoding::EightBit {
            return Ok(raw);
        }

        let line_length = match self.encoding {
            TransferEncoding::Base64 => LineLength::Unbounded,
            _ => self.max_line_length,
        };
        let mut encoder = TransferEncoder::new(self.encoding, line_length);
        let mut dst = BytesMut::with_capacity(raw.len() * 4 / 3 + 4);
        encoder.encode(PayloadItem::Chunk(raw), &mut dst)?;
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst)?;
        Ok(dst.freeze())
    }

    /// [`body_to_bytes`](Self::body_to_bytes) as a string
    pub fn body_to_string(&self) -> Result<String, MultipartError> {
        let bytes = self.body_to_bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|e| MultipartError::encoding(format!("body is not valid utf-8: {e}")))
    }
}
