use crate::boundary::{BoundaryGenerator, validate_boundary};
use crate::ensure;
use crate::field::{FieldLeaf, Fields, flatten};
use crate::multipart::BodyStream;
use crate::part::BodyPart;
use crate::protocol::{Container, HeaderSet, MultipartError, TransferEncoding};
use crate::utils::contains_subslice;
use bytes::{Bytes, BytesMut};
use http::HeaderValue;
use once_cell::sync::OnceCell;
use std::fmt;
use tracing::{debug, warn};

/// Subtype of a `multipart/*` body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MultipartSubtype {
    FormData,
    Mixed,
    Alternative,
    Related,
}

impl MultipartSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            MultipartSubtype::FormData => "form-data",
            MultipartSubtype::Mixed => "mixed",
            MultipartSubtype::Alternative => "alternative",
            MultipartSubtype::Related => "related",
        }
    }

    /// The container its parts are serialized in
    pub fn container(&self) -> Container {
        match self {
            MultipartSubtype::FormData => Container::FormData,
            _ => Container::Multipart,
        }
    }
}

impl fmt::Display for MultipartSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered list of parts sharing one boundary.
///
/// The boundary is fixed the first time it is needed, by
/// [`prepared_headers`](Self::prepared_headers), [`boundary`](Self::boundary)
/// or [`stream`](Self::stream), and never changes afterwards. Serializing is
/// side-effect free and can be repeated.
#[derive(Debug)]
pub struct MultipartBody {
    subtype: MultipartSubtype,
    parts: Vec<BodyPart>,
    boundary: OnceCell<String>,
    generator: BoundaryGenerator,
}

impl MultipartBody {
    /// Builds a `multipart/form-data` body from a field tree.
    ///
    /// Scalars become `text/plain; charset=utf-8` parts, prebuilt parts are
    /// kept as they are; every part is named after its flattened key, gets the
    /// `form-data` disposition, `8bit` encoding and unbounded line length.
    pub fn form_data(fields: Fields) -> Result<Self, MultipartError> {
        let parts = flatten(fields)?
            .into_iter()
            .map(|(name, leaf)| {
                let part = match leaf {
                    FieldLeaf::Scalar(value) => BodyPart::text(value).with_encoding(TransferEncoding::EightBit),
                    FieldLeaf::Part(part) => part,
                };
                part.with_name(name)
            })
            .collect();
        Self::new(MultipartSubtype::FormData, parts)
    }

    /// Builds a body of any subtype from parts in their final order.
    ///
    /// A `form-data` body requires every part to carry a non-empty name.
    pub fn new(subtype: MultipartSubtype, parts: Vec<BodyPart>) -> Result<Self, MultipartError> {
        let container = subtype.container();
        if container == Container::FormData {
            for (i, part) in parts.iter().enumerate() {
                ensure!(
                    part.name().is_some_and(|name| !name.is_empty()),
                    MultipartError::invalid_field(format!("form-data part #{i} has no name"))
                );
            }
        }

        let parts = parts.into_iter().map(|part| part.attach(container)).collect();
        Ok(Self { subtype, parts, boundary: OnceCell::new(), generator: BoundaryGenerator::new() })
    }

    /// Uses a caller chosen boundary instead of a generated one
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Result<Self, MultipartError> {
        let boundary = boundary.into();
        validate_boundary(&boundary)?;
        self.boundary = OnceCell::with_value(boundary);
        Ok(self)
    }

    /// Uses `generator` for the boundary, unless one is already fixed
    pub fn with_generator(mut self, generator: BoundaryGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn media_type(&self) -> &'static str {
        "multipart"
    }

    pub fn media_subtype(&self) -> &'static str {
        self.subtype.as_str()
    }

    pub fn subtype(&self) -> MultipartSubtype {
        self.subtype
    }

    pub fn parts(&self) -> &[BodyPart] {
        &self.parts
    }

    /// Returns true once the boundary has been fixed
    pub fn is_prepared(&self) -> bool {
        self.boundary.get().is_some()
    }

    /// The boundary, generated on first use
    pub fn boundary(&self) -> &str {
        self.boundary.get_or_init(|| self.generate_boundary())
    }

    /// Headers of the body itself: `Content-Type: multipart/<subtype>; boundary=<token>`
    pub fn prepared_headers(&self) -> HeaderSet {
        let mut headers = HeaderSet::new();
        headers.add_parameterized(
            "Content-Type",
            format!("{}/{}", self.media_type(), self.media_subtype()),
            [("boundary", self.boundary())],
        );
        headers
    }

    /// The `Content-Type` value, ready for an HTTP request
    pub fn content_type(&self) -> Result<HeaderValue, MultipartError> {
        let headers = self.prepared_headers();
        let value = headers.get("Content-Type").map(|h| h.render_value()).unwrap_or_default();
        HeaderValue::from_str(&value).map_err(|e| MultipartError::encoding(format!("invalid content-type value: {e}")))
    }

    /// Serializes the body lazily, part by part
    pub fn stream(&self) -> BodyStream<'_> {
        BodyStream::new(self, self.boundary())
    }

    /// Serializes the whole body into memory
    pub fn to_bytes(&self) -> Result<Bytes, MultipartError> {
        let mut buf = BytesMut::new();
        for chunk in self.stream() {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Draws tokens until the delimiter occurs in no part.
    fn generate_boundary(&self) -> String {
        let mut boundary = self.generator.generate();
        let mut attempt = 1usize;
        while self.collides(&boundary) {
            warn!(attempt, "boundary occurs in a part, regenerating");
            boundary = self.generator.generate();
            attempt += 1;
        }
        debug!(boundary = %boundary, subtype = %self.subtype, parts = self.parts.len(), attempt, "multipart boundary fixed");
        boundary
    }

    /// Checks rendered part headers and in-memory content. Lazy sources are
    /// not inspected; for them uniqueness stays probabilistic.
    fn collides(&self, boundary: &str) -> bool {
        let delimiter = format!("--{boundary}");
        self.parts.iter().any(|part| {
            part.prepared_headers().to_string().contains(&delimiter)
                || part.content().as_bytes().is_some_and(|content| contains_subslice(content, delimiter.as_bytes()))
        })
    }
}

impl<'a> IntoIterator for &'a MultipartBody {
    type Item = Result<Bytes, MultipartError>;
    type IntoIter = BodyStream<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::{ContentSource, Disposition, MockContentSource};
    use crate::protocol::LineLength;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use http_body_util::BodyExt;
    use indoc::indoc;
    use std::io::{self, Cursor, Read};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

    fn crlf(s: &str) -> String {
        s.replace('\n', "\r\n")
    }

    fn gif_part() -> BodyPart {
        BodyPart::data(Bytes::from_static(GIF)).with_media_type("image/gif".parse().unwrap()).with_filename("test.gif")
    }

    /// Reader that records when it is dropped
    struct TrackedReader {
        inner: Cursor<Vec<u8>>,
        dropped: Arc<AtomicBool>,
    }

    impl Read for TrackedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for TrackedReader {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::SeqCst);
        }
    }

    struct TrackedSource {
        content: Vec<u8>,
        opened: Arc<AtomicUsize>,
        dropped: Arc<AtomicBool>,
    }

    impl ContentSource for TrackedSource {
        fn open(&self) -> io::Result<Box<dyn Read + Send>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.dropped.store(false, Ordering::SeqCst);
            Ok(Box::new(TrackedReader { inner: Cursor::new(self.content.clone()), dropped: Arc::clone(&self.dropped) }))
        }

        fn describe(&self) -> String {
            "tracked".to_owned()
        }
    }

    #[test]
    fn test_constructor() {
        let content = "very very long content that will not be cut even if the length is way more than 76 characters, ok?";
        let b = BodyPart::text("content");
        let c = gif_part();

        let f = MultipartBody::form_data(
            Fields::new().with("foo", content).with("bar", b.clone()).with("baz", c.clone()),
        )
        .unwrap();

        assert_eq!(f.media_type(), "multipart");
        assert_eq!(f.media_subtype(), "form-data");

        let t = BodyPart::text(content).with_encoding(TransferEncoding::EightBit).with_name("foo").attach(Container::FormData);
        let b = b.with_name("bar").attach(Container::FormData);
        let c = c.with_name("baz").attach(Container::FormData);
        assert_eq!(f.parts(), &[t, b, c]);

        for part in f.parts() {
            assert_eq!(part.disposition(), Some(Disposition::FormData));
            assert_eq!(part.encoding(), TransferEncoding::EightBit);
            assert_eq!(part.max_line_length(), LineLength::Unbounded);
        }

        let lines = f.parts()[0].prepared_headers().to_lines();
        assert_eq!(lines[1], "Content-Transfer-Encoding: 8bit");
        assert_eq!(lines[2], "Content-Disposition: form-data; name=\"foo\"");
        assert_eq!(f.parts()[0].body_to_string().unwrap(), content);
    }

    #[test]
    fn test_nested_array_parts() {
        let p1 = BodyPart::text("content").with_encoding(TransferEncoding::EightBit);
        let f = MultipartBody::form_data(
            Fields::new()
                .with("foo", p1.clone())
                .with("bar", Fields::new().with("baz", Fields::new().with_item(p1.clone()).with("qux", p1.clone()))),
        )
        .unwrap();

        assert_eq!(f.media_type(), "multipart");
        assert_eq!(f.media_subtype(), "form-data");

        let expected: Vec<BodyPart> = ["foo", "bar[baz][0]", "bar[baz][qux]"]
            .into_iter()
            .map(|name| p1.clone().with_name(name).attach(Container::FormData))
            .collect();
        assert_eq!(f.parts(), &expected[..]);
    }

    #[test]
    fn test_to_string() {
        let part = gif_part();
        assert_eq!(part.body_to_string().unwrap(), STANDARD.encode(GIF));
    }

    #[test]
    fn test_content_line_length() {
        let foo = "foo".repeat(1000);
        let bar = "bar".repeat(1000);
        let f = MultipartBody::form_data(
            Fields::new()
                .with("foo", BodyPart::data(foo.clone()).with_filename("foo.txt").with_media_type(mime::TEXT_PLAIN))
                .with("bar", bar.clone()),
        )
        .unwrap();

        let parts = f.parts();
        assert_eq!(parts[0].body_to_string().unwrap(), foo);
        assert_eq!(parts[1].body_to_string().unwrap(), bar);

        let wire = String::from_utf8(f.to_bytes().unwrap().to_vec()).unwrap();
        assert!(wire.contains(&format!("\r\n\r\n{foo}\r\n")));
        assert!(wire.contains(&format!("\r\n\r\n{bar}\r\n")));
    }

    #[test]
    fn test_boundary_content_type_header() {
        let f = MultipartBody::form_data(
            Fields::new().with("file", BodyPart::data("data.csv").with_filename("data.csv").with_media_type(mime::TEXT_CSV)),
        )
        .unwrap();

        let lines = f.prepared_headers().to_lines();
        let token = lines[0].strip_prefix("Content-Type: multipart/form-data; boundary=").unwrap();
        assert_eq!(token.len(), 16);
        assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let f = MultipartBody::form_data(Fields::new().with("a", "1")).unwrap();
        assert!(!f.is_prepared());

        let first = f.prepared_headers();
        assert!(f.is_prepared());
        let second = f.prepared_headers();
        assert_eq!(first, second);
        assert_eq!(f.boundary(), f.boundary());

        assert_eq!(f.to_bytes().unwrap(), f.to_bytes().unwrap());
        assert_eq!(f.prepared_headers(), first);
    }

    #[test]
    fn test_serialize_before_headers_fixes_boundary() {
        let f = MultipartBody::form_data(Fields::new().with("a", "1")).unwrap();
        let wire = f.to_bytes().unwrap();
        let boundary = f.boundary().to_owned();
        assert!(wire.starts_with(format!("--{boundary}\r\n").as_bytes()));
        assert_eq!(f.prepared_headers().get("content-type").and_then(|h| h.param("boundary")), Some(boundary.as_str()));
    }

    #[test]
    fn test_bodies_get_distinct_boundaries() {
        let a = MultipartBody::form_data(Fields::new().with("a", "1")).unwrap();
        let b = MultipartBody::form_data(Fields::new().with("a", "1")).unwrap();
        assert_ne!(a.boundary(), b.boundary());
    }

    #[test]
    fn test_wire_format() {
        let f = MultipartBody::form_data(
            Fields::new()
                .with("title", "hello")
                .with("tags", Fields::new().with_item("a").with_item("b"))
                .with("file", BodyPart::data("x,y\n1,2\n").with_filename("data.csv").with_media_type(mime::TEXT_CSV)),
        )
        .unwrap()
        .with_boundary("simple-boundary")
        .unwrap();

        let expected = crlf(indoc! {r#"
            --simple-boundary
            Content-Type: text/plain; charset=utf-8
            Content-Transfer-Encoding: 8bit
            Content-Disposition: form-data; name="title"

            hello
            --simple-boundary
            Content-Type: text/plain; charset=utf-8
            Content-Transfer-Encoding: 8bit
            Content-Disposition: form-data; name="tags[0]"

            a
            --simple-boundary
            Content-Type: text/plain; charset=utf-8
            Content-Transfer-Encoding: 8bit
            Content-Disposition: form-data; name="tags[1]"

            b
            --simple-boundary
            Content-Type: text/csv
            Content-Transfer-Encoding: 8bit
            Content-Disposition: form-data; name="file"; filename="data.csv"

        "#});
        // the csv body keeps its bare line feeds
        let expected = format!("{expected}x,y\n1,2\n\r\n--simple-boundary--\r\n");

        assert_eq!(String::from_utf8(f.to_bytes().unwrap().to_vec()).unwrap(), expected);
        assert_eq!(f.content_type().unwrap(), "multipart/form-data; boundary=simple-boundary");
    }

    #[test]
    fn test_mixed_folds_headers_and_base64() {
        let data = vec![0x5Au8; 90];
        let f = MultipartBody::new(
            MultipartSubtype::Mixed,
            vec![
                BodyPart::text("plain body"),
                BodyPart::data(data.clone())
                    .with_filename(format!("{}.bin", "f".repeat(60)))
                    .with_disposition(Disposition::Attachment),
            ],
        )
        .unwrap()
        .with_boundary("mixed-boundary")
        .unwrap();

        assert_eq!(f.media_subtype(), "mixed");
        assert_eq!(f.parts()[0].encoding(), TransferEncoding::SevenBit);
        assert_eq!(f.parts()[1].encoding(), TransferEncoding::Base64);
        assert_eq!(f.parts()[1].disposition(), Some(Disposition::Attachment));

        let wire = String::from_utf8(f.to_bytes().unwrap().to_vec()).unwrap();
        let encoded = STANDARD.encode(&data);
        let folded = format!("{}\r\n{}", &encoded[..76], &encoded[76..]);

        let expected = format!(
            "--mixed-boundary\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 7bit\r\n\
             \r\n\
             plain body\r\n\
             --mixed-boundary\r\n\
             Content-Type: application/octet-stream;\r\n name={name}\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment;\r\n filename={name}\r\n\
             \r\n\
             {folded}\r\n\
             --mixed-boundary--\r\n",
            name = format!("{}.bin", "f".repeat(60)),
        );
        assert_eq!(wire, expected);
    }

    #[test]
    fn test_form_data_requires_names() {
        let result = MultipartBody::new(MultipartSubtype::FormData, vec![BodyPart::text("anonymous")]);
        assert!(matches!(result, Err(MultipartError::InvalidField { .. })));

        let result = MultipartBody::new(MultipartSubtype::FormData, vec![BodyPart::text("x").with_name("")]);
        assert!(matches!(result, Err(MultipartError::InvalidField { .. })));

        let result = MultipartBody::form_data(Fields::new().with("", "x"));
        assert!(matches!(result, Err(MultipartError::InvalidField { .. })));
    }

    #[test]
    fn test_invalid_boundary() {
        let body = MultipartBody::form_data(Fields::new().with("a", "1")).unwrap();
        assert!(matches!(body.with_boundary("bad\"quote"), Err(MultipartError::InvalidField { .. })));
    }

    #[test]
    fn test_boundary_never_occurs_in_content() {
        for _ in 0..50 {
            let generator = BoundaryGenerator::with_len(8).unwrap();
            let f = MultipartBody::form_data(Fields::new().with("a", "x")).unwrap().with_generator(generator);
            let wire = f.to_bytes().unwrap();
            let delimiter = format!("--{}", f.boundary());
            let occurrences = wire.windows(delimiter.len()).filter(|w| *w == delimiter.as_bytes()).count();
            assert_eq!(occurrences, 2);
        }
    }

    fn delimiter_count(wire: &[u8], boundary: &str) -> usize {
        let delimiter = format!("--{boundary}");
        wire.windows(delimiter.len()).filter(|w| *w == delimiter.as_bytes()).count()
    }

    #[test]
    fn test_boundary_regenerated_when_content_collides() {
        let expected = BoundaryGenerator::new().with_seed(7);
        let first = expected.generate();
        let second = expected.generate();
        let third = expected.generate();

        let f = MultipartBody::form_data(
            Fields::new().with("a", format!("--{first}")).with("b", format!("prefix --{second} suffix")),
        )
        .unwrap()
        .with_generator(BoundaryGenerator::new().with_seed(7));

        assert_eq!(f.boundary(), third);
        let wire = f.to_bytes().unwrap();
        assert_eq!(delimiter_count(&wire, &third), f.parts().len() + 1);
    }

    #[test]
    fn test_boundary_regenerated_when_header_collides() {
        let expected = BoundaryGenerator::new().with_seed(11);
        let first = expected.generate();
        let second = expected.generate();

        let f = MultipartBody::new(
            MultipartSubtype::Mixed,
            vec![BodyPart::data("payload").with_filename(format!("--{first}.bin")).with_disposition(Disposition::Attachment)],
        )
        .unwrap()
        .with_generator(BoundaryGenerator::new().with_seed(11));

        assert_ne!(f.boundary(), first);
        assert_eq!(f.boundary(), second);
        let wire = f.to_bytes().unwrap();
        assert_eq!(delimiter_count(&wire, &second), 2);
        assert_eq!(delimiter_count(&wire, &first), 2);
    }

    #[test]
    fn test_scalars_are_utf8_text() {
        let f = MultipartBody::form_data(Fields::new().with("greeting", "héllo wörld")).unwrap();
        let part = &f.parts()[0];
        assert_eq!(part.media_type(), &mime::TEXT_PLAIN_UTF_8);
        assert_eq!(part.body_to_string().unwrap(), "héllo wörld");
        assert!(contains_subslice(&f.to_bytes().unwrap(), "\r\n\r\nhéllo wörld\r\n".as_bytes()));
    }

    #[test]
    fn test_source_opened_only_while_streaming() {
        let opened = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let source = TrackedSource { content: b"lazy bytes".to_vec(), opened: Arc::clone(&opened), dropped: Arc::clone(&dropped) };

        let f = MultipartBody::form_data(
            Fields::new().with("file", BodyPart::from_source(source).with_filename("lazy.bin")).with("after", "tail"),
        )
        .unwrap();
        let _ = f.prepared_headers();
        assert_eq!(opened.load(Ordering::SeqCst), 0);

        let mut stream = f.stream();
        let head = stream.next().unwrap().unwrap();
        assert!(head.ends_with(b"\r\n\r\n"));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert!(!dropped.load(Ordering::SeqCst));

        // body chunk, then the part trailer which releases the handle
        assert_eq!(stream.next().unwrap().unwrap(), Bytes::from_static(b"lazy bytes"));
        assert_eq!(stream.next().unwrap().unwrap(), Bytes::from_static(b"\r\n"));
        assert!(dropped.load(Ordering::SeqCst));

        let rest: Vec<Bytes> = stream.map(Result::unwrap).collect();
        assert!(rest.last().unwrap().ends_with(b"--\r\n"));

        // a second pass opens a fresh reader
        f.to_bytes().unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_handle_released_on_early_drop() {
        let opened = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let source = TrackedSource { content: vec![1u8; 3 * READ_BLOCK], opened: Arc::clone(&opened), dropped: Arc::clone(&dropped) };

        let f = MultipartBody::form_data(Fields::new().with("file", BodyPart::from_source(source))).unwrap();
        let mut stream = f.stream();
        stream.next().unwrap().unwrap();
        stream.next().unwrap().unwrap();
        assert!(!dropped.load(Ordering::SeqCst));

        drop(stream);
        assert!(dropped.load(Ordering::SeqCst));
    }

    const READ_BLOCK: usize = crate::multipart::READ_BLOCK_SIZE;

    #[test]
    fn test_large_source_is_streamed_in_blocks() {
        let opened = Arc::new(AtomicUsize::new(0));
        let dropped = Arc::new(AtomicBool::new(false));
        let content: Vec<u8> = (0..=255u8).cycle().take(3 * READ_BLOCK + 17).collect();
        let source = TrackedSource { content: content.clone(), opened, dropped };

        let f = MultipartBody::form_data(Fields::new().with("file", BodyPart::from_source(source))).unwrap();
        let chunks: Vec<Bytes> = f.stream().map(Result::unwrap).collect();

        // head, four body blocks, trailer, closing delimiter
        assert_eq!(chunks.len(), 7);
        assert!(chunks[1..5].iter().all(|chunk| chunk.len() <= READ_BLOCK));
        let body: Vec<u8> = chunks[1..5].iter().flat_map(|chunk| chunk.iter().copied()).collect();
        assert_eq!(body, content);
    }

    #[test]
    fn test_source_failure_aborts_stream() {
        let mut source = MockContentSource::new();
        source.expect_open().times(2).returning(|| Err(io::Error::from(io::ErrorKind::NotFound)));
        source.expect_describe().return_const("missing.gif".to_owned());

        let f = MultipartBody::form_data(
            Fields::new().with("before", "ok").with("file", BodyPart::from_source(source)).with("after", "never"),
        )
        .unwrap();

        let mut stream = f.stream();
        let mut emitted = BytesMut::new();
        let error = loop {
            match stream.next() {
                Some(Ok(chunk)) => emitted.extend_from_slice(&chunk),
                Some(Err(e)) => break e,
                None => panic!("stream ended without the source error"),
            }
        };

        match error {
            MultipartError::SourceUnreadable { source_name, source } => {
                assert_eq!(source_name, "missing.gif");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(stream.next().is_none());
        assert!(!emitted.ends_with(format!("--{}--\r\n", f.boundary()).as_bytes()));
        assert!(!String::from_utf8_lossy(&emitted).contains("never"));

        assert!(matches!(f.to_bytes(), Err(MultipartError::SourceUnreadable { .. })));
    }

    #[test]
    fn test_read_failure_mid_part() {
        struct FailingReader(bool);

        impl Read for FailingReader {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 {
                    return Err(io::Error::other("disk went away"));
                }
                self.0 = true;
                buf[..4].copy_from_slice(b"part");
                Ok(4)
            }
        }

        let mut source = MockContentSource::new();
        source.expect_open().times(1).returning(|| Ok(Box::new(FailingReader(false))));
        source.expect_describe().return_const("flaky".to_owned());

        let f = MultipartBody::form_data(Fields::new().with("file", BodyPart::from_source(source))).unwrap();
        let items: Vec<Result<Bytes, MultipartError>> = Iterator::collect(f.stream());
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_ref().unwrap(), &Bytes::from_static(b"part"));
        assert!(matches!(items[2], Err(MultipartError::SourceUnreadable { .. })));
    }

    #[test]
    fn test_empty_body() {
        let f = MultipartBody::form_data(Fields::new()).unwrap().with_boundary("empty").unwrap();
        assert!(f.parts().is_empty());
        assert_eq!(f.to_bytes().unwrap(), Bytes::from_static(b"--empty--\r\n"));
    }

    #[test]
    fn test_into_iterator() {
        let f = MultipartBody::form_data(Fields::new().with("a", "1")).unwrap();
        let mut wire = BytesMut::new();
        for chunk in &f {
            wire.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(wire.freeze(), f.to_bytes().unwrap());
    }

    #[tokio::test]
    async fn test_http_body() {
        let f = MultipartBody::form_data(
            Fields::new().with("name", "micro").with("avatar", gif_part()),
        )
        .unwrap();

        let stream = f.stream();
        assert!(!http_body::Body::is_end_stream(&stream));
        let collected = BodyExt::collect(stream).await.unwrap().to_bytes();
        assert_eq!(collected, f.to_bytes().unwrap());
    }
}
