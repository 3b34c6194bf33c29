use crate::codec::{HeaderEncoder, TransferEncoder};
use crate::multipart::MultipartBody;
use crate::part::{Content, ContentSource};
use crate::protocol::{MultipartError, PayloadItem};
use bytes::{BufMut, Bytes, BytesMut};
use http_body::{Body, Frame};
use std::fmt;
use std::io;
use std::io::Read;
use std::iter::FusedIterator;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::codec::Encoder;
use tracing::{error, trace};

/// Size of a single read from a lazy content source
pub const READ_BLOCK_SIZE: usize = 8 * 1024;

/// Lazy, forward-only serialization of a [`MultipartBody`].
///
/// Each item is the next chunk of the wire format. A lazy part's reader is
/// opened when the stream reaches that part and dropped once its last chunk
/// has been produced, or when the stream itself is dropped. After an error
/// the stream is exhausted: the closing delimiter is never emitted for a
/// failed body.
///
/// The stream also implements [`http_body::Body`], so it can be handed to an
/// HTTP client directly.
pub struct BodyStream<'a> {
    body: &'a MultipartBody,
    boundary: &'a str,
    index: usize,
    state: State,
}

enum State {
    /// next item is the delimiter and headers of part `index`, or the closing delimiter
    Head,
    /// streaming the body of part `index`
    Body(PartReader),
    Done,
}

struct PartReader {
    reader: Reader,
    encoder: TransferEncoder,
}

enum Reader {
    Memory(Bytes),
    Source { handle: Box<dyn Read + Send>, source: Arc<dyn ContentSource> },
}

impl Reader {
    /// Returns the next block of raw content, `None` once exhausted
    fn read_block(&mut self) -> Result<Option<Bytes>, MultipartError> {
        match self {
            Reader::Memory(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let n = bytes.len().min(READ_BLOCK_SIZE);
                Ok(Some(bytes.split_to(n)))
            }
            Reader::Source { handle, source } => {
                let mut buf = vec![0u8; READ_BLOCK_SIZE];
                loop {
                    match handle.read(&mut buf) {
                        Ok(0) => return Ok(None),
                        Ok(n) => {
                            buf.truncate(n);
                            return Ok(Some(Bytes::from(buf)));
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            let source_name = source.describe();
                            error!(source = %source_name, cause = %e, "read content source failed");
                            return Err(MultipartError::source_unreadable(source_name, e));
                        }
                    }
                }
            }
        }
    }
}

impl<'a> BodyStream<'a> {
    pub(crate) fn new(body: &'a MultipartBody, boundary: &'a str) -> Self {
        Self { body, boundary, index: 0, state: State::Head }
    }

    fn write_delimiter(&self, dst: &mut BytesMut) {
        dst.put_slice(b"--");
        dst.put_slice(self.boundary.as_bytes());
    }

    fn head(&mut self) -> Result<Bytes, MultipartError> {
        let mut dst = BytesMut::with_capacity(self.boundary.len() + 8);

        let body = self.body;
        let Some(part) = body.parts().get(self.index) else {
            self.write_delimiter(&mut dst);
            dst.put_slice(b"--\r\n");
            trace!(parts = self.index, "emit closing delimiter");
            return Ok(dst.freeze());
        };

        let reader = match part.content() {
            Content::Bytes(bytes) => Reader::Memory(bytes.clone()),
            Content::Source(source) => {
                let handle = source.open().map_err(|e| {
                    let source_name = source.describe();
                    error!(source = %source_name, cause = %e, "open content source failed");
                    MultipartError::source_unreadable(source_name, e)
                })?;
                Reader::Source { handle, source: Arc::clone(source) }
            }
        };

        trace!(index = self.index, name = ?part.name(), encoding = %part.encoding(), "emit part");
        self.write_delimiter(&mut dst);
        dst.put_slice(b"\r\n");
        HeaderEncoder.encode(&part.prepared_headers(), &mut dst)?;

        let encoder = TransferEncoder::new(part.encoding(), part.body_line_length());
        self.state = State::Body(PartReader { reader, encoder });
        Ok(dst.freeze())
    }

    fn body(&mut self, mut part: PartReader) -> Result<Bytes, MultipartError> {
        let mut dst = BytesMut::new();
        match part.reader.read_block()? {
            Some(bytes) => {
                part.encoder.encode(PayloadItem::Chunk(bytes), &mut dst)?;
                self.state = State::Body(part);
            }
            None => {
                part.encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst)?;
                dst.put_slice(b"\r\n");
                // releases the source handle before the next part is opened
                drop(part);
                self.index += 1;
                self.state = State::Head;
            }
        }
        Ok(dst.freeze())
    }
}

impl Iterator for BodyStream<'_> {
    type Item = Result<Bytes, MultipartError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match std::mem::replace(&mut self.state, State::Done) {
                State::Done => return None,
                State::Head => self.head(),
                State::Body(part) => self.body(part),
            };

            match step {
                Ok(chunk) if chunk.is_empty() => {}
                Ok(chunk) => return Some(Ok(chunk)),
                Err(e) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl FusedIterator for BodyStream<'_> {}

impl Body for BodyStream<'_> {
    type Data = Bytes;
    type Error = MultipartError;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().next().map(|chunk| chunk.map(Frame::data)))
    }

    fn is_end_stream(&self) -> bool {
        matches!(self.state, State::Done)
    }
}

impl fmt::Debug for BodyStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Head => "head",
            State::Body(_) => "body",
            State::Done => "done",
        };
        f.debug_struct("BodyStream")
            .field("boundary", &self.boundary)
            .field("index", &self.index)
            .field("state", &state)
            .finish()
    }
}
