use crate::protocol::MultipartError;
use std::fmt;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::error;

/// A lazily readable body content.
///
/// Implementations are asked to [`open`](ContentSource::open) a fresh reader
/// every time a body is rendered; the reader is dropped as soon as the part's
/// bytes have been emitted.
#[cfg_attr(test, mockall::automock)]
pub trait ContentSource: Send + Sync {
    /// Opens a new reader positioned at the start of the content
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Human readable identity of the source, used in error reports
    fn describe(&self) -> String;
}

/// [`ContentSource`] backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    /// Creates a source for `path`, failing early if it is not a readable file
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MultipartError> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| {
            error!(path = %path.display(), cause = %e, "content source is unreadable");
            MultipartError::source_unreadable(path.display(), e)
        })?;

        if !metadata.is_file() {
            error!(path = %path.display(), "content source is not a file");
            return Err(MultipartError::source_unreadable(
                path.display(),
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        Ok(Self { path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final path component, used as the part's filename
    pub fn file_name(&self) -> Option<String> {
        self.path.file_name().map(|name| name.to_string_lossy().into_owned())
    }
}

impl ContentSource for PathSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(file))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

impl fmt::Debug for dyn ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentSource")
    }
}
