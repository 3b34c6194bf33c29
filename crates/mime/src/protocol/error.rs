use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultipartError {
    #[error("invalid field: {reason}")]
    InvalidField { reason: String },

    #[error("content source `{source_name}` is unreadable: {source}")]
    SourceUnreadable { source_name: String, source: io::Error },

    #[error("encoding error: {reason}")]
    Encoding { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl MultipartError {
    pub fn invalid_field<S: ToString>(str: S) -> Self {
        Self::InvalidField { reason: str.to_string() }
    }

    pub fn source_unreadable<S: ToString, E: Into<io::Error>>(source_name: S, e: E) -> Self {
        Self::SourceUnreadable { source_name: source_name.to_string(), source: e.into() }
    }

    pub fn encoding<S: ToString>(str: S) -> Self {
        Self::Encoding { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if the error came from a content source that could not be read
    #[inline]
    pub fn is_source_unreadable(&self) -> bool {
        matches!(self, MultipartError::SourceUnreadable { .. })
    }
}
