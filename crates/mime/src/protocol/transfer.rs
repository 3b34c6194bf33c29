use std::fmt;

/// Maximum line length recommended for MIME bodies and headers (RFC 2045 / RFC 5322).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 76;

/// Content-Transfer-Encoding of a single part.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransferEncoding {
    /// US-ASCII content, lines no longer than 998 octets
    SevenBit,
    /// arbitrary octets, no transformation
    EightBit,
    /// base64 as defined by RFC 2045 section 6.8
    Base64,
    /// quoted-printable as defined by RFC 2045 section 6.7
    QuotedPrintable,
}

impl TransferEncoding {
    /// The header token for this encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferEncoding::SevenBit => "7bit",
            TransferEncoding::EightBit => "8bit",
            TransferEncoding::Base64 => "base64",
            TransferEncoding::QuotedPrintable => "quoted-printable",
        }
    }

    /// Returns true if the body is emitted unchanged
    #[inline]
    pub fn is_identity(&self) -> bool {
        matches!(self, TransferEncoding::SevenBit | TransferEncoding::EightBit)
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line length policy used when folding headers and encoded bodies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LineLength {
    /// fold lines longer than the given number of columns
    Bounded(usize),
    /// never fold
    Unbounded,
}

impl LineLength {
    /// Returns the column limit, or `None` when folding is disabled
    #[inline]
    pub fn limit(self) -> Option<usize> {
        match self {
            LineLength::Bounded(n) => Some(n),
            LineLength::Unbounded => None,
        }
    }

    #[inline]
    pub fn is_unbounded(self) -> bool {
        matches!(self, LineLength::Unbounded)
    }
}

impl Default for LineLength {
    fn default() -> Self {
        LineLength::Bounded(DEFAULT_MAX_LINE_LENGTH)
    }
}

/// The kind of envelope a part is serialized in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Container {
    /// the part is rendered on its own
    #[default]
    Standalone,
    /// the part belongs to a `multipart/form-data` body
    FormData,
    /// the part belongs to any other multipart body (`mixed`, `alternative`, ...)
    Multipart,
}
