//! DVI Parser Module
//!
//! Loads TeX DVI files (format id 2) into memory and indexes them for random
//! page access. Parsing runs four passes over one immutable byte buffer:
//! preamble, postamble location, postamble (with font definitions) and the
//! page index rebuilt from the backward BOP chain.

pub mod cursor;
pub mod opcodes;
pub mod page_index;
pub mod postamble;
pub mod preamble;
pub mod reader;

#[cfg(test)]
pub(crate) mod test_helpers;

use crate::error::DviError;

pub use self::cursor::ByteCursor;
pub use self::page_index::PageIndex;
pub use self::postamble::{locate_postamble, FontDefinition, Postamble};
pub use self::preamble::Preamble;
pub use self::reader::DviDocument;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// DVI parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The DVI file is empty")]
    EmptyFile,

    #[error("The DVI file does not start with the preamble")]
    MissingPreamble,

    #[error("Unsupported DVI version {0}; output of a related engine (e.g. Omega) needs a dedicated viewer")]
    UnsupportedVersion(u8),

    #[error("The DVI file is badly corrupted: the postamble could not be found")]
    PostambleNotFound,

    #[error("The postamble does not begin with the POST command (found {found:#04x})")]
    MissingPost { found: u8 },

    #[error("The postamble contains command {found:#04x} at offset {offset}, expected a font definition")]
    UnexpectedPostambleCommand { offset: usize, found: u8 },

    #[error("Page {page} does not start with the BOP command")]
    MissingBop { page: usize },

    #[error("Unexpected end of data at offset {offset}: {needed} more byte(s) needed")]
    Truncated { offset: usize, needed: usize },

    #[error("Invalid integer width: {0} bytes")]
    InvalidWidth(u8),

    #[error("Page {page} links back to offset {target}, outside the file")]
    InvalidBackLink { page: usize, target: u64 },

    #[error("Font number {0} is defined twice in the postamble")]
    DuplicateFont(u32),

    #[error("Corrupted DVI file: {0}")]
    Corrupted(String),

    #[error("Not enough memory: {0}")]
    OutOfMemory(String),
}

/// Coarse classification of parse failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A PRE, POST, POST_POST or BOP marker is missing where one is required
    FormatMismatch,
    /// The preamble announces another DVI variant
    UnsupportedVersion,
    /// Data ends early or points at nonsense
    TruncatedOrCorrupted,
    /// Buffer allocation failed
    OutOfMemory,
    /// The file could not be read
    IoFailure,
}

impl ParseError {
    /// Map this error onto its failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MissingPreamble
            | ParseError::MissingPost { .. }
            | ParseError::UnexpectedPostambleCommand { .. }
            | ParseError::MissingBop { .. }
            | ParseError::DuplicateFont(_) => ErrorKind::FormatMismatch,
            ParseError::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            ParseError::EmptyFile
            | ParseError::PostambleNotFound
            | ParseError::Truncated { .. }
            | ParseError::InvalidWidth(_)
            | ParseError::InvalidBackLink { .. }
            | ParseError::Corrupted(_) => ErrorKind::TruncatedOrCorrupted,
            ParseError::OutOfMemory(_) => ErrorKind::OutOfMemory,
            ParseError::Io(_) => ErrorKind::IoFailure,
        }
    }
}

impl From<std::collections::TryReserveError> for ParseError {
    fn from(err: std::collections::TryReserveError) -> Self {
        ParseError::OutOfMemory(err.to_string())
    }
}

impl From<ParseError> for DviError {
    fn from(err: ParseError) -> Self {
        DviError::Parse(err)
    }
}

/// Options controlling how strictly a DVI file is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Replace page back-links that point outside the file with offset 0
    /// instead of failing.
    pub lenient_back_links: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ParseOptions {
    /// Options accepted by classic DVI previewers
    pub fn lenient() -> Self {
        Self {
            lenient_back_links: true,
        }
    }

    /// Reject any structural inconsistency
    pub fn strict() -> Self {
        Self {
            lenient_back_links: false,
        }
    }
}
