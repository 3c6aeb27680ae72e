//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::table::Table;

/// Broad category of an [`Error`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The data does not follow the container layout
    Format,
    /// An offset or size points outside of the buffer
    OutOfRange,
    /// An embedded file could not be inflated
    Decompress,
    /// Reading or writing the filesystem failed
    Io,
}

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// header has bad magic
    #[error("header has bad magic {found:02X?}, expected {expected:?}")]
    #[diagnostic(help("root containers start with \"RCOF\" and locale containers with \"RCSF\""))]
    InvalidMagic {
        /// The magic required for the requested container kind
        expected: &'static str,
        /// The first four bytes of the buffer
        found: [u8; 4],
    },

    /// hash attribute has a stride other than 4
    #[error("hash attribute declares a stride of {0}, expected 4")]
    InvalidHashStride(i32),

    /// node children are only half linked
    #[error("node at tree offset {offset:#X} has mismatched first and last child links")]
    InconsistentChildren {
        /// Offset of the node inside the tree table
        offset: i32,
    },

    /// node is nested deeper than allowed
    #[error("tree is nested deeper than {0} levels")]
    DepthExceeded(usize),

    /// node links back into an already visited node
    #[error("node at tree offset {offset:#X} is reachable more than once")]
    TreeCycle {
        /// Offset of the node inside the tree table
        offset: i32,
    },

    /// a sibling attribute needed for extraction is absent
    #[error("<{tag}> has no usable \"{name}\" attribute")]
    MissingAttribute {
        /// Name of the tag being extracted
        tag: String,
        /// Name of the attribute that was looked up
        name: &'static str,
    },

    /// derived output path leaves the output root
    #[error("<{tag}> would be written to {}, outside of the output directory", path.display())]
    UnsafePath {
        /// Name of the tag being extracted
        tag: String,
        /// The rejected relative path
        path: std::path::PathBuf,
    },

    /// range does not fit into the buffer
    #[error("{len} bytes at offset {offset:#X} of the {table} table are out of range")]
    OutOfRange {
        /// Table the offset is relative to
        table: Table,
        /// Offset relative to the start of the table
        offset: i64,
        /// Number of bytes requested
        len: i64,
    },

    /// inflating an embedded file failed
    #[error("unable to inflate embedded file")]
    Decompress(#[source] std::io::Error),

    /// inflated file does not have the declared size
    #[error("inflated {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// The `origsize` attribute of the tag
        expected: usize,
        /// Number of bytes produced by inflating, capped at `expected + 1`
        actual: usize,
    },

    /// An output path that cannot name a file, reported with the other filesystem failures
    #[error("{0}")]
    CustomError(String),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IOError(_) | Error::CustomError(_) => ErrorKind::Io,
            Error::BinRWError(binrw::Error::Io(_)) => ErrorKind::Io,
            Error::BinRWError(_) => ErrorKind::Format,
            Error::InvalidMagic { .. }
            | Error::InvalidHashStride(_)
            | Error::InconsistentChildren { .. }
            | Error::DepthExceeded(_)
            | Error::TreeCycle { .. }
            | Error::MissingAttribute { .. }
            | Error::UnsafePath { .. } => ErrorKind::Format,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::Decompress(_) | Error::SizeMismatch { .. } => ErrorKind::Decompress,
        }
    }

    /// Whether this error should abort the whole container instead of a single attribute
    pub(crate) fn is_fatal(&self) -> bool {
        matches!(self, Error::InvalidHashStride(_))
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
