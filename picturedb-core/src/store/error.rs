//! Error type shared by picture store implementations.

use std::{io, path::PathBuf};

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::{Column, DialectError, FieldError, ProjectionError};

/// Errors returned by [`PictureStore`](super::PictureStore) operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PictureStoreError {
    /// The header does not declare the columns a picture needs.
    #[error("invalid header in {path}: {source}")]
    Header {
        /// Store file whose header was rejected.
        path: Utf8PathBuf,
        /// Projection failure describing the missing column.
        #[source]
        source: ProjectionError,
    },
    /// The dialect would write rows the store cannot read back.
    #[error("unusable dialect for {path}: {source}")]
    Dialect {
        /// Store file the dialect was configured for.
        path: Utf8PathBuf,
        /// Reason the dialect was rejected.
        #[source]
        source: DialectError,
    },
    /// The file contains no header line at all.
    #[error("{path} has no header line")]
    MissingHeader {
        /// Store file without a header.
        path: Utf8PathBuf,
    },
    /// The picture cannot be represented as a row; nothing was written.
    #[error("picture {field} {reason}")]
    Precondition {
        /// Field that violates the row format.
        field: Column,
        /// Why the value cannot be stored.
        reason: &'static str,
    },
    /// No row carries the requested identifier; the file is unchanged.
    #[error("picture {id} not found")]
    NotFound {
        /// Identifier that was looked up.
        id: u64,
    },
    /// A row needed by the operation failed to parse.
    #[error("corrupt row at {path}:{line}: {source}")]
    Corrupt {
        /// Store file containing the row.
        path: Utf8PathBuf,
        /// One-based line number of the row.
        line: usize,
        /// Field conversion failure.
        #[source]
        source: FieldError,
    },
    /// The store path exists but is not a regular file.
    #[error("{path} is not a regular file")]
    NotAFile {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// An operating-system call failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// Short description of the attempted action.
        operation: &'static str,
        /// Path the action targeted.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// Replacing the file failed after the original disappeared.
    ///
    /// The rewritten content is kept at `recovered` when possible and must be
    /// moved into place by hand.
    #[error("{path} vanished while being replaced (rewritten data kept at {recovered:?}): {source}")]
    Inconsistent {
        /// Store file that no longer exists.
        path: Utf8PathBuf,
        /// Location of the retained temporary file, if it could be kept.
        recovered: Option<PathBuf>,
        /// Error returned by the failed rename.
        #[source]
        source: io::Error,
    },
    /// The largest identifier is already `u64::MAX`.
    #[error("no identifiers left after {max}")]
    IdentifiersExhausted {
        /// Largest identifier in the store.
        max: u64,
    },
}

impl PictureStoreError {
    pub(crate) fn io(operation: &'static str, path: &camino::Utf8Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}
