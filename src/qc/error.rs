//! Errors raised while computing, reading, or aggregating quality control
//! metrics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for quality control operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy for quality control operations.
///
/// Format errors and missing references are scoped to a single sample: callers
/// processing many samples are expected to report them and move on. Aggregation
/// errors ([`Error::EmptyInput`], [`Error::HeaderMismatch`]) only concern the
/// aggregation step.
#[derive(Debug, Error)]
pub enum Error {
    /// The read file could not be parsed as a sequence of 4-line FASTQ records.
    #[error("malformed read file {}: {source}", path.display())]
    ReadFormat {
        /// The read file.
        path: PathBuf,
        /// The underlying parse error.
        source: io::Error,
    },

    /// The alignment file could not be parsed as a BAM file.
    #[error("malformed alignment file {}: {source}", path.display())]
    AlignmentFormat {
        /// The alignment file.
        path: PathBuf,
        /// The underlying parse error.
        source: io::Error,
    },

    /// The requested reference sequence is not in the alignment file's header.
    #[error("reference sequence \"{name}\" not found in {}", path.display())]
    ReferenceNotFound {
        /// The alignment file.
        path: PathBuf,
        /// The requested reference sequence name.
        name: String,
    },

    /// Aggregation was requested without any samples.
    #[error("no samples were provided to aggregate")]
    EmptyInput,

    /// A sample's metric header differs from the first sample's header.
    #[error("sample \"{label}\" has metric header [{found}], expected [{expected}]")]
    HeaderMismatch {
        /// The label of the offending sample.
        label: String,
        /// The header of the first sample, tab-joined.
        expected: String,
        /// The header of the offending sample, tab-joined.
        found: String,
    },

    /// No read reached a position of the base call profile.
    #[error("no reads reach position {position}, fraction is undefined")]
    DivisionUndefined {
        /// The 0-based position within the read.
        position: usize,
    },

    /// A QC table or sample sheet could not be parsed.
    #[error("malformed table {}: {reason}", path.display())]
    TableFormat {
        /// The offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// Results were requested for a sample whose metrics were never computed.
    #[error("metrics for sample \"{label}\" have not been computed")]
    NotComputed {
        /// The label of the sample.
        label: String,
    },

    /// Opening, creating, or replacing a file failed.
    #[error("I/O error for {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl Error {
    /// Wraps an [`io::Error`] raised while accessing `path`.
    pub fn io<P>(path: P, source: io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a parse error raised while reading the FASTQ file at `path`.
    pub fn read_format<P>(path: P, source: io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        Error::ReadFormat {
            path: path.into(),
            source,
        }
    }

    /// Wraps a parse error raised while reading the BAM file at `path`.
    pub fn alignment_format<P>(path: P, source: io::Error) -> Self
    where
        P: Into<PathBuf>,
    {
        Error::AlignmentFormat {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`Error::TableFormat`].
    pub fn table_format<P, R>(path: P, reason: R) -> Self
    where
        P: Into<PathBuf>,
        R: Into<String>,
    {
        Error::TableFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
