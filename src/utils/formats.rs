//! Utilities related to bioinformatics file formats.

use std::fmt;
use std::path::Path;

pub mod bam;
pub mod fastq;

/// The bioinformatics file formats that `rnaqc` knows how to open, as detected
/// from a file's extension(s).
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BioinformaticsFileFormat {
    /// Binary Alignment Map.
    BAM,

    /// Uncompressed FASTQ.
    FASTQ,

    /// Gzip-compressed FASTQ.
    FASTQ_GZ,
}

impl BioinformaticsFileFormat {
    /// Attempts to detect the file format from the extension(s) of a path.
    /// Returns `None` when the extension is missing or unrecognized.
    ///
    /// ```
    /// use rnaqc::utils::formats::BioinformaticsFileFormat;
    ///
    /// assert_eq!(
    ///     BioinformaticsFileFormat::try_detect("reads.fq.gz"),
    ///     Some(BioinformaticsFileFormat::FASTQ_GZ)
    /// );
    /// assert_eq!(BioinformaticsFileFormat::try_detect("reads.txt"), None);
    /// ```
    pub fn try_detect<P>(path: P) -> Option<Self>
    where
        P: AsRef<Path>,
    {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();

        if name.ends_with(".bam") {
            Some(Self::BAM)
        } else if name.ends_with(".fastq.gz") || name.ends_with(".fq.gz") {
            Some(Self::FASTQ_GZ)
        } else if name.ends_with(".fastq") || name.ends_with(".fq") {
            Some(Self::FASTQ)
        } else {
            None
        }
    }
}

impl fmt::Display for BioinformaticsFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BAM => write!(f, "BAM"),
            Self::FASTQ => write!(f, "FASTQ"),
            Self::FASTQ_GZ => write!(f, "gzipped FASTQ"),
        }
    }
}
