//! Utilities related to opening Binary Alignment Map (BAM) files.

use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use noodles::bam;
use noodles::bgzf;
use tracing::debug;

use super::BioinformaticsFileFormat;

/// Attempts to open a BAM file from a given source. Only the file handle is
/// opened here: the caller is responsible for reading the header before
/// iterating over records.
pub fn open<P>(src: P) -> io::Result<bam::io::Reader<bgzf::Reader<File>>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();

    match BioinformaticsFileFormat::try_detect(path) {
        Some(BioinformaticsFileFormat::BAM) | None => {
            debug!("reading BAM file from disk: {}", path.display());
            let file = File::open(path)?;
            Ok(bam::io::Reader::new(file))
        }
        Some(format) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("incompatible formats: required BAM, found {}", format),
        )),
    }
}

/// The conventional location of the index of a BAM file: `<src>.bai`.
pub fn index_path<P>(src: P) -> PathBuf
where
    P: AsRef<Path>,
{
    let mut path = OsString::from(src.as_ref().as_os_str());
    path.push(".bai");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_path_appends_extension() {
        assert_eq!(
            index_path("/data/s1.bam"),
            PathBuf::from("/data/s1.bam.bai")
        );
        assert_eq!(index_path("s1"), PathBuf::from("s1.bai"));
    }

    #[test]
    fn test_open_rejects_fastq_extension() {
        let err = open("reads.fastq").map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
