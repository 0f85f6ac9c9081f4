//! Utilities related to opening FASTQ files.

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fastq;
use tracing::debug;

use super::BioinformaticsFileFormat;

/// Attempts to open a FASTQ file from a given source. Files ending in
/// `.fastq.gz` or `.fq.gz` are transparently decompressed; files with an
/// unrecognized extension are read as plain text.
pub fn reader<P>(src: P) -> io::Result<fastq::io::Reader<Box<dyn BufRead>>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();

    let inner: Box<dyn BufRead> = match BioinformaticsFileFormat::try_detect(path) {
        Some(BioinformaticsFileFormat::FASTQ_GZ) => {
            let file = File::open(path)?;
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        }
        Some(BioinformaticsFileFormat::FASTQ) => Box::new(BufReader::new(File::open(path)?)),
        Some(format) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("incompatible formats: required FASTQ, found {}", format),
            ))
        }
        None => {
            debug!(
                "unrecognized extension for {}, reading as plain FASTQ",
                path.display()
            );
            Box::new(BufReader::new(File::open(path)?))
        }
    };

    Ok(fastq::io::Reader::new(inner))
}
