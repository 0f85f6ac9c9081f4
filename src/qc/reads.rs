//! Streaming operations over the read (FASTQ) file of a sample.

use std::io;
use std::io::BufRead;
use std::path::Path;

use noodles::fastq;
use num_format::Locale;
use num_format::ToFormattedString;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::error::Error;
use super::error::Result;
use crate::utils::args::NumberOfRecords;
use crate::utils::formats;
use crate::utils::progress::RecordCounter;

/// The per-position fraction of reads with an unresolvable base call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseCallProfile {
    /// Number of read records examined.
    pub reads: usize,

    /// For each 0-based position in the read, the fraction of the reads
    /// reaching that position whose base at that position is `N`. The length
    /// is the length of the longest read examined.
    pub fractions: Vec<f64>,
}

/// Whether a base call is unresolvable.
fn is_unresolvable(base: u8) -> bool {
    matches!(base, b'N' | b'n')
}

type FastqReader = fastq::io::Reader<Box<dyn BufRead>>;

fn open<P>(src: P) -> Result<FastqReader>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    formats::fastq::reader(path).map_err(|e| Error::io(path, e))
}

/// Consumes empty lines sitting where the next record should start, such as
/// a trailing newline at the end of the file.
fn skip_blank_lines<R>(reader: &mut R) -> io::Result<()>
where
    R: BufRead,
{
    loop {
        let buf = reader.fill_buf()?;

        let n = match buf {
            [b'\n', ..] => 1,
            [b'\r', b'\n', ..] => 2,
            _ => return Ok(()),
        };

        reader.consume(n);
    }
}

/// A record only counts if all four of its lines were present: a record cut
/// short at the end of the file is left with a quality string that does not
/// match its sequence.
fn validate(record: &fastq::Record) -> io::Result<()> {
    let sequence = record.sequence().len();
    let quality = record.quality_scores().len();

    if sequence != quality {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "sequence length ({}) does not match quality length ({})",
                sequence, quality
            ),
        ));
    }

    Ok(())
}

/// Reads the next complete record into `record`. Returns `false` at the end
/// of the file.
fn next_record(reader: &mut FastqReader, record: &mut fastq::Record) -> io::Result<bool> {
    skip_blank_lines(reader.get_mut())?;

    match reader.read_record(record)? {
        0 => Ok(false),
        _ => validate(record).map(|_| true),
    }
}

/// Counts the records in a FASTQ file. Each call opens a fresh stream and
/// holds only the current record in memory. Blank lines between records, or
/// at the end of the file, are ignored.
pub fn count_reads<P>(src: P) -> Result<u64>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    debug!("counting reads in {}", path.display());

    let mut reader = open(path)?;
    let mut record = fastq::Record::default();
    let mut counter = RecordCounter::for_file(path);

    while next_record(&mut reader, &mut record).map_err(|e| Error::read_format(path, e))? {
        counter.inc();
    }

    let count = counter.get() as u64;
    debug!(
        "counted {} reads in {}",
        count.to_formatted_string(&Locale::en),
        path.display()
    );

    Ok(count)
}

/// Computes the fraction of reads with an unresolvable base call at every
/// position, looking at no more than `max_records` records.
///
/// A position reached by no read yields [`Error::DivisionUndefined`] instead of
/// a NaN. An input without reads yields an empty profile.
pub fn base_call_error_profile<P>(src: P, max_records: NumberOfRecords) -> Result<BaseCallProfile>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    info!(
        "Computing base call error profile for {} (records: {}).",
        path.display(),
        max_records
    );

    let mut reader = open(path)?;
    let mut record = fastq::Record::default();
    let mut counter = RecordCounter::for_file(path);

    // Indexed by position within the read.
    let mut unresolvable: Vec<u64> = Vec::new();
    let mut reached: Vec<u64> = Vec::new();

    while !counter.reached(max_records)
        && next_record(&mut reader, &mut record).map_err(|e| Error::read_format(path, e))?
    {
        let sequence = record.sequence();
        if sequence.len() > reached.len() {
            reached.resize(sequence.len(), 0);
            unresolvable.resize(sequence.len(), 0);
        }

        for (position, base) in sequence.iter().enumerate() {
            reached[position] += 1;
            if is_unresolvable(*base) {
                unresolvable[position] += 1;
            }
        }

        counter.inc();
    }

    let fractions = reached
        .iter()
        .zip(&unresolvable)
        .enumerate()
        .map(|(position, (&total, &n))| match total {
            0 => Err(Error::DivisionUndefined { position }),
            _ => Ok(n as f64 / total as f64),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BaseCallProfile {
        reads: counter.get(),
        fractions,
    })
}
