//! Streaming operations over the alignment (BAM) file of a sample.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use noodles::bam;
use noodles::bam::bai;
use noodles::bgzf;
use noodles::core::Region;
use noodles::sam;
use num_format::Locale;
use num_format::ToFormattedString;
use tracing::debug;

use super::error::Error;
use super::error::Result;
use crate::utils::formats;
use crate::utils::progress::RecordCounter;

type BamReader = bam::io::Reader<bgzf::Reader<File>>;

/// Opens a BAM file and reads its header. Failing to open the file is an I/O
/// error; failing to decode the header means the file is not a BAM file.
fn open_and_parse(path: &Path) -> Result<(BamReader, sam::Header)> {
    let mut reader = formats::bam::open(path).map_err(|e| Error::io(path, e))?;
    let header = reader
        .read_header()
        .map_err(|e| Error::alignment_format(path, e))?;

    Ok((reader, header))
}

/// Looks up the index of a reference sequence by its exact name.
fn reference_sequence_id(header: &sam::Header, name: &str) -> Option<usize> {
    header.reference_sequences().keys().position(|candidate| {
        let candidate: &[u8] = candidate.as_ref();
        candidate == name.as_bytes()
    })
}

/// Counts the distinct read names across all records of a BAM file.
///
/// Every read contributes at most one, however many records (secondary,
/// supplementary, or duplicate-marked alignments) it produced. Names are
/// compared byte for byte. Records without a name are not counted.
pub fn count_mapped<P>(src: P) -> Result<u64>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    debug!("counting distinct read names in {}", path.display());

    let (mut reader, _) = open_and_parse(path)?;
    let mut counter = RecordCounter::for_file(path);
    let mut names: HashSet<Box<[u8]>> = HashSet::new();
    let mut unnamed = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| Error::alignment_format(path, e))?;
        counter.inc();

        match record.name() {
            Some(name) => {
                let name: &[u8] = name.as_ref();
                if !names.contains(name) {
                    names.insert(Box::from(name));
                }
            }
            None => unnamed += 1,
        }
    }

    if unnamed > 0 {
        debug!(
            "{} records without a read name were not counted",
            unnamed.to_formatted_string(&Locale::en)
        );
    }

    debug!(
        "{} distinct read names across {} records",
        names.len().to_formatted_string(&Locale::en),
        counter.get().to_formatted_string(&Locale::en)
    );

    Ok(names.len() as u64)
}

/// Counts every record placed on the reference sequence named `name`, across
/// the whole reference sequence. Unlike [`count_mapped`], records sharing a
/// read name are all counted.
///
/// When a BAM index sits next to the file (`<src>.bai`), only the records of
/// that reference sequence are read. Otherwise the whole file is scanned.
///
/// Fails with [`Error::ReferenceNotFound`] if the BAM header has no reference
/// sequence with that name.
pub fn count_region_reads<P>(src: P, name: &str) -> Result<u64>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    debug!("counting records on {} in {}", name, path.display());

    let (mut reader, header) = open_and_parse(path)?;

    let target = match reference_sequence_id(&header, name) {
        Some(id) => id,
        None => {
            return Err(Error::ReferenceNotFound {
                path: path.to_path_buf(),
                name: name.to_string(),
            })
        }
    };

    let index_path = formats::bam::index_path(path);

    let count = if index_path.is_file() {
        debug!("querying {} through {}", name, index_path.display());
        let index =
            bai::read(&index_path).map_err(|e| Error::alignment_format(index_path.as_path(), e))?;
        query_region(&mut reader, &header, &index, name, path)?
    } else {
        debug!("no index found for {}, scanning all records", path.display());
        scan_region(&mut reader, target, path)?
    };

    debug!(
        "{} records on {}",
        count.to_formatted_string(&Locale::en),
        name
    );

    Ok(count)
}

/// Counts the records of one reference sequence through the BAM index. Only
/// records with an alignment start are returned by the index.
fn query_region(
    reader: &mut BamReader,
    header: &sam::Header,
    index: &bai::Index,
    name: &str,
    path: &Path,
) -> Result<u64> {
    let region = Region::new(name, ..);
    let mut counter = RecordCounter::for_file(path);

    let query = reader
        .query(header, index, &region)
        .map_err(|e| Error::alignment_format(path, e))?;

    for result in query {
        result.map_err(|e| Error::alignment_format(path, e))?;
        counter.inc();
    }

    Ok(counter.get() as u64)
}

/// Counts the records of one reference sequence by reading every record.
fn scan_region(reader: &mut BamReader, target: usize, path: &Path) -> Result<u64> {
    let mut counter = RecordCounter::for_file(path);
    let mut count = 0u64;

    for result in reader.records() {
        let record = result.map_err(|e| Error::alignment_format(path, e))?;
        counter.inc();

        match record.reference_sequence_id() {
            Some(Ok(id)) if id == target => count += 1,
            Some(Err(e)) => return Err(Error::alignment_format(path, e)),
            _ => {}
        }
    }

    Ok(count)
}
