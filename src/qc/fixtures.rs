//! Builders for the small FASTQ and BAM files used by the tests.

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::Path;

use noodles::bam;
use noodles::bam::bai;
use noodles::core::Position;
use noodles::csi::binning_index::index::reference_sequence::bin::Chunk;
use noodles::csi::binning_index::Indexer;
use noodles::sam;
use noodles::sam::alignment::io::Write as _;
use noodles::sam::alignment::Record as _;
use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::header::record::value::map::ReferenceSequence;
use noodles::sam::header::record::value::Map;

/// Renders FASTQ text with one record per sequence, named `r0`, `r1`, ...
pub(crate) fn fastq_text(sequences: &[&str]) -> String {
    sequences
        .iter()
        .enumerate()
        .map(|(i, sequence)| {
            format!(
                "@r{}\n{}\n+\n{}\n",
                i,
                sequence,
                "I".repeat(sequence.len())
            )
        })
        .collect()
}

/// Writes a BAM file with the given reference sequences and records. Each
/// record is a read name plus the index of the reference sequence it is placed
/// on (`None` for an unplaced, unmapped record).
pub(crate) fn write_bam(path: &Path, references: &[&str], records: &[(&str, Option<usize>)]) {
    let length = NonZeroUsize::new(10_000).unwrap();

    let header = references
        .iter()
        .fold(sam::Header::builder(), |builder, name| {
            builder.add_reference_sequence(*name, Map::<ReferenceSequence>::new(length))
        })
        .build();

    let mut writer = bam::io::Writer::new(File::create(path).unwrap());
    writer.write_header(&header).unwrap();

    for (name, reference_sequence_id) in records {
        let builder = RecordBuf::builder().set_name(*name);

        let record = match reference_sequence_id {
            Some(id) => builder
                .set_flags(Flags::empty())
                .set_reference_sequence_id(*id)
                .set_alignment_start(Position::MIN)
                .build(),
            None => builder.set_flags(Flags::UNMAPPED).build(),
        };

        writer.write_alignment_record(&header, &record).unwrap();
    }

    writer.try_finish().unwrap();
}

/// Builds a BAM index for the file at `path` and writes it next to it as
/// `<path>.bai`. Records must be sorted by reference sequence and position.
pub(crate) fn index_bam(path: &Path) {
    let mut reader = bam::io::Reader::new(File::open(path).unwrap());
    let header = reader.read_header().unwrap();

    let mut indexer = Indexer::default();
    let mut record = bam::Record::default();
    let mut start = reader.get_ref().virtual_position();

    while reader.read_record(&mut record).unwrap() != 0 {
        let end = reader.get_ref().virtual_position();

        let context = match (
            record.reference_sequence_id().transpose().unwrap(),
            record.alignment_start().transpose().unwrap(),
            record.alignment_end().transpose().unwrap(),
        ) {
            (Some(id), Some(alignment_start), Some(alignment_end)) => Some((
                id,
                alignment_start,
                alignment_end,
                !record.flags().is_unmapped(),
            )),
            _ => None,
        };

        indexer.add_record(context, Chunk::new(start, end)).unwrap();
        start = end;
    }

    let index: bai::Index = indexer.build(header.reference_sequences().len());
    bai::write(crate::utils::formats::bam::index_path(path), &index).unwrap();
}
