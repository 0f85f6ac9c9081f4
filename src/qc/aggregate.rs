//! Functionality related to the aggregation of quality control results
//! across samples.

use std::io;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::error::Error;
use super::error::Result;
use super::metrics::QcMetrics;
use super::sample::QC_FILE_SUFFIX;
use crate::utils::output::write_atomically;

/// Name of the identity column of a combined table by default.
pub const DEFAULT_IDENTITY_COLUMN: &str = "sample";

/// The label and metrics of one sample.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetrics {
    /// The sample's label.
    pub label: String,

    /// The sample's metrics.
    pub metrics: QcMetrics,
}

impl SampleMetrics {
    /// Creates a new [`SampleMetrics`].
    pub fn new<L>(label: L, metrics: QcMetrics) -> Self
    where
        L: Into<String>,
    {
        SampleMetrics {
            label: label.into(),
            metrics,
        }
    }
}

/// Reads a per-sample QC file. The label is the file name without its
/// `.qc.txt` suffix (or without its extension for files named otherwise).
pub fn read_sample<P>(src: P) -> Result<SampleMetrics>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::table_format(path, "cannot derive a sample label from the path"))?;

    let label = match file_name.strip_suffix(QC_FILE_SUFFIX) {
        Some(label) => label,
        None => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file_name),
    };

    if label.is_empty() {
        return Err(Error::table_format(path, "sample label is empty"));
    }

    Ok(SampleMetrics::new(label, QcMetrics::read_tsv(path)?))
}

/// One row of a [`CombinedTable`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The sample's label.
    pub label: String,

    /// The sample's metric values, in the table's metric column order.
    pub values: Vec<u64>,
}

/// Quality control metrics of many samples: one row per sample, in the order
/// the samples were given.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedTable {
    identity_column: String,
    metric_columns: Vec<String>,
    rows: Vec<Row>,
}

impl CombinedTable {
    /// The full header: the identity column followed by the metric columns.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once(self.identity_column.as_str())
            .chain(self.metric_columns.iter().map(String::as_str))
            .collect()
    }

    /// The metric columns only.
    pub fn metric_columns(&self) -> &[String] {
        &self.metric_columns
    }

    /// The rows, in input order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of samples in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows. Aggregation never produces one, but the
    /// method pairs with [`CombinedTable::len`].
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as tab-separated text: a header row with the identity
    /// column first, then one row per sample. There is no index column.
    pub fn write_tsv<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        writeln!(writer, "{}", self.header().into_iter().join("\t"))?;

        for row in &self.rows {
            writeln!(
                writer,
                "{}\t{}",
                row.label,
                row.values.iter().join("\t")
            )?;
        }

        Ok(())
    }

    /// Writes the table to `dst`, replacing any existing file.
    pub fn write<P>(&self, dst: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = dst.as_ref();
        info!(
            "Writing QC information for {} samples to {}.",
            self.len(),
            path.display()
        );

        write_atomically(path, |writer| self.write_tsv(writer)).map_err(|e| Error::io(path, e))
    }
}

/// Combines per-sample metrics into a [`CombinedTable`].
#[derive(Clone, Debug)]
pub struct QcAggregator {
    identity_column: String,
}

impl Default for QcAggregator {
    fn default() -> Self {
        QcAggregator {
            identity_column: String::from(DEFAULT_IDENTITY_COLUMN),
        }
    }
}

impl QcAggregator {
    /// Creates an aggregator whose identity column is named `identity_column`.
    pub fn new<S>(identity_column: S) -> Self
    where
        S: Into<String>,
    {
        QcAggregator {
            identity_column: identity_column.into(),
        }
    }

    /// Builds the combined table. The metric columns are the header of the
    /// first sample; every other sample must have exactly the same header
    /// (names and order), otherwise [`Error::HeaderMismatch`] is returned.
    /// Zero samples is an [`Error::EmptyInput`].
    pub fn aggregate<'a, I>(&self, samples: I) -> Result<CombinedTable>
    where
        I: IntoIterator<Item = &'a SampleMetrics>,
    {
        let mut samples = samples.into_iter().peekable();

        let expected: Vec<String> = match samples.peek() {
            Some(first) => first
                .metrics
                .header()
                .into_iter()
                .map(String::from)
                .collect(),
            None => return Err(Error::EmptyInput),
        };

        let mut rows = Vec::new();

        for sample in samples {
            let header = sample.metrics.header();

            if header != expected {
                return Err(Error::HeaderMismatch {
                    label: sample.label.clone(),
                    expected: expected.join("\t"),
                    found: header.join("\t"),
                });
            }

            debug!("  [*] Adding sample {}.", sample.label);
            rows.push(Row {
                label: sample.label.clone(),
                values: sample.metrics.iter().map(|(_, value)| value).collect(),
            });
        }

        Ok(CombinedTable {
            identity_column: self.identity_column.clone(),
            metric_columns: expected,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn sample(label: &str, fields: &[(&str, u64)]) -> SampleMetrics {
        SampleMetrics::new(
            label,
            fields
                .iter()
                .map(|(field, value)| (field.to_string(), *value))
                .collect(),
        )
    }

    fn standard(label: &str, reads: u64, mapped: u64, ribo: u64) -> SampleMetrics {
        sample(
            label,
            &[("num_reads", reads), ("num_mapped", mapped), ("num_ribo", ribo)],
        )
    }

    #[test]
    fn test_aggregate_keeps_input_order() {
        let samples = vec![
            standard("zeta", 10, 8, 1),
            standard("alpha", 20, 15, 2),
            standard("mu", 30, 25, 3),
        ];

        let table = QcAggregator::default().aggregate(&samples).unwrap();

        assert_eq!(
            table.header(),
            vec!["sample", "num_reads", "num_mapped", "num_ribo"]
        );
        assert_eq!(table.len(), 3);

        for (row, sample) in table.rows().iter().zip(&samples) {
            assert_eq!(row.label, sample.label);
            let values: Vec<u64> = sample.metrics.iter().map(|(_, v)| v).collect();
            assert_eq!(row.values, values);
        }
    }

    #[test]
    fn test_aggregate_empty_input() {
        let samples: Vec<SampleMetrics> = Vec::new();
        assert!(matches!(
            QcAggregator::default().aggregate(&samples),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_aggregate_header_mismatch() {
        let samples = vec![
            standard("s1", 10, 8, 1),
            sample("s2", &[("num_reads", 1), ("num_ribo", 1), ("num_mapped", 1)]),
        ];

        match QcAggregator::default().aggregate(&samples) {
            Err(Error::HeaderMismatch { label, .. }) => assert_eq!(label, "s2"),
            other => panic!("expected a header mismatch, got {:?}", other),
        }

        let samples = vec![
            standard("s1", 10, 8, 1),
            sample("s2", &[("num_reads", 1), ("num_mapped", 1)]),
        ];
        assert!(matches!(
            QcAggregator::default().aggregate(&samples),
            Err(Error::HeaderMismatch { .. })
        ));
    }

    #[test]
    fn test_write_combined_table() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reports").join("qc_summary.txt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale contents\n").unwrap();

        let samples = vec![standard("s1", 10, 8, 1), standard("s2", 20, 15, 0)];
        let table = QcAggregator::new("label").aggregate(&samples).unwrap();
        table.write(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "label\tnum_reads\tnum_mapped\tnum_ribo\n\
             s1\t10\t8\t1\n\
             s2\t20\t15\t0\n"
        );
    }

    #[test]
    fn test_empty_aggregation_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("qc_summary.txt");

        let samples: Vec<SampleMetrics> = Vec::new();
        let result = QcAggregator::default()
            .aggregate(&samples)
            .and_then(|table| table.write(&path));

        assert!(matches!(result, Err(Error::EmptyInput)));
        assert!(!path.exists());
    }

    #[test]
    fn test_read_sample_derives_label() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("liver_1.qc.txt");
        fs::write(&path, "num_reads\tnum_mapped\tnum_ribo\n5\t3\t3\n").unwrap();

        let sample = read_sample(&path).unwrap();
        assert_eq!(sample, standard("liver_1", 5, 3, 3));
    }
}
