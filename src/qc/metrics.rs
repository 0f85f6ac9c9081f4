//! The ordered mapping of quality control metrics computed for one sample.

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use super::error::Error;
use super::error::Result;

/// Total number of records in the read file.
pub const NUM_READS: &str = "num_reads";

/// Number of distinct read names in the alignment file.
pub const NUM_MAPPED: &str = "num_mapped";

/// Number of alignment records on the ribosomal reference sequence.
pub const NUM_RIBO: &str = "num_ribo";

/// Number of alignment records on the mitochondrial reference sequence.
pub const NUM_MITO: &str = "num_mito";

/// An ordered set of named integer metrics for one sample.
///
/// The insertion order of the fields _is_ the header, so the header and the
/// set of fields can never disagree. Inserting a field that already exists
/// replaces its value and keeps its position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QcMetrics {
    values: IndexMap<String, u64>,
}

impl QcMetrics {
    /// Creates an empty set of metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` to `value`, returning the previous value if there was one.
    pub fn insert<F>(&mut self, field: F, value: u64) -> Option<u64>
    where
        F: Into<String>,
    {
        self.values.insert(field.into(), value)
    }

    /// Gets the value of a field.
    pub fn get(&self, field: &str) -> Option<u64> {
        self.values.get(field).copied()
    }

    /// The field names, in order.
    pub fn header(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// Iterates over `(field, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Writes the metrics as a tab-separated table: one header row and exactly
    /// one data row, no index column.
    pub fn write_tsv<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        writeln!(writer, "{}", self.values.keys().join("\t"))?;
        writeln!(writer, "{}", self.values.values().join("\t"))?;
        Ok(())
    }

    /// Reads metrics back from a file written by [`QcMetrics::write_tsv`].
    pub fn read_tsv<P>(src: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = src.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        parse_tsv(&contents).map_err(|reason| Error::table_format(path, reason))
    }
}

impl FromIterator<(String, u64)> for QcMetrics {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        QcMetrics {
            values: iter.into_iter().collect(),
        }
    }
}

fn parse_tsv(contents: &str) -> std::result::Result<QcMetrics, String> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

    let header: Vec<&str> = match lines.next() {
        Some(line) => line.split('\t').collect(),
        None => return Err(String::from("missing header row")),
    };

    let values: Vec<&str> = match lines.next() {
        Some(line) => line.split('\t').collect(),
        None => return Err(String::from("missing data row")),
    };

    if lines.next().is_some() {
        return Err(String::from("expected exactly one data row"));
    }

    if header.len() != values.len() {
        return Err(format!(
            "header has {} columns but data row has {}",
            header.len(),
            values.len()
        ));
    }

    let mut metrics = QcMetrics::new();

    for (field, raw) in header.into_iter().zip(values) {
        let value = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("value for {} is not a count: {}", field, raw))?;

        if metrics.insert(field.trim(), value).is_some() {
            return Err(format!("duplicate column: {}", field));
        }
    }

    Ok(metrics)
}
