//! Computing and persisting the quality control metrics of one sample.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::aggregate::SampleMetrics;
use super::alignments;
use super::config::MissingReferencePolicy;
use super::config::QcConfig;
use super::error::Error;
use super::error::Result;
use super::metrics;
use super::metrics::QcMetrics;
use super::reads;
use super::reads::BaseCallProfile;
use crate::utils::args::NumberOfRecords;
use crate::utils::output::write_atomically;

/// File name suffix of a per-sample QC file.
pub const QC_FILE_SUFFIX: &str = ".qc.txt";

/// Characters that may not appear in a sample label. The label names a
/// directory and fills a field of a tab-separated row.
const FORBIDDEN_LABEL_CHARS: [char; 5] = ['/', '\\', '\t', '\r', '\n'];

/// Whether `label` can name a sample: it must be non-empty, must not be `.`
/// or `..`, and must not contain a path separator, a tab, or a line break.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label != "."
        && label != ".."
        && !label.contains(FORBIDDEN_LABEL_CHARS)
}

/// A sample: an opaque label and the paths to its read and alignment files.
/// The files are only ever read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    label: String,
    reads: PathBuf,
    alignments: PathBuf,
}

impl Sample {
    /// Creates a new [`Sample`].
    pub fn new<L, R, A>(label: L, reads: R, alignments: A) -> Self
    where
        L: Into<String>,
        R: Into<PathBuf>,
        A: Into<PathBuf>,
    {
        Sample {
            label: label.into(),
            reads: reads.into(),
            alignments: alignments.into(),
        }
    }

    /// The label of the sample.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The path to the read (FASTQ) file.
    pub fn reads(&self) -> &Path {
        &self.reads
    }

    /// The path to the alignment (BAM) file.
    pub fn alignments(&self) -> &Path {
        &self.alignments
    }

    /// The canonical location of this sample's QC file below an output
    /// directory: `<output_directory>/<label>/<label>.qc.txt`.
    pub fn qc_path<P>(&self, output_directory: P) -> PathBuf
    where
        P: AsRef<Path>,
    {
        output_directory
            .as_ref()
            .join(&self.label)
            .join(format!("{}{}", self.label, QC_FILE_SUFFIX))
    }
}

/// What [`SampleQc::write`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The QC file was written to this path.
    Written(PathBuf),

    /// A QC file already existed at this path and was left untouched.
    Skipped(PathBuf),
}

impl WriteOutcome {
    /// The path of the QC file, whether or not it was written.
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::Skipped(path) => path,
        }
    }
}

/// Quality control for one sample.
#[derive(Debug)]
pub struct SampleQc {
    sample: Sample,
    config: QcConfig,
    metrics: Option<QcMetrics>,
}

impl SampleQc {
    /// Creates a new [`SampleQc`]. No files are touched until
    /// [`compute`](SampleQc::compute) is called.
    pub fn new(sample: Sample, config: QcConfig) -> Self {
        SampleQc {
            sample,
            config,
            metrics: None,
        }
    }

    /// The sample under examination.
    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    /// The computed metrics, if [`compute`](SampleQc::compute) has succeeded.
    pub fn metrics(&self) -> Option<&QcMetrics> {
        self.metrics.as_ref()
    }

    /// Number of records in the read file.
    pub fn count_reads(&self) -> Result<u64> {
        reads::count_reads(self.sample.reads())
    }

    /// Number of distinct read names in the alignment file.
    pub fn count_mapped(&self) -> Result<u64> {
        alignments::count_mapped(self.sample.alignments())
    }

    /// Number of alignment records on the reference sequence `name`.
    pub fn count_region_reads(&self, name: &str) -> Result<u64> {
        alignments::count_region_reads(self.sample.alignments(), name)
    }

    /// Per-position fraction of unresolvable base calls in the read file.
    pub fn base_call_error_profile(&self, max_records: NumberOfRecords) -> Result<BaseCallProfile> {
        reads::base_call_error_profile(self.sample.reads(), max_records)
    }

    /// Counts records on a configured reference sequence, applying the
    /// missing-reference policy.
    fn count_configured_region(&self, name: &str) -> Result<u64> {
        match self.count_region_reads(name) {
            Err(Error::ReferenceNotFound { path, name })
                if self.config.missing_reference == MissingReferencePolicy::Zero =>
            {
                warn!(
                    "Reference sequence \"{}\" not found in {}, recording zero records for sample {}.",
                    name,
                    path.display(),
                    self.sample.label()
                );
                Ok(0)
            }
            result => result,
        }
    }

    /// Computes all metrics for the sample: the number of reads, the number of
    /// mapped reads, the number of records on the ribosomal reference sequence
    /// and, if configured, on the mitochondrial one.
    ///
    /// Nothing is stored unless every count succeeds; on failure, previously
    /// computed metrics are kept as they were.
    pub fn compute(&mut self) -> Result<&QcMetrics> {
        info!("Computing QC metrics for sample {}.", self.sample.label());

        let mut computed = QcMetrics::new();

        computed.insert(metrics::NUM_READS, self.count_reads()?);
        computed.insert(metrics::NUM_MAPPED, self.count_mapped()?);
        computed.insert(
            metrics::NUM_RIBO,
            self.count_configured_region(&self.config.ribosomal_reference)?,
        );

        if let Some(name) = &self.config.mitochondrial_reference {
            computed.insert(metrics::NUM_MITO, self.count_configured_region(name)?);
        }

        for (field, value) in computed.iter() {
            debug!("  [*] {}: {}", field, value);
        }

        let metrics: &QcMetrics = self.metrics.insert(computed);
        Ok(metrics)
    }

    /// Writes the computed metrics to the sample's canonical QC file below
    /// `output_directory`.
    ///
    /// If that file already exists, nothing is written and
    /// [`WriteOutcome::Skipped`] is returned so that interrupted batches can be
    /// resumed. Files are written atomically, so an existing file is always a
    /// complete one.
    pub fn write<P>(&self, output_directory: P) -> Result<WriteOutcome>
    where
        P: AsRef<Path>,
    {
        let path = self.sample.qc_path(output_directory);

        if path.is_file() {
            info!(
                "Skipping sample {}, since {} already exists.",
                self.sample.label(),
                path.display()
            );
            return Ok(WriteOutcome::Skipped(path));
        }

        let metrics = self.metrics.as_ref().ok_or_else(|| Error::NotComputed {
            label: self.sample.label().to_string(),
        })?;

        write_atomically(&path, |writer| metrics.write_tsv(writer))
            .map_err(|e| Error::io(&path, e))?;

        debug!("Wrote QC metrics to {}.", path.display());
        Ok(WriteOutcome::Written(path))
    }

    /// The label and metrics of the sample, ready for aggregation.
    pub fn results(&self) -> Result<SampleMetrics> {
        match &self.metrics {
            Some(metrics) => Ok(SampleMetrics::new(self.sample.label(), metrics.clone())),
            None => Err(Error::NotComputed {
                label: self.sample.label().to_string(),
            }),
        }
    }
}
