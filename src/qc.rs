//! Per-sample quality control metrics and their aggregation across samples.
//!
//! A [`SampleQc`](sample::SampleQc) computes the metrics of one sample from its
//! read (FASTQ) and alignment (BAM) files and writes them to a per-sample file.
//! A [`QcAggregator`](aggregate::QcAggregator) combines the metrics of many
//! samples into one table with a row per sample.

pub mod aggregate;
pub mod alignments;
pub mod command;
pub mod config;
pub mod error;
pub mod metrics;
pub mod reads;
pub mod sample;
pub mod sheet;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::aggregate::CombinedTable;
pub use self::aggregate::QcAggregator;
pub use self::aggregate::SampleMetrics;
pub use self::config::QcConfig;
pub use self::error::Error;
pub use self::metrics::QcMetrics;
pub use self::sample::Sample;
pub use self::sample::SampleQc;
pub use self::sample::WriteOutcome;
