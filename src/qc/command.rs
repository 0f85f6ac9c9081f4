//! Functionality related to the `rnaqc` subcommands themselves.

use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::Args;
use num_format::Locale;
use num_format::ToFormattedString;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::aggregate::read_sample;
use super::aggregate::QcAggregator;
use super::aggregate::SampleMetrics;
use super::aggregate::DEFAULT_IDENTITY_COLUMN;
use super::config::MissingReferencePolicy;
use super::config::QcConfig;
use super::config::DEFAULT_RIBOSOMAL_REFERENCE;
use super::metrics;
use super::metrics::QcMetrics;
use super::reads;
use super::sample::is_valid_label;
use super::sample::Sample;
use super::sample::SampleQc;
use super::sample::WriteOutcome;
use super::sheet;
use crate::utils::args::NumberOfRecords;

/// File name of the combined report written by `rnaqc batch` by default.
pub const DEFAULT_REPORT_NAME: &str = "qc_summary.txt";

//========================//
// Command line arguments //
//========================//

/// Arguments shared by every subcommand that computes metrics.
#[derive(Args, Debug)]
pub struct QcConfigArgs {
    /// Name of the reference sequence holding the ribosomal RNA genes.
    #[arg(long, value_name = "STRING", default_value = DEFAULT_RIBOSOMAL_REFERENCE)]
    ribosomal_reference: String,

    /// Name of the mitochondrial reference sequence. When given, the number of
    /// records on it is reported as `num_mito`.
    #[arg(long, value_name = "STRING")]
    mitochondrial_reference: Option<String>,

    /// What to do when a reference sequence is missing from a BAM header.
    #[arg(long, value_enum, default_value_t = MissingReferencePolicy::Fail)]
    missing_reference: MissingReferencePolicy,
}

impl From<QcConfigArgs> for QcConfig {
    fn from(args: QcConfigArgs) -> Self {
        QcConfig {
            ribosomal_reference: args.ribosomal_reference,
            mitochondrial_reference: args.mitochondrial_reference,
            missing_reference: args.missing_reference,
        }
    }
}

/// Clap arguments for the `rnaqc sample` subcommand.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Label of the sample. Used to name the output files.
    #[arg(value_name = "LABEL")]
    label: String,

    /// Source FASTQ file (optionally gzipped).
    #[arg(value_name = "FASTQ")]
    reads: PathBuf,

    /// Source BAM file.
    #[arg(value_name = "BAM")]
    alignments: PathBuf,

    /// Directory to output files to. Defaults to current working directory.
    #[arg(short = 'o', long, value_name = "PATH")]
    output_directory: Option<PathBuf>,

    #[command(flatten)]
    config: QcConfigArgs,
}

/// Clap arguments for the `rnaqc aggregate` subcommand.
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Per-sample QC files, in the order their rows should appear.
    #[arg(value_name = "QC_FILE", required = true)]
    sources: Vec<PathBuf>,

    /// Destination of the combined report.
    #[arg(short = 'o', long, value_name = "PATH")]
    output: PathBuf,

    /// Name of the column holding the sample labels.
    #[arg(long, value_name = "STRING", default_value = DEFAULT_IDENTITY_COLUMN)]
    identity_column: String,
}

/// Clap arguments for the `rnaqc batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Tab-separated sample sheet with `label`, `reads`, and `alignments` columns.
    #[arg(value_name = "SAMPLE_SHEET")]
    sample_sheet: PathBuf,

    /// Directory to output files to. Defaults to current working directory.
    #[arg(short = 'o', long, value_name = "PATH")]
    output_directory: Option<PathBuf>,

    /// Destination of the combined report. Defaults to `qc_summary.txt` within
    /// the output directory.
    #[arg(short = 'r', long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Name of the column holding the sample labels.
    #[arg(long, value_name = "STRING", default_value = DEFAULT_IDENTITY_COLUMN)]
    identity_column: String,

    #[command(flatten)]
    config: QcConfigArgs,
}

/// Clap arguments for the `rnaqc profile` subcommand.
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Source FASTQ file (optionally gzipped).
    #[arg(value_name = "FASTQ")]
    src: PathBuf,

    /// Only examine the first n records in the file.
    #[arg(short, long, value_name = "USIZE")]
    num_records: Option<usize>,
}

//===========//
// Utilities //
//===========//

fn output_directory_or_cwd(output_directory: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match output_directory {
        Some(p) => Ok(p),
        None => std::env::current_dir().with_context(|| "resolving current working directory"),
    }
}

/// Renders `part` as a percentage of `whole`, or `N/A` when `whole` is zero.
fn percent_of(part: u64, whole: u64) -> String {
    match whole {
        0 => String::from("N/A"),
        _ => format!("{:.2}%", part as f64 / whole as f64 * 100.0),
    }
}

fn log_metrics(label: &str, metrics: &QcMetrics) {
    let total = metrics.get(metrics::NUM_READS).unwrap_or_default();

    info!("QC metrics for sample {}:", label);
    for (field, value) in metrics.iter() {
        if field == metrics::NUM_READS {
            info!("  [*] {}: {}", field, value.to_formatted_string(&Locale::en));
        } else {
            info!(
                "  [*] {}: {} ({} of reads)",
                field,
                value.to_formatted_string(&Locale::en),
                percent_of(value, total)
            );
        }
    }
}

/// Computes and writes one sample's metrics, or loads them back if a previous
/// run already wrote them.
fn process(
    sample: Sample,
    config: &QcConfig,
    output_directory: &Path,
) -> super::error::Result<SampleMetrics> {
    let existing = sample.qc_path(output_directory);

    if existing.is_file() {
        info!(
            "Reusing QC results for sample {} from {}.",
            sample.label(),
            existing.display()
        );
        let loaded = read_sample(&existing)?;
        return Ok(SampleMetrics::new(sample.label(), loaded.metrics));
    }

    let label = sample.label().to_string();
    let mut qc = SampleQc::new(sample, config.clone());
    log_metrics(&label, qc.compute()?);

    if let WriteOutcome::Written(path) = qc.write(output_directory)? {
        info!("Wrote QC metrics to {}.", path.display());
    }

    qc.results()
}

//=================//
// `rnaqc sample`  //
//=================//

/// Main function for the `rnaqc sample` subcommand.
pub fn sample(args: SampleArgs) -> anyhow::Result<()> {
    info!("Starting sample command...");
    debug!("Arguments: {:?}", args);

    if !is_valid_label(&args.label) {
        bail!(
            "invalid sample label {:?}: labels must be non-empty and must not contain \
             path separators, tabs, or line breaks",
            args.label
        );
    }

    let output_directory = output_directory_or_cwd(args.output_directory)?;
    let config = QcConfig::from(args.config);
    let sample = Sample::new(args.label, args.reads, args.alignments);
    let label = sample.label().to_string();

    process(sample, &config, &output_directory)
        .with_context(|| format!("running QC for sample {}", label))?;

    Ok(())
}

//=====================//
// `rnaqc aggregate`   //
//=====================//

/// Main function for the `rnaqc aggregate` subcommand.
pub fn aggregate(args: AggregateArgs) -> anyhow::Result<()> {
    info!("Starting aggregate command...");
    debug!("Arguments: {:?}", args);

    let samples = args
        .sources
        .iter()
        .map(|src| {
            read_sample(src).with_context(|| format!("reading QC file: {}", src.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let table = QcAggregator::new(args.identity_column)
        .aggregate(&samples)
        .with_context(|| "aggregating QC results")?;
    table
        .write(&args.output)
        .with_context(|| format!("writing report: {}", args.output.display()))?;

    Ok(())
}

//=================//
// `rnaqc batch`   //
//=================//

/// Main function for the `rnaqc batch` subcommand. A sample that fails is
/// reported and skipped; the remaining samples are still processed and
/// aggregated, and the command fails at the end.
pub fn batch(args: BatchArgs) -> anyhow::Result<()> {
    info!("Starting batch command...");
    debug!("Arguments: {:?}", args);

    let output_directory = output_directory_or_cwd(args.output_directory)?;
    let report = args
        .report
        .unwrap_or_else(|| output_directory.join(DEFAULT_REPORT_NAME));
    let config = QcConfig::from(args.config);

    let samples = sheet::read_sample_sheet(&args.sample_sheet).with_context(|| {
        format!("reading sample sheet: {}", args.sample_sheet.display())
    })?;
    let total = samples.len();
    info!("Processing {} samples.", total);

    let mut results = Vec::new();
    let mut failed = Vec::new();

    for sample in samples {
        let label = sample.label().to_string();

        match process(sample, &config, &output_directory) {
            Ok(metrics) => results.push(metrics),
            Err(e) => {
                error!("QC failed for sample {}: {}", label, e);
                failed.push(label);
            }
        }
    }

    if results.is_empty() {
        bail!("QC failed for all {} samples", total);
    }

    QcAggregator::new(args.identity_column)
        .aggregate(&results)
        .with_context(|| "aggregating QC results")?
        .write(&report)
        .with_context(|| format!("writing report: {}", report.display()))?;

    if !failed.is_empty() {
        bail!(
            "QC failed for {} of {} samples: {}",
            failed.len(),
            total,
            failed.join(", ")
        );
    }

    Ok(())
}

//=================//
// `rnaqc profile` //
//=================//

/// Main function for the `rnaqc profile` subcommand. Prints the profile as
/// JSON to stdout.
pub fn profile(args: ProfileArgs) -> anyhow::Result<()> {
    info!("Starting profile command...");

    let num_records = NumberOfRecords::from(args.num_records);
    let profile = reads::base_call_error_profile(&args.src, num_records)
        .with_context(|| format!("profiling base calls: {}", args.src.display()))?;

    let output = serde_json::to_string_pretty(&profile)?;
    println!("{}", output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::qc::fixtures::fastq_text;
    use crate::qc::fixtures::write_bam;

    fn config_args() -> QcConfigArgs {
        QcConfigArgs {
            ribosomal_reference: String::from(DEFAULT_RIBOSOMAL_REFERENCE),
            mitochondrial_reference: None,
            missing_reference: MissingReferencePolicy::Fail,
        }
    }

    #[test]
    fn test_batch_isolates_failing_samples() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        fs::write(dir.join("good.fastq"), fastq_text(&["ACGT", "ACGT"])).unwrap();
        write_bam(
            &dir.join("good.bam"),
            &["chr1", "chrRibo"],
            &[("r0", Some(0)), ("r1", Some(1))],
        );
        fs::write(dir.join("bad.fastq"), "garbage\n").unwrap();
        write_bam(&dir.join("bad.bam"), &["chrRibo"], &[("r0", Some(0))]);

        let sheet = dir.join("samples.tsv");
        fs::write(
            &sheet,
            "label\treads\talignments\n\
             bad\tbad.fastq\tbad.bam\n\
             good\tgood.fastq\tgood.bam\n",
        )
        .unwrap();

        let out = dir.join("qc");
        let result = batch(BatchArgs {
            sample_sheet: sheet,
            output_directory: Some(out.clone()),
            report: None,
            identity_column: String::from(DEFAULT_IDENTITY_COLUMN),
            config: config_args(),
        });

        assert!(result.is_err());
        assert!(!out.join("bad").join("bad.qc.txt").exists());
        assert_eq!(
            fs::read_to_string(out.join("good").join("good.qc.txt")).unwrap(),
            "num_reads\tnum_mapped\tnum_ribo\n2\t2\t1\n"
        );
        assert_eq!(
            fs::read_to_string(out.join(DEFAULT_REPORT_NAME)).unwrap(),
            "sample\tnum_reads\tnum_mapped\tnum_ribo\ngood\t2\t2\t1\n"
        );
    }

    #[test]
    fn test_sample_rejects_label_with_tab() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let out = dir.join("qc");

        let fastq = dir.join("s1.fastq");
        fs::write(&fastq, fastq_text(&["ACGT"])).unwrap();
        let bam = dir.join("s1.bam");
        write_bam(&bam, &["chrRibo"], &[("r0", Some(0))]);

        let result = sample(SampleArgs {
            label: String::from("a\tb"),
            reads: fastq,
            alignments: bam,
            output_directory: Some(out.clone()),
            config: config_args(),
        });

        assert!(result.is_err());
        assert!(!out.exists());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(1, 4), "25.00%");
        assert_eq!(percent_of(2, 3), "66.67%");
        assert_eq!(percent_of(5, 0), "N/A");
    }

    #[test]
    fn test_sample_then_aggregate() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let out = dir.join("qc");

        for (label, reads) in [("s1", 3), ("s2", 1)] {
            let fastq = dir.join(format!("{}.fastq", label));
            fs::write(&fastq, fastq_text(&vec!["ACGT"; reads])).unwrap();
            let bam = dir.join(format!("{}.bam", label));
            write_bam(&bam, &["chrRibo"], &[("r0", Some(0)), ("r0", Some(0))]);

            sample(SampleArgs {
                label: label.to_string(),
                reads: fastq,
                alignments: bam,
                output_directory: Some(out.clone()),
                config: config_args(),
            })
            .unwrap();
        }

        let report = dir.join("report.tsv");
        aggregate(AggregateArgs {
            sources: vec![
                out.join("s2").join("s2.qc.txt"),
                out.join("s1").join("s1.qc.txt"),
            ],
            output: report.clone(),
            identity_column: String::from(DEFAULT_IDENTITY_COLUMN),
        })
        .unwrap();

        assert_eq!(
            fs::read_to_string(report).unwrap(),
            "sample\tnum_reads\tnum_mapped\tnum_ribo\n\
             s2\t1\t1\t2\n\
             s1\t3\t1\t2\n"
        );
    }
}
