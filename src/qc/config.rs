//! Configuration for computing quality control metrics.

/// The reference sequence holding ribosomal RNA genes by default.
pub const DEFAULT_RIBOSOMAL_REFERENCE: &str = "chrRibo";

/// What to do when a reference sequence requested for a region count is not
/// present in the alignment file's header. Some genomes legitimately lack a
/// ribosomal contig.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum MissingReferencePolicy {
    /// Fail the sample's computation.
    #[default]
    Fail,

    /// Log a warning and record a count of zero.
    Zero,
}

/// Settings that drive [`SampleQc::compute`](super::sample::SampleQc::compute).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QcConfig {
    /// Name of the reference sequence whose records are counted as `num_ribo`.
    pub ribosomal_reference: String,

    /// Name of the reference sequence whose records are counted as `num_mito`.
    /// The `num_mito` field is only computed when this is set.
    pub mitochondrial_reference: Option<String>,

    /// Policy applied when a configured reference sequence is missing.
    pub missing_reference: MissingReferencePolicy,
}

impl Default for QcConfig {
    fn default() -> Self {
        QcConfig {
            ribosomal_reference: String::from(DEFAULT_RIBOSOMAL_REFERENCE),
            mitochondrial_reference: None,
            missing_reference: MissingReferencePolicy::Fail,
        }
    }
}
