//! Progress reporting for long passes over a file.

use std::path::Path;

use num_format::Locale;
use num_format::ToFormattedString;
use tracing::info;

use crate::utils::args::NumberOfRecords;

/// How often, in records, a pass reports its progress.
const REPORT_EVERY: usize = 1_000_000;

/// Counts the records read by one pass over a file and periodically logs how
/// far along the pass is.
#[derive(Debug)]
pub struct RecordCounter {
    /// What is being read, e.g. `reads.fastq.gz`.
    source: String,

    count: usize,
}

impl RecordCounter {
    /// Starts a count of the records read from `src`. Only the file name is
    /// kept for logging.
    pub fn for_file(src: &Path) -> Self {
        let source = src
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| src.display().to_string());

        RecordCounter { source, count: 0 }
    }

    /// The number of records counted so far.
    pub fn get(&self) -> usize {
        self.count
    }

    /// Counts one more record.
    pub fn inc(&mut self) {
        self.count += 1;

        if self.count % REPORT_EVERY == 0 {
            info!(
                "  [*] {}: {} records read.",
                self.source,
                self.count.to_formatted_string(&Locale::en),
            );
        }
    }

    /// Whether the pass has read as many records as `limit` allows.
    pub fn reached(&self, limit: NumberOfRecords) -> bool {
        match limit {
            NumberOfRecords::Some(n) => self.count >= n,
            NumberOfRecords::All => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_keeps_file_name_only() {
        let counter = RecordCounter::for_file(Path::new("/data/run1/s1.fastq.gz"));
        assert_eq!(counter.source, "s1.fastq.gz");
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_counter_reaches_limit() {
        let mut counter = RecordCounter::for_file(Path::new("s1.bam"));
        let limit = NumberOfRecords::Some(3);

        for _ in 0..3 {
            assert!(!counter.reached(limit));
            counter.inc();
        }

        assert_eq!(counter.get(), 3);
        assert!(counter.reached(limit));
        assert!(!counter.reached(NumberOfRecords::All));
    }
}
