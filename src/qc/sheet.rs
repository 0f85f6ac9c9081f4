//! Sample sheets: tab-separated lists of samples to process in one batch.
//!
//! A sample sheet has a header row naming (at least) the `label`, `reads`, and
//! `alignments` columns, in any order, followed by one row per sample. Blank
//! lines and lines starting with `#` are ignored. Relative paths are resolved
//! against the directory holding the sheet.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use super::error::Error;
use super::error::Result;
use super::sample::is_valid_label;
use super::sample::Sample;

const LABEL_COLUMN: &str = "label";
const READS_COLUMN: &str = "reads";
const ALIGNMENTS_COLUMN: &str = "alignments";

/// Reads the samples listed in a sample sheet, in order.
pub fn read_sample_sheet<P>(src: P) -> Result<Vec<Sample>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    parse(&contents, base).map_err(|reason| Error::table_format(path, reason))
}

fn parse(contents: &str, base: &Path) -> std::result::Result<Vec<Sample>, String> {
    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'));

    let header: Vec<&str> = match lines.next() {
        Some((_, line)) => line.split('\t').map(str::trim).collect(),
        None => return Err(String::from("missing header row")),
    };

    let column = |name: &str| {
        header
            .iter()
            .position(|column| *column == name)
            .ok_or_else(|| format!("missing column: {}", name))
    };

    let label_idx = column(LABEL_COLUMN)?;
    let reads_idx = column(READS_COLUMN)?;
    let alignments_idx = column(ALIGNMENTS_COLUMN)?;

    let mut samples = Vec::new();
    let mut seen = HashSet::new();

    for (i, line) in lines {
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        if fields.len() != header.len() {
            return Err(format!(
                "line {} has {} columns, expected {}",
                i + 1,
                fields.len(),
                header.len()
            ));
        }

        let label = fields[label_idx];
        if !is_valid_label(label) {
            return Err(format!("line {} has an invalid label: {:?}", i + 1, label));
        }

        if !seen.insert(label) {
            return Err(format!("duplicate label on line {}: {}", i + 1, label));
        }

        samples.push(Sample::new(
            label,
            resolve(base, fields[reads_idx]),
            resolve(base, fields[alignments_idx]),
        ));
    }

    Ok(samples)
}

fn resolve(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_sheet() {
        let contents = "# batch one\n\
                        alignments\tlabel\treads\n\
                        \n\
                        s1.bam\ts1\ts1.fastq\n\
                        /data/s2.bam\ts2\t/data/s2.fq.gz\n";

        let samples = parse(contents, Path::new("/sheets")).unwrap();

        assert_eq!(
            samples,
            vec![
                Sample::new("s1", "/sheets/s1.fastq", "/sheets/s1.bam"),
                Sample::new("s2", "/data/s2.fq.gz", "/data/s2.bam"),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_sheets() {
        let base = Path::new("");

        assert!(parse("", base).is_err());
        assert!(parse("label\treads\n", base).is_err());
        assert!(parse("label\treads\talignments\ns1\ta.fq\n", base).is_err());
        assert!(parse(
            "label\treads\talignments\ns1\ta.fq\ta.bam\ns1\tb.fq\tb.bam\n",
            base
        )
        .is_err());
        assert!(parse("label\treads\talignments\na/b\ta.fq\ta.bam\n", base).is_err());
        assert!(parse("label\treads\talignments\n..\ta.fq\ta.bam\n", base).is_err());
        assert!(parse("label\treads\talignments\na\rb\ta.fq\ta.bam\n", base).is_err());
    }

    #[test]
    fn test_read_sample_sheet_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_sample_sheet(tmp.path().join("missing.tsv")),
            Err(Error::Io { .. })
        ));
    }
}
