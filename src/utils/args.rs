//! Utilities related to the parsing of arguments.

use std::fmt::Display;

use tracing::debug;

//===================//
// Number of Records //
//===================//

/// Utility enum to designate whether we are reviewing all records in the file
/// or just some of them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberOfRecords {
    /// Designates that we should review _all_ of the records in the file.
    #[default]
    All,

    /// Designates that we should review _some_ of the records in the file. The
    /// exact count of records is stored in the `usize`.
    Some(usize),
}

impl From<Option<usize>> for NumberOfRecords {
    fn from(num_records: Option<usize>) -> Self {
        match num_records {
            Some(n) => {
                debug!("Reading a maximum of {} records.", n);
                NumberOfRecords::Some(n)
            }
            None => {
                debug!("Reading all available records.");
                NumberOfRecords::All
            }
        }
    }
}

impl Display for NumberOfRecords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Some(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_of_records_from_option() {
        assert_eq!(NumberOfRecords::from(None), NumberOfRecords::All);
        assert_eq!(NumberOfRecords::from(Some(10)), NumberOfRecords::Some(10));
    }

    #[test]
    fn test_number_of_records_display() {
        assert_eq!(NumberOfRecords::All.to_string(), "all");
        assert_eq!(NumberOfRecords::Some(42).to_string(), "42");
    }
}
