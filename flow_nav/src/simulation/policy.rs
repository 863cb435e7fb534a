//! Precomputed action-value table and greedy action selection.
//!
//! The table is read from a text file with one record per line:
//!
//! ```text
//! <integer key>: <value> <value> ... <value>
//! ```
//!
//! Values accept either `.` or `,` as the decimal separator. Records that do
//! not split into exactly a key and a value list, or whose key is not an
//! integer, are skipped. Individual values that fail to parse are dropped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::simulation::state::{Fingerprint, StateKey};

/// Read-only mapping from state fingerprint to per-action values.
#[derive(Clone, Debug, Default)]
pub struct PolicyTable {
    rows: HashMap<Fingerprint, Vec<f64>>,
    skipped: usize,
}

impl PolicyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a whole table from text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            table.ingest(line);
        }
        table
    }

    /// Parses a table line by line from a reader.
    ///
    /// Bytes that are not valid UTF-8 are replaced, so a damaged line only
    /// loses the values it damaged.
    ///
    /// # Errors
    /// Propagates read failures. Malformed records are skipped, not errors.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut table = Self::new();
        for line in reader.split(b'\n') {
            let line = line?;
            let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
            table.ingest(&String::from_utf8_lossy(line));
        }
        Ok(table)
    }

    /// Loads the table from a file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be opened or read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            states = table.len(),
            skipped = table.skipped,
            "policy table loaded"
        );
        Ok(table)
    }

    fn ingest(&mut self, line: &str) {
        match parse_record(line) {
            Some((key, values)) => {
                self.rows.insert(key, values);
            }
            None => {
                if !line.trim().is_empty() {
                    debug!(line, "skipping malformed policy record");
                }
                self.skipped += 1;
            }
        }
    }

    /// Inserts or replaces a row.
    pub fn insert(&mut self, key: Fingerprint, values: Vec<f64>) {
        self.rows.insert(key, values);
    }

    /// Inserts a row keyed by the fingerprint of a structured state key.
    pub fn insert_state(&mut self, key: &StateKey, values: Vec<f64>) {
        self.insert(key.fingerprint(), values);
    }

    /// Row for `key`, or `None` for a state the table has never seen.
    #[must_use]
    pub fn lookup(&self, key: Fingerprint) -> Option<&[f64]> {
        self.rows.get(&key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of input lines that did not yield a record.
    #[must_use]
    pub const fn skipped_records(&self) -> usize {
        self.skipped
    }
}

/// Parses one `<key>:<values>` record.
#[must_use]
pub fn parse_record(line: &str) -> Option<(Fingerprint, Vec<f64>)> {
    let parts: Vec<&str> = line.split(':').collect();
    let [key, values] = parts.as_slice() else {
        return None;
    };
    let key = key.trim().parse::<i64>().ok()?;
    let values = values
        .split_whitespace()
        .filter_map(parse_value)
        .collect();
    Some((Fingerprint(key), values))
}

/// Parses a number with either `.` or `,` as decimal separator.
fn parse_value(token: &str) -> Option<f64> {
    token
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

/// Result of a greedy lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Index into the action catalog
    pub index: usize,
    /// Whether the state was present in the table
    pub hit: bool,
}

/// Greedy selection over a policy table.
///
/// An unseen state selects action 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionSelector;

impl ActionSelector {
    #[must_use]
    pub fn select(self, table: &PolicyTable, key: Fingerprint) -> Selection {
        match table.lookup(key) {
            Some(values) => Selection {
                index: arg_max(values),
                hit: true,
            },
            None => Selection { index: 0, hit: false },
        }
    }
}

/// Index of the first maximum. Empty slices yield 0.
#[must_use]
pub fn arg_max(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_mixed_separators() {
        let (key, values) = parse_record("5: 0.1 0,2 0.3").unwrap();
        assert_eq!(key, Fingerprint(5));
        assert_eq!(values, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_parse_record_without_space() {
        let (key, values) = parse_record("-17:1 2").unwrap();
        assert_eq!(key, Fingerprint(-17));
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_parse_record_rejects_malformed() {
        assert!(parse_record("bad line").is_none());
        assert!(parse_record("x: 1 2").is_none());
        assert!(parse_record("1: 2: 3").is_none());
        assert!(parse_record("").is_none());
    }

    #[test]
    fn test_bad_tokens_dropped() {
        let (_, values) = parse_record("3: 1.5 oops 2,5 NaN").unwrap();
        assert_eq!(values, vec![1.5, 2.5]);
    }

    #[test]
    fn test_arg_max_first_of_ties() {
        assert_eq!(arg_max(&[0.1, 0.9, 0.9, 0.0]), 1);
        assert_eq!(arg_max(&[]), 0);
        assert_eq!(arg_max(&[-3.0, -1.0, -2.0]), 1);
        assert_eq!(arg_max(&[0.5, 0.5]), 0);
    }

    #[test]
    fn test_skipped_records_counted() {
        let table = PolicyTable::parse("1: 0.5\nbad line\n2: 0.1 0.2\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped_records(), 1);
    }
}
