//! Loading `OPERATION;{json}` lines into a catalog
use crate::error::{Error, Result};
use libris::{Book, BookPatch, Catalog};
use serde::Deserialize;
use std::{fmt, io::BufRead, str::FromStr};
use tracing::*;

/// One line of a books file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert(Book),
    Patch { isbn: String, patch: BookPatch },
    Delete { isbn: String },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert(book) => write!(f, "INSERT {}", book.isbn),
            Operation::Patch { isbn, .. } => write!(f, "PATCH {}", isbn),
            Operation::Delete { isbn } => write!(f, "DELETE {}", isbn),
        }
    }
}

#[derive(Deserialize)]
struct PatchLine {
    isbn: String,
    #[serde(flatten)]
    patch: BookPatch,
}

#[derive(Deserialize)]
struct DeleteLine {
    isbn: String,
}

/// Splits a line into its keyword and json payload
pub(crate) fn split_line(line: &str) -> Result<(&str, &str)> {
    line.split_once(';')
        .map(|(keyword, json)| (keyword.trim(), json.trim()))
        .ok_or_else(|| Error::MissingSeparator(line.to_owned()))
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let (keyword, json) = split_line(line)?;
        Ok(match keyword {
            "INSERT" => Operation::Insert(serde_json::from_str(json)?),
            "PATCH" => {
                let PatchLine { isbn, patch } = serde_json::from_str(json)?;
                Operation::Patch { isbn, patch }
            }
            "DELETE" => {
                let DeleteLine { isbn } = serde_json::from_str(json)?;
                Operation::Delete { isbn }
            }
            other => return Err(Error::UnknownOperation(other.to_owned())),
        })
    }
}

impl Operation {
    /// Applies the operation, returning false if it had no effect
    pub fn apply(self, catalog: &mut Catalog) -> bool {
        match self {
            Operation::Insert(book) => catalog.insert(book),
            Operation::Patch { isbn, patch } => catalog.update(&isbn, &patch),
            Operation::Delete { isbn } => catalog.remove(&isbn).is_some(),
        }
    }
}

/// Counters for one loaded file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// operations that changed the catalog
    pub applied: u64,
    /// well formed operations without effect, such as duplicate inserts
    pub ignored: u64,
    /// malformed lines
    pub skipped: u64,
}

/// Applies every line of `reader` to `catalog`.
///
/// Malformed lines are logged and skipped. Only a failure to read aborts the load.
pub fn load(reader: impl BufRead, catalog: &mut Catalog) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    for (nr, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Operation>() {
            Ok(op) => {
                trace!("line {}: {}", nr + 1, op);
                if op.apply(catalog) {
                    stats.applied += 1;
                } else {
                    stats.ignored += 1;
                }
            }
            Err(cause) => {
                warn!("skipping line {}: {}", nr + 1, cause);
                stats.skipped += 1;
            }
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    #[test]
    fn parse_operations() {
        let op: Operation =
            r#"INSERT;{"isbn":"1","name":"Dune","author":"Herbert","price":"9","quantity":"2"}"#
                .parse()
                .unwrap();
        assert_eq!(
            op,
            Operation::Insert(
                Book::new("1", "Dune")
                    .with_author("Herbert")
                    .with_price("9")
                    .with_quantity("2")
            )
        );
        let op: Operation = r#"PATCH;{"isbn":"1","price":"12"}"#.parse().unwrap();
        assert_eq!(
            op,
            Operation::Patch {
                isbn: "1".into(),
                patch: BookPatch {
                    price: Some("12".into()),
                    ..Default::default()
                }
            }
        );
        let op: Operation = r#" DELETE ; {"isbn":"1"} "#.parse().unwrap();
        assert_eq!(op.to_string(), "DELETE 1");
    }

    #[test]
    fn malformed_lines() {
        assert!(matches!(
            "INSERT".parse::<Operation>(),
            Err(Error::MissingSeparator(_))
        ));
        assert!(matches!(
            r#"insert;{"isbn":"1","name":"x"}"#.parse::<Operation>(),
            Err(Error::UnknownOperation(k)) if k == "insert"
        ));
        assert!(matches!(
            "INSERT;{not json".parse::<Operation>(),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            r#"DELETE;{"name":"x"}"#.parse::<Operation>(),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn load_counts_lines() {
        let input = r#"INSERT;{"isbn":"1","name":"Dune"}
INSERT;{"isbn":"2","name":"Emma"}
INSERT;{"isbn":"3","name":"Dune"}

garbage
PATCH;{"isbn":"2","name":"Persuasion"}
DELETE;{"isbn":"1"}
DELETE;{"isbn":"1"}
"#;
        let mut catalog = Catalog::new();
        let stats = load(input.as_bytes(), &mut catalog).unwrap();
        assert_eq!(
            stats,
            IngestStats {
                applied: 4,
                ignored: 2,
                skipped: 1,
            }
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.find_by_name("Persuasion").map(|b| b.isbn.as_str()),
            Some("2")
        );
    }

    /// every non blank line is counted exactly once, whatever it contains
    #[quickcheck]
    fn every_line_is_counted(lines: Vec<String>) -> bool {
        let lines = lines
            .into_iter()
            .map(|line| line.replace('\n', " ").replace('\r', " "))
            .collect::<Vec<_>>();
        let expected = lines.iter().filter(|l| !l.trim().is_empty()).count() as u64;
        let mut catalog = Catalog::new();
        let stats = load(lines.join("\n").as_bytes(), &mut catalog).unwrap();
        stats.applied + stats.ignored + stats.skipped == expected
    }

    /// well formed scripts are never skipped and leave a consistent catalog
    #[quickcheck]
    fn scripts_load_cleanly(script: Vec<(bool, u8, u8)>) -> TestResult {
        if script.is_empty() {
            return TestResult::discard();
        }
        let text = script
            .iter()
            .map(|(insert, isbn, name)| {
                if *insert {
                    format!(r#"INSERT;{{"isbn":"{}","name":"n{}"}}"#, isbn % 32, name % 32)
                } else {
                    format!(r#"DELETE;{{"isbn":"{}"}}"#, isbn % 32)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let mut catalog = Catalog::new();
        let stats = load(text.as_bytes(), &mut catalog).unwrap();
        let msgs = catalog.check_invariants();
        if !msgs.is_empty() {
            return TestResult::error(msgs.join(","));
        }
        TestResult::from_bool(
            stats.skipped == 0 && stats.applied + stats.ignored == script.len() as u64,
        )
    }
}
