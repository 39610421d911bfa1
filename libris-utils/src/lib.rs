//! Batch processing around a [libris::Catalog]
//!
//! A batch run loads a books file of `OPERATION;{json}` lines into a fresh catalog, then answers a
//! search file of `LABEL;{json}` lines and writes one report line per found book, followed by the
//! summary counters of the size classification.
use libris::{Catalog, Classifier, Tally};
use std::{
    fs::{File, OpenOptions},
    io::BufReader,
    path::PathBuf,
};

pub mod dump;
pub mod error;
pub mod ingest;
pub mod report;

pub use error::{Error, Result};
pub use ingest::IngestStats;

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

/// Input and output locations of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// file with `INSERT`, `PATCH` and `DELETE` lines
    pub books: PathBuf,
    /// file with one name query per line
    pub search: PathBuf,
    /// report file
    pub output: PathBuf,
    /// start the report from scratch instead of appending to it
    pub truncate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            books: "Ejemplo_lab01_books.csv".into(),
            search: "Ejemplo_lab01_search.csv".into(),
            output: "output.txt".into(),
            truncate: false,
        }
    }
}

impl Config {
    pub fn open_output(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!self.truncate)
            .truncate(self.truncate)
            .open(&self.output)?;
        Ok(file)
    }

    /// Loads the books file into a new catalog
    pub fn load_catalog(&self) -> Result<(Catalog, IngestStats)> {
        let mut catalog = Catalog::new();
        let stats = ingest::load(BufReader::new(File::open(&self.books)?), &mut catalog)?;
        tracing::info!(
            "loaded {} books from {} ({:?})",
            catalog.len(),
            self.books.display(),
            stats
        );
        Ok((catalog, stats))
    }

    /// Runs the whole batch and returns the counters that were written
    pub fn run(&self) -> Result<Tally> {
        let (catalog, _) = self.load_catalog()?;
        let search = BufReader::new(File::open(&self.search)?);
        let mut classifier = Classifier::new();
        let mut output = std::io::BufWriter::new(self.open_output()?);
        let tally = report::run_queries(search, &catalog, &mut classifier, &mut output)?;
        tracing::info!("wrote report to {}", self.output.display());
        Ok(tally)
    }
}
