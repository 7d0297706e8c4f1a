//! Result persistence
//!
//! Saves the data of each finished search in every requested format, next to
//! the configured output path (`{output}.json`, `{output}.csv`).

mod csv_file;
mod json_file;

pub use csv_file::{sanitize, CsvWriter};
pub use json_file::JsonWriter;

use crate::error::{Error, Result};
use crate::query::AggregatedResult;
use crate::search::RunOutcome;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One output format
pub trait ResultWriter: Send + Sync {
    /// Format name, also used as the file extension
    fn format(&self) -> &str;

    fn write(&self, data: &AggregatedResult, out: &mut dyn Write) -> Result<()>;
}

/// Result of saving one outcome in one format
#[derive(Debug)]
pub struct SaveResult {
    pub search_name: String,
    pub format: String,
    pub path: PathBuf,
    pub error: Option<Error>,
}

impl SaveResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Persists outcomes with the registered writers
pub struct ResultReporter {
    writers: HashMap<String, Box<dyn ResultWriter>>,
}

impl Default for ResultReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultReporter {
    /// Reporter with the JSON and CSV writers
    pub fn new() -> Self {
        let mut reporter = Self::empty();
        reporter.register(Box::new(JsonWriter));
        reporter.register(Box::new(CsvWriter));
        reporter
    }

    /// Reporter without any writer
    pub fn empty() -> Self {
        Self {
            writers: HashMap::new(),
        }
    }

    /// Register a writer, replacing any previous one for the same format
    pub fn register(&mut self, writer: Box<dyn ResultWriter>) {
        self.writers.insert(writer.format().to_string(), writer);
    }

    /// Save a successful outcome in each of its requested formats.
    /// Failed outcomes are never written, even when they carry partial rows.
    pub fn save(&self, outcome: &RunOutcome) -> Vec<SaveResult> {
        if !outcome.is_success() {
            debug!("Not saving failed search {}", outcome.search.name);
            return Vec::new();
        }

        outcome
            .search
            .output_types
            .iter()
            .map(|format| self.save_as(outcome, format))
            .collect()
    }

    /// Save an outcome in one format
    pub fn save_as(&self, outcome: &RunOutcome, format: &str) -> SaveResult {
        let path = PathBuf::from(format!("{}.{}", outcome.search.output, format));

        let error = match self.writers.get(format) {
            Some(writer) => Self::write_file(writer.as_ref(), &outcome.data, &path).err(),
            None => Some(Error::UnsupportedFormat(format.to_string())),
        };

        match error {
            None => debug!("Saved {} to {}", outcome.search.name, path.display()),
            Some(ref e) => warn!("Could not save {} as {}: {}", outcome.search.name, format, e),
        }

        SaveResult {
            search_name: outcome.search.name.clone(),
            format: format.to_string(),
            path,
            error,
        }
    }

    fn write_file(writer: &dyn ResultWriter, data: &AggregatedResult, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        writer.write(data, &mut out)?;
        out.flush()?;
        Ok(())
    }
}
