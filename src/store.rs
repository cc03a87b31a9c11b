use indexmap::IndexMap;
use log::{error, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{Country, LeaderRecord};

pub type LeadersByCountry = IndexMap<Country, Vec<LeaderRecord>>;

/// Country → leaders, filled in as countries complete. Entries are only
/// ever added or replaced, never removed.
#[derive(Default)]
pub struct ResultSet {
    entries: Mutex<LeadersByCountry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(entries: LeadersByCountry) -> Self {
        ResultSet { entries: Mutex::new(entries) }
    }

    pub fn insert(&self, country: Country, leaders: Vec<LeaderRecord>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(country, leaders);
    }

    pub fn get(&self, country: &str) -> Option<Vec<LeaderRecord>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(country)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> LeadersByCountry {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn into_inner(self) -> LeadersByCountry {
        self.entries.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn to_json_string(&self) -> ScrapeResult<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ScrapeError::parse("serialized results", e))
    }

    fn write_json<W: Write>(&self, writer: W) -> ScrapeResult<()> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // 4-space indent, non-ASCII written as is
        let mut serializer = serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
        entries
            .serialize(&mut serializer)
            .map_err(|e| ScrapeError::parse("results for export", e))
    }

    pub fn export<P: AsRef<Path>>(&self, path: P) -> ScrapeResult<()> {
        let path = path.as_ref();
        let io_err = |source| ScrapeError::Io { path: path.display().to_string(), source };

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)?;

        info!("Data successfully saved to {}", path.display());
        Ok(())
    }

    pub fn export_or_log<P: AsRef<Path>>(&self, path: P) -> bool {
        match self.export(&path) {
            Ok(()) => true,
            Err(e) => {
                error!("An error occurred while writing to the file: {}", e);
                false
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ScrapeResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScrapeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let entries: LeadersByCountry = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ScrapeError::parse(format!("results file {}", path.display()), e))?;
        Ok(ResultSet::from_map(entries))
    }
}
