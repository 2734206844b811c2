use crate::board::CELLS;
use crate::error::{GameError, Result};
use chrono::offset::Local;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{prelude::*, BufReader, BufWriter, ErrorKind};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub type Scores = [i64; CELLS];

const FIELDS: usize = CELLS + 1;

/// Cumulative per-cell preference scores keyed by board state.
///
/// Scores are unbounded: every finished episode adds its delta on top of whatever
/// is already there.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ValueTable {
    values: HashMap<String, Scores>,
}

impl Deref for ValueTable {
    type Target = HashMap<String, Scores>;
    fn deref(&self) -> &<Self as Deref>::Target {
        &self.values
    }
}

impl ValueTable {
    pub fn new() -> Self {
        ValueTable {
            values: HashMap::with_capacity(6000),
        }
    }

    /// Scores for `key`, all zero when the state has never been credited.
    pub fn get(&self, key: &str) -> Scores {
        self.values.get(key).copied().unwrap_or_default()
    }

    pub fn apply_delta(&mut self, key: &str, index: usize, delta: i64) -> Result<()> {
        if index >= CELLS {
            return Err(GameError::IndexOutOfRange(index));
        }
        check_key(key)?;
        let scores = self.values.entry(key.to_owned()).or_insert([0; CELLS]);
        scores[index] += delta;
        Ok(())
    }

    /// Reads `key,s0,...,s8` rows. Any bad row rejects the whole table.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut table = ValueTable::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = number + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.trim_end().split(',').collect();
            if fields.len() != FIELDS {
                return Err(GameError::MalformedStoreRecord {
                    line: line_number,
                    fields: fields.len(),
                });
            }
            let key = fields[0];
            if check_key(key).is_err() {
                return Err(GameError::InvalidStoreKey {
                    line: line_number,
                    key: key.to_owned(),
                });
            }
            if table.values.contains_key(key) {
                return Err(GameError::DuplicateStoreKey {
                    line: line_number,
                    key: key.to_owned(),
                });
            }
            let mut scores = [0; CELLS];
            for (score, field) in scores.iter_mut().zip(&fields[1..]) {
                *score = field.trim().parse().map_err(|_| GameError::InvalidScore {
                    line: line_number,
                    value: field.to_string(),
                })?;
            }
            table.values.insert(key.to_owned(), scores);
        }
        Ok(table)
    }

    /// Writes every row, sorted by key so repeated saves are byte-identical.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        for (key, scores) in self.values.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            check_key(key)?;
            writeln!(writer, "{},{}", key, scores.iter().join(","))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads the table from `path`. A missing file gives an empty table.
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => {
                let table = Self::from_reader(BufReader::new(file))?;
                log::info!("Loaded {} states from {}", table.len(), path.display());
                Ok(table)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::info!("No value table at {}, starting empty", path.display());
                Ok(ValueTable::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Replaces `path` with the full table.
    ///
    /// Rows go to a temporary file next to `path` that is renamed over it once
    /// written, so a failed save leaves the previous store untouched.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.keys().try_for_each(|key| check_key(key))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir)?;
        self.to_writer(BufWriter::new(staged.as_file_mut()))?;
        staged.persist(path).map_err(|err| err.error)?;
        log::info!("Saved {} states to {}", self.len(), path.display());
        Ok(())
    }

    /// Writes a dated JSON snapshot into `dir` and returns its path.
    pub fn archive(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let today = Local::now().date_naive();
        let filename = format!("value-table-{today}.json");
        let path: PathBuf = [dir, Path::new(&filename)].iter().collect();
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        log::info!("Archived value table to {}", path.display());
        Ok(path)
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(',') {
        return Err(GameError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
