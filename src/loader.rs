//! Schema and record loading from the local filesystem.
//!
//! The pipeline itself only consumes parsed `serde_json::Value`s; these
//! sources are the collaborators that produce them. Any I/O or parse
//! failure is fatal and names the offending file.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, VerisError};

pub trait SchemaSource {
    fn load_schema(&self) -> Result<Value>;
}

pub trait RecordSource {
    fn load_records(&self) -> Result<Vec<Value>>;
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| VerisError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| VerisError::json(path, e))
}

/// A schema document on disk.
#[derive(Debug, Clone)]
pub struct LocalSchema {
    path: PathBuf,
}

impl LocalSchema {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaSource for LocalSchema {
    fn load_schema(&self) -> Result<Value> {
        let schema = read_json(&self.path)?;
        debug!(path = %self.path.display(), "loaded schema");
        Ok(schema)
    }
}

/// Every `*json` file directly inside a directory, one record per file.
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    dir: PathBuf,
}

impl JsonDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Matching files, sorted so row order is stable across runs.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.dir.join("*json");
        let pattern = pattern.to_string_lossy();
        let mut files = Vec::new();
        for entry in glob::glob(&pattern)? {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                VerisError::io(path, e.into())
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl RecordSource for JsonDirectory {
    fn load_records(&self) -> Result<Vec<Value>> {
        let files = self.files()?;
        // Parsed in parallel; collect keeps file order.
        let records = files
            .par_iter()
            .map(|path| read_json(path))
            .collect::<Result<Vec<_>>>()?;
        info!(dir = %self.dir.display(), files = records.len(), "loaded records");
        Ok(records)
    }
}

/// Records already in memory.
impl RecordSource for Vec<Value> {
    fn load_records(&self) -> Result<Vec<Value>> {
        Ok(self.clone())
    }
}
