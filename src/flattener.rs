//! Record flattening: nested incident JSON -> one row of dot-joined paths.

use ahash::AHashMap;
use rayon::prelude::*;
use serde_json::Value;
use tracing::debug;

use crate::cell::Cell;

/// One incident record with its nested objects flattened into dot-joined paths.
/// Lists, scalars and empty objects are kept as leaf cells.
#[derive(Debug, Clone, Default)]
pub struct FlatRecord {
    fields: Vec<(String, Cell)>,
}

impl FlatRecord {
    pub fn flatten(record: &Value) -> Self {
        let mut fields = Vec::new();
        match record {
            Value::Object(_) => flatten_into("", record, &mut fields),
            other => debug!(kind = json_kind(other), "record is not an object, producing an empty row"),
        }
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, Cell)] {
        &self.fields
    }

    pub fn get(&self, path: &str) -> Option<&Cell> {
        self.fields.iter().find(|(p, _)| p == path).map(|(_, c)| c)
    }
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, Cell)>) {
    match value {
        Value::Object(obj) if !obj.is_empty() => {
            for (key, child) in obj {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&path, child, out);
            }
        }
        // Empty objects at the root carry nothing.
        Value::Object(_) if prefix.is_empty() => {}
        leaf => out.push((prefix.to_string(), Cell::from_value(leaf))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One raw column of the flat table.
#[derive(Debug, Clone)]
pub struct FlatColumn {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// One row per record, one column per path seen in any record. Columns are in
/// first-seen order, rows in input order; a record lacking a path gets
/// [`Cell::Absent`].
#[derive(Debug, Clone, Default)]
pub struct FlatTable {
    columns: Vec<FlatColumn>,
    rows: usize,
}

impl FlatTable {
    /// Flattens records in parallel; row order follows `records`.
    pub fn from_records(records: &[Value]) -> Self {
        let flat: Vec<FlatRecord> = records.par_iter().map(FlatRecord::flatten).collect();
        Self::from_flat_records(flat)
    }

    pub fn from_flat_records(records: Vec<FlatRecord>) -> Self {
        let rows = records.len();
        let mut positions: AHashMap<String, usize> = AHashMap::new();
        let mut columns: Vec<FlatColumn> = Vec::new();

        for (row, record) in records.into_iter().enumerate() {
            for (path, cell) in record.fields {
                let pos = match positions.get(&path) {
                    Some(&pos) => pos,
                    None => {
                        positions.insert(path.clone(), columns.len());
                        columns.push(FlatColumn {
                            name: path,
                            cells: vec![Cell::Absent; rows],
                        });
                        columns.len() - 1
                    }
                };
                columns[pos].cells[row] = cell;
            }
        }

        Self { columns, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[FlatColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.cells.as_slice())
    }
}
