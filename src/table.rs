//! The materialized table: named, typed columns of equal length.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::cell::{format_number, Cell};
use crate::schema::ScalarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    Number,
    Amount,
    Text,
    Mixed,
}

/// A column of the materialized table.
///
/// `Number` uses NaN for missing values, `Amount` uses `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Bool(Vec<bool>),
    Number(Vec<f64>),
    Amount(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Mixed(Vec<Cell>),
}

impl Column {
    /// Column for a declared scalar leaf.
    pub fn typed(ty: &ScalarType, cells: &[Cell]) -> Self {
        match ty {
            ScalarType::String => Self::Text(cells.iter().map(Cell::as_text).collect()),
            ScalarType::Integer | ScalarType::Number => Self::Number(cells.iter().map(Cell::as_number).collect()),
            _ => Self::infer(cells),
        }
    }

    /// Column for a leaf the schema does not declare.
    pub fn infer(cells: &[Cell]) -> Self {
        let present = || cells.iter().filter(|c| !c.is_absent());
        if present().all(|c| matches!(c, Cell::Number(_))) {
            Self::Number(cells.iter().map(Cell::as_number).collect())
        } else if present().all(|c| matches!(c, Cell::Text(_))) {
            Self::Text(cells.iter().map(Cell::as_text).collect())
        } else if cells.iter().all(|c| matches!(c, Cell::Bool(_))) {
            Self::Bool(cells.iter().map(|c| matches!(c, Cell::Bool(true))).collect())
        } else {
            Self::Mixed(cells.to_vec())
        }
    }

    /// Placeholder for a declared scalar leaf no record populated.
    pub fn missing(ty: &ScalarType, rows: usize) -> Self {
        match ty {
            ScalarType::String => Self::Text(vec![None; rows]),
            ScalarType::Integer | ScalarType::Number => Self::Number(vec![f64::NAN; rows]),
            _ => Self::Mixed(vec![Cell::Absent; rows]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Number(v) => v.len(),
            Self::Amount(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Mixed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Bool(_) => ColumnType::Bool,
            Self::Number(_) => ColumnType::Number,
            Self::Amount(_) => ColumnType::Amount,
            Self::Text(_) => ColumnType::Text,
            Self::Mixed(_) => ColumnType::Mixed,
        }
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Text reading of one row; `None` for null, NaN or absent values.
    pub fn text_at(&self, row: usize) -> Option<String> {
        match self {
            Self::Bool(v) => v.get(row).map(|b| b.to_string()),
            Self::Number(v) => v.get(row).filter(|n| !n.is_nan()).map(|n| format_number(*n)),
            Self::Amount(v) => v.get(row).copied().flatten().map(format_number),
            Self::Text(v) => v.get(row).cloned().flatten(),
            Self::Mixed(v) => v.get(row).and_then(Cell::as_text),
        }
    }

    pub fn number_at(&self, row: usize) -> Option<f64> {
        let n = match self {
            Self::Number(v) => v.get(row).copied(),
            Self::Amount(v) => v.get(row).copied().flatten(),
            Self::Mixed(v) => v.get(row).map(Cell::as_number),
            _ => None,
        }?;
        (!n.is_nan()).then_some(n)
    }
}

/// Rows are records; columns are kept sorted by name.
#[derive(Debug, Clone, Default)]
pub struct MaterializedTable {
    columns: BTreeMap<String, Column>,
    rows: usize,
}

impl MaterializedTable {
    pub fn new(rows: usize) -> Self {
        Self {
            columns: BTreeMap::new(),
            rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Inserts or replaces a column. The column must have one value per row.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Option<Column> {
        debug_assert_eq!(column.len(), self.rows, "column length must match row count");
        self.columns.insert(name.into(), column)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn bool_column(&self, name: &str) -> Option<&[bool]> {
        self.column(name).and_then(Column::as_bool)
    }

    /// A boolean column, or all-false when the table lacks it.
    pub fn flag(&self, name: &str) -> Cow<'_, [bool]> {
        match self.bool_column(name) {
            Some(values) => Cow::Borrowed(values),
            None => Cow::Owned(vec![false; self.rows]),
        }
    }

    /// Row-wise OR over the named boolean columns; missing names count as false.
    pub fn any_of<S: AsRef<str>>(&self, names: &[S]) -> Vec<bool> {
        let mut out = vec![false; self.rows];
        for values in names.iter().filter_map(|n| self.bool_column(n.as_ref())) {
            for (acc, v) in out.iter_mut().zip(values) {
                *acc |= *v;
            }
        }
        out
    }

    /// Column names in alphabetical order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Boolean columns exactly one dot-segment below `prefix`, sorted by name.
    pub fn child_flags(&self, prefix: &str) -> Vec<&str> {
        let depth = prefix.split('.').count() + 1;
        let start = format!("{prefix}.");
        self.columns
            .range(start.clone()..)
            .take_while(|(name, _)| name.starts_with(&start))
            .filter(|(name, column)| name.split('.').count() == depth && column.as_bool().is_some())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
