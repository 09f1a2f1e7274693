//! 0/1 matrix view of the boolean enumeration columns, for distance and
//! clustering work.

use ndarray::Array2;
use tracing::debug;

use crate::constants::{MATRIX_ENUMS, MATRIX_IGNORE};
use crate::error::{Result, VerisError};
use crate::table::MaterializedTable;

#[derive(Debug, Clone)]
pub struct MatrixOptions {
    /// Boolean columns starting with any of these are kept.
    pub enums: Vec<String>,
    /// Columns containing any of these substrings are dropped.
    pub ignore: Vec<String>,
    pub bools_only: bool,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            enums: MATRIX_ENUMS.iter().map(|s| s.to_string()).collect(),
            ignore: MATRIX_IGNORE.iter().map(|s| s.to_string()).collect(),
            bools_only: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Column labels, sorted.
    pub columns: Vec<String>,
    /// One row per record, one column per label.
    pub values: Array2<u8>,
}

pub fn to_matrix(table: &MaterializedTable, opts: &MatrixOptions) -> Result<Matrix> {
    if !opts.bools_only {
        return Err(VerisError::NotImplemented(
            "matrix export of non-boolean columns".to_string(),
        ));
    }

    // Table columns are already in name order.
    let keep: Vec<(&str, &[bool])> = table
        .columns()
        .filter_map(|(name, column)| Some((name, column.as_bool()?)))
        .filter(|(name, _)| opts.enums.iter().any(|e| name.starts_with(e.as_str())))
        .filter(|(name, _)| !opts.ignore.iter().any(|i| name.contains(i.as_str())))
        .collect();

    let rows = table.num_rows();
    let values = Array2::from_shape_fn((rows, keep.len()), |(r, c)| u8::from(keep[c].1[r]));
    debug!(rows, columns = keep.len(), "built enumeration matrix");

    Ok(Matrix {
        columns: keep.into_iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table() -> MaterializedTable {
        let mut t = MaterializedTable::new(3);
        t.insert("action.Hacking", Column::Bool(vec![true, false, true]));
        t.insert("action.Malware", Column::Bool(vec![false, true, false]));
        t.insert("actor.external.country.US", Column::Bool(vec![true, true, true]));
        t.insert("victim.industry2.52", Column::Bool(vec![true, false, false]));
        t.insert("timeline.incident.year", Column::Number(vec![2020.0, 2021.0, 2022.0]));
        t
    }

    #[test]
    fn test_filters_and_sorts_columns() {
        let m = to_matrix(&table(), &MatrixOptions::default()).unwrap();
        assert_eq!(m.columns, vec!["action.Hacking", "action.Malware"]);
        assert_eq!(m.values.shape(), &[3, 2]);
        assert_eq!(m.values.row(0).to_vec(), vec![1, 0]);
        assert_eq!(m.values.column(1).to_vec(), vec![0, 1, 0]);
    }

    #[test]
    fn test_custom_prefixes() {
        let opts = MatrixOptions {
            enums: vec!["victim".into()],
            ignore: Vec::new(),
            bools_only: true,
        };
        let m = to_matrix(&table(), &opts).unwrap();
        assert_eq!(m.columns, vec!["victim.industry2.52"]);
    }

    #[test]
    fn test_non_boolean_mode_not_implemented() {
        let opts = MatrixOptions {
            bools_only: false,
            ..Default::default()
        };
        assert!(matches!(
            to_matrix(&table(), &opts),
            Err(VerisError::NotImplemented(_))
        ));
    }
}
