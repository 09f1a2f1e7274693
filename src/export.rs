//! Columnar export of the final table through arrow2, and parquet output.

use std::fs::File;
use std::path::Path;

use arrow2::array::*;
use arrow2::chunk::Chunk;
use arrow2::datatypes::*;
use arrow2::io::parquet::write::{
    transverse, CompressionOptions, Encoding, FileWriter, RowGroupIterator, Version, WriteOptions,
};
use tracing::info;

use crate::error::{Result, VerisError};
use crate::table::{Column, MaterializedTable};

static WRITE_OPTIONS: WriteOptions = WriteOptions {
    write_statistics: true,
    compression: CompressionOptions::Snappy,
    version: Version::V2,
    data_pagesize_limit: None,
};

/// Arrow schema and data for the table, one field per column in name order.
pub fn to_chunk(table: &MaterializedTable) -> Result<(Schema, Chunk<Box<dyn Array>>)> {
    // ─────────────────────────────────────────────────────────────
    // Builders (arrow2 uses MutableArrays)
    // ─────────────────────────────────────────────────────────────

    // ---- Boolean builder ----
    macro_rules! build_bool {
        ($values:expr) => {{
            let mut col = MutableBooleanArray::with_capacity($values.len());
            for v in $values {
                col.push(Some(*v));
            }
            Box::new(BooleanArray::from(col)) as Box<dyn Array>
        }};
    }

    // ---- Float builder; `None` and NaN become nulls ----
    macro_rules! build_prim {
        ($values:expr, $get:expr) => {{
            let mut col = MutablePrimitiveArray::<f64>::with_capacity($values.len());
            for v in $values {
                match ($get)(v) {
                    Some(n) if !f64::is_nan(n) => col.push(Some(n)),
                    _ => col.push(None),
                }
            }
            Box::new(PrimitiveArray::<f64>::from(col)) as Box<dyn Array>
        }};
    }

    // ---- UTF8 builder ----
    macro_rules! build_utf8 {
        ($values:expr, $get:expr) => {{
            let mut col = MutableUtf8Array::<i32>::with_capacity($values.len());
            for v in $values {
                let text: Option<String> = ($get)(v);
                col.push(text.as_deref());
            }
            let array: Utf8Array<i32> = col.into();
            Box::new(array) as Box<dyn Array>
        }};
    }

    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays = Vec::with_capacity(table.num_columns());

    for (name, column) in table.columns() {
        let (data_type, array) = match column {
            Column::Bool(values) => (DataType::Boolean, build_bool!(values)),
            Column::Number(values) => (DataType::Float64, build_prim!(values, |v: &f64| Some(*v))),
            Column::Amount(values) => (DataType::Float64, build_prim!(values, |v: &Option<f64>| *v)),
            Column::Text(values) => (DataType::Utf8, build_utf8!(values, |v: &Option<String>| v.clone())),
            // Untyped pass-through cells are kept as JSON text.
            Column::Mixed(cells) => (
                DataType::Utf8,
                build_utf8!(cells, |c: &crate::cell::Cell| match c.to_json() {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                }),
            ),
        };
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let chunk = Chunk::try_new(arrays)?;
    Ok((Schema::from(fields), chunk))
}

/// Writes the table as a single-row-group, Snappy-compressed parquet file.
pub fn write_parquet(table: &MaterializedTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let (schema, chunk) = to_chunk(table)?;

    let encodings = schema
        .fields
        .iter()
        .map(|f| transverse(&f.data_type, |_| Encoding::Plain))
        .collect();
    let row_groups = RowGroupIterator::try_new(vec![Ok(chunk)].into_iter(), &schema, WRITE_OPTIONS, encodings)?;

    let file = File::create(path).map_err(|e| VerisError::io(path, e))?;
    let mut writer = FileWriter::try_new(file, schema, WRITE_OPTIONS)?;
    for group in row_groups {
        writer.write(group?)?;
    }
    writer.end(None)?;

    info!(
        path = %path.display(),
        rows = table.num_rows(),
        columns = table.num_columns(),
        "wrote parquet file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn table() -> MaterializedTable {
        let mut t = MaterializedTable::new(2);
        t.insert("action.Hacking", Column::Bool(vec![true, false]));
        t.insert("asset.assets.amount.U - Laptop", Column::Amount(vec![Some(2.0), None]));
        t.insert("timeline.incident.year", Column::Number(vec![2020.0, f64::NAN]));
        t.insert("victim.industry2", Column::Text(vec![Some("52".into()), None]));
        t.insert("plus.extra", Column::Mixed(vec![Cell::Number(1.0), Cell::Absent]));
        t
    }

    #[test]
    fn test_schema_follows_column_types() {
        let (schema, chunk) = to_chunk(&table()).unwrap();
        let types: Vec<_> = schema.fields.iter().map(|f| (f.name.as_str(), f.data_type.clone())).collect();
        assert_eq!(
            types,
            vec![
                ("action.Hacking", DataType::Boolean),
                ("asset.assets.amount.U - Laptop", DataType::Float64),
                ("plus.extra", DataType::Utf8),
                ("timeline.incident.year", DataType::Float64),
                ("victim.industry2", DataType::Utf8),
            ]
        );
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.arrays().len(), 5);
    }

    #[test]
    fn test_missing_values_are_null() {
        let (_, chunk) = to_chunk(&table()).unwrap();
        let arrays = chunk.arrays();
        assert_eq!(arrays[0].null_count(), 0);
        assert_eq!(arrays[1].null_count(), 1);
        assert_eq!(arrays[2].null_count(), 1);
        assert_eq!(arrays[3].null_count(), 1);
        assert_eq!(arrays[4].null_count(), 1);

        let years = arrays[3].as_any().downcast_ref::<PrimitiveArray<f64>>().unwrap();
        assert_eq!(years.value(0), 2020.0);
        let extra = arrays[2].as_any().downcast_ref::<Utf8Array<i32>>().unwrap();
        assert_eq!(extra.value(0), "1.0");
    }

    #[test]
    fn test_write_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veris.parquet");
        write_parquet(&table(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[..4], b"PAR1");
        assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
    }
}
