//! Enumeration materialization: joins schema descriptors with the flat table
//! to produce one boolean column per enumerated value, one amount column per
//! paired value and typed scalar columns.

use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::cell::Cell;
use crate::flattener::{FlatColumn, FlatTable};
use crate::schema::{column_name, FieldKind, PairFamily, SchemaIndex};
use crate::table::{Column, MaterializedTable};

pub struct EnumMaterializer<'a> {
    index: &'a SchemaIndex,
}

impl<'a> EnumMaterializer<'a> {
    pub fn new(index: &'a SchemaIndex) -> Self {
        Self { index }
    }

    /// Expands every raw column, then backfills the declared columns that no
    /// record touched. The result has exactly `flat.num_rows()` rows.
    pub fn materialize(&self, flat: &FlatTable) -> MaterializedTable {
        let rows = flat.num_rows();

        // Raw columns expand independently. When two raw columns produce the
        // same output name the later raw column wins, as it would sequentially.
        let merged: DashMap<String, (usize, Column), RandomState> = DashMap::with_hasher(RandomState::new());
        flat.columns().par_iter().enumerate().for_each(|(pos, raw)| {
            for (name, column) in self.expand(raw) {
                match merged.entry(name) {
                    Entry::Occupied(mut slot) => {
                        if slot.get().0 < pos {
                            slot.insert((pos, column));
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert((pos, column));
                    }
                }
            }
        });

        let mut table = MaterializedTable::new(rows);
        for (name, (_, column)) in merged {
            table.insert(name, column);
        }
        let observed = table.num_columns();

        self.backfill(&mut table);

        debug!(
            raw_columns = flat.num_columns(),
            observed,
            backfilled = table.num_columns() - observed,
            "materialized enumerations"
        );
        table
    }

    fn expand(&self, raw: &FlatColumn) -> Vec<(String, Column)> {
        let name = raw.name.as_str();
        let cells = raw.cells.as_slice();

        match self.index.get(name).map(|d| &d.kind) {
            Some(FieldKind::Enumerated(values))
            | Some(FieldKind::Paired {
                family: PairFamily::Variety,
                values,
                ..
            }) => values
                .iter()
                .map(|v| (column_name(name, v), enum_column(cells, v)))
                .collect(),
            // A bare amount without its entry cannot be keyed; backfill covers it.
            Some(FieldKind::Paired {
                family: PairFamily::Amount,
                ..
            }) => Vec::new(),
            Some(FieldKind::Scalar(ty)) => vec![(name.to_string(), Column::typed(ty, cells))],
            None if self.index.is_variety_amount_group(name) => self.expand_pairs(name, cells),
            None => vec![(name.to_string(), Column::infer(cells))],
        }
    }

    fn expand_pairs(&self, group: &str, cells: &[Cell]) -> Vec<(String, Column)> {
        let mut out = Vec::new();
        for family in PairFamily::ALL {
            let Some(values) = self.index.pair(group, family) else {
                continue;
            };
            let prefix = column_name(group, family.as_str());
            for value in values {
                let column = match family {
                    PairFamily::Variety => Column::Bool(cells.iter().map(|c| c.has_variety(value)).collect()),
                    PairFamily::Amount => Column::Amount(cells.iter().map(|c| c.amount_for(value)).collect()),
                };
                out.push((column_name(&prefix, value), column));
            }
        }
        out
    }

    fn backfill(&self, table: &mut MaterializedTable) {
        let rows = table.num_rows();
        for descriptor in self.index.descriptors() {
            match &descriptor.kind {
                FieldKind::Enumerated(values)
                | FieldKind::Paired {
                    family: PairFamily::Variety,
                    values,
                    ..
                } => {
                    for value in values {
                        let name = column_name(&descriptor.path, value);
                        if !table.contains(&name) {
                            table.insert(name, Column::Bool(vec![false; rows]));
                        }
                    }
                }
                FieldKind::Paired {
                    family: PairFamily::Amount,
                    values,
                    ..
                } => {
                    for value in values {
                        let name = column_name(&descriptor.path, value);
                        if !table.contains(&name) {
                            table.insert(name, Column::Amount(vec![None; rows]));
                        }
                    }
                }
                FieldKind::Scalar(ty) => {
                    if !table.contains(&descriptor.path) {
                        table.insert(descriptor.path.clone(), Column::missing(ty, rows));
                    }
                }
            }
        }
    }
}

fn enum_column(cells: &[Cell], value: &str) -> Column {
    Column::Bool(cells.iter().map(|c| c.contains_value(value)).collect())
}

/// Convenience wrapper over [`EnumMaterializer::materialize`].
pub fn materialize(index: &SchemaIndex, flat: &FlatTable) -> MaterializedTable {
    EnumMaterializer::new(index).materialize(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ReferenceData;
    use serde_json::{json, Value};

    fn index() -> SchemaIndex {
        let schema = json!({
            "type": "object",
            "properties": {
                "action": {"type": "object", "properties": {
                    "hacking": {"type": "object", "properties": {
                        "variety": {"type": "array", "items": {"type": "string", "enum": ["SQL Injection", "Brute Force", "DoS"]}}
                    }}
                }},
                "asset": {"type": "object", "properties": {
                    "assets": {"type": "array", "items": {"type": "object", "properties": {
                        "variety": {"type": "string", "enum": ["S - POS controller", "U - Laptop"]},
                        "amount": {"type": "integer"}
                    }}}
                }},
                "victim": {"type": "object", "properties": {
                    "industry": {"type": "string"},
                    "employee_count": {"type": "string", "enum": ["Small", "Large"]},
                    "revenue": {"type": "object", "properties": {"amount": {"type": "integer"}}}
                }}
            }
        });
        SchemaIndex::from_schema(&schema, &ReferenceData::default())
    }

    fn build(records: &[Value]) -> MaterializedTable {
        materialize(&index(), &FlatTable::from_records(records))
    }

    #[test]
    fn test_enumerated_list_values() {
        let table = build(&[
            json!({"action": {"hacking": {"variety": ["SQL Injection"]}}}),
            json!({"action": {"hacking": {"variety": ["Brute Force", "DoS"]}}}),
            json!({"victim": {"industry": "52"}}),
        ]);
        assert_eq!(
            table.bool_column("action.hacking.variety.SQL Injection").unwrap(),
            &[true, false, false]
        );
        assert_eq!(
            table.bool_column("action.hacking.variety.Brute Force").unwrap(),
            &[false, true, false]
        );
        assert_eq!(table.bool_column("action.hacking.variety.DoS").unwrap(), &[false, true, false]);
    }

    #[test]
    fn test_scalar_enum_matches_string() {
        let table = build(&[
            json!({"victim": {"employee_count": "Large"}}),
            json!({"victim": {"employee_count": ["Small"]}}),
            json!({"victim": {"employee_count": 7}}),
        ]);
        assert_eq!(table.bool_column("victim.employee_count.Large").unwrap(), &[true, false, false]);
        assert_eq!(table.bool_column("victim.employee_count.Small").unwrap(), &[false, true, false]);
    }

    #[test]
    fn test_variety_and_amount_columns() {
        let table = build(&[
            json!({"asset": {"assets": [{"variety": "S - POS controller", "amount": 3}, {"variety": "S - POS controller", "amount": 5}]}}),
            json!({"asset": {"assets": ["U - Laptop"]}}),
            json!({"asset": {"assets": [{"amount": 1}]}}),
        ]);
        assert_eq!(
            table.bool_column("asset.assets.variety.S - POS controller").unwrap(),
            &[true, false, false]
        );
        assert_eq!(
            table.bool_column("asset.assets.variety.U - Laptop").unwrap(),
            &[false, true, false]
        );
        assert_eq!(
            table.column("asset.assets.amount.S - POS controller"),
            Some(&Column::Amount(vec![Some(3.0), None, None]))
        );
        assert_eq!(
            table.column("asset.assets.amount.U - Laptop"),
            Some(&Column::Amount(vec![None, None, None]))
        );
    }

    #[test]
    fn test_backfills_unobserved_columns() {
        let table = build(&[json!({"victim": {"industry": "52"}})]);
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.bool_column("action.hacking.variety.DoS").unwrap(), &[false]);
        assert_eq!(
            table.column("asset.assets.amount.U - Laptop"),
            Some(&Column::Amount(vec![None]))
        );
        match table.column("victim.revenue.amount") {
            Some(Column::Number(values)) => assert!(values[0].is_nan()),
            other => panic!("unexpected column {other:?}"),
        }
        assert_eq!(
            table.column("victim.industry"),
            Some(&Column::Text(vec![Some("52".to_string())]))
        );
    }

    #[test]
    fn test_undeclared_columns_pass_through() {
        let table = build(&[json!({"incident_id": "abc"}), json!({"incident_id": "def"})]);
        assert_eq!(
            table.column("incident_id"),
            Some(&Column::Text(vec![Some("abc".into()), Some("def".into())]))
        );
    }

    #[test]
    fn test_empty_input_has_all_declared_columns() {
        let table = build(&[]);
        assert_eq!(table.num_rows(), 0);
        assert!(table.contains("action.hacking.variety.SQL Injection"));
        assert!(table.contains("victim.industry"));
    }
}
