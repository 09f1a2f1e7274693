//! Four-category (A4) rollups.
//!
//! Each rollup column is the OR of a fixed list of constituent boolean
//! columns. The list is resolved once from the schema index, so the
//! relationship can be inspected and tested without scanning column names.
//! `Unknown` categories are complements: true when none of the other
//! categories' constituents fired.

use rayon::prelude::*;

use crate::constants::{ReferenceData, UNKNOWN};
use crate::schema::{column_name, SchemaIndex};
use crate::table::{Column, MaterializedTable};

#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    pub column: String,
    pub constituents: Vec<String>,
    /// True for `Unknown`: the column is the negated OR.
    pub complement: bool,
}

impl Rollup {
    fn evaluate(&self, table: &MaterializedTable) -> Vec<bool> {
        let mut values = table.any_of(&self.constituents);
        if self.complement {
            values.iter_mut().for_each(|v| *v = !*v);
        }
        values
    }
}

#[derive(Debug, Clone, Default)]
pub struct RollupIndex {
    rollups: Vec<Rollup>,
}

impl RollupIndex {
    pub fn build(index: &SchemaIndex, reference: &ReferenceData) -> Self {
        let mut rollups = Vec::new();

        for family in &reference.rollup_families {
            let mut known: Vec<String> = Vec::new();
            let mut has_unknown = false;

            for category in &family.categories {
                if category == UNKNOWN {
                    has_unknown = true;
                    continue;
                }
                let column = column_name(&family.name, category);
                let field_prefix = column_name(&family.name, &category.to_lowercase());
                let excluded = reference
                    .rollup_exclusions
                    .iter()
                    .find(|(rollup, _)| *rollup == column)
                    .map(|(_, cols)| cols.as_slice())
                    .unwrap_or_default();

                let constituents: Vec<String> = index
                    .boolean_fields()
                    .filter(|(path, _)| is_under(path, &field_prefix))
                    .flat_map(|(path, values)| values.iter().map(move |v| column_name(path, v)))
                    .filter(|name| !excluded.contains(name))
                    .collect();

                known.extend(constituents.iter().cloned());
                rollups.push(Rollup {
                    column,
                    constituents,
                    complement: false,
                });
            }

            if has_unknown {
                rollups.push(Rollup {
                    column: column_name(&family.name, UNKNOWN),
                    constituents: known,
                    complement: true,
                });
            }
        }

        // Asset rollups: asset.variety.<label> over asset.assets.variety.<code...>.
        let asset_values = index.get("asset.assets.variety").and_then(|d| d.values()).unwrap_or_default();
        for (code, label) in &reference.asset_map {
            rollups.push(Rollup {
                column: column_name("asset.variety", label),
                constituents: asset_values
                    .iter()
                    .filter(|v| v.starts_with(code.as_str()))
                    .map(|v| column_name("asset.assets.variety", v))
                    .collect(),
                complement: false,
            });
        }

        Self { rollups }
    }

    pub fn rollups(&self) -> &[Rollup] {
        &self.rollups
    }

    #[cfg(test)]
    fn get(&self, column: &str) -> Option<&Rollup> {
        self.rollups.iter().find(|r| r.column == column)
    }

    /// Adds every rollup column to the table.
    pub fn apply(&self, table: &mut MaterializedTable) {
        let computed: Vec<(String, Vec<bool>)> = self
            .rollups
            .par_iter()
            .map(|rollup| (rollup.column.clone(), rollup.evaluate(table)))
            .collect();
        for (name, values) in computed {
            table.insert(name, Column::Bool(values));
        }
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
