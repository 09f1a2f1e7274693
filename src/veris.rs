//! The table builder: schema discovery once, then flatten, materialize and
//! derive for any number of record batches.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::constants::ReferenceData;
use crate::error::Result;
use crate::flattener::FlatTable;
use crate::loader::{RecordSource, SchemaSource};
use crate::materialize::EnumMaterializer;
use crate::patterns::add_patterns;
use crate::rollup::RollupIndex;
use crate::schema::SchemaIndex;
use crate::summary::{summarize, SummaryOptions, SummaryTable};
use crate::table::MaterializedTable;
use crate::victim::add_victim_columns;

/// Result of [`Veris::build`].
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub table: MaterializedTable,
    /// The flattened records before enumeration expansion, when requested.
    pub raw: Option<FlatTable>,
}

/// Holds the schema-derived state; read-only after construction, so one
/// builder can serve any number of builds and summaries.
#[derive(Debug, Clone)]
pub struct Veris {
    index: SchemaIndex,
    rollups: RollupIndex,
    reference: ReferenceData,
}

impl Veris {
    pub fn from_schema(schema: &Value, reference: ReferenceData) -> Self {
        let index = SchemaIndex::from_schema(schema, &reference);
        let rollups = RollupIndex::build(&index, &reference);
        info!(
            fields = index.len(),
            enumerations = index.enumerations().count(),
            rollups = rollups.rollups().len(),
            "indexed schema"
        );
        Self {
            index,
            rollups,
            reference,
        }
    }

    pub fn from_source(source: &impl SchemaSource, reference: ReferenceData) -> Result<Self> {
        Ok(Self::from_schema(&source.load_schema()?, reference))
    }

    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    pub fn rollups(&self) -> &RollupIndex {
        &self.rollups
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Builds the final table: one row per record, every declared
    /// enumeration value as a boolean column, plus the derived columns.
    pub fn build(&self, records: &[Value], keep_raw: bool) -> BuildOutput {
        if records.is_empty() {
            warn!("no records to build; the table will have zero rows");
        }

        let flat = FlatTable::from_records(records);
        debug!(rows = flat.num_rows(), columns = flat.num_columns(), "flattened records");

        let mut table = EnumMaterializer::new(&self.index).materialize(&flat);
        self.rollups.apply(&mut table);
        add_victim_columns(&mut table, &self.reference);
        add_patterns(&mut table);

        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "built table"
        );
        BuildOutput {
            table,
            raw: keep_raw.then_some(flat),
        }
    }

    pub fn build_from(&self, source: &impl RecordSource, keep_raw: bool) -> Result<BuildOutput> {
        Ok(self.build(&source.load_records()?, keep_raw))
    }

    pub fn summarize(&self, table: &MaterializedTable, opts: &SummaryOptions) -> Result<SummaryTable> {
        summarize(table, opts)
    }
}
