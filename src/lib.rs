//! Flattens VERIS incident records into a wide table with one boolean column
//! per schema enumeration value, derives rollup, industry, org-size and
//! pattern columns, and computes frequency/confidence-interval summaries.

pub mod cell;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod flattener;
pub mod industry;
pub mod loader;
pub mod logging;
pub mod materialize;
pub mod matrix;
pub mod patterns;
pub mod rollup;
pub mod schema;
pub mod stats;
pub mod summary;
pub mod table;
pub mod veris;
pub mod victim;

pub use constants::ReferenceData;
pub use error::{Result, VerisError};
pub use flattener::FlatTable;
pub use loader::{JsonDirectory, LocalSchema, RecordSource, SchemaSource};
pub use matrix::{to_matrix, Matrix, MatrixOptions};
pub use schema::SchemaIndex;
pub use stats::CiMethod;
pub use summary::{summarize, SummaryOptions, SummaryRow, SummaryTable};
pub use table::{Column, MaterializedTable};
pub use veris::{BuildOutput, Veris};
