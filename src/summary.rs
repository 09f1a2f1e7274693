//! Frequency and confidence-interval tables over one enumeration, optionally
//! stratified by a grouping column or a second enumeration.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cell::format_number;
use crate::constants::UNKNOWN;
use crate::error::{Result, VerisError};
use crate::stats::{proportion_confint, round_to, CiMethod};
use crate::table::{Column, MaterializedTable};

/// Parameters of one summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Column or enumeration prefix to summarize, e.g. `action` or
    /// `timeline.incident.year`.
    pub enum_path: String,
    pub group_by: Option<String>,
    /// Count `Unknown` children in the denominator.
    pub include_unknown: bool,
    pub ci_method: Option<String>,
    pub ci_level: f64,
    pub round_to: u32,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            enum_path: String::new(),
            group_by: None,
            include_unknown: false,
            ci_method: None,
            ci_level: 0.95,
            round_to: 5,
        }
    }
}

impl SummaryOptions {
    pub fn new(enum_path: impl Into<String>) -> Self {
        Self {
            enum_path: enum_path.into(),
            ..Default::default()
        }
    }

    pub fn group_by(mut self, path: impl Into<String>) -> Self {
        self.group_by = Some(path.into());
        self
    }

    pub fn include_unknown(mut self, include: bool) -> Self {
        self.include_unknown = include;
        self
    }

    pub fn ci(mut self, method: impl Into<String>, level: f64) -> Self {
        self.ci_method = Some(method.into());
        self.ci_level = level;
        self
    }

    pub fn round_to(mut self, digits: u32) -> Self {
        self.round_to = digits;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Partition key; `None` when ungrouped.
    pub group: Option<String>,
    pub enum_value: String,
    pub count: usize,
    /// `None` for `Unknown` rows when unknowns are excluded.
    pub denominator: Option<usize>,
    pub frequency: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTable {
    pub ci_method: Option<CiMethod>,
    pub grouped: bool,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn find(&self, group: Option<&str>, enum_value: &str) -> Option<&SummaryRow> {
        self.rows
            .iter()
            .find(|r| r.group.as_deref() == group && r.enum_value == enum_value)
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_else(|| "NA".to_string());
        if self.grouped {
            write!(f, "by\t")?;
        }
        write!(f, "enum\tx\tn\tfreq")?;
        if self.ci_method.is_some() {
            write!(f, "\tmethod\tlower\tupper")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            if self.grouped {
                write!(f, "{}\t", row.group.as_deref().unwrap_or("NA"))?;
            }
            write!(
                f,
                "{}\t{}\t{}\t{}",
                row.enum_value,
                row.count,
                row.denominator.map_or_else(|| "NA".to_string(), |n| n.to_string()),
                opt(row.frequency)
            )?;
            if let Some(method) = self.ci_method {
                write!(f, "\t{method}\t{}\t{}", opt(row.lower), opt(row.upper))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// What `enum_path` resolved to.
enum Target<'a> {
    Values(&'a Column),
    Flags(Vec<(&'a str, &'a [bool])>),
}

struct Partition {
    key: Option<String>,
    rows: Vec<usize>,
}

pub fn summarize(table: &MaterializedTable, opts: &SummaryOptions) -> Result<SummaryTable> {
    if !(opts.ci_level > 0.0 && opts.ci_level < 1.0) {
        return Err(VerisError::invalid_argument(format!(
            "ci_level must be in (0, 1), got {}",
            opts.ci_level
        )));
    }
    let method = opts.ci_method.as_deref().map(str::parse::<CiMethod>).transpose()?;

    let Some(target) = resolve_target(table, &opts.enum_path) else {
        debug!(enum_path = %opts.enum_path, "no columns match enumeration");
        return Ok(SummaryTable {
            ci_method: method,
            grouped: false,
            rows: Vec::new(),
        });
    };

    let (grouped, partitions) = match opts.group_by.as_deref() {
        Some(by) => match partition_by(table, by) {
            Some(partitions) => (true, partitions),
            None => {
                warn!(group_by = by, "could not find columns matching group_by; summarizing ungrouped");
                (false, vec![whole(table)])
            }
        },
        None => (false, vec![whole(table)]),
    };

    let rows = partitions
        .par_iter()
        .map(|p| summarize_partition(&target, p, opts, method))
        .collect::<Vec<_>>()
        .concat();

    Ok(SummaryTable {
        ci_method: method,
        grouped,
        rows,
    })
}

// Numeric columns count their values. Otherwise boolean children win over a
// text column of the same name, so `pattern` means the ten pattern flags.
fn resolve_target<'a>(table: &'a MaterializedTable, path: &str) -> Option<Target<'a>> {
    let column = table.column(path);
    if let Some(column @ Column::Number(_)) = column {
        return Some(Target::Values(column));
    }
    let flags = flag_columns(table, path);
    if !flags.is_empty() {
        return Some(Target::Flags(flags));
    }
    match column {
        Some(column @ Column::Text(_)) => Some(Target::Values(column)),
        _ => None,
    }
}

fn flag_columns<'a>(table: &'a MaterializedTable, prefix: &str) -> Vec<(&'a str, &'a [bool])> {
    table
        .child_flags(prefix)
        .into_iter()
        .filter_map(|name| {
            let values = table.bool_column(name)?;
            let suffix = &name[prefix.len() + 1..];
            Some((suffix, values))
        })
        .collect()
}

fn whole(table: &MaterializedTable) -> Partition {
    Partition {
        key: None,
        rows: (0..table.num_rows()).collect(),
    }
}

fn partition_by(table: &MaterializedTable, by: &str) -> Option<Vec<Partition>> {
    let children = table.child_flags(by);
    match table.column(by) {
        Some(Column::Number(values)) => {
            let mut keys: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
            keys.sort_by(f64::total_cmp);
            keys.dedup();
            Some(
                keys.into_iter()
                    .map(|key| Partition {
                        key: Some(format_number(key)),
                        rows: (0..values.len()).filter(|&r| values[r] == key).collect(),
                    })
                    .collect(),
            )
        }
        Some(column @ Column::Text(_)) if children.is_empty() => {
            let mut groups: BTreeMap<String, Vec<usize>> = BTreeMap::new();
            for row in 0..table.num_rows() {
                if let Some(value) = column.text_at(row) {
                    groups.entry(value).or_default().push(row);
                }
            }
            Some(
                groups
                    .into_iter()
                    .map(|(key, rows)| Partition { key: Some(key), rows })
                    .collect(),
            )
        }
        _ => {
            if children.is_empty() {
                return None;
            }
            Some(
                children
                    .into_iter()
                    .filter_map(|name| {
                        let values = table.bool_column(name)?;
                        Some(Partition {
                            key: Some(name.to_string()),
                            rows: (0..values.len()).filter(|&r| values[r]).collect(),
                        })
                    })
                    .collect(),
            )
        }
    }
}

fn is_unknown(value: &str) -> bool {
    value.eq_ignore_ascii_case(UNKNOWN)
}

fn summarize_partition(
    target: &Target<'_>,
    partition: &Partition,
    opts: &SummaryOptions,
    method: Option<CiMethod>,
) -> Vec<SummaryRow> {
    let counts: Vec<(String, usize, Option<usize>)> = match target {
        Target::Values(column) => {
            let n = partition.rows.len();
            value_counts(column, &partition.rows)
                .into_iter()
                .map(|(value, count)| (value, count, Some(n)))
                .collect()
        }
        Target::Flags(flags) => {
            let n = partition
                .rows
                .iter()
                .filter(|&&r| {
                    flags
                        .iter()
                        .any(|(value, values)| values[r] && (opts.include_unknown || !is_unknown(value)))
                })
                .count();
            flags
                .iter()
                .map(|(value, values)| {
                    let count = partition.rows.iter().filter(|&&r| values[r]).count();
                    let denominator = (opts.include_unknown || !is_unknown(value)).then_some(n);
                    (value.to_string(), count, denominator)
                })
                .collect()
        }
    };

    let mut rows: Vec<SummaryRow> = counts
        .into_iter()
        .map(|(enum_value, count, denominator)| {
            let n = denominator.filter(|n| *n > 0);
            let frequency = n.map(|n| round_to(count as f64 / n as f64, opts.round_to));
            let bounds = method
                .zip(n)
                .and_then(|(m, n)| proportion_confint(count, n, opts.ci_level, m));
            SummaryRow {
                group: partition.key.clone(),
                enum_value,
                count,
                denominator,
                frequency,
                lower: bounds.map(|(lo, _)| round_to(lo, opts.round_to)),
                upper: bounds.map(|(_, hi)| round_to(hi, opts.round_to)),
            }
        })
        .collect();

    // Descending frequency; rows without a frequency go last.
    rows.sort_by(|a, b| match (a.frequency, b.frequency) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

// Distinct present values of `column` within `rows`, with their counts.
fn value_counts(column: &Column, rows: &[usize]) -> Vec<(String, usize)> {
    match column {
        Column::Number(values) => {
            let mut present: Vec<f64> = rows.iter().map(|&r| values[r]).filter(|v| !v.is_nan()).collect();
            present.sort_by(f64::total_cmp);
            present
                .chunk_by(|a, b| a == b)
                .map(|run| (format_number(run[0]), run.len()))
                .collect()
        }
        _ => {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for &row in rows {
                if let Some(value) = column.text_at(row) {
                    *counts.entry(value).or_default() += 1;
                }
            }
            counts.into_iter().collect()
        }
    }
}
