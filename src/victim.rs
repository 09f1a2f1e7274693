//! Victim-derived columns: truncated industry codes, one flag per industry
//! sector, the sector label and the small/large organization rollups.

use crate::constants::ReferenceData;
use crate::industry::UNKNOWN_INDUSTRY;
use crate::schema::column_name;
use crate::table::{Column, MaterializedTable};

pub const VICTIM_INDUSTRY: &str = "victim.industry";
pub const VICTIM_INDUSTRY2: &str = "victim.industry2";
pub const VICTIM_INDUSTRY3: &str = "victim.industry3";
pub const VICTIM_INDUSTRY_NAME: &str = "victim.industry.name";
pub const PARTNER_INDUSTRY: &str = "actor.partner.industry";
pub const PARTNER_INDUSTRY2: &str = "actor.partner.industry2";

fn leading(code: &str, n: usize) -> String {
    code.chars().take(n).collect()
}

fn truncated(table: &MaterializedTable, source: &str, n: usize) -> Vec<Option<String>> {
    let column = table.column(source);
    (0..table.num_rows())
        .map(|row| column.and_then(|c| c.text_at(row)).map(|code| leading(&code, n)))
        .collect()
}

pub fn add_victim_columns(table: &mut MaterializedTable, reference: &ReferenceData) {
    let industry2 = truncated(table, VICTIM_INDUSTRY, 2);
    let industry3 = truncated(table, VICTIM_INDUSTRY, 3);
    let partner2 = truncated(table, PARTNER_INDUSTRY, 2);

    // Every row lands in exactly one sector; unknown or missing codes go to "00".
    let sectors: Vec<&str> = industry2
        .iter()
        .map(|code| {
            code.as_deref()
                .and_then(|c| reference.industry(c))
                .map(|industry| industry.code)
                .unwrap_or(UNKNOWN_INDUSTRY)
        })
        .collect();

    let names: Vec<Option<String>> = sectors
        .iter()
        .map(|code| Some(reference.industry(code).map_or("Unknown", |i| i.shorter).to_string()))
        .collect();

    for industry in &reference.industries {
        let flags = sectors.iter().map(|code| *code == industry.code).collect();
        table.insert(column_name(VICTIM_INDUSTRY2, industry.code), Column::Bool(flags));
    }

    table.insert(VICTIM_INDUSTRY2, Column::Text(industry2));
    table.insert(VICTIM_INDUSTRY3, Column::Text(industry3));
    table.insert(VICTIM_INDUSTRY_NAME, Column::Text(names));
    table.insert(PARTNER_INDUSTRY2, Column::Text(partner2));

    for (rollup, buckets) in &reference.org_sizes {
        let flags = table.any_of(buckets);
        table.insert(rollup.clone(), Column::Bool(flags));
    }
}
