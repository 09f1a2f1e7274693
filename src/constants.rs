use crate::industry::{Industry, INDUSTRIES};

/// Canonical location of the merged VERIS schema.
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/vz-risk/veris/master/verisc-merged.json";

/// Fields whose entries carry a `variety` and an optional `amount`.
pub const VARIETY_AMT_ENUMS: [&str; 3] = ["asset.assets", "attribute.confidentiality.data", "impact.loss"];

pub const VARIETY: &str = "variety";
pub const AMOUNT: &str = "amount";

pub const UNKNOWN: &str = "Unknown";

/// Asset variety code prefix -> rollup label.
pub const ASSET_MAP: [(&str, &str); 8] = [
    ("S ", "Server"),
    ("N ", "Network"),
    ("U ", "User Dev"),
    ("M ", "Media"),
    ("P ", "Person"),
    ("T ", "Kiosk/Term"),
    ("Un", "Unknown"),
    ("E ", "Embedded"),
];

pub const A4_ACTOR: [&str; 4] = ["External", "Internal", "Partner", "Unknown"];
pub const A4_ACTION: [&str; 8] = [
    "Malware",
    "Hacking",
    "Social",
    "Physical",
    "Misuse",
    "Error",
    "Environmental",
    "Unknown",
];
pub const A4_ATTRIBUTE: [&str; 3] = ["Confidentiality", "Integrity", "Availability"];

// Disclosure answers that do not count as a confidentiality loss.
pub const CONFIDENTIALITY_EXCLUDED: [&str; 2] = [
    "attribute.confidentiality.data_disclosure.No",
    "attribute.confidentiality.data_disclosure.Unknown",
];

pub const EMPLOYEE_COUNT: &str = "victim.employee_count";
pub const SMALL_ORG_SUFFIXES: [&str; 4] = ["1 to 10", "11 to 100", "101 to 1000", "Small"];
pub const LARGE_ORG_SUFFIXES: [&str; 6] = [
    "1001 to 10000",
    "10001 to 25000",
    "25001 to 50000",
    "50001 to 100000",
    "Over 100000",
    "Large",
];

pub const MATRIX_ENUMS: [&str; 16] = [
    "actor",
    "action",
    "victim.employee_count",
    "security_incident",
    "asset.assets",
    "asset.assets.variety",
    "asset.cloud",
    "asset.hosting",
    "asset.management",
    "asset.ownership",
    "attribute.confidentiality.data.variety",
    "attribute.confidentiality.data_disclosure",
    "discovery_method",
    "targeted",
    "attribute.integrity.variety",
    "attribute.availability.variety",
];
pub const MATRIX_IGNORE: [&str; 5] = ["cve", "name", "notes", "country", "industry"];

/// A family of four-category rollups, e.g. `actor` with External/Internal/Partner/Unknown.
#[derive(Debug, Clone)]
pub struct RollupFamily {
    pub name: String,
    pub categories: Vec<String>,
}

impl RollupFamily {
    pub fn new(name: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Fixed lookup tables injected into the builder.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub variety_amount_groups: Vec<String>,
    pub rollup_families: Vec<RollupFamily>,
    /// Constituent columns removed from a rollup, keyed by rollup column name.
    pub rollup_exclusions: Vec<(String, Vec<String>)>,
    pub asset_map: Vec<(String, String)>,
    pub industries: Vec<Industry>,
    /// Org-size rollup column -> employee count columns it covers.
    pub org_sizes: Vec<(String, Vec<String>)>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        let employee_cols = |suffixes: &[&str]| -> Vec<String> {
            suffixes.iter().map(|s| format!("{EMPLOYEE_COUNT}.{s}")).collect()
        };

        Self {
            variety_amount_groups: VARIETY_AMT_ENUMS.iter().map(|s| s.to_string()).collect(),
            rollup_families: vec![
                RollupFamily::new("actor", &A4_ACTOR),
                RollupFamily::new("action", &A4_ACTION),
                RollupFamily::new("attribute", &A4_ATTRIBUTE),
            ],
            rollup_exclusions: vec![(
                "attribute.Confidentiality".to_string(),
                CONFIDENTIALITY_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            )],
            asset_map: ASSET_MAP
                .iter()
                .map(|(code, label)| (code.to_string(), label.to_string()))
                .collect(),
            industries: INDUSTRIES.to_vec(),
            org_sizes: vec![
                ("victim.orgsize.Small".to_string(), employee_cols(&SMALL_ORG_SUFFIXES)),
                ("victim.orgsize.Large".to_string(), employee_cols(&LARGE_ORG_SUFFIXES)),
            ],
        }
    }
}

impl ReferenceData {
    pub fn industry(&self, code: &str) -> Option<&Industry> {
        self.industries.iter().find(|i| i.code == code)
    }
}
