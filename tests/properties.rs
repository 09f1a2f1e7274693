mod common;

use proptest::prelude::*;
use proptest::sample::{select, subsequence};
use serde_json::{json, Map, Value};

use veris_frame::patterns::PATTERN_NAMES;
use veris_frame::ReferenceData;

const HACKING: [&str; 5] = ["SQLi", "Brute force", "DoS", "Use of stolen creds", "Unknown"];
const MALWARE: [&str; 3] = ["Ransomware", "RAM scraper", "Backdoor"];
const PHYSICAL: [&str; 3] = ["Skimmer", "Tampering", "Theft"];
const ASSETS: [&str; 4] = ["S - POS controller", "U - POS terminal", "U - Laptop", "Unknown"];
const EXTERNAL: [&str; 3] = ["Organized crime", "State-affiliated", "Unknown"];
const INDUSTRY: [&str; 5] = ["522110", "44", "92", "999999", ""];

fn record() -> impl Strategy<Value = Value> {
    (
        subsequence(HACKING.to_vec(), 0..=2),
        subsequence(MALWARE.to_vec(), 0..=2),
        subsequence(PHYSICAL.to_vec(), 0..=1),
        subsequence(ASSETS.to_vec(), 0..=2),
        subsequence(EXTERNAL.to_vec(), 0..=1),
        proptest::option::of(select(INDUSTRY.to_vec())),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(hacking, malware, physical, assets, external, industry, web, misuse)| {
            let mut action = Map::new();
            if !hacking.is_empty() {
                let mut h = json!({ "variety": hacking });
                if web {
                    h["vector"] = json!(["Web application"]);
                }
                action.insert("hacking".into(), h);
            }
            if !malware.is_empty() {
                action.insert("malware".into(), json!({ "variety": malware }));
            }
            if !physical.is_empty() {
                action.insert("physical".into(), json!({ "variety": physical }));
            }
            if misuse {
                action.insert("misuse".into(), json!({ "variety": ["Privilege abuse"] }));
            }

            let mut record = Map::new();
            if !action.is_empty() {
                record.insert("action".into(), Value::Object(action));
            }
            if !assets.is_empty() {
                let entries: Vec<Value> = assets.iter().map(|a| json!({ "variety": a })).collect();
                record.insert("asset".into(), json!({ "assets": entries }));
            }
            if !external.is_empty() {
                record.insert("actor".into(), json!({ "external": { "variety": external } }));
            }
            if let Some(code) = industry {
                record.insert("victim".into(), json!({ "industry": code }));
            }
            Value::Object(record)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_one_row_per_record(records in prop::collection::vec(record(), 0..30)) {
        let out = common::veris().build(&records, false);
        prop_assert_eq!(out.table.num_rows(), records.len());
        for (_, column) in out.table.columns() {
            prop_assert_eq!(column.len(), records.len());
        }
    }

    #[test]
    fn prop_unknown_is_complement(records in prop::collection::vec(record(), 1..30)) {
        let out = common::veris().build(&records, false);
        let t = &out.table;
        for family in &ReferenceData::default().rollup_families {
            let unknown = format!("{}.Unknown", family.name);
            let Some(unknown_flags) = t.bool_column(&unknown) else { continue };
            let known: Vec<String> = family
                .categories
                .iter()
                .filter(|c| *c != "Unknown")
                .map(|c| format!("{}.{}", family.name, c))
                .collect();
            let any_known = t.any_of(&known);
            for row in 0..t.num_rows() {
                prop_assert_eq!(unknown_flags[row], !any_known[row], "{} row {}", unknown, row);
            }
        }
    }

    #[test]
    fn prop_exactly_one_industry(records in prop::collection::vec(record(), 1..30)) {
        let out = common::veris().build(&records, false);
        let reference = ReferenceData::default();
        let flags: Vec<&[bool]> = reference
            .industries
            .iter()
            .map(|i| out.table.bool_column(&format!("victim.industry2.{}", i.code)).unwrap())
            .collect();
        for row in 0..out.table.num_rows() {
            prop_assert_eq!(flags.iter().filter(|f| f[row]).count(), 1);
        }
    }

    #[test]
    fn prop_pattern_is_first_true_flag(records in prop::collection::vec(record(), 1..30)) {
        let out = common::veris().build(&records, false);
        let t = &out.table;
        let labels = t.column("pattern").unwrap();
        for row in 0..t.num_rows() {
            let first = PATTERN_NAMES
                .iter()
                .find(|name| t.bool_column(&format!("pattern.{name}")).unwrap()[row]);
            prop_assert!(first.is_some());
            let label = labels.text_at(row);
            prop_assert_eq!(label.as_deref(), first.copied());
        }
    }

    #[test]
    fn prop_dos_never_web_application(records in prop::collection::vec(record(), 1..30)) {
        let out = common::veris().build(&records, false);
        let dos = out.table.bool_column("pattern.Denial of Service").unwrap();
        let web = out.table.bool_column("pattern.Web Applications").unwrap();
        prop_assert!(dos.iter().zip(web).all(|(d, w)| !(*d && *w)));
    }

    #[test]
    fn prop_include_unknown_never_shrinks_top_count(records in prop::collection::vec(record(), 1..30)) {
        let veris = common::veris();
        let out = veris.build(&records, false);
        let base = veris.summarize(&out.table, &veris_frame::SummaryOptions::new("action")).unwrap();
        let wide = veris
            .summarize(&out.table, &veris_frame::SummaryOptions::new("action").include_unknown(true))
            .unwrap();
        let top = &base.rows()[0];
        let same = wide.find(None, &top.enum_value).unwrap();
        prop_assert!(same.count >= top.count);
        if let (Some(a), Some(b)) = (top.denominator, same.denominator) {
            prop_assert!(b >= a);
        }
    }
}
