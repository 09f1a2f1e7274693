#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use veris_frame::{ReferenceData, Veris};

pub const SCHEMA: &str = include_str!("../fixtures/schema.json");

pub fn schema() -> Value {
    serde_json::from_str(SCHEMA).expect("fixture schema is valid JSON")
}

pub fn veris() -> Veris {
    Veris::from_schema(&schema(), ReferenceData::default())
}

const ACTION_VARIETIES: [(&str, &[&str]); 7] = [
    ("malware", &["Ransomware", "RAM scraper", "Backdoor", "Unknown"]),
    ("hacking", &["SQLi", "Brute force", "DoS", "Use of stolen creds", "Unknown"]),
    ("social", &["Phishing", "Pretexting", "Unknown"]),
    ("physical", &["Skimmer", "Tampering", "Theft", "Unknown"]),
    ("misuse", &["Privilege abuse", "Data mishandling", "Unknown"]),
    ("error", &["Loss", "Misdelivery", "Unknown"]),
    ("environmental", &["Fire", "Unknown"]),
];

const ACTOR_VARIETIES: [(&str, &[&str]); 2] = [
    ("external", &["Organized crime", "State-affiliated", "Activist", "Unknown"]),
    ("internal", &["Cashier", "System admin", "Unknown"]),
];

const ASSETS: [&str; 7] = [
    "S - Database",
    "S - POS controller",
    "U - Laptop",
    "U - POS terminal",
    "M - Documents",
    "P - Cashier",
    "Unknown",
];

const INDUSTRIES: [&str; 6] = ["522110", "44", "611310", "92", "999999", "31-33"];
const EMPLOYEE_COUNTS: [&str; 5] = ["1 to 10", "101 to 1000", "Over 100000", "Large", "Unknown"];

fn pick<'a>(rng: &mut StdRng, values: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = values.iter().copied().filter(|_| rng.random_bool(0.3)).collect();
    if out.is_empty() {
        if let Some(v) = values.choose(rng) {
            out.push(*v);
        }
    }
    out
}

/// One plausible incident. Sections are included at random, so many
/// records leave whole branches of the schema unset.
pub fn random_record(rng: &mut StdRng, id: usize) -> Value {
    let mut record = Map::new();
    record.insert("incident_id".into(), json!(format!("incident-{id:05}")));

    let mut action = Map::new();
    for (category, varieties) in ACTION_VARIETIES {
        if rng.random_bool(0.25) {
            action.insert(category.into(), json!({ "variety": pick(rng, varieties) }));
        }
    }
    if action.contains_key("hacking") && rng.random_bool(0.5) {
        action["hacking"]["vector"] = json!(["Web application"]);
    }
    if action.contains_key("malware") && rng.random_bool(0.3) {
        action["malware"]["vector"] = json!(["Direct install"]);
    }
    if !action.is_empty() {
        record.insert("action".into(), Value::Object(action));
    }

    let mut actor = Map::new();
    for (category, varieties) in ACTOR_VARIETIES {
        if rng.random_bool(0.4) {
            actor.insert(category.into(), json!({ "variety": pick(rng, varieties) }));
        }
    }
    if rng.random_bool(0.1) {
        actor.insert("partner".into(), json!({ "industry": *INDUSTRIES.choose(rng).unwrap() }));
    }
    if !actor.is_empty() {
        record.insert("actor".into(), Value::Object(actor));
    }

    if rng.random_bool(0.6) {
        let assets: Vec<Value> = pick(rng, &ASSETS)
            .into_iter()
            .map(|variety| {
                if rng.random_bool(0.5) {
                    json!({ "variety": variety, "amount": rng.random_range(1..20) })
                } else {
                    json!({ "variety": variety })
                }
            })
            .collect();
        record.insert("asset".into(), json!({ "assets": assets }));
    }

    if rng.random_bool(0.5) {
        let disclosure = *["Yes", "Potentially", "No", "Unknown"].choose(rng).unwrap();
        record.insert(
            "attribute".into(),
            json!({ "confidentiality": {
                "data_disclosure": disclosure,
                "data": [{ "variety": *["Payment", "Personal", "Credentials"].choose(rng).unwrap() }]
            }}),
        );
    }

    let mut victim = Map::new();
    if rng.random_bool(0.8) {
        victim.insert("industry".into(), json!(*INDUSTRIES.choose(rng).unwrap()));
    }
    if rng.random_bool(0.7) {
        victim.insert("employee_count".into(), json!(*EMPLOYEE_COUNTS.choose(rng).unwrap()));
    }
    if !victim.is_empty() {
        record.insert("victim".into(), Value::Object(victim));
    }

    if rng.random_bool(0.9) {
        record.insert(
            "timeline".into(),
            json!({ "incident": { "year": rng.random_range(2015..2020) } }),
        );
    }

    Value::Object(record)
}

pub fn random_records(seed: u64, n: usize) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|i| random_record(&mut rng, i)).collect()
}
