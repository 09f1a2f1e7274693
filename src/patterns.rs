//! DBIR incident patterns.
//!
//! Patterns are layered set differences over already-materialized columns;
//! a row's single `pattern` label is the first true pattern in
//! [`PATTERN_NAMES`] order.

use rayon::prelude::*;

use crate::table::{Column, MaterializedTable};

/// Pattern names in label precedence order.
pub const PATTERN_NAMES: [&str; 10] = [
    "Point of Sale",
    "Web Applications",
    "Privilege Misuse",
    "Lost and Stolen Assets",
    "Miscellaneous Errors",
    "Crimeware",
    "Payment Card Skimmers",
    "Denial of Service",
    "Cyber-Espionage",
    "Everything Else",
];

pub const PATTERN: &str = "pattern";

const SKIMMER: &str = "action.physical.variety.Skimmer";
const TAMPERING: &str = "action.physical.variety.Tampering";
const PAYMENT_DATA: &str = "attribute.confidentiality.data.variety.Payment";
const ESPIONAGE_MOTIVE: &str = "actor.external.motive.Espionage";
const STATE_AFFILIATED: &str = "actor.external.variety.State-affiliated";
const POS_CONTROLLER: &str = "asset.assets.variety.S - POS controller";
const POS_TERMINAL: &str = "asset.assets.variety.U - POS terminal";
const DOS: &str = "action.hacking.variety.DoS";
const WEB_APPLICATION: &str = "action.hacking.vector.Web application";
const MISUSE: &str = "action.Misuse";
const MALWARE: &str = "action.Malware";
const DIRECT_INSTALL: &str = "action.malware.vector.Direct install";
const LOSS: &str = "action.error.variety.Loss";
const THEFT: &str = "action.physical.variety.Theft";
const ERROR: &str = "action.Error";

/// The indicator columns one row's patterns depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSignals {
    pub skimmer: bool,
    pub tampering: bool,
    pub payment_data: bool,
    pub espionage_motive: bool,
    pub state_affiliated: bool,
    pub pos_controller: bool,
    pub pos_terminal: bool,
    pub dos: bool,
    pub web_application: bool,
    pub misuse: bool,
    pub malware: bool,
    pub direct_install: bool,
    pub loss: bool,
    pub theft: bool,
    pub error: bool,
}

/// The ten pattern flags of one row, indexed like [`PATTERN_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternFlags(pub [bool; 10]);

impl PatternFlags {
    pub fn classify(s: &RowSignals) -> Self {
        let skimmer = s.skimmer || (s.tampering && s.payment_data);
        let espionage = s.espionage_motive || s.state_affiliated;
        let pos = s.pos_controller || s.pos_terminal;
        let dos = s.dos;
        let webapp = s.web_application && !dos;
        let misuse = s.misuse;

        let covered = skimmer || espionage || pos || dos || webapp || misuse;
        let malware = s.malware && !s.direct_install && !covered;

        let theftloss = s.loss || s.theft;
        let covered = covered || malware || theftloss;
        let errors = s.error && !covered;

        let covered = covered || errors;
        let other = !covered;

        Self([
            pos, webapp, misuse, theftloss, errors, malware, skimmer, dos, espionage, other,
        ])
    }

    #[cfg(test)]
    fn get(&self, name: &str) -> Option<bool> {
        PATTERN_NAMES.iter().position(|n| *n == name).map(|i| self.0[i])
    }

    /// First true pattern in precedence order.
    pub fn label(&self) -> &'static str {
        PATTERN_NAMES
            .iter()
            .zip(self.0)
            .find_map(|(name, hit)| hit.then_some(*name))
            .unwrap_or(PATTERN_NAMES[PATTERN_NAMES.len() - 1])
    }
}

pub fn pattern_column(name: &str) -> String {
    format!("{PATTERN}.{name}")
}

/// Classifies every row. Missing indicator columns read as false.
pub fn classify_rows(table: &MaterializedTable) -> Vec<PatternFlags> {
    let skimmer = table.flag(SKIMMER);
    let tampering = table.flag(TAMPERING);
    let payment_data = table.flag(PAYMENT_DATA);
    let espionage_motive = table.flag(ESPIONAGE_MOTIVE);
    let state_affiliated = table.flag(STATE_AFFILIATED);
    let pos_controller = table.flag(POS_CONTROLLER);
    let pos_terminal = table.flag(POS_TERMINAL);
    let dos = table.flag(DOS);
    let web_application = table.flag(WEB_APPLICATION);
    let misuse = table.flag(MISUSE);
    let malware = table.flag(MALWARE);
    let direct_install = table.flag(DIRECT_INSTALL);
    let loss = table.flag(LOSS);
    let theft = table.flag(THEFT);
    let error = table.flag(ERROR);

    (0..table.num_rows())
        .into_par_iter()
        .map(|row| {
            PatternFlags::classify(&RowSignals {
                skimmer: skimmer[row],
                tampering: tampering[row],
                payment_data: payment_data[row],
                espionage_motive: espionage_motive[row],
                state_affiliated: state_affiliated[row],
                pos_controller: pos_controller[row],
                pos_terminal: pos_terminal[row],
                dos: dos[row],
                web_application: web_application[row],
                misuse: misuse[row],
                malware: malware[row],
                direct_install: direct_install[row],
                loss: loss[row],
                theft: theft[row],
                error: error[row],
            })
        })
        .collect()
}

/// Adds `pattern.<Name>` flags and the single-label `pattern` column.
pub fn add_patterns(table: &mut MaterializedTable) {
    let flags = classify_rows(table);

    for (i, name) in PATTERN_NAMES.iter().enumerate() {
        let values = flags.iter().map(|f| f.0[i]).collect();
        table.insert(pattern_column(name), Column::Bool(values));
    }
    let labels = flags.iter().map(|f| Some(f.label().to_string())).collect();
    table.insert(PATTERN, Column::Text(labels));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_set_is_everything_else() {
        let flags = PatternFlags::classify(&RowSignals::default());
        assert_eq!(flags.label(), "Everything Else");
        assert_eq!(flags.get("Everything Else"), Some(true));
        assert_eq!(flags.0.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn test_pos_controller() {
        let flags = PatternFlags::classify(&RowSignals {
            pos_controller: true,
            ..Default::default()
        });
        assert_eq!(flags.label(), "Point of Sale");
        assert_eq!(flags.get("Everything Else"), Some(false));
    }

    #[test]
    fn test_dos_beats_web_application() {
        let flags = PatternFlags::classify(&RowSignals {
            dos: true,
            web_application: true,
            ..Default::default()
        });
        assert_eq!(flags.get("Web Applications"), Some(false));
        assert_eq!(flags.get("Denial of Service"), Some(true));
        assert_eq!(flags.label(), "Denial of Service");
    }

    #[test]
    fn test_malware_layering() {
        let crimeware = PatternFlags::classify(&RowSignals {
            malware: true,
            ..Default::default()
        });
        assert_eq!(crimeware.label(), "Crimeware");

        let direct = PatternFlags::classify(&RowSignals {
            malware: true,
            direct_install: true,
            ..Default::default()
        });
        assert_eq!(direct.get("Crimeware"), Some(false));
        assert_eq!(direct.label(), "Everything Else");

        let covered = PatternFlags::classify(&RowSignals {
            malware: true,
            misuse: true,
            ..Default::default()
        });
        assert_eq!(covered.get("Crimeware"), Some(false));
        assert_eq!(covered.label(), "Privilege Misuse");
    }

    #[test]
    fn test_errors_only_when_uncovered() {
        let lost = PatternFlags::classify(&RowSignals {
            error: true,
            loss: true,
            ..Default::default()
        });
        assert_eq!(lost.get("Miscellaneous Errors"), Some(false));
        assert_eq!(lost.label(), "Lost and Stolen Assets");

        let errors = PatternFlags::classify(&RowSignals {
            error: true,
            ..Default::default()
        });
        assert_eq!(errors.label(), "Miscellaneous Errors");
    }

    #[test]
    fn test_skimmer_needs_payment_with_tampering() {
        let tamper = PatternFlags::classify(&RowSignals {
            tampering: true,
            ..Default::default()
        });
        assert_eq!(tamper.get("Payment Card Skimmers"), Some(false));

        let skimmer = PatternFlags::classify(&RowSignals {
            tampering: true,
            payment_data: true,
            state_affiliated: true,
            ..Default::default()
        });
        assert_eq!(skimmer.get("Cyber-Espionage"), Some(true));
        assert_eq!(skimmer.label(), "Payment Card Skimmers");
    }

    #[test]
    fn test_add_patterns_on_table() {
        let mut table = MaterializedTable::new(2);
        table.insert(POS_TERMINAL, Column::Bool(vec![true, false]));
        add_patterns(&mut table);
        assert_eq!(
            table.column(PATTERN),
            Some(&Column::Text(vec![
                Some("Point of Sale".into()),
                Some("Everything Else".into())
            ]))
        );
        assert_eq!(table.bool_column("pattern.Point of Sale").unwrap(), &[true, false]);
        assert_eq!(table.bool_column("pattern.Everything Else").unwrap(), &[false, true]);
    }
}
