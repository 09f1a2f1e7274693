use std::path::PathBuf;

use config::{Config, Environment};
use serde::Deserialize;

use crate::error::Result;
use crate::summary::SummaryOptions;

/// One summary to run after the table is built.
pub type SummaryRequest = SummaryOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub schema_path: PathBuf,
    pub json_dir: PathBuf,
    /// Parquet file to write the final table to.
    pub output_path: Option<PathBuf>,
    pub num_threads: Option<usize>,
    /// Daily rolling log files go here; stdout when unset.
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub keep_raw: bool,
    #[serde(default)]
    pub summaries: Vec<SummaryRequest>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Loads `path` (any format the `config` crate recognizes by extension),
/// then applies `VERIS_*` environment overrides such as `VERIS_NUM_THREADS`.
pub fn load_config(path: &str) -> Result<PipelineConfig> {
    let cfg = Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(Environment::with_prefix("VERIS"))
        .build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veris.toml");
        fs::write(
            &path,
            r#"
schema_path = "verisc-merged.json"
json_dir = "data/json"
output_path = "out/veris.parquet"
num_threads = 4

[[summaries]]
enum_path = "action"
ci_method = "wilson"

[[summaries]]
enum_path = "action"
group_by = "timeline.incident.year"
include_unknown = true
"#,
        )
        .unwrap();

        let cfg = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.schema_path, PathBuf::from("verisc-merged.json"));
        assert_eq!(cfg.num_threads, Some(4));
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.keep_raw);
        assert_eq!(cfg.summaries.len(), 2);
        assert_eq!(cfg.summaries[0].ci_method.as_deref(), Some("wilson"));
        assert_eq!(cfg.summaries[0].ci_level, 0.95);
        assert_eq!(cfg.summaries[1].group_by.as_deref(), Some("timeline.incident.year"));
        assert!(cfg.summaries[1].include_unknown);
    }

    #[test]
    fn test_missing_config_file() {
        assert!(load_config("/definitely/not/here.toml").is_err());
    }
}
