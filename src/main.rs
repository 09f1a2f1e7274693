use std::env;

use tracing::{debug, info};

use veris_frame::config::load_config;
use veris_frame::export::write_parquet;
use veris_frame::{logging, JsonDirectory, LocalSchema, ReferenceData, Veris};

fn main() -> anyhow::Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "veris_config.toml".to_string());
    let cfg = load_config(&config_path)?;
    let _guard = logging::init(&cfg.log_level, cfg.log_dir.as_deref());

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = cfg.num_threads {
        pool = pool.num_threads(n);
    }
    pool.build_global()?;
    debug!("Using {} threads", rayon::current_num_threads());

    info!(config = %config_path, "starting VERIS build");
    let veris = Veris::from_source(&LocalSchema::new(&cfg.schema_path), ReferenceData::default())?;
    let out = veris.build_from(&JsonDirectory::new(&cfg.json_dir), cfg.keep_raw)?;

    if let Some(raw) = &out.raw {
        info!(rows = raw.num_rows(), columns = raw.num_columns(), "kept raw flattened table");
    }
    if let Some(path) = &cfg.output_path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_parquet(&out.table, path)?;
    }

    for request in &cfg.summaries {
        let summary = veris.summarize(&out.table, request)?;
        info!(
            enum_path = %request.enum_path,
            group_by = request.group_by.as_deref().unwrap_or("-"),
            rows = summary.len(),
            "summary"
        );
        println!("{summary}");
    }

    Ok(())
}
