use std::env;
use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use crate::config::load_config;
use crate::logging::setup_logger;
use crate::manager_meteo_france::MeteoFranceCollector;
use crate::manager_storage::FileStore;
use crate::records::RecordService;

mod config;
mod errors;
mod laps;
mod logging;
mod manager_meteo_france;
mod manager_storage;
mod models;
mod records;
mod traits;

fn main() -> Result<()> {
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("CONFIG_FILE").ok())
        .unwrap_or("config.toml".to_string());

    let config = load_config(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;
    setup_logger(&config.general).context("setting up logging")?;

    info!("esquilaplu version: {}", env!("CARGO_PKG_VERSION"));

    let store = FileStore::new(&config.storage);
    let collector = MeteoFranceCollector::new(&config.meteo_france, &config.station, &store);
    let service = RecordService::new(&store, &collector, &config.collection);

    service.update_records(Utc::now().naive_utc()).context("running update cycle")?;
    info!("Update cycle done");

    Ok(())
}
