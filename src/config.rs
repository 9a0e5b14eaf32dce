use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize, Debug)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Debug)]
pub struct Collection {
    #[serde(default = "default_max_collect_history_hr")]
    pub max_collect_history_hr: u32,
    #[serde(default = "default_min_collect_history_hr")]
    pub min_collect_history_hr: u32,
    /// Max number of laps to attempt per cycle, absent or 0 means all missing laps
    #[serde(default)]
    pub max_collect_iterations: Option<usize>,
}

#[derive(Deserialize, Debug)]
pub struct Station {
    #[serde(default = "default_station_id")]
    pub station_id: u32,
}

#[derive(Deserialize, Debug)]
pub struct Storage {
    pub data_dir: String,
    #[serde(default = "default_root_key")]
    pub root_key: String,
}

#[derive(Deserialize, Debug)]
pub struct MeteoFrance {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_min_wait_ms")]
    pub min_wait_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl Default for MeteoFrance {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            min_wait_ms: default_min_wait_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub general: General,
    pub collection: Collection,
    pub station: Station,
    pub storage: Storage,
    #[serde(default)]
    pub meteo_france: MeteoFrance,
}

fn default_max_collect_history_hr() -> u32 { 14 * 24 }
fn default_min_collect_history_hr() -> u32 { 5 }
fn default_station_id() -> u32 { 7510 }
fn default_root_key() -> String { "esquilaplu".to_string() }
fn default_base_url() -> String { "https://donneespubliques.meteofrance.fr".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_min_wait_ms() -> u64 { 200 }
fn default_max_wait_ms() -> u64 { 1500 }

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses and validates a configuration document
///
/// # Arguments
///
/// * 'toml' - the configuration as a toml document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.collection.min_collect_history_hr > config.collection.max_collect_history_hr {
        return Err(ConfigError::from("min_collect_history_hr is greater than max_collect_history_hr"));
    }
    if config.meteo_france.min_wait_ms > config.meteo_france.max_wait_ms {
        return Err(ConfigError::from("min_wait_ms is greater than max_wait_ms"));
    }

    Ok(config)
}
