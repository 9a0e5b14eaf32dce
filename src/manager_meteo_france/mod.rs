pub mod factory;

use std::thread;
use std::time::Duration;
use chrono::NaiveDateTime;
use log::{debug, error};
use rand::Rng;
use ureq::Agent;
use crate::config::{MeteoFrance, Station};
use crate::errors::CollectorError;
use crate::manager_meteo_france::factory::record_from_dataset;
use crate::models::lap::Lap;
use crate::models::record::Record;
use crate::models::synop::SynopDataset;
use crate::traits::{LapRepository, WeatherCollector};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/112.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "fr,fr-FR;q=0.8,en-US;q=0.5,en;q=0.3";

/// Collects rainfall records from the Météo-France public SYNOP files.
///
/// Every fetched dataset is stored raw through the repository before it is turned
/// into a record, and each fetch is followed by a randomized pause since the
/// source doesn't like being hammered.
pub struct MeteoFranceCollector<'a, R: LapRepository> {
    agent: Agent,
    base_url: String,
    station_id: u32,
    min_wait_ms: u64,
    max_wait_ms: u64,
    repository: &'a R,
}

impl<'a, R: LapRepository> MeteoFranceCollector<'a, R> {
    /// Returns a MeteoFranceCollector ready for fetching SYNOP files
    ///
    /// # Arguments
    ///
    /// * 'config' - upstream source configuration
    /// * 'station' - the station to extract records for
    /// * 'repository' - storage for raw datasets
    pub fn new(config: &MeteoFrance, station: &Station, repository: &'a R) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let agent = agent_config.into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            station_id: station.station_id,
            min_wait_ms: config.min_wait_ms,
            max_wait_ms: config.max_wait_ms,
            repository,
        }
    }

    /// Retrieves the SYNOP file published for the given observation time
    ///
    /// # Arguments
    ///
    /// * 'date_time' - observation time, i.e. the end of a lap
    fn fetch(&self, date_time: NaiveDateTime) -> Result<String, CollectorError> {
        let url = synop_url(&self.base_url, date_time);
        debug!("Fetching {}", url);

        let text = self.agent
            .get(&url)
            .header("Referer", referer(&self.base_url, date_time))
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .call()
            .map_err(|e| {
                error!("Error while collecting weather data from {}: {}", url, e);
                CollectorError::from(e)
            })?
            .body_mut()
            .read_to_string()?;

        Ok(text)
    }

    fn wait(&self) {
        let wait_ms = rand::rng().random_range(self.min_wait_ms..=self.max_wait_ms);
        thread::sleep(Duration::from_millis(wait_ms));
    }
}

impl<R: LapRepository> WeatherCollector for MeteoFranceCollector<'_, R> {
    fn collect(&self, lap: &Lap) -> Result<Record, CollectorError> {
        let end_time = lap.end_time();

        let text = self.fetch(end_time);
        self.wait();

        let mut dataset = SynopDataset::from_csv(&text?)?;
        debug!("Fetched {} rows for {}", dataset.len(), lap);
        dataset.normalize_missing();
        dataset.set_date(end_time);

        self.repository.save_raw(&dataset, lap)?;

        record_from_dataset(&dataset, self.station_id, lap.duration_hours)
    }
}

/// Builds the url of the SYNOP file published for the given observation time
///
/// # Arguments
///
/// * 'base_url' - Météo-France public data domain
/// * 'date_time' - observation time
pub fn synop_url(base_url: &str, date_time: NaiveDateTime) -> String {
    format!("{}/donnees_libres/Txt/Synop/synop.{}.csv", base_url, date_time.format("%Y%m%d%H"))
}

/// Builds the referer the public data portal expects for a SYNOP download
///
/// # Arguments
///
/// * 'base_url' - Météo-France public data domain
/// * 'date_time' - observation time
pub fn referer(base_url: &str, date_time: NaiveDateTime) -> String {
    format!(
        "{}/?fond=donnee_libre&prefixe=Txt%2FSynop%2Fsynop&extension=csv&date={}&reseau={}",
        base_url,
        date_time.format("%Y%m%d"),
        date_time.format("%H"),
    )
}
