use std::fs;
use std::path::{Path, PathBuf};
use glob::glob;
use log::debug;
use crate::config::Storage;
use crate::errors::StorageError;
use crate::laps::{lap_identifier, IDENTIFIER_FORMAT};
use crate::models::lap::Lap;
use crate::models::record::{Record, RecordRow};
use crate::models::synop::SynopDataset;
use crate::traits::LapRepository;

/// Sub directory holding raw Météo-France datasets
const RAW_DIR: &str = "raw/meteofrance";

/// Sub directory holding normalized records
const RECORDS_DIR: &str = "records";

/// Local filesystem store, laid out as `{data_dir}/{root_key}/raw/meteofrance/*.csv`
/// for raw datasets and `{data_dir}/{root_key}/records/*.json` for records
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Returns a new FileStore
    ///
    /// # Arguments
    ///
    /// * 'config' - storage configuration
    pub fn new(config: &Storage) -> Self {
        Self { root: Path::new(&config.data_dir).join(&config.root_key) }
    }

    fn ensure_dir(&self, sub_dir: &str) -> Result<PathBuf, StorageError> {
        let dir = self.root.join(sub_dir);
        fs::create_dir_all(&dir)?;

        Ok(dir)
    }
}

impl LapRepository for FileStore {
    fn list_known_identifiers(&self) -> Result<Vec<String>, StorageError> {
        let pattern = format!("{}/*", self.root.join(RECORDS_DIR).display());

        let mut identifiers = Vec::new();
        for entry in glob(&pattern)? {
            let path = entry?;
            if path.is_file() {
                if let Some(filename) = path.file_name().and_then(|n| n.to_str()) {
                    identifiers.push(filename.to_string());
                }
            }
        }

        Ok(identifiers)
    }

    fn save_batch(&self, records: &[Record]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        let dir = self.ensure_dir(RECORDS_DIR)?;
        for record in records {
            let json = serde_json::to_string_pretty(&RecordRow::from(record))?;
            fs::write(dir.join(lap_identifier(&record.lap)), json)?;
        }
        debug!("Saved {} records to {}", records.len(), dir.display());

        Ok(())
    }

    fn save_raw(&self, dataset: &SynopDataset, lap: &Lap) -> Result<(), StorageError> {
        let dir = self.ensure_dir(RAW_DIR)?;
        let file_path = dir.join(format!("{}.csv", lap.end_time().format(IDENTIFIER_FORMAT)));

        fs::write(&file_path, dataset.to_csv()?)?;
        debug!("Saved raw dataset to {}", file_path.display());

        Ok(())
    }
}
