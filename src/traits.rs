use crate::errors::{CollectorError, StorageError};
use crate::models::lap::Lap;
use crate::models::record::Record;
use crate::models::synop::SynopDataset;

/// Storage of collected data
pub trait LapRepository {
    /// Lists identifiers of stored records, i.e. file names encoding the end of
    /// each stored lap as `YYYY-MM-DD-HH` followed by a file suffix
    fn list_known_identifiers(&self) -> Result<Vec<String>, StorageError>;

    /// Persists a batch of records in one go
    ///
    /// # Arguments
    ///
    /// * 'records' - the records to persist, may be empty
    fn save_batch(&self, records: &[Record]) -> Result<(), StorageError>;

    /// Persists the raw upstream dataset fetched for a lap
    ///
    /// # Arguments
    ///
    /// * 'dataset' - raw dataset
    /// * 'lap' - the lap the dataset was fetched for
    fn save_raw(&self, dataset: &SynopDataset, lap: &Lap) -> Result<(), StorageError>;
}

/// Upstream source of weather observations
pub trait WeatherCollector {
    /// Collects the record for one lap
    ///
    /// # Arguments
    ///
    /// * 'lap' - the lap to collect
    fn collect(&self, lap: &Lap) -> Result<Record, CollectorError>;
}
