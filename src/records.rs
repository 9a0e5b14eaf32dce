use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, error, info};
use crate::config::Collection;
use crate::errors::CycleError;
use crate::laps::LapCatalog;
use crate::models::record::Record;
use crate::traits::{LapRepository, WeatherCollector};

/// Drives update cycles: finds missing laps, collects them one by one and
/// persists whatever was collected as one batch
pub struct RecordService<'a, R: LapRepository, C: WeatherCollector> {
    repository: &'a R,
    collector: &'a C,
    catalog: LapCatalog<'a, R>,
    max_collect_history_hr: u32,
    min_collect_history_hr: u32,
    max_collect_iterations: Option<usize>,
}

impl<'a, R: LapRepository, C: WeatherCollector> RecordService<'a, R, C> {
    /// Returns a new RecordService
    ///
    /// # Arguments
    ///
    /// * 'repository' - storage for records, also the source of known laps
    /// * 'collector' - upstream weather source
    /// * 'collection' - collection window and iteration cap
    pub fn new(repository: &'a R, collector: &'a C, collection: &Collection) -> Self {
        Self {
            repository,
            collector,
            catalog: LapCatalog::new(repository),
            max_collect_history_hr: collection.max_collect_history_hr,
            min_collect_history_hr: collection.min_collect_history_hr,
            max_collect_iterations: collection.max_collect_iterations.filter(|m| *m > 0),
        }
    }

    /// Runs one update cycle.
    ///
    /// The target range is `now - max_collect_history_hr` to `now - min_collect_history_hr`,
    /// the most recent hours are left out since upstream hasn't published them yet.
    /// Laps failing with a recoverable collector error are skipped and stay missing for
    /// the next cycle. Any other error aborts the cycle before anything is persisted.
    ///
    /// # Arguments
    ///
    /// * 'now' - reference time of the cycle
    pub fn update_records(&self, now: NaiveDateTime) -> Result<(), CycleError> {
        let start_time = now - TimeDelta::hours(self.max_collect_history_hr as i64);
        let end_time = now - TimeDelta::hours(self.min_collect_history_hr as i64);
        info!("Updating records from {} to {}", start_time, end_time);

        let missing_laps = self.catalog.missing_laps(start_time, end_time)?;
        info!("{} missing laps", missing_laps.len());

        let mut records: Vec<Record> = Vec::with_capacity(missing_laps.len());
        for (idx, lap) in missing_laps.iter().enumerate() {
            match self.collector.collect(lap) {
                Ok(record) => {
                    debug!("Collected {}: {} mm", lap, record.rainfall_mm);
                    records.push(record);
                },
                Err(e) if e.is_recoverable() => {
                    error!("Error while collecting weather data for {}: {}. Skipping.", lap, e);
                },
                Err(e) => return Err(e.into()),
            }

            if self.max_collect_iterations.is_some_and(|max| idx + 1 >= max) {
                info!("Reached max collect iterations ({}), stopping", idx + 1);
                break;
            }
        }

        info!("Saving {} records", records.len());
        self.repository.save_batch(&records)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use chrono::NaiveDate;
    use crate::errors::{CollectorError, StorageError};
    use crate::laps::lap_identifier;
    use crate::models::lap::Lap;
    use crate::models::synop::SynopDataset;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn lap(day: u32, hour: u32) -> Lap {
        Lap::new(at(day, hour), 3)
    }

    /// Stores batches and lists every saved record as known
    struct FakeRepository {
        identifiers: RefCell<Vec<String>>,
        batches: RefCell<Vec<Vec<Record>>>,
    }

    impl FakeRepository {
        fn with_known(known: &[Lap]) -> Self {
            Self {
                identifiers: RefCell::new(known.iter().map(lap_identifier).collect()),
                batches: RefCell::new(Vec::new()),
            }
        }
    }

    impl LapRepository for FakeRepository {
        fn list_known_identifiers(&self) -> Result<Vec<String>, StorageError> {
            Ok(self.identifiers.borrow().clone())
        }
        fn save_batch(&self, records: &[Record]) -> Result<(), StorageError> {
            self.identifiers.borrow_mut().extend(records.iter().map(|r| lap_identifier(&r.lap)));
            self.batches.borrow_mut().push(records.to_vec());
            Ok(())
        }
        fn save_raw(&self, _dataset: &SynopDataset, _lap: &Lap) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Returns a record with rainfall equal to the lap hour unless told to fail
    struct FakeCollector {
        failures: HashMap<NaiveDateTime, fn() -> CollectorError>,
        calls: RefCell<Vec<Lap>>,
    }

    impl FakeCollector {
        fn new() -> Self {
            Self { failures: HashMap::new(), calls: RefCell::new(Vec::new()) }
        }

        fn failing(mut self, start_time: NaiveDateTime, error: fn() -> CollectorError) -> Self {
            self.failures.insert(start_time, error);
            self
        }
    }

    impl WeatherCollector for FakeCollector {
        fn collect(&self, lap: &Lap) -> Result<Record, CollectorError> {
            self.calls.borrow_mut().push(*lap);
            match self.failures.get(&lap.start_time) {
                Some(error) => Err(error()),
                None => Ok(Record::new(*lap, lap.start_time.format("%H").to_string().parse::<f64>().unwrap() / 10.0)),
            }
        }
    }

    fn collection(max_collect_iterations: Option<usize>) -> Collection {
        Collection {
            max_collect_history_hr: 12,
            min_collect_history_hr: 5,
            max_collect_iterations,
        }
    }

    fn all_laps_but(day: u32, except: &[u32]) -> Vec<Lap> {
        [0, 3, 6, 9, 12, 15, 18, 21]
            .iter()
            .filter(|h| !except.contains(*h))
            .map(|h| lap(day, *h))
            .collect()
    }

    #[test]
    fn collects_missing_laps_in_range() {
        // now 2021-01-02 10:00 gives the range 2021-01-01 22:00 to 2021-01-02 05:00
        let mut known = all_laps_but(1, &[0, 12]);
        known.extend(all_laps_but(2, &[3]));
        let repository = FakeRepository::with_known(&known);
        let collector = FakeCollector::new();
        let service = RecordService::new(&repository, &collector, &collection(None));

        service.update_records(at(2, 10)).unwrap();

        assert_eq!(*collector.calls.borrow(), vec![lap(1, 0), lap(1, 12), lap(2, 3)]);
        let batches = repository.batches.borrow();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec![
            Record::new(lap(1, 0), 0.0),
            Record::new(lap(1, 12), 1.2),
            Record::new(lap(2, 3), 0.3),
        ]);
        assert_eq!(batches[0][1].rainfall_mm, 1.2);
    }

    #[test]
    fn saves_empty_batch_when_nothing_missing() {
        let mut known = all_laps_but(1, &[]);
        known.extend(all_laps_but(2, &[6, 9, 12, 15, 18, 21]));
        let repository = FakeRepository::with_known(&known);
        let collector = FakeCollector::new();
        let service = RecordService::new(&repository, &collector, &collection(None));

        service.update_records(at(2, 10)).unwrap();

        assert!(collector.calls.borrow().is_empty());
        assert_eq!(*repository.batches.borrow(), vec![Vec::<Record>::new()]);
    }

    #[test]
    fn skips_lap_failing_collection_and_retries_it_next_cycle() {
        let mut known = all_laps_but(1, &[0, 3, 6]);
        known.extend(all_laps_but(2, &[0, 3, 6, 9, 12, 15, 18, 21]));
        let repository = FakeRepository::with_known(&known);
        let collector = FakeCollector::new()
            .failing(at(1, 3), || CollectorError::Collection("http status 404".to_string()));
        let service = RecordService::new(&repository, &collector, &collection(None));

        service.update_records(at(1, 23)).unwrap();

        assert_eq!(*collector.calls.borrow(), vec![lap(1, 0), lap(1, 3), lap(1, 6)]);
        assert_eq!(repository.batches.borrow()[0], vec![
            Record::new(lap(1, 0), 0.0),
            Record::new(lap(1, 6), 0.6),
        ]);

        let catalog = LapCatalog::new(&repository);
        assert_eq!(catalog.missing_laps(at(1, 0), at(1, 18)).unwrap(), vec![lap(1, 3)]);
    }

    #[test]
    fn record_error_is_recoverable() {
        let repository = FakeRepository::with_known(&all_laps_but(1, &[9, 12]));
        let collector = FakeCollector::new()
            .failing(at(1, 9), || CollectorError::Record("no data for station 7510".to_string()));
        let service = RecordService::new(&repository, &collector, &collection(None));

        service.update_records(at(1, 23)).unwrap();

        assert_eq!(repository.batches.borrow()[0], vec![Record::new(lap(1, 12), 1.2)]);
    }

    #[test]
    fn fatal_error_aborts_cycle_without_saving() {
        let repository = FakeRepository::with_known(&all_laps_but(1, &[0, 3, 6]));
        let collector = FakeCollector::new()
            .failing(at(1, 3), || CollectorError::InvalidLapDuration(2));
        let service = RecordService::new(&repository, &collector, &collection(None));

        let result = service.update_records(at(1, 23));

        assert!(matches!(result, Err(CycleError::Collector(CollectorError::InvalidLapDuration(2)))));
        assert_eq!(collector.calls.borrow().len(), 2);
        assert!(repository.batches.borrow().is_empty());
    }

    #[test]
    fn stops_after_max_collect_iterations() {
        let repository = FakeRepository::with_known(&all_laps_but(1, &[0, 3, 6]));
        let collector = FakeCollector::new();
        let service = RecordService::new(&repository, &collector, &collection(Some(2)));

        service.update_records(at(1, 23)).unwrap();

        assert_eq!(*collector.calls.borrow(), vec![lap(1, 0), lap(1, 3)]);
        assert_eq!(repository.batches.borrow()[0].len(), 2);
    }

    #[test]
    fn failed_attempts_count_towards_max_collect_iterations() {
        let repository = FakeRepository::with_known(&all_laps_but(1, &[0, 3, 6]));
        let collector = FakeCollector::new()
            .failing(at(1, 0), || CollectorError::Collection("timeout".to_string()));
        let service = RecordService::new(&repository, &collector, &collection(Some(2)));

        service.update_records(at(1, 23)).unwrap();

        assert_eq!(*collector.calls.borrow(), vec![lap(1, 0), lap(1, 3)]);
        assert_eq!(repository.batches.borrow()[0], vec![Record::new(lap(1, 3), 0.3)]);
    }

    #[test]
    fn zero_max_collect_iterations_means_unlimited() {
        let repository = FakeRepository::with_known(&all_laps_but(1, &[0, 3, 6]));
        let collector = FakeCollector::new();
        let service = RecordService::new(&repository, &collector, &collection(Some(0)));

        service.update_records(at(1, 23)).unwrap();

        assert_eq!(collector.calls.borrow().len(), 3);
    }
}
