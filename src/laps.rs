use std::collections::HashSet;
use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use log::debug;
use crate::errors::StorageError;
use crate::models::lap::{Lap, ANCHOR_HOURS, MF_LAP_DURATION};
use crate::traits::LapRepository;

/// Format of the timestamp part of a stored record identifier
pub const IDENTIFIER_FORMAT: &str = "%Y-%m-%d-%H";

/// File suffix of stored record identifiers
pub const RECORD_SUFFIX: &str = ".json";

/// Answers which laps are already stored and which are missing
pub struct LapCatalog<'a, R: LapRepository> {
    repository: &'a R,
}

impl<'a, R: LapRepository> LapCatalog<'a, R> {
    /// Returns a new LapCatalog backed by the given repository
    ///
    /// # Arguments
    ///
    /// * 'repository' - storage listing known record identifiers
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Returns stored laps starting at or after the given time, in ascending order.
    ///
    /// Identifiers encode the end of a lap, so the lap duration is subtracted to get
    /// its start. Identifiers that don't parse are not records and are skipped.
    ///
    /// # Arguments
    ///
    /// * 'since' - earliest lap start to include
    pub fn get_available_laps_since(&self, since: NaiveDateTime) -> Result<Vec<Lap>, StorageError> {
        let mut laps = self.repository
            .list_known_identifiers()?
            .iter()
            .filter_map(|id| parse_identifier(id))
            .map(|end| Lap::new(end - TimeDelta::hours(MF_LAP_DURATION as i64), MF_LAP_DURATION))
            .filter(|lap| lap.start_time >= since)
            .collect::<Vec<Lap>>();

        laps.sort();

        Ok(laps)
    }

    /// Returns laps within the given range that are not yet stored.
    ///
    /// Known laps are read from midnight of the range start since that is where
    /// the scan for missing laps begins.
    ///
    /// # Arguments
    ///
    /// * 'start_time' - start of the range
    /// * 'end_time' - end of the range, inclusive
    pub fn missing_laps(&self, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Result<Vec<Lap>, StorageError> {
        let known = self.get_available_laps_since(midnight(start_time))?;
        debug!("{} laps already stored since {}", known.len(), midnight(start_time));

        Ok(get_missing_laps(start_time, end_time, &known))
    }
}

/// Returns every anchor aligned lap between midnight of `start_time`'s day and
/// `end_time` (inclusive) that is not among the known laps, in ascending order.
///
/// Known laps are matched on start time only, so a known lap that isn't anchor
/// aligned simply never matches. A reversed range gives no laps.
///
/// # Arguments
///
/// * 'start_time' - start of the range, the scan starts at midnight that day
/// * 'end_time' - end of the range, inclusive
/// * 'known_laps' - laps already collected
pub fn get_missing_laps(start_time: NaiveDateTime, end_time: NaiveDateTime, known_laps: &[Lap]) -> Vec<Lap> {
    if end_time < start_time {
        return Vec::new();
    }

    let known = known_laps
        .iter()
        .map(|l| l.start_time)
        .collect::<HashSet<NaiveDateTime>>();

    let step = TimeDelta::hours(MF_LAP_DURATION as i64);
    let mut missing: Vec<Lap> = Vec::new();
    let mut current = midnight(start_time);

    while current <= end_time {
        if ANCHOR_HOURS.contains(&current.hour()) && !known.contains(&current) {
            missing.push(Lap::new(current, MF_LAP_DURATION));
        }
        current += step;
    }

    missing
}

/// Parses a record identifier such as `2021-01-01-03.json` into the timestamp it encodes
///
/// # Arguments
///
/// * 'identifier' - file name of a stored record
pub fn parse_identifier(identifier: &str) -> Option<NaiveDateTime> {
    let stem = identifier.strip_suffix(RECORD_SUFFIX)?;

    NaiveDateTime::parse_from_str(&format!("{}:00", stem), &format!("{}:%M", IDENTIFIER_FORMAT)).ok()
}

/// Builds the identifier a record is stored under, i.e. the end of its lap
///
/// # Arguments
///
/// * 'lap' - the lap to build an identifier for
pub fn lap_identifier(lap: &Lap) -> String {
    format!("{}{}", lap.end_time().format(IDENTIFIER_FORMAT), RECORD_SUFFIX)
}

fn midnight(date_time: NaiveDateTime) -> NaiveDateTime {
    date_time.date().and_time(NaiveTime::MIN)
}
