use std::hash::{Hash, Hasher};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::models::lap::Lap;

/// A completed rainfall observation for one lap
#[derive(Clone, Copy, Debug)]
pub struct Record {
    pub lap: Lap,
    pub rainfall_mm: f64,
}

impl Record {
    pub fn new(lap: Lap, rainfall_mm: f64) -> Self {
        Self { lap, rainfall_mm }
    }
}

/// Records are deduplicated by lap, the measured value is not part of identity
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.lap == other.lap
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lap.hash(state);
    }
}

/// Flat form of a record as written to storage
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct RecordRow {
    pub start_time: NaiveDateTime,
    pub duration_hours: u32,
    pub rainfall_mm: f64,
}

impl From<&Record> for RecordRow {
    fn from(record: &Record) -> Self {
        RecordRow {
            start_time: record.lap.start_time,
            duration_hours: record.lap.duration_hours,
            rainfall_mm: record.rainfall_mm,
        }
    }
}
