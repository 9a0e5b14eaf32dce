use std::cmp::Ordering;
use std::fmt;
use std::fmt::Formatter;
use std::hash::{Hash, Hasher};
use chrono::{NaiveDateTime, TimeDelta};

/// Duration in hours of the laps published by Météo-France SYNOP files
pub const MF_LAP_DURATION: u32 = 3;

/// Hours of the day at which a lap may start
pub const ANCHOR_HOURS: [u32; 8] = [0, 3, 6, 9, 12, 15, 18, 21];

/// A fixed duration observation window identified by its start time.
///
/// Identity, hashing and ordering only consider `start_time`, so a lap can be looked
/// up among known laps regardless of the duration it was stored with.
#[derive(Clone, Copy, Debug)]
pub struct Lap {
    pub start_time: NaiveDateTime,
    pub duration_hours: u32,
}

impl Lap {
    /// Returns a new Lap
    ///
    /// # Arguments
    ///
    /// * 'start_time' - start of the observation window
    /// * 'duration_hours' - length of the window in hours
    pub fn new(start_time: NaiveDateTime, duration_hours: u32) -> Self {
        Self { start_time, duration_hours }
    }

    /// Returns the end of the observation window, which is also the time the
    /// upstream source publishes its data under
    pub fn end_time(&self) -> NaiveDateTime {
        self.start_time + TimeDelta::hours(self.duration_hours as i64)
    }
}

impl PartialEq for Lap {
    fn eq(&self, other: &Self) -> bool {
        self.start_time == other.start_time
    }
}

impl Eq for Lap {}

impl PartialEq<NaiveDateTime> for Lap {
    fn eq(&self, other: &NaiveDateTime) -> bool {
        self.start_time == *other
    }
}

impl Hash for Lap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start_time.hash(state);
    }
}

impl PartialOrd for Lap {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lap {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start_time.cmp(&other.start_time)
    }
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Lap {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Lap {} ({}h)", self.start_time.format("%Y-%m-%d %H:%M"), self.duration_hours)
    }
}
