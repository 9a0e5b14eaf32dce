use chrono::{DurationRound, NaiveDateTime, TimeDelta};
use csv::StringRecord;
use crate::errors::CollectorError;
use crate::models::lap::Lap;
use crate::models::record::Record;
use crate::models::synop::{SynopDataset, SYNOP_DATE_FORMAT};

/// Returns the SYNOP column holding rainfall accumulated over the given duration
///
/// # Arguments
///
/// * 'lap_duration_hr' - accumulation duration in hours
pub fn rainfall_column(lap_duration_hr: u32) -> Result<&'static str, CollectorError> {
    match lap_duration_hr {
        1 => Ok("rr1"),
        3 => Ok("rr3"),
        6 => Ok("rr6"),
        12 => Ok("rr12"),
        24 => Ok("rr24"),
        _ => Err(CollectorError::InvalidLapDuration(lap_duration_hr)),
    }
}

/// Builds a record from a normalized SYNOP dataset.
///
/// The dataset `date` column holds the end of the observation window, so the lap
/// starts `lap_duration_hr` hours earlier. Negative values (traces) count as zero.
///
/// # Arguments
///
/// * 'dataset' - dataset with missing markers already replaced
/// * 'station_id' - the station to extract
/// * 'lap_duration_hr' - rainfall accumulation duration to extract
pub fn record_from_dataset(dataset: &SynopDataset, station_id: u32, lap_duration_hr: u32) -> Result<Record, CollectorError> {
    let column = rainfall_column(lap_duration_hr)?;

    let row = dataset
        .station_row(station_id)
        .ok_or_else(|| CollectorError::Record(format!("no data for station {}", station_id)))?;

    let date = NaiveDateTime::parse_from_str(field(dataset, row, "date", station_id)?, SYNOP_DATE_FORMAT)
        .map_err(|e| CollectorError::Record(format!("invalid date: {}", e)))?
        .duration_trunc(TimeDelta::hours(1))
        .map_err(|e| CollectorError::Record(format!("invalid date: {}", e)))?;

    let rainfall_mm = field(dataset, row, column, station_id)?
        .parse::<f64>()
        .map_err(|e| CollectorError::Record(format!("invalid {} value: {}", column, e)))?;

    let start_time = date - TimeDelta::hours(lap_duration_hr as i64);

    Ok(Record::new(Lap::new(start_time, lap_duration_hr), rainfall_mm.max(0.0)))
}

fn field<'d>(dataset: &'d SynopDataset, row: &'d StringRecord, name: &str, station_id: u32) -> Result<&'d str, CollectorError> {
    dataset.column(name)
        .and_then(|idx| row.get(idx))
        .map(|v| v.trim())
        .ok_or_else(|| CollectorError::Record(format!("no {} value for station {}", name, station_id)))
}
