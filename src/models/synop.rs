use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

/// Value used by Météo-France for a measurement that is missing
pub const MISSING_SENTINEL: &str = "mq";

/// Date format used in the `date` column of SYNOP files
pub const SYNOP_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// A raw SYNOP dataset, i.e. one `;` separated file holding one row per station
/// for a given observation time. All columns are kept as text so that the
/// dataset can be stored exactly as received.
#[derive(Clone, Debug, PartialEq)]
pub struct SynopDataset {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl SynopDataset {
    /// Parses a SYNOP csv document
    ///
    /// # Arguments
    ///
    /// * 'text' - the document as received from upstream
    pub fn from_csv(text: &str) -> Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = rdr.headers()?.clone();
        let mut rows = Vec::new();
        for result in rdr.records() {
            rows.push(result?);
        }

        Ok(Self { headers, rows })
    }

    /// Serializes the dataset back to a `;` separated document
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = WriterBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_writer(Vec::new());

        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }

        wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
    }

    /// Replaces every missing data marker with zero
    pub fn normalize_missing(&mut self) {
        self.rows = self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| if v.trim() == MISSING_SENTINEL { "0" } else { v })
                    .collect::<StringRecord>()
            })
            .collect();
    }

    /// Overwrites the `date` column of every row, appending the column if the
    /// dataset doesn't have one
    ///
    /// # Arguments
    ///
    /// * 'date_time' - the observation time to set
    pub fn set_date(&mut self, date_time: NaiveDateTime) {
        let date = date_time.format(SYNOP_DATE_FORMAT).to_string();

        let idx = match self.column("date") {
            Some(idx) => idx,
            None => {
                self.headers.push_field("date");
                self.headers.len() - 1
            }
        };

        self.rows = self.rows
            .iter()
            .map(|row| {
                let mut fields: Vec<&str> = row.iter().collect();
                if fields.len() <= idx {
                    fields.resize(idx + 1, "");
                }
                fields[idx] = date.as_str();
                fields.into_iter().collect::<StringRecord>()
            })
            .collect();
    }

    /// Returns the index of the named column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Returns the first row reported by the given station
    ///
    /// # Arguments
    ///
    /// * 'station_id' - WMO station number as found in the `numer_sta` column
    pub fn station_row(&self, station_id: u32) -> Option<&StringRecord> {
        let idx = self.column("numer_sta")?;

        self.rows.iter().find(|row| {
            row.get(idx)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .is_some_and(|id| id == station_id)
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
