use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use flate2::read::GzDecoder;
use regex::Regex;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufReader, Read},
    ops::Deref,
    path::Path,
    time::Instant,
};

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("Failed to open the dataset file")]
    Io(#[from] std::io::Error),
    #[error("Failed to deserialize the CSV file")]
    Csv(#[from] csv::Error),
    #[error("Required column `{0}` is missing")]
    MissingColumn(String),
    #[error("Unparseable timestamp `{1}` at row {0}")]
    Timestamp(usize, String),
    #[error("Invalid station filter regular expression")]
    Regex(#[from] regex::Error),
}
type Result<T> = std::result::Result<T, DatasetError>;

/// Columns the dataset file must carry
pub const REQUIRED_COLUMNS: [&str; 5] = ["Time", "BS", "Energy", "load", "TXpower"];

/// Accepted timestamp formats, tried in order; `%Y%m%d %H%M%S` is the raw
/// dataset format
const TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%d %H%M%S",
];

/// Parse a `Time` cell against the accepted formats
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[derive(Deserialize, Debug)]
struct Record {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "BS")]
    bs: String,
    #[serde(rename = "Energy")]
    energy: Option<f64>,
    #[serde(rename = "load")]
    load: Option<f64>,
    #[serde(rename = "TXpower")]
    tx_power: Option<f64>,
}

/// A single (base station, timestamp) energy measurement
///
/// The numeric columns are nullable: an empty CSV cell reads as `None` and
/// is skipped by every aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub station: String,
    pub time: NaiveDateTime,
    /// Energy consumption [W]
    pub energy: Option<f64>,
    /// Load [%]
    pub load: Option<f64>,
    /// Transmission power [W]
    pub tx_power: Option<f64>,
}
impl Sample {
    /// Hour of day in the 0-23 range
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }
    /// English day name
    pub fn day_of_week(&self) -> &'static str {
        match self.time.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

/// The full measurement table, in file order
///
/// Filtering and aggregation always derive fresh values; the loaded table
/// itself is never mutated.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset(Vec<Sample>);
impl Deref for Dataset {
    type Target = Vec<Sample>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl From<Vec<Sample>> for Dataset {
    fn from(samples: Vec<Sample>) -> Self {
        Self(samples)
    }
}
impl Dataset {
    pub fn loader() -> DatasetLoader {
        DatasetLoader::default()
    }
    /// Iterator over the non-null values of the `Energy` column
    pub fn energies(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().filter_map(|sample| sample.energy)
    }
    /// Iterator over the non-null values of the `load` column
    pub fn loads(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().filter_map(|sample| sample.load)
    }
    /// Iterator over the non-null values of the `TXpower` column
    pub fn tx_powers(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().filter_map(|sample| sample.tx_power)
    }
}

/// Dataset file reader
///
/// Checks the expected columns are present and parses the timestamps up
/// front; the load is all-or-nothing and fails on the first invalid row.
pub struct DatasetLoader {
    path: String,
    station_regex: Option<String>,
}
impl Default for DatasetLoader {
    fn default() -> Self {
        Self {
            path: String::from("5G_energy_consumption_dataset.csv"),
            station_regex: None,
        }
    }
}
impl DatasetLoader {
    pub fn data_path<S: AsRef<Path>>(self, data_path: S) -> Self {
        Self {
            path: data_path.as_ref().to_string_lossy().into_owned(),
            ..self
        }
    }
    /// Keeps only the rows whose `BS` matches the regular expression
    pub fn station_filter<S: Into<String>>(self, station_regex: S) -> Self {
        Self {
            station_regex: Some(station_regex.into()),
            ..self
        }
    }
    fn contents(&self) -> Result<String> {
        let mut contents = String::new();
        let csv_file = File::open(&self.path)?;
        if self.path.ends_with(".gz") {
            GzDecoder::new(csv_file).read_to_string(&mut contents)?;
        } else {
            BufReader::new(csv_file).read_to_string(&mut contents)?;
        }
        Ok(contents)
    }
    pub fn load(self) -> Result<Dataset> {
        let now = Instant::now();
        log::info!("Loading {} ...", self.path);
        let contents = self.contents()?;
        let dataset = self.parse(&contents)?;
        log::info!(
            "... {} samples loaded in {}ms",
            dataset.len(),
            now.elapsed().as_millis()
        );
        Ok(dataset)
    }
    fn parse(&self, contents: &str) -> Result<Dataset> {
        let mut rdr = csv::Reader::from_reader(contents.as_bytes());
        {
            let headers = rdr.headers()?;
            for column in REQUIRED_COLUMNS {
                if !headers.iter().any(|header| header == column) {
                    return Err(DatasetError::MissingColumn(column.to_string()));
                }
            }
        }
        let re_station = match &self.station_regex {
            Some(regex) => Some(Regex::new(regex)?),
            None => None,
        };
        let mut samples = vec![];
        for (k, result) in rdr.deserialize().enumerate() {
            let record: Record = result?;
            if let Some(re_station) = &re_station {
                if !re_station.is_match(&record.bs) {
                    continue;
                }
            }
            // row 1 is the header
            let time = parse_timestamp(&record.time)
                .ok_or_else(|| DatasetError::Timestamp(k + 2, record.time.clone()))?;
            samples.push(Sample {
                station: record.bs,
                time,
                energy: record.energy,
                load: record.load,
                tx_power: record.tx_power,
            });
        }
        Ok(Dataset(samples))
    }
}
