use serde::Serialize;
use std::{fmt, str::FromStr};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::dataset::{Dataset, Sample};

#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("Hour range is reversed: {0} > {1}")]
    ReversedRange(u32, u32),
    #[error("Hour {0} is out of the 0-23 range")]
    HourOutOfRange(u32),
    #[error("Unknown field `{0}`")]
    UnknownField(String),
    #[error("Field `{0}` cannot encode the chart {1}")]
    Role(Field, &'static str),
}
type Result<T> = std::result::Result<T, FilterError>;

/// Dashboard data columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Serialize)]
pub enum Field {
    #[serde(rename = "BS")]
    Bs,
    Time,
    Energy,
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "TXpower")]
    TxPower,
}
impl Field {
    /// Fields that group or label samples
    pub fn is_categorical(self) -> bool {
        matches!(self, Field::Bs | Field::Time)
    }
    /// Fields carrying a measured value
    pub fn is_numeric(self) -> bool {
        !self.is_categorical()
    }
    /// Value of a numeric field for a given sample
    pub fn value(self, sample: &Sample) -> Option<f64> {
        match self {
            Field::Energy => sample.energy,
            Field::Load => sample.load,
            Field::TxPower => sample.tx_power,
            Field::Bs | Field::Time => None,
        }
    }
    /// The category encoding option set
    pub fn categorical() -> impl Iterator<Item = Field> {
        Field::iter().filter(|field| field.is_categorical())
    }
    /// The color and size encoding option set
    pub fn numeric() -> impl Iterator<Item = Field> {
        Field::iter().filter(|field| field.is_numeric())
    }
}
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Bs => write!(f, "BS"),
            Field::Time => write!(f, "Time"),
            Field::Energy => write!(f, "Energy"),
            Field::Load => write!(f, "load"),
            Field::TxPower => write!(f, "TXpower"),
        }
    }
}
impl FromStr for Field {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BS" | "bs" => Ok(Field::Bs),
            "Time" | "time" => Ok(Field::Time),
            "Energy" | "energy" => Ok(Field::Energy),
            "load" | "Load" => Ok(Field::Load),
            "TXpower" | "txpower" => Ok(Field::TxPower),
            _ => Err(FilterError::UnknownField(s.to_string())),
        }
    }
}

/// Inclusive hour-of-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourRange {
    lo: u32,
    hi: u32,
}
impl Default for HourRange {
    fn default() -> Self {
        Self { lo: 0, hi: 23 }
    }
}
impl HourRange {
    /// Both bounds are inclusive; a reversed pair is rejected rather than
    /// silently swapped
    pub fn new(lo: u32, hi: u32) -> Result<Self> {
        if hi > 23 {
            return Err(FilterError::HourOutOfRange(hi));
        }
        if lo > hi {
            return Err(FilterError::ReversedRange(lo, hi));
        }
        Ok(Self { lo, hi })
    }
    pub fn contains(&self, hour: u32) -> bool {
        self.lo <= hour && hour <= self.hi
    }
    pub fn bounds(&self) -> (u32, u32) {
        (self.lo, self.hi)
    }
}

/// User-selected time filter and chart encodings
///
/// The time filter drives the headline metrics and the scatter chart only;
/// the per-station and per-hour breakdowns always read the full dataset.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FilterSelection {
    pub time_filter: Option<HourRange>,
    pub category: Option<Field>,
    pub color: Option<Field>,
    pub size: Option<Field>,
}
impl FilterSelection {
    /// Checks each encoding against the role it is selected for
    ///
    /// Selectors built from the [`Field`] option sets cannot fail this.
    pub fn validate(&self) -> Result<()> {
        if let Some(field) = self.category {
            if !field.is_categorical() {
                return Err(FilterError::Role(field, "category"));
            }
        }
        for (field, role) in [(self.color, "color"), (self.size, "size")] {
            if let Some(field) = field {
                if !field.is_numeric() {
                    return Err(FilterError::Role(field, role));
                }
            }
        }
        Ok(())
    }
    /// The row subset matching the hour range, or the full dataset when the
    /// time filter is off
    ///
    /// An empty subset is a valid outcome, not an error.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        self.validate()?;
        match self.time_filter {
            None => Ok(dataset.clone()),
            Some(range) => Ok(dataset
                .iter()
                .filter(|sample| range.contains(sample.hour()))
                .cloned()
                .collect::<Vec<_>>()
                .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_timestamp;

    fn sample(station: &str, time: &str, energy: f64) -> Sample {
        Sample {
            station: station.to_string(),
            time: parse_timestamp(time).unwrap(),
            energy: Some(energy),
            load: Some(50.),
            tx_power: Some(5.),
        }
    }

    fn dataset() -> Dataset {
        vec![
            sample("A", "2023-01-01T10:00", 10.),
            sample("A", "2023-01-01T14:00", 20.),
            sample("B", "2023-01-02T03:00", 30.),
        ]
        .into()
    }

    #[test]
    fn no_time_filter_is_the_identity() {
        let dataset = dataset();
        let filtered = FilterSelection::default().apply(&dataset).unwrap();
        assert_eq!(filtered, dataset);
    }

    #[test]
    fn hour_range_is_inclusive() {
        let dataset = dataset();
        let selection = FilterSelection {
            time_filter: Some(HourRange::new(9, 11).unwrap()),
            ..Default::default()
        };
        let filtered = selection.apply(&dataset).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].hour(), 10);
        let selection = FilterSelection {
            time_filter: Some(HourRange::new(10, 14).unwrap()),
            ..Default::default()
        };
        assert_eq!(selection.apply(&dataset).unwrap().len(), 2);
    }

    #[test]
    fn filtered_rows_satisfy_the_predicate() {
        let dataset = dataset();
        let range = HourRange::new(3, 10).unwrap();
        let selection = FilterSelection {
            time_filter: Some(range),
            ..Default::default()
        };
        let filtered = selection.apply(&dataset).unwrap();
        assert!(filtered.len() <= dataset.len());
        assert!(filtered.iter().all(|sample| range.contains(sample.hour())));
    }

    #[test]
    fn empty_match_is_not_an_error() {
        let dataset = dataset();
        let selection = FilterSelection {
            time_filter: Some(HourRange::new(0, 1).unwrap()),
            ..Default::default()
        };
        assert!(selection.apply(&dataset).unwrap().is_empty());
    }

    #[test]
    fn reversed_range_is_rejected() {
        match HourRange::new(11, 9) {
            Err(FilterError::ReversedRange(11, 9)) => (),
            other => panic!("expected a reversed range error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        assert!(matches!(
            HourRange::new(0, 24),
            Err(FilterError::HourOutOfRange(24))
        ));
    }

    #[test]
    fn unknown_field() {
        match "RSRP".parse::<Field>() {
            Err(FilterError::UnknownField(name)) => assert_eq!(name, "RSRP"),
            other => panic!("expected an unknown field error, got {other:?}"),
        }
    }

    #[test]
    fn encoding_roles() {
        let selection = FilterSelection {
            color: Some(Field::Bs),
            ..Default::default()
        };
        assert!(matches!(
            selection.validate(),
            Err(FilterError::Role(Field::Bs, "color"))
        ));
        let selection = FilterSelection {
            category: Some(Field::Energy),
            ..Default::default()
        };
        assert!(matches!(
            selection.validate(),
            Err(FilterError::Role(Field::Energy, "category"))
        ));
        let selection = FilterSelection {
            category: Some(Field::Bs),
            color: Some(Field::Energy),
            size: Some(Field::TxPower),
            ..Default::default()
        };
        assert!(selection.validate().is_ok());
    }

    #[test]
    fn field_option_sets() {
        let categorical: Vec<_> = Field::categorical().collect();
        assert_eq!(categorical, vec![Field::Bs, Field::Time]);
        let numeric: Vec<_> = Field::numeric().collect();
        assert_eq!(numeric, vec![Field::Energy, Field::Load, Field::TxPower]);
    }

    #[test]
    fn column_names_round_trip() {
        for field in Field::iter() {
            assert_eq!(field.to_string().parse::<Field>().unwrap(), field);
        }
    }
}
