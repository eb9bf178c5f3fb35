use serde::Serialize;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt,
};

use crate::dataset::Dataset;

/// Min/max bounds of a column, `None` over an empty or all-null column
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}
impl Bounds {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(Self::default(), |bounds, value| Self {
            min: Some(bounds.min.map_or(value, |min| min.min(value))),
            max: Some(bounds.max.map_or(value, |max| max.max(value))),
        })
    }
}

/// Headline dashboard metrics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Metrics {
    /// Energy consumption bounds [W]
    pub energy: Bounds,
    /// Load bounds [%]
    pub load: Bounds,
    /// Transmission power bounds [W]
    pub tx_power: Bounds,
}
impl Metrics {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            energy: Bounds::of(dataset.energies()),
            load: Bounds::of(dataset.loads()),
            tx_power: Bounds::of(dataset.tx_powers()),
        }
    }
}

/// Load regime of a station, split at a 50% mean load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadCategory {
    #[serde(rename = "Low Load")]
    Low,
    #[serde(rename = "High Load")]
    High,
}
impl LoadCategory {
    /// Bin edges are [0, 50, 100] with the boundary value 50 falling in the
    /// low bin; an all-null group has a NaN mean and no category
    pub fn classify(mean_load: f64) -> Option<Self> {
        if mean_load.is_nan() {
            None
        } else if mean_load <= 50. {
            Some(LoadCategory::Low)
        } else {
            Some(LoadCategory::High)
        }
    }
}
impl fmt::Display for LoadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadCategory::Low => write!(f, "Low Load"),
            LoadCategory::High => write!(f, "High Load"),
        }
    }
}

/// Mean energy and load of a single station
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    #[serde(rename = "BS")]
    pub station: String,
    /// Mean energy consumption [W], NaN when every sample is null
    pub mean_energy: f64,
    /// Mean load [%], NaN when every sample is null
    pub mean_load: f64,
    pub category: Option<LoadCategory>,
}

/// Per-station means over the full dataset, highest mean energy first
///
/// The sort is stable: stations with equal mean energy keep their
/// first-seen order.
pub fn station_summary(dataset: &Dataset) -> Vec<StationSummary> {
    #[derive(Default)]
    struct Acc {
        energy: (usize, f64),
        load: (usize, f64),
    }
    let mut order: Vec<&str> = vec![];
    let mut groups: HashMap<&str, Acc> = HashMap::new();
    for sample in dataset.iter() {
        let station = sample.station.as_str();
        let acc = groups.entry(station).or_insert_with(|| {
            order.push(station);
            Acc::default()
        });
        if let Some(value) = sample.energy {
            acc.energy.0 += 1;
            acc.energy.1 += value;
        }
        if let Some(value) = sample.load {
            acc.load.0 += 1;
            acc.load.1 += value;
        }
    }
    let mut summary: Vec<_> = order
        .into_iter()
        .map(|station| {
            let acc = &groups[station];
            let mean_energy = acc.energy.1 / acc.energy.0 as f64;
            let mean_load = acc.load.1 / acc.load.0 as f64;
            StationSummary {
                station: station.to_string(),
                mean_energy,
                mean_load,
                category: LoadCategory::classify(mean_load),
            }
        })
        .collect();
    summary.sort_by(|a, b| {
        b.mean_energy
            .partial_cmp(&a.mean_energy)
            .unwrap_or(Ordering::Equal)
    });
    summary
}

/// Energy sum of one hour-of-day bucket
#[derive(Debug, Clone, Serialize)]
pub struct HourlyTotal {
    pub hour: u32,
    /// Zero-padded `HH:00` display label
    pub label: String,
    /// Total energy consumption [W]
    pub total_energy: f64,
}

/// Total energy per hour of day over the full dataset
///
/// Only the hours present in the data appear, in ascending hour order; the
/// per-hour sums add up to the energy sum of the whole dataset.
pub fn hourly_totals(dataset: &Dataset) -> Vec<HourlyTotal> {
    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for sample in dataset.iter() {
        let total = totals.entry(sample.hour()).or_insert(0.);
        if let Some(energy) = sample.energy {
            *total += energy;
        }
    }
    totals
        .into_iter()
        .map(|(hour, total_energy)| HourlyTotal {
            hour,
            label: format!("{:02}:00", hour),
            total_energy,
        })
        .collect()
}
