//! 5G base station energy consumption dashboard
//!
//! Loads a CSV of (base station, timestamp) energy samples and derives the
//! data behind the dashboard displays: headline metrics, an energy vs. load
//! scatter, the average energy per station and the energy share per hour.

pub mod aggregate;
pub mod chart;
pub mod dashboard;
pub mod dataset;
mod error;
pub mod filter;

pub use dashboard::{render, Dashboard};
pub use dataset::{Dataset, DatasetError, DatasetLoader, Sample};
pub use error::Error;
pub use filter::{Field, FilterError, FilterSelection, HourRange};
