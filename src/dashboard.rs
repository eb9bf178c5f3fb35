use serde::Serialize;

use crate::{
    aggregate::{self, HourlyTotal, Metrics, StationSummary},
    chart::{BarChart, DonutChart, ScatterChart},
    dataset::Dataset,
    error::Error,
    filter::FilterSelection,
};

/// Everything the hosting UI displays for one [`FilterSelection`]
///
/// The headline metrics and the scatter points come from the filtered
/// samples; the station and hourly breakdowns always come from the full
/// dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub metrics: Metrics,
    pub stations: Vec<StationSummary>,
    pub hours: Vec<HourlyTotal>,
    pub scatter: ScatterChart,
    pub bar: BarChart,
    pub donut: DonutChart,
}

/// Recomputes the whole dashboard from scratch
///
/// Pure function of the dataset and the selection; the host calls it again
/// on every selection change.
pub fn render(dataset: &Dataset, selection: &FilterSelection) -> Result<Dashboard, Error> {
    let filtered = selection.apply(dataset)?;
    let stations = aggregate::station_summary(dataset);
    let hours = aggregate::hourly_totals(dataset);
    let scatter = ScatterChart::new(&filtered, selection);
    let bar = BarChart::from_summary(&stations);
    let donut = DonutChart::from_totals(&hours);
    Ok(Dashboard {
        metrics: Metrics::new(&filtered),
        stations,
        hours,
        scatter,
        bar,
        donut,
    })
}

impl Dashboard {
    /// Prints the text report
    pub fn summary(&self) {
        let value = |x: Option<f64>, unit: &str| match x {
            Some(x) => format!("{:.2} {}", x, unit),
            None => String::from("no data"),
        };
        println!("SUMMARY:");
        println!(" - Max. Energy  : {}", value(self.metrics.energy.max, "W"));
        println!(" - Min. Energy  : {}", value(self.metrics.energy.min, "W"));
        println!(" - Max. Load    : {}", value(self.metrics.load.max, "%"));
        println!(" - Min. Load    : {}", value(self.metrics.load.min, "%"));
        println!(
            " - Max. TX Power: {}",
            value(self.metrics.tx_power.max, "W")
        );
        println!(
            " - Min. TX Power: {}",
            value(self.metrics.tx_power.min, "W")
        );
        if !self.stations.is_empty() {
            println!(" - Average energy and load per base station:");
            println!(
                "    {:^16}  {:^12}  {:^12}  {:^10}",
                "BS", "ENERGY [W]", "LOAD [%]", "LEVEL"
            );
            for row in &self.stations {
                println!(
                    "  - {:16}  {:>12.3}  {:>12.3}  {:>10}",
                    row.station,
                    row.mean_energy,
                    row.mean_load,
                    row.category
                        .map_or_else(|| String::from("no data"), |category| category.to_string()),
                );
            }
        }
        if !self.hours.is_empty() {
            println!(" - Energy share per hour:");
            println!("    {:^7}  {:^14}  {:^7}", "HOUR", "ENERGY [W]", "SHARE");
            for (hour, slice) in self.hours.iter().zip(&self.donut.slices) {
                println!(
                    "  - {:^7}  {:>14.3}  {:>6.1}%",
                    hour.label,
                    hour.total_energy,
                    100. * slice.share,
                );
            }
        }
    }
}
