#[cfg(feature = "plot")]
use itertools::{Itertools, MinMaxResult};
#[cfg(feature = "plot")]
use plotters::prelude::*;
use serde::Serialize;

use crate::{
    aggregate::{HourlyTotal, LoadCategory, StationSummary},
    dataset::Dataset,
    filter::{Field, FilterSelection},
};

/// A single scatter point with its hover payload
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    pub time: String,
    #[serde(rename = "BS")]
    pub station: String,
    #[serde(rename = "TXpower")]
    pub tx_power: Option<f64>,
}

/// Energy vs. load scatter specification
///
/// Samples with a null energy or load have no position and are left out;
/// `None` encodings pass through to the renderer as "no encoding applied".
#[derive(Debug, Clone, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x: Field,
    pub y: Field,
    pub color: Option<Field>,
    pub size: Option<Field>,
    pub points: Vec<ScatterPoint>,
}
impl ScatterChart {
    pub fn new(dataset: &Dataset, selection: &FilterSelection) -> Self {
        let points = dataset
            .iter()
            .filter_map(|sample| {
                let (x, y) = (sample.energy?, sample.load?);
                Some(ScatterPoint {
                    x,
                    y,
                    color: selection.color.and_then(|field| field.value(sample)),
                    size: selection.size.and_then(|field| field.value(sample)),
                    time: sample.time.format("%Y-%m-%d %H:%M:%S").to_string(),
                    station: sample.station.clone(),
                    tx_power: sample.tx_power,
                })
            })
            .collect();
        Self {
            title: String::from("Energy Consumption vs Load with Color and Size Filtering"),
            x: Field::Energy,
            y: Field::Load,
            color: selection.color,
            size: selection.size,
            points,
        }
    }
}

/// One bar of the per-station chart
#[derive(Debug, Clone, Serialize)]
pub struct StationBar {
    #[serde(rename = "BS")]
    pub station: String,
    pub mean_energy: f64,
    pub category: Option<LoadCategory>,
}

/// Average energy per station, colored by load regime
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<StationBar>,
}
impl BarChart {
    pub fn from_summary(summary: &[StationSummary]) -> Self {
        Self {
            title: String::from(
                "Average Energy Consumption by Base Station (Colored by Load Level)",
            ),
            bars: summary
                .iter()
                .map(|row| StationBar {
                    station: row.station.clone(),
                    mean_energy: row.mean_energy,
                    category: row.category,
                })
                .collect(),
        }
    }
}

/// One slice of the hourly donut
#[derive(Debug, Clone, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
    pub share: f64,
}

/// Energy share per hour of day
#[derive(Debug, Clone, Serialize)]
pub struct DonutChart {
    pub title: String,
    /// Hole radius as a fraction of the outer radius
    pub hole: f64,
    pub slices: Vec<Slice>,
}
impl DonutChart {
    pub fn from_totals(totals: &[HourlyTotal]) -> Self {
        let total: f64 = totals.iter().map(|total| total.total_energy).sum();
        Self {
            title: String::from("Energy Consumption Share by Hour of Day"),
            hole: 0.4,
            slices: totals
                .iter()
                .map(|hour| Slice {
                    label: hour.label.clone(),
                    value: hour.total_energy,
                    share: if total > 0. {
                        hour.total_energy / total
                    } else {
                        0.
                    },
                })
                .collect(),
        }
    }
}

#[cfg(feature = "plot")]
fn axis_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    match values.minmax() {
        MinMaxResult::NoElements => 0f64..1f64,
        MinMaxResult::OneElement(value) => (value - 1.)..(value + 1.),
        MinMaxResult::MinMax(lo, hi) => {
            let pad = (hi - lo).max(f64::EPSILON) * 5e-2;
            (lo - pad)..(hi + pad)
        }
    }
}

#[cfg(feature = "plot")]
fn tableau(k: usize) -> RGBColor {
    let color = colorous::TABLEAU10[k % colorous::TABLEAU10.len()];
    RGBColor(color.r, color.g, color.b)
}

#[cfg(feature = "plot")]
impl ScatterChart {
    /// Writes the scatter chart to an SVG file
    pub fn plot<P: AsRef<std::path::Path>>(&self, path: P) {
        let plot = SVGBackend::new(path.as_ref(), (768, 512)).into_drawing_area();
        plot.fill(&WHITE).unwrap();

        let mut chart = ChartBuilder::on(&plot)
            .caption(&self.title, ("sans-serif", 16))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .margin(10)
            .build_cartesian_2d(
                axis_range(self.points.iter().map(|point| point.x)),
                axis_range(self.points.iter().map(|point| point.y)),
            )
            .unwrap();
        chart
            .configure_mesh()
            .x_desc("Energy [W]")
            .y_desc("Load [%]")
            .draw()
            .unwrap();

        let color_range = axis_range(self.points.iter().filter_map(|point| point.color));
        let size_range = axis_range(self.points.iter().filter_map(|point| point.size));
        chart
            .draw_series(self.points.iter().map(|point| {
                let rgb = match point.color {
                    Some(value) => {
                        let t = (value - color_range.start) / (color_range.end - color_range.start);
                        let color = colorous::VIRIDIS.eval_continuous(t.clamp(0., 1.));
                        RGBColor(color.r, color.g, color.b)
                    }
                    None => tableau(0),
                };
                let radius = match point.size {
                    Some(value) => {
                        let t = (value - size_range.start) / (size_range.end - size_range.start);
                        2. + 13. * t.clamp(0., 1.)
                    }
                    None => 3.,
                };
                Circle::new((point.x, point.y), radius as i32, rgb.mix(0.7).filled())
            }))
            .unwrap();
    }
}

#[cfg(feature = "plot")]
impl BarChart {
    /// Writes the bar chart to an SVG file
    pub fn plot<P: AsRef<std::path::Path>>(&self, path: P) {
        let y_max = self
            .bars
            .iter()
            .map(|bar| bar.mean_energy)
            .filter(|mean| !mean.is_nan())
            .fold(f64::NEG_INFINITY, f64::max);
        if !y_max.is_finite() || y_max <= 0. {
            return;
        }
        let plot = SVGBackend::new(path.as_ref(), (768, 512)).into_drawing_area();
        plot.fill(&WHITE).unwrap();

        let mut chart = ChartBuilder::on(&plot)
            .caption(&self.title, ("sans-serif", 16))
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 60)
            .margin(10)
            .build_cartesian_2d(0f64..self.bars.len() as f64, 0f64..y_max * 1.05)
            .unwrap();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(self.bars.len())
            .x_label_formatter(&|x| {
                self.bars
                    .get(x.floor() as usize)
                    .map(|bar| bar.station.clone())
                    .unwrap_or_default()
            })
            .x_desc("Base Station")
            .y_desc("Average Energy [W]")
            .draw()
            .unwrap();

        chart
            .draw_series(
                self.bars
                    .iter()
                    .enumerate()
                    .filter(|(_, bar)| !bar.mean_energy.is_nan())
                    .map(|(k, bar)| {
                        let rgb = match bar.category {
                            Some(LoadCategory::Low) => GREEN,
                            Some(LoadCategory::High) => RED,
                            None => RGBColor(128, 128, 128),
                        };
                        let x = k as f64;
                        Rectangle::new([(x + 0.1, 0.), (x + 0.9, bar.mean_energy)], rgb.filled())
                    }),
            )
            .unwrap();
    }
}

#[cfg(feature = "plot")]
impl DonutChart {
    /// Writes the donut chart to an SVG file
    pub fn plot<P: AsRef<std::path::Path>>(&self, path: P) {
        let total: f64 = self.slices.iter().map(|slice| slice.value).sum();
        if total <= 0. {
            return;
        }
        let plot = SVGBackend::new(path.as_ref(), (640, 640)).into_drawing_area();
        plot.fill(&WHITE).unwrap();

        let mut chart = ChartBuilder::on(&plot)
            .caption(&self.title, ("sans-serif", 16))
            .margin(10)
            .build_cartesian_2d(-1.2f64..1.2f64, -1.2f64..1.2f64)
            .unwrap();

        let mut start = -std::f64::consts::FRAC_PI_2;
        for (k, slice) in self.slices.iter().enumerate() {
            let angle = std::f64::consts::TAU * slice.value / total;
            let rgb = tableau(k);
            // wedge outline: outer arc forward, inner arc backward
            let n = (angle.to_degrees().ceil() as usize).max(2);
            let arc = (0..=n).map(|i| start + angle * i as f64 / n as f64);
            let mut points: Vec<(f64, f64)> =
                arc.clone().map(|a| (a.cos(), a.sin())).collect();
            points.extend(
                arc.rev()
                    .map(|a| (self.hole * a.cos(), self.hole * a.sin())),
            );
            chart
                .draw_series(std::iter::once(Polygon::new(points, rgb.filled())))
                .unwrap()
                .label(slice.label.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], rgb.filled())
                });
            start += angle;
        }
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{parse_timestamp, Sample};
    use crate::{aggregate, filter::HourRange};

    fn sample(
        station: &str,
        time: &str,
        energy: Option<f64>,
        load: Option<f64>,
        tx_power: Option<f64>,
    ) -> Sample {
        Sample {
            station: station.to_string(),
            time: parse_timestamp(time).unwrap(),
            energy,
            load,
            tx_power,
        }
    }

    fn dataset() -> Dataset {
        vec![
            sample("A", "2023-01-01T10:00", Some(10.), Some(40.), Some(5.)),
            sample("A", "2023-01-01T14:00", Some(20.), Some(60.), Some(6.)),
            sample("B", "2023-01-01T14:00", None, Some(30.), Some(7.)),
        ]
        .into()
    }

    #[test]
    fn scatter_skips_unplottable_samples() {
        let chart = ScatterChart::new(&dataset(), &FilterSelection::default());
        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].x, 10.);
        assert_eq!(chart.points[0].y, 40.);
    }

    #[test]
    fn scatter_resolves_encodings() {
        let selection = FilterSelection {
            time_filter: Some(HourRange::new(0, 23).unwrap()),
            color: Some(Field::TxPower),
            size: Some(Field::Energy),
            ..Default::default()
        };
        let chart = ScatterChart::new(&dataset(), &selection);
        assert_eq!(chart.color, Some(Field::TxPower));
        assert_eq!(chart.points[0].color, Some(5.));
        assert_eq!(chart.points[1].size, Some(20.));
    }

    #[test]
    fn scatter_passes_none_encodings_through() {
        let chart = ScatterChart::new(&dataset(), &FilterSelection::default());
        assert_eq!(chart.color, None);
        assert_eq!(chart.size, None);
        assert!(chart.points.iter().all(|point| point.color.is_none()));
    }

    #[test]
    fn bar_chart_keeps_summary_order() {
        let summary = aggregate::station_summary(&dataset());
        let chart = BarChart::from_summary(&summary);
        let stations: Vec<_> = chart.bars.iter().map(|bar| bar.station.as_str()).collect();
        assert_eq!(stations, vec!["A", "B"]);
        assert_eq!(chart.bars[0].category, Some(LoadCategory::Low));
    }

    #[test]
    fn donut_shares_sum_to_one() {
        let totals = aggregate::hourly_totals(&dataset());
        let chart = DonutChart::from_totals(&totals);
        let share: f64 = chart.slices.iter().map(|slice| slice.share).sum();
        assert!((share - 1.).abs() < 1e-12);
        assert_eq!(chart.hole, 0.4);
    }

    #[test]
    fn empty_donut_has_no_shares() {
        let chart = DonutChart::from_totals(&[]);
        assert!(chart.slices.is_empty());
    }
}
