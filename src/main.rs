use bs_energy::{render, Dataset, Field, FilterSelection, HourRange};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "bs-energy",
    about = "5G base station energy consumption dashboard"
)]
struct Opt {
    /// Path to the measurement CSV file
    #[structopt(long)]
    path: Option<String>,
    /// Base station regular expression filter
    #[structopt(long)]
    station: Option<String>,
    /// Lower bound of the hour-of-day filter
    #[structopt(long)]
    from_hour: Option<u32>,
    /// Upper bound of the hour-of-day filter
    #[structopt(long)]
    to_hour: Option<u32>,
    /// Categorical chart encoding (BS or Time)
    #[structopt(long)]
    category: Option<Field>,
    /// Color chart encoding (Energy, load or TXpower)
    #[structopt(long)]
    color: Option<Field>,
    /// Size chart encoding (Energy, load or TXpower)
    #[structopt(long)]
    size: Option<Field>,
    /// Print the dashboard as JSON instead of the text summary
    #[structopt(long)]
    json: bool,
    /// Write the charts to SVG files
    #[cfg(feature = "plot")]
    #[structopt(long)]
    plot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut loader = Dataset::loader();
    if let Some(arg) = opt.path {
        loader = loader.data_path(arg);
    }
    if let Some(arg) = opt.station {
        loader = loader.station_filter(arg);
    }
    let dataset = loader.load()?;

    let time_filter = match (opt.from_hour, opt.to_hour) {
        (None, None) => None,
        (lo, hi) => Some(HourRange::new(lo.unwrap_or(0), hi.unwrap_or(23))?),
    };
    let selection = FilterSelection {
        time_filter,
        category: opt.category,
        color: opt.color,
        size: opt.size,
    };

    let dashboard = render(&dataset, &selection)?;
    if opt.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        dashboard.summary();
    }
    #[cfg(feature = "plot")]
    if opt.plot {
        dashboard.scatter.plot("energy_vs_load.svg");
        dashboard.bar.plot("station_energy.svg");
        dashboard.donut.plot("hourly_energy_share.svg");
    }

    Ok(())
}
