use anyhow::Result;
use chrono::{Days, NaiveDate};
use clap::Parser;
use tracing::info;

use wt_core::Coordinates;
use wt_runtime::metrics::BuildTimer;
use wt_runtime::run;
use wt_schedule::{to_csv, MapView};
use wt_store::{CachedStore, InMemoryStore, NoopGeocoder, RawCustomerRecord};
use wt_cli::{schedule_table, App, DispatchConfig};

/// Builds a schedule for a synthetic fleet held in memory.
#[derive(Parser, Debug)]
#[command(name = "fleet_demo")]
struct Args {
    /// Number of customers to generate
    #[arg(long, default_value_t = 24)]
    customers: u64,
    /// Reference date for the schedule
    #[arg(long, default_value = "2024-06-30")]
    today: NaiveDate,
    /// Also print the CSV export
    #[arg(long)]
    csv: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run("fleet_demo", || simulate(args))
}

fn simulate(args: Args) -> Result<()> {
    let timer = BuildTimer::start();
    let app = App::new(
        DispatchConfig::default(),
        CachedStore::new(InMemoryStore::new()),
        Box::new(NoopGeocoder),
    );

    // Deterministic mix of cadences, tank sizes and history depths.
    for i in 0..args.customers {
        let raw = RawCustomerRecord {
            name: format!("Customer {:02}", i + 1),
            address: format!("{} County Rd {}", 100 + i * 7, i % 5 + 1),
            ..RawCustomerRecord::default()
        };
        let coordinates = (i % 4 != 3).then(|| Coordinates {
            lat: 30.1 + (i % 6) as f64 * 0.05,
            lon: -97.9 + (i % 5) as f64 * 0.07,
        });
        let customer = app.add_customer(raw, coordinates, None)?;

        let cadence = 7 + (i * 5) % 24;
        let history = i % 6;
        let tank = 500.0 + ((i % 4) as f64) * 750.0;
        let mut day = args.today - Days::new(cadence * history + i % 9);
        for n in 0..history {
            let gallons = if n % 3 == 2 { None } else { Some(tank + (n as f64) * 25.0) };
            app.record_fill(customer.id, day, gallons)?;
            day = day + Days::new(cadence + (n % 2) * 2);
        }
    }

    let report = app.schedule(args.today)?;
    print!("{}", schedule_table(&report, 0));
    if args.csv {
        print!("{}", to_csv(&report, 0));
    }

    let map: MapView = app.map_view()?;
    info!(
        markers = map.markers.len(),
        center_lat = map.center.lat,
        center_lon = map.center.lon,
        "map ready"
    );
    println!("{}", app.metrics.snapshot().to_json_line("fleet_demo", Some(timer.elapsed())));
    Ok(())
}
