use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use wt_core::{Coordinates, CustomerEdit, CustomerId};
use wt_runtime::metrics::BuildTimer;
use wt_runtime::run;
use wt_schedule::write_csv;
use wt_store::RawCustomerRecord;
use wt_cli::{schedule_table, App, DispatchConfig};

#[derive(Parser, Debug)]
#[command(name = "dispatch", about = "Water-truck customers, fills and refill predictions")]
struct Cli {
    /// TOML config file (default: ./watertruck.toml if present)
    #[arg(long, env = "WATERTRUCK_CONFIG")]
    config: Option<PathBuf>,

    /// History document, overriding the config file
    #[arg(long, env = "WATERTRUCK_STORE")]
    store: Option<PathBuf>,

    /// JSON address table used for geocoding
    #[arg(long, env = "WATERTRUCK_GEOCODE_TABLE")]
    geocode_table: Option<PathBuf>,

    /// Print a metrics JSON line when done
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a customer
    AddCustomer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Skip geocoding and use these coordinates
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Last known delivery, YYYY-MM-DD; recorded as an unmetered fill
        #[arg(long)]
        last_filled: Option<NaiveDate>,
    },
    /// Change a customer's details
    EditCustomer {
        #[arg(long)]
        id: CustomerId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Record a delivery
    RecordFill {
        #[arg(long)]
        id: CustomerId,
        /// Delivery date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Gallons delivered; 0 or omitted means not metered
        #[arg(long)]
        gallons: Option<f64>,
    },
    /// Import `customer_id,date[,gallons]` rows from a file
    ImportFills { file: PathBuf },
    /// List customers with last fill date
    Customers,
    /// Predicted next fills in dispatch order
    Schedule {
        /// Reference date, YYYY-MM-DD (default: config or current date)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Decimal places for gallons
        #[arg(long)]
        precision: Option<u32>,
        /// Emit CSV instead of a table
        #[arg(long)]
        csv: bool,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Map markers and center as JSON
    Map,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    run("dispatch", || execute(cli))
}

fn execute(cli: Cli) -> Result<()> {
    let timer = BuildTimer::start();
    let mut config = DispatchConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    if cli.geocode_table.is_some() {
        config.geocode_table = cli.geocode_table;
    }

    let store = config.open_store()?;
    let geocoder = config.geocoder()?;
    let mut app = App::new(config, store, geocoder);

    match cli.command {
        Command::AddCustomer { name, address, phone, notes, lat, lon, last_filled } => {
            let coordinates = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });
            let raw = RawCustomerRecord { name, address, phone, notes };
            let customer = app.add_customer(raw, coordinates, last_filled)?;
            println!("{}", serde_json::to_string_pretty(&customer)?);
        }
        Command::EditCustomer { id, name, address, phone, notes } => {
            let edit = CustomerEdit { name, address, coordinates: None, phone, notes };
            let customer = app.edit_customer(id, edit)?;
            println!("{}", serde_json::to_string_pretty(&customer)?);
        }
        Command::RecordFill { id, date, gallons } => {
            let date = date.unwrap_or_else(|| app.config.reference_date());
            let gallons = gallons.filter(|g| *g != 0.0);
            let event = app.record_fill(id, date, gallons)?;
            println!("recorded fill for customer {id} on {}", event.filled_on);
        }
        Command::ImportFills { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let batch = app.import_fills(&text)?;
            for err in &batch.rejected {
                eprintln!("rejected: {err}");
            }
            println!("imported {} fills, rejected {}", batch.accepted.len(), batch.rejected.len());
        }
        Command::Customers => {
            print!("{}", app.customers_table()?);
        }
        Command::Schedule { today, precision, csv, output } => {
            if let Some(p) = precision {
                app.config.schedule.gallons_precision = p;
            }
            let today = today.unwrap_or_else(|| app.config.reference_date());
            let report = app.schedule(today)?;
            let precision = app.config.schedule.precision();
            match (csv, output) {
                (true, Some(path)) => {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_csv(&report, precision, BufWriter::new(file))?;
                    info!(path = %path.display(), rows = report.len(), "schedule exported");
                }
                (true, None) => write_csv(&report, precision, io::stdout().lock())?,
                (false, Some(path)) => {
                    std::fs::write(&path, schedule_table(&report, precision))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                }
                (false, None) => print!("{}", schedule_table(&report, precision)),
            }
        }
        Command::Map => {
            println!("{}", serde_json::to_string_pretty(&app.map_view()?)?);
        }
    }

    if cli.metrics {
        eprintln!("{}", app.metrics.snapshot().to_json_line("dispatch", Some(timer.elapsed())));
    }
    Ok(())
}
