mod display;

use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use parkade::{
    LotConfig, ParkingLot, RandomAvailable, SelectionKind, Ticket, TicketId, Vehicle, VehicleType,
};

use crate::display::DisplayBoard;

#[derive(Debug, Clone, PartialEq)]
struct Options {
    config: LotConfig,
    hold: Duration,
    json: bool,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let base = match LotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    let options = match parse_args(&args, base) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: parkade-demo [options]");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --cars <n>           Car spots [default: 5]");
            eprintln!("  --motorcycles <n>    Motorcycle spots [default: 3]");
            eprintln!("  --trucks <n>         Truck spots [default: 2]");
            eprintln!("  --selection <kind>   first or random [default: first]");
            eprintln!("  --seed <n>           Seed for random selection");
            eprintln!("  --hold-ms <n>        Wait before the first release [default: 1000]");
            eprintln!("  --json               Print the final lot snapshot as JSON");
            process::exit(2);
        }
    };

    init_tracing();
    info!("parkade {}", parkade::PARKADE_VERSION);

    if let Err(e) = run(&options) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Initialize tracing with PARKADE_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("PARKADE_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };
        EnvFilter::new(format!("parkade={level},parkade_demo={level}"))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

fn parse_args(args: &[String], base: LotConfig) -> Result<Options, String> {
    let mut options = Options {
        config: base,
        hold: Duration::from_millis(1000),
        json: false,
    };

    fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("{flag} requires a value"))
    }

    fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, String> {
        raw.parse()
            .map_err(|_| format!("{flag} expects a non-negative integer, got '{raw}'"))
    }

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--cars" => {
                i += 1;
                options.config.spots.car = number(value(args, i, flag)?, flag)?;
            }
            "--motorcycles" => {
                i += 1;
                options.config.spots.motorcycle = number(value(args, i, flag)?, flag)?;
            }
            "--trucks" => {
                i += 1;
                options.config.spots.truck = number(value(args, i, flag)?, flag)?;
            }
            "--selection" => {
                i += 1;
                options.config.selection = value(args, i, flag)?
                    .parse::<SelectionKind>()
                    .map_err(|e| e.to_string())?;
            }
            "--seed" => {
                i += 1;
                options.config.seed = Some(number(value(args, i, flag)?, flag)?);
            }
            "--hold-ms" => {
                i += 1;
                options.hold = Duration::from_millis(number(value(args, i, flag)?, flag)?);
            }
            "--json" => options.json = true,
            "--help" | "-h" => return Err(String::new()),
            arg => return Err(format!("unexpected argument: {arg}")),
        }
        i += 1;
    }

    Ok(options)
}

fn run(options: &Options) -> anyhow::Result<()> {
    println!("=== Parking Lot Management System ===\n");

    let lot = options.config.build();
    lot.add_listener(Arc::new(DisplayBoard::stdout("Main Display")));
    lot.add_listener(Arc::new(DisplayBoard::stdout("Entrance Display")));

    park_initial_vehicles(&lot)?;
    show_status(&lot);

    std::thread::sleep(options.hold);
    remove_first_vehicle(&lot)?;

    println!("\n=== Changing to Random Spot Strategy ===");
    let random = match options.config.seed {
        Some(seed) => RandomAvailable::with_seed(seed),
        None => RandomAvailable::new(),
    };
    lot.set_selection_policy(Arc::new(random));

    let bike = Vehicle::new("BIKE-456", "motorcycle".parse::<VehicleType>()?);
    if let Some(ticket) = lot.allocate(&bike)? {
        println!("Parked with random strategy: {}", ticket.id());
    }

    if options.json {
        let snapshot = serde_json::to_string_pretty(&lot.snapshot())
            .context("failed to serialize lot snapshot")?;
        println!("{snapshot}");
    }

    Ok(())
}

fn park_initial_vehicles(lot: &ParkingLot) -> anyhow::Result<Vec<Ticket>> {
    println!("=== Parking Vehicles ===");

    let arrivals = [
        ("ABC-123", "car"),
        ("XYZ-789", "car"),
        ("BIKE-123", "motorcycle"),
        ("TRUCK-001", "truck"),
    ];

    let mut tickets = Vec::new();
    for (plate, kind) in arrivals {
        let vehicle = Vehicle::new(plate, kind.parse::<VehicleType>()?);
        if let Some(ticket) = lot.allocate(&vehicle)? {
            tickets.push(ticket);
        }
    }

    for ticket in &tickets {
        println!("Ticket issued: {}", ticket.id());
    }
    println!();

    Ok(tickets)
}

fn show_status(lot: &ParkingLot) {
    println!("=== Parking Lot Status ===");
    println!("Total spots: {}", lot.count_total());
    println!("Occupied spots: {}", lot.count_occupied());
    println!("Available spots: {}", lot.list_available().len());
    println!("Is full: {}", lot.is_full());

    println!("\nAll parking spots:");
    for spot in lot.list_all() {
        println!("{spot}");
    }
    println!();
}

fn remove_first_vehicle(lot: &ParkingLot) -> anyhow::Result<()> {
    println!("=== Removing Vehicles ===");

    let id = TicketId::parse("TICKET-1")?;
    match lot.release(id) {
        Ok(fee) => println!("Vehicle removed. Fee charged: ${fee:.2}"),
        Err(e) if e.is_recoverable() => println!("Error: {e}"),
        Err(e) => return Err(e.into()),
    }

    println!("\nUpdated parking lot status:");
    println!("Occupied spots: {}", lot.count_occupied());
    println!("Available spots: {}", lot.list_available().len());
    println!();

    Ok(())
}
