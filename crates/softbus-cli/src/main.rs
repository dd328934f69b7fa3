//! Softbus - registers GPIO bit-banged virtual I2C buses
//!
//! Bus parameters come from the TOML configuration file or from
//! module-parameter style `--bus0..--bus3` arguments, which override the
//! file slot-for-slot.

mod config;
mod params;

use anyhow::{Context, Result};
use clap::Parser;
use softbus_core::MemRegistry;
use softbus_registry::{BusRegistrar, ResolutionModel};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "softbus")]
#[command(about = "GPIO bit-banged I2C bus registration tool")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "softbus.toml")]
    config: PathBuf,

    /// Bus 0 parameters: id,sda,scl[,udelay,timeout,sda_od,scl_od,scl_oo]
    #[arg(long, value_name = "PARAMS")]
    bus0: Option<String>,

    /// Bus 1 parameters, same shape as --bus0
    #[arg(long, value_name = "PARAMS")]
    bus1: Option<String>,

    /// Bus 2 parameters, same shape as --bus0
    #[arg(long, value_name = "PARAMS")]
    bus2: Option<String>,

    /// Bus 3 parameters, same shape as --bus0
    #[arg(long, value_name = "PARAMS")]
    bus3: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print the published registry as JSON
    #[arg(long)]
    json: bool,

    /// Use the legacy pin model (raw line numbers in the platform data)
    #[arg(long)]
    legacy_pins: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Softbus v{}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args.config)?;

    let mut slots = config::to_slot_table(&config);
    let overrides = [&args.bus0, &args.bus1, &args.bus2, &args.bus3];
    for (index, arg) in overrides.iter().enumerate() {
        if let Some(arg) = arg {
            let values = params::parse_bus_params(arg)
                .with_context(|| format!("invalid --bus{index} argument"))?;
            slots.set(index, &values);
        }
    }

    let chips = config::load_chips(Path::new(&config.gpio.chips))?;

    let model = if args.legacy_pins {
        ResolutionModel::Legacy
    } else {
        config.registry.model
    };

    let mut registrar =
        BusRegistrar::new(MemRegistry::new(), chips, config.registry.driver, model);
    registrar
        .register_all(&slots)
        .context("bus registration failed")?;

    let report = registrar.registry().report();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Registered {} bus(es):", report.devices.len());
        for device in &report.devices {
            println!(
                "  - {} (udelay {}, timeout {})",
                device.name, device.payload.udelay, device.payload.timeout
            );
            if let Some(lines) = device.payload.lines {
                println!("    Lines: sda {}, scl {}", lines.sda, lines.scl);
            }
        }
        for table in &report.lookups {
            let [sda, scl] = &table.entries;
            println!(
                "  - lookup {}: sda {}:{}, scl {}:{}",
                table.key, sda.chip_label, sda.offset, scl.chip_label, scl.offset
            );
        }
    }

    // Module-unload equivalent: release everything published by this run.
    registrar.release_all();

    Ok(())
}
