//! Configuration loading and validation

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use softbus_core::{BusConfig, ChipTable, GpioChip, SlotTable, SLOT_COUNT};
use softbus_registry::ResolutionModel;
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default, rename = "bus")]
    pub buses: Vec<BusEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Driver type string used for device and lookup-table names
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Pin resolution model ("descriptor" or "legacy")
    #[serde(default)]
    pub model: ResolutionModel,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            model: ResolutionModel::default(),
        }
    }
}

fn default_driver() -> String {
    "i2c-gpio".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpioConfig {
    /// Path to the GPIO chip table file
    #[serde(default = "default_chips_path")]
    pub chips: String,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            chips: default_chips_path(),
        }
    }
}

fn default_chips_path() -> String {
    "./gpiochips.toml".to_string()
}

/// One `[[bus]]` entry: a slot index plus the bus parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEntry {
    /// Slot index (0-3)
    pub slot: usize,
    #[serde(flatten)]
    pub config: BusConfig,
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        validate(&config)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    let mut seen = [false; SLOT_COUNT];
    for entry in &config.buses {
        if entry.slot >= SLOT_COUNT {
            bail!(
                "bus slot {} out of range (0-{})",
                entry.slot,
                SLOT_COUNT - 1
            );
        }
        if seen[entry.slot] {
            bail!("bus slot {} configured twice", entry.slot);
        }
        seen[entry.slot] = true;
    }
    Ok(())
}

/// Build the raw slot table from the configured `[[bus]]` entries.
pub fn to_slot_table(config: &Config) -> SlotTable {
    let mut slots = SlotTable::new();
    for entry in &config.buses {
        let raw = entry.config.to_raw();
        slots.set(entry.slot, raw.values());
    }
    slots
}

/// Load the GPIO chip table, falling back to a single default controller.
pub fn load_chips(path: &Path) -> Result<ChipTable> {
    if path.exists() {
        let table = ChipTable::from_file(path)?;
        info!(
            path = %path.display(),
            chips = table.chips().len(),
            "Loaded GPIO chip table"
        );
        Ok(table)
    } else {
        info!(
            path = %path.display(),
            "GPIO chip table not found, using default controller"
        );
        Ok(ChipTable::new(vec![GpioChip {
            label: "gpiochip0".to_string(),
            base: 0,
            ngpio: 64,
        }]))
    }
}
