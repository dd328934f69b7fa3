//! Softbus Core - Slot configuration, pin resolution, and host registry types
//!
//! This crate provides the foundational types for the softbus system:
//! - Bus slot configuration parsing and validation
//! - GPIO line resolution against a controller table
//! - Pin lookup tables published for bit-bang bus drivers
//! - Host registry trait and the in-memory device table

pub mod config;
pub mod error;
pub mod gpio;
pub mod host;
pub mod lookup;

pub use config::{BusConfig, RawSlot, SlotTable, FIELD_COUNT, REQUIRED_FIELDS, SLOT_COUNT};
pub use error::RegistrationError;
pub use gpio::{ChipTable, ChipTableError, GpioChip, PinResolver, PinRole, ResolvedPin};
pub use host::{
    BusPayload, DeviceHandle, DeviceName, HostError, HostRegistry, MemRegistry, RawLines,
    RegistryReport,
};
pub use lookup::{bus_key, LookupTable, PinLookupEntry, BUS_NAME_MAX};
