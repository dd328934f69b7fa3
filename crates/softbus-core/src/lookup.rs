//! Pin lookup tables published for bit-bang bus drivers

use serde::Serialize;

use crate::error::RegistrationError;
use crate::gpio::PinRole;

/// Longest device name the fixed naming scheme can represent.
pub const BUS_NAME_MAX: usize = 32;

/// Derive the registry key for a bus from its final identifier.
///
/// The scheme is `{driver}.{id}`. The bit-bang driver discovers its pins by
/// looking up this exact name, so the key must match the published device.
pub fn bus_key(driver: &str, id: u32) -> Result<String, RegistrationError> {
    let key = format!("{driver}.{id}");
    if key.len() > BUS_NAME_MAX {
        return Err(RegistrationError::IdentifierTooLarge { name: key });
    }
    Ok(key)
}

/// One resolved signal line inside a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinLookupEntry {
    /// Label of the owning controller.
    pub chip_label: String,
    /// Line offset local to the controller.
    pub offset: u32,
    /// Role the line plays on the bus.
    pub role: PinRole,
    /// The line must not be driven high actively.
    pub open_drain: bool,
}

/// Named association between a bus and its two resolved signal lines.
///
/// Owned by the registering slot until published; a published table lives in
/// the host registry under [`bus_key`] until explicitly unpublished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupTable {
    /// Unique registry key derived from the bus identifier.
    pub key: String,
    /// Data and clock entries, in that order.
    pub entries: [PinLookupEntry; 2],
}
