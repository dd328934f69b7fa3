//! Lookup-table construction from resolved signal lines

use tracing::debug;

use softbus_core::{
    bus_key, BusConfig, LookupTable, PinLookupEntry, PinResolver, PinRole, RegistrationError,
};

/// Resolve both signal lines and build the bus's pin lookup table.
///
/// The data line resolves first, then the clock line; either failure is
/// side-effect free. The key is derived from the bus's final identifier only
/// after both lines resolve, so a bad line number never allocates anything.
/// The returned table is not yet published.
pub fn build_lookup_table(
    slot: usize,
    config: &BusConfig,
    resolver: &dyn PinResolver,
    driver: &str,
) -> Result<LookupTable, RegistrationError> {
    let sda = resolver
        .resolve(config.sda)
        .ok_or(RegistrationError::UnknownSignalLine {
            slot,
            role: PinRole::Sda,
            line: config.sda,
        })?;
    let scl = resolver
        .resolve(config.scl)
        .ok_or(RegistrationError::UnknownSignalLine {
            slot,
            role: PinRole::Scl,
            line: config.scl,
        })?;

    let key = bus_key(driver, config.id)?;
    debug!(key = %key, sda = %sda.chip_label, scl = %scl.chip_label, "lookup table built");

    Ok(LookupTable {
        key,
        entries: [
            PinLookupEntry {
                chip_label: sda.chip_label,
                offset: sda.offset,
                role: PinRole::Sda,
                open_drain: config.sda_open_drain,
            },
            PinLookupEntry {
                chip_label: scl.chip_label,
                offset: scl.offset,
                role: PinRole::Scl,
                open_drain: config.scl_open_drain,
            },
        ],
    })
}
