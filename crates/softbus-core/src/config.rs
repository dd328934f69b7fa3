//! Bus slot configuration parsing and validation

use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;

/// Number of fixed bus slots.
pub const SLOT_COUNT: usize = 4;

/// Maximum number of raw parameters per slot.
pub const FIELD_COUNT: usize = 8;

/// Parameters every configured slot must supply: id, sda, scl.
pub const REQUIRED_FIELDS: usize = 3;

/// Raw parameter record for one slot.
///
/// Up to eight unsigned integers in the order
/// `id, sda, scl, udelay, timeout, sda_od, scl_od, scl_oo`, plus a count of
/// how many were actually supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawSlot {
    fields: [u32; FIELD_COUNT],
    count: usize,
}

impl RawSlot {
    /// Record the supplied values. Values beyond [`FIELD_COUNT`] are ignored.
    pub fn new(values: &[u32]) -> Self {
        let count = values.len().min(FIELD_COUNT);
        let mut fields = [0u32; FIELD_COUNT];
        fields[..count].copy_from_slice(&values[..count]);
        Self { fields, count }
    }

    /// Number of supplied parameters.
    pub fn len(&self) -> usize {
        self.count
    }

    /// True when no parameters were supplied for this slot.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The supplied parameters.
    pub fn values(&self) -> &[u32] {
        &self.fields[..self.count]
    }
}

/// The fixed table of four raw slot records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable {
    slots: [RawSlot; SLOT_COUNT],
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw parameters for one slot.
    ///
    /// # Panics
    /// Panics if `slot >= SLOT_COUNT`.
    pub fn set(&mut self, slot: usize, values: &[u32]) {
        self.slots[slot] = RawSlot::new(values);
    }

    /// The raw record for one slot.
    ///
    /// # Panics
    /// Panics if `index >= SLOT_COUNT`.
    pub fn slot(&self, index: usize) -> &RawSlot {
        &self.slots[index]
    }

    /// Iterate the slots in fixed index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RawSlot)> {
        self.slots.iter().enumerate()
    }
}

/// Typed configuration for one bus slot.
///
/// Also the shape of a `[[bus]]` entry in the TOML configuration; only the
/// three required fields must be present there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Device id for the bus (becomes part of the registry name).
    pub id: u32,
    /// Global GPIO line number for the data signal.
    pub sda: u32,
    /// Global GPIO line number for the clock signal.
    pub scl: u32,
    /// Signal toggle delay in microseconds.
    #[serde(default)]
    pub udelay: u32,
    /// Clock stretching timeout.
    #[serde(default)]
    pub timeout: u32,
    /// SDA is configured as open drain.
    #[serde(default)]
    pub sda_open_drain: bool,
    /// SCL is configured as open drain.
    #[serde(default)]
    pub scl_open_drain: bool,
    /// SCL output drivers cannot be turned off.
    #[serde(default)]
    pub scl_output_only: bool,
}

impl BusConfig {
    /// Build the typed configuration from one raw slot record.
    ///
    /// Returns `Ok(None)` for an empty slot (not configured, not an error).
    /// Fails with `InvalidConfig` when fewer than the three required
    /// parameters were supplied; optional fields default to zero/false.
    pub fn from_slot(slot: usize, raw: &RawSlot) -> Result<Option<Self>, RegistrationError> {
        let values = raw.values();
        if values.is_empty() {
            return Ok(None);
        }
        if values.len() < REQUIRED_FIELDS {
            return Err(RegistrationError::InvalidConfig {
                slot,
                supplied: values.len(),
            });
        }

        let opt = |index: usize| values.get(index).copied().unwrap_or(0);
        Ok(Some(Self {
            id: values[0],
            sda: values[1],
            scl: values[2],
            udelay: opt(3),
            timeout: opt(4),
            sda_open_drain: opt(5) != 0,
            scl_open_drain: opt(6) != 0,
            scl_output_only: opt(7) != 0,
        }))
    }

    /// Flatten back into the raw parameter order.
    pub fn to_raw(&self) -> RawSlot {
        RawSlot::new(&[
            self.id,
            self.sda,
            self.scl,
            self.udelay,
            self.timeout,
            self.sda_open_drain as u32,
            self.scl_open_drain as u32,
            self.scl_output_only as u32,
        ])
    }
}
