//! Host registry collaborator surface and in-memory device table
//!
//! The registration engine talks to the host only through [`HostRegistry`]:
//! allocate a device handle, attach its configuration payload, publish it,
//! and tear it down again. Fallible hand-offs return the moved value back in
//! `Err` so the caller keeps ownership on failure. [`MemRegistry`] is the
//! in-process implementation the CLI and the tests run against.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::config::BusConfig;
use crate::lookup::LookupTable;

/// Failure reported by a host registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Raw global line numbers carried in the payload under the legacy
/// resolution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawLines {
    pub sda: u32,
    pub scl: u32,
}

/// Configuration payload attached to a bus device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BusPayload {
    /// Signal toggle delay in microseconds.
    pub udelay: u32,
    /// Clock stretching timeout.
    pub timeout: u32,
    pub sda_open_drain: bool,
    pub scl_open_drain: bool,
    pub scl_output_only: bool,
    /// Raw line numbers, present only under the legacy resolution model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<RawLines>,
}

impl From<&BusConfig> for BusPayload {
    /// Timing and electrical flags carry over; raw line numbers are only
    /// filled in by the legacy resolution model.
    fn from(config: &BusConfig) -> Self {
        Self {
            udelay: config.udelay,
            timeout: config.timeout,
            sda_open_drain: config.sda_open_drain,
            scl_open_drain: config.scl_open_drain,
            scl_output_only: config.scl_output_only,
            lines: None,
        }
    }
}

/// Name of a published device in the host registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DeviceName(pub String);

impl DeviceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A device handle owned by the registration engine until published.
///
/// Publishing transfers ownership to the host registry; only an explicit
/// unpublish hands it back for destruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    driver: String,
    id: u32,
    payload: Option<BusPayload>,
}

impl DeviceHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Full registry name: `{driver}.{id}`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.driver, self.id)
    }

    pub fn payload(&self) -> Option<&BusPayload> {
        self.payload.as_ref()
    }
}

/// Host-side registry and object-lifecycle primitives.
///
/// Consumed as a black-box service: the engine never inspects host state
/// beyond these calls.
pub trait HostRegistry {
    /// Allocate an unpublished device handle for `driver`, indexed by `id`.
    fn allocate_device(&mut self, driver: &str, id: u32) -> Result<DeviceHandle, HostError>;

    /// Attach the configuration payload to an unpublished handle.
    fn attach_payload(
        &mut self,
        handle: &mut DeviceHandle,
        payload: BusPayload,
    ) -> Result<(), HostError>;

    /// Publish a device into the registry, transferring ownership.
    fn publish_device(
        &mut self,
        handle: DeviceHandle,
    ) -> Result<DeviceName, (DeviceHandle, HostError)>;

    /// Remove a published device, handing its handle back for destruction.
    fn unpublish_device(&mut self, name: &DeviceName) -> Option<DeviceHandle>;

    /// Destroy an unpublished handle, freeing host resources.
    fn destroy_device(&mut self, handle: DeviceHandle);

    /// Publish a named pin lookup table.
    fn publish_lookup(&mut self, table: LookupTable) -> Result<(), (LookupTable, HostError)>;

    /// Remove a published lookup table by key.
    fn unpublish_lookup(&mut self, key: &str) -> Option<LookupTable>;
}

/// In-memory host registry: the process-wide device table a bit-bang
/// runtime reads its configuration from.
#[derive(Debug, Default)]
pub struct MemRegistry {
    devices: BTreeMap<String, DeviceHandle>,
    lookups: BTreeMap<String, LookupTable>,
}

impl MemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.len()
    }

    /// True when nothing is published.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.lookups.is_empty()
    }

    /// Payload of a published device, if any.
    pub fn device_payload(&self, name: &str) -> Option<&BusPayload> {
        self.devices.get(name).and_then(|handle| handle.payload.as_ref())
    }

    /// A published lookup table, if any.
    pub fn lookup(&self, key: &str) -> Option<&LookupTable> {
        self.lookups.get(key)
    }

    /// Serializable view of everything currently published.
    pub fn report(&self) -> RegistryReport {
        RegistryReport {
            devices: self
                .devices
                .values()
                .map(|handle| DeviceRecord {
                    name: handle.full_name(),
                    id: handle.id,
                    payload: handle.payload.clone().unwrap_or_default(),
                })
                .collect(),
            lookups: self.lookups.values().cloned().collect(),
        }
    }
}

impl HostRegistry for MemRegistry {
    fn allocate_device(&mut self, driver: &str, id: u32) -> Result<DeviceHandle, HostError> {
        Ok(DeviceHandle {
            driver: driver.to_string(),
            id,
            payload: None,
        })
    }

    fn attach_payload(
        &mut self,
        handle: &mut DeviceHandle,
        payload: BusPayload,
    ) -> Result<(), HostError> {
        handle.payload = Some(payload);
        Ok(())
    }

    fn publish_device(
        &mut self,
        handle: DeviceHandle,
    ) -> Result<DeviceName, (DeviceHandle, HostError)> {
        // A device must never be observable without its configuration.
        if handle.payload.is_none() {
            return Err((handle, HostError::new("no platform data attached")));
        }
        let name = handle.full_name();
        if self.devices.contains_key(&name) {
            return Err((
                handle,
                HostError::new(format!("device `{name}` already published")),
            ));
        }
        debug!(device = %name, "device published");
        self.devices.insert(name.clone(), handle);
        Ok(DeviceName(name))
    }

    fn unpublish_device(&mut self, name: &DeviceName) -> Option<DeviceHandle> {
        let handle = self.devices.remove(name.as_str());
        if handle.is_some() {
            debug!(device = %name, "device unpublished");
        }
        handle
    }

    fn destroy_device(&mut self, handle: DeviceHandle) {
        drop(handle);
    }

    fn publish_lookup(&mut self, table: LookupTable) -> Result<(), (LookupTable, HostError)> {
        if self.lookups.contains_key(&table.key) {
            let message = format!("lookup table `{}` already published", table.key);
            return Err((table, HostError::new(message)));
        }
        debug!(key = %table.key, "lookup table published");
        self.lookups.insert(table.key.clone(), table);
        Ok(())
    }

    fn unpublish_lookup(&mut self, key: &str) -> Option<LookupTable> {
        let table = self.lookups.remove(key);
        if table.is_some() {
            debug!(key = %key, "lookup table unpublished");
        }
        table
    }
}

/// Serializable registry view for reports.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryReport {
    pub devices: Vec<DeviceRecord>,
    pub lookups: Vec<LookupTable>,
}

/// One published device in a report.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRecord {
    pub name: String,
    pub id: u32,
    pub payload: BusPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::PinRole;
    use crate::lookup::PinLookupEntry;

    fn attached_handle(registry: &mut MemRegistry, id: u32) -> DeviceHandle {
        let mut handle = registry.allocate_device("i2c-gpio", id).unwrap();
        registry
            .attach_payload(&mut handle, BusPayload::default())
            .unwrap();
        handle
    }

    fn sample_table(key: &str) -> LookupTable {
        let entry = |role| PinLookupEntry {
            chip_label: "gpiochip0".to_string(),
            offset: 5,
            role,
            open_drain: false,
        };
        LookupTable {
            key: key.to_string(),
            entries: [entry(PinRole::Sda), entry(PinRole::Scl)],
        }
    }

    #[test]
    fn test_publish_requires_payload() {
        let mut registry = MemRegistry::new();
        let handle = registry.allocate_device("i2c-gpio", 0).unwrap();
        let (handle, err) = registry.publish_device(handle).unwrap_err();
        assert_eq!(err.0, "no platform data attached");
        registry.destroy_device(handle);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_publish_and_unpublish_device() {
        let mut registry = MemRegistry::new();
        let handle = attached_handle(&mut registry, 0);
        let name = registry.publish_device(handle).unwrap();
        assert_eq!(name.as_str(), "i2c-gpio.0");
        assert_eq!(registry.device_count(), 1);

        let handle = registry.unpublish_device(&name).unwrap();
        assert_eq!(handle.full_name(), "i2c-gpio.0");
        registry.destroy_device(handle);
        assert!(registry.is_empty());
        assert_eq!(registry.unpublish_device(&name), None);
    }

    #[test]
    fn test_duplicate_device_refused() {
        let mut registry = MemRegistry::new();
        let first = attached_handle(&mut registry, 0);
        registry.publish_device(first).unwrap();

        let second = attached_handle(&mut registry, 0);
        let (second, err) = registry.publish_device(second).unwrap_err();
        assert!(err.0.contains("already published"));
        registry.destroy_device(second);
        assert_eq!(registry.device_count(), 1);
    }

    #[test]
    fn test_lookup_publish_and_unpublish() {
        let mut registry = MemRegistry::new();
        registry.publish_lookup(sample_table("i2c-gpio.0")).unwrap();
        assert!(registry.lookup("i2c-gpio.0").is_some());

        let (_, err) = registry
            .publish_lookup(sample_table("i2c-gpio.0"))
            .unwrap_err();
        assert!(err.0.contains("already published"));

        assert!(registry.unpublish_lookup("i2c-gpio.0").is_some());
        assert!(registry.unpublish_lookup("i2c-gpio.0").is_none());
    }

    #[test]
    fn test_report_lists_published_state() {
        let mut registry = MemRegistry::new();
        let handle = attached_handle(&mut registry, 3);
        registry.publish_device(handle).unwrap();
        registry.publish_lookup(sample_table("i2c-gpio.3")).unwrap();

        let report = registry.report();
        assert_eq!(report.devices.len(), 1);
        assert_eq!(report.devices[0].name, "i2c-gpio.3");
        assert_eq!(report.devices[0].id, 3);
        assert_eq!(report.lookups.len(), 1);
    }
}
