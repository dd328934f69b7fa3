//! Failure-injecting host registry for engine tests

use softbus_core::{
    BusPayload, DeviceHandle, DeviceName, HostError, HostRegistry, LookupTable, MemRegistry,
};

/// A single host operation to refuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    Allocate(u32),
    Attach(u32),
    PublishDevice(u32),
    PublishLookup(String),
}

/// [`MemRegistry`] wrapper that refuses configured operations and records
/// every destroyed handle, so tests can observe cleanup behavior.
#[derive(Default)]
pub struct FlakyHost {
    pub inner: MemRegistry,
    pub fail: Vec<FailPoint>,
    pub destroyed: Vec<String>,
}

impl FlakyHost {
    pub fn failing_at(fail: Vec<FailPoint>) -> Self {
        Self {
            fail,
            ..Self::default()
        }
    }

    fn should_fail(&self, point: &FailPoint) -> bool {
        self.fail.contains(point)
    }
}

impl HostRegistry for FlakyHost {
    fn allocate_device(&mut self, driver: &str, id: u32) -> Result<DeviceHandle, HostError> {
        if self.should_fail(&FailPoint::Allocate(id)) {
            return Err(HostError::new("out of memory"));
        }
        self.inner.allocate_device(driver, id)
    }

    fn attach_payload(
        &mut self,
        handle: &mut DeviceHandle,
        payload: BusPayload,
    ) -> Result<(), HostError> {
        if self.should_fail(&FailPoint::Attach(handle.id())) {
            return Err(HostError::new("platform data rejected"));
        }
        self.inner.attach_payload(handle, payload)
    }

    fn publish_device(
        &mut self,
        handle: DeviceHandle,
    ) -> Result<DeviceName, (DeviceHandle, HostError)> {
        if self.should_fail(&FailPoint::PublishDevice(handle.id())) {
            return Err((handle, HostError::new("registry refused device")));
        }
        self.inner.publish_device(handle)
    }

    fn unpublish_device(&mut self, name: &DeviceName) -> Option<DeviceHandle> {
        self.inner.unpublish_device(name)
    }

    fn destroy_device(&mut self, handle: DeviceHandle) {
        self.destroyed.push(handle.full_name());
        self.inner.destroy_device(handle);
    }

    fn publish_lookup(&mut self, table: LookupTable) -> Result<(), (LookupTable, HostError)> {
        if self.should_fail(&FailPoint::PublishLookup(table.key.clone())) {
            return Err((table, HostError::new("registry refused lookup table")));
        }
        self.inner.publish_lookup(table)
    }

    fn unpublish_lookup(&mut self, key: &str) -> Option<LookupTable> {
        self.inner.unpublish_lookup(key)
    }
}
