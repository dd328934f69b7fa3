//! Device allocation, payload attachment, and publication

use tracing::debug;

use softbus_core::{BusPayload, DeviceName, HostRegistry, RegistrationError};

/// Allocate a device for the bus, attach its platform data, and publish it.
///
/// On attachment or publication failure the handle is destroyed before the
/// error propagates; the host never keeps a half-configured device. On
/// success ownership of the handle has moved to the host registry and the
/// published name is returned.
pub fn register_device<R: HostRegistry>(
    registry: &mut R,
    driver: &str,
    id: u32,
    payload: BusPayload,
) -> Result<DeviceName, RegistrationError> {
    let mut handle = registry
        .allocate_device(driver, id)
        .map_err(|_| RegistrationError::AllocationFailed { id })?;

    if registry.attach_payload(&mut handle, payload).is_err() {
        registry.destroy_device(handle);
        return Err(RegistrationError::PayloadAttachFailed { id });
    }

    match registry.publish_device(handle) {
        Ok(name) => {
            debug!(device = %name, "device registered");
            Ok(name)
        }
        Err((handle, err)) => {
            let name = handle.full_name();
            registry.destroy_device(handle);
            Err(RegistrationError::PublishFailed {
                name,
                reason: err.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testhost::{FailPoint, FlakyHost};

    #[test]
    fn test_register_device_success() {
        let mut host = FlakyHost::default();
        let payload = BusPayload {
            udelay: 10,
            ..BusPayload::default()
        };

        let name = register_device(&mut host, "i2c-gpio", 0, payload).unwrap();
        assert_eq!(name.as_str(), "i2c-gpio.0");
        assert_eq!(host.inner.device_payload("i2c-gpio.0").unwrap().udelay, 10);
        assert!(host.destroyed.is_empty());
    }

    #[test]
    fn test_allocation_failure() {
        let mut host = FlakyHost::failing_at(vec![FailPoint::Allocate(0)]);
        let err = register_device(&mut host, "i2c-gpio", 0, BusPayload::default()).unwrap_err();
        assert_eq!(err, RegistrationError::AllocationFailed { id: 0 });
        assert_eq!(host.inner.device_count(), 0);
        assert!(host.destroyed.is_empty());
    }

    #[test]
    fn test_attach_failure_destroys_handle() {
        let mut host = FlakyHost::failing_at(vec![FailPoint::Attach(1)]);
        let err = register_device(&mut host, "i2c-gpio", 1, BusPayload::default()).unwrap_err();
        assert_eq!(err, RegistrationError::PayloadAttachFailed { id: 1 });
        assert_eq!(host.destroyed, vec!["i2c-gpio.1".to_string()]);
        assert_eq!(host.inner.device_count(), 0);
    }

    #[test]
    fn test_publish_failure_destroys_handle() {
        let mut host = FlakyHost::failing_at(vec![FailPoint::PublishDevice(2)]);
        let err = register_device(&mut host, "i2c-gpio", 2, BusPayload::default()).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::PublishFailed { ref name, .. } if name == "i2c-gpio.2"
        ));
        assert_eq!(host.destroyed, vec!["i2c-gpio.2".to_string()]);
        assert_eq!(host.inner.device_count(), 0);
    }
}
