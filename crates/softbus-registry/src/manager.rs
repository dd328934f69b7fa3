//! Transactional registration across the four bus slots

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use softbus_core::{
    BusConfig, BusPayload, DeviceName, HostRegistry, PinResolver, PinRole, RawLines, RawSlot,
    RegistrationError, SlotTable,
};

use crate::builder::build_lookup_table;
use crate::registrar::register_device;
use crate::unwind::ReleaseStack;

/// How signal lines are described to the bus driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionModel {
    /// Publish a pin lookup table per bus; the payload carries no raw lines.
    #[default]
    Descriptor,
    /// No lookup tables; raw line numbers ride in the payload.
    Legacy,
}

/// One committed slot: the published device and, under the descriptor
/// model, its lookup-table key.
#[derive(Debug, Clone)]
struct CommittedBus {
    device: DeviceName,
    lookup_key: Option<String>,
}

/// Ordered record of fully committed slots, used to drive teardown.
///
/// Grows only by append while a slot completes; cleared as a whole during
/// teardown. At every observable point the published devices are exactly
/// the entries recorded here.
#[derive(Debug, Default)]
pub struct RegistrationLedger {
    entries: Vec<CommittedBus>,
}

impl RegistrationLedger {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context object driving registration and teardown of all bus slots.
///
/// Owns the host registry, the pin resolver, and the ledger. The caller
/// creates it during startup, calls [`BusRegistrar::register_all`] once, and
/// calls [`BusRegistrar::release_all`] once at shutdown; a failed
/// registration has already released everything by the time it returns.
pub struct BusRegistrar<R, P> {
    registry: R,
    resolver: P,
    driver: String,
    model: ResolutionModel,
    ledger: RegistrationLedger,
}

impl<R: HostRegistry, P: PinResolver> BusRegistrar<R, P> {
    pub fn new(registry: R, resolver: P, driver: impl Into<String>, model: ResolutionModel) -> Self {
        Self {
            registry,
            resolver,
            driver: driver.into(),
            model,
            ledger: RegistrationLedger::default(),
        }
    }

    /// The host registry, for inspection and reporting.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn ledger(&self) -> &RegistrationLedger {
        &self.ledger
    }

    /// Register every configured slot, in fixed index order.
    ///
    /// Empty slots are skipped silently; a slot with fewer than the required
    /// parameters, an unresolvable signal line, or any host failure aborts
    /// the whole call. On error everything acquired so far, including fully
    /// committed earlier slots, has been released and the host registry is
    /// unchanged. Succeeds only if at least one bus was registered.
    pub fn register_all(&mut self, slots: &SlotTable) -> Result<(), RegistrationError> {
        for (index, raw) in slots.iter() {
            if let Err(err) = self.register_slot(index, raw) {
                warn!(slot = index, error = %err, "bus registration failed, rolling back");
                self.release_all();
                return Err(err);
            }
        }

        if self.ledger.is_empty() {
            return Err(RegistrationError::NoBusesConfigured);
        }
        info!(buses = self.ledger.len(), "all configured buses registered");
        Ok(())
    }

    fn register_slot(&mut self, index: usize, raw: &RawSlot) -> Result<(), RegistrationError> {
        let Some(config) = BusConfig::from_slot(index, raw)? else {
            debug!(slot = index, "slot not configured, skipping");
            return Ok(());
        };

        let committed = self.acquire_slot(index, &config)?;
        info!(slot = index, device = %committed.device, "bus registered");
        self.ledger.entries.push(committed);
        Ok(())
    }

    /// The single-slot acquire sequence.
    ///
    /// Resources acquired along the way push their release action; the stack
    /// unwinds if a later step fails and is discarded once the slot commits.
    fn acquire_slot(
        &mut self,
        index: usize,
        config: &BusConfig,
    ) -> Result<CommittedBus, RegistrationError> {
        let mut release = ReleaseStack::new();
        let mut payload = BusPayload::from(config);
        let mut lookup_key = None;

        match self.model {
            ResolutionModel::Descriptor => {
                let table = build_lookup_table(index, config, &self.resolver, &self.driver)?;
                let key = table.key.clone();
                if let Err((table, err)) = self.registry.publish_lookup(table) {
                    return Err(RegistrationError::PublishFailed {
                        name: table.key,
                        reason: err.to_string(),
                    });
                }
                release.push({
                    let key = key.clone();
                    move |registry: &mut R| {
                        registry.unpublish_lookup(&key);
                    }
                });
                lookup_key = Some(key);
            }
            ResolutionModel::Legacy => {
                for (role, line) in [(PinRole::Sda, config.sda), (PinRole::Scl, config.scl)] {
                    if self.resolver.resolve(line).is_none() {
                        return Err(RegistrationError::UnknownSignalLine {
                            slot: index,
                            role,
                            line,
                        });
                    }
                }
                payload.lines = Some(RawLines {
                    sda: config.sda,
                    scl: config.scl,
                });
            }
        }

        match register_device(&mut self.registry, &self.driver, config.id, payload) {
            Ok(device) => {
                release.commit();
                Ok(CommittedBus { device, lookup_key })
            }
            Err(err) => {
                release.unwind(&mut self.registry);
                Err(err)
            }
        }
    }

    /// Release every committed bus: unpublish and destroy the device, then
    /// unpublish its lookup table. Idempotent; a second call is a no-op.
    pub fn release_all(&mut self) {
        for entry in self.ledger.entries.drain(..) {
            if let Some(handle) = self.registry.unpublish_device(&entry.device) {
                self.registry.destroy_device(handle);
            }
            if let Some(key) = &entry.lookup_key {
                self.registry.unpublish_lookup(key);
            }
            debug!(device = %entry.device, "bus released");
        }
    }
}
