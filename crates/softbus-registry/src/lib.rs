//! Softbus Registry - transactional bus registration engine
//!
//! Drives, for each of the four bus slots in fixed order, the full acquire
//! sequence (validate, resolve pins, build and publish the lookup table,
//! allocate and publish the device) and unwinds every partial allocation the
//! moment any step fails. After a failed call the host registry is exactly
//! as it was before.

pub mod builder;
pub mod manager;
pub mod registrar;
pub mod unwind;

#[cfg(test)]
mod testhost;

pub use builder::build_lookup_table;
pub use manager::{BusRegistrar, RegistrationLedger, ResolutionModel};
pub use registrar::register_device;
pub use unwind::ReleaseStack;
