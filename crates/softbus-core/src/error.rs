//! Registration error taxonomy

use thiserror::Error;

use crate::gpio::PinRole;

/// Terminal errors surfaced by bus registration.
///
/// Every failure is treated as a configuration or environment error; there
/// are no retries. Display strings name the failing slot or resource so the
/// operator can see exactly which parameter to fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A slot supplied some parameters but fewer than the required three.
    #[error("not enough parameters for bus{slot} ({supplied} supplied, 3 required)")]
    InvalidConfig { slot: usize, supplied: usize },

    /// A signal line does not belong to any known GPIO controller.
    #[error("nonexistent GPIO line {line} for bus{slot} {role}")]
    UnknownSignalLine { slot: usize, role: PinRole, line: u32 },

    /// The bus identifier does not fit the fixed-size naming scheme.
    #[error("device name `{name}` exceeds the fixed-size naming scheme")]
    IdentifierTooLarge { name: String },

    /// The host could not allocate a device handle.
    #[error("failed to allocate device for bus id {id}")]
    AllocationFailed { id: u32 },

    /// The host rejected the configuration payload.
    #[error("failed to attach platform data for bus id {id}")]
    PayloadAttachFailed { id: u32 },

    /// The host registry refused the publication.
    #[error("failed to publish `{name}`: {reason}")]
    PublishFailed { name: String, reason: String },

    /// All four slots were left empty.
    #[error("no bus parameter(s) specified")]
    NoBusesConfigured,
}
