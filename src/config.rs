//! Deployment configuration.
//!
//! Per-deployment parameters for a service endpoint: how the instance
//! identifies itself in discovery responses and an optional cap on the
//! payload size it advertises. Loaded by the integrating environment
//! (packaging and config transport are out of scope here) and validated
//! before use; invalid values are rejected, never silently clamped.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Largest payload any deployment of this runtime can advertise; bounded
/// by the fixed session buffer sizes.
pub const MAX_ADVERTISED_PAYLOAD: u32 = 4096;

/// Identity and limits of one deployed service endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Identifies the service interface hosted at this endpoint.
    pub interface_id: u16,
    /// Distinguishes multiple instances of the same interface.
    pub instance: u16,
    /// Advertised maximum payload size. `0` means "derive from the call
    /// buffer sizes of the session in use".
    pub max_payload_override: u32,
}

/// Errors from [`DeploymentConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation; the string names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl DeploymentConfig {
    /// Range-check every field. An override larger than any session
    /// buffer would advertise payloads no transport can carry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_payload_override > MAX_ADVERTISED_PAYLOAD {
            return Err(ConfigError::ValidationFailed(
                "max_payload_override exceeds session buffer capacity",
            ));
        }
        Ok(())
    }
}
