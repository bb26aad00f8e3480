//! Attestation context configuration.
//!
//! Grounded on the reference engine's `attestation_config_t` init parameters
//! (`attestation_engine.c`'s `attestation_init`), with the global `device_type` field's single
//! observed value (`DEVICE_TYPE_SMART_METER`) generalized into the closed set of device
//! classes the surrounding project (an edge-attestation system for grid infrastructure)
//! plausibly targets.

use crate::error::{AttestError, Result};
use crate::measurement::LOG_CAPACITY;

/// Maximum length, in bytes, of a UTF-8 `device_serial` string.
pub const MAX_SERIAL_LEN: usize = 63;

/// The closed set of device classes a report's configuration may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeviceType {
    /// A smart electricity meter.
    SmartMeter = 0,
    /// An electric-vehicle charging station.
    EvCharger = 1,
    /// A grid sensor (voltage, current, or environmental telemetry).
    GridSensor = 2,
    /// A substation controller or protection relay.
    SubstationController = 3,
    /// Any other constrained edge device not covered above.
    Generic = 4,
}

/// Configuration supplied to [`crate::context::AttestationContext::init`].
///
/// Mirrors the reference engine's init-time config struct. Validated eagerly by `init`: an
/// oversized `device_serial` or a `max_log_entries` above [`LOG_CAPACITY`] is rejected before
/// any key material is generated.
#[derive(Debug, Clone)]
pub struct AttestationConfig {
    /// The device's declared class.
    pub device_type: DeviceType,
    /// A short human-readable serial or hardware id, at most [`MAX_SERIAL_LEN`] bytes.
    pub device_serial: heapless_serial::Serial,
    /// Whether the context should run periodic re-attestation (advisory; the core does not
    /// itself schedule timers — see SPEC_FULL.md's Non-goals on timeouts/cancellation).
    pub continuous_monitoring: bool,
    /// The advisory re-attestation interval, in minutes, when `continuous_monitoring` is set.
    pub interval_minutes: u32,
    /// Whether `init` should reject a device lacking a hardware root of trust. The core has
    /// no hardware probe of its own; this flag is carried through for a platform adapter to
    /// act on, per SPEC_FULL.md's treatment of the TPM bus as an external collaborator.
    pub require_hardware_root: bool,
    /// Whether measurement collection appends to the log at all.
    pub log_enabled: bool,
    /// Maximum measurement log entries retained, at most [`LOG_CAPACITY`].
    pub max_log_entries: u32,
}

impl AttestationConfig {
    /// Validates the configuration's size-bounded fields.
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidParameter`] if `max_log_entries` exceeds [`LOG_CAPACITY`].
    /// `device_serial` cannot itself be oversized: [`heapless_serial::Serial`] is constructed
    /// only through a fallible, length-checked conversion.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_log_entries as usize > LOG_CAPACITY {
            return Err(AttestError::InvalidParameter);
        }
        Ok(())
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Generic,
            device_serial: heapless_serial::Serial::empty(),
            continuous_monitoring: false,
            interval_minutes: 60,
            require_hardware_root: false,
            log_enabled: true,
            max_log_entries: LOG_CAPACITY as u32,
        }
    }
}

/// A fixed-capacity UTF-8 string, used for `device_serial` so the config carries no heap
/// allocation and the wire-level size bound is enforced at construction rather than at every
/// later use site.
pub mod heapless_serial {
    use super::MAX_SERIAL_LEN;
    use crate::error::{AttestError, Result};

    /// A UTF-8 string of at most [`MAX_SERIAL_LEN`] bytes, stored inline.
    #[derive(Debug, Clone, Copy)]
    pub struct Serial {
        bytes: [u8; MAX_SERIAL_LEN],
        len: usize,
    }

    impl Serial {
        /// The empty serial.
        #[must_use]
        pub fn empty() -> Self { Self { bytes: [0u8; MAX_SERIAL_LEN], len: 0 } }

        /// Builds a `Serial` from a caller-supplied string.
        ///
        /// # Errors
        /// Returns [`AttestError::InvalidParameter`] if `s` is longer than [`MAX_SERIAL_LEN`]
        /// bytes.
        pub fn new(s: &str) -> Result<Self> {
            if s.len() > MAX_SERIAL_LEN {
                return Err(AttestError::InvalidParameter);
            }
            let mut bytes = [0u8; MAX_SERIAL_LEN];
            bytes[..s.len()].copy_from_slice(s.as_bytes());
            Ok(Self { bytes, len: s.len() })
        }

        /// Borrows the serial as a `&str`.
        #[must_use]
        pub fn as_str(&self) -> &str {
            core::str::from_utf8(&self.bytes[..self.len]).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{heapless_serial::Serial, AttestationConfig};

    #[test]
    fn default_config_validates() {
        assert!(AttestationConfig::default().validate().is_ok());
    }

    #[test]
    fn oversized_log_capacity_is_rejected() {
        let mut cfg = AttestationConfig::default();
        cfg.max_log_entries = super::LOG_CAPACITY as u32 + 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn serial_rejects_oversized_strings() {
        let too_long = "x".repeat(super::MAX_SERIAL_LEN + 1);
        assert!(Serial::new(&too_long).is_err());
        let ok = "unit-test-01";
        assert_eq!(Serial::new(ok).unwrap().as_str(), ok);
    }
}
