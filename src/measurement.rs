//! Typed platform measurements, the collaborator interface that supplies their raw bytes, and
//! the bounded append-only log that accumulates them.
//!
//! Grounded on the measurement-engine reference's `collect_firmware_measurement`/
//! `collect_config_measurement`/`collect_runtime_measurement`/`collect_keys_measurement`/
//! `collect_device_id_measurement` and `attestation_collect_measurements`'s fixed collection
//! order and capacity check. The reference hashes hardcoded simulated strings directly; this
//! crate instead takes the bytes through the `MeasurementSource` collaborator interface named
//! in SPEC_FULL.md's external-interfaces section, so a caller can supply real flash/process
//! reads without this crate depending on any OS facility.

use crate::error::{AttestError, Result};
use crate::keccak::sha3_256;
use crate::pcr::PcrBank;

/// Maximum number of entries the measurement log retains.
pub const LOG_CAPACITY: usize = 256;

/// The size in bytes a measurement occupies inside a serialized [`crate::report::AttestationReport`].
pub const MEASUREMENT_WIRE_LEN: usize = 128;

/// Maximum bytes (including a nul terminator) of a measurement's human-readable description.
pub const DESCRIPTION_LEN: usize = 64;

/// The closed set of measurement categories, each bound to a fixed PCR index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MeasurementType {
    /// Firmware/bootloader identity, extends PCR 0.
    Firmware = 0,
    /// Device configuration, extends PCR 1.
    Configuration = 1,
    /// Running application/runtime state, extends PCR 2.
    Runtime = 2,
    /// Public key material, extends PCR 3.
    Keys = 3,
    /// Network configuration, extends PCR 4.
    NetworkConfig = 4,
    /// Device identity (serial number or hardware id), extends PCR 5.
    DeviceIdentity = 5,
    /// Security policy configuration, extends PCR 6.
    Policy = 6,
    /// Reserved for caller-defined measurements, extends PCR 7.
    Custom = 7,
}

impl MeasurementType {
    /// The PCR register this measurement type always extends.
    #[must_use]
    pub fn pcr_index(self) -> usize { self as usize }

    /// Decodes a wire-format type code, rejecting anything outside the closed set.
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidMeasurement`] for any code `>= 8`.
    pub fn from_u8(code: u8) -> Result<Self> {
        Ok(match code {
            0 => Self::Firmware,
            1 => Self::Configuration,
            2 => Self::Runtime,
            3 => Self::Keys,
            4 => Self::NetworkConfig,
            5 => Self::DeviceIdentity,
            6 => Self::Policy,
            7 => Self::Custom,
            _ => return Err(AttestError::InvalidMeasurement),
        })
    }
}

/// The fixed components a [`MeasurementSource`] is asked to read, in the order
/// [`collect_all`] collects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementComponent {
    /// Firmware or bootloader image bytes.
    Firmware,
    /// Serialized device configuration.
    Configuration,
    /// Runtime/application state snapshot.
    Runtime,
    /// The device's own public key material (never secret key material).
    Keys,
    /// Device serial number or hardware identity bytes.
    DeviceIdentity,
}

/// The injected collaborator that supplies the raw bytes a measurement hashes.
///
/// The core never reads flash, process memory, or any OS facility itself; a platform adapter
/// implements this trait against whatever storage or introspection API the target device
/// actually exposes.
pub trait MeasurementSource {
    /// Returns the bytes to be hashed for `component`.
    ///
    /// # Errors
    /// Returns [`AttestError::HardwareFailure`] if the underlying component cannot be read.
    fn read(&mut self, component: MeasurementComponent) -> Result<Vec<u8>>;
}

/// A single platform measurement: the PCR it extended, its type, when it was taken, the
/// 32-byte digest, the size of the measured component, and a short description.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    /// PCR index this measurement extended (always `measurement_type.pcr_index()`).
    pub pcr_index: usize,
    /// The measurement's category.
    pub measurement_type: MeasurementType,
    /// Collection time, as a Unix timestamp in seconds.
    pub timestamp: u64,
    /// The measured digest: `SHA3-256(source_bytes)`.
    pub value: [u8; 32],
    /// Byte length of the component that was hashed.
    pub size: u32,
    /// A short human-readable label, truncated to [`DESCRIPTION_LEN`] `- 1` bytes.
    pub description: [u8; DESCRIPTION_LEN],
}

impl Measurement {
    fn new(measurement_type: MeasurementType, timestamp: u64, source_bytes: &[u8], description: &str) -> Self {
        let mut desc = [0u8; DESCRIPTION_LEN];
        let n = description.len().min(DESCRIPTION_LEN - 1);
        desc[..n].copy_from_slice(&description.as_bytes()[..n]);
        Self {
            pcr_index: measurement_type.pcr_index(),
            measurement_type,
            timestamp,
            value: sha3_256(source_bytes),
            size: u32::try_from(source_bytes.len()).unwrap_or(u32::MAX),
            description: desc,
        }
    }

    /// Borrows the description as a `&str`, stopping at the first nul byte.
    #[must_use]
    pub fn description_str(&self) -> &str {
        let end = self.description.iter().position(|&b| b == 0).unwrap_or(DESCRIPTION_LEN);
        core::str::from_utf8(&self.description[..end]).unwrap_or_default()
    }
}

/// A bounded, append-only log of collected measurements.
pub struct MeasurementLog {
    entries: [Option<Measurement>; LOG_CAPACITY],
    count: usize,
}

impl Default for MeasurementLog {
    fn default() -> Self { Self::new() }
}

impl MeasurementLog {
    /// Builds an empty log.
    #[must_use]
    pub fn new() -> Self { Self { entries: [None; LOG_CAPACITY], count: 0 } }

    /// Appends `measurement` to the log.
    ///
    /// # Errors
    /// Returns [`AttestError::LogFull`] once [`LOG_CAPACITY`] entries have been recorded.
    pub fn push(&mut self, measurement: Measurement) -> Result<()> {
        if self.count >= LOG_CAPACITY {
            return Err(AttestError::LogFull);
        }
        self.entries[self.count] = Some(measurement);
        self.count += 1;
        Ok(())
    }

    /// The number of entries currently recorded.
    #[must_use]
    pub fn len(&self) -> usize { self.count }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.count == 0 }

    /// Iterates the recorded entries in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.entries[..self.count].iter().filter_map(Option::as_ref)
    }
}

/// Collects one measurement of `measurement_type` from `source_bytes`, extends its fixed PCR,
/// and returns it (the caller appends it to a [`MeasurementLog`]).
///
/// # Errors
/// Propagates [`AttestError::InvalidPcr`] from the PCR extend (never occurs for a fixed,
/// in-range `measurement_type.pcr_index()`).
pub fn collect(pcr: &mut PcrBank, measurement_type: MeasurementType, source_bytes: &[u8], now: u64, description: &str) -> Result<Measurement> {
    let measurement = Measurement::new(measurement_type, now, source_bytes, description);
    pcr.extend(measurement_type.pcr_index(), &measurement.value)?;
    Ok(measurement)
}

/// Collects the fixed default sequence of measurements (firmware, configuration, runtime,
/// keys, device identity) by drawing each component's bytes from `source`, and appends each
/// to `log`, stopping at the first error.
///
/// # Errors
/// Propagates the first [`AttestError::HardwareFailure`] from `source`, or
/// [`AttestError::LogFull`] if `log` is at capacity.
pub fn collect_all(
    pcr: &mut PcrBank, log: &mut MeasurementLog, now: u64, source: &mut impl MeasurementSource,
) -> Result<()> {
    use MeasurementComponent::{Configuration, DeviceIdentity, Firmware, Keys, Runtime};
    let plan = [
        (Firmware, MeasurementType::Firmware, "firmware image"),
        (Configuration, MeasurementType::Configuration, "device configuration"),
        (Runtime, MeasurementType::Runtime, "runtime state"),
        (Keys, MeasurementType::Keys, "signing public key"),
        (DeviceIdentity, MeasurementType::DeviceIdentity, "device identity"),
    ];
    for (component, measurement_type, description) in plan {
        let bytes = source.read(component)?;
        let measurement = collect(pcr, measurement_type, &bytes, now, description)?;
        log.push(measurement)?;
        log::debug!("collected {measurement_type:?} measurement ({} bytes)", bytes.len());
    }
    Ok(())
}

/// A [`MeasurementSource`] returning fixed byte strings, used by tests and by callers with no
/// real hardware to probe yet.
pub struct SimulatedMeasurementSource {
    /// Bytes returned for [`MeasurementComponent::Firmware`].
    pub firmware: Vec<u8>,
    /// Bytes returned for [`MeasurementComponent::Configuration`].
    pub configuration: Vec<u8>,
    /// Bytes returned for [`MeasurementComponent::Runtime`].
    pub runtime: Vec<u8>,
    /// Bytes returned for [`MeasurementComponent::Keys`].
    pub keys: Vec<u8>,
    /// Bytes returned for [`MeasurementComponent::DeviceIdentity`].
    pub device_identity: Vec<u8>,
}

impl MeasurementSource for SimulatedMeasurementSource {
    fn read(&mut self, component: MeasurementComponent) -> Result<Vec<u8>> {
        Ok(match component {
            MeasurementComponent::Firmware => self.firmware.clone(),
            MeasurementComponent::Configuration => self.configuration.clone(),
            MeasurementComponent::Runtime => self.runtime.clone(),
            MeasurementComponent::Keys => self.keys.clone(),
            MeasurementComponent::DeviceIdentity => self.device_identity.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{collect_all, MeasurementComponent, MeasurementLog, MeasurementSource, MeasurementType};
    use crate::error::{AttestError, Result};
    use crate::pcr::PcrBank;

    struct FixedSource;
    impl MeasurementSource for FixedSource {
        fn read(&mut self, component: MeasurementComponent) -> Result<Vec<u8>> {
            Ok(match component {
                MeasurementComponent::Firmware => b"firmware-v1".to_vec(),
                MeasurementComponent::Configuration => b"config-v1".to_vec(),
                MeasurementComponent::Runtime => b"runtime-v1".to_vec(),
                MeasurementComponent::Keys => b"keys-v1".to_vec(),
                MeasurementComponent::DeviceIdentity => b"ident-v1".to_vec(),
            })
        }
    }

    struct FailingSource;
    impl MeasurementSource for FailingSource {
        fn read(&mut self, _component: MeasurementComponent) -> Result<Vec<u8>> {
            Err(AttestError::HardwareFailure)
        }
    }

    #[test]
    fn collect_all_appends_five_measurements_in_fixed_order() {
        let mut pcr = PcrBank::new();
        let mut log = MeasurementLog::new();
        collect_all(&mut pcr, &mut log, 1_700_000_000, &mut FixedSource).unwrap();
        assert_eq!(log.len(), 5);
        let types: Vec<_> = log.iter().map(|m| m.measurement_type).collect();
        assert_eq!(
            types,
            vec![
                MeasurementType::Firmware,
                MeasurementType::Configuration,
                MeasurementType::Runtime,
                MeasurementType::Keys,
                MeasurementType::DeviceIdentity,
            ]
        );
    }

    #[test]
    fn each_measurement_extends_its_fixed_pcr() {
        let mut pcr = PcrBank::new();
        let mut log = MeasurementLog::new();
        collect_all(&mut pcr, &mut log, 1_700_000_000, &mut FixedSource).unwrap();
        for m in log.iter() {
            assert_eq!(m.pcr_index, m.measurement_type.pcr_index());
            assert!(pcr.is_valid(m.pcr_index));
        }
    }

    #[test]
    fn matches_the_expected_hash_chain_for_fixed_inputs() {
        let mut pcr = PcrBank::new();
        let mut log = MeasurementLog::new();
        collect_all(&mut pcr, &mut log, 1_700_000_000, &mut FixedSource).unwrap();
        let expected = crate::keccak::sha3_256_concat(&[0u8; 32], b"firmware-v1");
        assert_eq!(pcr.read(0).unwrap(), expected);
    }

    #[test]
    fn stops_on_first_source_error() {
        let mut pcr = PcrBank::new();
        let mut log = MeasurementLog::new();
        let err = collect_all(&mut pcr, &mut log, 0, &mut FailingSource).unwrap_err();
        assert_eq!(err, AttestError::HardwareFailure);
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn log_rejects_pushes_past_capacity() {
        let mut log = MeasurementLog::new();
        let m = super::Measurement::new(MeasurementType::Firmware, 0, b"x", "x");
        for _ in 0..super::LOG_CAPACITY {
            log.push(m).unwrap();
        }
        assert!(log.push(m).is_err());
    }

    #[test]
    fn measurement_type_rejects_out_of_range_codes() {
        assert!(MeasurementType::from_u8(8).is_err());
        assert!(MeasurementType::from_u8(255).is_err());
        assert!(MeasurementType::from_u8(0).is_ok());
    }

    #[test]
    fn description_round_trips_through_the_fixed_buffer() {
        let m = super::Measurement::new(MeasurementType::Runtime, 0, b"data", "runtime state");
        assert_eq!(m.description_str(), "runtime state");
    }
}
