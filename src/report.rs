//! The canonical, fixed-layout attestation report: serialization, parsing, and the digest
//! computation the signature covers.
//!
//! Grounded on the reference engine's `attestation_generate_report`/`attestation_report_t`.
//! The reference hashes `sizeof(attestation_report_t) - sizeof(signature)`, which — because
//! `signature_length` precedes the `signature` array in that struct — already places
//! `signature_length` inside the signed prefix and excludes only the raw signature bytes.
//! This codec follows that exact cut, per SPEC_FULL.md §4.8/§9: the signed prefix is
//! everything up to and including `signature_length`.

use crate::dsa::{SigPublicKey, Signature, SIG_LEN, SIG_PK_LEN};
use crate::error::{AttestError, Result};
use crate::keccak::sha3_256;
use crate::measurement::{Measurement, MeasurementType, DESCRIPTION_LEN, MEASUREMENT_WIRE_LEN};
use crate::pcr::PCR_COUNT;

/// The report format version this codec produces and accepts.
pub const REPORT_VERSION: u32 = 1;

/// Maximum number of measurements a single report can carry (distinct from the log's much
/// larger [`crate::measurement::LOG_CAPACITY`]).
pub const MAX_REPORT_MEASUREMENTS: usize = 32;

const OFF_DEVICE_ID: usize = 0;
const OFF_TIMESTAMP: usize = OFF_DEVICE_ID + 32;
const OFF_VERSION: usize = OFF_TIMESTAMP + 8;
const OFF_MEASUREMENT_COUNT: usize = OFF_VERSION + 4;
const OFF_PCR: usize = OFF_MEASUREMENT_COUNT + 4;
const OFF_MEASUREMENTS: usize = OFF_PCR + PCR_COUNT * 32;
const OFF_SIGNATURE_LENGTH: usize = OFF_MEASUREMENTS + MAX_REPORT_MEASUREMENTS * MEASUREMENT_WIRE_LEN;
const OFF_SIGNATURE: usize = OFF_SIGNATURE_LENGTH + 4;

/// Length of the signed prefix: every byte up to and including `signature_length`, excluding
/// the raw signature bytes that follow it.
pub const SIGNED_PREFIX_LEN: usize = OFF_SIGNATURE;

/// Total wire length of a serialized report.
pub const REPORT_LEN: usize = OFF_SIGNATURE + SIG_LEN;

/// A signed, structured attestation report.
#[derive(Clone)]
pub struct AttestationReport {
    /// The attesting device's identity, the first 32 bytes of its configured serial.
    pub device_id: [u8; 32],
    /// Report build time, Unix seconds.
    pub timestamp: u64,
    /// Report format version; always [`REPORT_VERSION`] for a report this crate builds.
    pub version: u32,
    /// Number of measurements carried (`measurements.len()`).
    pub measurement_count: u32,
    /// A snapshot of every PCR register at build time.
    pub pcr_snapshot: [[u8; 32]; PCR_COUNT],
    /// Up to [`MAX_REPORT_MEASUREMENTS`] measurements, in collection order.
    pub measurements: Vec<Measurement>,
    /// Byte length of `signature`'s encoded form; always [`SIG_LEN`] for a signature produced
    /// by this crate's `dsa` module.
    pub signature_length: u32,
    /// The device's signature over `digest()`.
    pub signature: Signature,
}

fn encode_measurement(m: &Measurement, out: &mut [u8]) {
    debug_assert_eq!(out.len(), MEASUREMENT_WIRE_LEN);
    out[0] = u8::try_from(m.pcr_index).unwrap_or(0xFF);
    out[1] = m.measurement_type as u8;
    out[2..4].copy_from_slice(&[0u8; 2]);
    out[4..12].copy_from_slice(&m.timestamp.to_le_bytes());
    out[12..16].copy_from_slice(&m.size.to_le_bytes());
    out[16..48].copy_from_slice(&m.value);
    out[48..48 + DESCRIPTION_LEN].copy_from_slice(&m.description);
    // Remaining bytes (reserved) stay zero.
}

fn decode_measurement(bytes: &[u8]) -> Result<Measurement> {
    debug_assert_eq!(bytes.len(), MEASUREMENT_WIRE_LEN);
    let pcr_index = bytes[0] as usize;
    let measurement_type = MeasurementType::from_u8(bytes[1])?;
    let timestamp = u64::from_le_bytes(bytes[4..12].try_into().unwrap());
    let size = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    let mut value = [0u8; 32];
    value.copy_from_slice(&bytes[16..48]);
    let mut description = [0u8; DESCRIPTION_LEN];
    description.copy_from_slice(&bytes[48..48 + DESCRIPTION_LEN]);
    Ok(Measurement { pcr_index, measurement_type, timestamp, value, size, description })
}

impl AttestationReport {
    /// Writes the canonical signed-prefix bytes (everything up to and including
    /// `signature_length`) into `out`.
    fn encode_signed_prefix(&self, out: &mut [u8; SIGNED_PREFIX_LEN]) {
        out[OFF_DEVICE_ID..OFF_TIMESTAMP].copy_from_slice(&self.device_id);
        out[OFF_TIMESTAMP..OFF_VERSION].copy_from_slice(&self.timestamp.to_le_bytes());
        out[OFF_VERSION..OFF_MEASUREMENT_COUNT].copy_from_slice(&self.version.to_le_bytes());
        out[OFF_MEASUREMENT_COUNT..OFF_PCR].copy_from_slice(&self.measurement_count.to_le_bytes());
        for (i, pcr) in self.pcr_snapshot.iter().enumerate() {
            out[OFF_PCR + i * 32..OFF_PCR + (i + 1) * 32].copy_from_slice(pcr);
        }
        for slot in 0..MAX_REPORT_MEASUREMENTS {
            let start = OFF_MEASUREMENTS + slot * MEASUREMENT_WIRE_LEN;
            let end = start + MEASUREMENT_WIRE_LEN;
            if let Some(m) = self.measurements.get(slot) {
                encode_measurement(m, &mut out[start..end]);
            }
            // Unused slots are left zero-filled (the array starts zeroed by the caller).
        }
        out[OFF_SIGNATURE_LENGTH..OFF_SIGNATURE].copy_from_slice(&self.signature_length.to_le_bytes());
    }

    /// Computes `SHA3-256` over the canonical signed prefix; this is the value the signature
    /// covers.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut prefix = [0u8; SIGNED_PREFIX_LEN];
        self.encode_signed_prefix(&mut prefix);
        sha3_256(&prefix)
    }

    /// Serializes the full report, signed prefix followed by the raw signature bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; REPORT_LEN];
        let mut prefix = [0u8; SIGNED_PREFIX_LEN];
        self.encode_signed_prefix(&mut prefix);
        out[..SIGNED_PREFIX_LEN].copy_from_slice(&prefix);
        out[OFF_SIGNATURE..].copy_from_slice(self.signature.as_bytes());
        out
    }

    /// Parses a report from its wire form.
    ///
    /// This performs only structural decoding (exact length, measurement type codes). Version
    /// and count bounds, signature verification, and freshness are the verifier's job — see
    /// [`crate::verifier::verify_report`].
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidFormat`] if `bytes` is not exactly [`REPORT_LEN`] long, or
    /// [`AttestError::InvalidMeasurement`] if a measurement slot within `measurement_count`
    /// carries an out-of-range type code.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != REPORT_LEN {
            return Err(AttestError::InvalidFormat);
        }
        let mut device_id = [0u8; 32];
        device_id.copy_from_slice(&bytes[OFF_DEVICE_ID..OFF_TIMESTAMP]);
        let timestamp = u64::from_le_bytes(bytes[OFF_TIMESTAMP..OFF_VERSION].try_into().unwrap());
        let version = u32::from_le_bytes(bytes[OFF_VERSION..OFF_MEASUREMENT_COUNT].try_into().unwrap());
        let measurement_count = u32::from_le_bytes(bytes[OFF_MEASUREMENT_COUNT..OFF_PCR].try_into().unwrap());

        let mut pcr_snapshot = [[0u8; 32]; PCR_COUNT];
        for (i, pcr) in pcr_snapshot.iter_mut().enumerate() {
            pcr.copy_from_slice(&bytes[OFF_PCR + i * 32..OFF_PCR + (i + 1) * 32]);
        }

        let slots_present = (measurement_count as usize).min(MAX_REPORT_MEASUREMENTS);
        let mut measurements = Vec::with_capacity(slots_present);
        for slot in 0..slots_present {
            let start = OFF_MEASUREMENTS + slot * MEASUREMENT_WIRE_LEN;
            let end = start + MEASUREMENT_WIRE_LEN;
            measurements.push(decode_measurement(&bytes[start..end])?);
        }

        let signature_length =
            u32::from_le_bytes(bytes[OFF_SIGNATURE_LENGTH..OFF_SIGNATURE].try_into().unwrap());

        let mut sig_bytes = [0u8; SIG_LEN];
        sig_bytes.copy_from_slice(&bytes[OFF_SIGNATURE..]);

        Ok(Self {
            device_id,
            timestamp,
            version,
            measurement_count,
            pcr_snapshot,
            measurements,
            signature_length,
            signature: Signature::from_bytes(sig_bytes),
        })
    }
}

/// Verifies `report.signature` over `report.digest()` against `pk`.
///
/// Exposed here (rather than only via [`crate::verifier`]) so callers that already hold a
/// parsed report and a trusted key can check just the cryptographic half.
#[must_use]
pub fn verify_signature(report: &AttestationReport, pk: &SigPublicKey) -> bool {
    crate::dsa::sig_verify(pk, &report.digest(), &report.signature)
}

/// Serialized public key length, re-exported for callers assembling a verifier-side trust
/// store.
pub const REPORT_SIG_PK_LEN: usize = SIG_PK_LEN;

#[cfg(test)]
mod tests {
    use super::{AttestationReport, REPORT_LEN, REPORT_VERSION};
    use crate::measurement::{Measurement, MeasurementType};
    use crate::pcr::PCR_COUNT;

    fn sample_report(sig: crate::dsa::Signature) -> AttestationReport {
        let mut device_id = [0u8; 32];
        device_id[..4].copy_from_slice(b"dev0");
        AttestationReport {
            device_id,
            timestamp: 1_700_000_000,
            version: REPORT_VERSION,
            measurement_count: 1,
            pcr_snapshot: [[7u8; 32]; PCR_COUNT],
            measurements: vec![Measurement {
                pcr_index: 0,
                measurement_type: MeasurementType::Firmware,
                timestamp: 1_700_000_000,
                value: [9u8; 32],
                size: 11,
                description: [0u8; 64],
            }],
            signature_length: crate::dsa::SIG_LEN as u32,
            signature: sig,
        }
    }

    fn zero_signature() -> crate::dsa::Signature {
        crate::dsa::Signature::from_bytes([0u8; crate::dsa::SIG_LEN])
    }

    #[test]
    fn serialize_then_parse_round_trips_every_field() {
        let report = sample_report(zero_signature());
        let bytes = report.to_bytes();
        assert_eq!(bytes.len(), REPORT_LEN);

        let parsed = AttestationReport::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.device_id, report.device_id);
        assert_eq!(parsed.timestamp, report.timestamp);
        assert_eq!(parsed.version, report.version);
        assert_eq!(parsed.measurement_count, report.measurement_count);
        assert_eq!(parsed.pcr_snapshot, report.pcr_snapshot);
        assert_eq!(parsed.measurements.len(), report.measurements.len());
        assert_eq!(parsed.measurements[0].value, report.measurements[0].value);
        assert_eq!(parsed.signature.as_bytes(), report.signature.as_bytes());
    }

    #[test]
    fn reserialization_is_byte_identical() {
        let report = sample_report(zero_signature());
        let bytes = report.to_bytes();
        let parsed = AttestationReport::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn digest_excludes_raw_signature_bytes_but_includes_its_length() {
        let mut a = sample_report(zero_signature());
        let mut sig_bytes = [0u8; crate::dsa::SIG_LEN];
        sig_bytes[0] = 0xFF;
        let b_sig = crate::dsa::Signature::from_bytes(sig_bytes);
        let b = AttestationReport { signature: b_sig, ..sample_report(zero_signature()) };
        assert_eq!(a.digest(), b.digest());

        a.signature_length = a.signature_length.wrapping_add(1);
        assert_ne!(a.digest(), sample_report(zero_signature()).digest());
    }

    #[test]
    fn rejects_wrong_length_input() {
        let short = vec![0u8; REPORT_LEN - 1];
        assert!(AttestationReport::from_bytes(&short).is_err());
    }
}
