//! Remote verification of a serialized attestation report.
//!
//! Grounded on the reference engine's `attestation_verify_report`: version check,
//! measurement-count bound, digest recompute + signature verify, `abs()` timestamp window of
//! 300 seconds, then per-measurement PCR-index/type bounds. As in the reference, a
//! cryptographic validation failure is reported in the result, not raised as an error — see
//! SPEC_FULL.md §7.

use crate::dsa::SigPublicKey;
use crate::error::AttestError;
use crate::measurement::MeasurementType;
use crate::pcr::PCR_COUNT;
use crate::report::{AttestationReport, MAX_REPORT_MEASUREMENTS, REPORT_VERSION};

/// Allowed clock skew, in seconds, between a report's `timestamp` and the verifier's clock.
pub const FRESHNESS_WINDOW_SECS: u64 = 300;

/// The coarse trust level a verified report is assigned.
///
/// The reference computes this field but only ever assigns one value ("could be computed
/// based on measurements" is left as a comment); SPEC_FULL.md does not name a richer scale
/// either, so this crate keeps the closed two-variant set the reference's behavior implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustLevel {
    /// All structural, cryptographic, and freshness checks passed.
    High,
    /// The report failed at least one check; see [`VerificationResult::error`].
    None,
}

/// The outcome of [`verify_report`]. Never represents a cryptographic failure as an `Err` —
/// only infrastructure failures (which cannot occur on this call path) would do that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether every check passed.
    pub valid: bool,
    /// The assigned trust level.
    pub trust_level: TrustLevel,
    /// The first failing check, if any.
    pub error: Option<AttestError>,
    /// The report's claimed device id, regardless of verification outcome.
    pub device_id: [u8; 32],
    /// The report's claimed timestamp, regardless of verification outcome.
    pub timestamp: u64,
}

impl VerificationResult {
    fn reject(report: &AttestationReport, error: AttestError) -> Self {
        Self {
            valid: false,
            trust_level: TrustLevel::None,
            error: Some(error),
            device_id: report.device_id,
            timestamp: report.timestamp,
        }
    }

    fn accept(report: &AttestationReport) -> Self {
        Self {
            valid: true,
            trust_level: TrustLevel::High,
            error: None,
            device_id: report.device_id,
            timestamp: report.timestamp,
        }
    }
}

/// Verifies a parsed report's structure, signature, and freshness against `device_pk` and the
/// caller-supplied current time.
///
/// Checks run in the order named in SPEC_FULL.md §4.9 and stop at the first failure:
/// 1. `version == 1` and `measurement_count <= 32` ([`AttestError::InvalidFormat`]).
/// 2. The signature over `report.digest()` verifies against `device_pk`
///    ([`AttestError::SignatureInvalid`]).
/// 3. `|clock_now - report.timestamp| <= 300` seconds ([`AttestError::TimestampInvalid`]).
/// 4. Every measurement's `pcr_index < 8` ([`AttestError::InvalidPcr`]) — the type code was
///    already validated structurally when the report was parsed, so this step can only ever
///    trip on the PCR bound in practice.
#[must_use]
pub fn verify_report(report: &AttestationReport, device_pk: &SigPublicKey, clock_now: u64) -> VerificationResult {
    if report.version != REPORT_VERSION || report.measurement_count as usize > MAX_REPORT_MEASUREMENTS {
        return VerificationResult::reject(report, AttestError::InvalidFormat);
    }

    if !crate::report::verify_signature(report, device_pk) {
        return VerificationResult::reject(report, AttestError::SignatureInvalid);
    }

    let skew = report.timestamp.abs_diff(clock_now);
    if skew > FRESHNESS_WINDOW_SECS {
        return VerificationResult::reject(report, AttestError::TimestampInvalid);
    }

    for measurement in &report.measurements {
        if measurement.pcr_index >= PCR_COUNT {
            return VerificationResult::reject(report, AttestError::InvalidPcr);
        }
        // Type codes are validated during `AttestationReport::from_bytes`; `from_u8` would
        // reject anything `>= 8` there, so re-checking here only guards a report built
        // in-process (never parsed) with a hand-constructed `Measurement`.
        if MeasurementType::from_u8(measurement.measurement_type as u8).is_err() {
            return VerificationResult::reject(report, AttestError::InvalidMeasurement);
        }
    }

    VerificationResult::accept(report)
}
