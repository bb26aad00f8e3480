//! Closed error hierarchy for the crate's fallible boundaries.
//!
//! Cryptographic *validation* failures (bad signature, malformed ciphertext) are not
//! represented here — `verify_report` reports them through [`crate::verifier::VerificationResult`]
//! instead of returning an `Err`. `AttestError` covers infrastructure failures: a starved RNG,
//! an out-of-range argument, a malformed fixed-size encoding at a deserialization boundary.

use thiserror::Error;

/// The crate's result alias; used at every fallible API boundary.
pub type Result<T> = core::result::Result<T, AttestError>;

/// Closed set of error kinds produced by this crate.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum AttestError {
    /// A caller-supplied argument was out of range or malformed (e.g. an oversized device
    /// serial, an `AttestationConfig.max_log_entries` above the hard cap).
    #[error("invalid parameter")]
    InvalidParameter,

    /// A fixed-size output buffer was too small for the data being written into it.
    #[error("insufficient buffer")]
    InsufficientBuffer,

    /// The injected random source could not produce the requested number of bytes.
    #[error("random number generator failed")]
    RngFailure,

    /// A signature failed structural decoding (not a verification failure — see
    /// [`crate::verifier::VerificationResult`] for that).
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// A ciphertext failed structural decoding.
    #[error("invalid ciphertext encoding")]
    InvalidCiphertext,

    /// A key failed structural decoding or a keypair consistency check.
    #[error("invalid key")]
    InvalidKey,

    /// A measurement or PCR read from the simulated hardware root failed.
    #[error("hardware failure")]
    HardwareFailure,

    /// The requested operation is not implemented by this build.
    #[error("not implemented")]
    NotImplemented,

    /// An invariant internal to the crate was violated; indicates a bug rather than bad
    /// caller input.
    #[error("internal error")]
    Internal,

    /// A serialized report failed a structural check (bad version, out-of-range count)
    /// before signature verification was even attempted.
    #[error("invalid report format")]
    InvalidFormat,

    /// A report's signature did not verify against the claimed device key. Surfaced through
    /// [`crate::verifier::VerificationResult::error`], never returned from `verify_report`
    /// itself.
    #[error("signature invalid")]
    SignatureInvalid,

    /// A report's timestamp fell outside the verifier's freshness window. Surfaced through
    /// [`crate::verifier::VerificationResult::error`].
    #[error("timestamp invalid")]
    TimestampInvalid,

    /// A PCR index named in a measurement or report fell outside the bank's range.
    #[error("invalid PCR index")]
    InvalidPcr,

    /// A measurement type code fell outside the closed set.
    #[error("invalid measurement type")]
    InvalidMeasurement,

    /// The measurement log reached its configured capacity.
    #[error("measurement log full")]
    LogFull,

    /// A policy constraint (e.g. `require_hardware_root`) was violated.
    #[error("policy violation")]
    PolicyViolation,

    /// A time-bounded artifact (report, certificate) is outside its validity window.
    #[error("expired")]
    Expired,
}
