#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

// Quantum-resistant device attestation for constrained edge devices: a Keccak-f[1600]/SHA-3/
// SHAKE implementation, an ML-KEM-1024-shaped key encapsulation mechanism, an
// ML-DSA-5-shaped digital signature scheme, and a PCR-based measurement and attestation-report
// layer built on top of them.
//
// Component map (see DESIGN.md for the full grounding ledger):
//
//   secure_mem  -- constant-time compare/select, non-elidable zeroing       (C1)
//   rng         -- injected random source boundary                         (C2)
//   keccak      -- Keccak-f[1600], SHA3-256/512, SHAKE128/256               (C3)
//   kem         -- ML-KEM-1024-shaped KEM                                   (C4)
//   dsa         -- ML-DSA-5-shaped signature scheme                        (C5)
//   pcr         -- N=8 PCR register bank with hash-chain extend             (C6)
//   measurement -- typed measurement collection + bounded log               (C7)
//   report      -- canonical report codec + digest                         (C8)
//   verifier    -- structural + signature + freshness verification         (C9)
//   context     -- AttestationContext: the owner of keypair/PCRs/log
//   config      -- AttestationConfig / DeviceType
//
// No operation in this crate reaches for ambient entropy, a system clock, or hardware
// introspection on its own: random bytes, the current time, and raw measurement bytes all
// cross the boundary as explicit parameters or through the `MeasurementSource` trait, per
// SPEC_FULL.md's external-interfaces section. There is no process-wide mutable state; every
// operation is a method on an explicitly held `AttestationContext` or a free function over its
// arguments.

mod config;
mod context;
mod dsa;
mod error;
mod keccak;
mod kem;
mod measurement;
mod pcr;
mod rng;
mod report;
mod secure_mem;
mod verifier;

pub use config::{heapless_serial::Serial, AttestationConfig, DeviceType, MAX_SERIAL_LEN};
pub use context::AttestationContext;
pub use dsa::{sig_keypair, sig_sign, sig_verify, SigPublicKey, SigSecretKey, Signature};
pub use dsa::{SIG_LEN, SIG_PK_LEN, SIG_SK_LEN};
pub use error::{AttestError, Result};
pub use kem::{kem_decapsulate, kem_encapsulate, kem_keypair};
pub use kem::{KemCiphertext, KemPublicKey, KemSecretKey, SharedSecret};
pub use kem::{CT_LEN as KEM_CT_LEN, DK_LEN as KEM_DK_LEN, EK_LEN as KEM_EK_LEN, SS_LEN as KEM_SS_LEN};
pub use measurement::{
    Measurement, MeasurementComponent, MeasurementLog, MeasurementSource, MeasurementType,
    SimulatedMeasurementSource, LOG_CAPACITY,
};
pub use pcr::{PcrBank, PCR_COUNT};
pub use report::{AttestationReport, MAX_REPORT_MEASUREMENTS, REPORT_LEN, REPORT_VERSION};
pub use verifier::{verify_report, TrustLevel, VerificationResult, FRESHNESS_WINDOW_SECS};

/// The `rand_core` types a caller needs to implement or pass an injected random source,
/// re-exported so dependents do not have to pin their own compatible version.
pub use rand_core::{CryptoRng, CryptoRngCore, Error as RngError, RngCore};

/// The SHA-3 / SHAKE primitives, exposed directly for callers that need a hash or XOF without
/// going through the attestation layer (e.g. to implement a [`MeasurementSource`]), matching
/// SPEC_FULL.md's abstract `keccak::{sha3_256, sha3_512, shake128, shake256}` API surface.
pub mod hash {
    use crate::error::{AttestError, Result};

    /// Per-call output cap for the XOFs below, per SPEC_FULL.md §4.3.
    pub const MAX_XOF_OUTPUT: usize = 65_536;

    /// SHA3-256 of `data`.
    #[must_use]
    pub fn sha3_256(data: &[u8]) -> [u8; 32] { crate::keccak::sha3_256(data) }

    /// SHA3-512 of `data`.
    #[must_use]
    pub fn sha3_512(data: &[u8]) -> [u8; 64] { crate::keccak::sha3_512(data) }

    /// SHAKE128(`data`), squeezing exactly `out.len()` bytes.
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidParameter`] if `out.len()` exceeds [`MAX_XOF_OUTPUT`].
    pub fn shake128(data: &[u8], out: &mut [u8]) -> Result<()> {
        if out.len() > MAX_XOF_OUTPUT {
            return Err(AttestError::InvalidParameter);
        }
        crate::keccak::shake128().absorb(data).squeeze(out);
        Ok(())
    }

    /// SHAKE256(`data`), squeezing exactly `out.len()` bytes.
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidParameter`] if `out.len()` exceeds [`MAX_XOF_OUTPUT`].
    pub fn shake256(data: &[u8], out: &mut [u8]) -> Result<()> {
        if out.len() > MAX_XOF_OUTPUT {
            return Err(AttestError::InvalidParameter);
        }
        crate::keccak::shake256().absorb(data).squeeze(out);
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::{sha3_256, shake128};

        #[test]
        fn sha3_256_empty_matches_known_answer() {
            let digest = sha3_256(b"");
            let expected = hex_literal::hex!(
                "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
            );
            assert_eq!(digest, expected);
        }

        #[test]
        fn shake128_rejects_oversized_output() {
            let mut out = vec![0u8; super::MAX_XOF_OUTPUT + 1];
            assert!(shake128(b"seed", &mut out).is_err());
        }
    }
}
