//! Injectable random source.
//!
//! The core never reaches for ambient entropy itself; every keygen, encapsulate, and sign
//! call takes `&mut impl CryptoRngCore` at its boundary, mirroring the pattern the teacher
//! threads through `k_pke_key_gen`/`ml_kem_encaps` — so an OS-entropy generator, a hardware
//! TRNG adapter, or a seeded deterministic generator in tests can all be passed with no
//! adapter code.

pub use rand_core::{CryptoRng, CryptoRngCore, Error as RngError, RngCore};

use crate::error::{AttestError, Result};

/// Fills `buf` with fresh random bytes, translating an `rng` failure into [`AttestError::RngFailure`].
pub(crate) fn fill(rng: &mut impl CryptoRngCore, buf: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(buf).map_err(|_| AttestError::RngFailure)
}
