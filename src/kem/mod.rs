//! ML-KEM-1024-shaped module-lattice key encapsulation mechanism.
//!
//! Module rank `K = 4`, ring degree `n = 256`, modulus `q = 3329`. The outer KEM
//! ([`kem::kem_keypair`], [`kem::kem_encapsulate`], [`kem::kem_decapsulate`]) wraps the
//! IND-CPA `K-PKE` scheme ([`k_pke`]) with the Fujisaki-Okamoto transform and implicit
//! rejection on a mismatched ciphertext.

mod byte_fns;
mod field;
mod helpers;
mod k_pke;
#[allow(clippy::module_inception)]
mod kem;
mod ntt;
mod sampling;

pub use kem::{kem_decapsulate, kem_encapsulate, kem_keypair};
pub use kem::{KemCiphertext, KemPublicKey, KemSecretKey, SharedSecret};

/// Field modulus shared by every coefficient in `R_q`.
pub(crate) const Q: u16 = 3329;
/// Primitive 256th root of unity used to build the NTT zeta table.
pub(crate) const ZETA: u16 = 17;

/// Module rank.
const K: usize = 4;
/// Noise parameter for both secret and error terms.
const ETA1: u32 = 2;
/// Noise parameter for the encryption-time error terms.
const ETA2: u32 = 2;
/// Ciphertext compression width for the `u` component.
const DU: u32 = 11;
/// Ciphertext compression width for the `v` component.
const DV: u32 = 5;

const ETA1_64: usize = ETA1 as usize * 64;
const ETA2_64: usize = ETA2 as usize * 64;

/// Serialized encryption-key length: `384*K + 32`.
const EK_PKE_LEN: usize = 384 * K + 32;
/// Serialized decryption-key length: `384*K`.
const DK_PKE_LEN: usize = 384 * K;
/// Serialized ciphertext length: `32*(DU*K + DV)`.
const CT_LEN_INNER: usize = 32 * (DU as usize * K + DV as usize);

/// Serialized KEM public key length (matches the byte-exact size in the external API table).
pub const EK_LEN: usize = EK_PKE_LEN;
/// Serialized KEM secret key length: `dkPKE || ekPKE || H(ekPKE) || z`.
pub const DK_LEN: usize = DK_PKE_LEN + EK_PKE_LEN + 32 + 32;
/// Serialized KEM ciphertext length (matches the byte-exact size in the external API table).
pub const CT_LEN: usize = CT_LEN_INNER;
/// Serialized KEM shared-secret length.
pub const SS_LEN: usize = 32;
