//! The outer ML-KEM algorithm: keygen, encapsulate, and decapsulate with implicit rejection.

use super::helpers::{g, h};
use super::k_pke::{k_pke_decrypt, k_pke_encrypt, k_pke_key_gen};
use super::{CT_LEN, DK_LEN, DK_PKE_LEN, DU, DV, EK_LEN, EK_PKE_LEN, ETA1_64, ETA2_64, K};
use crate::error::{AttestError, Result};
use crate::keccak::sha3_256_concat;
use crate::rng;
use crate::secure_mem::{ct_eq, ct_select};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A KEM public (encapsulation) key: `t`-vector packed to 12 bits/coefficient, followed by
/// the 32-byte seed `ρ` used to regenerate the public matrix `A`.
#[derive(Clone)]
pub struct KemPublicKey([u8; EK_LEN]);

impl KemPublicKey {
    /// Borrows the fixed-size encoded form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; EK_LEN] { &self.0 }

    /// Reconstructs a public key from its encoded form. No deeper validation is performed
    /// here; malformed matrix entries surface as an [`AttestError::InvalidKey`] the first
    /// time they would be decoded, inside `encapsulate`.
    #[must_use]
    pub fn from_bytes(bytes: [u8; EK_LEN]) -> Self { Self(bytes) }
}

/// A KEM secret (decapsulation) key: `s`-vector, the embedded public key, `H(pk)`, and the
/// 32-byte implicit-rejection value `z`. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KemSecretKey([u8; DK_LEN]);

impl KemSecretKey {
    /// Borrows the fixed-size encoded form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DK_LEN] { &self.0 }

    /// Reconstructs a secret key from its encoded form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; DK_LEN]) -> Self { Self(bytes) }

    fn dk_pke(&self) -> &[u8] { &self.0[0..DK_PKE_LEN] }

    fn ek_pke(&self) -> &[u8] { &self.0[DK_PKE_LEN..DK_PKE_LEN + EK_PKE_LEN] }

    fn h(&self) -> &[u8] { &self.0[DK_PKE_LEN + EK_PKE_LEN..DK_PKE_LEN + EK_PKE_LEN + 32] }

    fn z(&self) -> &[u8] { &self.0[DK_PKE_LEN + EK_PKE_LEN + 32..] }
}

/// A KEM ciphertext: the compressed `u` and `v` components.
#[derive(Clone)]
pub struct KemCiphertext([u8; CT_LEN]);

impl KemCiphertext {
    /// Borrows the fixed-size encoded form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; CT_LEN] { &self.0 }

    /// Reconstructs a ciphertext from its encoded form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; CT_LEN]) -> Self { Self(bytes) }
}

/// A 32-byte shared secret produced by encapsulation or decapsulation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Borrows the raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }
}

/// Generates a fresh `(public key, secret key)` pair.
///
/// # Errors
/// Returns [`AttestError::RngFailure`] if the injected random source is exhausted.
pub fn kem_keypair(rng: &mut impl CryptoRngCore) -> Result<(KemPublicKey, KemSecretKey)> {
    let mut ek = [0u8; EK_PKE_LEN];
    let mut dk = [0u8; DK_LEN];
    k_pke_key_gen::<K, ETA1_64>(rng, &mut ek, &mut dk[..DK_PKE_LEN])?;

    let mut z = [0u8; 32];
    rng::fill(rng, &mut z)?;

    let h_ek = h(&ek);
    dk[DK_PKE_LEN..DK_PKE_LEN + EK_PKE_LEN].copy_from_slice(&ek);
    dk[DK_PKE_LEN + EK_PKE_LEN..DK_PKE_LEN + EK_PKE_LEN + 32].copy_from_slice(&h_ek);
    dk[DK_PKE_LEN + EK_PKE_LEN + 32..].copy_from_slice(&z);

    Ok((KemPublicKey(ek), KemSecretKey(dk)))
}

/// Encapsulates a fresh shared secret against `ek`, returning `(shared secret, ciphertext)`.
///
/// # Errors
/// Returns [`AttestError::RngFailure`] if the injected random source is exhausted, or
/// [`AttestError::InvalidKey`] if `ek` fails to decode (e.g. an out-of-range packed coefficient).
pub fn kem_encapsulate(
    rng: &mut impl CryptoRngCore, ek: &KemPublicKey,
) -> Result<(SharedSecret, KemCiphertext)> {
    let mut m = [0u8; 32];
    rng::fill(rng, &mut m)?;

    let h_ek = h(&ek.0);
    let (k_bar, r_seed) = g(&[&m, &h_ek]);

    let mut ct = [0u8; CT_LEN];
    k_pke_encrypt::<K, ETA1_64, ETA2_64>(DU, DV, &ek.0, &m, &r_seed, &mut ct)?;

    let h_ct = h(&ct);
    let ss = sha3_256_concat(&k_bar, &h_ct);
    Ok((SharedSecret(ss), KemCiphertext(ct)))
}

/// Decapsulates `ct` under `dk`, returning a shared secret.
///
/// This is a total function: an invalid or tampered ciphertext never errors, it yields a
/// pseudo-random shared secret indistinguishable (without `z`) from a valid one, via implicit
/// rejection. Infrastructure-level failures (malformed fixed-size key bytes) are the only
/// `Err` this can produce, and none occur on this call path since both `dk` and `ct` are
/// fixed-size wire types validated at construction.
pub fn kem_decapsulate(dk: &KemSecretKey, ct: &KemCiphertext) -> SharedSecret {
    // Ciphertext decryption: total over any CT_LEN-byte input per FIPS 203 K-PKE.Decrypt.
    let m_prime = k_pke_decrypt::<K>(DU, DV, dk.dk_pke(), &ct.0)
        .expect("K-PKE.Decrypt is total over fixed-size ciphertexts");
    let (k_prime, r_prime) = g(&[&m_prime, dk.h()]);

    let mut c_prime = [0u8; CT_LEN];
    k_pke_encrypt::<K, ETA1_64, ETA2_64>(DU, DV, dk.ek_pke(), &m_prime, &r_prime, &mut c_prime)
        .expect("K-PKE.Encrypt is total given a well-formed embedded ek");

    let h_ct = h(&ct.0);
    let accept = sha3_256_concat(&k_prime, &h_ct);
    let reject = sha3_256_concat(dk.z(), &h_ct);

    let matches = ct_eq(&ct.0, &c_prime);
    let mut out = reject;
    ct_select(&mut out, &accept, matches);
    SharedSecret(out)
}

#[cfg(test)]
mod tests {
    use super::{kem_decapsulate, kem_encapsulate, kem_keypair, KemCiphertext};
    use rand_core::SeedableRng;

    #[test]
    fn encapsulate_then_decapsulate_agree() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        let (ek, dk) = kem_keypair(&mut rng).unwrap();
        let (ss_sender, ct) = kem_encapsulate(&mut rng, &ek).unwrap();
        let ss_receiver = kem_decapsulate(&dk, &ct);
        assert_eq!(ss_sender.as_bytes(), ss_receiver.as_bytes());
    }

    #[test]
    fn tampered_ciphertext_still_returns_32_deterministic_bytes() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(43);
        let (ek, dk) = kem_keypair(&mut rng).unwrap();
        let (_, ct) = kem_encapsulate(&mut rng, &ek).unwrap();

        let mut tampered = *ct.as_bytes();
        tampered[0] ^= 0xFF;
        let tampered = KemCiphertext::from_bytes(tampered);

        let ss1 = kem_decapsulate(&dk, &tampered);
        let ss2 = kem_decapsulate(&dk, &tampered);
        assert_eq!(ss1.as_bytes(), ss2.as_bytes());
    }

    #[test]
    fn distinct_keypairs_yield_distinct_ciphertexts() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(44);
        let (ek1, _) = kem_keypair(&mut rng).unwrap();
        let (ek2, _) = kem_keypair(&mut rng).unwrap();
        assert_ne!(ek1.as_bytes()[..], ek2.as_bytes()[..]);
    }
}
