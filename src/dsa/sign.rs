//! The outer ML-DSA algorithm: keygen, sign, and verify.
//!
//! Grounded on the measurement-engine reference's `dilithium_keypair`/`dilithium_sign`/
//! `dilithium_verify` control flow, with its `SampleInBall` bug, unpacked secret-key fields,
//! and lossy hint encoding replaced by [`super::sampling::sample_in_ball`] and the packing
//! routines in [`super::packing`].

use super::field::{centered, fq_add, fq_sub};
use super::ntt::{ntt, ntt_inv, pointwise_mul};
use super::packing::{
    pack_bits, pack_eta, pack_hint, pack_t0, pack_t1, pack_z, unpack_eta, unpack_hint,
    unpack_t0, unpack_t1, unpack_z, HINT_LEN,
};
use super::rounding::{decompose, make_hint, power2round, use_hint};
use super::sampling::{poly_uniform, poly_uniform_eta, poly_uniform_gamma1, sample_in_ball};
use super::{BETA, GAMMA1, GAMMA2, K, L, OMEGA, Q, SIG_LEN, SIG_PK_LEN, SIG_SK_LEN, TAU};
use crate::error::Result;
use crate::keccak::{sha3_512, sha3_512_concat, shake256};
use crate::rng;
use crate::secure_mem::ct_eq;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A signature public (verification) key: `rho || pack_t1(t1)`.
#[derive(Clone)]
pub struct SigPublicKey([u8; SIG_PK_LEN]);

impl SigPublicKey {
    /// Borrows the fixed-size encoded form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIG_PK_LEN] { &self.0 }

    /// Reconstructs a public key from its encoded form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; SIG_PK_LEN]) -> Self { Self(bytes) }

    fn rho(&self) -> &[u8; 32] { self.0[0..32].try_into().unwrap() }

    fn t1(&self) -> [[i32; 256]; K] {
        let mut t1 = [[0i32; 256]; K];
        unpack_t1(&self.0[32..], &mut t1);
        t1
    }
}

/// A signature secret (signing) key: `rho || key || tr || pack_eta(s1) || pack_eta(s2) ||
/// pack_t0(t0)`. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigSecretKey([u8; SIG_SK_LEN]);

const OFF_RHO: usize = 0;
const OFF_KEY: usize = OFF_RHO + 32;
const OFF_TR: usize = OFF_KEY + 32;
const OFF_S1: usize = OFF_TR + 64;
const OFF_S2: usize = OFF_S1 + L * 96;
const OFF_T0: usize = OFF_S2 + K * 96;

impl SigSecretKey {
    /// Borrows the fixed-size encoded form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIG_SK_LEN] { &self.0 }

    /// Reconstructs a secret key from its encoded form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; SIG_SK_LEN]) -> Self { Self(bytes) }

    fn rho(&self) -> &[u8; 32] { self.0[OFF_RHO..OFF_KEY].try_into().unwrap() }

    fn key(&self) -> &[u8; 32] { self.0[OFF_KEY..OFF_TR].try_into().unwrap() }

    fn tr(&self) -> &[u8] { &self.0[OFF_TR..OFF_S1] }

    fn s1(&self) -> [[i32; 256]; L] {
        let mut s1 = [[0i32; 256]; L];
        unpack_eta(&self.0[OFF_S1..OFF_S2], &mut s1);
        s1
    }

    fn s2(&self) -> [[i32; 256]; K] {
        let mut s2 = [[0i32; 256]; K];
        unpack_eta(&self.0[OFF_S2..OFF_T0], &mut s2);
        s2
    }

    fn t0(&self) -> [[i32; 256]; K] {
        let mut t0 = [[0i32; 256]; K];
        unpack_t0(&self.0[OFF_T0..], &mut t0);
        t0
    }
}

/// A signature: `c_tilde || pack_z(z) || pack_hint(h)`.
#[derive(Clone)]
pub struct Signature([u8; SIG_LEN]);

const OFF_CTILDE: usize = 0;
const OFF_Z: usize = OFF_CTILDE + 32;
const OFF_HINT: usize = OFF_Z + L * (32 * 20);

impl Signature {
    /// Borrows the fixed-size encoded form.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIG_LEN] { &self.0 }

    /// Reconstructs a signature from its encoded form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; SIG_LEN]) -> Self { Self(bytes) }

    fn c_tilde(&self) -> &[u8; 32] { self.0[OFF_CTILDE..OFF_Z].try_into().unwrap() }

    fn z(&self) -> [[i32; 256]; L] {
        let mut z = [[0i32; 256]; L];
        unpack_z(&self.0[OFF_Z..OFF_HINT], &mut z);
        z
    }

    fn hint(&self) -> Option<[[bool; 256]; K]> { unpack_hint(&self.0[OFF_HINT..]) }
}

/// Expands the public matrix `A` (`K` rows, `L` columns), already in NTT-domain form, from the
/// 32-byte seed `rho`.
fn expand_a(rho: &[u8; 32]) -> [[[i32; 256]; L]; K] {
    core::array::from_fn(|i| core::array::from_fn(|j| poly_uniform(rho, i as u8, j as u8)))
}

/// `A_hat . v_hat`, row by row, returning the inverse-transformed (standard-domain) result.
fn mat_vec_mul(a_hat: &[[[i32; 256]; L]; K], v_hat: &[[i32; 256]; L]) -> [[i32; 256]; K] {
    core::array::from_fn(|i| {
        let mut acc = [0i32; 256];
        for j in 0..L {
            let prod = pointwise_mul(&a_hat[i][j], &v_hat[j]);
            for n in 0..256 {
                acc[n] = fq_add(acc[n], prod[n]);
            }
        }
        ntt_inv(&acc)
    })
}

fn ntt_vec<const N: usize>(v: &[[i32; 256]; N]) -> [[i32; 256]; N] {
    core::array::from_fn(|i| ntt(&v[i]))
}

/// `c . v`, for a single NTT-domain challenge `c_hat` and a standard-domain vector `v`.
fn scale_by_challenge<const N: usize>(c_hat: &[i32; 256], v: &[[i32; 256]; N]) -> [[i32; 256]; N] {
    core::array::from_fn(|i| ntt_inv(&pointwise_mul(c_hat, &ntt(&v[i]))))
}

/// Packs `w1` (`K` polynomials, each coefficient in `[0, (Q-1)/(2*GAMMA2))`) at 4 bits/coeff
/// for the challenge hash input.
fn pack_w1(w1: &[[i32; 256]; K]) -> [u8; K * 128] {
    let mut out = [0u8; K * 128];
    for (i, poly) in w1.iter().enumerate() {
        pack_bits(4, poly, &mut out[i * 128..(i + 1) * 128]);
    }
    out
}

/// Generates a fresh `(public key, secret key)` pair.
///
/// # Errors
/// Returns [`AttestError::RngFailure`] if the injected random source is exhausted.
pub fn sig_keypair(rng: &mut impl CryptoRngCore) -> Result<(SigPublicKey, SigSecretKey)> {
    let mut seed = [0u8; 32];
    rng::fill(rng, &mut seed)?;

    let mut expanded = [0u8; 128];
    let mut shake = shake256();
    shake.absorb(&seed);
    shake.squeeze(&mut expanded);
    let rho: [u8; 32] = expanded[0..32].try_into().unwrap();
    let rho_prime: [u8; 64] = expanded[32..96].try_into().unwrap();
    let key: [u8; 32] = expanded[96..128].try_into().unwrap();

    let a_hat = expand_a(&rho);
    let s1: [[i32; 256]; L] = core::array::from_fn(|i| poly_uniform_eta(&rho_prime, i as u16));
    let s2: [[i32; 256]; K] =
        core::array::from_fn(|i| poly_uniform_eta(&rho_prime, (L + i) as u16));

    let s1_hat = ntt_vec(&s1);
    let mut t: [[i32; 256]; K] = mat_vec_mul(&a_hat, &s1_hat);
    for i in 0..K {
        for n in 0..256 {
            t[i][n] = fq_add(t[i][n], s2[i][n]);
        }
    }

    let mut t1 = [[0i32; 256]; K];
    let mut t0 = [[0i32; 256]; K];
    for i in 0..K {
        for n in 0..256 {
            let (a1, a0) = power2round(t[i][n]);
            t1[i][n] = a1;
            t0[i][n] = a0;
        }
    }

    let mut pk = [0u8; SIG_PK_LEN];
    pk[0..32].copy_from_slice(&rho);
    pack_t1(&t1, &mut pk[32..]);

    let tr = sha3_512(&pk);

    let mut sk = [0u8; SIG_SK_LEN];
    sk[OFF_RHO..OFF_KEY].copy_from_slice(&rho);
    sk[OFF_KEY..OFF_TR].copy_from_slice(&key);
    sk[OFF_TR..OFF_S1].copy_from_slice(&tr);
    pack_eta(&s1, &mut sk[OFF_S1..OFF_S2]);
    pack_eta(&s2, &mut sk[OFF_S2..OFF_T0]);
    pack_t0(&t0, &mut sk[OFF_T0..]);

    Ok((SigPublicKey(pk), SigSecretKey(sk)))
}

/// Signs `message` under `sk`, producing a signature via Fiat-Shamir-with-aborts rejection
/// sampling. Freshness for each retry is drawn from `rng`; the loop has no hard iteration cap
/// (each attempt succeeds with overwhelming probability in only a few tries).
///
/// # Errors
/// Returns [`AttestError::RngFailure`] if the injected random source is exhausted.
pub fn sig_sign(sk: &SigSecretKey, message: &[u8], rng: &mut impl CryptoRngCore) -> Result<Signature> {
    let rho = *sk.rho();
    let key = *sk.key();
    let tr = sk.tr();
    let s1 = sk.s1();
    let s2 = sk.s2();
    let t0 = sk.t0();

    let mu = sha3_512_concat(tr, message);

    let mut rho_pp = [0u8; 64];
    let mut fresh = [0u8; 32];
    rng::fill(rng, &mut fresh)?;
    let mut shake = shake256();
    shake.absorb(&key);
    shake.absorb(&fresh);
    shake.absorb(&mu);
    shake.squeeze(&mut rho_pp);

    let a_hat = expand_a(&rho);
    let s1_hat = ntt_vec(&s1);
    let t0_hat = ntt_vec(&t0);

    let mut kappa: u32 = 0;
    loop {
        let y: [[i32; 256]; L] = core::array::from_fn(|i| {
            poly_uniform_gamma1(&rho_pp, (kappa as usize * L + i) as u16)
        });
        let y_hat = ntt_vec(&y);
        let w: [[i32; 256]; K] = mat_vec_mul(&a_hat, &y_hat);

        let mut w1 = [[0i32; 256]; K];
        let mut w0 = [[0i32; 256]; K];
        for i in 0..K {
            for n in 0..256 {
                let (r1, r0) = decompose(w[i][n], GAMMA2);
                w1[i][n] = r1;
                w0[i][n] = r0;
            }
        }

        let packed_w1 = pack_w1(&w1);
        let mut c_tilde = [0u8; 32];
        let mut shake = shake256();
        shake.absorb(&mu);
        shake.absorb(&packed_w1);
        shake.squeeze(&mut c_tilde);

        let c_poly = sample_in_ball(&c_tilde, TAU);
        let c_hat = ntt(&c_poly);

        let cs1 = scale_by_challenge(&c_hat, &s1);
        let mut z = [[0i32; 256]; L];
        let mut z_ok = true;
        for i in 0..L {
            for n in 0..256 {
                z[i][n] = fq_add(y[i][n], cs1[i][n]);
                if centered(z[i][n]).unsigned_abs() as i64 >= i64::from(GAMMA1) - i64::from(BETA) {
                    z_ok = false;
                }
            }
        }

        let cs2 = scale_by_challenge(&c_hat, &s2);
        let mut r0_ok = true;
        for i in 0..K {
            for n in 0..256 {
                let r0 = w0[i][n] - centered(cs2[i][n]);
                if r0.abs() >= GAMMA2 - BETA {
                    r0_ok = false;
                }
            }
        }

        kappa = kappa.wrapping_add(1);
        if !z_ok || !r0_ok {
            continue;
        }

        let ct0: [[i32; 256]; K] =
            core::array::from_fn(|i| ntt_inv(&pointwise_mul(&c_hat, &t0_hat[i])));

        let mut hint = [[false; 256]; K];
        let mut hint_ok = true;
        let mut weight = 0usize;
        for i in 0..K {
            for n in 0..256 {
                if centered(ct0[i][n]).unsigned_abs() as i64 >= i64::from(GAMMA2) {
                    hint_ok = false;
                }
                let z_term = fq_sub(ct0[i][n], cs2[i][n]);
                let h = make_hint(z_term, w[i][n], GAMMA2);
                hint[i][n] = h;
                if h {
                    weight += 1;
                }
            }
        }
        if !hint_ok || weight > OMEGA {
            continue;
        }

        let Some(packed_hint) = pack_hint(&hint) else { continue };

        let mut sig = [0u8; SIG_LEN];
        sig[OFF_CTILDE..OFF_Z].copy_from_slice(&c_tilde);
        pack_z(&z, &mut sig[OFF_Z..OFF_HINT]);
        sig[OFF_HINT..].copy_from_slice(&packed_hint);
        debug_assert_eq!(packed_hint.len(), HINT_LEN);
        return Ok(Signature(sig));
    }
}

/// Verifies `signature` over `message` under `pk`. Never errors on a cryptographic failure;
/// any malformed or forged signature simply yields `false`.
#[must_use]
pub fn sig_verify(pk: &SigPublicKey, message: &[u8], signature: &Signature) -> bool {
    let rho = *pk.rho();
    let t1 = pk.t1();
    let z = signature.z();
    let Some(hint) = signature.hint() else { return false };

    for poly in &z {
        for &c in poly {
            if centered(c).unsigned_abs() as i64 >= i64::from(GAMMA1) - i64::from(BETA) {
                return false;
            }
        }
    }
    let weight: usize = hint.iter().flatten().filter(|&&b| b).count();
    if weight > OMEGA {
        return false;
    }

    let tr = sha3_512(&pk.0);
    let mu = sha3_512_concat(&tr, message);

    let a_hat = expand_a(&rho);
    let c_poly = sample_in_ball(signature.c_tilde(), TAU);
    let c_hat = ntt(&c_poly);

    let z_hat = ntt_vec(&z);
    let az = mat_vec_mul(&a_hat, &z_hat);

    let mut t1_shifted = t1;
    for poly in &mut t1_shifted {
        for c in poly.iter_mut() {
            *c = (*c << super::D).rem_euclid(Q);
        }
    }
    let ct1 = scale_by_challenge(&c_hat, &t1_shifted);

    let mut w1_prime = [[0i32; 256]; K];
    for i in 0..K {
        for n in 0..256 {
            let v = fq_sub(az[i][n], ct1[i][n]);
            w1_prime[i][n] = use_hint(hint[i][n], v, GAMMA2);
        }
    }

    let packed_w1 = pack_w1(&w1_prime);
    let mut c_tilde_prime = [0u8; 32];
    let mut shake = shake256();
    shake.absorb(&mu);
    shake.absorb(&packed_w1);
    shake.squeeze(&mut c_tilde_prime);

    ct_eq(&c_tilde_prime, signature.c_tilde())
}

#[cfg(test)]
mod tests {
    use super::{sig_keypair, sig_sign, sig_verify};
    use rand_core::SeedableRng;

    #[test]
    fn sign_then_verify_accepts() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let (pk, sk) = sig_keypair(&mut rng).unwrap();
        let msg = b"attestation report digest";
        let sig = sig_sign(&sk, msg, &mut rng).unwrap();
        assert!(sig_verify(&pk, msg, &sig));
    }

    #[test]
    fn tampered_message_is_rejected() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        let (pk, sk) = sig_keypair(&mut rng).unwrap();
        let sig = sig_sign(&sk, b"original", &mut rng).unwrap();
        assert!(!sig_verify(&pk, b"tampered", &sig));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        let (pk, sk) = sig_keypair(&mut rng).unwrap();
        let msg = b"payload";
        let mut sig = sig_sign(&sk, msg, &mut rng).unwrap();
        let mut bytes = *sig.as_bytes();
        bytes[0] ^= 0xFF;
        sig = super::Signature::from_bytes(bytes);
        assert!(!sig_verify(&pk, msg, &sig));
    }
}
