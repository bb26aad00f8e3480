//! Linear-algebra helpers over NTT-domain polynomial vectors, plus the hash/XOF idioms (`G`,
//! `H`, `PRF`, `XOF`) and the `Compress`/`Decompress` rounding functions from FIPS 203
//! §4.1/§4.2, all built on this crate's own [`crate::keccak`] module rather than the `sha3`
//! crate.
//!
//! The implicit-rejection pseudo-random secret is derived as `SHA3-256(z || H(ct))` per
//! SPEC_FULL.md §4.4 (see [`super::kem::kem_decapsulate`]), not the FIPS 203 `J` function, so
//! no `J` helper is defined here.

use super::field::Z;
use super::ntt::multiply_ntts;
use super::Q;
use crate::keccak::{self, Shake};

/// Vector addition: `z_hat[i] = u_hat[i] + v_hat[i]`.
#[must_use]
pub(crate) fn add_vecs<const K: usize>(
    vec_a: &[[Z; 256]; K], vec_b: &[[Z; 256]; K],
) -> [[Z; 256]; K] {
    let mut result = [[Z::default(); 256]; K];
    for i in 0..K {
        for n in 0..256 {
            result[i][n] = vec_a[i][n].add(vec_b[i][n]);
        }
    }
    result
}

/// Matrix by vector multiplication: `w_hat = A_hat . u_hat`.
#[must_use]
pub(crate) fn mul_mat_vec<const K: usize>(
    a_hat: &[[[Z; 256]; K]; K], u_hat: &[[Z; 256]; K],
) -> [[Z; 256]; K] {
    let mut w_hat = [[Z::default(); 256]; K];
    for i in 0..K {
        for j in 0..K {
            let tmp = multiply_ntts(&a_hat[i][j], &u_hat[j]);
            for n in 0..256 {
                w_hat[i][n] = w_hat[i][n].add(tmp[n]);
            }
        }
    }
    w_hat
}

/// Matrix-transpose by vector multiplication: `y_hat = A_hat^T . u_hat`.
#[must_use]
pub(crate) fn mul_mat_t_vec<const K: usize>(
    a_hat: &[[[Z; 256]; K]; K], u_hat: &[[Z; 256]; K],
) -> [[Z; 256]; K] {
    let mut y_hat = [[Z::default(); 256]; K];
    for i in 0..K {
        for j in 0..K {
            let tmp = multiply_ntts(&a_hat[j][i], &u_hat[j]);
            for n in 0..256 {
                y_hat[i][n] = y_hat[i][n].add(tmp[n]);
            }
        }
    }
    y_hat
}

/// Vector dot product: `z_hat = u_hat^T . v_hat`.
#[must_use]
pub(crate) fn dot_t_prod<const K: usize>(u_hat: &[[Z; 256]; K], v_hat: &[[Z; 256]; K]) -> [Z; 256] {
    let mut result = [Z::default(); 256];
    for j in 0..K {
        let tmp = multiply_ntts(&u_hat[j], &v_hat[j]);
        for n in 0..256 {
            result[n] = result[n].add(tmp[n]);
        }
    }
    result
}

/// `PRF_eta(s, b)`: noise-expansion XOF, seed `s`, single-byte nonce `b`.
#[must_use]
pub(crate) fn prf<const ETA_64: usize>(s: &[u8; 32], b: u8) -> [u8; ETA_64] {
    let mut shake = keccak::shake256();
    shake.absorb(s);
    shake.absorb(&[b]);
    let mut result = [0u8; ETA_64];
    shake.squeeze(&mut result);
    result
}

/// `XOF(rho, i, j)`: matrix-entry expansion stream, returned as an in-progress SHAKE128
/// instance so the caller can squeeze it incrementally during rejection sampling.
#[must_use]
pub(crate) fn xof(rho: &[u8; 32], i: u8, j: u8) -> Shake {
    let mut shake = keccak::shake128();
    shake.absorb(rho);
    shake.absorb(&[i]);
    shake.absorb(&[j]);
    shake
}

/// `G(bytes...) = SHA3-512(bytes...)`, split into two 32-byte halves.
#[must_use]
pub(crate) fn g(bytes: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    let digest = if bytes.len() == 2 {
        keccak::sha3_512_concat(bytes[0], bytes[1])
    } else {
        debug_assert_eq!(bytes.len(), 1);
        keccak::sha3_512(bytes[0])
    };
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    a.copy_from_slice(&digest[0..32]);
    b.copy_from_slice(&digest[32..64]);
    (a, b)
}

/// `H(bytes) = SHA3-256(bytes)`.
#[must_use]
pub(crate) fn h(bytes: &[u8]) -> [u8; 32] { keccak::sha3_256(bytes) }

/// `Compress_d(x) = round((2^d / q) * x) mod 2^d`, in place over a coefficient slice.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn compress_vector(d: u32, inout: &mut [Z]) {
    const M: u32 = (((1u64 << 36) + Q as u64 - 1) / Q as u64) as u32;
    for x_ref in &mut *inout {
        let y = (x_ref.get_u32() << d) + (u32::from(Q) >> 1);
        let result = (u64::from(y) * u64::from(M)) >> 36;
        x_ref.set_u16(result as u16);
    }
}

/// `Decompress_d(y) = round((q / 2^d) * y)`, in place over a coefficient slice.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decompress_vector(d: u32, inout: &mut [Z]) {
    for y_ref in &mut *inout {
        let qy = u32::from(Q) * y_ref.get_u32() + (1 << d) - 1;
        y_ref.set_u16((qy >> d) as u16);
    }
}
