//! Deterministic coefficient sampling: uniform rejection sampling for the public matrix `A`,
//! centered-binomial rejection sampling for the secret vectors, uniform sampling for the
//! masking vector `y`, and `SampleInBall` for the challenge polynomial `c`.
//!
//! `SampleInBall` here is a genuine Fisher-Yates shuffle with an independent sign bit per
//! placed coefficient, rather than the unconditional `+1` the original measurement-engine
//! reference used for every chosen position.

use super::field::Q;
use super::{ETA, GAMMA1};
use crate::keccak;

const Q_I32: i32 = Q as i32;

/// `RejNTTPoly`: expands a SHAKE128 stream keyed on `(rho, j, i)` into a uniformly random
/// polynomial in `[0, q)` via rejection sampling on 3-byte, 23-bit samples.
#[must_use]
pub(crate) fn poly_uniform(rho: &[u8; 32], i: u8, j: u8) -> [i32; 256] {
    let mut shake = keccak::shake128();
    shake.absorb(rho);
    shake.absorb(&[j, i]);

    let mut out = [0i32; 256];
    let mut filled = 0;
    let mut buf = [0u8; 168];
    while filled < 256 {
        shake.squeeze(&mut buf);
        let mut pos = 0;
        while pos + 3 <= buf.len() && filled < 256 {
            let t = u32::from(buf[pos])
                | (u32::from(buf[pos + 1]) << 8)
                | (u32::from(buf[pos + 2]) << 16);
            let t = t & 0x7F_FFFF;
            pos += 3;
            if t < Q as u32 {
                out[filled] = t as i32;
                filled += 1;
            }
        }
    }
    out
}

/// `RejBoundedPoly`: expands a SHAKE256 stream keyed on `(seed, nonce)` into a polynomial
/// with coefficients centered in `[-ETA, ETA]`, via nibble rejection sampling (rejecting
/// nibbles `>= 15`, then reducing the surviving `0..=14` value modulo `2*ETA+1`).
#[must_use]
pub(crate) fn poly_uniform_eta(seed: &[u8; 64], nonce: u16) -> [i32; 256] {
    let mut shake = keccak::shake256();
    shake.absorb(seed);
    shake.absorb(&nonce.to_le_bytes());

    debug_assert_eq!(ETA, 2, "nibble rejection threshold below is specific to ETA=2");

    let mut out = [0i32; 256];
    let mut filled = 0;
    let mut buf = [0u8; 136];
    while filled < 256 {
        shake.squeeze(&mut buf);
        for &byte in &buf {
            for nibble in [byte & 0x0F, byte >> 4] {
                if filled >= 256 {
                    break;
                }
                if nibble < 15 {
                    let v = u32::from(nibble) - (205 * u32::from(nibble) >> 10) * 5;
                    out[filled] = Q_I32 + 2 - v as i32;
                    filled += 1;
                }
            }
        }
    }
    for c in &mut out {
        *c %= Q_I32;
    }
    out
}

/// `ExpandMask`: expands a SHAKE256 stream keyed on `(seed, nonce)` into a polynomial with
/// coefficients uniform in `(-GAMMA1, GAMMA1]`, packing two 20-bit samples per 5 bytes.
#[must_use]
pub(crate) fn poly_uniform_gamma1(seed: &[u8; 64], nonce: u16) -> [i32; 256] {
    let mut shake = keccak::shake256();
    shake.absorb(seed);
    shake.absorb(&nonce.to_le_bytes());

    let mut buf = [0u8; 640];
    shake.squeeze(&mut buf);

    let mut out = [0i32; 256];
    for i in 0..128 {
        let b = &buf[5 * i..5 * i + 5];
        let t0 = u32::from(b[0]) | (u32::from(b[1]) << 8) | ((u32::from(b[2]) & 0x0F) << 16);
        let t1 = (u32::from(b[2]) >> 4) | (u32::from(b[3]) << 4) | (u32::from(b[4]) << 12);
        out[2 * i] = GAMMA1 as i32 - t0 as i32;
        out[2 * i + 1] = GAMMA1 as i32 - t1 as i32;
    }
    for c in &mut out {
        *c = ((*c % Q_I32) + Q_I32) % Q_I32;
    }
    out
}

/// `SampleInBall`: derives a weight-`TAU` `{-1, 0, +1}` polynomial from a 32-byte seed via a
/// Fisher-Yates shuffle over the last `TAU` positions, each placement consuming one fresh
/// sign bit from the stream.
#[must_use]
pub(crate) fn sample_in_ball(seed: &[u8; 32], tau: usize) -> [i32; 256] {
    let mut shake = keccak::shake256();
    shake.absorb(seed);

    let mut sign_bytes = [0u8; 8];
    shake.squeeze(&mut sign_bytes);
    let mut sign_bits = u64::from_le_bytes(sign_bytes);

    let mut c = [0i32; 256];
    let mut one_byte = [0u8; 1];
    for i in 256 - tau..256 {
        let j = loop {
            shake.squeeze(&mut one_byte);
            let candidate = usize::from(one_byte[0]);
            if candidate <= i {
                break candidate;
            }
        };
        c[i] = c[j];
        c[j] = if sign_bits & 1 == 1 { Q_I32 - 1 } else { 1 };
        sign_bits >>= 1;
    }
    c
}
