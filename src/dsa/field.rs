//! Field arithmetic for the signature scheme's ring `R_q`, `q = 8380417`.
//!
//! Montgomery reduction mirrors the KEM's reduction strategy (same multiply-then-fold
//! shape) but uses this scheme's own modulus and 32-bit Montgomery constant.

/// The signature scheme's field modulus.
pub(crate) const Q: i64 = 8_380_417;

/// `q^{-1} mod 2^32`, used by [`montgomery_reduce`].
const QINV: i64 = 58_728_449;

/// Montgomery reduction: given `a` (the product of a canonical field element and a
/// Montgomery-domain constant, e.g. an entry of [`super::ntt::ZETAS`]), returns
/// `a * R^{-1} mod q` where `R = 2^32`, as a signed value within a small multiple of `q`.
#[inline(always)]
pub(crate) fn montgomery_reduce(a: i64) -> i32 {
    let t = a.wrapping_mul(QINV) & 0xFFFF_FFFF;
    let t = t * Q;
    ((a - t) >> 32) as i32
}

/// Folds a Montgomery-reduction output (or any value within `(-2q, 2q)`) into the canonical
/// representative in `[0, q)`.
#[inline(always)]
pub(crate) fn freeze(a: i32) -> i32 {
    let q = Q as i32;
    let mut r = a % q;
    if r < 0 {
        r += q;
    }
    r
}

/// Adds two canonical field elements.
#[inline(always)]
pub(crate) fn fq_add(a: i32, b: i32) -> i32 {
    let q = Q as i32;
    let s = a + b;
    if s >= q {
        s - q
    } else {
        s
    }
}

/// Subtracts two canonical field elements.
#[inline(always)]
pub(crate) fn fq_sub(a: i32, b: i32) -> i32 {
    let q = Q as i32;
    let s = a - b;
    if s < 0 {
        s + q
    } else {
        s
    }
}

/// Multiplies two canonical field elements (plain modular product, not Montgomery-scaled).
#[inline(always)]
pub(crate) fn fq_mul(a: i32, b: i32) -> i32 { freeze(((i64::from(a) * i64::from(b)) % Q) as i32) }

/// Multiplies a canonical field element by a Montgomery-domain constant, folding the result
/// back into `[0, q)`. Used for the NTT butterfly, where the zeta table is pre-scaled by `R`.
#[inline(always)]
pub(crate) fn fq_mul_mont(a: i32, zeta_mont: i32) -> i32 {
    freeze(montgomery_reduce(i64::from(a) * i64::from(zeta_mont)))
}

/// Converts a canonical representative in `[0, q)` to its centered representative in
/// `(-q/2, q/2]`.
#[inline(always)]
pub(crate) fn centered(a: i32) -> i32 {
    let q = Q as i32;
    if a > q / 2 {
        a - q
    } else {
        a
    }
}
