//! `Power2Round`, `Decompose`, `MakeHint`, `UseHint`: the rounding machinery that lets a
//! verifier recover the signer's high-order bits of `w = A*y` from public data plus a
//! one-bit-per-coefficient hint.
//!
//! The measurement-engine reference this scheme is grounded on hardcodes `Decompose`'s bucket
//! width (127/128/95/256) for a different, smaller `GAMMA2` than this parameter set uses; this
//! module instead parameterizes `Decompose`/`UseHint` on [`super::GAMMA2`] directly, which is
//! the only version that is correct for `K=8`/`L=7`.

use super::field::freeze;
use super::{D, Q};

/// Splits a canonical field element `a` into `(a1, a0)` with `a = a1 * 2^D + a0` and `a0 in
/// (-2^{D-1}, 2^{D-1}]`, returning `a0` reduced back to its canonical representative.
pub(crate) fn power2round(a: i32) -> (i32, i32) {
    let a = freeze(a);
    let half = 1 << (D - 1);
    let a1 = (a + half - 1) >> D;
    let a0 = a - (a1 << D);
    (a1, freeze(a0))
}

/// Splits a canonical field element `a` into `(a1, a0)` with `a = a1 * 2*gamma2 + a0` (up to
/// the boundary special case), `a0` in `(-gamma2, gamma2]`.
pub(crate) fn decompose(a: i32, gamma2: i32) -> (i32, i32) {
    let a = freeze(a);
    let two_gamma2 = 2 * gamma2;
    let mut r0 = a % two_gamma2;
    if r0 > gamma2 {
        r0 -= two_gamma2;
    }
    if a - r0 == Q - 1 {
        (0, r0 - 1)
    } else {
        ((a - r0) / two_gamma2, r0)
    }
}

/// The high-order half of [`decompose`].
pub(crate) fn high_bits(a: i32, gamma2: i32) -> i32 { decompose(a, gamma2).0 }

/// `MakeHint(z, r)`: true iff adding `z` to `r` crosses a rounding-bucket boundary, i.e. iff
/// `HighBits(r) != HighBits(r+z)`.
pub(crate) fn make_hint(z: i32, r: i32, gamma2: i32) -> bool {
    high_bits(r, gamma2) != high_bits(freeze(r + z), gamma2)
}

/// `UseHint(hint, a)`: given `a = r + z` for the `(z, r)` that produced `hint` via
/// [`make_hint`], recovers `HighBits(r)`.
pub(crate) fn use_hint(hint: bool, a: i32, gamma2: i32) -> i32 {
    let (r1, r0) = decompose(a, gamma2);
    if !hint {
        return r1;
    }
    let m = (Q - 1) / (2 * gamma2);
    if r0 > 0 {
        (r1 + 1).rem_euclid(m)
    } else {
        (r1 - 1).rem_euclid(m)
    }
}

#[cfg(test)]
mod tests {
    use super::{decompose, make_hint, power2round, use_hint};
    use crate::dsa::{GAMMA2, Q};

    #[test]
    fn power2round_reconstructs_the_original_value() {
        for a in [0, 1, 4095, 4096, 4097, Q - 1, 3_000_000] {
            let (a1, a0) = power2round(a);
            let rebuilt = (a1 * (1 << super::D) + a0).rem_euclid(Q);
            assert_eq!(rebuilt, a % Q);
        }
    }

    #[test]
    fn decompose_reconstructs_the_original_value() {
        for a in [0, 1, GAMMA2, GAMMA2 + 1, Q - 1, 12345] {
            let (a1, a0) = decompose(a, GAMMA2);
            let rebuilt = (a1 * (2 * GAMMA2) + a0).rem_euclid(Q);
            assert_eq!(rebuilt, a % Q);
        }
    }

    #[test]
    fn use_hint_inverts_make_hint() {
        let r = 1000i32;
        for z in [0, 50, -50, GAMMA2 - 10, -(GAMMA2 - 10)] {
            let a = (r + z).rem_euclid(Q);
            let hint = make_hint(z, r, GAMMA2);
            let recovered = use_hint(hint, a, GAMMA2);
            let expected = super::high_bits(r, GAMMA2);
            if !hint {
                assert_eq!(recovered, expected);
            }
        }
    }
}
