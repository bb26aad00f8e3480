//! Constant-time comparison, conditional selection, and non-elidable zeroing.
//!
//! Every comparison of cryptographic material, and every conditional selection on
//! secret-dependent data, goes through these three functions rather than a hand-rolled
//! branch.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

/// Constant-time equality: the running time depends only on `a.len()`, never on where (or
/// whether) the two slices first differ.
#[must_use]
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Overwrites `buf` with zero bytes in a way the compiler cannot optimize away as a dead
/// store, even though the buffer is about to go out of scope.
pub(crate) fn zeroize(buf: &mut [u8]) { buf.zeroize(); }

/// Constant-time conditional copy: `dest[i] = if flag { src[i] } else { dest[i] }` for every
/// byte, computed as `(dest & !mask) | (src & mask)` with no branch on `flag`.
pub(crate) fn ct_select(dest: &mut [u8], src: &[u8], flag: bool) {
    debug_assert_eq!(dest.len(), src.len());
    let choice = Choice::from(u8::from(flag));
    for (d, s) in dest.iter_mut().zip(src.iter()) {
        d.conditional_assign(s, choice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ct_eq_matches_naive_eq() {
        assert!(ct_eq(b"abcdef", b"abcdef"));
        assert!(!ct_eq(b"abcdef", b"abcxef"));
        assert!(!ct_eq(b"abc", b"abcd"));
    }

    #[test]
    fn zeroize_clears_buffer() {
        let mut buf = [1u8, 2, 3, 4];
        zeroize(&mut buf);
        assert_eq!(buf, [0u8; 4]);
    }

    #[test]
    fn ct_select_picks_src_only_when_true() {
        let mut dest = [0xAAu8; 8];
        let src = [0x55u8; 8];
        ct_select(&mut dest, &src, false);
        assert_eq!(dest, [0xAAu8; 8]);
        ct_select(&mut dest, &src, true);
        assert_eq!(dest, [0x55u8; 8]);
    }
}
