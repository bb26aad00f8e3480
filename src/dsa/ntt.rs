//! Number-theoretic transform over `R_q = Z_q[X]/(X^256+1)`, `q = 8380417`.
//!
//! Unlike the KEM's ring (which only splits down to degree-2 blocks and needs a base-case
//! multiply), `q ≡ 1 (mod 512)` here, so `X^256+1` splits completely into 256 linear factors.
//! The NTT runs a full eight-level Cooley-Tukey network and multiplication in the transformed
//! domain is plain coefficientwise multiplication.

use super::field::{fq_add, fq_mul, fq_sub};
use super::Q;

/// Primitive 512th root of unity modulo `Q` (`ZETA^256 ≡ -1 (mod Q)`), used to build
/// [`ZETAS`].
const ZETA: i64 = 1753;

/// Forward NTT, in place conceptually but returning a fresh array: eight Cooley-Tukey
/// layers, `len` halving from 128 down to 1.
#[must_use]
pub(crate) fn ntt(array_f: &[i32; 256]) -> [i32; 256] {
    let mut f_hat: [i32; 256] = *array_f;
    let mut k = 1usize;

    let mut len = 128;
    while len >= 1 {
        for start in (0..256).step_by(2 * len) {
            let zeta = ZETAS[k];
            k += 1;
            for j in start..start + len {
                let t = fq_mul(zeta, f_hat[j + len]);
                f_hat[j + len] = fq_sub(f_hat[j], t);
                f_hat[j] = fq_add(f_hat[j], t);
            }
        }
        len /= 2;
    }
    f_hat
}

/// Inverse NTT: mirrors [`ntt`] with Gentleman-Sande butterflies, `len` doubling from 1 to
/// 128, finishing with a scale by `256^{-1} mod Q`.
#[must_use]
pub(crate) fn ntt_inv(f_hat: &[i32; 256]) -> [i32; 256] {
    let mut f: [i32; 256] = *f_hat;
    let mut k = 255usize;

    let mut len = 1;
    while len <= 128 {
        for start in (0..256).step_by(2 * len) {
            let zeta = ZETAS[k];
            k -= 1;
            for j in start..start + len {
                let t = f[j];
                f[j] = fq_add(t, f[j + len]);
                f[j + len] = fq_mul(zeta, fq_sub(f[j + len], t));
            }
        }
        len *= 2;
    }

    for coeff in &mut f {
        *coeff = fq_mul(*coeff, INV_N);
    }
    f
}

/// Pointwise multiplication of two NTT-domain representations: `X^256+1` splits completely
/// here, so this is just 256 independent field multiplications, unlike the KEM's
/// degree-2-block `BaseCaseMultiply`.
#[must_use]
pub(crate) fn pointwise_mul(f_hat: &[i32; 256], g_hat: &[i32; 256]) -> [i32; 256] {
    core::array::from_fn(|i| fq_mul(f_hat[i], g_hat[i]))
}

#[must_use]
const fn mod_pow(mut base: i64, mut exp: i64, modulus: i64) -> i64 {
    let mut result = 1i64;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result * base) % modulus;
        }
        exp >>= 1;
        base = (base * base) % modulus;
    }
    result
}

#[must_use]
const fn gen_zeta_table() -> [i32; 256] {
    let mut result = [0i32; 256];
    let mut x = 1i64;
    let mut i = 0u32;
    while i < 256 {
        result[(i as u8).reverse_bits() as usize] = x as i32;
        x = (x * ZETA) % Q;
        i += 1;
    }
    result
}

/// `ZETAS[k] = ZETA^{BitRev8(k)} mod Q`, used sequentially by [`ntt`]/[`ntt_inv`].
pub(crate) static ZETAS: [i32; 256] = gen_zeta_table();

/// `256^{-1} mod Q`, computed at compile time via Fermat's little theorem (`Q` is prime).
const INV_N: i32 = mod_pow(256, Q - 2, Q) as i32;

#[cfg(test)]
mod tests {
    use super::{ntt, ntt_inv, pointwise_mul, ZETAS};

    #[test]
    fn zeta_table_identity_entry_is_one() {
        // BitRev8(0) = 0, and ZETA^0 = 1 is the first value written.
        assert_eq!(ZETAS[0], 1);
    }

    #[test]
    fn ntt_round_trips() {
        let mut f = [0i32; 256];
        for (i, c) in f.iter_mut().enumerate() {
            *c = (i as i32 * 7 + 3) % super::Q as i32;
        }
        let f_hat = ntt(&f);
        let back = ntt_inv(&f_hat);
        assert_eq!(back, f);
    }

    #[test]
    fn pointwise_mul_matches_schoolbook_for_monomials() {
        let mut f = [0i32; 256];
        let mut g = [0i32; 256];
        f[1] = 1;
        g[1] = 1;
        let prod = pointwise_mul(&ntt(&f), &ntt(&g));
        let back = ntt_inv(&prod);
        let mut expect = [0i32; 256];
        expect[2] = 1;
        assert_eq!(back, expect);
    }
}
