//! K-PKE: the IND-CPA public-key encryption scheme underlying the outer KEM (FIPS 203 §5).

use super::byte_fns::{byte_decode, byte_encode};
use super::field::Z;
use super::helpers::{
    add_vecs, compress_vector, decompress_vector, dot_t_prod, g, mul_mat_t_vec, mul_mat_vec, prf,
    xof,
};
use super::ntt::{ntt, ntt_inv};
use super::sampling::{sample_ntt, sample_poly_cbd};
use crate::error::{AttestError, Result};
use crate::rng;
use rand_core::CryptoRngCore;

/// Shared matrix-expansion step used by keygen and encrypt: `A_hat[i][j] = SampleNTT(XOF(rho, j, i))`.
fn gen_a_hat<const K: usize>(rho: &[u8; 32]) -> [[[Z; 256]; K]; K] {
    let mut a_hat = [[[Z::default(); 256]; K]; K];
    for (i, row) in a_hat.iter_mut().enumerate().take(K) {
        for (j, entry) in row.iter_mut().enumerate().take(K) {
            *entry = sample_ntt(xof(rho, j.to_le_bytes()[0], i.to_le_bytes()[0]));
        }
    }
    a_hat
}

/// K-PKE.KeyGen(): produces an encryption key `ek` and decryption key `dk`.
pub(super) fn k_pke_key_gen<const K: usize, const ETA1_64: usize>(
    rng: &mut impl CryptoRngCore, ek_pke: &mut [u8], dk_pke: &mut [u8],
) -> Result<()> {
    debug_assert_eq!(ek_pke.len(), 384 * K + 32);
    debug_assert_eq!(dk_pke.len(), 384 * K);

    let mut d = [0u8; 32];
    rng::fill(rng, &mut d)?;
    let (rho, sigma) = g(&[&d]);

    let mut n = 0u8;
    let a_hat = gen_a_hat::<K>(&rho);

    let s: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA1_64>(&sigma, n));
        n += 1;
        x
    });
    let e: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA1_64>(&sigma, n));
        n += 1;
        x
    });

    let s_hat: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&s[i]));
    let e_hat: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&e[i]));

    let as_hat = mul_mat_vec(&a_hat, &s_hat);
    let t_hat = add_vecs(&as_hat, &e_hat);

    for i in 0..K {
        byte_encode(12, &t_hat[i], &mut ek_pke[i * 384..(i + 1) * 384]);
    }
    ek_pke[K * 384..].copy_from_slice(&rho);

    for i in 0..K {
        byte_encode(12, &s_hat[i], &mut dk_pke[i * 384..(i + 1) * 384]);
    }

    Ok(())
}

/// K-PKE.Encrypt(ek, m, r): encrypts `m` under the randomness `r`.
pub(super) fn k_pke_encrypt<const K: usize, const ETA1_64: usize, const ETA2_64: usize>(
    du: u32, dv: u32, ek: &[u8], m: &[u8], randomness: &[u8; 32], ct: &mut [u8],
) -> Result<()> {
    debug_assert_eq!(ek.len(), 384 * K + 32);
    debug_assert_eq!(m.len(), 32);

    let mut n = 0u8;

    let mut t_hat = [[Z::default(); 256]; K];
    for i in 0..K {
        byte_decode(12, &ek[384 * i..384 * (i + 1)], &mut t_hat[i])?;
    }
    let rho: [u8; 32] =
        ek[384 * K..384 * K + 32].try_into().map_err(|_| AttestError::InvalidKey)?;

    let a_hat = gen_a_hat::<K>(&rho);

    let r: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA1_64>(randomness, n));
        n += 1;
        x
    });
    let e1: [[Z; 256]; K] = core::array::from_fn(|_| {
        let x = sample_poly_cbd(&prf::<ETA2_64>(randomness, n));
        n += 1;
        x
    });
    let e2 = sample_poly_cbd(&prf::<ETA2_64>(randomness, n));

    let r_hat: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&r[i]));

    let mut u = mul_mat_t_vec(&a_hat, &r_hat);
    for u_i in &mut u {
        *u_i = ntt_inv(u_i);
    }
    u = add_vecs(&u, &e1);

    let mut mu = [Z::default(); 256];
    byte_decode(1, m, &mut mu)?;
    decompress_vector(1, &mut mu);

    let mut v = ntt_inv(&dot_t_prod(&t_hat, &r_hat));
    for i in 0..256 {
        v[i] = v[i].add(e2[i]).add(mu[i]);
    }

    let step = 32 * du as usize;
    for i in 0..K {
        compress_vector(du, &mut u[i]);
        byte_encode(du, &u[i], &mut ct[i * step..(i + 1) * step]);
    }

    compress_vector(dv, &mut v);
    byte_encode(dv, &v, &mut ct[K * step..K * step + 32 * dv as usize]);

    Ok(())
}

/// K-PKE.Decrypt(dk, c): recovers the plaintext `m` from a ciphertext.
pub(super) fn k_pke_decrypt<const K: usize>(
    du: u32, dv: u32, dk: &[u8], ct: &[u8],
) -> Result<[u8; 32]> {
    debug_assert_eq!(dk.len(), 384 * K);
    debug_assert_eq!(ct.len(), 32 * (du as usize * K + dv as usize));

    let c1 = &ct[0..32 * du as usize * K];
    let c2 = &ct[32 * du as usize * K..32 * (du as usize * K + dv as usize)];

    let mut u = [[Z::default(); 256]; K];
    for i in 0..K {
        byte_decode(du, &c1[32 * du as usize * i..32 * du as usize * (i + 1)], &mut u[i])?;
        decompress_vector(du, &mut u[i]);
    }

    let mut v = [Z::default(); 256];
    byte_decode(dv, c2, &mut v)?;
    decompress_vector(dv, &mut v);

    let mut s_hat = [[Z::default(); 256]; K];
    for i in 0..K {
        byte_decode(12, &dk[384 * i..384 * (i + 1)], &mut s_hat[i])?;
    }

    let ntt_u: [[Z; 256]; K] = core::array::from_fn(|i| ntt(&u[i]));
    let st_ntt_u = dot_t_prod(&s_hat, &ntt_u);
    let w_centered = ntt_inv(&st_ntt_u);
    let mut w = [Z::default(); 256];
    for i in 0..256 {
        w[i] = v[i].sub(w_centered[i]);
    }

    compress_vector(1, &mut w);
    let mut m = [0u8; 32];
    byte_encode(1, &w, &mut m);
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::{k_pke_decrypt, k_pke_encrypt, k_pke_key_gen};
    use rand_core::SeedableRng;

    const ETA1: u32 = 2;
    const ETA2: u32 = 2;
    const DU: u32 = 11;
    const DV: u32 = 5;
    const K: usize = 4;
    const ETA1_64: usize = ETA1 as usize * 64;
    const ETA2_64: usize = ETA2 as usize * 64;
    const EK_LEN: usize = 384 * K + 32;
    const DK_LEN: usize = 384 * K;
    const CT_LEN: usize = 32 * (DU as usize * K + DV as usize);

    #[test]
    fn encrypt_then_decrypt_recovers_plaintext() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let mut ek = [0u8; EK_LEN];
        let mut dk = [0u8; DK_LEN];
        k_pke_key_gen::<K, ETA1_64>(&mut rng, &mut ek, &mut dk).unwrap();

        let m = [0x42u8; 32];
        let r = [0x11u8; 32];
        let mut ct = [0u8; CT_LEN];
        k_pke_encrypt::<K, ETA1_64, ETA2_64>(DU, DV, &ek, &m, &r, &mut ct).unwrap();

        let recovered = k_pke_decrypt::<K>(DU, DV, &dk, &ct).unwrap();
        assert_eq!(recovered, m);
    }
}
