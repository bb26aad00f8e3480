use criterion::{criterion_group, criterion_main, Criterion};
use pqc_attestor::{kem_decapsulate, kem_encapsulate, kem_keypair, sig_keypair, sig_sign, sig_verify};
use rand_core::{CryptoRng, RngCore};

/// Test RNG to regurgitate incremented values when 'asked'.
struct TestRng {
    value: u32,
}

impl RngCore for TestRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        out.iter_mut().for_each(|b| *b = 0);
        out[0..4].copy_from_slice(&self.value.to_be_bytes());
        self.value = self.value.wrapping_add(1);
        Ok(())
    }
}

impl CryptoRng for TestRng {}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut bench_rng = TestRng { value: 0 };

    let (ek, dk) = kem_keypair(&mut bench_rng).unwrap();
    let (_ss, ct) = kem_encapsulate(&mut bench_rng, &ek).unwrap();

    let (pk, sk) = sig_keypair(&mut bench_rng).unwrap();
    let signature = sig_sign(&sk, b"benchmark message", &mut bench_rng).unwrap();

    c.bench_function("kem KeyGen", |b| b.iter(|| kem_keypair(&mut bench_rng)));
    c.bench_function("kem Encapsulate", |b| b.iter(|| kem_encapsulate(&mut bench_rng, &ek)));
    c.bench_function("kem Decapsulate", |b| b.iter(|| kem_decapsulate(&dk, &ct)));

    c.bench_function("sig KeyGen", |b| b.iter(|| sig_keypair(&mut bench_rng)));
    c.bench_function("sig Sign", |b| b.iter(|| sig_sign(&sk, b"benchmark message", &mut bench_rng)));
    c.bench_function("sig Verify", |b| b.iter(|| sig_verify(&pk, b"benchmark message", &signature)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
