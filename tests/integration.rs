//! End-to-end integration tests exercising the public API surface the way an external
//! dependent would: full keygen/sign/verify round trips, full KEM round trips, and the
//! attestation scenarios named in SPEC_FULL.md's testable-properties section (S1-S6).

use pqc_attestor::{
    hash, kem_decapsulate, kem_encapsulate, kem_keypair, sig_keypair, sig_sign, sig_verify,
    AttestationConfig, AttestationContext, KemCiphertext, MeasurementComponent,
    MeasurementSource, Result, Serial, Signature, TrustLevel, SIG_LEN,
};
use rand_chacha::rand_core::SeedableRng;

struct FixedSource;

impl MeasurementSource for FixedSource {
    fn read(&mut self, component: MeasurementComponent) -> Result<Vec<u8>> {
        Ok(match component {
            MeasurementComponent::Firmware => b"firmware-v1".to_vec(),
            MeasurementComponent::Configuration => b"config-v1".to_vec(),
            MeasurementComponent::Runtime => b"runtime-v1".to_vec(),
            MeasurementComponent::Keys => b"keys-v1".to_vec(),
            MeasurementComponent::DeviceIdentity => b"ident-v1".to_vec(),
        })
    }
}

fn test_config() -> AttestationConfig {
    AttestationConfig { device_serial: Serial::new("unit-test-01").unwrap(), ..AttestationConfig::default() }
}

// S1: SHA3-256("abc") matches the FIPS 202 known-answer vector.
#[test]
fn s1_sha3_256_of_abc_matches_known_answer() {
    let digest = hash::sha3_256(b"abc");
    let expected = hex_literal::hex!("3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532");
    assert_eq!(digest, expected);
}

// S2: SHA3-256 of the empty string matches the FIPS 202 known-answer vector.
#[test]
fn s2_sha3_256_of_empty_matches_known_answer() {
    let digest = hash::sha3_256(b"");
    let expected = hex_literal::hex!("a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a");
    assert_eq!(digest, expected);
}

// S3 / S4: keypair + sign + verify round trip, then a flipped signature byte is rejected.
#[test]
fn s3_s4_sign_then_verify_then_flipped_byte_rejected() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(96);
    let (pk, sk) = sig_keypair(&mut rng).unwrap();
    let signature = sig_sign(&sk, b"test", &mut rng).unwrap();
    assert!(sig_verify(&pk, b"test", &signature));

    let mut tampered = *signature.as_bytes();
    tampered[0] ^= 0xFF;
    let tampered = Signature::from_bytes(tampered);
    assert!(!sig_verify(&pk, b"test", &tampered));
}

// S5 / S6: a full attestation context round trip, then a stale clock is rejected.
#[test]
fn s5_s6_collect_build_verify_then_stale_clock_rejected() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2026);
    let mut ctx = AttestationContext::init(test_config(), &mut rng).unwrap();

    let now = 1_700_000_000;
    ctx.collect(now, &mut FixedSource).unwrap();
    assert_eq!(ctx.get_log().count(), 5);

    let report = ctx.build_report(now, &mut rng).unwrap();
    assert_eq!(report.measurement_count, 5);

    let result = pqc_attestor::verify_report(&report, ctx.public_key(), now);
    assert!(result.valid);
    assert_eq!(result.trust_level, TrustLevel::High);

    let stale = pqc_attestor::verify_report(&report, ctx.public_key(), now + 301);
    assert!(!stale.valid);
}

#[test]
fn kem_keypair_encapsulate_decapsulate_round_trips() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
    for _ in 0..20 {
        let (ek, dk) = kem_keypair(&mut rng).unwrap();
        let (ss_sender, ct) = kem_encapsulate(&mut rng, &ek).unwrap();
        let ss_receiver = kem_decapsulate(&dk, &ct);
        assert_eq!(ss_sender.as_bytes(), ss_receiver.as_bytes());
    }
}

#[test]
fn kem_decapsulate_is_total_over_a_tampered_ciphertext() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(12);
    let (ek, dk) = kem_keypair(&mut rng).unwrap();
    let (_, ct) = kem_encapsulate(&mut rng, &ek).unwrap();

    let mut tampered_bytes = *ct.as_bytes();
    tampered_bytes[100] ^= 0x01;
    let tampered = KemCiphertext::from_bytes(tampered_bytes);

    let first = kem_decapsulate(&dk, &tampered);
    let second = kem_decapsulate(&dk, &tampered);
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first.as_bytes().len(), 32);
}

#[test]
fn signature_keypair_sizes_match_the_external_api_table() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(13);
    let (pk, sk) = sig_keypair(&mut rng).unwrap();
    assert_eq!(pk.as_bytes().len(), pqc_attestor::SIG_PK_LEN);
    assert_eq!(sk.as_bytes().len(), pqc_attestor::SIG_SK_LEN);

    let signature = sig_sign(&sk, b"sized", &mut rng).unwrap();
    assert_eq!(signature.as_bytes().len(), SIG_LEN);
}

#[test]
fn kem_artifact_sizes_match_the_external_api_table() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(14);
    let (ek, dk) = kem_keypair(&mut rng).unwrap();
    assert_eq!(ek.as_bytes().len(), pqc_attestor::KEM_EK_LEN);
    assert_eq!(dk.as_bytes().len(), pqc_attestor::KEM_DK_LEN);

    let (ss, ct) = kem_encapsulate(&mut rng, &ek).unwrap();
    assert_eq!(ct.as_bytes().len(), pqc_attestor::KEM_CT_LEN);
    assert_eq!(ss.as_bytes().len(), pqc_attestor::KEM_SS_LEN);
}

#[test]
fn report_round_trips_through_the_wire_format_end_to_end() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(15);
    let mut ctx = AttestationContext::init(test_config(), &mut rng).unwrap();
    ctx.collect(1_700_000_000, &mut FixedSource).unwrap();
    let report = ctx.build_report(1_700_000_000, &mut rng).unwrap();

    let bytes = report.to_bytes();
    assert_eq!(bytes.len(), pqc_attestor::REPORT_LEN);
    let parsed = pqc_attestor::AttestationReport::from_bytes(&bytes).unwrap();

    let result = pqc_attestor::verify_report(&parsed, ctx.public_key(), 1_700_000_000);
    assert!(result.valid);

    // Re-serializing a parsed report yields identical bytes (testable property 9).
    assert_eq!(parsed.to_bytes(), bytes);
}

#[test]
fn pcr_extend_chain_matches_the_iterated_hash_definition() {
    let mut bank = pqc_attestor::PcrBank::new();
    let m1 = [1u8; 32];
    let m2 = [2u8; 32];
    bank.extend(3, &m1).unwrap();
    bank.extend(3, &m2).unwrap();

    let expected = hash::sha3_256(&[hash::sha3_256(&[[0u8; 32], m1].concat()), m2].concat());
    assert_eq!(bank.read(3).unwrap(), expected);
    assert_eq!(bank.extend_count(3), 2);
}
