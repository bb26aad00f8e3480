//! The attestation context: the single owner of a device's signing keypair, PCR bank, and
//! measurement log.
//!
//! Grounded on the reference engine's `attestation_init`/`attestation_cleanup`/
//! `attestation_collect_measurements`/`attestation_generate_report`, but deliberately dropping
//! its `g_attestation_ctx`/`g_attestation_initialized` static-singleton pattern: SPEC_FULL.md's
//! redesign note calls for an explicit, caller-held context value instead, so every operation
//! below takes `&mut self`/`&self` rather than reaching for process-wide state.

use rand_core::CryptoRngCore;

use crate::config::AttestationConfig;
use crate::dsa::{sig_keypair, sig_sign, SigPublicKey, SigSecretKey, SIG_LEN};
use crate::error::Result;
use crate::measurement::{Measurement, MeasurementLog, MeasurementSource};
use crate::pcr::PcrBank;
use crate::report::{AttestationReport, REPORT_VERSION};

/// The live state of one attested device: its signing keypair, PCR bank, and measurement log.
///
/// Owns all secret material; [`AttestationContext::cleanup`] zeroizes it explicitly (in
/// addition to the automatic [`zeroize::ZeroizeOnDrop`] wipe every [`SigSecretKey`] already
/// carries) and consumes the context so it cannot be used again.
pub struct AttestationContext {
    config: AttestationConfig,
    device_id: [u8; 32],
    sig_pk: SigPublicKey,
    sig_sk: SigSecretKey,
    pcr: PcrBank,
    log: MeasurementLog,
}

fn derive_device_id(serial: &str) -> [u8; 32] {
    let mut id = [0u8; 32];
    let bytes = serial.as_bytes();
    let n = bytes.len().min(32);
    id[..n].copy_from_slice(&bytes[..n]);
    id
}

impl AttestationContext {
    /// Initializes a context: validates `config`, generates a fresh signing keypair, and
    /// starts with an empty PCR bank and measurement log.
    ///
    /// # Errors
    /// Returns [`crate::error::AttestError::InvalidParameter`] if `config` fails validation
    /// (see [`AttestationConfig::validate`]), or [`crate::error::AttestError::RngFailure`] if
    /// keypair generation exhausts the injected random source.
    pub fn init(config: AttestationConfig, rng: &mut impl CryptoRngCore) -> Result<Self> {
        config.validate()?;
        let (sig_pk, sig_sk) = sig_keypair(rng)?;
        let device_id = derive_device_id(config.device_serial.as_str());
        log::info!("attestation context initialized (hardware_root_required={})", config.require_hardware_root);
        Ok(Self { config, device_id, sig_pk, sig_sk, pcr: PcrBank::new(), log: MeasurementLog::new() })
    }

    /// The context's configuration, as supplied to [`Self::init`].
    #[must_use]
    pub fn config(&self) -> &AttestationConfig { &self.config }

    /// The device's public signing key, suitable for distribution to a verifier.
    #[must_use]
    pub fn public_key(&self) -> &SigPublicKey { &self.sig_pk }

    /// Draws the five default measurement components from `source` via
    /// [`crate::measurement::collect_all`], extending their fixed PCRs and appending each to
    /// the log (unless `config.log_enabled` is `false`, in which case this is a no-op).
    ///
    /// # Errors
    /// Propagates the first [`crate::error::AttestError::HardwareFailure`] from `source`, or
    /// [`crate::error::AttestError::LogFull`] if the log is already at its configured
    /// capacity.
    pub fn collect(&mut self, now: u64, source: &mut impl MeasurementSource) -> Result<()> {
        if !self.config.log_enabled {
            log::debug!("measurement collection skipped: logging disabled by config");
            return Ok(());
        }
        crate::measurement::collect_all(&mut self.pcr, &mut self.log, now, source)
    }

    /// A snapshot of every PCR register.
    #[must_use]
    pub fn get_pcrs(&self) -> [[u8; 32]; crate::pcr::PCR_COUNT] { self.pcr.snapshot() }

    /// The recorded measurements, in collection order.
    pub fn get_log(&self) -> impl Iterator<Item = &Measurement> { self.log.iter() }

    /// Builds and signs an attestation report over the context's current PCR snapshot and
    /// measurement log.
    ///
    /// Captures the PCR values and log contents atomically with respect to the borrow checker:
    /// no other operation on this context can run concurrently with this call (see
    /// SPEC_FULL.md §5's single-threaded-per-context ordering requirement), so the snapshot
    /// taken here is always consistent with the log entries copied alongside it.
    ///
    /// # Errors
    /// Returns [`crate::error::AttestError::RngFailure`] if the injected random source is
    /// exhausted during the Fiat-Shamir-with-aborts signing loop.
    pub fn build_report(&self, now: u64, rng: &mut impl CryptoRngCore) -> Result<AttestationReport> {
        let measurements: Vec<Measurement> = self
            .log
            .iter()
            .take(crate::report::MAX_REPORT_MEASUREMENTS)
            .copied()
            .collect();
        let mut report = AttestationReport {
            device_id: self.device_id,
            timestamp: now,
            version: REPORT_VERSION,
            measurement_count: u32::try_from(measurements.len()).unwrap_or(0),
            pcr_snapshot: self.pcr.snapshot(),
            measurements,
            signature_length: SIG_LEN as u32,
            signature: crate::dsa::Signature::from_bytes([0u8; SIG_LEN]),
        };
        let digest = report.digest();
        report.signature = sig_sign(&self.sig_sk, &digest, rng)?;
        log::debug!("built attestation report with {} measurements", report.measurement_count);
        Ok(report)
    }

    /// Consumes the context, zeroizing its secret signing key.
    ///
    /// [`SigSecretKey`] already wipes itself on `Drop`; this method exists so callers can name
    /// the lifecycle boundary explicitly, matching the reference engine's
    /// `attestation_cleanup`.
    pub fn cleanup(self) {
        log::info!("attestation context cleaned up");
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::AttestationContext;
    use crate::config::{heapless_serial::Serial, AttestationConfig};
    use crate::measurement::{MeasurementComponent, MeasurementSource};
    use crate::report::verify_signature;
    use crate::verifier::verify_report;
    use rand_core::SeedableRng;

    struct FixedSource;
    impl MeasurementSource for FixedSource {
        fn read(&mut self, component: MeasurementComponent) -> crate::error::Result<Vec<u8>> {
            Ok(match component {
                MeasurementComponent::Firmware => b"firmware-v1".to_vec(),
                MeasurementComponent::Configuration => b"config-v1".to_vec(),
                MeasurementComponent::Runtime => b"runtime-v1".to_vec(),
                MeasurementComponent::Keys => b"keys-v1".to_vec(),
                MeasurementComponent::DeviceIdentity => b"ident-v1".to_vec(),
            })
        }
    }

    fn config() -> AttestationConfig {
        AttestationConfig { device_serial: Serial::new("unit-test-01").unwrap(), ..AttestationConfig::default() }
    }

    #[test]
    fn init_collect_build_verify_round_trips() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let mut ctx = AttestationContext::init(config(), &mut rng).unwrap();
        ctx.collect(1_700_000_000, &mut FixedSource).unwrap();
        assert_eq!(ctx.get_log().count(), 5);

        let report = ctx.build_report(1_700_000_000, &mut rng).unwrap();
        assert!(verify_signature(&report, ctx.public_key()));

        let result = verify_report(&report, ctx.public_key(), 1_700_000_000);
        assert!(result.valid);
    }

    #[test]
    fn report_round_trips_through_the_wire_format() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
        let mut ctx = AttestationContext::init(config(), &mut rng).unwrap();
        ctx.collect(1_700_000_000, &mut FixedSource).unwrap();
        let report = ctx.build_report(1_700_000_000, &mut rng).unwrap();

        let bytes = report.to_bytes();
        let parsed = crate::report::AttestationReport::from_bytes(&bytes).unwrap();
        let result = verify_report(&parsed, ctx.public_key(), 1_700_000_000);
        assert!(result.valid);
    }

    #[test]
    fn cleanup_consumes_the_context() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        let ctx = AttestationContext::init(config(), &mut rng).unwrap();
        ctx.cleanup();
    }
}
