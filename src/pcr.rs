//! Platform Configuration Register bank: `N` independent 32-byte hash-chain registers.
//!
//! Grounded on the measurement-engine reference's `extend_pcr`/`g_attestation_ctx.pcr_values`/
//! `pcr_valid` fields, generalized into an owned value instead of a process-wide static.

use crate::error::{AttestError, Result};
use crate::keccak::sha3_256_concat;

/// Number of PCR registers in the bank.
pub const PCR_COUNT: usize = 8;

/// A bank of `PCR_COUNT` 32-byte platform configuration registers, each extended by hash
/// chaining: `pcr[i] <- SHA3-256(pcr[i] || measurement)`.
#[derive(Clone)]
pub struct PcrBank {
    values: [[u8; 32]; PCR_COUNT],
    valid: [bool; PCR_COUNT],
    extend_count: [u32; PCR_COUNT],
}

impl Default for PcrBank {
    fn default() -> Self { Self::new() }
}

impl PcrBank {
    /// Builds a bank with every register at its zero (unextended) value.
    #[must_use]
    pub fn new() -> Self {
        Self { values: [[0u8; 32]; PCR_COUNT], valid: [false; PCR_COUNT], extend_count: [0; PCR_COUNT] }
    }

    /// Extends register `index` with `measurement`: `pcr[index] <- H(pcr[index] ||
    /// measurement)`.
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidPcr`] if `index >= PCR_COUNT`.
    pub fn extend(&mut self, index: usize, measurement: &[u8; 32]) -> Result<()> {
        if index >= PCR_COUNT {
            return Err(AttestError::InvalidPcr);
        }
        self.values[index] = sha3_256_concat(&self.values[index], measurement);
        self.valid[index] = true;
        self.extend_count[index] = self.extend_count[index].wrapping_add(1);
        log::trace!("pcr[{index}] extended, count={}", self.extend_count[index]);
        Ok(())
    }

    /// Reads the current value of register `index`.
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidPcr`] if `index >= PCR_COUNT`.
    pub fn read(&self, index: usize) -> Result<[u8; 32]> {
        if index >= PCR_COUNT {
            return Err(AttestError::InvalidPcr);
        }
        Ok(self.values[index])
    }

    /// Resets register `index` to its zero value, matching the reference's unconditional
    /// reset (no locality or policy gate).
    ///
    /// # Errors
    /// Returns [`AttestError::InvalidPcr`] if `index >= PCR_COUNT`.
    pub fn reset(&mut self, index: usize) -> Result<()> {
        if index >= PCR_COUNT {
            return Err(AttestError::InvalidPcr);
        }
        self.values[index] = [0u8; 32];
        self.valid[index] = false;
        self.extend_count[index] = 0;
        Ok(())
    }

    /// Number of times register `index` has been extended since the last reset.
    #[must_use]
    pub fn extend_count(&self, index: usize) -> u32 {
        if index >= PCR_COUNT {
            0
        } else {
            self.extend_count[index]
        }
    }

    /// Whether register `index` has been extended at least once since the last reset.
    #[must_use]
    pub fn is_valid(&self, index: usize) -> bool { index < PCR_COUNT && self.valid[index] }

    /// A snapshot of all `PCR_COUNT` register values, in index order.
    #[must_use]
    pub fn snapshot(&self) -> [[u8; 32]; PCR_COUNT] { self.values }
}
