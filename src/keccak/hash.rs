//! Fixed-output SHA3-256/512 and extendable-output SHAKE128/256, built on [`Sponge`].

use super::sponge::Sponge;

const SHA3_256_RATE: usize = 136;
const SHA3_512_RATE: usize = 72;
const SHAKE128_RATE: usize = 168;
const SHAKE256_RATE: usize = 136;
const SHA3_SUFFIX: u8 = 0x06;
const SHAKE_SUFFIX: u8 = 0x1F;

/// SHA3-256 over a single input.
pub(crate) fn sha3_256(data: &[u8]) -> [u8; 32] {
    let mut sponge = Sponge::new(SHA3_256_RATE, SHA3_SUFFIX);
    sponge.absorb(data);
    let mut out = [0u8; 32];
    sponge.squeeze(&mut out);
    out
}

/// SHA3-256 over the concatenation of two inputs, avoiding a caller-side allocation for the
/// common `H(a || b)` idiom used throughout PCR extension and report hashing.
pub(crate) fn sha3_256_concat(a: &[u8], b: &[u8]) -> [u8; 32] {
    let mut sponge = Sponge::new(SHA3_256_RATE, SHA3_SUFFIX);
    sponge.absorb(a);
    sponge.absorb(b);
    let mut out = [0u8; 32];
    sponge.squeeze(&mut out);
    out
}

/// SHA3-512 over a single input.
pub(crate) fn sha3_512(data: &[u8]) -> [u8; 64] {
    let mut sponge = Sponge::new(SHA3_512_RATE, SHA3_SUFFIX);
    sponge.absorb(data);
    let mut out = [0u8; 64];
    sponge.squeeze(&mut out);
    out
}

/// SHA3-512 over the concatenation of two inputs.
pub(crate) fn sha3_512_concat(a: &[u8], b: &[u8]) -> [u8; 64] {
    let mut sponge = Sponge::new(SHA3_512_RATE, SHA3_SUFFIX);
    sponge.absorb(a);
    sponge.absorb(b);
    let mut out = [0u8; 64];
    sponge.squeeze(&mut out);
    out
}

/// A SHAKE instance that has finished absorbing and can be squeezed incrementally.
pub(crate) struct Shake {
    sponge: Sponge,
}

impl Shake {
    fn new(rate: usize) -> Self { Self { sponge: Sponge::new(rate, SHAKE_SUFFIX) } }

    pub(crate) fn absorb(&mut self, data: &[u8]) -> &mut Self {
        self.sponge.absorb(data);
        self
    }

    pub(crate) fn squeeze(&mut self, out: &mut [u8]) { self.sponge.squeeze(out); }
}

/// Starts a SHAKE128 instance (matrix-expansion XOF, rate 168).
pub(crate) fn shake128() -> Shake { Shake::new(SHAKE128_RATE) }

/// Starts a SHAKE256 instance (noise/challenge expansion XOF, rate 136).
pub(crate) fn shake256() -> Shake { Shake::new(SHAKE256_RATE) }

/// One-shot SHAKE256(data, out_len), used by the signature scheme's seed/challenge derivation.
pub(crate) fn shake256_once(data: &[u8], out: &mut [u8]) {
    let mut s = shake256();
    s.absorb(data);
    s.squeeze(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha3_256_known_answer_abc() {
        let digest = sha3_256(b"abc");
        let expected = hex_literal::hex!(
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
        assert_eq!(digest, expected);
    }

    #[test]
    fn sha3_256_empty_differs_from_abc() {
        assert_ne!(sha3_256(b""), sha3_256(b"abc"));
    }

    #[test]
    fn concat_matches_manual_concatenation() {
        let a = b"hello ";
        let b = b"world";
        let mut joined = Vec::new();
        joined.extend_from_slice(a);
        joined.extend_from_slice(b);
        assert_eq!(sha3_256_concat(a, b), sha3_256(&joined));
        assert_eq!(sha3_512_concat(a, b), sha3_512(&joined));
    }

    #[test]
    fn shake128_is_extendable() {
        let mut s = shake128();
        s.absorb(b"seed");
        let mut short = [0u8; 32];
        s.squeeze(&mut short);

        let mut s2 = shake128();
        s2.absorb(b"seed");
        let mut long = [0u8; 64];
        s2.squeeze(&mut long);

        assert_eq!(&long[..32], &short[..]);
    }
}
