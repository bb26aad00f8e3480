//! Keccak-f[1600] permutation, sponge construction, and the SHA3/SHAKE instances built on it.

mod hash;
mod permutation;
mod sponge;

pub(crate) use hash::{
    sha3_256, sha3_256_concat, sha3_512, sha3_512_concat, shake128, shake256, shake256_once, Shake,
};
