//! Key derivation: `derive_prk` (HKDF-Extract analogue) and `extend_output_kdf`
//! (HKDF-Expand analogue), both built on the in-crate hashes.
//!
//! No bit-exact reference implementation of these two functions survives in the
//! retrieved original source (see `DESIGN.md`), so this module defines a concrete,
//! reproducible construction rather than leaving the contract unimplemented. The only
//! hard requirement carried over from the source is the calling convention in
//! [`crate::cipher`]: `extend_output_kdf` is invoked directly on the raw
//! `subkey ‖ nonce` trial buffer during puzzle search, not on a value that has first
//! passed through `derive_prk`.

use crate::hash::{self, HashAlgorithm};
use crate::error::Result;
use crate::rainstorm;

/// HKDF-Extract analogue: always uses Rainstorm-512, independent of the file's
/// configured `(algo, bits)`, since extraction only needs to compress salt+ikm into a
/// fixed-size PRK and Rainstorm-512 gives the most output material per call.
///
/// `algo`/`bits` are accepted to keep this call's shape symmetric with
/// [`extend_output_kdf`] (both take the file's configured hash), but are currently
/// unused: extraction is always Rainstorm-512 regardless of what the file header
/// selects for expansion.
pub fn derive_prk(seed: u64, salt: &[u8], ikm: &[u8], _algo: HashAlgorithm, _bits: u32) -> Vec<u8> {
    let mut input = Vec::with_capacity(salt.len() + ikm.len());
    input.extend_from_slice(salt);
    input.extend_from_slice(ikm);
    rainstorm::rainstorm(seed, 512, &input).expect("512 is a valid rainstorm output size")
}

/// HKDF-Expand analogue: repeatedly hashes `prk ‖ T(i-1) ‖ counter_byte` using the
/// caller-selected `(algo, bits)`, concatenating blocks until `length` bytes are
/// available.
pub fn extend_output_kdf(prk: &[u8], length: usize, algo: HashAlgorithm, bits: u32) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(length);
    let mut prev: Vec<u8> = Vec::new();
    let mut counter: u8 = 1;

    while out.len() < length {
        let mut input = Vec::with_capacity(prk.len() + prev.len() + 1);
        input.extend_from_slice(prk);
        input.extend_from_slice(&prev);
        input.push(counter);

        let block = hash::invoke(algo, bits, 0, &input)?;
        out.extend_from_slice(&block);
        prev = block;
        counter = counter.wrapping_add(1);
    }

    out.truncate(length);
    Ok(out)
}
