//! OS-entropy-backed random bytes, used for non-deterministic nonce generation.

use crate::error::{Error, Result};

/// Fill `buf` with secure random bytes from the OS entropy source.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    getrandom::getrandom(buf).map_err(|e| Error::Parameter(format!("entropy source failed: {e}")))
}

/// A `nonce_size`-byte random nonce, independently uniform per byte.
pub fn random_nonce(nonce_size: usize) -> Result<Vec<u8>> {
    let mut nonce = vec![0u8; nonce_size];
    fill_random(&mut nonce)?;
    Ok(nonce)
}
