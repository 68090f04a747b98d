//! The puzzle block cipher: search for a nonce whose keyed hash contains the
//! plaintext bytes, store only the nonce and index metadata.
//!
//! Encryption never fails on its own account — the search loop simply runs until it
//! finds a match. Decryption is fail-fast: a truncated header, an out-of-range index,
//! or a length mismatch after decompression all surface as [`Error`] immediately.

use std::io::{Read, Write};

use crate::compress;
use crate::error::{Error, Result};
use crate::hash::{self, HashAlgorithm};
use crate::header::{self, FileHeader};
use crate::kdf;
use crate::parascatter;
use crate::random;

/// How plaintext bytes are located inside the final hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Prefix,
    Sequence,
    Series,
    Scatter,
    Mapscatter,
    Parascatter,
}

impl SearchMode {
    pub fn from_str(name: &str) -> Result<Self> {
        match name {
            "prefix" => Ok(Self::Prefix),
            "sequence" => Ok(Self::Sequence),
            "series" => Ok(Self::Series),
            "scatter" => Ok(Self::Scatter),
            "mapscatter" => Ok(Self::Mapscatter),
            "parascatter" => Ok(Self::Parascatter),
            other => Err(Error::Parameter(format!("unknown search mode: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Sequence => "sequence",
            Self::Series => "series",
            Self::Scatter => "scatter",
            Self::Mapscatter => "mapscatter",
            Self::Parascatter => "parascatter",
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Prefix => header::SEARCH_MODE_PREFIX,
            Self::Sequence => header::SEARCH_MODE_SEQUENCE,
            Self::Series => header::SEARCH_MODE_SERIES,
            Self::Scatter => header::SEARCH_MODE_SCATTER,
            Self::Mapscatter => header::SEARCH_MODE_MAPSCATTER,
            Self::Parascatter => header::SEARCH_MODE_PARASCATTER,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            header::SEARCH_MODE_PREFIX => Ok(Self::Prefix),
            header::SEARCH_MODE_SEQUENCE => Ok(Self::Sequence),
            header::SEARCH_MODE_SERIES => Ok(Self::Series),
            header::SEARCH_MODE_SCATTER => Ok(Self::Scatter),
            header::SEARCH_MODE_MAPSCATTER => Ok(Self::Mapscatter),
            header::SEARCH_MODE_PARASCATTER => Ok(Self::Parascatter),
            other => Err(Error::Parameter(format!("unknown search mode byte: 0x{other:02x}"))),
        }
    }

    /// Modes 0x02-0x05 store one index per plaintext byte; prefix/sequence store a
    /// single start index.
    fn uses_multi_index(self) -> bool {
        !matches!(self, Self::Prefix | Self::Sequence)
    }
}

/// What a successful search recorded for one block.
#[derive(Debug, Clone)]
pub(crate) enum BlockIndices {
    Single(u16),
    Multi(Vec<u16>),
}

/// Parameters for [`encrypt`]. `salt` and the derived subkey stream are shared
/// read-only state across all blocks.
pub struct EncryptParams {
    pub algo: HashAlgorithm,
    pub hash_bits: u32,
    pub seed: u64,
    pub salt: Vec<u8>,
    pub block_size: u8,
    pub nonce_size: u8,
    pub search_mode: SearchMode,
    pub deterministic_nonce: bool,
    pub output_extension: u32,
    /// Worker count for parascatter mode; `None` defaults to `num_cpus::get()`.
    pub worker_count: Option<usize>,
}

/// `hash(subkey ‖ nonce)`, optionally extended with KDF output keyed on the raw
/// trial buffer (see the module-level note on the `extendOutputKDF` calling
/// convention preserved from the source).
pub(crate) fn compute_final_hash(
    algo: HashAlgorithm,
    bits: u32,
    seed: u64,
    subkey: &[u8],
    nonce: &[u8],
    output_extension: u32,
) -> Result<Vec<u8>> {
    let mut trial = Vec::with_capacity(subkey.len() + nonce.len());
    trial.extend_from_slice(subkey);
    trial.extend_from_slice(nonce);

    let mut final_hash = hash::invoke(algo, bits, seed, &trial)?;
    if output_extension > 0 {
        let extra = kdf::extend_output_kdf(&trial, output_extension as usize, algo, bits)?;
        final_hash.extend_from_slice(&extra);
    }
    Ok(final_hash)
}

fn nonce_from_counter(counter: u64, nonce_size: usize) -> Vec<u8> {
    (0..nonce_size)
        .map(|i| {
            let shift = 8 * i;
            if shift < 64 {
                ((counter >> shift) & 0xFF) as u8
            } else {
                0
            }
        })
        .collect()
}

fn try_prefix(final_hash: &[u8], block: &[u8]) -> bool {
    final_hash.len() >= block.len() && &final_hash[..block.len()] == block
}

fn try_sequence(final_hash: &[u8], block: &[u8]) -> Option<u16> {
    if block.is_empty() {
        return Some(0);
    }
    if final_hash.len() < block.len() {
        return None;
    }
    (0..=final_hash.len() - block.len()).find(|&i| &final_hash[i..i + block.len()] == block).map(|i| i as u16)
}

fn try_series(final_hash: &[u8], block: &[u8]) -> Option<Vec<u16>> {
    let mut used = vec![false; final_hash.len()];
    let mut indices = Vec::with_capacity(block.len());
    let mut cursor = 0usize;
    for &byte in block {
        let found = (cursor..final_hash.len()).find(|&i| final_hash[i] == byte && !used[i])?;
        used[found] = true;
        indices.push(found as u16);
        cursor = found + 1;
    }
    Some(indices)
}

pub(crate) fn try_scatter(final_hash: &[u8], block: &[u8]) -> Option<Vec<u16>> {
    let mut used = vec![false; final_hash.len()];
    let mut indices = Vec::with_capacity(block.len());
    for &byte in block {
        let found = (0..final_hash.len()).find(|&i| final_hash[i] == byte && !used[i])?;
        used[found] = true;
        indices.push(found as u16);
    }
    Some(indices)
}

fn try_mapscatter(final_hash: &[u8], block: &[u8]) -> Option<Vec<u16>> {
    let mut positions: Vec<Vec<u16>> = vec![Vec::new(); 256];
    for (i, &b) in final_hash.iter().enumerate() {
        positions[b as usize].push(i as u16);
    }
    let mut indices = Vec::with_capacity(block.len());
    for &byte in block {
        let slot = &mut positions[byte as usize];
        indices.push(slot.pop()?);
    }
    Some(indices)
}

#[allow(clippy::too_many_arguments)]
fn search_sequential(
    algo: HashAlgorithm,
    bits: u32,
    seed: u64,
    subkey: &[u8],
    block: &[u8],
    nonce_size: usize,
    output_extension: u32,
    deterministic: bool,
    mode: SearchMode,
    counter: &mut u64,
) -> Result<(Vec<u8>, BlockIndices)> {
    let mut tries: u64 = 0;
    loop {
        let nonce = if deterministic {
            let n = nonce_from_counter(*counter, nonce_size);
            *counter = counter.wrapping_add(1);
            n
        } else {
            random::random_nonce(nonce_size)?
        };

        let final_hash = compute_final_hash(algo, bits, seed, subkey, &nonce, output_extension)?;

        let result = match mode {
            SearchMode::Prefix => {
                if try_prefix(&final_hash, block) {
                    Some(BlockIndices::Single(0))
                } else {
                    None
                }
            }
            SearchMode::Sequence => try_sequence(&final_hash, block).map(BlockIndices::Single),
            SearchMode::Series => try_series(&final_hash, block).map(BlockIndices::Multi),
            SearchMode::Scatter => try_scatter(&final_hash, block).map(BlockIndices::Multi),
            SearchMode::Mapscatter => try_mapscatter(&final_hash, block).map(BlockIndices::Multi),
            SearchMode::Parascatter => unreachable!("parascatter is dispatched before this loop"),
        };

        if let Some(indices) = result {
            return Ok((nonce, indices));
        }

        tries += 1;
        if tries % 1_000_000 == 0 {
            eprint!("\rsearching... {tries} tries");
        }
    }
}

fn write_block_record<W: Write>(out: &mut W, nonce: &[u8], indices: &BlockIndices) -> Result<()> {
    out.write_all(nonce)?;
    match indices {
        BlockIndices::Single(start) => out.write_all(&start.to_le_bytes())?,
        BlockIndices::Multi(idxs) => {
            for idx in idxs {
                out.write_all(&idx.to_le_bytes())?;
            }
        }
    }
    Ok(())
}

/// Encrypt `plaintext` under `key`, writing header and block records to `out`.
pub fn encrypt<W: Write>(plaintext: &[u8], key: &[u8], params: &EncryptParams, out: &mut W) -> Result<()> {
    if params.block_size == 0 {
        return Err(Error::Parameter("block_size must be at least 1".into()));
    }
    let bits = params.hash_bits;
    let hash_bytes = (bits / 8) as usize;
    let cap = 65536usize.saturating_sub(hash_bytes);
    let mut output_extension = params.output_extension as usize;
    if output_extension > cap {
        eprintln!(
            "warning: output_extension {} exceeds the 65536-byte final-hash cap for {}-bit output; lowering to {}",
            output_extension, bits, cap
        );
        output_extension = cap;
    }

    let compressed = compress::compress(plaintext)?;

    let hdr = FileHeader::new_block(
        params.block_size as u16,
        params.nonce_size as u16,
        bits as u16,
        output_extension as u16,
        params.algo.as_str(),
        params.seed,
        params.salt.clone(),
        params.search_mode.to_byte(),
        compressed.len() as u64,
    )?;
    header::write_header(out, &hdr)?;

    let block_size = params.block_size as usize;
    let total_blocks = compressed.len().div_ceil(block_size);
    let s = hash_bytes;
    let prk = kdf::derive_prk(params.seed, &params.salt, key, params.algo, bits);
    let subkeys = kdf::extend_output_kdf(&prk, total_blocks * s, params.algo, bits)?;

    let mut counter: u64 = 0;
    for i in 0..total_blocks {
        let start = i * block_size;
        let end = std::cmp::min(start + block_size, compressed.len());
        let this_block = &compressed[start..end];
        let subkey = &subkeys[i * s..(i + 1) * s];

        let (nonce, indices) = if params.search_mode == SearchMode::Parascatter {
            parascatter::search(
                params.algo,
                bits,
                params.seed,
                subkey,
                this_block,
                params.nonce_size as usize,
                output_extension as u32,
                params.deterministic_nonce,
                params.worker_count,
            )?
        } else {
            search_sequential(
                params.algo,
                bits,
                params.seed,
                subkey,
                this_block,
                params.nonce_size as usize,
                output_extension as u32,
                params.deterministic_nonce,
                params.search_mode,
                &mut counter,
            )?
        };

        write_block_record(out, &nonce, &indices)?;
    }
    if total_blocks > 0 {
        eprintln!();
    }
    Ok(())
}

/// Decrypt a puzzle-cipher file produced by [`encrypt`].
pub fn decrypt<R: Read, W: Write>(input: &mut R, key: &[u8], out: &mut W) -> Result<()> {
    let hdr = header::read_header(input)?;
    if hdr.cipher_mode != header::CIPHER_MODE_BLOCK {
        return Err(Error::Format(format!(
            "unsupported cipher mode 0x{:02x} (only block puzzle cipher is implemented)",
            hdr.cipher_mode
        )));
    }
    let algo = HashAlgorithm::from_str(&hdr.hash_name)?;
    let bits = hdr.hash_size_bits as u32;
    let mode = SearchMode::from_byte(hdr.search_mode)?;
    let block_size = hdr.block_size as usize;
    let nonce_size = hdr.nonce_size as usize;
    let output_extension = hdr.output_extension as u32;
    let original_size = hdr.original_size as usize;

    if block_size == 0 {
        return Err(Error::Parameter("header block_size is zero".into()));
    }
    let total_blocks = original_size.div_ceil(block_size);

    let s = (bits / 8) as usize;
    let prk = kdf::derive_prk(hdr.iv, &hdr.salt, key, algo, bits);
    let subkeys = kdf::extend_output_kdf(&prk, total_blocks * s, algo, bits)?;

    let mut compressed = Vec::with_capacity(original_size);
    for i in 0..total_blocks {
        let this_block_size = std::cmp::min(block_size, original_size - i * block_size);
        let subkey = &subkeys[i * s..(i + 1) * s];

        let mut nonce = vec![0u8; nonce_size];
        input.read_exact(&mut nonce)?;

        let final_hash = compute_final_hash(algo, bits, hdr.iv, subkey, &nonce, output_extension)?;

        if mode.uses_multi_index() {
            let mut indices = Vec::with_capacity(this_block_size);
            for _ in 0..this_block_size {
                let mut idx_buf = [0u8; 2];
                input.read_exact(&mut idx_buf)?;
                indices.push(u16::from_le_bytes(idx_buf));
            }
            for idx in indices {
                let idx = idx as usize;
                if idx >= final_hash.len() {
                    return Err(Error::Bounds { index: idx, limit: final_hash.len() });
                }
                compressed.push(final_hash[idx]);
            }
        } else {
            let mut start_buf = [0u8; 2];
            input.read_exact(&mut start_buf)?;
            let start = u16::from_le_bytes(start_buf) as usize;
            if start + this_block_size > final_hash.len() {
                return Err(Error::Bounds { index: start + this_block_size, limit: final_hash.len() });
            }
            compressed.extend_from_slice(&final_hash[start..start + this_block_size]);
        }
    }

    if compressed.len() as u64 != hdr.original_size {
        return Err(Error::Integrity { expected: hdr.original_size, actual: compressed.len() as u64 });
    }

    let plaintext = compress::decompress(&compressed)?;
    out.write_all(&plaintext)?;
    Ok(())
}
