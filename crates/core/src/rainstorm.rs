//! Rainstorm: a sixteen-word keyed mixing hash with 64/128/256/512-bit output.
//!
//! Like [`crate::rainbow`], the streaming state needs the total input length up front
//! for its word initialization; `RainstormState::new` takes `olen` for that reason.

use crate::bytes::{read_u64_le, rotr64, write_u64_le};
use crate::error::{Error, Result};
use crate::params::{CTR_LEFT, CTR_RIGHT, K, RAINSTORM_FINAL_ROUNDS, RAINSTORM_INIT, RAINSTORM_ROUNDS, Z};

/// Left-path variant: ingests into the low 8 words, blits into the high 8.
fn weakfunc_left(h: &mut [u64; 16], data: &[u64; 8]) {
    let mut ctr = CTR_LEFT;
    for i in 0..8 {
        let j = i + 1;
        let k = i + 8;
        h[i] ^= data[i];
        h[i] = h[i].wrapping_sub(K[i]);
        h[i] = rotr64(h[i], Z[i]);

        h[k] ^= h[i];

        ctr = ctr.wrapping_add(h[i]);
        h[j] = h[j].wrapping_sub(ctr);
    }
}

/// Right-path variant, per §6: for `i=8..15`, `j=i-8`, `k=i-7`,
/// `h[((k)&7)+8] -= ctr`.
fn weakfunc_right(h: &mut [u64; 16], data: &[u64; 8]) {
    let mut ctr = CTR_RIGHT;
    for i in 8..16 {
        let j = i - 8;
        let k = i - 7;
        h[i] ^= data[j];
        h[i] = h[i].wrapping_sub(K[j]);
        h[i] = rotr64(h[i], Z[j]);

        h[j] ^= h[i];

        ctr = ctr.wrapping_add(h[i]);
        h[(k & 7) + 8] = h[(k & 7) + 8].wrapping_sub(ctr);
    }
}

fn weakfunc(h: &mut [u64; 16], data: &[u64; 8], left: bool) {
    if left {
        weakfunc_left(h, data);
    } else {
        weakfunc_right(h, data);
    }
}

fn words_from_block(block: &[u8]) -> [u64; 8] {
    debug_assert_eq!(block.len(), 64);
    let mut temp = [0u64; 8];
    for (i, word) in temp.iter_mut().enumerate() {
        *word = read_u64_le(block, i * 8);
    }
    temp
}

fn valid_hashsize(hashsize: u32) -> bool {
    matches!(hashsize, 64 | 128 | 256 | 512)
}

fn init_words(seed: u64, olen: u64) -> [u64; 16] {
    let mut h = [0u64; 16];
    for (i, c) in RAINSTORM_INIT.iter().enumerate() {
        h[i] = seed.wrapping_add(olen).wrapping_add(*c);
    }
    h
}

/// Run the shared tail-and-finalize sequence: pad the remainder, absorb it, fold the
/// high half into the low half, and (for `hashsize > 64`) run extra rounds.
fn finish(h: &mut [u64; 16], tail: &[u8], hashsize: u32) {
    debug_assert!(tail.len() < 64);
    let mut temp = [(0x80u32 + tail.len() as u32) as u8; 64];
    temp[..tail.len()].copy_from_slice(tail);
    let temp_words = words_from_block(&temp);

    for i in 0..RAINSTORM_ROUNDS {
        weakfunc(h, &temp_words, i & 1 != 0);
    }

    for i in 0..8 {
        h[i] = h[i].wrapping_sub(h[i + 8]);
    }

    if hashsize > 64 {
        let extra = std::cmp::max((hashsize / 64) as usize, RAINSTORM_FINAL_ROUNDS);
        for _ in 0..extra {
            weakfunc(h, &temp_words, true);
        }
    }
}

fn emit(h: &[u64; 16], hashsize: u32, out: &mut [u8]) {
    let words = std::cmp::min(8, (hashsize / 64) as usize);
    for i in 0..words {
        write_u64_le(out, i * 8, h[i]);
    }
}

/// Streaming Rainstorm hasher.
///
/// As with [`crate::rainbow::RainbowState`], the tail-fold and finalization rounds run
/// exactly once, inside [`finalize`](Self::finalize), regardless of how `update` calls
/// were chunked — this matches the single-call [`rainstorm`] semantics even though the
/// reference implementation's streaming `update` can finalize early on a short
/// non-terminal call.
pub struct RainstormState {
    h: [u64; 16],
    hashsize: u32,
    buf: Vec<u8>,
    finalized: bool,
    result: [u8; 64],
}

impl RainstormState {
    pub fn new(seed: u64, olen: u64, hashsize: u32) -> Result<Self> {
        if !valid_hashsize(hashsize) {
            return Err(Error::Parameter(format!(
                "invalid rainstorm output size: {hashsize} bits"
            )));
        }
        Ok(Self {
            h: init_words(seed, olen),
            hashsize,
            buf: Vec::new(),
            finalized: false,
            result: [0u8; 64],
        })
    }

    pub fn update(&mut self, data: &[u8]) {
        if self.finalized {
            return;
        }
        self.buf.extend_from_slice(data);

        let mut offset = 0;
        while self.buf.len() - offset >= 64 {
            let block = &self.buf[offset..offset + 64];
            let words = words_from_block(block);
            for i in 0..RAINSTORM_ROUNDS {
                weakfunc(&mut self.h, &words, i & 1 != 0);
            }
            offset += 64;
        }
        self.buf.drain(0..offset);
    }

    pub fn finalize(&mut self) -> &[u8] {
        let out_len = (self.hashsize / 8) as usize;
        if !self.finalized {
            let tail = std::mem::take(&mut self.buf);
            finish(&mut self.h, &tail, self.hashsize);
            emit(&self.h, self.hashsize, &mut self.result[..out_len]);
            self.finalized = true;
        }
        &self.result[..out_len]
    }
}

/// Single-call Rainstorm hash.
pub fn rainstorm(seed: u64, hashsize: u32, data: &[u8]) -> Result<Vec<u8>> {
    let mut state = RainstormState::new(seed, data.len() as u64, hashsize)?;
    state.update(data);
    Ok(state.finalize().to_vec())
}
