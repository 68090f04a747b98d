//! Multi-threaded scatter search: the parallel variant of `cipher`'s scatter mode.
//!
//! Workers share nothing but a termination flag and a single winner slot. There is no
//! work-stealing and no coordination beyond that flag — each thread runs its own
//! infinite search loop with a private nonce counter (or CSPRNG draw) until it wins or
//! observes another worker's win.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::cipher::try_scatter;
use crate::error::Result;
use crate::hash::HashAlgorithm;
use crate::random;

type Winner = (Vec<u8>, Vec<u16>);

#[allow(clippy::too_many_arguments)]
fn worker_loop(
    algo: HashAlgorithm,
    bits: u32,
    seed: u64,
    subkey: &[u8],
    block: &[u8],
    nonce_size: usize,
    output_extension: u32,
    deterministic: bool,
    thread_id: u64,
    total_workers: u64,
    found: &AtomicBool,
    winner: &Mutex<Option<Winner>>,
) {
    let mut local_tries: u64 = 0;
    while !found.load(Ordering::Acquire) {
        let nonce = if deterministic {
            let counter = thread_id + total_workers * (local_tries + 1);
            nonce_from_counter(counter, nonce_size)
        } else {
            match random::random_nonce(nonce_size) {
                Ok(n) => n,
                Err(_) => return,
            }
        };
        local_tries += 1;

        let final_hash =
            match crate::cipher::compute_final_hash(algo, bits, seed, subkey, &nonce, output_extension) {
                Ok(h) => h,
                Err(_) => return,
            };

        if let Some(indices) = try_scatter(&final_hash, block) {
            if found
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let mut guard = winner.lock().expect("winner mutex poisoned");
                *guard = Some((nonce, indices));
            }
            return;
        }

        if local_tries % 1_000_000 == 0 {
            eprint!("\rparascatter: {local_tries} local tries on worker {thread_id}");
        }
    }
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

/// Run `worker_count` (default: [`num_cpus::get`]) threads racing to find a scatter
/// match for `block`; returns the winning `(nonce, indices)` once any thread
/// publishes.
#[allow(clippy::too_many_arguments)]
pub(crate) fn search(
    algo: HashAlgorithm,
    bits: u32,
    seed: u64,
    subkey: &[u8],
    block: &[u8],
    nonce_size: usize,
    output_extension: u32,
    deterministic: bool,
    worker_count: Option<usize>,
) -> Result<(Vec<u8>, crate::cipher::BlockIndices)> {
    let workers = worker_count.unwrap_or_else(num_cpus::get).max(1) as u64;
    let found = Arc::new(AtomicBool::new(false));
    let winner: Arc<Mutex<Option<Winner>>> = Arc::new(Mutex::new(None));

    std::thread::scope(|scope| {
        for thread_id in 0..workers {
            let found = Arc::clone(&found);
            let winner = Arc::clone(&winner);
            scope.spawn(move || {
                worker_loop(
                    algo,
                    bits,
                    seed,
                    subkey,
                    block,
                    nonce_size,
                    output_extension,
                    deterministic,
                    thread_id,
                    workers,
                    &found,
                    &winner,
                );
            });
        }
    });

    let guard = winner.lock().expect("winner mutex poisoned");
    let (nonce, indices) = guard
        .clone()
        .expect("all workers exited without a winner ever being published");
    Ok((nonce, crate::cipher::BlockIndices::Multi(indices)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_a_valid_match_for_a_small_block() {
        let (nonce, indices) =
            search(HashAlgorithm::Rainbow, 256, 0, b"subkeybytes", b"hi", 4, 0, true, Some(2)).unwrap();
        assert_eq!(nonce.len(), 4);
        match indices {
            crate::cipher::BlockIndices::Multi(v) => assert_eq!(v.len(), 2),
            _ => panic!("parascatter always records multi-index results"),
        }
    }

    #[test]
    fn single_worker_still_finds_a_match() {
        let result = search(HashAlgorithm::Rainstorm, 64, 3, b"k", b"x", 2, 0, true, Some(1));
        assert!(result.is_ok());
    }
}
