//! # Rainkeep core
//!
//! Puzzle-based file encryption built on two custom keyed mixing hashes.
//!
//! ## Algorithms
//!
//! - **Rainbow** ([`rainbow::rainbow`]) — a four-word mixing hash with 64/128/256-bit
//!   output.
//! - **Rainstorm** ([`rainstorm::rainstorm`]) — a sixteen-word mixing hash with
//!   64/128/256/512-bit output.
//!
//! Both are streaming (see [`rainbow::RainbowState`], [`rainstorm::RainstormState`])
//! and keyed by a 64-bit seed.
//!
//! ## The puzzle cipher
//!
//! [`cipher::encrypt`]/[`cipher::decrypt`] do not transform plaintext bytes
//! mathematically. For each fixed-size block, the encryptor searches for a nonce such
//! that `hash(subkey ‖ nonce)` contains the plaintext bytes in one of six geometric
//! arrangements ([`cipher::SearchMode`]), then stores only the nonce and the indices
//! where the bytes were found. Decryption recomputes the hash from the stored nonce
//! and reads the plaintext back out by index.
//!
//! The `parascatter` mode ([`parascatter`]) runs the scatter search across multiple
//! threads racing to the first match.
//!
//! ## Example
//!
//! ```
//! use rainkeep_core::hash::HashAlgorithm;
//! use rainkeep_core::cipher::{self, EncryptParams, SearchMode};
//!
//! let params = EncryptParams {
//!     algo: HashAlgorithm::Rainstorm,
//!     hash_bits: 256,
//!     seed: 0,
//!     salt: vec![],
//!     block_size: 16,
//!     nonce_size: 8,
//!     search_mode: SearchMode::Prefix,
//!     deterministic_nonce: true,
//!     output_extension: 0,
//!     worker_count: None,
//! };
//!
//! let mut ciphertext = Vec::new();
//! cipher::encrypt(b"hello, puzzle cipher", b"key", &params, &mut ciphertext).unwrap();
//!
//! let mut plaintext = Vec::new();
//! cipher::decrypt(&mut std::io::Cursor::new(ciphertext), b"key", &mut plaintext).unwrap();
//! assert_eq!(plaintext, b"hello, puzzle cipher");
//! ```

pub mod bytes;
pub mod cipher;
pub mod compress;
pub mod error;
pub mod hash;
pub mod header;
pub mod kdf;
pub mod params;
pub mod parascatter;
pub mod rainbow;
pub mod rainstorm;
pub mod random;

pub use cipher::{decrypt, encrypt, EncryptParams, SearchMode};
pub use error::{Error, Result};
pub use hash::{invoke as hash_invoke, HashAlgorithm};
pub use header::FileHeader;
pub use kdf::{derive_prk, extend_output_kdf};
pub use rainbow::{rainbow, RainbowState};
pub use rainstorm::{rainstorm, RainstormState};
