use std::io::Cursor;

use rainkeep_core::cipher::{self, EncryptParams, SearchMode};
use rainkeep_core::hash::HashAlgorithm;
use rainkeep_core::header;

fn encrypt_to_vec(plaintext: &[u8], key: &[u8], params: &EncryptParams) -> Vec<u8> {
    let mut out = Vec::new();
    cipher::encrypt(plaintext, key, params, &mut out).unwrap();
    out
}

fn decrypt_from_slice(ciphertext: &[u8], key: &[u8]) -> Vec<u8> {
    let mut cursor = Cursor::new(ciphertext);
    let mut out = Vec::new();
    cipher::decrypt(&mut cursor, key, &mut out).unwrap();
    out
}

/// Scenario: 64-byte all-zero plaintext, prefix mode, rainstorm-256, block_size=16,
/// nonce_size=8, deterministic nonces, key="test", empty salt, seed=0.
#[test]
fn prefix_mode_on_all_zero_plaintext_produces_expected_layout() {
    let plaintext = vec![0u8; 64];
    let params = EncryptParams {
        algo: HashAlgorithm::Rainstorm,
        hash_bits: 256,
        seed: 0,
        salt: vec![],
        block_size: 16,
        nonce_size: 8,
        search_mode: SearchMode::Prefix,
        deterministic_nonce: true,
        output_extension: 0,
        worker_count: None,
    };

    let ciphertext = encrypt_to_vec(&plaintext, b"test", &params);

    let mut cursor = Cursor::new(&ciphertext);
    let hdr = header::read_header(&mut cursor).unwrap();
    let header_len = cursor.position() as usize;
    let body_len = ciphertext.len() - header_len;

    // Deflate shrinks an all-zero run well below 64 bytes, so the block count tracks
    // the *compressed* size, not the original 64 — each block record is 8 nonce
    // bytes + 2 index bytes (prefix stores a single start index).
    let total_blocks = (hdr.original_size as usize).div_ceil(16);
    assert_eq!(body_len, total_blocks * (8 + 2));

    let recovered = decrypt_from_slice(&ciphertext, b"test");
    assert_eq!(recovered, plaintext);
}

/// Scenario: "ABCDEFGH" with scatter mode, rainbow-256, block_size=8, nonce_size=4,
/// deterministic nonces — decryption recovers the plaintext and the stored indices
/// each point at the matching byte and are mutually distinct.
#[test]
fn scatter_mode_indices_are_distinct_and_point_at_matching_bytes() {
    let plaintext = b"ABCDEFGH".to_vec();
    let params = EncryptParams {
        algo: HashAlgorithm::Rainbow,
        hash_bits: 256,
        seed: 0,
        salt: vec![],
        block_size: 8,
        nonce_size: 4,
        search_mode: SearchMode::Scatter,
        deterministic_nonce: true,
        output_extension: 0,
        worker_count: None,
    };

    let ciphertext = encrypt_to_vec(&plaintext, b"key", &params);
    let recovered = decrypt_from_slice(&ciphertext, b"key");
    assert_eq!(recovered, plaintext);

    let mut cursor = Cursor::new(&ciphertext);
    let hdr = header::read_header(&mut cursor).unwrap();
    let mut nonce = vec![0u8; hdr.nonce_size as usize];
    std::io::Read::read_exact(&mut cursor, &mut nonce).unwrap();
    let mut indices = Vec::with_capacity(plaintext.len());
    for _ in 0..plaintext.len() {
        let mut buf = [0u8; 2];
        std::io::Read::read_exact(&mut cursor, &mut buf).unwrap();
        indices.push(u16::from_le_bytes(buf));
    }

    let unique: std::collections::HashSet<_> = indices.iter().collect();
    assert_eq!(unique.len(), indices.len(), "all indices must be distinct");

    let trial = {
        let prk = rainkeep_core::derive_prk(hdr.iv, &hdr.salt, b"key", HashAlgorithm::Rainbow, 256);
        let subkeys = rainkeep_core::extend_output_kdf(&prk, 32, HashAlgorithm::Rainbow, 256).unwrap();
        let mut t = subkeys;
        t.extend_from_slice(&nonce);
        t
    };
    let final_hash = rainkeep_core::hash_invoke(HashAlgorithm::Rainbow, 256, hdr.iv, &trial).unwrap();
    for (idx, &byte) in indices.iter().zip(plaintext.iter()) {
        assert_eq!(final_hash[*idx as usize], byte);
    }
}

/// Parascatter with several workers produces a valid result that decrypts, and
/// repeated runs are not always identical (the winning thread is scheduling
/// dependent).
#[test]
fn parascatter_produces_decryptable_output_and_is_not_always_identical() {
    let plaintext = b"parascatter roundtrip payload!!!".to_vec();
    assert_eq!(plaintext.len(), 32);

    let make_params = || EncryptParams {
        algo: HashAlgorithm::Rainbow,
        hash_bits: 256,
        seed: 5,
        salt: vec![9, 9, 9],
        block_size: 32,
        nonce_size: 4,
        search_mode: SearchMode::Parascatter,
        deterministic_nonce: false,
        output_extension: 0,
        worker_count: Some(8),
    };

    let mut ciphertexts = Vec::new();
    for _ in 0..5 {
        let ct = encrypt_to_vec(&plaintext, b"key", &make_params());
        let recovered = decrypt_from_slice(&ct, b"key");
        assert_eq!(recovered, plaintext);
        ciphertexts.push(ct);
    }

    let all_same = ciphertexts.windows(2).all(|w| w[0] == w[1]);
    assert!(!all_same, "random-nonce parascatter runs should not always agree");
}

#[test]
fn output_extension_beyond_cap_is_silently_lowered() {
    let params = EncryptParams {
        algo: HashAlgorithm::Rainbow,
        hash_bits: 256,
        seed: 0,
        salt: vec![],
        block_size: 4,
        nonce_size: 4,
        search_mode: SearchMode::Scatter,
        deterministic_nonce: true,
        output_extension: 70_000,
        worker_count: None,
    };
    let ciphertext = encrypt_to_vec(b"abcd", b"k", &params);
    let mut cursor = Cursor::new(&ciphertext);
    let hdr = header::read_header(&mut cursor).unwrap();
    assert!((hdr.hash_size_bits as usize / 8) + hdr.output_extension as usize <= 65536);
}

#[test]
fn empty_plaintext_round_trips_through_every_mode() {
    for mode in [
        SearchMode::Prefix,
        SearchMode::Sequence,
        SearchMode::Series,
        SearchMode::Scatter,
        SearchMode::Mapscatter,
    ] {
        let params = EncryptParams {
            algo: HashAlgorithm::Rainstorm,
            hash_bits: 64,
            seed: 0,
            salt: vec![],
            block_size: 4,
            nonce_size: 4,
            search_mode: mode,
            deterministic_nonce: true,
            output_extension: 0,
            worker_count: None,
        };
        let ciphertext = encrypt_to_vec(b"", b"k", &params);
        let recovered = decrypt_from_slice(&ciphertext, b"k");
        assert!(recovered.is_empty());
    }
}
