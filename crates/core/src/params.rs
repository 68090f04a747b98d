//! Shared mixing constants for Rainbow and Rainstorm.
//!
//! Both algorithms draw their odd/even mixing primes from the same table; Rainstorm
//! additionally uses a rotation-amount table and two magic per-pass counters.

pub const P: u64 = 0xFFFF_FFFF_FFFF_FFC5;
pub const Q: u64 = 0xB6B4_F6C5_A348_9001;
pub const R: u64 = 0x15D9_F3C8_BA7A_56A5;
pub const S: u64 = 0x1487_D7C1_5CC5_2B61;
pub const T: u64 = 0x15FD_B8E4_AB1B_9E9D;
pub const U: u64 = 0x12DE_EC0D_54B7_3CB7;
pub const V: u64 = 0x278A_BA4F_A66E_FF35;
pub const W: u64 = 0x20D0_8032_1A6B_A9AF;

/// `K[0..8]` used by Rainstorm's `weakfunc`; identical to the P..W table above.
pub const K: [u64; 8] = [P, Q, R, S, T, U, V, W];

/// Per-lane rotation amounts used by Rainstorm's `weakfunc`.
pub const Z: [u32; 8] = [17, 19, 23, 29, 31, 37, 41, 53];

pub const CTR_LEFT: u64 = 0xefcd_ab89_6745_2301;
pub const CTR_RIGHT: u64 = 0x1032_5476_98ba_dcfe;

pub const RAINSTORM_ROUNDS: usize = 4;
pub const RAINSTORM_FINAL_ROUNDS: usize = 2;

/// Initialization offsets for Rainbow's 4-word state.
pub const RAINBOW_INIT: [u64; 4] = [1, 3, 5, 7];

/// Initialization offsets for Rainstorm's 16-word state.
pub const RAINSTORM_INIT: [u64; 16] = [
    1, 2, 2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43,
];
