//! Hidden defect-rate generation and code minting.
//!
//! The seeded generator only ever decides the hidden probabilities, so
//! the instructor can reproduce them for the reveal. Everything a
//! player could exploit (inspection draws, join codes, rejoin tokens)
//! comes from a crypto-sourced RNG instead.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng, SeedableRng};

use crate::config::Difficulty;

/// Join codes skip characters that read ambiguously on a projector
/// (0/O, 1/I).
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const JOIN_CODE_LEN: usize = 6;

/// Defect rates are quantized to 4 decimal digits; inspection draws
/// compare against the same grid.
const P_GRID: f64 = 10_000.0;

/// Generate one hidden defect rate per batch.
///
/// Band `i % bands` feeds batch `i`, each value drawn uniformly within
/// the band and rounded to 4 decimals; the finished sequence is
/// shuffled with the same generator so band order gives nothing away.
/// Deterministic: identical (count, seed, difficulty) always reproduces
/// the identical sequence.
pub fn generate_device_ps(device_count: usize, seed: u64, difficulty: Difficulty) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ps = banded_ps(device_count, difficulty, &mut rng);
    ps.shuffle(&mut rng);
    ps
}

/// The pre-shuffle sequence: band-ordered draws.
fn banded_ps(device_count: usize, difficulty: Difficulty, rng: &mut StdRng) -> Vec<f64> {
    let ranges = difficulty.preset().p_ranges;
    (0..device_count)
        .map(|i| {
            let (lo, hi) = ranges[i % ranges.len()];
            let p: f64 = rng.gen_range(lo..=hi);
            (p * P_GRID).round() / P_GRID
        })
        .collect()
}

/// Draw the number of defects in `n` independent inspections of a batch
/// with defect rate `p`.
///
/// One crypto-sourced draw per unit inspected, compared against the
/// quantized rate, so the outcome is Binomial(n, p) on the same grid
/// the generator rounds to.
pub(crate) fn draw_defects<R: Rng + CryptoRng>(rng: &mut R, n: u32, p: f64) -> u32 {
    let threshold = (p * P_GRID).round() as u32;
    (0..n)
        .filter(|_| rng.gen_range(0..P_GRID as u32) < threshold)
        .count() as u32
}

/// Mint a 6-character public join code.
pub fn generate_join_code<R: Rng + CryptoRng>(rng: &mut R) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Mint a 32-hex-character secret rejoin token.
pub fn generate_rejoin_token<R: Rng + CryptoRng>(rng: &mut R) -> String {
    use std::fmt::Write;
    (0..16).fold(String::with_capacity(32), |mut token, _| {
        let _ = write!(token, "{:02x}", rng.gen::<u8>());
        token
    })
}
