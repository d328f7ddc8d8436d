//! Deterministic ordering of projects and JDK versions
//!
//! Orders are pseudo-random, to avoid systematic bias (such as caches always
//! being warm for the same versions), but fully reproducible from their seeds.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use std::ops::RangeInclusive;

/// Shuffle in place with a seeded generator
///
/// ChaCha8 is a named algorithm with a stable output stream, so an order
/// stays the same across machines and library upgrades.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Seed derived from a project's identity
pub fn identity_seed(identity: &str) -> u64 {
    let digest = Sha256::digest(identity.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// The order in which a project is built with each JDK version
pub fn jdk_order(identity: &str, versions: RangeInclusive<u8>) -> Vec<u8> {
    let mut order: Vec<u8> = versions.collect();
    shuffle_seeded(&mut order, identity_seed(identity));
    order
}
