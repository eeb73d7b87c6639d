//! Hashing utilities
//!
//! SHA-256 is used for execution digests and signed-message hashes;
//! HASH160 (RIPEMD-160 over SHA-256) condenses public keys into identities.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// RIPEMD160(SHA256(data)), the Bitcoin-style public key hash
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}
