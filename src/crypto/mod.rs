//! Cryptographic primitives
//!
//! This module provides:
//! - SHA-256 / HASH160 hashing
//! - Account identities derived from secp256k1 public keys
//! - Recoverable ECDSA signing and signer recovery

pub mod hash;
pub mod identity;
pub mod keys;

pub use hash::{hash160, sha256, sha256_hex};
pub use identity::{Identity, IDENTITY_LEN};
pub use keys::{
    public_key_from_hex, recover_signer, sign_digest, signed_message_hash, KeyError, KeyPair,
    SIGNATURE_LEN,
};
