//! ECDSA key management and signer recovery
//!
//! Owners sign execution digests with recoverable secp256k1 signatures
//! (64 compact bytes followed by a one-byte recovery id). The verifier
//! recovers the signing identity from the signature alone; whether that
//! identity is acceptable is decided by the caller.

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::sha256;
use super::identity::Identity;

/// Length of a serialized recoverable signature
pub const SIGNATURE_LEN: usize = 65;

/// Prefix mixed into every signed digest so that a signature over an
/// execution digest can never be mistaken for a signature over anything else.
const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Custody Signed Message:\n32";

/// Errors that can occur during key operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),
    #[error("Signature does not recover to a public key")]
    RecoveryFailed,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// The account identity controlled by this key
    pub fn identity(&self) -> Identity {
        Identity::from_public_key(&self.public_key)
    }

    /// Sign a 32-byte digest, producing a recoverable signature
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LEN], KeyError> {
        sign_digest(&self.secret_key, digest)
    }
}

/// Hash that is actually signed for a digest
pub fn signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    let mut data = Vec::with_capacity(SIGNED_MESSAGE_PREFIX.len() + digest.len());
    data.extend_from_slice(SIGNED_MESSAGE_PREFIX);
    data.extend_from_slice(digest);
    sha256(&data)
}

/// Sign a digest with a secret key
pub fn sign_digest(
    secret_key: &SecretKey,
    digest: &[u8; 32],
) -> Result<[u8; SIGNATURE_LEN], KeyError> {
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(&signed_message_hash(digest))?;
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&compact);
    out[64] = recovery_id.to_i32() as u8;
    Ok(out)
}

/// Recover the identity that produced `signature` over `digest`.
///
/// Accepts recovery ids 0..=3 and their 27..=30 offset form.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Result<Identity, KeyError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(KeyError::InvalidSignatureFormat(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LEN,
            signature.len()
        )));
    }

    let v = signature[64];
    let recovery = match v {
        0..=3 => v,
        27..=30 => v - 27,
        other => {
            return Err(KeyError::InvalidSignatureFormat(format!(
                "invalid recovery id {}",
                other
            )))
        }
    };
    let recovery_id = RecoveryId::from_i32(i32::from(recovery))
        .map_err(|_| KeyError::InvalidSignatureFormat(format!("invalid recovery id {}", v)))?;

    let sig = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|_| KeyError::RecoveryFailed)?;

    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(&signed_message_hash(digest))?;
    let public_key = secp
        .recover_ecdsa(&message, &sig)
        .map_err(|_| KeyError::RecoveryFailed)?;

    Ok(Identity::from_public_key(&public_key))
}

/// Parse a public key from hex string
pub fn public_key_from_hex(hex_key: &str) -> Result<PublicKey, KeyError> {
    let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPublicKey)?;
    PublicKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPublicKey)
}
