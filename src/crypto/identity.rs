//! Account identities
//!
//! An identity is the 20-byte HASH160 of a compressed secp256k1 public key.
//! Identities are totally ordered by their big-endian byte representation;
//! the multisig authority relies on this order to reject duplicate signers.

use std::fmt;
use std::str::FromStr;

use secp256k1::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::hash::hash160;
use super::keys::KeyError;

/// Length of an identity in bytes
pub const IDENTITY_LEN: usize = 20;

/// A public-key-derived account reference
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// The null identity
    pub const ZERO: Identity = Identity([0u8; IDENTITY_LEN]);

    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Identity of a secp256k1 public key (compressed encoding)
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(hash160(&public_key.serialize()))
    }

    /// Deterministic identity for a component that has no key of its own.
    ///
    /// `domain` separates component kinds so that e.g. a token and a vesting
    /// ledger built from the same inputs never collide.
    pub fn derive(domain: &str, parts: &[&[u8]]) -> Self {
        let mut data = Vec::with_capacity(domain.len() + 1 + parts.iter().map(|p| p.len()).sum::<usize>());
        data.extend_from_slice(domain.as_bytes());
        data.push(0x00);
        for part in parts {
            data.extend_from_slice(part);
        }
        Self(hash160(&data))
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// `0x`-prefixed lowercase hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without the `0x` prefix
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidIdentity(s.to_string()))?;
        let array: [u8; IDENTITY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidIdentity(s.to_string()))?;
        Ok(Self(array))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.to_hex())
    }
}

impl FromStr for Identity {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
