//! Deployment registry
//!
//! Authorities and vesting ledgers have no key of their own; their identity
//! is derived from their construction inputs plus a caller-chosen salt. The
//! registry records every identity handed out so that no two live components
//! can ever share one.

use std::collections::HashSet;
use thiserror::Error;

use crate::crypto::Identity;

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Salt {salt} already used: {identity} is deployed")]
    AlreadyDeployed { identity: Identity, salt: u64 },
}

/// Identities of every deployed component
#[derive(Clone, Debug, Default)]
pub struct Registry {
    deployed: HashSet<Identity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and reserve the identity of a new `domain` component.
    ///
    /// Fails when the same inputs and salt were already deployed; nothing
    /// is recorded in that case.
    pub fn deploy(
        &mut self,
        domain: &str,
        salt: u64,
        parts: &[&[u8]],
    ) -> Result<Identity, RegistryError> {
        let salt_bytes = salt.to_be_bytes();
        let mut inputs: Vec<&[u8]> = Vec::with_capacity(parts.len() + 1);
        inputs.push(&salt_bytes[..]);
        inputs.extend_from_slice(parts);

        let identity = Identity::derive(domain, &inputs);
        if !self.deployed.insert(identity) {
            return Err(RegistryError::AlreadyDeployed { identity, salt });
        }

        log::debug!("deployed {} {} (salt {})", domain, identity, salt);
        Ok(identity)
    }

    pub fn is_deployed(&self, identity: &Identity) -> bool {
        self.deployed.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.deployed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deployed.is_empty()
    }
}
