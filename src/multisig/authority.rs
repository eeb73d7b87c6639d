//! Threshold authority
//!
//! Every owner must sign. The threshold always equals the owner count and
//! never drops below [`MIN_OWNERS`]. Signatures are presented sorted by
//! strictly ascending signer identity, which also rules out duplicates.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::context::Context;
use crate::crypto::{recover_signer, Identity, KeyError, KeyPair};
use crate::error::{Error, ErrorKind};
use crate::events::{Event, EventSink};
use crate::registry::{Registry, RegistryError};

use super::operation::{execution_digest, CallOutput, Operation};

/// Smallest owner set an authority may have
pub const MIN_OWNERS: usize = 2;

/// Errors raised by the authority itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Zero address")]
    ZeroAddress,
    #[error("Threshold too low: {owners} owners, need at least {MIN_OWNERS}")]
    ThresholdTooLow { owners: usize },
    #[error("Owner {0} already exists")]
    OwnerExists(Identity),
    #[error("Owner {0} not found")]
    OwnerNotFound(Identity),
    #[error("Insufficient signatures: have {have}, need {need}")]
    InsufficientSigners { have: usize, need: usize },
    #[error("Signer {0} is not an owner")]
    UnknownSigner(Identity),
    #[error("Signer {0} is repeated or out of ascending order")]
    DuplicateSigner(Identity),
    #[error("Signature {0} does not recover to a public key")]
    WrongSignature(usize),
    #[error("Malformed signature {index}: {reason}")]
    InvalidSignatureFormat { index: usize, reason: String },
    #[error("Authority {0} cannot perform {1}")]
    UnsupportedOperation(Identity, &'static str),
    #[error("Authority holds no funds, value must be 0 (got {0})")]
    UnexpectedValue(u128),
    #[error("Grant from {0} is not valid here")]
    Unauthorized(Identity),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl MultisigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MultisigError::ThresholdTooLow { .. }
            | MultisigError::InsufficientSigners { .. }
            | MultisigError::UnknownSigner(_)
            | MultisigError::DuplicateSigner(_)
            | MultisigError::WrongSignature(_)
            | MultisigError::Unauthorized(_) => ErrorKind::Authorization,
            MultisigError::OwnerExists(_)
            | MultisigError::OwnerNotFound(_)
            | MultisigError::Registry(_) => ErrorKind::State,
            MultisigError::ZeroAddress
            | MultisigError::InvalidSignatureFormat { .. }
            | MultisigError::UnsupportedOperation(..)
            | MultisigError::UnexpectedValue(_) => ErrorKind::Validation,
        }
    }
}

/// Capability handed to the target of a successful execution.
///
/// Only [`MultiSigAuthority::execute`] constructs one, so holding a grant
/// proves the owners approved the call being dispatched.
#[derive(Debug)]
pub struct AuthorityGrant {
    authority: Identity,
}

impl AuthorityGrant {
    /// Authority that approved the call
    pub fn authority(&self) -> Identity {
        self.authority
    }
}

/// A component the authority can forward operations to
pub trait Callee {
    fn identity(&self) -> Identity;

    /// Perform `operation` on behalf of the authority named in `grant`.
    /// Must leave no trace when it fails.
    fn dispatch(
        &mut self,
        grant: &AuthorityGrant,
        value: u128,
        operation: &Operation,
        ctx: &mut Context<'_>,
    ) -> Result<CallOutput, Error>;
}

/// Where an execution is sent
pub enum Target<'a> {
    /// The authority itself (owner management)
    Authority,
    Callee(&'a mut dyn Callee),
}

/// M-of-N owner set that approves privileged operations
#[derive(Clone, Debug)]
pub struct MultiSigAuthority {
    identity: Identity,
    chain_id: u64,
    owners: BTreeSet<Identity>,
    threshold: usize,
    nonce: u64,
}

impl MultiSigAuthority {
    /// Create an authority from its initial owners.
    ///
    /// The identity is derived from the chain id, the sorted owner set and
    /// `salt`, and is reserved in `registry`. Reusing a salt for the same
    /// owners and chain fails with [`RegistryError::AlreadyDeployed`].
    pub fn new(
        registry: &mut Registry,
        owners: &[Identity],
        chain_id: u64,
        salt: u64,
    ) -> Result<Self, MultisigError> {
        let mut set = BTreeSet::new();
        for owner in owners {
            if owner.is_zero() {
                return Err(MultisigError::ZeroAddress);
            }
            if !set.insert(*owner) {
                return Err(MultisigError::OwnerExists(*owner));
            }
        }

        if set.len() < MIN_OWNERS {
            return Err(MultisigError::ThresholdTooLow { owners: set.len() });
        }

        let chain = chain_id.to_be_bytes();
        let mut parts: Vec<&[u8]> = vec![&chain[..]];
        parts.extend(set.iter().map(|o| o.as_bytes() as &[u8]));
        let identity = registry.deploy("authority", salt, &parts)?;

        log::info!(
            "Authority {} created: {}-of-{} on chain {}",
            identity,
            set.len(),
            set.len(),
            chain_id
        );

        Ok(Self {
            identity,
            chain_id,
            threshold: set.len(),
            owners: set,
            nonce: 0,
        })
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Executions performed so far; the next execution must sign this value
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Owners in ascending order, the order signatures must follow
    pub fn owners(&self) -> Vec<Identity> {
        self.owners.iter().copied().collect()
    }

    pub fn is_owner(&self, account: &Identity) -> bool {
        self.owners.contains(account)
    }

    /// Get description like "3-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.owners.len())
    }

    /// Digest the owners must sign for the next execution
    pub fn digest_for(&self, target: &Identity, value: u128, operation: &Operation) -> [u8; 32] {
        execution_digest(
            &self.identity,
            self.chain_id,
            target,
            value,
            operation,
            self.nonce,
        )
    }

    /// Verify owner signatures and forward `operation` to `target`.
    ///
    /// The nonce advances only when the forwarded call succeeds; a failure
    /// anywhere leaves the authority untouched and emits nothing.
    pub fn execute<S: AsRef<[u8]>>(
        &mut self,
        target: Target<'_>,
        value: u128,
        operation: Operation,
        signatures: &[S],
        ctx: &mut Context<'_>,
    ) -> Result<CallOutput, Error> {
        let target_id = match &target {
            Target::Authority => self.identity,
            Target::Callee(callee) => callee.identity(),
        };
        if target_id.is_zero() {
            return Err(MultisigError::ZeroAddress.into());
        }

        let digest = self.digest_for(&target_id, value, &operation);
        self.verify_signatures(&digest, signatures)?;

        let grant = AuthorityGrant {
            authority: self.identity,
        };
        let result = match target {
            Target::Authority => self.dispatch_own(&grant, value, &operation, ctx.events)?,
            Target::Callee(callee) => callee.dispatch(&grant, value, &operation, ctx)?,
        };

        let nonce = self.nonce;
        self.nonce += 1;

        log::info!(
            "Authority {} executed {} on {} (nonce {})",
            self.identity,
            operation.name(),
            target_id,
            nonce
        );

        ctx.events.emit(
            self.identity,
            Event::Executed {
                target: target_id,
                operation,
                result: result.clone(),
                nonce,
            },
        );

        Ok(result)
    }

    /// Add or remove an owner. Reachable only through an execution the
    /// authority approved itself.
    pub fn update_owner(
        &mut self,
        grant: &AuthorityGrant,
        owner: Identity,
        add: bool,
        events: &mut dyn EventSink,
    ) -> Result<CallOutput, MultisigError> {
        if grant.authority != self.identity {
            return Err(MultisigError::Unauthorized(grant.authority));
        }

        if add {
            if owner.is_zero() {
                return Err(MultisigError::ZeroAddress);
            }
            if self.owners.contains(&owner) {
                return Err(MultisigError::OwnerExists(owner));
            }
            self.owners.insert(owner);
        } else {
            if !self.owners.contains(&owner) {
                return Err(MultisigError::OwnerNotFound(owner));
            }
            let remaining = self.owners.len() - 1;
            if remaining < MIN_OWNERS {
                return Err(MultisigError::ThresholdTooLow { owners: remaining });
            }
            self.owners.remove(&owner);
        }
        self.threshold = self.owners.len();

        log::info!(
            "Owner {} {} authority {}, now {}",
            owner,
            if add { "added to" } else { "removed from" },
            self.identity,
            self.description()
        );

        events.emit(self.identity, Event::OwnerUpdated { owner, added: add });

        Ok(CallOutput::OwnerUpdated {
            owner,
            threshold: self.threshold,
        })
    }

    fn dispatch_own(
        &mut self,
        grant: &AuthorityGrant,
        value: u128,
        operation: &Operation,
        events: &mut dyn EventSink,
    ) -> Result<CallOutput, Error> {
        if value != 0 {
            return Err(MultisigError::UnexpectedValue(value).into());
        }

        match operation {
            Operation::UpdateOwner { owner, add } => {
                Ok(self.update_owner(grant, *owner, *add, events)?)
            }
            other => Err(MultisigError::UnsupportedOperation(self.identity, other.name()).into()),
        }
    }

    /// Check that `signatures` come from at least `threshold` distinct owners
    /// in strictly ascending identity order.
    fn verify_signatures<S: AsRef<[u8]>>(
        &self,
        digest: &[u8; 32],
        signatures: &[S],
    ) -> Result<(), MultisigError> {
        if signatures.len() < self.threshold {
            return Err(MultisigError::InsufficientSigners {
                have: signatures.len(),
                need: self.threshold,
            });
        }

        let mut previous: Option<Identity> = None;
        for (index, signature) in signatures.iter().enumerate() {
            let signer = match recover_signer(digest, signature.as_ref()) {
                Ok(signer) => signer,
                Err(KeyError::InvalidSignatureFormat(reason)) => {
                    return Err(MultisigError::InvalidSignatureFormat { index, reason })
                }
                Err(_) => return Err(MultisigError::WrongSignature(index)),
            };

            if !self.owners.contains(&signer) {
                log::debug!("signature {} recovered to non-owner {}", index, signer);
                return Err(MultisigError::UnknownSigner(signer));
            }

            if previous.map_or(false, |p| signer <= p) {
                return Err(MultisigError::DuplicateSigner(signer));
            }
            previous = Some(signer);
        }

        Ok(())
    }
}

/// Sign `digest` with every key and return the signatures ordered by
/// ascending signer identity, ready for [`MultiSigAuthority::execute`].
pub fn collect_signatures(digest: &[u8; 32], keys: &[KeyPair]) -> Result<Vec<Vec<u8>>, KeyError> {
    let mut signed = keys
        .iter()
        .map(|k| Ok((k.identity(), k.sign_digest(digest)?.to_vec())))
        .collect::<Result<Vec<_>, KeyError>>()?;
    signed.sort_by_key(|(identity, _)| *identity);
    Ok(signed.into_iter().map(|(_, sig)| sig).collect())
}

/// Reorder signatures produced independently by each owner
pub fn sort_signatures(
    digest: &[u8; 32],
    signatures: Vec<Vec<u8>>,
) -> Result<Vec<(Identity, Vec<u8>)>, KeyError> {
    let mut recovered = signatures
        .into_iter()
        .map(|sig| Ok((recover_signer(digest, &sig)?, sig)))
        .collect::<Result<Vec<_>, KeyError>>()?;
    recovered.sort_by_key(|(identity, _)| *identity);
    Ok(recovered)
}
