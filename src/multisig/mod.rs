//! Multi-signature authority
//!
//! An N-of-N owner set approves privileged operations off-line by signing an
//! execution digest. Any relayer can then submit the operation together with
//! the signatures sorted by ascending owner identity.
//!
//! # Example
//!
//! ```ignore
//! use vesting_custody::multisig::{collect_signatures, MultiSigAuthority, Operation, Target};
//! use vesting_custody::registry::Registry;
//!
//! let mut registry = Registry::new();
//! let mut authority = MultiSigAuthority::new(&mut registry, &owners, chain_id, salt)?;
//!
//! let op = Operation::UpdateOwner { owner: newcomer, add: true };
//! let digest = authority.digest_for(&authority.identity(), 0, &op);
//! let signatures = collect_signatures(&digest, &owner_keys)?;
//!
//! authority.execute(Target::Authority, 0, op, &signatures, &mut ctx)?;
//! ```

pub mod authority;
pub mod operation;

pub use authority::{
    collect_signatures, sort_signatures, AuthorityGrant, Callee, MultiSigAuthority, MultisigError,
    Target, MIN_OWNERS,
};
pub use operation::{execution_digest, CallOutput, Operation};
