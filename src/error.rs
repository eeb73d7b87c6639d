//! Crate-wide error type
//!
//! Each module keeps its own error enum; [`Error`] is what crosses module
//! boundaries, e.g. when the authority forwards a call into the vesting
//! ledger and the ledger rejects it.

use thiserror::Error;

use crate::crypto::KeyError;
use crate::multisig::MultisigError;
use crate::token::TokenError;
use crate::vesting::VestingError;

/// Coarse classification of a failure, stable for callers to branch on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Signature set or caller is not allowed to do this
    Authorization,
    /// Malformed input, rejected before any state is touched
    Validation,
    /// Not enough funds or allocation headroom
    Solvency,
    /// The call would be a no-op in the current state
    State,
    /// The asset ledger or key material failed underneath us
    Collaborator,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Crypto(#[from] KeyError),
    #[error(transparent)]
    Multisig(#[from] MultisigError),
    #[error(transparent)]
    Vesting(#[from] VestingError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Crypto(_) => ErrorKind::Collaborator,
            Error::Multisig(e) => e.kind(),
            Error::Vesting(e) => e.kind(),
            Error::Token(TokenError::InsufficientBalance { .. }) => ErrorKind::Solvency,
            Error::Token(TokenError::GenesisExecuted) => ErrorKind::State,
            Error::Token(TokenError::Unauthorized(_)) => ErrorKind::Authorization,
            Error::Token(_) => ErrorKind::Validation,
        }
    }
}
