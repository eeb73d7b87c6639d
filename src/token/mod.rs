//! Fungible asset ledger
//!
//! The vesting ledger never stores balances itself. It reads and moves them
//! through [`AssetLedger`]; [`Token`] is the in-process implementation with
//! a one-shot genesis that funds the vesting ledger and starts its clock.
//!
//! # Example
//!
//! ```ignore
//! use vesting_custody::token::{Token, TokenMetadata};
//!
//! let metadata = TokenMetadata::new("Orange Token".into(), "OT".into(), 18, supply, creator)?;
//! let mut token = Token::new(metadata);
//!
//! token.execute_genesis(&creator, &mut vesting, supply, now, &mut events)?;
//! ```

pub mod token;

pub use token::{GenesisGrant, Token, TokenError, TokenMetadata};

use crate::crypto::Identity;
use crate::events::EventSink;

/// Balance bookkeeping the vesting ledger depends on
pub trait AssetLedger {
    /// Balance held by `account`
    fn balance_of(&self, account: &Identity) -> u128;

    /// Debit `from` and credit `to`; fails without side effects
    fn transfer(
        &mut self,
        from: &Identity,
        to: &Identity,
        amount: u128,
        events: &mut dyn EventSink,
    ) -> Result<(), TokenError>;

    /// Decimal places of the asset
    fn decimals(&self) -> u8;
}
