//! Fungible token used as the vesting ledger's asset collaborator
//!
//! The whole supply is minted to the creator. A one-shot genesis moves part
//! of it into the vesting ledger and starts vesting there.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::crypto::Identity;
use crate::error::Error;
use crate::events::{Event, EventSink};
use crate::vesting::VestingLedger;

use super::AssetLedger;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Invalid address: cannot transfer to self")]
    SelfTransfer,
    #[error("Invalid address: zero address")]
    ZeroAddress,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
    #[error("Invalid supply: must be greater than 0")]
    InvalidSupply,
    #[error("Caller {0} is not the token creator")]
    Unauthorized(Identity),
    #[error("Genesis already executed")]
    GenesisExecuted,
}

/// Token metadata (immutable after creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    /// Token name (e.g., "Orange Token")
    pub name: String,
    /// Token symbol (e.g., "OT")
    pub symbol: String,
    /// Decimal places (usually 18)
    pub decimals: u8,
    /// Total supply (fixed at creation)
    pub total_supply: u128,
    /// Creator, receives the whole supply
    pub creator: Identity,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: u128,
        creator: Identity,
    ) -> Result<Self, TokenError> {
        if name.is_empty() || name.len() > 50 {
            return Err(TokenError::InvalidName);
        }

        if symbol.is_empty() || symbol.len() > 10 {
            return Err(TokenError::InvalidSymbol);
        }

        if decimals > 18 {
            return Err(TokenError::InvalidDecimals);
        }

        if total_supply == 0 {
            return Err(TokenError::InvalidSupply);
        }

        if creator.is_zero() {
            return Err(TokenError::ZeroAddress);
        }

        Ok(Self {
            name,
            symbol,
            decimals,
            total_supply,
            creator,
        })
    }
}

/// Proof that a call into [`VestingLedger::start_vesting`] comes from a
/// token's genesis. Only [`Token::execute_genesis`] can create one.
#[derive(Debug)]
pub struct GenesisGrant {
    token: Identity,
}

impl GenesisGrant {
    /// Token that performed the genesis
    pub fn token(&self) -> Identity {
        self.token
    }
}

/// A fungible token with a one-time genesis distribution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Token identity
    pub address: Identity,
    /// Token metadata
    pub metadata: TokenMetadata,
    /// Balances: identity -> amount
    balances: HashMap<Identity, u128>,
    /// Whether genesis has run
    genesis_executed: bool,
}

impl Token {
    /// Create a new token with all supply allocated to creator
    pub fn new(metadata: TokenMetadata) -> Self {
        let address = Identity::derive(
            "token",
            &[metadata.creator.as_bytes(), metadata.symbol.as_bytes()],
        );
        let mut balances = HashMap::new();
        balances.insert(metadata.creator, metadata.total_supply);

        log::info!(
            "Token created: {} ({}) at {}",
            metadata.name,
            metadata.symbol,
            address
        );

        Self {
            address,
            metadata,
            balances,
            genesis_executed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.metadata.total_supply
    }

    pub fn is_genesis_executed(&self) -> bool {
        self.genesis_executed
    }

    /// Get all holders with balances
    pub fn holders(&self) -> Vec<(&Identity, &u128)> {
        self.balances.iter().filter(|(_, &b)| b > 0).collect()
    }

    fn move_balance(&mut self, from: &Identity, to: &Identity, amount: u128) -> Result<(), TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }

        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }

        if from == to {
            return Err(TokenError::SelfTransfer);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        *self.balances.entry(*from).or_insert(0) -= amount;
        *self.balances.entry(*to).or_insert(0) += amount;
        Ok(())
    }

    /// Fund `vesting` with `amount` from the creator and start its vesting clock.
    ///
    /// Runs once per token. Nothing changes if any step fails.
    pub fn execute_genesis(
        &mut self,
        caller: &Identity,
        vesting: &mut VestingLedger,
        amount: u128,
        now: u64,
        events: &mut dyn EventSink,
    ) -> Result<(), Error> {
        if *caller != self.metadata.creator {
            return Err(TokenError::Unauthorized(*caller).into());
        }

        if self.genesis_executed {
            return Err(TokenError::GenesisExecuted.into());
        }

        let grant = GenesisGrant {
            token: self.address,
        };
        vesting.check_start(&grant)?;

        // funds move before the clock starts; start cannot fail past check_start
        AssetLedger::transfer(self, caller, &vesting.identity(), amount, events)?;
        vesting.start_vesting(&grant, now, events)?;
        self.genesis_executed = true;

        log::info!(
            "Genesis executed: {} {} moved to vesting ledger {}",
            amount,
            self.metadata.symbol,
            vesting.identity()
        );

        Ok(())
    }
}

impl AssetLedger for Token {
    fn balance_of(&self, account: &Identity) -> u128 {
        *self.balances.get(account).unwrap_or(&0)
    }

    fn transfer(
        &mut self,
        from: &Identity,
        to: &Identity,
        amount: u128,
        events: &mut dyn EventSink,
    ) -> Result<(), TokenError> {
        self.move_balance(from, to, amount)?;
        events.emit(
            self.address,
            Event::Transfer {
                from: *from,
                to: *to,
                amount,
            },
        );
        Ok(())
    }

    fn decimals(&self) -> u8 {
        self.metadata.decimals
    }
}
