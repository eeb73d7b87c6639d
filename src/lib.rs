//! Vesting Custody: threshold authority and token vesting in Rust
//!
//! This crate provides:
//! - An N-of-N multi-signature authority approving operations by recoverable
//!   secp256k1 signatures over a replay-protected execution digest
//! - A vesting ledger with seven allocation categories, cliffs, early
//!   unlocks and linear release
//! - Founder dilution when the authority allocates additional team vesting
//! - A reference token whose genesis funds the ledger and starts vesting
//! - A deployment registry that keeps component identities unique
//! - JSON configuration and an operator CLI
//!
//! # Example
//!
//! ```rust
//! use vesting_custody::config::{whole_tokens, VestingConfig};
//! use vesting_custody::context::Context;
//! use vesting_custody::events::EventLog;
//! use vesting_custody::token::{Token, TokenMetadata};
//! use vesting_custody::vesting::{Category, VestingLedger};
//! use vesting_custody::registry::Registry;
//! use vesting_custody::Identity;
//!
//! let admin = Identity::derive("admin", &[]);
//! let investor = Identity::derive("investor", &[]);
//!
//! let metadata = TokenMetadata::new(
//!     "Orange Token".to_string(),
//!     "OT".to_string(),
//!     18,
//!     whole_tokens(800_000_000),
//!     admin,
//! )
//! .unwrap();
//! let mut token = Token::new(metadata);
//! let mut registry = Registry::new();
//! let mut vesting =
//!     VestingLedger::new(&mut registry, token.address, admin, None, VestingConfig::default(), 0)
//!         .unwrap();
//! let mut events = EventLog::new();
//!
//! // Genesis funds the ledger and starts the shared clock
//! let genesis = 1_700_000_000;
//! token
//!     .execute_genesis(&admin, &mut vesting, whole_tokens(800_000_000), genesis, &mut events)
//!     .unwrap();
//!
//! let mut ctx = Context::new(genesis, &mut token, &mut events);
//! vesting
//!     .set_public_round_vest_for(&admin, &[investor], &[whole_tokens(1_000)], &mut ctx)
//!     .unwrap();
//!
//! // 10% unlocks immediately
//! assert_eq!(vesting.vested_amount(&investor, genesis), whole_tokens(100));
//! assert!(vesting.vesting_schedule(&investor, Category::PublicRound).is_some());
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod crypto;
pub mod error;
pub mod events;
pub mod multisig;
pub mod registry;
pub mod token;
pub mod vesting;

// Re-export commonly used types
pub use config::{Config, VestingConfig};
pub use context::Context;
pub use crypto::{Identity, KeyPair};
pub use error::{Error, ErrorKind};
pub use events::{Event, EventLog, EventSink};
pub use multisig::{AuthorityGrant, Callee, MultiSigAuthority, MultisigError, Operation, Target};
pub use registry::{Registry, RegistryError};
pub use token::{AssetLedger, Token, TokenMetadata};
pub use vesting::{Category, VestingError, VestingLedger, VestingSchedule};
