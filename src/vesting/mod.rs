//! Token vesting
//!
//! Seven allocation categories, each with a fixed cliff, duration and early
//! unlock (marketing picks its cliff and duration per beneficiary). The
//! ledger holds the vesting balance, reserves what schedules still owe and
//! lets beneficiaries claim whatever has vested.
//!
//! # Example
//!
//! ```ignore
//! use vesting_custody::context::Context;
//! use vesting_custody::vesting::{Category, VestingLedger};
//!
//! let mut vesting =
//!     VestingLedger::new(&mut registry, token.address, admin, Some(authority.identity()), config, salt)?;
//! token.execute_genesis(&admin, &mut vesting, supply, now, &mut events)?;
//!
//! let mut ctx = Context::new(now, &mut token, &mut events);
//! vesting.set_public_round_vest_for(&admin, &accounts, &amounts, &mut ctx)?;
//!
//! let claimable = vesting.vested_amount(&accounts[0], later);
//! ```

pub mod category;
pub mod ledger;
pub mod schedule;

pub use category::{Category, ParseCategoryError, SchedulePolicy, DAY_SECS, MONTH_SECS};
pub use ledger::{VestingError, VestingLedger, FOUNDER_COUNT};
pub use schedule::{mul_div, VestingSchedule};
