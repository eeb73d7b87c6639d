//! Vesting ledger
//!
//! Holds one schedule per (beneficiary, category) and reserves the asset
//! balance needed to honour them. The balance itself lives in the asset
//! ledger; every commitment re-reads it through the call [`Context`].

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::config::VestingConfig;
use crate::context::Context;
use crate::crypto::Identity;
use crate::error::{Error, ErrorKind};
use crate::events::{Event, EventSink};
use crate::multisig::{AuthorityGrant, CallOutput, Callee, Operation};
use crate::registry::{Registry, RegistryError};
use crate::token::{AssetLedger, GenesisGrant, TokenError};

use super::category::{Category, SchedulePolicy};
use super::schedule::{mul_div, VestingSchedule};

/// Number of founders in the main team
pub const FOUNDER_COUNT: usize = 3;

/// Vesting-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VestingError {
    #[error("Data lengths do not match: {accounts} accounts, {amounts} amounts")]
    LengthMismatch { accounts: usize, amounts: usize },
    #[error("Zero address")]
    ZeroAddress,
    #[error("Incorrect amount: must be greater than 0")]
    ZeroAmount,
    #[error("Invalid founder split: {0}")]
    InvalidFounderSplit(String),
    #[error("Duration must be > 0")]
    DurationMustBePositive,
    #[error("Insufficient tokens: balance {balance}, required {required}")]
    InsufficientBalance { balance: u128, required: u128 },
    #[error("Total amount exceeded for {category}: cap {cap}, requested {requested}")]
    CategoryCapExceeded {
        category: Category,
        cap: u128,
        requested: u128,
    },
    #[error("Cap exceeded: {0}")]
    CapExceeded(String),
    #[error("Not enough funds: withdrawable {available}, requested {requested}")]
    InsufficientWithdrawable { available: u128, requested: u128 },
    #[error("Vesting already started")]
    AlreadyStarted,
    #[error("Claim amount is 0")]
    ZeroClaimAmount,
    #[error("Caller {0} is not authorized")]
    Unauthorized(Identity),
    #[error("Vesting has not started")]
    NotStarted,
    #[error("Schedule already exists for {account} in {category}")]
    ScheduleExists { account: Identity, category: Category },
    #[error("Operation {0} is not supported by the vesting ledger")]
    UnsupportedOperation(&'static str),
    #[error("Vesting ledger does not accept value (got {0})")]
    UnexpectedValue(u128),
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TokenError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl VestingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VestingError::Unauthorized(_) => ErrorKind::Authorization,
            VestingError::InsufficientBalance { .. }
            | VestingError::CategoryCapExceeded { .. }
            | VestingError::CapExceeded(_)
            | VestingError::InsufficientWithdrawable { .. } => ErrorKind::Solvency,
            VestingError::AlreadyStarted
            | VestingError::ZeroClaimAmount
            | VestingError::NotStarted
            | VestingError::ScheduleExists { .. }
            | VestingError::Registry(_) => ErrorKind::State,
            VestingError::Transfer(_) => ErrorKind::Collaborator,
            VestingError::LengthMismatch { .. }
            | VestingError::ZeroAddress
            | VestingError::ZeroAmount
            | VestingError::InvalidFounderSplit(_)
            | VestingError::DurationMustBePositive
            | VestingError::UnsupportedOperation(_)
            | VestingError::UnexpectedValue(_)
            | VestingError::ArithmeticOverflow => ErrorKind::Validation,
        }
    }
}

/// Time-released custody of one token's balance
#[derive(Clone, Debug)]
pub struct VestingLedger {
    identity: Identity,
    token: Identity,
    admin: Identity,
    /// Authority allowed to allocate additional team vesting
    authority: Option<Identity>,
    config: VestingConfig,
    started_at: Option<u64>,
    schedules: HashMap<(Identity, Category), VestingSchedule>,
    /// Amount ever committed per category, for cap accounting
    category_totals: [u128; 7],
    /// Committed and not yet claimed, across all schedules
    vesting_schedules_total_amount: u128,
    founders: Vec<Identity>,
    founder_percent: HashMap<Identity, u8>,
    main_team_total_amount: u128,
    additional_team_total_amount: u128,
}

impl VestingLedger {
    /// Create a ledger for `token`, administered by `admin`.
    ///
    /// `authority`, when set, is the only multisig whose grants may allocate
    /// additional team vesting. The ledger identity, and with it the balance
    /// it holds at the asset ledger, is unique per `salt` and reserved in
    /// `registry`.
    pub fn new(
        registry: &mut Registry,
        token: Identity,
        admin: Identity,
        authority: Option<Identity>,
        config: VestingConfig,
        salt: u64,
    ) -> Result<Self, VestingError> {
        if token.is_zero() || admin.is_zero() || authority.map_or(false, |a| a.is_zero()) {
            return Err(VestingError::ZeroAddress);
        }
        if config.payout_interval_secs == 0 {
            return Err(VestingError::DurationMustBePositive);
        }

        let identity = registry.deploy("vesting", salt, &[admin.as_bytes(), token.as_bytes()])?;
        log::info!("Vesting ledger {} created for token {}", identity, token);

        Ok(Self {
            identity,
            token,
            admin,
            authority,
            config,
            started_at: None,
            schedules: HashMap::new(),
            category_totals: [0; 7],
            vesting_schedules_total_amount: 0,
            founders: Vec::new(),
            founder_percent: HashMap::new(),
            main_team_total_amount: 0,
            additional_team_total_amount: 0,
        })
    }

    /// Whether `grant` may start vesting now. Changes nothing.
    pub fn check_start(&self, grant: &GenesisGrant) -> Result<(), VestingError> {
        if grant.token() != self.token {
            return Err(VestingError::Unauthorized(grant.token()));
        }
        if self.started_at.is_some() {
            return Err(VestingError::AlreadyStarted);
        }
        Ok(())
    }

    /// Fix the shared vesting start. Only the wired token's genesis can call this.
    pub fn start_vesting(
        &mut self,
        grant: &GenesisGrant,
        now: u64,
        events: &mut dyn EventSink,
    ) -> Result<(), VestingError> {
        self.check_start(grant)?;

        self.started_at = Some(now);
        log::info!("Vesting started at {} on ledger {}", now, self.identity);
        events.emit(self.identity, Event::VestingStarted { start_at: now });
        Ok(())
    }

    pub fn set_public_round_vest_for(
        &mut self,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.set_fixed_vest_for(Category::PublicRound, caller, accounts, amounts, ctx)
    }

    pub fn set_seed_round_vest_for(
        &mut self,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.set_fixed_vest_for(Category::SeedRound, caller, accounts, amounts, ctx)
    }

    pub fn set_private_round_one_vest_for(
        &mut self,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.set_fixed_vest_for(Category::PrivateRoundOne, caller, accounts, amounts, ctx)
    }

    pub fn set_private_round_two_vest_for(
        &mut self,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.set_fixed_vest_for(Category::PrivateRoundTwo, caller, accounts, amounts, ctx)
    }

    pub fn set_foundation_vest_for(
        &mut self,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.set_fixed_vest_for(Category::Foundation, caller, accounts, amounts, ctx)
    }

    /// Single marketing schedule with its own cliff and duration, both in
    /// seconds relative to the vesting start
    pub fn set_marketing_vest_for(
        &mut self,
        caller: &Identity,
        account: Identity,
        amount: u128,
        cliff_secs: u64,
        duration_secs: u64,
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.ensure_admin(caller)?;
        let category = Category::Marketing;
        let sum = self.validate_entries(category, &[account], &[amount])?;
        if duration_secs == 0 {
            return Err(VestingError::DurationMustBePositive);
        }
        self.ensure_solvent(sum, &*ctx.assets)?;
        self.ensure_category_headroom(category, sum)?;

        let policy = Category::marketing_policy(cliff_secs, duration_secs);
        let start_at = self.commit(category, &[account], &[amount], policy, sum)?;

        log::info!(
            "Marketing vesting created for {}: {} over {}s (cliff {}s)",
            account,
            amount,
            duration_secs,
            cliff_secs
        );

        ctx.events.emit(
            self.identity,
            Event::VestingCreated {
                account,
                amount,
                start_at,
            },
        );
        Ok(())
    }

    /// Team allocation for exactly three founders. `percents` fixes each
    /// founder's share of the team and of any later dilution.
    pub fn set_main_team_vest_for(
        &mut self,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        percents: &[u8],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.ensure_admin(caller)?;
        let category = Category::Team;
        let sum = self.validate_entries(category, accounts, amounts)?;

        if !self.founders.is_empty() {
            return Err(VestingError::InvalidFounderSplit(
                "main team already set".to_string(),
            ));
        }
        if accounts.len() != FOUNDER_COUNT {
            return Err(VestingError::InvalidFounderSplit(format!(
                "founders should be {}, got {}",
                FOUNDER_COUNT,
                accounts.len()
            )));
        }
        if percents.len() != accounts.len() {
            return Err(VestingError::InvalidFounderSplit(format!(
                "{} percents for {} founders",
                percents.len(),
                accounts.len()
            )));
        }
        let percent_total: u32 = percents.iter().map(|p| u32::from(*p)).sum();
        if percent_total != 100 {
            return Err(VestingError::InvalidFounderSplit(format!(
                "total percent is {}, not 100",
                percent_total
            )));
        }

        self.ensure_solvent(sum, &*ctx.assets)?;
        self.ensure_category_headroom(category, sum)?;

        let team_cap = self.config.caps.cap(category);
        for (amount, percent) in amounts.iter().zip(percents) {
            let share = mul_div(team_cap, u128::from(*percent), 100)
                .ok_or(VestingError::ArithmeticOverflow)?;
            if *amount > share {
                return Err(VestingError::CategoryCapExceeded {
                    category,
                    cap: share,
                    requested: *amount,
                });
            }
        }

        let policy = Self::policy_for(category)?;
        let start_at = self.commit(category, accounts, amounts, policy, sum)?;

        self.founders = accounts.to_vec();
        self.founder_percent = accounts.iter().copied().zip(percents.iter().copied()).collect();
        self.main_team_total_amount = sum;

        log::info!(
            "Main team vesting created: {} founders, {} total, split {:?}",
            accounts.len(),
            sum,
            percents
        );

        ctx.events.emit(
            self.identity,
            Event::BatchVestingCreated {
                accounts: accounts.to_vec(),
                amounts: amounts.to_vec(),
                start_at,
            },
        );
        Ok(())
    }

    /// Vest team tokens for new members, diluting each founder by its
    /// percent of every new amount. Needs a grant from the configured
    /// authority. Returns the amount allocated.
    pub fn set_additional_team_vest_for(
        &mut self,
        grant: &AuthorityGrant,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<u128, VestingError> {
        if self.authority != Some(grant.authority()) {
            return Err(VestingError::Unauthorized(grant.authority()));
        }

        let category = Category::Team;
        let sum = self.validate_entries(category, accounts, amounts)?;

        if self.founders.len() != FOUNDER_COUNT {
            return Err(VestingError::InvalidFounderSplit(
                "main team not set".to_string(),
            ));
        }

        self.ensure_solvent(sum, &*ctx.assets)?;
        self.ensure_category_headroom(category, sum)?;

        let limit = mul_div(
            self.main_team_total_amount,
            u128::from(self.config.additional_team_max_percent),
            100,
        )
        .ok_or(VestingError::ArithmeticOverflow)?;
        let additional = self
            .additional_team_total_amount
            .checked_add(sum)
            .ok_or(VestingError::ArithmeticOverflow)?;
        if additional > limit {
            return Err(VestingError::CapExceeded(format!(
                "additional team total {} exceeds {}% of main team ({})",
                additional, self.config.additional_team_max_percent, limit
            )));
        }

        let diluted = self.dilute_founders(amounts)?;

        let policy = Self::policy_for(category)?;
        let start_at = self.commit(category, accounts, amounts, policy, sum)?;
        for (founder, total_amount) in diluted {
            if let Some(schedule) = self.schedules.get_mut(&(founder, category)) {
                schedule.total_amount = total_amount;
            }
        }
        self.additional_team_total_amount = additional;

        log::info!(
            "Additional team vesting created: {} accounts, {} total",
            accounts.len(),
            sum
        );

        ctx.events.emit(
            self.identity,
            Event::BatchVestingCreated {
                accounts: accounts.to_vec(),
                amounts: amounts.to_vec(),
                start_at,
            },
        );
        Ok(sum)
    }

    /// Claim everything vested for `caller` across all categories
    pub fn claim(&mut self, caller: &Identity, ctx: &mut Context<'_>) -> Result<u128, VestingError> {
        let interval = self.config.payout_interval_secs;
        let mut portions = Vec::new();
        let mut amount: u128 = 0;
        for category in Category::ALL {
            if let Some(schedule) = self.schedules.get(&(*caller, category)) {
                let releasable = schedule.releasable_at(ctx.now, interval);
                if releasable > 0 {
                    portions.push((category, releasable));
                    amount = amount
                        .checked_add(releasable)
                        .ok_or(VestingError::ArithmeticOverflow)?;
                }
            }
        }

        if amount == 0 {
            return Err(VestingError::ZeroClaimAmount);
        }

        let remaining = self
            .vesting_schedules_total_amount
            .checked_sub(amount)
            .ok_or(VestingError::ArithmeticOverflow)?;

        ctx.assets.transfer(&self.identity, caller, amount, ctx.events)?;

        for (category, releasable) in portions {
            if let Some(schedule) = self.schedules.get_mut(&(*caller, category)) {
                schedule.released += releasable;
            }
        }
        self.vesting_schedules_total_amount = remaining;

        log::info!("{} claimed {} from ledger {}", caller, amount, self.identity);

        ctx.events.emit(
            self.identity,
            Event::Claimed {
                account: *caller,
                amount,
            },
        );
        Ok(amount)
    }

    /// Move unreserved balance to the admin
    pub fn withdraw(
        &mut self,
        caller: &Identity,
        amount: u128,
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.ensure_admin(caller)?;
        if amount == 0 {
            return Err(VestingError::ZeroAmount);
        }

        let available = self.withdrawable_amount(&*ctx.assets);
        if amount > available {
            return Err(VestingError::InsufficientWithdrawable {
                available,
                requested: amount,
            });
        }

        ctx.assets.transfer(&self.identity, &self.admin, amount, ctx.events)?;

        log::info!("Withdrew {} from ledger {} to {}", amount, self.identity, self.admin);

        ctx.events.emit(
            self.identity,
            Event::Withdrawn {
                to: self.admin,
                amount,
            },
        );
        Ok(())
    }

    // Views

    /// Claimable amount for `account` across all categories
    pub fn vested_amount(&self, account: &Identity, now: u64) -> u128 {
        Category::ALL
            .iter()
            .map(|c| self.vested_amount_in(account, *c, now))
            .fold(0u128, |acc, v| acc.saturating_add(v))
    }

    /// Claimable amount for `account` in one category
    pub fn vested_amount_in(&self, account: &Identity, category: Category, now: u64) -> u128 {
        self.schedules
            .get(&(*account, category))
            .map(|s| s.releasable_at(now, self.config.payout_interval_secs))
            .unwrap_or(0)
    }

    /// Balance not reserved for any schedule
    pub fn withdrawable_amount(&self, assets: &dyn AssetLedger) -> u128 {
        assets
            .balance_of(&self.identity)
            .saturating_sub(self.vesting_schedules_total_amount)
    }

    pub fn vesting_schedule(&self, account: &Identity, category: Category) -> Option<&VestingSchedule> {
        self.schedules.get(&(*account, category))
    }

    /// Schedules held by `account`, in category order
    pub fn schedules_of(&self, account: &Identity) -> Vec<(Category, &VestingSchedule)> {
        Category::ALL
            .iter()
            .filter_map(|c| self.schedules.get(&(*account, *c)).map(|s| (*c, s)))
            .collect()
    }

    pub fn founder_percent(&self, account: &Identity) -> Option<u8> {
        self.founder_percent.get(account).copied()
    }

    pub fn founders(&self) -> &[Identity] {
        &self.founders
    }

    pub fn vesting_schedules_total_amount(&self) -> u128 {
        self.vesting_schedules_total_amount
    }

    /// Amount ever committed in `category`
    pub fn category_total(&self, category: Category) -> u128 {
        self.category_totals[category.index()]
    }

    pub fn team_total_amount(&self) -> u128 {
        self.category_total(Category::Team)
    }

    pub fn main_team_total_amount(&self) -> u128 {
        self.main_team_total_amount
    }

    pub fn additional_team_total_amount(&self) -> u128 {
        self.additional_team_total_amount
    }

    /// Genesis time, 0 before genesis
    pub fn start_at(&self) -> u64 {
        self.started_at.unwrap_or(0)
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn admin(&self) -> Identity {
        self.admin
    }

    pub fn token(&self) -> Identity {
        self.token
    }

    pub fn authority(&self) -> Option<Identity> {
        self.authority
    }

    pub fn config(&self) -> &VestingConfig {
        &self.config
    }

    // Internals

    fn set_fixed_vest_for(
        &mut self,
        category: Category,
        caller: &Identity,
        accounts: &[Identity],
        amounts: &[u128],
        ctx: &mut Context<'_>,
    ) -> Result<(), VestingError> {
        self.ensure_admin(caller)?;
        let sum = self.validate_entries(category, accounts, amounts)?;
        self.ensure_solvent(sum, &*ctx.assets)?;
        self.ensure_category_headroom(category, sum)?;

        let policy = Self::policy_for(category)?;
        let start_at = self.commit(category, accounts, amounts, policy, sum)?;

        log::info!(
            "{} vesting created: {} accounts, {} total",
            category,
            accounts.len(),
            sum
        );

        ctx.events.emit(
            self.identity,
            Event::BatchVestingCreated {
                accounts: accounts.to_vec(),
                amounts: amounts.to_vec(),
                start_at,
            },
        );
        Ok(())
    }

    fn policy_for(category: Category) -> Result<SchedulePolicy, VestingError> {
        category
            .fixed_policy()
            .ok_or(VestingError::DurationMustBePositive)
    }

    fn ensure_admin(&self, caller: &Identity) -> Result<(), VestingError> {
        if *caller != self.admin {
            return Err(VestingError::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Checks shared by every creation path. Returns the batch sum.
    fn validate_entries(
        &self,
        category: Category,
        accounts: &[Identity],
        amounts: &[u128],
    ) -> Result<u128, VestingError> {
        if self.started_at.is_none() {
            return Err(VestingError::NotStarted);
        }

        if accounts.len() != amounts.len() {
            return Err(VestingError::LengthMismatch {
                accounts: accounts.len(),
                amounts: amounts.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut sum: u128 = 0;
        for (account, amount) in accounts.iter().zip(amounts) {
            if account.is_zero() {
                return Err(VestingError::ZeroAddress);
            }
            if *amount == 0 {
                return Err(VestingError::ZeroAmount);
            }
            if self.schedules.contains_key(&(*account, category)) || !seen.insert(*account) {
                return Err(VestingError::ScheduleExists {
                    account: *account,
                    category,
                });
            }
            sum = sum
                .checked_add(*amount)
                .ok_or(VestingError::ArithmeticOverflow)?;
        }

        Ok(sum)
    }

    fn ensure_solvent(&self, sum: u128, assets: &dyn AssetLedger) -> Result<(), VestingError> {
        let required = self
            .vesting_schedules_total_amount
            .checked_add(sum)
            .ok_or(VestingError::ArithmeticOverflow)?;
        let balance = assets.balance_of(&self.identity);
        if balance < required {
            return Err(VestingError::InsufficientBalance { balance, required });
        }
        Ok(())
    }

    fn ensure_category_headroom(&self, category: Category, sum: u128) -> Result<(), VestingError> {
        let cap = self.config.caps.cap(category);
        let requested = self.category_totals[category.index()]
            .checked_add(sum)
            .ok_or(VestingError::ArithmeticOverflow)?;
        if requested > cap {
            return Err(VestingError::CategoryCapExceeded {
                category,
                cap,
                requested,
            });
        }
        Ok(())
    }

    /// New founder totals after diluting by every amount in `amounts`.
    /// Nothing is written.
    fn dilute_founders(&self, amounts: &[u128]) -> Result<Vec<(Identity, u128)>, VestingError> {
        let mut diluted = Vec::with_capacity(self.founders.len());
        for founder in &self.founders {
            let percent = u128::from(self.founder_percent(founder).unwrap_or(0));
            let schedule = self
                .schedules
                .get(&(*founder, Category::Team))
                .ok_or_else(|| VestingError::InvalidFounderSplit(format!("no schedule for founder {}", founder)))?;

            let mut reduction: u128 = 0;
            for amount in amounts {
                let part = mul_div(*amount, percent, 100).ok_or(VestingError::ArithmeticOverflow)?;
                reduction = reduction
                    .checked_add(part)
                    .ok_or(VestingError::ArithmeticOverflow)?;
            }

            let total_amount = schedule.total_amount.checked_sub(reduction).ok_or_else(|| {
                VestingError::CapExceeded(format!("founder {} cannot absorb {}", founder, reduction))
            })?;
            if total_amount < schedule.released {
                return Err(VestingError::CapExceeded(format!(
                    "founder {} already released {}, more than diluted total {}",
                    founder, schedule.released, total_amount
                )));
            }
            diluted.push((*founder, total_amount));
        }
        Ok(diluted)
    }

    /// Write one schedule per account and update the totals. All checks
    /// must have passed. Returns the shared start time.
    fn commit(
        &mut self,
        category: Category,
        accounts: &[Identity],
        amounts: &[u128],
        policy: SchedulePolicy,
        sum: u128,
    ) -> Result<u64, VestingError> {
        let start_at = self.started_at.ok_or(VestingError::NotStarted)?;
        let cliff_at = start_at
            .checked_add(policy.cliff_secs)
            .ok_or(VestingError::ArithmeticOverflow)?;
        let total = self
            .vesting_schedules_total_amount
            .checked_add(sum)
            .ok_or(VestingError::ArithmeticOverflow)?;
        let category_total = self.category_totals[category.index()]
            .checked_add(sum)
            .ok_or(VestingError::ArithmeticOverflow)?;

        for (account, amount) in accounts.iter().zip(amounts) {
            self.schedules.insert(
                (*account, category),
                VestingSchedule {
                    cliff_at,
                    start_at,
                    duration_secs: policy.duration_secs,
                    total_amount: *amount,
                    released: 0,
                    early_unlock_percent: policy.early_unlock_percent,
                },
            );
        }
        self.vesting_schedules_total_amount = total;
        self.category_totals[category.index()] = category_total;

        Ok(start_at)
    }
}

impl Callee for VestingLedger {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn dispatch(
        &mut self,
        grant: &AuthorityGrant,
        value: u128,
        operation: &Operation,
        ctx: &mut Context<'_>,
    ) -> Result<CallOutput, Error> {
        if value != 0 {
            return Err(VestingError::UnexpectedValue(value).into());
        }

        match operation {
            Operation::SetAdditionalTeamVest { accounts, amounts } => {
                let total = self.set_additional_team_vest_for(grant, accounts, amounts, ctx)?;
                Ok(CallOutput::AdditionalTeamVested {
                    accounts: accounts.len(),
                    total,
                })
            }
            other => Err(VestingError::UnsupportedOperation(other.name()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::whole_tokens;
    use crate::crypto::KeyPair;
    use crate::events::EventLog;
    use crate::multisig::{collect_signatures, MultiSigAuthority, MultisigError, Target};
    use crate::token::{Token, TokenMetadata};

    const GENESIS: u64 = 1_700_000_000;
    const MONTH: u64 = 2_592_000;

    fn admin() -> Identity {
        Identity::derive("admin", &[])
    }

    fn account(n: u8) -> Identity {
        Identity::derive("account", &[&[n]])
    }

    fn create_test_token() -> Token {
        let metadata = TokenMetadata::new(
            "Orange Token".to_string(),
            "OT".to_string(),
            18,
            whole_tokens(800_000_000),
            admin(),
        )
        .unwrap();
        Token::new(metadata)
    }

    /// Token and ledger after a genesis that moved the whole supply
    fn setup_with(config: VestingConfig, authority: Option<Identity>) -> (Token, VestingLedger, EventLog) {
        let mut token = create_test_token();
        let mut vesting =
            VestingLedger::new(&mut Registry::new(), token.address, admin(), authority, config, 0)
                .unwrap();
        let mut events = EventLog::new();
        token
            .execute_genesis(&admin(), &mut vesting, token.total_supply(), GENESIS, &mut events)
            .unwrap();
        (token, vesting, events)
    }

    fn setup() -> (Token, VestingLedger, EventLog) {
        setup_with(VestingConfig::default(), None)
    }

    fn create_authority() -> (MultiSigAuthority, Vec<KeyPair>) {
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let owners: Vec<Identity> = keys.iter().map(|k| k.identity()).collect();
        (MultiSigAuthority::new(&mut Registry::new(), &owners, 31337, 0).unwrap(), keys)
    }

    fn main_team(vesting: &mut VestingLedger, token: &mut Token, events: &mut EventLog) {
        let mut ctx = Context::new(GENESIS, token, events);
        vesting
            .set_main_team_vest_for(
                &admin(),
                &[account(1), account(2), account(3)],
                &[whole_tokens(100), whole_tokens(400), whole_tokens(500)],
                &[10, 40, 50],
                &mut ctx,
            )
            .unwrap();
    }

    fn additional_team(
        authority: &mut MultiSigAuthority,
        keys: &[KeyPair],
        vesting: &mut VestingLedger,
        token: &mut Token,
        events: &mut EventLog,
        accounts: Vec<Identity>,
        amounts: Vec<u128>,
    ) -> Result<CallOutput, Error> {
        let op = Operation::SetAdditionalTeamVest { accounts, amounts };
        let digest = authority.digest_for(&vesting.identity(), 0, &op);
        let sigs = collect_signatures(&digest, keys).unwrap();
        let mut ctx = Context::new(GENESIS, token, events);
        authority.execute(Target::Callee(vesting), 0, op, &sigs, &mut ctx)
    }

    #[test]
    fn test_fixed_category_schedules() {
        type Setter = fn(
            &mut VestingLedger,
            &Identity,
            &[Identity],
            &[u128],
            &mut Context<'_>,
        ) -> Result<(), VestingError>;

        let setters: [(Category, Setter); 5] = [
            (Category::PublicRound, VestingLedger::set_public_round_vest_for),
            (Category::SeedRound, VestingLedger::set_seed_round_vest_for),
            (Category::PrivateRoundOne, VestingLedger::set_private_round_one_vest_for),
            (Category::PrivateRoundTwo, VestingLedger::set_private_round_two_vest_for),
            (Category::Foundation, VestingLedger::set_foundation_vest_for),
        ];

        for (category, setter) in setters {
            let (mut token, mut vesting, mut events) = setup();
            let accounts = [account(1), account(2)];
            let amounts = [whole_tokens(100), whole_tokens(200)];

            assert_eq!(vesting.withdrawable_amount(&token), token.total_supply());

            let mut ctx = Context::new(GENESIS, &mut token, &mut events);
            setter(&mut vesting, &admin(), &accounts, &amounts, &mut ctx).unwrap();

            let policy = category.fixed_policy().unwrap();
            for (acc, amount) in accounts.iter().zip(amounts) {
                let s = vesting.vesting_schedule(acc, category).unwrap();
                assert_eq!(s.start_at, GENESIS);
                assert_eq!(s.cliff_at, GENESIS + policy.cliff_secs);
                assert_eq!(s.duration_secs, policy.duration_secs);
                assert_eq!(s.total_amount, amount);
                assert_eq!(s.released, 0);
                assert_eq!(s.early_unlock_percent, policy.early_unlock_percent);
                assert_eq!(
                    s.early_unlock_amount(),
                    amount * u128::from(policy.early_unlock_percent) / 100
                );
            }

            assert_eq!(vesting.vesting_schedules_total_amount(), whole_tokens(300));
            assert_eq!(vesting.category_total(category), whole_tokens(300));
            assert_eq!(
                vesting.withdrawable_amount(&token),
                token.total_supply() - whole_tokens(300)
            );
            assert_eq!(
                events.last(),
                Some(&Event::BatchVestingCreated {
                    accounts: accounts.to_vec(),
                    amounts: amounts.to_vec(),
                    start_at: GENESIS
                })
            );
        }
    }

    #[test]
    fn test_creation_rejections() {
        let (mut token, mut vesting, mut events) = setup();
        let before = events.len();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        assert_eq!(
            vesting.set_public_round_vest_for(&account(9), &[account(1)], &[1], &mut ctx),
            Err(VestingError::Unauthorized(account(9)))
        );
        assert_eq!(
            vesting.set_public_round_vest_for(&admin(), &[account(1), account(2)], &[1], &mut ctx),
            Err(VestingError::LengthMismatch {
                accounts: 2,
                amounts: 1
            })
        );
        assert_eq!(
            vesting.set_public_round_vest_for(&admin(), &[Identity::ZERO, account(2)], &[1, 1], &mut ctx),
            Err(VestingError::ZeroAddress)
        );
        assert_eq!(
            vesting.set_public_round_vest_for(&admin(), &[account(1), account(2)], &[0, 1], &mut ctx),
            Err(VestingError::ZeroAmount)
        );
        assert!(matches!(
            vesting.set_public_round_vest_for(
                &admin(),
                &[account(1), account(2)],
                &[whole_tokens(80_000_000), whole_tokens(1)],
                &mut ctx
            ),
            Err(VestingError::CategoryCapExceeded {
                category: Category::PublicRound,
                ..
            })
        ));
        // over both balance and cap: solvency is reported
        assert!(matches!(
            vesting.set_public_round_vest_for(
                &admin(),
                &[account(1), account(2)],
                &[whole_tokens(900_000_000), whole_tokens(100)],
                &mut ctx
            ),
            Err(VestingError::InsufficientBalance { .. })
        ));

        assert_eq!(vesting.vesting_schedules_total_amount(), 0);
        assert!(vesting.vesting_schedule(&account(2), Category::PublicRound).is_none());
        assert_eq!(events.len(), before);
    }

    #[test]
    fn test_creation_before_genesis() {
        let mut token = create_test_token();
        let mut vesting = VestingLedger::new(
            &mut Registry::new(),
            token.address,
            admin(),
            None,
            VestingConfig::default(),
            0,
        )
        .unwrap();
        let mut events = EventLog::new();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        assert_eq!(vesting.start_at(), 0);
        assert!(!vesting.is_started());
        assert_eq!(
            vesting.set_seed_round_vest_for(&admin(), &[account(1)], &[1], &mut ctx),
            Err(VestingError::NotStarted)
        );
    }

    #[test]
    fn test_second_genesis_is_rejected() {
        let (_, mut vesting, mut events) = setup();

        // a token with the same creator and symbol shares the address
        let mut twin = create_test_token();
        assert_eq!(twin.address, vesting.token());
        let result = twin.execute_genesis(&admin(), &mut vesting, 1, GENESIS + 5, &mut events);

        assert!(matches!(result, Err(Error::Vesting(VestingError::AlreadyStarted))));
        assert_eq!(vesting.start_at(), GENESIS);
    }

    #[test]
    fn test_schedules_are_never_overwritten() {
        let (mut token, mut vesting, mut events) = setup();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        vesting
            .set_foundation_vest_for(&admin(), &[account(1)], &[5], &mut ctx)
            .unwrap();
        assert_eq!(
            vesting.set_foundation_vest_for(&admin(), &[account(1)], &[7], &mut ctx),
            Err(VestingError::ScheduleExists {
                account: account(1),
                category: Category::Foundation
            })
        );
        assert_eq!(
            vesting.set_foundation_vest_for(&admin(), &[account(2), account(2)], &[1, 1], &mut ctx),
            Err(VestingError::ScheduleExists {
                account: account(2),
                category: Category::Foundation
            })
        );

        // other categories are independent
        vesting
            .set_public_round_vest_for(&admin(), &[account(1)], &[7], &mut ctx)
            .unwrap();
        assert_eq!(vesting.vesting_schedule(&account(1), Category::Foundation).unwrap().total_amount, 5);
        assert_eq!(vesting.vesting_schedules_total_amount(), 12);
    }

    #[test]
    fn test_cap_is_cumulative() {
        let (mut token, mut vesting, mut events) = setup();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        vesting
            .set_seed_round_vest_for(&admin(), &[account(1)], &[whole_tokens(60_000_000)], &mut ctx)
            .unwrap();
        let second = vesting.set_seed_round_vest_for(
            &admin(),
            &[account(2), account(3)],
            &[whole_tokens(10_000_000), whole_tokens(10_000_001)],
            &mut ctx,
        );

        assert!(matches!(second, Err(VestingError::CategoryCapExceeded { .. })));
        assert!(vesting.vesting_schedule(&account(2), Category::SeedRound).is_none());
        assert_eq!(vesting.category_total(Category::SeedRound), whole_tokens(60_000_000));
        assert_eq!(vesting.vesting_schedules_total_amount(), whole_tokens(60_000_000));
    }

    #[test]
    fn test_insufficient_balance_after_withdraw() {
        let (mut token, mut vesting, mut events) = setup();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        vesting
            .withdraw(&admin(), whole_tokens(799_999_000), &mut ctx)
            .unwrap();
        assert_eq!(
            vesting.set_public_round_vest_for(&admin(), &[account(1)], &[whole_tokens(1_001)], &mut ctx),
            Err(VestingError::InsufficientBalance {
                balance: whole_tokens(1_000),
                required: whole_tokens(1_001)
            })
        );
    }

    #[test]
    fn test_marketing_vest_and_claim() {
        let (mut token, mut vesting, mut events) = setup();
        let amount = whole_tokens(100);
        let duration = 25_920_000;

        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        vesting
            .set_marketing_vest_for(&admin(), account(1), amount, 0, duration, &mut ctx)
            .unwrap();
        assert_eq!(
            events.last(),
            Some(&Event::VestingCreated {
                account: account(1),
                amount,
                start_at: GENESIS
            })
        );

        let schedule = vesting.vesting_schedule(&account(1), Category::Marketing).unwrap();
        assert_eq!(schedule.cliff_at, GENESIS);
        assert_eq!(schedule.duration_secs, duration);
        assert_eq!(schedule.early_unlock_percent, 2);

        let now = GENESIS + 7_776_000;
        assert_eq!(vesting.vested_amount(&account(1), now), whole_tokens(32));

        let mut ctx = Context::new(now, &mut token, &mut events);
        let claimed = vesting.claim(&account(1), &mut ctx).unwrap();

        assert_eq!(claimed, whole_tokens(32));
        assert_eq!(token.balance_of(&account(1)), whole_tokens(32));
        assert_eq!(vesting.vested_amount(&account(1), now), 0);
        assert_eq!(vesting.vesting_schedules_total_amount(), whole_tokens(68));
        assert_eq!(
            vesting.vesting_schedule(&account(1), Category::Marketing).unwrap().released,
            whole_tokens(32)
        );
        assert_eq!(
            events.last(),
            Some(&Event::Claimed {
                account: account(1),
                amount: whole_tokens(32)
            })
        );

        let mut ctx = Context::new(now, &mut token, &mut events);
        assert_eq!(
            vesting.claim(&account(1), &mut ctx),
            Err(VestingError::ZeroClaimAmount)
        );
    }

    #[test]
    fn test_marketing_rejections() {
        let (mut token, mut vesting, mut events) = setup();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        assert_eq!(
            vesting.set_marketing_vest_for(&admin(), account(1), whole_tokens(1), 0, 0, &mut ctx),
            Err(VestingError::DurationMustBePositive)
        );
        assert!(matches!(
            vesting.set_marketing_vest_for(
                &admin(),
                account(1),
                whole_tokens(160_000_000) + 1,
                0,
                MONTH,
                &mut ctx
            ),
            Err(VestingError::CategoryCapExceeded {
                category: Category::Marketing,
                ..
            })
        ));
        assert_eq!(
            vesting.set_marketing_vest_for(&admin(), Identity::ZERO, 1, 0, MONTH, &mut ctx),
            Err(VestingError::ZeroAddress)
        );
        assert_eq!(
            vesting.set_marketing_vest_for(&admin(), account(1), 0, 0, MONTH, &mut ctx),
            Err(VestingError::ZeroAmount)
        );
    }

    #[test]
    fn test_nothing_vests_before_cliff() {
        let (mut token, mut vesting, mut events) = setup();
        let amount = whole_tokens(960);
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        vesting
            .set_seed_round_vest_for(&admin(), &[account(1)], &[amount], &mut ctx)
            .unwrap();

        assert_eq!(vesting.vested_amount(&account(1), GENESIS + 359 * 86_400), 0);
        let mut ctx = Context::new(GENESIS + 100, &mut token, &mut events);
        assert_eq!(
            vesting.claim(&account(1), &mut ctx),
            Err(VestingError::ZeroClaimAmount)
        );

        // at the cliff 360 of 960 days have accrued
        assert_eq!(
            vesting.vested_amount(&account(1), GENESIS + 360 * 86_400),
            whole_tokens(360)
        );
    }

    #[test]
    fn test_full_claim_and_monotonicity() {
        let (mut token, mut vesting, mut events) = setup();
        let amount = whole_tokens(1_000);
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        vesting
            .set_public_round_vest_for(&admin(), &[account(1)], &[amount], &mut ctx)
            .unwrap();

        let duration = Category::PublicRound.fixed_policy().unwrap().duration_secs;
        let mut last = 0;
        for step in 0..=20 {
            let v = vesting.vested_amount(&account(1), GENESIS + duration * step / 20);
            assert!(v >= last);
            last = v;
        }
        assert_eq!(last, amount);

        let mut ctx = Context::new(GENESIS + duration, &mut token, &mut events);
        assert_eq!(vesting.claim(&account(1), &mut ctx), Ok(amount));
        assert!(vesting
            .vesting_schedule(&account(1), Category::PublicRound)
            .unwrap()
            .is_fully_released());
        assert_eq!(vesting.vested_amount(&account(1), GENESIS + 10 * duration), 0);
        assert_eq!(vesting.vesting_schedules_total_amount(), 0);
    }

    #[test]
    fn test_claim_spans_categories() {
        let (mut token, mut vesting, mut events) = setup();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        vesting
            .set_public_round_vest_for(&admin(), &[account(1)], &[1_000], &mut ctx)
            .unwrap();
        vesting
            .set_foundation_vest_for(&admin(), &[account(1)], &[2_000], &mut ctx)
            .unwrap();
        vesting
            .set_seed_round_vest_for(&admin(), &[account(1)], &[4_000], &mut ctx)
            .unwrap();

        // only the immediate unlocks: 10% and 5%
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        assert_eq!(vesting.claim(&account(1), &mut ctx), Ok(100 + 100));
        assert_eq!(vesting.vesting_schedule(&account(1), Category::PublicRound).unwrap().released, 100);
        assert_eq!(vesting.vesting_schedule(&account(1), Category::Foundation).unwrap().released, 100);
        assert_eq!(vesting.vesting_schedule(&account(1), Category::SeedRound).unwrap().released, 0);
        assert_eq!(vesting.vested_amount_in(&account(1), Category::PublicRound, GENESIS), 0);
        assert_eq!(vesting.schedules_of(&account(1)).len(), 3);
    }

    #[test]
    fn test_payout_interval() {
        let mut config = VestingConfig::default();
        config.payout_interval_secs = MONTH;
        let (mut token, mut vesting, mut events) = setup_with(config, None);
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        vesting
            .set_marketing_vest_for(&admin(), account(1), 10_000, 0, 10 * MONTH, &mut ctx)
            .unwrap();

        // 2% at once, then 10% per whole month
        assert_eq!(vesting.vested_amount(&account(1), GENESIS + MONTH - 1), 200);
        assert_eq!(vesting.vested_amount(&account(1), GENESIS + 3 * MONTH + 2 * 86_400), 3_200);
        assert_eq!(vesting.vested_amount(&account(1), GENESIS + 10 * MONTH), 10_000);
    }

    #[test]
    fn test_withdraw() {
        let (mut token, mut vesting, mut events) = setup();
        let supply = token.total_supply();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        vesting
            .set_public_round_vest_for(&admin(), &[account(1)], &[whole_tokens(100)], &mut ctx)
            .unwrap();
        vesting.withdraw(&admin(), whole_tokens(100), &mut ctx).unwrap();

        assert_eq!(token.balance_of(&admin()), whole_tokens(100));
        assert_eq!(vesting.withdrawable_amount(&token), supply - whole_tokens(200));
        let emitted = events.records();
        assert_eq!(
            emitted[emitted.len() - 2].event,
            Event::Transfer {
                from: vesting.identity(),
                to: admin(),
                amount: whole_tokens(100)
            }
        );
        assert_eq!(
            events.last(),
            Some(&Event::Withdrawn {
                to: admin(),
                amount: whole_tokens(100)
            })
        );

        let available = vesting.withdrawable_amount(&token);
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        assert_eq!(
            vesting.withdraw(&admin(), available + 1, &mut ctx),
            Err(VestingError::InsufficientWithdrawable {
                available,
                requested: available + 1
            })
        );
        assert_eq!(
            vesting.withdraw(&account(1), 1, &mut ctx),
            Err(VestingError::Unauthorized(account(1)))
        );
    }

    #[test]
    fn test_main_team() {
        let (mut token, mut vesting, mut events) = setup();
        main_team(&mut vesting, &mut token, &mut events);

        assert_eq!(vesting.founders(), &[account(1), account(2), account(3)]);
        assert_eq!(vesting.founder_percent(&account(2)), Some(40));
        assert_eq!(vesting.founder_percent(&account(4)), None);
        assert_eq!(vesting.main_team_total_amount(), whole_tokens(1_000));
        assert_eq!(vesting.team_total_amount(), whole_tokens(1_000));

        let team = Category::Team.fixed_policy().unwrap();
        let s = vesting.vesting_schedule(&account(3), Category::Team).unwrap();
        assert_eq!(s.cliff_at, GENESIS + team.cliff_secs);
        assert_eq!(s.total_amount, whole_tokens(500));
        assert_eq!(s.early_unlock_amount(), 0);

        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        assert!(matches!(
            vesting.set_main_team_vest_for(&admin(), &[account(5), account(6), account(7)], &[1, 1, 1], &[10, 40, 50], &mut ctx),
            Err(VestingError::InvalidFounderSplit(_))
        ));
    }

    #[test]
    fn test_main_team_rejections() {
        let (mut token, mut vesting, mut events) = setup();
        let founders = [account(1), account(2), account(3)];
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);

        assert!(matches!(
            vesting.set_main_team_vest_for(&admin(), &founders[..2], &[1, 1], &[50, 50], &mut ctx),
            Err(VestingError::InvalidFounderSplit(_))
        ));
        assert!(matches!(
            vesting.set_main_team_vest_for(&admin(), &founders, &[1, 1, 1], &[10, 40, 40], &mut ctx),
            Err(VestingError::InvalidFounderSplit(_))
        ));
        assert!(matches!(
            vesting.set_main_team_vest_for(&admin(), &founders, &[1, 1, 1], &[10, 90], &mut ctx),
            Err(VestingError::InvalidFounderSplit(_))
        ));
        assert_eq!(
            vesting.set_main_team_vest_for(&admin(), &founders, &[1, 1], &[10, 40, 50], &mut ctx),
            Err(VestingError::LengthMismatch {
                accounts: 3,
                amounts: 2
            })
        );
        // founder 1 may hold at most 10% of the team cap
        assert!(matches!(
            vesting.set_main_team_vest_for(
                &admin(),
                &founders,
                &[whole_tokens(80_000_000), whole_tokens(400), whole_tokens(500)],
                &[10, 40, 50],
                &mut ctx
            ),
            Err(VestingError::CategoryCapExceeded {
                category: Category::Team,
                ..
            })
        ));
        assert!(vesting.founders().is_empty());
        assert_eq!(vesting.team_total_amount(), 0);
    }

    #[test]
    fn test_additional_team_dilutes_founders() {
        let (mut authority, keys) = create_authority();
        let (mut token, mut vesting, mut events) =
            setup_with(VestingConfig::default(), Some(authority.identity()));
        main_team(&mut vesting, &mut token, &mut events);

        let total_before = vesting.vesting_schedules_total_amount();
        let withdrawable_before = vesting.withdrawable_amount(&token);
        let result = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![account(4)],
            vec![whole_tokens(50)],
        )
        .unwrap();

        assert_eq!(
            result,
            CallOutput::AdditionalTeamVested {
                accounts: 1,
                total: whole_tokens(50)
            }
        );
        for (founder, expected) in [(1, 95), (2, 380), (3, 475)] {
            assert_eq!(
                vesting.vesting_schedule(&account(founder), Category::Team).unwrap().total_amount,
                whole_tokens(expected)
            );
        }
        assert_eq!(
            vesting.vesting_schedule(&account(4), Category::Team).unwrap().total_amount,
            whole_tokens(50)
        );
        assert_eq!(vesting.vesting_schedules_total_amount(), total_before + whole_tokens(50));
        assert_eq!(vesting.withdrawable_amount(&token), withdrawable_before - whole_tokens(50));
        assert_eq!(vesting.team_total_amount(), whole_tokens(1_050));
        assert_eq!(vesting.additional_team_total_amount(), whole_tokens(50));
        assert_eq!(authority.nonce(), 1);

        let from_vesting = events.events_from(&vesting.identity());
        assert!(matches!(
            from_vesting.last(),
            Some(Event::BatchVestingCreated { .. })
        ));
        assert!(matches!(events.last(), Some(Event::Executed { nonce: 0, .. })));
    }

    #[test]
    fn test_additional_team_limits() {
        let (mut authority, keys) = create_authority();
        let (mut token, mut vesting, mut events) =
            setup_with(VestingConfig::default(), Some(authority.identity()));

        // founders first
        let early = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![account(4)],
            vec![1],
        );
        assert!(matches!(
            early,
            Err(Error::Vesting(VestingError::InvalidFounderSplit(_)))
        ));

        main_team(&mut vesting, &mut token, &mut events);

        let over_half = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![account(4)],
            vec![whole_tokens(510)],
        );
        assert!(matches!(
            over_half,
            Err(Error::Vesting(VestingError::CapExceeded(_)))
        ));

        let zero = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![Identity::ZERO],
            vec![whole_tokens(50)],
        );
        assert!(matches!(zero, Err(Error::Vesting(VestingError::ZeroAddress))));

        let mismatch = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![account(4)],
            vec![whole_tokens(50), whole_tokens(50)],
        );
        assert!(matches!(
            mismatch,
            Err(Error::Vesting(VestingError::LengthMismatch { .. }))
        ));

        assert_eq!(authority.nonce(), 0);
        assert_eq!(vesting.additional_team_total_amount(), 0);
        assert_eq!(
            vesting.vesting_schedule(&account(1), Category::Team).unwrap().total_amount,
            whole_tokens(100)
        );
    }

    #[test]
    fn test_dilution_cannot_undercut_released() {
        let (mut authority, keys) = create_authority();
        let (mut token, mut vesting, mut events) =
            setup_with(VestingConfig::default(), Some(authority.identity()));
        main_team(&mut vesting, &mut token, &mut events);

        let done = GENESIS + 100 * MONTH;
        let mut ctx = Context::new(done, &mut token, &mut events);
        vesting.claim(&account(1), &mut ctx).unwrap();

        let result = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![account(4)],
            vec![whole_tokens(50)],
        );
        assert!(matches!(
            result,
            Err(Error::Vesting(VestingError::CapExceeded(_)))
        ));
        assert!(vesting.vesting_schedule(&account(4), Category::Team).is_none());
    }

    #[test]
    fn test_additional_team_needs_configured_authority() {
        let (mut authority, keys) = create_authority();
        let (mut token, mut vesting, mut events) = setup();
        main_team(&mut vesting, &mut token, &mut events);

        let result = additional_team(
            &mut authority,
            &keys,
            &mut vesting,
            &mut token,
            &mut events,
            vec![account(4)],
            vec![whole_tokens(50)],
        );
        assert_eq!(
            result,
            Err(Error::Vesting(VestingError::Unauthorized(authority.identity())))
        );
    }

    #[test]
    fn test_dispatch_rejects_other_operations() {
        let (mut authority, keys) = create_authority();
        let (mut token, mut vesting, mut events) =
            setup_with(VestingConfig::default(), Some(authority.identity()));

        let op = Operation::UpdateOwner {
            owner: account(4),
            add: true,
        };
        let digest = authority.digest_for(&vesting.identity(), 0, &op);
        let sigs = collect_signatures(&digest, &keys).unwrap();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        assert_eq!(
            authority.execute(Target::Callee(&mut vesting), 0, op, &sigs, &mut ctx),
            Err(Error::Vesting(VestingError::UnsupportedOperation("update_owner")))
        );

        let op = Operation::SetAdditionalTeamVest {
            accounts: vec![],
            amounts: vec![],
        };
        let digest = authority.digest_for(&vesting.identity(), 7, &op);
        let sigs = collect_signatures(&digest, &keys).unwrap();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        assert_eq!(
            authority.execute(Target::Callee(&mut vesting), 7, op, &sigs, &mut ctx),
            Err(Error::Vesting(VestingError::UnexpectedValue(7)))
        );

        // signatures over a different target do not authorize this one
        let op = Operation::SetAdditionalTeamVest {
            accounts: vec![account(4)],
            amounts: vec![1],
        };
        let digest = authority.digest_for(&authority.identity(), 0, &op);
        let sigs = collect_signatures(&digest, &keys).unwrap();
        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        assert!(matches!(
            authority.execute(Target::Callee(&mut vesting), 0, op, &sigs, &mut ctx),
            Err(Error::Multisig(MultisigError::UnknownSigner(_)))
        ));
        assert_eq!(authority.nonce(), 0);
    }

    #[test]
    fn test_constructor_validation() {
        let token = Identity::derive("token", &[]);
        let mut registry = Registry::new();
        assert!(matches!(
            VestingLedger::new(&mut registry, Identity::ZERO, admin(), None, VestingConfig::default(), 0),
            Err(VestingError::ZeroAddress)
        ));
        assert!(matches!(
            VestingLedger::new(&mut registry, token, admin(), Some(Identity::ZERO), VestingConfig::default(), 0),
            Err(VestingError::ZeroAddress)
        ));

        let mut config = VestingConfig::default();
        config.payout_interval_secs = 0;
        assert!(matches!(
            VestingLedger::new(&mut registry, token, admin(), None, config, 0),
            Err(VestingError::DurationMustBePositive)
        ));
        assert!(registry.is_empty());

        let vesting =
            VestingLedger::new(&mut registry, token, admin(), None, VestingConfig::default(), 0)
                .unwrap();
        assert_eq!(vesting.admin(), admin());
        assert_eq!(vesting.authority(), None);
        assert_eq!(vesting.config().additional_team_max_percent, 50);
        assert!(registry.is_deployed(&vesting.identity()));

        assert!(matches!(
            VestingLedger::new(&mut registry, token, admin(), None, VestingConfig::default(), 0),
            Err(VestingError::Registry(RegistryError::AlreadyDeployed { salt: 0, .. }))
        ));
    }

    #[test]
    fn test_twin_ledger_cannot_touch_reserved_funds() {
        let mut registry = Registry::new();
        let mut token = create_test_token();
        let mut funded = VestingLedger::new(
            &mut registry,
            token.address,
            admin(),
            None,
            VestingConfig::default(),
            0,
        )
        .unwrap();
        let mut twin = VestingLedger::new(
            &mut registry,
            token.address,
            admin(),
            None,
            VestingConfig::default(),
            1,
        )
        .unwrap();
        assert_ne!(funded.identity(), twin.identity());

        let mut events = EventLog::new();
        let supply = token.total_supply();
        token
            .execute_genesis(&admin(), &mut funded, supply, GENESIS, &mut events)
            .unwrap();

        let mut ctx = Context::new(GENESIS, &mut token, &mut events);
        funded
            .set_seed_round_vest_for(&admin(), &[account(1)], &[whole_tokens(1_000)], &mut ctx)
            .unwrap();
        assert_eq!(
            twin.withdraw(&admin(), whole_tokens(1_000), &mut ctx),
            Err(VestingError::InsufficientWithdrawable {
                available: 0,
                requested: whole_tokens(1_000)
            })
        );

        assert_eq!(token.balance_of(&funded.identity()), supply);
        assert_eq!(twin.withdrawable_amount(&token), 0);

        let done = GENESIS + 100 * MONTH;
        let mut ctx = Context::new(done, &mut token, &mut events);
        assert_eq!(funded.claim(&account(1), &mut ctx), Ok(whole_tokens(1_000)));
    }
}
