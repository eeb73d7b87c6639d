//! Per-beneficiary vesting schedule and release arithmetic

use serde::{Deserialize, Serialize};

/// `a * n / d` rounded down, without the intermediate product overflowing
/// when `n <= d`. `None` if `d == 0` or the result does not fit.
pub fn mul_div(a: u128, n: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let whole = (a / d).checked_mul(n)?;
    let part = (a % d).checked_mul(n)? / d;
    whole.checked_add(part)
}

/// One beneficiary's allocation in one category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    /// Nothing vests before this timestamp
    pub cliff_at: u64,
    /// Linear accrual is measured from here (the genesis time)
    pub start_at: u64,
    pub duration_secs: u64,
    /// Committed amount; only founder dilution ever lowers it
    pub total_amount: u128,
    /// Cumulative amount already claimed
    pub released: u128,
    pub early_unlock_percent: u8,
}

impl VestingSchedule {
    /// Part of the total unlocked as soon as the schedule can vest at all
    pub fn early_unlock_amount(&self) -> u128 {
        // percent <= 100, cannot overflow
        mul_div(self.total_amount, u128::from(self.early_unlock_percent), 100).unwrap_or(0)
    }

    /// Cumulative vested amount at `now`, including what was already released.
    ///
    /// Linear accrual advances in whole `payout_interval` steps until the
    /// schedule completes; at completion the full total is vested.
    pub fn vested_at(&self, now: u64, payout_interval: u64) -> u128 {
        if now < self.start_at || now < self.cliff_at || self.duration_secs == 0 {
            return 0;
        }

        let mut elapsed = (now - self.start_at).min(self.duration_secs);
        if elapsed < self.duration_secs && payout_interval > 1 {
            elapsed -= elapsed % payout_interval;
        }

        let linear = mul_div(
            self.total_amount,
            u128::from(elapsed),
            u128::from(self.duration_secs),
        )
        .unwrap_or(self.total_amount);

        linear
            .saturating_add(self.early_unlock_amount())
            .min(self.total_amount)
    }

    /// Amount claimable at `now`
    pub fn releasable_at(&self, now: u64, payout_interval: u64) -> u128 {
        self.vested_at(now, payout_interval)
            .saturating_sub(self.released)
    }

    pub fn is_fully_released(&self) -> bool {
        self.released >= self.total_amount
    }
}
