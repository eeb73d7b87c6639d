//! Allocation categories and their release policies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DAY_SECS: u64 = 86_400;
/// Vesting months are a flat 30 days
pub const MONTH_SECS: u64 = 30 * DAY_SECS;

/// Unknown category name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct ParseCategoryError(pub String);

/// Cliff, duration and early unlock applied to every schedule of a category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    /// Offset from the vesting start before anything vests
    pub cliff_secs: u64,
    pub duration_secs: u64,
    pub early_unlock_percent: u8,
}

/// The seven allocation buckets, in their canonical index order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    PublicRound,
    SeedRound,
    PrivateRoundOne,
    PrivateRoundTwo,
    Marketing,
    Team,
    Foundation,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::PublicRound,
        Category::SeedRound,
        Category::PrivateRoundOne,
        Category::PrivateRoundTwo,
        Category::Marketing,
        Category::Team,
        Category::Foundation,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::PublicRound => "public-round",
            Category::SeedRound => "seed-round",
            Category::PrivateRoundOne => "private-round-one",
            Category::PrivateRoundTwo => "private-round-two",
            Category::Marketing => "marketing",
            Category::Team => "team",
            Category::Foundation => "foundation",
        }
    }

    pub fn early_unlock_percent(self) -> u8 {
        match self {
            Category::PublicRound => 10,
            Category::SeedRound => 0,
            Category::PrivateRoundOne | Category::PrivateRoundTwo => 10,
            Category::Marketing => 2,
            Category::Team => 0,
            Category::Foundation => 5,
        }
    }

    /// Fixed policy, `None` for marketing where cliff and duration are
    /// chosen per beneficiary
    pub fn fixed_policy(self) -> Option<SchedulePolicy> {
        let (cliff_months, duration_months) = match self {
            Category::PublicRound => (0, 6),
            Category::SeedRound => (12, 32),
            Category::PrivateRoundOne | Category::PrivateRoundTwo => (6, 24),
            Category::Marketing => return None,
            Category::Team => (4, 24),
            Category::Foundation => (0, 19),
        };

        Some(SchedulePolicy {
            cliff_secs: cliff_months * MONTH_SECS,
            duration_secs: duration_months * MONTH_SECS,
            early_unlock_percent: self.early_unlock_percent(),
        })
    }

    /// Policy for a marketing schedule with caller-chosen timing
    pub fn marketing_policy(cliff_secs: u64, duration_secs: u64) -> SchedulePolicy {
        SchedulePolicy {
            cliff_secs,
            duration_secs,
            early_unlock_percent: Category::Marketing.early_unlock_percent(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Accepts the kebab-case name or the numeric index
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if let Ok(index) = wanted.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| ParseCategoryError(s.to_string()));
        }
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}
