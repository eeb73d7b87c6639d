//! Configuration
//!
//! Everything tunable about a deployment lives here and round-trips through
//! JSON. Category cliffs, durations and early-unlock percentages are fixed
//! by [`Category`]; only the allocation caps are configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use crate::vesting::Category;

/// Decimal places of the default token
pub const TOKEN_DECIMALS: u8 = 18;

/// `n` whole tokens expressed in base units of the default token
pub const fn whole_tokens(n: u128) -> u128 {
    n * 10u128.pow(TOKEN_DECIMALS as u32)
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Maximum amount that may ever be committed per category
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCaps {
    pub public_round: u128,
    pub seed_round: u128,
    pub private_round_one: u128,
    pub private_round_two: u128,
    pub marketing: u128,
    pub team: u128,
    pub foundation: u128,
}

impl CategoryCaps {
    pub fn cap(&self, category: Category) -> u128 {
        match category {
            Category::PublicRound => self.public_round,
            Category::SeedRound => self.seed_round,
            Category::PrivateRoundOne => self.private_round_one,
            Category::PrivateRoundTwo => self.private_round_two,
            Category::Marketing => self.marketing,
            Category::Team => self.team,
            Category::Foundation => self.foundation,
        }
    }

    /// Sum of all caps, `None` on overflow
    pub fn total(&self) -> Option<u128> {
        Category::ALL
            .iter()
            .try_fold(0u128, |acc, c| acc.checked_add(self.cap(*c)))
    }
}

impl Default for CategoryCaps {
    fn default() -> Self {
        Self {
            public_round: whole_tokens(80_000_000),
            seed_round: whole_tokens(80_000_000),
            private_round_one: whole_tokens(80_000_000),
            private_round_two: whole_tokens(80_000_000),
            marketing: whole_tokens(160_000_000),
            team: whole_tokens(240_000_000),
            foundation: whole_tokens(80_000_000),
        }
    }
}

/// Vesting ledger settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VestingConfig {
    pub caps: CategoryCaps,
    /// Linear accrual only advances in whole steps of this many seconds
    /// (a completed schedule is always fully vested)
    pub payout_interval_secs: u64,
    /// Additional team members may receive at most this share of the
    /// main team allocation, in percent
    pub additional_team_max_percent: u8,
}

impl Default for VestingConfig {
    fn default() -> Self {
        Self {
            caps: CategoryCaps::default(),
            payout_interval_secs: 1,
            additional_team_max_percent: 50,
        }
    }
}

/// Token settings used when the CLI deploys a fresh token
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenSettings {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            name: "Orange Token".to_string(),
            symbol: "OT".to_string(),
            decimals: TOKEN_DECIMALS,
            total_supply: whole_tokens(800_000_000),
        }
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Network identifier mixed into every execution digest
    pub chain_id: u64,
    pub token: TokenSettings,
    pub vesting: VestingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_id: 31337,
            token: TokenSettings::default(),
            vesting: VestingConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => Ok(Self::default()),
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.total_supply == 0 {
            return Err(ConfigError::Invalid("total supply must be > 0".to_string()));
        }

        if self.token.decimals > 18 {
            return Err(ConfigError::Invalid("decimals must be 0-18".to_string()));
        }

        for category in Category::ALL {
            if self.vesting.caps.cap(category) == 0 {
                return Err(ConfigError::Invalid(format!(
                    "cap for {} must be > 0",
                    category
                )));
            }
        }

        match self.vesting.caps.total() {
            Some(total) if total <= self.token.total_supply => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "category caps exceed total supply".to_string(),
                ))
            }
        }

        if self.vesting.payout_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "payout interval must be > 0".to_string(),
            ));
        }

        if self.vesting.additional_team_max_percent > 100 {
            return Err(ConfigError::Invalid(
                "additional team percent must be 0-100".to_string(),
            ));
        }

        Ok(())
    }
}
