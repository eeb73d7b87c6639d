//! CLI commands for custody operators
//!
//! Off-chain tooling: key management, digest computation, signing and
//! signature ordering for the authority, plus vesting quotes.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::crypto::{recover_signer, Identity, KeyPair};
use crate::multisig::{execution_digest, sort_signatures, Operation};
use crate::vesting::{Category, SchedulePolicy, VestingSchedule, DAY_SECS};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Everything a command needs from the environment
pub struct AppState {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl AppState {
    /// Load the configuration, falling back to defaults when no file exists
    pub fn new(config_path: Option<PathBuf>) -> CliResult<Self> {
        let config = Config::load_or_default(config_path.as_deref())?;
        if let Some(path) = &config_path {
            if path.exists() {
                log::info!("Loaded configuration from {:?}", path);
            }
        }
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Where the configuration came from, for display
    pub fn config_source(&self) -> String {
        match &self.config_path {
            Some(path) if path.exists() => format!("{}", path.display()),
            Some(path) => format!("defaults ({} not found)", path.display()),
            None => "defaults".to_string(),
        }
    }
}

/// Parse a 32-byte digest from hex, with or without `0x`
pub fn parse_digest(s: &str) -> CliResult<[u8; 32]> {
    let bytes = hex::decode(s.trim().trim_start_matches("0x"))?;
    let digest: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("digest must be 32 bytes, got {}", b.len()))?;
    Ok(digest)
}

/// Parse a hex signature, with or without `0x`
pub fn parse_signature(s: &str) -> CliResult<Vec<u8>> {
    Ok(hex::decode(s.trim().trim_start_matches("0x"))?)
}

/// Schedule a beneficiary would get in `category` at a genesis of 0.
///
/// Marketing needs `duration`; `cliff` defaults to 0.
pub fn quote_schedule(
    category: Category,
    amount: u128,
    cliff: Option<u64>,
    duration: Option<u64>,
) -> CliResult<VestingSchedule> {
    let policy: SchedulePolicy = match category.fixed_policy() {
        Some(policy) => policy,
        None => {
            let duration = duration.ok_or("marketing quotes need --duration")?;
            if duration == 0 {
                return Err("duration must be > 0".into());
            }
            Category::marketing_policy(cliff.unwrap_or(0), duration)
        }
    };

    Ok(VestingSchedule {
        cliff_at: policy.cliff_secs,
        start_at: 0,
        duration_secs: policy.duration_secs,
        total_amount: amount,
        released: 0,
        early_unlock_percent: policy.early_unlock_percent,
    })
}

fn format_days(secs: u64) -> String {
    format!("{} days", secs / DAY_SECS)
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}

/// Generate a fresh key pair
pub fn cmd_keygen() -> CliResult<()> {
    let keys = KeyPair::generate();

    println!("🔐 New key pair generated!");
    println!("   📍 Identity: {}", keys.identity());
    println!("   🔑 Public Key: {}", keys.public_key_hex());
    println!("   🗝️  Secret Key: {}", keys.private_key_hex());
    println!();
    println!("⚠️  Keep the secret key offline. Anyone holding it can sign as this owner.");

    Ok(())
}

/// Print the identity controlled by a secret key
pub fn cmd_identity(secret: &str) -> CliResult<()> {
    let keys = KeyPair::from_private_key_hex(secret.trim_start_matches("0x"))?;

    println!("📍 Identity: {}", keys.identity());
    println!("   Public Key: {}", keys.public_key_hex());

    Ok(())
}

/// Print the digest owners must sign for one execution
pub fn cmd_digest(
    state: &AppState,
    authority: &str,
    chain_id: Option<u64>,
    target: &str,
    value: u128,
    nonce: u64,
    operation: &str,
) -> CliResult<()> {
    let authority: Identity = authority.parse()?;
    let target: Identity = target.parse()?;
    let operation: Operation = serde_json::from_str(operation)?;
    let chain_id = chain_id.unwrap_or(state.config.chain_id);

    let digest = execution_digest(&authority, chain_id, &target, value, &operation, nonce);

    println!("🧾 Execution digest");
    println!("   ├─ Authority: {}", authority);
    println!("   ├─ Chain: {}", chain_id);
    println!("   ├─ Target: {}", target);
    println!("   ├─ Value: {}", value);
    println!("   ├─ Operation: {}", operation.name());
    println!("   ├─ Nonce: {}", nonce);
    println!("   └─ Digest: 0x{}", hex::encode(digest));

    Ok(())
}

/// Sign a digest with a secret key
pub fn cmd_sign(secret: &str, digest: &str) -> CliResult<()> {
    let keys = KeyPair::from_private_key_hex(secret.trim_start_matches("0x"))?;
    let digest = parse_digest(digest)?;
    let signature = keys.sign_digest(&digest)?;

    log::debug!("signed digest as {}", keys.identity());

    println!("✍️  Signature by {}", keys.identity());
    println!("   0x{}", hex::encode(signature));

    Ok(())
}

/// Print who signed a digest
pub fn cmd_recover(digest: &str, signature: &str) -> CliResult<()> {
    let digest = parse_digest(digest)?;
    let signature = parse_signature(signature)?;
    let signer = recover_signer(&digest, &signature)?;

    println!("🔍 Signer: {}", signer);

    Ok(())
}

/// Reorder independently collected signatures for submission
pub fn cmd_sort_signatures(digest: &str, signatures: &[String]) -> CliResult<()> {
    let digest = parse_digest(digest)?;
    let signatures = signatures
        .iter()
        .map(|s| parse_signature(s))
        .collect::<CliResult<Vec<_>>>()?;

    let sorted = sort_signatures(&digest, signatures)?;

    println!("📑 Signatures in submission order ({}):", sorted.len());
    for (i, (signer, signature)) in sorted.iter().enumerate() {
        println!("   {}. {} 0x{}", i + 1, signer, hex::encode(signature));
    }

    Ok(())
}

/// Print the release policy and cap of every category
pub fn cmd_categories(state: &AppState) -> CliResult<()> {
    let caps = &state.config.vesting.caps;

    println!("📊 Vesting categories:");
    println!("   Configuration: {}", state.config_source());
    println!();
    for category in Category::ALL {
        let cap = caps.cap(category);
        match category.fixed_policy() {
            Some(policy) => println!(
                "   {}. {:<18} cliff {:>9}  duration {:>9}  early {:>3}%  cap {}",
                category.index(),
                category.name(),
                format_days(policy.cliff_secs),
                format_days(policy.duration_secs),
                policy.early_unlock_percent,
                cap
            ),
            None => println!(
                "   {}. {:<18} cliff {:>9}  duration {:>9}  early {:>3}%  cap {}",
                category.index(),
                category.name(),
                "custom",
                "custom",
                category.early_unlock_percent(),
                cap
            ),
        }
    }
    println!();
    println!(
        "   Payout interval: {}s, additional team cap: {}% of main team",
        state.config.vesting.payout_interval_secs, state.config.vesting.additional_team_max_percent
    );

    Ok(())
}

/// Vested amount of a hypothetical schedule `elapsed` seconds after genesis
pub fn cmd_quote(
    state: &AppState,
    category: &str,
    amount: u128,
    elapsed: u64,
    cliff: Option<u64>,
    duration: Option<u64>,
    genesis: Option<u64>,
) -> CliResult<()> {
    let category: Category = category.parse()?;
    let schedule = quote_schedule(category, amount, cliff, duration)?;
    let interval = state.config.vesting.payout_interval_secs;
    let vested = schedule.vested_at(elapsed, interval);

    println!("💰 Quote for {} {} in {}", amount, state.config.token.symbol, category);
    println!("   ├─ Early unlock: {}", schedule.early_unlock_amount());
    println!("   ├─ Cliff: {}", format_days(schedule.cliff_at));
    println!("   ├─ Duration: {}", format_days(schedule.duration_secs));
    if let Some(genesis) = genesis {
        let at = genesis.saturating_add(elapsed);
        println!("   ├─ At: {}", format_timestamp(at));
        println!(
            "   ├─ Fully vested: {}",
            format_timestamp(genesis.saturating_add(schedule.duration_secs))
        );
    }
    println!("   ├─ Elapsed: {}s", elapsed);
    println!("   └─ Vested: {} ({} locked)", vested, amount - vested);

    Ok(())
}

/// Write the default configuration
pub fn cmd_init_config(output: &Path, force: bool) -> CliResult<()> {
    if output.exists() && !force {
        println!("⚠️  Configuration already exists at {:?}", output);
        println!("   Use --force to overwrite it");
        return Ok(());
    }

    let config = Config::default();
    config.save(output)?;

    println!("✅ Configuration written!");
    println!("   📁 Path: {:?}", output);
    println!("   🔗 Chain id: {}", config.chain_id);
    println!(
        "   🪙 Token: {} ({}), supply {}",
        config.token.name, config.token.symbol, config.token.total_supply
    );

    Ok(())
}
