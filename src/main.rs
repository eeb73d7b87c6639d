//! Custody CLI Application
//!
//! Operator tooling for the threshold authority and the vesting ledger.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vesting_custody::cli::{self, AppState};

#[derive(Parser)]
#[command(name = "custody")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Threshold multisig authority and token vesting tooling", long_about = None)]
struct Cli {
    /// Configuration file (JSON); defaults are used when it does not exist
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new owner key pair
    Keygen,

    /// Show the identity of a secret key
    Identity {
        /// Hex-encoded secret key
        #[arg(short, long)]
        secret: String,
    },

    /// Compute the execution digest owners must sign
    Digest {
        /// Authority identity
        #[arg(short, long)]
        authority: String,

        /// Chain id (defaults to the configured one)
        #[arg(long)]
        chain_id: Option<u64>,

        /// Target identity (the authority itself for owner updates)
        #[arg(short, long)]
        target: String,

        /// Value forwarded with the call
        #[arg(long, default_value = "0")]
        value: u128,

        /// Current authority nonce
        #[arg(short, long)]
        nonce: u64,

        /// Operation as JSON, e.g. {"update_owner":{"owner":"0x..","add":true}}
        #[arg(short, long)]
        operation: String,
    },

    /// Sign a digest
    Sign {
        /// Hex-encoded secret key
        #[arg(short, long)]
        secret: String,

        /// Hex-encoded 32-byte digest
        #[arg(short, long)]
        digest: String,
    },

    /// Recover the signer of a digest
    Recover {
        /// Hex-encoded 32-byte digest
        #[arg(short, long)]
        digest: String,

        /// Hex-encoded 65-byte signature
        #[arg(short, long)]
        signature: String,
    },

    /// Order signatures by ascending signer identity
    SortSignatures {
        /// Hex-encoded 32-byte digest
        #[arg(short, long)]
        digest: String,

        /// Hex-encoded signatures, in any order
        #[arg(required = true)]
        signatures: Vec<String>,
    },

    /// List vesting categories with their policies and caps
    Categories,

    /// Quote the vested amount of a hypothetical schedule
    Quote {
        /// Category name or index
        #[arg(long)]
        category: String,

        /// Allocated amount in base units
        #[arg(short, long)]
        amount: u128,

        /// Seconds since genesis
        #[arg(short, long)]
        elapsed: u64,

        /// Marketing cliff in seconds
        #[arg(long)]
        cliff: Option<u64>,

        /// Marketing duration in seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Genesis unix timestamp, to print calendar dates
        #[arg(long)]
        genesis: Option<u64>,
    },

    /// Write the default configuration
    InitConfig {
        /// Output file path
        #[arg(short, long, default_value = "custody.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init-config separately (doesn't need a loaded config)
    if let Commands::InitConfig { output, force } = &cli.command {
        return cli::cmd_init_config(output, *force);
    }

    let state = AppState::new(cli.config.clone())?;

    match cli.command {
        Commands::InitConfig { .. } => unreachable!(),

        Commands::Keygen => {
            cli::cmd_keygen()?;
        }

        Commands::Identity { secret } => {
            cli::cmd_identity(&secret)?;
        }

        Commands::Digest {
            authority,
            chain_id,
            target,
            value,
            nonce,
            operation,
        } => {
            cli::cmd_digest(&state, &authority, chain_id, &target, value, nonce, &operation)?;
        }

        Commands::Sign { secret, digest } => {
            cli::cmd_sign(&secret, &digest)?;
        }

        Commands::Recover { digest, signature } => {
            cli::cmd_recover(&digest, &signature)?;
        }

        Commands::SortSignatures { digest, signatures } => {
            cli::cmd_sort_signatures(&digest, &signatures)?;
        }

        Commands::Categories => {
            cli::cmd_categories(&state)?;
        }

        Commands::Quote {
            category,
            amount,
            elapsed,
            cliff,
            duration,
            genesis,
        } => {
            cli::cmd_quote(&state, &category, amount, elapsed, cliff, duration, genesis)?;
        }
    }

    Ok(())
}
