//! # ChainX Genesis Migration
//!
//! `genesis-migrate` turns the ChainX 1.0 snapshot taken at the migration
//! height into `genesis_builder_params.json` for ChainX 2.0.
//!
//! ## Commands
//!
//! - `build` (default): run the migration, write aux documents and the
//!   consolidated genesis document
//! - `verify-assets`: check per-account balances against the asset totals
//! - `verify-votes`: check validator vote weights against nominator votes
//!
//! ## Configuration
//!
//! Built-in defaults, then `--config FILE`, then the remaining flags.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use genesis_migration::{
    JsonFileSink, JsonSnapshotDir, MigrationApi, MigrationConfig, MigrationPipeline,
    Ss58AddressCodec,
};

/// ChainX 1.0 to 2.0 genesis migration
#[derive(Parser, Debug)]
#[command(name = "genesis-migrate")]
#[command(about = "Build ChainX 2.0 genesis parameters from a ChainX 1.0 state snapshot")]
#[command(version)]
struct Args {
    /// JSON configuration file (kebab-case keys)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Legacy block height of the snapshot
    #[arg(long)]
    height: Option<u64>,

    /// Directory holding one snapshot directory per height
    #[arg(long, value_name = "DIR")]
    state_dir: Option<PathBuf>,

    /// Directory receiving the aux documents
    #[arg(long, value_name = "DIR")]
    aux_dir: Option<PathBuf>,

    /// Path of the consolidated genesis document
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the migration (default)
    Build,
    /// Check per-account balances against assets-total.json
    VerifyAssets,
    /// Check vote-weight-nodes.json against vote-weight-accounts.json
    VerifyVotes,
}

impl Args {
    /// Defaults, then the config file, then flags.
    fn resolve_config(&self) -> Result<MigrationConfig> {
        let mut config = match &self.config {
            Some(path) => MigrationConfig::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => MigrationConfig::default(),
        };

        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(state_dir) = &self.state_dir {
            config.state_dir = state_dir.clone();
        }
        if let Some(aux_dir) = &self.aux_dir {
            config.aux_dir = aux_dir.clone();
        }
        if let Some(output) = &self.output {
            config.genesis_output = output.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn run(command: Command, config: &MigrationConfig) -> Result<bool> {
    let pipeline = MigrationPipeline::new(
        JsonSnapshotDir::new(&config.state_dir, config.height),
        JsonFileSink::new(&config.aux_dir, &config.genesis_output),
        Ss58AddressCodec::new(config.ss58_prefix),
        config.pipeline_settings(),
    );

    match command {
        Command::Build => {
            let params = pipeline.build_genesis().context("building genesis parameters")?;
            info!(
                output = %config.genesis_output.display(),
                free_balances = params.balances.free_balances.len(),
                validators = params.xstaking.validators.len(),
                "[genesis-migrate] Genesis parameters written"
            );
            Ok(true)
        }
        Command::VerifyAssets => {
            let report = pipeline
                .verify_asset_supply()
                .context("verifying asset supply")?;
            Ok(report.is_consistent())
        }
        Command::VerifyVotes => {
            let report = pipeline
                .verify_vote_weights()
                .context("verifying vote weights")?;
            Ok(report.is_consistent())
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init(&args.log_level)?;

    let config = args.resolve_config()?;
    let command = args.command.unwrap_or(Command::Build);
    info!(
        ?command,
        height = config.height,
        snapshot = %config.snapshot_dir().display(),
        "[genesis-migrate] ChainX genesis migration"
    );

    if run(command, &config)? {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(?command, "[genesis-migrate] Snapshot verification failed, see the aux report");
        Ok(ExitCode::FAILURE)
    }
}
