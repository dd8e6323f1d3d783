// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Meridian Validator Node
//!
//! Entry point for the `meridian-node` binary.
//!
//! - `init`: create or reuse the validator key, genesis file and
//!   validator history in the node home
//! - `validate`: run the block admission rules on a block file
//! - `version`: print build version information
//!
//! Home layout:
//!
//! ```text
//! <home>/validator.key   hex Ed25519 secret key (0600 on Unix)
//! <home>/genesis.json    genesis document
//! <home>/data/           sled validator history
//! ```

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};

use meridian_protocol::config::{DEFAULT_GENESIS_POWER, PROTOCOL_VERSION};
use meridian_protocol::genesis::{GenesisDoc, GenesisValidator};
use meridian_protocol::storage::ValidatorStore;
use meridian_protocol::{Block, BlockValidator, ChainState, ValidatorKey};

use cli::{Commands, MeridianNodeCli};
use logging::LogFormat;

const KEY_FILE: &str = "validator.key";
const GENESIS_FILE: &str = "genesis.json";
const DATA_DIR: &str = "data";

fn main() -> Result<()> {
    let cli = MeridianNodeCli::parse();
    let format = LogFormat::from_str_lossy(&cli.log_format);

    match cli.command {
        Commands::Init(args) => {
            logging::init_logging("meridian_node=info,meridian_protocol=info", format);
            let home = expand_home(&args.home);
            let genesis = init_home(&home, args.chain_id)?;

            println!("Node initialized successfully.");
            println!("  Home      : {}", home.display());
            println!("  Chain id  : {}", genesis.chain_id);
            println!("  Genesis   : {}", home.join(GENESIS_FILE).display());
            println!("  Validators: {}", genesis.validators.len());
            Ok(())
        }
        Commands::Validate(args) => {
            logging::init_logging("meridian_node=info,meridian_protocol=warn", format);
            let home = expand_home(&args.home);
            let block = read_json::<Block>(&args.block)?;
            let state = match &args.state {
                Some(path) => read_json::<ChainState>(path)?,
                None => GenesisDoc::from_file(home.join(GENESIS_FILE))
                    .context("failed to load genesis file")?
                    .make_genesis_state()?,
            };
            validate_block(&home, &state, &block, args.at.unwrap_or_else(Utc::now))
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Create missing home files; existing key and genesis are reused.
fn init_home(home: &Path, chain_id: Option<String>) -> Result<GenesisDoc> {
    tracing::info!(home = %home.display(), "initializing node");
    std::fs::create_dir_all(home)
        .with_context(|| format!("failed to create home directory: {}", home.display()))?;

    let key = load_or_generate_key(&home.join(KEY_FILE))?;
    tracing::info!(
        address = %key.address(),
        public_key = %key.public_key(),
        "this validator"
    );

    let genesis_path = home.join(GENESIS_FILE);
    let genesis = if genesis_path.exists() {
        tracing::info!(path = %genesis_path.display(), "found genesis file");
        GenesisDoc::from_file(&genesis_path)
            .with_context(|| format!("failed to load {}", genesis_path.display()))?
    } else {
        let address = key.address().to_hex();
        let genesis = GenesisDoc {
            genesis_time: Utc::now(),
            chain_id: chain_id
                .unwrap_or_else(|| format!("test-chain-{}", &address[..6].to_lowercase())),
            consensus_params: Default::default(),
            validators: vec![GenesisValidator {
                pub_key: key.public_key(),
                power: DEFAULT_GENESIS_POWER,
                name: String::new(),
            }],
            app_hash: Vec::new(),
        };
        genesis
            .save_as(&genesis_path)
            .with_context(|| format!("failed to write {}", genesis_path.display()))?;
        tracing::info!(path = %genesis_path.display(), "generated genesis file");
        genesis
    };

    // The first block is signed off by the genesis validators, so evidence
    // about height 1 is checked against them.
    let state = genesis.make_genesis_state()?;
    let data_dir = home.join(DATA_DIR);
    let store = ValidatorStore::open(&data_dir)
        .with_context(|| format!("failed to open validator history at {}", data_dir.display()))?;
    store.save(1, &state.validators)?;

    Ok(genesis)
}

fn load_or_generate_key(path: &Path) -> Result<ValidatorKey> {
    if path.exists() {
        let hex = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read validator key {}", path.display()))?;
        let key = ValidatorKey::from_hex(hex.trim())
            .with_context(|| format!("invalid validator key in {}", path.display()))?;
        tracing::info!(path = %path.display(), "found validator key");
        return Ok(key);
    }

    let key = ValidatorKey::generate();
    std::fs::write(path, hex::encode(key.secret_key_bytes()))
        .with_context(|| format!("failed to write validator key to {}", path.display()))?;

    // Restrict permissions on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(path = %path.display(), "generated validator key");
    Ok(key)
}

/// Run the admission rules and print the verdict. Rejection is an error so
/// the process exits non-zero.
fn validate_block(
    home: &Path,
    state: &ChainState,
    block: &Block,
    now: chrono::DateTime<Utc>,
) -> Result<()> {
    let data_dir = home.join(DATA_DIR);
    let store = ValidatorStore::open(&data_dir)
        .with_context(|| format!("failed to open validator history at {}", data_dir.display()))?;
    let validator = BlockValidator::new(store);

    match validator.validate_at(state, block, now) {
        Ok(()) => {
            println!(
                "accepted: height {} id {}",
                block.header.height,
                block.block_id()
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(kind = %err.kind(), "block rejected");
            println!("rejected ({}): {}", err.kind(), err);
            bail!("block at height {} rejected: {}", block.header.height, err.kind())
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// Expand a leading `~` to `$HOME`.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("meridian-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", PROTOCOL_VERSION);
}
