//! qf-client: command line front end for the quadratic-funding contract.
//!
//! # Flow
//!
//! ```text
//!   --config (TOML) ──▶ ClientConfig ──▶ Network
//!                                          │
//!   --key-file / --password ──────────────▶│ provision wallet (load or create)
//!                                          │ connect signing client
//!                                          │ faucet bootstrap (if configured)
//!                                          ▼
//!                                   QuadraticFunding ──▶ upload / instantiate
//!                                          │
//!                                          ▼
//!                             QuadraticFundingInstance ──▶ queries / actions
//! ```
//!
//! Results are printed as pretty JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use qf_client::blockchain::{BlockchainResult, Coin};
use qf_client::config::loader::load_or_default;
use qf_client::contract::{Binary, InitMsg, QuadraticFunding};
use qf_client::lifecycle::Network;
use qf_client::observability::logging;

#[derive(Parser)]
#[command(name = "qf-client")]
#[command(about = "Client for the quadratic-funding CosmWasm contract", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in heldernet defaults when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Encrypted key file; defaults to the configured path
    #[arg(short, long, global = true)]
    key_file: Option<PathBuf>,

    /// Password protecting the key file
    #[arg(short, long, env = "QF_CLIENT_PASSWORD", hide_env_values = true)]
    password: String,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wallet address, creating the wallet if needed
    Address,
    /// Print the wallet's seed phrase
    Mnemonic,
    /// Download the contract bytecode and store it on chain
    Upload,
    /// Instantiate uploaded code
    Instantiate {
        #[arg(long)]
        code_id: u64,
        /// JSON file holding the init message
        #[arg(long)]
        init: PathBuf,
        #[arg(long)]
        label: String,
    },
    /// Show one proposal
    Proposal { contract: String, id: u64 },
    /// List all proposals
    Proposals { contract: String },
    /// Register a proposal
    CreateProposal {
        contract: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        fund_address: String,
        /// Funds sent with the proposal, e.g. 100ucosm
        #[arg(long)]
        amount: Coin,
        /// Free-form metadata stored with the proposal
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Vote for a proposal
    Vote {
        contract: String,
        id: u64,
        /// Vote weight in tokens, e.g. 100ucosm
        #[arg(long)]
        amount: Coin,
    },
    /// Distribute the pooled funds
    TriggerDistribution { contract: String },
    /// Send tokens to another address
    Send {
        to: String,
        #[arg(long)]
        amount: Coin,
        #[arg(long, default_value = "")]
        memo: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.observability.log_level.clone());
    logging::init(&level);

    tracing::debug!(
        endpoint = %config.network.http_url,
        chain_id = %config.network.network_id,
        "Configuration loaded"
    );

    let network = Network::new(config);
    let output = run(&network, cli.command, &cli.password, cli.key_file.as_deref()).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(
    network: &Network,
    command: Commands,
    password: &str,
    key_file: Option<&Path>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let output = match command {
        Commands::Address => {
            let provisioned = network.provision(password, key_file).await?;
            json!({
                "address": provisioned.wallet.address(),
                "durable": provisioned.is_durable(),
            })
        }
        Commands::Mnemonic => {
            let recovered = network.recover_mnemonic(password, key_file).await?;
            json!({
                "mnemonic": recovered.phrase.as_str(),
                "durable": recovered.durable,
            })
        }
        Commands::Upload => {
            let (factory, durable) = factory(network, password, key_file).await?;
            let code_id = factory.upload().await?;
            json!({ "code_id": code_id, "durable": durable })
        }
        Commands::Instantiate { code_id, init, label } => {
            let init_msg: InitMsg = serde_json::from_str(&tokio::fs::read_to_string(&init).await?)?;
            let (factory, durable) = factory(network, password, key_file).await?;
            let instance = factory.instantiate(code_id, &init_msg, &label).await?;
            json!({ "contract_address": instance.contract_address(), "durable": durable })
        }
        Commands::Proposal { contract, id } => {
            let (factory, durable) = factory(network, password, key_file).await?;
            let proposal = factory.attach(contract).proposal(id).await?;
            json!({ "proposal": proposal, "durable": durable })
        }
        Commands::Proposals { contract } => {
            let (factory, durable) = factory(network, password, key_file).await?;
            let proposals = factory.attach(contract).all_proposals().await?;
            json!({ "proposals": proposals, "durable": durable })
        }
        Commands::CreateProposal {
            contract,
            name,
            title,
            description,
            fund_address,
            amount,
            metadata,
        } => {
            let (factory, durable) = factory(network, password, key_file).await?;
            let tx_hash = factory
                .attach(contract)
                .create_proposal(
                    &name,
                    &title,
                    &description,
                    &fund_address,
                    &[amount],
                    metadata.map(|m| Binary::from(m.into_bytes())),
                )
                .await?;
            json!({ "transaction_hash": tx_hash, "durable": durable })
        }
        Commands::Vote { contract, id, amount } => {
            let (factory, durable) = factory(network, password, key_file).await?;
            let tx_hash = factory.attach(contract).vote_proposal(id, &[amount]).await?;
            json!({ "transaction_hash": tx_hash, "durable": durable })
        }
        Commands::TriggerDistribution { contract } => {
            let (factory, durable) = factory(network, password, key_file).await?;
            let tx_hash = factory.attach(contract).trigger_distribution().await?;
            json!({ "transaction_hash": tx_hash, "durable": durable })
        }
        Commands::Send { to, amount, memo } => {
            let session = network.setup(password, key_file).await?;
            let tx_hash = session.client.send_tokens(&to, &[amount], &memo).await?;
            json!({ "transaction_hash": tx_hash, "durable": session.durable })
        }
    };
    Ok(output)
}

/// Factory over a fresh session, plus whether the wallet is on disk.
async fn factory(
    network: &Network,
    password: &str,
    key_file: Option<&Path>,
) -> BlockchainResult<(QuadraticFunding, bool)> {
    let session = network.setup(password, key_file).await?;
    let factory = QuadraticFunding::new(Arc::new(session.client), network.config().contract.clone())?;
    Ok((factory, session.durable))
}
