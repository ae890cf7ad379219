use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{ArgGroup, Parser};
use devtoken_app::{
    TOKEN_BIN_CANDIDATES,
    deployment::{self, DeploymentEnv, DeploymentRecord, DeploymentStore},
    token_types, wallets,
};
use fuels::{
    prelude::{Contract, LoadConfiguration, Provider, TxPolicies},
    programs::contract::{Contract as LoadedContract, Regular},
    types::{Bits256, ContractId},
};
use rand::Rng;
use std::path::Path;

const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet.fuel.network";
const DEFAULT_DEVNET_RPC_URL: &str = "https://devnet.fuel.network";
const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:4000/";
const DEFAULT_SAFE_SCRIPT_GAS_LIMIT: u64 = 29_000_000;

#[derive(Parser, Debug)]
#[command(
    name = "devtoken-deploy",
    about = "Deploy the token contract and point it at an NFT collection",
    version,
    group(
        ArgGroup::new("network")
            .args(["devnet", "testnet", "local"])
            .required(true)
    )
)]
struct Args {
    /// Deploy to Fuel devnet
    #[arg(long)]
    devnet: bool,

    /// Deploy to Fuel testnet
    #[arg(long)]
    testnet: bool,

    /// Deploy to a local Fuel node
    #[arg(long)]
    local: bool,

    /// Override RPC URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// forc-wallet profile name
    #[arg(long)]
    wallet: String,

    /// Override forc-wallet directory (defaults to ~/.fuel/wallets)
    #[arg(long)]
    wallet_dir: Option<String>,

    /// Contract id of the NFT collection that gates claims
    #[arg(long)]
    nft_contract_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    deployment::ensure_structure()
        .map_err(|e| anyhow!(e))
        .context("initializing deployment directories")?;

    let (env, default_url) = if args.devnet {
        (DeploymentEnv::Dev, DEFAULT_DEVNET_RPC_URL)
    } else if args.testnet {
        (DeploymentEnv::Test, DEFAULT_TESTNET_RPC_URL)
    } else {
        (DeploymentEnv::Local, DEFAULT_LOCAL_RPC_URL)
    };

    let rpc_url = args
        .rpc_url
        .clone()
        .unwrap_or_else(|| default_url.to_string());
    let provider = Provider::connect(&rpc_url)
        .await
        .context("failed to connect to provider")?;

    let wallet_dir = wallets::resolve_wallet_dir(args.wallet_dir.as_deref())
        .map_err(|e| anyhow!(e))
        .context("resolving wallet directory")?;
    let descriptor = wallets::find_wallet(&wallet_dir, &args.wallet)
        .map_err(|e| anyhow!(e))
        .context("locating requested wallet")?;
    let wallet = wallets::unlock_wallet(&descriptor, &provider)
        .map_err(|e| anyhow!(e))
        .context("unlocking forc-wallet profile")?;

    let consensus_parameters = provider
        .consensus_parameters()
        .await
        .context("fetching consensus parameters")?;
    let max_gas_per_tx = consensus_parameters.tx_params().max_gas_per_tx();
    let safe_script_gas_limit = max_gas_per_tx
        .saturating_sub(1)
        .clamp(1, DEFAULT_SAFE_SCRIPT_GAS_LIMIT);

    let nft_contract_id: ContractId = args
        .nft_contract_id
        .parse()
        .map_err(|e| anyhow!("parsing NFT contract id: {e}"))?;

    let store = DeploymentStore::new(env)
        .map_err(|e| anyhow!(e))
        .context("opening deployment store")?;

    let bin_path =
        choose_binary(&TOKEN_BIN_CANDIDATES).context("locating token binary")?;
    let bytecode_hash = deployment::compute_bytecode_hash(bin_path)
        .map_err(|e| anyhow!(e))
        .context("hashing token binary")?;
    let salt = rand::rng().random::<[u8; 32]>();
    let contract = load_contract(&TOKEN_BIN_CANDIDATES, salt)
        .context("loading token contract binary")?;
    let response = contract
        .deploy(&wallet, TxPolicies::default())
        .await
        .context("deploying token contract")?;
    let token_contract_id = response.contract_id;

    println!("Token contract deployed: {token_contract_id}");

    let instance = token_types::DevToken::new(token_contract_id, wallet.clone());
    instance
        .methods()
        .initialize(Bits256(*nft_contract_id))
        .with_tx_policies(script_policies(safe_script_gas_limit))
        .call()
        .await
        .context("initializing token contract with the NFT collection")?;

    let record = DeploymentRecord {
        deployed_at: Utc::now().to_rfc3339(),
        token_contract_id: token_contract_id.to_string(),
        nft_contract_id: nft_contract_id.to_string(),
        bytecode_hash,
        network_url: rpc_url,
        contract_salt: Some(format!("0x{}", hex::encode(salt))),
    };
    store
        .append(record)
        .map_err(|e| anyhow!(e))
        .context("recording deployment")?;
    println!("Deployment metadata written to {}", store.path().display());
    Ok(())
}

fn script_policies(limit: u64) -> TxPolicies {
    TxPolicies::default().with_script_gas_limit(limit)
}

fn choose_binary<'a>(paths: &'a [&str]) -> Result<&'a str> {
    paths
        .iter()
        .find(|p| Path::new(p).exists())
        .copied()
        .ok_or_else(|| anyhow!("Contract binary not found. Tried {:?}", paths))
}

fn load_contract(paths: &[&str], salt: [u8; 32]) -> Result<LoadedContract<Regular>> {
    let path = choose_binary(paths)?;
    Contract::load_from(path, LoadConfiguration::default().with_salt(salt))
        .with_context(|| format!("Failed to load contract binary from {path}"))
}
