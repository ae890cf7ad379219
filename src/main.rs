use color_eyre::eyre::{Result, eyre};
use devtoken_app::{client, deployment, wallets};
use fuels::prelude::ContractId;
use std::str::FromStr;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::EnvFilter;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: devtoken-app [--devnet | --testnet | --local] [--rpc-url <url>]\n\
         [--wallet <name>] [--wallet-dir <path>]\n\
         [--token-contract-id <id>] [--nft-contract-id <id>]\n\
         \n\
         Flags:\n\
           --devnet                  Connect to Fuel devnet (default RPC {})\n\
           --testnet                 Connect to Fuel testnet (default RPC {})\n\
           --local                   Connect to a local Fuel node (default RPC {})\n\
           --rpc-url <url>           Override the RPC URL for the selected network\n\
           --wallet <name>           forc-wallet profile to sign with\n\
           --wallet-dir <path>       Override forc-wallet directory (defaults to ~/.fuel/wallets)\n\
           --token-contract-id <id>  Override the token contract id from the deployment records\n\
           --nft-contract-id <id>    Override the NFT contract id from the deployment records",
        client::DEFAULT_DEVNET_RPC_URL,
        client::DEFAULT_TESTNET_RPC_URL,
        client::DEFAULT_LOCAL_RPC_URL,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<client::AppConfig> {
    #[derive(Clone, Copy)]
    enum NetworkFlag {
        Devnet,
        Testnet,
        Local,
    }

    let mut args = std::env::args().skip(1);
    let mut network_flag: Option<NetworkFlag> = None;
    let mut custom_url: Option<String> = None;
    let mut wallet_dir: Option<String> = None;
    let mut wallet_name: Option<String> = None;
    let mut token_contract_id: Option<ContractId> = None;
    let mut nft_contract_id: Option<ContractId> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--devnet" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --devnet/--testnet/--local"
                    ));
                }
                network_flag = Some(NetworkFlag::Devnet);
            }
            "--testnet" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --devnet/--testnet/--local"
                    ));
                }
                network_flag = Some(NetworkFlag::Testnet);
            }
            "--local" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --devnet/--testnet/--local"
                    ));
                }
                network_flag = Some(NetworkFlag::Local);
            }
            "--rpc-url" => {
                let url = args
                    .next()
                    .ok_or_else(|| eyre!("--rpc-url requires a URL argument"))?;
                if custom_url.is_some() {
                    return Err(eyre!("--rpc-url may only be specified once"));
                }
                if network_flag.is_none() {
                    return Err(eyre!(
                        "--rpc-url must follow a network flag (--devnet/--testnet/--local)"
                    ));
                }
                custom_url = Some(url);
            }
            "--wallet-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--wallet-dir requires a path argument"))?;
                if wallet_dir.is_some() {
                    return Err(eyre!("--wallet-dir may only be specified once"));
                }
                wallet_dir = Some(dir);
            }
            "--wallet" => {
                let name = args
                    .next()
                    .ok_or_else(|| eyre!("--wallet requires a wallet name"))?;
                if wallet_name.is_some() {
                    return Err(eyre!("--wallet may only be specified once"));
                }
                wallet_name = Some(name);
            }
            "--token-contract-id" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--token-contract-id requires a contract id"))?;
                if token_contract_id.is_some() {
                    return Err(eyre!("--token-contract-id may only be specified once"));
                }
                token_contract_id = Some(parse_contract_id(&raw)?);
            }
            "--nft-contract-id" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--nft-contract-id requires a contract id"))?;
                if nft_contract_id.is_some() {
                    return Err(eyre!("--nft-contract-id may only be specified once"));
                }
                nft_contract_id = Some(parse_contract_id(&raw)?);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    let network = match network_flag {
        None => {
            return Err(eyre!(
                "Select a network with --devnet, --testnet, or --local"
            ));
        }
        Some(NetworkFlag::Devnet) => client::NetworkTarget::Devnet {
            url: custom_url.unwrap_or_else(|| client::DEFAULT_DEVNET_RPC_URL.to_string()),
        },
        Some(NetworkFlag::Testnet) => client::NetworkTarget::Testnet {
            url: custom_url
                .unwrap_or_else(|| client::DEFAULT_TESTNET_RPC_URL.to_string()),
        },
        Some(NetworkFlag::Local) => client::NetworkTarget::LocalNode {
            url: custom_url.unwrap_or_else(|| client::DEFAULT_LOCAL_RPC_URL.to_string()),
        },
    };

    let wallet = wallet_name.ok_or_else(|| {
        eyre!("Specify --wallet <name> to select a forc-wallet profile")
    })?;
    let dir = wallets::resolve_wallet_dir(wallet_dir.as_deref())?;
    let wallets = client::WalletConfig::ForcKeystore { owner: wallet, dir };

    Ok(client::AppConfig {
        network,
        wallets,
        token_contract_id,
        nft_contract_id,
    })
}

fn parse_contract_id(raw: &str) -> Result<ContractId> {
    ContractId::from_str(raw).map_err(|e| eyre!("Invalid contract id '{raw}': {e}"))
}

/// The terminal is in raw mode while the app runs, so logs go to a rolling
/// file instead of stdout. `RUST_LOG` filters as usual.
fn init_logging() -> Result<WorkerGuard> {
    let file_appender = rolling::daily(".logs", "devtoken-app.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _log_guard = init_logging()?;
    tracing::info!("starting devtoken client");
    deployment::ensure_structure()?;
    let app_config = parse_cli_args()?;
    client::run_app(app_config).await
}
