use crate::{
    SUPPORTED_CHAIN_ID,
    deployment::{
        DeploymentEnv,
        DeploymentStore,
    },
    nft_types,
    token_types,
    wallets,
};
use fuels::{
    accounts::ViewOnlyAccount,
    prelude::{
        AssetId,
        CallParameters,
        ContractId,
        Execution,
        Provider,
        TxPolicies,
        VariableOutputPolicy,
        Wallet,
    },
    types::{
        Address,
        Bits256,
    },
};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_SAFE_SCRIPT_GAS_LIMIT: u64 = 29_000_000;
const FORWARDED_GAS: u64 = 1_000_000;

/// Error surface of everything behind the [`Gateway`] seam.
///
/// `WrongNetwork` and `Rejected` are user-correctable and never retried
/// automatically; `Read` feeds advisory display values and is expected to
/// degrade to zero at the caller.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ChainError {
    #[error("wrong network: this build only supports chain id {expected}, node reports {actual}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("not connected")]
    NotConnected,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transaction rejected or reverted: {0}")]
    Rejected(String),
    #[error("read failed: {0}")]
    Read(String),
}

/// Identity established by a successful connect. Dropped (reset to `None`
/// in the controller) on any network mismatch; never persisted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WalletSession {
    pub address: Address,
    pub chain_id: u64,
    pub is_owner: bool,
}

/// The fixed call interface through which the controller sees the chain.
/// The deployed contracts are opaque collaborators: the controller only
/// reads them and triggers transactions, all durable state lives on-chain.
pub trait Gateway {
    /// Acquire a handle: validate the active chain id, unlock the signer.
    /// Fails with [`ChainError::WrongNetwork`] on a mismatched node; that
    /// failure is surfaced to the user and never retried automatically.
    async fn connect(&mut self) -> Result<WalletSession, ChainError>;

    async fn nft_balance_of(&self, owner: Address) -> Result<u64, ChainError>;
    async fn nft_token_of_owner_by_index(
        &self,
        owner: Address,
        index: u64,
    ) -> Result<u64, ChainError>;
    async fn token_ids_claimed(&self, token_id: u64) -> Result<bool, ChainError>;

    async fn token_balance_of(&self, account: Address) -> Result<u64, ChainError>;
    async fn total_supply(&self) -> Result<u64, ChainError>;
    async fn token_owner(&self) -> Result<Address, ChainError>;

    /// Mint `amount` whole tokens, forwarding `payment` base-asset
    /// sub-units with the call.
    async fn mint(&mut self, amount: u64, payment: u64) -> Result<(), ChainError>;
    async fn claim(&mut self) -> Result<(), ChainError>;
    async fn withdraw(&mut self) -> Result<(), ChainError>;
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub rpc_url: String,
    pub env: DeploymentEnv,
    pub wallet_name: String,
    pub wallet_dir: PathBuf,
    pub token_contract_id: Option<ContractId>,
    pub nft_contract_id: Option<ContractId>,
}

struct Contracts {
    token: token_types::DevToken<Wallet>,
    nft: nft_types::DevsNft<Wallet>,
    address: Address,
    base_asset_id: AssetId,
    safe_script_gas_limit: u64,
}

/// Production [`Gateway`] backed by a Fuel node and a forc-wallet profile.
pub struct FuelGateway {
    config: GatewayConfig,
    contracts: Option<Contracts>,
}

impl FuelGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            contracts: None,
        }
    }

    fn contracts(&self) -> Result<&Contracts, ChainError> {
        self.contracts.as_ref().ok_or(ChainError::NotConnected)
    }

    fn policies(&self, contracts: &Contracts) -> TxPolicies {
        TxPolicies::default().with_script_gas_limit(contracts.safe_script_gas_limit)
    }

    /// Resolve the contract ids from explicit overrides or the latest
    /// deployment record for the configured environment.
    fn resolve_contract_ids(&self) -> Result<(ContractId, ContractId), ChainError> {
        if let (Some(token), Some(nft)) =
            (self.config.token_contract_id, self.config.nft_contract_id)
        {
            return Ok((token, nft));
        }
        let store = DeploymentStore::new(self.config.env)
            .map_err(|e| ChainError::Connect(e.to_string()))?;
        let record = store
            .latest()
            .map_err(|e| ChainError::Connect(e.to_string()))?
            .ok_or_else(|| {
                ChainError::Connect(format!(
                    "no deployment recorded for {}; pass --token-contract-id/--nft-contract-id",
                    self.config.env
                ))
            })?;
        let token = self.config.token_contract_id.map(Ok).unwrap_or_else(|| {
            record.token_contract_id.parse::<ContractId>().map_err(|e| {
                ChainError::Connect(format!("stored token contract id is invalid: {e:?}"))
            })
        })?;
        let nft = self.config.nft_contract_id.map(Ok).unwrap_or_else(|| {
            record.nft_contract_id.parse::<ContractId>().map_err(|e| {
                ChainError::Connect(format!("stored NFT contract id is invalid: {e:?}"))
            })
        })?;
        Ok((token, nft))
    }
}

impl Gateway for FuelGateway {
    async fn connect(&mut self) -> Result<WalletSession, ChainError> {
        if let Some(contracts) = self.contracts.as_ref() {
            return Ok(WalletSession {
                address: contracts.address,
                chain_id: SUPPORTED_CHAIN_ID,
                is_owner: false,
            });
        }

        let url = self.config.rpc_url.clone();
        tracing::info!(%url, "connecting to provider");
        let provider = Provider::connect(&url)
            .await
            .map_err(|e| ChainError::Connect(format!("{url}: {e}")))?;

        let consensus_parameters = provider
            .consensus_parameters()
            .await
            .map_err(|e| ChainError::Connect(e.to_string()))?;
        let chain_id: u64 = consensus_parameters.chain_id().into();
        if chain_id != SUPPORTED_CHAIN_ID {
            tracing::warn!(chain_id, "node is on an unsupported network");
            return Err(ChainError::WrongNetwork {
                expected: SUPPORTED_CHAIN_ID,
                actual: chain_id,
            });
        }
        let base_asset_id = *consensus_parameters.base_asset_id();
        let max_gas_per_tx = consensus_parameters.tx_params().max_gas_per_tx();
        let safe_script_gas_limit = max_gas_per_tx
            .saturating_sub(1)
            .clamp(1, DEFAULT_SAFE_SCRIPT_GAS_LIMIT);

        let (token_id, nft_id) = self.resolve_contract_ids()?;

        // Unlocking prompts for the keystore password; that dialog is the
        // user-approval step and is outside this controller's control.
        let descriptor =
            wallets::find_wallet(&self.config.wallet_dir, &self.config.wallet_name)
                .map_err(|e| ChainError::Connect(e.to_string()))?;
        let wallet = wallets::unlock_wallet(&descriptor, &provider)
            .map_err(|e| ChainError::Connect(e.to_string()))?;
        let address = wallet.address();

        self.contracts = Some(Contracts {
            token: token_types::DevToken::new(token_id, wallet.clone()),
            nft: nft_types::DevsNft::new(nft_id, wallet),
            address,
            base_asset_id,
            safe_script_gas_limit,
        });
        tracing::info!(%address, chain_id, "connected");

        Ok(WalletSession {
            address,
            chain_id,
            is_owner: false,
        })
    }

    async fn nft_balance_of(&self, owner: Address) -> Result<u64, ChainError> {
        let contracts = self.contracts()?;
        contracts
            .nft
            .methods()
            .balance_of(Bits256(*owner))
            .with_tx_policies(self.policies(contracts))
            .simulate(Execution::realistic())
            .await
            .map(|r| r.value)
            .map_err(|e| ChainError::Read(e.to_string()))
    }

    async fn nft_token_of_owner_by_index(
        &self,
        owner: Address,
        index: u64,
    ) -> Result<u64, ChainError> {
        let contracts = self.contracts()?;
        contracts
            .nft
            .methods()
            .token_of_owner_by_index(Bits256(*owner), index)
            .with_tx_policies(self.policies(contracts))
            .simulate(Execution::realistic())
            .await
            .map(|r| r.value)
            .map_err(|e| ChainError::Read(e.to_string()))
    }

    async fn token_ids_claimed(&self, token_id: u64) -> Result<bool, ChainError> {
        let contracts = self.contracts()?;
        contracts
            .token
            .methods()
            .token_ids_claimed(token_id)
            .with_tx_policies(self.policies(contracts))
            .simulate(Execution::realistic())
            .await
            .map(|r| r.value)
            .map_err(|e| ChainError::Read(e.to_string()))
    }

    async fn token_balance_of(&self, account: Address) -> Result<u64, ChainError> {
        let contracts = self.contracts()?;
        contracts
            .token
            .methods()
            .balance_of(Bits256(*account))
            .with_tx_policies(self.policies(contracts))
            .simulate(Execution::realistic())
            .await
            .map(|r| r.value)
            .map_err(|e| ChainError::Read(e.to_string()))
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        let contracts = self.contracts()?;
        contracts
            .token
            .methods()
            .total_supply()
            .with_tx_policies(self.policies(contracts))
            .simulate(Execution::realistic())
            .await
            .map(|r| r.value)
            .map_err(|e| ChainError::Read(e.to_string()))
    }

    async fn token_owner(&self) -> Result<Address, ChainError> {
        let contracts = self.contracts()?;
        contracts
            .token
            .methods()
            .owner()
            .with_tx_policies(self.policies(contracts))
            .simulate(Execution::realistic())
            .await
            .map(|r| Address::new(r.value.0))
            .map_err(|e| ChainError::Read(e.to_string()))
    }

    async fn mint(&mut self, amount: u64, payment: u64) -> Result<(), ChainError> {
        let contracts = self.contracts()?;
        let call_params =
            CallParameters::new(payment, contracts.base_asset_id, FORWARDED_GAS);
        contracts
            .token
            .methods()
            .mint(amount)
            .with_tx_policies(self.policies(contracts))
            .call_params(call_params)
            .map_err(|e| ChainError::Rejected(e.to_string()))?
            .call()
            .await
            .map(|_| ())
            .map_err(|e| ChainError::Rejected(e.to_string()))
    }

    async fn claim(&mut self) -> Result<(), ChainError> {
        let contracts = self.contracts()?;
        contracts
            .token
            .methods()
            .claim()
            .with_tx_policies(self.policies(contracts))
            .call()
            .await
            .map(|_| ())
            .map_err(|e| ChainError::Rejected(e.to_string()))
    }

    async fn withdraw(&mut self) -> Result<(), ChainError> {
        let contracts = self.contracts()?;
        contracts
            .token
            .methods()
            .withdraw()
            .with_tx_policies(self.policies(contracts))
            .with_variable_output_policy(VariableOutputPolicy::EstimateMinimum)
            .call()
            .await
            .map(|_| ())
            .map_err(|e| ChainError::Rejected(e.to_string()))
    }
}
