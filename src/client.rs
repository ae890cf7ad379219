use crate::{
    chain::{
        ChainError,
        FuelGateway,
        Gateway,
        GatewayConfig,
        WalletSession,
    },
    deployment::DeploymentEnv,
    state::{
        Affordance,
        PendingAction,
        TokenAccounting,
        mint_payment,
        select_affordance,
    },
    ui,
};
use color_eyre::eyre::Result;
use fuels::{
    prelude::ContractId,
    types::Address,
};
use std::{
    path::PathBuf,
    time::Duration,
};
use tokio::time;
use tracing::warn;

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet.fuel.network";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://devnet.fuel.network";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:4000/";

const ERROR_HISTORY_DEPTH: usize = 50;
const ERRORS_SHOWN: usize = 5;

#[derive(Clone, Debug)]
pub enum NetworkTarget {
    Testnet { url: String },
    Devnet { url: String },
    LocalNode { url: String },
}

#[derive(Clone, Debug)]
pub enum WalletConfig {
    ForcKeystore { owner: String, dir: PathBuf },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub network: NetworkTarget,
    pub wallets: WalletConfig,
    pub token_contract_id: Option<ContractId>,
    pub nft_contract_id: Option<ContractId>,
}

/// Everything the UI needs for one render, copied out of the controller.
#[derive(Clone, Debug)]
pub struct AppSnapshot {
    pub session: Option<WalletSession>,
    pub pending: PendingAction,
    pub claimable: u64,
    pub accounting: TokenAccounting,
    pub affordance: Affordance,
    pub status: String,
    pub errors: Vec<String>,
}

/// Count NFTs held by `owner` with no claim recorded yet: one NFT balance
/// read, then two dependent reads per index (owned index -> token id ->
/// claim flag), issued sequentially. Correct only if the enumeration is
/// stable for the duration of the pass; any read error aborts the whole
/// scan.
pub async fn count_unclaimed<G: Gateway>(
    gateway: &G,
    owner: Address,
) -> Result<u64, ChainError> {
    let balance = gateway.nft_balance_of(owner).await?;
    let mut unclaimed = 0u64;
    for index in 0..balance {
        let token_id = gateway.nft_token_of_owner_by_index(owner, index).await?;
        if !gateway.token_ids_claimed(token_id).await? {
            unclaimed += 1;
        }
    }
    Ok(unclaimed)
}

/// Fail-safe boundary around [`count_unclaimed`]: eligibility feeds the
/// display only, so a failed scan degrades to zero claimable instead of
/// propagating, discarding any partial count.
pub async fn claimable_or_zero<G: Gateway>(gateway: &G, owner: Address) -> u64 {
    match count_unclaimed(gateway, owner).await {
        Ok(count) => count,
        Err(err) => {
            warn!(%err, "eligibility scan failed; treating as zero claimable");
            0
        }
    }
}

pub struct AppController<G> {
    gateway: G,
    session: Option<WalletSession>,
    pending: PendingAction,
    claimable: u64,
    accounting: TokenAccounting,
    status: String,
    errors: Vec<String>,
}

impl<G: Gateway> AppController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            session: None,
            pending: PendingAction::None,
            claimable: 0,
            accounting: TokenAccounting::default(),
            status: String::from("Not connected"),
            errors: Vec::new(),
        }
    }

    pub fn session(&self) -> Option<&WalletSession> {
        self.session.as_ref()
    }

    pub fn pending(&self) -> PendingAction {
        self.pending
    }

    pub fn claimable(&self) -> u64 {
        self.claimable
    }

    pub fn accounting(&self) -> TokenAccounting {
        self.accounting
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            session: self.session,
            pending: self.pending,
            claimable: self.claimable,
            accounting: self.accounting,
            affordance: select_affordance(
                self.session.as_ref(),
                self.pending,
                self.claimable,
            ),
            status: self.status.clone(),
            errors: self.errors.iter().rev().take(ERRORS_SHOWN).cloned().collect(),
        }
    }

    /// Establish a session: acquire a handle through the network guard,
    /// resolve ownership, then pull a first set of readouts. A wrong-network
    /// node leaves the session disconnected and is not retried.
    pub async fn connect(&mut self) {
        match self.gateway.connect().await {
            Ok(mut session) => {
                match self.gateway.token_owner().await {
                    Ok(owner) => session.is_owner = owner == session.address,
                    Err(err) => {
                        warn!(%err, "owner lookup failed; assuming non-owner");
                    }
                }
                self.session = Some(session);
                self.status = format!("Connected as 0x{}", short_hex(&session.address));
                self.refresh().await;
            }
            Err(err) => {
                self.session = None;
                self.status = String::from("Not connected");
                self.push_error(format!("connect failed: {err}"));
            }
        }
    }

    /// Refresh the advisory readouts (balance, minted supply, eligibility).
    /// Read failures degrade to zero locally; they never block the UI.
    pub async fn refresh(&mut self) {
        let Some(session) = self.session else {
            self.claimable = 0;
            self.accounting = TokenAccounting::default();
            return;
        };
        self.accounting.balance = match self.gateway.token_balance_of(session.address).await
        {
            Ok(balance) => u128::from(balance),
            Err(err) => {
                warn!(%err, "token balance read failed; showing zero");
                0
            }
        };
        self.accounting.total_minted = match self.gateway.total_supply().await {
            Ok(supply) => u128::from(supply),
            Err(err) => {
                warn!(%err, "total supply read failed; showing zero");
                0
            }
        };
        self.claimable = claimable_or_zero(&self.gateway, session.address).await;
    }

    /// Mint `amount` whole tokens against a payment of 0.001 units each.
    pub async fn mint(&mut self, amount: u64) {
        if !self.can_start_action() {
            return;
        }
        if amount == 0 {
            self.push_error(String::from("mint amount must be a positive integer"));
            return;
        }
        let Some(payment) = mint_payment(amount) else {
            self.push_error(format!("mint amount {amount} overflows the payment"));
            return;
        };
        if self.ensure_session().await.is_none() {
            return;
        }
        self.pending = PendingAction::Minting;
        match self.gateway.mint(amount, payment).await {
            Ok(()) => {
                self.refresh().await;
                self.pending = PendingAction::None;
                self.status = format!("Minted {amount} token(s)");
            }
            Err(err) => {
                self.pending = PendingAction::None;
                self.push_error(format!("mint failed: {err}"));
            }
        }
    }

    /// Claim the free tokens for every unclaimed NFT held by this wallet.
    pub async fn claim(&mut self) {
        if !self.can_start_action() {
            return;
        }
        if self.ensure_session().await.is_none() {
            return;
        }
        self.pending = PendingAction::Claiming;
        match self.gateway.claim().await {
            Ok(()) => {
                self.refresh().await;
                self.pending = PendingAction::None;
                self.status = String::from("Claimed tokens");
            }
            Err(err) => {
                self.pending = PendingAction::None;
                self.push_error(format!("claim failed: {err}"));
            }
        }
    }

    /// Withdraw accumulated mint payments; owner only.
    pub async fn withdraw(&mut self) {
        if !self.can_start_action() {
            return;
        }
        let Some(session) = self.ensure_session().await else {
            return;
        };
        if !session.is_owner {
            self.push_error(String::from(
                "withdraw is only available to the contract owner",
            ));
            return;
        }
        self.pending = PendingAction::Withdrawing;
        match self.gateway.withdraw().await {
            Ok(()) => {
                self.refresh().await;
                self.pending = PendingAction::None;
                self.status = String::from("Withdrew contract funds");
            }
            Err(err) => {
                self.pending = PendingAction::None;
                self.push_error(format!("withdraw failed: {err}"));
            }
        }
    }

    fn can_start_action(&mut self) -> bool {
        if self.pending != PendingAction::None {
            self.push_error(format!(
                "another action is still {}; wait for it to confirm",
                self.pending.label()
            ));
            return false;
        }
        true
    }

    async fn ensure_session(&mut self) -> Option<WalletSession> {
        if self.session.is_none() {
            self.connect().await;
        }
        self.session
    }

    fn push_error(&mut self, message: String) {
        tracing::error!("{message}");
        self.errors.push(message);
        if self.errors.len() > ERROR_HISTORY_DEPTH {
            let drain = self.errors.len() - ERROR_HISTORY_DEPTH;
            self.errors.drain(0..drain);
        }
    }
}

fn short_hex(address: &Address) -> String {
    let hex = hex::encode(**address);
    format!("{}..{}", &hex[..6], &hex[hex.len() - 4..])
}

fn gateway_config(config: &AppConfig) -> GatewayConfig {
    let (env, rpc_url) = match &config.network {
        NetworkTarget::Testnet { url } => (DeploymentEnv::Test, url.clone()),
        NetworkTarget::Devnet { url } => (DeploymentEnv::Dev, url.clone()),
        NetworkTarget::LocalNode { url } => (DeploymentEnv::Local, url.clone()),
    };
    let WalletConfig::ForcKeystore { owner, dir } = &config.wallets;
    GatewayConfig {
        rpc_url,
        env,
        wallet_name: owner.clone(),
        wallet_dir: dir.clone(),
        token_contract_id: config.token_contract_id,
        nft_contract_id: config.nft_contract_id,
    }
}

pub async fn run_app(config: AppConfig) -> Result<()> {
    let gateway = FuelGateway::new(gateway_config(&config));
    let mut controller = AppController::new(gateway);
    let mut ui_state = ui::UiState::default();

    ui::terminal_enter(&mut ui_state)?;
    let res = run_loop(&mut controller, &mut ui_state).await;
    ui::terminal_exit()?;
    res
}

async fn run_loop<G: Gateway>(
    controller: &mut AppController<G>,
    ui_state: &mut ui::UiState,
) -> Result<()> {
    let mut ticker = time::interval(Duration::from_millis(1000));
    let mut last_snapshot = controller.snapshot();
    ui::draw(ui_state, &last_snapshot)?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => { break; }
            _ = ticker.tick() => {
                // Advisory refresh only; while an action is in flight the
                // next refresh comes from its confirmation path.
                if controller.session().is_some()
                    && controller.pending() == PendingAction::None
                {
                    controller.refresh().await;
                }
                last_snapshot = controller.snapshot();
                ui::draw(ui_state, &last_snapshot)?;
            }
            ev = ui::next_event(ui_state) => {
                match ev? {
                    ui::UserEvent::Quit => break,
                    ui::UserEvent::Connect => controller.connect().await,
                    ui::UserEvent::ConfirmMint(amount) => controller.mint(amount).await,
                    ui::UserEvent::Claim => controller.claim().await,
                    ui::UserEvent::Withdraw => controller.withdraw().await,
                    ui::UserEvent::OpenMintModal | ui::UserEvent::Redraw => {
                        // UI-only update; redraw without hitting the chain.
                        ui::draw(ui_state, &last_snapshot)?;
                        continue;
                    }
                }
                last_snapshot = controller.snapshot();
                ui::draw(ui_state, &last_snapshot)?;
            }
        }
    }
    Ok(())
}
