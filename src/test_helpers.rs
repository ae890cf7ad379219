//! Scripted [`Gateway`] used by the unit and integration tests. All chain
//! state lives in a shared handle so a test can keep inspecting and
//! mutating it after the controller takes ownership of the gateway.

use crate::{
    SUPPORTED_CHAIN_ID, TOKENS_PER_NFT,
    chain::{ChainError, Gateway, WalletSession},
};
use fuels::types::Address;
use std::{cell::RefCell, rc::Rc};

/// One sub-unit-scaled whole token.
pub const ONE_TOKEN: u64 = 1_000_000_000;

pub fn addr(byte: u8) -> Address {
    Address::new([byte; 32])
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FakeCall {
    Connect,
    NftBalanceOf,
    NftTokenOfOwnerByIndex(u64),
    TokenIdsClaimed(u64),
    TokenBalanceOf,
    TotalSupply,
    TokenOwner,
    Mint { amount: u64, payment: u64 },
    Claim,
    Withdraw,
}

impl FakeCall {
    pub fn is_read(self) -> bool {
        matches!(
            self,
            FakeCall::NftBalanceOf
                | FakeCall::NftTokenOfOwnerByIndex(_)
                | FakeCall::TokenIdsClaimed(_)
                | FakeCall::TokenBalanceOf
                | FakeCall::TotalSupply
                | FakeCall::TokenOwner
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailPoint {
    Connect,
    NftBalance,
    NftTokenOfOwnerByIndex,
    TokenIdsClaimed,
    TokenBalance,
    TotalSupply,
    TokenOwner,
    Mint,
    Claim,
    Withdraw,
}

#[derive(Debug)]
struct Inner {
    chain_id: u64,
    wallet: Address,
    token_owner: Address,
    /// Owned NFTs as `(token_id, claimed)` in enumeration order.
    nfts: Vec<(u64, bool)>,
    token_balance: u64,
    total_supply: u64,
    fail: Option<FailPoint>,
    calls: Vec<FakeCall>,
}

#[derive(Clone, Debug)]
pub struct FakeGateway {
    inner: Rc<RefCell<Inner>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                chain_id: SUPPORTED_CHAIN_ID,
                wallet: addr(0xAA),
                token_owner: addr(0xBB),
                nfts: Vec::new(),
                token_balance: 0,
                total_supply: 0,
                fail: None,
                calls: Vec::new(),
            })),
        }
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        self.inner.borrow_mut().chain_id = chain_id;
    }

    /// Make the connected wallet the token contract owner.
    pub fn make_owner(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.token_owner = inner.wallet;
    }

    pub fn give_nft(&self, token_id: u64, claimed: bool) {
        self.inner.borrow_mut().nfts.push((token_id, claimed));
    }

    pub fn set_token_balance(&self, balance: u64) {
        self.inner.borrow_mut().token_balance = balance;
    }

    pub fn set_total_supply(&self, supply: u64) {
        self.inner.borrow_mut().total_supply = supply;
    }

    pub fn fail_at(&self, point: FailPoint) {
        self.inner.borrow_mut().fail = Some(point);
    }

    pub fn clear_failure(&self) {
        self.inner.borrow_mut().fail = None;
    }

    pub fn wallet_address(&self) -> Address {
        self.inner.borrow().wallet
    }

    pub fn token_balance(&self) -> u64 {
        self.inner.borrow().token_balance
    }

    pub fn current_supply(&self) -> u64 {
        self.inner.borrow().total_supply
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    fn record(&self, call: FakeCall) {
        self.inner.borrow_mut().calls.push(call);
    }

    fn check(&self, point: FailPoint) -> Result<(), ChainError> {
        if self.inner.borrow().fail != Some(point) {
            return Ok(());
        }
        Err(match point {
            FailPoint::Connect => ChainError::Connect(String::from("injected")),
            FailPoint::Mint | FailPoint::Claim | FailPoint::Withdraw => {
                ChainError::Rejected(String::from("injected"))
            }
            _ => ChainError::Read(String::from("injected")),
        })
    }
}

impl Gateway for FakeGateway {
    async fn connect(&mut self) -> Result<WalletSession, ChainError> {
        self.record(FakeCall::Connect);
        self.check(FailPoint::Connect)?;
        let inner = self.inner.borrow();
        if inner.chain_id != SUPPORTED_CHAIN_ID {
            return Err(ChainError::WrongNetwork {
                expected: SUPPORTED_CHAIN_ID,
                actual: inner.chain_id,
            });
        }
        Ok(WalletSession {
            address: inner.wallet,
            chain_id: inner.chain_id,
            is_owner: false,
        })
    }

    async fn nft_balance_of(&self, owner: Address) -> Result<u64, ChainError> {
        self.record(FakeCall::NftBalanceOf);
        self.check(FailPoint::NftBalance)?;
        let inner = self.inner.borrow();
        if owner != inner.wallet {
            return Ok(0);
        }
        Ok(inner.nfts.len() as u64)
    }

    async fn nft_token_of_owner_by_index(
        &self,
        owner: Address,
        index: u64,
    ) -> Result<u64, ChainError> {
        self.record(FakeCall::NftTokenOfOwnerByIndex(index));
        self.check(FailPoint::NftTokenOfOwnerByIndex)?;
        let inner = self.inner.borrow();
        if owner != inner.wallet {
            return Err(ChainError::Read(String::from("owner holds no tokens")));
        }
        inner
            .nfts
            .get(index as usize)
            .map(|(token_id, _)| *token_id)
            .ok_or_else(|| ChainError::Read(format!("index {index} out of range")))
    }

    async fn token_ids_claimed(&self, token_id: u64) -> Result<bool, ChainError> {
        self.record(FakeCall::TokenIdsClaimed(token_id));
        self.check(FailPoint::TokenIdsClaimed)?;
        let inner = self.inner.borrow();
        Ok(inner
            .nfts
            .iter()
            .any(|(id, claimed)| *id == token_id && *claimed))
    }

    async fn token_balance_of(&self, account: Address) -> Result<u64, ChainError> {
        self.record(FakeCall::TokenBalanceOf);
        self.check(FailPoint::TokenBalance)?;
        let inner = self.inner.borrow();
        if account != inner.wallet {
            return Ok(0);
        }
        Ok(inner.token_balance)
    }

    async fn total_supply(&self) -> Result<u64, ChainError> {
        self.record(FakeCall::TotalSupply);
        self.check(FailPoint::TotalSupply)?;
        Ok(self.inner.borrow().total_supply)
    }

    async fn token_owner(&self) -> Result<Address, ChainError> {
        self.record(FakeCall::TokenOwner);
        self.check(FailPoint::TokenOwner)?;
        Ok(self.inner.borrow().token_owner)
    }

    async fn mint(&mut self, amount: u64, payment: u64) -> Result<(), ChainError> {
        self.record(FakeCall::Mint { amount, payment });
        self.check(FailPoint::Mint)?;
        let mut inner = self.inner.borrow_mut();
        let minted = amount.saturating_mul(ONE_TOKEN);
        inner.token_balance = inner.token_balance.saturating_add(minted);
        inner.total_supply = inner.total_supply.saturating_add(minted);
        Ok(())
    }

    async fn claim(&mut self) -> Result<(), ChainError> {
        self.record(FakeCall::Claim);
        self.check(FailPoint::Claim)?;
        let mut inner = self.inner.borrow_mut();
        let mut newly_claimed = 0u64;
        for (_, claimed) in inner.nfts.iter_mut() {
            if !*claimed {
                *claimed = true;
                newly_claimed += 1;
            }
        }
        let granted = newly_claimed
            .saturating_mul(TOKENS_PER_NFT)
            .saturating_mul(ONE_TOKEN);
        inner.token_balance = inner.token_balance.saturating_add(granted);
        inner.total_supply = inner.total_supply.saturating_add(granted);
        Ok(())
    }

    async fn withdraw(&mut self) -> Result<(), ChainError> {
        self.record(FakeCall::Withdraw);
        self.check(FailPoint::Withdraw)?;
        Ok(())
    }
}
