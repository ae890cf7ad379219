#![allow(non_snake_case)]
use devtoken_app::{
    SUPPORTED_CHAIN_ID,
    chain::WalletSession,
    state::{Affordance, PendingAction, select_affordance},
    test_helpers::addr,
};

fn session(is_owner: bool) -> WalletSession {
    WalletSession {
        address: addr(0x11),
        chain_id: SUPPORTED_CHAIN_ID,
        is_owner,
    }
}

#[test]
fn disconnected__always_offers_connect() {
    assert_eq!(
        select_affordance(None, PendingAction::None, 0),
        Affordance::Connect
    );
    // even a stale claimable count cannot surface an action without a session
    assert_eq!(
        select_affordance(None, PendingAction::None, 5),
        Affordance::Connect
    );
}

#[test]
fn pending_action__suppresses_every_other_affordance() {
    let owner = session(true);
    assert_eq!(
        select_affordance(Some(&owner), PendingAction::Minting, 5),
        Affordance::InProgress(PendingAction::Minting)
    );
    let holder = session(false);
    assert_eq!(
        select_affordance(Some(&holder), PendingAction::Claiming, 5),
        Affordance::InProgress(PendingAction::Claiming)
    );
}

#[test]
fn owner__sees_withdraw_even_with_claimable_tokens() {
    let owner = session(true);
    assert_eq!(
        select_affordance(Some(&owner), PendingAction::None, 5),
        Affordance::Withdraw
    );
}

#[test]
fn holder_with_unclaimed_nfts__sees_claim() {
    let holder = session(false);
    assert_eq!(
        select_affordance(Some(&holder), PendingAction::None, 3),
        Affordance::Claim { claimable: 3 }
    );
}

#[test]
fn holder_with_nothing_to_claim__sees_the_mint_form() {
    let holder = session(false);
    assert_eq!(
        select_affordance(Some(&holder), PendingAction::None, 0),
        Affordance::Mint
    );
}
