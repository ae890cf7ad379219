#![allow(non_snake_case)]
use devtoken_app::{
    client::AppController,
    state::PendingAction,
    test_helpers::{FailPoint, FakeCall, FakeGateway, ONE_TOKEN},
};

fn controller(gateway: &FakeGateway) -> AppController<FakeGateway> {
    AppController::new(gateway.clone())
}

#[tokio::test]
async fn connect__wrong_network_leaves_the_session_disconnected() {
    let gateway = FakeGateway::new();
    gateway.set_chain_id(9889);
    let mut app = controller(&gateway);

    app.connect().await;

    assert!(app.session().is_none());
    let snapshot = app.snapshot();
    assert!(
        snapshot.errors.iter().any(|e| e.contains("wrong network")),
        "{:?}",
        snapshot.errors
    );
    // one attempt, no retry
    assert_eq!(gateway.calls(), vec![FakeCall::Connect]);
}

#[tokio::test]
async fn connect__resolves_the_owner_flag_and_pulls_first_readouts() {
    let gateway = FakeGateway::new();
    gateway.make_owner();
    gateway.set_token_balance(5 * ONE_TOKEN);
    gateway.set_total_supply(123 * ONE_TOKEN);
    let mut app = controller(&gateway);

    app.connect().await;

    let session = app.session().unwrap();
    assert!(session.is_owner);
    assert_eq!(app.accounting().balance, u128::from(5 * ONE_TOKEN));
    assert_eq!(app.accounting().total_minted, u128::from(123 * ONE_TOKEN));
}

#[tokio::test]
async fn connect__owner_lookup_failure_defaults_to_non_owner() {
    let gateway = FakeGateway::new();
    gateway.make_owner();
    gateway.fail_at(FailPoint::TokenOwner);
    let mut app = controller(&gateway);

    app.connect().await;

    assert!(!app.session().unwrap().is_owner);
}

#[tokio::test]
async fn mint__success_refreshes_readouts_before_clearing_pending() {
    let gateway = FakeGateway::new();
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.clear_calls();

    app.mint(3).await;

    assert_eq!(app.pending(), PendingAction::None);
    // the refresh already observed the minted tokens
    assert_eq!(app.accounting().balance, u128::from(3 * ONE_TOKEN));
    let calls = gateway.calls();
    assert_eq!(
        calls[0],
        FakeCall::Mint {
            amount: 3,
            payment: 3_000_000
        }
    );
    assert!(
        calls[1..].iter().any(|c| c.is_read()),
        "expected readouts after the mint call: {calls:?}"
    );
}

#[tokio::test]
async fn mint__failure_clears_pending_without_a_refresh() {
    let gateway = FakeGateway::new();
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.fail_at(FailPoint::Mint);
    gateway.clear_calls();

    app.mint(2).await;

    assert_eq!(app.pending(), PendingAction::None);
    let snapshot = app.snapshot();
    assert!(snapshot.errors.iter().any(|e| e.contains("mint failed")));
    assert_eq!(
        gateway.calls(),
        vec![FakeCall::Mint {
            amount: 2,
            payment: 2_000_000
        }]
    );
}

#[tokio::test]
async fn mint__rejects_a_zero_amount_without_touching_the_chain() {
    let gateway = FakeGateway::new();
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.clear_calls();

    app.mint(0).await;

    assert!(gateway.calls().is_empty());
    let snapshot = app.snapshot();
    assert!(
        snapshot
            .errors
            .iter()
            .any(|e| e.contains("positive integer"))
    );
}

#[tokio::test]
async fn mint__rejects_an_amount_whose_payment_overflows() {
    let gateway = FakeGateway::new();
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.clear_calls();

    app.mint(u64::MAX).await;

    assert!(gateway.calls().is_empty());
    let snapshot = app.snapshot();
    assert!(snapshot.errors.iter().any(|e| e.contains("overflows")));
}

#[tokio::test]
async fn mint__connects_on_demand_when_disconnected() {
    let gateway = FakeGateway::new();
    let mut app = controller(&gateway);

    app.mint(1).await;

    let calls = gateway.calls();
    assert_eq!(calls[0], FakeCall::Connect);
    assert!(calls.contains(&FakeCall::Mint {
        amount: 1,
        payment: 1_000_000
    }));
}

#[tokio::test]
async fn mint__aborts_when_the_on_demand_connect_fails() {
    let gateway = FakeGateway::new();
    gateway.set_chain_id(1);
    let mut app = controller(&gateway);

    app.mint(1).await;

    let calls = gateway.calls();
    assert_eq!(calls, vec![FakeCall::Connect]);
    assert_eq!(app.pending(), PendingAction::None);
}

#[tokio::test]
async fn claim__marks_holdings_claimed_and_credits_the_balance() {
    let gateway = FakeGateway::new();
    gateway.give_nft(1, false);
    gateway.give_nft(2, false);
    let mut app = controller(&gateway);
    app.connect().await;
    assert_eq!(app.claimable(), 2);

    app.claim().await;

    assert_eq!(app.pending(), PendingAction::None);
    assert_eq!(app.claimable(), 0);
    assert_eq!(app.accounting().balance, u128::from(20 * ONE_TOKEN));
}

#[tokio::test]
async fn claim__failure_keeps_the_claimable_count() {
    let gateway = FakeGateway::new();
    gateway.give_nft(1, false);
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.fail_at(FailPoint::Claim);

    app.claim().await;

    assert_eq!(app.claimable(), 1);
    let snapshot = app.snapshot();
    assert!(snapshot.errors.iter().any(|e| e.contains("claim failed")));
}

#[tokio::test]
async fn withdraw__is_refused_for_non_owners() {
    let gateway = FakeGateway::new();
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.clear_calls();

    app.withdraw().await;

    assert!(!gateway.calls().contains(&FakeCall::Withdraw));
    let snapshot = app.snapshot();
    assert!(
        snapshot
            .errors
            .iter()
            .any(|e| e.contains("contract owner"))
    );
}

#[tokio::test]
async fn withdraw__runs_for_the_owner_and_refreshes() {
    let gateway = FakeGateway::new();
    gateway.make_owner();
    let mut app = controller(&gateway);
    app.connect().await;
    gateway.clear_calls();

    app.withdraw().await;

    assert_eq!(app.pending(), PendingAction::None);
    let calls = gateway.calls();
    assert_eq!(calls[0], FakeCall::Withdraw);
    assert!(calls[1..].iter().any(|c| c.is_read()));
}
