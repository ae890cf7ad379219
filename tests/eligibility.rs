#![allow(non_snake_case)]
use devtoken_app::{
    client::{claimable_or_zero, count_unclaimed},
    state::claim_units,
    test_helpers::{FailPoint, FakeCall, FakeGateway},
};
use proptest::prelude::*;

#[tokio::test]
async fn count_unclaimed__counts_only_tokens_without_a_claim() {
    let gateway = FakeGateway::new();
    let owner = gateway.wallet_address();

    // given
    gateway.give_nft(7, true);
    gateway.give_nft(9, false);
    gateway.give_nft(12, true);

    // when
    let unclaimed = count_unclaimed(&gateway, owner).await.unwrap();

    // then
    assert_eq!(unclaimed, 1);
    assert_eq!(claim_units(unclaimed), 10);
}

#[tokio::test]
async fn count_unclaimed__zero_balance_issues_a_single_read() {
    let gateway = FakeGateway::new();
    let owner = gateway.wallet_address();

    let unclaimed = count_unclaimed(&gateway, owner).await.unwrap();

    assert_eq!(unclaimed, 0);
    assert_eq!(gateway.calls(), vec![FakeCall::NftBalanceOf]);
}

#[tokio::test]
async fn count_unclaimed__issues_dependent_reads_in_enumeration_order() {
    let gateway = FakeGateway::new();
    let owner = gateway.wallet_address();
    gateway.give_nft(40, false);
    gateway.give_nft(41, true);

    let unclaimed = count_unclaimed(&gateway, owner).await.unwrap();

    assert_eq!(unclaimed, 1);
    assert_eq!(
        gateway.calls(),
        vec![
            FakeCall::NftBalanceOf,
            FakeCall::NftTokenOfOwnerByIndex(0),
            FakeCall::TokenIdsClaimed(40),
            FakeCall::NftTokenOfOwnerByIndex(1),
            FakeCall::TokenIdsClaimed(41),
        ]
    );
}

#[tokio::test]
async fn count_unclaimed__propagates_a_failed_claim_flag_read() {
    let gateway = FakeGateway::new();
    let owner = gateway.wallet_address();
    gateway.give_nft(3, false);
    gateway.fail_at(FailPoint::TokenIdsClaimed);

    let result = count_unclaimed(&gateway, owner).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn claimable_or_zero__degrades_to_zero_at_any_failure_site() {
    for point in [
        FailPoint::NftBalance,
        FailPoint::NftTokenOfOwnerByIndex,
        FailPoint::TokenIdsClaimed,
    ] {
        let gateway = FakeGateway::new();
        let owner = gateway.wallet_address();
        // holdings that would otherwise yield a positive count
        gateway.give_nft(1, false);
        gateway.give_nft(2, false);
        gateway.fail_at(point);

        assert_eq!(claimable_or_zero(&gateway, owner).await, 0, "{point:?}");

        // the same holdings count normally once reads recover
        gateway.clear_failure();
        assert_eq!(claimable_or_zero(&gateway, owner).await, 2, "{point:?}");
    }
}

proptest! {
    #[test]
    fn count_matches_the_unclaimed_entries(claims in proptest::collection::vec(any::<bool>(), 0..12)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let gateway = FakeGateway::new();
            let owner = gateway.wallet_address();
            for (i, claimed) in claims.iter().enumerate() {
                gateway.give_nft(100 + i as u64, *claimed);
            }

            let expected = claims.iter().filter(|claimed| !**claimed).count() as u64;
            let unclaimed = count_unclaimed(&gateway, owner).await.unwrap();
            prop_assert_eq!(unclaimed, expected);
            Ok(())
        })?;
    }
}
