//! Settlement-flow tests: the full winner-selection state machine against
//! the in-memory store and the recording settlement double.

mod common;

use common::*;
use stallion_client::{
    ChainError,
    Error,
};
use stallion_utils::{
    BountyStatus,
    Distribution,
    SubmissionStatus,
};

#[tokio::test]
async fn settles_and_completes_the_bounty() {
    let h = harness();
    seed_bounty(&h.store, &bounty(1, sixty_thirty_ten(), future_deadline())).await;
    h.client
        .submissions()
        .record(submission("s-a", 1, "G_A"))
        .await
        .unwrap();

    let records = h
        .client
        .select_winners(1, "G_OWNER", &addresses(&["G_A", "G_B", "G_C"]))
        .await
        .unwrap();

    // 1000 minus the 5% fee leaves 950, split 60/30/10.
    let amounts: Vec<i128> = records.iter().map(|r| r.reward_amount).collect();
    assert_eq!(amounts, vec![570, 285, 95]);
    assert_eq!(records[0].applicant_address, "G_A");
    assert_eq!(records[2].position, 3);
    assert_eq!(h.chain.select_calls(), 1);

    let doc = stored_bounty(&h.store, 1).await;
    assert_eq!(doc["status"], "COMPLETED");
    assert_eq!(doc["winners"][1]["applicantAddress"], "G_B");
    assert_eq!(doc["version"], 1);

    // The winning applicant's submission was marked as bookkeeping.
    let subs = h.client.submissions().list(1).await.unwrap();
    assert_eq!(subs[0].status, SubmissionStatus::Accepted);
}

#[tokio::test]
async fn position_order_is_preserved_for_unsorted_tables() {
    let h = harness();
    let dist = vec![
        Distribution::new(3, 10.0),
        Distribution::new(1, 60.0),
        Distribution::new(2, 30.0),
    ];
    seed_bounty(&h.store, &bounty(2, dist, future_deadline())).await;

    let records = h
        .client
        .select_winners(2, "G_OWNER", &addresses(&["G_A", "G_B", "G_C"]))
        .await
        .unwrap();

    assert_eq!(
        records
            .iter()
            .map(|r| (r.position, r.applicant_address.as_str()))
            .collect::<Vec<_>>(),
        vec![(1, "G_A"), (2, "G_B"), (3, "G_C")]
    );
}

#[tokio::test]
async fn rejects_non_owner_without_touching_the_chain() {
    let h = harness();
    seed_bounty(&h.store, &bounty(3, sixty_thirty_ten(), future_deadline())).await;

    let err = h
        .client
        .select_winners(3, "G_NOT_OWNER", &addresses(&["G_A", "G_B", "G_C"]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotOwner));
    assert_eq!(err.to_string(), "Only the bounty owner can select winners");
    assert_eq!(err.status_code(), 403);
    assert_eq!(h.chain.select_calls(), 0);
    assert_eq!(stored_bounty(&h.store, 3).await["status"], "OPEN");
}

#[tokio::test]
async fn rejects_position_gap_before_the_chain() {
    let h = harness();
    let dist = vec![Distribution::new(1, 50.0), Distribution::new(3, 50.0)];
    seed_bounty(&h.store, &bounty(4, dist, future_deadline())).await;

    let err = h
        .client
        .select_winners(4, "G_OWNER", &addresses(&["G_A", "G_B"]))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Distribution positions must be sequential starting from 1"
    );
    assert_eq!(h.chain.select_calls(), 0);
}

#[tokio::test]
async fn rejects_winner_count_mismatch() {
    let h = harness();
    seed_bounty(&h.store, &bounty(5, sixty_thirty_ten(), future_deadline())).await;

    let err = h
        .client
        .select_winners(5, "G_OWNER", &addresses(&["G_A"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::WinnerCountMismatch {
            expected: 3,
            got: 1
        }
    ));
    assert_eq!(h.chain.select_calls(), 0);
}

#[tokio::test]
async fn rejects_missing_input() {
    let h = harness();
    seed_bounty(&h.store, &bounty(6, sixty_thirty_ten(), future_deadline())).await;

    let err = h.client.select_winners(6, "", &addresses(&["G_A"])).await;
    assert!(matches!(err, Err(Error::MissingInput)));
    let err = h.client.select_winners(6, "G_OWNER", &[]).await;
    assert!(matches!(err, Err(Error::MissingInput)));
    assert_eq!(h.chain.select_calls(), 0);
}

#[tokio::test]
async fn unknown_bounty_is_not_found() {
    let h = harness();
    let err = h
        .client
        .select_winners(99, "G_OWNER", &addresses(&["G_A"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BountyNotFound(99)));
    assert_eq!(err.to_string(), "Bounty not found");
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn second_selection_is_rejected_without_a_second_payout() {
    let h = harness();
    seed_bounty(&h.store, &bounty(7, sixty_thirty_ten(), future_deadline())).await;
    let winners = addresses(&["G_A", "G_B", "G_C"]);

    h.client
        .select_winners(7, "G_OWNER", &winners)
        .await
        .unwrap();
    let err = h
        .client
        .select_winners(7, "G_OWNER", &winners)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidState {
            status: BountyStatus::Completed
        }
    ));
    assert_eq!(h.chain.select_calls(), 1);
}

#[tokio::test]
async fn expired_bounty_cannot_be_settled() {
    let h = harness();
    seed_bounty(&h.store, &bounty(8, sixty_thirty_ten(), past_deadline())).await;

    let err = h
        .client
        .select_winners(8, "G_OWNER", &addresses(&["G_A", "G_B", "G_C"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidState {
            status: BountyStatus::Completed
        }
    ));
    assert_eq!(h.chain.select_calls(), 0);
}

#[tokio::test]
async fn chain_failure_leaves_the_store_untouched_and_is_retryable() {
    let h = harness();
    seed_bounty(&h.store, &bounty(9, sixty_thirty_ten(), future_deadline())).await;
    let winners = addresses(&["G_A", "G_B", "G_C"]);
    h.chain.fail_select_with(ChainError::Declined);

    let err = h
        .client
        .select_winners(9, "G_OWNER", &winners)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Chain(ChainError::Declined)));
    let doc = stored_bounty(&h.store, 9).await;
    assert_eq!(doc["status"], "OPEN");
    assert!(doc.get("winners").is_none());

    // Nothing was committed, so the identical call goes through.
    let records = h
        .client
        .select_winners(9, "G_OWNER", &winners)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(h.chain.select_calls(), 2);
    assert_eq!(stored_bounty(&h.store, 9).await["status"], "COMPLETED");
}

#[tokio::test]
async fn store_failure_after_payout_still_returns_records_and_self_heals() {
    let h = harness();
    seed_bounty(&h.store, &bounty(10, sixty_thirty_ten(), future_deadline())).await;
    h.store.fail_next_update();

    let records = h
        .client
        .select_winners(10, "G_OWNER", &addresses(&["G_A", "G_B", "G_C"]))
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    // The write was dropped, the store still says OPEN.
    assert_eq!(stored_bounty(&h.store, 10).await["status"], "OPEN");

    // The next read notices the settled contract and heals the mirror.
    let healed = h.client.bounty(10).await.unwrap();
    assert_eq!(healed.status, BountyStatus::Completed);
    assert_eq!(healed.winners.as_ref().unwrap().len(), 3);
    assert_eq!(stored_bounty(&h.store, 10).await["status"], "COMPLETED");
}

#[tokio::test]
async fn read_path_reconciles_an_externally_settled_bounty() {
    let h = harness();
    seed_bounty(&h.store, &bounty(11, sixty_thirty_ten(), future_deadline())).await;
    h.chain
        .settle_directly(11, addresses(&["G_A", "G_B", "G_C"]));

    let bounty = h.client.bounty(11).await.unwrap();
    assert_eq!(bounty.status, BountyStatus::Completed);
    let winners = bounty.winners.unwrap();
    assert_eq!(winners[0].reward_amount, 570);
    assert_eq!(stored_bounty(&h.store, 11).await["status"], "COMPLETED");
}

#[tokio::test]
async fn first_reader_persists_expiry() {
    let h = harness();
    seed_bounty(&h.store, &bounty(12, sixty_thirty_ten(), past_deadline())).await;

    let read = h.client.bounty(12).await.unwrap();
    assert_eq!(read.status, BountyStatus::Completed);
    let doc = stored_bounty(&h.store, 12).await;
    assert_eq!(doc["status"], "COMPLETED");
    assert_eq!(doc["version"], 1);
}

#[tokio::test]
async fn cancelled_bounty_stays_cancelled_past_its_deadline() {
    let h = harness();
    let mut b = bounty(13, sixty_thirty_ten(), past_deadline());
    b.status = BountyStatus::Cancelled;
    seed_bounty(&h.store, &b).await;

    let read = h.client.bounty(13).await.unwrap();
    assert_eq!(read.status, BountyStatus::Cancelled);

    let err = h
        .client
        .select_winners(13, "G_OWNER", &addresses(&["G_A", "G_B", "G_C"]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidState {
            status: BountyStatus::Cancelled
        }
    ));
}
