//! Concurrent settlement tests.
//!
//! These verify that:
//! - Racing settlements of one obligation pay it exactly once
//! - A payer whose balance covers one job cannot be drawn into the negative
//!   by settling several jobs at once
//! - Opposite-direction settlements between the same two accounts both finish
//! - With several pooled connections, transactions that lose the race fail
//!   with a business error or a retryable store error, never a second write

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Barrier;

mod common;

use common::{account, balance, obligation, payee, payer, pooled_setup, relationship, setup};
use settle_db::entities::sea_orm_active_enums::{AccountKind, RelationshipStatus};
use settle_db::{PaymentError, SettledObligation, SettlementEngine};
use settle_shared::types::{AccountId, Money, ObligationId};

/// Runs every `(obligation, acting)` settlement at the same time.
async fn settle_all(
    engine: &SettlementEngine,
    jobs: Vec<(ObligationId, AccountId)>,
) -> Vec<Result<SettledObligation, PaymentError>> {
    let barrier = Arc::new(Barrier::new(jobs.len()));

    let handles = jobs.into_iter().map(|(job, acting)| {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            engine.settle_obligation(job, acting).await
        })
    });

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("Settlement task panicked"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_settlements_pay_once() {
    let db = setup().await;
    let harry = payer(&db, "Harry Potter", 1_000).await;
    let builder = payee(&db, "Bob Builder", "carpenter").await;
    let rel = relationship(&db, harry, builder, RelationshipStatus::Active).await;
    let job = obligation(&db, rel, 150).await;
    let engine = SettlementEngine::new(db.clone());

    let results = settle_all(&engine, vec![(job, harry); 8]).await;

    let settled = results.iter().filter(|r| r.is_ok()).count();
    let already = results
        .iter()
        .filter(|r| matches!(r, Err(PaymentError::AlreadySettled(_))))
        .count();
    assert_eq!(settled, 1);
    assert_eq!(already, 7);

    assert_eq!(balance(&db, harry).await, Money::from_minor(850));
    assert_eq!(balance(&db, builder).await, Money::from_minor(150));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_settlements_never_overdraw() {
    let db = setup().await;
    let harry = payer(&db, "Harry Potter", 200).await;
    let builder = payee(&db, "Bob Builder", "carpenter").await;
    let rel = relationship(&db, harry, builder, RelationshipStatus::Active).await;

    let mut jobs = Vec::new();
    for _ in 0..4 {
        jobs.push((obligation(&db, rel, 150).await, harry));
    }

    let engine = SettlementEngine::new(db.clone());
    let results = settle_all(&engine, jobs).await;

    let settled = results.iter().filter(|r| r.is_ok()).count();
    let broke = results
        .iter()
        .filter(|r| matches!(r, Err(PaymentError::InsufficientFunds { .. })))
        .count();
    assert_eq!(settled, 1);
    assert_eq!(broke, 3);

    assert_eq!(balance(&db, harry).await, Money::from_minor(50));
    assert_eq!(balance(&db, builder).await, Money::from_minor(150));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposite_direction_settlements_both_complete() {
    let db = setup().await;
    let alice = account(&db, "Alice", "designer", AccountKind::Payer, 500).await;
    let bob = account(&db, "Bob", "developer", AccountKind::Payee, 500).await;

    let alice_pays = relationship(&db, alice, bob, RelationshipStatus::Active).await;
    let bob_pays = relationship(&db, bob, alice, RelationshipStatus::Active).await;
    let first = obligation(&db, alice_pays, 120).await;
    let second = obligation(&db, bob_pays, 70).await;

    let engine = SettlementEngine::new(db.clone());
    let results = settle_all(&engine, vec![(first, alice), (second, bob)]).await;

    assert!(results.iter().all(Result::is_ok), "{results:?}");
    assert_eq!(balance(&db, alice).await, Money::from_minor(450));
    assert_eq!(balance(&db, bob).await, Money::from_minor(550));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_transactions_pay_once() {
    let (_dir, db) = pooled_setup(8).await;
    let harry = payer(&db, "Harry Potter", 1_000).await;
    let builder = payee(&db, "Bob Builder", "carpenter").await;
    let rel = relationship(&db, harry, builder, RelationshipStatus::Active).await;
    let job = obligation(&db, rel, 150).await;
    let engine = SettlementEngine::new(db.clone());

    let results = settle_all(&engine, vec![(job, harry); 8]).await;

    let settled = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(settled, 1, "{results:?}");
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(err, PaymentError::AlreadySettled(_)) || err.is_retryable(),
            "unexpected loser: {err:?}"
        );
    }

    assert_eq!(balance(&db, harry).await, Money::from_minor(850));
    assert_eq!(balance(&db, builder).await, Money::from_minor(150));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_transactions_never_overdraw() {
    let (_dir, db) = pooled_setup(4).await;
    let harry = payer(&db, "Harry Potter", 200).await;
    let builder = payee(&db, "Bob Builder", "carpenter").await;
    let rel = relationship(&db, harry, builder, RelationshipStatus::Active).await;

    let mut jobs = Vec::new();
    for _ in 0..4 {
        jobs.push((obligation(&db, rel, 150).await, harry));
    }

    let engine = SettlementEngine::new(db.clone());
    let results = settle_all(&engine, jobs).await;

    let settled = results.iter().filter(|r| r.is_ok()).count();
    assert!(settled <= 1, "{results:?}");
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(
            matches!(err, PaymentError::InsufficientFunds { .. }) || err.is_retryable(),
            "unexpected loser: {err:?}"
        );
    }

    let paid = 150 * i64::try_from(settled).unwrap();
    assert_eq!(balance(&db, harry).await, Money::from_minor(200 - paid));
    assert_eq!(balance(&db, builder).await, Money::from_minor(paid));
}
