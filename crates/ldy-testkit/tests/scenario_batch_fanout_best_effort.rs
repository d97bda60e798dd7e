//! Scenario: Batch Fan-out
//!
//! # Invariant under test
//! Advancing a batch to washing/drying/completed moves every listed order to
//! that status, whatever state it was in. Adding the same order twice lists
//! it twice. A failure on one order does not undo the others.

use ldy_core::LaundryDesk;
use ldy_schemas::{BatchStatus, ClothingType, Order, OrderStatus};
use ldy_testkit::{booking, date, desk_with_store, MemoryStore};
use uuid::Uuid;

async fn new_order(desk: &LaundryDesk, store: &MemoryStore) -> Order {
    desk.create_order(booking(
        store.add_student(),
        date(2024, 1, 10),
        "09:00-11:00",
        &[(ClothingType::Shirts, 1)],
    ))
    .await
    .unwrap()
}

#[tokio::test]
async fn completed_batch_completes_orders_in_any_state() {
    let (desk, store) = desk_with_store();
    let a = new_order(&desk, &store).await;
    let b = new_order(&desk, &store).await;
    let c = new_order(&desk, &store).await;
    desk.transition(a.id, OrderStatus::Drying, None, None).await.unwrap();
    desk.transition(c.id, OrderStatus::Washing, None, None).await.unwrap();
    // b stays pending

    let batch = desk.create_batch("Morning load").await.unwrap();
    for o in [&a, &b, &c] {
        desk.add_order(batch.id, o.id).await.unwrap();
    }

    let report = desk
        .advance_batch(batch.id, BatchStatus::Completed)
        .await
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.transitioned, vec![a.id, b.id, c.id]);
    assert_eq!(report.batch.status, BatchStatus::Completed);

    for o in [&a, &b, &c] {
        let detail = desk.get_order(o.id).await.unwrap();
        assert_eq!(detail.order.status, OrderStatus::Completed);
        assert_eq!(detail.order.batch_id, Some(batch.id));
    }
    assert_eq!(
        desk.get_batch(batch.id).await.unwrap().status,
        BatchStatus::Completed
    );
}

#[tokio::test]
async fn created_status_does_not_touch_orders() {
    let (desk, store) = desk_with_store();
    let a = new_order(&desk, &store).await;
    let batch = desk.create_batch("Evening").await.unwrap();
    desk.add_order(batch.id, a.id).await.unwrap();

    let report = desk.advance_batch(batch.id, BatchStatus::Created).await.unwrap();
    assert!(report.transitioned.is_empty());
    assert_eq!(
        desk.get_order(a.id).await.unwrap().order.status,
        OrderStatus::Pending
    );
}

#[tokio::test]
async fn duplicate_add_is_kept_and_fans_out_twice() {
    let (desk, store) = desk_with_store();
    let a = new_order(&desk, &store).await;
    let batch = desk.create_batch("Dupes").await.unwrap();

    desk.add_order(batch.id, a.id).await.unwrap();
    let after = desk.add_order(batch.id, a.id).await.unwrap();
    assert_eq!(after.order_ids, vec![a.id, a.id]);
    assert_eq!(desk.get_batch(batch.id).await.unwrap().order_ids.len(), 2);

    let report = desk.advance_batch(batch.id, BatchStatus::Washing).await.unwrap();
    assert_eq!(report.transitioned, vec![a.id, a.id]);
}

#[tokio::test]
async fn one_failing_order_does_not_roll_back_others() {
    let (desk, store) = desk_with_store();
    let a = new_order(&desk, &store).await;
    let b = new_order(&desk, &store).await;
    let c = new_order(&desk, &store).await;
    let batch = desk.create_batch("Partial").await.unwrap();
    for o in [&a, &b, &c] {
        desk.add_order(batch.id, o.id).await.unwrap();
    }

    store.fail_order_updates_for(b.id);
    let report = desk.advance_batch(batch.id, BatchStatus::Drying).await.unwrap();

    assert_eq!(report.transitioned, vec![a.id, c.id]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].order_id, b.id);
    assert_eq!(report.failed[0].kind, "store");

    assert_eq!(desk.get_order(a.id).await.unwrap().order.status, OrderStatus::Drying);
    assert_eq!(desk.get_order(b.id).await.unwrap().order.status, OrderStatus::Pending);
    assert_eq!(desk.get_order(c.id).await.unwrap().order.status, OrderStatus::Drying);
}

#[tokio::test]
async fn batch_validation_and_missing_rows() {
    let (desk, store) = desk_with_store();
    assert_eq!(desk.create_batch("  ").await.unwrap_err().kind(), "validation");

    let batch = desk.create_batch("Real").await.unwrap();
    let err = desk.add_order(batch.id, Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let a = new_order(&desk, &store).await;
    let err = desk.add_order(Uuid::new_v4(), a.id).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");

    let err = desk
        .advance_batch(Uuid::new_v4(), BatchStatus::Washing)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn batches_listed_newest_first() {
    let (desk, _store) = desk_with_store();
    let first = desk.create_batch("first").await.unwrap();
    let second = desk.create_batch("second").await.unwrap();
    let names: Vec<String> = desk
        .list_batches()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, vec![second.name, first.name]);
}
