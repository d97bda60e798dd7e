//! Scenario: Order Status Always Valid
//!
//! # Invariant under test
//! Every observation of an order, through the normal pipeline and through
//! arbitrary staff jumps, shows one of the six pipeline statuses. Jumps in
//! either direction are accepted.

use ldy_schemas::{ClothingType, OrderStatus};
use ldy_testkit::{booking, date, desk_with_store};
use uuid::Uuid;

#[tokio::test]
async fn pipeline_walk_observes_only_known_statuses() {
    let (desk, store) = desk_with_store();
    let order = desk
        .create_order(booking(
            store.add_student(),
            date(2024, 1, 10),
            "09:00-11:00",
            &[(ClothingType::Shirts, 2)],
        ))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let mut cur = order.status;
    while let Some(next) = cur.next() {
        let updated = desk.transition(order.id, next, None, None).await.unwrap();
        assert_eq!(updated.status, next);
        let seen = desk.get_order(order.id).await.unwrap().order.status;
        assert!(OrderStatus::ALL.contains(&seen));
        assert_eq!(seen, next);
        cur = next;
    }
    assert_eq!(cur, OrderStatus::Delivered);
}

#[tokio::test]
async fn staff_may_jump_forward_and_back() {
    let (desk, store) = desk_with_store();
    let order = desk
        .create_order(booking(
            store.add_student(),
            date(2024, 1, 10),
            "09:00-11:00",
            &[(ClothingType::Jeans, 1)],
        ))
        .await
        .unwrap();

    let jumped = desk
        .transition(order.id, OrderStatus::Delivered, None, None)
        .await
        .unwrap();
    assert_eq!(jumped.status, OrderStatus::Delivered);

    let back = desk
        .transition(
            order.id,
            OrderStatus::Washing,
            Some("re-wash, stain remained".to_string()),
            None,
        )
        .await
        .unwrap();
    assert_eq!(back.status, OrderStatus::Washing);
    assert_eq!(back.slot_note.as_deref(), Some("re-wash, stain remained"));
    assert_eq!(back.barcode, order.barcode, "barcode never changes");
}

#[tokio::test]
async fn transition_of_unknown_order_is_not_found() {
    let (desk, _store) = desk_with_store();
    let err = desk
        .transition(Uuid::new_v4(), OrderStatus::Pickup, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert_eq!(err.category(), "Order Not Found");
}
