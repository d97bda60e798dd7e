//! Scenario: Booking Owner Must Exist
//!
//! # Invariant under test
//! An order can only be created for a registered user. An unknown owner is
//! NotFound and is rejected before any slot capacity is consumed.

use ldy_schemas::{ClothingType, UserRole};
use ldy_testkit::{booking, date, desk_with_store};
use uuid::Uuid;

#[tokio::test]
async fn unknown_owner_rejected_without_reserving() {
    let (desk, store) = desk_with_store();
    let day = date(2024, 1, 10);
    let slot = desk.open_slot(day, "09:00-11:00", 1).await.unwrap();

    let ghost = Uuid::new_v4();
    let err = desk
        .create_order(booking(ghost, day, "09:00-11:00", &[(ClothingType::Shirts, 2)]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert!(err.to_string().contains(&ghost.to_string()), "got {err}");
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.slot(slot.id).unwrap().current_bookings, 0);

    // The single unit of capacity is still there for a real student.
    let order = desk
        .create_order(booking(
            store.add_student(),
            day,
            "09:00-11:00",
            &[(ClothingType::Shirts, 2)],
        ))
        .await
        .unwrap();
    assert_eq!(order.slot_id, Some(slot.id));
    assert_eq!(store.slot(slot.id).unwrap().current_bookings, 1);
}

#[tokio::test]
async fn signed_in_user_can_book() {
    let (desk, _store) = desk_with_store();
    let user = desk.sign_in("98765 43210", UserRole::Student).await.unwrap();

    let order = desk
        .create_order(booking(
            user.id,
            date(2024, 1, 10),
            "11:00-13:00",
            &[(ClothingType::Towels, 1)],
        ))
        .await
        .unwrap();
    assert_eq!(order.user_id, user.id);
}
