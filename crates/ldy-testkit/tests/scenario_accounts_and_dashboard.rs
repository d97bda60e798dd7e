//! Scenario: Accounts and Dashboards
//!
//! # Invariant under test
//! Sign-in creates a user once per phone number and never changes its role.
//! Dashboard queries filter, count and group orders without mutating them.

use ldy_core::OrderFilter;
use ldy_schemas::{ClothingType, OrderStatus, UserRole};
use ldy_testkit::{booking, date, desk_with_store};

#[tokio::test]
async fn sign_in_registers_once_and_keeps_role() {
    let (desk, _store) = desk_with_store();
    let first = desk.sign_in("98765 43210", UserRole::Staff).await.unwrap();
    assert_eq!(first.role, UserRole::Staff);

    let again = desk.sign_in(" 98765 43210 ", UserRole::Student).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.role, UserRole::Staff);

    let err = desk.sign_in("12345", UserRole::Student).await.unwrap_err();
    assert_eq!(err.kind(), "validation");
}

#[tokio::test]
async fn search_stats_and_schedule() {
    let (desk, _store) = desk_with_store();
    let asha = desk.sign_in("9876543210", UserRole::Student).await.unwrap();
    let ravi = desk.sign_in("9123456780", UserRole::Student).await.unwrap();

    let mut req = booking(asha.id, date(2024, 1, 10), "09:00-11:00", &[(ClothingType::Shirts, 2)]);
    req.student_name = "Asha Rao".to_string();
    req.room_number = "B-214".to_string();
    let a1 = desk.create_order(req.clone()).await.unwrap();
    let a2 = desk.create_order(req).await.unwrap();

    let mut req = booking(ravi.id, date(2024, 1, 11), "11:00-13:00", &[(ClothingType::Jeans, 1)]);
    req.student_name = "Ravi K".to_string();
    req.room_number = "C-101".to_string();
    let r1 = desk.create_order(req).await.unwrap();
    desk.transition(r1.id, OrderStatus::Washing, None, None).await.unwrap();

    let by_name = desk
        .search_orders(&OrderFilter {
            q: Some("asha".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        by_name.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![a2.id, a1.id],
        "newest first"
    );

    let by_barcode = desk
        .search_orders(&OrderFilter {
            q: Some(r1.barcode.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_barcode.len(), 1);

    let washing = desk
        .search_orders(&OrderFilter {
            status: Some(OrderStatus::Washing),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(washing.len(), 1);
    assert_eq!(washing[0].id, r1.id);

    let ravis = desk
        .search_orders(&OrderFilter {
            user_id: Some(ravi.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(ravis.len(), 1);

    let stats = desk.dashboard_stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.created_today, 3);
    assert_eq!(stats.by_status[&OrderStatus::Pending], 2);
    assert_eq!(stats.by_status[&OrderStatus::Washing], 1);

    let schedule = desk.schedule_for_user(asha.id).await.unwrap();
    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].orders.len(), 2);
    assert!(desk.schedule_for_user(uuid::Uuid::new_v4()).await.unwrap().is_empty());
}
