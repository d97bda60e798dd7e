//! In-process scenario tests for ldy-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` over a `MemoryStore`-backed desk
//! and drives it via `tower::ServiceExt::oneshot`; no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ldy_daemon::{routes, state};
use ldy_testkit::{desk_with_store, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fresh router plus handles to its state and store.
fn make_router() -> (axum::Router, Arc<state::AppState>, Arc<MemoryStore>) {
    let (desk, store) = desk_with_store();
    let st = Arc::new(state::AppState::new(desk, "test-config-hash"));
    (routes::build_router(Arc::clone(&st)), st, store)
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: &axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.clone().oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

/// Parse body bytes as a `serde_json::Value`.
fn parse_json(b: bytes::Bytes) -> Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn booking_body(user_id: &str, items: Value) -> Value {
    json!({
        "user_id": user_id,
        "student_name": "A",
        "room_number": "1",
        "phone_number": "9876543210",
        "laundry_type": "stain",
        "pickup_type": "pickup",
        "preferred_date": "2024-01-10",
        "preferred_time": "09:00-11:00",
        "items": items,
    })
}

async fn sign_in(router: &axum::Router) -> String {
    let (status, body) = call(
        router,
        post_json("/v1/users/sign-in", json!({"phone_number": "9876543210"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let user = parse_json(body);
    assert_eq!(user["role"], "student");
    user["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_service_and_config_hash() {
    let (router, _st, _store) = make_router();
    let (status, body) = call(&router, get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "ldy-daemon");
    assert_eq!(json["config_hash"], "test-config-hash");
}

// ---------------------------------------------------------------------------
// Booking flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn booking_lookup_and_pickup_over_http() {
    let (router, _st, _store) = make_router();
    let user_id = sign_in(&router).await;

    let (status, body) = call(
        &router,
        post_json(
            "/v1/slots",
            json!({"date": "2024-01-10", "time_range": "09:00-11:00", "max_capacity": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let slot = parse_json(body);

    let (status, body) = call(&router, get("/v1/slots?date=2024-01-10")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body).as_array().unwrap().len(), 1);

    let (status, body) = call(
        &router,
        post_json("/v1/orders", booking_body(&user_id, json!({"shirts": 3}))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order = parse_json(body);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["pickup_type"], "pickup");
    assert_eq!(order["slot_id"], slot["id"]);
    let barcode = order["barcode"].as_str().unwrap().to_string();
    assert!(barcode.starts_with("LDY") && barcode.len() == 11);
    let order_id = order["id"].as_str().unwrap().to_string();

    // Slot now full.
    let (status, body) = call(
        &router,
        post_json("/v1/orders", booking_body(&user_id, json!({"shirts": 1}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let err = parse_json(body);
    assert_eq!(err["kind"], "capacity_exceeded");
    assert_eq!(err["category"], "Slot Full");

    let (status, body) = call(&router, get(&format!("/v1/orders/lookup/{barcode}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["id"], order_id.as_str());

    let (status, body) = call(&router, get(&format!("/v1/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let detail = parse_json(body);
    assert_eq!(detail["items"][0]["clothing_type"], "shirts");
    assert_eq!(detail["items"][0]["quantity"], 3);

    let (status, body) = call(
        &router,
        post_json(
            &format!("/v1/orders/{order_id}/status"),
            json!({"status": "pickup", "feedback": "two bags"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["feedback"], "two bags");

    let (status, body) = call(&router, get(&format!("/v1/users/{user_id}/notifications"))).await;
    assert_eq!(status, StatusCode::OK);
    let notes = parse_json(body);
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["title"], "Order Picked Up");
    let note_id = notes[0]["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &router,
        post_json(&format!("/v1/notifications/{note_id}/read"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&router, get(&format!("/v1/users/{user_id}/schedule"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)[0]["orders"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn errors_map_to_status_codes() {
    let (router, _st, store) = make_router();
    let user_id = sign_in(&router).await;

    let (status, body) = call(&router, post_json("/v1/orders", booking_body(&user_id, json!({})))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let err = parse_json(body);
    assert_eq!(err["kind"], "item_limit");
    assert_eq!(err["category"], "No Items");

    let (status, body) = call(
        &router,
        post_json("/v1/orders", booking_body(&user_id, json!({"shirts": 6, "jeans": 5}))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(parse_json(body)["category"], "Too Many Items");

    let mut missing = booking_body(&user_id, json!({"shirts": 1}));
    missing["room_number"] = json!("");
    let (status, body) = call(&router, post_json("/v1/orders", missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(body)["category"], "Missing Information");

    let ghost = booking_body("6f1c1d2e-0000-4000-8000-000000000001", json!({"shirts": 1}));
    let (status, body) = call(&router, post_json("/v1/orders", ghost)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["kind"], "not_found");

    let (status, body) = call(&router, get("/v1/orders/lookup/LDY00000000")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["category"], "Order Not Found");

    store.set_unavailable(true);
    let (status, body) = call(&router, get("/v1/orders/stats")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(parse_json(body)["kind"], "store");

    // Slot listing degrades instead of failing.
    let (status, body) = call(&router, get("/v1/slots?date=2024-01-10")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(parse_json(body).as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_completion_fans_out_and_publishes() {
    let (router, st, _store) = make_router();
    let user_id = sign_in(&router).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (status, body) = call(
            &router,
            post_json("/v1/orders", booking_body(&user_id, json!({"towels": 2}))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(parse_json(body)["id"].as_str().unwrap().to_string());
    }

    let (status, body) = call(&router, post_json("/v1/batches", json!({"name": "Morning"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let batch_id = parse_json(body)["id"].as_str().unwrap().to_string();

    for id in &ids {
        let (status, _) = call(
            &router,
            post_json(&format!("/v1/batches/{batch_id}/orders"), json!({"order_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let mut rx = st.bus.subscribe();
    let (status, body) = call(
        &router,
        post_json(&format!("/v1/batches/{batch_id}/status"), json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let report = parse_json(body);
    assert_eq!(report["batch"]["status"], "completed");
    assert_eq!(report["transitioned"].as_array().unwrap().len(), 3);

    match rx.try_recv().expect("batch event published") {
        state::BusMsg::BatchStatus {
            transitioned,
            failed,
            ..
        } => {
            assert_eq!(transitioned, 3);
            assert_eq!(failed, 0);
        }
        other => panic!("unexpected bus message {other:?}"),
    }

    let (status, body) = call(&router, get("/v1/orders?status=completed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body).as_array().unwrap().len(), 3);

    let (status, body) = call(&router, get("/v1/orders/stats")).await;
    assert_eq!(status, StatusCode::OK);
    let stats = parse_json(body);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["by_status"]["completed"], 3);

    let (status, body) = call(&router, get("/v1/batches")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)[0]["order_ids"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn transition_publishes_order_status_event() {
    let (router, st, _store) = make_router();
    let user_id = sign_in(&router).await;
    let (_, body) = call(
        &router,
        post_json("/v1/orders", booking_body(&user_id, json!({"socks": 4}))),
    )
    .await;
    let order_id = parse_json(body)["id"].as_str().unwrap().to_string();

    let mut rx = st.bus.subscribe();
    let (status, _) = call(
        &router,
        post_json(&format!("/v1/orders/{order_id}/status"), json!({"status": "washing"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let msg = rx.try_recv().expect("order event published");
    assert_eq!(msg.event_name(), "order_status");
    match msg {
        state::BusMsg::OrderStatus { status, .. } => {
            assert_eq!(status, ldy_schemas::OrderStatus::Washing)
        }
        other => panic!("unexpected bus message {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/barcodes/:token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn barcode_route_serves_pbm() {
    let (router, _st, _store) = make_router();
    let resp = router
        .clone()
        .oneshot(get("/v1/barcodes/LDY12345678"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "image/x-portable-bitmap"
    );
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("P1\n# LDY12345678\n300 120\n"));
}
