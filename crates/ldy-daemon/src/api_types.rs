//! Request and response types for all ldy-daemon HTTP endpoints.
//!
//! These types are `Serialize + Deserialize` so they can be JSON-encoded
//! by Axum and decoded by tests. No business logic lives here.

use chrono::NaiveDate;
use ldy_schemas::{BatchStatus, OrderStatus, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub config_hash: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Body of every non-2xx response produced from a `LaundryError`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Stable code: validation | capacity_exceeded | item_limit | not_found | store
    pub kind: String,
    /// Short human-readable category, e.g. "Slot Full".
    pub category: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub phone_number: String,
    /// Only used when the phone number is new.
    #[serde(default)]
    pub role: UserRole,
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSlotRequest {
    pub date: NaiveDate,
    pub time_range: String,
    /// Falls back to `slots.default_capacity`.
    #[serde(default)]
    pub max_capacity: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDayRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSlotActiveRequest {
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub slot_note: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddBatchOrderRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceBatchRequest {
    pub status: BatchStatus,
}
