//! Shared runtime state for ldy-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The desk is stateless
//! between requests; everything durable lives behind its store.

use std::time::Duration;

use ldy_core::LaundryDesk;
use ldy_schemas::{BatchStatus, OrderStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
/// Informational only; nothing reads them back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat {
        ts_millis: i64,
    },
    OrderStatus {
        order_id: Uuid,
        barcode: String,
        status: OrderStatus,
    },
    BatchStatus {
        batch_id: Uuid,
        status: BatchStatus,
        transitioned: usize,
        failed: usize,
    },
    LogLine {
        level: String,
        msg: String,
    },
}

impl BusMsg {
    /// SSE `event:` name.
    pub fn event_name(&self) -> &'static str {
        match self {
            BusMsg::Heartbeat { .. } => "heartbeat",
            BusMsg::OrderStatus { .. } => "order_status",
            BusMsg::BatchStatus { .. } => "batch_status",
            BusMsg::LogLine { .. } => "log",
        }
    }
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    pub build: BuildInfo,
    pub desk: LaundryDesk,
    /// SHA-256 of the canonical config the daemon booted with.
    pub config_hash: String,
}

impl AppState {
    pub fn new(desk: LaundryDesk, config_hash: impl Into<String>) -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);
        Self {
            bus,
            build: BuildInfo {
                service: "ldy-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            desk,
            config_hash: config_hash.into(),
        }
    }

    /// Having no subscribers is not an error.
    pub fn publish(&self, msg: BusMsg) {
        let _ = self.bus.send(msg);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seconds since first call (process lifetime).
pub fn uptime_secs() -> u64 {
    static START: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();
    START
        .get_or_init(std::time::Instant::now)
        .elapsed()
        .as_secs()
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
