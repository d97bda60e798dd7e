//! ldy-core
//!
//! Booking and order-handling logic for Laundrify:
//! - Slot Capacity Ledger (`slots`): list bookable slots, reserve capacity.
//! - Order Lifecycle (`lifecycle`): create orders, move them through the
//!   status pipeline, look them up by barcode or partial id.
//! - Batch Aggregator (`batch`): group orders and fan a status out to all of them.
//!
//! Persistence is reached only through [`LaundryStore`]; this crate never
//! talks to a database directly. Everything hangs off [`LaundryDesk`].

mod accounts;
mod batch;
mod dashboard;
mod desk;
mod error;
mod lifecycle;
mod slots;
mod store;

pub mod barcode;

pub use batch::{BatchAdvanceReport, BatchFailure};
pub use dashboard::{DashboardStats, OrderFilter, ScheduleDay};
pub use desk::{BookingRules, LaundryDesk};
pub use error::{LaundryError, LaundryResult};
pub use lifecycle::{PICKUP_NOTIFICATION_MESSAGE, PICKUP_NOTIFICATION_TITLE};
pub use slots::parse_time_range;
pub use store::{LaundryStore, StoreResult};
