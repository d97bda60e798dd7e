//! In-memory persistence and fixtures for Laundrify tests.
//!
//! [`MemoryStore`] implements `LaundryStore` with the same ordering and
//! lookup rules as the Postgres store, plus switches for injecting store
//! failures. No I/O, no background tasks.

mod fixtures;
mod memory_store;

pub use fixtures::{booking, date, desk_with_rules, desk_with_store, rules_from_yaml};
pub use memory_store::MemoryStore;
