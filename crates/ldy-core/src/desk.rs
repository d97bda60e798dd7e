use std::sync::Arc;

use ldy_config::LaundryConfig;

use crate::store::LaundryStore;

/// Booking limits and slot defaults, taken from `LaundryConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRules {
    pub min_items: u32,
    pub max_items: u32,
    pub require_slot: bool,
    pub default_capacity: i32,
    pub time_ranges: Vec<String>,
}

impl BookingRules {
    pub fn from_config(cfg: &LaundryConfig) -> Self {
        Self {
            min_items: cfg.booking.min_items,
            max_items: cfg.booking.max_items,
            require_slot: cfg.booking.require_slot,
            default_capacity: cfg.slots.default_capacity,
            time_ranges: cfg.slots.time_ranges.clone(),
        }
    }
}

impl Default for BookingRules {
    fn default() -> Self {
        Self::from_config(&LaundryConfig::default())
    }
}

/// Entry point for every booking, staff and dashboard operation.
///
/// Holds no mutable state of its own: each call reads what it needs from the
/// store and writes its result back before returning.
#[derive(Clone)]
pub struct LaundryDesk {
    pub(crate) store: Arc<dyn LaundryStore>,
    pub(crate) rules: BookingRules,
}

impl LaundryDesk {
    pub fn new(store: Arc<dyn LaundryStore>, rules: BookingRules) -> Self {
        Self { store, rules }
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }
}

impl std::fmt::Debug for LaundryDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaundryDesk")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
