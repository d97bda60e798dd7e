use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ldy_core::{BookingRules, LaundryDesk};
use ldy_schemas::{ClothingType, NewOrder};
use uuid::Uuid;

use crate::MemoryStore;

/// A desk over a fresh [`MemoryStore`] with default rules. The store handle
/// is returned for inspection and failure injection.
pub fn desk_with_store() -> (LaundryDesk, Arc<MemoryStore>) {
    desk_with_rules(BookingRules::default())
}

pub fn desk_with_rules(rules: BookingRules) -> (LaundryDesk, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let desk = LaundryDesk::new(store.clone(), rules);
    (desk, store)
}

/// Booking rules from inline YAML layers, through the real config loader.
pub fn rules_from_yaml(docs: &[&str]) -> Result<BookingRules> {
    let loaded = ldy_config::load_layered_yaml_from_strings(docs).context("load test yaml")?;
    Ok(BookingRules::from_config(&loaded.laundry()?))
}

/// Panics on an invalid calendar date; test input only.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| panic!("bad test date {y}-{m}-{d}"))
}

/// A complete booking request with the given clothing counts.
pub fn booking(
    user_id: Uuid,
    day: NaiveDate,
    time_range: &str,
    items: &[(ClothingType, u32)],
) -> NewOrder {
    NewOrder {
        user_id,
        student_name: "A".to_string(),
        room_number: "1".to_string(),
        phone_number: "9876543210".to_string(),
        preferred_date: Some(day),
        preferred_time: time_range.to_string(),
        items: items.iter().copied().collect(),
        ..Default::default()
    }
}
