//! Slot Capacity Ledger.

use chrono::{NaiveDate, NaiveTime, Utc};
use ldy_schemas::TimeSlot;
use tracing::{info, warn};
use uuid::Uuid;

use crate::desk::LaundryDesk;
use crate::error::{LaundryError, LaundryResult};

/// Parse a `HH:MM-HH:MM` label. The start must be strictly before the end.
pub fn parse_time_range(label: &str) -> LaundryResult<(NaiveTime, NaiveTime)> {
    let invalid = || LaundryError::Validation(format!("time range must be HH:MM-HH:MM, got {label:?}"));
    let (start, end) = label.trim().split_once('-').ok_or_else(invalid)?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;
    if start >= end {
        return Err(LaundryError::Validation(format!(
            "time range {label:?} ends before it starts"
        )));
    }
    Ok((start, end))
}

impl LaundryDesk {
    /// Active slots for `date`, sorted by time-range label ascending.
    ///
    /// A store failure degrades to an empty list so booking screens still
    /// render; the failure is logged.
    pub async fn list_available_slots(&self, date: NaiveDate) -> Vec<TimeSlot> {
        match self.store.list_slots(date).await {
            Ok(slots) => {
                let mut active: Vec<TimeSlot> = slots.into_iter().filter(|s| s.is_active).collect();
                active.sort_by(|a, b| a.time_range.cmp(&b.time_range));
                active
            }
            Err(err) => {
                warn!(%date, error = %format!("{err:#}"), "slot listing failed; returning no slots");
                Vec::new()
            }
        }
    }

    /// Take one unit of capacity from `slot_id`.
    ///
    /// Read-then-write: two concurrent reservations of the last unit can both
    /// succeed. A full or inactive slot is left untouched.
    pub async fn reserve(&self, slot_id: Uuid) -> LaundryResult<TimeSlot> {
        let mut slot = self
            .store
            .fetch_slot(slot_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("slot", slot_id))?;

        if !slot.has_capacity() {
            return Err(LaundryError::CapacityExceeded {
                slot_id,
                current: slot.current_bookings,
                max: slot.max_capacity,
            });
        }

        slot.current_bookings += 1;
        self.store
            .update_slot(&slot)
            .await
            .map_err(LaundryError::store)?;

        info!(
            slot_id = %slot.id,
            date = %slot.date,
            time_range = %slot.time_range,
            current = slot.current_bookings,
            max = slot.max_capacity,
            "slot reserved"
        );
        Ok(slot)
    }

    /// Create an active slot with no bookings.
    pub async fn open_slot(
        &self,
        date: NaiveDate,
        time_range: &str,
        max_capacity: i32,
    ) -> LaundryResult<TimeSlot> {
        let time_range = time_range.trim();
        parse_time_range(time_range)?;
        if max_capacity < 1 {
            return Err(LaundryError::Validation(format!(
                "slot capacity must be at least 1, got {max_capacity}"
            )));
        }

        let existing = self
            .store
            .find_slot(date, time_range)
            .await
            .map_err(LaundryError::store)?;
        if existing.is_some() {
            return Err(LaundryError::Validation(format!(
                "slot {date} {time_range} already exists"
            )));
        }

        let slot = TimeSlot {
            id: Uuid::new_v4(),
            date,
            time_range: time_range.to_string(),
            max_capacity,
            current_bookings: 0,
            is_active: true,
            created_at: Utc::now(),
        };
        self.store
            .insert_slot(&slot)
            .await
            .map_err(LaundryError::store)?;

        info!(slot_id = %slot.id, %date, time_range, max_capacity, "slot opened");
        Ok(slot)
    }

    /// Open every configured time range for `date` that has no slot yet,
    /// using the default capacity. Returns only the newly created slots.
    ///
    /// Every configured range is checked before the first slot is opened, so
    /// a malformed entry leaves the day untouched.
    pub async fn seed_day(&self, date: NaiveDate) -> LaundryResult<Vec<TimeSlot>> {
        for range in &self.rules.time_ranges {
            parse_time_range(range.trim())?;
        }

        let existing = self
            .store
            .list_slots(date)
            .await
            .map_err(LaundryError::store)?;

        let mut pending: Vec<&str> = Vec::new();
        for range in &self.rules.time_ranges {
            let range = range.trim();
            if existing.iter().any(|s| s.time_range == range) || pending.contains(&range) {
                continue;
            }
            pending.push(range);
        }

        let mut created = Vec::new();
        for range in pending {
            created.push(self.open_slot(date, range, self.rules.default_capacity).await?);
        }
        Ok(created)
    }

    pub async fn set_slot_active(&self, slot_id: Uuid, is_active: bool) -> LaundryResult<TimeSlot> {
        let mut slot = self
            .store
            .fetch_slot(slot_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("slot", slot_id))?;

        slot.is_active = is_active;
        self.store
            .update_slot(&slot)
            .await
            .map_err(LaundryError::store)?;

        info!(%slot_id, is_active, "slot activation changed");
        Ok(slot)
    }
}
