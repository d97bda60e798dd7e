use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ldy_core::{LaundryStore, StoreResult};
use ldy_schemas::{
    Batch, BatchStatus, ClothingItem, Notification, Order, TimeSlot, User, UserRole,
};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    slots: Vec<TimeSlot>,
    orders: Vec<Order>,
    items: Vec<ClothingItem>,
    batches: Vec<Batch>,
    notifications: Vec<Notification>,

    unavailable: bool,
    failing_order_updates: HashSet<Uuid>,
    failing_notifications: bool,
}

/// Deterministic in-memory [`LaundryStore`].
///
/// Rows live in insertion order; "newest first" listings sort by
/// `created_at` descending with later inserts winning ties.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

fn newest_first<T, F>(rows: &[T], created_at: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by_key(|r| std::cmp::Reverse(created_at(r)));
    out
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory store mutex poisoned"))?;
        if inner.unavailable {
            bail!("memory store unavailable (injected)");
        }
        Ok(inner)
    }

    /// Make every subsequent call fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.unavailable = unavailable;
        }
    }

    /// Make `update_order` fail for one order only.
    pub fn fail_order_updates_for(&self, order_id: Uuid) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_order_updates.insert(order_id);
        }
    }

    /// Make `insert_notification` fail while leaving everything else working.
    pub fn fail_notifications(&self, failing: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_notifications = failing;
        }
    }

    /// Register a student directly and return its id. Orders and
    /// notifications are only accepted for known users.
    pub fn add_student(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        if let Ok(mut inner) = self.inner.lock() {
            inner.users.push(User {
                id,
                phone_number: format!("9{:09}", id.as_u128() % 1_000_000_000),
                role: UserRole::Student,
                created_at: now,
                updated_at: now,
            });
        }
        id
    }

    /// Every notification ever written, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .map(|inner| inner.notifications.clone())
            .unwrap_or_default()
    }

    pub fn slot(&self, slot_id: Uuid) -> Option<TimeSlot> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.slots.iter().find(|s| s.id == slot_id).cloned())
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.orders.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LaundryStore for MemoryStore {
    async fn find_user_by_phone(&self, phone_number: &str) -> StoreResult<Option<User>> {
        let inner = self.lock()?;
        Ok(inner
            .users
            .iter()
            .find(|u| u.phone_number == phone_number)
            .cloned())
    }

    async fn fetch_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.phone_number == user.phone_number) {
            bail!("duplicate phone_number {}", user.phone_number);
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn list_slots(&self, date: NaiveDate) -> StoreResult<Vec<TimeSlot>> {
        let inner = self.lock()?;
        Ok(inner.slots.iter().filter(|s| s.date == date).cloned().collect())
    }

    async fn fetch_slot(&self, slot_id: Uuid) -> StoreResult<Option<TimeSlot>> {
        let inner = self.lock()?;
        Ok(inner.slots.iter().find(|s| s.id == slot_id).cloned())
    }

    async fn find_slot(&self, date: NaiveDate, time_range: &str) -> StoreResult<Option<TimeSlot>> {
        let inner = self.lock()?;
        Ok(inner
            .slots
            .iter()
            .find(|s| s.date == date && s.time_range == time_range)
            .cloned())
    }

    async fn insert_slot(&self, slot: &TimeSlot) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner
            .slots
            .iter()
            .any(|s| s.date == slot.date && s.time_range == slot.time_range)
        {
            bail!("duplicate slot {} {}", slot.date, slot.time_range);
        }
        inner.slots.push(slot.clone());
        Ok(())
    }

    async fn update_slot(&self, slot: &TimeSlot) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let row = inner
            .slots
            .iter_mut()
            .find(|s| s.id == slot.id)
            .ok_or_else(|| anyhow!("update_slot: no slot {}", slot.id))?;
        row.max_capacity = slot.max_capacity;
        row.current_bookings = slot.current_bookings;
        row.is_active = slot.is_active;
        Ok(())
    }

    async fn insert_order(&self, order: &Order, items: &[ClothingItem]) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if !inner.users.iter().any(|u| u.id == order.user_id) {
            bail!("order {} references unknown user {}", order.id, order.user_id);
        }
        if inner.orders.iter().any(|o| o.barcode == order.barcode) {
            bail!("duplicate barcode {}", order.barcode);
        }
        inner.orders.push(order.clone());
        inner.items.extend(items.iter().cloned());
        Ok(())
    }

    async fn fetch_order(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        let inner = self.lock()?;
        Ok(inner.orders.iter().find(|o| o.id == order_id).cloned())
    }

    async fn update_order(&self, order: &Order) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner.failing_order_updates.contains(&order.id) {
            bail!("update_order failed for {} (injected)", order.id);
        }
        let row = inner
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| anyhow!("update_order: no order {}", order.id))?;
        let barcode = row.barcode.clone();
        let created_at = row.created_at;
        *row = order.clone();
        row.barcode = barcode;
        row.created_at = created_at;
        Ok(())
    }

    async fn barcode_exists(&self, barcode: &str) -> StoreResult<bool> {
        let inner = self.lock()?;
        Ok(inner.orders.iter().any(|o| o.barcode == barcode))
    }

    async fn lookup_order(&self, token: &str) -> StoreResult<Option<Order>> {
        let inner = self.lock()?;
        if let Some(hit) = inner.orders.iter().find(|o| o.barcode == token) {
            return Ok(Some(hit.clone()));
        }
        let needle = token.to_lowercase();
        Ok(newest_first(&inner.orders, |o| o.created_at)
            .into_iter()
            .find(|o| o.id.to_string().contains(&needle)))
    }

    async fn list_orders(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Order>> {
        let inner = self.lock()?;
        Ok(newest_first(&inner.orders, |o| o.created_at)
            .into_iter()
            .filter(|o| user_id.map_or(true, |u| o.user_id == u))
            .collect())
    }

    async fn list_clothing_items(&self, order_id: Uuid) -> StoreResult<Vec<ClothingItem>> {
        let inner = self.lock()?;
        let mut items: Vec<ClothingItem> = inner
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.clothing_type.as_str().cmp(b.clothing_type.as_str()));
        Ok(items)
    }

    async fn insert_batch(&self, batch: &Batch) -> StoreResult<()> {
        let mut inner = self.lock()?;
        inner.batches.push(batch.clone());
        Ok(())
    }

    async fn fetch_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>> {
        let inner = self.lock()?;
        Ok(inner.batches.iter().find(|b| b.id == batch_id).cloned())
    }

    async fn list_batches(&self) -> StoreResult<Vec<Batch>> {
        let inner = self.lock()?;
        Ok(newest_first(&inner.batches, |b| b.created_at))
    }

    async fn append_batch_order(&self, batch_id: Uuid, order_id: Uuid) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let batch = inner
            .batches
            .iter_mut()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| anyhow!("append_batch_order: no batch {batch_id}"))?;
        batch.order_ids.push(order_id);
        Ok(())
    }

    async fn update_batch_status(
        &self,
        batch_id: Uuid,
        status: BatchStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let batch = inner
            .batches
            .iter_mut()
            .find(|b| b.id == batch_id)
            .ok_or_else(|| anyhow!("update_batch_status: no batch {batch_id}"))?;
        batch.status = status;
        batch.updated_at = updated_at;
        Ok(())
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        let mut inner = self.lock()?;
        if inner.failing_notifications {
            bail!("notification insert failed (injected)");
        }
        if !inner.users.iter().any(|u| u.id == notification.user_id) {
            bail!(
                "notification {} references unknown user {}",
                notification.id,
                notification.user_id
            );
        }
        inner.notifications.push(notification.clone());
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        let inner = self.lock()?;
        Ok(newest_first(&inner.notifications, |n| n.created_at)
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect())
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        match inner.notifications.iter_mut().find(|n| n.id == notification_id) {
            Some(n) => {
                n.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
