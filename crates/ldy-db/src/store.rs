use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ldy_core::{LaundryStore, StoreResult};
use ldy_schemas::{Batch, BatchStatus, ClothingItem, Notification, Order, TimeSlot, User};
use sqlx::PgPool;
use uuid::Uuid;

/// [`LaundryStore`] over a Postgres pool. Each call is its own statement
/// except `insert_order`, which writes the order and its items together.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LaundryStore for PgStore {
    async fn find_user_by_phone(&self, phone_number: &str) -> StoreResult<Option<User>> {
        crate::find_user_by_phone(&self.pool, phone_number).await
    }

    async fn fetch_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        crate::fetch_user(&self.pool, user_id).await
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        crate::insert_user(&self.pool, user).await
    }

    async fn list_slots(&self, date: NaiveDate) -> StoreResult<Vec<TimeSlot>> {
        crate::list_slots(&self.pool, date).await
    }

    async fn fetch_slot(&self, slot_id: Uuid) -> StoreResult<Option<TimeSlot>> {
        crate::fetch_slot(&self.pool, slot_id).await
    }

    async fn find_slot(&self, date: NaiveDate, time_range: &str) -> StoreResult<Option<TimeSlot>> {
        crate::find_slot(&self.pool, date, time_range).await
    }

    async fn insert_slot(&self, slot: &TimeSlot) -> StoreResult<()> {
        crate::insert_slot(&self.pool, slot).await
    }

    async fn update_slot(&self, slot: &TimeSlot) -> StoreResult<()> {
        crate::update_slot(&self.pool, slot).await
    }

    async fn insert_order(&self, order: &Order, items: &[ClothingItem]) -> StoreResult<()> {
        crate::insert_order(&self.pool, order, items).await
    }

    async fn fetch_order(&self, order_id: Uuid) -> StoreResult<Option<Order>> {
        crate::fetch_order(&self.pool, order_id).await
    }

    async fn update_order(&self, order: &Order) -> StoreResult<()> {
        crate::update_order(&self.pool, order).await
    }

    async fn barcode_exists(&self, barcode: &str) -> StoreResult<bool> {
        crate::barcode_exists(&self.pool, barcode).await
    }

    async fn lookup_order(&self, token: &str) -> StoreResult<Option<Order>> {
        crate::lookup_order(&self.pool, token).await
    }

    async fn list_orders(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Order>> {
        crate::list_orders(&self.pool, user_id).await
    }

    async fn list_clothing_items(&self, order_id: Uuid) -> StoreResult<Vec<ClothingItem>> {
        crate::list_clothing_items(&self.pool, order_id).await
    }

    async fn insert_batch(&self, batch: &Batch) -> StoreResult<()> {
        crate::insert_batch(&self.pool, batch).await
    }

    async fn fetch_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>> {
        crate::fetch_batch(&self.pool, batch_id).await
    }

    async fn list_batches(&self) -> StoreResult<Vec<Batch>> {
        crate::list_batches(&self.pool).await
    }

    async fn append_batch_order(&self, batch_id: Uuid, order_id: Uuid) -> StoreResult<()> {
        crate::append_batch_order(&self.pool, batch_id, order_id).await
    }

    async fn update_batch_status(
        &self,
        batch_id: Uuid,
        status: BatchStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        crate::update_batch_status(&self.pool, batch_id, status, updated_at).await
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        crate::insert_notification(&self.pool, notification).await
    }

    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>> {
        crate::list_notifications(&self.pool, user_id).await
    }

    async fn mark_notification_read(&self, notification_id: Uuid) -> StoreResult<bool> {
        crate::mark_notification_read(&self.pool, notification_id).await
    }
}
