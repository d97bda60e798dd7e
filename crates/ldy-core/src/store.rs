use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ldy_schemas::{Batch, BatchStatus, ClothingItem, Notification, Order, TimeSlot, User};
use uuid::Uuid;

pub type StoreResult<T> = anyhow::Result<T>;

/// Persistence collaborator over the Laundrify relations.
///
/// Implementations report failures as `anyhow` errors with context; the desk
/// turns them into [`crate::LaundryError::Store`]. Lookups return `Ok(None)`
/// for a missing row, never an error.
#[async_trait]
pub trait LaundryStore: Send + Sync {
    // ---- users ----

    async fn find_user_by_phone(&self, phone_number: &str) -> StoreResult<Option<User>>;

    async fn fetch_user(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    // ---- time slots ----

    /// Every slot for `date`, active or not, in any order.
    async fn list_slots(&self, date: NaiveDate) -> StoreResult<Vec<TimeSlot>>;

    async fn fetch_slot(&self, slot_id: Uuid) -> StoreResult<Option<TimeSlot>>;

    async fn find_slot(&self, date: NaiveDate, time_range: &str) -> StoreResult<Option<TimeSlot>>;

    /// Fails if a slot for the same (date, time_range) already exists.
    async fn insert_slot(&self, slot: &TimeSlot) -> StoreResult<()>;

    /// Writes `max_capacity`, `current_bookings` and `is_active`.
    async fn update_slot(&self, slot: &TimeSlot) -> StoreResult<()>;

    // ---- orders ----

    async fn insert_order(&self, order: &Order, items: &[ClothingItem]) -> StoreResult<()>;

    async fn fetch_order(&self, order_id: Uuid) -> StoreResult<Option<Order>>;

    /// Writes every mutable column. The barcode is never rewritten.
    async fn update_order(&self, order: &Order) -> StoreResult<()>;

    async fn barcode_exists(&self, barcode: &str) -> StoreResult<bool>;

    /// The order whose barcode equals `token`; failing that, the newest
    /// order whose id text contains `token` (case-insensitive).
    async fn lookup_order(&self, token: &str) -> StoreResult<Option<Order>>;

    /// Orders newest first, optionally restricted to one owner.
    async fn list_orders(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Order>>;

    async fn list_clothing_items(&self, order_id: Uuid) -> StoreResult<Vec<ClothingItem>>;

    // ---- batches ----

    async fn insert_batch(&self, batch: &Batch) -> StoreResult<()>;

    async fn fetch_batch(&self, batch_id: Uuid) -> StoreResult<Option<Batch>>;

    /// Newest first.
    async fn list_batches(&self) -> StoreResult<Vec<Batch>>;

    /// Appends to the membership list. Duplicates are kept.
    async fn append_batch_order(&self, batch_id: Uuid, order_id: Uuid) -> StoreResult<()>;

    async fn update_batch_status(
        &self,
        batch_id: Uuid,
        status: BatchStatus,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // ---- notifications ----

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;

    /// Newest first.
    async fn list_notifications(&self, user_id: Uuid) -> StoreResult<Vec<Notification>>;

    /// Returns false when no notification has that id.
    async fn mark_notification_read(&self, notification_id: Uuid) -> StoreResult<bool>;
}
