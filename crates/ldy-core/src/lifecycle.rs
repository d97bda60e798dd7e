//! Order Lifecycle.
//!
//! Status moves `pending -> pickup -> washing -> drying -> completed ->
//! delivered` in normal operation, but `transition` accepts any target:
//! staff may jump or step back and nothing rejects it. Entering `pickup`
//! is the only transition with a side effect (one notification to the
//! order's owner).

use chrono::Utc;
use ldy_schemas::{ClothingItem, NewOrder, Notification, Order, OrderStatus};
use tracing::{info, warn};
use uuid::Uuid;

use crate::barcode;
use crate::desk::LaundryDesk;
use crate::error::{LaundryError, LaundryResult};

pub const PICKUP_NOTIFICATION_TITLE: &str = "Order Picked Up";
pub const PICKUP_NOTIFICATION_MESSAGE: &str =
    "Your laundry order has been picked up and is being processed.";

const MAX_TOKEN_ATTEMPTS: usize = 5;

fn require(field: &str, value: &str) -> LaundryResult<()> {
    if value.trim().is_empty() {
        return Err(LaundryError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl LaundryDesk {
    /// Validate, reserve slot capacity, allocate a barcode and persist a new
    /// `pending` order with its clothing items.
    ///
    /// Validation runs before any write, including the owner lookup. The
    /// reservation and the insert are two separate store calls: if the insert
    /// fails the reservation stays.
    pub async fn create_order(&self, req: NewOrder) -> LaundryResult<Order> {
        require("student name", &req.student_name)?;
        require("room number", &req.room_number)?;
        let preferred_date = req
            .preferred_date
            .ok_or_else(|| LaundryError::Validation("preferred date is required".to_string()))?;
        require("preferred time", &req.preferred_time)?;

        let total = req.total_items();
        if total < u64::from(self.rules.min_items) || total > u64::from(self.rules.max_items) {
            return Err(LaundryError::ItemLimit {
                total,
                min: self.rules.min_items,
                max: self.rules.max_items,
            });
        }

        self.store
            .fetch_user(req.user_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("user", req.user_id))?;

        let preferred_time = req.preferred_time.trim().to_string();
        let slot = self
            .store
            .find_slot(preferred_date, &preferred_time)
            .await
            .map_err(LaundryError::store)?;
        let slot_id = match slot {
            Some(slot) => Some(self.reserve(slot.id).await?.id),
            None if self.rules.require_slot => {
                return Err(LaundryError::Validation(format!(
                    "no bookable slot for {preferred_date} {preferred_time}"
                )));
            }
            None => None,
        };

        let barcode = self.allocate_barcode().await?;
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: req.user_id,
            student_name: req.student_name.trim().to_string(),
            room_number: req.room_number.trim().to_string(),
            phone_number: req.phone_number.trim().to_string(),
            laundry_type: req.laundry_type,
            pickup_type: req.pickup_type,
            preferred_date,
            preferred_time,
            slot_id,
            special_instructions: non_empty(req.special_instructions),
            barcode,
            status: OrderStatus::Pending,
            batch_id: None,
            feedback: None,
            slot_note: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<ClothingItem> = req
            .items
            .iter()
            .filter(|(_, qty)| **qty > 0)
            .map(|(kind, qty)| ClothingItem {
                id: Uuid::new_v4(),
                order_id: order.id,
                clothing_type: *kind,
                quantity: *qty,
                created_at: now,
            })
            .collect();

        self.store
            .insert_order(&order, &items)
            .await
            .map_err(LaundryError::store)?;

        info!(
            order_id = %order.id,
            barcode = %order.barcode,
            user_id = %order.user_id,
            total_items = total,
            slot_id = ?order.slot_id,
            "order created"
        );
        Ok(order)
    }

    async fn allocate_barcode(&self) -> LaundryResult<String> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = barcode::generate_token();
            let taken = self
                .store
                .barcode_exists(&token)
                .await
                .map_err(LaundryError::store)?;
            if !taken {
                return Ok(token);
            }
            warn!(%token, "barcode collision; drawing again");
        }
        Err(LaundryError::Store(format!(
            "no free barcode after {MAX_TOKEN_ATTEMPTS} attempts"
        )))
    }

    /// Set `status` on an order, with optional slot note and staff feedback.
    ///
    /// No guard on the source status. Entering `pickup` emits exactly one
    /// notification to the owning user. The status write is the commit
    /// point: a failed notification write is logged and the updated order is
    /// still returned.
    pub async fn transition(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        slot_note: Option<String>,
        feedback: Option<String>,
    ) -> LaundryResult<Order> {
        let mut order = self
            .store
            .fetch_order(order_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("order", order_id))?;

        let from = order.status;
        order.status = status;
        if let Some(note) = non_empty(slot_note) {
            order.slot_note = Some(note);
        }
        if let Some(fb) = non_empty(feedback) {
            order.feedback = Some(fb);
        }
        order.updated_at = Utc::now();

        self.store
            .update_order(&order)
            .await
            .map_err(LaundryError::store)?;

        if status == OrderStatus::Pickup {
            let notification = Notification {
                id: Uuid::new_v4(),
                user_id: order.user_id,
                order_id: Some(order.id),
                title: PICKUP_NOTIFICATION_TITLE.to_string(),
                message: PICKUP_NOTIFICATION_MESSAGE.to_string(),
                is_read: false,
                created_at: order.updated_at,
            };
            if let Err(err) = self.store.insert_notification(&notification).await {
                let error = format!("{err:#}");
                warn!(
                    %order_id,
                    user_id = %order.user_id,
                    %error,
                    "pickup notification not written; status change kept"
                );
            }
        }

        info!(%order_id, %from, to = %status, "order status transitioned");
        Ok(order)
    }

    /// Exact barcode match, or partial id match for manual entry. First hit
    /// wins.
    pub async fn find_by_barcode_or_id(&self, token: &str) -> LaundryResult<Order> {
        let token = token.trim();
        if token.is_empty() {
            return Err(LaundryError::Validation(
                "barcode or order id is required".to_string(),
            ));
        }
        self.store
            .lookup_order(token)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("order", token))
    }
}
