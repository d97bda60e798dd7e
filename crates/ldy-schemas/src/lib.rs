//! Domain entities shared by every Laundrify crate.
//!
//! Enum columns are stored as lowercase text in the database; `as_str` /
//! `parse` are the only codecs and must stay in sync with the CHECK
//! constraints in `ldy-db/migrations`.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// The six states an order can occupy, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Pickup,
    Washing,
    Drying,
    Completed,
    Delivered,
}

impl OrderStatus {
    /// Every status, in pipeline order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Pickup,
        OrderStatus::Washing,
        OrderStatus::Drying,
        OrderStatus::Completed,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Pickup => "pickup",
            OrderStatus::Washing => "washing",
            OrderStatus::Drying => "drying",
            OrderStatus::Completed => "completed",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "pickup" => Ok(OrderStatus::Pickup),
            "washing" => Ok(OrderStatus::Washing),
            "drying" => Ok(OrderStatus::Drying),
            "completed" => Ok(OrderStatus::Completed),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(anyhow!("invalid order status: {}", other)),
        }
    }

    /// The next status in the reference pipeline, `None` once delivered.
    ///
    /// Informational only: transitions are not restricted to this edge.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Pickup),
            OrderStatus::Pickup => Some(OrderStatus::Washing),
            OrderStatus::Washing => Some(OrderStatus::Drying),
            OrderStatus::Drying => Some(OrderStatus::Completed),
            OrderStatus::Completed => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BatchStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Created,
    Washing,
    Drying,
    Completed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Created => "created",
            BatchStatus::Washing => "washing",
            BatchStatus::Drying => "drying",
            BatchStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(BatchStatus::Created),
            "washing" => Ok(BatchStatus::Washing),
            "drying" => Ok(BatchStatus::Drying),
            "completed" => Ok(BatchStatus::Completed),
            other => Err(anyhow!("invalid batch status: {}", other)),
        }
    }

    /// Order status fanned out to every member when the batch enters this
    /// status. `Created` carries no order-level meaning.
    pub fn order_status(&self) -> Option<OrderStatus> {
        match self {
            BatchStatus::Created => None,
            BatchStatus::Washing => Some(OrderStatus::Washing),
            BatchStatus::Drying => Some(OrderStatus::Drying),
            BatchStatus::Completed => Some(OrderStatus::Completed),
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Small enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Admin,
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "admin" => Ok(UserRole::Admin),
            "staff" => Ok(UserRole::Staff),
            other => Err(anyhow!("invalid user role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaundryType {
    #[default]
    Normal,
    Stain,
}

impl LaundryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaundryType::Normal => "normal",
            LaundryType::Stain => "stain",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(LaundryType::Normal),
            "stain" => Ok(LaundryType::Stain),
            other => Err(anyhow!("invalid laundry type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PickupType {
    #[default]
    SelfDrop,
    Pickup,
}

impl PickupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupType::SelfDrop => "self-drop",
            PickupType::Pickup => "pickup",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self-drop" => Ok(PickupType::SelfDrop),
            "pickup" => Ok(PickupType::Pickup),
            other => Err(anyhow!("invalid pickup type: {}", other)),
        }
    }
}

/// Fixed clothing categories accepted at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClothingType {
    Shirts,
    Tshirts,
    Trousers,
    Jeans,
    Shorts,
    Kurtas,
    Towels,
    Bedsheets,
    Innerwear,
    Socks,
    Others,
}

impl ClothingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingType::Shirts => "shirts",
            ClothingType::Tshirts => "tshirts",
            ClothingType::Trousers => "trousers",
            ClothingType::Jeans => "jeans",
            ClothingType::Shorts => "shorts",
            ClothingType::Kurtas => "kurtas",
            ClothingType::Towels => "towels",
            ClothingType::Bedsheets => "bedsheets",
            ClothingType::Innerwear => "innerwear",
            ClothingType::Socks => "socks",
            ClothingType::Others => "others",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shirts" => Ok(ClothingType::Shirts),
            "tshirts" => Ok(ClothingType::Tshirts),
            "trousers" => Ok(ClothingType::Trousers),
            "jeans" => Ok(ClothingType::Jeans),
            "shorts" => Ok(ClothingType::Shorts),
            "kurtas" => Ok(ClothingType::Kurtas),
            "towels" => Ok(ClothingType::Towels),
            "bedsheets" => Ok(ClothingType::Bedsheets),
            "innerwear" => Ok(ClothingType::Innerwear),
            "socks" => Ok(ClothingType::Socks),
            "others" => Ok(ClothingType::Others),
            other => Err(anyhow!("invalid clothing type: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub phone_number: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A student laundry request.
///
/// `barcode` is assigned once at creation; stores never overwrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub student_name: String,
    pub room_number: String,
    pub phone_number: String,
    pub laundry_type: LaundryType,
    pub pickup_type: PickupType,
    pub preferred_date: NaiveDate,
    /// Time-range label, e.g. `"09:00-11:00"`.
    pub preferred_time: String,
    pub slot_id: Option<Uuid>,
    pub special_instructions: Option<String>,
    pub barcode: String,
    pub status: OrderStatus,
    pub batch_id: Option<Uuid>,
    /// Staff feedback recorded on the latest status change.
    pub feedback: Option<String>,
    pub slot_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub clothing_type: ClothingType,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

/// Bookable capacity for one (date, time-range) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time_range: String,
    pub max_capacity: i32,
    pub current_bookings: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn remaining(&self) -> i32 {
        (self.max_capacity - self.current_bookings).max(0)
    }

    pub fn has_capacity(&self) -> bool {
        self.is_active && self.current_bookings < self.max_capacity
    }
}

/// Staff grouping of orders. `order_ids` is append-only and may repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    pub status: BatchStatus,
    pub order_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Booking request. Missing text fields decode as empty strings so the
/// lifecycle validator, not the decoder, reports them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: Uuid,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub laundry_type: LaundryType,
    #[serde(default)]
    pub pickup_type: PickupType,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferred_time: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub items: BTreeMap<ClothingType, u32>,
}

impl NewOrder {
    /// Sum of all requested clothing quantities.
    pub fn total_items(&self) -> u64 {
        self.items.values().map(|q| u64::from(*q)).sum()
    }
}

/// An order together with the clothing items it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<ClothingItem>,
}
