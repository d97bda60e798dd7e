use uuid::Uuid;

pub type LaundryResult<T> = Result<T, LaundryError>;

/// Every failure an operation on [`crate::LaundryDesk`] can surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaundryError {
    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The slot is full or no longer accepting bookings.
    #[error("slot {slot_id} cannot take another booking ({current}/{max})")]
    CapacityExceeded {
        slot_id: Uuid,
        current: i32,
        max: i32,
    },

    /// Total clothing quantity outside the accepted range.
    #[error("clothing quantity {total} outside [{min}, {max}]")]
    ItemLimit { total: u64, min: u32, max: u32 },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The persistence collaborator failed. Carries the full context chain.
    #[error("store error: {0}")]
    Store(String),
}

impl LaundryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        LaundryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn store(err: anyhow::Error) -> Self {
        LaundryError::Store(format!("{err:#}"))
    }

    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            LaundryError::Validation(_) => "validation",
            LaundryError::CapacityExceeded { .. } => "capacity_exceeded",
            LaundryError::ItemLimit { .. } => "item_limit",
            LaundryError::NotFound { .. } => "not_found",
            LaundryError::Store(_) => "store",
        }
    }

    /// Short message category shown to students and staff.
    pub fn category(&self) -> &'static str {
        match self {
            LaundryError::Validation(_) => "Missing Information",
            LaundryError::CapacityExceeded { .. } => "Slot Full",
            LaundryError::ItemLimit { total, min, .. } => {
                if *total < u64::from(*min) {
                    "No Items"
                } else {
                    "Too Many Items"
                }
            }
            LaundryError::NotFound { entity: "order", .. } => "Order Not Found",
            LaundryError::NotFound { .. } => "Not Found",
            LaundryError::Store(_) => "Service Unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_limit_category_depends_on_direction() {
        let none = LaundryError::ItemLimit {
            total: 0,
            min: 1,
            max: 10,
        };
        let many = LaundryError::ItemLimit {
            total: 11,
            min: 1,
            max: 10,
        };
        assert_eq!(none.category(), "No Items");
        assert_eq!(many.category(), "Too Many Items");
        assert_eq!(many.kind(), "item_limit");
    }

    #[test]
    fn store_error_keeps_context_chain() {
        let inner = anyhow::anyhow!("connection refused").context("insert laundry_orders");
        let err = LaundryError::store(inner);
        let msg = err.to_string();
        assert!(msg.contains("insert laundry_orders"), "got: {msg}");
        assert!(msg.contains("connection refused"), "got: {msg}");
        assert_eq!(err.category(), "Service Unavailable");
    }

    #[test]
    fn order_not_found_has_order_category() {
        assert_eq!(
            LaundryError::not_found("order", "LDY00000000").category(),
            "Order Not Found"
        );
        assert_eq!(LaundryError::not_found("batch", "x").category(), "Not Found");
    }
}
