//! Read-side queries behind the student and admin dashboards.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use ldy_schemas::{Order, OrderDetail, OrderStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::desk::LaundryDesk;
use crate::error::{LaundryError, LaundryResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Case-insensitive match on student name or room number, substring
    /// match on id or barcode.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if order.user_id != user_id {
                return false;
            }
        }
        match self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                order.student_name.to_lowercase().contains(&q)
                    || order.room_number.to_lowercase().contains(&q)
                    || order.barcode.to_lowercase().contains(&q)
                    || order.id.to_string().contains(&q)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Every status is present, zero when unused.
    pub by_status: BTreeMap<OrderStatus, u64>,
    pub total: u64,
    pub created_today: u64,
}

impl DashboardStats {
    pub fn tally(orders: &[Order], today: NaiveDate) -> Self {
        let mut by_status: BTreeMap<OrderStatus, u64> =
            OrderStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut created_today = 0;
        for order in orders {
            *by_status.entry(order.status).or_insert(0) += 1;
            if order.created_at.date_naive() == today {
                created_today += 1;
            }
        }
        Self {
            by_status,
            total: orders.len() as u64,
            created_today,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub orders: Vec<Order>,
}

impl LaundryDesk {
    pub async fn get_order(&self, order_id: Uuid) -> LaundryResult<OrderDetail> {
        let order = self
            .store
            .fetch_order(order_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("order", order_id))?;
        let items = self
            .store
            .list_clothing_items(order_id)
            .await
            .map_err(LaundryError::store)?;
        Ok(OrderDetail { order, items })
    }

    /// Matching orders, newest first.
    pub async fn search_orders(&self, filter: &OrderFilter) -> LaundryResult<Vec<Order>> {
        let orders = self
            .store
            .list_orders(filter.user_id)
            .await
            .map_err(LaundryError::store)?;
        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }

    pub async fn dashboard_stats(&self) -> LaundryResult<DashboardStats> {
        let orders = self
            .store
            .list_orders(None)
            .await
            .map_err(LaundryError::store)?;
        Ok(DashboardStats::tally(&orders, Utc::now().date_naive()))
    }

    /// A student's orders grouped by creation day (UTC), newest day first.
    pub async fn schedule_for_user(&self, user_id: Uuid) -> LaundryResult<Vec<ScheduleDay>> {
        let orders = self
            .store
            .list_orders(Some(user_id))
            .await
            .map_err(LaundryError::store)?;

        let mut days: BTreeMap<NaiveDate, Vec<Order>> = BTreeMap::new();
        for order in orders {
            days.entry(order.created_at.date_naive()).or_default().push(order);
        }
        Ok(days
            .into_iter()
            .rev()
            .map(|(date, orders)| ScheduleDay { date, orders })
            .collect())
    }
}
