//! Batch Aggregator.

use chrono::Utc;
use ldy_schemas::{Batch, BatchStatus};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::desk::LaundryDesk;
use crate::error::{LaundryError, LaundryResult};

/// One order the fan-out could not move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub order_id: Uuid,
    pub kind: String,
    pub error: String,
}

/// Outcome of [`LaundryDesk::advance_batch`]. Orders already moved stay
/// moved when a later one fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAdvanceReport {
    pub batch: Batch,
    /// One entry per list position that transitioned; duplicates repeat.
    pub transitioned: Vec<Uuid>,
    pub failed: Vec<BatchFailure>,
}

impl BatchAdvanceReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl LaundryDesk {
    pub async fn create_batch(&self, name: &str) -> LaundryResult<Batch> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LaundryError::Validation("batch name is required".to_string()));
        }

        let now = Utc::now();
        let batch = Batch {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: BatchStatus::Created,
            order_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_batch(&batch)
            .await
            .map_err(LaundryError::store)?;

        info!(batch_id = %batch.id, name, "batch created");
        Ok(batch)
    }

    /// Append `order_id` to the batch and stamp the order with the batch.
    ///
    /// Not idempotent: adding the same order twice lists it twice.
    pub async fn add_order(&self, batch_id: Uuid, order_id: Uuid) -> LaundryResult<Batch> {
        let mut batch = self.get_batch(batch_id).await?;
        let mut order = self
            .store
            .fetch_order(order_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("order", order_id))?;

        self.store
            .append_batch_order(batch_id, order_id)
            .await
            .map_err(LaundryError::store)?;

        if let Some(previous) = order.batch_id.filter(|b| *b != batch_id) {
            warn!(%order_id, %previous, %batch_id, "order moved between batches");
        }
        order.batch_id = Some(batch_id);
        order.updated_at = Utc::now();
        self.store
            .update_order(&order)
            .await
            .map_err(LaundryError::store)?;

        batch.order_ids.push(order_id);
        info!(%batch_id, %order_id, size = batch.order_ids.len(), "order added to batch");
        Ok(batch)
    }

    /// Set the batch status, then for washing, drying and completed move
    /// every listed order to the matching status, one by one.
    pub async fn advance_batch(
        &self,
        batch_id: Uuid,
        status: BatchStatus,
    ) -> LaundryResult<BatchAdvanceReport> {
        let mut batch = self.get_batch(batch_id).await?;

        let now = Utc::now();
        self.store
            .update_batch_status(batch_id, status, now)
            .await
            .map_err(LaundryError::store)?;
        batch.status = status;
        batch.updated_at = now;

        let mut transitioned = Vec::new();
        let mut failed = Vec::new();
        if let Some(order_status) = status.order_status() {
            for order_id in batch.order_ids.clone() {
                match self.transition(order_id, order_status, None, None).await {
                    Ok(_) => transitioned.push(order_id),
                    Err(err) => {
                        warn!(%batch_id, %order_id, error = %err, "batch fan-out skipped order");
                        failed.push(BatchFailure {
                            order_id,
                            kind: err.kind().to_string(),
                            error: err.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            %batch_id,
            status = %status,
            transitioned = transitioned.len(),
            failed = failed.len(),
            "batch advanced"
        );
        Ok(BatchAdvanceReport {
            batch,
            transitioned,
            failed,
        })
    }

    pub async fn get_batch(&self, batch_id: Uuid) -> LaundryResult<Batch> {
        self.store
            .fetch_batch(batch_id)
            .await
            .map_err(LaundryError::store)?
            .ok_or_else(|| LaundryError::not_found("batch", batch_id))
    }

    pub async fn list_batches(&self) -> LaundryResult<Vec<Batch>> {
        self.store.list_batches().await.map_err(LaundryError::store)
    }
}
