use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ldy_schemas::{Batch, BatchStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

// Membership comes back as one array per batch, in insertion order,
// duplicates included.
const BATCH_SELECT: &str = r#"
    select
      b.id,
      b.name,
      b.status,
      b.created_at,
      b.updated_at,
      coalesce(
        array_agg(bo.order_id order by bo.seq) filter (where bo.order_id is not null),
        '{}'
      ) as order_ids
    from batches b
    left join batch_orders bo on bo.batch_id = b.id
"#;

fn batch_from_row(r: &PgRow) -> Result<Batch> {
    Ok(Batch {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        status: BatchStatus::parse(&r.try_get::<String, _>("status")?)?,
        order_ids: r.try_get::<Vec<Uuid>, _>("order_ids")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

pub async fn insert_batch(pool: &PgPool, batch: &Batch) -> Result<()> {
    sqlx::query(
        r#"
        insert into batches (id, name, status, created_at, updated_at)
        values ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(batch.id)
    .bind(&batch.name)
    .bind(batch.status.as_str())
    .bind(batch.created_at)
    .bind(batch.updated_at)
    .execute(pool)
    .await
    .context("insert_batch failed")?;
    Ok(())
}

pub async fn fetch_batch(pool: &PgPool, batch_id: Uuid) -> Result<Option<Batch>> {
    let sql = format!("{BATCH_SELECT} where b.id = $1 group by b.id");
    let row = sqlx::query(&sql)
        .bind(batch_id)
        .fetch_optional(pool)
        .await
        .context("fetch_batch failed")?;

    row.as_ref().map(batch_from_row).transpose()
}

/// Newest first.
pub async fn list_batches(pool: &PgPool) -> Result<Vec<Batch>> {
    let sql = format!("{BATCH_SELECT} group by b.id order by b.created_at desc");
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .context("list_batches failed")?;

    rows.iter().map(batch_from_row).collect()
}

pub async fn append_batch_order(pool: &PgPool, batch_id: Uuid, order_id: Uuid) -> Result<()> {
    sqlx::query("insert into batch_orders (batch_id, order_id) values ($1, $2)")
        .bind(batch_id)
        .bind(order_id)
        .execute(pool)
        .await
        .context("append_batch_order failed")?;
    Ok(())
}

pub async fn update_batch_status(
    pool: &PgPool,
    batch_id: Uuid,
    status: BatchStatus,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        update batches
        set status = $2,
            updated_at = $3
        where id = $1
        "#,
    )
    .bind(batch_id)
    .bind(status.as_str())
    .bind(updated_at)
    .execute(pool)
    .await
    .context("update_batch_status failed")?;
    Ok(())
}
