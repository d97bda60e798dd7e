use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use ldy_schemas::{Notification, TimeSlot, User, UserRole};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

mod batches;
mod orders;
mod store;

pub use batches::{append_batch_order, fetch_batch, insert_batch, list_batches, update_batch_status};
pub use orders::{
    barcode_exists, fetch_order, insert_order, list_clothing_items, list_orders, lookup_order,
    update_order,
};
pub use store::PgStore;

pub const ENV_DB_URL: &str = "LDY_DATABASE_URL";

/// Connect to Postgres using LDY_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL).with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Connectivity + schema presence.
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='laundry_orders'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok,
        has_orders_table: exists,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_orders_table: bool,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

fn user_from_row(r: &PgRow) -> Result<User> {
    Ok(User {
        id: r.try_get("id")?,
        phone_number: r.try_get("phone_number")?,
        role: UserRole::parse(&r.try_get::<String, _>("role")?)?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

pub async fn find_user_by_phone(pool: &PgPool, phone_number: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        select id, phone_number, role, created_at, updated_at
        from users
        where phone_number = $1
        "#,
    )
    .bind(phone_number)
    .fetch_optional(pool)
    .await
    .context("find_user_by_phone failed")?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        select id, phone_number, role, created_at, updated_at
        from users
        where id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("fetch_user failed")?;

    row.as_ref().map(user_from_row).transpose()
}

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        insert into users (id, phone_number, role, created_at, updated_at)
        values ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&user.phone_number)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("insert_user failed")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Time slots
// ---------------------------------------------------------------------------

fn slot_from_row(r: &PgRow) -> Result<TimeSlot> {
    Ok(TimeSlot {
        id: r.try_get("id")?,
        date: r.try_get("date")?,
        time_range: r.try_get("time_range")?,
        max_capacity: r.try_get("max_capacity")?,
        current_bookings: r.try_get("current_bookings")?,
        is_active: r.try_get("is_active")?,
        created_at: r.try_get("created_at")?,
    })
}

pub async fn list_slots(pool: &PgPool, date: NaiveDate) -> Result<Vec<TimeSlot>> {
    let rows = sqlx::query(
        r#"
        select id, date, time_range, max_capacity, current_bookings, is_active, created_at
        from time_slots
        where date = $1
        order by time_range asc
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await
    .context("list_slots failed")?;

    rows.iter().map(slot_from_row).collect()
}

pub async fn fetch_slot(pool: &PgPool, slot_id: Uuid) -> Result<Option<TimeSlot>> {
    let row = sqlx::query(
        r#"
        select id, date, time_range, max_capacity, current_bookings, is_active, created_at
        from time_slots
        where id = $1
        "#,
    )
    .bind(slot_id)
    .fetch_optional(pool)
    .await
    .context("fetch_slot failed")?;

    row.as_ref().map(slot_from_row).transpose()
}

pub async fn find_slot(pool: &PgPool, date: NaiveDate, time_range: &str) -> Result<Option<TimeSlot>> {
    let row = sqlx::query(
        r#"
        select id, date, time_range, max_capacity, current_bookings, is_active, created_at
        from time_slots
        where date = $1 and time_range = $2
        "#,
    )
    .bind(date)
    .bind(time_range)
    .fetch_optional(pool)
    .await
    .context("find_slot failed")?;

    row.as_ref().map(slot_from_row).transpose()
}

pub async fn insert_slot(pool: &PgPool, slot: &TimeSlot) -> Result<()> {
    sqlx::query(
        r#"
        insert into time_slots (
          id, date, time_range, max_capacity, current_bookings, is_active, created_at
        ) values (
          $1, $2, $3, $4, $5, $6, $7
        )
        "#,
    )
    .bind(slot.id)
    .bind(slot.date)
    .bind(&slot.time_range)
    .bind(slot.max_capacity)
    .bind(slot.current_bookings)
    .bind(slot.is_active)
    .bind(slot.created_at)
    .execute(pool)
    .await
    .context("insert_slot failed")?;
    Ok(())
}

pub async fn update_slot(pool: &PgPool, slot: &TimeSlot) -> Result<()> {
    sqlx::query(
        r#"
        update time_slots
        set max_capacity = $2,
            current_bookings = $3,
            is_active = $4
        where id = $1
        "#,
    )
    .bind(slot.id)
    .bind(slot.max_capacity)
    .bind(slot.current_bookings)
    .bind(slot.is_active)
    .execute(pool)
    .await
    .context("update_slot failed")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

pub async fn insert_notification(pool: &PgPool, n: &Notification) -> Result<()> {
    sqlx::query(
        r#"
        insert into notifications (id, user_id, order_id, title, message, is_read, created_at)
        values ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(n.id)
    .bind(n.user_id)
    .bind(n.order_id)
    .bind(&n.title)
    .bind(&n.message)
    .bind(n.is_read)
    .bind(n.created_at)
    .execute(pool)
    .await
    .context("insert_notification failed")?;
    Ok(())
}

pub async fn list_notifications(pool: &PgPool, user_id: Uuid) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        r#"
        select id, user_id, order_id, title, message, is_read, created_at
        from notifications
        where user_id = $1
        order by created_at desc
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("list_notifications failed")?;

    rows.iter()
        .map(|r| -> Result<Notification> {
            Ok(Notification {
                id: r.try_get("id")?,
                user_id: r.try_get("user_id")?,
                order_id: r.try_get("order_id")?,
                title: r.try_get("title")?,
                message: r.try_get("message")?,
                is_read: r.try_get("is_read")?,
                created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            })
        })
        .collect()
}

/// Returns false when no notification has that id.
pub async fn mark_notification_read(pool: &PgPool, notification_id: Uuid) -> Result<bool> {
    let res = sqlx::query(
        r#"
        update notifications
        set is_read = true
        where id = $1
        "#,
    )
    .bind(notification_id)
    .execute(pool)
    .await
    .context("mark_notification_read failed")?;
    Ok(res.rows_affected() > 0)
}
