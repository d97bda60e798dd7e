use anyhow::{Context, Result};
use ldy_schemas::{
    ClothingItem, ClothingType, LaundryType, Order, OrderStatus, PickupType,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

const ORDER_SELECT: &str = r#"
    select
      id,
      user_id,
      student_name,
      room_number,
      phone_number,
      laundry_type,
      pickup_type,
      preferred_date,
      preferred_time,
      slot_id,
      special_instructions,
      barcode,
      status,
      batch_id,
      feedback,
      slot_note,
      created_at,
      updated_at
    from laundry_orders
"#;

fn order_from_row(r: &PgRow) -> Result<Order> {
    Ok(Order {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        student_name: r.try_get("student_name")?,
        room_number: r.try_get("room_number")?,
        phone_number: r.try_get("phone_number")?,
        laundry_type: LaundryType::parse(&r.try_get::<String, _>("laundry_type")?)?,
        pickup_type: PickupType::parse(&r.try_get::<String, _>("pickup_type")?)?,
        preferred_date: r.try_get("preferred_date")?,
        preferred_time: r.try_get("preferred_time")?,
        slot_id: r.try_get("slot_id")?,
        special_instructions: r.try_get("special_instructions")?,
        barcode: r.try_get("barcode")?,
        status: OrderStatus::parse(&r.try_get::<String, _>("status")?)?,
        batch_id: r.try_get("batch_id")?,
        feedback: r.try_get("feedback")?,
        slot_note: r.try_get("slot_note")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

/// Insert the order and its clothing items in one transaction.
pub async fn insert_order(pool: &PgPool, order: &Order, items: &[ClothingItem]) -> Result<()> {
    let mut tx = pool.begin().await.context("insert_order begin failed")?;

    sqlx::query(
        r#"
        insert into laundry_orders (
          id, user_id, student_name, room_number, phone_number, laundry_type,
          pickup_type, preferred_date, preferred_time, slot_id, special_instructions,
          barcode, status, batch_id, feedback, slot_note, created_at, updated_at
        ) values (
          $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18
        )
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.student_name)
    .bind(&order.room_number)
    .bind(&order.phone_number)
    .bind(order.laundry_type.as_str())
    .bind(order.pickup_type.as_str())
    .bind(order.preferred_date)
    .bind(&order.preferred_time)
    .bind(order.slot_id)
    .bind(&order.special_instructions)
    .bind(&order.barcode)
    .bind(order.status.as_str())
    .bind(order.batch_id)
    .bind(&order.feedback)
    .bind(&order.slot_note)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await
    .context("insert laundry_orders failed")?;

    for item in items {
        let quantity = i32::try_from(item.quantity).context("clothing quantity overflows i32")?;
        sqlx::query(
            r#"
            insert into clothing_items (id, order_id, clothing_type, quantity, created_at)
            values ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.clothing_type.as_str())
        .bind(quantity)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await
        .context("insert clothing_items failed")?;
    }

    tx.commit().await.context("insert_order commit failed")?;
    Ok(())
}

pub async fn fetch_order(pool: &PgPool, order_id: Uuid) -> Result<Option<Order>> {
    let sql = format!("{ORDER_SELECT} where id = $1");
    let row = sqlx::query(&sql)
        .bind(order_id)
        .fetch_optional(pool)
        .await
        .context("fetch_order failed")?;

    row.as_ref().map(order_from_row).transpose()
}

/// Barcode and creation time are never rewritten.
pub async fn update_order(pool: &PgPool, order: &Order) -> Result<()> {
    sqlx::query(
        r#"
        update laundry_orders
        set status = $2,
            slot_id = $3,
            batch_id = $4,
            feedback = $5,
            slot_note = $6,
            special_instructions = $7,
            updated_at = $8
        where id = $1
        "#,
    )
    .bind(order.id)
    .bind(order.status.as_str())
    .bind(order.slot_id)
    .bind(order.batch_id)
    .bind(&order.feedback)
    .bind(&order.slot_note)
    .bind(&order.special_instructions)
    .bind(order.updated_at)
    .execute(pool)
    .await
    .context("update_order failed")?;
    Ok(())
}

pub async fn barcode_exists(pool: &PgPool, barcode: &str) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        "select exists (select 1 from laundry_orders where barcode = $1)",
    )
    .bind(barcode)
    .fetch_one(pool)
    .await
    .context("barcode_exists failed")?;
    Ok(exists)
}

/// Exact barcode hit first, then the newest order whose id text contains
/// the token.
pub async fn lookup_order(pool: &PgPool, token: &str) -> Result<Option<Order>> {
    let sql = format!(
        "{ORDER_SELECT} where barcode = $1 or strpos(id::text, lower($1)) > 0 \
         order by (barcode = $1) desc, created_at desc limit 1"
    );
    let row = sqlx::query(&sql)
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("lookup_order failed")?;

    row.as_ref().map(order_from_row).transpose()
}

/// Newest first.
pub async fn list_orders(pool: &PgPool, user_id: Option<Uuid>) -> Result<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} where ($1::uuid is null or user_id = $1) order by created_at desc"
    );
    let rows = sqlx::query(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("list_orders failed")?;

    rows.iter().map(order_from_row).collect()
}

pub async fn list_clothing_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<ClothingItem>> {
    let rows = sqlx::query(
        r#"
        select id, order_id, clothing_type, quantity, created_at
        from clothing_items
        where order_id = $1
        order by clothing_type asc
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
    .context("list_clothing_items failed")?;

    rows.iter()
        .map(|r| -> Result<ClothingItem> {
            Ok(ClothingItem {
                id: r.try_get("id")?,
                order_id: r.try_get("order_id")?,
                clothing_type: ClothingType::parse(&r.try_get::<String, _>("clothing_type")?)?,
                quantity: u32::try_from(r.try_get::<i32, _>("quantity")?)
                    .context("negative clothing quantity")?,
                created_at: r.try_get("created_at")?,
            })
        })
        .collect()
}
