//! `ldy order` handlers.

use anyhow::{Context, Result};
use ldy_schemas::{Order, OrderStatus};
use uuid::Uuid;

use super::{load_config, open_desk};

pub async fn lookup(token: &str, json: bool) -> Result<()> {
    let loaded = load_config(&[])?;
    let desk = open_desk(&loaded).await?;

    let order = desk.find_by_barcode_or_id(token).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&order)?);
    } else {
        print_order(&order);
    }
    Ok(())
}

pub async fn transition(
    id: &str,
    status: &str,
    feedback: Option<String>,
    slot_note: Option<String>,
) -> Result<()> {
    // Argument errors surface before any connection attempt.
    let order_id = Uuid::parse_str(id.trim()).context("invalid order id uuid")?;
    let status = OrderStatus::parse(status)?;

    let loaded = load_config(&[])?;
    let desk = open_desk(&loaded).await?;

    let order = desk.transition(order_id, status, slot_note, feedback).await?;
    println!(
        "transitioned=true order_id={} barcode={} status={}",
        order.id, order.barcode, order.status
    );
    Ok(())
}

fn print_order(o: &Order) {
    println!("order_id={}", o.id);
    println!("barcode={}", o.barcode);
    println!("status={}", o.status);
    println!("student_name={}", o.student_name);
    println!("room_number={}", o.room_number);
    println!("preferred_date={}", o.preferred_date);
    println!("preferred_time={}", o.preferred_time);
    println!("laundry_type={}", o.laundry_type.as_str());
    println!("pickup_type={}", o.pickup_type.as_str());
    println!(
        "batch_id={}",
        o.batch_id.map(|b| b.to_string()).unwrap_or_else(|| "NONE".to_string())
    );
    println!("created_at={}", o.created_at.to_rfc3339());
}
